// ============================================================================
// SERVICES : logique métier (paiement, comptes, reset password)
// ============================================================================
pub mod account_service;
pub mod mailer;
pub mod order_service;
pub mod payment_gateway;
pub mod rate_limiter;
pub mod recovery_service;
