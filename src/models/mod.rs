// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - orders : Commandes Razorpay (table payments)
//   - accounts : Comptes utilisateurs après paiement (table user_details)
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Les noms de tables et colonnes restent ceux de la base déjà déployée
//   - Les tokens (session, reset) ne sont pas stockés: ce sont des JWT signés
//
// ============================================================================

pub mod health;
pub mod orders;
pub mod accounts;
pub mod dto;
