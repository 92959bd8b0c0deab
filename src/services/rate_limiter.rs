//! Limiteur de tentatives (forgot-password: 3 par heure et par IP+email).
//!
//! `RateLimiter` est une capacité injectée: l'implémentation en mémoire
//! ci-dessous est locale au process (perdue au redémarrage, non partagée
//! entre instances). Un store partagé à expiration de clés peut la remplacer
//! sans toucher aux services.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Enregistre une tentative pour la clé
    async fn record_attempt(&self, key: &str, at: DateTime<Utc>);

    /// Nombre de tentatives dans la fenêtre glissante qui se termine à `now`
    async fn count_attempts(&self, key: &str, window: Duration, now: DateTime<Utc>) -> usize;

    /// Compte et enregistre en une seule opération atomique.
    /// Retourne false (sans enregistrer) si `limit` tentatives sont déjà dans la fenêtre.
    async fn record_if_below(&self, key: &str, limit: usize, window: Duration, now: DateTime<Utc>) -> bool;

    /// Supprime les tentatives plus vieilles que la fenêtre
    async fn evict_expired(&self, window: Duration, now: DateTime<Utc>);
}

/// Vérifie la limite puis enregistre la tentative.
/// Retourne false si la limite est déjà atteinte (la tentative n'est pas comptée).
pub async fn try_acquire(
    limiter: &dyn RateLimiter,
    key: &str,
    limit: usize,
    window: Duration,
    now: DateTime<Utc>,
) -> bool {
    limiter.record_if_below(key, limit, window, now).await
}

#[derive(Default)]
pub struct InMemoryRateLimiter {
    attempts: DashMap<String, Vec<DateTime<Utc>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn record_attempt(&self, key: &str, at: DateTime<Utc>) {
        self.attempts.entry(key.to_string()).or_default().push(at);
    }

    async fn count_attempts(&self, key: &str, window: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - window;
        self.attempts
            .get(key)
            .map(|times| times.iter().filter(|t| **t > cutoff).count())
            .unwrap_or(0)
    }

    async fn record_if_below(&self, key: &str, limit: usize, window: Duration, now: DateTime<Utc>) -> bool {
        let cutoff = now - window;
        // le verrou de l'entrée couvre le comptage et l'ajout
        let mut times = self.attempts.entry(key.to_string()).or_default();
        if times.iter().filter(|t| **t > cutoff).count() >= limit {
            return false;
        }
        times.push(now);
        true
    }

    async fn evict_expired(&self, window: Duration, now: DateTime<Utc>) {
        let cutoff = now - window;
        self.attempts.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
    }
}
