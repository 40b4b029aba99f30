use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub data_path: PathBuf,
    pub backup_path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("referee_data.json"),
            backup_path: PathBuf::from("backup_referee_data.json"),
        }
    }
}

/// What a session does when an offer times out without an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Treat the silence as a decline and offer the match to the next candidate
    NextCandidate,
    /// End the session; the admin has to re-run the assignment
    Abandon,
}

impl FromStr for ExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next" | "next_candidate" => Ok(ExpiryPolicy::NextCandidate),
            "abandon" => Ok(ExpiryPolicy::Abandon),
            other => Err(format!("unknown expiry policy: {}", other)),
        }
    }
}

/// Longest an offer may stay open: one week
pub const MAX_OFFER_TIMEOUT_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone)]
pub struct OfferSettings {
    pub timeout_secs: u64,
    pub on_expiry: ExpiryPolicy,
    pub rng_seed: Option<u64>,
}

impl OfferSettings {
    /// Configured timeout, capped at `MAX_OFFER_TIMEOUT_SECS`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.min(MAX_OFFER_TIMEOUT_SECS))
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.timeout()).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for OfferSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            on_expiry: ExpiryPolicy::NextCandidate,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub webhook_url: Option<String>,
    pub audit_webhook_url: Option<String>,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
    pub broadcast_delay_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            audit_webhook_url: None,
            user_agent: "RefereeOps/1.0",
            timeout_secs: 30,
            rate_limit_ms: 100,
            broadcast_delay_ms: 500, // stay clear of DM rate limits
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeagueSettings {
    pub admin_token: String,
    pub id_prefix: String,
    pub max_leave_days: i64,
    pub max_strikes: u32,
    pub leaderboard_size: usize,
    pub history_size: usize,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            admin_token: "secret".to_string(),
            id_prefix: "BFL".to_string(),
            max_leave_days: 15,
            max_strikes: 3,
            leaderboard_size: 10,
            history_size: 15,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub offers: OfferSettings,
    pub delivery: DeliverySettings,
    pub league: LeagueSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by whatever is set in the process environment
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = std::env::var("DATA_FILE") {
            config.store.data_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("BACKUP_FILE") {
            config.store.backup_path = PathBuf::from(path);
        }

        config.offers.timeout_secs =
            capped_offer_timeout(env_or("OFFER_TIMEOUT_SECS", config.offers.timeout_secs));
        config.offers.on_expiry = env_or("OFFER_EXPIRY_POLICY", config.offers.on_expiry);
        config.offers.rng_seed = env_parse("ASSIGNMENT_SEED");

        config.delivery.webhook_url = non_empty_env("DELIVERY_WEBHOOK_URL");
        config.delivery.audit_webhook_url = non_empty_env("AUDIT_WEBHOOK_URL");
        config.delivery.timeout_secs =
            env_or("DELIVERY_TIMEOUT_SECS", config.delivery.timeout_secs);
        config.delivery.rate_limit_ms =
            env_or("DELIVERY_RATE_LIMIT_MS", config.delivery.rate_limit_ms);
        config.delivery.broadcast_delay_ms =
            env_or("BROADCAST_DELAY_MS", config.delivery.broadcast_delay_ms);

        if let Some(token) = non_empty_env("ADMIN_TOKEN") {
            config.league.admin_token = token;
        } else {
            warn!("ADMIN_TOKEN not set, falling back to the default admin token");
        }
        if let Some(prefix) = non_empty_env("REFEREE_ID_PREFIX") {
            config.league.id_prefix = prefix;
        }
        config.league.max_leave_days = env_or("MAX_LEAVE_DAYS", config.league.max_leave_days);

        config
    }
}

fn capped_offer_timeout(secs: u64) -> u64 {
    if secs > MAX_OFFER_TIMEOUT_SECS {
        warn!(
            "OFFER_TIMEOUT_SECS={} exceeds the {}s limit, using the limit",
            secs, MAX_OFFER_TIMEOUT_SECS
        );
        return MAX_OFFER_TIMEOUT_SECS;
    }
    secs
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = non_empty_env(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {}", key, raw);
            None
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_parse(key).unwrap_or(default)
}
