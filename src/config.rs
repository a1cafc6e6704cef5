use dotenvy::dotenv;
use std::env;

use crate::ledger::LedgerSettings;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub api_prefix: String,

    pub ledger: LedgerSettings,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:leave_ledger.db?mode=rwc".to_string()),

            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            ledger: LedgerSettings {
                carry_forward_lookback: env::var("CARRY_FORWARD_LOOKBACK_YEARS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .unwrap(),
                balance_commit_retries: env::var("BALANCE_COMMIT_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap(),
            },
        }
    }
}
