// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use dotenvy::dotenv;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// HMAC secret shared with the identity provider for bearer tokens.
    pub auth_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    /// Upper bound on a single store read made while serving a request.
    pub fetch_timeout: Duration,
    pub notify: NotifyConfig,
}

/// Gateway URLs per notification channel; `None` means log only.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub push_url: Option<String>,
    pub email_url: Option<String>,
    pub sms_url: Option<String>,
    /// Upper bound on one channel's send, gateway round trip included.
    pub send_timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            push_url: None,
            email_url: None,
            sms_url: None,
            send_timeout: Duration::from_millis(DEFAULT_NOTIFY_TIMEOUT_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = non_empty("DATABASE_URL");

        let auth_secret = env::var("AUTH_SECRET").expect("AUTH_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or_else(|| {
                DEFAULT_BIND_ADDR
                    .parse()
                    .expect("default bind address is valid")
            });

        let fetch_timeout = millis("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS);

        let notify = NotifyConfig {
            push_url: non_empty("NOTIFY_PUSH_URL"),
            email_url: non_empty("NOTIFY_EMAIL_URL"),
            sms_url: non_empty("NOTIFY_SMS_URL"),
            send_timeout: millis("NOTIFY_TIMEOUT_MS", DEFAULT_NOTIFY_TIMEOUT_MS),
        };

        Self {
            database_url,
            auth_secret,
            rust_log,
            bind_addr,
            fetch_timeout,
            notify,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn millis(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(default))
}
