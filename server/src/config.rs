// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Which card processor the order flow charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentProvider {
  Stripe,
  Mock,
}

impl FromStr for PaymentProvider {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "stripe" => Ok(PaymentProvider::Stripe),
      "mock" => Ok(PaymentProvider::Mock),
      other => Err(AppError::Config(format!("Unknown PAYMENT_PROVIDER '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  pub jwt_secret: String,
  pub jwt_ttl_seconds: i64,

  pub payment_provider: PaymentProvider,
  pub stripe_secret_key: Option<String>,
  pub stripe_api_base: String,
  pub payment_currency: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any name -> value source. `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |name: &str| {
      lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };
    let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = parse("SERVER_PORT", &or_default("SERVER_PORT", "8080"))?;
    let database_url = required("DATABASE_URL")?;
    let database_max_connections = parse("DATABASE_MAX_CONNECTIONS", &or_default("DATABASE_MAX_CONNECTIONS", "10"))?;
    let run_migrations = parse("RUN_MIGRATIONS", &or_default("RUN_MIGRATIONS", "false"))?;

    let jwt_secret = required("JWT_SECRET")?;
    let jwt_ttl_seconds: i64 = parse("JWT_TTL_SECONDS", &or_default("JWT_TTL_SECONDS", "86400"))?;
    if jwt_ttl_seconds <= 0 {
      return Err(AppError::Config("JWT_TTL_SECONDS must be positive".to_string()));
    }

    let payment_provider: PaymentProvider = or_default("PAYMENT_PROVIDER", "mock").parse()?;
    let stripe_secret_key = lookup("STRIPE_SECRET_KEY").filter(|v| !v.trim().is_empty());
    if payment_provider == PaymentProvider::Stripe && stripe_secret_key.is_none() {
      return Err(AppError::Config(
        "STRIPE_SECRET_KEY is required when PAYMENT_PROVIDER=stripe".to_string(),
      ));
    }
    let stripe_api_base = or_default("STRIPE_API_BASE", "https://api.stripe.com")
      .trim_end_matches('/')
      .to_string();
    let payment_currency = or_default("PAYMENT_CURRENCY", "usd").to_ascii_lowercase();

    tracing::info!(
      host = %server_host,
      port = server_port,
      payment_provider = ?payment_provider,
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      jwt_secret,
      jwt_ttl_seconds,
      payment_provider,
      stripe_secret_key,
      stripe_api_base,
      payment_currency,
    })
  }
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name: &str| map.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_only_required_values_are_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/goeats"),
      ("JWT_SECRET", "s3cret"),
    ]))
    .unwrap();

    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.database_max_connections, 10);
    assert!(!cfg.run_migrations);
    assert_eq!(cfg.jwt_ttl_seconds, 86_400);
    assert_eq!(cfg.payment_provider, PaymentProvider::Mock);
    assert_eq!(cfg.stripe_api_base, "https://api.stripe.com");
    assert_eq!(cfg.payment_currency, "usd");
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "x")])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn stripe_provider_requires_a_secret_key() {
    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/goeats"),
      ("JWT_SECRET", "x"),
      ("PAYMENT_PROVIDER", "Stripe"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("STRIPE_SECRET_KEY")));
  }

  #[test]
  fn invalid_port_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/goeats"),
      ("JWT_SECRET", "x"),
      ("SERVER_PORT", "eighty"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("SERVER_PORT")));
  }
}
