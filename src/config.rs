use std::{env, time::Duration};

use anyhow::Context;

use crate::policy::{InsufficientStockPolicy, PlacementPolicy, SalesValuation};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    /// Applied to pool acquisition and to every storage call.
    pub db_timeout: Duration,
    pub insufficient_stock_policy: InsufficientStockPolicy,
    pub sales_valuation: SalesValuation,
    pub order_max_attempts: u32,
    pub order_retry_backoff: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "APP_PORT", 3000_u16)?;

        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10_u32)?;
        let db_timeout = Duration::from_secs(parse_or(&lookup, "DB_TIMEOUT_SECS", 5_u64)?);
        let insufficient_stock_policy =
            parse_or(&lookup, "INSUFFICIENT_STOCK_POLICY", InsufficientStockPolicy::RejectOrder)?;
        let sales_valuation = parse_or(&lookup, "SALES_VALUATION", SalesValuation::ListPrice)?;
        let order_max_attempts = parse_or(&lookup, "ORDER_MAX_ATTEMPTS", 3_u32)?.max(1);
        let order_retry_backoff =
            Duration::from_millis(parse_or(&lookup, "ORDER_RETRY_BACKOFF_MS", 50_u64)?);

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            db_max_connections,
            db_timeout,
            insufficient_stock_policy,
            sales_valuation,
            order_max_attempts,
            order_retry_backoff,
        })
    }

    pub fn placement_policy(&self) -> PlacementPolicy {
        PlacementPolicy {
            insufficient_stock: self.insufficient_stock_policy,
            max_attempts: self.order_max_attempts,
            retry_backoff: self.order_retry_backoff,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}: {e}")),
        None => Ok(default),
    }
}
