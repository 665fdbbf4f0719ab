use std::collections::BTreeSet;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use lectern_application::{AccessPolicyConfig, DEFAULT_SUBSCRIPTION_ENTITLEMENT};
use lectern_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatStoreConfig {
    Memory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub frontend_url: String,
    pub invite_base_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub seat_store: SeatStoreConfig,
    pub access_policy: AccessPolicyConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let invite_base_url =
            env::var("INVITE_BASE_URL").unwrap_or_else(|_| frontend_url.clone());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let seat_store = match env::var("SEAT_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => SeatStoreConfig::Memory,
            "postgres" => SeatStoreConfig::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "SEAT_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        if migrate_only && seat_store == SeatStoreConfig::Memory {
            return Err(AppError::Validation(
                "migrate requires SEAT_STORE=postgres".to_owned(),
            ));
        }

        let access_policy = AccessPolicyConfig {
            subscription_entitlement_types: name_list_env("ACCESS_SUBSCRIPTION_ENTITLEMENTS"),
            discord_entitlement_types: name_list_env("ACCESS_DISCORD_ENTITLEMENTS"),
            email_not_required: env::var("ACCESS_EMAIL_NOT_REQUIRED")
                .unwrap_or_else(|_| "false".to_owned())
                .eq_ignore_ascii_case("true"),
        };

        Ok(Self {
            migrate_only,
            frontend_url,
            invite_base_url,
            api_host,
            api_port,
            seat_store,
            access_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn name_list_env(name: &str) -> BTreeSet<String> {
    match env::var(name) {
        Ok(value) => parse_name_list(&value),
        Err(_) => BTreeSet::from([DEFAULT_SUBSCRIPTION_ENTITLEMENT.to_owned()]),
    }
}

fn parse_name_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
