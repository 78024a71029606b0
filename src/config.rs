use std::{env, net::SocketAddr, path::PathBuf};

use crate::{entry::RequiredFields, error::AppError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    JsonFile(PathBuf),
    Sqlite { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub storage: StorageBackend,
    pub cookie_secret: String,
    pub required_fields: RequiredFields,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let storage = match env::var("DATABASE_URL") {
            Ok(database_url) if !database_url.trim().is_empty() => {
                StorageBackend::Sqlite { database_url }
            }
            _ => StorageBackend::JsonFile(
                env::var("TRIPS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data/fleetTrips.json")),
            ),
        };

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-fleet-trip-log-cookie-secret".to_string());

        let required_fields = RequiredFields {
            driver_name: env_flag("REQUIRE_DRIVER_NAME", true)?,
            arrival: env_flag("REQUIRE_ARRIVAL", true)?,
        };

        Ok(Self {
            listen_addr,
            storage,
            cookie_secret,
            required_fields,
        })
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(raw) => parse_flag(&raw)
            .ok_or_else(|| AppError::Config(format!("invalid {name}: `{raw}`"))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
