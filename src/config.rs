use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use crate::infrastructure::StorageDriver;

pub const DEFAULT_SERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT should contain an integer between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("SERVERIP should contain a valid IP address, got {0:?}")]
    InvalidIp(String),
    #[error("DB_DRIVER {0:?} is not supported (expected memory or sqlite)")]
    UnsupportedDriver(String),
    #[error("MEMORY_SEED should be true or false, got {0:?}")]
    InvalidSeedFlag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub driver: StorageDriver,
    pub database_url: String,
    pub memory_seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(DEFAULT_SERVER_IP, DEFAULT_SERVER_PORT),
            driver: StorageDriver::Memory,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            memory_seed: true,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let ip = match lookup("SERVERIP") {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidIp(raw))?,
            None => DEFAULT_SERVER_IP,
        };
        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_SERVER_PORT,
        };
        config.listen_addr = SocketAddr::new(ip, port);

        if let Some(raw) = lookup("DB_DRIVER") {
            config.driver = raw.parse().map_err(|_| ConfigError::UnsupportedDriver(raw))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(raw) = lookup("MEMORY_SEED") {
            config.memory_seed = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidSeedFlag(raw)),
            };
        }
        Ok(config)
    }
}
