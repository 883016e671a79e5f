//! Server configuration from the environment.
//!
//! `main` calls `dotenv().ok()` first, so a `.env` file next to the binary
//! works the same as exported variables.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Settings for the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `HOST`, default `127.0.0.1`.
    pub host: String,
    /// `PORT`, default `3000`.
    pub port: u16,
    /// `DATA_FILE`, default `data/data.json`.
    pub data_file: PathBuf,
    /// `PRETTY_JSON`, default `true`.
    pub pretty: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            data_file: PathBuf::from("data/data.json"),
            pretty: true,
        }
    }
}

impl ServerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("HOST") {
            cfg.host = host;
        }
        if let Some(port) = lookup("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{port}'")))?;
        }
        if let Some(file) = lookup("DATA_FILE") {
            if file.trim().is_empty() {
                return Err(Error::Config("DATA_FILE is empty".into()));
            }
            cfg.data_file = PathBuf::from(file);
        }
        if let Some(pretty) = lookup("PRETTY_JSON") {
            cfg.pretty = parse_flag(&pretty)
                .ok_or_else(|| Error::Config(format!("PRETTY_JSON must be true/false, got '{pretty}'")))?;
        }
        Ok(cfg)
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
