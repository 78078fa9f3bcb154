use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_CONCURRENT_ANALYSES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Directory uploads are written to while being analysed.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Upper bound on one analysis, in seconds.
    pub request_timeout_secs: u64,
    /// Analyses allowed in flight, counting ones abandoned after a timeout.
    pub max_concurrent_analyses: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `UPLOAD_DIR`              | OS temp dir             |
    /// | `MAX_UPLOAD_BYTES`        | `209715200` (200 MB)    |
    /// | `REQUEST_TIMEOUT_SECS`    | `120`                   |
    /// | `MAX_CONCURRENT_ANALYSES` | `4`                     |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .trim()
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let upload_dir = lookup("UPLOAD_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let max_upload_bytes: usize = match lookup("MAX_UPLOAD_BYTES") {
            Some(v) => v.trim().parse().context("MAX_UPLOAD_BYTES must be a valid usize")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let request_timeout_secs: u64 = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid u64")?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let max_concurrent_analyses: usize = match lookup("MAX_CONCURRENT_ANALYSES") {
            Some(v) => v
                .trim()
                .parse()
                .context("MAX_CONCURRENT_ANALYSES must be a valid usize")?,
            None => DEFAULT_MAX_CONCURRENT_ANALYSES,
        };
        if max_concurrent_analyses == 0 {
            anyhow::bail!("MAX_CONCURRENT_ANALYSES must be at least 1");
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            upload_dir,
            max_upload_bytes,
            request_timeout_secs,
            max_concurrent_analyses,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(cfg.upload_dir, std::env::temp_dir());
        assert_eq!(cfg.max_upload_bytes, 200 * 1024 * 1024);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.max_concurrent_analyses, 4);
    }

    #[test]
    fn test_concurrency_limit_must_be_positive() {
        assert_eq!(
            config(&[("MAX_CONCURRENT_ANALYSES", "2")]).unwrap().max_concurrent_analyses,
            2
        );
        assert!(config(&[("MAX_CONCURRENT_ANALYSES", "0")]).is_err());
        assert!(config(&[("MAX_CONCURRENT_ANALYSES", "many")]).is_err());
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let cfg = config(&[(
            "CORS_ORIGINS",
            "http://localhost:5173, https://detector.example.com ,",
        )])
        .unwrap();
        assert_eq!(
            cfg.cors_origins,
            vec!["http://localhost:5173", "https://detector.example.com"]
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("REQUEST_TIMEOUT_SECS", "-1")]).is_err());
    }
}
