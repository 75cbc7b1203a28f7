// Configuration module: builds the Fedora connection settings from the
// environment. Nothing here is hard-coded into the uploader itself; the
// values are collected once and handed to `api::FedoraClient`.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8086/fcrepo/rest";
pub const DEFAULT_USERNAME: &str = "fedoraAdmin";
pub const DEFAULT_PASSWORD: &str = "fedoraAdmin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// One day. Larger values overflow the deadline the HTTP client computes.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Everything needed to talk to one Fedora repository.
#[derive(Clone, Debug)]
pub struct FedoraConfig {
    /// Base of the LDP REST API, e.g. `http://host:8086/fcrepo/rest`.
    pub base_url: String,
    /// Externally reachable replacement for `base_url` in reported URIs.
    pub public_base_url: Option<String>,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl FedoraConfig {
    /// Load `.env` files and then read the configuration from the process
    /// environment. Variables already set in the environment always win.
    pub fn from_env() -> Result<Self> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get("FEDORA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = normalize_url(base_url).context("Invalid FEDORA_BASE_URL")?;
        let public_base_url = get("FEDORA_PUBLIC_URL")
            .map(normalize_url)
            .transpose()
            .context("Invalid FEDORA_PUBLIC_URL")?;

        let username = get("FEDORA_USERNAME").unwrap_or_else(|| {
            warn!("FEDORA_USERNAME not set, using the stock Fedora admin account");
            DEFAULT_USERNAME.into()
        });
        let password = get("FEDORA_PASSWORD").unwrap_or_else(|| {
            warn!("FEDORA_PASSWORD not set, using the stock Fedora admin password");
            DEFAULT_PASSWORD.into()
        });

        let timeout_secs = match get("FEDORA_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("FEDORA_TIMEOUT_SECS is not a number: {}", raw))?;
                if secs == 0 {
                    bail!("FEDORA_TIMEOUT_SECS must be greater than zero");
                }
                if secs > MAX_TIMEOUT_SECS {
                    bail!("FEDORA_TIMEOUT_SECS must be at most {} seconds", MAX_TIMEOUT_SECS);
                }
                secs
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(FedoraConfig {
            base_url,
            public_base_url,
            username,
            password,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Config pointing at `base_url` with default credentials and timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base = base_url.to_string();
        Self::from_lookup(move |key| match key {
            "FEDORA_BASE_URL" => Some(base.clone()),
            "FEDORA_USERNAME" => Some(DEFAULT_USERNAME.into()),
            "FEDORA_PASSWORD" => Some(DEFAULT_PASSWORD.into()),
            _ => None,
        })
    }
}

fn normalize_url(url: String) -> Result<String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("expected an http:// or https:// URL, got {}", url);
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Per-user config file, e.g. `~/.config/fedora-upload/config.env`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fedora-upload").join("config.env"))
}

fn load_env_files() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
    if let Some(path) = user_config_path() {
        if path.is_file() {
            match dotenvy::from_path(&path) {
                Ok(()) => debug!(path = %path.display(), "loaded user config"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable user config")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = FedoraConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.username, "fedoraAdmin");
        assert_eq!(cfg.password, "fedoraAdmin");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.public_base_url.is_none());
    }

    #[test]
    fn reads_all_values_and_trims_trailing_slash() {
        let cfg = FedoraConfig::from_lookup(lookup(&[
            ("FEDORA_BASE_URL", "https://repo.example.org/fcrepo/rest/"),
            ("FEDORA_PUBLIC_URL", "https://public.example.org/fcrepo/rest"),
            ("FEDORA_USERNAME", "alice"),
            ("FEDORA_PASSWORD", "s3cret"),
            ("FEDORA_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "https://repo.example.org/fcrepo/rest");
        assert_eq!(
            cfg.public_base_url.as_deref(),
            Some("https://public.example.org/fcrepo/rest")
        );
        assert_eq!(cfg.username, "alice");
        assert_eq!(cfg.password, "s3cret");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = FedoraConfig::from_lookup(lookup(&[
            ("FEDORA_BASE_URL", "  "),
            ("FEDORA_TIMEOUT_SECS", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(FedoraConfig::from_lookup(lookup(&[("FEDORA_BASE_URL", "ftp://x")])).is_err());
        assert!(FedoraConfig::from_lookup(lookup(&[("FEDORA_TIMEOUT_SECS", "abc")])).is_err());
        assert!(FedoraConfig::from_lookup(lookup(&[("FEDORA_TIMEOUT_SECS", "0")])).is_err());

        let max = u64::MAX.to_string();
        let err = FedoraConfig::from_lookup(lookup(&[("FEDORA_TIMEOUT_SECS", max.as_str())]))
            .unwrap_err();
        assert!(err.to_string().contains("at most"));

        let over = (MAX_TIMEOUT_SECS + 1).to_string();
        let res = FedoraConfig::from_lookup(lookup(&[("FEDORA_TIMEOUT_SECS", over.as_str())]));
        assert!(res.is_err());
    }

    #[test]
    fn accepts_timeout_up_to_one_day() {
        let day = MAX_TIMEOUT_SECS.to_string();
        let cfg = FedoraConfig::from_lookup(lookup(&[("FEDORA_TIMEOUT_SECS", day.as_str())]))
            .unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(86_400));
    }
}
