use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub store_path: PathBuf,
    pub request_timeout: Duration,
    pub payment_timeout: Duration,
    pub sandbox_host: String,
    pub sandbox_port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, falling back to defaults
    /// for anything missing or unparsable.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("PETCARE_API_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("PETCARE_API_URL must be an http(s) URL, got {api_url}");
        }

        let store_path = lookup("PETCARE_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".petcare/store.json"));
        let request_timeout = lookup("PETCARE_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let payment_timeout = lookup("PETCARE_PAYMENT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let sandbox_host = lookup("SANDBOX_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let sandbox_port = lookup("SANDBOX_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);

        Ok(Self {
            api_url,
            store_path,
            request_timeout: Duration::from_secs(request_timeout),
            payment_timeout: Duration::from_secs(payment_timeout),
            sandbox_host,
            sandbox_port,
        })
    }
}
