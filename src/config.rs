use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_REGION: &str = "us-east-1";

const REQUIRED_VARS: [&str; 4] = [
    "MINIO_ENDPOINT",
    "MINIO_ACCESS_KEY",
    "MINIO_SECRET_KEY",
    "MINIO_BUCKET",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_ssl: bool,
    pub region: String,
}

// Credentials stay out of the startup log line.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .field("bucket", &self.bucket)
            .field("use_ssl", &self.use_ssl)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageConfig {
    /// Full endpoint URL handed to the S3 client. A bare `host:port` gets a
    /// scheme chosen by `use_ssl`; an endpoint that already has one is kept.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.trim_end_matches('/').to_string();
        }
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint.trim_end_matches('/'))
    }
}

impl Config {
    /// Load configuration from a local `.env` file (if present) and the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration against an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            storage: StorageConfig {
                endpoint: get("MINIO_ENDPOINT").unwrap_or_default(),
                access_key: get("MINIO_ACCESS_KEY").unwrap_or_default(),
                secret_key: get("MINIO_SECRET_KEY").unwrap_or_default(),
                bucket: get("MINIO_BUCKET").unwrap_or_default(),
                use_ssl: get("MINIO_USE_SSL").as_deref() == Some("true"),
                region: get("MINIO_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> HashMap<String, String> {
        vars(&[
            ("MINIO_ENDPOINT", "localhost:9000"),
            ("MINIO_ACCESS_KEY", "minioadmin"),
            ("MINIO_SECRET_KEY", "minioadmin"),
            ("MINIO_BUCKET", "photos"),
        ])
    }

    fn load(env: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&required()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.storage.use_ssl);
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.storage.bucket, "photos");
    }

    #[test]
    fn test_each_required_variable_is_enforced() {
        for name in REQUIRED_VARS {
            let mut env = required();
            env.remove(name);

            match load(&env) {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, vec![name]),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = required();
        env.insert("MINIO_SECRET_KEY".to_string(), String::new());

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("MINIO_SECRET_KEY"));
    }

    #[test]
    fn test_use_ssl_only_for_literal_true() {
        let mut env = required();
        env.insert("MINIO_USE_SSL".to_string(), "true".to_string());
        assert!(load(&env).unwrap().storage.use_ssl);

        env.insert("MINIO_USE_SSL".to_string(), "TRUE".to_string());
        assert!(!load(&env).unwrap().storage.use_ssl);

        env.insert("MINIO_USE_SSL".to_string(), "1".to_string());
        assert!(!load(&env).unwrap().storage.use_ssl);
    }

    #[test]
    fn test_port_override_and_invalid_port() {
        let mut env = required();
        env.insert("PORT".to_string(), "9090".to_string());
        assert_eq!(load(&env).unwrap().server.port, 9090);

        env.insert("PORT".to_string(), "http".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_endpoint_url_scheme() {
        let mut config = load(&required()).unwrap().storage;
        assert_eq!(config.endpoint_url(), "http://localhost:9000");

        config.use_ssl = true;
        assert_eq!(config.endpoint_url(), "https://localhost:9000");

        config.endpoint = "http://minio.internal:9000/".to_string();
        assert_eq!(config.endpoint_url(), "http://minio.internal:9000");
    }

    #[test]
    fn test_debug_masks_credentials() {
        let config = load(&required()).unwrap();
        let rendered = format!("{:?}", config.storage);

        assert!(!rendered.contains("minioadmin"));
        assert!(rendered.contains("photos"));
    }
}
