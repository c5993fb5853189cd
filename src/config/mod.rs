use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Optional cap on the `size` pagination parameter. The API enforces
    /// none by default; deployments can opt in without an API change.
    pub max_page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HS256 signing secret for identity tokens.
    pub token_secret: String,
    /// Token lifetime embedded at issuance.
    pub token_ttl_secs: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, specific env vars win
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("STORE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("STORE_CONNECT_TIMEOUT_SECS") {
            self.store.connect_timeout_secs = v.parse().unwrap_or(self.store.connect_timeout_secs);
        }
        if let Ok(v) = env::var("STORE_MAX_PAGE_SIZE") {
            self.store.max_page_size = v.parse().ok();
        }

        if let Ok(v) = env::var("ACCESS_TOKEN_SECRET") {
            self.security.token_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_TTL_SECS") {
            self.security.token_ttl_secs = v.parse().unwrap_or(self.security.token_ttl_secs);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            store: StoreConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
                max_page_size: None,
            },
            security: SecurityConfig {
                token_secret: "kotha-dev-secret".to_string(),
                token_ttl_secs: 3600,
                cors_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            store: StoreConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
                max_page_size: None,
            },
            security: SecurityConfig {
                // Must come from ACCESS_TOKEN_SECRET; issuance fails on empty
                token_secret: String::new(),
                token_ttl_secs: 3600,
                cors_origins: vec!["https://staging.kotha.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            store: StoreConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
                max_page_size: None,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_secs: 3600,
                cors_origins: vec!["https://kotha.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
