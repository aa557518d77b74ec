use std::env;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    /// Identity provider issuer, e.g.
    /// `https://cognito-idp.us-east-1.amazonaws.com/<pool-id>`. The JWKS is
    /// fetched from `{issuer}/.well-known/jwks.json`.
    pub issuer_url: String,
    /// App client id the access tokens must be issued for.
    pub client_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://todos.db?mode=rwc".to_string()),
            issuer_url: env::var("ISSUER_URL").expect("ISSUER_URL must be set"),
            client_id: env::var("CLIENT_ID").expect("CLIENT_ID must be set"),
        }
    }
}
