use crate::{
    api,
    auth::{PasswordHasher, TokenConfig},
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub jwt_algorithm: String,
    pub token_ttl_seconds: u64,
    pub bcrypt_cost: u32,
}

impl Args {
    /// Token settings derived from the command line.
    ///
    /// # Errors
    /// Returns an error if the algorithm is not an HMAC variant.
    pub fn token_config(&self) -> Result<TokenConfig> {
        let config = TokenConfig::new(self.jwt_secret.clone())
            .with_algorithm(&self.jwt_algorithm)
            .context("Invalid JWT algorithm")?
            .with_default_ttl(Duration::from_secs(self.token_ttl_seconds));

        Ok(config)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the token settings are invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let token_config = args.token_config()?;
    let hasher = PasswordHasher::new().with_cost(args.bcrypt_cost);

    info!("Database: {}", redact_dsn(&args.dsn));
    debug!("Token settings: {:?}", token_config);

    let result = api::new(args.port, args.dsn, token_config, hasher).await;

    telemetry::shutdown_tracer();

    result
}

/// Hide the password component of a connection string before it is logged.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<unparsable dsn>".to_string(),
    }
}
