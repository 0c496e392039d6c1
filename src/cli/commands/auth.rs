use crate::auth::token::DEFAULT_TOKEN_TTL_SECONDS;
use anyhow::{Context, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_ALGORITHM: &str = "jwt-algorithm";
pub const ARG_TOKEN_TTL: &str = "token-ttl";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub jwt_algorithm: String,
    pub token_ttl_seconds: u64,
    pub bcrypt_cost: u32,
}

impl Options {
    /// Collect the token and password hashing options.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            jwt_secret,
            jwt_algorithm: matches
                .get_one::<String>(ARG_JWT_ALGORITHM)
                .cloned()
                .unwrap_or_else(|| "HS256".to_string()),
            token_ttl_seconds: matches
                .get_one::<u64>(ARG_TOKEN_TTL)
                .copied()
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
            bcrypt_cost: matches
                .get_one::<u32>(ARG_BCRYPT_COST)
                .copied()
                .unwrap_or(bcrypt::DEFAULT_COST),
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Shared secret used to sign and verify access tokens")
                .env("BOOKSTORE_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_ALGORITHM)
                .long(ARG_JWT_ALGORITHM)
                .help("HMAC algorithm for access tokens")
                .env("BOOKSTORE_JWT_ALGORITHM")
                .default_value("HS256")
                .value_parser(PossibleValuesParser::new(["HS256", "HS384", "HS512"])),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Access token TTL in seconds")
                .env("BOOKSTORE_TOKEN_TTL")
                .default_value("900")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt work factor for stored passwords")
                .env("BOOKSTORE_BCRYPT_COST")
                .default_value("12")
                .value_parser(clap::value_parser!(u32).range(4..=31)),
        )
}
