//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        jwt_algorithm: auth_opts.jwt_algorithm,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        bcrypt_cost: auth_opts.bcrypt_cost,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("BOOKSTORE_PORT", None::<&str>),
                ("BOOKSTORE_TOKEN_TTL", None),
                ("BOOKSTORE_JWT_ALGORITHM", None),
                ("BOOKSTORE_BCRYPT_COST", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "bookstore",
                    "--dsn",
                    "postgres://localhost/bookstore",
                    "--jwt-secret",
                    "s3cr3t",
                    "--bcrypt-cost",
                    "10",
                ]);

                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.dsn, "postgres://localhost/bookstore");
                    assert_eq!(args.jwt_secret.expose_secret(), "s3cr3t");
                    assert_eq!(args.jwt_algorithm, "HS256");
                    assert_eq!(args.token_ttl_seconds, 900);
                    assert_eq!(args.bcrypt_cost, 10);
                }
            },
        );
    }
}
