//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DB_NAME, ARG_DB_PASSWORD, ARG_DSN, ARG_PORT, auth};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let db_name = matches.get_one::<String>(ARG_DB_NAME).cloned();
    let db_password = matches
        .get_one::<String>(ARG_DB_PASSWORD)
        .map(|password| SecretString::from(password.clone()));

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_name,
        db_password,
        hash_cost: auth_opts.hash_cost,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        session_cookie_secure: auth_opts.session_cookie_secure,
        store_timeout_seconds: auth_opts.store_timeout_seconds,
    }))
}
