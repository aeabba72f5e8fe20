use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let secret = matches
        .get_one::<String>("secret")
        .map(|s| SecretString::from(s.clone()))
        .context("missing required argument: --secret")?;

    let origins = matches
        .get_many::<String>("origin")
        .map(|origins| origins.cloned().collect())
        .unwrap_or_default();

    let globals = GlobalArgs::new(secret)
        .with_origins(origins)
        .with_token_ttl_seconds(
            matches
                .get_one::<i64>("token-ttl")
                .copied()
                .unwrap_or(crate::auth::DEFAULT_TOKEN_TTL_SECONDS),
        )
        .with_cookie_secure(matches.get_flag("cookie-secure"));

    let dsn = matches
        .get_one::<String>("dsn")
        .map(ToString::to_string)
        .context("missing required argument: --dsn")?;

    let action = match matches.subcommand() {
        Some(("create-admin", sub)) => Action::CreateAdmin {
            dsn,
            username: sub
                .get_one::<String>("username")
                .map(ToString::to_string)
                .context("missing required argument: --username")?,
            password: sub
                .get_one::<String>("password")
                .map(ToString::to_string)
                .context("missing required argument: --password")?,
        },
        _ => Action::Server {
            port: matches.get_one::<u16>("port").copied().unwrap_or(8000),
            dsn,
        },
    };

    Ok((action, globals))
}
