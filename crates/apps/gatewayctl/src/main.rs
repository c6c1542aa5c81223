//! gatewayctl - command-line front end for the mail gateway
//!
//! Every command prints JSON on stdout. Failures print a JSON error object on
//! stderr and exit non-zero.

mod cli;

use anyhow::Result;
use clap::Parser;
use gateway::error::Result as GatewayResult;
use gateway::{ErrorKind, GatewayConfig, GatewayError, MailGateway, SqliteTokenStore, TokenStore};
use log::{error, info, warn};
use serde::Serialize;

use cli::{AuthArgs, Cli, Command};

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    error: String,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let body = error_body(&e);
        match serde_json::to_string_pretty(&body) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", body.error),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = GatewayConfig::load()?;

    match cli.command {
        Command::Login {
            email,
            access_token,
            refresh_token,
        } => {
            let store = open_token_store(&config)?;
            let user = store
                .upsert(&email, &access_token, refresh_token.as_deref())
                .map_err(GatewayError::from)?;
            info!("Stored token for {}", user.email);
            print_json(&serde_json::json!({
                "email": user.email,
                "updatedAt": user.updated_at,
            }))
        }
        Command::Logout { email } => {
            let store = open_token_store(&config)?;
            let removed = store.delete(&email).map_err(GatewayError::from)?;
            info!("Removed token for {}: {}", email, removed);
            print_json(&serde_json::json!({ "email": email, "removed": removed }))
        }
        Command::List {
            auth,
            page,
            per_page,
        } => {
            let token = resolve_token(&config, &auth)?;
            let per_page = per_page.unwrap_or(config.default_page_size);
            let gateway = MailGateway::gmail(config)?;
            print_json(&gateway.list(&token, page, per_page)?)
        }
        Command::Show { auth, message_id } => {
            let token = resolve_token(&config, &auth)?;
            let gateway = MailGateway::gmail(config)?;
            print_json(&gateway.detail(&token, &message_id)?)
        }
        Command::Reply {
            auth,
            message_id,
            subject,
            message,
        } => {
            let token = resolve_token(&config, &auth)?;
            let gateway = MailGateway::gmail(config)?;
            print_json(&gateway.send_reply(&token, &message_id, &subject, &message)?)
        }
    }
}

/// Open the SQLite token store; failures surface as [`GatewayError::Storage`]
fn open_token_store(config: &GatewayConfig) -> GatewayResult<SqliteTokenStore> {
    let path = config.token_db_path().ok_or_else(|| GatewayError::Storage {
        message: "could not determine token database location".to_string(),
    })?;
    Ok(SqliteTokenStore::new(path)?)
}

/// Pick the bearer token from `--token`, or from the store via `--email`
///
/// With neither flag the token is empty and the gateway reports a missing
/// credential. An email with no stored token is a missing credential too.
fn resolve_token(config: &GatewayConfig, auth: &AuthArgs) -> GatewayResult<String> {
    if let Some(token) = &auth.token {
        return Ok(token.clone());
    }
    let Some(email) = &auth.email else {
        return Ok(String::new());
    };

    let store = open_token_store(config)?;
    match store.find_by_email(email)? {
        Some(user) => Ok(user.access_token),
        None => {
            warn!("No stored token for {}; run `gatewayctl login` first", email);
            Err(GatewayError::MissingCredential)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn error_body(err: &anyhow::Error) -> ErrorBody {
    let status = match err.downcast_ref::<GatewayError>().map(GatewayError::kind) {
        Some(ErrorKind::ClientInput) => 400,
        Some(ErrorKind::NotFound) => 404,
        Some(ErrorKind::ServerSide) | None => 500,
    };
    ErrorBody {
        status,
        error: format!("{:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_follows_kind() {
        let err = anyhow::Error::new(GatewayError::MissingCredential);
        assert_eq!(error_body(&err).status, 400);

        let err = anyhow::Error::new(GatewayError::NotFound {
            resource: "message m1".to_string(),
        });
        assert_eq!(error_body(&err).status, 404);

        let err = anyhow::anyhow!("disk full");
        assert_eq!(error_body(&err).status, 500);
    }

    #[test]
    fn test_explicit_token_wins() {
        let config = GatewayConfig::default();
        let auth = AuthArgs {
            token: Some("abc".to_string()),
            email: None,
        };
        assert_eq!(resolve_token(&config, &auth).unwrap(), "abc");
    }

    #[test]
    fn test_no_token_source_yields_empty_token() {
        let config = GatewayConfig::default();
        let auth = AuthArgs {
            token: None,
            email: None,
        };
        assert_eq!(resolve_token(&config, &auth).unwrap(), "");
    }

    #[test]
    fn test_token_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatewayConfig {
            token_db: Some(dir.path().join("tokens.test.sqlite")),
            ..GatewayConfig::default()
        };
        open_token_store(&config)
            .unwrap()
            .upsert("a@x.com", "stored-token", None)
            .unwrap();

        let auth = AuthArgs {
            token: None,
            email: Some("a@x.com".to_string()),
        };
        assert_eq!(resolve_token(&config, &auth).unwrap(), "stored-token");

        let auth = AuthArgs {
            token: None,
            email: Some("nobody@x.com".to_string()),
        };
        let err = resolve_token(&config, &auth).unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredential));
        assert_eq!(error_body(&anyhow::Error::new(err)).status, 400);
    }

    #[test]
    fn test_unopenable_store_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatewayConfig {
            token_db: Some(dir.path().join("missing-dir").join("tokens.test.sqlite")),
            ..GatewayConfig::default()
        };
        let auth = AuthArgs {
            token: None,
            email: Some("a@x.com".to_string()),
        };

        let err = resolve_token(&config, &auth).unwrap_err();

        assert!(matches!(err, GatewayError::Storage { .. }));
        assert_eq!(error_body(&anyhow::Error::new(err)).status, 500);
    }
}
