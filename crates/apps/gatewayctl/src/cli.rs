//! Command-line arguments

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gatewayctl", version, about = "Page- and thread-oriented Gmail access")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of message summaries
    List {
        #[command(flatten)]
        auth: AuthArgs,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Messages per page (defaults to the configured page size)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show a message with its decoded body and replies
    Show {
        #[command(flatten)]
        auth: AuthArgs,
        message_id: String,
    },
    /// Reply to a message inside its thread
    Reply {
        #[command(flatten)]
        auth: AuthArgs,
        message_id: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Store an access token for an email address
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// Forget the stored token for an email address
    Logout {
        #[arg(long)]
        email: String,
    },
}

/// Where the bearer token comes from
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Bearer token to use directly
    #[arg(long, conflicts_with = "email")]
    pub token: Option<String>,
    /// Look the token up in the token store
    #[arg(long)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["gatewayctl", "list", "--token", "abc"]).unwrap();
        match cli.command {
            Command::List { auth, page, per_page } => {
                assert_eq!(auth.token.as_deref(), Some("abc"));
                assert_eq!(page, 1);
                assert_eq!(per_page, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reply_requires_subject_and_message() {
        assert!(Cli::try_parse_from(["gatewayctl", "reply", "m1", "--subject", "Hi"]).is_err());
        let cli = Cli::try_parse_from([
            "gatewayctl", "reply", "m1", "--email", "a@x.com", "--subject", "Hi", "--message", "Body",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Reply { .. }));
    }

    #[test]
    fn test_token_and_email_conflict() {
        let result = Cli::try_parse_from([
            "gatewayctl", "show", "m1", "--token", "abc", "--email", "a@x.com",
        ]);
        assert!(result.is_err());
    }
}
