//! `user` subcommand: create accounts and issue API tokens.

use crate::db::Database;
use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

/// Arguments for the user subcommand
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user and its profile, and print a fresh token
    Add {
        username: String,

        /// Staff users can list every profile
        #[arg(long)]
        staff: bool,
    },

    /// Issue an additional token for an existing user
    Token { username: String },
}

/// Run a user action, returning the line to print.
pub fn run_user(db: &Database, args: &UserArgs) -> Result<String> {
    match &args.action {
        UserAction::Add { username, staff } => {
            let (user, profile) = db
                .create_user(username, *staff)
                .with_context(|| format!("creating user {}", username))?;
            let token = db.issue_token(user.id)?;
            Ok(format!(
                "created user {} (id {}, profile {})\ntoken: {}",
                user.username, user.id, profile.id, token
            ))
        }
        UserAction::Token { username } => {
            let Some(user) = db.get_user_by_username(username)? else {
                bail!("no such user: {}", username);
            };
            let token = db.issue_token(user.id)?;
            Ok(format!("token: {}", token))
        }
    }
}
