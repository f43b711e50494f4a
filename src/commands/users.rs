//! `jewelbox users`: account administration (admin only on the backend).

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use jewelbox_client::JewelboxClient;
use jewelbox_core::error::AppError;
use jewelbox_core::types::{User, UserRole};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Show every registered account
    List,
    /// Grant or revoke admin rights
    Role {
        /// Account to change
        id: String,
        /// `admin` or `user`
        role: UserRole,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    id: String,
    email: String,
    phone: String,
    role: UserRole,
    joined: String,
}

impl From<User> for AccountRow {
    fn from(user: User) -> Self {
        Self {
            joined: user
                .created_at
                .as_ref()
                .map(output::timestamp)
                .unwrap_or_default(),
            id: user.id,
            email: user.email,
            phone: user.phone.unwrap_or_default(),
            role: user.role,
        }
    }
}

pub async fn execute(
    args: &UserArgs,
    client: &JewelboxClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    let users = client.users();

    match &args.command {
        UserCommand::List => {
            let rows: Vec<AccountRow> = users.list().await?.into_iter().map(Into::into).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Role { id, role } => {
            let updated = users.update_role(id, *role).await?;
            output::print_success(&format!("{} now has the {} role", updated.email, updated.role));
        }
    }

    Ok(())
}
