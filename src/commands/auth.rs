//! Session and account commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use jewelbox_client::JewelboxClient;
use jewelbox_client::api::{ChangePasswordRequest, ChangePhoneRequest, SignInRequest, SignUpRequest};
use jewelbox_core::error::AppError;

use super::input_error;
use crate::output::{self, OutputFormat};

/// Arguments for auth commands
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Auth subcommand
    #[command(subcommand)]
    pub command: AuthCommand,
}

/// Auth subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in with email and password
    Signin {
        /// Account email (will prompt if not provided)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    Signup {
        /// Account email (will prompt if not provided)
        #[arg(short, long)]
        email: Option<String>,
        /// Contact phone
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Forget the saved session
    Signout,
    /// Show the signed-in account
    Whoami,
    /// Change the account password
    Password,
    /// Change the contact phone
    Phone {
        /// New phone number
        phone: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WhoamiView {
    id: String,
    email: String,
    phone: Option<String>,
    role: String,
    session_expires: Option<String>,
}

/// Execute auth commands
pub async fn execute(
    args: &AuthArgs,
    client: &JewelboxClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AuthCommand::Signin { email } => {
            let request = SignInRequest {
                email: prompt_email(email.as_deref())?,
                password: dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .map_err(input_error)?,
            };
            let pair = client.sign_in(&request).await?;
            output::print_success(&format!("Signed in as {}", request.email));
            tracing::debug!(user_id = %pair.user_id, "Session stored");
        }
        AuthCommand::Signup { email, phone } => {
            let request = SignUpRequest {
                email: prompt_email(email.as_deref())?,
                password: dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(input_error)?,
                phone: phone.clone().filter(|p| !p.is_empty()),
            };
            client.sign_up(&request).await?;
            output::print_success(&format!("Account created for {}", request.email));
        }
        AuthCommand::Signout => {
            if client.sign_out().await.is_persisted() {
                output::print_success("Signed out");
            } else {
                output::print_warning("Signed out, but the saved session could not be removed");
            }
        }
        AuthCommand::Whoami => {
            if !client.tokens().is_authenticated() {
                output::print_warning("Not signed in");
                return Ok(());
            }

            let user = client.account().me().await?;
            let view = WhoamiView {
                id: user.id,
                email: user.email,
                phone: user.phone,
                role: user.role.to_string(),
                session_expires: client
                    .tokens()
                    .current_tokens()
                    .map(|pair| pair.access_token_expiry.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            };

            output::print_record(
                &[
                    ("ID", view.id.clone()),
                    ("Email", view.email.clone()),
                    ("Phone", view.phone.clone().unwrap_or_else(|| "-".to_string())),
                    ("Role", view.role.clone()),
                    (
                        "Token expires",
                        view.session_expires.clone().unwrap_or_else(|| "-".to_string()),
                    ),
                ],
                &view,
                format,
            );
        }
        AuthCommand::Password => {
            let request = ChangePasswordRequest {
                old_password: dialoguer::Password::new()
                    .with_prompt("Current password")
                    .interact()
                    .map_err(input_error)?,
                new_password: dialoguer::Password::new()
                    .with_prompt("New password")
                    .with_confirmation("Confirm new password", "Passwords do not match")
                    .interact()
                    .map_err(input_error)?,
            };
            client.account().change_password(&request).await?;
            output::print_success("Password changed");
        }
        AuthCommand::Phone { phone } => {
            let request = ChangePhoneRequest {
                phone: phone.clone(),
            };
            client.account().change_phone(&request).await?;
            output::print_success(&format!("Phone changed to {}", phone));
        }
    }

    Ok(())
}

fn prompt_email(email: Option<&str>) -> Result<String, AppError> {
    match email {
        Some(e) => Ok(e.to_string()),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(input_error),
    }
}
