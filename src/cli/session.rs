use clap::Subcommand;

use crate::{error::AppResult, models::UserProfile, state::AppState};

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Store a bearer token and the account it belongs to
    Login {
        #[arg(long, env = "PETCARE_TOKEN", hide_env_values = true)]
        token: String,
        #[arg(long)]
        email: String,
        #[arg(long = "type", default_value = "customer")]
        user_type: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Forget the token and account
    Logout,
    /// Show who is signed in
    Show,
}

pub fn run(state: &AppState, command: SessionCommand) -> AppResult<()> {
    match command {
        SessionCommand::Login {
            token,
            email,
            user_type,
            name,
            phone,
            address,
        } => {
            state.session.set_token(&token)?;
            state.session.set_user(&UserProfile {
                email: email.clone(),
                user_type,
                name,
                phone,
                address,
            })?;
            println!("Signed in as {email}.");
        }
        SessionCommand::Logout => {
            state.session.sign_out()?;
            println!("Signed out.");
        }
        SessionCommand::Show => match state.session.user()? {
            Some(user) => println!("{} ({})", user.email, user.user_type),
            None => println!("Not signed in."),
        },
    }
    Ok(())
}
