use clap::{Parser, Subcommand};

use crate::{config::AppConfig, error::AppError, state::AppState};

mod admin;
mod cart;
mod checkout;
mod orders;
mod payment;
pub mod render;
mod session;

#[derive(Debug, Parser)]
#[command(name = "petcare", about = "Central Pet Care shop client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products(cart::ProductsArgs),
    /// Inspect or change the local cart
    #[command(subcommand)]
    Cart(cart::CartCommand),
    /// Validate shipping details and place the order
    Checkout(checkout::CheckoutArgs),
    /// Pay for a placed order
    Pay(payment::PayArgs),
    /// Show the last payment result
    Confirmation(payment::ConfirmationArgs),
    /// Show progress for one order
    Track(orders::TrackArgs),
    /// List orders for the signed-in account
    Orders,
    /// Render the progress bar for an adoption application status
    Adoption(orders::AdoptionArgs),
    #[command(subcommand)]
    Admin(admin::AdminCommand),
    #[command(subcommand)]
    Session(session::SessionCommand),
}

impl Cli {
    pub async fn run(self, config: AppConfig) -> anyhow::Result<()> {
        let state = AppState::open(config).map_err(report)?;
        let result = match self.command {
            Commands::Products(args) => cart::products(&state, args).await,
            Commands::Cart(command) => cart::run(&state, command).await,
            Commands::Checkout(args) => checkout::run(&state, args).await,
            Commands::Pay(args) => payment::pay(&state, args).await,
            Commands::Confirmation(args) => payment::confirmation(&state, args),
            Commands::Track(args) => orders::track(&state, args).await,
            Commands::Orders => orders::history(&state).await,
            Commands::Adoption(args) => orders::adoption(args),
            Commands::Admin(command) => admin::run(&state, command).await,
            Commands::Session(command) => session::run(&state, command),
        };
        result.map_err(report)
    }
}

/// Print what the user needs to see for `err` and hand it back for the exit code.
fn report(err: AppError) -> anyhow::Error {
    for field in err.field_errors() {
        println!("  ✗ {field}");
    }
    if let AppError::Rejected { errors, .. } = &err {
        for detail in errors {
            println!("  ✗ {detail}");
        }
    }
    if err.is_fatal() {
        println!("Returning to the home page.");
    }
    anyhow::Error::new(err)
}
