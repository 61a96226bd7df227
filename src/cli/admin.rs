use clap::Subcommand;

use super::render;
use crate::{error::AppResult, models::OrderStatus, services::tracking_service, state::AppState};

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Move an order to a new status
    SetStatus {
        order_id: String,
        status: OrderStatus,
    },
}

pub async fn run(state: &AppState, command: AdminCommand) -> AppResult<()> {
    match command {
        AdminCommand::SetStatus { order_id, status } => {
            let order = tracking_service::update_status(state, &order_id, status).await?;
            println!("{}", render::order(&order));
            println!(
                "{}",
                render::progress(&tracking_service::order_progress(order.status))
            );
        }
    }
    Ok(())
}
