use clap::Args;

use super::render;
use crate::{
    error::AppResult,
    models::AdoptionStatus,
    services::tracking_service,
    state::AppState,
};

#[derive(Debug, Args)]
pub struct TrackArgs {
    order_id: String,
}

#[derive(Debug, Args)]
pub struct AdoptionArgs {
    /// APPLIED, PENDING, APPROVED, COMPLETED or REJECTED
    status: AdoptionStatus,
}

pub async fn track(state: &AppState, args: TrackArgs) -> AppResult<()> {
    let (order, progress) = tracking_service::track_order(state, &args.order_id).await?;
    println!("{}", render::order(&order));
    println!("{}", render::progress(&progress));
    Ok(())
}

pub async fn history(state: &AppState) -> AppResult<()> {
    let orders = tracking_service::order_history(state).await?;
    if orders.is_empty() {
        println!("You have not placed any orders yet.");
    }
    for order in orders {
        let progress = tracking_service::order_progress(order.status);
        println!("{}", render::order(&order));
        println!("{}\n", render::progress(&progress));
    }
    Ok(())
}

pub fn adoption(args: AdoptionArgs) -> AppResult<()> {
    let progress = tracking_service::adoption_progress(args.status);
    println!("{}", render::progress(&progress));
    Ok(())
}
