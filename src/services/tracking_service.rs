use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{AdoptionStatus, Order, OrderStatus},
    state::AppState,
};

/// Everything a progress bar needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub stages: Vec<&'static str>,
    pub current: Option<usize>,
    pub percent: u8,
    /// Cancelled/Rejected: drawn in the terminal style instead of the normal fill.
    pub absorbing: bool,
    pub label: &'static str,
}

fn percent_for(index: usize, stages: usize) -> u8 {
    if stages <= 1 {
        return 100;
    }
    u8::try_from(index.min(stages - 1) * 100 / (stages - 1)).unwrap_or(100)
}

pub fn order_progress(status: OrderStatus) -> ProgressView {
    let stages = OrderStatus::STAGES.iter().map(OrderStatus::as_str).collect();
    let current = status.stage_index();
    ProgressView {
        stages,
        current,
        percent: current.map_or(0, |i| percent_for(i, OrderStatus::STAGES.len())),
        absorbing: status.is_absorbing(),
        label: status.as_str(),
    }
}

pub fn adoption_progress(status: AdoptionStatus) -> ProgressView {
    let track = status.track();
    let current = track.iter().position(|stage| *stage == status);
    ProgressView {
        stages: track.iter().map(AdoptionStatus::as_str).collect(),
        current,
        percent: current.map_or(0, |i| percent_for(i, track.len())),
        absorbing: status.is_absorbing(),
        label: status.as_str(),
    }
}

pub async fn track_order(state: &AppState, order_id: &str) -> AppResult<(Order, ProgressView)> {
    let order = state.client.get_order(order_id).await?;
    debug!(order_id, status = %order.status, "order tracked");
    let progress = order_progress(order.status);
    Ok((order, progress))
}

/// Orders placed by the signed-in account.
pub async fn order_history(state: &AppState) -> AppResult<Vec<Order>> {
    if !state.client.has_token() {
        return Err(AppError::Unauthenticated);
    }
    let user = state.session.user()?.ok_or(AppError::Unauthenticated)?;
    state.client.orders_by_email(&user.email).await
}

/// Staff-only status change, checked against the transition rules before the
/// request is sent.
pub async fn update_status(state: &AppState, order_id: &str, next: OrderStatus) -> AppResult<Order> {
    let user = state.session.user()?.ok_or(AppError::Unauthenticated)?;
    if user.is_customer() {
        return Err(AppError::Forbidden);
    }

    let current = state.client.get_order(order_id).await?;
    if !current.status.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "cannot move order {order_id} from {} to {next}",
            current.status
        )));
    }

    let updated = state.client.update_order_status(order_id, next).await?;
    info!(order_id, from = %current.status, to = %updated.status, "order status updated");
    Ok(updated)
}
