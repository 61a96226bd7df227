use clap::{Args, ValueEnum};

use super::render;
use crate::{
    error::AppResult,
    models::PaymentMethod,
    services::{
        confirmation_service,
        payment_service::{CardDetails, PaymentAttempt},
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Card,
    Cod,
    BankTransfer,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Card => PaymentMethod::Card,
            MethodArg::Cod => PaymentMethod::CashOnDelivery,
            MethodArg::BankTransfer => PaymentMethod::BankTransfer,
        }
    }
}

#[derive(Debug, Args)]
pub struct PayArgs {
    order_id: Option<String>,
    #[arg(long, value_enum, default_value_t = MethodArg::Card)]
    method: MethodArg,
    #[arg(long, default_value = "")]
    card_number: String,
    /// MM/YY
    #[arg(long, default_value = "")]
    expiry: String,
    #[arg(long, default_value = "")]
    cvv: String,
    #[arg(long, default_value = "")]
    name: String,
}

#[derive(Debug, Args)]
pub struct ConfirmationArgs {
    /// Discard the stored result and return to the shop
    #[arg(long)]
    back_to_shop: bool,
}

pub async fn pay(state: &AppState, args: PayArgs) -> AppResult<()> {
    let mut attempt = PaymentAttempt::new();
    let order = attempt.load_order(state, args.order_id.as_deref()).await?;
    println!("{}", render::order(order));

    let method = PaymentMethod::from(args.method);
    let result = match method {
        PaymentMethod::Card => {
            let card = CardDetails {
                number: args.card_number,
                expiry: args.expiry,
                cvv: args.cvv,
                holder_name: args.name,
            };
            attempt.submit_card(state, &card).await?
        }
        other => attempt.confirm_offline(state, other)?,
    };
    println!();
    let view = if result.success {
        confirmation_service::ConfirmationView::Success(result)
    } else {
        confirmation_service::ConfirmationView::Failure(result)
    };
    println!("{}", render::confirmation(&view));
    Ok(())
}

pub fn confirmation(state: &AppState, args: ConfirmationArgs) -> AppResult<()> {
    if args.back_to_shop {
        confirmation_service::back_to_shop(&state.session)?;
        println!("Back to the shop.");
        return Ok(());
    }
    let view = confirmation_service::view(&state.session)?;
    println!("{}", render::confirmation(&view));
    Ok(())
}
