use clap::Args;

use super::render;
use crate::{
    error::AppResult,
    services::{
        cart_service,
        hydration_service::CartHydrator,
        shipping_service::{self, ShippingDraft},
    },
    state::AppState,
};

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    province: String,
    #[arg(long)]
    city: String,
    #[arg(long, default_value = "")]
    postal_code: String,
    #[arg(long)]
    phone: String,
}

impl From<CheckoutArgs> for ShippingDraft {
    fn from(args: CheckoutArgs) -> Self {
        ShippingDraft {
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            city: args.city,
            province: args.province,
            postal_code: args.postal_code,
            phone: args.phone,
        }
    }
}

pub async fn run(state: &AppState, args: CheckoutArgs) -> AppResult<()> {
    let draft = ShippingDraft::from(args);
    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;

    let submission = shipping_service::submit_order(state, &draft, &hydrated.items).await?;
    println!("{}", submission.message);
    println!(
        "Order {}: subtotal {}, shipping {}, total {}",
        submission.order_id,
        render::money(submission.totals.subtotal),
        render::money(submission.totals.shipping_fee),
        render::money(submission.totals.total)
    );
    println!("Continue with `petcare pay {}`.", submission.order_id);
    Ok(())
}
