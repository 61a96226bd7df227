use clap::{Args, Subcommand};

use super::render;
use crate::{
    error::AppResult,
    services::{
        cart_service::{self, QtyAction},
        hydration_service::CartHydrator,
        shipping_service::compute_totals,
    },
    state::AppState,
};

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Only list products in this category
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the cart with current prices
    Show,
    /// Add (or, with a negative quantity, take away) units of a product
    Add {
        product_id: String,
        #[arg(default_value_t = 1, allow_hyphen_values = true)]
        qty: i64,
    },
    /// Remove a product line
    Remove { product_id: String },
    /// Increase a line by one
    Inc { product_id: String },
    /// Decrease a line by one, never below one
    Dec { product_id: String },
    /// Empty the cart
    Clear,
}

pub async fn products(state: &AppState, args: ProductsArgs) -> AppResult<()> {
    let products = state.client.list_products(args.category.as_deref()).await?;
    if products.is_empty() {
        println!("No products found.");
    }
    for product in products {
        println!(
            "{:<24} {:<32} {:>12}  {}",
            product.id,
            product.name,
            render::money(product.price),
            product.category_id.unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn run(state: &AppState, command: CartCommand) -> AppResult<()> {
    match command {
        CartCommand::Show => {}
        CartCommand::Add { product_id, qty } => {
            cart_service::add(&state.carts, &product_id, qty)?;
        }
        CartCommand::Remove { product_id } => {
            cart_service::remove(&state.carts, &product_id)?;
        }
        CartCommand::Inc { product_id } => {
            cart_service::update_qty(&state.carts, &product_id, QtyAction::Increase)?;
        }
        CartCommand::Dec { product_id } => {
            cart_service::update_qty(&state.carts, &product_id, QtyAction::Decrease)?;
        }
        CartCommand::Clear => {
            cart_service::clear(&state.carts)?;
        }
    }
    show(state).await
}

async fn show(state: &AppState) -> AppResult<()> {
    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;
    if let Some(warning) = &hydrated.warning {
        println!("(prices may be out of date: {warning})");
    }
    let totals = compute_totals(&hydrated.items);
    println!("{}", render::cart(&hydrated.items, &totals));
    Ok(())
}
