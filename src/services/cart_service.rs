use tracing::debug;

use crate::{
    error::{AppError, AppResult, FieldError},
    models::CartEntry,
    storage::CartRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyAction {
    Increase,
    Decrease,
}

pub fn load(carts: &CartRepository) -> AppResult<Vec<CartEntry>> {
    Ok(carts.get()?)
}

/// Merge `delta` into the entry for `product_id`.
///
/// A negative delta removes some; an entry whose quantity reaches zero or
/// below is deleted. New entries are appended, so insertion order is kept.
pub fn add(carts: &CartRepository, product_id: &str, delta: i64) -> AppResult<Vec<CartEntry>> {
    ensure_product_id(product_id)?;
    let entries = apply_add(carts.get()?, product_id, delta);
    carts.set(&entries)?;
    debug!(product_id, delta, lines = entries.len(), "cart updated");
    Ok(entries)
}

/// Deleting an id that is not in the cart is not an error.
pub fn remove(carts: &CartRepository, product_id: &str) -> AppResult<Vec<CartEntry>> {
    let mut entries = carts.get()?;
    entries.retain(|entry| entry.product_id != product_id);
    carts.set(&entries)?;
    debug!(product_id, lines = entries.len(), "cart line removed");
    Ok(entries)
}

/// Step a line up or down by one. Decrease stops at 1 and never deletes the
/// line, unlike [`add`] with a negative delta.
pub fn update_qty(
    carts: &CartRepository,
    product_id: &str,
    action: QtyAction,
) -> AppResult<Vec<CartEntry>> {
    let entries = apply_step(carts.get()?, product_id, action);
    carts.set(&entries)?;
    debug!(product_id, ?action, "cart quantity stepped");
    Ok(entries)
}

pub fn clear(carts: &CartRepository) -> AppResult<()> {
    carts.clear()?;
    debug!("cart cleared");
    Ok(())
}

pub fn item_count(entries: &[CartEntry]) -> u64 {
    entries.iter().map(|entry| u64::from(entry.qty)).sum()
}

pub(crate) fn apply_add(mut entries: Vec<CartEntry>, product_id: &str, delta: i64) -> Vec<CartEntry> {
    match entries.iter().position(|entry| entry.product_id == product_id) {
        Some(index) => {
            let next = i64::from(entries[index].qty).saturating_add(delta);
            if next <= 0 {
                entries.remove(index);
            } else {
                entries[index].qty = u32::try_from(next).unwrap_or(u32::MAX);
            }
        }
        None if delta > 0 => {
            entries.push(CartEntry::new(
                product_id,
                u32::try_from(delta).unwrap_or(u32::MAX),
            ));
        }
        None => {}
    }
    entries
}

pub(crate) fn apply_step(mut entries: Vec<CartEntry>, product_id: &str, action: QtyAction) -> Vec<CartEntry> {
    if let Some(entry) = entries.iter_mut().find(|entry| entry.product_id == product_id) {
        entry.qty = match action {
            QtyAction::Increase => entry.qty.saturating_add(1),
            QtyAction::Decrease => entry.qty.saturating_sub(1).max(1),
        };
    }
    entries
}

fn ensure_product_id(product_id: &str) -> AppResult<()> {
    if product_id.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "productId",
            "product id must not be empty",
        )]));
    }
    Ok(())
}
