use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::{
    client::ApiClient,
    models::{CartEntry, HydratedCartItem, Product},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated {
    pub items: Vec<HydratedCartItem>,
    /// True when the product refresh failed and the previous snapshot was used.
    pub stale: bool,
    pub warning: Option<String>,
}

/// Joins cart lines against catalog data, keeping the last good product
/// snapshot across failed refreshes.
#[derive(Debug, Default)]
pub struct CartHydrator {
    snapshot: Vec<Product>,
}

impl CartHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &[Product] {
        &self.snapshot
    }

    pub async fn hydrate(&mut self, client: &ApiClient, entries: &[CartEntry]) -> Hydrated {
        if entries.is_empty() {
            return Hydrated {
                items: Vec::new(),
                stale: false,
                warning: None,
            };
        }

        let ids = distinct_ids(entries);
        match client.cart_products(&ids).await {
            Ok(products) => {
                debug!(
                    requested = ids.len(),
                    found = products.len(),
                    "cart products refreshed"
                );
                self.snapshot = products;
                Hydrated {
                    items: merge(entries, &self.snapshot),
                    stale: false,
                    warning: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "cart product refresh failed, using last snapshot");
                Hydrated {
                    items: merge(entries, &self.snapshot),
                    stale: true,
                    warning: Some(err.to_string()),
                }
            }
        }
    }
}

pub fn distinct_ids(entries: &[CartEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.product_id.as_str()))
        .map(|entry| entry.product_id.clone())
        .collect()
}

/// Left join from cart lines to products by id. Lines without a matching
/// product stay in the result, marked unavailable with zero price.
pub fn merge(entries: &[CartEntry], products: &[Product]) -> Vec<HydratedCartItem> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();
    entries
        .iter()
        .map(|entry| match by_id.get(entry.product_id.as_str()) {
            Some(product) => HydratedCartItem {
                product_id: entry.product_id.clone(),
                qty: entry.qty,
                name: product.name.clone(),
                price: product.price.max(0),
                image: product.images.first().cloned(),
                category_id: product.category_id.clone(),
                available: true,
            },
            None => HydratedCartItem {
                product_id: entry.product_id.clone(),
                qty: entry.qty,
                name: String::new(),
                price: 0,
                image: None,
                category_id: None,
                available: false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {id}"),
            description: None,
            price,
            images: vec![format!("https://img.example/{id}.jpg")],
            category_id: Some("food".into()),
            stock: Some(10),
        }
    }

    #[test]
    fn merge_keeps_cart_order_and_joins_by_id() {
        let entries = vec![CartEntry::new("B", 1), CartEntry::new("A", 2)];
        let items = merge(&entries, &[product("A", 100), product("B", 250)]);
        assert_eq!(items[0].product_id, "B");
        assert_eq!(items[0].price, 250);
        assert_eq!(items[1].line_total(), 200);
        assert_eq!(items[1].image.as_deref(), Some("https://img.example/A.jpg"));
    }

    #[test]
    fn missing_product_contributes_nothing() {
        let entries = vec![CartEntry::new("gone", 3), CartEntry::new("A", 1)];
        let items = merge(&entries, &[product("A", 100)]);
        assert_eq!(items.len(), 2);
        assert!(!items[0].available);
        assert_eq!(items[0].name, "");
        assert_eq!(items[0].line_total(), 0);
        let subtotal: i64 = items.iter().map(HydratedCartItem::line_total).sum();
        assert_eq!(subtotal, 100);
    }

    #[test]
    fn merge_with_no_products_does_not_panic() {
        let items = merge(&[CartEntry::new("A", 1)], &[]);
        assert_eq!(items.len(), 1);
        assert!(!items[0].available);
    }

    #[test]
    fn distinct_ids_dedupes_in_order() {
        let entries = vec![
            CartEntry::new("A", 1),
            CartEntry::new("B", 1),
            CartEntry::new("A", 2),
        ];
        assert_eq!(distinct_ids(&entries), vec!["A", "B"]);
    }
}
