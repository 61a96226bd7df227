//! Plain-text views printed by the CLI.

use crate::{
    models::{HydratedCartItem, Order, PaymentResult},
    services::{
        confirmation_service::ConfirmationView, shipping_service::CartTotals,
        tracking_service::ProgressView,
    },
};

pub fn money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("Rs. {sign}{grouped}")
}

pub fn cart(items: &[HydratedCartItem], totals: &CartTotals) -> String {
    if items.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = String::new();
    for item in items {
        let name = if item.available {
            item.name.as_str()
        } else {
            "(no longer available)"
        };
        out.push_str(&format!(
            "{:<24} {:<32} x{:<4} {:>14}\n",
            item.product_id,
            name,
            item.qty,
            money(item.line_total())
        ));
    }
    out.push_str(&format!("{:>78}\n", format!("Subtotal: {}", money(totals.subtotal))));
    out.push_str(&format!("{:>78}\n", format!("Shipping: {}", money(totals.shipping_fee))));
    out.push_str(&format!("{:>78}", format!("Total: {}", money(totals.total))));
    out
}

pub fn progress(view: &ProgressView) -> String {
    if view.absorbing && view.current.is_none() {
        return format!("[ {} ]  this order will not progress further", view.label.to_uppercase());
    }
    const WIDTH: usize = 40;
    let filled = WIDTH * usize::from(view.percent) / 100;
    let fill = if view.absorbing { 'x' } else { '#' };
    let bar: String = std::iter::repeat_n(fill, filled)
        .chain(std::iter::repeat_n('-', WIDTH - filled))
        .collect();
    let stages = view
        .stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            if Some(i) == view.current {
                format!("[{stage}]")
            } else {
                (*stage).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ");
    format!("[{bar}] {:>3}%\n{stages}", view.percent)
}

pub fn order(order: &Order) -> String {
    let mut out = format!(
        "Order {}  ({})\n  {}\n  {}\n  {}\n",
        order.order_id, order.status, order.name, order.address, order.phone
    );
    for item in &order.ordered_items {
        out.push_str(&format!(
            "  - {} x{} @ {}\n",
            item.name,
            item.quantity,
            money(item.price)
        ));
    }
    out.push_str(&format!("  Total: {}", money(order.total_amount)));
    out
}

fn receipt(result: &PaymentResult) -> String {
    let mut out = format!(
        "  Order:    {}\n  Amount:   {}\n  Method:   {}\n",
        result.order_id,
        money(result.amount),
        result.payment_method.label()
    );
    if let Some(id) = &result.transaction_id {
        out.push_str(&format!("  Payment:  {id}\n"));
    }
    if let Some(last4) = &result.card_last4 {
        out.push_str(&format!("  Card:     **** **** **** {last4}\n"));
    }
    let customer = &result.customer_info;
    out.push_str(&format!("  Customer: {} ({})\n", customer.name, customer.phone));
    out.push_str(&format!("  Ship to:  {}", customer.address));
    out
}

pub fn confirmation(view: &ConfirmationView) -> String {
    match view {
        ConfirmationView::Success(result) => {
            format!("Payment successful. {}\n{}", result.message, receipt(result))
        }
        ConfirmationView::Failure(result) => {
            let mut out = format!("Payment failed. {}\n", result.message);
            for error in &result.errors {
                out.push_str(&format!("  ✗ {error}\n"));
            }
            out.push_str(&receipt(result));
            out.push_str(&format!(
                "\nRetry with `petcare pay {}` or go back with `petcare confirmation --back-to-shop`.",
                result.order_id
            ));
            out
        }
        ConfirmationView::AwaitingPayment(result) => format!(
            "Order {} is waiting for payment. Continue with `petcare pay {}`.\n{}",
            result.order_id,
            result.order_id,
            receipt(result)
        ),
        ConfirmationView::Missing => "No payment data found.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::OrderStatus, services::tracking_service::order_progress};

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0), "Rs. 0");
        assert_eq!(money(4300), "Rs. 4,300");
        assert_eq!(money(1234567), "Rs. 1,234,567");
        assert_eq!(money(-500), "Rs. -500");
    }

    #[test]
    fn shipped_bar_is_three_quarters_full() {
        let text = progress(&order_progress(OrderStatus::Shipped));
        assert!(text.starts_with(&format!("[{}{}]", "#".repeat(30), "-".repeat(10))));
        assert!(text.contains("[Shipped]"));
        assert!(text.contains(" 75%"));
    }

    #[test]
    fn cancelled_renders_terminal_branch() {
        let text = progress(&order_progress(OrderStatus::Cancelled));
        assert!(text.starts_with("[ CANCELLED ]"));
    }

    #[test]
    fn missing_confirmation_message() {
        assert_eq!(confirmation(&ConfirmationView::Missing), "No payment data found.");
    }
}
