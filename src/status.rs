//! Order arithmetic shared by sales and purchases: line totals, fulfillment
//! status, payment status and the payment guard.
//!
//! Every function here is pure. Services call them on create, on edit and on
//! each payment so the derived fields never drift apart.

use rust_decimal::Decimal;

use crate::{
    errors::ServiceError,
    models::{FulfillmentStatus, OrderItem, PaymentStatus},
};

/// Ordered minus fulfilled, saturating at zero.
pub fn quantity_remaining(quantity_ordered: u32, quantity_fulfilled: u32) -> u32 {
    quantity_ordered.saturating_sub(quantity_fulfilled)
}

/// Quantity times unit price; fails instead of overflowing.
pub fn line_subtotal(quantity_ordered: u32, unit_price: Decimal) -> Result<Decimal, ServiceError> {
    Decimal::from(quantity_ordered)
        .checked_mul(unit_price)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "line total of {} x {} is too large",
                quantity_ordered, unit_price
            ))
        })
}

pub fn order_total(items: &[OrderItem]) -> Result<Decimal, ServiceError> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        let subtotal = line_subtotal(item.quantity_ordered, item.unit_price)?;
        total
            .checked_add(subtotal)
            .ok_or_else(|| ServiceError::ValidationError("order total is too large".to_string()))
    })
}

/// `Completed` only when every line has nothing left to deliver.
///
/// An order without lines has delivered nothing, so it stays `Pending`.
pub fn derive_fulfillment_status(items: &[OrderItem]) -> FulfillmentStatus {
    if items.is_empty() {
        return FulfillmentStatus::Pending;
    }

    let all_delivered = items
        .iter()
        .all(|item| quantity_remaining(item.quantity_ordered, item.quantity_fulfilled) == 0);

    if all_delivered {
        FulfillmentStatus::Completed
    } else {
        FulfillmentStatus::Pending
    }
}

/// Maps a total and a cumulative paid amount to a payment status.
///
/// Total over all inputs: a paid amount at or above the total is `Fully Paid`
/// even when it overshoots. Use [`reconcile_payment`] to keep stored orders
/// from ever overshooting.
pub fn derive_payment_status(total: Decimal, paid: Decimal) -> PaymentStatus {
    if paid <= Decimal::ZERO {
        PaymentStatus::Unpaid
    } else if paid < total {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::FullyPaid
    }
}

pub fn outstanding_balance(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Validates a new payment against an order and returns the new cumulative paid amount.
pub fn reconcile_payment(
    total: Decimal,
    already_paid: Decimal,
    amount: Decimal,
) -> Result<Decimal, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::PaymentRejected(format!(
            "payment amount must be positive, got {}",
            amount
        )));
    }

    let balance = outstanding_balance(total, already_paid);
    if amount > balance {
        return Err(ServiceError::PaymentRejected(format!(
            "payment of {} exceeds outstanding balance of {}",
            amount, balance
        )));
    }

    Ok(already_paid + amount)
}
