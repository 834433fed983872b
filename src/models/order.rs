use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::payment::{OrderPayment, PaymentInput};
use super::product::ProductName;
use super::validate_not_blank;
use crate::{date_filter::Dated, errors::ServiceError, status, store::Record};

/// Which ledger an order belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum OrderKind {
    Sale,
    Purchase,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum FulfillmentStatus {
    Pending,
    Completed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum PaymentStatus {
    Unpaid,
    #[serde(rename = "Partially Paid")]
    #[strum(to_string = "Partially Paid", serialize = "partially_paid")]
    PartiallyPaid,
    #[serde(rename = "Fully Paid")]
    #[strum(to_string = "Fully Paid", serialize = "fully_paid")]
    FullyPaid,
}

/// Whether the first payment is taken when the order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentTiming {
    #[default]
    Now,
    Later,
}

/// One order line. `subtotal` and `quantity_remaining` are derived, never taken from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductName,
    pub quantity_ordered: u32,
    pub quantity_fulfilled: u32,
    pub quantity_remaining: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderItem {
    pub fn new(
        product: ProductName,
        quantity_ordered: u32,
        quantity_fulfilled: u32,
        unit_price: Decimal,
    ) -> Result<Self, ServiceError> {
        let mut item = Self {
            product,
            quantity_ordered,
            quantity_fulfilled,
            quantity_remaining: 0,
            unit_price,
            subtotal: Decimal::ZERO,
        };
        item.recalculate()?;
        Ok(item)
    }

    pub fn recalculate(&mut self) -> Result<(), ServiceError> {
        self.quantity_remaining =
            status::quantity_remaining(self.quantity_ordered, self.quantity_fulfilled);
        self.subtotal = status::line_subtotal(self.quantity_ordered, self.unit_price)?;
        Ok(())
    }
}

impl TryFrom<&OrderItemInput> for OrderItem {
    type Error = ServiceError;

    fn try_from(input: &OrderItemInput) -> Result<Self, Self::Error> {
        OrderItem::new(
            input.product,
            input.quantity_ordered,
            input.quantity_fulfilled,
            input.unit_price,
        )
    }
}

/// A sale or a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub kind: OrderKind,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub payment_timing: PaymentTiming,
    pub date: NaiveDate,
    pub payments: Vec<OrderPayment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recomputes every derived field from the lines and recorded payments.
    pub fn recalculate(&mut self) -> Result<(), ServiceError> {
        for item in &mut self.items {
            item.recalculate()?;
        }
        self.total_amount = status::order_total(&self.items)?;
        self.amount_paid = self
            .payments
            .iter()
            .try_fold(Decimal::ZERO, |paid, p| paid.checked_add(p.amount))
            .ok_or_else(|| ServiceError::ValidationError("amount paid is too large".to_string()))?;
        self.fulfillment_status = status::derive_fulfillment_status(&self.items);
        self.payment_status = status::derive_payment_status(self.total_amount, self.amount_paid);
        Ok(())
    }

    pub fn outstanding_balance(&self) -> Decimal {
        status::outstanding_balance(self.total_amount, self.amount_paid)
    }
}

impl Record for Order {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.order_number.to_lowercase())
    }
}

impl Dated for Order {
    fn record_date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemInput {
    pub product: ProductName,
    pub quantity_ordered: u32,
    #[serde(default)]
    pub quantity_fulfilled: u32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 64), custom = "validate_not_blank")]
    pub order_number: String,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    /// Required when `payment_timing` is `Now`.
    pub payment: Option<PaymentInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderItemsInput {
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FulfillmentInput {
    pub quantity: u32,
}
