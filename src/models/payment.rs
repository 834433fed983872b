use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_not_blank;
use crate::{date_filter::Dated, store::Record};

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
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Bank Transfer")]
    #[strum(to_string = "Bank Transfer", serialize = "bank_transfer")]
    BankTransfer,
    #[serde(rename = "Mobile Money")]
    #[strum(to_string = "Mobile Money", serialize = "mobile_money")]
    MobileMoney,
    Check,
    #[serde(rename = "Credit Card")]
    #[strum(to_string = "Credit Card", serialize = "credit_card")]
    CreditCard,
}

impl PaymentMethod {
    /// Every method except cash must carry a reference number.
    pub fn requires_reference(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

/// A payment applied against a sale or purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub id: u64,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    #[validate(length(max = 128))]
    pub reference: Option<String>,
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
pub enum InvoicePaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// A client payment tracked on the payments ledger, independent of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePayment {
    pub id: u64,
    pub invoice_number: String,
    pub client_name: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: InvoicePaymentStatus,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
}

impl InvoicePayment {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoicePaymentStatus::Pending && self.due_date < today
    }
}

impl Record for InvoicePayment {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.invoice_number.to_lowercase())
    }
}

impl Dated for InvoicePayment {
    fn record_date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InvoicePaymentInput {
    #[validate(length(min = 1, max = 64), custom = "validate_not_blank")]
    pub invoice_number: String,
    #[validate(length(min = 1, max = 256), custom = "validate_not_blank")]
    pub client_name: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default = "default_invoice_status")]
    pub status: InvoicePaymentStatus,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    pub due_date: NaiveDate,
}

fn default_invoice_status() -> InvoicePaymentStatus {
    InvoicePaymentStatus::Pending
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceStatusInput {
    pub status: InvoicePaymentStatus,
}
