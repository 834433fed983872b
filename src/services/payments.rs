use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use super::contains_ignore_case;
use crate::{
    date_filter::{filter_by_date, DateFilter},
    errors::ServiceError,
    models::{InvoicePayment, InvoicePaymentInput, InvoicePaymentStatus},
    store::Repository,
};

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Matched against the invoice number and client name.
    pub search: Option<String>,
    pub status: Option<InvoicePaymentStatus>,
    pub date: DateFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub count: usize,
    pub total_amount: Decimal,
    pub completed_amount: Decimal,
    pub pending_amount: Decimal,
    pub failed_amount: Decimal,
    pub overdue_count: usize,
}

/// Ledger of client invoice payments, independent of sales and purchases.
#[derive(Clone)]
pub struct PaymentLedgerService {
    repository: Arc<dyn Repository<InvoicePayment>>,
}

impl PaymentLedgerService {
    pub fn new(repository: Arc<dyn Repository<InvoicePayment>>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, input), fields(invoice = %input.invoice_number, amount = %input.amount))]
    pub fn record_payment(
        &self,
        input: InvoicePaymentInput,
        today: NaiveDate,
    ) -> Result<InvoicePayment, ServiceError> {
        input.validate()?;
        if input.amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount cannot be negative".to_string(),
            ));
        }

        let date = input.date.unwrap_or(today);
        if input.due_date < date {
            return Err(ServiceError::ValidationError(format!(
                "due date {} is before payment date {}",
                input.due_date, date
            )));
        }

        let invoice_number = input.invoice_number.trim().to_string();
        let payment = self
            .repository
            .insert(InvoicePayment {
                id: 0,
                invoice_number: invoice_number.clone(),
                client_name: input.client_name.trim().to_string(),
                amount: input.amount,
                method: input.method,
                status: input.status,
                date,
                due_date: input.due_date,
            })
            .map_err(|_| {
                warn!("duplicate invoice number");
                ServiceError::Conflict(format!(
                    "invoice {} already has a payment",
                    invoice_number
                ))
            })?;
        info!(payment_id = payment.id, status = %payment.status, "invoice payment recorded");
        Ok(payment)
    }

    pub fn get_payment(&self, id: u64) -> Result<InvoicePayment, ServiceError> {
        self.repository
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Payment", id))
    }

    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        id: u64,
        status: InvoicePaymentStatus,
    ) -> Result<InvoicePayment, ServiceError> {
        let updated = self
            .repository
            .update(id, &mut |payment: &mut InvoicePayment| {
                payment.status = status;
                Ok(())
            })?
            .ok_or_else(|| ServiceError::not_found("Payment", id))?;
        info!(payment_id = id, status = %updated.status, "invoice payment status changed");
        Ok(updated)
    }

    pub fn list_payments(&self, filter: &PaymentFilter, today: NaiveDate) -> Vec<InvoicePayment> {
        let matching = self.repository.all().into_iter().filter(|payment| {
            filter.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(&payment.invoice_number, needle)
                    || contains_ignore_case(&payment.client_name, needle)
            }) && filter.status.map_or(true, |status| payment.status == status)
        });
        filter_by_date(matching, &filter.date, today)
    }

    /// Pending payments whose due date has passed.
    pub fn overdue(&self, today: NaiveDate) -> Vec<InvoicePayment> {
        self.repository
            .all()
            .into_iter()
            .filter(|payment| payment.is_overdue(today))
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> PaymentSummary {
        self.repository
            .all()
            .iter()
            .fold(PaymentSummary::default(), |mut summary, payment| {
                summary.count += 1;
                summary.total_amount = summary.total_amount.saturating_add(payment.amount);
                let bucket = match payment.status {
                    InvoicePaymentStatus::Completed => &mut summary.completed_amount,
                    InvoicePaymentStatus::Pending => &mut summary.pending_amount,
                    InvoicePaymentStatus::Failed => &mut summary.failed_amount,
                };
                *bucket = bucket.saturating_add(payment.amount);
                if payment.is_overdue(today) {
                    summary.overdue_count += 1;
                }
                summary
            })
    }
}
