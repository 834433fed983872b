use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    inventory::{InventoryService, InventorySummary},
    orders::{OrderService, OrderSummary},
    payments::{PaymentLedgerService, PaymentSummary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub date: NaiveDate,
    /// Currency code every amount below is expressed in.
    pub currency: String,
    pub sales: OrderSummary,
    pub purchases: OrderSummary,
    pub inventory: InventorySummary,
    pub payments: PaymentSummary,
    pub alerts: Vec<Alert>,
}

/// Read-only roll-up of the other services.
#[derive(Clone)]
pub struct DashboardService {
    sales: Arc<OrderService>,
    purchases: Arc<OrderService>,
    inventory: Arc<InventoryService>,
    payments: Arc<PaymentLedgerService>,
    currency: String,
}

impl DashboardService {
    pub fn new(
        sales: Arc<OrderService>,
        purchases: Arc<OrderService>,
        inventory: Arc<InventoryService>,
        payments: Arc<PaymentLedgerService>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            sales,
            purchases,
            inventory,
            payments,
            currency: currency.into(),
        }
    }

    pub fn overview(&self, today: NaiveDate) -> DashboardOverview {
        DashboardOverview {
            date: today,
            currency: self.currency.clone(),
            sales: self.sales.summary(),
            purchases: self.purchases.summary(),
            inventory: self.inventory.summary(),
            payments: self.payments.summary(today),
            alerts: self.alerts(today),
        }
    }

    /// Low stock warnings first, then overdue invoices, then unpaid sales.
    pub fn alerts(&self, today: NaiveDate) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .inventory
            .low_stock_items()
            .into_iter()
            .map(|item| Alert {
                level: AlertLevel::Warning,
                message: format!(
                    "Low stock: {} at {} has {} left",
                    item.name, item.stock, item.current_stock
                ),
            })
            .collect();

        alerts.extend(self.payments.overdue(today).into_iter().map(|payment| Alert {
            level: AlertLevel::Danger,
            message: format!(
                "Overdue payment: {} from {} was due {}",
                payment.invoice_number, payment.client_name, payment.due_date
            ),
        }));

        let unpaid_sales = self.sales.with_outstanding_balance().len();
        if unpaid_sales > 0 {
            alerts.push(Alert {
                level: AlertLevel::Info,
                message: format!("{} sales have an outstanding balance", unpaid_sales),
            });
        }

        alerts
    }
}
