// Per-resource services over the in-memory stores
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

use std::sync::Arc;

use crate::{models::OrderKind, store::in_memory};

use self::{
    dashboard::DashboardService, inventory::InventoryService, orders::OrderService,
    payments::PaymentLedgerService, products::ProductService, users::UserService,
};

/// Service container holding all service instances
#[derive(Clone)]
pub struct AppServices {
    pub sales: Arc<OrderService>,
    pub purchases: Arc<OrderService>,
    pub inventory: Arc<InventoryService>,
    pub products: Arc<ProductService>,
    pub payments: Arc<PaymentLedgerService>,
    pub users: Arc<UserService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Wires every service to its own empty in-memory store.
    pub fn in_memory(low_stock_threshold: u32, currency: &str) -> Self {
        let sales = Arc::new(OrderService::new(
            OrderKind::Sale,
            in_memory(),
        ));
        let purchases = Arc::new(OrderService::new(
            OrderKind::Purchase,
            in_memory(),
        ));
        let inventory = Arc::new(InventoryService::new(
            in_memory(),
            low_stock_threshold,
        ));
        let payments = Arc::new(PaymentLedgerService::new(in_memory()));

        Self {
            dashboard: Arc::new(DashboardService::new(
                sales.clone(),
                purchases.clone(),
                inventory.clone(),
                payments.clone(),
                currency,
            )),
            products: Arc::new(ProductService::new(in_memory())),
            users: Arc::new(UserService::new(in_memory())),
            sales,
            purchases,
            inventory,
            payments,
        }
    }

    pub fn orders(&self, kind: OrderKind) -> &Arc<OrderService> {
        match kind {
            OrderKind::Sale => &self.sales,
            OrderKind::Purchase => &self.purchases,
        }
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
