//! Plain records held by the in-memory stores, plus the request shapes that create them.

pub mod inventory;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

use validator::ValidationError;

pub use inventory::{InventoryItem, InventoryItemInput, StockLocation};
pub use order::{
    CreateOrderInput, FulfillmentInput, FulfillmentStatus, Order, OrderItem, OrderItemInput,
    OrderKind, PaymentStatus, PaymentTiming, UpdateOrderItemsInput,
};
pub use payment::{
    InvoicePayment, InvoicePaymentInput, InvoicePaymentStatus, InvoiceStatusInput, OrderPayment,
    PaymentInput, PaymentMethod,
};
pub use product::{Product, ProductCategory, ProductInput, ProductName};
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, UserStatus};

/// Rejects text that is empty once surrounding whitespace is trimmed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
