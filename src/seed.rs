//! Demo records loaded at startup when `seed_demo_data` is enabled.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tracing::info;

use crate::{
    errors::ServiceError,
    models::{
        CreateUserInput, InventoryItemInput, InvoicePaymentInput, InvoicePaymentStatus,
        PaymentMethod, ProductCategory, ProductInput, ProductName, StockLocation, UserRole,
    },
    services::AppServices,
};

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, ServiceError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ServiceError::InternalError(format!("invalid seed date {year}-{month}-{day}"))
    })
}

/// Inserts the demo inventory, product, invoice payments and users.
pub fn load_demo_data(services: &AppServices) -> Result<(), ServiceError> {
    let inventory = [
        ("Ordinaire", 100, StockLocation::Kicukiro, 80, date(2025, 3, 22)?),
        ("Bran", 50, StockLocation::Kamonyi, 1500, date(2025, 3, 21)?),
    ];
    for (name, quantity, stock, current_stock, created_at) in inventory {
        services.inventory.create_item(
            InventoryItemInput {
                name: name.to_string(),
                quantity,
                stock,
                current_stock,
                created_at: Some(created_at),
            },
            created_at,
        )?;
    }

    let product_date = date(2025, 3, 26)?;
    services.products.create_product(
        ProductInput {
            name: ProductName::Super,
            category: ProductCategory::RawMaterial,
            description: "Basic raw material for production".to_string(),
            created_at: Some(product_date),
        },
        product_date,
    )?;

    let paid_on = date(2025, 3, 22)?;
    let due = date(2025, 4, 22)?;
    let invoices = [
        (
            "INV-001",
            "ABC Company",
            dec!(15000),
            PaymentMethod::BankTransfer,
            InvoicePaymentStatus::Completed,
        ),
        (
            "INV-002",
            "XYZ Industries",
            dec!(8500),
            PaymentMethod::Check,
            InvoicePaymentStatus::Pending,
        ),
    ];
    for (invoice_number, client_name, amount, method, status) in invoices {
        services.payments.record_payment(
            InvoicePaymentInput {
                invoice_number: invoice_number.to_string(),
                client_name: client_name.to_string(),
                amount,
                method,
                status,
                date: Some(paid_on),
                due_date: due,
            },
            paid_on,
        )?;
    }

    let users = [
        ("John Doe", "john@example.com", UserRole::Admin, "Management", date(2025, 1, 1)?),
        ("Jane Smith", "jane@example.com", UserRole::Manager, "Production", date(2025, 2, 15)?),
    ];
    for (name, email, role, department, joined) in users {
        services.users.create_user(
            CreateUserInput {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                address: None,
                role,
                department: Some(department.to_string()),
            },
            joined,
        )?;
    }

    info!("demo data loaded");
    Ok(())
}
