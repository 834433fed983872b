use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_not_blank;
use crate::store::Record;

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
pub enum UserRole {
    Admin,
    Manager,
    Employee,
    #[serde(rename = "Stock Keeper")]
    #[strum(to_string = "Stock Keeper", serialize = "stock_keeper")]
    StockKeeper,
    Cashier,
    Production,
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
pub enum UserStatus {
    Active,
    Inactive,
}

pub const DEFAULT_DEPARTMENT: &str = "Default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub department: String,
    pub status: UserStatus,
    pub join_date: NaiveDate,
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 256))]
    pub address: Option<String>,
    pub role: UserRole,
    #[validate(length(min = 1, max = 64))]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 128), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: UserRole,
    #[validate(length(min = 1, max = 64), custom = "validate_not_blank")]
    pub department: String,
    pub status: UserStatus,
}
