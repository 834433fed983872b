use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_not_blank;
use crate::{date_filter::Dated, store::Record};

/// Warehouse holding an inventory line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum StockLocation {
    Kicukiro,
    Kamonyi,
    Rwamagana,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub quantity: u32,
    pub stock: StockLocation,
    pub current_stock: u32,
    pub created_at: NaiveDate,
}

impl InventoryItem {
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.current_stock < threshold
    }
}

impl Record for InventoryItem {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Dated for InventoryItem {
    fn record_date(&self) -> NaiveDate {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InventoryItemInput {
    #[validate(length(min = 1, max = 128), custom = "validate_not_blank")]
    pub name: String,
    pub quantity: u32,
    pub stock: StockLocation,
    pub current_stock: u32,
    /// Defaults to today when omitted.
    pub created_at: Option<NaiveDate>,
}
