use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_not_blank;
use crate::{date_filter::Dated, store::Record};

/// The three flour grades the factory buys and sells.
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
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ProductName {
    Super,
    Ordinaire,
    Bran,
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
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ProductCategory {
    #[serde(rename = "Raw Material")]
    #[strum(to_string = "Raw Material", serialize = "raw_material")]
    RawMaterial,
    #[serde(rename = "Semi-Final")]
    #[strum(to_string = "Semi-Final", serialize = "semi_final")]
    SemiFinal,
    #[serde(rename = "Final Product")]
    #[strum(to_string = "Final Product", serialize = "final_product")]
    FinalProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: ProductName,
    pub category: ProductCategory,
    pub description: String,
    pub created_at: NaiveDate,
}

impl Record for Product {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Dated for Product {
    fn record_date(&self) -> NaiveDate {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProductInput {
    pub name: ProductName,
    pub category: ProductCategory,
    #[validate(length(min = 1, max = 1000), custom = "validate_not_blank")]
    pub description: String,
    /// Defaults to today when omitted.
    pub created_at: Option<NaiveDate>,
}
