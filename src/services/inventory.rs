use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{info, instrument};
use validator::Validate;

use super::contains_ignore_case;
use crate::{
    date_filter::{filter_by_date, DateFilter},
    errors::ServiceError,
    models::{InventoryItem, InventoryItemInput, StockLocation},
    store::Repository,
};

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub search: Option<String>,
    pub stock: Option<StockLocation>,
    pub date: DateFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub item_count: usize,
    pub total_quantity: u64,
    pub total_current_stock: u64,
    pub stock_by_location: BTreeMap<StockLocation, u64>,
    pub low_stock_count: usize,
    pub low_stock_threshold: u32,
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Arc<dyn Repository<InventoryItem>>,
    low_stock_threshold: u32,
}

impl InventoryService {
    pub fn new(repository: Arc<dyn Repository<InventoryItem>>, low_stock_threshold: u32) -> Self {
        Self {
            repository,
            low_stock_threshold,
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name, stock = %input.stock))]
    pub fn create_item(
        &self,
        input: InventoryItemInput,
        today: NaiveDate,
    ) -> Result<InventoryItem, ServiceError> {
        input.validate()?;
        let item = self.repository.insert(InventoryItem {
            id: 0,
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            stock: input.stock,
            current_stock: input.current_stock,
            created_at: input.created_at.unwrap_or(today),
        })?;
        info!(item_id = item.id, "inventory item created");
        Ok(item)
    }

    pub fn get_item(&self, id: u64) -> Result<InventoryItem, ServiceError> {
        self.repository
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Inventory item", id))
    }

    /// Overwrites an item. `created_at` is kept unless the input supplies one.
    #[instrument(skip(self, input))]
    pub fn update_item(
        &self,
        id: u64,
        input: InventoryItemInput,
    ) -> Result<InventoryItem, ServiceError> {
        input.validate()?;
        let updated = self
            .repository
            .update(id, &mut |item: &mut InventoryItem| {
                item.name = input.name.trim().to_string();
                item.quantity = input.quantity;
                item.stock = input.stock;
                item.current_stock = input.current_stock;
                if let Some(created_at) = input.created_at {
                    item.created_at = created_at;
                }
                Ok(())
            })?
            .ok_or_else(|| ServiceError::not_found("Inventory item", id))?;
        info!(item_id = id, current_stock = updated.current_stock, "inventory item updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub fn delete_item(&self, id: u64) -> Result<InventoryItem, ServiceError> {
        let removed = self
            .repository
            .remove(id)
            .ok_or_else(|| ServiceError::not_found("Inventory item", id))?;
        info!(item_id = id, "inventory item deleted");
        Ok(removed)
    }

    pub fn list_items(&self, filter: &InventoryFilter, today: NaiveDate) -> Vec<InventoryItem> {
        let matching = self.repository.all().into_iter().filter(|item| {
            filter
                .search
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&item.name, needle))
                && filter.stock.map_or(true, |stock| item.stock == stock)
        });
        filter_by_date(matching, &filter.date, today)
    }

    pub fn low_stock_items(&self) -> Vec<InventoryItem> {
        self.repository
            .all()
            .into_iter()
            .filter(|item| item.is_low_stock(self.low_stock_threshold))
            .collect()
    }

    pub fn summary(&self) -> InventorySummary {
        let items = self.repository.all();
        let mut stock_by_location: BTreeMap<StockLocation, u64> =
            StockLocation::iter().map(|location| (location, 0)).collect();
        for item in &items {
            *stock_by_location.entry(item.stock).or_default() += u64::from(item.current_stock);
        }

        InventorySummary {
            item_count: items.len(),
            total_quantity: items.iter().map(|i| u64::from(i.quantity)).sum(),
            total_current_stock: stock_by_location.values().sum(),
            stock_by_location,
            low_stock_count: items
                .iter()
                .filter(|i| i.is_low_stock(self.low_stock_threshold))
                .count(),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}
