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
    models::{Product, ProductCategory, ProductInput},
    store::Repository,
};

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matched against the product name and description.
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
    pub date: DateFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn Repository<Product>>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn Repository<Product>>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, input), fields(name = %input.name, category = %input.category))]
    pub fn create_product(
        &self,
        input: ProductInput,
        today: NaiveDate,
    ) -> Result<Product, ServiceError> {
        input.validate()?;
        let product = self.repository.insert(Product {
            id: 0,
            name: input.name,
            category: input.category,
            description: input.description.trim().to_string(),
            created_at: input.created_at.unwrap_or(today),
        })?;
        info!(product_id = product.id, "product created");
        Ok(product)
    }

    pub fn get_product(&self, id: u64) -> Result<Product, ServiceError> {
        self.repository
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    #[instrument(skip(self, input))]
    pub fn update_product(&self, id: u64, input: ProductInput) -> Result<Product, ServiceError> {
        input.validate()?;
        let updated = self
            .repository
            .update(id, &mut |product: &mut Product| {
                product.name = input.name;
                product.category = input.category;
                product.description = input.description.trim().to_string();
                if let Some(created_at) = input.created_at {
                    product.created_at = created_at;
                }
                Ok(())
            })?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        info!(product_id = id, "product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub fn delete_product(&self, id: u64) -> Result<Product, ServiceError> {
        let removed = self
            .repository
            .remove(id)
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        info!(product_id = id, "product deleted");
        Ok(removed)
    }

    pub fn list_products(&self, filter: &ProductFilter, today: NaiveDate) -> Vec<Product> {
        let matching = self.repository.all().into_iter().filter(|product| {
            filter.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(&product.name.to_string(), needle)
                    || contains_ignore_case(&product.description, needle)
            }) && filter
                .category
                .map_or(true, |category| product.category == category)
        });
        filter_by_date(matching, &filter.date, today)
    }

    pub fn summary(&self) -> ProductSummary {
        let products = self.repository.all();
        let mut by_category: BTreeMap<String, usize> = ProductCategory::iter()
            .map(|category| (category.to_string(), 0))
            .collect();
        for product in &products {
            *by_category.entry(product.category.to_string()).or_default() += 1;
        }
        ProductSummary {
            total: products.len(),
            by_category,
        }
    }
}
