//! Category reference data.
//!
//! Categories and sub-categories are immutable from the client's point of
//! view within a session: fetched once through the gateway, cached for the
//! life of the process, and consulted by draft validation and filters.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::{CivicError, Result};
use crate::remote::ComplaintGateway;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: String,
    pub name: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

/// The fetched catalog with lookup helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Catalog { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn sub_category(&self, id: &str) -> Option<&SubCategory> {
        self.categories
            .iter()
            .flat_map(|c| c.sub_categories.iter())
            .find(|s| s.id == id)
    }

    /// Validate a category / sub-category selection: the category must exist
    /// and the sub-category, when given, must belong to it.
    pub fn validate_selection(&self, category_id: &str, sub_category_id: Option<&str>) -> Result<()> {
        let category = self
            .category(category_id)
            .ok_or_else(|| CivicError::UnknownCategory(category_id.to_string()))?;

        if let Some(sub_id) = sub_category_id {
            let belongs = category.sub_categories.iter().any(|s| s.id == sub_id);
            if !belongs {
                return Err(CivicError::Validation(format!(
                    "sub-category '{sub_id}' does not belong to category '{category_id}'"
                )));
            }
        }
        Ok(())
    }
}

/// Process-lifetime cache for the catalog. The first `get_or_fetch` hits the
/// gateway; later calls return the cached value. A failed fetch leaves the
/// cell unset so the next call retries.
#[derive(Default)]
pub struct CatalogCache {
    cell: OnceCell<Catalog>,
}

impl CatalogCache {
    pub fn new() -> Self {
        CatalogCache {
            cell: OnceCell::new(),
        }
    }

    pub async fn get_or_fetch(&self, gateway: &Arc<dyn ComplaintGateway>) -> Result<&Catalog> {
        self.cell
            .get_or_try_init(|| async {
                let categories = gateway.fetch_catalog().await?;
                Ok(Catalog::new(categories))
            })
            .await
    }

    /// The catalog, if it has been fetched already.
    pub fn get(&self) -> Option<&Catalog> {
        self.cell.get()
    }
}
