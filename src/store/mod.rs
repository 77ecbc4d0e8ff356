//! Persistence collaborator for products and reports
//!
//! The core only needs a key-value view of products and the reports attached
//! to them. [`InMemoryStore`] backs tests and the default server.

use crate::error::Result;
use crate::product::ProductRecord;
use crate::report::StructuredReport;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Product and report storage
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ProductRecord>>;

    /// Insert or replace a record, assigning an id when it has none
    async fn save(&self, record: ProductRecord) -> Result<ProductRecord>;

    async fn save_report(&self, report: StructuredReport) -> Result<()>;

    /// Remove every report of a product except `keep`, returning how many were removed
    async fn delete_reports_except(&self, product_id: Uuid, keep: Uuid) -> Result<usize>;

    /// Reports of a product, oldest first
    async fn reports_for(&self, product_id: Uuid) -> Result<Vec<StructuredReport>>;

    async fn latest_report(&self, product_id: Uuid) -> Result<Option<StructuredReport>> {
        Ok(self.reports_for(product_id).await?.pop())
    }
}

/// Concurrent in-process store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<DashMap<Uuid, ProductRecord>>,
    reports: Arc<DashMap<Uuid, Vec<StructuredReport>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<ProductRecord>> {
        Ok(self.products.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, mut record: ProductRecord) -> Result<ProductRecord> {
        let id = *record.id.get_or_insert_with(Uuid::new_v4);
        self.products.insert(id, record.clone());
        info!(product_id = %id, "Product saved");
        Ok(record)
    }

    async fn save_report(&self, report: StructuredReport) -> Result<()> {
        // Reports without a product are not addressable; keep them under a nil id
        let product_id = report.product_id.unwrap_or_else(Uuid::nil);
        info!(product_id = %product_id, report_id = %report.id, "Report saved");
        self.reports.entry(product_id).or_default().push(report);
        Ok(())
    }

    async fn delete_reports_except(&self, product_id: Uuid, keep: Uuid) -> Result<usize> {
        let removed = match self.reports.get_mut(&product_id) {
            Some(mut reports) => {
                let before = reports.len();
                reports.retain(|report| report.id != keep);
                before - reports.len()
            }
            None => 0,
        };
        Ok(removed)
    }

    async fn reports_for(&self, product_id: Uuid) -> Result<Vec<StructuredReport>> {
        Ok(self
            .reports
            .get(&product_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
