use async_trait::async_trait;

use crate::contracts::{
    ConsumptionReceipt, ConsumptionSubmission, IngressReceipt, IngressSubmission, LinePatch,
};
use crate::models::{
    Area, CatalogProduct, OutgoingDetailRow, OutgoingSummary, PersistedMovementRow,
    StockSnapshotEntry,
};

/// Read access to the remote catalog: areas, products, stock-by-area search.
#[async_trait]
pub trait CatalogDirectory: Send + Sync {
    async fn list_areas(&self) -> anyhow::Result<Vec<Area>>;

    async fn list_products(&self) -> anyhow::Result<Vec<CatalogProduct>>;

    /// `area_id` of `None` searches across all areas.
    async fn search_stock(
        &self,
        area_id: Option<i64>,
        query: &str,
    ) -> anyhow::Result<Vec<StockSnapshotEntry>>;
}

/// Persistence of finished documents. Atomicity of the write and of any stock
/// decrement is the remote side's responsibility.
#[async_trait]
pub trait MovementSubmit: Send + Sync {
    async fn submit_ingress(&self, document: &IngressSubmission) -> anyhow::Result<IngressReceipt>;

    async fn submit_consumption(
        &self,
        guide: &ConsumptionSubmission,
    ) -> anyhow::Result<ConsumptionReceipt>;
}

/// Read and line-level correction of already-persisted movements.
#[async_trait]
pub trait MovementHistory: Send + Sync {
    async fn fetch_ingress_flat(&self) -> anyhow::Result<Vec<PersistedMovementRow>>;

    async fn update_ingress_line(
        &self,
        id: i64,
        patch: &LinePatch,
    ) -> anyhow::Result<PersistedMovementRow>;

    async fn fetch_outgoing_summaries(&self) -> anyhow::Result<Vec<OutgoingSummary>>;

    async fn fetch_outgoing_detail(&self, folio: i64) -> anyhow::Result<Vec<OutgoingDetailRow>>;
}

/// Capability for destructive-action confirmation. The front end owns the
/// dialog; the core only asks.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, intent: &str) -> bool;
}
