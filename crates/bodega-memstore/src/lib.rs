//! In-memory implementations of every warehouse port, for tests and demos.
//! Mirrors the remote side's responsibilities: it assigns row ids and folios,
//! rederives amounts on line updates, and decrements stock on consumption.

use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bodega_core::{
    Area, CatalogDirectory, CatalogProduct, Confirm, ConsumptionReceipt, ConsumptionSubmission,
    IngressReceipt, IngressSubmission, LinePatch, MovementHistory, MovementSubmit,
    OutgoingDetailRow, OutgoingSummary, PersistedMovementRow, StockSnapshotEntry, money,
};

#[derive(Default)]
struct WarehouseState {
    areas: Vec<Area>,
    products: Vec<CatalogProduct>,
    stock: Vec<StockSnapshotEntry>,
    ingress_rows: Vec<PersistedMovementRow>,
    outgoing: Vec<(OutgoingSummary, Vec<OutgoingDetailRow>)>,
    next_row_id: i64,
    next_folio: i64,
}

#[derive(Default)]
pub struct InMemoryWarehouse {
    state: RwLock<WarehouseState>,
}

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_area(&self, id: i64, name: &str) {
        let mut state = self.state.write().await;
        state.areas.push(Area {
            id,
            name: name.to_string(),
        });
    }

    pub async fn seed_product(&self, product: CatalogProduct) {
        let mut state = self.state.write().await;
        state.products.push(product);
    }

    pub async fn seed_stock(&self, entry: StockSnapshotEntry) {
        let mut state = self.state.write().await;
        state.stock.push(entry);
    }

    pub async fn seed_ingress_row(&self, row: PersistedMovementRow) {
        let mut state = self.state.write().await;
        state.next_row_id = state.next_row_id.max(row.id);
        state.ingress_rows.push(row);
    }

    pub async fn stock_level(&self, sku: &str, area_id: i64) -> Option<rust_decimal::Decimal> {
        let state = self.state.read().await;
        state
            .stock
            .iter()
            .find(|e| e.sku == sku && e.area_id == area_id)
            .map(|e| e.available_quantity)
    }
}

#[async_trait]
impl CatalogDirectory for InMemoryWarehouse {
    async fn list_areas(&self) -> anyhow::Result<Vec<Area>> {
        Ok(self.state.read().await.areas.clone())
    }

    async fn list_products(&self) -> anyhow::Result<Vec<CatalogProduct>> {
        Ok(self.state.read().await.products.clone())
    }

    async fn search_stock(
        &self,
        area_id: Option<i64>,
        query: &str,
    ) -> anyhow::Result<Vec<StockSnapshotEntry>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .stock
            .iter()
            .filter(|e| area_id.is_none_or(|id| e.area_id == id))
            .filter(|e| {
                e.sku.to_lowercase().contains(&needle)
                    || e.product_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MovementSubmit for InMemoryWarehouse {
    async fn submit_ingress(&self, document: &IngressSubmission) -> anyhow::Result<IngressReceipt> {
        let mut state = self.state.write().await;
        for item in &document.items {
            state.next_row_id += 1;
            let id = state.next_row_id;
            let net_amount = money::net(item.quantity, item.unit_cost);
            state.ingress_rows.push(PersistedMovementRow {
                id,
                date: document.date,
                document_number: document.document_number.clone(),
                supplier_tax_id: document.supplier_tax_id.clone(),
                supplier_name: document.supplier_name.clone(),
                product_name: item.name.clone(),
                quantity: item.quantity,
                unit_cost: item.unit_cost,
                net_amount,
                gross_amount: money::gross(net_amount),
                responsible: document.responsible.clone(),
            });
        }
        Ok(IngressReceipt {
            receipt_id: Uuid::new_v4(),
            rows_created: document.items.len(),
            created_at: Utc::now(),
        })
    }

    async fn submit_consumption(
        &self,
        guide: &ConsumptionSubmission,
    ) -> anyhow::Result<ConsumptionReceipt> {
        let mut state = self.state.write().await;

        // The stock decrement is atomic with the write: validate every
        // detail before touching anything.
        let mut decrements: Vec<(usize, rust_decimal::Decimal)> = Vec::new();
        for detail in &guide.details {
            let position = state
                .stock
                .iter()
                .position(|e| e.sku == detail.sku && e.area_id == detail.origin_area_id);
            let Some(position) = position else {
                bail!("no stock for {} in area {}", detail.sku, detail.origin_area_id);
            };
            if state.stock[position].available_quantity < detail.quantity {
                bail!("insufficient stock for {}", detail.sku);
            }
            decrements.push((position, detail.quantity));
        }
        for (position, quantity) in decrements {
            state.stock[position].available_quantity -= quantity;
        }

        state.next_folio += 1;
        let folio = state.next_folio;

        let area_names: HashMap<i64, String> = state
            .areas
            .iter()
            .map(|a| (a.id, a.name.clone()))
            .collect();
        let area_label = |id: Option<i64>| match id {
            Some(id) => area_names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
            None => "General".to_string(),
        };

        // Consumption is priced at the last known ingress cost for the
        // product, zero when the product was never received here.
        let details: Vec<OutgoingDetailRow> = guide
            .details
            .iter()
            .map(|d| {
                let product_name = state
                    .products
                    .iter()
                    .find(|p| p.sku == d.sku)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| d.sku.clone());
                let unit_cost = state
                    .ingress_rows
                    .iter()
                    .rev()
                    .find(|r| r.product_name == product_name)
                    .map(|r| r.unit_cost)
                    .unwrap_or(rust_decimal::Decimal::ZERO);
                OutgoingDetailRow {
                    product_name,
                    responsible: guide.responsible.clone(),
                    origin_area: area_label(Some(d.origin_area_id)),
                    destination_area: area_label(Some(
                        d.destination_area_id.unwrap_or(d.origin_area_id),
                    )),
                    movement_kind: d.reason_code.clone(),
                    quantity: d.quantity,
                    net_amount: money::net(d.quantity, unit_cost),
                }
            })
            .collect();
        let summary = OutgoingSummary {
            folio,
            date: guide.date,
            responsible: guide.responsible.clone(),
            destination: area_label(guide.origin_area_id),
            total_net: details.iter().map(|d| d.net_amount).sum(),
        };
        state.outgoing.push((summary, details));

        Ok(ConsumptionReceipt {
            folio,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl MovementHistory for InMemoryWarehouse {
    async fn fetch_ingress_flat(&self) -> anyhow::Result<Vec<PersistedMovementRow>> {
        Ok(self.state.read().await.ingress_rows.clone())
    }

    async fn update_ingress_line(
        &self,
        id: i64,
        patch: &LinePatch,
    ) -> anyhow::Result<PersistedMovementRow> {
        let mut state = self.state.write().await;
        let Some(row) = state.ingress_rows.iter_mut().find(|r| r.id == id) else {
            bail!("movement line {id} not found");
        };
        row.quantity = patch.quantity;
        row.unit_cost = patch.unit_cost;
        row.net_amount = money::net(patch.quantity, patch.unit_cost);
        row.gross_amount = money::gross(row.net_amount);
        Ok(row.clone())
    }

    async fn fetch_outgoing_summaries(&self) -> anyhow::Result<Vec<OutgoingSummary>> {
        let state = self.state.read().await;
        Ok(state.outgoing.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn fetch_outgoing_detail(&self, folio: i64) -> anyhow::Result<Vec<OutgoingDetailRow>> {
        let state = self.state.read().await;
        let Some((_, details)) = state.outgoing.iter().find(|(s, _)| s.folio == folio) else {
            bail!("guide {folio} not found");
        };
        Ok(details.clone())
    }
}

/// Confirmation stub with a fixed answer.
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _intent: &str) -> bool {
        self.0
    }
}
