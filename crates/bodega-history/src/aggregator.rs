//! Regroups flat persisted ingress rows into logical documents and keeps the
//! group aggregates consistent while a single row is being corrected.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use bodega_core::{LinePatch, MovementError, MovementHistory, PersistedMovementRow, money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub document_number: String,
    pub supplier_tax_id: String,
}

/// A derived, never-persisted aggregate over the rows sharing one key.
/// Reconstructed on every load; only individual rows round-trip to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalDocument {
    pub key: DocumentKey,
    pub date: NaiveDate,
    pub supplier_name: String,
    pub responsible: String,
    pub children: Vec<PersistedMovementRow>,
    pub total_net: Decimal,
    pub total_gross: Decimal,
}

/// Deterministic fold: every row lands in exactly one document. Groups come
/// back sorted by date descending, ties kept in first-occurrence order.
pub fn group(rows: &[PersistedMovementRow]) -> Vec<LogicalDocument> {
    let mut order: HashMap<DocumentKey, usize> = HashMap::new();
    let mut documents: Vec<LogicalDocument> = Vec::new();

    for row in rows {
        let key = DocumentKey {
            document_number: row.document_number.clone(),
            supplier_tax_id: row.supplier_tax_id.clone(),
        };
        let index = *order.entry(key.clone()).or_insert_with(|| {
            documents.push(LogicalDocument {
                key,
                date: row.date,
                supplier_name: row.supplier_name.clone(),
                responsible: row.responsible.clone(),
                children: Vec::new(),
                total_net: Decimal::ZERO,
                total_gross: Decimal::ZERO,
            });
            documents.len() - 1
        });
        let document = &mut documents[index];
        document.total_net += row.net_amount;
        document.total_gross += row.gross_amount;
        document.children.push(row.clone());
    }

    documents.sort_by(|a, b| b.date.cmp(&a.date));
    documents
}

/// A view of `document` with one row replaced by its pending edited values
/// and every aggregate refolded. Committed rows are untouched; this is what
/// the correction screen renders while the edit is still unconfirmed.
pub fn recompute_with_pending_edit(
    document: &LogicalDocument,
    edited_row_id: i64,
    pending: &LinePatch,
) -> Result<LogicalDocument, MovementError> {
    if !document.children.iter().any(|r| r.id == edited_row_id) {
        return Err(MovementError::LineNotFound(edited_row_id));
    }

    let children: Vec<PersistedMovementRow> = document
        .children
        .iter()
        .map(|row| {
            if row.id != edited_row_id {
                return row.clone();
            }
            let net_amount = money::net(pending.quantity, pending.unit_cost);
            PersistedMovementRow {
                quantity: pending.quantity,
                unit_cost: pending.unit_cost,
                net_amount,
                gross_amount: money::gross(net_amount),
                ..row.clone()
            }
        })
        .collect();

    Ok(LogicalDocument {
        key: document.key.clone(),
        date: document.date,
        supplier_name: document.supplier_name.clone(),
        responsible: document.responsible.clone(),
        total_net: children.iter().map(|r| r.net_amount).sum(),
        total_gross: children.iter().map(|r| r.gross_amount).sum(),
        children,
    })
}

pub struct DocumentAggregator {
    history: Arc<dyn MovementHistory>,
}

impl DocumentAggregator {
    pub fn new(history: Arc<dyn MovementHistory>) -> Self {
        Self { history }
    }

    /// Fetches the flat row set and regroups it.
    pub async fn load(&self) -> Result<Vec<LogicalDocument>, MovementError> {
        let rows = self
            .history
            .fetch_ingress_flat()
            .await
            .map_err(MovementError::remote)?;
        let documents = group(&rows);
        info!(rows = rows.len(), documents = documents.len(), "ingress history regrouped");
        Ok(documents)
    }

    /// Confirms a pending edit through the update collaborator, then reloads
    /// and regroups the full set instead of patching the cached structure,
    /// so local aggregates cannot diverge from storage. On failure the caller
    /// keeps its pending edit; nothing was partially applied here.
    pub async fn commit_edit(
        &self,
        row_id: i64,
        pending: &LinePatch,
    ) -> Result<Vec<LogicalDocument>, MovementError> {
        self.history
            .update_ingress_line(row_id, pending)
            .await
            .map_err(MovementError::remote)?;
        self.load().await
    }
}
