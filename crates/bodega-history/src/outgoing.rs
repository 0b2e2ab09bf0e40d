//! Read surface over persisted consumption guides: folio summaries and
//! per-folio line detail, with the footer total cross-check the review
//! screen shows next to the persisted total.

use std::sync::Arc;

use rust_decimal::Decimal;

use bodega_core::{MovementError, MovementHistory, OutgoingDetailRow, OutgoingSummary};

pub struct OutgoingHistory {
    history: Arc<dyn MovementHistory>,
}

impl OutgoingHistory {
    pub fn new(history: Arc<dyn MovementHistory>) -> Self {
        Self { history }
    }

    pub async fn summaries(&self) -> Result<Vec<OutgoingSummary>, MovementError> {
        self.history
            .fetch_outgoing_summaries()
            .await
            .map_err(MovementError::remote)
    }

    pub async fn summary_for(&self, folio: i64) -> Result<OutgoingSummary, MovementError> {
        self.summaries()
            .await?
            .into_iter()
            .find(|s| s.folio == folio)
            .ok_or(MovementError::LineNotFound(folio))
    }

    pub async fn detail(&self, folio: i64) -> Result<Vec<OutgoingDetailRow>, MovementError> {
        self.history
            .fetch_outgoing_detail(folio)
            .await
            .map_err(MovementError::remote)
    }

    /// Sum of the detail rows' net amounts, for cross-checking against the
    /// summary's persisted total.
    pub fn detail_total(rows: &[OutgoingDetailRow]) -> Decimal {
        rows.iter().map(|r| r.net_amount).sum()
    }
}
