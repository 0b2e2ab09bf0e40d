//! Staged assembly of a consumption guide: lines validated against a
//! point-in-time stock snapshot, consumed at a single fixed origin area or
//! routed per line under the general mode.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bodega_core::{
    Area, Confirm, ConsumptionReceipt, ConsumptionSubmission, ConsumptionSubmissionDetail,
    MovementError, MovementSubmit, StockSnapshotEntry,
};

pub const CONSUMED_AT_ORIGIN: &str = "Consumed at origin";

/// Where the guide draws stock from. Switching mode invalidates every staged
/// line: they were validated against the previous source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OriginMode {
    Fixed { area_id: i64, area_name: String },
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConsumptionLine {
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub origin_area_id: i64,
    pub origin_area_name: String,
    pub destination_area_id: Option<i64>,
    pub destination_label: String,
    /// Available quantity at selection time. A point-in-time constraint; not
    /// revalidated at finalize.
    pub snapshot_available: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionHeader {
    pub date: NaiveDate,
    pub reason_code: String,
}

pub struct ConsumptionGuideBuilder {
    submit: Arc<dyn MovementSubmit>,
    mode: OriginMode,
    lines: Vec<DraftConsumptionLine>,
    active: Option<StockSnapshotEntry>,
    submitting: bool,
}

impl ConsumptionGuideBuilder {
    pub fn new(submit: Arc<dyn MovementSubmit>, mode: OriginMode) -> Self {
        Self {
            submit,
            mode,
            lines: Vec::new(),
            active: None,
            submitting: false,
        }
    }

    pub fn mode(&self) -> &OriginMode {
        &self.mode
    }

    pub fn lines(&self) -> &[DraftConsumptionLine] {
        &self.lines
    }

    pub fn active_selection(&self) -> Option<&StockSnapshotEntry> {
        self.active.as_ref()
    }

    /// Switches the supply source. Staged lines are discarded because their
    /// stock validation no longer applies; when lines exist the discard is
    /// routed through the confirmation capability first. Returns whether the
    /// switch happened.
    pub async fn switch_origin_mode(
        &mut self,
        mode: OriginMode,
        confirm: &dyn Confirm,
    ) -> bool {
        if mode == self.mode {
            return true;
        }
        if !self.lines.is_empty()
            && !confirm.confirm("switching origin discards staged lines").await
        {
            return false;
        }
        self.lines.clear();
        self.active = None;
        self.mode = mode;
        true
    }

    /// Binds a stock search match to the active draft, capturing the entry's
    /// area as the line's actual source. Under general mode each line may
    /// originate from a different area.
    pub fn select_product(&mut self, entry: StockSnapshotEntry) {
        self.active = Some(entry);
    }

    /// Stages the active selection. `destination` is required under general
    /// mode and rejected under a fixed origin, where the line is implicitly
    /// consumed at its origin.
    pub fn add_line(
        &mut self,
        quantity: Decimal,
        destination: Option<&Area>,
    ) -> Result<&DraftConsumptionLine, MovementError> {
        let entry = self
            .active
            .as_ref()
            .ok_or(MovementError::MissingField("product"))?;
        if quantity <= Decimal::ZERO {
            return Err(MovementError::InvalidQuantity);
        }

        let (destination_area_id, destination_label) = match (&self.mode, destination) {
            (OriginMode::Fixed { .. }, None) => (None, CONSUMED_AT_ORIGIN.to_string()),
            (OriginMode::Fixed { .. }, Some(_)) => {
                return Err(MovementError::DestinationNotAllowed);
            }
            (OriginMode::General, None) => return Err(MovementError::MissingDestination),
            (OriginMode::General, Some(area)) => (Some(area.id), area.name.clone()),
        };

        if quantity > entry.available_quantity {
            return Err(MovementError::InsufficientStock {
                requested: quantity,
                available: entry.available_quantity,
            });
        }

        // Validated above; staging consumes the selection.
        let Some(entry) = self.active.take() else {
            return Err(MovementError::MissingField("product"));
        };
        info!(sku = %entry.sku, %quantity, origin = %entry.area_name, "consumption line staged");
        let index = self.lines.len();
        self.lines.push(DraftConsumptionLine {
            sku: entry.sku,
            name: entry.product_name,
            quantity,
            unit: entry.unit_of_measure,
            origin_area_id: entry.area_id,
            origin_area_name: entry.area_name,
            destination_area_id,
            destination_label,
            snapshot_available: entry.available_quantity,
        });
        Ok(&self.lines[index])
    }

    pub fn remove_line(&mut self, index: usize) -> Result<(), MovementError> {
        if index >= self.lines.len() {
            return Err(MovementError::IndexOutOfRange(index));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Maps the staged lines to the submission shape and hands the guide to
    /// the submit collaborator. Under general mode the origin is per line and
    /// the destination explicit; under a fixed origin the header carries the
    /// origin and the destination is omitted.
    pub async fn finalize(
        &mut self,
        header: &ConsumptionHeader,
        responsible: &str,
    ) -> Result<ConsumptionReceipt, MovementError> {
        if self.submitting {
            return Err(MovementError::SubmissionInFlight);
        }
        if responsible.trim().is_empty() {
            return Err(MovementError::MissingField("responsible"));
        }
        if header.reason_code.trim().is_empty() {
            return Err(MovementError::MissingField("reason_code"));
        }
        if self.lines.is_empty() {
            return Err(MovementError::EmptyDocument);
        }

        let origin_area_id = match &self.mode {
            OriginMode::Fixed { area_id, .. } => Some(*area_id),
            OriginMode::General => None,
        };
        let guide = ConsumptionSubmission {
            origin_area_id,
            date: header.date,
            responsible: responsible.to_string(),
            details: self
                .lines
                .iter()
                .map(|l| ConsumptionSubmissionDetail {
                    sku: l.sku.clone(),
                    quantity: l.quantity,
                    reason_code: header.reason_code.clone(),
                    origin_area_id: origin_area_id.unwrap_or(l.origin_area_id),
                    destination_area_id: l.destination_area_id,
                })
                .collect(),
        };

        self.submitting = true;
        let outcome = self.submit.submit_consumption(&guide).await;
        self.submitting = false;

        match outcome {
            Ok(receipt) => {
                info!(folio = receipt.folio, lines = guide.details.len(), "consumption guide submitted");
                self.lines.clear();
                self.active = None;
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "consumption submission failed");
                Err(MovementError::remote(err))
            }
        }
    }
}
