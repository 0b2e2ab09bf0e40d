pub mod contracts;
pub mod error;
pub mod models;
pub mod money;
pub mod ports;

pub use contracts::{
    ConsumptionReceipt, ConsumptionSubmission, ConsumptionSubmissionDetail, IngressReceipt,
    IngressSubmission, IngressSubmissionItem, LinePatch,
};
pub use error::MovementError;
pub use models::{
    Area, CatalogProduct, OutgoingDetailRow, OutgoingSummary, PersistedMovementRow,
    StockSnapshotEntry, canonical_sku,
};
pub use ports::{CatalogDirectory, Confirm, MovementHistory, MovementSubmit};
