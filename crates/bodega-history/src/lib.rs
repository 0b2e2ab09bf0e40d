pub mod aggregator;
pub mod outgoing;

pub use aggregator::{DocumentAggregator, DocumentKey, LogicalDocument, group, recompute_with_pending_edit};
pub use outgoing::OutgoingHistory;
