use rust_decimal::Decimal;
use thiserror::Error;

/// Everything the movement core can reject an operation with. The client-side
/// variants leave state untouched; `Remote` carries the collaborator message
/// verbatim and is never retried automatically.
#[derive(Debug, Error)]
pub enum MovementError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    #[error("unit price must not be negative")]
    InvalidUnitPrice,

    #[error("sku {0} is already staged in this document")]
    DuplicateSku(String),

    #[error("requested {requested} exceeds available stock {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("a destination area is required in general mode")]
    MissingDestination,

    #[error("destination is fixed by the guide's origin mode")]
    DestinationNotAllowed,

    #[error("document has no staged lines")]
    EmptyDocument,

    #[error("a submission for this draft is already in flight")]
    SubmissionInFlight,

    #[error("movement line {0} not found")]
    LineNotFound(i64),

    #[error("no staged line at index {0}")]
    IndexOutOfRange(usize),

    #[error("remote operation failed: {0}")]
    Remote(String),
}

impl MovementError {
    /// Wraps a collaborator failure, keeping the server-provided message.
    pub fn remote(err: anyhow::Error) -> Self {
        Self::Remote(format!("{err:#}"))
    }
}
