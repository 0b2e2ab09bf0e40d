pub mod consumption;
pub mod ingress;

pub use consumption::{
    CONSUMED_AT_ORIGIN, ConsumptionGuideBuilder, ConsumptionHeader, DraftConsumptionLine,
    OriginMode,
};
pub use ingress::{DocumentTotals, DraftLineItem, IngressBuilder, IngressHeader, LineInput};
