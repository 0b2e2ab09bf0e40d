//! Wire shapes exchanged with the remote movement ledger. Field names are the
//! compatibility surface; nothing else about the transport is assumed here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSubmission {
    pub date: NaiveDate,
    pub document_number: String,
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub responsible: String,
    pub items: Vec<IngressSubmissionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSubmissionItem {
    pub sku: String,
    pub name: String,
    pub area_id: i64,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub category: String,
    pub unit_of_measure: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSubmission {
    pub origin_area_id: Option<i64>,
    pub date: NaiveDate,
    pub responsible: String,
    pub details: Vec<ConsumptionSubmissionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSubmissionDetail {
    pub sku: String,
    pub quantity: Decimal,
    pub reason_code: String,
    pub origin_area_id: i64,
    pub destination_area_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressReceipt {
    pub receipt_id: Uuid,
    pub rows_created: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReceipt {
    pub folio: i64,
    pub created_at: DateTime<Utc>,
}

/// The only mutation history rows admit: new quantity and unit cost for one
/// line. Amounts are rederived server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePatch {
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{ConsumptionSubmission, ConsumptionSubmissionDetail};

    #[test]
    fn consumption_wire_shape_keeps_its_field_names() {
        let guide = ConsumptionSubmission {
            origin_area_id: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
            responsible: "jperez".to_string(),
            details: vec![ConsumptionSubmissionDetail {
                sku: "A-1".to_string(),
                quantity: Decimal::from(4),
                reason_code: "CONSUMO".to_string(),
                origin_area_id: 1,
                destination_area_id: Some(2),
            }],
        };
        let value = serde_json::to_value(&guide).unwrap();
        assert!(value.get("originAreaId").is_some());
        let detail = &value["details"][0];
        assert!(detail.get("reasonCode").is_some());
        assert!(detail.get("destinationAreaId").is_some());
    }
}
