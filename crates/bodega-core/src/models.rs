use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical form of a SKU: surrounding whitespace stripped, uppercased.
/// Uniqueness inside a staged document is decided over this form.
pub fn canonical_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Area {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit_of_measure: String,
    pub supplier_tax_id: String,
    pub supplier_name: String,
}

/// One row of a stock-by-area search. A point-in-time read: never updated in
/// place, superseded by issuing the search again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshotEntry {
    pub sku: String,
    pub product_name: String,
    pub unit_of_measure: String,
    #[serde(rename = "cantidadTotal")]
    pub available_quantity: Decimal,
    pub area_id: i64,
    #[serde(rename = "areaNombre")]
    pub area_name: String,
}

/// A flat, already-committed ingress movement as the history endpoint
/// returns it. Immutable except through the explicit line-update operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMovementRow {
    pub id: i64,
    pub date: NaiveDate,
    pub document_number: String,
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub net_amount: Decimal,
    pub gross_amount: Decimal,
    pub responsible: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingSummary {
    pub folio: i64,
    pub date: NaiveDate,
    pub responsible: String,
    #[serde(rename = "destino")]
    pub destination: String,
    pub total_net: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingDetailRow {
    pub product_name: String,
    #[serde(rename = "usuarioResponsable")]
    pub responsible: String,
    #[serde(rename = "areaOrigen")]
    pub origin_area: String,
    #[serde(rename = "areaDestino")]
    pub destination_area: String,
    #[serde(rename = "tipoSalida")]
    pub movement_kind: String,
    #[serde(rename = "cantidad")]
    pub quantity: Decimal,
    #[serde(rename = "valorNeto")]
    pub net_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{StockSnapshotEntry, canonical_sku};

    #[test]
    fn canonical_sku_trims_and_uppercases() {
        assert_eq!(canonical_sku("  ab-01 "), "AB-01");
        assert_eq!(canonical_sku("AB-01"), "AB-01");
    }

    #[test]
    fn stock_snapshot_reads_the_mixed_language_wire_shape() {
        let json = r#"{
            "sku": "HAR-01",
            "productName": "Harina 25kg",
            "unitOfMeasure": "kg",
            "cantidadTotal": "40",
            "areaId": 1,
            "areaNombre": "Bodega central"
        }"#;
        let entry: StockSnapshotEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.available_quantity, Decimal::from(40));
        assert_eq!(entry.area_name, "Bodega central");
    }
}
