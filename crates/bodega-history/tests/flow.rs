//! End-to-end flow against the in-memory warehouse: stage and submit an
//! ingress document, regroup the persisted history, preview a pending edit,
//! commit it, and confirm the regrouped aggregates follow storage.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use bodega_core::LinePatch;
use bodega_history::{DocumentAggregator, OutgoingHistory, recompute_with_pending_edit};
use bodega_memstore::InMemoryWarehouse;
use bodega_staging::{
    ConsumptionGuideBuilder, ConsumptionHeader, IngressBuilder, IngressHeader, LineInput,
    OriginMode,
};

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_test_writer()
        .try_init();
}

fn line(sku: &str, quantity: i64, unit_price: i64) -> LineInput {
    LineInput {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        quantity: d(quantity),
        unit_price: d(unit_price),
        area_id: Some(1),
        area_name: "Central warehouse".to_string(),
        category: "Supplies".to_string(),
        unit_of_measure: "unit".to_string(),
        is_new_product: false,
    }
}

#[tokio::test]
async fn ingress_history_follows_storage_through_an_edit() {
    init_tracing();
    let store = Arc::new(InMemoryWarehouse::new());

    let mut builder = IngressBuilder::new(store.clone());
    builder.add_line(line("A-1", 10, 1000)).unwrap();
    builder.add_line(line("B-2", 5, 2000)).unwrap();
    let header = IngressHeader {
        date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        document_number: "F-1001".to_string(),
        supplier_tax_id: "76.123.456-7".to_string(),
        supplier_name: "Proveedora Sur".to_string(),
    };
    builder.finalize(&header, "jperez").await.unwrap();

    let aggregator = DocumentAggregator::new(store.clone());
    let documents = aggregator.load().await.unwrap();
    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert_eq!(document.children.len(), 2);
    assert_eq!(document.total_net, d(20_000));

    // Preview the correction before committing it.
    let edited_id = document.children[0].id;
    let pending = LinePatch {
        quantity: d(12),
        unit_cost: d(1000),
    };
    let preview = recompute_with_pending_edit(document, edited_id, &pending).unwrap();
    assert_eq!(preview.total_net, d(22_000));
    assert_eq!(document.total_net, d(20_000));

    // Commit reloads from storage rather than patching the cached groups.
    let documents = aggregator.commit_edit(edited_id, &pending).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].total_net, d(22_000));
    let gross: Decimal = documents[0].children.iter().map(|r| r.gross_amount).sum();
    assert_eq!(documents[0].total_gross, gross);
}

#[tokio::test]
async fn commit_edit_failure_leaves_history_untouched() {
    init_tracing();
    let store = Arc::new(InMemoryWarehouse::new());
    let aggregator = DocumentAggregator::new(store);
    let pending = LinePatch {
        quantity: d(1),
        unit_cost: d(1),
    };
    let err = aggregator.commit_edit(404, &pending).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn outgoing_guides_show_up_with_a_consistent_detail_total() {
    init_tracing();
    let store = Arc::new(InMemoryWarehouse::new());
    store.seed_area(1, "Central warehouse").await;
    store.seed_area(2, "Kitchen").await;
    store
        .seed_product(bodega_core::CatalogProduct {
            sku: "A-1".to_string(),
            name: "Product A-1".to_string(),
            category: "Supplies".to_string(),
            unit_of_measure: "unit".to_string(),
            supplier_tax_id: "76.123.456-7".to_string(),
            supplier_name: "Proveedora Sur".to_string(),
        })
        .await;
    store
        .seed_stock(bodega_core::StockSnapshotEntry {
            sku: "A-1".to_string(),
            product_name: "Product A-1".to_string(),
            unit_of_measure: "unit".to_string(),
            available_quantity: d(50),
            area_id: 1,
            area_name: "Central warehouse".to_string(),
        })
        .await;

    // Receive first so consumption has a cost to price from.
    let mut ingress = IngressBuilder::new(store.clone());
    ingress.add_line(line("A-1", 10, 1000)).unwrap();
    let header = IngressHeader {
        date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        document_number: "F-1001".to_string(),
        supplier_tax_id: "76.123.456-7".to_string(),
        supplier_name: "Proveedora Sur".to_string(),
    };
    ingress.finalize(&header, "jperez").await.unwrap();

    let mut guide = ConsumptionGuideBuilder::new(
        store.clone(),
        OriginMode::Fixed {
            area_id: 1,
            area_name: "Central warehouse".to_string(),
        },
    );
    guide.select_product(bodega_core::StockSnapshotEntry {
        sku: "A-1".to_string(),
        product_name: "Product A-1".to_string(),
        unit_of_measure: "unit".to_string(),
        available_quantity: d(50),
        area_id: 1,
        area_name: "Central warehouse".to_string(),
    });
    guide.add_line(d(4), None).unwrap();
    let receipt = guide
        .finalize(
            &ConsumptionHeader {
                date: NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
                reason_code: "CONSUMO".to_string(),
            },
            "jperez",
        )
        .await
        .unwrap();

    let outgoing = OutgoingHistory::new(store.clone());
    let summary = outgoing.summary_for(receipt.folio).await.unwrap();
    assert_eq!(summary.destination, "Central warehouse");

    let detail = outgoing.detail(receipt.folio).await.unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0].quantity, d(4));
    assert_eq!(detail[0].net_amount, d(4_000));
    assert_eq!(OutgoingHistory::detail_total(&detail), summary.total_net);
}
