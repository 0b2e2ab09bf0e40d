//! Debounced, query-driven lookup over the remote catalog, powering
//! autocomplete in both builders. Last query wins: a response belonging to a
//! superseded query is reported as stale instead of data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use bodega_core::{CatalogDirectory, CatalogProduct, MovementError, StockSnapshotEntry};

pub const MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub enum SearchScope {
    /// Catalog products, optionally limited to one supplier.
    Products { supplier_tax_id: Option<String> },
    /// Stock rows in one area, or across all areas when `None`.
    Stock { area_id: Option<i64> },
}

#[derive(Debug, Clone)]
pub enum Suggestion {
    Product(CatalogProduct),
    Stock(StockSnapshotEntry),
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Query shorter than the minimum; no remote call was made.
    TooShort,
    /// A newer query was issued while this one was pending.
    Superseded,
    Hits(Vec<Suggestion>),
}

pub struct SuggestionIndex {
    catalog: Arc<dyn CatalogDirectory>,
    debounce: Duration,
    generation: AtomicU64,
}

impl SuggestionIndex {
    pub fn new(catalog: Arc<dyn CatalogDirectory>) -> Self {
        Self::with_debounce(catalog, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(catalog: Arc<dyn CatalogDirectory>, debounce: Duration) -> Self {
        Self {
            catalog,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// Issues a debounced search. Each call supersedes every earlier pending
    /// call on this index; superseded calls resolve to
    /// [`SearchOutcome::Superseded`] whether they were still waiting out the
    /// quiet period or already in flight.
    pub async fn search(
        &self,
        scope: SearchScope,
        query: &str,
    ) -> Result<SearchOutcome, MovementError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(SearchOutcome::TooShort);
        }

        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != issued {
            debug!(%query, "search superseded during quiet period");
            return Ok(SearchOutcome::Superseded);
        }

        let hits = match &scope {
            SearchScope::Products { supplier_tax_id } => self
                .product_hits(supplier_tax_id.as_deref(), query)
                .await?,
            SearchScope::Stock { area_id } => self
                .catalog
                .search_stock(*area_id, query)
                .await
                .map_err(MovementError::remote)?
                .into_iter()
                .map(Suggestion::Stock)
                .collect(),
        };

        // The remote call may have outlived a newer keystroke.
        if self.generation.load(Ordering::SeqCst) != issued {
            debug!(%query, "search superseded in flight");
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Hits(hits))
    }

    async fn product_hits(
        &self,
        supplier_tax_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<Suggestion>, MovementError> {
        let needle = query.to_lowercase();
        let products = self
            .catalog
            .list_products()
            .await
            .map_err(MovementError::remote)?;
        Ok(products
            .into_iter()
            .filter(|p| {
                supplier_tax_id.is_none_or(|id| p.supplier_tax_id.eq_ignore_ascii_case(id))
            })
            .filter(|p| {
                p.sku.to_lowercase().contains(&needle)
                    || p.name.to_lowercase().contains(&needle)
                    || p.supplier_tax_id.to_lowercase().contains(&needle)
            })
            .map(Suggestion::Product)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use bodega_core::{CatalogProduct, StockSnapshotEntry};
    use bodega_memstore::InMemoryWarehouse;

    use super::{SearchOutcome, SearchScope, Suggestion, SuggestionIndex};

    fn product(sku: &str, name: &str, supplier_tax_id: &str) -> CatalogProduct {
        CatalogProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            category: "Supplies".to_string(),
            unit_of_measure: "unit".to_string(),
            supplier_tax_id: supplier_tax_id.to_string(),
            supplier_name: format!("Supplier {supplier_tax_id}"),
        }
    }

    async fn seeded_index() -> SuggestionIndex {
        let store = Arc::new(InMemoryWarehouse::new());
        store.seed_product(product("HAR-01", "Harina 25kg", "76.1-K")).await;
        store.seed_product(product("AZU-02", "Azucar 1kg", "76.1-K")).await;
        store.seed_product(product("DET-09", "Detergente", "77.2-0")).await;
        store
            .seed_stock(StockSnapshotEntry {
                sku: "HAR-01".to_string(),
                product_name: "Harina 25kg".to_string(),
                unit_of_measure: "kg".to_string(),
                available_quantity: Decimal::from(40),
                area_id: 1,
                area_name: "Central warehouse".to_string(),
            })
            .await;
        SuggestionIndex::with_debounce(store, Duration::from_millis(300))
    }

    fn all_products() -> SearchScope {
        SearchScope::Products {
            supplier_tax_id: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_never_reach_the_catalog() {
        let index = seeded_index().await;
        assert!(matches!(
            index.search(all_products(), "h").await.unwrap(),
            SearchOutcome::TooShort
        ));
        assert!(matches!(
            index.search(all_products(), "  h  ").await.unwrap(),
            SearchOutcome::TooShort
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn filters_case_insensitively_over_sku_and_name() {
        let index = seeded_index().await;
        let SearchOutcome::Hits(hits) = index.search(all_products(), "har").await.unwrap() else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 1);
        let Suggestion::Product(p) = &hits[0] else {
            panic!("expected a product");
        };
        assert_eq!(p.sku, "HAR-01");
    }

    #[tokio::test(start_paused = true)]
    async fn scope_limits_products_to_one_supplier() {
        let index = seeded_index().await;
        let scope = SearchScope::Products {
            supplier_tax_id: Some("76.1-k".to_string()),
        };
        let SearchOutcome::Hits(hits) = index.search(scope, "kg").await.unwrap() else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stock_scope_searches_the_snapshot_feed() {
        let index = seeded_index().await;
        let scope = SearchScope::Stock { area_id: Some(1) };
        let SearchOutcome::Hits(hits) = index.search(scope, "harina").await.unwrap() else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 1);
        assert!(matches!(&hits[0], Suggestion::Stock(e) if e.area_id == 1));

        let elsewhere = SearchScope::Stock { area_id: Some(9) };
        let SearchOutcome::Hits(hits) = index.search(elsewhere, "harina").await.unwrap() else {
            panic!("expected hits");
        };
        assert!(hits.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn an_earlier_query_is_superseded_by_a_later_one() {
        let index = Arc::new(seeded_index().await);

        let first = tokio::spawn({
            let index = index.clone();
            async move { index.search(all_products(), "har").await.unwrap() }
        });
        // Let the first search enter its quiet period, then type again.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let index = index.clone();
            async move { index.search(all_products(), "hari").await.unwrap() }
        });

        assert!(matches!(first.await.unwrap(), SearchOutcome::Superseded));
        assert!(matches!(second.await.unwrap(), SearchOutcome::Hits(_)));
    }
}
