use std::sync::Arc;

use tracing::debug;

use crate::product::Product;
use crate::repository::{ProductPage, ProductStore, StoreError};

/// Listing/search service over an injected store. The store owns all
/// persisted state; the service normalizes the search term and picks
/// paged vs unpaged retrieval.
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// One page under default order (id descending). A blank or
    /// whitespace-only query means no filter. `size` must be > 0.
    pub async fn list_paged(
        &self,
        page: u32,
        size: u32,
        query: Option<&str>,
    ) -> Result<ProductPage, StoreError> {
        self.store
            .find_page(normalize_query(query).as_deref(), page, size)
            .await
    }

    /// Every matching record, same filter and order as `list_paged`,
    /// never capped. Feeds the CSV export.
    pub async fn list_all(&self, query: Option<&str>) -> Result<Vec<Product>, StoreError> {
        self.store.find_all(normalize_query(query).as_deref()).await
    }

    pub async fn get(&self, id: i64) -> Result<Product, StoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    /// Insert when the record has no id yet; otherwise a full replace of
    /// the existing record's mutable fields.
    pub async fn save(&self, product: Product) -> Result<Product, StoreError> {
        match product.id {
            None => self.store.insert(&product).await,
            Some(id) => self
                .store
                .update(&product)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("product {id}"))),
        }
    }

    /// Deleting an id that does not exist is a no-op, matching the
    /// original behavior of delete-by-id.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let affected = self.store.delete(id).await?;
        if affected == 0 {
            debug!(id, "delete matched no rows");
        }
        Ok(())
    }
}

/// Trimmed search term, or None when there is nothing to filter on.
fn normalize_query(query: Option<&str>) -> Option<String> {
    let trimmed = query?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory stand-in honoring the ProductStore contract: filter is a
    /// case-insensitive substring of the name, listings are id-descending.
    struct MemStore {
        rows: Mutex<Vec<Product>>,
        next_id: Mutex<i64>,
    }

    impl MemStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
            }
        }

        fn matching(&self, filter: Option<&str>) -> Vec<Product> {
            let needle = filter.map(|f| f.to_lowercase());
            let mut rows: Vec<Product> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| match (&needle, &p.name) {
                    (None, _) => true,
                    (Some(n), Some(name)) => name.to_lowercase().contains(n),
                    (Some(_), None) => false,
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.id.cmp(&a.id));
            rows
        }
    }

    #[async_trait]
    impl ProductStore for MemStore {
        async fn find_page(
            &self,
            filter: Option<&str>,
            page: u32,
            size: u32,
        ) -> Result<ProductPage, StoreError> {
            let rows = self.matching(filter);
            let total_elements = rows.len() as u64;
            let start = (page as usize) * (size as usize);
            let content = rows.into_iter().skip(start).take(size as usize).collect();
            Ok(ProductPage {
                content,
                number: page,
                total_pages: ProductPage::pages_for(total_elements, size),
                total_elements,
            })
        }

        async fn find_all(&self, filter: Option<&str>) -> Result<Vec<Product>, StoreError> {
            Ok(self.matching(filter))
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == Some(id))
                .cloned())
        }

        async fn insert(&self, product: &Product) -> Result<Product, StoreError> {
            let mut next_id = self.next_id.lock().unwrap();
            let mut stored = product.clone();
            stored.id = Some(*next_id);
            *next_id += 1;
            self.rows.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn update(&self, product: &Product) -> Result<Option<Product>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|p| p.id == product.id) {
                Some(row) => {
                    row.name = product.name.clone();
                    row.quantity = product.quantity;
                    row.unit_price = product.unit_price;
                    Ok(Some(row.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: i64) -> Result<u64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != Some(id));
            Ok((before - rows.len()) as u64)
        }
    }

    fn named(name: &str, quantity: i64, unit_price: i64) -> Product {
        Product {
            id: None,
            name: Some(name.to_string()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            created_at: None,
        }
    }

    async fn seeded_service(names: &[&str]) -> ProductService {
        let store = Arc::new(MemStore::new());
        let service = ProductService::new(store);
        for name in names {
            service.save(named(name, 1, 100)).await.unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_default_order_is_id_descending() {
        let service = seeded_service(&["first", "second", "third"]).await;

        let page = service.list_paged(0, 10, None).await.unwrap();
        let ids: Vec<i64> = page.content.iter().filter_map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_blank_query_equals_no_query() {
        let service = seeded_service(&["Laptop", "Mouse"]).await;

        let without = service.list_paged(0, 10, None).await.unwrap();
        let blank = service.list_paged(0, 10, Some("")).await.unwrap();
        let whitespace = service.list_paged(0, 10, Some("   ")).await.unwrap();

        assert_eq!(without, blank);
        assert_eq!(without, whitespace);
        assert_eq!(without.total_elements, 2);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let service = seeded_service(&["Laptop", "TOP-Cover", "laptop stand", "Mouse"]).await;

        let page = service.list_paged(0, 10, Some("top")).await.unwrap();
        let names: Vec<&str> = page
            .content
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["laptop stand", "TOP-Cover", "Laptop"]);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_matching() {
        let service = seeded_service(&["Laptop"]).await;

        let page = service.list_paged(0, 10, Some("  laptop  ")).await.unwrap();
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty_but_counted() {
        let service = seeded_service(&["a", "b", "c"]).await;

        let page = service.list_paged(5, 2, None).await.unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.number, 5);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn test_list_all_returns_every_match_unpaged() {
        let names: Vec<String> = (0..25).map(|i| format!("item-{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let service = seeded_service(&refs).await;

        let all = service.list_all(None).await.unwrap();
        assert_eq!(all.len(), 25);
        assert_eq!(all[0].id, Some(25));
    }

    #[tokio::test]
    async fn test_save_without_id_inserts_and_assigns_id() {
        let service = seeded_service(&[]).await;

        let saved = service.save(named("Monitor", 4, 30_000)).await.unwrap();
        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.name.as_deref(), Some("Monitor"));
    }

    #[tokio::test]
    async fn test_save_with_id_replaces_fields_and_keeps_id() {
        let service = seeded_service(&["Monitor"]).await;

        let mut edited = named("Monitor 4K", 2, 45_000);
        edited.id = Some(1);
        let saved = service.save(edited).await.unwrap();

        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.name.as_deref(), Some("Monitor 4K"));
        assert_eq!(saved.quantity, Some(2));

        let fetched = service.get(1).await.unwrap();
        assert_eq!(fetched.unit_price, Some(45_000));
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_is_not_found() {
        let service = seeded_service(&[]).await;

        let mut edited = named("ghost", 1, 1);
        edited.id = Some(99);
        let err = service.save(edited).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = seeded_service(&["Keyboard"]).await;

        service.delete(1).await.unwrap();
        let err = service.get(1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_of_missing_id_is_a_no_op() {
        let service = seeded_service(&["Keyboard"]).await;

        service.delete(42).await.unwrap();
        assert_eq!(service.list_all(None).await.unwrap().len(), 1);
    }
}
