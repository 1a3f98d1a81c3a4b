use async_trait::async_trait;
use sqlx::PgPool;

use zaiko_core::{Product, ProductPage, ProductStore, StoreError};

pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: Option<String>,
    quantity: Option<i64>,
    unit_price: Option<i64>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: Some(row.id),
            name: row.name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, name, quantity, unit_price, created_at";

/// ILIKE pattern matching `filter` anywhere in the name, with the LIKE
/// metacharacters escaped so the search term is matched literally.
/// Postgres treats backslash as the escape character by default.
fn like_pattern(filter: &str) -> String {
    let mut escaped = String::with_capacity(filter.len() + 2);
    escaped.push('%');
    for c in filter.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_page(
        &self,
        filter: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<ProductPage, StoreError> {
        let offset = (page as i64) * (size as i64);

        let (total, rows) = match filter {
            Some(filter) => {
                let pattern = like_pattern(filter);
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE name ILIKE $1")
                        .bind(&pattern)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(db_error)?;
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products WHERE name ILIKE $1 \
                     ORDER BY id DESC LIMIT $2 OFFSET $3"
                ))
                .bind(&pattern)
                .bind(size as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(db_error)?;
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products ORDER BY id DESC LIMIT $1 OFFSET $2"
                ))
                .bind(size as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
                (total, rows)
            }
        };

        Ok(ProductPage {
            content: rows.into_iter().map(Product::from).collect(),
            number: page,
            total_pages: ProductPage::pages_for(total as u64, size),
            total_elements: total as u64,
        })
    }

    async fn find_all(&self, filter: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let rows = match filter {
            Some(filter) => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products WHERE name ILIKE $1 ORDER BY id DESC"
                ))
                .bind(like_pattern(filter))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products ORDER BY id DESC"
                ))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?
            }
        };

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: &Product) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, quantity, unit_price) VALUES ($1, $2, $3) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.unit_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $1, quantity = $2, unit_price = $3 WHERE id = $4 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.unit_price)
        .bind(product.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let affected = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .rows_affected();

        tx.commit().await.map_err(db_error)?;
        Ok(affected)
    }
}
