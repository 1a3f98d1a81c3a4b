use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use zaiko_core::{export, Product, ProductPage};

use crate::{error::AppError, state::AppState};

/// Fixed window size for the list and search pages.
const PAGE_SIZE: u32 = 10;

const EXPORT_CONTENT_TYPE: &str = "text/csv; charset=UTF-8";
const EXPORT_DISPOSITION: &str =
    "attachment; filename=\"products.csv\"; filename*=UTF-8''products.csv";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: u32,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcTotalQuery {
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalResponse {
    pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    pub total: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let total = product.total();
        Self {
            id: product.id,
            name: product.name,
            quantity: product.quantity,
            unit_price: product.unit_price,
            total,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub content: Vec<ProductResponse>,
    pub number: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl From<ProductPage> for PageResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            content: page.content.into_iter().map(ProductResponse::from).collect(),
            number: page.number,
            total_pages: page.total_pages,
            total_elements: page.total_elements,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/details/{id}", get(details))
        .route("/edit/{id}", put(edit))
        .route("/delete/{id}", delete(remove))
        .route("/calc-total", get(calc_total))
        .route("/search", get(search))
        .route("/export", get(export_csv))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /products?page=0&q=
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let page = state
        .products
        .list_paged(query.page, PAGE_SIZE, query.q.as_deref())
        .await?;
    Ok(Json(page.into()))
}

/// GET /products/search?q=&page= — same shape as the list, consumed by
/// the live search box.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let page = state
        .products
        .list_paged(query.page, PAGE_SIZE, query.q.as_deref())
        .await?;
    Ok(Json(page.into()))
}

/// POST /products/create
async fn create(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    validate_form(&form)?;

    let saved = state.products.save(form.into_product(None)).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// GET /products/details/{id}
async fn details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.get(id).await?;
    Ok(Json(product.into()))
}

/// PUT /products/edit/{id} — full replace of the mutable fields.
async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<ProductForm>,
) -> Result<Json<ProductResponse>, AppError> {
    validate_form(&form)?;

    let saved = state.products.save(form.into_product(Some(id))).await?;
    Ok(Json(saved.into()))
}

/// DELETE /products/delete/{id} — deleting an unknown id still answers
/// 204.
async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /products/calc-total?quantity=&unitPrice= — both default to 0.
async fn calc_total(Query(query): Query<CalcTotalQuery>) -> Json<TotalResponse> {
    let total = zaiko_core::total(
        Some(query.quantity.unwrap_or(0)),
        Some(query.unit_price.unwrap_or(0)),
    );
    Json(TotalResponse { total })
}

/// GET /products/export?q= — the whole filtered listing as one CSV
/// attachment.
async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let products = state.products.list_all(query.q.as_deref()).await?;
    let payload = export::to_csv(&products);

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, EXPORT_DISPOSITION),
        ],
        payload,
    )
        .into_response())
}

// ============================================================================
// Validation
// ============================================================================

impl ProductForm {
    fn into_product(self, id: Option<i64>) -> Product {
        Product {
            id,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            created_at: None,
        }
    }
}

/// Field-level checks applied before anything reaches the store: a
/// rejected form causes no write at all.
fn validate_form(form: &ProductForm) -> Result<(), AppError> {
    let mut fields = BTreeMap::new();

    match &form.name {
        Some(name) if !name.trim().is_empty() => {}
        _ => {
            fields.insert("name", "must not be blank".to_string());
        }
    }
    match form.quantity {
        Some(q) if q >= 0 => {}
        Some(_) => {
            fields.insert("quantity", "must be zero or greater".to_string());
        }
        None => {
            fields.insert("quantity", "is required".to_string());
        }
    }
    match form.unit_price {
        Some(u) if u >= 1 => {}
        Some(_) => {
            fields.insert("unitPrice", "must be one or greater".to_string());
        }
        None => {
            fields.insert("unitPrice", "is required".to_string());
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: Option<&str>, quantity: Option<i64>, unit_price: Option<i64>) -> ProductForm {
        ProductForm {
            name: name.map(str::to_string),
            quantity,
            unit_price,
        }
    }

    fn rejected_fields(form: &ProductForm) -> BTreeMap<&'static str, String> {
        match validate_form(form).unwrap_err() {
            AppError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate_form(&form(Some("Laptop"), Some(0), Some(1))).is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(rejected_fields(&form(Some("   "), Some(1), Some(1))).contains_key("name"));
        assert!(rejected_fields(&form(None, Some(1), Some(1))).contains_key("name"));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        assert!(rejected_fields(&form(Some("x"), Some(-1), Some(1))).contains_key("quantity"));
        assert!(rejected_fields(&form(Some("x"), None, Some(1))).contains_key("quantity"));
    }

    #[test]
    fn test_non_positive_unit_price_is_rejected() {
        assert!(rejected_fields(&form(Some("x"), Some(1), Some(0))).contains_key("unitPrice"));
        assert!(rejected_fields(&form(Some("x"), Some(1), None)).contains_key("unitPrice"));
    }

    #[test]
    fn test_invalid_form_reports_every_field() {
        let fields = rejected_fields(&form(None, Some(-2), Some(0)));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_product_response_carries_derived_total() {
        let product = Product {
            id: Some(7),
            name: Some("Cable".to_string()),
            quantity: Some(3),
            unit_price: Some(400),
            created_at: None,
        };
        let response = ProductResponse::from(product);
        assert_eq!(response.total, 1200);
    }
}
