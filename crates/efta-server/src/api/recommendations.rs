use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use efta_core::Similarity;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, parse_product_id, products::ProductItem, ApiError, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SimilarQuery {
    #[serde(alias = "product_id")]
    pub product_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SimilarProductItem {
    #[serde(flatten)]
    product: ProductItem,
    #[serde(flatten)]
    similarity: Similarity,
}

#[derive(Debug, Serialize)]
pub(super) struct CurrentProduct {
    category: String,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SimilarProductsResponse {
    success: bool,
    products: Vec<SimilarProductItem>,
    total: usize,
    current_product: CurrentProduct,
    meta: ResponseMeta,
}

pub(super) async fn similar_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SimilarQuery>, QueryRejection>,
) -> Result<Json<SimilarProductsResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;

    let raw_id = query
        .product_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation(req_id.0.clone(), "productId is required"))?;
    let product_id = parse_product_id(&req_id.0, raw_id)?;

    let limit = state
        .recommendations
        .resolve_limit(query.limit)
        .map_err(|e| ApiError::validation(req_id.0.clone(), e.to_string()))?;

    let result = match efta_db::find_similar_products(&state.pool, product_id, limit).await {
        Ok(result) => result,
        Err(efta_db::DbError::NotFound) => {
            return Err(ApiError::not_found(req_id.0, "product not found"));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    };

    let total = result.total();
    let products = result
        .products
        .into_iter()
        .map(|row| SimilarProductItem {
            product: ProductItem::from(row.product),
            similarity: row.similarity,
        })
        .collect();

    Ok(Json(SimilarProductsResponse {
        success: true,
        products,
        total,
        current_product: CurrentProduct {
            category: result.current.category.unwrap_or_default(),
            tags: result.current.tags,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
