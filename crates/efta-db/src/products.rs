//! Read operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Column list shared by every product read.
///
/// `category` is resolved on read: the primary column when non-blank,
/// otherwise the legacy column. Callers never see `legacy_category`.
macro_rules! product_columns {
    () => {
        "p.id, p.slug, p.name, p.description, p.price, \
         COALESCE(NULLIF(BTRIM(p.category), ''), NULLIF(BTRIM(p.legacy_category), '')) AS category, \
         p.tags, p.image_url, p.visible, p.featured, p.created_at, p.updated_at"
    };
}
pub(crate) use product_columns;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A product as read from the `products` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Effective category (primary column, falling back to the legacy one).
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    /// `NULL` and `true` both mean visible.
    pub visible: Option<bool>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Whether the storefront may show this product.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }
}

/// A category with the number of visible products filed under it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub category: String,
    pub product_count: i64,
}

/// Input filters for product listing.
///
/// `limit` is `None` to return all products, or `Some(n)` to cap results.
#[derive(Debug, Clone, Default)]
pub struct ProductListFilters<'a> {
    /// Matches either the primary or the legacy category column.
    pub category: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Fetch one product by id, regardless of visibility.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(concat!(
        "SELECT ",
        product_columns!(),
        " FROM products p WHERE p.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// List visible products, featured first, then newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters<'_>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(concat!(
        "SELECT ",
        product_columns!(),
        " FROM products p \
         WHERE p.visible IS DISTINCT FROM FALSE \
           AND ($1::TEXT IS NULL OR BTRIM(p.category) = $1 OR BTRIM(p.legacy_category) = $1) \
           AND ($2::TEXT IS NULL OR $2 = ANY(p.tags)) \
           AND ($3::BOOLEAN IS NULL OR p.featured = $3) \
         ORDER BY p.featured DESC, p.created_at DESC, p.id \
         LIMIT COALESCE($4, 9223372036854775807)"
    ))
    .bind(filters.category)
    .bind(filters.tag)
    .bind(filters.featured)
    .bind(filters.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct effective categories of visible products, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT category, COUNT(*) AS product_count \
         FROM ( \
             SELECT COALESCE(NULLIF(BTRIM(p.category), ''), NULLIF(BTRIM(p.legacy_category), '')) AS category \
             FROM products p \
             WHERE p.visible IS DISTINCT FROM FALSE \
         ) c \
         WHERE category IS NOT NULL \
         GROUP BY category \
         ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
