//! "Similar products" queries.
//!
//! Candidates are every product except the source whose `visible` flag is not
//! explicitly false. They are ranked in the database by
//! `category_match * CATEGORY_WEIGHT + tag_matches`, then `featured`, then
//! recency, with `id` as the last key so a fixed snapshot always yields the
//! same order. Only positive scores are ranked; short lists are topped up with
//! a random sample, and a list with nothing positive is replaced by one.

use efta_core::{plan_fill, FillPlan, Similarity, SimilarityProfile, CATEGORY_WEIGHT};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::products::{get_product, product_columns, ProductRow};
use crate::DbError;

/// `TRUE` when either category column of `p` equals the bound source category.
macro_rules! category_match {
    ($param:literal) => {
        concat!(
            "(BTRIM(p.category) = ",
            $param,
            " OR BTRIM(p.legacy_category) = ",
            $param,
            ") IS TRUE"
        )
    };
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_match: bool,
    tag_matches: i32,
}

/// A recommended product with its similarity annotations.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarProductRow {
    #[serde(flatten)]
    pub product: ProductRow,
    #[serde(flatten)]
    pub similarity: Similarity,
}

/// Outcome of a similar-products lookup.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarProducts {
    /// Ranked items first, then any random picks.
    pub products: Vec<SimilarProductRow>,
    /// The source product's category and tags.
    pub current: SimilarityProfile,
}

impl SimilarProducts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.products.len()
    }
}

/// Find up to `limit` visible products similar to `product_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `product_id` does not exist, or
/// [`DbError::Sqlx`] if any query fails. No partial result is returned.
pub async fn find_similar_products(
    pool: &PgPool,
    product_id: Uuid,
    limit: usize,
) -> Result<SimilarProducts, DbError> {
    let source = get_product(pool, product_id)
        .await?
        .ok_or(DbError::NotFound)?;
    let profile = SimilarityProfile::new(source.category.as_deref(), &source.tags);

    let mut ranked = if profile.is_empty() {
        Vec::new()
    } else {
        rank_candidates(pool, product_id, &profile, limit).await?
    };

    let scores: Vec<Similarity> = ranked.iter().map(|row| row.similarity).collect();
    let products = match plan_fill(&scores, limit) {
        FillPlan::Complete => {
            tracing::debug!(%product_id, count = ranked.len(), "similar products fully ranked");
            ranked
        }
        FillPlan::Backfill { count } => {
            tracing::debug!(
                %product_id,
                ranked = ranked.len(),
                backfill = count,
                "backfilling similar products with random picks"
            );
            let exclude: Vec<Uuid> = std::iter::once(product_id)
                .chain(ranked.iter().map(|row| row.product.id))
                .collect();
            let extra = sample_candidates(pool, &profile, &exclude, count).await?;
            ranked.extend(extra);
            ranked
        }
        FillPlan::RandomSample { count } => {
            tracing::debug!(
                %product_id,
                sample = count,
                "no similar products scored; falling back to a random sample"
            );
            sample_candidates(pool, &profile, &[product_id], count).await?
        }
    };

    Ok(SimilarProducts {
        products,
        current: profile,
    })
}

/// Top `limit` positive-score candidates in ranked order.
async fn rank_candidates(
    pool: &PgPool,
    product_id: Uuid,
    profile: &SimilarityProfile,
    limit: usize,
) -> Result<Vec<SimilarProductRow>, DbError> {
    let rows = sqlx::query_as::<_, CandidateRow>(concat!(
        "WITH candidates AS ( \
             SELECT ",
        product_columns!(),
        ", ",
        category_match!("$2"),
        " AS category_match, \
                 cardinality(ARRAY( \
                     SELECT BTRIM(t) FROM unnest(p.tags) AS t \
                     INTERSECT SELECT unnest($3::TEXT[]) \
                 ))::INT4 AS tag_matches \
             FROM products p \
             WHERE p.id <> $1 \
               AND p.visible IS DISTINCT FROM FALSE \
         ), scored AS ( \
             SELECT c.*, \
                    (CASE WHEN c.category_match THEN $4::INT4 ELSE 0 END) + c.tag_matches \
                        AS similarity_score \
             FROM candidates c \
         ) \
         SELECT * FROM scored \
         WHERE similarity_score > 0 \
         ORDER BY similarity_score DESC, featured DESC, created_at DESC, id \
         LIMIT $5"
    ))
    .bind(product_id)
    .bind(profile.category.as_deref())
    .bind(&profile.tags)
    .bind(CATEGORY_WEIGHT)
    .bind(as_sql_limit(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SimilarProductRow {
            product: row.product,
            similarity: Similarity::new(row.category_match, row.tag_matches),
        })
        .collect())
}

/// Up to `count` distinct eligible products chosen uniformly at random,
/// skipping every id in `exclude`.
async fn sample_candidates(
    pool: &PgPool,
    profile: &SimilarityProfile,
    exclude: &[Uuid],
    count: usize,
) -> Result<Vec<SimilarProductRow>, DbError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, CandidateRow>(concat!(
        "SELECT ",
        product_columns!(),
        ", ",
        category_match!("$2"),
        " AS category_match, 0::INT4 AS tag_matches \
         FROM products p \
         WHERE p.visible IS DISTINCT FROM FALSE \
           AND p.id <> ALL($1::UUID[]) \
         ORDER BY random() \
         LIMIT $3"
    ))
    .bind(exclude)
    .bind(profile.category.as_deref())
    .bind(as_sql_limit(count))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SimilarProductRow {
            product: row.product,
            similarity: Similarity::sampled(row.category_match),
        })
        .collect())
}

fn as_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
