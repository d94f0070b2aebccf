//! Command handlers called from `main` once config and the pool are ready.

use std::path::Path;

use serde::Serialize;

/// Load a catalog file and upsert every entry in one transaction.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or fails validation, or if
/// the database write fails.
pub(crate) async fn run_seed(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let catalog = efta_core::load_catalog(path)?;
    let written = efta_db::seed_catalog(pool, &catalog.products).await?;
    println!("seeded {written} product(s) from {}", path.display());
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimilarOutput<'a> {
    products: &'a [efta_db::SimilarProductRow],
    total: usize,
    current_product: CurrentProduct<'a>,
}

#[derive(Debug, Serialize)]
struct CurrentProduct<'a> {
    category: &'a str,
    tags: &'a [String],
}

fn render_similar(result: &efta_db::SimilarProducts) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SimilarOutput {
        products: &result.products,
        total: result.total(),
        current_product: CurrentProduct {
            category: result.current.category.as_deref().unwrap_or_default(),
            tags: &result.current.tags,
        },
    })
}

/// Run the similar-products query and print the result as pretty JSON.
///
/// # Errors
///
/// Returns an error for a non-positive limit, an unknown product, or a
/// failed query.
pub(crate) async fn run_similar(
    pool: &sqlx::PgPool,
    config: &efta_core::AppConfig,
    product_id: uuid::Uuid,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    let limit = config.recommendations.resolve_limit(limit)?;
    let result = match efta_db::find_similar_products(pool, product_id, limit).await {
        Ok(result) => result,
        Err(efta_db::DbError::NotFound) => anyhow::bail!("product '{product_id}' not found"),
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(%product_id, total = result.total(), "similar products resolved");
    println!("{}", render_similar(&result)?);
    Ok(())
}
