use efta_core::CatalogEntry;
use sqlx::PgPool;

use crate::DbError;

/// Upsert catalog entries into `products`, keyed by slug.
///
/// Returns the number of products processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool, entries: &[CatalogEntry]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for entry in entries {
        let slug = entry.slug();
        let tags = entry.normalized_tags();

        sqlx::query(
            "INSERT INTO products \
                 (slug, name, description, price, category, legacy_category, tags, \
                  image_url, visible, featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name            = EXCLUDED.name, \
                 description     = EXCLUDED.description, \
                 price           = EXCLUDED.price, \
                 category        = EXCLUDED.category, \
                 legacy_category = EXCLUDED.legacy_category, \
                 tags            = EXCLUDED.tags, \
                 image_url       = EXCLUDED.image_url, \
                 visible         = EXCLUDED.visible, \
                 featured        = EXCLUDED.featured, \
                 updated_at      = NOW()",
        )
        .bind(&slug)
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(entry.price)
        .bind(&entry.category)
        .bind(&entry.legacy_category)
        .bind(&tags)
        .bind(&entry.image_url)
        .bind(entry.visible)
        .bind(entry.featured)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    tracing::info!(count, "catalog seeded");
    Ok(count)
}
