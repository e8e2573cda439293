use sqlx::{PgExecutor, Result as SqlxResult};

use crate::models::TeamRow;

/// Catalog restriction; a `None` bound leaves that axis unconstrained and an
/// empty country list matches every country.
#[derive(Debug, Clone, Default)]
pub struct TeamQuery {
    pub min_stars: Option<i16>,
    pub max_stars: Option<i16>,
    pub countries: Vec<String>,
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    query: &TeamQuery,
) -> SqlxResult<Vec<TeamRow>> {
    // Optional predicates keep a single prepared statement
    sqlx::query_as::<_, TeamRow>(
        r#"
        SELECT id, name, short_name, icon_url, country, stars
        FROM teams
        WHERE ($1::smallint IS NULL OR stars >= $1)
          AND ($2::smallint IS NULL OR stars <= $2)
          AND (cardinality($3::text[]) = 0 OR country = ANY($3::text[]))
        ORDER BY id ASC
        "#,
    )
    .bind(query.min_stars)
    .bind(query.max_stars)
    .bind(query.countries.as_slice())
    .fetch_all(executor)
    .await
}

pub async fn list_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[i32],
) -> SqlxResult<Vec<TeamRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, TeamRow>(
        r#"
        SELECT id, name, short_name, icon_url, country, stars
        FROM teams
        WHERE id = ANY($1::int4[])
        ORDER BY id ASC
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}
