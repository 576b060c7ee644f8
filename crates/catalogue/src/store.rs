//! SQLite-backed catalogue store.
//!
//! [`Catalogue`] is the explicit handle every caller passes around: it is
//! opened once at process start, shared by reference, and closed on exit.
//! All queries are parameterised; the only SQL built at runtime is the
//! `ORDER BY` clause, and that comes from [`SortKey`]/[`SortOrder`].

use crate::error::{CatalogueError, Result};
use crate::parser;
use crate::types::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SELECT_COLUMNS: &str = "SELECT id, Title, Director, Year, Description, Genre, Tags FROM movies";

/// Handle to the movie table
#[derive(Debug, Clone)]
pub struct Catalogue {
    pool: SqlitePool,
}

impl Catalogue {
    /// Open (creating if necessary) a catalogue database file
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        info!("Opened catalogue database {:?}", path);
        Self::with_pool(pool).await
    }

    /// Open a private in-memory catalogue.
    ///
    /// Every SQLite connection to `:memory:` gets its own database, so the
    /// pool is pinned to a single connection.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS movies(
                id VARCHAR(4) NOT NULL PRIMARY KEY,
                Title VARCHAR(225),
                Director VARCHAR(225),
                Year INT,
                Description VARCHAR,
                Genre VARCHAR(225),
                Tags VARCHAR
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Catalogue closed");
    }

    // Loading

    /// Load a CSV file into the table.
    ///
    /// Rows are upserted by id, so reloading the same file is a no-op and
    /// reloading an edited file replaces the edited rows. Returns the number
    /// of rows written.
    #[instrument(skip(self))]
    pub async fn load_csv(&self, path: &Path) -> Result<usize> {
        let records = parser::parse_catalogue(path)?;
        let written = self.insert_records(&records).await?;
        info!("Loaded {} movies from {:?}", written, path);
        Ok(written)
    }

    /// Upsert records in a single transaction
    pub async fn insert_records(&self, records: &[MovieRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query("INSERT OR REPLACE INTO movies VALUES(?, ?, ?, ?, ?, ?, ?)")
                .bind(&record.id)
                .bind(&record.title)
                .bind(&record.director)
                .bind(record.year)
                .bind(&record.description)
                .bind(&record.genre)
                .bind(&record.tags)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }

    // Queries

    pub async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Get a movie by id
    pub async fn get(&self, id: &str) -> Result<MovieRecord> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogueError::NotFound { id: id.to_string() })?;
        row_to_record(&row)
    }

    pub async fn fetch_all(&self) -> Result<Vec<MovieRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Every movie whose title differs from `title`.
    ///
    /// Title-based exclusion also drops unrelated movies that happen to
    /// share the title. Recommendation uses [`Catalogue::fetch_excluding_id`].
    pub async fn fetch_excluding(&self, title: &str) -> Result<Vec<MovieRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE Title != ? ORDER BY id");
        let rows = sqlx::query(&sql).bind(title).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Every movie except the one with this id
    pub async fn fetch_excluding_id(&self, id: &str) -> Result<Vec<MovieRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id != ? ORDER BY id");
        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Keyword search over title, director and stored tags
    #[instrument(skip(self))]
    pub async fn fetch_filtered(&self, query: &str) -> Result<Vec<MovieRecord>> {
        let pattern = search_pattern(query);
        let sql = format!(
            "{SELECT_COLUMNS} WHERE Title LIKE ? OR Director LIKE ? OR Tags LIKE ? ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        debug!("Pattern {:?} matched {} movies", pattern, rows.len());
        rows.iter().map(row_to_record).collect()
    }

    /// All movies ordered by a column, optionally truncated
    pub async fn fetch_sorted(
        &self,
        by: SortKey,
        order: SortOrder,
        limit: Option<u32>,
    ) -> Result<Vec<MovieRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} ORDER BY {} {}, id ASC LIMIT ?",
            by.order_expr(),
            order.keyword()
        );
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_record).collect()
    }
}

/// Build the `LIKE` pattern for a free-text search.
///
/// Words are title-cased, spaces become `%` so words may be separated by
/// anything, and the whole is wrapped in `%` for substring matching:
/// `"ridley scott"` becomes `"%Ridley%Scott%"`.
pub fn search_pattern(query: &str) -> String {
    let cased: String = query
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join("%");
    format!("%{}%", cased)
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn row_to_record(row: &SqliteRow) -> Result<MovieRecord> {
    Ok(MovieRecord {
        id: row.try_get("id")?,
        title: row.try_get::<Option<String>, _>("Title")?.unwrap_or_default(),
        director: row.try_get::<Option<String>, _>("Director")?.unwrap_or_default(),
        year: row.try_get::<Option<i32>, _>("Year")?.unwrap_or_default(),
        description: row
            .try_get::<Option<String>, _>("Description")?
            .unwrap_or_default(),
        genre: row.try_get::<Option<String>, _>("Genre")?.unwrap_or_default(),
        tags: row.try_get::<Option<String>, _>("Tags")?.unwrap_or_default(),
    })
}
