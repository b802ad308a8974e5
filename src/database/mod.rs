//! SQLite-backed storage for pharmacy links

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::info;

use crate::models::PharmacyLink;
use crate::traits::LinkStore;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Create database file (and its directory) if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            if let Some(parent) = db_url
                .strip_prefix("sqlite:")
                .map(|path| path.trim_start_matches("//"))
                .and_then(|path| std::path::Path::new(path.split('?').next()?).parent())
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            info!("Creating database file");
            Sqlite::create_database(db_url)
                .await
                .with_context(|| format!("Failed to create database at {db_url}"))?;
        }

        let pool = SqlitePool::connect(db_url)
            .await
            .context("Failed to connect to database")?;

        Self::migrate(pool).await
    }

    /// Single-connection in-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!("Database initialized successfully");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn find_link(&self, id: &str) -> Result<Option<PharmacyLink>> {
        let row = sqlx::query(
            r"
            SELECT id, medication_name, pharmacy_name, product_url, presentation,
                   commercial_name, is_active, regular_price, sale_price
            FROM pharmacy_links
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| link_from_row(&row)))
    }
}

fn link_from_row(row: &SqliteRow) -> PharmacyLink {
    PharmacyLink {
        id: row.get("id"),
        medication_name: row.get("medication_name"),
        pharmacy_name: row.get("pharmacy_name"),
        product_url: row.get("product_url"),
        presentation: row.get("presentation"),
        commercial_name: row.get("commercial_name"),
        is_active: row.get("is_active"),
        regular_price: row.get("regular_price"),
        sale_price: row.get("sale_price"),
    }
}

#[async_trait]
impl LinkStore for Database {
    async fn active_links(&self) -> Result<Vec<PharmacyLink>> {
        let rows = sqlx::query(
            r"
            SELECT id, medication_name, pharmacy_name, product_url, presentation,
                   commercial_name, is_active, regular_price, sale_price
            FROM pharmacy_links
            WHERE is_active = 1
            ORDER BY rowid
            ",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query active pharmacy links")?;

        Ok(rows.iter().map(link_from_row).collect())
    }

    async fn update_prices(
        &self,
        id: &str,
        regular_price: Option<i64>,
        sale_price: Option<i64>,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE pharmacy_links
            SET regular_price = ?, sale_price = ?
            WHERE id = ?
            ",
        )
        .bind(regular_price)
        .bind(sale_price)
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update prices for link {id}"))?;

        if result.rows_affected() == 0 {
            bail!("No pharmacy link with id {id}");
        }

        Ok(())
    }
}
