use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::article::Article;
use crate::error::StoreError;

/// SQLite-backed snapshot store.
///
/// Holds the article collection produced by the most recent ingestion cycle.
/// There is no per-article update or delete; writers either clear and refill
/// or swap the whole snapshot, and readers take the collection as-is.
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                thumbnail TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                published_at TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL,
                scraped_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drop the current snapshot. Returns the number of removed rows.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Append one endpoint's articles in a single transaction.
    pub async fn insert_batch(&self, articles: &[Article]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for article in articles {
            insert_article(&mut tx, article).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Replace the whole snapshot in one transaction (stage-and-swap), so a
    /// concurrent reader sees either the old collection or the new one,
    /// never the gap in between.
    pub async fn replace_all(&self, articles: &[Article]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM articles").execute(&mut *tx).await?;
        for article in articles {
            insert_article(&mut tx, article).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Close the connection pool. Every operation after this fails with a
    /// [`StoreError`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn read_all(&self) -> Result<Vec<Article>, StoreError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT title, url, thumbnail, description, published_at, source, scraped_at
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }
}

async fn insert_article(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    article: &Article,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO articles (title, url, thumbnail, description, published_at, source, scraped_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.url)
    .bind(&article.thumbnail)
    .bind(&article.description)
    .bind(&article.published_at)
    .bind(&article.source)
    .bind(&article.scraped_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
