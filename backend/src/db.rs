use anyhow::Result;
use shared::{Book, NewBook};
use sqlx::sqlite::SqliteRow;
use sqlx::{migrate::MigrateDatabase, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

/// Optional filters for listing books. Each present field is a
/// case-insensitive substring match; all present fields must match.
///
/// Case is folded with [`str::to_lowercase`], so matching covers all of
/// Unicode and not just the ASCII range SQLite's `lower()` handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // AUTOINCREMENT keeps ids of deleted books from being handed out again.
        // The *_lc columns hold the case-folded text the list filters search.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                title_lc TEXT NOT NULL,
                description_lc TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert a book and return it with its assigned id
    pub async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let result = sqlx::query(
            "INSERT INTO books (title, description, title_lc, description_lc) VALUES (?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.title.to_lowercase())
        .bind(book.description.to_lowercase())
        .execute(&self.pool)
        .await?;

        Ok(Book {
            id: result.last_insert_rowid(),
            title: book.title.clone(),
            description: book.description.clone(),
        })
    }

    /// Retrieve a book by its id
    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, description FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_book))
    }

    /// List books matching the filter, ordered by ascending id
    pub async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT id, title, description FROM books WHERE 1 = 1");

        // instr() rather than LIKE so '%' and '_' in the search text match literally
        if let Some(title) = &filter.title {
            query
                .push(" AND instr(title_lc, ")
                .push_bind(title.to_lowercase())
                .push(") > 0");
        }
        if let Some(description) = &filter.description {
            query
                .push(" AND instr(description_lc, ")
                .push_bind(description.to_lowercase())
                .push(") > 0");
        }
        query.push(" ORDER BY id ASC");

        debug!("list_books: {}", query.sql());
        let rows = query.build().fetch_all(&self.pool).await?;

        Ok(rows.iter().map(row_to_book).collect())
    }

    /// Overwrite title and description of an existing book.
    /// Returns false if no book has that id.
    pub async fn update_book(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, description = ?, title_lc = ?, description_lc = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.title.to_lowercase())
        .bind(book.description.to_lowercase())
        .bind(book.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a book by its id.
    /// Returns false if no book has that id.
    pub async fn delete_book(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_book(row: &SqliteRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
    }
}
