use crate::db::{BookFilter, DbConnection};
use crate::error::{ApiError, ApiResult};
use anyhow::Result;
use async_trait::async_trait;
use shared::{Book, BookListQuery, BookRequest};
use tracing::info;

/// A persisted record type that can be looked up by its integer id.
#[async_trait]
pub trait Model: Sized + Send {
    /// Name used in error messages
    const NAME: &'static str;

    async fn find_by_id(db: &DbConnection, id: i64) -> Result<Option<Self>>;
}

#[async_trait]
impl Model for Book {
    const NAME: &'static str = "Book";

    async fn find_by_id(db: &DbConnection, id: i64) -> Result<Option<Self>> {
        db.get_book(id).await
    }
}

/// Parse a raw path id and fetch the matching record.
///
/// An id that is not an integer is a bad request; a well-formed id with no
/// record behind it is not found.
pub async fn validate_model<M: Model>(db: &DbConnection, raw_id: &str) -> ApiResult<M> {
    let id: i64 = raw_id.trim().parse().map_err(|_| ApiError::InvalidId {
        model: M::NAME,
        id: raw_id.to_string(),
    })?;

    M::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound { model: M::NAME, id })
}

impl From<BookListQuery> for BookFilter {
    fn from(query: BookListQuery) -> Self {
        // An empty parameter imposes no filter
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            title: non_empty(query.title),
            description: non_empty(query.description),
        }
    }
}

#[derive(Clone)]
pub struct BookService {
    db: DbConnection,
}

impl BookService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Release the storage connections once no more requests will arrive
    pub async fn close(&self) {
        self.db.close().await;
    }

    pub async fn create_book(&self, request: BookRequest) -> ApiResult<Book> {
        let new_book = request.into_new_book()?;
        let book = self.db.insert_book(&new_book).await?;
        info!("Created book {}", book.id);
        Ok(book)
    }

    pub async fn list_books(&self, query: BookListQuery) -> ApiResult<Vec<Book>> {
        let filter = BookFilter::from(query);
        let books = self.db.list_books(&filter).await?;
        info!("Found {} books matching {:?}", books.len(), filter);
        Ok(books)
    }

    pub async fn get_book(&self, raw_id: &str) -> ApiResult<Book> {
        validate_model(&self.db, raw_id).await
    }

    /// Replace both fields of an existing book. The lookup happens before the
    /// body is checked, so an unknown id wins over a bad body.
    pub async fn update_book(&self, raw_id: &str, request: BookRequest) -> ApiResult<Book> {
        let mut book: Book = validate_model(&self.db, raw_id).await?;
        let fields = request.into_new_book()?;

        book.title = fields.title;
        book.description = fields.description;

        // Deleted between lookup and write
        if !self.db.update_book(&book).await? {
            return Err(ApiError::NotFound { model: Book::NAME, id: book.id });
        }
        info!("Updated book {}", book.id);
        Ok(book)
    }

    pub async fn delete_book(&self, raw_id: &str) -> ApiResult<()> {
        let book: Book = validate_model(&self.db, raw_id).await?;

        if !self.db.delete_book(book.id).await? {
            return Err(ApiError::NotFound { model: Book::NAME, id: book.id });
        }
        info!("Deleted book {}", book.id);
        Ok(())
    }
}
