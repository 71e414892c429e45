use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted book record.
///
/// Serializes to exactly `id`, `title` and `description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Storage-assigned identifier, immutable after creation
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// Body of `POST /books` and `PUT /books/{id}`.
///
/// Both fields are optional on the wire so that a missing key can be
/// reported by name instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A validated book payload, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
}

/// A required key that was absent from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing {}", self.0)
    }
}

impl std::error::Error for MissingField {}

impl BookRequest {
    /// Check that every required key is present, reporting the first one
    /// that is not (`title` before `description`).
    pub fn into_new_book(self) -> Result<NewBook, MissingField> {
        let title = self.title.ok_or(MissingField("title"))?;
        let description = self.description.ok_or(MissingField("description"))?;
        Ok(NewBook { title, description })
    }
}

/// Query parameters accepted by `GET /books`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListQuery {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Case-insensitive substring match on the description
    pub description: Option<String>,
}

impl BookListQuery {
    /// Build the filters from raw query-string pairs. When a key repeats, the
    /// first value wins; unrecognized keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "title" => &mut query.title,
                "description" => &mut query.description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// JSON body returned with every error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
