//! Document store seam.
//!
//! Handlers talk to a [`DocumentStore`] through the shared [`Db`] handle that
//! is created once at startup and managed by Rocket. Filters are exact-match
//! documents, updates are `$set` documents.

use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use serde::Serialize;
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};

pub mod mongo;

#[cfg(test)]
pub mod memory;

pub static USER_COLLECTION_NAME: &str = "users";
pub static CLASS_COLLECTION_NAME: &str = "classes";
pub static TEACH_ON_COLLECTION_NAME: &str = "teachOn";
pub static PAYMENT_COLLECTION_NAME: &str = "payment";
pub static FEEDBACK_COLLECTION_NAME: &str = "feedback";
pub static ASSIGNMENT_COLLECTION_NAME: &str = "assignment";
pub static ASSIGNMENT_SUBMIT_COLLECTION_NAME: &str = "assignmentSubmit";

/// Skip/limit window over a listing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Page {
    pub skip: u64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertOutcome {
    pub fn inserted(id: &Bson) -> InsertOutcome {
        InsertOutcome {
            acknowledged: true,
            inserted_id: Some(bson_id_string(id)),
            message: None,
        }
    }

    pub fn skipped(message: impl ToString) -> InsertOutcome {
        InsertOutcome {
            acknowledged: true,
            inserted_id: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateOutcome {
    pub fn new(matched_count: u64, modified_count: u64) -> UpdateOutcome {
        UpdateOutcome {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[rocket::async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    async fn ping(&self) -> Result<(), Problem>;

    /// Lists matching documents in `_id` order.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<Page>,
    ) -> Result<Vec<Document>, Problem>;

    async fn find_one(&self, collection: &str, filter: Document)
        -> Result<Option<Document>, Problem>;

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, Problem>;

    async fn insert_one(&self, collection: &str, document: Document)
        -> Result<InsertOutcome, Problem>;

    /// Inserts `document` only when nothing matches `filter`, as one store
    /// operation. Returns the new id, or `None` when a match already existed.
    async fn insert_if_absent(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<Option<Bson>, Problem>;

    /// Applies `set` as a `$set` update to the first matching document.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, Problem>;

    async fn delete_one(&self, collection: &str, filter: Document)
        -> Result<DeleteOutcome, Problem>;

    /// Adds one to `field` of the first matching document in a single
    /// operation. Absent or non-numeric values count as 0.
    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
    ) -> Result<UpdateOutcome, Problem>;

    async fn close(&self) {}
}

pub type Db = Arc<dyn DocumentStore>;

pub fn bson_id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub mod filter {
    use super::*;

    /// Parses a path id. Malformed ids are a client error.
    pub fn parse_id(id: &str) -> Result<ObjectId, Problem> {
        ObjectId::parse_str(id).map_err(|_| problems::malformed_id(id))
    }

    #[inline]
    pub fn by_id(id: ObjectId) -> Document {
        doc! { "_id": id }
    }

    #[inline]
    pub fn by_email(email: impl Into<String>) -> Document {
        doc! { "email": email.into() }
    }

    #[inline]
    pub fn by_title(title: impl Into<String>) -> Document {
        doc! { "title": title.into() }
    }

    #[inline]
    pub fn by_student_email(email: impl Into<String>) -> Document {
        doc! { "studentEmail": email.into() }
    }
}
