//! Payment records. Append only.

use bson::oid::ObjectId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::store::{
    filter, DocumentStore, InsertOutcome, Page, PAYMENT_COLLECTION_NAME,
};
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Paying student.
    pub student_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::price::optional"
    )]
    pub price: Option<f64>,
    /// Provider reference of the confirmed charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

#[allow(async_fn_in_trait)]
pub trait PaymentDbExt {
    async fn record_payment(&self, payment: Payment) -> Result<InsertOutcome, Problem>;
    async fn list_payments(&self, page: Option<Page>) -> Result<Vec<Document>, Problem>;
    async fn payments_by_student(&self, email: &str) -> Result<Vec<Document>, Problem>;
    async fn get_payment(&self, id: ObjectId) -> Result<Option<Document>, Problem>;
}

impl PaymentDbExt for dyn DocumentStore {
    async fn record_payment(&self, mut payment: Payment) -> Result<InsertOutcome, Problem> {
        if payment.student_email.trim().is_empty() {
            return Err(problems::bad_field("studentEmail", "A payer email is required."));
        }

        super::strip_reserved(&mut payment.extra, &[]);
        tracing::info!(
            "recording payment by {} for {:?}",
            payment.student_email,
            payment.title
        );
        self.insert_one(PAYMENT_COLLECTION_NAME, bson::to_document(&payment)?)
            .await
    }

    async fn list_payments(&self, page: Option<Page>) -> Result<Vec<Document>, Problem> {
        self.find(PAYMENT_COLLECTION_NAME, doc! {}, page).await
    }

    async fn payments_by_student(&self, email: &str) -> Result<Vec<Document>, Problem> {
        self.find(
            PAYMENT_COLLECTION_NAME,
            filter::by_student_email(email),
            None,
        )
        .await
    }

    async fn get_payment(&self, id: ObjectId) -> Result<Option<Document>, Problem> {
        self.find_one(PAYMENT_COLLECTION_NAME, filter::by_id(id)).await
    }
}
