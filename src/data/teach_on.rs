//! Teacher applications.

use bson::oid::ObjectId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::store::{
    filter, DocumentStore, InsertOutcome, Page, UpdateOutcome, TEACH_ON_COLLECTION_NAME,
};
use super::ApplicationStatus;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeachOn {
    /// Applicant.
    pub email: String,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachOn {
    pub email: String,
    #[serde(default)]
    pub status: ApplicationStatus,

    #[serde(flatten)]
    pub extra: Document,
}

impl From<NewTeachOn> for TeachOn {
    fn from(mut value: NewTeachOn) -> Self {
        super::strip_reserved(&mut value.extra, &["status"]);

        TeachOn {
            email: value.email,
            status: ApplicationStatus::Pending,
            extra: value.extra,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait TeachOnDbExt {
    async fn apply_to_teach(&self, application: NewTeachOn) -> Result<InsertOutcome, Problem>;
    async fn get_application(&self, id: ObjectId) -> Result<Option<Document>, Problem>;
    async fn list_applications(&self, page: Option<Page>) -> Result<Vec<Document>, Problem>;
    async fn set_application_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, Problem>;
}

impl TeachOnDbExt for dyn DocumentStore {
    async fn apply_to_teach(&self, application: NewTeachOn) -> Result<InsertOutcome, Problem> {
        if application.email.trim().is_empty() {
            return Err(problems::bad_field("email", "An applicant email is required."));
        }

        let application = TeachOn::from(application);
        self.insert_one(TEACH_ON_COLLECTION_NAME, bson::to_document(&application)?)
            .await
    }

    async fn get_application(&self, id: ObjectId) -> Result<Option<Document>, Problem> {
        self.find_one(TEACH_ON_COLLECTION_NAME, filter::by_id(id))
            .await
    }

    async fn list_applications(&self, page: Option<Page>) -> Result<Vec<Document>, Problem> {
        self.find(TEACH_ON_COLLECTION_NAME, doc! {}, page).await
    }

    async fn set_application_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, Problem> {
        tracing::info!("setting teacher application {} status to {}", id, status);
        self.update_one(
            TEACH_ON_COLLECTION_NAME,
            filter::by_id(id),
            doc! { "status": status.as_str() },
        )
        .await
    }
}
