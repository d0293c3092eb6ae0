use bson::oid::ObjectId;
use bson::{doc, Document};

use super::{Class, ClassUpdate, NewClass, ENROLMENT_FIELD};
use crate::data::store::{
    filter, DeleteOutcome, DocumentStore, InsertOutcome, Page, UpdateOutcome,
    CLASS_COLLECTION_NAME,
};
use crate::data::ApplicationStatus;
use crate::resp::problem::{problems, Problem};

#[allow(async_fn_in_trait)]
pub trait ClassDbExt {
    async fn create_class(&self, class: NewClass) -> Result<InsertOutcome, Problem>;
    async fn get_class(&self, id: ObjectId) -> Result<Option<Document>, Problem>;
    async fn list_classes(&self, page: Option<Page>) -> Result<Vec<Document>, Problem>;
    async fn count_classes(&self) -> Result<u64, Problem>;
    async fn classes_by_teacher(&self, email: &str) -> Result<Vec<Document>, Problem>;
    async fn update_class(&self, id: ObjectId, update: ClassUpdate)
        -> Result<UpdateOutcome, Problem>;
    async fn delete_class(&self, id: ObjectId) -> Result<DeleteOutcome, Problem>;
    async fn set_class_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, Problem>;

    /// Counts one more enrolment. Concurrent calls never lose an update.
    async fn enroll(&self, id: ObjectId) -> Result<UpdateOutcome, Problem>;
}

impl ClassDbExt for dyn DocumentStore {
    async fn create_class(&self, class: NewClass) -> Result<InsertOutcome, Problem> {
        if class.email.trim().is_empty() {
            return Err(problems::bad_field("email", "A class needs an owning teacher."));
        }
        if class.title.trim().is_empty() {
            return Err(problems::bad_field("title", "A class needs a title."));
        }

        let class = Class::from(class);
        self.insert_one(CLASS_COLLECTION_NAME, bson::to_document(&class)?)
            .await
    }

    async fn get_class(&self, id: ObjectId) -> Result<Option<Document>, Problem> {
        self.find_one(CLASS_COLLECTION_NAME, filter::by_id(id)).await
    }

    async fn list_classes(&self, page: Option<Page>) -> Result<Vec<Document>, Problem> {
        self.find(CLASS_COLLECTION_NAME, doc! {}, page).await
    }

    async fn count_classes(&self) -> Result<u64, Problem> {
        self.count(CLASS_COLLECTION_NAME, doc! {}).await
    }

    async fn classes_by_teacher(&self, email: &str) -> Result<Vec<Document>, Problem> {
        self.find(CLASS_COLLECTION_NAME, filter::by_email(email), None)
            .await
    }

    async fn update_class(
        &self,
        id: ObjectId,
        update: ClassUpdate,
    ) -> Result<UpdateOutcome, Problem> {
        let set = update.to_set();
        if set.is_empty() {
            return Err(problems::bad_field("body", "Nothing to update."));
        }

        self.update_one(CLASS_COLLECTION_NAME, filter::by_id(id), set)
            .await
    }

    async fn delete_class(&self, id: ObjectId) -> Result<DeleteOutcome, Problem> {
        self.delete_one(CLASS_COLLECTION_NAME, filter::by_id(id)).await
    }

    async fn set_class_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, Problem> {
        tracing::info!("setting class {} status to {}", id, status);
        self.update_one(
            CLASS_COLLECTION_NAME,
            filter::by_id(id),
            doc! { "status": status.as_str() },
        )
        .await
    }

    async fn enroll(&self, id: ObjectId) -> Result<UpdateOutcome, Problem> {
        self.increment(CLASS_COLLECTION_NAME, filter::by_id(id), ENROLMENT_FIELD)
            .await
    }
}
