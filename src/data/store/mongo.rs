use bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions, UpdateModifications, UpdateOptions};
use mongodb::{Client, Database, IndexModel};
use rocket::futures::TryStreamExt;

use super::{
    DeleteOutcome, DocumentStore, InsertOutcome, Page, UpdateOutcome, USER_COLLECTION_NAME,
};
use crate::resp::problem::Problem;

/// MongoDB backed store. Owns the client so it can be shut down with the
/// server.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<MongoStore, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        Ok(MongoStore { client, db })
    }

    /// Creates the indexes the handlers rely on. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.db
            .collection::<Document>(USER_COLLECTION_NAME)
            .create_index(unique_email, None)
            .await?;
        tracing::info!("Ensured unique index on {}.email", USER_COLLECTION_NAME);
        Ok(())
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == 11000
    )
}

/// Update pipeline adding one to `field`. Absent and non-numeric values
/// count as 0. The read and the write happen server side in one document
/// operation.
pub(crate) fn increment_pipeline(field: &str) -> Vec<Document> {
    let current = format!("${field}");
    vec![doc! {
        "$set": {
            field: {
                "$add": [
                    {
                        "$convert": {
                            "input": current,
                            "to": "long",
                            "onError": 0_i64,
                            "onNull": 0_i64,
                        }
                    },
                    1_i64,
                ]
            }
        }
    }]
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), Problem> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<Page>,
    ) -> Result<Vec<Document>, Problem> {
        let mut options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        if let Some(page) = page {
            options.skip = Some(page.skip);
            options.limit = Some(page.limit);
        }

        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter, options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, Problem> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .find_one(filter, None)
            .await?)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, Problem> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .count_documents(filter, None)
            .await?)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<InsertOutcome, Problem> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await?;

        Ok(InsertOutcome::inserted(&result.inserted_id))
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<Option<Bson>, Problem> {
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .db
            .collection::<Document>(collection)
            .update_one(filter, doc! { "$setOnInsert": document }, options)
            .await;

        match result {
            Ok(result) => Ok(result.upserted_id),
            // A concurrent upsert won the unique index.
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, Problem> {
        let result = self
            .db
            .collection::<Document>(collection)
            .update_one(filter, doc! { "$set": set }, None)
            .await?;

        let mut outcome = UpdateOutcome::new(result.matched_count, result.modified_count);
        if let Some(id) = result.upserted_id {
            outcome.upserted_count = 1;
            outcome.upserted_id = Some(super::bson_id_string(&id));
        }
        Ok(outcome)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<DeleteOutcome, Problem> {
        let result = self
            .db
            .collection::<Document>(collection)
            .delete_one(filter, None)
            .await?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
    ) -> Result<UpdateOutcome, Problem> {
        let pipeline = increment_pipeline(field);

        let result = self
            .db
            .collection::<Document>(collection)
            .update_one(filter, UpdateModifications::Pipeline(pipeline), None)
            .await?;

        Ok(UpdateOutcome::new(
            result.matched_count,
            result.modified_count,
        ))
    }

    async fn close(&self) {
        tracing::info!("Shutting down MongoDB client...");
        self.client.clone().shutdown().await;
    }
}
