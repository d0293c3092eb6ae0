use std::collections::HashMap;
use std::sync::Mutex;

use bson::oid::ObjectId;
use bson::{Bson, Document};

use super::{DeleteOutcome, DocumentStore, InsertOutcome, Page, UpdateOutcome};
use crate::resp::problem::{problems, Problem};

/// In-process store used by tests. Every operation yields to the runtime
/// before it runs, so concurrent requests interleave between operations the
/// way they do against a remote store. Each operation then holds the lock for
/// its whole duration, so single-document operations are atomic like MongoDB's.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    async fn with<R>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Vec<Document>) -> R,
    ) -> Result<R, Problem> {
        tokio::task::yield_now().await;

        let mut collections = self
            .collections
            .lock()
            .map_err(|_| problems::internal("memory store lock poisoned"))?;
        Ok(f(collections.entry(collection.to_string()).or_default()))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn id_order(a: &Document, b: &Document) -> std::cmp::Ordering {
    a.get_object_id("_id").ok().cmp(&b.get_object_id("_id").ok())
}

fn numeric(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(v)) => *v as i64,
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) if v.is_finite() => v.trunc() as i64,
        Some(Bson::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), Problem> {
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<Page>,
    ) -> Result<Vec<Document>, Problem> {
        self.with(collection, |docs| {
            let mut found: Vec<Document> =
                docs.iter().filter(|d| matches(d, &filter)).cloned().collect();
            found.sort_by(id_order);

            match page {
                Some(page) => found
                    .into_iter()
                    .skip(page.skip as usize)
                    .take(page.limit.max(0) as usize)
                    .collect(),
                None => found,
            }
        })
        .await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, Problem> {
        self.with(collection, |docs| {
            docs.iter().find(|d| matches(d, &filter)).cloned()
        })
        .await
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, Problem> {
        self.with(collection, |docs| {
            docs.iter().filter(|d| matches(d, &filter)).count() as u64
        })
        .await
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<InsertOutcome, Problem> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        let id = document.get("_id").cloned().unwrap_or(Bson::Null);

        self.with(collection, |docs| docs.push(document)).await?;
        Ok(InsertOutcome::inserted(&id))
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        filter: Document,
        mut document: Document,
    ) -> Result<Option<Bson>, Problem> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        let id = document.get("_id").cloned().unwrap_or(Bson::Null);

        self.with(collection, |docs| {
            if docs.iter().any(|d| matches(d, &filter)) {
                return None;
            }
            docs.push(document);
            Some(id)
        })
        .await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, Problem> {
        self.with(collection, |docs| {
            let Some(target) = docs.iter_mut().find(|d| matches(d, &filter)) else {
                return UpdateOutcome::new(0, 0);
            };

            let before = target.clone();
            for (key, value) in set {
                target.insert(key, value);
            }

            let modified = if *target == before { 0 } else { 1 };
            UpdateOutcome::new(1, modified)
        })
        .await
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<DeleteOutcome, Problem> {
        self.with(collection, |docs| {
            let position = docs.iter().position(|d| matches(d, &filter));
            if let Some(position) = position {
                docs.remove(position);
            }
            DeleteOutcome {
                acknowledged: true,
                deleted_count: position.map_or(0, |_| 1),
            }
        })
        .await
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
    ) -> Result<UpdateOutcome, Problem> {
        self.with(collection, |docs| {
            let Some(target) = docs.iter_mut().find(|d| matches(d, &filter)) else {
                return UpdateOutcome::new(0, 0);
            };

            let next = numeric(target.get(field)) + 1;
            target.insert(field, next);
            UpdateOutcome::new(1, 1)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[rocket::async_test]
    async fn set_reports_zero_modified_when_unchanged() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_one("things", doc! { "status": "pending" })
            .await
            .expect("insert works");
        let id = ObjectId::parse_str(inserted.inserted_id.expect("id")).expect("object id");

        let first = store
            .update_one("things", doc! { "_id": id }, doc! { "status": "accepted" })
            .await
            .expect("update works");
        let second = store
            .update_one("things", doc! { "_id": id }, doc! { "status": "accepted" })
            .await
            .expect("update works");

        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        assert_eq!((second.matched_count, second.modified_count), (1, 0));
    }

    #[rocket::async_test]
    async fn increment_treats_garbage_as_zero() {
        let store = MemoryStore::new();
        store
            .insert_one("things", doc! { "name": "a", "n": "not a number" })
            .await
            .expect("insert works");
        store
            .insert_one("things", doc! { "name": "b", "n": "41" })
            .await
            .expect("insert works");

        store
            .increment("things", doc! { "name": "a" }, "n")
            .await
            .expect("increment works");
        store
            .increment("things", doc! { "name": "b" }, "n")
            .await
            .expect("increment works");

        let a = store
            .find_one("things", doc! { "name": "a" })
            .await
            .expect("find works")
            .expect("document exists");
        let b = store
            .find_one("things", doc! { "name": "b" })
            .await
            .expect("find works")
            .expect("document exists");

        assert_eq!(a.get_i64("n").ok(), Some(1));
        assert_eq!(b.get_i64("n").ok(), Some(42));
    }

    #[rocket::async_test]
    async fn find_pages_in_id_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_one("things", doc! { "i": i })
                .await
                .expect("insert works");
        }

        let page = store
            .find("things", doc! {}, Some(Page { skip: 2, limit: 2 }))
            .await
            .expect("find works");

        let seen: Vec<i32> = page.iter().filter_map(|d| d.get_i32("i").ok()).collect();
        assert_eq!(seen, vec![2, 3]);
        assert_eq!(store.count("things", doc! {}).await.expect("count works"), 5);
    }

    #[rocket::async_test]
    async fn unmatched_mutations_touch_nothing() {
        let store = MemoryStore::new();
        let missing = doc! { "_id": ObjectId::new() };

        let updated = store
            .update_one("things", missing.clone(), doc! { "x": 1 })
            .await
            .expect("update works");
        let deleted = store
            .delete_one("things", missing)
            .await
            .expect("delete works");

        assert_eq!(updated.matched_count, 0);
        assert_eq!(deleted.deleted_count, 0);
    }

    async fn read_then_write(store: &MemoryStore, filter: Document) {
        let current = store
            .find_one("things", filter.clone())
            .await
            .expect("find works")
            .expect("document exists");
        let next = current.get_i64("n").unwrap_or(0) + 1;
        store
            .update_one("things", filter, doc! { "n": next })
            .await
            .expect("update works");
    }

    async fn counter(store: &MemoryStore) -> Option<i64> {
        store
            .find_one("things", doc! { "name": "a" })
            .await
            .expect("find works")
            .and_then(|d| d.get_i64("n").ok())
    }

    #[rocket::async_test]
    async fn interleaved_read_then_write_loses_an_update() {
        let store = MemoryStore::new();
        store
            .insert_one("things", doc! { "name": "a", "n": 0_i64 })
            .await
            .expect("insert works");

        tokio::join!(
            read_then_write(&store, doc! { "name": "a" }),
            read_then_write(&store, doc! { "name": "a" }),
        );

        assert_eq!(counter(&store).await, Some(1));
    }

    #[rocket::async_test]
    async fn interleaved_increments_both_count() {
        let store = MemoryStore::new();
        store
            .insert_one("things", doc! { "name": "a" })
            .await
            .expect("insert works");

        let (first, second) = tokio::join!(
            store.increment("things", doc! { "name": "a" }, "n"),
            store.increment("things", doc! { "name": "a" }, "n"),
        );
        assert_eq!(first.expect("increment works").modified_count, 1);
        assert_eq!(second.expect("increment works").modified_count, 1);

        assert_eq!(counter(&store).await, Some(2));
    }

    #[rocket::async_test]
    async fn concurrent_insert_if_absent_inserts_once() {
        let store = MemoryStore::new();
        let filter = doc! { "email": "dup@x.com" };

        let (first, second) = tokio::join!(
            store.insert_if_absent("users", filter.clone(), doc! { "email": "dup@x.com" }),
            store.insert_if_absent("users", filter.clone(), doc! { "email": "dup@x.com" }),
        );
        let inserted: Vec<Bson> = [first, second]
            .into_iter()
            .filter_map(|r| r.expect("insert works"))
            .collect();

        assert_eq!(inserted.len(), 1);
        assert_eq!(store.count("users", filter).await.expect("count works"), 1);
    }
}
