use std::sync::Arc;

use bson::oid::ObjectId;
use bson::doc;
use rocket::http::Header;
use rocket::local::asynchronous::Client;

use crate::config::Config;
use crate::data::store::memory::MemoryStore;
use crate::data::store::{Db, DocumentStore, USER_COLLECTION_NAME};
use crate::payment::fake::FakeProvider;
use crate::resp::jwt::{TokenAuthority, AUTH_HEADER_NAME};
use crate::role::Role;

pub const TEST_SECRET: &str = "test-secret";

/// Handles into the state of a test instance.
pub struct TestApp {
    pub db: Db,
    pub payments: Arc<FakeProvider>,
}

fn authority() -> TokenAuthority {
    TokenAuthority::new(TEST_SECRET, chrono::Duration::hours(1))
}

pub async fn client() -> (Client, TestApp) {
    let db: Db = Arc::new(MemoryStore::new());
    let payments = Arc::new(FakeProvider::default());

    let config = Config {
        access_token_secret: TEST_SECRET.to_string(),
        ..Config::default()
    };
    let rocket = crate::assemble(&config, db.clone(), authority(), payments.clone());

    let client = Client::tracked(rocket).await.expect("invalid backend");
    (client, TestApp { db, payments })
}

pub fn bearer(email: &str) -> Header<'static> {
    let token = authority().issue(email).expect("token signs");
    Header::new(AUTH_HEADER_NAME, format!("Bearer {}", token))
}

pub async fn seed_user(db: &Db, email: &str, role: Option<Role>) -> ObjectId {
    let mut user = doc! { "email": email, "name": "Test User" };
    if let Some(role) = role {
        user.insert("role", role.as_str());
    }

    let inserted = db
        .insert_one(USER_COLLECTION_NAME, user)
        .await
        .expect("user inserted");
    let id = inserted.inserted_id.expect("inserted id");
    ObjectId::parse_str(&id).expect("object id")
}
