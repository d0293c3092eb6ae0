#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use std::sync::Arc;

use error::BackendError;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::data::store::mongo::MongoStore;
use crate::data::store::{Db, DocumentStore};
use crate::payment::{Payments, StripeClient, Unconfigured};
use crate::resp::jwt::TokenAuthority;
use crate::route::mount_api;

pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod resp;
pub mod role;
pub mod route;
pub mod util;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if tracing_log::LogTracer::init().is_err() {
            tracing::warn!("Unable to forward log records to tracing.");
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = Config::load_or_default()?;
    if let Err(err) = c.validate() {
        tracing::error!("Configuration error: {}", err);
        return Err(err.into());
    }
    tracing::debug!("Using configuration {:?}", c);

    let tokens = TokenAuthority::new(
        &c.access_token_secret,
        chrono::Duration::seconds(c.token_lifetime_secs),
    );

    tracing::info!("Connecting to MongoDB, database '{}'...", c.mongodb_db);
    let store = MongoStore::connect(&c.mongodb_uri, &c.mongodb_db).await?;
    if let Err(problem) = store.ping().await {
        tracing::error!("Unable to connect to MongoDB.");
        return Err(problem.into());
    }
    tracing::info!("Connected to MongoDB.");
    store.ensure_indexes().await?;

    let payments: Payments = if c.payment_configured() {
        Arc::new(StripeClient::new(&c.payment_secret_key)?)
    } else {
        tracing::warn!("No payment secret configured, payment intents are disabled.");
        Arc::new(Unconfigured)
    };

    Ok(assemble(&c, Arc::new(store), tokens, payments))
}

/// Builds the server around already constructed collaborators.
pub fn assemble(c: &Config, db: Db, tokens: TokenAuthority, payments: Payments) -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(("port", c.port));

    tracing::info!("Starting HTTP server...");
    let mut r = rocket::custom(figment)
        .manage(c.clone())
        .manage(db)
        .manage(tokens)
        .manage(payments);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![
            Method::Get,
            Method::Put,
            Method::Post,
            Method::Patch,
            Method::Delete,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors();

    match cors {
        Ok(cors) => r = r.attach(cors),
        Err(err) => tracing::error!("Unable to configure CORS: {}", err),
    }

    r = r.attach(AdHoc::on_shutdown("Close document store", |rocket| {
        Box::pin(async move {
            if let Some(db) = rocket.state::<Db>() {
                db.close().await;
            }
        })
    }));

    mount_api(r)
}
