use rocket::serde::json::{Json, Value};
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::payment::{Payment, PaymentDbExt};
use crate::data::store::{filter, Db, InsertOutcome};
use crate::middleware::gate::AdminToken;
use crate::middleware::paging::PageState;
use crate::payment::{Payments, PAYMENT_CURRENCY};
use crate::resp::document::{documents_json, optional_document_json};
use crate::resp::problem::{problems, Problem};
use crate::util::price_to_minor_units;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IntentRequest {
    /// Price in dollars, as a number or a numeric string.
    #[serde(deserialize_with = "crate::data::price::deserialize")]
    #[schema(value_type = f64)]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// Create a payment intent
///
/// The provider's client secret is passed through untouched.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = IntentRequest,
    responses(
        (status = 200, description = "Client secret of the intent", body = IntentResponse),
        (status = 400, description = "Price isn't a chargeable amount", body = Problem),
        (status = 500, description = "Payment provider failed", body = Problem),
    )
)]
#[post("/create-payment-intent", format = "json", data = "<request>")]
#[tracing::instrument(skip(payments))]
pub async fn payment_intent_create(
    request: Json<IntentRequest>,
    payments: &State<Payments>,
) -> Result<Json<IntentResponse>, Problem> {
    let amount = price_to_minor_units(request.price).ok_or_else(|| {
        problems::bad_field("price", "Price must be a positive amount the provider can charge.")
    })?;

    let intent = payments
        .create_payment_intent(amount, PAYMENT_CURRENCY)
        .await?;

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a payment
///
/// Posted by the client after the provider confirmed the charge.
#[utoipa::path(
    post,
    path = "/payment",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing payer email", body = Problem),
    )
)]
#[post("/payment", format = "json", data = "<payment>")]
#[tracing::instrument(skip(db))]
pub async fn payment_create(
    payment: Json<Payment>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.record_payment(payment.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/payment",
    params(
        ("page" = Option<u32>, Query, description = "zero based page"),
        ("size" = Option<u32>, Query, description = "page length"),
    ),
    responses(
        (status = 200, description = "Payment documents"),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/payment")]
#[tracing::instrument(skip(db))]
pub async fn payment_list(
    _admin: AdminToken,
    paging: PageState,
    db: &State<Db>,
) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.list_payments(paging.page()).await?)))
}

/// Payments made by a student
#[utoipa::path(
    get,
    path = "/dashboard/enrollClass/{email}",
    params(("email" = String, Path, description = "student email")),
    responses((status = 200, description = "Payment documents"))
)]
#[get("/dashboard/enrollClass/<email>")]
#[tracing::instrument(skip(db))]
pub async fn enrolled_classes(email: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.payments_by_student(email).await?)))
}

#[utoipa::path(
    get,
    path = "/my-enroll/{id}",
    params(("id" = String, Path, description = "payment id")),
    responses(
        (status = 200, description = "Payment document or null"),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[get("/my-enroll/<id>")]
#[tracing::instrument(skip(db))]
pub async fn enrollment_get(id: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(optional_document_json(db.get_payment(id).await?)))
}

#[cfg(test)]
mod payment_endpoints {
    use rocket::http::Status;
    use serde_json::{json, Value};

    use super::IntentResponse;
    use crate::role::Role;
    use crate::route::test_support::{bearer, client, seed_user};

    #[rocket::async_test]
    async fn intent_amount_is_in_cents() {
        let (client, app) = client().await;

        let response = client
            .post("/create-payment-intent")
            .json(&json!({ "price": 25 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: IntentResponse = response.into_json().await.expect("intent json");
        assert_eq!(body.client_secret, "pi_1_secret_2500");

        let requests = app.payments.requests.lock().expect("lock").clone();
        assert_eq!(requests, vec![(2500, "usd".to_string())]);
    }

    #[rocket::async_test]
    async fn fractional_price_rounds() {
        let (client, app) = client().await;

        client
            .post("/create-payment-intent")
            .json(&json!({ "price": 19.99 }))
            .dispatch()
            .await;

        let requests = app.payments.requests.lock().expect("lock").clone();
        assert_eq!(requests[0].0, 1999);
    }

    #[rocket::async_test]
    async fn form_string_price_is_charged() {
        let (client, app) = client().await;

        let response = client
            .post("/create-payment-intent")
            .json(&json!({ "price": "20" }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let requests = app.payments.requests.lock().expect("lock").clone();
        assert_eq!(requests, vec![(2000, "usd".to_string())]);
    }

    #[rocket::async_test]
    async fn unchargeable_price_never_reaches_provider() {
        let (client, app) = client().await;

        for price in [json!(0), json!(-3), json!(1e300)] {
            let response = client
                .post("/create-payment-intent")
                .json(&json!({ "price": price }))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest);
        }

        assert!(app.payments.requests.lock().expect("lock").is_empty());
    }

    #[rocket::async_test]
    async fn recorded_payments_show_on_the_dashboard() {
        let (client, app) = client().await;
        seed_user(&app.db, "root@x.com", Some(Role::Admin)).await;

        let created: Value = client
            .post("/payment")
            .json(&json!({
                "studentEmail": "s@x.com",
                "title": "Rust 101",
                "price": 25,
                "transactionId": "pi_123",
            }))
            .dispatch()
            .await
            .into_json()
            .await
            .expect("insert json");
        let id = created["insertedId"].as_str().expect("inserted id").to_string();

        client
            .post("/payment")
            .json(&json!({ "studentEmail": "other@x.com", "title": "Go 101" }))
            .dispatch()
            .await;

        let mine: Vec<Value> = client
            .get("/dashboard/enrollClass/s@x.com")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("payments json");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["transactionId"], "pi_123");

        let single: Value = client
            .get(format!("/my-enroll/{}", id))
            .dispatch()
            .await
            .into_json()
            .await
            .expect("payment json");
        assert_eq!(single["title"], "Rust 101");

        let response = client.get("/payment").header(bearer("s@x.com")).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);

        let all: Vec<Value> = client
            .get("/payment")
            .header(bearer("root@x.com"))
            .dispatch()
            .await
            .into_json()
            .await
            .expect("payments json");
        assert_eq!(all.len(), 2);
    }
}
