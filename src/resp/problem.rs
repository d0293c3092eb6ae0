use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    fn to_json(&self) -> Map<String, Value> {
        let mut body = self.body.clone();

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri.clone()));
        body.insert(String::from("title"), Value::from(self.title.clone()));

        if let Some(detail) = &self.detail {
            body.insert(String::from("detail"), Value::from(detail.clone()));
        }
        body.insert(String::from("status"), Value::from(self.status.code));

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body_string = serde_json::to_string(&self.to_json())
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

/// Problem raised by a request guard, kept in the request-local cache so the
/// matching catcher can render it.
#[derive(Debug, Clone, Default)]
pub struct GuardProblem(pub Option<Problem>);

impl GuardProblem {
    pub fn record<'r>(req: &'r Request<'_>, problem: Problem) -> &'r GuardProblem {
        req.local_cache(|| GuardProblem(Some(problem)))
    }

    pub fn take(req: &Request<'_>) -> Option<Problem> {
        req.local_cache(GuardProblem::default).0.clone()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn unauthenticated(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Unauthorized, "forbidden access")
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn forbidden(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Forbidden, "forbidden access")
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn malformed_id(id: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Malformed document id.")
            .insert_str("id", id)
            .detail("Ids are 24 character hexadecimal strings.")
            .clone()
    }

    #[inline]
    pub fn bad_field(field: &'static str, detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid request body.")
            .insert_str("field", field)
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn payment_problem(detail: impl ToString) -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "Payment provider failed while processing request.",
        )
        .detail(detail)
        .clone()
    }

    #[inline]
    pub fn internal(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::InternalServerError, "Internal server error.")
            .detail(detail)
            .clone()
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        tracing::error!("store error: {}", e);

        let unreachable = matches!(
            e.kind.as_ref(),
            ErrorKind::Authentication { .. }
                | ErrorKind::DnsResolve { .. }
                | ErrorKind::ServerSelection { .. }
                | ErrorKind::InvalidTlsConfig { .. }
        );
        if unreachable {
            return problems::internal("The document store is unreachable.");
        }

        let mut problem = problems::internal("The document store failed to process the request.");
        if let ErrorKind::Write(_) | ErrorKind::Io(_) = e.kind.as_ref() {
            problem.insert_str("stored", "unknown");
        }
        problem
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(e: bson::ser::Error) -> Self {
        tracing::error!("unable to encode document: {}", e);
        problems::internal("Unable to encode the document for storage.")
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => problems::unauthenticated("Expired JWT signature."),
            _ => problems::unauthenticated("Error while handling JWT."),
        }
    }
}
