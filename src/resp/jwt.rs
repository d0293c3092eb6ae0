use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use crate::resp::problem::{problems, GuardProblem, Problem};

pub static AUTH_HEADER_NAME: &str = "Authorization";

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(with = "jwt_numeric_date")]
    iat: DateTime<Utc>,
    #[serde(with = "jwt_numeric_date")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl Credential {
    pub fn new(email: impl ToString, lifetime: Duration) -> Credential {
        let now = Utc::now();
        Credential {
            iat: now,
            exp: now + lifetime,
            email: email.to_string(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }
}

/// Signs and verifies access tokens with the shared secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    pub fn new(secret: impl AsRef<[u8]>, lifetime: Duration) -> TokenAuthority {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are dead the second they expire.
        validation.leeway = 0;

        TokenAuthority {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validation,
            lifetime,
        }
    }

    pub fn encode(&self, credential: &Credential) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), credential, &self.encoding)
    }

    pub fn issue(&self, email: impl ToString) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode(&Credential::new(email, self.lifetime))
    }

    pub fn verify(&self, token: &str) -> Result<Credential, Problem> {
        let credential = decode::<Credential>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)?;
        tracing::debug!("verified access token for: {}", credential.email);
        Ok(credential)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, Problem> {
    let header = header.ok_or_else(|| problems::unauthenticated("No authorization header."))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(problems::unauthenticated(
            "Authorization header must be 'Bearer <token>'.",
        )),
    }
}

pub fn extract_claims(req: &Request<'_>) -> Result<Credential, Problem> {
    let authority: &TokenAuthority = req
        .rocket()
        .state()
        .ok_or_else(|| problems::internal("token authority isn't managed"))?;

    let token = bearer_token(req.headers().get_one(AUTH_HEADER_NAME))?;
    authority.verify(token)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Credential {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        tracing::trace!("extracting credential from authorization header");
        match extract_claims(req) {
            Ok(it) => Success(it),
            Err(e) => {
                tracing::debug!("rejected request credential: {:?}", e.detail);
                GuardProblem::record(req, e.clone());
                Error((Status::Unauthorized, e))
            }
        }
    }
}

mod jwt_numeric_date {
    //! Custom serialization of DateTime<Utc> to conform to the JWT spec (RFC 7519 section 2, "Numeric Date")
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Utc.timestamp_opt(i64::deserialize(deserializer)?, 0)
            .single()
            .ok_or_else(|| serde::de::Error::custom("Invalid Unix timestamp value."))
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> Self {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(c) = openapi.components.as_mut() {
                c.add_security_scheme("jwt", *self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("test-secret", Duration::hours(1))
    }

    #[test]
    fn jwt_configured_properly() {
        let now = Utc::now().round_subsecs(0);
        let credential = Credential {
            iat: now,
            exp: now + Duration::hours(1),
            email: "a@x.com".to_string(),
        };

        let token = authority()
            .encode(&credential)
            .expect("encoding should work for example");
        let decoded = authority().verify(&token).expect("fresh token verifies");

        assert_eq!(decoded, credential);
    }

    #[test]
    fn issued_tokens_last_an_hour() {
        let token = authority().issue("a@x.com").expect("issued");
        let decoded = authority().verify(&token).expect("verifies");

        assert_eq!(decoded.email, "a@x.com");
        assert_eq!(decoded.expires_at() - decoded.iat, Duration::hours(1));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let now = Utc::now();
        let credential = Credential {
            iat: now - Duration::hours(2),
            exp: now - Duration::seconds(5),
            email: "a@x.com".to_string(),
        };
        let token = authority().encode(&credential).expect("encoded");

        let problem = authority().verify(&token).expect_err("expired");
        assert_eq!(problem.status, Status::Unauthorized);
        assert_eq!(problem.detail.as_deref(), Some("Expired JWT signature."));
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let other = TokenAuthority::new("another-secret", Duration::hours(1));
        let token = other.issue("a@x.com").expect("issued");

        assert!(authority().verify(&token).is_err());
        assert!(authority().verify("garbage").is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).ok(), Some("abc"));
        assert_eq!(bearer_token(Some("bearer abc")).ok(), Some("abc"));
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("abc")).is_err());
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
    }
}
