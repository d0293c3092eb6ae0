use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod class;
pub mod coursework;
pub mod payment;
pub mod store;
pub mod teach_on;
pub mod user;

/// Review state shared by classes and teacher applications.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prices arrive as JSON numbers or, from HTML forms, as numeric strings.
pub(crate) mod price {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    fn parse<E: Error>(price: Price) -> Result<f64, E> {
        match price {
            Price::Number(value) => Ok(value),
            Price::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("price '{}' isn't a number", text))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        parse(Price::deserialize(deserializer)?)
    }

    pub fn optional<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Option::<Price>::deserialize(deserializer)?
            .map(parse::<D::Error>)
            .transpose()
    }
}

/// Keys the server owns. They are dropped from client supplied extra fields.
pub(crate) fn strip_reserved(extra: &mut bson::Document, reserved: &[&str]) {
    extra.remove("_id");
    for key in reserved {
        extra.remove(*key);
    }
}
