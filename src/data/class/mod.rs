use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::ApplicationStatus;

pub mod db;

pub static ENROLMENT_FIELD: &str = "total_enrolment";

/// Class as submitted by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    /// Owning teacher.
    pub email: String,
    pub title: String,
    #[serde(deserialize_with = "super::price::deserialize")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub email: String,
    pub title: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub total_enrolment: i64,

    #[serde(flatten)]
    pub extra: Document,
}

impl From<NewClass> for Class {
    fn from(mut value: NewClass) -> Self {
        super::strip_reserved(&mut value.extra, &["status", ENROLMENT_FIELD]);

        Class {
            email: value.email,
            title: value.title,
            price: value.price,
            name: value.name,
            image: value.image,
            short_description: value.short_description,
            status: ApplicationStatus::Pending,
            total_enrolment: 0,
            extra: value.extra,
        }
    }
}

/// Teacher edits. Only fields that are present get written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::price::optional")]
    pub price: Option<f64>,
    pub image: Option<String>,
    pub short_description: Option<String>,
}

impl ClassUpdate {
    pub fn to_set(&self) -> Document {
        let mut set = doc! {};
        if let Some(name) = &self.name {
            set.insert("name", name.clone());
        }
        if let Some(email) = &self.email {
            set.insert("email", email.clone());
        }
        if let Some(title) = &self.title {
            set.insert("title", title.clone());
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(image) = &self.image {
            set.insert("image", image.clone());
        }
        if let Some(short_description) = &self.short_description {
            set.insert("short_description", short_description.clone());
        }
        set
    }
}
