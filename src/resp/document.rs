//! Rendering of stored documents as client JSON.

use bson::{Bson, Document};
use serde_json::{Map, Value};

/// Relaxed extended JSON, except that object ids are plain hex strings.
pub fn document_json(document: Document) -> Value {
    plain_ids(Bson::Document(document).into_relaxed_extjson())
}

pub fn documents_json(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_json).collect())
}

pub fn optional_document_json(document: Option<Document>) -> Value {
    document.map(document_json).unwrap_or(Value::Null)
}

fn plain_ids(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(hex)) = map.get("$oid") {
                    return Value::String(hex.clone());
                }
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, plain_ids(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(plain_ids).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;

    #[test]
    fn ids_render_as_hex() {
        let id = ObjectId::new();
        let other = ObjectId::new();
        let json = document_json(doc! {
            "_id": id,
            "title": "Rust 101",
            "total_enrolment": 3_i64,
            "refs": [other],
        });

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["title"], "Rust 101");
        assert_eq!(json["total_enrolment"], 3);
        assert_eq!(json["refs"][0], other.to_hex());
    }

    #[test]
    fn missing_documents_are_null() {
        assert_eq!(optional_document_json(None), Value::Null);
        assert_eq!(documents_json(vec![]), Value::Array(vec![]));
    }
}
