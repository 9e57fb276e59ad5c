use axum::response::{IntoResponse, Json, Response};
use docvault_types::{Document, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub text: String,
}

/// Uniform JSON body: `{ "error"?, "response"?, "data"? }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn error(code: &'static str, text: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorBody {
                code,
                text: text.into(),
            }),
            ..Default::default()
        }
    }

    pub fn response(value: Value) -> Self {
        Self {
            response: Some(value),
            ..Default::default()
        }
    }

    pub fn data(value: Value) -> Self {
        Self {
            data: Some(value),
            ..Default::default()
        }
    }

    /// `{ "<key>": true }`, the acknowledgement for deletions.
    pub fn acknowledged(key: impl Into<String>) -> Self {
        let mut ack = Map::new();
        ack.insert(key.into(), Value::Bool(true));
        Self::response(Value::Object(ack))
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Listing entry as clients see it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub file: bool,
    pub public: bool,
    pub created: Timestamp,
    pub grant: Vec<String>,
    pub json: Option<Value>,
}

impl From<Document> for DocumentView {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id.to_string(),
            name: doc.name,
            mime: doc.mime,
            file: doc.file,
            public: doc.public,
            created: doc.created_at,
            grant: doc.grants.into_iter().collect(),
            json: doc.json_payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_are_omitted() {
        let v = serde_json::to_value(Envelope::data(Value::Null)).unwrap();
        assert_eq!(v, serde_json::json!({ "data": null }));
        let v = serde_json::to_value(Envelope::error("forbidden", "forbidden")).unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "error": { "code": "forbidden", "text": "forbidden" } })
        );
    }

    #[test]
    fn acknowledgement_uses_key() {
        let v = serde_json::to_value(Envelope::acknowledged("abc")).unwrap();
        assert_eq!(v, serde_json::json!({ "response": { "abc": true } }));
    }
}
