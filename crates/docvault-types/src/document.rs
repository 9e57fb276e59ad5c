use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;
use crate::Timestamp;

/// An uploaded document together with its visibility metadata.
///
/// Documents are immutable after creation; the only mutation is deletion by
/// the owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Login of the owning user.
    pub owner: String,
    pub name: String,
    pub mime: String,
    /// `true` when the payload is a blob held by the blob store.
    pub file: bool,
    pub public: bool,
    pub created_at: Timestamp,
    /// Logins granted explicit read access.
    #[serde(default)]
    pub grants: BTreeSet<String>,
    /// Inline structured payload, if any.
    #[serde(default)]
    pub json_payload: Option<serde_json::Value>,
}

impl Document {
    /// Build a document owned by `owner` from client metadata.
    pub fn from_meta(
        id: DocumentId,
        owner: impl Into<String>,
        meta: DocumentMeta,
        json_payload: Option<serde_json::Value>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            name: meta.name,
            mime: meta.mime,
            file: meta.file,
            public: meta.public,
            created_at,
            grants: meta.grants.into_iter().collect(),
            json_payload,
        }
    }

    /// Whether `viewer` may read this document.
    ///
    /// Holds iff the viewer owns it, it is public, or the viewer holds a grant.
    pub fn is_visible_to(&self, viewer: &str) -> bool {
        self.owner == viewer || self.public || self.grants.contains(viewer)
    }

    /// Only the owner may delete a document.
    pub fn is_owned_by(&self, login: &str) -> bool {
        self.owner == login
    }
}

/// Client-supplied metadata for a new document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
    #[serde(default)]
    pub mime: String,
    #[serde(default)]
    pub file: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default, alias = "grant")]
    pub grants: Vec<String>,
}
