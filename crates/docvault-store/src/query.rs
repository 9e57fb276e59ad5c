//! Query descriptions handed to [`DocumentStore::list_documents`].
//!
//! [`DocumentStore::list_documents`]: crate::DocumentStore::list_documents

use std::cmp::Ordering;

use docvault_types::Document;

/// Mandatory visibility rule for a listing: the viewer owns the document,
/// holds a grant on it, or it is public.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityPredicate {
    viewer: String,
}

impl VisibilityPredicate {
    pub fn new(viewer: impl Into<String>) -> Self {
        Self {
            viewer: viewer.into(),
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.is_visible_to(&self.viewer)
    }
}

/// Optional equality filter on a single document attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeFilter {
    Name(String),
    Mime(String),
    File(bool),
    Public(bool),
}

impl AttributeFilter {
    /// Build a filter from a raw key/value pair.
    ///
    /// Returns `None` when either side is empty or the key is not one of
    /// `name`, `mime`, `file`, `public`. Boolean attributes compare against
    /// `value == "true"`.
    pub fn parse(key: &str, value: &str) -> Option<Self> {
        if key.is_empty() || value.is_empty() {
            return None;
        }
        match key {
            "name" => Some(Self::Name(value.to_string())),
            "mime" => Some(Self::Mime(value.to_string())),
            "file" => Some(Self::File(value == "true")),
            "public" => Some(Self::Public(value == "true")),
            _ => None,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Name(name) => doc.name == *name,
            Self::Mime(mime) => doc.mime == *mime,
            Self::File(file) => doc.file == *file,
            Self::Public(public) => doc.public == *public,
        }
    }
}

/// Result ordering for document listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentOrdering {
    /// `name` ascending, then `created_at` descending (newest first among
    /// equal names).
    #[default]
    NameAscNewestFirst,
}

impl DocumentOrdering {
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match self {
            Self::NameAscNewestFirst => a
                .name
                .cmp(&b.name)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

/// A complete listing request: visibility, optional filter, ordering, limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentQuery {
    pub visibility: VisibilityPredicate,
    pub filter: Option<AttributeFilter>,
    pub ordering: DocumentOrdering,
    /// `None` means unbounded.
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// Query for everything visible to `viewer`, default ordering, no limit.
    pub fn visible_to(viewer: impl Into<String>) -> Self {
        Self {
            visibility: VisibilityPredicate::new(viewer),
            filter: None,
            ordering: DocumentOrdering::default(),
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<AttributeFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Visibility AND the attribute filter, if any.
    pub fn matches(&self, doc: &Document) -> bool {
        self.visibility.matches(doc) && self.filter.as_ref().map_or(true, |f| f.matches(doc))
    }

    /// Apply ordering and limit to rows that already satisfy [`Self::matches`].
    pub fn finish(&self, mut rows: Vec<Document>) -> Vec<Document> {
        rows.sort_by(|a, b| self.ordering.compare(a, b));
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}
