use std::time::Duration;

use docvault_store::{
    AttributeFilter, DocumentOrdering, DocumentQuery, DocumentStore, VisibilityPredicate,
};
use docvault_types::{Document, DocumentId};

use crate::error::{ServiceError, ServiceResult};
use crate::timeout::bounded;

/// The visibility rule every listing for `viewer` is scoped by.
pub fn build_visibility_predicate(viewer: &str) -> VisibilityPredicate {
    VisibilityPredicate::new(viewer)
}

/// Visibility-scoped reads and raw writes over a [`DocumentStore`].
///
/// Listings are always restricted to what the viewer may see; lookups by id
/// are not, and callers apply their own access rules.
pub struct QueryEngine<D> {
    store: D,
    op_timeout: Duration,
}

impl<D: DocumentStore> QueryEngine<D> {
    pub fn new(store: D, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Documents visible to `viewer`, optionally narrowed by one attribute
    /// filter, ordered by name then newest first.
    ///
    /// An empty or unknown `filter_key`, or an empty `filter_value`, means no
    /// filter. A non-positive `limit` means no limit.
    pub async fn list(
        &self,
        viewer: &str,
        filter_key: &str,
        filter_value: &str,
        limit: i64,
    ) -> ServiceResult<Vec<Document>> {
        let filter = AttributeFilter::parse(filter_key, filter_value);
        if filter.is_none() && !filter_key.is_empty() {
            tracing::debug!(filter_key, "ignoring unsupported filter");
        }
        let limit = usize::try_from(limit).ok().filter(|n| *n > 0);
        let query = DocumentQuery {
            visibility: build_visibility_predicate(viewer),
            filter,
            ordering: DocumentOrdering::default(),
            limit,
        };
        bounded(
            self.op_timeout,
            "list documents",
            self.store.list_documents(&query),
        )
        .await
    }

    /// Raw lookup with no visibility check.
    pub async fn get_by_id(&self, id: &DocumentId) -> ServiceResult<Document> {
        bounded(self.op_timeout, "get document", self.store.get_document(id))
            .await?
            .ok_or(ServiceError::NotFound("document"))
    }

    pub async fn insert(&self, doc: &Document) -> ServiceResult<()> {
        bounded(
            self.op_timeout,
            "insert document",
            self.store.insert_document(doc),
        )
        .await
    }

    /// Delete by id. [`ServiceError::NotFound`] if nothing was removed.
    pub async fn delete(&self, id: &DocumentId) -> ServiceResult<()> {
        let removed = bounded(
            self.op_timeout,
            "delete document",
            self.store.delete_document(id),
        )
        .await?;
        if removed {
            Ok(())
        } else {
            Err(ServiceError::NotFound("document"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docvault_store::InMemoryDocumentStore;
    use docvault_types::DocumentMeta;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn doc(owner: &str, name: &str, public: bool, grants: &[&str], secs: i64) -> Document {
        let meta = DocumentMeta {
            name: name.into(),
            mime: "text/plain".into(),
            public,
            grants: grants.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        };
        let at = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        Document::from_meta(DocumentId::generate(), owner, meta, None, at)
    }

    async fn engine(docs: &[Document]) -> QueryEngine<InMemoryDocumentStore> {
        let engine = QueryEngine::new(InMemoryDocumentStore::new(), TIMEOUT);
        for d in docs {
            engine.insert(d).await.unwrap();
        }
        engine
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    #[tokio::test]
    async fn listing_is_visibility_scoped() {
        let e = engine(&[
            doc("alice1234", "own", false, &[], 0),
            doc("bob123456", "granted", false, &["alice1234"], 1),
            doc("bob123456", "public", true, &[], 2),
            doc("bob123456", "hidden", false, &["carol1234"], 3),
        ])
        .await;
        let docs = e.list("alice1234", "", "", 0).await.unwrap();
        assert_eq!(names(&docs), vec!["granted", "own", "public"]);
        assert!(docs.iter().all(|d| d.is_visible_to("alice1234")));
    }

    #[tokio::test]
    async fn equal_names_list_newest_first() {
        let a1 = doc("alice1234", "a", false, &[], 1);
        let a2 = doc("alice1234", "a", false, &[], 2);
        let e = engine(&[a1.clone(), a2.clone()]).await;
        let docs = e.list("alice1234", "", "", 0).await.unwrap();
        assert_eq!(docs, vec![a2, a1]);
    }

    #[tokio::test]
    async fn filter_and_limit() {
        let e = engine(&[
            doc("alice1234", "a", true, &[], 0),
            doc("alice1234", "b", false, &[], 1),
            doc("alice1234", "c", true, &[], 2),
        ])
        .await;
        let docs = e.list("alice1234", "public", "true", 0).await.unwrap();
        assert_eq!(names(&docs), vec!["a", "c"]);
        let docs = e.list("alice1234", "public", "true", 1).await.unwrap();
        assert_eq!(names(&docs), vec!["a"]);
        let docs = e.list("alice1234", "name", "b", -3).await.unwrap();
        assert_eq!(names(&docs), vec!["b"]);
    }

    #[tokio::test]
    async fn unknown_filter_is_ignored() {
        let e = engine(&[doc("alice1234", "a", false, &[], 0)]).await;
        let docs = e.list("alice1234", "owner", "x", 0).await.unwrap();
        assert_eq!(docs.len(), 1);
        let docs = e.list("alice1234", "name", "", 0).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn get_and_delete_report_absence() {
        let d = doc("alice1234", "a", false, &[], 0);
        let e = engine(&[d.clone()]).await;
        assert_eq!(e.get_by_id(&d.id).await.unwrap(), d);
        e.delete(&d.id).await.unwrap();
        assert!(matches!(
            e.get_by_id(&d.id).await.unwrap_err(),
            ServiceError::NotFound("document")
        ));
        assert!(matches!(
            e.delete(&d.id).await.unwrap_err(),
            ServiceError::NotFound("document")
        ));
    }

    #[test]
    fn predicate_matches_owner_grant_and_public() {
        let p = build_visibility_predicate("alice1234");
        assert!(p.matches(&doc("alice1234", "a", false, &[], 0)));
        assert!(p.matches(&doc("bob123456", "a", false, &["alice1234"], 0)));
        assert!(p.matches(&doc("bob123456", "a", true, &[], 0)));
        assert!(!p.matches(&doc("bob123456", "a", false, &[], 0)));
    }
}
