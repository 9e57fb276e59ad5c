use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use docvault_cache::{listing_key, CacheBackend, ResultCache};
use docvault_store::{BlobStore, DocumentStore};
use docvault_types::{Document, DocumentId, DocumentMeta};
use serde_json::Value;

use crate::error::{InputError, ServiceError, ServiceResult};
use crate::query::QueryEngine;
use crate::timeout::bounded;

/// A document as returned by [`DocumentCoordinator::get`].
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedDocument {
    pub document: Document,
    /// Streamable location of the payload, for blob-backed documents only.
    pub blob_path: Option<PathBuf>,
    pub mime: String,
    pub json_payload: Option<Value>,
}

/// Document lifecycle over the query engine, the result cache and the blob
/// store.
///
/// Listings are read through the cache. Every successful create or delete
/// invalidates the owner's cached listings; listings cached for grantees or
/// other viewers of public documents are left to expire on their TTL.
pub struct DocumentCoordinator<D, C, B> {
    engine: QueryEngine<D>,
    cache: ResultCache<C>,
    blobs: B,
    cache_ttl: Duration,
    op_timeout: Duration,
}

impl<D, C, B> DocumentCoordinator<D, C, B>
where
    D: DocumentStore,
    C: CacheBackend,
    B: BlobStore,
{
    pub fn new(
        documents: D,
        cache: C,
        blobs: B,
        cache_ttl: Duration,
        op_timeout: Duration,
    ) -> Self {
        Self {
            engine: QueryEngine::new(documents, op_timeout),
            cache: ResultCache::new(cache, op_timeout),
            blobs,
            cache_ttl,
            op_timeout,
        }
    }

    pub fn engine(&self) -> &QueryEngine<D> {
        &self.engine
    }

    pub fn cache(&self) -> &ResultCache<C> {
        &self.cache
    }

    /// Persist a new document owned by `owner` and return its id.
    pub async fn create(
        &self,
        owner: &str,
        meta: DocumentMeta,
        json_payload: Option<Value>,
    ) -> ServiceResult<DocumentId> {
        let doc = Self::build(owner, meta, json_payload)?;
        self.engine.insert(&doc).await?;
        self.cache.invalidate_owner(owner).await;
        tracing::info!(owner, id = %doc.id, name = %doc.name, "document created");
        Ok(doc.id)
    }

    /// Like [`create`](Self::create), with a blob payload.
    ///
    /// The blob is stored under the document id, not the client-supplied
    /// name. If the record cannot be persisted the blob is removed again.
    pub async fn create_with_blob(
        &self,
        owner: &str,
        mut meta: DocumentMeta,
        json_payload: Option<Value>,
        blob: &[u8],
    ) -> ServiceResult<DocumentId> {
        meta.file = true;
        let doc = Self::build(owner, meta, json_payload)?;
        let blob_name = doc.id.to_string();
        bounded(
            self.op_timeout,
            "write blob",
            self.blobs.write(&blob_name, blob),
        )
        .await?;

        if let Err(e) = self.engine.insert(&doc).await {
            self.discard_blob(&blob_name).await;
            return Err(e);
        }
        self.cache.invalidate_owner(owner).await;
        tracing::info!(owner, id = %doc.id, name = %doc.name, size = blob.len(), "document created");
        Ok(doc.id)
    }

    /// Fetch a document `requester` may see.
    ///
    /// A document that exists but is not visible is reported as
    /// [`ServiceError::Forbidden`].
    pub async fn get(&self, requester: &str, id: &DocumentId) -> ServiceResult<FetchedDocument> {
        let document = self.engine.get_by_id(id).await?;
        if !document.is_visible_to(requester) {
            tracing::debug!(requester, %id, "document not visible to requester");
            return Err(ServiceError::Forbidden);
        }
        let blob_path = document
            .file
            .then(|| self.blobs.path(&document.id.to_string()));
        Ok(FetchedDocument {
            mime: document.mime.clone(),
            json_payload: document.json_payload.clone(),
            blob_path,
            document,
        })
    }

    /// Cached, visibility-scoped listing.
    ///
    /// A non-empty `login_override` lists as that login instead of
    /// `requester`; visibility is always evaluated for the effective viewer.
    pub async fn list(
        &self,
        requester: &str,
        login_override: &str,
        filter_key: &str,
        filter_value: &str,
        limit: i64,
    ) -> ServiceResult<Vec<Document>> {
        let viewer = if login_override.is_empty() {
            requester
        } else {
            login_override
        };
        let key = listing_key(viewer, filter_key, filter_value, limit);
        if let Some(docs) = self.cache.get(&key).await {
            return Ok(docs);
        }
        let docs = self
            .engine
            .list(viewer, filter_key, filter_value, limit)
            .await?;
        self.cache.put(&key, &docs, self.cache_ttl).await;
        Ok(docs)
    }

    /// Delete a document. Only its owner may do so.
    pub async fn delete(&self, requester: &str, id: &DocumentId) -> ServiceResult<()> {
        let doc = self.engine.get_by_id(id).await?;
        if !doc.is_owned_by(requester) {
            tracing::warn!(requester, %id, owner = %doc.owner, "delete refused: not owner");
            return Err(ServiceError::Forbidden);
        }
        self.engine.delete(id).await?;
        self.cache.invalidate_owner(&doc.owner).await;
        if doc.file {
            self.discard_blob(&doc.id.to_string()).await;
        }
        tracing::info!(owner = %doc.owner, %id, "document deleted");
        Ok(())
    }

    fn build(owner: &str, meta: DocumentMeta, json_payload: Option<Value>) -> ServiceResult<Document> {
        if meta.name.is_empty() {
            return Err(InputError::MissingField("name").into());
        }
        Ok(Document::from_meta(
            DocumentId::generate(),
            owner,
            meta,
            json_payload,
            Utc::now(),
        ))
    }

    async fn discard_blob(&self, name: &str) {
        match bounded(self.op_timeout, "remove blob", self.blobs.remove(name)).await {
            Ok(_) => {}
            Err(e) => tracing::warn!(blob = name, error = %e, "could not remove blob"),
        }
    }
}

impl<D, C, B> std::fmt::Debug for DocumentCoordinator<D, C, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCoordinator")
            .field("cache_ttl", &self.cache_ttl)
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}
