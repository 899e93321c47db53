use std::sync::Arc;

use crate::remote::gateway::EntityGateway;
use crate::remote::store::ListQuery;
use crate::state::auth::AuthState;

/// Per-entity mutable cache of currently known records, reconciled
/// against each gateway call outcome. One container per entity type,
/// constructed once at session start and passed by reference to
/// whatever consumes it.
///
/// Every operation short-circuits to a neutral value when no identity
/// is present, without touching `last_error` — an unauthenticated call
/// is not a remote failure. A failed gateway call records its message
/// and leaves the cache exactly as it was.
pub struct EntityContainer<G: EntityGateway> {
    auth: Arc<AuthState>,
    gateway: G,
    records: Vec<G::Record>,
    current: Option<G::Record>,
    is_loading: bool,
    last_error: Option<String>,
}

impl<G: EntityGateway> EntityContainer<G> {
    pub fn new(auth: Arc<AuthState>, gateway: G) -> Self {
        EntityContainer {
            auth,
            gateway,
            records: Vec::new(),
            current: None,
            is_loading: false,
            last_error: None,
        }
    }

    /// Records as returned by the last successful fetch, in that order
    pub fn records(&self) -> &[G::Record] {
        &self.records
    }

    /// The currently focused record, if any
    pub fn current(&self) -> Option<&G::Record> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch and replace the cached records wholesale. On failure the
    /// cache keeps its previous contents.
    pub async fn fetch_all(&mut self, query: ListQuery) -> Option<&[G::Record]> {
        if !self.auth.is_authenticated() {
            return None;
        }
        self.is_loading = true;
        self.last_error = None;
        let outcome = self.gateway.list(query).await;
        self.is_loading = false;
        match outcome {
            Ok(records) => {
                self.records = records;
                Some(&self.records)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Fetch one record and make it current. Absence is not a failure:
    /// a missing record clears `current` and yields `None` with no error.
    pub async fn fetch_by_id(&mut self, id: &str) -> Option<G::Record> {
        if !self.auth.is_authenticated() {
            return None;
        }
        self.is_loading = true;
        self.last_error = None;
        let outcome = self.gateway.get_by_id(id).await;
        self.is_loading = false;
        match outcome {
            Ok(record) => {
                self.current = record.clone();
                record
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Create a record and append it to the cache (no re-sort).
    pub async fn create(&mut self, draft: G::Draft) -> Option<G::Record> {
        if !self.auth.is_authenticated() {
            return None;
        }
        self.is_loading = true;
        self.last_error = None;
        let outcome = self.gateway.create(&draft).await;
        self.is_loading = false;
        match outcome {
            Ok(record) => {
                self.records.push(record.clone());
                Some(record)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Update a record and replace the matching cache entry. A cache
    /// miss is silent: the remote update is the source of truth for
    /// existence, the cache just doesn't have anything to replace.
    pub async fn update(&mut self, id: &str, patch: G::Patch) -> Option<G::Record> {
        if !self.auth.is_authenticated() {
            return None;
        }
        self.is_loading = true;
        self.last_error = None;
        let outcome = self.gateway.update(id, &patch).await;
        self.is_loading = false;
        match outcome {
            Ok(record) => {
                if let Some(entry) = self
                    .records
                    .iter_mut()
                    .find(|r| G::record_id(r) == id)
                {
                    *entry = record.clone();
                }
                if self
                    .current
                    .as_ref()
                    .is_some_and(|c| G::record_id(c) == id)
                {
                    self.current = Some(record.clone());
                }
                Some(record)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Delete a record and drop it from the cache; clears `current` if
    /// it was the deleted one.
    pub async fn delete(&mut self, id: &str) -> bool {
        if !self.auth.is_authenticated() {
            return false;
        }
        self.is_loading = true;
        self.last_error = None;
        let outcome = self.gateway.delete(id).await;
        self.is_loading = false;
        match outcome {
            Ok(()) => {
                self.records.retain(|r| G::record_id(r) != id);
                if self
                    .current
                    .as_ref()
                    .is_some_and(|c| G::record_id(c) == id)
                {
                    self.current = None;
                }
                true
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                false
            }
        }
    }
}
