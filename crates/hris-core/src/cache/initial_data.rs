use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::codec;
use crate::error::HrisError;
use crate::models::{
    CachedInitialData, DecompressedInitialData, GetInitialDataRequest, GetInitialDataResponse,
};
use crate::storage::{
    KeyValueStore, StorageError, HASH_VALUE_KEY, INITIAL_DATA_KEY, LANGUAGE_KEY,
};

/// Anything that can answer the initial-data endpoint. Implemented by
/// `ApiClient`; tests script their own.
pub trait InitialDataSource {
    fn get_initial_data(
        &self,
        request: &GetInitialDataRequest,
    ) -> impl Future<Output = anyhow::Result<GetInitialDataResponse>> + Send;
}

/// What a successful fetch did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server confirmed the local hash; the held snapshot was kept.
    CacheHit,
    /// A new snapshot was decompressed and replaced the old one.
    Refreshed { employees: usize },
    /// The server neither matched the hash nor sent a payload.
    NoData,
}

/// Holds the current organization snapshot and the server hash it belongs to.
///
/// Hash and snapshot are always replaced together. Snapshots are shared as
/// `Arc<CachedInitialData>` and never mutated after they are built.
pub struct InitialDataStore {
    storage: Arc<dyn KeyValueStore>,
    hash_value: Option<String>,
    data: Option<Arc<CachedInitialData>>,
    last_error: Option<String>,
}

impl InitialDataStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            hash_value: None,
            data: None,
            last_error: None,
        }
    }

    pub fn hash_value(&self) -> Option<&str> {
        self.hash_value.as_deref()
    }

    pub fn data(&self) -> Option<&Arc<CachedInitialData>> {
        self.data.as_ref()
    }

    /// Message of the most recent failed fetch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Language sent with the last fetch, if any was recorded.
    pub fn stored_language(&self) -> Option<String> {
        self.storage.get(LANGUAGE_KEY).ok().flatten()
    }

    /// Restore the persisted hash and snapshot.
    ///
    /// Both must be present and readable; otherwise nothing is loaded and the
    /// in-memory state is left as it was. When the persisted hash is the one
    /// already held, the held snapshot is returned without re-parsing.
    pub fn load_from_cache(&mut self) -> Option<Arc<CachedInitialData>> {
        let hash = match self.storage.get(HASH_VALUE_KEY) {
            Ok(Some(hash)) if !hash.is_empty() => hash,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached hash");
                return None;
            }
        };

        if self.hash_value.as_deref() == Some(hash.as_str()) {
            if let Some(data) = &self.data {
                return Some(data.clone());
            }
        }

        let contents = match self.storage.get(INITIAL_DATA_KEY) {
            Ok(Some(contents)) => contents,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached initial data");
                return None;
            }
        };

        match serde_json::from_str::<CachedInitialData>(&contents) {
            Ok(parsed) => {
                let data = Arc::new(parsed);
                debug!(hash = %hash, employees = data.employee_list.len(), "Loaded initial data from cache");
                self.hash_value = Some(hash);
                self.data = Some(data.clone());
                Some(data)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse cached initial data");
                None
            }
        }
    }

    /// Bring the snapshot up to date with the server.
    ///
    /// On failure the previously held snapshot stays in place and usable.
    pub async fn fetch_initial_data<S: InitialDataSource>(
        &mut self,
        source: &S,
        language: &str,
    ) -> Result<FetchOutcome, HrisError> {
        self.last_error = None;

        let result = self.fetch(source, language).await;
        if let Err(ref e) = result {
            error!(error = %e, "Error fetching initial data");
            self.last_error = Some(e.to_string());
        }
        result
    }

    async fn fetch<S: InitialDataSource>(
        &mut self,
        source: &S,
        language: &str,
    ) -> Result<FetchOutcome, HrisError> {
        let cached = self.load_from_cache().or_else(|| self.data.clone());

        // Only advertise a hash we can actually fall back on.
        let current_hash = cached.as_ref().and(self.hash_value.clone());
        let request = GetInitialDataRequest::new(current_hash, language);

        let response = source
            .get_initial_data(&request)
            .await
            .map_err(HrisError::Network)?;

        info!(
            hash_matched = response.hash_matched,
            hash = %response.hash_value,
            compressed_len = response.initial_compressed_data.as_ref().map(|d| d.len()).unwrap_or(0),
            "Initial data response"
        );

        if let Err(e) = self.storage.set(LANGUAGE_KEY, language) {
            debug!(error = %e, "Failed to remember language");
        }

        if response.hash_matched {
            if let Some(cached) = cached {
                debug!("Hash matched, keeping cached snapshot");
                self.data = Some(cached);
                return Ok(FetchOutcome::CacheHit);
            }
        }

        let Some(payload) = response
            .initial_compressed_data
            .as_deref()
            .filter(|p| !p.is_empty())
        else {
            warn!(hash = %response.hash_value, "Server sent no initial data payload");
            return Ok(FetchOutcome::NoData);
        };

        let decompressed: DecompressedInitialData = codec::decompress(payload)?;
        let snapshot = Arc::new(CachedInitialData::from(decompressed));
        let employees = snapshot.employee_list.len();

        self.save_to_cache(response.hash_value, snapshot);
        info!(employees, "Initial data refreshed");
        Ok(FetchOutcome::Refreshed { employees })
    }

    /// Swap in a new snapshot and persist it on a best-effort basis.
    fn save_to_cache(&mut self, hash: String, snapshot: Arc<CachedInitialData>) {
        self.hash_value = Some(hash.clone());
        self.data = Some(snapshot.clone());

        if let Err(e) = self.persist(&hash, &snapshot) {
            if e.is_quota() {
                warn!(error = %e, "Storage quota exceeded, initial data kept in memory only");
            } else {
                warn!(error = %e, "Failed to persist initial data, kept in memory only");
            }
            // A hash without its snapshot would make the next run skip the download.
            for key in [HASH_VALUE_KEY, INITIAL_DATA_KEY] {
                if let Err(e) = self.storage.remove(key) {
                    warn!(key = key, error = %e, "Failed to drop stale cache entry");
                }
            }
        }
    }

    fn persist(&self, hash: &str, snapshot: &CachedInitialData) -> Result<(), StorageError> {
        let contents = serde_json::to_string(snapshot)?;
        self.storage.set(INITIAL_DATA_KEY, &contents)?;
        self.storage.set(HASH_VALUE_KEY, hash)?;
        Ok(())
    }

    /// Forget the snapshot in memory and in storage.
    pub fn clear_cache(&mut self) -> Result<(), HrisError> {
        self.hash_value = None;
        self.data = None;
        self.storage.remove(HASH_VALUE_KEY)?;
        self.storage.remove(INITIAL_DATA_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers with a fixed response and records every request.
    struct ScriptedSource {
        response: Mutex<Option<anyhow::Result<GetInitialDataResponse>>>,
        requests: Mutex<Vec<GetInitialDataRequest>>,
    }

    impl ScriptedSource {
        fn respond(response: GetInitialDataResponse) -> Self {
            Self {
                response: Mutex::new(Some(Ok(response))),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn fail(message: &str) -> Self {
            Self {
                response: Mutex::new(Some(Err(anyhow::anyhow!(message.to_string())))),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> GetInitialDataRequest {
            self.requests.lock().unwrap().last().cloned().expect("a request was sent")
        }
    }

    impl InitialDataSource for ScriptedSource {
        async fn get_initial_data(
            &self,
            request: &GetInitialDataRequest,
        ) -> anyhow::Result<GetInitialDataResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted response left")))
        }
    }

    fn payload(names: &[&str]) -> String {
        let employees: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({"employeeID": format!("E{i}"), "id": format!("U{i}"), "name": name, "employeeCode": format!("C{i}")}))
            .collect();
        codec::compress(&json!({
            "companyGroups": {"companyGroups": [{"id": "G1", "levelName": "TEAM", "leaderID": "E0"}]},
            "employeeList": employees,
            "fieldConfigs": [],
            "listWorkWeek": [],
            "orgConfigs": []
        }))
        .unwrap()
    }

    fn response(matched: bool, hash: &str, data: Option<String>) -> GetInitialDataResponse {
        GetInitialDataResponse {
            hash_matched: matched,
            hash_value: hash.to_string(),
            initial_compressed_data: data,
        }
    }

    async fn seeded_store(storage: Arc<MemoryStore>) -> InitialDataStore {
        let mut store = InitialDataStore::new(storage);
        let source = ScriptedSource::respond(response(false, "H1", Some(payload(&["An", "Binh"]))));
        store.fetch_initial_data(&source, "en-US").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_first_fetch_decompresses_and_persists() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = InitialDataStore::new(storage.clone());
        let source = ScriptedSource::respond(response(false, "H1", Some(payload(&["An", "Binh"]))));

        let outcome = store.fetch_initial_data(&source, "vi-VN").await.unwrap();

        assert_eq!(outcome, FetchOutcome::Refreshed { employees: 2 });
        assert_eq!(source.last_request().hash_value, None);
        assert_eq!(source.last_request().language.key.as_deref(), Some("vi-VN"));
        assert_eq!(store.hash_value(), Some("H1"));

        let data = store.data().unwrap();
        assert_eq!(data.employee_list.len(), 2);
        assert_eq!(data.simple_emp_list[1].name, "Binh");
        assert_eq!(data.simple_emp_list[1].id, "U1");

        assert_eq!(storage.get(HASH_VALUE_KEY).unwrap().as_deref(), Some("H1"));
        assert!(storage.get(INITIAL_DATA_KEY).unwrap().is_some());
        assert_eq!(store.stored_language().as_deref(), Some("vi-VN"));
    }

    #[tokio::test]
    async fn test_hash_match_keeps_snapshot_without_decompressing() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage).await;
        let before = store.data().cloned().unwrap();

        // The payload is garbage: decoding it would fail the fetch.
        let source = ScriptedSource::respond(response(true, "H1", Some("%%%".into())));
        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(outcome, FetchOutcome::CacheHit);
        assert_eq!(source.last_request().hash_value.as_deref(), Some("H1"));
        assert!(Arc::ptr_eq(store.data().unwrap(), &before));
        assert_eq!(store.hash_value(), Some("H1"));
    }

    #[tokio::test]
    async fn test_hash_match_after_restart_uses_persisted_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        let expected = seeded_store(storage.clone()).await.data().cloned().unwrap();

        let mut store = InitialDataStore::new(storage);
        let source = ScriptedSource::respond(response(true, "H1", None));
        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(outcome, FetchOutcome::CacheHit);
        assert_eq!(store.data().map(|d| d.as_ref()), Some(expected.as_ref()));
    }

    #[tokio::test]
    async fn test_new_hash_replaces_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage.clone()).await;

        let new_payload = payload(&["Chi", "Dung", "Giang"]);
        let expected: DecompressedInitialData = codec::decompress(&new_payload).unwrap();
        let source = ScriptedSource::respond(response(false, "H2", Some(new_payload)));

        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(outcome, FetchOutcome::Refreshed { employees: 3 });
        assert_eq!(store.hash_value(), Some("H2"));
        assert_eq!(store.data().unwrap().employee_list, expected.employee_list);
        assert_eq!(storage.get(HASH_VALUE_KEY).unwrap().as_deref(), Some("H2"));
    }

    #[tokio::test]
    async fn test_matched_hash_without_local_snapshot_still_decompresses() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = InitialDataStore::new(storage);
        let source = ScriptedSource::respond(response(true, "H9", Some(payload(&["An"]))));

        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();
        assert_eq!(outcome, FetchOutcome::Refreshed { employees: 1 });
        assert_eq!(store.hash_value(), Some("H9"));
    }

    #[tokio::test]
    async fn test_network_error_keeps_previous_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage.clone()).await;
        let before = store.data().cloned().unwrap();

        let source = ScriptedSource::fail("connection refused");
        let err = store.fetch_initial_data(&source, "en-US").await.unwrap_err();

        assert!(err.is_network());
        assert!(store.last_error().unwrap().contains("connection refused"));
        assert!(Arc::ptr_eq(store.data().unwrap(), &before));
        assert_eq!(store.hash_value(), Some("H1"));
    }

    #[tokio::test]
    async fn test_decode_error_keeps_previous_snapshot_and_storage() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage.clone()).await;
        let persisted = storage.get(INITIAL_DATA_KEY).unwrap();

        let source = ScriptedSource::respond(response(false, "H2", Some("bm90IHpsaWI=".into())));
        let err = store.fetch_initial_data(&source, "en-US").await.unwrap_err();

        assert!(err.is_decode());
        assert_eq!(store.hash_value(), Some("H1"));
        assert_eq!(store.data().unwrap().employee_list.len(), 2);
        assert_eq!(storage.get(HASH_VALUE_KEY).unwrap().as_deref(), Some("H1"));
        assert_eq!(storage.get(INITIAL_DATA_KEY).unwrap(), persisted);

        // A later successful fetch clears the error.
        let source = ScriptedSource::respond(response(true, "H1", None));
        store.fetch_initial_data(&source, "en-US").await.unwrap();
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_quota_failure_keeps_data_in_memory() {
        let storage = Arc::new(MemoryStore::with_quota(64));
        let mut store = InitialDataStore::new(storage.clone());
        let source = ScriptedSource::respond(response(false, "H1", Some(payload(&["An", "Binh"]))));

        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(outcome, FetchOutcome::Refreshed { employees: 2 });
        assert!(store.last_error().is_none());
        assert_eq!(store.hash_value(), Some("H1"));
        assert_eq!(store.data().unwrap().employee_list.len(), 2);
        // Neither half of the pair is persisted on its own.
        assert_eq!(storage.get(HASH_VALUE_KEY).unwrap(), None);
        assert_eq!(storage.get(INITIAL_DATA_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_only_snapshot_is_offered_to_the_server() {
        let storage = Arc::new(MemoryStore::with_quota(64));
        let mut store = InitialDataStore::new(storage);
        let source = ScriptedSource::respond(response(false, "H1", Some(payload(&["An"]))));
        store.fetch_initial_data(&source, "en-US").await.unwrap();

        let source = ScriptedSource::respond(response(true, "H1", None));
        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(source.last_request().hash_value.as_deref(), Some("H1"));
        assert_eq!(outcome, FetchOutcome::CacheHit);
    }

    #[tokio::test]
    async fn test_no_match_and_no_payload_changes_nothing() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage).await;

        let source = ScriptedSource::respond(response(false, "H2", None));
        let outcome = store.fetch_initial_data(&source, "en-US").await.unwrap();

        assert_eq!(outcome, FetchOutcome::NoData);
        assert_eq!(store.hash_value(), Some("H1"));
        assert!(store.data().is_some());
    }

    #[test]
    fn test_load_from_cache_ignores_corrupt_or_partial_entries() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = InitialDataStore::new(storage.clone());
        assert!(store.load_from_cache().is_none());

        storage.set(HASH_VALUE_KEY, "H1").unwrap();
        assert!(store.load_from_cache().is_none());

        storage.set(INITIAL_DATA_KEY, "{truncated").unwrap();
        assert!(store.load_from_cache().is_none());
        assert!(store.hash_value().is_none());

        storage.set(INITIAL_DATA_KEY, "{}").unwrap();
        let loaded = store.load_from_cache().unwrap();
        assert!(loaded.employee_list.is_empty());
        assert_eq!(store.hash_value(), Some("H1"));
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = seeded_store(storage.clone()).await;

        store.clear_cache().unwrap();
        assert!(store.hash_value().is_none());
        assert!(store.data().is_none());
        assert_eq!(storage.get(HASH_VALUE_KEY).unwrap(), None);
        assert_eq!(storage.get(INITIAL_DATA_KEY).unwrap(), None);
    }
}
