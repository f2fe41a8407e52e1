use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;

use crate::error::AppError;
use crate::loader::{self, DataSource, SourceFormat};
use crate::pipeline::table::Table;
use crate::secrets::Secrets;

/// Shared application state: the memoized parse cache.
///
/// Keyed by the exact input blob (plus its format), so an identical
/// re-upload skips re-parsing. No eviction; staleness is impossible because
/// the key is the content itself.
pub struct AppState {
    cache: Mutex<HashMap<(SourceFormat, Vec<u8>), Table>>,
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves and parses a data source, serving repeat blobs from cache.
    pub fn load_table(&self, source: &DataSource, secrets: &Secrets) -> Result<Table, AppError> {
        let (bytes, formato) = source.resolve_bytes(secrets)?;
        let mut cache = self
            .cache
            .lock()
            .map_err(|e| AppError::Custom(format!("Mutex poisoned: {}", e)))?;
        if let Some(table) = cache.get(&(formato, bytes.clone())) {
            debug!("Cache hit para blob de {} bytes", bytes.len());
            return Ok(table.clone());
        }
        let table = loader::parse_bytes(formato, &bytes)?;
        cache.insert((formato, bytes), table.clone());
        Ok(table)
    }

    /// Number of distinct blobs parsed so far.
    pub fn cached_blobs(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}
