use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use estate_storage::{Storage, StorageBackend, StorageError, StorageResult};

/// In-memory blob store that records every call and can be told to fail,
/// panic or stall for specific image indexes.
#[derive(Default)]
pub struct FakeStorage {
    stored: Mutex<BTreeSet<String>>,
    succeeded_puts: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_indexes: HashSet<usize>,
    panic_indexes: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    fail_deletes: bool,
    delete_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    deletes_in_flight: AtomicUsize,
    max_deletes_in_flight: AtomicUsize,
}

/// Image index encoded in `.../image_{index}{ext}`.
fn index_of(key: &str) -> Option<usize> {
    let name = key.rsplit('/').next()?;
    let rest = name.strip_prefix("image_")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, index: usize) -> Self {
        self.fail_indexes.insert(index);
        self
    }

    pub fn panicking_on(mut self, index: usize) -> Self {
        self.panic_indexes.insert(index);
        self
    }

    pub fn delaying(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    pub fn with_failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn delaying_deletes(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    pub fn stored_keys(&self) -> BTreeSet<String> {
        self.stored.lock().unwrap().clone()
    }

    pub fn succeeded_puts(&self) -> BTreeSet<String> {
        self.succeeded_puts.lock().unwrap().iter().cloned().collect()
    }

    pub fn deleted_keys(&self) -> BTreeSet<String> {
        self.deleted.lock().unwrap().iter().cloned().collect()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn max_delete_concurrency(&self) -> usize {
        self.max_deletes_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn put(&self, storage_key: &str, _data: Vec<u8>) -> StorageResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let index = index_of(storage_key);
        let delay = index
            .and_then(|i| self.delays.get(&i).copied())
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;

        if let Some(i) = index {
            if self.panic_indexes.contains(&i) {
                panic!("simulated storage panic for image {}", i);
            }
            if self.fail_indexes.contains(&i) {
                return Err(StorageError::UploadFailed(format!(
                    "simulated failure for image {}",
                    i
                )));
            }
        }

        self.stored.lock().unwrap().insert(storage_key.to_string());
        self.succeeded_puts
            .lock()
            .unwrap()
            .push(storage_key.to_string());
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let now = self.deletes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_deletes_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.deletes_in_flight);

        if let Some(delay) = self.delete_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_deletes {
            return Err(StorageError::DeleteFailed(format!(
                "simulated delete failure for {}",
                storage_key
            )));
        }
        self.stored.lock().unwrap().remove(storage_key);
        self.deleted.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.stored.lock().unwrap().contains(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("memory://{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
