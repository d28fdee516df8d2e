//! Lease table persisted to a JSON file.
//!
//! Every mutation rewrites the whole file before returning, so a process
//! restart picks up exactly the state the last successful call left behind.
//! If the write fails the in-memory table is rolled back and the error is
//! returned from the mutating call.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use ipnet::IpNet;
use tracing::debug;

use crate::client_id::ClientId;
use crate::error::Result;
use crate::memory::{LeaseTable, MemoryStorage};
use crate::storage::{Lease, Storage};

/// [`Storage`] that keeps a [`MemoryStorage`] in sync with a JSON file.
///
/// Writes use blocking `std::fs` calls and run while the allocator lock is
/// held, so [`Allocator::allocate`](crate::Allocator::allocate) on a
/// `FileStorage` stalls the runtime worker for the duration of the write.
/// Async callers with a busy lease file should move the call onto the
/// blocking pool:
///
/// ```no_run
/// use std::sync::Arc;
/// use leasealloc::{Allocator, ClientId, FileStorage};
///
/// # async fn example() -> leasealloc::Result<()> {
/// let network = "10.0.0.0/24".parse().unwrap();
/// let allocator = Arc::new(Allocator::new(
///     network,
///     FileStorage::open("leases.json", network)?,
/// ));
///
/// let client: ClientId = "aa:bb:cc:dd:ee:ff".parse()?;
/// let shared = Arc::clone(&allocator);
/// let ip = tokio::task::spawn_blocking(move || shared.blocking_allocate(&client))
///     .await
///     .expect("allocation task panicked")?;
/// println!("{}", ip);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    inner: MemoryStorage,
    path: PathBuf,
}

impl FileStorage {
    /// Opens the lease file at `path`.
    ///
    /// A missing file yields an empty table that starts probing at the base
    /// of `network`. The file is not created until the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P, network: IpNet) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let table: LeaseTable = serde_json::from_str(&content)?;
            debug!("Loaded {} lease(s) from {:?}", table.leases.len(), path);
            table
        } else {
            LeaseTable::new(network)
        };

        Ok(Self {
            inner: MemoryStorage::from_table(table),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self.inner.table())?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn mutate<F>(&mut self, operation: F) -> Result<()>
    where
        F: FnOnce(&mut MemoryStorage) -> Result<()>,
    {
        let snapshot = self.inner.clone();
        operation(&mut self.inner)?;
        if let Err(error) = self.save() {
            self.inner = snapshot;
            return Err(error);
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn address_for_client(&self, client: &ClientId) -> Result<Option<IpAddr>> {
        self.inner.address_for_client(client)
    }

    fn last_address(&self) -> Result<IpAddr> {
        self.inner.last_address()
    }

    fn unused_address(&self, network: &IpNet) -> Result<Option<IpAddr>> {
        self.inner.unused_address(network)
    }

    fn set_address_for_client(&mut self, address: IpAddr, client: &ClientId) -> Result<()> {
        self.mutate(|inner| inner.set_address_for_client(address, client))
    }

    fn release_address(&mut self, address: IpAddr) -> Result<()> {
        self.mutate(|inner| inner.release_address(address))
    }

    fn is_used(&self, address: IpAddr) -> Result<bool> {
        self.inner.is_used(address)
    }

    fn leases(&self) -> Result<Vec<Lease>> {
        self.inner.leases()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct TestGuard(String);
    impl Drop for TestGuard {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn test_path(name: &str) -> (String, TestGuard) {
        let path = format!("test_file_storage_{}.json", name);
        (path.clone(), TestGuard(path))
    }

    fn network() -> IpNet {
        "192.168.10.0/28".parse().unwrap()
    }

    fn ip(text: &str) -> IpAddr {
        text.parse().unwrap()
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let (path, _guard) = test_path("missing");
        let storage = FileStorage::open(&path, network()).unwrap();
        assert_eq!(storage.last_address().unwrap(), ip("192.168.10.0"));
        assert!(storage.leases().unwrap().is_empty());
        assert!(!Path::new(&path).exists());
    }

    #[test]
    fn test_state_survives_reopen() {
        let (path, _guard) = test_path("reopen");
        let client = ClientId::from([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

        {
            let mut storage = FileStorage::open(&path, network()).unwrap();
            storage.set_address_for_client(ip("192.168.10.1"), &client).unwrap();
            storage
                .set_address_for_client(ip("192.168.10.2"), &ClientId::from([1, 2, 3, 4, 5, 6]))
                .unwrap();
            storage.release_address(ip("192.168.10.1")).unwrap();
        }

        let storage = FileStorage::open(&path, network()).unwrap();
        assert_eq!(storage.last_address().unwrap(), ip("192.168.10.2"));
        assert_eq!(
            storage.address_for_client(&client).unwrap(),
            Some(ip("192.168.10.1"))
        );
        assert!(!storage.is_used(ip("192.168.10.1")).unwrap());
        assert!(storage.is_used(ip("192.168.10.2")).unwrap());
    }

    #[test]
    fn test_failed_release_does_not_write() {
        let (path, _guard) = test_path("failed_release");
        let mut storage = FileStorage::open(&path, network()).unwrap();
        let result = storage.release_address(ip("192.168.10.9"));
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(!Path::new(&path).exists());
    }

    #[test]
    fn test_write_failure_rolls_back() {
        let missing_dir = "test_file_storage_no_such_dir/leases.json";
        let mut storage = FileStorage::open(missing_dir, network()).unwrap();
        let client = ClientId::from([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01]);

        let result = storage.set_address_for_client(ip("192.168.10.1"), &client);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(storage.address_for_client(&client).unwrap(), None);
        assert!(!storage.is_used(ip("192.168.10.1")).unwrap());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let (path, _guard) = test_path("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        let result = FileStorage::open(&path, network());
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
