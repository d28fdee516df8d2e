//! Address allocation policy.
//!
//! [`Allocator`] decides which address a client gets and serializes every
//! decision behind a single lock, so no two clients can ever be handed the
//! same in-use address.
//!
//! # Allocation Priority
//!
//! 1. Sticky reuse: the address the client held before, even if released
//! 2. Forward probe: the first free address after the last assignment,
//!    stopping at the end of the network (no wrap-around)
//! 3. Released-address scan: any address storage reports as not in use
//!
//! If all three come up empty the call fails with
//! [`Error::PoolExhausted`] and storage is left untouched.

use std::net::IpAddr;

use ipnet::IpNet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::address::checked_add_delta;
use crate::client_id::ClientId;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Thread-safe address allocator over a [`Storage`] backend.
///
/// # Example
///
/// ```
/// use leasealloc::{Allocator, ClientId, MemoryStorage};
///
/// # async fn example() -> leasealloc::Result<()> {
/// let network = "192.168.1.0/24".parse().unwrap();
/// let allocator = Allocator::new(network, MemoryStorage::new(network));
///
/// let client: ClientId = "00:16:3e:03:57:45".parse()?;
/// let ip = allocator.allocate(&client).await?;
/// allocator.release(ip).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Allocator<S> {
    network: IpNet,
    storage: Mutex<S>,
}

impl<S: Storage> Allocator<S> {
    pub fn new(network: IpNet, storage: S) -> Self {
        Self {
            network,
            storage: Mutex::new(storage),
        }
    }

    pub fn network(&self) -> &IpNet {
        &self.network
    }

    /// Allocates an address for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if no address is free, or whatever
    /// error the storage backend reports.
    pub async fn allocate(&self, client: &ClientId) -> Result<IpAddr> {
        let mut storage = self.storage.lock().await;
        self.allocate_locked(&mut *storage, client)
    }

    /// Blocking form of [`allocate`](Self::allocate) for callers on plain
    /// OS threads. Panics if called from within an async runtime.
    pub fn blocking_allocate(&self, client: &ClientId) -> Result<IpAddr> {
        let mut storage = self.storage.blocking_lock();
        self.allocate_locked(&mut *storage, client)
    }

    /// Marks `address` as free for other clients.
    ///
    /// The client that held it keeps its claim and gets it back on its next
    /// allocation unless someone else takes it first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if storage has no record of `address`.
    pub async fn release(&self, address: IpAddr) -> Result<()> {
        let mut storage = self.storage.lock().await;
        Self::release_locked(&mut *storage, address)
    }

    /// Blocking form of [`release`](Self::release).
    pub fn blocking_release(&self, address: IpAddr) -> Result<()> {
        let mut storage = self.storage.blocking_lock();
        Self::release_locked(&mut *storage, address)
    }

    /// Runs a read-only closure against the storage while holding the lock.
    pub async fn inspect<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let storage = self.storage.lock().await;
        read(&storage)
    }

    /// Blocking form of [`inspect`](Self::inspect).
    pub fn blocking_inspect<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let storage = self.storage.blocking_lock();
        read(&storage)
    }

    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }

    fn allocate_locked(&self, storage: &mut S, client: &ClientId) -> Result<IpAddr> {
        if let Some(ip) = storage.address_for_client(client)? {
            if self.network.contains(&ip) {
                storage.set_address_for_client(ip, client)?;
                info!("Reassigned {} to {}", ip, client);
                return Ok(ip);
            }
            warn!(
                "Remembered address {} for {} is outside {}, allocating a new one",
                ip, client, self.network
            );
        }

        let last = storage.last_address()?;
        let start = if self.network.contains(&last) {
            last
        } else {
            self.network.network()
        };

        let mut candidate = checked_add_delta(start, 1);
        while let Some(ip) = candidate.filter(|ip| self.network.contains(ip)) {
            if !storage.is_used(ip)? {
                storage.set_address_for_client(ip, client)?;
                info!("Assigned {} to {}", ip, client);
                return Ok(ip);
            }
            debug!("{} is in use, probing next address", ip);
            candidate = checked_add_delta(ip, 1);
        }

        if let Some(ip) = storage.unused_address(&self.network)? {
            if self.network.contains(&ip) {
                storage.set_address_for_client(ip, client)?;
                info!("Assigned released address {} to {}", ip, client);
                return Ok(ip);
            }
            warn!("Ignoring unused address {} outside {}", ip, self.network);
        }

        warn!("Pool exhausted, cannot assign an address to {}", client);
        Err(Error::PoolExhausted)
    }

    fn release_locked(storage: &mut S, address: IpAddr) -> Result<()> {
        storage.release_address(address)?;
        info!("Released {}", address);
        Ok(())
    }
}
