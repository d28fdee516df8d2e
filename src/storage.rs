//! The storage capability the allocator runs its policy against.
//!
//! The allocator owns no lease state. Everything it knows about which
//! address belongs to which client, and which addresses are in use, comes
//! from a [`Storage`] implementation chosen by the caller:
//!
//! - [`MemoryStorage`](crate::MemoryStorage) - in-process lease table
//! - [`FileStorage`](crate::FileStorage) - lease table persisted as JSON
//!
//! # Thread Safety
//!
//! Implementations need not be thread-safe. The
//! [`Allocator`](crate::Allocator) calls storage only while holding its
//! lock, so at most one call is ever in flight.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::client_id::ClientId;
use crate::error::Result;

/// A remembered client-to-address binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub client_id: ClientId,
    pub ip_address: IpAddr,
    /// False once the address has been released. The binding is kept so the
    /// client gets the same address back on its next request.
    pub in_use: bool,
}

/// Lease table operations required by the allocator.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Returns the address previously recorded for `client`, if any.
    ///
    /// Must not change the address's in-use state.
    fn address_for_client(&self, client: &ClientId) -> Result<Option<IpAddr>>;

    /// Returns the most recently assigned address, or the network's base
    /// address if nothing has been assigned yet.
    fn last_address(&self) -> Result<IpAddr>;

    /// Returns any recorded address inside `network` that is currently not
    /// in use. Entries left over from a different network are skipped.
    ///
    /// Which one is picked when several qualify is up to the implementation.
    fn unused_address(&self, network: &IpNet) -> Result<Option<IpAddr>>;

    /// Records `client -> address`, marks `address` in use, and makes it the
    /// last assigned address. Calling it twice with the same pair is a no-op
    /// the second time.
    fn set_address_for_client(&mut self, address: IpAddr, client: &ClientId) -> Result<()>;

    /// Marks `address` as not in use without forgetting which client held it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if `address` has
    /// no record.
    fn release_address(&mut self, address: IpAddr) -> Result<()>;

    /// Returns whether `address` is in use. Unknown addresses are not.
    fn is_used(&self, address: IpAddr) -> Result<bool>;

    /// Returns every remembered lease, ordered by address.
    fn leases(&self) -> Result<Vec<Lease>>;
}
