//! # leasealloc
//!
//! An address-lease allocator: decides which address from a network range a
//! client gets, and guarantees no two clients hold the same address at once.
//!
//! ## Features
//!
//! - Sticky reuse: a returning client gets its previous address back
//! - Sequential assignment after the last handed-out address
//! - Reclaims released addresses once the range has been walked
//! - IPv4 and IPv6 networks
//! - Pluggable lease storage (in-memory or JSON file)
//! - Safe to share across tasks and threads
//!
//! ## Quick Start
//!
//! ```no_run
//! use leasealloc::{Allocator, ClientId, Config, FileStorage};
//!
//! #[tokio::main]
//! async fn main() -> leasealloc::Result<()> {
//!     let config = Config::load_or_create("config.json")?;
//!     let storage = FileStorage::open(&config.leases_file, config.network)?;
//!     let allocator = Allocator::new(config.network, storage);
//!
//!     let client: ClientId = "00:16:3e:03:57:45".parse()?;
//!     let ip = allocator.allocate(&client).await?;
//!     println!("{} -> {}", client, ip);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`Allocator`] - Allocation policy behind a single lock
//! - [`Storage`] - Lease table operations the allocator relies on
//! - [`MemoryStorage`] / [`FileStorage`] - Storage backends
//! - [`address`] - Address arithmetic for both IP families
//! - [`Config`] - Network range and lease file location

pub mod address;
pub mod allocator;
pub mod client_id;
pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod storage;

pub use allocator::Allocator;
pub use client_id::ClientId;
pub use config::Config;
pub use error::{Error, Result};
pub use file::FileStorage;
pub use memory::{LeaseTable, MemoryStorage};
pub use storage::{Lease, Storage};
