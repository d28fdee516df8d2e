//! In-memory lease table.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::client_id::ClientId;
use crate::error::{Error, Result};
use crate::storage::{Lease, Storage};

/// Serializable lease state.
///
/// This is the on-disk format used by [`FileStorage`](crate::FileStorage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTable {
    /// Remembered address per client, kept across releases.
    pub leases: HashMap<ClientId, IpAddr>,
    /// Every address ever assigned, with its in-use flag.
    pub in_use: BTreeMap<IpAddr, bool>,
    /// Most recently assigned address (network base when empty).
    pub last_address: IpAddr,
}

impl LeaseTable {
    /// Creates an empty table whose probe starts right after the network's
    /// base address.
    pub fn new(network: IpNet) -> Self {
        Self {
            leases: HashMap::new(),
            in_use: BTreeMap::new(),
            last_address: network.network(),
        }
    }
}

/// [`Storage`] backed by plain maps.
///
/// `unused_address` always answers with the lowest released address in the
/// requested network, so reclaim order is deterministic.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    table: LeaseTable,
    /// Reverse lookup: address -> client currently remembered for it.
    ip_to_client: HashMap<IpAddr, ClientId>,
}

impl MemoryStorage {
    pub fn new(network: IpNet) -> Self {
        Self::from_table(LeaseTable::new(network))
    }

    /// Wraps an existing table, rebuilding the reverse index.
    pub fn from_table(table: LeaseTable) -> Self {
        let ip_to_client = table
            .leases
            .iter()
            .map(|(client, ip)| (*ip, client.clone()))
            .collect();
        Self {
            table,
            ip_to_client,
        }
    }

    pub fn table(&self) -> &LeaseTable {
        &self.table
    }
}

impl Storage for MemoryStorage {
    fn address_for_client(&self, client: &ClientId) -> Result<Option<IpAddr>> {
        Ok(self.table.leases.get(client).copied())
    }

    fn last_address(&self) -> Result<IpAddr> {
        Ok(self.table.last_address)
    }

    fn unused_address(&self, network: &IpNet) -> Result<Option<IpAddr>> {
        Ok(self
            .table
            .in_use
            .iter()
            .find(|(ip, used)| !**used && network.contains(*ip))
            .map(|(ip, _)| *ip))
    }

    fn set_address_for_client(&mut self, address: IpAddr, client: &ClientId) -> Result<()> {
        // A reclaimed address stops being sticky for whoever held it before.
        if let Some(previous) = self.ip_to_client.get(&address)
            && previous != client
        {
            self.table.leases.remove(previous);
        }

        if let Some(old_ip) = self.table.leases.get(client).copied()
            && old_ip != address
        {
            self.ip_to_client.remove(&old_ip);
            self.table.in_use.insert(old_ip, false);
        }

        self.table.leases.insert(client.clone(), address);
        self.ip_to_client.insert(address, client.clone());
        self.table.in_use.insert(address, true);
        self.table.last_address = address;
        Ok(())
    }

    fn release_address(&mut self, address: IpAddr) -> Result<()> {
        match self.table.in_use.get_mut(&address) {
            Some(used) => {
                *used = false;
                Ok(())
            }
            None => Err(Error::NotFound(address)),
        }
    }

    fn is_used(&self, address: IpAddr) -> Result<bool> {
        Ok(self.table.in_use.get(&address).copied().unwrap_or(false))
    }

    fn leases(&self) -> Result<Vec<Lease>> {
        let mut leases: Vec<Lease> = self
            .table
            .leases
            .iter()
            .map(|(client, ip)| Lease {
                client_id: client.clone(),
                ip_address: *ip,
                in_use: self.table.in_use.get(ip).copied().unwrap_or(false),
            })
            .collect();
        leases.sort_by_key(|lease| lease.ip_address);
        Ok(leases)
    }
}
