use ipnet::{IpNet, Ipv4Net};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use crate::address::host_capacity;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network addresses are handed out from, in CIDR form.
    pub network: IpNet,
    pub leases_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: IpNet::V4(Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 1, 0), 24)),
            leases_file: "leases.json".to_string(),
        }
    }
}

impl Config {
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity() == 0 {
            return Err(Error::InvalidConfig(format!(
                "network {} has no assignable addresses",
                self.network
            )));
        }

        if self.leases_file.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "leases_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of addresses the allocator can hand out.
    pub fn capacity(&self) -> u128 {
        host_capacity(&self.network)
    }
}
