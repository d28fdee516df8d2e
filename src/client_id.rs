use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier an address is allocated to, usually a hardware address.
///
/// The text form is colon-separated lowercase hex (`aa:bb:cc:dd:ee:ff`).
/// Parsing also accepts `-` as the separator and either case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(Vec<u8>);

impl ClientId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 6]> for ClientId {
    fn from(mac: [u8; 6]) -> Self {
        Self(mac.to_vec())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self
            .0
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<Vec<_>>()
            .join(":");
        f.write_str(&encoded)
    }
}

impl FromStr for ClientId {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidClientId("empty identifier".to_string()));
        }

        let normalized = text.replace('-', ":");
        let bytes = normalized
            .split(':')
            .map(|part| {
                if part.is_empty() || part.len() > 2 {
                    return Err(Error::InvalidClientId(text.to_string()));
                }
                u8::from_str_radix(part, 16).map_err(|_| Error::InvalidClientId(text.to_string()))
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ClientId {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.to_string()
    }
}
