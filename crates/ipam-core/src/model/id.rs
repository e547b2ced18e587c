// ── Core identity types ──
//
// ObjectId, Vid and Family are shared by every entity. Ids are assigned by
// a backend and only ever copied, never invented.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

// ── ObjectId ────────────────────────────────────────────────────────

/// Backend-assigned identifier, unique within one entity kind on one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// phpIPAM writes "no reference" as `0`.
    pub fn non_zero(raw: Option<u64>) -> Option<Self> {
        raw.filter(|&id| id != 0).map(Self)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Vid ─────────────────────────────────────────────────────────────

/// 802.1Q VLAN number, 1 through 4094.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Vid(u16);

impl Vid {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(raw: u16) -> Result<Self, String> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!("VLAN id {raw} outside {}..={}", Self::MIN, Self::MAX))
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Vid {
    type Error = String;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl TryFrom<u64> for Vid {
    type Error = String;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        u16::try_from(raw)
            .map_err(|_| format!("VLAN id {raw} outside {}..={}", Self::MIN, Self::MAX))
            .and_then(Self::new)
    }
}

impl From<Vid> for u16 {
    fn from(vid: Vid) -> Self {
        vid.0
    }
}

impl fmt::Display for Vid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Family ──────────────────────────────────────────────────────────

/// IP address family, always derived from an address or network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "4")]
    V4,
    #[serde(rename = "6")]
    V6,
}

impl Family {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    pub fn of_net(net: &IpNet) -> Self {
        match net {
            IpNet::V4(_) => Self::V4,
            IpNet::V6(_) => Self::V6,
        }
    }

    /// Prefix length of a single host in this family.
    pub fn host_prefix_len(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

/// Parse a CIDR network, rejecting host bits (`10.0.0.1/24`).
pub fn parse_network(raw: &str) -> Result<IpNet, String> {
    let net = IpNet::from_str(raw.trim()).map_err(|e| format!("invalid CIDR {raw:?}: {e}"))?;
    if net.trunc() == net {
        Ok(net)
    } else {
        Err(format!("invalid CIDR {raw:?}: host bits set"))
    }
}

/// Parse `10.0.0.5` or `10.0.0.5/24` into the address and optional length.
pub fn parse_host(raw: &str) -> Result<(IpAddr, Option<u8>), String> {
    let raw = raw.trim();
    match raw.split_once('/') {
        Some((addr, len)) => {
            let addr: IpAddr = addr
                .parse()
                .map_err(|e| format!("invalid IP address {raw:?}: {e}"))?;
            let len: u8 = len
                .parse()
                .map_err(|e| format!("invalid prefix length in {raw:?}: {e}"))?;
            if len > Family::of(&addr).host_prefix_len() {
                return Err(format!("invalid prefix length in {raw:?}"));
            }
            Ok((addr, Some(len)))
        }
        None => raw
            .parse()
            .map(|addr| (addr, None))
            .map_err(|e| format!("invalid IP address {raw:?}: {e}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn vid_bounds() {
        assert!(Vid::new(0).is_err());
        assert!(Vid::new(4095).is_err());
        assert_eq!(Vid::new(4094).unwrap().get(), 4094);
        assert!(Vid::try_from(70_000u64).is_err());
    }

    #[test]
    fn vid_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Vid>("0").is_err());
        assert_eq!(serde_json::from_str::<Vid>("10").unwrap().get(), 10);
    }

    #[test]
    fn zero_reference_is_none() {
        assert_eq!(ObjectId::non_zero(Some(0)), None);
        assert_eq!(ObjectId::non_zero(Some(4)), Some(ObjectId::new(4)));
        assert_eq!(ObjectId::non_zero(None), None);
    }

    #[test]
    fn network_rejects_host_bits() {
        assert!(parse_network("10.0.0.1/24").is_err());
        let net = parse_network("2001:db8::/32").unwrap();
        assert_eq!(Family::of_net(&net), Family::V6);
    }

    #[test]
    fn host_with_and_without_length() {
        let (addr, len) = parse_host("10.0.0.5/24").unwrap();
        assert_eq!(addr.to_string(), "10.0.0.5");
        assert_eq!(len, Some(24));
        assert_eq!(parse_host("::1").unwrap().1, None);
        assert!(parse_host("10.0.0.5/33").is_err());
    }
}
