// phpIPAM API response types
//
// phpIPAM wraps every payload in `{ code, success, message, data }` and
// serializes most numbers as strings ("12", "0"), sometimes as real
// numbers depending on version and backend. The `lenient` helpers accept
// either form.

use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard phpIPAM response envelope.
///
/// ```json
/// { "code": 200, "success": true, "data": [...], "time": 0.01 }
/// { "code": 404, "success": false, "message": "No subnets found" }
/// { "code": 201, "success": true, "message": "Vlan created", "id": "14" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient::code")]
    pub code: u16,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    /// Id of a newly created object (create calls only).
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<u64>,
}

/// `data` of a successful `POST user/` login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    /// Server-local expiry, `%Y-%m-%d %H:%M:%S`.
    #[serde(default)]
    pub expires: Option<String>,
}

// ── Controller introspection ─────────────────────────────────────────

/// One entry of an `OPTIONS {controller}/` response's `methods` list.
#[derive(Debug, Clone, Deserialize)]
pub struct HrefMethods {
    pub href: String,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodEntry {
    pub method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerMethods {
    #[serde(default)]
    pub methods: Vec<HrefMethods>,
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiSection {
    #[serde(deserialize_with = "lenient::required_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiSubnet {
    #[serde(deserialize_with = "lenient::required_id")]
    pub id: u64,
    /// Network address; empty for folders.
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub mask: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "vlanId", deserialize_with = "lenient::id")]
    pub vlan_id: Option<u64>,
    #[serde(default, rename = "vrfId", deserialize_with = "lenient::id")]
    pub vrf_id: Option<u64>,
    #[serde(default, rename = "sectionId", deserialize_with = "lenient::id")]
    pub section_id: Option<u64>,
    #[serde(default, rename = "isFolder", deserialize_with = "lenient::flag")]
    pub is_folder: bool,
    #[serde(default, rename = "isPool", deserialize_with = "lenient::flag")]
    pub is_pool: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiAddress {
    #[serde(deserialize_with = "lenient::required_id")]
    pub id: u64,
    pub ip: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "subnetId", deserialize_with = "lenient::id")]
    pub subnet_id: Option<u64>,
    /// Address state/tag (1 = offline, 2 = used, 3 = reserved, 4 = DHCP).
    #[serde(default, deserialize_with = "lenient::id")]
    pub tag: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiVlan {
    #[serde(alias = "vlanId", deserialize_with = "lenient::required_id")]
    pub id: u64,
    #[serde(deserialize_with = "lenient::required_id")]
    pub number: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "domainId", deserialize_with = "lenient::id")]
    pub domain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiVrf {
    #[serde(alias = "vrfId", deserialize_with = "lenient::required_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub rd: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for creating or updating a VLAN.
#[derive(Debug, Clone, Serialize)]
pub struct PiVlanBody {
    #[serde(rename = "vlanId", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub number: u16,
    pub name: Option<String>,
    pub description: Option<String>,
    /// L2 domain for a new VLAN. Left out of updates so a matched VLAN
    /// stays in its own domain.
    #[serde(rename = "domainId", skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<u64>,
}

// ── Lenient scalar decoding ──────────────────────────────────────────

pub(crate) mod lenient {
    use serde::de::Error as _;

    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(u64),
        Text(String),
        Bool(bool),
    }

    /// Optional id: number, numeric string, `""` or `null`.
    pub fn id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
        match Option::<Scalar>::deserialize(de)? {
            None => Ok(None),
            Some(Scalar::Int(n)) => Ok(Some(n)),
            Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected numeric id, got {s:?}"))),
            Some(Scalar::Bool(b)) => Err(D::Error::custom(format!("expected numeric id, got {b}"))),
        }
    }

    pub fn required_id<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
        id(de)?.ok_or_else(|| D::Error::custom("missing id"))
    }

    /// Boolean encoded as `true`, `1`, `"1"` or `"true"`.
    pub fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        Ok(match Option::<Scalar>::deserialize(de)? {
            None => false,
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Int(n)) => n != 0,
            Some(Scalar::Text(s)) => matches!(s.trim(), "1" | "true" | "True"),
        })
    }

    pub fn code<'de, D: Deserializer<'de>>(de: D) -> Result<u16, D::Error> {
        let raw = id(de)?.unwrap_or(0);
        u16::try_from(raw).map_err(|_| D::Error::custom(format!("status code out of range: {raw}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subnet_accepts_string_numbers() {
        let subnet: PiSubnet = serde_json::from_value(json!({
            "id": "12",
            "subnet": "10.1.0.0",
            "mask": "24",
            "description": "servers",
            "vlanId": "3",
            "vrfId": "0",
            "sectionId": "1",
            "isFolder": "0"
        }))
        .unwrap();
        assert_eq!(subnet.id, 12);
        assert_eq!(subnet.mask, Some(24));
        assert_eq!(subnet.vlan_id, Some(3));
        assert_eq!(subnet.vrf_id, Some(0));
        assert!(!subnet.is_folder);
    }

    #[test]
    fn subnet_null_references_stay_none() {
        let subnet: PiSubnet = serde_json::from_value(json!({
            "id": 4,
            "subnet": "10.2.0.0",
            "mask": 16,
            "vlanId": null
        }))
        .unwrap();
        assert_eq!(subnet.vlan_id, None);
        assert_eq!(subnet.vrf_id, None);
    }

    #[test]
    fn vlan_accepts_vlan_id_key() {
        let vlan: PiVlan = serde_json::from_value(json!({
            "vlanId": "5",
            "number": "100",
            "name": "servers",
            "domainId": "1"
        }))
        .unwrap();
        assert_eq!(vlan.id, 5);
        assert_eq!(vlan.number, 100);
    }

    #[test]
    fn failure_envelope_has_no_data() {
        let env: Envelope<Vec<PiSubnet>> = serde_json::from_value(json!({
            "code": 404,
            "success": false,
            "message": "No subnets found"
        }))
        .unwrap();
        assert!(!env.success);
        assert_eq!(env.code, 404);
        assert!(env.data.is_none());
    }

    #[test]
    fn envelope_decodes_payload_without_default() {
        fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Envelope<T> {
            serde_json::from_value(value).unwrap()
        }

        let env: Envelope<TokenGrant> = decode(json!({
            "code": 200,
            "success": true,
            "data": { "token": "abc", "expires": "2999-01-01 00:00:00" }
        }));
        assert_eq!(env.data.unwrap().token, "abc");

        let failed: Envelope<TokenGrant> = decode(json!({ "code": 500, "success": false }));
        assert!(failed.data.is_none());
    }
}
