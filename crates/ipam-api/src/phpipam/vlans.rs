// phpIPAM VLAN endpoints
//
// The only phpIPAM object type the migrator writes. Searches go through
// `vlan/search/{number}/`, which matches on the VLAN number.

use tracing::debug;

use super::client::PhpIpamClient;
use super::models::{PiVlan, PiVlanBody};
use crate::error::Error;

impl PhpIpamClient {
    /// Whether `GET vlan/` is available on this server.
    ///
    /// Releases before 1.3 only expose per-id lookups, so the collection
    /// read has to be skipped there.
    pub async fn can_list_vlans(&self) -> Result<bool, Error> {
        let hrefs = self.controller_methods("vlan").await?;
        Ok(hrefs.iter().any(|h| {
            h.href.trim_end_matches('/').ends_with("/vlan")
                && h.methods.iter().any(|m| m.method.eq_ignore_ascii_case("GET"))
        }))
    }

    /// `GET vlan/`
    pub async fn list_vlans(&self) -> Result<Vec<PiVlan>, Error> {
        debug!("listing vlans");
        self.get_list(&["vlan"]).await
    }

    /// `GET vlan/{id}/`
    pub async fn get_vlan(&self, id: u64) -> Result<PiVlan, Error> {
        let id = id.to_string();
        self.get(&["vlan", &id]).await
    }

    /// `GET vlan/{id}/`, or `None` for "Vlan not found".
    pub async fn find_vlan(&self, id: u64) -> Result<Option<PiVlan>, Error> {
        match self.get_vlan(id).await {
            Ok(vlan) => Ok(Some(vlan)),
            Err(e) if e.is_empty_result() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET vlan/search/{number}/`, empty when nothing matches.
    pub async fn search_vlans(&self, number: u16) -> Result<Vec<PiVlan>, Error> {
        let number = number.to_string();
        self.get_list(&["vlan", "search", &number]).await
    }

    /// `POST vlan/`, then read the created VLAN back.
    pub async fn create_vlan(&self, body: &PiVlanBody) -> Result<PiVlan, Error> {
        let id = self.create(&["vlan"], body).await?;
        debug!(id, "vlan created");
        self.get_vlan(id).await
    }

    /// `PATCH vlan/{id}/`, then read the VLAN back.
    ///
    /// Older servers only honour the id when it is also in the body. The
    /// domain is never sent: `vlan/search/` matches across domains.
    pub async fn update_vlan(&self, id: u64, body: &PiVlanBody) -> Result<PiVlan, Error> {
        let body = PiVlanBody {
            id: Some(id),
            domain_id: None,
            ..body.clone()
        };
        let segment = id.to_string();
        self.patch(&["vlan", &segment], &body).await?;
        self.get_vlan(id).await
    }
}
