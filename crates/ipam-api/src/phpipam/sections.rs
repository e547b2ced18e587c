// phpIPAM section, subnet and address endpoints
//
// Subnets are listed per section and addresses per subnet; there is no
// flat collection endpoint for either.

use tracing::debug;

use super::client::PhpIpamClient;
use super::models::{PiAddress, PiSection, PiSubnet};
use crate::error::Error;

impl PhpIpamClient {
    /// `GET sections/`
    pub async fn list_sections(&self) -> Result<Vec<PiSection>, Error> {
        debug!("listing sections");
        self.get_list(&["sections"]).await
    }

    /// `GET sections/{id}/subnets/`, empty when the section has none.
    pub async fn section_subnets(&self, section_id: u64) -> Result<Vec<PiSubnet>, Error> {
        let id = section_id.to_string();
        self.get_list(&["sections", &id, "subnets"]).await
    }

    /// `GET subnets/{id}/addresses/`, empty when the subnet has none.
    pub async fn subnet_addresses(&self, subnet_id: u64) -> Result<Vec<PiAddress>, Error> {
        let id = subnet_id.to_string();
        self.get_list(&["subnets", &id, "addresses"]).await
    }
}
