// phpIPAM VRF endpoints

use tracing::debug;

use super::client::PhpIpamClient;
use super::models::PiVrf;
use crate::error::Error;

impl PhpIpamClient {
    /// `GET vrf/`
    pub async fn list_vrfs(&self) -> Result<Vec<PiVrf>, Error> {
        debug!("listing vrfs");
        self.get_list(&["vrf"]).await
    }
}
