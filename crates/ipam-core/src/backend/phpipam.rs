// ── phpIPAM adapter ──
//
// Subnets and addresses have no flat collection endpoint, so reading walks
// sections → subnets → addresses. phpIPAM has no roles, VLAN groups or
// aggregates; those maps stay empty. Only VLANs can be written.

use tracing::{debug, info, warn};

use ipam_api::PhpIpamClient;
use ipam_api::phpipam::models::{PiVlan, PiVlanBody};

use super::{Backend, Destination};
use crate::convert::phpipam_address;
use crate::error::CoreError;
use crate::migrate::NaturalKey;
use crate::model::{Entity, EntityKind, ObjectId, Prefix, Vid, Vlan, Vrf};
use crate::snapshot::{ReadOptions, Snapshot, SnapshotBuilder};

pub struct PhpIpamBackend {
    name: String,
    client: PhpIpamClient,
}

impl PhpIpamBackend {
    pub fn new(name: impl Into<String>, client: PhpIpamClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    fn read_error(&self, what: &str) -> impl Fn(ipam_api::Error) -> CoreError + '_ {
        let what = what.to_owned();
        move |e| CoreError::from(e).while_reading(&self.name, &what)
    }

    fn unsupported(&self, kind: EntityKind) -> CoreError {
        CoreError::UnsupportedEntity {
            backend: self.name.clone(),
            kind,
        }
    }

    /// Every subnet with network data, across all sections.
    async fn read_prefixes(&self) -> Result<Vec<Prefix>, CoreError> {
        info!("Searching for sections...");
        let sections = self
            .client
            .list_sections()
            .await
            .map_err(self.read_error("sections"))?;
        info!("Found {} sections.", sections.len());

        let mut prefixes = Vec::new();
        for section in sections {
            let subnets = self
                .client
                .section_subnets(section.id)
                .await
                .map_err(self.read_error("subnets"))?;
            for subnet in subnets {
                match Prefix::try_from(subnet) {
                    Ok(prefix) => prefixes.push(prefix),
                    Err(e) => warn!("{e}, skipping"),
                }
            }
        }
        Ok(prefixes)
    }

    async fn read_addresses(
        &self,
        prefixes: &[Prefix],
        builder: &mut SnapshotBuilder,
    ) -> Result<(), CoreError> {
        for prefix in prefixes {
            let addresses = self
                .client
                .subnet_addresses(prefix.id.get())
                .await
                .map_err(self.read_error("IP addresses"))?;
            for address in addresses {
                match phpipam_address(address, Some(prefix.prefix.prefix_len()), prefix.vrf_id) {
                    Ok(ip) => {
                        builder.insert(ip);
                    }
                    Err(e) => warn!("{e}, skipping"),
                }
            }
        }
        Ok(())
    }

    async fn read_vlans(&self) -> Result<Vec<PiVlan>, CoreError> {
        let listable = match self.client.can_list_vlans().await {
            Ok(listable) => listable,
            Err(e) => {
                let e = CoreError::from(e);
                if e.aborts_run() {
                    return Err(e);
                }
                debug!("OPTIONS vlan/ failed ({e}), assuming no collection GET");
                false
            }
        };

        if listable {
            return self.client.list_vlans().await.map_err(self.read_error("VLANs"));
        }

        info!(
            "'vlan' controller root GET not supported by {}, probing each VLAN id \
             (consider upgrading to phpIPAM 1.3+)",
            self.name
        );
        let mut vlans = Vec::new();
        for id in u64::from(Vid::MIN)..=u64::from(Vid::MAX) {
            if let Some(vlan) = self
                .client
                .find_vlan(id)
                .await
                .map_err(self.read_error("VLANs"))?
            {
                vlans.push(vlan);
            }
        }
        Ok(vlans)
    }

    fn vlan_body(&self, payload: &Entity) -> Result<PiVlanBody, CoreError> {
        match payload {
            Entity::Vlan(vlan) => Ok(PiVlanBody::from(vlan)),
            other => Err(self.unsupported(other.kind())),
        }
    }
}

fn vlan_entity(vlan: PiVlan) -> Result<Entity, CoreError> {
    Vlan::try_from(vlan).map(Entity::Vlan)
}

impl Destination for PhpIpamBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, key: &NaturalKey) -> Result<Vec<Entity>, CoreError> {
        let NaturalKey::Vid(vid) = key else {
            return Err(self.unsupported(key.kind()));
        };
        debug!("searching {} for vlan {key}", self.name);
        let found = self.client.search_vlans(vid.get()).await?;
        Ok(found
            .into_iter()
            .filter_map(|v| vlan_entity(v).ok())
            .filter(|e| key.matches(e))
            .collect())
    }

    async fn create(&self, payload: &Entity) -> Result<Entity, CoreError> {
        let body = self.vlan_body(payload)?;
        vlan_entity(self.client.create_vlan(&body).await?)
    }

    async fn update(&self, id: ObjectId, payload: &Entity) -> Result<Entity, CoreError> {
        let body = self.vlan_body(payload)?;
        vlan_entity(self.client.update_vlan(id.get(), &body).await?)
    }
}

impl Backend for PhpIpamBackend {
    async fn read(&self, options: ReadOptions) -> Result<Snapshot, CoreError> {
        let mut effective = options;
        if effective.read_ip_addresses && !effective.read_prefixes {
            debug!("reading IP addresses requires reading prefixes, enabling them");
            effective.read_prefixes = true;
        }

        let mut builder = Snapshot::builder(self.name.clone(), effective);

        if effective.read_prefixes {
            let prefixes = self.read_prefixes().await?;
            if effective.read_ip_addresses {
                info!("Searching for IP addresses used in found prefixes...");
                self.read_addresses(&prefixes, &mut builder).await?;
            }
            builder.extend(prefixes);
        }

        if effective.read_vlans {
            info!("Searching for VLANs...");
            for vlan in self.read_vlans().await? {
                match Vlan::try_from(vlan) {
                    Ok(vlan) => {
                        builder.insert(vlan);
                    }
                    Err(e) => warn!("{e}, skipping"),
                }
            }
        }

        if effective.read_vrfs {
            info!("Searching for VRFs...");
            let vrfs = self
                .client
                .list_vrfs()
                .await
                .map_err(self.read_error("VRFs"))?;
            builder.extend(vrfs.into_iter().map(Vrf::from));
        }

        Ok(builder.build())
    }
}
