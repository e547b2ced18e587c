// phpIPAM API client modules
//
// Hand-written client for phpIPAM's REST API. Covers token login and the
// section, subnet, address, VLAN and VRF controllers, all wrapped in the
// `{ code, success, message, data }` envelope.

pub mod auth;
pub mod client;
pub mod models;
pub mod sections;
pub mod vlans;
pub mod vrfs;

pub use client::PhpIpamClient;
