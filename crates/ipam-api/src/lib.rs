// ipam-api: Async Rust clients for the NetBox and phpIPAM REST APIs

pub mod error;
pub mod netbox;
pub mod phpipam;
pub mod transport;

pub use error::Error;
pub use netbox::NetBoxClient;
pub use phpipam::PhpIpamClient;
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
