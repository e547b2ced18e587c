// NetBox API client modules
//
// Token-authenticated REST client for NetBox's `ipam` application, with
// DRF-style pagination and validation-error rendering.

pub mod client;
pub mod models;

pub use client::{NetBoxClient, Resource};
