//! Resource builders for DigitalOcean resource kinds.
//!
//! Each builder implements [`reconcile::ResourceBuilder`] for one kind:
//! droplets (compute instances), VPCs (private networks), and SSH keys
//! (account credentials). Builders share one [`CloudApi`](crate::api::CloudApi)
//! handle and translate between reconcile specs and API payloads.

pub mod droplets;
pub mod ssh_keys;
pub mod vpcs;

pub use droplets::DropletBuilder;
pub use ssh_keys::SshKeyBuilder;
pub use vpcs::VpcBuilder;

use serde_json::Value as Json;

use crate::error::{Error, Result};

/// Extract a resource id from a spec, for use in endpoint paths.
///
/// Droplet ids are numbers; VPC ids are UUID strings. Both render the
/// same way in a URL.
fn spec_id(endpoint: &str, spec: &Json) -> Result<String> {
    match &spec["id"] {
        Json::String(id) => Ok(id.clone()),
        Json::Number(id) => Ok(id.to_string()),
        _ => Err(Error::missing_field(endpoint, "id")),
    }
}
