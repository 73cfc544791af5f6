//! SSH key (account credential) builder.

use std::rc::Rc;

use reconcile::{Categorized, Created, CreationSpec, ResourceBuilder, categorize_by_key};
use serde_json::Value as Json;

use crate::api::CloudApi;
use crate::error::Error;
use crate::resources::spec_id;

const ENDPOINT: &str = "account/keys";

/// Builder for account SSH keys.
///
/// Keys are matched by `name`, so redeclaring a key with the same name
/// but different material reuses the existing key rather than rotating
/// it.
pub struct SshKeyBuilder {
    api: Rc<dyn CloudApi>,
}

impl SshKeyBuilder {
    #[must_use]
    pub fn new(api: Rc<dyn CloudApi>) -> Self {
        Self { api }
    }
}

impl ResourceBuilder for SshKeyBuilder {
    fn kind(&self) -> &str {
        "ssh_key"
    }

    fn existing_resources(&self) -> anyhow::Result<Vec<Json>> {
        let response = self.api.get(ENDPOINT, &[])?;
        if response.code != 200 {
            return Err(Error::unexpected_status("GET", ENDPOINT, 200, response.code).into());
        }
        let keys: Vec<Json> = serde_json::from_value(response.data["ssh_keys"].clone())
            .map_err(|_| Error::missing_field(ENDPOINT, "ssh_keys"))?;
        Ok(keys)
    }

    fn categorize(&self, required: &CreationSpec, existing: Vec<Json>) -> Categorized {
        categorize_by_key(required, existing, "name")
    }

    fn create_resource(&self, spec: Json) -> anyhow::Result<Created> {
        let response = self.api.post(ENDPOINT, &spec)?;
        if response.code != 201 {
            return Err(Error::unexpected_status("POST", ENDPOINT, 201, response.code).into());
        }
        let key = response.data["ssh_key"].clone();
        if key.is_null() {
            return Err(Error::missing_field(ENDPOINT, "ssh_key").into());
        }
        Ok(Created::Ready(key))
    }

    fn delete_resources(&self, specs: Vec<Json>) -> anyhow::Result<()> {
        for spec in specs {
            let endpoint = format!("{ENDPOINT}/{}", spec_id(ENDPOINT, &spec)?);
            let response = self.api.delete(&endpoint)?;
            if response.code != 204 {
                return Err(
                    Error::unexpected_status("DELETE", &endpoint, 204, response.code).into(),
                );
            }
        }
        Ok(())
    }
}
