//! VPC (private network) builder.
//!
//! VPC creation completes synchronously with 201. Every region has a
//! default VPC that cannot be destroyed; the builder leaves entries
//! flagged `"default": true` alone when deleting leftovers.

use std::rc::Rc;

use reconcile::{Created, ResourceBuilder};
use serde_json::Value as Json;

use crate::api::CloudApi;
use crate::error::Error;
use crate::resources::spec_id;

const ENDPOINT: &str = "vpcs";

/// Builder for VPCs.
///
/// Uses the default structural categorization: a declared VPC matches
/// an existing one whose spec is a superset of the declaration.
pub struct VpcBuilder {
    api: Rc<dyn CloudApi>,
}

impl VpcBuilder {
    #[must_use]
    pub fn new(api: Rc<dyn CloudApi>) -> Self {
        Self { api }
    }
}

impl ResourceBuilder for VpcBuilder {
    fn kind(&self) -> &str {
        "vpc"
    }

    fn existing_resources(&self) -> anyhow::Result<Vec<Json>> {
        let response = self.api.get(ENDPOINT, &[])?;
        if response.code != 200 {
            return Err(Error::unexpected_status("GET", ENDPOINT, 200, response.code).into());
        }
        let vpcs: Vec<Json> = serde_json::from_value(response.data["vpcs"].clone())
            .map_err(|_| Error::missing_field(ENDPOINT, "vpcs"))?;
        Ok(vpcs)
    }

    fn create_resource(&self, spec: Json) -> anyhow::Result<Created> {
        let response = self.api.post(ENDPOINT, &spec)?;
        if response.code != 201 {
            return Err(Error::unexpected_status("POST", ENDPOINT, 201, response.code).into());
        }
        let vpc = response.data["vpc"].clone();
        if vpc.is_null() {
            return Err(Error::missing_field(ENDPOINT, "vpc").into());
        }
        Ok(Created::Ready(vpc))
    }

    fn delete_resources(&self, specs: Vec<Json>) -> anyhow::Result<()> {
        for spec in specs {
            // The per-region default VPC is not deletable.
            if spec["default"] == Json::Bool(true) {
                log::debug!("leaving default vpc {} alone", spec["id"]);
                continue;
            }
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
