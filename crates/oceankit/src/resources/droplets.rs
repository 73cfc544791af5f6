//! Droplet (compute instance) builder.
//!
//! Droplet creation is asynchronous server-side: the API accepts the
//! request with 202 and exposes a create action whose status moves from
//! `in-progress` to `completed`. The builder turns that into a
//! [`Poller`] the session controller sweeps, after trying one
//! synchronous poll so fast creations resolve without entering the
//! pending set.

use std::rc::Rc;

use reconcile::{Categorized, Created, CreationSpec, Poller, ResourceBuilder, categorize_by_key};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::api::CloudApi;
use crate::error::Error;
use crate::resources::spec_id;

const ENDPOINT: &str = "droplets";

/// Default ceiling on poll attempts before a creation is abandoned.
const DEFAULT_MAX_POLLS: u32 = 60;

/// Builder for droplets, scoped to an optional tag.
///
/// Categorization is keyed on `name`: a declared droplet reuses any
/// existing droplet with the same name regardless of other attributes.
pub struct DropletBuilder {
    api: Rc<dyn CloudApi>,
    tag_name: Option<String>,
    max_polls: u32,
}

impl DropletBuilder {
    /// Create a builder over all droplets on the account.
    #[must_use]
    pub fn new(api: Rc<dyn CloudApi>) -> Self {
        Self {
            api,
            tag_name: None,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Scope listing (and therefore deletion) to droplets carrying a tag.
    #[must_use]
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    /// Set the ceiling on poll attempts per creation.
    #[must_use]
    pub const fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Build the completion check for a pending creation.
    fn creation_poller(&self, droplet_id: u64, action_id: u64) -> Poller {
        let api = self.api.clone();
        let max_polls = self.max_polls;
        let mut attempts: u32 = 0;

        Poller::new(move || {
            attempts += 1;
            let action_endpoint = format!("{ENDPOINT}/{droplet_id}/actions/{action_id}");
            let response = api.get(&action_endpoint, &[])?;
            if response.code != 200 {
                return Err(
                    Error::unexpected_status("GET", &action_endpoint, 200, response.code).into(),
                );
            }
            match response.data["action"]["status"].as_str() {
                Some("completed") => {
                    let droplet_endpoint = format!("{ENDPOINT}/{droplet_id}");
                    let response = api.get(&droplet_endpoint, &[])?;
                    if response.code != 200 {
                        return Err(Error::unexpected_status(
                            "GET",
                            &droplet_endpoint,
                            200,
                            response.code,
                        )
                        .into());
                    }
                    Ok(Some(response.data["droplet"].clone()))
                }
                Some("errored") => {
                    anyhow::bail!("droplet {droplet_id} create action {action_id} errored")
                }
                _ if attempts >= max_polls => {
                    anyhow::bail!(
                        "droplet {droplet_id} still not ready after {attempts} polls, giving up"
                    )
                }
                _ => Ok(None),
            }
        })
    }
}

impl ResourceBuilder for DropletBuilder {
    fn kind(&self) -> &str {
        "droplet"
    }

    fn existing_resources(&self) -> anyhow::Result<Vec<Json>> {
        let mut params = Vec::new();
        if let Some(tag_name) = &self.tag_name {
            params.push(("tag_name", tag_name.as_str()));
        }
        let response = self.api.get(ENDPOINT, &params)?;
        if response.code != 200 {
            return Err(Error::unexpected_status("GET", ENDPOINT, 200, response.code).into());
        }
        let droplets: Vec<Json> = serde_json::from_value(response.data["droplets"].clone())
            .map_err(|_| Error::missing_field(ENDPOINT, "droplets"))?;
        Ok(droplets)
    }

    fn categorize(&self, required: &CreationSpec, existing: Vec<Json>) -> Categorized {
        categorize_by_key(required, existing, "name")
    }

    fn create_resource(&self, spec: Json) -> anyhow::Result<Created> {
        let response = self.api.post(ENDPOINT, &spec)?;
        if response.code != 202 {
            return Err(Error::unexpected_status("POST", ENDPOINT, 202, response.code).into());
        }
        let accepted: AcceptedCreation = serde_json::from_value(response.data)?;
        let action_id = accepted.create_action_id()?;
        log::debug!(
            "droplet {} accepted, create action {action_id}",
            accepted.droplet.id
        );

        let mut poller = self.creation_poller(accepted.droplet.id, action_id);
        match poller.poll()? {
            Some(droplet) => Ok(Created::Ready(droplet)),
            None => Ok(Created::Pending(poller)),
        }
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

// =============================================================================
// API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AcceptedCreation {
    droplet: AcceptedDroplet,
    links: CreationLinks,
}

#[derive(Debug, Deserialize)]
struct AcceptedDroplet {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CreationLinks {
    #[serde(default)]
    actions: Vec<ActionLink>,
}

#[derive(Debug, Deserialize)]
struct ActionLink {
    id: u64,
    rel: String,
}

impl AcceptedCreation {
    /// Find the create action to poll among the response links.
    fn create_action_id(&self) -> Result<u64, Error> {
        self.links
            .actions
            .iter()
            .find(|link| link.rel == "create")
            .map(|link| link.id)
            .ok_or_else(|| Error::missing_field(ENDPOINT, "links.actions[rel=create]"))
    }
}
