//! # Oceankit
//!
//! DigitalOcean resource provisioning on top of the `reconcile` engine.
//!
//! The crate has two layers:
//!
//! - [`api`]: a blocking transport to the DigitalOcean v2 REST API
//!   behind the [`CloudApi`](api::CloudApi) trait, with [`HttpApi`]
//!   as the production implementation
//! - [`resources`]: [`reconcile::ResourceBuilder`] implementations for
//!   droplets, VPCs, and SSH keys
//!
//! ## Example
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use oceankit::api::{CloudApi, HttpApi};
//! use oceankit::resources::{DropletBuilder, VpcBuilder};
//! use reconcile::{Session, spec};
//!
//! let api: Rc<dyn CloudApi> = Rc::new(HttpApi::new(std::env::var("DO_TOKEN").unwrap()));
//!
//! let droplet = Session::run(|session| {
//!     let vpcs = session.register(VpcBuilder::new(api.clone()));
//!     let droplets =
//!         session.register(DropletBuilder::new(api.clone()).with_tag_name("managed"));
//!
//!     let vpc = session.declare(vpcs, spec! {
//!         "name": "edge",
//!         "region": "nyc3",
//!     });
//!     Ok(session.declare(droplets, spec! {
//!         "name": "web-1",
//!         "region": "nyc3",
//!         "size": "s-1vcpu-1gb",
//!         "image": "ubuntu-24-04-x64",
//!         "vpc_uuid": vpc.get("id"),
//!         "tags": serde_json::json!(["managed"]),
//!     }))
//! })
//! .unwrap();
//!
//! println!("droplet up: {:?}", droplet.resolved_spec());
//! ```
//!
//! Closing the session creates the VPC and the droplet if they do not
//! already exist, reuses them if they do, and deletes any other tagged
//! droplets left over from previous runs.

pub mod api;
pub mod error;
pub mod resources;

// Re-export main types at crate root
pub use api::{ApiResponse, CloudApi, HttpApi};
pub use error::{Error, Result};
pub use resources::{DropletBuilder, SshKeyBuilder, VpcBuilder};
