//! In-memory DigitalOcean fake shared by the provisioning tests.
//!
//! Implements [`CloudApi`] over plain collections so whole sessions run
//! without a network. Two magic droplet sizes drive the interesting
//! paths: [`GARGANTUAN`] creations stay in-progress for one extra poll,
//! and [`ILLEGAL_SIZE`] is rejected with 422 like a real validation
//! failure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use oceankit::api::{ApiResponse, CloudApi};
use oceankit::error::{Error, Result};
use serde_json::{Value as Json, json};

pub const ILLEGAL_SIZE: &str = "__THIS_IS_AN_ILLEGAL_SIZE__";
pub const GARGANTUAN: &str = "__TOO_BIG_TO_MAKE_QUICKLY__";

struct FakeDroplet {
    action_id: u64,
    /// Action polls left before the create action reports completed.
    pending: u32,
    spec: Json,
}

#[derive(Default)]
pub struct FakeCloud {
    next_id: Cell<u64>,
    droplets: RefCell<Vec<FakeDroplet>>,
    vpcs: RefCell<Vec<Json>>,
    ssh_keys: RefCell<Vec<Json>>,
    pub droplet_creates: Cell<usize>,
    pub key_creates: Cell<usize>,
    pub action_polls: Cell<usize>,
}

impl FakeCloud {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.set(self.next_id.get() + 1);
        1000 + self.next_id.get()
    }

    pub fn droplet_count(&self) -> usize {
        self.droplets.borrow().len()
    }

    pub fn vpc_count(&self) -> usize {
        self.vpcs.borrow().len()
    }

    pub fn key_count(&self) -> usize {
        self.ssh_keys.borrow().len()
    }

    pub fn droplet_names(&self) -> Vec<String> {
        self.droplets
            .borrow()
            .iter()
            .map(|droplet| droplet.spec["name"].as_str().unwrap().to_string())
            .collect()
    }

    /// Seed the per-region default VPC, which can never be destroyed.
    pub fn seed_default_vpc(&self, name: &str) {
        self.vpcs.borrow_mut().push(json!({
            "id": format!("vpc-{}", self.allocate_id()),
            "name": name,
            "default": true,
        }));
    }

    fn no_route(&self, method: &str, endpoint: &str) -> Error {
        Error::Transport {
            message: format!("fake cloud has no route for {method} {endpoint}"),
        }
    }

    fn create_droplet(&self, data: &Json) -> Result<ApiResponse> {
        if data["size"] == json!(ILLEGAL_SIZE) {
            return Err(Error::Rejected {
                method: "POST".to_string(),
                endpoint: "droplets".to_string(),
                code: 422,
                body: json!({"message": "size is not a valid size"}),
                payload: Some(data.clone()),
            });
        }
        let droplet_id = self.allocate_id();
        let action_id = self.allocate_id();
        let pending = u32::from(data["size"] == json!(GARGANTUAN));

        let mut spec = data.clone();
        spec["id"] = json!(droplet_id);
        self.droplets.borrow_mut().push(FakeDroplet {
            action_id,
            pending,
            spec,
        });
        self.droplet_creates.set(self.droplet_creates.get() + 1);

        Ok(ApiResponse {
            code: 202,
            data: json!({
                "droplet": {"id": droplet_id},
                "links": {"actions": [{"id": action_id, "rel": "create"}]},
            }),
        })
    }

    fn create_vpc(&self, data: &Json) -> Result<ApiResponse> {
        let name = &data["name"];
        if self.vpcs.borrow().iter().any(|vpc| vpc["name"] == *name) {
            return Err(Error::Rejected {
                method: "POST".to_string(),
                endpoint: "vpcs".to_string(),
                code: 422,
                body: json!({"message": "a VPC with that name already exists"}),
                payload: Some(data.clone()),
            });
        }
        let mut vpc = data.clone();
        vpc["id"] = json!(format!("vpc-{}", self.allocate_id()));
        self.vpcs.borrow_mut().push(vpc.clone());
        Ok(ApiResponse {
            code: 201,
            data: json!({"vpc": vpc}),
        })
    }

    fn create_ssh_key(&self, data: &Json) -> Result<ApiResponse> {
        let mut key = data.clone();
        key["id"] = json!(self.allocate_id());
        self.ssh_keys.borrow_mut().push(key.clone());
        self.key_creates.set(self.key_creates.get() + 1);
        Ok(ApiResponse {
            code: 201,
            data: json!({"ssh_key": key}),
        })
    }

    fn poll_action(&self, droplet_id: &str, action_id: &str) -> Result<ApiResponse> {
        self.action_polls.set(self.action_polls.get() + 1);
        let mut droplets = self.droplets.borrow_mut();
        let droplet = droplets
            .iter_mut()
            .find(|droplet| droplet.spec["id"].to_string() == droplet_id)
            .ok_or_else(|| Error::Transport {
                message: format!("no droplet {droplet_id}"),
            })?;
        assert_eq!(droplet.action_id.to_string(), action_id);

        let status = if droplet.pending > 0 {
            droplet.pending -= 1;
            "in-progress"
        } else {
            "completed"
        };
        Ok(ApiResponse {
            code: 200,
            data: json!({"action": {"status": status}}),
        })
    }

    fn get_droplet(&self, droplet_id: &str) -> Result<ApiResponse> {
        let droplets = self.droplets.borrow();
        let droplet = droplets
            .iter()
            .find(|droplet| droplet.spec["id"].to_string() == droplet_id)
            .ok_or_else(|| Error::Transport {
                message: format!("no droplet {droplet_id}"),
            })?;
        Ok(ApiResponse {
            code: 200,
            data: json!({"droplet": droplet.spec}),
        })
    }
}

impl CloudApi for FakeCloud {
    fn post(&self, endpoint: &str, data: &Json) -> Result<ApiResponse> {
        match endpoint {
            "droplets" => self.create_droplet(data),
            "vpcs" => self.create_vpc(data),
            "account/keys" => self.create_ssh_key(data),
            _ => Err(self.no_route("POST", endpoint)),
        }
    }

    fn get(&self, endpoint: &str, _params: &[(&str, &str)]) -> Result<ApiResponse> {
        let parts: Vec<&str> = endpoint.split('/').collect();
        match parts.as_slice() {
            ["droplets"] => Ok(ApiResponse {
                code: 200,
                data: json!({
                    "droplets": self
                        .droplets
                        .borrow()
                        .iter()
                        .map(|droplet| droplet.spec.clone())
                        .collect::<Vec<_>>(),
                }),
            }),
            ["droplets", droplet_id, "actions", action_id] => {
                self.poll_action(droplet_id, action_id)
            }
            ["droplets", droplet_id] => self.get_droplet(droplet_id),
            ["vpcs"] => Ok(ApiResponse {
                code: 200,
                data: json!({"vpcs": self.vpcs.borrow().clone()}),
            }),
            ["account", "keys"] => Ok(ApiResponse {
                code: 200,
                data: json!({"ssh_keys": self.ssh_keys.borrow().clone()}),
            }),
            _ => Err(self.no_route("GET", endpoint)),
        }
    }

    fn delete(&self, endpoint: &str) -> Result<ApiResponse> {
        let parts: Vec<&str> = endpoint.split('/').collect();
        let deleted = ApiResponse {
            code: 204,
            data: Json::Null,
        };
        match parts.as_slice() {
            ["droplets", droplet_id] => {
                self.droplets
                    .borrow_mut()
                    .retain(|droplet| droplet.spec["id"].to_string() != *droplet_id);
                Ok(deleted)
            }
            ["vpcs", vpc_id] => {
                self.vpcs
                    .borrow_mut()
                    .retain(|vpc| vpc["id"] != json!(vpc_id));
                Ok(deleted)
            }
            ["account", "keys", key_id] => {
                self.ssh_keys
                    .borrow_mut()
                    .retain(|key| key["id"].to_string() != *key_id);
                Ok(deleted)
            }
            _ => Err(self.no_route("DELETE", endpoint)),
        }
    }
}
