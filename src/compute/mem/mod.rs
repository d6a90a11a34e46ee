mod responses;

pub use crate::compute::mem::responses::cancel_spot_instance_requests_response;
pub use crate::compute::mem::responses::create_tags_response;
pub use crate::compute::mem::responses::describe_instances_response;
pub use crate::compute::mem::responses::describe_spot_instance_requests_response;
pub use crate::compute::mem::responses::error_response;
pub use crate::compute::mem::responses::instance_item;
pub use crate::compute::mem::responses::request_spot_instances_response;
pub use crate::compute::mem::responses::run_instances_response;
pub use crate::compute::mem::responses::spot_request_item;
pub use crate::compute::mem::responses::terminate_instances_response;

use crate::compute::Params;
use crate::compute::Transport;
use failure::Error;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Records every request and answers with queued bodies, oldest first.
#[derive(Clone)]
pub struct MemTransport {
    region: String,
    state: Rc<RefCell<MemTransportState>>,
}

struct MemTransportState {
    requests: Vec<Params>,
    responses: VecDeque<String>,
}

impl MemTransport {
    pub fn new(region: &str) -> MemTransport {
        MemTransport {
            region: region.to_owned(),
            state: Rc::new(RefCell::new(MemTransportState {
                requests: Vec::new(),
                responses: VecDeque::new(),
            })),
        }
    }

    pub fn respond_with(&self, body: &str) {
        let mut state = self.state.borrow_mut();
        state.responses.push_back(body.to_owned());
    }

    pub fn requests(&self) -> Vec<Params> {
        let state = self.state.borrow();
        state.requests.clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|mut params| params.remove("Action"))
            .collect()
    }
}

impl fmt::Debug for MemTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "mem ({})", self.region)
    }
}

impl Transport for MemTransport {
    fn region(&self) -> &str {
        &self.region
    }

    fn request(&self, params: &Params) -> Result<String, Error> {
        let mut state = self.state.borrow_mut();
        state.requests.push(params.clone());
        state
            .responses
            .pop_front()
            .ok_or_else(|| format_err!("no response queued for: {:?}", params.get("Action")))
    }
}
