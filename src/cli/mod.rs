mod dispatch;
mod parse;

pub use crate::cli::dispatch::dispatch;
pub use crate::cli::dispatch::wait_for_fulfillment;
pub use crate::cli::parse::parse_from_safe;

use crate::compute::LaunchSpec;
use std::collections::BTreeMap;

#[derive(Debug, PartialEq)]
pub enum Command {
    Request {
        spec: LaunchSpec,
        wait: bool,
    },
    List {
        spot_request_ids: Vec<String>,
    },
    Cancel {
        spot_request_id: String,
    },
    Terminate {
        instance_id: String,
    },
    Tag {
        resource_id: String,
        tags: BTreeMap<String, String>,
    },
}
