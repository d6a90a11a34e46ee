use crate::compute::ec2::document::Element;
use crate::compute::ec2::on_demand::to_nodes;
use crate::compute::ec2::on_demand::OnDemandLaunch;
use crate::compute::ec2::params::path_list;
use crate::compute::ec2::tags::tag_params;
use crate::compute::LaunchRequest;
use crate::compute::LaunchSpec;
use crate::compute::Node;
use crate::compute::NodeDriver;
use crate::compute::Params;
use crate::compute::Transport;
use failure::Error;
use std::collections::BTreeMap;
use std::fmt;

pub mod document;
pub mod on_demand;
pub mod params;
pub mod spot;
pub mod tags;
pub mod transport;

pub use crate::compute::ec2::spot::Ec2SpotNodeDriver;
pub use crate::compute::ec2::transport::AwsTransport;

/// Regions with a known public endpoint.
pub const REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "sa-east-1",
];

pub fn driver_name(region: &str) -> String {
    format!("Amazon EC2 ({})", region)
}

/// On-demand EC2 driver. The spot driver wraps it and swaps the launch.
pub struct Ec2NodeDriver<T: Transport> {
    name: String,
    transport: T,
    on_demand: OnDemandLaunch,
}

impl<T: Transport> Ec2NodeDriver<T> {
    pub fn new(transport: T) -> Ec2NodeDriver<T> {
        let region = transport.region().to_owned();
        Ec2NodeDriver {
            name: driver_name(&region),
            on_demand: OnDemandLaunch::new(region),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds, sends and parses one launch. Nothing is sent if the request
    /// cannot be built.
    pub fn launch<L: LaunchRequest>(&self, launch: &L, spec: &LaunchSpec) -> Result<Vec<Node>, Error> {
        let params = launch.build_launch_request(spec)?;
        debug!("{} params: {:?}", launch.action(), params);
        let body = self.transport.request(&params)?;
        let nodes = launch.parse_launch_response(&body)?;
        info!("{} returned {} node(s)", launch.action(), nodes.len());
        Ok(nodes)
    }

    pub(crate) fn call(&self, params: &Params) -> Result<Element, Error> {
        debug!("params: {:?}", params);
        let body = self.transport.request(params)?;
        Element::parse_response(&body)
    }

    fn params_for(action: &str) -> Params {
        let mut params = Params::new();
        params.insert("Action".to_owned(), action.to_owned());
        params
    }
}

impl<T: Transport> fmt::Debug for Ec2NodeDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<T: Transport> NodeDriver for Ec2NodeDriver<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        self.transport.region()
    }

    fn create_node(&self, spec: &LaunchSpec) -> Result<Vec<Node>, Error> {
        self.launch(&self.on_demand, spec)
    }

    fn list_nodes(&self, node_ids: &[String]) -> Result<Vec<Node>, Error> {
        let mut params = Self::params_for("DescribeInstances");
        params.extend(path_list("InstanceId", node_ids));
        let root = self.call(&params)?;
        to_nodes(&root, "reservationSet/item/instancesSet/item")
    }

    fn destroy_node(&self, node_id: &str) -> Result<bool, Error> {
        let mut params = Self::params_for("TerminateInstances");
        params.extend(path_list("InstanceId", &[node_id]));
        let root = self.call(&params)?;
        let terminated = root
            .find_all("instancesSet/item")
            .into_iter()
            .any(|item| item.find_text("instanceId") == Some(node_id));
        Ok(terminated)
    }

    fn create_tags(
        &self,
        resource_id: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<bool, Error> {
        let mut params = Self::params_for("CreateTags");
        params.extend(path_list("ResourceId", &[resource_id]));
        params.extend(tag_params(tags));
        let root = self.call(&params)?;
        Ok(root.require_text("return")? == "true")
    }
}
