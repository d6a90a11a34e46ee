//! Spot instance support for the EC2 driver.
//!
//! Spot requests are launched with `RequestSpotInstances` instead of
//! `RunInstances` and come back as `spotInstanceRequestSet` items. Everything
//! else, transport and instance management included, is the on-demand driver.
//!
//! See http://docs.aws.amazon.com/AWSEC2/latest/APIReference/API_RequestSpotInstances.html

use crate::compute::ec2::document::Element;
use crate::compute::ec2::params::filter_params;
use crate::compute::ec2::params::launch_params;
use crate::compute::ec2::params::path_list;
use crate::compute::ec2::params::with_prefix;
use crate::compute::ec2::Ec2NodeDriver;
use crate::compute::LaunchRequest;
use crate::compute::LaunchSpec;
use crate::compute::Node;
use crate::compute::NodeDriver;
use crate::compute::Params;
use crate::compute::SpotNodeDriver;
use crate::compute::SpotRequest;
use crate::compute::SpotRequestState;
use crate::compute::Transport;
use crate::errors::invalid_parameter;
use chrono::SecondsFormat;
use failure::Error;
use std::collections::BTreeMap;
use std::fmt;

pub const REQUEST_SPOT_INSTANCES: &str = "RequestSpotInstances";
pub const DESCRIBE_SPOT_INSTANCE_REQUESTS: &str = "DescribeSpotInstanceRequests";
pub const CANCEL_SPOT_INSTANCE_REQUESTS: &str = "CancelSpotInstanceRequests";

const SPOT_REQUEST_SET: &str = "spotInstanceRequestSet";
const SPOT_REQUEST_ITEMS: &str = "spotInstanceRequestSet/item";

/// Bid-priced launches through `RequestSpotInstances`.
#[derive(Debug, Clone)]
pub struct SpotLaunch {
    region: String,
}

impl SpotLaunch {
    pub fn new<S: Into<String>>(region: S) -> SpotLaunch {
        SpotLaunch {
            region: region.into(),
        }
    }
}

impl LaunchRequest for SpotLaunch {
    fn action(&self) -> &'static str {
        REQUEST_SPOT_INSTANCES
    }

    fn build_launch_request(&self, spec: &LaunchSpec) -> Result<Params, Error> {
        let spot_price = spec
            .spot_price
            .as_ref()
            .ok_or_else(|| invalid_parameter("spot price is required"))?;

        let mut params = with_prefix("LaunchSpecification", launch_params(spec, &self.region)?);
        params.insert("Action".to_owned(), REQUEST_SPOT_INSTANCES.to_owned());
        params.insert("SpotPrice".to_owned(), spot_price.to_string());
        params.insert("InstanceCount".to_owned(), spec.count.to_string());

        if let Some(request_type) = spec.request_type {
            params.insert("Type".to_owned(), request_type.as_str().to_owned());
        }
        if let Some(valid_from) = spec.valid_from {
            params.insert(
                "ValidFrom".to_owned(),
                valid_from.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        if let Some(valid_until) = spec.valid_until {
            params.insert(
                "ValidUntil".to_owned(),
                valid_until.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }

        Ok(params)
    }

    fn parse_launch_response(&self, body: &str) -> Result<Vec<Node>, Error> {
        let spots = parse_spot_requests(body)?;
        Ok(spots.into_iter().map(SpotRequest::into_node).collect())
    }
}

/// Parses every spot request in a response, in provider order.
pub fn parse_spot_requests(body: &str) -> Result<Vec<SpotRequest>, Error> {
    let root = Element::parse_response(body)?;
    root.require(SPOT_REQUEST_SET)?
        .find_all("item")
        .into_iter()
        .map(to_spot_request)
        .collect()
}

fn to_spot_request(element: &Element) -> Result<SpotRequest, Error> {
    let id = element.require_text("spotInstanceRequestId")?;
    let spot_price = element.require_text("spotPrice")?;
    let state = element.require_text("state")?.parse::<SpotRequestState>()?;
    let launch_specification = element.require("launchSpecification")?;

    let mut extra = BTreeMap::new();
    let fields = &[
        ("image_id", "imageId"),
        ("instance_type", "instanceType"),
        ("key_name", "keyName"),
        ("availability_zone", "placement/availabilityZone"),
        ("subnet_id", "subnetId"),
        ("ebs_optimized", "ebsOptimized"),
    ];
    for &(key, path) in fields {
        if let Some(value) = launch_specification.find_text(path) {
            extra.insert(key.to_owned(), value.to_owned());
        }
    }

    let groups: Vec<&str> = launch_specification
        .find_all("groupSet/item")
        .into_iter()
        .filter_map(|group| group.find_text("groupName").or_else(|| group.find_text("groupId")))
        .collect();
    if !groups.is_empty() {
        extra.insert("groups".to_owned(), groups.join(","));
    }

    let devices: Vec<&str> = launch_specification
        .find_all("blockDeviceMapping/item")
        .into_iter()
        .filter_map(|mapping| mapping.find_text("deviceName"))
        .collect();
    if !devices.is_empty() {
        extra.insert("block_device_mapping".to_owned(), devices.join(","));
    }

    for &(key, path) in &[("type", "type"), ("create_time", "createTime")] {
        if let Some(value) = element.find_text(path) {
            extra.insert(key.to_owned(), value.to_owned());
        }
    }

    Ok(SpotRequest {
        id: id.to_owned(),
        instance_id: element.find_text("instanceId").map(str::to_owned),
        spot_price: spot_price.to_owned(),
        state,
        status: element.find_text("status/code").map(str::to_owned),
        message: element.find_text("status/message").map(str::to_owned),
        availability_zone_group: element
            .find_text("availabilityZoneGroup")
            .map(str::to_owned),
        extra,
    })
}

/// The EC2 driver with spot requests in place of on-demand launches.
pub struct Ec2SpotNodeDriver<T: Transport> {
    base: Ec2NodeDriver<T>,
    launch: SpotLaunch,
}

impl<T: Transport> Ec2SpotNodeDriver<T> {
    pub fn new(transport: T) -> Ec2SpotNodeDriver<T> {
        let launch = SpotLaunch::new(transport.region());
        Ec2SpotNodeDriver {
            base: Ec2NodeDriver::new(transport),
            launch,
        }
    }
}

impl<T: Transport> fmt::Debug for Ec2SpotNodeDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (spot)", self.base.name())
    }
}

impl<T: Transport> NodeDriver for Ec2SpotNodeDriver<T> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn region(&self) -> &str {
        self.base.region()
    }

    fn create_node(&self, spec: &LaunchSpec) -> Result<Vec<Node>, Error> {
        self.base.launch(&self.launch, spec)
    }

    fn list_nodes(&self, node_ids: &[String]) -> Result<Vec<Node>, Error> {
        self.base.list_nodes(node_ids)
    }

    fn destroy_node(&self, node_id: &str) -> Result<bool, Error> {
        self.base.destroy_node(node_id)
    }

    fn create_tags(
        &self,
        resource_id: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<bool, Error> {
        self.base.create_tags(resource_id, tags)
    }

    fn as_spot(&self) -> Option<&dyn SpotNodeDriver> {
        Some(self)
    }
}

impl<T: Transport> SpotNodeDriver for Ec2SpotNodeDriver<T> {
    fn list_spot_requests(
        &self,
        spot_request_ids: &[String],
        filters: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<SpotRequest>, Error> {
        let mut params = Params::new();
        params.insert(
            "Action".to_owned(),
            DESCRIBE_SPOT_INSTANCE_REQUESTS.to_owned(),
        );
        params.extend(path_list("SpotInstanceRequestId", spot_request_ids));
        params.extend(filter_params(filters));
        let body = self.base.transport().request(&params)?;
        parse_spot_requests(&body)
    }

    fn cancel_spot_instance_request(&self, spot_request_id: &str) -> Result<bool, Error> {
        let mut params = Params::new();
        params.insert("Action".to_owned(), CANCEL_SPOT_INSTANCE_REQUESTS.to_owned());
        params.extend(path_list("SpotInstanceRequestId", &[spot_request_id]));
        let root = self.base.call(&params)?;
        let state = root
            .require(SPOT_REQUEST_ITEMS)?
            .require_text("state")?
            .parse::<SpotRequestState>()?;
        info!("Spot request {} is {}", spot_request_id, state);
        Ok(state == SpotRequestState::Cancelled)
    }
}
