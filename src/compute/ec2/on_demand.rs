use crate::compute::ec2::document::Element;
use crate::compute::ec2::params::launch_params;
use crate::compute::ec2::tags::to_tags;
use crate::compute::ec2::tags::TagFinder;
use crate::compute::LaunchRequest;
use crate::compute::LaunchSpec;
use crate::compute::Node;
use crate::compute::NodeState;
use crate::compute::Params;
use failure::Error;
use std::collections::BTreeMap;

pub const RUN_INSTANCES: &str = "RunInstances";

/// Fixed-price launches through `RunInstances`.
#[derive(Debug, Clone)]
pub struct OnDemandLaunch {
    region: String,
}

impl OnDemandLaunch {
    pub fn new<S: Into<String>>(region: S) -> OnDemandLaunch {
        OnDemandLaunch {
            region: region.into(),
        }
    }
}

impl LaunchRequest for OnDemandLaunch {
    fn action(&self) -> &'static str {
        RUN_INSTANCES
    }

    fn build_launch_request(&self, spec: &LaunchSpec) -> Result<Params, Error> {
        let mut params = launch_params(spec, &self.region)?;
        params.insert("Action".to_owned(), RUN_INSTANCES.to_owned());
        params.insert("MinCount".to_owned(), spec.count.to_string());
        params.insert("MaxCount".to_owned(), spec.count.to_string());
        if spec.spot_price.is_some() {
            debug!("ignoring spot price for an on-demand launch");
        }
        Ok(params)
    }

    fn parse_launch_response(&self, body: &str) -> Result<Vec<Node>, Error> {
        let root = Element::parse_response(body)?;
        root.require("instancesSet")?;
        to_nodes(&root, "instancesSet/item")
    }
}

pub(super) fn to_nodes(root: &Element, path: &str) -> Result<Vec<Node>, Error> {
    root.find_all(path).into_iter().map(to_node).collect()
}

fn to_node(element: &Element) -> Result<Node, Error> {
    let id = element.require_text("instanceId")?;
    let state = NodeState::from_instance_state(element.require_text("instanceState/name")?);
    let tags = to_tags(element);

    let mut extra = tags
        .iter()
        .map(|(k, v)| (format!("tag:{}", k), v.clone()))
        .collect::<BTreeMap<_, _>>();
    let fields = &[
        ("image_id", "imageId"),
        ("instance_type", "instanceType"),
        ("key_name", "keyName"),
        ("availability_zone", "placement/availabilityZone"),
        ("public_ip", "ipAddress"),
        ("private_ip", "privateIpAddress"),
        ("dns_name", "dnsName"),
        ("launch_time", "launchTime"),
        ("spot_request_id", "spotInstanceRequestId"),
    ];
    for &(key, path) in fields {
        if let Some(value) = element.find_text(path) {
            extra.insert(key.to_owned(), value.to_owned());
        }
    }

    Ok(Node {
        id: id.to_owned(),
        name: element
            .find_all("tagSet/item")
            .into_iter()
            .find_tag("Name")
            .map(str::to_owned),
        state,
        instance_id: Some(id.to_owned()),
        extra,
    })
}
