pub mod ec2;
#[cfg(test)]
pub mod mem;

use crate::errors::invalid_parameter;
use crate::errors::parse_error;
use chrono::DateTime;
use chrono::Utc;
use failure::Error;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Query parameters of a single EC2 API call, `Action` included.
pub type Params = BTreeMap<String, String>;

/// Sends a signed query to the provider and hands back the raw body.
///
/// Authentication, signing and HTTP live behind this seam; drivers only
/// produce parameters and consume bodies.
pub trait Transport {
    fn region(&self) -> &str;
    fn request(&self, params: &Params) -> Result<String, Error>;
}

/// The part of a driver that differs between launch modes.
pub trait LaunchRequest {
    fn action(&self) -> &'static str;
    fn build_launch_request(&self, spec: &LaunchSpec) -> Result<Params, Error>;
    fn parse_launch_response(&self, body: &str) -> Result<Vec<Node>, Error>;
}

pub trait NodeDriver: fmt::Debug {
    fn name(&self) -> &str;
    fn region(&self) -> &str;
    fn create_node(&self, spec: &LaunchSpec) -> Result<Vec<Node>, Error>;
    fn list_nodes(&self, node_ids: &[String]) -> Result<Vec<Node>, Error>;
    fn destroy_node(&self, node_id: &str) -> Result<bool, Error>;
    fn create_tags(&self, resource_id: &str, tags: &BTreeMap<String, String>)
        -> Result<bool, Error>;

    fn as_spot(&self) -> Option<&dyn SpotNodeDriver> {
        None
    }
}

pub trait SpotNodeDriver: NodeDriver {
    fn list_spot_requests(
        &self,
        spot_request_ids: &[String],
        filters: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<SpotRequest>, Error>;
    fn cancel_spot_instance_request(&self, spot_request_id: &str) -> Result<bool, Error>;
}

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct ImageId(String);

impl ImageId {
    pub fn new<S: Into<String>>(s: S) -> ImageId {
        ImageId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct InstanceType(String);

impl InstanceType {
    pub fn new<S: Into<String>>(s: S) -> InstanceType {
        InstanceType(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Maximum hourly price a caller is willing to pay.
///
/// Kept as the caller wrote it so the provider receives the exact decimal.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotPrice(String);

impl SpotPrice {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SpotPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<SpotPrice, Error> {
        let s = s.trim();
        let plain_decimal = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_digit() || c == '.')
            && s.matches('.').count() <= 1;
        if !plain_decimal {
            return Err(invalid_parameter(format!(
                "spot price is not a decimal: {:?}",
                s
            )));
        }
        let value: f64 = s
            .parse()
            .map_err(|_e| invalid_parameter(format!("spot price is not a number: {:?}", s)))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid_parameter(format!(
                "spot price must be positive: {}",
                s
            )));
        }
        Ok(SpotPrice(s.to_owned()))
    }
}

impl fmt::Display for SpotPrice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SpotPrice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpotRequestType {
    OneTime,
    Persistent,
}

impl SpotRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            SpotRequestType::OneTime => "one-time",
            SpotRequestType::Persistent => "persistent",
        }
    }
}

impl FromStr for SpotRequestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<SpotRequestType, Error> {
        match s {
            "one-time" => Ok(SpotRequestType::OneTime),
            "persistent" => Ok(SpotRequestType::Persistent),
            x => Err(invalid_parameter(format!("unknown spot request type: {}", x))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    pub availability_zone: String,
    pub region: String,
}

impl NodeLocation {
    /// Derives the region from a zone name. The region ends at the first
    /// numbered segment, so `us-west-2a` and the Local Zone
    /// `us-west-2-lax-1a` both belong to `us-west-2`.
    pub fn from_zone<S: Into<String>>(availability_zone: S) -> NodeLocation {
        let availability_zone = availability_zone.into();
        let mut segments = Vec::new();
        for segment in availability_zone.split('-') {
            let digits = segment
                .find(|c: char| !c.is_ascii_digit())
                .map_or(segment, |end| &segment[..end]);
            if !digits.is_empty() {
                segments.push(digits);
                break;
            }
            segments.push(segment);
        }
        let region = segments.join("-");
        NodeLocation {
            availability_zone,
            region,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EbsBlockDevice {
    pub snapshot_id: Option<String>,
    pub volume_size: Option<u32>,
    pub delete_on_termination: Option<bool>,
    pub volume_type: Option<String>,
    pub iops: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub virtual_name: Option<String>,
    pub ebs: Option<EbsBlockDevice>,
    pub no_device: bool,
}

/// Everything needed to launch instances, on demand or on the spot market.
///
/// The spot fields are ignored by the on-demand driver.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub name: Option<String>,
    pub image: ImageId,
    pub instance_type: InstanceType,
    pub count: u32,
    pub location: Option<NodeLocation>,
    pub key_name: Option<String>,
    pub security_groups: Vec<String>,
    pub user_data: Option<String>,
    pub block_device_mappings: Vec<BlockDeviceMapping>,
    pub iam_profile: Option<String>,
    pub ebs_optimized: Option<bool>,
    pub subnet_id: Option<String>,
    pub spot_price: Option<SpotPrice>,
    pub request_type: Option<SpotRequestType>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl LaunchSpec {
    pub fn new(image: ImageId, instance_type: InstanceType) -> LaunchSpec {
        LaunchSpec {
            name: None,
            image,
            instance_type,
            count: 1,
            location: None,
            key_name: None,
            security_groups: Vec::new(),
            user_data: None,
            block_device_mappings: Vec::new(),
            iam_profile: None,
            ebs_optimized: None,
            subnet_id: None,
            spot_price: None,
            request_type: None,
            valid_from: None,
            valid_until: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpotRequestState {
    Open,
    Active,
    Closed,
    Cancelled,
    Failed,
}

impl SpotRequestState {
    pub fn as_str(self) -> &'static str {
        match self {
            SpotRequestState::Open => "open",
            SpotRequestState::Active => "active",
            SpotRequestState::Closed => "closed",
            SpotRequestState::Cancelled => "cancelled",
            SpotRequestState::Failed => "failed",
        }
    }
}

impl FromStr for SpotRequestState {
    type Err = Error;

    fn from_str(s: &str) -> Result<SpotRequestState, Error> {
        match s {
            "open" => Ok(SpotRequestState::Open),
            "active" => Ok(SpotRequestState::Active),
            "closed" => Ok(SpotRequestState::Closed),
            "cancelled" => Ok(SpotRequestState::Cancelled),
            "failed" => Ok(SpotRequestState::Failed),
            x => Err(parse_error(format!("unknown spot request state: {}", x))),
        }
    }
}

impl fmt::Display for SpotRequestState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Pending,
    Running,
    Terminating, // called "shutting-down" by AWS
    Terminated,
    Stopping,
    Stopped,
    SpotRequest(SpotRequestState),
    Unknown(String),
}

impl NodeState {
    pub fn from_instance_state(name: &str) -> NodeState {
        match name {
            "pending" => NodeState::Pending,
            "running" => NodeState::Running,
            "shutting-down" => NodeState::Terminating,
            "terminated" => NodeState::Terminated,
            "stopping" => NodeState::Stopping,
            "stopped" => NodeState::Stopped,
            x => NodeState::Unknown(x.to_owned()),
        }
    }
}

/// Provider-neutral view of an instance or of a pending spot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub name: Option<String>,
    pub state: NodeState,
    pub instance_id: Option<String>,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotRequest {
    pub id: String,
    pub instance_id: Option<String>,
    pub spot_price: String,
    pub state: SpotRequestState,
    pub status: Option<String>,
    pub message: Option<String>,
    pub availability_zone_group: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl SpotRequest {
    pub fn into_node(self) -> Node {
        let mut extra = self.extra;
        extra.insert("spot_price".to_owned(), self.spot_price);
        if let Some(status) = self.status {
            extra.insert("status".to_owned(), status);
        }
        if let Some(message) = self.message {
            extra.insert("message".to_owned(), message);
        }
        if let Some(group) = self.availability_zone_group {
            extra.insert("availability_zone_group".to_owned(), group);
        }
        Node {
            id: self.id,
            name: None,
            state: NodeState::SpotRequest(self.state),
            instance_id: self.instance_id,
            extra,
        }
    }
}
