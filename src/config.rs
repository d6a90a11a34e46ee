use crate::compute::ec2::REGIONS;
use crate::errors::invalid_parameter;
use failure::Error;
use failure::ResultExt;
use rusoto_core::Region;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const REGION_VAR: &str = "AWS_DEFAULT_REGION";
pub const ENDPOINT_VAR: &str = "EC2_ENDPOINT";
pub const ACCESS_KEY_VAR: &str = "ACCESSID";
pub const SECRET_KEY_VAR: &str = "SECRETKEY";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (secret hidden)", self.access_key)
    }
}

/// Where and as whom a driver talks to EC2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub region: String,
    /// Overrides the public endpoint, e.g. for a local mock.
    pub endpoint: Option<String>,
    /// Static keys; without them rusoto's default provider chain is used.
    pub credentials: Option<Credentials>,
}

impl DriverConfig {
    pub fn new<S: Into<String>>(region: S) -> DriverConfig {
        DriverConfig {
            region: region.into(),
            endpoint: None,
            credentials: None,
        }
    }

    pub fn from_env() -> Result<DriverConfig, Error> {
        DriverConfig::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<DriverConfig, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = lookup(REGION_VAR)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format_err!("env var {} is not set", REGION_VAR))?;
        let endpoint = lookup(ENDPOINT_VAR).filter(|s| !s.is_empty());
        let credentials = match (lookup(ACCESS_KEY_VAR), lookup(SECRET_KEY_VAR)) {
            (Some(access_key), Some(secret_key)) => Some(Credentials {
                access_key,
                secret_key,
            }),
            (None, None) => None,
            _ => bail!(
                "env vars {} and {} must be set together",
                ACCESS_KEY_VAR,
                SECRET_KEY_VAR
            ),
        };
        let config = DriverConfig {
            region,
            endpoint,
            credentials,
        };
        config.rusoto_region()?;
        Ok(config)
    }

    pub fn rusoto_region(&self) -> Result<Region, Error> {
        if let Some(ref endpoint) = self.endpoint {
            return Ok(Region::Custom {
                name: self.region.clone(),
                endpoint: endpoint.clone(),
            });
        }
        if !REGIONS.contains(&self.region.as_str()) {
            return Err(invalid_parameter(format!(
                "unsupported region: {}",
                self.region
            )));
        }
        let region = Region::from_str(&self.region)
            .with_context(|_e| format!("region is invalid: {}", self.region))?;
        Ok(region)
    }
}
