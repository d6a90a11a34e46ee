//! Name-to-factory lookup for drivers.
//!
//! Nothing is registered implicitly: call `set_spot_drivers` once during
//! start-up before looking drivers up by name.

use crate::compute::ec2::AwsTransport;
use crate::compute::ec2::Ec2SpotNodeDriver;
use crate::compute::NodeDriver;
use crate::config::DriverConfig;
use failure::Error;
use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

pub const SPOT_DRIVER_NAME: &str = "ec2spot";

pub type DriverFactory = fn(&DriverConfig) -> Result<Box<dyn NodeDriver>, Error>;

#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, DriverFactory>>,
}

impl DriverRegistry {
    pub fn new() -> DriverRegistry {
        DriverRegistry::default()
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn set_driver(&self, name: &str, factory: DriverFactory) {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        if drivers.insert(name.to_owned(), factory).is_some() {
            debug!("Replaced driver: {}", name);
        } else {
            debug!("Registered driver: {}", name);
        }
    }

    pub fn get_driver(&self, name: &str) -> Result<DriverFactory, Error> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        drivers
            .get(name)
            .cloned()
            .ok_or_else(|| format_err!("no driver registered as: {}", name))
    }

    pub fn names(&self) -> Vec<String> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = drivers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn register_spot_drivers(&self) {
        self.set_driver(SPOT_DRIVER_NAME, spot_driver);
    }
}

fn spot_driver(config: &DriverConfig) -> Result<Box<dyn NodeDriver>, Error> {
    let transport = AwsTransport::new(config)?;
    Ok(Box::new(Ec2SpotNodeDriver::new(transport)))
}

lazy_static! {
    static ref REGISTRY: DriverRegistry = DriverRegistry::new();
}

pub fn registry() -> &'static DriverRegistry {
    &REGISTRY
}

/// Makes the spot driver available as `ec2spot` in the process-wide registry.
pub fn set_spot_drivers() {
    registry().register_spot_drivers();
}

pub fn get_driver(name: &str) -> Result<DriverFactory, Error> {
    registry().get_driver(name)
}
