#[macro_use]
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod cli;
pub mod compute;
pub mod config;
pub mod errors;
pub mod registry;
