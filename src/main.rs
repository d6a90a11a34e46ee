use ec2spot::cli;
use ec2spot::compute::NodeDriver;
use ec2spot::config::DriverConfig;
use ec2spot::registry;
use failure::format_err;
use failure::Error;
use std::env;
use std::process;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn main() {
    openssl_probe::init_ssl_cert_env_vars();
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        for cause in e.iter_causes() {
            eprintln!("Caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let cmd = match cli::parse_from_safe(env::args_os()) {
        Ok(cmd) => cmd,
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(e) => e.exit(),
            Err(e) => return Err(e),
        },
    };

    let config = DriverConfig::from_env()?;
    registry::set_spot_drivers();
    let factory = registry::get_driver(registry::SPOT_DRIVER_NAME)?;
    let driver: Box<dyn NodeDriver> = factory(&config)?;
    let spot = driver
        .as_spot()
        .ok_or_else(|| format_err!("driver does not support spot requests: {}", driver.name()))?;

    cli::dispatch(cmd, spot, POLL_INTERVAL)
}
