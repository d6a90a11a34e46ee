use crate::cli::Command;
use crate::compute::SpotNodeDriver;
use crate::compute::SpotRequest;
use crate::compute::SpotRequestState;
use failure::Error;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

pub fn dispatch<D>(cmd: Command, driver: &D, poll_interval: Duration) -> Result<(), Error>
where
    D: SpotNodeDriver + ?Sized,
{
    println!("Running command: {:?}", cmd);

    match cmd {
        Command::Request { spec, wait } => {
            let nodes = driver.create_node(&spec)?;
            println!("Created spot requests: {:?}", nodes);
            if wait {
                for node in &nodes {
                    let spot = wait_for_fulfillment(driver, &node.id, poll_interval)?;
                    println!(
                        "Spot request {} fulfilled by instance: {}",
                        spot.id,
                        spot.instance_id.as_ref().map(String::as_str).unwrap_or("?")
                    );
                }
            }
        }
        Command::List { spot_request_ids } => {
            let spots = driver.list_spot_requests(&spot_request_ids, &BTreeMap::new())?;
            for spot in spots {
                println!(
                    "{}\t{}\t{}\t{}",
                    spot.id,
                    spot.state,
                    spot.spot_price,
                    spot.instance_id.as_ref().map(String::as_str).unwrap_or("-")
                );
            }
        }
        Command::Cancel { spot_request_id } => {
            if driver.cancel_spot_instance_request(&spot_request_id)? {
                println!("Cancelled spot request: {}", spot_request_id);
            } else {
                bail!("spot request was not cancelled: {}", spot_request_id);
            }
        }
        Command::Terminate { instance_id } => {
            if driver.destroy_node(&instance_id)? {
                println!("Terminating instance: {}", instance_id);
            } else {
                bail!("instance was not terminated: {}", instance_id);
            }
        }
        Command::Tag { resource_id, tags } => {
            if driver.create_tags(&resource_id, &tags)? {
                println!("Tagged {}: {:?}", resource_id, tags);
            } else {
                bail!("failed to tag: {}", resource_id);
            }
        }
    }

    Ok(())
}

/// Polls a spot request until it leaves the open state.
pub fn wait_for_fulfillment<D>(
    driver: &D,
    spot_request_id: &str,
    poll_interval: Duration,
) -> Result<SpotRequest, Error>
where
    D: SpotNodeDriver + ?Sized,
{
    loop {
        let spot = driver
            .list_spot_requests(&[spot_request_id.to_owned()], &BTreeMap::new())?
            .into_iter()
            .next()
            .ok_or_else(|| format_err!("failed to find spot request: {}", spot_request_id))?;
        match spot.state {
            SpotRequestState::Open => {
                println!(
                    "Spot request {} is open: {}",
                    spot.id,
                    spot.message.as_ref().map(String::as_str).unwrap_or("")
                );
            }
            SpotRequestState::Active => return Ok(spot),
            state => bail!(
                "spot request {} is {}: {}",
                spot.id,
                state,
                spot.message.as_ref().map(String::as_str).unwrap_or("")
            ),
        }
        thread::sleep(poll_interval);
    }
}
