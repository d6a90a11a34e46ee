use crate::compute::BlockDeviceMapping;
use crate::compute::LaunchSpec;
use crate::compute::Params;
use crate::errors::invalid_parameter;
use failure::Error;
use std::collections::BTreeMap;

/// `Key.1=a&Key.2=b...`
pub fn path_list<S: AsRef<str>>(key: &str, values: &[S]) -> Params {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("{}.{}", key, i + 1), v.as_ref().to_owned()))
        .collect()
}

pub fn filter_params(filters: &BTreeMap<String, Vec<String>>) -> Params {
    let mut params = Params::new();
    for (i, (name, values)) in filters.iter().enumerate() {
        params.insert(format!("Filter.{}.Name", i + 1), name.clone());
        for (j, value) in values.iter().enumerate() {
            params.insert(format!("Filter.{}.Value.{}", i + 1, j + 1), value.clone());
        }
    }
    params
}

pub fn block_device_mapping_params(mappings: &[BlockDeviceMapping]) -> Params {
    let mut params = Params::new();
    for (i, mapping) in mappings.iter().enumerate() {
        let prefix = format!("BlockDeviceMapping.{}", i + 1);
        params.insert(format!("{}.DeviceName", prefix), mapping.device_name.clone());
        if let Some(ref virtual_name) = mapping.virtual_name {
            params.insert(format!("{}.VirtualName", prefix), virtual_name.clone());
        }
        if mapping.no_device {
            params.insert(format!("{}.NoDevice", prefix), String::new());
        }
        if let Some(ref ebs) = mapping.ebs {
            if let Some(ref snapshot_id) = ebs.snapshot_id {
                params.insert(format!("{}.Ebs.SnapshotId", prefix), snapshot_id.clone());
            }
            if let Some(volume_size) = ebs.volume_size {
                params.insert(format!("{}.Ebs.VolumeSize", prefix), volume_size.to_string());
            }
            if let Some(delete) = ebs.delete_on_termination {
                params.insert(
                    format!("{}.Ebs.DeleteOnTermination", prefix),
                    delete.to_string(),
                );
            }
            if let Some(ref volume_type) = ebs.volume_type {
                params.insert(format!("{}.Ebs.VolumeType", prefix), volume_type.clone());
            }
            if let Some(iops) = ebs.iops {
                params.insert(format!("{}.Ebs.Iops", prefix), iops.to_string());
            }
        }
    }
    params
}

/// Launch fields shared by `RunInstances` and the `LaunchSpecification`
/// of `RequestSpotInstances`, without any prefix.
pub fn launch_params(spec: &LaunchSpec, region: &str) -> Result<Params, Error> {
    if spec.image.as_str().is_empty() {
        return Err(invalid_parameter("image id is required"));
    }
    if spec.instance_type.as_str().is_empty() {
        return Err(invalid_parameter("instance type is required"));
    }
    if spec.count == 0 {
        return Err(invalid_parameter("instance count must be at least 1"));
    }

    let mut params = Params::new();
    params.insert("ImageId".to_owned(), spec.image.to_string());
    params.insert("InstanceType".to_owned(), spec.instance_type.to_string());

    if let Some(ref location) = spec.location {
        if location.region != region {
            return Err(invalid_parameter(format!(
                "invalid availability zone: {} is not in {}",
                location.availability_zone, region
            )));
        }
        params.insert(
            "Placement.AvailabilityZone".to_owned(),
            location.availability_zone.clone(),
        );
    }

    if let Some(ref key_name) = spec.key_name {
        params.insert("KeyName".to_owned(), key_name.clone());
    }

    if let Some(ref user_data) = spec.user_data {
        params.insert("UserData".to_owned(), base64::encode(user_data.as_bytes()));
    }

    params.extend(path_list("SecurityGroup", &spec.security_groups));
    params.extend(block_device_mapping_params(&spec.block_device_mappings));

    if let Some(ref iam_profile) = spec.iam_profile {
        if iam_profile.starts_with("arn:aws:iam:") {
            params.insert("IamInstanceProfile.Arn".to_owned(), iam_profile.clone());
        } else {
            params.insert("IamInstanceProfile.Name".to_owned(), iam_profile.clone());
        }
    }

    if let Some(ebs_optimized) = spec.ebs_optimized {
        params.insert("EbsOptimized".to_owned(), ebs_optimized.to_string());
    }

    if let Some(ref subnet_id) = spec.subnet_id {
        params.insert("SubnetId".to_owned(), subnet_id.clone());
    }

    Ok(params)
}

pub fn with_prefix(prefix: &str, params: Params) -> Params {
    params
        .into_iter()
        .map(|(k, v)| (format!("{}.{}", prefix, k), v))
        .collect()
}
