use crate::cli::Command;
use crate::compute::ImageId;
use crate::compute::InstanceType;
use crate::compute::LaunchSpec;
use crate::compute::NodeLocation;
use crate::compute::SpotPrice;
use crate::compute::SpotRequestType;
use clap::App;
use clap::AppSettings;
use clap::Arg;
use clap::SubCommand;
use failure::Error;
use failure::ResultExt;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::str::FromStr;

fn define_app<'a, 'b>() -> App<'a, 'b> {
    let request_command = SubCommand::with_name("request")
        .about("Bid for spot instances")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::with_name("image")
                .help("Image to boot, e.g. ami-f195f1cb")
                .short("i")
                .long("image")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("size")
                .help(
                    "Instance type. Examples:\n\
                     * t1.micro\n\
                     * m1.small\n\
                     * c5.large\n\
                     ",
                )
                .next_line_help(true)
                .short("s")
                .long("size")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("price")
                .help("Maximum hourly price to bid, e.g. 0.08")
                .short("p")
                .long("price")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("count")
                .help("Number of instances to request")
                .short("n")
                .long("count")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::with_name("key-name")
                .help("Name of the key pair to install")
                .short("k")
                .long("key-name")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("security-group")
                .help("Security group to launch into. May be repeated.")
                .short("g")
                .long("security-group")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("zone")
                .help("Availability zone, e.g. ap-southeast-2a")
                .short("z")
                .long("zone")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("type")
                .help("Request type")
                .long("type")
                .takes_value(true)
                .possible_values(&["one-time", "persistent"]),
        )
        .arg(
            Arg::with_name("user-data")
                .help("User data passed to the instance")
                .long("user-data")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("wait")
                .help("Poll until the request is no longer open")
                .short("w")
                .long("wait"),
        );

    let list_command = SubCommand::with_name("list")
        .about("List spot requests")
        .arg(
            Arg::with_name("id")
                .help("Spot request id to show. May be repeated.")
                .long("id")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        );

    let cancel_command = SubCommand::with_name("cancel")
        .about("Cancel a spot request")
        .arg(Arg::with_name("id").required(true));

    let terminate_command = SubCommand::with_name("terminate")
        .about("Terminate an instance")
        .arg(Arg::with_name("instance-id").required(true));

    let tag_command = SubCommand::with_name("tag")
        .about("Tag an instance or spot request")
        .arg(Arg::with_name("resource-id").required(true))
        .arg(
            Arg::with_name("tag")
                .help("Tag to set, as KEY=VALUE. May be repeated.")
                .short("t")
                .long("tag")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .required(true),
        );

    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::DeriveDisplayOrder)
        .subcommand(request_command)
        .subcommand(list_command)
        .subcommand(cancel_command)
        .subcommand(terminate_command)
        .subcommand(tag_command)
}

pub fn parse_from_safe<I, T>(args: I) -> Result<Command, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let app = define_app();
    let matches = app.get_matches_from_safe(args)?;

    let cmd = if let Some(matches) = matches.subcommand_matches("request") {
        let image = ImageId::new(matches.value_of("image").expect("required"));
        let instance_type = InstanceType::new(matches.value_of("size").expect("required"));
        let mut spec = LaunchSpec::new(image, instance_type);

        let price = matches.value_of("price").expect("required");
        spec.spot_price = Some(SpotPrice::from_str(price)?);

        let count = matches.value_of("count").expect("has default");
        spec.count = count
            .parse::<u32>()
            .with_context(|_e| format!("not a count: {}", count))?;

        spec.key_name = matches.value_of("key-name").map(str::to_owned);
        spec.security_groups = matches
            .values_of("security-group")
            .map(|xs| xs.map(str::to_owned).collect())
            .unwrap_or_default();
        spec.location = matches.value_of("zone").map(NodeLocation::from_zone);
        spec.request_type = match matches.value_of("type") {
            Some(x) => Some(SpotRequestType::from_str(x)?),
            None => None,
        };
        spec.user_data = matches.value_of("user-data").map(str::to_owned);

        Command::Request {
            spec,
            wait: matches.is_present("wait"),
        }
    } else if let Some(matches) = matches.subcommand_matches("list") {
        Command::List {
            spot_request_ids: matches
                .values_of("id")
                .map(|xs| xs.map(str::to_owned).collect())
                .unwrap_or_default(),
        }
    } else if let Some(matches) = matches.subcommand_matches("cancel") {
        Command::Cancel {
            spot_request_id: matches.value_of("id").expect("required").to_owned(),
        }
    } else if let Some(matches) = matches.subcommand_matches("terminate") {
        Command::Terminate {
            instance_id: matches.value_of("instance-id").expect("required").to_owned(),
        }
    } else if let Some(matches) = matches.subcommand_matches("tag") {
        let tags = matches
            .values_of("tag")
            .expect("required")
            .map(parse_tag)
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Command::Tag {
            resource_id: matches.value_of("resource-id").expect("required").to_owned(),
            tags,
        }
    } else {
        unreachable!()
    };

    Ok(cmd)
}

fn parse_tag(s: &str) -> Result<(String, String), Error> {
    let mut parts = s.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => bail!("not a tag, expected KEY=VALUE: {}", s),
    }
}
