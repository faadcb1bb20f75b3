use clap::{crate_authors, crate_description, crate_version, Arg, Command};

const ABOUT: &str =
    "Serve an echo service on the sockets which launchd created for this process.\n\
    The socket names are the keys of the Sockets dictionary of the launchd job.\n\
    This binary uses the env_logger as logger implementations. \n\
    See https://github.com/sebasmagri/env_logger/";

const AFTER_HELP: &str =
    "CAUTION: launchd hands the sockets of a name out once per process. The binary has to be \
    started by launchd, otherwise every name fails with \"not managed by launchd\".\n";

/// Get the `clap::Command` object for the argument parsing.
pub fn get_command() -> Command<'static> {
    Command::new(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(ABOUT)
        .after_help(AFTER_HELP)
        .arg(
            Arg::new("stream")
                .short('s')
                .long("stream")
                .takes_value(true)
                .multiple_occurrences(true)
                .value_name("NAME")
                .help("Name of a stream socket (TCP or Unix) to echo on")
                .required(false),
        )
        .arg(
            Arg::new("packet")
                .short('p')
                .long("packet")
                .takes_value(true)
                .multiple_occurrences(true)
                .value_name("NAME")
                .help("Name of a datagram socket (UDP or Unix) to echo on")
                .required(false),
        )
        .arg(
            Arg::new("check-in")
                .long("check-in")
                .help("Check in with launchd and report whether the process is managed by it")
                .required(false),
        )
}
