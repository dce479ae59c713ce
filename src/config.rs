// Command-line configuration for the sqli-sentinel server

use clap::{crate_version, Arg, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub probe_timeout: Duration,
    pub payload_dir: Option<PathBuf>,
    pub log_level: String,
}

pub fn command() -> Command {
    Command::new("sqli-sentinel")
        .version(crate_version!())
        .about("SQL injection scan orchestrator with a JSON API")
        .after_help("EXAMPLES:\n  sqli-sentinel --bind 127.0.0.1:5000\n  sqli-sentinel --payload-dir ./payloads --probe-timeout 10 --log-level debug")
        .arg(Arg::new("bind")
            .short('b')
            .long("bind")
            .env("SENTINEL_BIND")
            .num_args(1)
            .default_value("0.0.0.0:5000")
            .value_parser(clap::value_parser!(SocketAddr))
            .help("Address the API listens on"))
        .arg(Arg::new("probe_timeout")
            .short('t')
            .long("probe-timeout")
            .env("SENTINEL_PROBE_TIMEOUT")
            .num_args(1)
            .default_value("30")
            .value_parser(clap::value_parser!(u64).range(1..))
            .help("Seconds before a probe request is abandoned"))
        .arg(Arg::new("payload_dir")
            .short('p')
            .long("payload-dir")
            .env("SENTINEL_PAYLOAD_DIR")
            .num_args(1)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Directory of extra payload catalog JSON files"))
        .arg(Arg::new("log_level")
            .short('l')
            .long("log-level")
            .env("SENTINEL_LOG_LEVEL")
            .num_args(1)
            .default_value("info")
            .help("Default log filter when RUST_LOG is unset"))
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            bind: *matches.get_one::<SocketAddr>("bind").expect("bind has a default"),
            probe_timeout: Duration::from_secs(
                *matches.get_one::<u64>("probe_timeout").expect("probe_timeout has a default"),
            ),
            payload_dir: matches.get_one::<PathBuf>("payload_dir").cloned(),
            log_level: matches
                .get_one::<String>("log_level")
                .expect("log_level has a default")
                .clone(),
        }
    }

    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }
}
