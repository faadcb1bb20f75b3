use clap::ArgMatches;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No socket name and no check-in requested")]
    Nothing,
    #[error("Socket name is empty")]
    EmptyName,
    #[error("Socket name is given twice: {0}")]
    DuplicateName(String),
}

/// The configuration object for the `launchd-activate` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    stream_names: Vec<String>,
    packet_names: Vec<String>,
    check_in: bool,
}

impl Config {
    /// Create a new `launchd_activate::Config` object.
    pub fn new(
        stream_names: Vec<String>,
        packet_names: Vec<String>,
        check_in: bool,
    ) -> Result<Config, ConfigError> {
        if stream_names.is_empty() && packet_names.is_empty() && !check_in {
            return Err(ConfigError::Nothing);
        }

        let mut seen = Vec::with_capacity(stream_names.len() + packet_names.len());
        for name in stream_names.iter().chain(packet_names.iter()) {
            if name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            // A name can only be activated once per process.
            if seen.contains(&name) {
                return Err(ConfigError::DuplicateName(name.clone()));
            }
            seen.push(name);
        }

        Ok(Config {
            stream_names,
            packet_names,
            check_in,
        })
    }

    pub fn stream_names(&self) -> &[String] {
        &self.stream_names
    }

    pub fn packet_names(&self) -> &[String] {
        &self.packet_names
    }

    pub fn check_in(&self) -> bool {
        self.check_in
    }
}

fn values(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .values_of(name)
        .map(|values| values.map(str::to_string).collect())
        .unwrap_or_default()
}

impl TryFrom<&ArgMatches> for Config {
    type Error = ConfigError;

    fn try_from(matches: &ArgMatches) -> Result<Self, Self::Error> {
        Config::new(
            values(matches, "stream"),
            values(matches, "packet"),
            matches.is_present("check-in"),
        )
    }
}
