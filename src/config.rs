//! Relay settings file
//!
//! The file holds a single line of whitespace-separated `key=value` pairs:
//!
//! ```text
//! host=mail.example.org port=25 auth=0 timeout=60
//! ```
//!
//! `host`, `port` and `auth` are required, `timeout` is in seconds and `0` disables it.

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    fs, io,
    path::Path,
    str::FromStr,
    time::Duration,
};

use nom::{
    bytes::complete::take_till1,
    character::complete::{alpha1, char, multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};

use crate::transport::smtp::{DEFAULT_TIMEOUT, SMTP_PORT};

/// Default settings file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mailsender.conf";
/// Default relay host
pub const DEFAULT_HOST: &str = "localhost";
/// Authentication method meaning "no authentication"
pub const NO_AUTH: &str = "0";

/// Relay host, port and authentication method used for a send
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfig {
    /// Relay host name
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Authentication method, `"0"` for none
    pub auth_method: String,
    /// Deadline for connecting and for each socket read or write, `None` to block
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: DEFAULT_HOST.to_owned(),
            port: SMTP_PORT,
            auth_method: NO_AUTH.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl RelayConfig {
    /// Creates settings for an unauthenticated relay on port 25
    pub fn new<T: Into<String>>(host: T) -> Self {
        RelayConfig {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Loads the settings file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Writes the settings to `path`, replacing the file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(path, format!("{self}\n"))?;
        Ok(())
    }
}

impl Display for RelayConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host={} port={} auth={} timeout={}",
            self.host,
            self.port,
            self.auth_method,
            self.timeout.map(|t| t.as_secs()).unwrap_or(0)
        )
    }
}

fn pair(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(alpha1, char('='), take_till1(char::is_whitespace)).parse(i)
}

fn pairs(i: &str) -> IResult<&str, Vec<(&str, &str)>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, pair),
        multispace0,
    ))
    .parse(i)
}

impl FromStr for RelayConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let (_, pairs) = pairs(s).map_err(|e| Error::Parse(e.to_string()))?;

        let mut host = None;
        let mut port = None;
        let mut auth_method = None;
        let mut timeout = Some(DEFAULT_TIMEOUT);

        for (key, value) in pairs {
            match key {
                "host" => host = Some(value.to_owned()),
                "port" => {
                    port = Some(
                        value
                            .parse::<u16>()
                            .map_err(|_| Error::InvalidPort(value.to_owned()))?,
                    )
                }
                "auth" => auth_method = Some(value.to_owned()),
                "timeout" => {
                    let secs = value
                        .parse::<u64>()
                        .map_err(|_| Error::InvalidTimeout(value.to_owned()))?;
                    timeout = (secs > 0).then(|| Duration::from_secs(secs));
                }
                _other => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("ignoring unknown relay setting {:?}", _other);
                }
            }
        }

        Ok(RelayConfig {
            host: host.ok_or(Error::MissingKey("host"))?,
            port: port.ok_or(Error::MissingKey("port"))?,
            auth_method: auth_method.ok_or(Error::MissingKey("auth"))?,
            timeout,
        })
    }
}

/// Error type for the relay settings
#[derive(Debug)]
pub enum Error {
    /// The settings file could not be read or written
    Io(io::Error),
    /// A required key is absent
    MissingKey(&'static str),
    /// The port is not a number between 0 and 65535
    InvalidPort(String),
    /// The timeout is not a number of seconds
    InvalidTimeout(String),
    /// The line is not a list of `key=value` pairs
    Parse(String),
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::MissingKey(key) => write!(fmt, "missing `{key}` setting"),
            Error::InvalidPort(value) => write!(fmt, "invalid port {value:?}"),
            Error::InvalidTimeout(value) => write!(fmt, "invalid timeout {value:?}"),
            Error::Parse(err) => write!(fmt, "malformed settings: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_legacy_line() {
        let config: RelayConfig = "host=mailhost.example.edu port=25 auth=0".parse().unwrap();
        assert_eq!(
            config,
            RelayConfig {
                host: "mailhost.example.edu".to_owned(),
                port: 25,
                auth_method: "0".to_owned(),
                timeout: Some(DEFAULT_TIMEOUT),
            }
        );
    }

    #[test]
    fn parse_any_order_with_timeout() {
        let config: RelayConfig = "  auth=0\tport=2525 timeout=5 host=relay \n".parse().unwrap();
        assert_eq!(config.host, "relay");
        assert_eq!(config.port, 2525);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config: RelayConfig = "host=relay port=25 auth=0 timeout=0".parse().unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config: RelayConfig = "host=relay port=25 auth=0 tls=no".parse().unwrap();
        assert_eq!(config, RelayConfig::new("relay"));
    }

    #[test]
    fn missing_keys() {
        assert!(matches!(
            "port=25 auth=0".parse::<RelayConfig>(),
            Err(Error::MissingKey("host"))
        ));
        assert!(matches!(
            "host=relay auth=0".parse::<RelayConfig>(),
            Err(Error::MissingKey("port"))
        ));
        assert!(matches!(
            "host=relay port=25".parse::<RelayConfig>(),
            Err(Error::MissingKey("auth"))
        ));
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            "host=relay port=smtp auth=0".parse::<RelayConfig>(),
            Err(Error::InvalidPort(_))
        ));
        assert!(matches!(
            "host=relay port=70000 auth=0".parse::<RelayConfig>(),
            Err(Error::InvalidPort(_))
        ));
        assert!(matches!(
            "host=relay port=25 auth=0 timeout=-1".parse::<RelayConfig>(),
            Err(Error::InvalidTimeout(_))
        ));
        assert!(matches!(
            "host= port=25 auth=0".parse::<RelayConfig>(),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        let config = RelayConfig {
            host: "relay.example.org".to_owned(),
            port: 25,
            auth_method: "0".to_owned(),
            timeout: None,
        };
        assert_eq!(
            config.to_string(),
            "host=relay.example.org port=25 auth=0 timeout=0"
        );
        assert_eq!(config.to_string().parse::<RelayConfig>().unwrap(), config);
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("mailsender-{}.conf", std::process::id()));
        let config = RelayConfig::new("relay.example.org");
        config.save(&path).unwrap();
        assert_eq!(RelayConfig::load(&path).unwrap(), config);
        fs::remove_file(path).unwrap();
    }
}
