//! Log destinations, as configured by log configuration annotations.
//!
//! A log destination is one of:
//!
//! - `stderr`;
//! - an absolute path to a file, e.g. `/var/log/app_protect/security.log`;
//! - `syslog:server=<host>:<port>`, where the host is `localhost` or an IPv4 address.
//!
//! DoS access logs may only be shipped to `<ipv4>:<port>`.

use crate::Subsystem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

static LOG_DESTINATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:syslog:server=(?P<host>(?:[0-9]{1,3}\.){3}[0-9]{1,3}|localhost):(?P<port>[0-9]{1,5})|stderr|(?P<file>(?:/\S+)+))$",
    )
    .expect("must compile")
});

static ACCESS_LOG_DESTINATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<host>(?:[0-9]{1,3}\.){3}[0-9]{1,3}):(?P<port>[0-9]{1,5})$")
        .expect("must compile")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    File(PathBuf),
    Syslog { host: SyslogHost, port: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyslogHost {
    Localhost,
    Addr(IpAddr),
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum DestinationError {
    #[error(
        "Error parsing {0} Log config: Destination must follow format: \
         syslog:server=<ip-address | localhost>:<port> or stderr or absolute path to file \
         Log Destination did not follow format"
    )]
    LogFormat(Subsystem),

    #[error(
        "Error parsing App Protect Dos Access Log Dest config: Destination must follow format: \
         <ip-address>:<port> Log Destination did not follow format"
    )]
    AccessLogFormat,

    #[error("Error parsing port: {0} not a valid port number")]
    Port(u32),

    #[error("Error parsing host: {0} is not a valid ip address")]
    Host(String),
}

/// Parses a log destination annotation on behalf of `subsystem`.
pub fn parse_log_destination(
    subsystem: Subsystem,
    dst: &str,
) -> Result<LogDestination, DestinationError> {
    let caps = LOG_DESTINATION
        .captures(dst)
        .ok_or(DestinationError::LogFormat(subsystem))?;

    if let Some(file) = caps.name("file") {
        return Ok(LogDestination::File(PathBuf::from(file.as_str())));
    }

    let (host, port) = match (caps.name("host"), caps.name("port")) {
        (Some(host), Some(port)) => (host.as_str(), port.as_str()),
        _ => return Ok(LogDestination::Stderr),
    };

    let port = parse_port(port)?;
    let host = if host == "localhost" {
        SyslogHost::Localhost
    } else {
        SyslogHost::Addr(parse_ip(host)?)
    };
    Ok(LogDestination::Syslog { host, port })
}

/// Parses a DoS access log destination annotation.
pub fn parse_access_log_destination(dst: &str) -> Result<SocketAddr, DestinationError> {
    let caps = ACCESS_LOG_DESTINATION
        .captures(dst)
        .ok_or(DestinationError::AccessLogFormat)?;
    let (host, port) = match (caps.name("host"), caps.name("port")) {
        (Some(host), Some(port)) => (host.as_str(), port.as_str()),
        _ => return Err(DestinationError::AccessLogFormat),
    };

    let port = parse_port(port)?;
    let ip = parse_ip(host)?;
    Ok(SocketAddr::new(ip, port))
}

fn parse_port(port: &str) -> Result<u16, DestinationError> {
    // The patterns only admit up to 5 ASCII digits, so this always fits.
    let port = port.parse::<u32>().unwrap_or_default();
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(DestinationError::Port(port)),
    }
}

fn parse_ip(host: &str) -> Result<IpAddr, DestinationError> {
    host.parse()
        .map_err(|_| DestinationError::Host(host.to_string()))
}
