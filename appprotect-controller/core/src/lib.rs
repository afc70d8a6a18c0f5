//! Shared types for the App Protect resource controller: resource keys, reference resolution, and
//! the destination formats accepted in log configuration annotations.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod destination;
mod resource_key;
mod subsystem;

pub use self::{
    destination::{
        parse_access_log_destination, parse_log_destination, DestinationError, LogDestination,
        SyslogHost,
    },
    resource_key::{parse_resource_reference, ParseKeyError, ResourceKey},
    subsystem::{InvalidSubsystem, Subsystem},
};
