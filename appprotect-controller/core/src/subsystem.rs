use std::{fmt, str::FromStr};

/// The controller subsystem on whose behalf resources are validated.
///
/// The DoS subsystem validates `APDosPolicy` resources with a looser contract than App Protect
/// does; the two contracts are independent.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Subsystem {
    #[default]
    AppProtect,
    AppProtectDos,
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid subsystem {0:?}; expected one of 'app-protect' or 'dos'")]
pub struct InvalidSubsystem(String);

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppProtect => f.write_str("App Protect"),
            Self::AppProtectDos => f.write_str("App Protect Dos"),
        }
    }
}

impl FromStr for Subsystem {
    type Err = InvalidSubsystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app-protect" => Ok(Self::AppProtect),
            "dos" => Ok(Self::AppProtectDos),
            s => Err(InvalidSubsystem(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("app-protect".parse(), Ok(Subsystem::AppProtect));
        assert_eq!("dos".parse(), Ok(Subsystem::AppProtectDos));
        assert!("waf".parse::<Subsystem>().is_err());
    }
}
