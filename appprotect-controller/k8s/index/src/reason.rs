use std::fmt;

/// The `reason` reported with every problem raised for a resource.
pub const REJECTED: &str = "Rejected";

/// Why a resource is invalid.
///
/// Stored on invalid resources and returned from lookups. The detailed error is only reported in
/// the accompanying `Problem`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Reason {
    ValidationFailed,
    UnsatisfiedSignatureRequirements,
    DuplicateTag,
    InvalidTimestamp,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation Failed",
            Self::UnsatisfiedSignatureRequirements => {
                "Policy has unsatisfied signature requirements"
            }
            Self::DuplicateTag => "Duplicate tag set",
            Self::InvalidTimestamp => "Invalid timestamp",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
