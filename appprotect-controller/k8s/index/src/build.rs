//! Builds typed representations of validated resources.

use crate::{Policy, Reason, RevisionTimeWindow, SignatureRequirement, UserSig};
use appprotect_controller_k8s_api::{
    field::{self, FieldError, Shape},
    Contract, DynamicObject, ResourceExt, ValidationError,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const SIGNATURE_REQUIREMENTS: &[&str] = &["spec", "policy", "signature-requirements"];
const USER_SIG_TAG: &[&str] = &["spec", "tag"];
const USER_SIG_REVISION: &[&str] = &["spec", "revisionDatetime"];

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error retrieving Signature requirements from {name}: {source}")]
    SignatureRequirements { name: String, source: FieldError },

    #[error("Error creating time requirements from {name}: {source}")]
    RevisionTimes {
        name: String,
        source: TimestampError,
    },

    #[error("Error reading user signature {name}: {source}")]
    UserSig { name: String, source: FieldError },

    #[error("Error parsing revision time of user signature {name}: {source}")]
    RevisionTime {
        name: String,
        source: TimestampError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("Error parsing time from {field}: {source}")]
    Parse {
        field: String,
        source: chrono::ParseError,
    },

    #[error("Error parsing time from {field}: value is not a string")]
    NotAString { field: String },
}

// === impl BuildError ===

impl BuildError {
    /// The reason recorded on a resource that failed to build.
    pub fn reason(&self) -> Reason {
        match self {
            Self::Validation(_) | Self::SignatureRequirements { .. } | Self::UserSig { .. } => {
                Reason::ValidationFailed
            }
            Self::RevisionTimes { .. } | Self::RevisionTime { .. } => Reason::InvalidTimestamp,
        }
    }
}

/// Builds an `APPolicy` or `APDosPolicy`, reading its signature requirements.
///
/// Requirements without a `tag` are ignored. Any unparseable revision time rejects the whole
/// policy.
pub fn policy(contract: &Contract, obj: &DynamicObject) -> Result<Policy, BuildError> {
    contract.validate(obj)?;

    let reqs = field::optional_shape(&obj.data, SIGNATURE_REQUIREMENTS, Shape::Seq).map_err(
        |source| BuildError::SignatureRequirements {
            name: obj.name_any(),
            source,
        },
    )?;

    let mut signature_requirements = Vec::new();
    for req in reqs.and_then(Value::as_array).into_iter().flatten() {
        let Some(req) = req.as_object() else {
            continue;
        };
        let Some(tag) = req.get("tag").and_then(Value::as_str) else {
            continue;
        };
        let revision_time_window =
            revision_time_window(req).map_err(|source| BuildError::RevisionTimes {
                name: obj.name_any(),
                source,
            })?;
        signature_requirements.push(SignatureRequirement {
            tag: tag.to_string(),
            revision_time_window,
        });
    }

    Ok(Policy {
        signature_requirements,
    })
}

/// Builds an `APLogConf` or `APDosLogConf`, which have no typed parts beyond their contract.
pub fn log_conf(contract: &Contract, obj: &DynamicObject) -> Result<(), BuildError> {
    contract.validate(obj)?;
    Ok(())
}

/// Builds an `APUserSig`, reading its tag and revision time.
pub fn user_sig(contract: &Contract, obj: &DynamicObject) -> Result<UserSig, BuildError> {
    contract.validate(obj)?;

    let tag = field::optional_shape(&obj.data, USER_SIG_TAG, Shape::String)
        .map_err(|source| BuildError::UserSig {
            name: obj.name_any(),
            source,
        })?
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let revision_time = match field::nested(&obj.data, USER_SIG_REVISION) {
        Ok(value) => Some(parse_time("revisionDatetime", value).map_err(|source| {
            BuildError::RevisionTime {
                name: obj.name_any(),
                source,
            }
        })?),
        Err(error) if error.is_not_found() => None,
        Err(source) => {
            return Err(BuildError::UserSig {
                name: obj.name_any(),
                source,
            })
        }
    };

    Ok(UserSig { tag, revision_time })
}

fn revision_time_window(req: &Map<String, Value>) -> Result<RevisionTimeWindow, TimestampError> {
    let min_revision_time = req
        .get("minRevisionDatetime")
        .map(|v| parse_time("minRevisionDatetime", v))
        .transpose()?;
    let max_revision_time = req
        .get("maxRevisionDatetime")
        .map(|v| parse_time("maxRevisionDatetime", v))
        .transpose()?;
    Ok(RevisionTimeWindow {
        min_revision_time,
        max_revision_time,
    })
}

fn parse_time(field: &str, value: &Value) -> Result<DateTime<Utc>, TimestampError> {
    let s = value.as_str().ok_or_else(|| TimestampError::NotAString {
        field: field.to_string(),
    })?;
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| TimestampError::Parse {
            field: field.to_string(),
            source,
        })
}
