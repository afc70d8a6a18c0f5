use appprotect_controller_core::Subsystem;
use kube::api::{ApiResource, GroupVersionKind};
use std::fmt;

const APP_PROTECT_GROUP: &str = "appprotect.f5.com";
const APP_PROTECT_DOS_GROUP: &str = "appprotectdos.f5.com";
const VERSION: &str = "v1beta1";

/// The custom resource kinds indexed by the controller.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum ResourceKind {
    Policy,
    LogConf,
    UserSig,
    DosPolicy,
    DosLogConf,
}

// === impl ResourceKind ===

impl ResourceKind {
    pub const ALL: [Self; 5] = [
        Self::Policy,
        Self::LogConf,
        Self::UserSig,
        Self::DosPolicy,
        Self::DosLogConf,
    ];

    /// The kinds a controller running `subsystem` watches.
    pub fn watched_by(subsystem: Subsystem) -> &'static [Self] {
        match subsystem {
            Subsystem::AppProtect => &Self::ALL,
            Subsystem::AppProtectDos => &[Self::DosPolicy, Self::DosLogConf],
        }
    }

    pub fn group(self) -> &'static str {
        match self {
            Self::Policy | Self::LogConf | Self::UserSig => APP_PROTECT_GROUP,
            Self::DosPolicy | Self::DosLogConf => APP_PROTECT_DOS_GROUP,
        }
    }

    pub fn version(self) -> &'static str {
        VERSION
    }

    pub fn kind(self) -> &'static str {
        match self {
            Self::Policy => "APPolicy",
            Self::LogConf => "APLogConf",
            Self::UserSig => "APUserSig",
            Self::DosPolicy => "APDosPolicy",
            Self::DosLogConf => "APDosLogConf",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Policy => "appolicies",
            Self::LogConf => "aplogconfs",
            Self::UserSig => "apusersigs",
            Self::DosPolicy => "apdospolicies",
            Self::DosLogConf => "apdoslogconfs",
        }
    }

    /// The human-readable name used in validation and lookup errors.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Policy => "App Protect Policy",
            Self::LogConf => "App Protect Log Configuration",
            Self::UserSig => "App Protect User Signature",
            Self::DosPolicy => "App Protect Dos Policy",
            Self::DosLogConf => "App Protect Dos Log Configuration",
        }
    }

    pub fn gvk(self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), self.kind())
    }

    pub fn api_resource(self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.gvk(), self.plural())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
