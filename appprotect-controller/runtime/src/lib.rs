#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use appprotect_controller_core as core;
pub use appprotect_controller_k8s_api as k8s;
pub use appprotect_controller_k8s_index as index;

mod args;
mod reconcile;

pub use self::args::Args;
