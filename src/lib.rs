//! cc-tune - Host-tuned compiler flag preparation
//!
//! This crate computes compiler flags for builds optimized on the machine
//! doing the building: host-native -march/-mtune resolved through the
//! real compiler, sample-profile instrumentation and feedback flags, and
//! an idempotent merge of the result into CFLAGS/CXXFLAGS.

pub mod buildenv;
pub mod config;
pub mod flags;
pub mod toolchain;
pub mod tuning;

pub use buildenv::{apply_to_process, build_environment, merge_flags, BuildEnv};
pub use config::{BuildConfig, ConfigError};
pub use flags::{merge_override, FlagError, FlagTable, OverrideKey};
pub use toolchain::{CompilerFamily, NativeTarget};
pub use tuning::TuningRequest;
