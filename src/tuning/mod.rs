//! Optimization flag assembly
//!
//! Builds the flag additions for a tuned build: host-native -march/-mtune
//! from probing the real compiler, debug-info instrumentation for sample
//! profilers, and the profile-feedback flag once a profile file exists.
//! The composition itself is pure; probing lives in a thin wrapper so
//! tests can exercise every combination without a compiler installed.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::buildenv::BuildEnv;
use crate::config::BuildConfig;
use crate::toolchain::{self, CompilerFamily, NativeTarget};

/// Debug-info flags GCC builds need for sample-profile collection
const GCC_INSTRUMENT_FLAGS: [&str; 2] = ["-g1", "-fno-eliminate-unused-debug-types"];

/// Debug-info flags Clang builds need for sample-profile collection
const CLANG_INSTRUMENT_FLAGS: [&str; 2] = ["-gmlt", "-fdebug-info-for-profiling"];

/// What to assemble tuning flags for
#[derive(Debug, Clone)]
pub struct TuningRequest {
    /// Sample profile to feed back into the build, if any
    pub profile: Option<PathBuf>,

    /// Emit debug-info instrumentation for profile collection
    pub instrument: bool,

    /// Tune for the host CPU via -march/-mtune
    pub native: bool,

    /// Compiler family override (None = detect from CC/CXX)
    pub family: Option<CompilerFamily>,
}

impl Default for TuningRequest {
    fn default() -> Self {
        Self {
            profile: None,
            instrument: true,
            native: true,
            family: None,
        }
    }
}

/// Instrumentation flag pair for a compiler family
pub fn instrumentation_flags(family: CompilerFamily) -> [&'static str; 2] {
    match family {
        CompilerFamily::Gcc => GCC_INSTRUMENT_FLAGS,
        CompilerFamily::Clang => CLANG_INSTRUMENT_FLAGS,
    }
}

/// Profile-feedback flag embedding the profile path
pub fn profile_use_flag(family: CompilerFamily, profile: &Path) -> String {
    match family {
        CompilerFamily::Gcc => format!("-fauto-profile={}", profile.display()),
        CompilerFamily::Clang => format!("-fprofile-sample-use={}", profile.display()),
    }
}

/// Assemble tuning flags from already-probed inputs.
///
/// Order is what the compiler sees: native target first, instrumentation
/// second, profile feedback last. A usable profile closes the list;
/// nothing may follow it. A profile that does not exist yet is noted and
/// skipped rather than failing the build.
pub fn compose_cflags(
    request: &TuningRequest,
    family: CompilerFamily,
    native: Option<&NativeTarget>,
) -> Vec<String> {
    let mut flags = Vec::new();

    if request.native {
        if let Some(target) = native {
            flags.extend(target.flags());
        }
    }

    if request.instrument {
        flags.extend(
            instrumentation_flags(family)
                .iter()
                .map(|flag| flag.to_string()),
        );
    }

    match request.profile {
        Some(ref profile) if profile.exists() => {
            // The compiler needs a stable absolute path; the profile may
            // have been named relative to some other working directory.
            let resolved = fs::canonicalize(profile).unwrap_or_else(|_| profile.clone());
            flags.push(profile_use_flag(family, &resolved));
            return flags;
        }
        Some(ref profile) => {
            info!(
                "Profile {} not found; building without profile feedback",
                profile.display()
            );
        }
        None => {
            debug!("No profile configured");
        }
    }

    flags
}

/// Assemble tuning flags, probing the toolchain as needed.
///
/// Resolves the compiler family from CC/CXX when the request leaves it
/// open, and probes the host CPU target when native tuning is on. Probe
/// failures degrade to fewer flags rather than errors.
pub fn build_cflags(request: &TuningRequest, config: &BuildConfig, env: &BuildEnv) -> Vec<String> {
    let command = toolchain::compiler_command(config, env);
    let executable = toolchain::compiler_executable(&command);
    let family = request
        .family
        .unwrap_or_else(|| toolchain::detect_family(&executable));

    let native = if request.native {
        let target = toolchain::probe_native(family, &executable);
        if target.is_none() {
            debug!("Native CPU probe produced nothing for '{}'", executable);
        }
        target
    } else {
        None
    };

    compose_cflags(request, family, native.as_ref())
}
