//! Compiler family detection
//!
//! Resolves the compiler command from CXX/CC (environment first, then
//! build config, then plain gcc) and classifies it by its --version
//! banner. CC values in the wild carry launcher prefixes like
//! `ccache gcc` and trailing default flags, so only the bare executable
//! token is inspected.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::buildenv::BuildEnv;
use crate::config::{self, BuildConfig};
use crate::flags;

/// Compiler when neither the environment nor the config names one
const DEFAULT_COMPILER: &str = "gcc";

/// Launcher executables that may prefix the real compiler in CC/CXX
const COMPILER_LAUNCHERS: &[&str] = &["ccache", "sccache", "distcc", "icecc"];

/// Version banner substrings identifying Clang-family compilers
const CLANG_MARKERS: &[&str] = &["clang", "apple llvm"];

/// Version banner substrings identifying GCC-family compilers
const GCC_MARKERS: &[&str] = &["gcc", "g++"];

/// Flag dialect a compiler accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerFamily {
    Gcc,
    Clang,
}

impl CompilerFamily {
    /// Short name for display and serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
        }
    }
}

/// Pick the compiler command for this build.
///
/// Precedence: environment CXX, environment CC, config CXX, config CC,
/// then plain gcc.
pub fn compiler_command(config: &BuildConfig, env: &BuildEnv) -> String {
    for key in [config::KEY_CXX, config::KEY_CC] {
        if let Some(value) = env.get(key) {
            if !value.trim().is_empty() {
                return value.to_string();
            }
        }
    }

    for key in [config::KEY_CXX, config::KEY_CC] {
        if let Some(value) = config.get(key) {
            if !value.trim().is_empty() {
                return value.to_string();
            }
        }
    }

    DEFAULT_COMPILER.to_string()
}

/// Extract the bare compiler executable from a CC/CXX-style command.
///
/// The command is split with shell quoting rules (malformed quoting
/// degrades to whitespace splitting rather than an error), leading
/// launcher tokens are skipped, and trailing flags are ignored, so
/// `ccache gcc -pipe` resolves to `gcc`.
pub fn compiler_executable(command: &str) -> String {
    let tokens = flags::split_flags(command)
        .unwrap_or_else(|_| command.split_whitespace().map(str::to_string).collect());

    tokens
        .into_iter()
        .find(|token| !is_launcher(token))
        .unwrap_or_else(|| DEFAULT_COMPILER.to_string())
}

/// Whether a token names a known compiler launcher
fn is_launcher(token: &str) -> bool {
    Path::new(token)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| COMPILER_LAUNCHERS.contains(&stem))
        .unwrap_or(false)
}

/// Locate an executable, accepting both bare names and explicit paths.
fn find_executable(executable: &str) -> Option<PathBuf> {
    let path = Path::new(executable);
    if path.components().count() > 1 {
        return path.exists().then(|| path.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(executable))
        .find(|candidate| candidate.exists())
}

/// Classify a compiler executable as GCC- or Clang-family.
///
/// An executable that cannot be found is assumed GCC-family without being
/// invoked; a failing or unrecognized --version likewise falls back to
/// GCC-family. This never returns an error.
pub fn detect_family(executable: &str) -> CompilerFamily {
    if find_executable(executable).is_none() {
        debug!(
            "Compiler '{}' not found on PATH, assuming GCC family",
            executable
        );
        return CompilerFamily::Gcc;
    }

    let output = Command::new(executable).arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            // Some drivers print the banner on stderr
            let mut banner = String::from_utf8_lossy(&output.stdout).to_string();
            banner.push_str(&String::from_utf8_lossy(&output.stderr));
            family_from_banner(&banner)
        }
        _ => {
            debug!("'{} --version' failed, assuming GCC family", executable);
            CompilerFamily::Gcc
        }
    }
}

/// Classify from --version output.
///
/// Clang banners routinely mention GCC compatibility, so Clang markers
/// are checked first.
fn family_from_banner(banner: &str) -> CompilerFamily {
    let banner = banner.to_lowercase();

    if CLANG_MARKERS.iter().any(|marker| banner.contains(marker)) {
        return CompilerFamily::Clang;
    }

    if !GCC_MARKERS.iter().any(|marker| banner.contains(marker)) {
        warn!("Unrecognized compiler version banner, assuming GCC family");
    }

    CompilerFamily::Gcc
}

/// Resolve the build compiler and classify its family in one step.
pub fn resolve_family(config: &BuildConfig, env: &BuildEnv) -> CompilerFamily {
    let command = compiler_command(config, env);
    let executable = compiler_executable(&command);
    detect_family(&executable)
}
