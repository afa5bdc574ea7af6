//! Native CPU target probing
//!
//! Asks the compiler what `-march=native` means on this machine. GCC
//! reports the resolved names through `-Q --help=target`; Clang leaks
//! the CPU name in its `-###` driver dry-run. Probing is best-effort:
//! any failure yields None and the build proceeds untuned.

use log::debug;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::process::Command;

use super::CompilerFamily;

/// Resolved host CPU names for -march and -mtune
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTarget {
    /// CPU name for -march
    pub arch: String,

    /// CPU name for -mtune
    pub tune: String,
}

impl NativeTarget {
    /// Render as compiler flags, -march before -mtune
    pub fn flags(&self) -> Vec<String> {
        vec![
            format!("-march={}", self.arch),
            format!("-mtune={}", self.tune),
        ]
    }
}

/// Probe the host CPU target as the given compiler resolves it.
///
/// Returns None when the compiler cannot be run or its output does not
/// carry the expected names.
pub fn probe_native(family: CompilerFamily, executable: &str) -> Option<NativeTarget> {
    match family {
        CompilerFamily::Gcc => probe_gcc(executable),
        CompilerFamily::Clang => probe_clang(executable),
    }
}

/// GCC prints resolved target options when asked for target help
fn probe_gcc(executable: &str) -> Option<NativeTarget> {
    let output = Command::new(executable)
        .args(["-march=native", "-Q", "--help=target"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            parse_gcc_target_help(&String::from_utf8_lossy(&output.stdout))
        }
        _ => {
            debug!("Native target probe via '{}' failed", executable);
            None
        }
    }
}

/// Clang's -### dry-run shows the cc1 invocation on stderr
fn probe_clang(executable: &str) -> Option<NativeTarget> {
    let output = Command::new(executable)
        .args(["-march=native", "-###", "-c", "-x", "c", "/dev/null"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            parse_clang_driver_output(&String::from_utf8_lossy(&output.stderr))
        }
        _ => {
            debug!("Native target probe via '{}' failed", executable);
            None
        }
    }
}

/// Parse resolved -march/-mtune names out of `gcc -Q --help=target` output.
///
/// Both names must be present; a partial answer is treated as no answer.
fn parse_gcc_target_help(stdout: &str) -> Option<NativeTarget> {
    let march = Regex::new(r"-march=\s+(\S+)").ok()?;
    let mtune = Regex::new(r"-mtune=\s+(\S+)").ok()?;

    let arch = march.captures(stdout)?.get(1)?.as_str().to_string();
    let tune = mtune.captures(stdout)?.get(1)?.as_str().to_string();

    Some(NativeTarget { arch, tune })
}

/// Pull the -target-cpu value out of a `clang -###` dry-run.
///
/// Clang resolves native to a single CPU name, used for arch and tune
/// alike.
fn parse_clang_driver_output(stderr: &str) -> Option<NativeTarget> {
    let target_cpu = Regex::new(r#""-target-cpu"\s+"([^"]+)""#).ok()?;
    let cpu = target_cpu.captures(stderr)?.get(1)?.as_str().to_string();

    Some(NativeTarget {
        arch: cpu.clone(),
        tune: cpu,
    })
}
