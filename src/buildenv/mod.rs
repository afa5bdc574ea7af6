//! Build environment merging
//!
//! An explicit snapshot of environment variables and the merge that
//! appends newly computed flags to CFLAGS/CXXFLAGS without repeating
//! what an earlier run already added. Duplicate detection is by exact
//! token text: a computed -O3 joins an existing -O2 instead of replacing
//! it, and running the merge twice changes nothing.
//!
//! Nothing here touches the live process environment except
//! [`apply_to_process`], the one mutation point callers opt into right
//! before spawning build commands.

use std::collections::BTreeMap;
use std::env;

use crate::config::BuildConfig;
use crate::flags::{self, merge_override, FlagError, FlagTable};
use crate::tuning::{self, TuningRequest};

/// Environment variables that receive merged compiler flags
pub const FLAG_VARS: &[&str] = &["CFLAGS", "CXXFLAGS"];

/// Snapshot of environment variables relevant to a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    /// Empty environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the live process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped;
    /// the flag variables this tool works with are plain strings.
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| {
                let key = key.into_string().ok()?;
                let value = value.into_string().ok()?;
                Some((key, value))
            })
            .collect();
        Self { vars }
    }

    /// Add a variable (builder style)
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Iterate variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Append flags to one shell-quoted value, skipping exact duplicates
fn append_unique(current: &str, new_flags: &[String]) -> Result<String, FlagError> {
    let mut tokens = flags::split_flags(current)?;

    for flag in new_flags {
        if !tokens.iter().any(|token| token == flag) {
            tokens.push(flag.clone());
        }
    }

    flags::join_flags(&tokens)
}

/// Merge computed flags into the flag variables of an environment.
///
/// Existing tokens keep their order; new flags are appended in
/// composition order. A variable that is absent and would stay empty is
/// left absent. Malformed quoting in an existing value is an error,
/// since silently rewriting it would corrupt the user's flags.
pub fn merge_flags(env: &BuildEnv, new_flags: &[String]) -> Result<BuildEnv, FlagError> {
    let mut merged = env.clone();

    for var in FLAG_VARS {
        let current = env.get(var).unwrap_or("");
        let value = append_unique(current, new_flags)?;
        if !value.is_empty() || env.get(var).is_some() {
            merged.set(*var, value);
        }
    }

    Ok(merged)
}

/// Compute tuning flags for a request and merge them into an environment.
pub fn build_environment(
    request: &TuningRequest,
    config: &BuildConfig,
    env: &BuildEnv,
) -> Result<BuildEnv, FlagError> {
    let new_flags = tuning::build_cflags(request, config, env);
    merge_flags(env, &new_flags)
}

/// Effective flag tokens for one registry key.
///
/// The registry default merged with the environment value for the same
/// key, the environment winning per override key. This answers "what
/// does OPT mean right now" without involving the append path above.
pub fn effective_config_flags(
    config: &BuildConfig,
    env: &BuildEnv,
    key: &str,
) -> Result<Vec<String>, FlagError> {
    let base = FlagTable::from_tokens(flags::split_flags(config.get(key).unwrap_or(""))?);
    let overlay = FlagTable::from_tokens(flags::split_flags(env.get(key).unwrap_or(""))?);

    Ok(merge_override(base, overlay).tokens())
}

/// Write merged flag variables into the live process environment.
///
/// Only CFLAGS/CXXFLAGS are written; everything else in the snapshot is
/// left alone. Child processes spawned afterwards inherit the result.
pub fn apply_to_process(env: &BuildEnv) {
    for var in FLAG_VARS {
        if let Some(value) = env.get(var) {
            env::set_var(var, value);
        }
    }
}
