//! Environment Merge Tests
//!
//! Validates the CFLAGS/CXXFLAGS merge contract through the public API:
//! - Repeated runs never duplicate flags (idempotence)
//! - Duplicate detection is by exact text, so -O2 and -O3 coexist
//! - Quoting survives the round trip; malformed quoting is rejected
//!
//! These tests complement other test files:
//! - flag_pipeline.rs: flag assembly scenarios

use cc_tune::buildenv::{self, BuildEnv};
use cc_tune::config::BuildConfig;
use cc_tune::toolchain::CompilerFamily;
use cc_tune::tuning::TuningRequest;

/// A request that needs no compiler on the test machine
fn offline_request(family: CompilerFamily) -> TuningRequest {
    TuningRequest {
        profile: None,
        instrument: true,
        native: false,
        family: Some(family),
    }
}

// =============================================================================
// Merge Semantics
// =============================================================================

/// Test: first run appends the computed flags to existing CFLAGS
#[test]
fn test_first_run_appends_flags() {
    let env = BuildEnv::empty().with_var("CFLAGS", "-O2 -Wall");
    let request = offline_request(CompilerFamily::Gcc);

    let merged = buildenv::build_environment(&request, &BuildConfig::new(), &env).unwrap();

    assert_eq!(
        merged.get("CFLAGS"),
        Some("-O2 -Wall -g1 -fno-eliminate-unused-debug-types")
    );
    assert_eq!(
        merged.get("CXXFLAGS"),
        Some("-g1 -fno-eliminate-unused-debug-types")
    );
}

/// Test: a second run over the merged environment changes nothing
#[test]
fn test_second_run_adds_nothing() {
    let env = BuildEnv::empty().with_var("CFLAGS", "-O2");
    let request = offline_request(CompilerFamily::Clang);
    let config = BuildConfig::new();

    let once = buildenv::build_environment(&request, &config, &env).unwrap();
    let twice = buildenv::build_environment(&request, &config, &once).unwrap();

    assert_eq!(once, twice);
    assert_eq!(
        twice.get("CFLAGS"),
        Some("-O2 -gmlt -fdebug-info-for-profiling")
    );
}

/// Test: textually different optimization levels coexist after merging
#[test]
fn test_optimization_levels_coexist() {
    let env = BuildEnv::empty().with_var("CFLAGS", "-O2 -Wall");

    let merged = buildenv::merge_flags(&env, &["-O3".to_string()]).unwrap();

    assert_eq!(merged.get("CFLAGS"), Some("-O2 -Wall -O3"));
}

/// Test: merge touches only the flag variables
#[test]
fn test_merge_leaves_other_vars_alone() {
    let env = BuildEnv::empty()
        .with_var("CFLAGS", "-O2")
        .with_var("LDFLAGS", "-Wl,-z,now")
        .with_var("CC", "clang");
    let request = offline_request(CompilerFamily::Clang);

    let merged = buildenv::build_environment(&request, &BuildConfig::new(), &env).unwrap();

    assert_eq!(merged.get("LDFLAGS"), Some("-Wl,-z,now"));
    assert_eq!(merged.get("CC"), Some("clang"));
}

// =============================================================================
// Quoting
// =============================================================================

/// Test: quoted values survive repeated merging intact
#[test]
fn test_quoted_values_stable_across_runs() {
    let env = BuildEnv::empty().with_var("CFLAGS", "'-DMSG=hello world' -O2");
    let request = offline_request(CompilerFamily::Gcc);
    let config = BuildConfig::new();

    let once = buildenv::build_environment(&request, &config, &env).unwrap();
    let twice = buildenv::build_environment(&request, &config, &once).unwrap();

    assert_eq!(once, twice);

    // The spaced define is still one token after two round trips
    let tokens = cc_tune::flags::split_flags(twice.get("CFLAGS").unwrap()).unwrap();
    assert!(tokens.contains(&"-DMSG=hello world".to_string()));
}

/// Test: malformed quoting in the current value is a hard error
#[test]
fn test_malformed_quoting_rejected() {
    let env = BuildEnv::empty().with_var("CFLAGS", r#"-DBROKEN="unterminated"#);
    let request = offline_request(CompilerFamily::Gcc);

    let result = buildenv::build_environment(&request, &BuildConfig::new(), &env);

    assert!(result.is_err());
}

// =============================================================================
// Effective Config
// =============================================================================

/// Test: environment value overrides the registry default per key
#[test]
fn test_effective_config_env_overrides_registry() {
    let config = BuildConfig::with_vars([("OPT", "-O2 -g -fwrapv")]);
    let env = BuildEnv::empty().with_var("OPT", "-O3 -g0");

    let tokens = buildenv::effective_config_flags(&config, &env, "OPT").unwrap();

    assert_eq!(tokens, vec!["-O3", "-g0", "-fwrapv"]);
}

/// Test: registry defaults apply untouched when the environment is silent
#[test]
fn test_effective_config_registry_only() {
    let config = BuildConfig::with_vars([("CONFIGURE_CFLAGS", "-fPIC -O2")]);
    let env = BuildEnv::empty();

    let tokens = buildenv::effective_config_flags(&config, &env, "CONFIGURE_CFLAGS").unwrap();

    assert_eq!(tokens, vec!["-fPIC", "-O2"]);
}

// =============================================================================
// Process Application
// =============================================================================

/// Test: apply_to_process exports only the flag variables
#[test]
fn test_apply_to_process_exports_flag_vars() {
    let env = BuildEnv::empty()
        .with_var("CFLAGS", "-O2 -g1")
        .with_var("CC_TUNE_UNRELATED", "should-not-leak");

    buildenv::apply_to_process(&env);

    assert_eq!(std::env::var("CFLAGS").unwrap(), "-O2 -g1");
    assert!(std::env::var("CC_TUNE_UNRELATED").is_err());
}
