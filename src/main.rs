//! cc-tune CLI
//!
//! Entry point for the `cc-tune` command-line tool.

use cc_tune::buildenv::{self, BuildEnv, FLAG_VARS};
use cc_tune::config::{BuildConfig, FLAG_KEYS};
use cc_tune::flags::join_flags;
use cc_tune::toolchain::{self, CompilerFamily};
use cc_tune::tuning::{self, TuningRequest};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::{self, Command};

/// Config file consulted when --config is not given
const DEFAULT_CONFIG_PATH: &str = "cc-tune.toml";

#[derive(Parser)]
#[command(name = "cc-tune")]
#[command(about = "Host-tuned compiler flag preparation", version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Path to build config file (default: cc-tune.toml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the computed tuning flags
    Flags {
        /// Sample profile to feed back into the build
        #[arg(long, default_value = "./test.afdo")]
        profile: PathBuf,

        /// Skip profile feedback entirely
        #[arg(long)]
        no_profile: bool,

        /// Skip host-native -march/-mtune probing
        #[arg(long)]
        no_native: bool,

        /// Skip profile-collection instrumentation flags
        #[arg(long)]
        no_instrument: bool,

        /// Compiler family (gcc, clang) instead of detecting from CC/CXX
        #[arg(long)]
        family: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print CFLAGS/CXXFLAGS with the tuning flags merged in
    Env {
        /// Sample profile to feed back into the build
        #[arg(long, default_value = "./test.afdo")]
        profile: PathBuf,

        /// Skip profile feedback entirely
        #[arg(long)]
        no_profile: bool,

        /// Skip host-native -march/-mtune probing
        #[arg(long)]
        no_native: bool,

        /// Skip profile-collection instrumentation flags
        #[arg(long)]
        no_instrument: bool,

        /// Compiler family (gcc, clang) instead of detecting from CC/CXX
        #[arg(long)]
        family: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show effective config values (registry merged with environment)
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run a build command with the merged flags exported
    Run {
        /// Sample profile to feed back into the build
        #[arg(long, default_value = "./test.afdo")]
        profile: PathBuf,

        /// Skip profile feedback entirely
        #[arg(long)]
        no_profile: bool,

        /// Skip host-native -march/-mtune probing
        #[arg(long)]
        no_native: bool,

        /// Skip profile-collection instrumentation flags
        #[arg(long)]
        no_instrument: bool,

        /// Compiler family (gcc, clang) instead of detecting from CC/CXX
        #[arg(long)]
        family: Option<String>,

        /// The build command to run (after --)
        #[arg(last = true, required = true)]
        cmd: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging(&cli.log_level);
    let config = load_config(cli.config);

    match cli.command {
        Commands::Flags {
            profile,
            no_profile,
            no_native,
            no_instrument,
            family,
            json,
        } => {
            let request = tuning_request(profile, no_profile, no_native, no_instrument, family);
            run_flags(&request, &config, json);
        }
        Commands::Env {
            profile,
            no_profile,
            no_native,
            no_instrument,
            family,
            json,
        } => {
            let request = tuning_request(profile, no_profile, no_native, no_instrument, family);
            run_env(&request, &config, json);
        }
        Commands::Config { json } => {
            run_config(&config, json);
        }
        Commands::Run {
            profile,
            no_profile,
            no_native,
            no_instrument,
            family,
            cmd,
        } => {
            let request = tuning_request(profile, no_profile, no_native, no_instrument, family);
            run_build(&request, &config, cmd);
        }
    }
}

fn init_logging(level: &str) {
    let log_level = level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to warn", level);
        log::LevelFilter::Warn
    });

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
}

fn load_config(config_path: Option<PathBuf>) -> BuildConfig {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        match BuildConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                process::exit(1);
            }
        }
    } else {
        BuildConfig::new()
    }
}

fn tuning_request(
    profile: PathBuf,
    no_profile: bool,
    no_native: bool,
    no_instrument: bool,
    family: Option<String>,
) -> TuningRequest {
    TuningRequest {
        profile: if no_profile { None } else { Some(profile) },
        instrument: !no_instrument,
        native: !no_native,
        family: family.map(|name| parse_family(&name)),
    }
}

fn parse_family(name: &str) -> CompilerFamily {
    match name.to_lowercase().as_str() {
        "gcc" | "g++" => CompilerFamily::Gcc,
        "clang" | "clang++" => CompilerFamily::Clang,
        _ => {
            eprintln!("Invalid family '{}'. Valid: gcc, clang", name);
            process::exit(1);
        }
    }
}

fn run_flags(request: &TuningRequest, config: &BuildConfig, json_output: bool) {
    let env = BuildEnv::from_process();

    // Resolve the family up front so the output can name it
    let family = request
        .family
        .unwrap_or_else(|| toolchain::resolve_family(config, &env));
    let request = TuningRequest {
        family: Some(family),
        ..request.clone()
    };

    let flags = tuning::build_cflags(&request, config, &env);

    if json_output {
        let output = serde_json::json!({
            "family": family.as_str(),
            "flags": flags,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        match join_flags(&flags) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_env(request: &TuningRequest, config: &BuildConfig, json_output: bool) {
    let env = BuildEnv::from_process();

    let merged = match buildenv::build_environment(request, config, &env) {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Error merging flags: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        let mut output = serde_json::Map::new();
        for var in FLAG_VARS {
            if let Some(value) = merged.get(var) {
                output.insert(var.to_string(), serde_json::Value::String(value.to_string()));
            }
        }
        match serde_json::to_string_pretty(&serde_json::Value::Object(output)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for var in FLAG_VARS {
            if let Some(value) = merged.get(var) {
                println!("{}={}", var, value);
            }
        }
    }
}

fn run_config(config: &BuildConfig, json_output: bool) {
    let env = BuildEnv::from_process();

    let command = toolchain::compiler_command(config, &env);
    let executable = toolchain::compiler_executable(&command);
    let family = toolchain::detect_family(&executable);
    let native = toolchain::probe_native(family, &executable);

    let mut effective = Vec::new();
    for key in FLAG_KEYS {
        match buildenv::effective_config_flags(config, &env, key) {
            Ok(tokens) => effective.push((*key, tokens)),
            Err(e) => {
                eprintln!("Error merging {}: {}", key, e);
                process::exit(1);
            }
        }
    }

    if json_output {
        let mut registry = serde_json::Map::new();
        for (key, value) in config.iter() {
            registry.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
        let mut vars = serde_json::Map::new();
        for (key, tokens) in &effective {
            vars.insert(key.to_string(), serde_json::json!(tokens));
        }
        let output = serde_json::json!({
            "compiler": {
                "command": command,
                "executable": executable,
                "family": family.as_str(),
            },
            "native": native,
            "registry": registry,
            "vars": vars,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Compiler: {} ({} family)", executable, family.as_str());
        match &native {
            Some(target) => println!("Native target: {}", target.flags().join(" ")),
            None => println!("Native target: (unavailable)"),
        }
        println!();
        for (key, tokens) in &effective {
            if tokens.is_empty() {
                println!("  {} = (unset)", key);
            } else {
                println!("  {} = {}", key, tokens.join(" "));
            }
        }
    }
}

fn run_build(request: &TuningRequest, config: &BuildConfig, cmd: Vec<String>) {
    let env = BuildEnv::from_process();

    let merged = match buildenv::build_environment(request, config, &env) {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Error merging flags: {}", e);
            process::exit(1);
        }
    };

    // The single opt-in mutation of the live environment; the child
    // inherits the merged flag variables.
    buildenv::apply_to_process(&merged);

    let status = Command::new(&cmd[0]).args(&cmd[1..]).status();

    match status {
        Ok(status) => process::exit(status.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("Failed to run '{}': {}", cmd[0], e);
            process::exit(127);
        }
    }
}
