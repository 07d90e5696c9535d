use crate::cli::Args;
use crate::types::{Config, DuckHunterError, MatchMode};
use log::warn;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub fn load_config(config_path_str: Option<&str>) -> Result<Config, DuckHunterError> {
    let mut config = Config::default();

    if let Some(path) = config_path_str {
        if Path::new(path).exists() {
            let contents = fs::read_to_string(path).map_err(|source| DuckHunterError::FileReadError {
                path: path.to_string(),
                source,
            })?;
            apply_toml(&mut config, &contents)?;
        } else {
            warn!("Config file {} not found, using defaults", path);
        }
    }

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;

    Ok(config)
}

/// Merges a TOML document into `config`; keys that are absent keep their value.
pub fn apply_toml(config: &mut Config, contents: &str) -> Result<(), DuckHunterError> {
    let toml_config: toml::Value = toml::from_str(contents)
        .map_err(|e| DuckHunterError::ConfigError(format!("Failed to parse config file: {}", e)))?;

    let Some(table) = toml_config.as_table() else {
        return Ok(());
    };

    if let Some(resolver) = table.get("resolver").and_then(|v| v.as_table()) {
        if let Some(secs) = resolver.get("timeout").and_then(|v| v.as_integer()) {
            config.resolver.timeout = Duration::from_secs(non_negative("resolver.timeout", secs)?);
        }
        if let Some(attempts) = resolver.get("attempts").and_then(|v| v.as_integer()) {
            config.resolver.attempts = non_negative("resolver.attempts", attempts)? as usize;
        }
        if let Some(nameservers) = resolver.get("nameservers").and_then(|v| v.as_array()) {
            config.resolver.nameservers = string_array(nameservers);
        }
        if let Some(system) = resolver.get("use_system_resolver").and_then(|v| v.as_bool()) {
            config.resolver.use_system_resolver = system;
        }
    }

    if let Some(scan) = table.get("scan").and_then(|v| v.as_table()) {
        if let Some(concurrency) = scan.get("concurrency").and_then(|v| v.as_integer()) {
            config.scan.concurrency = non_negative("scan.concurrency", concurrency)? as usize;
        }
        if let Some(secs) = scan.get("deadline").and_then(|v| v.as_integer()) {
            let secs = non_negative("scan.deadline", secs)?;
            config.scan.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
    }

    if let Some(output) = table.get("output").and_then(|v| v.as_table()) {
        if let Some(file) = output.get("file").and_then(|v| v.as_str()) {
            config.output.file = file.to_string();
        }
    }

    if let Some(signatures) = table.get("signatures").and_then(|v| v.as_table()) {
        if let Some(mode) = signatures.get("match_mode").and_then(|v| v.as_str()) {
            config.signatures.match_mode = mode.parse()?;
        }
        if let Some(providers) = signatures.get("no_records").and_then(|v| v.as_array()) {
            config.signatures.no_records = Some(string_array(providers));
        }
        if let Some(providers) = signatures.get("nxdomain").and_then(|v| v.as_array()) {
            config.signatures.nxdomain = Some(string_array(providers));
        }
    }

    Ok(())
}

pub fn apply_env_overrides<F>(config: &mut Config, var: F) -> Result<(), DuckHunterError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secs) = var("DUCKHUNTER_TIMEOUT") {
        let secs: u64 = secs
            .trim()
            .parse()
            .map_err(|e| DuckHunterError::ConfigError(format!("Invalid DUCKHUNTER_TIMEOUT: {}", e)))?;
        config.resolver.timeout = Duration::from_secs(secs);
    }
    if let Some(concurrency) = var("DUCKHUNTER_CONCURRENCY") {
        config.scan.concurrency = concurrency
            .trim()
            .parse()
            .map_err(|e| DuckHunterError::ConfigError(format!("Invalid DUCKHUNTER_CONCURRENCY: {}", e)))?;
    }
    if let Some(resolvers) = var("DUCKHUNTER_RESOLVERS") {
        config.resolver.nameservers = resolvers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(output) = var("DUCKHUNTER_OUTPUT") {
        config.output.file = output;
    }
    Ok(())
}

/// Command line flags take precedence over the file and the environment.
pub fn apply_args(config: &mut Config, args: &Args) {
    if let Some(output_file) = &args.output_file {
        config.output.file = output_file.clone();
    }
    if let Some(secs) = args.timeout {
        config.resolver.timeout = Duration::from_secs(secs);
    }
    if let Some(concurrency) = args.concurrency {
        config.scan.concurrency = concurrency;
    }
    if let Some(secs) = args.deadline {
        config.scan.deadline = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if !args.resolvers.is_empty() {
        config.resolver.nameservers = args.resolvers.clone();
    }
    if args.substring_match {
        config.signatures.match_mode = MatchMode::Substring;
    }
    config.output.verbose = args.verbose;
    config.output.silent = args.silent;
}

pub fn validate_config(config: &Config) -> Result<(), DuckHunterError> {
    if config.resolver.timeout.as_secs() == 0 {
        return Err(DuckHunterError::ConfigError("Timeout must be greater than 0".to_string()));
    }
    if config.resolver.attempts == 0 {
        return Err(DuckHunterError::ConfigError("Resolver attempts must be greater than 0".to_string()));
    }
    if config.scan.concurrency == 0 {
        return Err(DuckHunterError::ConfigError("Concurrency must be greater than 0".to_string()));
    }
    if config.output.file.trim().is_empty() {
        return Err(DuckHunterError::ConfigError("Output file must not be empty".to_string()));
    }
    for ns in &config.resolver.nameservers {
        ns.parse::<SocketAddr>()
            .map_err(|e| DuckHunterError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
    }
    Ok(())
}

fn non_negative(key: &str, value: i64) -> Result<u64, DuckHunterError> {
    u64::try_from(value).map_err(|_| DuckHunterError::ConfigError(format!("{} must not be negative", key)))
}

fn string_array(values: &[toml::Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}
