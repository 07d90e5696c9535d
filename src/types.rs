// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_REPORT_FILE: &str = "report.txt";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub signatures: SignatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub timeout: Duration,
    pub attempts: usize,
    pub nameservers: Vec<String>,
    pub use_system_resolver: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 1,
            nameservers: Vec::new(),
            use_system_resolver: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub concurrency: usize,
    pub deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 100,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub file: String,
    pub verbose: bool,
    pub silent: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_REPORT_FILE.to_string(),
            verbose: false,
            silent: false,
        }
    }
}

/// Provider overrides read from the `[signatures]` config section.
/// `None` keeps the built-in provider list for that signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureConfig {
    pub match_mode: MatchMode,
    pub no_records: Option<Vec<String>>,
    pub nxdomain: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Provider must sit on a DNS label boundary at the end of the name.
    #[default]
    Suffix,
    /// Raw, case-sensitive containment anywhere in the name.
    Substring,
}

impl std::str::FromStr for MatchMode {
    type Err = DuckHunterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "suffix" => Ok(MatchMode::Suffix),
            "substring" => Ok(MatchMode::Substring),
            other => Err(DuckHunterError::ConfigError(format!("Unknown match mode: {}", other))),
        }
    }
}

/// Failure signature used as the key of the vulnerability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signature {
    NoRecords,
    NxDomain,
}

impl Signature {
    pub const ALL: [Signature; 2] = [Signature::NoRecords, Signature::NxDomain];

    pub fn label(&self) -> &'static str {
        match self {
            Signature::NoRecords => "No A records found",
            Signature::NxDomain => "NXDOMAIN",
        }
    }

    /// Finds the signature whose label is contained in a free-text reason.
    pub fn from_reason(reason: &str) -> Option<Signature> {
        Self::ALL.into_iter().find(|sig| reason.contains(sig.label()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupFailure {
    /// The name exists but has no address records.
    NoRecords,
    /// The name does not exist.
    NxDomain,
    Timeout,
    Cancelled,
    LookupError(String),
}

impl LookupFailure {
    pub fn from_reason(reason: &str) -> Self {
        match Signature::from_reason(reason) {
            Some(Signature::NoRecords) => LookupFailure::NoRecords,
            Some(Signature::NxDomain) => LookupFailure::NxDomain,
            None => LookupFailure::LookupError(reason.to_string()),
        }
    }

    pub fn signature(&self) -> Option<Signature> {
        match self {
            LookupFailure::NoRecords => Some(Signature::NoRecords),
            LookupFailure::NxDomain => Some(Signature::NxDomain),
            _ => None,
        }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NoRecords => f.write_str(Signature::NoRecords.label()),
            LookupFailure::NxDomain => f.write_str(Signature::NxDomain.label()),
            LookupFailure::Timeout => f.write_str("lookup timed out"),
            LookupFailure::Cancelled => f.write_str("lookup cancelled"),
            LookupFailure::LookupError(msg) => write!(f, "lookup error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Resolved { addresses: Vec<IpAddr> },
    Failed { reason: LookupFailure },
}

impl ResolutionOutcome {
    pub fn failed(reason: LookupFailure) -> Self {
        ResolutionOutcome::Failed { reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationResult {
    NotReachable {
        subdomain: String,
    },
    Vulnerable {
        subdomain: String,
        provider: String,
        signature: Signature,
    },
    NotVulnerable {
        subdomain: String,
    },
}

impl ClassificationResult {
    pub fn subdomain(&self) -> &str {
        match self {
            ClassificationResult::NotReachable { subdomain }
            | ClassificationResult::Vulnerable { subdomain, .. }
            | ClassificationResult::NotVulnerable { subdomain } => subdomain,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self, ClassificationResult::Vulnerable { .. })
    }
}

/// Renders the report line for this result.
impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationResult::NotReachable { subdomain } => {
                write!(f, "[Not Reachable] {}", subdomain)
            }
            ClassificationResult::Vulnerable { subdomain, provider, signature } => {
                write!(f, "[Vulnerable] {} is vulnerable under {} ({})", subdomain, provider, signature)
            }
            ClassificationResult::NotVulnerable { subdomain } => {
                write!(f, "[Not Vulnerable] {}", subdomain)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total: usize,
    pub vulnerable: usize,
    pub not_vulnerable: usize,
    pub not_reachable: usize,
    pub duration: Duration,
}

impl ScanStats {
    pub fn from_results(results: &[ClassificationResult], duration: Duration) -> Self {
        let mut stats = ScanStats {
            total: results.len(),
            duration,
            ..Default::default()
        };
        for result in results {
            match result {
                ClassificationResult::NotReachable { .. } => stats.not_reachable += 1,
                ClassificationResult::Vulnerable { .. } => stats.vulnerable += 1,
                ClassificationResult::NotVulnerable { .. } => stats.not_vulnerable += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Results in completion order, one per scanned subdomain.
    pub results: Vec<ClassificationResult>,
    pub stats: ScanStats,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum DuckHunterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read {path}: {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    ReportWriteError(String),

    #[error("Resolution error: {0}")]
    ResolutionError(String),
}
