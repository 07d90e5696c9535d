// src/signatures.rs
use crate::types::{MatchMode, Signature, SignatureConfig};

const NO_RECORDS_PROVIDERS: &[&str] = &[
    "digitalocean.com",
    "aws.amazon.com",
    "github.io",
    "herokuapp.com",
    "pantheon.io",
    "bitbucket.io",
    "fastly.net",
    "ghost.io",
    "wordpress.com",
];

// Deleted Heroku apps answer NXDOMAIN, so herokuapp.com appears in both lists.
const NXDOMAIN_PROVIDERS: &[&str] = &[
    "unconfigured.herokudns.com",
    "herokuapp.com",
    "namecheap.com",
    "myshopify.com",
    "cloudapp.net",
    "smugmug.com",
    "cargo.site",
    "pageserve.co",
    "domains.goog",
    "azurewebsites.net",
];

/// Maps each failure signature to the providers whose dangling names
/// produce it. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureTable {
    entries: Vec<(Signature, Vec<String>)>,
    mode: MatchMode,
}

impl Default for SignatureTable {
    fn default() -> Self {
        let to_owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self::new(
            vec![
                (Signature::NoRecords, to_owned(NO_RECORDS_PROVIDERS)),
                (Signature::NxDomain, to_owned(NXDOMAIN_PROVIDERS)),
            ],
            MatchMode::default(),
        )
    }
}

impl SignatureTable {
    pub fn new(entries: Vec<(Signature, Vec<String>)>, mode: MatchMode) -> Self {
        Self { entries, mode }
    }

    pub fn from_config(config: &SignatureConfig) -> Self {
        let mut table = Self::default();
        table.mode = config.match_mode;
        if let Some(providers) = &config.no_records {
            table = table.with_providers(Signature::NoRecords, providers.clone());
        }
        if let Some(providers) = &config.nxdomain {
            table = table.with_providers(Signature::NxDomain, providers.clone());
        }
        table
    }

    /// Replaces the provider list of one signature, keeping its position.
    pub fn with_providers(mut self, signature: Signature, providers: Vec<String>) -> Self {
        let providers: Vec<String> = providers
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        match self.entries.iter_mut().find(|(sig, _)| *sig == signature) {
            Some(entry) => entry.1 = providers,
            None => self.entries.push((signature, providers)),
        }
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn match_mode(&self) -> MatchMode {
        self.mode
    }

    pub fn providers(&self, signature: Signature) -> &[String] {
        self.entries
            .iter()
            .find(|(sig, _)| *sig == signature)
            .map(|(_, providers)| providers.as_slice())
            .unwrap_or(&[])
    }

    /// First provider of `signature` (in declaration order) that matches `subdomain`.
    pub fn find_provider(&self, subdomain: &str, signature: Signature) -> Option<&str> {
        self.providers(signature)
            .iter()
            .find(|provider| matches_provider(subdomain, provider, self.mode))
            .map(|provider| provider.as_str())
    }

    /// Total number of (signature, provider) pairs.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, providers)| providers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn matches_provider(subdomain: &str, provider: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Substring => subdomain.contains(provider),
        MatchMode::Suffix => {
            let name = subdomain.trim_end_matches('.').to_ascii_lowercase();
            let provider = provider.trim_end_matches('.').to_ascii_lowercase();
            if provider.is_empty() {
                return false;
            }
            name == provider || name.ends_with(&format!(".{}", provider))
        }
    }
}
