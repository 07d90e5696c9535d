// src/classifier.rs
use crate::signatures::SignatureTable;
use crate::types::{ClassificationResult, LookupFailure, ResolutionOutcome};
use std::sync::Arc;

/// Decides takeover exposure from a resolution outcome. Holds no mutable
/// state, so clones can be handed to every scan task.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: Arc<SignatureTable>,
}

impl Classifier {
    pub fn new(table: Arc<SignatureTable>) -> Self {
        Self { table }
    }

    pub fn classify(&self, subdomain: &str, outcome: &ResolutionOutcome) -> ClassificationResult {
        classify(&self.table, subdomain, outcome)
    }
}

pub fn classify(table: &SignatureTable, subdomain: &str, outcome: &ResolutionOutcome) -> ClassificationResult {
    let subdomain = subdomain.to_string();

    let reason = match outcome {
        ResolutionOutcome::Resolved { .. } => return ClassificationResult::NotVulnerable { subdomain },
        ResolutionOutcome::Failed { reason } => reason,
    };

    if matches!(reason, LookupFailure::Timeout | LookupFailure::Cancelled) {
        return ClassificationResult::NotReachable { subdomain };
    }

    // Failures without a signature (unrecognised resolver errors) fall through.
    let matched = reason
        .signature()
        .and_then(|signature| table.find_provider(&subdomain, signature).map(|provider| (signature, provider)));

    match matched {
        Some((signature, provider)) => ClassificationResult::Vulnerable {
            provider: provider.to_string(),
            subdomain,
            signature,
        },
        None => ClassificationResult::NotVulnerable { subdomain },
    }
}
