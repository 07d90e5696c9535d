// src/lib.rs
pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod resolver;
pub mod signatures;
pub mod types;
pub mod utils;

pub use classifier::{classify, Classifier};
pub use cli::Args;
pub use engine::{CancellationToken, ScanEngine, ScanOptions};
pub use resolver::{DnsResolver, NameResolver};
pub use signatures::SignatureTable;
pub use types::{
    ClassificationResult, Config, DuckHunterError, LookupFailure, MatchMode, ResolutionOutcome, ScanReport,
    ScanStats, Signature,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
