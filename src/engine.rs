// src/engine.rs
use crate::classifier::Classifier;
use crate::output::console_line;
use crate::resolver::{DnsResolver, NameResolver};
use crate::signatures::SignatureTable;
use crate::types::{ClassificationResult, Config, DuckHunterError, LookupFailure, ResolutionOutcome, ScanReport, ScanStats};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum number of lookups in flight.
    pub concurrency: usize,
    pub lookup_timeout: Duration,
    /// Overall budget for the whole batch.
    pub deadline: Option<Duration>,
    pub show_progress: bool,
    /// Print a colored line per classified subdomain.
    pub print_results: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 100,
            lookup_timeout: Duration::from_secs(5),
            deadline: None,
            show_progress: false,
            print_results: false,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.scan.concurrency,
            lookup_timeout: config.resolver.timeout,
            deadline: config.scan.deadline,
            show_progress: !config.output.verbose && !config.output.silent && atty::is(atty::Stream::Stderr),
            print_results: !config.output.silent,
        }
    }
}

/// Shared stop signal for every task of a scan. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender: Arc::new(sender) }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

pub struct ScanEngine {
    resolver: Arc<dyn NameResolver>,
    classifier: Classifier,
    options: ScanOptions,
    cancel: CancellationToken,
}

impl ScanEngine {
    pub fn new(
        resolver: Arc<dyn NameResolver>,
        table: Arc<SignatureTable>,
        options: ScanOptions,
    ) -> Result<Self, DuckHunterError> {
        if options.concurrency == 0 {
            return Err(DuckHunterError::ConfigError("Concurrency must be greater than 0".to_string()));
        }
        if options.lookup_timeout.is_zero() {
            return Err(DuckHunterError::ConfigError("Lookup timeout must be greater than 0".to_string()));
        }

        Ok(Self {
            resolver,
            classifier: Classifier::new(table),
            options,
            cancel: CancellationToken::new(),
        })
    }

    /// Builds an engine backed by real DNS lookups.
    pub fn from_config(config: &Config) -> Result<Self, DuckHunterError> {
        let resolver = Arc::new(DnsResolver::new(&config.resolver)?);
        let table = Arc::new(SignatureTable::from_config(&config.signatures));
        if table.is_empty() {
            warn!("Signature table is empty, no subdomain can be reported as vulnerable");
        }
        info!(
            "Loaded {} provider signatures ({:?} matching)",
            table.len(),
            table.match_mode()
        );
        Self::new(resolver, table, ScanOptions::from_config(config))
    }

    /// Shares an externally owned token, e.g. one token across several engines.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves and classifies every subdomain, returning exactly one result
    /// per input in completion order.
    pub async fn run(&self, subdomains: Vec<String>) -> ScanReport {
        let total = subdomains.len();
        info!(
            "Starting scan of {} subdomains (concurrency {}, timeout {:?})",
            total, self.options.concurrency, self.options.lookup_timeout
        );
        let start_time = Instant::now();

        let deadline_timer = self.options.deadline.map(|deadline| {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                warn!("Scan deadline of {:?} reached, abandoning outstanding lookups", deadline);
                cancel.cancel();
            })
        });

        let progress = self.progress_bar(total as u64);
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));
        let mut tasks = FuturesUnordered::new();

        for subdomain in subdomains {
            let handle = tokio::spawn(scan_one(
                self.resolver.clone(),
                self.classifier.clone(),
                semaphore.clone(),
                self.cancel.clone(),
                self.options.lookup_timeout,
                subdomain.clone(),
            ));
            tasks.push(async move { (subdomain, handle.await) });
        }

        let mut results = Vec::with_capacity(total);
        while let Some((subdomain, joined)) = tasks.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Scan task for {} failed: {}", subdomain, e);
                    ClassificationResult::NotReachable { subdomain }
                }
            };
            progress.suspend(|| {
                log_result(&result);
                if self.options.print_results {
                    println!("{}", console_line(&result));
                }
            });
            progress.inc(1);
            results.push(result);
        }
        progress.finish_and_clear();

        if let Some(timer) = deadline_timer {
            timer.abort();
        }

        let stats = ScanStats::from_results(&results, start_time.elapsed());
        info!(
            "Scan completed: {} vulnerable, {} not vulnerable, {} not reachable out of {} in {:.2}s",
            stats.vulnerable,
            stats.not_vulnerable,
            stats.not_reachable,
            stats.total,
            stats.duration.as_secs_f64()
        );

        ScanReport {
            results,
            stats,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(len);
        bar.set_style(style);
        bar.set_message("resolving");
        bar
    }
}

async fn scan_one(
    resolver: Arc<dyn NameResolver>,
    classifier: Classifier,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    lookup_timeout: Duration,
    subdomain: String,
) -> ClassificationResult {
    if cancel.is_cancelled() {
        return ClassificationResult::NotReachable { subdomain };
    }

    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ClassificationResult::NotReachable { subdomain },
        permit = semaphore.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return ClassificationResult::NotReachable { subdomain },
        },
    };

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => ResolutionOutcome::failed(LookupFailure::Cancelled),
        outcome = tokio::time::timeout(lookup_timeout, resolver.resolve(&subdomain)) => {
            outcome.unwrap_or_else(|_| ResolutionOutcome::failed(LookupFailure::Timeout))
        }
    };

    // A lookup that finished before cancellation keeps its real verdict.
    classifier.classify(&subdomain, &outcome)
}

fn log_result(result: &ClassificationResult) {
    match result {
        ClassificationResult::Vulnerable { subdomain, provider, signature } => {
            debug!("Vulnerability found for: {} ({}, {})", subdomain, provider, signature);
        }
        ClassificationResult::NotVulnerable { subdomain } => {
            debug!("No vulnerability found for: {}", subdomain);
        }
        ClassificationResult::NotReachable { subdomain } => {
            debug!("Not reachable: {}", subdomain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NxResolver;

    #[async_trait]
    impl NameResolver for NxResolver {
        async fn resolve(&self, _subdomain: &str) -> ResolutionOutcome {
            ResolutionOutcome::failed(LookupFailure::NxDomain)
        }
    }

    fn engine(options: ScanOptions) -> Result<ScanEngine, DuckHunterError> {
        ScanEngine::new(Arc::new(NxResolver), Arc::new(SignatureTable::default()), options)
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let options = ScanOptions { concurrency: 0, ..Default::default() };
        assert!(matches!(engine(options), Err(DuckHunterError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let options = ScanOptions { lookup_timeout: Duration::ZERO, ..Default::default() };
        assert!(matches!(engine(options), Err(DuckHunterError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_cancellation_token_wakes_waiters() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(token.is_cancelled());
        // already-cancelled tokens resolve immediately
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = engine(ScanOptions::default()).unwrap().run(Vec::new()).await;
        assert!(report.results.is_empty());
        assert_eq!(report.stats.total, 0);
    }

    #[tokio::test]
    async fn test_stats_match_results() {
        let names = vec![
            "a.herokuapp.com".to_string(),
            "b.example.com".to_string(),
            "c.cloudapp.net".to_string(),
        ];
        let report = engine(ScanOptions::default()).unwrap().run(names).await;
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.vulnerable, 2);
        assert_eq!(report.stats.not_vulnerable, 1);
        assert_eq!(report.stats.not_reachable, 0);
    }
}
