// src/resolver.rs
use crate::types::{DuckHunterError, LookupFailure, ResolutionOutcome, ResolverConfig};
use async_trait::async_trait;
use log::debug;
use std::net::SocketAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

/// Best-effort address lookup for a single name.
///
/// Implementations never fail: every error is folded into
/// [`ResolutionOutcome::Failed`] so one bad name cannot affect the batch.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, subdomain: &str) -> ResolutionOutcome;
}

pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, DuckHunterError> {
        let resolver = if config.use_system_resolver && config.nameservers.is_empty() {
            let (resolver_config, mut opts) = trust_dns_resolver::system_conf::read_system_conf()
                .map_err(|e| DuckHunterError::ResolutionError(format!("Failed to read system resolver config: {}", e)))?;
            Self::apply_opts(&mut opts, config);
            TokioAsyncResolver::tokio(resolver_config, opts)
        } else {
            let mut resolver_config = DnsResolverConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns)
                    .map_err(|e| DuckHunterError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
                resolver_config.add_name_server(NameServerConfig {
                    socket_addr,
                    protocol: Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: true,
                    bind_addr: None,
                });
            }

            let mut opts = ResolverOpts::default();
            Self::apply_opts(&mut opts, config);

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self { resolver })
    }

    fn apply_opts(opts: &mut ResolverOpts, config: &ResolverConfig) {
        opts.timeout = config.timeout;
        opts.attempts = config.attempts;
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn resolve(&self, subdomain: &str) -> ResolutionOutcome {
        if subdomain.trim().is_empty() {
            return ResolutionOutcome::failed(LookupFailure::LookupError("empty name".to_string()));
        }

        debug!("Resolving DNS for: {}", subdomain);
        match self.resolver.lookup_ip(subdomain).await {
            Ok(lookup) => {
                let addresses: Vec<_> = lookup.iter().collect();
                if addresses.is_empty() {
                    debug!("No addresses for: {}", subdomain);
                    ResolutionOutcome::failed(LookupFailure::NoRecords)
                } else {
                    debug!("Resolved: {} to IPs: {:?}", subdomain, addresses);
                    ResolutionOutcome::Resolved { addresses }
                }
            }
            Err(e) => {
                let reason = failure_from_error(&e);
                debug!("Failed to resolve {}: {}", subdomain, reason);
                ResolutionOutcome::failed(reason)
            }
        }
    }
}

/// Keeps the NXDOMAIN / empty-answer distinction the signature table relies on.
pub fn failure_from_error(error: &ResolveError) -> LookupFailure {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            failure_from_response_code(*response_code)
        }
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        _ => LookupFailure::LookupError(error.to_string()),
    }
}

fn failure_from_response_code(code: ResponseCode) -> LookupFailure {
    if code == ResponseCode::NXDomain {
        LookupFailure::NxDomain
    } else {
        LookupFailure::NoRecords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code_mapping() {
        assert_eq!(failure_from_response_code(ResponseCode::NXDomain), LookupFailure::NxDomain);
        assert_eq!(failure_from_response_code(ResponseCode::NoError), LookupFailure::NoRecords);
    }

    #[test]
    fn test_timeout_and_other_errors() {
        let timeout = ResolveError::from(ResolveErrorKind::Timeout);
        assert_eq!(failure_from_error(&timeout), LookupFailure::Timeout);

        let other = ResolveError::from(ResolveErrorKind::Message("boom"));
        assert!(matches!(failure_from_error(&other), LookupFailure::LookupError(msg) if msg.contains("boom")));
    }

    #[test]
    fn test_invalid_nameserver_is_config_error() {
        let config = ResolverConfig {
            nameservers: vec!["not-an-address".to_string()],
            use_system_resolver: false,
            ..Default::default()
        };
        assert!(matches!(DnsResolver::new(&config), Err(DuckHunterError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_empty_name_fails_without_lookup() {
        let config = ResolverConfig {
            nameservers: vec!["127.0.0.1:53".to_string()],
            use_system_resolver: false,
            ..Default::default()
        };
        let resolver = DnsResolver::new(&config).unwrap();
        let outcome = resolver.resolve("   ").await;
        assert!(matches!(
            outcome,
            ResolutionOutcome::Failed { reason: LookupFailure::LookupError(_) }
        ));
    }
}
