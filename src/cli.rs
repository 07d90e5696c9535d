use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "duckhunter",
    version,
    about = "Subdomain takeover checker for dangling DNS records",
    long_about = "DuckHunter resolves each subdomain and flags names that fail to resolve\nwhile pointing at a third-party provider known to allow takeovers."
)]
pub struct Args {
    /// File containing list of subdomains to check
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub list_file: Option<PathBuf>,

    /// Single subdomain to check (repeatable)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Vec<String>,

    /// Output file [default: report.txt]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<String>,

    /// Per-lookup timeout in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent lookups
    #[arg(short = 'j', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Overall deadline for the scan in seconds
    #[arg(long = "deadline", value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Nameservers to query instead of the system resolver (comma-separated ip:port)
    #[arg(short = 'r', long = "resolvers", value_name = "IP:PORT", value_delimiter = ',')]
    pub resolvers: Vec<String>,

    /// Match providers anywhere in the name instead of on label boundaries
    #[arg(long = "substring-match")]
    pub substring_match: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Silent mode (only the report file is written)
    #[arg(long = "silent", conflicts_with = "verbose")]
    pub silent: bool,
}

impl Args {
    pub fn has_input(&self) -> bool {
        !self.domain.is_empty() || self.list_file.is_some()
    }

    /// Read subdomains from stdin when nothing else was given and input is piped.
    pub fn use_stdin(&self) -> bool {
        !self.has_input() && !atty::is(atty::Stream::Stdin)
    }
}
