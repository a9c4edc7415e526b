use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Which external backend a scan is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BackendKind {
    /// One native scanner invocation: `<scanner> <code> <target>`
    NativeSingle,
    /// An ordered chain of native scanner invocations against one target
    NativeComposite,
    /// The advanced scanner script: `<interpreter> <script> <target>`
    ScriptBased,
}

impl BackendKind {
    /// Short identifier used in ledger keys and artifact names
    pub fn slug(&self) -> &'static str {
        match self {
            BackendKind::NativeSingle | BackendKind::NativeComposite => "native",
            BackendKind::ScriptBased => "script",
        }
    }

    /// Display label for tables and panels
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::NativeSingle | BackendKind::NativeComposite => "Native",
            BackendKind::ScriptBased => "Script",
        }
    }
}

/// What kind of target a composite scan was declared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    Domain,
    Ip,
    Username,
}

impl TargetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetClass::Domain => "domain",
            TargetClass::Ip => "ip",
            TargetClass::Username => "username",
        }
    }
}

/// Closed table of every scan keyword the terminal accepts.
///
/// Each variant pins down the backend kind and, for native scans, the
/// subcommand code handed to the scanner binary. Session-management
/// keywords (help/session/export/clear/exit) are not scans and live in
/// the interpreter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScanCommand {
    // script-based advanced scanner
    Advanced,
    UsernameSearch,
    // native single-target lookups
    GithubUser,
    RedditUser,
    HackerNewsUser,
    StackOverflowUser,
    DnsLookup,
    Whois,
    SslCert,
    Wayback,
    IpLocate,
    EmailBreach,
    Bitcoin,
    // composite multi-step scans
    FullDomainScan,
    FullUsernameScan,
}

impl ScanCommand {
    pub const ALL: [ScanCommand; 15] = [
        ScanCommand::Advanced,
        ScanCommand::UsernameSearch,
        ScanCommand::GithubUser,
        ScanCommand::RedditUser,
        ScanCommand::HackerNewsUser,
        ScanCommand::StackOverflowUser,
        ScanCommand::DnsLookup,
        ScanCommand::Whois,
        ScanCommand::SslCert,
        ScanCommand::Wayback,
        ScanCommand::IpLocate,
        ScanCommand::EmailBreach,
        ScanCommand::Bitcoin,
        ScanCommand::FullDomainScan,
        ScanCommand::FullUsernameScan,
    ];

    pub fn parse(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_ascii_lowercase();
        Self::ALL.into_iter().find(|cmd| cmd.keyword() == keyword)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ScanCommand::Advanced => "adv",
            ScanCommand::UsernameSearch => "wtnk",
            ScanCommand::GithubUser => "ghub",
            ScanCommand::RedditUser => "rddt",
            ScanCommand::HackerNewsUser => "hnws",
            ScanCommand::StackOverflowUser => "sovf",
            ScanCommand::DnsLookup => "dlkp",
            ScanCommand::Whois => "whis",
            ScanCommand::SslCert => "ssll",
            ScanCommand::Wayback => "wbck",
            ScanCommand::IpLocate => "iplc",
            ScanCommand::EmailBreach => "embp",
            ScanCommand::Bitcoin => "btcn",
            ScanCommand::FullDomainScan => "fscn",
            ScanCommand::FullUsernameScan => "ascn",
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self {
            ScanCommand::Advanced | ScanCommand::UsernameSearch => BackendKind::ScriptBased,
            ScanCommand::FullDomainScan | ScanCommand::FullUsernameScan => {
                BackendKind::NativeComposite
            }
            _ => BackendKind::NativeSingle,
        }
    }

    /// Subcommand string handed to the native scanner binary.
    /// None for script-based and composite commands.
    pub fn native_code(&self) -> Option<&'static str> {
        match self.backend_kind() {
            BackendKind::NativeSingle => Some(self.keyword()),
            _ => None,
        }
    }

    /// Declared target type of a composite scan.
    pub fn target_class(&self) -> Option<TargetClass> {
        match self {
            ScanCommand::FullDomainScan => Some(TargetClass::Domain),
            ScanCommand::FullUsernameScan => Some(TargetClass::Username),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScanCommand::Advanced => "Advanced OSINT scan",
            ScanCommand::UsernameSearch => "Username search across platforms",
            ScanCommand::GithubUser => "GitHub user information",
            ScanCommand::RedditUser => "Reddit user information",
            ScanCommand::HackerNewsUser => "Hacker News user information",
            ScanCommand::StackOverflowUser => "Stack Overflow user information",
            ScanCommand::DnsLookup => "DNS lookup and records",
            ScanCommand::Whois => "WHOIS domain information",
            ScanCommand::SslCert => "SSL certificate information",
            ScanCommand::Wayback => "Wayback Machine archived URLs",
            ScanCommand::IpLocate => "IP address geolocation",
            ScanCommand::EmailBreach => "Email breach check",
            ScanCommand::Bitcoin => "Bitcoin address information",
            ScanCommand::FullDomainScan => "Full comprehensive domain scan",
            ScanCommand::FullUsernameScan => "Full comprehensive username scan",
        }
    }

    pub fn usage(&self) -> String {
        let arg = match self {
            ScanCommand::Advanced
            | ScanCommand::UsernameSearch
            | ScanCommand::GithubUser
            | ScanCommand::RedditUser
            | ScanCommand::HackerNewsUser
            | ScanCommand::FullUsernameScan => "<username>",
            ScanCommand::StackOverflowUser => "<userid>",
            ScanCommand::DnsLookup
            | ScanCommand::Whois
            | ScanCommand::SslCert
            | ScanCommand::Wayback
            | ScanCommand::FullDomainScan => "<domain>",
            ScanCommand::IpLocate => "<ip_address>",
            ScanCommand::EmailBreach => "<email>",
            ScanCommand::Bitcoin => "<address>",
        };
        format!("{} {}", self.keyword(), arg)
    }
}

/// One accepted scan line, ready for dispatch. Immutable, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub command: ScanCommand,
    pub target: String,
}

impl ScanRequest {
    pub fn new(command: ScanCommand, target: impl Into<String>) -> Self {
        Self {
            command,
            target: target.into(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.command.backend_kind()
    }
}

/// Terminal state of one backend invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    Failure,
    Timeout,
    NotFound,
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "SUCCESS",
            OutcomeStatus::Failure => "FAILED",
            OutcomeStatus::Timeout => "TIMEOUT",
            OutcomeStatus::NotFound => "NOT FOUND",
        }
    }
}

/// Result of one completed backend invocation, as recorded in the
/// session ledger. Never mutated after insertion.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub backend: BackendKind,
    pub command: String,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub output: String,
    pub status: OutcomeStatus,
    pub error: Option<String>,
    pub saved_to: Option<PathBuf>,
}

impl ScanOutcome {
    /// Ledger key: a re-run with the same key replaces the prior entry.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.backend.slug(), self.command, self.target)
    }

    pub fn succeeded(&self) -> bool {
        self.status.is_success()
    }
}
