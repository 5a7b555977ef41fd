//! Clap derive structures for the `lxgate` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lxgate -- CLI for the LX sensor security gateway
#[derive(Debug, Parser)]
#[command(
    name = "lxgate",
    version,
    about = "Monitor and manage an LX sensor security gateway from the command line",
    long_about = "A CLI for the LX sensor security gateway.\n\n\
        Streams intrusion alerts over WebSocket, browses and exports the\n\
        audit log, runs attack simulations, and inspects sensor telemetry.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "LXGATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway base URL (overrides profile)
    #[arg(long, short = 'g', env = "LXGATE_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Bearer token for authenticated gateways
    #[arg(long, env = "LXGATE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LXGATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LXGATE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LXGATE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse, export, stream, and reset the intrusion audit log
    #[command(alias = "log", alias = "l")]
    Logs(LogsArgs),

    /// Run attack simulations against the gateway
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Inspect sensor telemetry
    #[command(alias = "sens")]
    Sensors(SensorsArgs),

    /// Explain a detection with per-feature SHAP contributions
    Explain(ExplainArgs),

    /// Manage gateway user accounts
    Users(UsersArgs),

    /// Show gateway connection status
    Status,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Filter Arguments ──────────────────────────────────────────

/// Audit log filter flags shared by `logs list` and `logs export`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Only alerts with exactly this severity (low, medium, high)
    #[arg(long, short = 's', value_name = "SEVERITY")]
    pub severity: Option<String>,

    /// Only alerts with at least this severity
    #[arg(long, value_name = "SEVERITY", conflicts_with = "severity")]
    pub min_severity: Option<String>,

    /// Only alerts of this attack type (e.g. spoofing, replay)
    #[arg(long, short = 't', value_name = "TYPE")]
    pub attack_type: Option<String>,

    /// Only alerts whose sensor ID contains this substring
    #[arg(long, value_name = "QUERY")]
    pub sensor: Option<String>,

    /// Only alerts from this calendar day (YYYY-MM-DD, local time)
    #[arg(long, short = 'd', value_name = "DATE")]
    pub date: Option<String>,

    /// Only alerts the gateway blocked
    #[arg(long, short = 'b')]
    pub blocked: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// List audit log entries (newest first)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Max entries to show
        #[arg(long, short = 'n', default_value = "50")]
        limit: usize,
    },

    /// Export the audit log to CSV or JSON
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Export format
        #[arg(long, short = 'f', default_value = "csv")]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(long, short = 'O', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Stream live alerts until interrupted
    #[command(alias = "follow")]
    Watch {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Clear the audit log
    Reset {
        /// Also clear the gateway's persisted log
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    /// RFC 4180 CSV with a fixed header row
    Csv,
    /// Pretty-printed JSON array
    Json,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SIMULATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(subcommand)]
    pub command: SimulateCommand,
}

#[derive(Debug, Subcommand)]
pub enum SimulateCommand {
    /// List available attack simulations
    Types,

    /// Run an attack simulation
    Run {
        /// Attack kind (spoofing, replay, firmware_injection, ml_evasion, ddos)
        kind: String,

        /// Sensor ID to attack
        #[arg(long, short = 's', default_value = "soil-01")]
        sensor: String,

        /// JSON file with a full simulation payload (overrides --sensor)
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SENSORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorsCommand {
    /// List known sensor types and IDs
    #[command(alias = "ls")]
    List,

    /// Show latest readings for a sensor family
    Readings {
        /// Sensor family (soil, atmosphere, water, plant, threat)
        family: String,
    },

    /// Show rolling averages across all sensor families
    #[command(alias = "avg")]
    Averages,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXPLAIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// JSON file with the feature vector to explain
    #[arg(long, value_name = "PATH")]
    pub from_file: PathBuf,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List gateway user accounts
    #[command(alias = "ls")]
    List,

    /// Create a user account
    Add {
        /// Username for the new account
        username: String,

        /// Account role
        #[arg(long, default_value = "viewer")]
        role: String,
    },

    /// Delete a user account
    #[command(alias = "rm")]
    Remove {
        /// Username of the account to delete
        username: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Set a single key on the active profile
    Set {
        /// Config key (gateway, token, token_env, username, insecure,
        /// timeout, poll_interval, log_capacity, websocket, ca_cert)
        key: String,

        /// New value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile to store the token for (defaults to active)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
