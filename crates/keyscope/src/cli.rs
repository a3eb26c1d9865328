use clap::{Parser, Subcommand, ValueEnum};
use keyscope_core::GranularityContext;
use keyscope_filters::Domain;

#[derive(Parser)]
#[command(name = "keyscope")]
#[command(version)]
#[command(about = "Compile dashboard analytics filters into executor queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve bucket size and window for a time range
    Granularity {
        #[arg(long, value_enum, default_value = "regular")]
        context: ContextArg,

        /// Window start (unix ms)
        #[arg(long, allow_hyphen_values = true)]
        start: Option<i64>,

        /// Window end (unix ms)
        #[arg(long, allow_hyphen_values = true)]
        end: Option<i64>,

        /// Relative window such as 3h or 7d; overrides start/end
        #[arg(long)]
        since: Option<String>,
    },

    /// Compile a query payload into an executor request
    Compile {
        /// keys, logs, ratelimits or verifications
        #[arg(short, long)]
        domain: Domain,

        /// Query payload JSON (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Keyspaces JSON used to resolve keys
        #[arg(short, long)]
        keys: Option<String>,
    },

    /// Render executor and key resolver WHERE clauses for a query payload
    Sql {
        #[arg(short, long)]
        domain: Domain,

        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        keys: Option<String>,

        /// Query config JSON
        #[arg(long)]
        config: Option<String>,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContextArg {
    Regular,
    Verifications,
}

impl From<ContextArg> for GranularityContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Regular => GranularityContext::Regular,
            ContextArg::Verifications => GranularityContext::Verifications,
        }
    }
}
