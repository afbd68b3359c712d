use clap::{Parser, Subcommand, ValueEnum};
use revive_planner::PayloadFormat;

mod commands;

#[derive(Parser)]
#[command(
    name = "reviveplan",
    about = "Check and reconcile a revived database layout against its target spec",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Admin tool that produced the `--display-only` output.
#[derive(Clone, Copy, ValueEnum)]
enum Tool {
    Admintools,
    Vcluster,
}

impl From<Tool> for PayloadFormat {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Admintools => PayloadFormat::TextTool,
            Tool::Vcluster => PayloadFormat::RpcTool,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the revived layout can be managed declaratively
    Check {
        /// File holding the revive --display-only output ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,
        #[arg(short, long, value_enum, default_value = "vcluster")]
        tool: Tool,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Show the changes needed to make the target spec match
    Plan {
        #[arg(short, long, default_value = "-")]
        input: String,
        #[arg(short, long, value_enum, default_value = "vcluster")]
        tool: Tool,
        /// Target spec TOML file
        #[arg(short, long)]
        spec: String,
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Rewrite the target spec to match the revived layout
    Apply {
        #[arg(short, long, default_value = "-")]
        input: String,
        #[arg(short, long, value_enum, default_value = "vcluster")]
        tool: Tool,
        #[arg(short, long)]
        spec: String,
        /// Write the updated spec back to the spec file
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reviveplan=info".parse()?)
                .add_directive("revive_planner=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, tool, format } => {
            commands::plan::check(&input, tool.into(), &format)
        }
        Commands::Plan { input, tool, spec, format } => {
            commands::plan::plan(&input, tool.into(), &spec, &format)
        }
        Commands::Apply { input, tool, spec, write } => {
            commands::plan::apply(&input, tool.into(), &spec, write)
        }
    }
}
