use clap::Parser;
use layerpack::Reporter;
use tracing_subscriber::EnvFilter;

mod commands;

const EXAMPLES: &str = "Examples:
  layerpack \"requests\"
  layerpack \"boto3>=1.26.1,requests==2.28.0\"
  layerpack \"pydantic>=2.5.0\" --python-version python3.12
  layerpack \"requests,pydantic\" --json --quiet
  layerpack --inspect arn:aws:lambda:us-east-1:123456789012:layer:layer-requests:1";

/// layerpack - Generate AWS Lambda layers from Python packages
#[derive(Parser)]
#[command(name = "layerpack")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Cli {
    /// Comma-separated list of packages (e.g., "requests==2.28.0,pydantic")
    #[arg(required_unless_present = "inspect")]
    packages: Option<String>,

    /// Python runtime version (default: python3.10, or layer.default_runtime from config)
    #[arg(long, value_name = "RUNTIME")]
    python_version: Option<String>,

    /// Output result as JSON
    #[arg(long)]
    json: bool,

    /// Suppress progress output (JSON mode only)
    #[arg(long)]
    quiet: bool,

    /// Show details of a published layer version instead of creating one
    #[arg(long, value_name = "ARN", conflicts_with = "packages")]
    inspect: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let reporter = if cli.json {
        Reporter::json(cli.quiet)
    } else {
        Reporter::human()
    };

    // Both commands may need region or credentials from .env
    commands::load_env(&reporter);

    let result = match cli.inspect {
        Some(arn) => commands::inspect::run(&arn, cli.json, &reporter),
        None => commands::create::run(
            cli.packages.unwrap_or_default(),
            cli.python_version,
            cli.json,
            &reporter,
        ),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
