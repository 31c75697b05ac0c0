use clap::{Parser, Subcommand};
use medagent_cli::commands;
use medagent_cli::commands::IntakeArgs;
use medagent_cli::util::exit_error;

#[derive(Parser)]
#[command(
    name = "medagent",
    version,
    about = "MedAgent CLI: symptom intake, risk screen and advisory through the relay"
)]
struct Cli {
    /// Relay base URL
    #[arg(long, env = "MEDAGENT_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay health
    Health,
    /// Show the symptom checklist, accepted ages and risk rules
    Catalog,
    /// Validate an intake and classify its risk
    Assess {
        #[command(flatten)]
        intake: IntakeArgs,
    },
    /// Classify an intake and fetch advisory guidance
    Advise {
        #[command(flatten)]
        intake: IntakeArgs,
        /// Leave the patient name out of the generation prompt
        #[arg(long)]
        anonymous: bool,
    },
    /// Interactive intake: questions, risk screen, then advice
    Wizard {
        /// Seconds on the risk screen before moving to advice (0 disables)
        #[arg(long, default_value_t = 3)]
        auto_advance_secs: u64,
        /// Leave the patient name out of the generation prompt
        #[arg(long)]
        anonymous: bool,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    if url::Url::parse(&cli.api_url).is_err() {
        exit_error(
            &format!("Invalid relay URL '{}'", cli.api_url),
            Some("Set --api-url or MEDAGENT_API_URL to e.g. http://localhost:3000"),
        );
    }

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Catalog => commands::catalog::run(&cli.api_url).await,
        Commands::Assess { intake } => commands::assess::run(&cli.api_url, &intake).await,
        Commands::Advise { intake, anonymous } => {
            commands::advise::run(&cli.api_url, &intake, anonymous).await
        }
        Commands::Wizard {
            auto_advance_secs,
            anonymous,
        } => commands::wizard::run(&cli.api_url, auto_advance_secs, anonymous).await,
    };

    std::process::exit(code);
}
