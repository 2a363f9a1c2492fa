//! Ethos Council CLI - evaluate actions against four ethical frameworks

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ethos_council::{
    Action, Circumstances, Consequentialist, Council, CouncilConfig, EvaluationReport,
    MetaPrinciple, Stakeholder,
};

#[derive(Parser)]
#[command(name = "ethos")]
#[command(about = "Ethos Council - multi-framework ethical evaluation")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Evaluate the actions of a scenario file
    Evaluate {
        /// Scenario file (JSON)
        #[arg(short, long)]
        scenario: PathBuf,
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
        /// Run evaluators on the blocking pool
        #[arg(long)]
        concurrent: bool,
    },
    /// Run the vulnerability disclosure dilemma
    Demo {
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the principles for deciding under moral uncertainty
    Principles,
    /// Check configuration validity
    CheckConfig {
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Candidate actions and the situation they are evaluated in.
#[derive(Debug, Deserialize)]
struct Scenario {
    actions: Vec<Action>,
    #[serde(default)]
    stakeholders: Vec<Stakeholder>,
    #[serde(default)]
    circumstances: Circumstances,
}

impl Scenario {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// A security researcher found a flaw that exposes users' data.
    fn disclosure_dilemma() -> Self {
        Self {
            actions: vec![
                Action::new(
                    "public_disclosure",
                    "Publish full details of the vulnerability to alert everyone",
                )
                .with_consequence("users", 0.7)
                .with_consequence("company", -0.5)
                .with_uncertainty(0.4)
                .with_reversibility(0.0),
                Action::new(
                    "private_report",
                    "Report the vulnerability privately and give the company time to fix it",
                )
                .with_consequence("users", 0.4)
                .with_consequence("attackers", 0.2)
                .with_consequence("company", 0.6)
                .with_uncertainty(0.5)
                .with_reversibility(0.3),
                Action::new("stay_silent", "Say nothing and wait")
                    .with_consequence("users", -0.8)
                    .with_consequence("company", 0.1)
                    .with_uncertainty(0.2)
                    .with_reversibility(0.8),
            ],
            stakeholders: vec![
                Stakeholder::new("users", "human", 0.8, 0.8, 1.0),
                Stakeholder::new("company", "organization", 0.3, 0.5, 0.6),
                Stakeholder::new("attackers", "human", 0.5, 0.3, 0.2),
            ],
            circumstances: Circumstances::new()
                .with_tag("crisis_security")
                .with_relationship("company", "users")
                .with_vulnerable("users"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Evaluate {
            scenario,
            config,
            json,
            concurrent,
        }) => {
            let config = load_config(config.as_deref())?;
            let council = Council::from_config(config).context("building council")?;
            let scenario = Scenario::load(&scenario)?;
            let reports = run(&council, &scenario, concurrent).await?;
            render(&council, &scenario, &reports, json)?;
        }
        Some(Commands::Demo { json }) => {
            let council = Council::new().context("building council")?;
            let scenario = Scenario::disclosure_dilemma();
            let reports = run(&council, &scenario, false).await?;
            render(&council, &scenario, &reports, json)?;
            if !json {
                println!();
                print_principles();
            }
        }
        Some(Commands::Principles) => print_principles(),
        Some(Commands::CheckConfig { config }) => {
            let config = load_config(Some(config.as_path()))?;
            Council::from_config(config).context("building council")?;
            println!("Configuration OK");
        }
        None => {
            println!("Ethos Council v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CouncilConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            CouncilConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))
        }
        None => Ok(CouncilConfig::default()),
    }
}

async fn run(
    council: &Council,
    scenario: &Scenario,
    concurrent: bool,
) -> anyhow::Result<Vec<EvaluationReport>> {
    let (actions, stakeholders, circumstances) =
        (&scenario.actions, &scenario.stakeholders, &scenario.circumstances);
    let reports = if concurrent {
        council
            .evaluate_all_concurrent(actions, stakeholders, circumstances)
            .await
    } else {
        council.evaluate_all(actions, stakeholders, circumstances)
    };
    reports.context("evaluating scenario")
}

fn render(
    council: &Council,
    scenario: &Scenario,
    reports: &[EvaluationReport],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!("{}", report);
        println!("Fingerprint: {}", report.fingerprint()?);
        println!();
    }

    let utility = Consequentialist::from_config(&council.config().utility)?;
    if let Some((best, score)) = utility.choose_best(&scenario.actions, &scenario.stakeholders) {
        println!("Highest aggregate utility: {} ({:.3})", best.name, score);
    }
    println!("The council informs the decision; it does not make it.");
    Ok(())
}

fn print_principles() {
    println!("Principles for deciding under moral uncertainty:");
    for principle in MetaPrinciple::ALL {
        println!("  - {}", principle);
    }
}
