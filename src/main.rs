use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use student_risk_dashboard::client::AnalyticsClient;
use student_risk_dashboard::config::{DashboardConfig, DEFAULT_BASE_URL};
use student_risk_dashboard::panels::{OverviewPanel, RecommendationsPanel, RiskPanel};
use student_risk_dashboard::render::Theme;
use student_risk_dashboard::{export, portal, report};

#[derive(Parser)]
#[command(name = "risk-dashboard")]
#[command(about = "Student performance and risk dashboard for the analytics service", long_about = None)]
struct Cli {
    /// Base URL of the analytics service
    #[arg(long, global = true, env = "STUDENT_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Give up on a request after this many seconds (default: wait indefinitely)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Disable coloured badges
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset statistics, schema and sample rows
    Overview,
    /// Look up recommendations for one student
    Recommend {
        #[arg(long)]
        student_id: String,
    },
    /// Show the cluster distribution and optionally assess every student
    Risk {
        /// Run the population risk assessment
        #[arg(long)]
        assess: bool,
        /// Filter assessment rows by student ID or risk level
        #[arg(long, requires = "assess")]
        filter: Option<String>,
        /// Write the (filtered) assessment rows to a CSV file
        #[arg(long, requires = "assess")]
        csv: Option<PathBuf>,
    },
    /// Write a markdown snapshot of every panel
    Report {
        #[arg(long, default_value = "dashboard-report.md")]
        out: PathBuf,
        /// Include recommendations for this student
        #[arg(long)]
        student_id: Option<String>,
        /// Include the population risk assessment
        #[arg(long)]
        assess: bool,
    },
    /// Interactive tabbed portal driven by line commands
    Portal,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "student_risk_dashboard=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stdout().is_terminal();
    let config = DashboardConfig::new(&cli.base_url, cli.timeout_secs, color)?;
    let client = AnalyticsClient::new(&config).context("failed to set up the analytics client")?;
    let theme = if config.color {
        Theme::colored()
    } else {
        Theme::plain()
    };

    match cli.command {
        Commands::Overview => {
            let mut panel = OverviewPanel::new();
            panel.activate(&client).await;
            print!("{}", panel.render(theme));
        }
        Commands::Recommend { student_id } => {
            let mut panel = RecommendationsPanel::new();
            panel.set_input(&student_id);
            if !panel.search(&client).await {
                anyhow::bail!("a student ID is required");
            }
            print!("{}", panel.render(theme));
        }
        Commands::Risk {
            assess,
            filter,
            csv,
        } => {
            let mut panel = RiskPanel::new();
            if assess {
                panel.activate_and_analyze(&client).await;
            } else {
                panel.activate(&client).await;
            }
            if let Some(query) = filter {
                panel.set_query(&query);
            }
            print!("{}", panel.render(theme));

            if let (Some(path), Some(rows)) = (csv, panel.filtered()) {
                let written = export::export_predictions(&path, &rows)?;
                println!("Exported {written} rows to {}.", path.display());
            }
        }
        Commands::Report {
            out,
            student_id,
            assess,
        } => {
            let snapshot =
                report::Snapshot::capture(&client, student_id.as_deref(), assess).await;
            let markdown =
                report::build_report(&snapshot, config.base_url.as_str(), chrono::Utc::now());
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Portal => {
            let mut portal = portal::Portal::new(client, theme);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            portal.run(stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}
