//! openlens: compare research institutions on OpenAlex from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use openlens::config::Config;
use openlens::stores::{MemoryNavigator, query};
use openlens::types::Term;
use openlens::{Explorer, OpenLensError};

/// OpenLens CLI
#[derive(Parser)]
#[command(name = "openlens")]
#[command(version = openlens::PKG_VERSION)]
#[command(about = "Compare research institutions using OpenAlex data")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "OPENLENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare up to five institutions side by side
    Compare {
        /// Comma-separated terms (names or /i/<id> references)
        terms: String,
        /// Topic id to scope works metrics to
        #[arg(short, long)]
        topic: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the detail view of one institution
    Institution {
        /// OpenAlex institution id (e.g. I63966007)
        id: String,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Resolve a topic id to its display name
    Topic {
        /// OpenAlex topic id (e.g. T10017)
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    info!(base_url = %config.api.base_url, "openlens starting");

    match args.command {
        Command::Compare { terms, topic, json } => {
            let mut initial = query::with_param("", query::TERMS_PARAM, Some(&terms));
            initial = query::with_param(&initial, query::TOPIC_PARAM, topic.as_deref());

            let navigator = Arc::new(MemoryNavigator::default());
            let explorer = config
                .apply(Explorer::builder())
                .navigator(navigator.clone())
                .build()?;
            explorer.initialize(&initial).await;

            let slots: Vec<Term> = explorer
                .terms()
                .terms()
                .into_iter()
                .filter(|t| t.is_selected())
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                println!("topic: {}", explorer.topic().get().display_name);
                for term in &slots {
                    print_term(term);
                }
                if let Some(error) = explorer.loading().get().error {
                    println!("error: {error}");
                }
                println!("url: {}", navigator.location());
            }
        }

        Command::Institution { id, json } => {
            let explorer = config.apply(Explorer::builder()).build()?;
            let detail = explorer
                .institution_detail(&id)
                .await?
                .ok_or_else(|| OpenLensError::InvalidInput(format!("no institution {id}")))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                let info = &detail.info;
                println!("{} ({})", info.display_name, info.short_id());
                println!("works: {}", info.works_count);
                println!("citations: {}", info.cited_by_count);
                println!("h-index: {}", info.summary_stats.h_index);
                println!("output by year:");
                for year in &detail.yearly_output {
                    println!("  {}: {}", year.year, year.works_count);
                }
                println!("open access:");
                for group in &detail.open_access {
                    println!("  {}: {}", group.key_display_name, group.count);
                }
                println!("top funders:");
                for group in &detail.funders {
                    println!("  {}: {}", group.key_display_name, group.count);
                }
                println!("recent works:");
                for work in &detail.recent_works {
                    println!(
                        "  {} {}",
                        work.publication_year
                            .map(|y| y.to_string())
                            .unwrap_or_default(),
                        work.display_name.as_deref().unwrap_or("(untitled)")
                    );
                }
            }
        }

        Command::Topic { id } => {
            let explorer = config.apply(Explorer::builder()).build()?;
            match explorer.data().topic(&id).await? {
                Some(topic) => println!("{}: {}", topic.id, topic.display_name),
                None => println!("{id}: not found"),
            }
        }
    }

    Ok(())
}

fn print_term(term: &Term) {
    let Some(ref institution) = term.data else {
        println!("[{}] {} {}: no match", term.id, term.color, term.value);
        return;
    };
    println!(
        "[{}] {} {} -> {} ({})",
        term.id,
        term.color,
        term.value,
        institution.display_name,
        institution.short_id()
    );
    println!(
        "    works: {}  citations: {}  h-index: {}",
        institution.works_count, institution.cited_by_count, institution.summary_stats.h_index
    );
    if let Some(ref works) = institution.works {
        println!(
            "    in topic: {} works, {} citations, APC list ${:.0}, APC paid ${:.0}",
            works.count,
            works.cited_by_count_sum.unwrap_or(0),
            works.apc_list_sum_usd.unwrap_or(0.0),
            works.apc_paid_sum_usd.unwrap_or(0.0)
        );
    }
}
