use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::ScoreDimension;
use engine::EvaluationEngine;
use narrative::DisabledNarrator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{ActivitySeed, InMemoryStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Tradewise evaluation application.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Behavioral analytics for a paper-trading education platform.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON activity snapshot (balance, transactions, holdings,
    /// checklists, trigger history, daily scores, cached sentiment).
    #[arg(long, default_value = "activity.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and persist today's five behavioral scores plus badges.
    Score,
    /// Run all mentor pattern checks with historical escalation.
    Analyze,
    /// Generate the monthly performance report.
    Report,
    /// Show active challenges with progress.
    Challenges {
        /// Apply completed/expired transitions and re-seed missing types.
        #[arg(long)]
        refresh: bool,
    },
    /// Show the long-term behavior summary.
    Behavior,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = configuration::load_config().context("failed to load configuration")?;
    let seed = load_seed(&cli.state)?;
    let store = Arc::new(InMemoryStore::from_seed(seed));
    let engine = EvaluationEngine::new(
        config,
        store.clone(),
        store,
        Arc::new(DisabledNarrator),
    );
    let now = Utc::now();

    match cli.command {
        Commands::Score => {
            let outcome = engine.compute_daily_scores(now).await?;
            let card = &outcome.scores;

            let mut table = Table::new();
            table.set_header(vec!["Dimension", "Score", "Data"]);
            let flags = &card.insufficient_data;
            for (dimension, score, insufficient) in [
                (ScoreDimension::Risk, card.risk, flags.risk),
                (ScoreDimension::Discipline, card.discipline, flags.discipline),
                (ScoreDimension::Strategy, card.strategy, flags.strategy),
                (ScoreDimension::Psychology, card.psychology, flags.psychology),
                (ScoreDimension::Consistency, card.consistency, flags.consistency),
            ] {
                table.add_row(vec![
                    dimension.label().to_string(),
                    format!("{score:.1}"),
                    if insufficient { "insufficient".to_string() } else { "ok".to_string() },
                ]);
            }
            println!("{table}");
            println!(
                "Eligible: {} ({} trades, {} active days in the window)",
                card.eligible, card.trade_count, card.active_days
            );

            let mut badge_table = Table::new();
            badge_table.set_header(vec!["Badge", "Earned", "Qualifying days"]);
            for badge in &outcome.badges {
                badge_table.add_row(vec![
                    badge.badge_type.label().to_string(),
                    badge.earned.to_string(),
                    format!("{}/{}", badge.qualifying_days, badge.required_days),
                ]);
            }
            println!("{badge_table}");
        }
        Commands::Analyze => {
            let analysis = engine.analyze(now).await?;
            if analysis.alerts.is_empty() {
                println!("No behavioral patterns detected.");
            }
            for alert in &analysis.alerts {
                println!(
                    "[{:?}] {} ({:?}, {} prior)",
                    alert.trigger.severity,
                    alert.trigger.message,
                    alert.escalation_level,
                    alert.prior_count
                );
            }
            for note in &analysis.improvement_notes {
                println!("{note}");
            }
        }
        Commands::Report => {
            let report = engine.generate_report(now).await?;
            println!(
                "Report {} ({} to {})",
                report.id, report.period_start, report.period_end
            );
            println!("Grade: {}", report.overall_grade);
            println!(
                "Averages: risk {:.1}, discipline {:.1}, strategy {:.1}, psychology {:.1}, consistency {:.1}",
                report.risk_avg,
                report.discipline_avg,
                report.strategy_avg,
                report.psychology_avg,
                report.consistency_avg
            );
            if let Some(best) = &report.best_trade_id {
                println!("Best trade: {best}");
            }
            if let Some(worst) = &report.worst_trade_id {
                println!("Worst trade: {worst}");
            }
            println!("Summary: {}", report.summary);
        }
        Commands::Challenges { refresh } => {
            let views = if refresh {
                engine.refresh_challenges(now).await?
            } else {
                engine.active_challenges(now).await?
            };
            let mut table = Table::new();
            table.set_header(vec!["Challenge", "Progress", "Target", "Expires"]);
            for view in &views {
                table.add_row(vec![
                    view.challenge.title.clone(),
                    format!("{:.1}%", view.progress_pct),
                    format!("{:.0}", view.challenge.target_value),
                    view.challenge.expires_at.date_naive().to_string(),
                ]);
            }
            println!("{table}");
        }
        Commands::Behavior => {
            let summary = engine.behavior_summary(now).await?;
            println!(
                "Scored days: {} (first: {})",
                summary.total_scored_days,
                summary
                    .first_score_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "n/a".to_string())
            );
            println!(
                "Good-day streak: current {}, longest {}",
                summary.current_streak, summary.longest_streak
            );
            println!(
                "Current 30d averages: risk {:.1}, discipline {:.1}, strategy {:.1}, psychology {:.1}, consistency {:.1}",
                summary.current_avg.risk,
                summary.current_avg.discipline,
                summary.current_avg.strategy,
                summary.current_avg.psychology,
                summary.current_avg.consistency
            );
            for (pattern, count) in &summary.trigger_totals {
                println!("  {pattern}: {count}x");
            }
        }
    }

    Ok(())
}

/// Reads the activity snapshot, falling back to an empty portfolio when the
/// file does not exist.
fn load_seed(path: &Path) -> anyhow::Result<ActivitySeed> {
    if !path.exists() {
        info!(path = %path.display(), "no activity snapshot found, starting empty");
        return Ok(ActivitySeed::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
