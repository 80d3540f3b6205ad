use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use collection_priority::api::{self, parse_date};
use collection_priority::config::AppConfig;
use collection_priority::error::AppError;
use collection_priority::report::views::{DebtComponentShare, DistributionEntry};
use collection_priority::report::{PortfolioReport, DEFAULT_TOP_REGIONS};
use collection_priority::scoring::{
    write_csv_to_path, DebtorTable, RankedTable, RecordType, RegionCodeTable, ScoringEngine,
    ScoringOptions,
};
use collection_priority::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "collection-priority",
    about = "Score, rank and summarize debtor portfolios for collection work",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank a debtor CSV export and print the top records
    Rank(RankArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Debtor table exported as UTF-8 CSV
    path: PathBuf,
    /// Record type label (在案/前催); detected from the file name when omitted
    #[arg(long)]
    record_type: Option<String>,
    /// Evaluation date used for ages (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
    /// Number of ranked records to print
    #[arg(long, default_value_t = 20)]
    top: usize,
    /// Write the full ranked table, with derived columns, to this CSV path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print portfolio statistics after the ranking
    #[arg(long)]
    summary: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let mut config = AppConfig::load()?;

    match command {
        Command::Serve(mut args) => {
            if let Some(host) = args.host.take() {
                config.server.host = host;
            }
            if let Some(port) = args.port.take() {
                config.server.port = port;
            }
            telemetry::init(&config.telemetry)?;
            api::serve(config).await
        }
        Command::Rank(args) => {
            telemetry::init(&config.telemetry)?;
            run_rank(args, &config)
        }
    }
}

fn run_rank(args: RankArgs, config: &AppConfig) -> Result<(), AppError> {
    let RankArgs {
        path,
        record_type,
        as_of,
        top,
        output,
        summary,
    } = args;

    let regions = RegionCodeTable::load_or_degrade(
        &config.scoring.region_table_path,
        config.scoring.region_table_required,
    )?;
    let engine = ScoringEngine::new(
        Arc::new(regions),
        ScoringOptions {
            as_of: as_of.unwrap_or_else(|| Local::now().date_naive()),
            apply_city_tier: config.scoring.apply_city_tier,
        },
    );

    let file_name = path.file_name().and_then(|name| name.to_str());
    let record_type = RecordType::resolve(record_type.as_deref(), file_name);
    let table = DebtorTable::from_path(&path)?;
    let ranked = engine.run(table, &record_type);

    render_ranked(&ranked, engine.options().as_of, top);

    if summary {
        render_report(&PortfolioReport::build(&ranked, DEFAULT_TOP_REGIONS));
    }

    if let Some(output) = output {
        write_csv_to_path(&ranked, &output)?;
        info!(path = %output.display(), records = ranked.len(), "ranked table written");
        println!("\nRanked table written to {}", output.display());
    }

    Ok(())
}

fn render_ranked(ranked: &RankedTable, as_of: NaiveDate, top: usize) {
    println!("Collection priority ranking");
    println!(
        "Record type: {} | records: {} | evaluated {}",
        ranked.record_type,
        ranked.len(),
        as_of
    );

    if ranked.warnings.is_empty() {
        println!("Warnings: none");
    } else {
        println!("\nWarnings");
        for warning in &ranked.warnings {
            println!("- {}", warning.summary());
        }
    }

    if ranked.is_empty() {
        println!("\nNo records to rank");
        return;
    }

    println!("\nTop {} records", top.min(ranked.len()));
    for row in ranked.row_views(Some(top)) {
        let identity = row.identity_number.as_deref().unwrap_or("-");
        let region = row.region_from_id.as_deref().unwrap_or("-");
        let age = row
            .age
            .map(|age| age.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. row {:<5} score {:>6.2} | id {} | region {} | age {} | overdue M{}",
            row.rank, row.row, row.score, identity, region, age, row.overdue_months
        );

        let contributions: Vec<String> = row
            .components
            .iter()
            .filter(|component| component.points != 0.0)
            .map(|component| format!("{} +{}", component.rule.label(), component.points))
            .collect();
        if !contributions.is_empty() {
            println!("     {}", contributions.join(", "));
        }
    }
}

fn render_report(report: &PortfolioReport) {
    println!("\nPortfolio summary");
    match (report.scores.min, report.scores.max, report.scores.mean) {
        (Some(min), Some(max), Some(mean)) => println!(
            "Scores: {} records, min {:.2}, max {:.2}, mean {:.2}",
            report.scores.count, min, max, mean
        ),
        _ => println!("Scores: no records"),
    }

    if !report.payment_patterns.is_empty() {
        render_distribution("Payment patterns", &report.payment_patterns);
    }
    render_distribution("Debt ratio bands", &report.debt_ratio_bands);
    render_distribution("Age bands", &report.age_bands);

    if report.top_regions.is_empty() {
        println!("\nRegions: none resolved");
    } else {
        println!("\nTop regions");
        for region in &report.top_regions {
            println!("- {}: {}", region.region, region.count);
        }
    }

    if !report.debt_composition.is_empty() {
        println!("\nDebt composition");
        render_components(&report.debt_composition, "");
    }

    if !report.risk_levels.is_empty() {
        println!("\nRisk levels");
        for level in &report.risk_levels {
            println!("- {}: {} ({:.1}%)", level.label, level.count, level.percent);
            for pattern in &level.payment_patterns {
                println!("  - {}: {:.1}%", pattern.label, pattern.percent);
            }
        }
    }

    if !report.risk_histogram.is_empty() {
        println!("\nRisk probability histogram");
        for bin in &report.risk_histogram {
            println!("- {:.3}-{:.3}: {}", bin.lower, bin.upper, bin.count);
        }
    }

    if !report.overdue_day_groups.is_empty() {
        println!("\nOverdue days");
        for group in &report.overdue_day_groups {
            println!("- {}: {} ({:.1}%)", group.label, group.count, group.percent);
            render_components(&group.debt_components, "  ");
        }
    }
}

fn render_components(shares: &[DebtComponentShare], indent: &str) {
    for share in shares {
        println!(
            "{indent}- {}: {:.2} ({:.1}%)",
            share.component, share.total, share.percent
        );
    }
}

fn render_distribution(title: &str, entries: &[DistributionEntry]) {
    println!("\n{title}");
    for entry in entries {
        println!("- {}: {} ({:.1}%)", entry.label, entry.count, entry.percent);
    }
}
