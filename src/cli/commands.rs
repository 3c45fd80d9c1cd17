use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzers::TableAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::fetchers::{build_client, StationFetcher};
use crate::models::{EndpointKind, ScrapeRequest};
use crate::parsers::ResponseParser;
use crate::processors::ScrapeOrchestrator;
use crate::settings::Settings;
use crate::utils::filename::generate_default_csv_filename;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;

/// Flags of the `scrape` subcommand after clap parsing.
struct ScrapeOptions {
    start_id: u32,
    end_id: u32,
    result_key: Option<String>,
    endpoint: EndpointKind,
    output_file: Option<PathBuf>,
    max_workers: Option<usize>,
    ordered: bool,
    timeout_secs: Option<u64>,
    show_raw: bool,
    quiet: bool,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref()).context("failed to initialise logging")?;

    match cli.command {
        Commands::Scrape {
            start_id,
            end_id,
            result_key,
            endpoint,
            output_file,
            max_workers,
            ordered,
            timeout_secs,
            show_raw,
            quiet,
        } => {
            let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
            let options = ScrapeOptions {
                start_id,
                end_id,
                result_key,
                endpoint,
                output_file,
                max_workers,
                ordered,
                timeout_secs,
                show_raw,
                quiet,
            };
            scrape(&settings, options).await
        }

        Commands::Parse { file, endpoint } => parse_file(&file, endpoint),

        Commands::Info { file, sample } => info(&file, sample),
    }
}

async fn scrape(settings: &Settings, options: ScrapeOptions) -> anyhow::Result<()> {
    let result_key = options
        .result_key
        .unwrap_or_else(|| settings.scrape.result_key.clone());
    let max_workers = options.max_workers.unwrap_or(settings.scrape.max_workers);
    let timeout = options
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.http.timeout());
    let output_file = options.output_file.unwrap_or_else(generate_default_csv_filename);

    let request = ScrapeRequest::new(options.start_id, options.end_id, result_key, options.endpoint);
    request.check().context("invalid station range")?;

    println!(
        "Scraping {} stations ({} to {}) from {}",
        request.total(),
        request.start_id,
        request.end_id,
        request.endpoint
    );
    println!("Result key: {}", request.result_key);
    println!("Output file: {}", output_file.display());
    println!("Workers: {}, Timeout: {}s", max_workers, timeout.as_secs());

    let template = settings
        .endpoints
        .template_for(request.endpoint)
        .context("invalid endpoint template")?;
    let client = build_client(timeout, &settings.http.user_agent)?;
    let fetcher = StationFetcher::with_client(client, template, request.result_key.as_str());

    let mut orchestrator = ScrapeOrchestrator::new(fetcher)
        .with_max_workers(max_workers)
        .with_ordered_progress(options.ordered || settings.scrape.ordered_progress);

    let progress = ProgressReporter::new(request.total() as u64, "Scraping polling stations...", options.quiet)
        .with_station_log(request.endpoint, options.show_raw);

    let table = orchestrator.run(&request, Some(&progress)).await?;

    progress.finish_with_message(&format!("Processed {} stations", table.row_count()));
    println!("\n{}", orchestrator.stats().summary());
    println!(
        "Table: {} rows x {} columns",
        table.row_count(),
        table.column_count() + 1
    );

    let writer = CsvWriter::new();
    writer
        .write_table(&table, &output_file)
        .with_context(|| format!("failed to write {}", output_file.display()))?;

    let file_info = writer.get_file_info(&output_file)?;
    println!("\n{}", file_info.summary());
    println!("Scrape complete!");
    Ok(())
}

fn parse_file(file: &Path, endpoint: EndpointKind) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let raw = crate::fetchers::decode_body(&bytes, None);

    let record = ResponseParser::new(endpoint).parse(&raw);
    if record.is_empty() {
        tracing::warn!(file = %file.display(), "{}", endpoint.empty_note());
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn info(file: &Path, sample: usize) -> anyhow::Result<()> {
    println!("Analyzing CSV file: {}", file.display());

    let stats = TableAnalyzer::new()
        .with_sample_size(sample)
        .analyze_csv(file)
        .with_context(|| format!("failed to analyze {}", file.display()))?;
    println!("\n{}", stats.detailed_summary());

    let file_info = CsvWriter::new().get_file_info(file)?;
    println!("\nFile Details:");
    println!("{}", file_info.summary());
    Ok(())
}
