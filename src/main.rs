use clap::Parser;
use dialoguer::Input;
use flora_id::{cli, config, error, logging, orchestrator, pipeline, report, sources};
use flora_id::occurrence::OccurrenceClient;
use flora_id_common::SearchQuery;
use cli::{Cli, Commands, QueryArgs};
use config::Config;
use error::{FloraIdError, Result};
use indicatif::{ProgressBar, ProgressStyle};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\n✖ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    config.api_key = config.resolve_api_key();

    match cli.command {
        Commands::Identify { query, notes, label, output, raw_output, sources: requested } => {
            println!("🌿 flora-id - specimen identification\n");

            let query = build_query(&config, &query)?;
            let source_order = pick_sources(&config, requested);
            let pipeline = pipeline::Pipeline::from_config(&config, &source_order)?;

            let notes = match notes {
                Some(notes) => notes,
                None => prompt_notes()?,
            };
            let label = label.unwrap_or_default();

            println!(
                "[1/3] Searching GBIF for {} within {} km of ({}, {})...",
                query.taxon_name, query.radius_km, query.latitude, query.longitude
            );
            let progress = ProgressBar::hidden();
            let result = pipeline
                .run(&query, &notes, &label, |current, total, name| {
                    if current == 1 {
                        println!("✔ {} species found\n", total);
                        println!(
                            "[2/3] Fetching descriptions ({}), then Gemini analysis ({})...",
                            describe_order(&source_order),
                            config.model
                        );
                        progress.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                        progress.set_length(total as u64);
                        progress.set_style(progress_style());
                    }
                    progress.set_position(current as u64 - 1);
                    progress.set_message(name.to_string());
                })
                .await;
            finish_progress(&progress);
            let identification = result?;

            let described = identification.described_count();
            println!(
                "✔ {} of {} species described",
                described,
                identification.descriptions.len()
            );
            for failed in identification.descriptions.iter().filter(|r| !r.succeeded()) {
                println!("  - {}: {}", failed.species_name, failed.failure_reason().unwrap_or_default());
            }
            println!("✔ Gemini analysis complete\n");

            println!("{}", "=".repeat(60));
            println!("{}", identification.analysis.markup_text);
            println!("{}\n", "=".repeat(60));

            println!("[3/3] Writing report...");
            report::write_report(&output, &identification.analysis.markup_text, &identification.raw_data)?;
            println!("✔ Report saved: {}", output.display());

            if let Some(raw_path) = raw_output {
                std::fs::write(&raw_path, &identification.raw_data)?;
                println!("✔ Raw descriptions saved: {}", raw_path.display());
            }

            println!("\n✅ Analysis complete");
        }

        Commands::Species { query, json } => {
            let query = build_query(&config, &query)?;
            let client = flora_id::http::build_client(&config)?;
            let occurrence = OccurrenceClient::from_config(client, &config);

            let species = occurrence.resolve_species(&query).await;
            if species.is_empty() {
                return Err(FloraIdError::NoSpeciesFound(query.taxon_name));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&species)?);
            } else {
                for record in &species {
                    println!("{}", record.scientific_name);
                }
                println!("\n✔ {} species", species.len());
            }
        }

        Commands::Describe { name, sources: requested } => {
            let source_order = pick_sources(&config, requested);
            let client = flora_id::http::build_client(&config)?;
            let sources = sources::build_sources(&source_order, &client, &config);

            println!("Looking up {} ({})...\n", name, describe_order(&source_order));
            let record = flora_id_common::SpeciesRecord::new(name);
            let result = orchestrator::describe_species(&sources, &record).await;

            match result.text() {
                Some(text) => println!("{}", text),
                None => println!("✖ {}", result.failure_reason().unwrap_or_default()),
            }
        }

        Commands::Config { set_api_key, show } => {
            // Edit the file as stored, not the env-resolved copy
            let mut config = Config::load()?;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved to {}", Config::config_path()?.display());
            }

            if show {
                let mut effective = config.clone();
                effective.api_key = effective.resolve_api_key();
                println!("Settings ({}):", Config::config_path()?.display());
                println!("  Model: {}", effective.model);
                println!("  API key: {}", effective.masked_api_key());
                println!("  Sources: {}", describe_order(&effective.source_order));
                println!("  Timeout: {}s", effective.timeout_seconds);
                println!(
                    "  Retries: {} x {}ms, species delay {}ms",
                    effective.retry_attempts, effective.retry_delay_ms, effective.species_delay_ms
                );
                println!(
                    "  Default query: {} within {} km of ({}, {})",
                    effective.default_taxon,
                    effective.default_radius_km,
                    effective.default_latitude,
                    effective.default_longitude
                );
            }
        }
    }

    Ok(())
}

fn build_query(config: &Config, args: &QueryArgs) -> Result<SearchQuery> {
    config.query(args.lat, args.lon, args.radius, args.taxon.as_deref())
}

fn pick_sources(config: &Config, requested: Vec<sources::SourceKind>) -> Vec<sources::SourceKind> {
    if requested.is_empty() {
        config.source_order.clone()
    } else {
        requested
    }
}

fn describe_order(kinds: &[sources::SourceKind]) -> String {
    kinds.iter().map(|k| k.display_name()).collect::<Vec<_>>().join(" → ")
}

fn prompt_notes() -> Result<String> {
    println!("{}\nSPECIMEN DATA ENTRY\n{}", "=".repeat(60), "=".repeat(60));
    Input::<String>::new()
        .with_prompt("Morphological description and locality details")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| FloraIdError::Prompt(e.to_string()))
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Fills the bar once every species has been looked up
fn finish_progress(progress: &ProgressBar) {
    if let Some(len) = progress.length() {
        progress.set_position(len);
    }
    progress.finish_and_clear();
}
