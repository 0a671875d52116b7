use clap::{Parser, Subcommand};
use crate::config::REPORT_FILE_NAME;
use crate::sources::SourceKind;
use flora_id_common::{MAX_RADIUS_KM, MIN_RADIUS_KM};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flora-id")]
#[command(about = "Specimen identification from nearby occurrences and published descriptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Search window shared by `identify` and `species`; unset values come
/// from the config file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Latitude of the collection site (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the collection site (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Search radius in km (1-100)
    #[arg(short, long, value_parser = parse_radius)]
    pub radius: Option<f64>,

    /// Taxon to search within (family, genus, ...)
    #[arg(short, long)]
    pub taxon: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full identification and write the HTML report
    Identify {
        #[command(flatten)]
        query: QueryArgs,

        /// Morphological and locality notes on the specimen (prompted if omitted)
        #[arg(short, long)]
        notes: Option<String>,

        /// Text from the specimen label
        #[arg(short, long)]
        label: Option<String>,

        /// Report file
        #[arg(short, long, default_value = REPORT_FILE_NAME)]
        output: PathBuf,

        /// Also save the verbatim scraped descriptions to this file
        #[arg(long)]
        raw_output: Option<PathBuf>,

        /// Description sources in lookup order (repeatable)
        #[arg(short, long = "source", value_enum)]
        sources: Vec<SourceKind>,
    },

    /// List the species recorded in the search window
    Species {
        #[command(flatten)]
        query: QueryArgs,

        /// Print JSON instead of one name per line
        #[arg(long)]
        json: bool,
    },

    /// Look up the description of a single species
    Describe {
        /// Scientific name; only genus and epithet are used for the lookup
        #[arg(required = true)]
        name: String,

        /// Description sources in lookup order (repeatable)
        #[arg(short, long = "source", value_enum)]
        sources: Vec<SourceKind>,
    },

    /// Show or edit settings
    Config {
        /// Store the Gemini API key
        #[arg(long)]
        set_api_key: Option<String>,

        /// Print the effective settings
        #[arg(long)]
        show: bool,
    },
}

pub fn parse_radius(s: &str) -> Result<f64, String> {
    let radius: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid radius: {}. Use a number of km", s))?;
    if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius) {
        return Err(format!(
            "Radius {} km out of range. Use {} to {} km",
            s, MIN_RADIUS_KM, MAX_RADIUS_KM
        ));
    }
    Ok(radius)
}
