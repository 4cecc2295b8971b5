use clap::{Parser, ValueEnum};
use log::error;
use station_fluctuation::{AnyTimeBound, ReadingLoader, WeatherReport};
use std::path::PathBuf;
use std::process::ExitCode;

/// Output format of the report.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Reports the coldest reading and the stations with the most temperature
/// fluctuation in a CSV (optionally gzip or zip compressed) of station readings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CSV file with station_id,date,temperature_c columns, or a .csv.gz / .csv.zip archive of one.
    #[arg(long, env = "FLUCTUATION_DATA", default_value = "data/data.csv.gz")]
    data: PathBuf,

    /// Directory to extract compressed data into (defaults to the archive's directory).
    #[arg(long, env = "FLUCTUATION_EXTRACT_DIR")]
    extract_dir: Option<PathBuf>,

    /// Start of the fluctuation time window (inclusive).
    #[arg(long, default_value = "2000.001", allow_hyphen_values = true)]
    start: String,

    /// End of the fluctuation time window (inclusive).
    #[arg(long, default_value = "2000.456", allow_hyphen_values = true)]
    end: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Set RUST_LOG=info (or debug) to see progress messages.
    env_logger::init();
    let args = Args::parse();

    let loader = match &args.extract_dir {
        Some(dir) => ReadingLoader::with_extract_dir(dir),
        None => ReadingLoader::new(),
    };
    let readings = match loader.load(&args.data).await {
        Ok(readings) => readings,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Non-numeric bounds are passed on as missing so the report shows the bound error.
    let report = match WeatherReport::builder()
        .readings(&readings)
        .maybe_start(args.start.as_str().get_time_bound())
        .maybe_end(args.end.as_str().get_time_bound())
        .build()
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.format {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}
