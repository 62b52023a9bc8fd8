//! CLI entry point for CSV inspection and preprocessing.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use insight_processing::{
    ColumnAnalysis, DatasetService, EncodingMethod, MissingStrategy, Operation, ServiceConfig,
    UploadResponse,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Fill numeric columns with their mean
    Mean,
    /// Fill numeric columns with their median
    Median,
    /// Fill every column with its most frequent value
    Mode,
    /// Drop rows containing any missing value
    Drop,
    /// Fill every column with zero ("0" for text, the epoch for dates)
    FillZero,
}

impl From<CliMissingStrategy> for MissingStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Mean => MissingStrategy::Mean,
            CliMissingStrategy::Median => MissingStrategy::Median,
            CliMissingStrategy::Mode => MissingStrategy::Mode,
            CliMissingStrategy::Drop => MissingStrategy::Drop,
            CliMissingStrategy::FillZero => MissingStrategy::FillZero,
        }
    }
}

/// CLI-compatible encoding method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEncodingMethod {
    /// One 0/1 indicator column per distinct value
    OneHot,
    /// Integer codes in sorted value order
    Label,
}

impl From<CliEncodingMethod> for EncodingMethod {
    fn from(cli: CliEncodingMethod) -> Self {
        match cli {
            CliEncodingMethod::OneHot => EncodingMethod::OneHot,
            CliEncodingMethod::Label => EncodingMethod::Label,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Inspect and preprocess CSV datasets",
    long_about = "Type inference, statistics and preprocessing for CSV files.\n\n\
                  EXAMPLES:\n  \
                  # Column types and summary\n  \
                  csv-insight inspect data.csv\n\n  \
                  # Statistics and chart data for one column\n  \
                  csv-insight analyze data.csv --column age\n\n  \
                  # Apply an operation list and write the result\n  \
                  csv-insight process data.csv --ops ops.json -o clean.csv\n\n  \
                  # Same with flags\n  \
                  csv-insight process data.csv --missing median --encode city --normalize -o clean.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout can be piped: `... --json | jq .rows`
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show inferred column types and the dataset summary
    Inspect {
        /// Path to the CSV file
        file: PathBuf,
    },

    /// Analyze a single column
    Analyze {
        /// Path to the CSV file
        file: PathBuf,

        /// Column to analyze
        #[arg(short, long)]
        column: String,
    },

    /// Pearson correlations between numeric columns
    Correlations {
        /// Path to the CSV file
        file: PathBuf,
    },

    /// Show the first rows
    Preview {
        /// Path to the CSV file
        file: PathBuf,

        /// Number of rows to show
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Apply preprocessing operations and write the result
    Process {
        /// Path to the CSV file
        file: PathBuf,

        /// JSON file holding an operation list; overrides the operation flags
        #[arg(long)]
        ops: Option<PathBuf>,

        /// Columns to drop
        #[arg(long, value_delimiter = ',')]
        drop: Vec<String>,

        /// Missing value strategy
        #[arg(long, value_enum)]
        missing: Option<CliMissingStrategy>,

        /// Columns to encode
        #[arg(long, value_delimiter = ',')]
        encode: Vec<String>,

        /// Encoding method for --encode
        #[arg(long, value_enum, default_value = "one-hot")]
        encoding: CliEncodingMethod,

        /// Normalize columns (all numeric columns when no names are given)
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        normalize: Option<Vec<String>>,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum distinct values for one-hot encoding
        #[arg(long, default_value = "100")]
        max_categories: usize,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file (RUST_LOG)
    dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    match &args.command {
        Command::Inspect { file } => {
            let service = DatasetService::default();
            let upload = upload_file(&service, file)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&upload)?);
            } else {
                let summary = service.summary(&upload.session_id)?;
                print_upload(&upload);
                println!("Nulls: {}", summary.total_nulls);
            }
        }
        Command::Analyze { file, column } => {
            let service = DatasetService::default();
            let upload = upload_file(&service, file)?;
            let analysis = service.analyze_column(&upload.session_id, column)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
        Command::Correlations { file } => {
            let service = DatasetService::default();
            let upload = upload_file(&service, file)?;
            let report = service.correlations(&upload.session_id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", "=".repeat(60));
                println!("CORRELATIONS ({} numeric columns)", report.columns.len());
                println!("{}", "=".repeat(60));
                for pair in &report.correlations {
                    println!(
                        "  {:<20} {:<20} {:>8.4}",
                        truncate_str(&pair.column1, 19),
                        truncate_str(&pair.column2, 19),
                        pair.correlation
                    );
                }
            }
        }
        Command::Preview { file, rows } => {
            let service = DatasetService::default();
            let upload = upload_file(&service, file)?;
            let preview = service.preview(&upload.session_id, *rows)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("{}", preview.columns.join(","));
                for row in &preview.rows {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|value| match value {
                            serde_json::Value::String(s) => s.clone(),
                            serde_json::Value::Null => String::new(),
                            other => other.to_string(),
                        })
                        .collect();
                    println!("{}", cells.join(","));
                }
                println!(
                    "({} of {} rows, {} columns)",
                    preview.rows.len(),
                    preview.total_rows,
                    preview.total_columns
                );
            }
        }
        Command::Process {
            file,
            ops,
            drop,
            missing,
            encode,
            encoding,
            normalize,
            dedup,
            output,
            max_categories,
        } => {
            let config = ServiceConfig::builder()
                .max_one_hot_categories(*max_categories)
                .one_hot_warning_threshold((*max_categories).min(50))
                .build()?;
            let service = DatasetService::new(config);
            let upload = upload_file(&service, file)?;

            let operations = match ops {
                Some(path) => {
                    let json = std::fs::read_to_string(path)?;
                    Operation::list_from_json(&json)?
                }
                None => operations_from_flags(
                    drop,
                    *missing,
                    encode,
                    *encoding,
                    normalize.as_deref(),
                    *dedup,
                ),
            };

            if operations.is_empty() {
                return Err(anyhow!(
                    "No operations given; use --ops or at least one operation flag"
                ));
            }
            debug!("Operations: {:?}", operations);

            let response = service.preprocess(&upload.session_id, &operations)?;

            if let Some(path) = output {
                std::fs::write(path, service.download(&upload.session_id)?)?;
                info!("Wrote processed dataset to {}", path.display());
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", "=".repeat(60));
                println!("{}", response.message.to_uppercase());
                println!("{}", "=".repeat(60));
                for step in &response.steps {
                    println!(
                        "  {}. {:<18} rows {} -> {}, columns {} -> {}",
                        step.step,
                        step.operation,
                        step.rows_before,
                        step.rows_after,
                        step.columns_before,
                        step.columns_after
                    );
                }
                println!();
                println!(
                    "Result: {} rows x {} columns, {} nulls",
                    response.summary.rows, response.summary.columns, response.summary.total_nulls
                );
                if output.is_none() {
                    println!("Use -o <file> to write the processed dataset");
                }
            }
        }
    }

    Ok(())
}

/// Build an operation list from flags, in a fixed order.
fn operations_from_flags(
    drop: &[String],
    missing: Option<CliMissingStrategy>,
    encode: &[String],
    encoding: CliEncodingMethod,
    normalize: Option<&[String]>,
    dedup: bool,
) -> Vec<Operation> {
    let mut operations = Vec::new();

    if !drop.is_empty() {
        operations.push(Operation::DropColumns {
            columns: drop.to_vec(),
        });
    }
    if let Some(strategy) = missing {
        operations.push(Operation::HandleMissing {
            strategy: strategy.into(),
        });
    }
    if !encode.is_empty() {
        let columns = encode.to_vec();
        operations.push(match EncodingMethod::from(encoding) {
            EncodingMethod::OneHot => Operation::OneHotEncode { columns },
            EncodingMethod::Label => Operation::LabelEncode { columns },
        });
    }
    if let Some(columns) = normalize {
        operations.push(Operation::Normalize {
            columns: (!columns.is_empty()).then(|| columns.to_vec()),
        });
    }
    if dedup {
        operations.push(Operation::RemoveDuplicates);
    }

    operations
}

/// Read a file from disk and upload it into a fresh session.
fn upload_file(service: &DatasetService, path: &Path) -> Result<UploadResponse> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }

    info!("Loading dataset from: {}", path.display());
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    Ok(service.upload(&bytes, filename)?)
}

/// Print the inferred schema of an upload.
fn print_upload(upload: &UploadResponse) {
    println!("{}", "=".repeat(80));
    println!("{} ({} rows x {} columns)", upload.filename, upload.rows, upload.columns);
    println!("{}", "=".repeat(80));
    println!(
        "{:<24} {:<12} {:<14} {:>8} {:>10}",
        "Column", "Kind", "Dtype", "Nulls", "Unique"
    );
    println!("{}", "-".repeat(72));

    for info in &upload.column_info {
        println!(
            "{:<24} {:<12} {:<14} {:>8} {:>10}",
            truncate_str(&info.name, 23),
            info.kind.as_str(),
            truncate_str(&info.dtype, 13),
            info.null_count,
            info.unique_count
        );
    }
    println!();
}

/// Print a column analysis.
fn print_analysis(analysis: &ColumnAnalysis) {
    println!("{}", "=".repeat(60));
    println!("COLUMN: {}", analysis.column_name());
    println!("{}", "=".repeat(60));

    match analysis {
        ColumnAnalysis::Empty { message, .. } => println!("  {}", message),
        ColumnAnalysis::Numeric {
            stats, chart_data, ..
        } => {
            println!("  min {:.4}  max {:.4}", stats.min, stats.max);
            println!("  mean {:.4}  median {:.4}  std {:.4}", stats.mean, stats.median, stats.std);
            println!("  q25 {:.4}  q75 {:.4}", stats.q25, stats.q75);
            println!("  nulls {} of {}", stats.null_count, stats.total_count);
            println!();
            let peak = chart_data.iter().map(|b| b.count).max().unwrap_or(0).max(1);
            for bin in chart_data {
                let bar = "#".repeat(bin.count * 40 / peak);
                println!("  {:>20} {:>6} {}", bin.range, bin.count, bar);
            }
        }
        ColumnAnalysis::Categorical {
            stats, chart_data, ..
        } => {
            println!(
                "  unique {}  nulls {} of {}  mode {}",
                stats.unique_count,
                stats.null_count,
                stats.total_count,
                stats.mode.as_deref().unwrap_or("-")
            );
            println!();
            for entry in chart_data {
                println!("  {:<30} {:>6}", truncate_str(&entry.name, 29), entry.value);
            }
        }
    }
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
