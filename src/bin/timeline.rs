//! Timeline CLI - Command-line interface for Lastseen Timeline
//!
//! Commands:
//! - render: Run the full pipeline over a change log and write the payload
//! - entrances: Print the hourly entrance histogram
//! - validate: Validate change log records
//! - doctor: Diagnose configuration and environment
//! - schema: Print the input and output schemas

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use lastseen_timeline::config::{parse_timezone, DEFAULT_RANGE_DAYS};
use lastseen_timeline::encoder::{FrameEncoder, PAYLOAD_SCHEMA_VERSION};
use lastseen_timeline::entrance::EntranceDetector;
use lastseen_timeline::normalizer::Normalizer;
use lastseen_timeline::schema::{parse_instant, RawObservation, RawObservationAdapter};
use lastseen_timeline::types::EntranceSummary;
use lastseen_timeline::{
    ComputeError, Snapshot, TimeRange, TimelineConfig, TimelinePipeline, WindowWidth,
    Windower, PRODUCER_NAME, SCHEMA_VERSION, TIMELINE_VERSION,
};

const MS_PER_DAY: i64 = 86_400_000;

/// Timeline - staleness timeline engine for last-seen presence logs
#[derive(Parser)]
#[command(name = "timeline")]
#[command(author = "Lastseen Timeline Contributors")]
#[command(version = TIMELINE_VERSION)]
#[command(about = "Turn a last-seen change log into a staleness timeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the timeline payload
    Render {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Range start (RFC 3339); defaults to 7 days before --to
        #[arg(long)]
        from: Option<String>,

        /// Range end (RFC 3339); defaults to now
        #[arg(long)]
        to: Option<String>,

        /// Visible window width in hours (6, 24, 72 or 168)
        #[arg(long)]
        width_hours: Option<u32>,

        /// Pan the window from the range end by this many ms (negative is back)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pan_ms: i64,

        /// Configuration file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Civil timezone for hour-of-day bucketing (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Print the hourly entrance histogram and the last entrance
    Entrances {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Configuration file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Civil timezone for hour-of-day bucketing (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate change log records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// One compact payload per line
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (lastseen.change.v1)
    Input,
    /// Output schema (lastseen.timeline.v1)
    Output,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Human-readable logs on stderr, filtered by RUST_LOG (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn run(cli: Cli) -> Result<(), TimelineCliError> {
    match cli.command {
        Commands::Render {
            input,
            input_format,
            from,
            to,
            width_hours,
            pan_ms,
            config,
            timezone,
            output,
            output_format,
        } => {
            let config = resolve_config(config.as_deref(), timezone)?;
            let range = resolve_range(from.as_deref(), to.as_deref())?;
            let width = match width_hours {
                Some(hours) => WindowWidth::from_hours(hours)?,
                None => config.default_width,
            };
            cmd_render(
                &input,
                input_format,
                range,
                width,
                pan_ms,
                config,
                &output,
                output_format,
            )
        }

        Commands::Entrances {
            input,
            input_format,
            config,
            timezone,
            json,
        } => {
            let config = resolve_config(config.as_deref(), timezone)?;
            cmd_entrances(&input, input_format, &config, json)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    input: &Path,
    input_format: InputFormat,
    range: TimeRange,
    width: WindowWidth,
    pan_ms: i64,
    config: TimelineConfig,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), TimelineCliError> {
    let records = read_records(input, &input_format)?;
    if records.is_empty() {
        warn!("no records in input; rendering an empty timeline");
    }

    let pipeline = TimelinePipeline::new(config)?;
    let snapshot = Snapshot::from_records(0, range, &records);
    let mut windower = Windower::new(range, width);
    windower.pan(pan_ms);

    let frame = pipeline.compute(&snapshot, &windower);
    info!(
        records = records.len(),
        visible_from = frame.axis.visible_from,
        visible_to = frame.axis.visible_to,
        "rendered timeline"
    );

    let encoder = FrameEncoder::new();
    let output_data = match output_format {
        OutputFormat::Json => encoder.encode_to_json(&frame)?,
        OutputFormat::JsonPretty => encoder.encode_to_json_pretty(&frame)?,
        OutputFormat::Ndjson => encoder.encode_to_json(&frame)? + "\n",
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data.trim_end());
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_entrances(
    input: &Path,
    input_format: InputFormat,
    config: &TimelineConfig,
    json: bool,
) -> Result<(), TimelineCliError> {
    let records = read_records(input, &input_format)?;
    let observations = Normalizer::normalize_records(&records);
    let detector = EntranceDetector::from_config(config)?;
    let summary = detector.summarize(&observations);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_entrances(&summary, &config.timezone);
    }
    Ok(())
}

fn print_entrances(summary: &EntranceSummary, timezone: &str) {
    println!("Entrances by hour ({})", timezone);
    println!("=======================");
    let peak = summary
        .entries_by_hour
        .iter()
        .map(|h| h.count)
        .max()
        .unwrap_or(0)
        .max(1);
    for h in &summary.entries_by_hour {
        let bar = "#".repeat((h.count * 40 / peak) as usize);
        println!("  {:02}:00 {:>4} {}", h.hour, h.count, bar);
    }

    let last = summary
        .last_entrance_at
        .and_then(lastseen_timeline::schema::format_instant)
        .unwrap_or_else(|| "none".to_string());
    println!("\nLast entrance: {}", last);
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), TimelineCliError> {
    let records = read_records(input, &input_format)?;
    let results = RawObservationAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                error: r.result.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(TimelineCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), TimelineCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "timeline_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Timeline version {}", TIMELINE_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Input schema: {}", SCHEMA_VERSION),
        },
    ];

    let loaded = match config {
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: format!("{} does not exist, using defaults", path.display()),
            });
            Some(TimelineConfig::default())
        }
        Some(path) => match TimelineConfig::load(path) {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} is valid", path.display()),
                });
                Some(config)
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                });
                None
            }
        },
        None => Some(TimelineConfig::default()),
    };

    if let Some(config) = loaded {
        let status = match parse_timezone(&config.timezone) {
            Ok(_) => DoctorCheck {
                name: "timezone".to_string(),
                status: CheckStatus::Ok,
                message: format!("Hour-of-day bucketing in {}", config.timezone),
            },
            Err(e) => DoctorCheck {
                name: "timezone".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        checks.push(status);
        checks.push(DoctorCheck {
            name: "window".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Default window {} at a {} min step",
                config.default_width.label(),
                config.sample_step_ms / 60_000
            ),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TIMELINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Timeline Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TimelineCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), TimelineCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One record per capture of the contact's last-seen value:");
                println!("- captured_at: RFC 3339 instant the value was read");
                println!("- last_seen_at: RFC 3339 last-seen value at that capture");
                println!();
                println!("Records may arrive in any order; they are sorted by captured_at.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", output_json_schema());
            } else {
                println!("Output Schema: {}", PAYLOAD_SCHEMA_VERSION);
                println!();
                println!("- producer: {{ name, version }}");
                println!("- generation: snapshot generation the frame was computed from");
                println!("- visibleFrom, visibleTo, signedMax: axis configuration (ms, minutes)");
                println!("- tickFormat, tickCount: x-axis hints");
                println!("- overview: raw in-window series, null where undefined");
                println!("- fresh, warm, stale, cold: banded series of {{ t, value, lastSeenAt }}");
                println!("- entriesByHour: 24 x {{ hour, count }}; lastEntranceAt");
                println!("- observationsCount, latestLastSeenAt, latestAgeMinutes: KPIs");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<RawObservation>, TimelineCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Ndjson => RawObservationAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => RawObservationAdapter::parse_array(&input_data)?,
    };
    Ok(records)
}

fn resolve_config(
    path: Option<&Path>,
    timezone: Option<String>,
) -> Result<TimelineConfig, TimelineCliError> {
    let mut config = match path {
        Some(path) => TimelineConfig::load(path)?,
        None => TimelineConfig::default(),
    };
    if let Some(tz) = timezone {
        config.timezone = tz;
        config.validate()?;
    }
    Ok(config)
}

fn resolve_range(from: Option<&str>, to: Option<&str>) -> Result<TimeRange, TimelineCliError> {
    let to = match to {
        Some(iso) => parse_instant(iso)?,
        None => Utc::now().timestamp_millis(),
    };
    let from = match from {
        Some(iso) => parse_instant(iso)?,
        None => to - DEFAULT_RANGE_DAYS * MS_PER_DAY,
    };
    Ok(TimeRange::new(from, to)?)
}

fn input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "One capture of a contact's last-seen value",
        "type": "object",
        "required": ["captured_at", "last_seen_at"],
        "properties": {
            "captured_at": { "type": "string", "format": "date-time" },
            "last_seen_at": { "type": "string", "format": "date-time" }
        }
    })
    .to_string()
}

fn output_json_schema() -> String {
    let point = serde_json::json!({
        "type": "object",
        "required": ["t", "value", "lastSeenAt"],
        "properties": {
            "t": { "type": "integer" },
            "value": { "type": ["number", "null"] },
            "lastSeenAt": { "type": "integer" }
        }
    });
    let series = serde_json::json!({ "type": "array", "items": point });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": PAYLOAD_SCHEMA_VERSION,
        "description": "Render-ready staleness timeline",
        "type": "object",
        "required": [
            "schemaVersion", "producer", "generation", "visibleFrom", "visibleTo",
            "signedMax", "overview", "fresh", "warm", "stale", "cold", "entriesByHour"
        ],
        "properties": {
            "schemaVersion": { "type": "string", "const": PAYLOAD_SCHEMA_VERSION },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" }
                }
            },
            "generation": { "type": "integer" },
            "visibleFrom": { "type": "integer" },
            "visibleTo": { "type": "integer" },
            "signedMax": { "type": "integer", "minimum": 15, "maximum": 180, "multipleOf": 5 },
            "tickFormat": { "type": "string" },
            "tickCount": { "type": "integer" },
            "overview": series,
            "fresh": series,
            "warm": series,
            "stale": series,
            "cold": series,
            "entriesByHour": {
                "type": "array",
                "minItems": 24,
                "maxItems": 24,
                "items": {
                    "type": "object",
                    "properties": {
                        "hour": { "type": "integer", "minimum": 0, "maximum": 23 },
                        "count": { "type": "integer", "minimum": 0 }
                    }
                }
            },
            "lastEntranceAt": { "type": ["integer", "null"] },
            "observationsCount": { "type": "integer" },
            "latestLastSeenAt": { "type": ["integer", "null"] },
            "latestAgeMinutes": { "type": ["integer", "null"] }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum TimelineCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for TimelineCliError {
    fn from(e: io::Error) -> Self {
        TimelineCliError::Io(e)
    }
}

impl From<ComputeError> for TimelineCliError {
    fn from(e: ComputeError) -> Self {
        TimelineCliError::Compute(e)
    }
}

impl From<serde_json::Error> for TimelineCliError {
    fn from(e: serde_json::Error) -> Self {
        TimelineCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TimelineCliError> for CliError {
    fn from(e: TimelineCliError) -> Self {
        match e {
            TimelineCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TimelineCliError::Compute(e) => compute_error(e),
            TimelineCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TimelineCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            TimelineCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn compute_error(e: ComputeError) -> CliError {
    let (code, hint) = match &e {
        ComputeError::ParseError(_) | ComputeError::JsonError(_) => (
            "PARSE_ERROR",
            "Ensure input matches the lastseen.change.v1 schema; --input-format selects ndjson or json",
        ),
        ComputeError::InvalidTimezone(_) => (
            "INVALID_TIMEZONE",
            "Use an IANA timezone name such as Europe/Kyiv",
        ),
        ComputeError::DateParseError(_) => (
            "DATE_PARSE_ERROR",
            "Use RFC 3339 timestamps such as 2024-01-15T08:00:00Z",
        ),
        ComputeError::InvalidRange { .. } => ("INVALID_RANGE", "--from must not be after --to"),
        ComputeError::RangeTooLong { .. } => {
            ("RANGE_TOO_LONG", "Narrow --from/--to to at most 366 days")
        }
        ComputeError::UnsupportedWindowWidth(_) => {
            ("UNSUPPORTED_WIDTH", "--width-hours accepts 6, 24, 72 or 168")
        }
        ComputeError::ConfigError(_) => ("CONFIG_ERROR", "Run 'timeline doctor --config <path>'"),
    };
    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: Some(hint.to_string()),
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
