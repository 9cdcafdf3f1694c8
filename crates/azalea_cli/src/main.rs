//! Operator CLI for the Azalea Air booking database.
//!
//! # Responsibility
//! - Create or migrate the database file.
//! - Write flight configuration read by the server at startup.
//! - Print configuration status and the current passenger count.
//!
//! # Invariants
//! - Every configure value is attempted; any failure yields exit code 1.

use azalea_core::db::{migrations::latest_version, open_db, DbError};
use azalea_core::{
    default_log_level, init_logging, BookingService, FlightConfigError, FlightConfigService,
    FlightStatus, LogSettings, RepoError, SqliteBookingRepository, SqliteFlightConfigRepository,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const STATUS_RULE: &str = "=============================================";

#[derive(Parser, Debug)]
#[command(name = "azalea", author, version, about = "Azalea Air flight configuration CLI")]
struct Cli {
    /// SQLite database file shared with the server.
    #[arg(long, global = true, default_value = "rsvp_database.db")]
    db: PathBuf,

    /// Write rolling log files into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or migrate the booking database.
    InitDb,
    /// Write flight configuration, then print status.
    Configure(ConfigureArgs),
    /// Print flight configuration and passenger count.
    Status,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = true)]
struct ConfigureArgs {
    /// Departure date, YYYY-MM-DD; must not be in the past.
    #[arg(long, value_name = "YYYY-MM-DD")]
    set_date: Option<String>,

    #[arg(long)]
    flight_number: Option<String>,

    /// Destination city or airport.
    #[arg(long)]
    destination: Option<String>,

    #[arg(long, value_name = "HH:MM")]
    departure_time: Option<String>,
}

#[derive(Debug)]
enum CliError {
    Db(DbError),
    Repo(RepoError),
    Io(io::Error),
    Logging(String),
    ConfigureFailed(usize),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "failed to initialize logging: {message}"),
            Self::ConfigureFailed(count) => write!(f, "{count} configuration value(s) rejected"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Logging(_) | Self::ConfigureFailed(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let today = Local::now().date_naive();
    let mut stdout = io::stdout().lock();

    match run(&cli, today, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("azalea: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, today: NaiveDate, out: &mut dyn Write) -> Result<(), CliError> {
    if let Some(log_dir) = &cli.log_dir {
        let log_dir = if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()?.join(log_dir)
        };
        init_logging(&LogSettings::new(default_log_level(), log_dir)).map_err(CliError::Logging)?;
    }

    let conn = open_db(&cli.db)?;
    match &cli.command {
        Command::InitDb => {
            info!("event=init_db module=cli status=ok");
            writeln!(
                out,
                "Database ready at {} (schema version {})",
                cli.db.display(),
                latest_version()
            )?;
        }
        Command::Configure(args) => {
            let failures = configure(
                &FlightConfigService::new(SqliteFlightConfigRepository::new(&conn)),
                args,
                today,
                out,
            )?;
            writeln!(out)?;
            print_status(&conn, today, out)?;
            if failures > 0 {
                return Err(CliError::ConfigureFailed(failures));
            }
        }
        Command::Status => print_status(&conn, today, out)?,
    }
    Ok(())
}

/// Applies every supplied value and returns how many were rejected.
fn configure(
    service: &FlightConfigService<SqliteFlightConfigRepository<'_>>,
    args: &ConfigureArgs,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<usize, CliError> {
    let mut failures = 0;

    if let Some(raw) = &args.set_date {
        match service.set_departure_date(raw, today) {
            Ok(date) => {
                writeln!(out, "Flight departure date set to: {date}")?;
                writeln!(out, "  Formatted: {}", date.format("%A, %B %d, %Y"))?;
            }
            Err(err) => {
                failures += 1;
                writeln!(out, "Error: {err}")?;
            }
        }
    }

    failures += apply(out, "Flight number", args.flight_number.as_deref(), |raw| {
        service.set_flight_number(raw)
    })?;
    failures += apply(out, "Destination", args.destination.as_deref(), |raw| {
        service.set_destination(raw)
    })?;
    failures += apply(out, "Departure time", args.departure_time.as_deref(), |raw| {
        service.set_departure_time(raw)
    })?;

    Ok(failures)
}

/// Writes one value through `set`, reporting the outcome on `out`.
fn apply(
    out: &mut dyn Write,
    label: &str,
    value: Option<&str>,
    set: impl FnOnce(&str) -> Result<(), FlightConfigError>,
) -> Result<usize, CliError> {
    let Some(raw) = value else {
        return Ok(0);
    };
    match set(raw) {
        Ok(()) => {
            writeln!(out, "{label} set to: {}", raw.trim())?;
            Ok(0)
        }
        Err(err) => {
            writeln!(out, "Error: {err}")?;
            Ok(1)
        }
    }
}

fn print_status(
    conn: &Connection,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let status = FlightConfigService::new(SqliteFlightConfigRepository::new(conn)).status(today)?;
    let passengers = BookingService::new(SqliteBookingRepository::new(conn)).count_bookings()?;

    writeln!(out, "Azalea Air Flight Configuration Status")?;
    writeln!(out, "{STATUS_RULE}")?;
    write_flight_status(&status, out)?;
    writeln!(out, "Current passengers: {passengers}")?;
    Ok(())
}

fn write_flight_status(status: &FlightStatus, out: &mut dyn Write) -> io::Result<()> {
    let Some(config) = &status.config else {
        writeln!(out, "Departure date: not configured")?;
        writeln!(out, "  Run `azalea configure --set-date YYYY-MM-DD` first.")?;
        return Ok(());
    };

    writeln!(out, "Departure date: {}", config.departure_date.format("%Y-%m-%d"))?;
    writeln!(out, "  Formatted: {}", config.formatted_date())?;
    if let Some(updated_at) = status.departure_updated_at {
        writeln!(out, "  Updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    match status.days_until_departure {
        Some(days) if days < 0 => {
            writeln!(out, "  WARNING: date is {} days in the past!", days.abs())?
        }
        Some(0) => writeln!(out, "  DEPARTURE DAY: flight departs today!")?,
        Some(days) => writeln!(out, "  {days} days until departure")?,
        None => {}
    }

    writeln!(out, "Departure time: {}", config.departure_time.format("%H:%M"))?;
    writeln!(
        out,
        "Flight number: {}{}",
        config.flight_number,
        default_marker(status.flight_number_is_default)
    )?;
    writeln!(
        out,
        "Destination: {}{}",
        config.destination,
        default_marker(status.destination_is_default)
    )?;
    Ok(())
}

fn default_marker(is_default: bool) -> &'static str {
    if is_default {
        " (default)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, CliError};
    use azalea_core::db::open_db;
    use azalea_core::{BookingRequest, BookingService, FlightConfig, SqliteBookingRepository};
    use chrono::NaiveDate;
    use clap::Parser;
    use std::path::Path;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn invoke(db: &Path, args: &[&str]) -> (Result<(), CliError>, String) {
        let db = db.to_str().unwrap();
        let argv = ["azalea", "--db", db].into_iter().chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let result = run(&cli, today(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn init_db_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("rsvp.db");

        let (result, output) = invoke(&db, &["init-db"]);
        assert!(result.is_ok());
        assert!(db.exists());
        assert!(output.contains("schema version"));
    }

    #[test]
    fn configure_writes_values_and_prints_status() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("rsvp.db");

        let (result, output) = invoke(
            &db,
            &[
                "configure",
                "--set-date",
                "2025-10-30",
                "--flight-number",
                "AA-3010",
                "--destination",
                "Padang",
            ],
        );
        assert!(result.is_ok(), "{output}");
        assert!(output.contains("Flight departure date set to: 2025-10-30"));
        assert!(output.contains("29 days until departure"));
        assert!(output.contains("Flight number: AA-3010\n"));
        assert!(output.contains("Destination: Padang\n"));
        assert!(output.contains("Current passengers: 0"));
    }

    #[test]
    fn configure_rejects_past_date_with_failure_exit() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("rsvp.db");

        let (result, output) = invoke(&db, &["configure", "--set-date", "2025-09-01"]);
        assert!(matches!(result, Err(CliError::ConfigureFailed(1))));
        assert!(output.contains("in the past"));
        assert!(output.contains("Departure date: not configured"));
    }

    #[test]
    fn configure_requires_at_least_one_value() {
        assert!(Cli::try_parse_from(["azalea", "configure"]).is_err());
    }

    #[test]
    fn status_reports_defaults_and_passenger_count() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("rsvp.db");
        invoke(&db, &["configure", "--set-date", "2025-10-01"]).0.unwrap();

        {
            let conn = open_db(&db).unwrap();
            let flight = FlightConfig::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
            BookingService::new(SqliteBookingRepository::new(&conn))
                .create_booking(&BookingRequest::new("a@x.com", "vegan"), Some(&flight))
                .unwrap();
        }

        let (result, output) = invoke(&db, &["status"]);
        assert!(result.is_ok());
        assert!(output.contains("DEPARTURE DAY"));
        assert!(output.contains("Flight number: AA-2025 (default)"));
        assert!(output.contains("Destination: Destination TBD (default)"));
        assert!(output.contains("Current passengers: 1"));
    }
}
