//! EventDesk command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `eventdesk_core` facade calls.
//! - Print results as pretty JSON on stdout and failures on stderr.
//! - Translate core error classes into stable exit codes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use eventdesk_core::{
    init_logging, ConfigError, ErrorKind, EventDesk, EventDeskConfig, EventServiceError, NewEvent,
    RegistrationError, StoreStatus, TimeInput,
};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Event scheduling and attendee registration", version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the SQLite database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Override the log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write rolling logs to this absolute directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ensure the database schema and report store status; exits 5 when degraded
    Init,

    /// Create an event; local times are read in the event timezone
    CreateEvent {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// `YYYY-MM-DDTHH:MM[:SS]` wall-clock time or RFC 3339
        #[arg(long)]
        start: TimeInput,

        #[arg(long)]
        end: TimeInput,

        #[arg(long, allow_hyphen_values = true)]
        capacity: i64,

        /// Timezone code; defaults to the configured default
        #[arg(short, long)]
        timezone: Option<String>,
    },

    /// List events, latest start first
    ListEvents(PageArgs),

    /// Show one event
    GetEvent { id: i64 },

    /// Show one event with all of its attendees
    EventDetails { id: i64 },

    /// Show one event with times rendered in another timezone
    Localize {
        id: i64,

        #[arg(short, long)]
        timezone: String,
    },

    /// Register an attendee for an event
    Register {
        event_id: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// List attendees of an event
    Attendees {
        event_id: i64,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Count attendees of an event
    Count { event_id: i64 },

    /// Delete an event and its registrations
    DeleteEvent { id: i64 },

    /// List supported timezone codes
    Timezones,

    /// Report store health
    Health,
}

#[derive(Args)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Defaults to the configured page size
    #[arg(long, conflicts_with = "all")]
    limit: Option<u32>,

    /// Return every row
    #[arg(long)]
    all: bool,
}

impl PageArgs {
    fn limit(&self, config: &EventDeskConfig) -> Option<u32> {
        if self.all {
            None
        } else {
            Some(self.limit.unwrap_or(config.default_page_size))
        }
    }
}

#[derive(Serialize)]
struct CountOutput {
    event_id: i64,
    count: u64,
}

#[derive(Serialize)]
struct StatusOutput {
    status: &'static str,
    database_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// `init` found the store unusable after printing its status.
#[derive(Debug)]
struct StoreDegraded {
    reason: String,
}

impl Display for StoreDegraded {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "store is degraded: {}", self.reason)
    }
}

impl Error for StoreDegraded {}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            error!("event=cli_command module=cli status=error exit_code={code}");
            eprintln!("error: {err:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_logging(config.log_level.as_str(), config.log_target())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let (desk, status) = EventDesk::bootstrap(&config);
    if !status.is_ready() {
        // Store calls fail as infrastructure errors; health still answers.
        info!("event=cli_store module=cli status=degraded");
    }

    match cli.command {
        Command::Init => {
            let reason = match status {
                StoreStatus::Ready => None,
                StoreStatus::Degraded { reason } => Some(reason),
            };
            print_json(&StatusOutput {
                status: if reason.is_none() { "ready" } else { "degraded" },
                database_path: desk.store().path().display().to_string(),
                reason: reason.clone(),
            })?;
            match reason {
                Some(reason) => Err(StoreDegraded { reason }.into()),
                None => Ok(()),
            }
        }
        Command::CreateEvent {
            name,
            location,
            start,
            end,
            capacity,
            timezone,
        } => {
            let input = NewEvent::new(name, location, start, end, capacity)
                .in_timezone(timezone.unwrap_or_else(|| config.default_timezone.clone()));
            print_json(&desk.create_event(&input)?)
        }
        Command::ListEvents(page) => {
            print_json(&desk.list_events(page.offset, page.limit(&config))?)
        }
        Command::GetEvent { id } => print_json(&desk.get_event(id)?),
        Command::EventDetails { id } => print_json(&desk.get_event_with_attendees(id)?),
        Command::Localize { id, timezone } => {
            print_json(&desk.get_event_localized(id, timezone.as_str())?)
        }
        Command::Register {
            event_id,
            name,
            email,
        } => print_json(&desk.register_attendee(event_id, name.as_str(), email.as_str())?),
        Command::Attendees { event_id, page } => print_json(&desk.list_attendees(
            event_id,
            page.offset,
            page.limit(&config),
        )?),
        Command::Count { event_id } => print_json(&CountOutput {
            event_id,
            count: desk.count_attendees(event_id)?,
        }),
        Command::DeleteEvent { id } => {
            desk.delete_event(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Timezones => print_json(&desk.list_supported_timezones()),
        Command::Health => print_json(&desk.health()),
    }
}

fn load_config(cli: &Cli) -> Result<EventDeskConfig> {
    let mut config = match &cli.config {
        Some(path) => EventDeskConfig::from_toml_file(path)?,
        None => EventDeskConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(path) = &cli.database {
        config.database_path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = if let Some(err) = err.downcast_ref::<EventServiceError>() {
        Some(err.kind())
    } else if let Some(err) = err.downcast_ref::<RegistrationError>() {
        Some(err.kind())
    } else if err.downcast_ref::<ConfigError>().is_some() {
        Some(ErrorKind::Validation)
    } else if err.downcast_ref::<StoreDegraded>().is_some() {
        Some(ErrorKind::Infrastructure)
    } else {
        None
    };

    match kind {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::Infrastructure) => 5,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code, Cli, Command, StoreDegraded};
    use clap::Parser;
    use eventdesk_core::{ConfigError, EventServiceError, RegistrationError};

    #[test]
    fn exit_codes_follow_error_kind() {
        let not_found = anyhow::Error::new(EventServiceError::EventNotFound(3));
        assert_eq!(exit_code(&not_found), 3);

        let conflict = anyhow::Error::new(RegistrationError::CapacityExceeded {
            event_id: 1,
            max_capacity: 2,
        });
        assert_eq!(exit_code(&conflict), 4);

        let config = anyhow::Error::new(ConfigError::Invalid("bad".to_string()));
        assert_eq!(exit_code(&config), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn degraded_store_on_init_exits_as_infrastructure() {
        let degraded = anyhow::Error::new(StoreDegraded {
            reason: "unable to open database file".to_string(),
        });
        assert_eq!(exit_code(&degraded), 5);
        assert!(degraded.to_string().contains("unable to open database file"));
    }

    #[test]
    fn create_event_parses_times_and_negative_capacity() {
        let cli = Cli::try_parse_from([
            "eventdesk",
            "create-event",
            "--name",
            "Meetup",
            "--location",
            "Pune",
            "--start",
            "2025-03-01T09:30",
            "--end",
            "2025-03-01T11:00:00+05:30",
            "--capacity",
            "-1",
        ])
        .unwrap();
        match cli.command {
            Command::CreateEvent {
                capacity, timezone, ..
            } => {
                assert_eq!(capacity, -1);
                assert!(timezone.is_none());
            }
            _ => panic!("expected create-event"),
        }
    }

    #[test]
    fn limit_and_all_conflict() {
        assert!(Cli::try_parse_from(["eventdesk", "list-events", "--all", "--limit", "5"]).is_err());
    }
}
