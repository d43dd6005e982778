mod terminal;

use std::fmt;

use quiz_core::model::LevelId;
use services::{Clock, QuizConfig, QuizServices};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalPresenter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidDbUrl { raw: String },
    InvalidBaseUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBaseUrl { raw } => write!(f, "invalid --base-url value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play] [--db <sqlite_url>] [--base-url <url>] [--level <n>] [--name <name>]");
    eprintln!("  quiz progress [--db <sqlite_url>]");
    eprintln!("  quiz reset    [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --base-url http://localhost:8000/");
    eprintln!();
    eprintln!("Environment (.env is read if present):");
    eprintln!("  QUIZ_DB_URL, QUIZ_BASE_URL, QUIZ_FETCH_TIMEOUT_MS, QUIZ_FETCH_RETRIES,");
    eprintln!("  QUIZ_BACKOFF_MS, QUIZ_SESSION_SIZE, QUIZ_CACHE_VERSION, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Progress,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "progress" => Some(Self::Progress),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    config: QuizConfig,
    level: Option<LevelId>,
    name: Option<String>,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut config = QuizConfig::from_env();
        let mut level = None;
        let mut name = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--base-url" if cmd == Command::Play => {
                    let value = require_value(args, "--base-url")?;
                    config = config
                        .with_base_url(&value)
                        .map_err(|_| ArgsError::InvalidBaseUrl { raw: value.clone() })?;
                }
                "--level" if cmd == Command::Play => {
                    let value = require_value(args, "--level")?;
                    let parsed: LevelId = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                    level = Some(parsed);
                }
                "--name" if cmd == Command::Play => {
                    name = Some(require_value(args, "--name")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            config,
            level,
            name,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        QuizServices::new_sqlite(&parsed.db_url, Clock::default_clock(), parsed.config).await?;
    let persistence = services.persistence();

    match cmd {
        Command::Play => {
            if let Some(name) = &parsed.name {
                persistence.set_player_name(name).await?;
            }
            if let Some(name) = persistence.player_name().await? {
                println!("Welcome, {name}!");
            }

            let mut runner = services.runner(TerminalPresenter::new());
            let last = match parsed.level {
                Some(level) => runner.run_from(level).await,
                None => runner.run().await,
            };
            if let Some(result) = last {
                println!(
                    "Last result: level {} at {}%",
                    result.level,
                    result.display_percent()
                );
            }
            Ok(())
        }
        Command::Progress => {
            let current = persistence.current_level().await?;
            let progress = persistence.progress().await?;
            println!("Current level: {current}");
            if progress.is_empty() {
                println!("No levels completed yet.");
            }
            for (level, percent) in progress.iter() {
                println!("  level {level:>3}: {percent:>3}%");
            }
            Ok(())
        }
        Command::Reset => {
            persistence.reset().await?;
            println!("Progress, cached questions and player name cleared.");
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: Command, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(cmd, &mut iter)
    }

    #[test]
    fn play_flags_are_parsed() {
        let args = parse(
            Command::Play,
            &["--db", "sqlite::memory:", "--level", "level7", "--name", "Ada"],
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.level, Some(LevelId::new(7)));
        assert_eq!(args.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let args = parse(Command::Play, &["--base-url", "https://quiz.example.org/data"]).unwrap();
        assert_eq!(args.config.base_url.as_str(), "https://quiz.example.org/data/");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            parse(Command::Play, &["--level", "abc"]),
            Err(ArgsError::InvalidLevel { .. })
        ));
        assert!(matches!(
            parse(Command::Play, &["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(Command::Progress, &["--level", "2"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }
}
