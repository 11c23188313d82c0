use civitrack::config::{Config, ConfigOverrides};
use civitrack::engine::{Engine, ListRequest, RegistrationRequest, ReportRequest};
use civitrack::error::{CivicError, StructuredError};
use civitrack::logging::init_logging;
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "civitrack",
    version,
    about = "Civic issue reporting and moderation engine"
)]
struct Cli {
    /// Database path (falls back to CIVITRACK_DB, then ./civitrack.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply the schema
    Init,

    /// Create an account; used to bootstrap admin and council users
    CreateUser {
        username: String,
        email: String,
        #[arg(long, env = "CIVITRACK_PASSWORD", hide_env_values = true)]
        password: String,
        /// admin, council or citizen
        #[arg(long, default_value = "admin")]
        role: String,
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Submit an issue report from the command line
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },

    /// List issues, newest first
    List {
        /// Filter by status; "all" disables the filter
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<String>,
        #[arg(long)]
        offset: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        handle_error(&e, json_mode);
    }
}

fn run(cli: Cli) -> civitrack::Result<()> {
    let overrides = ConfigOverrides {
        db_path: cli.db.clone(),
        ..ConfigOverrides::default()
    };
    let config = Config::load(&overrides);

    match cli.command {
        Commands::Init => {
            let _engine = Engine::open(&config)?;
            println!("Initialized database at {}", config.db_path.display());
        }
        Commands::CreateUser {
            username,
            email,
            password,
            role,
            full_name,
        } => {
            let mut engine = Engine::open(&config)?;
            let user = engine.register_user(RegistrationRequest {
                username,
                email,
                password,
                role: Some(role),
                full_name,
                phone: None,
            })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Created {} user {} ({})", user.role, user.username, user.id);
            }
        }
        Commands::Report {
            title,
            description,
            category,
            location,
            name,
            email,
        } => {
            let mut engine = Engine::open(&config)?;
            let issue = engine.submit_report(ReportRequest {
                title,
                description,
                category,
                location,
                reporter_name: name,
                reporter_email: email,
                ..ReportRequest::default()
            })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&issue)?);
            } else {
                println!("Accepted report {}", issue.id);
            }
        }
        Commands::List {
            status,
            category,
            search,
            limit,
            offset,
        } => {
            let engine = Engine::open(&config)?;
            let page = engine.list_issues(ListRequest {
                status,
                category,
                search,
                limit,
                offset,
                ..ListRequest::default()
            })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                for issue in &page.items {
                    println!(
                        "{}  {:<12} {:<8} {}",
                        issue.id, issue.status, issue.priority, issue.title
                    );
                }
                println!(
                    "{} of {} issue(s)",
                    page.items.len(),
                    page.pagination.total
                );
            }
        }
    }
    Ok(())
}

/// Print a failure and exit.
///
/// JSON goes to stderr when --json is set or stdout is not a terminal;
/// otherwise a short human-readable message with the hint, if any.
fn handle_error(err: &CivicError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("error: {}", structured.message);
        if let Some(ref hint) = structured.hint {
            eprintln!("hint: {hint}");
        }
    }

    std::process::exit(if err.is_caller_fixable() { 2 } else { 1 });
}
