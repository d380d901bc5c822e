//! procura - a terminal client for Frappe procurement sites.
//!
//! Lists procurement requests, purchase orders, service requests, projects
//! and payments in searchable, filterable tables, and exports them as CSV.

mod api;
mod app;
mod cache;
mod config;
mod domain;
mod error;
mod events;
mod export;
mod logging;
mod table;
mod tasks;
mod ui;

use std::io::{self, BufRead, Stdout};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use crate::api::{has_secret, store_secret, AuthScheme, FrappeClient, ListQuery, Record};
use crate::app::App;
use crate::cache::ViewStateStore;
use crate::config::{Config, Profile};
use crate::domain::DoctypeKind;
use crate::error::AppError;
use crate::events::EventHandler;
use crate::export::{CsvExporter, ExportOutcome};
use crate::table::{DataTable, ViewParams};
use crate::tasks::create_task_channel;
use crate::ui::{init_theme, Theme};

#[derive(Parser, Debug)]
#[command(name = "procura", version, about = "Terminal client for Frappe procurement sites")]
struct Cli {
    /// Site profile to use. Defaults to `default_profile` from the config.
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Tab to open first.
    #[arg(short, long, value_enum)]
    doctype: Option<DoctypeKind>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a doctype as CSV without opening the UI.
    Export(ExportArgs),
    /// Save a site profile and store its API secret in the keyring.
    Login(LoginArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(value_enum)]
    doctype: DoctypeKind,

    /// Output directory. Defaults to `export_dir` from the config.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Search term applied like the table search box.
    #[arg(short, long)]
    search: Option<String>,

    /// Keep rows whose FIELD is one of the values, e.g. `status=Approved,Paid`.
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, Vec<String>)>,

    /// Export a report instead of the filtered rows.
    #[arg(short, long)]
    report: Option<String>,
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Profile name.
    name: String,

    /// Site URL, e.g. https://erp.example.com
    #[arg(long)]
    url: String,

    #[arg(long)]
    api_key: String,

    #[arg(long, value_enum, default_value_t = AuthScheme::Token)]
    auth: AuthScheme,

    /// Make this the default profile.
    #[arg(long)]
    default: bool,
}

/// Parse `FIELD=V1,V2`.
fn parse_filter(raw: &str) -> Result<(String, Vec<String>), String> {
    let (field, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE[,VALUE], got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err("filter field cannot be empty".to_string());
    }
    let mut parsed: Vec<String> = Vec::new();
    for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        if !parsed.iter().any(|p| p == value) {
            parsed.push(value.to_string());
        }
    }
    if parsed.is_empty() {
        return Err(format!("filter '{}' has no values", field));
    }
    Ok((field.to_string(), parsed))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Some(Command::Export(args)) => run_export(cli.profile.as_deref(), args).await,
        Some(Command::Login(args)) => run_login(args),
        None => run_tui(cli.profile.as_deref(), cli.doctype).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "Exiting with error");
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            eprintln!("Error: {}", app_error.user_message());
            if let Some(action) = app_error.suggested_action() {
                eprintln!("{}", action);
            }
            logging::shutdown();
            std::process::exit(1);
        }
    }
    logging::shutdown();
    result
}

async fn run_tui(profile: Option<&str>, doctype: Option<DoctypeKind>) -> anyhow::Result<()> {
    let config = Config::load().map_err(AppError::from)?;
    let profile = config.resolve_profile(profile).map_err(AppError::from)?.clone();
    let settings = config.settings.clone();
    init_theme(Theme::named(&settings.theme));

    let (mut rx, spawner) = create_task_channel();
    let mut app = App::new(
        profile.clone(),
        &settings,
        ViewStateStore::open(&profile.name),
        spawner,
        doctype,
    )?;
    app.connect();

    let mut terminal = setup_terminal().map_err(|e| AppError::terminal(e.to_string()))?;
    let events = EventHandler::new(settings.tick_rate());

    let result = (|| -> anyhow::Result<()> {
        while !app.should_quit() {
            terminal.draw(|frame| app.view(frame))?;
            let event = events.next()?;
            app.update(event);
            while let Ok(message) = rx.try_recv() {
                app.handle_api_message(message);
            }
        }
        Ok(())
    })();

    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

async fn run_export(profile: Option<&str>, args: ExportArgs) -> anyhow::Result<()> {
    let config = Config::load().map_err(AppError::from)?;
    let profile = config.resolve_profile(profile).map_err(AppError::from)?;
    let client = FrappeClient::from_profile(profile).map_err(AppError::from)?;
    let kind = args.doctype;

    info!(?kind, profile = %profile.name, "Headless export");
    let query = ListQuery::new(kind.doctype(), kind.fields()).order_by("creation desc");
    let rows = client.get_all(&query).await.map_err(AppError::from)?;
    let table = filtered_table(kind, rows, args.search.as_deref(), &args.filters)?;

    let exporter = CsvExporter::new(args.out.unwrap_or_else(|| config.settings.export_dir()));
    let outcome = match &args.report {
        Some(report_type) => {
            if !kind.report_types().contains(&report_type.as_str()) {
                bail!(
                    "{} has no '{}' report (available: {})",
                    kind.title(),
                    report_type,
                    kind.report_types().join(", ")
                );
            }
            table.export_report(&exporter, report_type)
        }
        None => export_filtered(&table, &exporter, kind),
    };

    match outcome {
        ExportOutcome::Exported { path, rows } => {
            println!("Exported {} rows to {}", rows, path.display());
            Ok(())
        }
        ExportOutcome::Skipped(msg) => {
            println!("{}", msg);
            Ok(())
        }
        ExportOutcome::Failed(msg) => bail!("Export failed: {}", msg),
    }
}

/// A client-mode table over `rows` with the search and filters applied.
fn filtered_table(
    kind: DoctypeKind,
    rows: Vec<Record>,
    search: Option<&str>,
    filters: &[(String, Vec<String>)],
) -> anyhow::Result<DataTable<Record>> {
    let mut table = DataTable::new(kind.namespace(), kind.columns(), kind.options())
        .map_err(AppError::from)?;
    table.set_rows(rows);

    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        let params = ViewParams {
            search: search.trim().to_string(),
            ..ViewParams::default()
        };
        table.restore_view(&params.to_query(&table::Namespace::new(kind.namespace())?));
    }
    for (field, values) in filters {
        if !table.columns().iter().any(|c| c.id == *field) {
            bail!("{} has no column '{}'", kind.title(), field);
        }
        for value in values {
            table.toggle_facet(field, value);
        }
    }
    Ok(table)
}

fn export_filtered(table: &DataTable<Record>, exporter: &CsvExporter, kind: DoctypeKind) -> ExportOutcome {
    let rows = table.filtered_rows();
    if rows.is_empty() {
        return ExportOutcome::Skipped("No rows match".to_string());
    }
    let name = format!("{}_export", kind.namespace());
    match exporter.export(&name, rows.iter().copied(), table.columns()) {
        Ok(path) => ExportOutcome::Exported {
            path,
            rows: rows.len(),
        },
        Err(e) => ExportOutcome::Failed(e.to_string()),
    }
}

fn run_login(args: LoginArgs) -> anyhow::Result<()> {
    let mut config = Config::load().map_err(AppError::from)?;
    let mut profile = Profile::new(&args.name, args.url.trim(), args.api_key.trim());
    profile.auth = args.auth;
    profile.validate().map_err(AppError::from)?;

    if has_secret(&profile.name) {
        eprintln!("Replacing the stored secret for '{}'.", profile.name);
    }
    eprintln!("API secret for {}: ", profile.url);
    let mut secret = String::new();
    io::stdin().lock().read_line(&mut secret)?;
    let secret = secret.trim();
    if secret.is_empty() {
        bail!("No API secret given");
    }
    store_secret(&profile.name, secret).map_err(AppError::from)?;

    if args.default || config.profiles.is_empty() {
        config.settings.default_profile = Some(profile.name.clone());
    }
    let name = profile.name.clone();
    config.upsert_profile(profile);
    config.save().map_err(AppError::from)?;
    info!(profile = %name, "Profile saved");
    println!("Saved profile '{}'", name);
    Ok(())
}
