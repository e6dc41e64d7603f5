//! caddylander-edit - Main Entry Point
//!
//! Headless driver for the editing workflow: load, save, export, and restore
//! caddyLander documents from the command line.

use caddylander_editor::config::{load_config, save_config, Settings};
use caddylander_editor::editor::{EditorSurface, MemorySurface};
use caddylander_editor::export::write_to_dir;
use caddylander_editor::transport::HttpTransport;
use caddylander_editor::{admin, Error, Result, WorkflowController};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Application name constant.
const APP_NAME: &str = "caddylander-edit";

type Editor = WorkflowController<MemorySurface, HttpTransport>;

#[derive(Parser)]
#[command(name = APP_NAME, version, about = "Edit caddyLander's content.json and Caddyfile")]
struct Cli {
    /// Server base URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Admin user name
    #[arg(long, global = true)]
    user: Option<String>,

    /// Admin password
    #[arg(long, global = true, env = "CADDYLANDER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a document as the editor would show it
    Show { document: Option<String> },
    /// Replace a document with the contents of a file (`-` for stdin)
    Save { document: String, file: PathBuf },
    /// Download a document into a directory
    Export {
        document: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List a document's backups
    Backups { document: String },
    /// Print one backup
    Backup { document: String, name: String },
    /// Restore a backup over the live document
    Restore { document: String, name: String },
    /// Show server admin info
    Info,
    /// Store the effective server and user as future defaults
    Remember,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(line) = failure_line(&e) {
                eprintln!("{}", line);
            }
            ExitCode::FAILURE
        }
    }
}

fn settings_for(cli: &Cli) -> Settings {
    let mut settings = load_config();
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(user) = &cli.user {
        settings.username = user.clone();
    }
    if let Some(password) = &cli.password {
        settings.password = Some(password.clone());
    }
    settings.sanitize();
    settings
}

async fn run(cli: Cli) -> Result<()> {
    let settings = settings_for(&cli);
    info!("Starting {} against {}", APP_NAME, settings.server_url);

    let transport = HttpTransport::from_settings(&settings)?;
    let (surface, events) = MemorySurface::new();
    let mut editor: Editor = WorkflowController::new(surface, events, transport);
    editor.on_backups_changed(|| info!("Backup history changed"));

    let result = execute(&mut editor, &settings, cli.command).await;
    if let Err(e) = &result {
        if let Some(document) = e.document() {
            print_status(&editor, document);
        }
    }
    result
}

async fn execute(editor: &mut Editor, settings: &Settings, command: Command) -> Result<()> {
    match command {
        Command::Show { document } => {
            let document = document.unwrap_or_else(|| settings.default_document.clone());
            editor.load(&document).await?;
            print!("{}", editor.surface().content());
            print_status(editor, &document);
        }
        Command::Save { document, file } => {
            let content = read_input(&file)?;
            editor.load(&document).await?;
            editor.surface_mut().edit(content);
            editor.save().await?;
            print_status(editor, &document);
        }
        Command::Export { document, out } => {
            let document = document.unwrap_or_else(|| settings.default_document.clone());
            editor.load(&document).await?;
            let export = editor.export_active()?;
            let dir = out
                .or_else(|| settings.export_directory.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let path = write_to_dir(&export, &dir)?;
            println!("{}", path.display());
        }
        Command::Backups { document } => {
            for entry in editor.list_backups(&document).await? {
                let when = entry
                    .modified_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown time".to_string());
                println!("{}\t{}", entry.name, when);
            }
        }
        Command::Backup { document, name } => {
            print!("{}", editor.fetch_backup(&document, &name).await?);
        }
        Command::Restore { document, name } => {
            editor.restore_backup(&document, &name).await?;
            print_status(editor, &document);
        }
        Command::Info => {
            let info = admin::fetch_admin_info(editor.transport()).await?;
            if info.default_password {
                warn!("The server is still using the default admin password");
            }
            println!("default password: {}", info.default_password);
        }
        Command::Remember => {
            let mut stored = load_config();
            stored.server_url = settings.server_url.clone();
            stored.username = settings.username.clone();
            save_config(&stored)?;
            println!("{} as {}", stored.server_url, stored.username);
        }
    }

    Ok(())
}

/// Final error line, unless the error was already shown as a document status.
fn failure_line(err: &Error) -> Option<String> {
    match err.document() {
        Some(_) => None,
        None => Some(format!("Error: {}", err)),
    }
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

/// Status goes to stderr so document bodies can be piped.
fn print_status(editor: &Editor, document: &str) {
    if let Some(line) = editor.status_line(document) {
        eprintln!("{}", line);
    }
    if let Some(message) = editor.message(document) {
        eprintln!("{}", message);
    }
}
