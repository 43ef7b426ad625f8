//! `renaissance` CLI: the Digital Renaissance site state from a terminal.
//!
//! Every invocation is one page load: content and session are restored from
//! the data directory, the command runs, and anything not saved is gone.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use renaissance_core::content::CONTENT_KEY;
use renaissance_core::error::SiteError;
use renaissance_core::{
    AuthMode, ContentPath, DemoVerifier, FieldKind, FieldValue, Role, SignInForm, SiteState,
};
use renaissance_storage::{ClientStorage, FileStorage};
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, LogFormat};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// Digital Renaissance: site content and session from the command line.
#[derive(Parser)]
#[command(
    name = "renaissance",
    version,
    about = "Renaissance CLI: sign in, inspect and edit site content",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         RENAISSANCE_DATA_DIR       Storage directory (default: ./.renaissance)\n  \
         RENAISSANCE_LOG_LEVEL      Log filter (default: warn)\n  \
         RENAISSANCE_LOG_FORMAT     text or json\n  \
         RENAISSANCE_STRICT_PATHS   Fail on unknown content paths\n\n\
         {DIM}Examples:{RESET}\n  \
         renaissance login --username Admin --password admin123\n  \
         renaissance content get 'expertise[1].skills[0]'\n  \
         renaissance content set hero.title 'Digital Renaissance'\n  \
         renaissance content export --output backup.json"
    ),
)]
struct Cli {
    /// Storage directory.
    #[arg(long, global = true, env = "RENAISSANCE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show session and content status.
    Status,
    /// Sign in with a username and password.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new client or admin account.
    Signup {
        /// Account type to create.
        #[arg(long, value_enum, default_value = "client")]
        role: AccountRole,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "")]
        company: String,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Site content operations.
    Content {
        #[command(subcommand)]
        action: ContentCommands,
    },
}

#[derive(Subcommand)]
enum ContentCommands {
    /// Print the whole content document as JSON.
    Show,
    /// Print the value at a content path.
    Get {
        /// Content path (e.g., "testimonials[0].rating").
        path: String,
    },
    /// Replace the value at a content path and save (admin only).
    Set {
        /// Content path (e.g., "hero.title").
        path: String,
        /// New value. Lists take one argument per item; ratings take a number.
        #[arg(required = true)]
        value: Vec<String>,
    },
    /// Write the content document to a JSON file (admin only).
    Export {
        /// Output file path (default: renaissance-content-<date>.json).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the content document from a JSON file and save (admin only).
    Import {
        /// Path to an exported content file.
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AccountRole {
    Client,
    Admin,
}

impl AccountRole {
    fn mode(self) -> AuthMode {
        match self {
            Self::Client => AuthMode::SignUpClient,
            Self::Admin => AuthMode::SignUpAdmin,
        }
    }
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn role_badge(role: Role) -> String {
    match role {
        Role::Admin => format!("{MAGENTA}{BOLD}admin{RESET}"),
        Role::Client => format!("{CYAN}client{RESET}"),
    }
}

/// Print each failing form field, then turn the error into a plain failure.
fn report_sign_in_error(err: SiteError) -> anyhow::Error {
    if let SiteError::Validation(errors) = &err {
        for (field, message) in &errors.fields {
            println!("  {RED}✗{RESET} {DIM}{:<16}{RESET} {message}", field.as_str());
        }
    }
    anyhow::Error::new(err).context("sign-in failed")
}

// ── Startup ──────────────────────────────────────────────────────────

fn init_tracing(config: &CliConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Open the data directory and restore the page state from it.
async fn open_site(config: &CliConfig) -> Result<(SiteState, FileStorage)> {
    let storage = FileStorage::open(&config.data_dir).with_context(|| {
        format!("failed to open data directory {}", config.data_dir.display())
    })?;
    let site = SiteState::open(
        Arc::new(storage.clone()),
        Arc::new(DemoVerifier),
        config.path_policy(),
    )
    .await;
    Ok((site, storage))
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_env().with_data_dir(cli.data_dir);
    init_tracing(&config);

    match run(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &CliConfig, cmd: Commands) -> Result<()> {
    let (mut site, storage) = open_site(config).await?;
    match cmd {
        Commands::Status => cmd_status(&site, &storage).await,
        Commands::Login { username, password } => {
            cmd_sign_in(&mut site, AuthMode::Login, SignInForm::login(username, password)).await
        }
        Commands::Signup {
            role,
            username,
            email,
            password,
            confirm_password,
            full_name,
            company,
        } => {
            let form = SignInForm {
                username,
                email,
                password,
                confirm_password,
                full_name,
                company,
            };
            cmd_sign_in(&mut site, role.mode(), form).await
        }
        Commands::Logout => cmd_logout(&mut site).await,
        Commands::Whoami => {
            cmd_whoami(&site);
            Ok(())
        }
        Commands::Content { action } => cmd_content(&mut site, action).await,
    }
}

// ── Session commands ─────────────────────────────────────────────────

async fn cmd_status(site: &SiteState, storage: &FileStorage) -> Result<()> {
    let customized = storage
        .exists(CONTENT_KEY)
        .await
        .context("failed to check for saved content")?;
    let document = site.content().get();

    println!();
    header("◆", "Site Status");
    kv_line("Data directory", &storage.root().display().to_string());
    match site.session().current() {
        Some(session) => kv_line(
            "Session",
            &format!("{} ({})", session.username, role_badge(session.role)),
        ),
        None => kv_line("Session", &format!("{DIM}anonymous{RESET}")),
    }
    kv_line(
        "Inline editing",
        if site.session().is_admin() {
            "allowed"
        } else {
            "admin only"
        },
    );
    kv_line(
        "Content",
        if customized {
            "saved customizations"
        } else {
            "default content"
        },
    );
    kv_line("Expertise areas", &document.expertise.len().to_string());
    kv_line("Blog posts", &document.blog.len().to_string());
    kv_line("Testimonials", &document.testimonials.len().to_string());
    println!();
    Ok(())
}

async fn cmd_sign_in(site: &mut SiteState, mode: AuthMode, form: SignInForm) -> Result<()> {
    let session = site
        .sign_in(mode, &form)
        .await
        .map_err(report_sign_in_error)?;
    success(&format!(
        "Signed in as {BOLD}{}{RESET} ({})",
        session.username,
        role_badge(session.role)
    ));
    Ok(())
}

async fn cmd_logout(site: &mut SiteState) -> Result<()> {
    let was = site.session().current();
    site.sign_out().await;
    match was {
        Some(session) => success(&format!("Signed out {BOLD}{}{RESET}", session.username)),
        None => warning("Not signed in."),
    }
    Ok(())
}

fn cmd_whoami(site: &SiteState) {
    match site.session().current() {
        Some(session) => {
            header("👤", "Session");
            kv_line("Username", &session.username);
            kv_line("Role", &role_badge(session.role));
        }
        None => warning("Not signed in."),
    }
}

// ── Content commands ─────────────────────────────────────────────────

async fn cmd_content(site: &mut SiteState, action: ContentCommands) -> Result<()> {
    match action {
        ContentCommands::Show => {
            let json = site
                .content()
                .get()
                .to_json_pretty()
                .context("failed to format content")?;
            println!("{json}");
            Ok(())
        }
        ContentCommands::Get { path } => {
            let path = parse_path(&path)?;
            let value = site.content().read(&path)?;
            match value {
                FieldValue::TextList(items) => {
                    for item in items {
                        println!("{item}");
                    }
                }
                other => println!("{other}"),
            }
            Ok(())
        }
        ContentCommands::Set { path, value } => cmd_content_set(site, &path, &value).await,
        ContentCommands::Export { output } => cmd_content_export(site, output),
        ContentCommands::Import { file } => cmd_content_import(site, &file).await,
    }
}

fn parse_path(text: &str) -> Result<ContentPath> {
    ContentPath::parse(text).with_context(|| format!("invalid content path '{text}'"))
}

/// Build a value of `kind` from command-line words.
fn parse_value(kind: FieldKind, words: &[String]) -> Result<FieldValue> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(words.join(" "))),
        FieldKind::Rating => match words {
            [word] => {
                let rating = word
                    .parse::<u8>()
                    .with_context(|| format!("invalid rating '{word}'"))?;
                Ok(FieldValue::Rating(rating))
            }
            _ => bail!("a rating takes exactly one number"),
        },
        FieldKind::TextList => Ok(FieldValue::TextList(words.to_vec())),
    }
}

async fn cmd_content_set(site: &mut SiteState, path: &str, words: &[String]) -> Result<()> {
    let path = parse_path(path)?;
    if !site.session().is_admin() {
        bail!("editing content requires an admin session");
    }
    let current = site.content().read(&path)?;
    let value = parse_value(current.kind(), words)?;

    if !site.admin_mode() {
        site.toggle_admin_mode();
    }
    site.edit(&path, value.clone())?;
    site.save_content().await.context("failed to save content")?;

    success(&format!("Updated {BOLD}{path}{RESET}"));
    kv_line("Before", &current.to_string());
    kv_line("After", &value.to_string());
    Ok(())
}

fn cmd_content_export(site: &SiteState, output: Option<PathBuf>) -> Result<()> {
    let export = site.export_content()?;
    let target = output.unwrap_or_else(|| PathBuf::from(&export.file_name));
    std::fs::write(&target, &export.contents)
        .with_context(|| format!("failed to write {}", target.display()))?;
    success(&format!(
        "Content exported to {BOLD}{}{RESET}",
        target.display()
    ));
    Ok(())
}

async fn cmd_content_import(site: &mut SiteState, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    site.import_content(&text)
        .with_context(|| format!("failed to import {}", file.display()))?;
    site.save_content().await.context("failed to save content")?;
    success(&format!(
        "Content imported from {BOLD}{}{RESET}",
        file.display()
    ));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn text_joins_words() {
        let value = parse_value(FieldKind::Text, &words(&["Digital", "Renaissance"])).unwrap();
        assert_eq!(value, FieldValue::from("Digital Renaissance"));
    }

    #[test]
    fn rating_takes_one_number() {
        assert_eq!(
            parse_value(FieldKind::Rating, &words(&["4"])).unwrap(),
            FieldValue::Rating(4)
        );
        assert!(parse_value(FieldKind::Rating, &words(&["four"])).is_err());
        assert!(parse_value(FieldKind::Rating, &words(&["4", "5"])).is_err());
    }

    #[test]
    fn list_takes_one_word_per_item() {
        let value = parse_value(FieldKind::TextList, &words(&["Rust", "Go"])).unwrap();
        assert_eq!(value, FieldValue::TextList(words(&["Rust", "Go"])));
    }

    #[test]
    fn cli_parses_nested_content_command() {
        let cli = Cli::try_parse_from([
            "renaissance",
            "--data-dir",
            "/tmp/x",
            "content",
            "set",
            "hero.title",
            "New",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(
            cli.command,
            Commands::Content {
                action: ContentCommands::Set { .. }
            }
        ));
    }
}
