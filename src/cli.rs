// CLI module - command-line argument parsing and config handlers
//
// Without a subcommand the interactive console starts. Every console
// action is also available as a one-shot subcommand for scripting; those
// are executed by the headless runner. `config` inspects and rewrites the
// config file and never contacts the backend.

use crate::config::{Config, VERSION};
use crate::model::ReportKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Access Console - manage repository collaborators from the terminal
#[derive(Parser, Debug)]
#[command(name = "access-console")]
#[command(version = VERSION)]
#[command(about = "Terminal console for a repository access-management backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (overrides config and ACCESS_CONSOLE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Answer every request from the built-in demo server
    #[arg(long, global = true)]
    pub demo: bool,

    /// Print HTML fragments instead of plain text (headless commands)
    #[arg(long, global = true)]
    pub html: bool,
}

/// Repository every collaborator operation targets
///
/// Both default to empty so that a missing value reaches the console's own
/// validation (a warning, no request) rather than a clap usage error.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository owner (user or organisation)
    #[arg(long, default_value = "")]
    pub owner: String,

    /// Repository name
    #[arg(long, default_value = "")]
    pub repo: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ReportFormat {
    Excel,
    Pdf,
}

impl From<ReportFormat> for ReportKind {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Excel => ReportKind::Excel,
            ReportFormat::Pdf => ReportKind::Pdf,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// List email → username mappings
    Mappings,

    /// Add or replace an email mapping
    AddMapping { email: String, username: String },

    /// Look up the username mapped to an email
    SearchEmail {
        #[arg(default_value = "")]
        email: String,
    },

    /// List a user's repositories
    Repos {
        #[arg(default_value = "")]
        username: String,
    },

    /// Show the account the backend acts as
    Whoami,

    /// List collaborators of a repository
    Collaborators {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Grant a user access to a repository
    AddCollaborator {
        #[command(flatten)]
        target: TargetArgs,
        username: String,
        /// pull, triage, push, maintain or admin
        #[arg(long, default_value = "push")]
        permission: String,
    },

    /// Revoke a user's access to a repository
    RemoveCollaborator {
        #[command(flatten)]
        target: TargetArgs,
        username: String,
    },

    /// Change a collaborator's permission
    ModifyPermission {
        #[command(flatten)]
        target: TargetArgs,
        username: String,
        permission: String,
    },

    /// Upload a CSV change set and show what it would do
    BulkPreview { file: PathBuf },

    /// Upload a CSV change set and apply it to a repository
    BulkApply {
        #[command(flatten)]
        target: TargetArgs,
        file: PathBuf,
    },

    /// Generate an access report on the backend
    Report {
        #[arg(value_enum)]
        format: ReportFormat,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show the audit log
    Logs,
}

/// Handle the `config` subcommand
///
/// Flags are checked in the order path, show, reset, edit, update; the
/// first one set wins. Failures print to stderr and exit with status 1.
pub fn handle_config(show: bool, reset: bool, edit: bool, update: bool, path: bool) {
    let result = if path {
        config_file().map(|file| println!("{}", file.display()))
    } else if show {
        show_config();
        Ok(())
    } else if reset {
        reset_config()
    } else if edit {
        edit_config()
    } else if update {
        update_config()
    } else {
        println!("{}", CONFIG_USAGE);
        Ok(())
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

const CONFIG_USAGE: &str = "\
Usage: access-console config <--show|--path|--reset|--edit|--update>

  --show    Print the effective settings (env > file > defaults)
  --path    Print where the config file lives
  --reset   Overwrite the config file with the default template
  --edit    Open the config file in $EDITOR (created if missing)
  --update  Rewrite the file in the current layout, keeping your values";

fn config_file() -> Result<PathBuf, String> {
    Config::config_path().ok_or_else(|| "no home directory to keep the config in".to_string())
}

fn show_config() {
    let config = Config::from_env();
    let source = match Config::config_path() {
        Some(file) if file.exists() => file.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("# access-console {} (from {})", VERSION, source);
    println!("api_url              = {}", config.api_url);
    println!("request_timeout_secs = {}", config.request_timeout_secs);
    println!("write_policy         = {}", config.write_policy.as_str());
    println!("tui                  = {}", config.enable_tui);
    println!("demo                 = {}", config.demo_mode);
    println!(
        "notifications        = {} ms, {} dismiss",
        config.notifications.dismiss_after_ms,
        config.notifications.dismiss_policy.as_str()
    );
    println!(
        "logging              = {}{}",
        config.logging.level,
        if config.logging.file_enabled {
            format!(
                ", {} files in {}",
                config.logging.file_rotation.as_str(),
                config.logging.file_dir.display()
            )
        } else {
            String::new()
        }
    );
}

/// Ask on stderr so that stdout stays scriptable
fn confirm(question: &str) -> bool {
    eprint!("{} [y/N] ", question);
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y")
}

fn write_config(file: &Path, contents: &str) -> Result<(), String> {
    if let Some(dir) = file.parent() {
        std::fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    }
    std::fs::write(file, contents).map_err(|e| format!("{}: {}", file.display(), e))
}

fn reset_config() -> Result<(), String> {
    let file = config_file()?;
    if file.exists() && !confirm(&format!("Replace {} with the defaults?", file.display())) {
        println!("Left unchanged.");
        return Ok(());
    }
    write_config(&file, &Config::default().to_toml())?;
    println!("Wrote default config to {}", file.display());
    Ok(())
}

fn edit_config() -> Result<(), String> {
    let file = config_file()?;
    if !file.exists() {
        write_config(&file, &Config::default().to_toml())?;
    }

    let editor = ["EDITOR", "VISUAL"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .unwrap_or_else(|| (if cfg!(windows) { "notepad" } else { "nano" }).to_string());

    let status = Command::new(&editor)
        .arg(&file)
        .status()
        .map_err(|e| format!("could not start '{}' ({}); set $EDITOR", editor, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", editor, status))
    }
}

fn update_config() -> Result<(), String> {
    let file = config_file()?;
    if !file.exists() {
        write_config(&file, &Config::default().to_toml())?;
        println!("Wrote default config to {}", file.display());
        return Ok(());
    }

    // The effective config (env included) is what gets written back
    let contents = Config::from_env().to_toml();
    let backup = file.with_extension("toml.bak");
    match std::fs::copy(&file, &backup) {
        Ok(_) => println!("Previous file kept as {}", backup.display()),
        Err(e) => eprintln!("Warning: no backup made: {}", e),
    }
    write_config(&file, &contents)?;
    println!("Rewrote {} in the current layout", file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_owner_parses_as_empty() {
        let cli = Cli::parse_from(["access-console", "add-collaborator", "--repo", "widgets", "bob"]);
        let Some(Commands::AddCollaborator {
            target,
            username,
            permission,
        }) = cli.command
        else {
            panic!("expected add-collaborator");
        };
        assert_eq!(target.owner, "");
        assert_eq!(target.repo, "widgets");
        assert_eq!(username, "bob");
        assert_eq!(permission, "push");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["access-console", "logs", "--html", "--demo"]);
        assert!(cli.html);
        assert!(cli.demo);
        assert!(matches!(cli.command, Some(Commands::Logs)));
    }
}
