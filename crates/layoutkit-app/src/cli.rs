//! Command-line interface.

use crate::app::{App, AppConfig, AppResult};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "layoutkit", version, about = "Inspect and re-export layout documents")]
pub struct Cli {
    /// Editor settings file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the shapes of a structured layout document as JSON.
    Inspect { file: PathBuf },
    /// Import a structured layout document and write a new export pair.
    Reexport {
        file: PathBuf,
        /// Output directory (defaults to the configured export directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Template image the export is named after.
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
    },
    /// List font files in the fonts directory.
    Fonts,
}

/// Execute a parsed command line. Returns the text to print.
pub fn run(cli: Cli) -> AppResult<String> {
    let app = App::new(AppConfig::load(cli.config.as_deref())?);

    match cli.command {
        Command::Inspect { file } => app.inspect(&file),
        Command::Reexport {
            file,
            out,
            template,
        } => {
            let timestamp = chrono::Local::now().naive_local();
            let paths = app.reexport(&file, out.as_deref(), template.as_deref(), timestamp)?;
            Ok(format!(
                "{}\n{}",
                paths.structured.display(),
                paths.human.display()
            ))
        }
        Command::Fonts => {
            let mut out = String::new();
            for font in app.fonts() {
                let _ = writeln!(out, "{font}");
            }
            Ok(out.trim_end().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reexport_with_global_config() {
        let cli = Cli::try_parse_from([
            "layoutkit",
            "reexport",
            "card.py",
            "--out",
            "exports",
            "--config",
            "settings.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("settings.toml")));
        match cli.command {
            Command::Reexport {
                file,
                out,
                template,
            } => {
                assert_eq!(file, PathBuf::from("card.py"));
                assert_eq!(out, Some(PathBuf::from("exports")));
                assert_eq!(template, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = Cli::try_parse_from(["layoutkit", "--config", "/nonexistent/layoutkit.toml", "fonts"])
            .unwrap();
        assert!(run(cli).is_err());
    }
}
