//! CLI argument definitions using clap

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// MarkPre: Markdown presentations from your terminal
#[derive(Parser, Debug)]
#[command(name = "markpre")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Bearer token, overrides the saved login
    #[arg(long, global = true, env = "MARKPRE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to your MarkPre account
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and clear the saved credential
    Logout,

    /// Show login state and server reachability
    Status,

    /// Manage your presentations
    Presentation {
        #[command(subcommand)]
        command: PresentationCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresentationCommands {
    /// List all your presentations
    List,

    /// Create a presentation from a markdown file
    Add {
        /// Presentation title (prompted when omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// Path to the markdown source
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        markdown: PathBuf,

        /// Theme id
        #[arg(long)]
        theme: Option<String>,
    },

    /// Delete a presentation by id
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export a presentation to PDF or HTML
    Export {
        id: String,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Pdf)]
        format: ExportFormat,

        /// Output file or directory
        #[arg(short, long, value_hint = ValueHint::AnyPath)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Html,
}

impl ExportFormat {
    /// File extension, which doubles as the `format` query value.
    pub fn ext(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_defaults_to_pdf() {
        let cli = Cli::parse_from(["markpre", "presentation", "export", "abc123"]);
        match cli.command {
            Commands::Presentation {
                command: PresentationCommands::Export { id, format, output },
            } => {
                assert_eq!(id, "abc123");
                assert_eq!(format, ExportFormat::Pdf);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
