//! Command-line argument definitions for the Tessera CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Every subcommand that takes a `FILE` falls back to the
//! last edited text when the file is omitted.

use clap::{Parser, Subcommand};

use tessera::{ExportFormat, RequestedKind, ThemePreference, samples::SampleKind};

/// Command-line arguments for the Tessera diagram workbench
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the saved editor text and theme
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the detected diagram kind and element count
    Detect {
        /// Diagram text file
        input: Option<String>,
    },

    /// Render a diagram to an SVG or PNG file
    Render {
        /// Diagram text file
        input: Option<String>,

        /// Output file or directory
        #[arg(short, long)]
        output: String,

        /// Export format; defaults to the output extension, then the config
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Diagram kind, or `auto` to detect it
        #[arg(short, long, default_value = "auto")]
        kind: RequestedKind,

        /// Theme to render with; also becomes the saved theme
        #[arg(short, long)]
        theme: Option<ThemePreference>,
    },

    /// Re-indent diagram text and print it
    Format {
        /// Diagram text file
        input: Option<String>,
    },

    /// Load a built-in example and print it
    Sample {
        /// flowchart, sequence, class, pie or gantt; random when omitted
        kind: Option<SampleKind>,

        /// Load the short template instead of the full example
        #[arg(long, requires = "kind")]
        template: bool,
    },

    /// Copy diagram text to the system clipboard
    Copy {
        /// Diagram text file
        input: Option<String>,
    },

    /// Show or change the saved theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

/// Theme change requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeMode {
    Light,
    Dark,
    Toggle,
}
