//! Command-line argument definitions for the Knowflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the configuration file and the
//! logging verbosity; the [`Command`] picks the operation.

use clap::{Parser, Subcommand};

use knowflow::semantic::LayoutKind;

/// Command-line arguments for the Knowflow diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Operations of the Knowflow CLI.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out a JSON-LD document and render it as SVG
    Render {
        /// JSON-LD input; without it the stored dataset, the configured
        /// input document or the sample diagram is shown
        input: Option<String>,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,

        /// Node id to highlight
        #[arg(long)]
        select: Option<String>,

        /// Presentation mode (flow, graph, timeline)
        #[arg(long, default_value = "flow")]
        layout: LayoutKind,
    },

    /// Re-serialize a JSON-LD document as a flow document
    ///
    /// Without `--output` the document is saved to the configured output
    /// directory, falling back to the download location.
    Export {
        /// JSON-LD input
        input: String,

        /// Path to the output JSON-LD file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Convert an A0-schema CSV dataset to JSON-LD
    Convert {
        /// CSV input
        input: String,

        /// Path to the output JSON-LD file
        #[arg(short, long, default_value = "a0.jsonld")]
        output: String,
    },

    /// Extract `A → B` flow chains from a Markdown file as JSON-LD
    Extract {
        /// Markdown input
        input: String,

        /// Path to the output JSON-LD file
        #[arg(short, long, default_value = "a0.jsonld")]
        output: String,
    },

    /// Convert a CSV dataset and keep it as the stored dataset
    Upload {
        /// CSV input
        input: String,
    },

    /// Remove the stored dataset
    Clear,
}
