//! Configuration for parsing and for the `ome-model` command line tool.
//!
//! Library callers configure parsing with [`ParseConfig`]. The binary builds
//! one from its command line arguments:
//! - Command-line arguments via clap
//! - Environment variables with `OME_` prefix
//! - Defaults that accept the 2016-06 schema and count dangling references
//!
//! # Example
//!
//! ```
//! use ome_model::config::ParseConfig;
//!
//! let config = ParseConfig::default();
//! assert!(!config.strict_references);
//! assert!(config.accepts_namespace(Some("http://www.openmicroscopy.org/Schemas/OME/2016-06")));
//! ```
//!
//! # Environment Variables
//!
//! - `OME_STRICT` - Fail when references stay unresolved (default: false)
//! - `OME_NAMESPACES` - Comma-separated accepted root namespaces

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::model::OME_NAMESPACE;

// =============================================================================
// Parse Configuration
// =============================================================================

/// Policy applied when building a document root from XML text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Treat any unresolved reference as an error.
    pub strict_references: bool,

    /// Root namespaces accepted by the parser. Empty accepts any namespace.
    pub accepted_namespaces: Vec<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            strict_references: false,
            accepted_namespaces: vec![OME_NAMESPACE.to_string()],
        }
    }
}

impl ParseConfig {
    /// Whether a document whose root is in `namespace` may be parsed.
    pub fn accepts_namespace(&self, namespace: Option<&str>) -> bool {
        if self.accepted_namespaces.is_empty() {
            return true;
        }
        namespace.is_some_and(|namespace| {
            self.accepted_namespaces
                .iter()
                .any(|accepted| accepted == namespace)
        })
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// ome-model - inspect, check and normalize OME-XML metadata.
#[derive(Parser, Debug, Clone)]
#[command(name = "ome-model")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse a document, resolve references and report problems.
    Check(CheckConfig),

    /// Print a summary of a document.
    Show(ShowConfig),

    /// Parse a document and write it back as normalized OME-XML.
    Convert(ConvertConfig),
}

/// Arguments shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// OME-XML file to read.
    pub file: PathBuf,

    /// Accepted root namespaces (comma-separated).
    ///
    /// Defaults to the 2016-06 OME schema. Pass an empty value to accept any
    /// namespace.
    #[arg(long = "namespaces", env = "OME_NAMESPACES", value_delimiter = ',')]
    pub namespaces: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InputArgs {
    /// Validate the input arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.file.as_os_str().is_empty() {
            return Err("An input file is required".to_string());
        }
        if !self.file.is_file() {
            return Err(format!("Input file not found: {}", self.file.display()));
        }
        Ok(())
    }

    /// Build the parse policy for these arguments.
    pub fn parse_config(&self, strict_references: bool) -> ParseConfig {
        let accepted_namespaces = match &self.namespaces {
            Some(namespaces) => namespaces
                .iter()
                .map(|namespace| namespace.trim())
                .filter(|namespace| !namespace.is_empty())
                .map(str::to_string)
                .collect(),
            None => ParseConfig::default().accepted_namespaces,
        };
        ParseConfig {
            strict_references,
            accepted_namespaces,
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

/// Configuration for the `check` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Fail if any reference stays unresolved.
    #[arg(long, default_value_t = false, env = "OME_STRICT")]
    pub strict: bool,

    /// List every unresolved reference.
    #[arg(long, default_value_t = false)]
    pub list_unresolved: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()
    }

    pub fn parse_config(&self) -> ParseConfig {
        self.input.parse_config(self.strict)
    }
}

// =============================================================================
// Show Command
// =============================================================================

/// Output format for the `show` command.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document summary
    Json,
}

/// Configuration for the `show` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ShowConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ShowConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()
    }

    pub fn parse_config(&self) -> ParseConfig {
        self.input.parse_config(false)
    }
}

// =============================================================================
// Convert Command
// =============================================================================

/// Configuration for the `convert` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConvertConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file. Writes to stdout if not specified.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Refuse to write a document with unresolved references.
    #[arg(long, default_value_t = false, env = "OME_STRICT")]
    pub strict: bool,
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;

        if let Some(ref output) = self.output {
            if output == &self.input.file {
                return Err("Output file must differ from the input file".to_string());
            }
        }
        Ok(())
    }

    pub fn parse_config(&self) -> ParseConfig {
        self.input.parse_config(self.strict)
    }
}

// =============================================================================
// Tests
// =============================================================================
