//! ome-model - inspect, check and normalize OME-XML metadata.
//!
//! This binary parses OME-XML documents into the object model and reports on
//! them.

use clap::Parser;
use std::fs;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ome_model::{
    config::{CheckConfig, Cli, Command, ConvertConfig, OutputFormat, ShowConfig},
    meta::DocumentSummary,
    ModelError, OmeXmlMetadataRoot,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Check(config) => run_check(config),
        Command::Show(config) => run_show(config),
        Command::Convert(config) => run_convert(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ome_model=debug"
    } else {
        "ome_model=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    init_logging(config.input.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("OME-XML Check");
    println!("═════════════");
    println!();
    println!("File: {}", config.input.file.display());

    // Lenient parse so dangling references can be listed before failing
    let mut parse_config = config.parse_config();
    let strict = parse_config.strict_references;
    parse_config.strict_references = false;

    let root = match OmeXmlMetadataRoot::from_file(&config.input.file, &parse_config) {
        Ok(root) => {
            println!("✓ Parsed");
            root
        }
        Err(e) => {
            println!("✗ Parse failed");
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let model = root.model();
    println!("✓ Objects: {}", model.len());
    println!("✓ Registered IDs: {}", model.id_count());

    let unresolved = root.unresolved_count();
    if unresolved == 0 {
        println!("✓ All references resolved");
        return ExitCode::SUCCESS;
    }

    let marker = if strict { "✗" } else { "!" };
    println!("{} Unresolved references: {}", marker, unresolved);
    if config.list_unresolved || strict {
        for reference in model.unresolved_references() {
            println!("    {}", reference);
        }
    }

    if strict {
        println!();
        println!("Error: {}", ModelError::UnresolvedReferences { count: unresolved });
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// =============================================================================
// Show Command
// =============================================================================

fn run_show(config: ShowConfig) -> ExitCode {
    init_logging(config.input.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let root = match OmeXmlMetadataRoot::from_file(&config.input.file, &config.parse_config()) {
        Ok(root) => root,
        Err(e) => {
            error!("Failed to read {}: {}", config.input.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let summary = DocumentSummary::from_root(&root);

    match config.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Text => print_summary(&summary),
    }

    ExitCode::SUCCESS
}

/// Print a human-readable summary.
fn print_summary(summary: &DocumentSummary) {
    if let Some(ref creator) = summary.creator {
        println!("Creator: {}", creator);
    }
    if let Some(ref uuid) = summary.uuid {
        println!("UUID: {}", uuid);
    }
    println!(
        "Objects: {} ({} with IDs)",
        summary.object_count, summary.id_count
    );
    println!();

    println!("Images:");
    println!("───────");
    if summary.images.is_empty() {
        println!("  (none)");
    }
    for image in &summary.images {
        let [x, y, z, c, t] = image.size;
        println!(
            "  {} {}",
            image.id,
            image.name.as_deref().unwrap_or("(unnamed)")
        );
        println!(
            "    {}x{}x{}x{}x{} {} {}",
            x,
            y,
            z,
            c,
            t,
            image.dimension_order.as_deref().unwrap_or("-"),
            image.pixel_type.as_deref().unwrap_or("-")
        );
        if let Some(ref acquired) = image.acquired {
            println!("    acquired: {}", acquired);
        }
        if let Some(ref instrument) = image.instrument {
            println!("    instrument: {}", instrument);
        }
        for channel in &image.channels {
            println!(
                "    channel {} {} detector={}",
                channel.id,
                channel.name.as_deref().unwrap_or("-"),
                channel.detector.as_deref().unwrap_or("-")
            );
        }
        println!("    planes: {}", image.plane_count);
    }

    if !summary.instruments.is_empty() {
        println!();
        println!("Instruments:");
        println!("────────────");
        for instrument in &summary.instruments {
            println!(
                "  {} detectors=[{}] objectives=[{}]",
                instrument.id,
                instrument.detectors.join(", "),
                instrument.objectives.join(", ")
            );
        }
    }

    println!();
    println!("Experimenters: {}", summary.experimenters.len());
    println!("Datasets: {}", summary.datasets.len());
    println!("Plates: {}", summary.plates.len());
    println!("ROIs: {} ({} shapes)", summary.rois.len(), summary.shape_count);
    println!("Annotations: {}", summary.annotation_count);

    if !summary.unresolved.is_empty() {
        println!();
        println!("Unresolved references:");
        for reference in &summary.unresolved {
            println!("  {}", reference);
        }
    }
}

// =============================================================================
// Convert Command
// =============================================================================

fn run_convert(config: ConvertConfig) -> ExitCode {
    init_logging(config.input.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let root = match OmeXmlMetadataRoot::from_file(&config.input.file, &config.parse_config()) {
        Ok(root) => root,
        Err(e) => {
            error!("Failed to read {}: {}", config.input.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if root.unresolved_count() > 0 {
        warn!(
            "{} unresolved reference(s) are written with their original IDs",
            root.unresolved_count()
        );
    }

    let xml = root.to_xml_string();
    match config.output {
        Some(ref output) => {
            if let Err(e) = fs::write(output, xml) {
                error!("Failed to write {}: {}", output.display(), e);
                return ExitCode::FAILURE;
            }
            info!("Wrote {}", output.display());
        }
        None => print!("{}", xml),
    }

    ExitCode::SUCCESS
}
