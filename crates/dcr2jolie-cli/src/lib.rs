//! CLI logic for the dcr2jolie projection compiler.
//!
//! This module contains the core CLI logic: read the choreography XML,
//! project it for every role, and write one pair of Jolie skeleton files
//! per role into the configured output directory.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use dcr2jolie::{Dcr2JolieError, ProjectionBuilder, config::AppConfig};

/// Run the dcr2jolie CLI application with configuration discovered from
/// the local project directory or the platform config directory.
///
/// # Errors
///
/// Returns `Dcr2JolieError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Projectability errors
pub fn run(args: &Args) -> Result<(), Dcr2JolieError> {
    let app_config = config::load_config()?;
    run_with_config(args, app_config)
}

/// Run the dcr2jolie CLI application with an explicit configuration.
///
/// This function processes the input file through the full pipeline:
/// parse, project for every role, and write the skeleton files.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_config(args: &Args, app_config: AppConfig) -> Result<(), Dcr2JolieError> {
    info!(input_path = args.xml; "Compiling choreography");

    // Read input file
    let source = fs::read_to_string(&args.xml)?;

    let builder = ProjectionBuilder::new(app_config);
    let choreography = builder.parse(&source)?;

    let projections = builder.project(&choreography)?;
    for projection in &projections {
        builder.write_jolie(projection)?;
    }

    info!(projections = projections.len(); "Skeleton files generated");

    Ok(())
}
