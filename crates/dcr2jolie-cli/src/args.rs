//! Command-line argument definitions for the dcr2jolie CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. The surface is deliberately small: the input document is
//! the only argument, logging is controlled through the environment, and
//! the output directory comes from the configuration file.

use clap::Parser;

/// Command-line arguments for the dcr2jolie projection compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input DCR choreography XML
    #[arg(long)]
    pub xml: String,
}
