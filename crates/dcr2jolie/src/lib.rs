//! dcr2jolie - End-point projection of DCR choreographies into Jolie
//! service skeletons.
//!
//! A choreography describes a multi-party interaction as a single DCR
//! graph. This crate compiles it into one local DCR graph per role (the
//! end-point projection) and emits a Jolie service skeleton for each, so
//! that participants following their projections jointly realise the
//! original choreography.

pub mod closure;
pub mod config;
pub mod export;
pub mod projectable;

mod error;
mod project;

pub use dcr2jolie_core::{activity, graph, identifier, marking, relation};
pub use dcr2jolie_parser::ParseError;

pub use error::Dcr2JolieError;
pub use project::{project, project_for};

use log::{debug, info, trace};

use dcr2jolie_core::graph::{Choreography, Projection};

use config::AppConfig;
use export::Exporter;
use export::jolie::{self, JolieGenerator, JolieSkeleton};

/// Builder for compiling DCR choreographies into end-point projections.
///
/// This provides an API for processing a choreography through parsing,
/// projection, and Jolie generation stages.
///
/// # Examples
///
/// ```rust,no_run
/// use dcr2jolie::{ProjectionBuilder, config::AppConfig};
///
/// let source = std::fs::read_to_string("choreography.xml").unwrap();
///
/// let builder = ProjectionBuilder::new(AppConfig::default());
///
/// // Parse the XML into a choreography
/// let choreography = builder.parse(&source)
///     .expect("Failed to parse");
///
/// // Project for every role and write the skeleton files
/// for projection in builder.project(&choreography).expect("Not projectable") {
///     builder.write_jolie(&projection).expect("Failed to write");
/// }
/// ```
#[derive(Default)]
pub struct ProjectionBuilder {
    config: AppConfig,
}

impl ProjectionBuilder {
    /// Create a new projection builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse DCR XML source into a choreography.
    ///
    /// # Errors
    ///
    /// Returns `Dcr2JolieError::Parse` for malformed documents, malformed
    /// role strings, duplicate event ids, or dangling references.
    pub fn parse(&self, source: &str) -> Result<Choreography, Dcr2JolieError> {
        info!("Parsing choreography");

        let choreography = dcr2jolie_parser::parse(source)?;

        debug!(
            roles = choreography.roles().len(),
            events = choreography.graph().activities().count();
            "Choreography parsed successfully"
        );
        trace!(graph:% = choreography.graph(); "Parsed choreography");

        Ok(choreography)
    }

    /// Build the end-point projection for one actor.
    ///
    /// # Errors
    ///
    /// Returns `Dcr2JolieError::NotProjectable` with every offending
    /// event/depender pair if the choreography is not projectable for
    /// `actor`.
    pub fn project_for(
        &self,
        choreography: &Choreography,
        actor: &str,
    ) -> Result<Projection, Dcr2JolieError> {
        project::project_for(choreography, actor)
    }

    /// Build the end-point projections for every role, in lexicographic
    /// role order.
    ///
    /// # Errors
    ///
    /// Returns `Dcr2JolieError::NotProjectable` for the first role failing
    /// the projectability check.
    pub fn project(
        &self,
        choreography: &Choreography,
    ) -> Result<Vec<Projection>, Dcr2JolieError> {
        project::project(choreography)
    }

    /// Generate the Jolie skeleton texts for a projection.
    pub fn generate_jolie(&self, projection: &Projection) -> JolieSkeleton {
        jolie::generate(projection)
    }

    /// Generate and write a projection's skeleton files into the configured
    /// output directory.
    ///
    /// # Errors
    ///
    /// Returns `Dcr2JolieError::Export` if the files cannot be written.
    pub fn write_jolie(&self, projection: &Projection) -> Result<(), Dcr2JolieError> {
        let mut generator = JolieGenerator::new(self.config.output.directory());
        generator.export_projection(projection)?;
        Ok(())
    }
}
