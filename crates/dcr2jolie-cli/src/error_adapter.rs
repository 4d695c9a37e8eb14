//! Error adapter for converting Dcr2JolieError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error
//! types and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::Diagnostic;

use dcr2jolie::Dcr2JolieError;

/// Adapter that wraps [`Dcr2JolieError`] and implements [`miette::Diagnostic`].
///
/// The library errors carry no source spans, so the adapter contributes an
/// error code per variant and, for projectability failures, a help text
/// listing every offending dependency pair.
pub struct ErrorAdapter(pub Dcr2JolieError);

impl fmt::Debug for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl Diagnostic for ErrorAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            Dcr2JolieError::Io(_) => Some(Box::new("dcr2jolie::error::io")),
            Dcr2JolieError::Parse(_) => Some(Box::new("dcr2jolie::error::parse")),
            Dcr2JolieError::Graph(_) => Some(Box::new("dcr2jolie::error::graph")),
            Dcr2JolieError::NotProjectable { .. } => {
                Some(Box::new("dcr2jolie::error::projectability"))
            }
            Dcr2JolieError::Export(_) => Some(Box::new("dcr2jolie::error::export")),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            Dcr2JolieError::NotProjectable { violations, .. } => {
                let listing = violations
                    .iter()
                    .map(|violation| format!("- {violation}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(Box::new(listing))
            }
            _ => None,
        }
    }
}
