//! This module defines the error type for this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Error when no input file is provided
    #[error("No input file provided. Exiting...")]
    NoInputFile,
    /// Error when the file extension is not supported
    #[error("Unsupported file extension. Supported file extensions are: .bpel, .xml")]
    UnsupportedFileExt,
    /// Error when an IO operation fails
    #[error("Error opening file: {0}")]
    Io(#[from] std::io::Error),
    /// Error when the XML is not well-formed
    #[error("Error parsing XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Error when an attribute cannot be read
    #[error("Error parsing XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    /// Error when the document contains no root element
    #[error("Document contains no root element")]
    EmptyDocument,
    /// Error when a control link element lacks its linkName attribute
    #[error("<{element}> element is missing its linkName attribute")]
    MissingLinkName { element: &'static str },
}
