//! Services module - the diagram import pipeline.

pub mod diagram_parser;
pub mod import_service;
pub mod naming;

// Re-export for convenience
pub use diagram_parser::ParseError;
pub use import_service::ImportError;
