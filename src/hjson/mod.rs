//! Format-preserving reader and editor for HJSON files.

mod document;
mod parser;

pub use document::HjsonDocument;
