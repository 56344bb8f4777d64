//! SVG markup for shapes: the wire payload of `new`/`change` messages and
//! the document persistence format.

mod export;
mod import;

pub use export::{write_document, write_shape};
pub use import::{ImportError, import_document, import_fragment};

/// Namespace of every element written by this crate.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
