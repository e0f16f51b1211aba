// ordfix-core/src/domain/document/mod.rs

pub mod locator;
pub mod source;
pub mod tree;

pub use locator::{DEFAULT_ORDER_ID_ELEMENTS, DEFAULT_ORDER_ID_PATTERN, OrderIdLocator};
pub use source::{OutputNames, SourceDocument, output_file_name};
pub use tree::{Document, NodeAddress, Resolution, element_text};
