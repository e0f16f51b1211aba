// ordfix-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod fs;
pub mod store;
pub mod xml;

pub use store::FsDocumentSink;
