// ordfix-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Where documents go, where the registry snapshot comes from.
pub mod ports;

// 2. Domain
// Order records, target paths, rule table, document tree, rule application.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// XML codec, YAML config, JSON snapshot, filesystem.
pub mod infrastructure;

// 4. Application (Use Cases)
// Batch correction, snapshot validation, snapshot building.
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::CorrectorError;
