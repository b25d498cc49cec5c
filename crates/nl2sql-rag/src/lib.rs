//! Crate `nl2sql-rag`: recuperación de ejemplos y ensamblado del prompt
//!
//! Contiene el corpus semilla de pares (pregunta, SQL), el índice de
//! ejemplos por similitud de embeddings (`ExampleIndex`), el recuperador de
//! top-k (`ExampleRetriever`) y el ensamblador del prompt
//! (`PromptAssembler`).
//!
//! El índice se construye una vez al arrancar y es inmutable: no hay API de
//! inserción ni actualización. Se comparte entre peticiones con `Arc`.
//!
//! Ejemplo rápido:
//! ```rust
//! use nl2sql_providers::HashingEmbedder;
//! use nl2sql_rag::{default_seed_pairs, ExampleIndex};
//! use std::sync::Arc;
//! let index = ExampleIndex::build(default_seed_pairs(), Arc::new(HashingEmbedder::default())).unwrap();
//! let hits = index.search("How many films do we have?", 1).unwrap();
//! assert_eq!(hits[0].sql(), "SELECT COUNT(*) FROM film");
//! ```
pub mod errors;
pub mod index;
pub mod prompt;
pub mod retriever;
pub mod seeds;

pub use errors::*;
pub use index::*;
pub use prompt::*;
pub use retriever::*;
pub use seeds::*;
