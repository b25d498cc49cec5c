//! Crate `nl2sql-workflow`: orquestación de una petición pregunta → SQL → filas
//!
//! Etapas de una petición (`QueryStage`):
//! `Received → RetrievingExamples → AssemblingPrompt → GeneratingSql →
//! Executing → Complete`. Cualquier fallo lleva a `Failed` y se devuelve un
//! `QueryFailure` con la etapa y la causa; nunca hay resultados parciales.
//!
//! Componentes:
//! - `CatalogCache`: catálogo de esquema con TTL y respaldo al último
//!   catálogo válido.
//! - `SqlGenerator`: una llamada al modelo con límite de tiempo.
//! - `SqlExecutor`: ejecución del SQL saneado en el almacén.
//! - `QueryService`: encadena todo lo anterior.
//! - `ServiceConfig`: configuración desde el entorno.
pub mod catalog;
pub mod config;
pub mod errors;
pub mod executor;
pub mod generator;
pub mod service;
pub mod stage;

pub use catalog::CatalogCache;
pub use config::ServiceConfig;
pub use errors::{FailureCategory, QueryFailure, WorkflowError};
pub use executor::SqlExecutor;
pub use generator::SqlGenerator;
pub use service::QueryService;
pub use stage::QueryStage;
