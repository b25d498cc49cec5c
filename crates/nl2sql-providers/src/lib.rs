//! nl2sql-providers: proveedores externos del pipeline
//!
//! Agrupa los colaboradores que el núcleo consume pero no implementa: la
//! función de embedding (`Embedder`) y el modelo de lenguaje
//! (`LanguageModel`). Incluye un embedder local determinista
//! (`HashingEmbedder`), un cliente de chat-completions compatible con
//! OpenAI/Groq (`ChatCompletionsModel`) y un modelo guionizado para pruebas
//! (`ScriptedModel`).
pub mod embedding;
pub mod errors;
pub mod llm;
pub mod stubs;

pub use embedding::{Embedder, HashingEmbedder};
pub use errors::{ProviderError, Result};
pub use llm::{ChatCompletionsModel, LanguageModel, Message, MessageRole, ModelSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use stubs::ScriptedModel;
