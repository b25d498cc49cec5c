// Archivo: prompt.rs
// Propósito: ensamblar el prompt de generación a partir del esquema, los
// ejemplos recuperados y la pregunta, con una plantilla fija.
use nl2sql_domain::{SchemaCatalog, SeedExample};
use std::fmt;

const DIRECTIVE: &str = "You are a PostgreSQL expert. Given the question, create a syntactically correct PostgreSQL \
                         query.\n\nImportant: Do not use escape characters in the SQL query. Use simple SQL syntax.";
const CLOSING: &str = "Return only the SQL query without any explanation or special characters.";

/// Prompt listo para enviar al modelo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText {
    text: String,
    examples_used: usize,
    examples_dropped: usize,
}

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Ejemplos incluidos en el prompt.
    pub fn examples_used(&self) -> usize {
        self.examples_used
    }

    /// Ejemplos descartados por el límite de tamaño.
    pub fn examples_dropped(&self) -> usize {
        self.examples_dropped
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ensamblador del prompt.
///
/// Con `max_chars` definido se aplica esta política, siempre la misma:
/// - se descartan bloques de ejemplo completos empezando por el de menor
///   ranking hasta que el prompt cabe;
/// - el esquema y la pregunta nunca se recortan;
/// - si sin ningún ejemplo el prompt sigue sin caber, se envía igualmente y
///   se registra un aviso.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    max_chars: Option<usize>,
}

impl PromptAssembler {
    pub fn new(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    fn render(schema: &str, examples: &[String], question: &str) -> String {
        format!("{DIRECTIVE}\n\nDatabase schema:\n{schema}\n\nSimilar examples:\n{}\n\nUser question: {question}\n\n\
                 {CLOSING}",
                examples.join("\n"))
    }

    pub fn assemble(&self, schema: &SchemaCatalog, examples: &[SeedExample], question: &str) -> PromptText {
        let schema_text = schema.render();
        let blocks: Vec<String> = examples.iter().map(|e| e.to_string()).collect();

        let mut used = blocks.len();
        let mut text = Self::render(&schema_text, &blocks, question);
        if let Some(max) = self.max_chars {
            while used > 0 && text.chars().count() > max {
                used -= 1;
                text = Self::render(&schema_text, &blocks[..used], question);
            }
            if text.chars().count() > max {
                log::warn!("El prompt ocupa {} caracteres y supera el límite de {} incluso sin ejemplos",
                           text.chars().count(),
                           max);
            }
        }
        let dropped = blocks.len() - used;
        if dropped > 0 {
            log::info!("Prompt recortado: {} ejemplos descartados por tamaño", dropped);
        }
        PromptText { text, examples_used: used, examples_dropped: dropped }
    }
}
