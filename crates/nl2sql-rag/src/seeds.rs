// Archivo: seeds.rs
// Propósito: corpus semilla de ejemplos (pregunta, SQL) para el esquema de
// alquiler de películas, y carga de semillas adicionales desde JSON.
use crate::errors::{RagError, Result};
use nl2sql_domain::SeedPair;
use once_cell::sync::Lazy;
use std::path::Path;

static DEFAULT_SEEDS: Lazy<Vec<SeedPair>> = Lazy::new(|| {
    [("How many films are in the database?", "SELECT COUNT(*) FROM film"),
     ("List all customers in the database", "SELECT first_name, last_name FROM customer"),
     ("Can you find the movie titled Agent Truman?", "SELECT * FROM film WHERE title = 'Agent Truman'"),
     ("Which movies were released in 2006?", "SELECT * FROM film WHERE release_year = 2006"),
     ("What are the unique last names of actors?", "SELECT DISTINCT last_name FROM actor"),
     ("Can you show me a list of actors sorted by their first name alphabetically?",
      "SELECT * FROM actor ORDER BY first_name ASC"),
     ("Can you find movies that mention monkey in their description?",
      "SELECT * FROM film WHERE description LIKE '%monkey%';")].into_iter()
                                                                  .map(|(q, s)| SeedPair::new(q, s))
                                                                  .collect()
});

/// Corpus semilla incorporado, en orden de inserción.
pub fn default_seed_pairs() -> Vec<SeedPair> {
    DEFAULT_SEEDS.clone()
}

/// Lee semillas desde un fichero JSON con un array de
/// `{"question": ..., "sql"|"query": ...}`.
pub fn load_seed_pairs(path: &Path) -> Result<Vec<SeedPair>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RagError::Seeds(format!("no se pudo leer {}: {}", path.display(), e)))?;
    let pairs: Vec<SeedPair> = serde_json::from_str(&text)
        .map_err(|e| RagError::Seeds(format!("JSON inválido en {}: {}", path.display(), e)))?;
    for (i, p) in pairs.iter().enumerate() {
        if p.question.trim().is_empty() || p.sql.trim().is_empty() {
            return Err(RagError::Seeds(format!("la semilla #{} de {} está vacía", i, path.display())));
        }
    }
    Ok(pairs)
}
