// Archivo: embedding.rs
// Propósito: contrato de la función de embedding y un embedder local
// determinista basado en feature hashing.
use crate::errors::{ProviderError, Result};
use sha2::{Digest, Sha256};

/// Función de embedding: texto → vector de dimensión fija.
///
/// Debe ser determinista: el mismo texto produce siempre el mismo vector.
pub trait Embedder: Send + Sync {
    /// Dimensión de todos los vectores producidos.
    fn dimension(&self) -> usize;

    /// Embebe `text`. Los vectores devueltos están normalizados (norma L2 = 1).
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Embedder local por feature hashing.
///
/// Cada palabra (minúsculas, alfanumérica) aporta una característica y cada
/// trigrama de caracteres de la palabra (con `#` como borde) aporta otra con
/// menor peso. Un texto sin palabras (`"???"`) usa sus caracteres visibles,
/// así que sólo falla el texto en blanco. La posición y el signo salen de SHA-256, así que el resultado
/// es estable entre ejecuciones y plataformas.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(ProviderError::Config("la dimensión del embedding debe ser > 0".into()));
        }
        Ok(Self { dimension })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

/// Palabras en minúsculas; todo lo que no es alfanumérico separa.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let words = tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];
        if words.is_empty() {
            // sólo signos: cada carácter visible es una característica
            let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
            if chars.is_empty() {
                return Err(ProviderError::Embedding(format!("el texto está vacío: {:?}", text)));
            }
            for c in chars {
                self.add_feature(&mut vector, &format!("c:{}", c), WORD_WEIGHT);
            }
        }
        for w in &words {
            self.add_feature(&mut vector, &format!("w:{}", w), WORD_WEIGHT);
            let padded: Vec<char> = format!("#{}#", w).chars().collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                self.add_feature(&mut vector, &format!("t:{}", tri), TRIGRAM_WEIGHT);
            }
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            // todas las características se cancelaron entre sí
            return Err(ProviderError::Embedding(format!("embedding nulo para {:?}", text)));
        }
        for v in vector.iter_mut() {
            *v /= norm;
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("How many films?"), vec!["how", "many", "films"]);
        assert_eq!(tokenize("release_year = 2006"), vec!["release", "year", "2006"]);
        assert!(tokenize("?!  ").is_empty());
    }

    #[test]
    fn embedding_is_deterministic_and_normalized() {
        let e = HashingEmbedder::new(64).unwrap();
        let a = e.embed("List all customers").unwrap();
        let b = e.embed("List all customers").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn shared_words_score_higher() {
        let e = HashingEmbedder::default();
        let q = e.embed("How many films do we have?").unwrap();
        let near = e.embed("How many films are in the database?").unwrap();
        let far = e.embed("What are the unique last names of actors?").unwrap();
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[test]
    fn blank_text_fails() {
        let e = HashingEmbedder::default();
        assert!(matches!(e.embed(" \t\n "), Err(ProviderError::Embedding(_))));
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn punctuation_only_text_still_embeds() {
        let e = HashingEmbedder::default();
        let a = e.embed("  ?? ").unwrap();
        assert_eq!(a, e.embed("??").unwrap());
        assert!((dot(&a, &a) - 1.0).abs() < 1e-4);
    }
}
