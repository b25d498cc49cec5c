use nl2sql_domain::{ColumnSchema, SchemaCatalog, SeedPair, TableSchema};
use nl2sql_providers::{Embedder, HashingEmbedder, ProviderError};
use nl2sql_rag::{default_seed_pairs, ExampleIndex, ExampleRetriever, PromptAssembler, RagError};
use std::sync::Arc;

/// Embedder que devuelve el mismo vector para cualquier texto.
struct ConstantEmbedder;

impl Embedder for ConstantEmbedder {
  fn dimension(&self) -> usize {
    3
  }
  fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
    Ok(vec![1.0, 0.0, 0.0])
  }
}

/// Falla al embeber cualquier texto que contenga "boom".
struct FragileEmbedder;

impl Embedder for FragileEmbedder {
  fn dimension(&self) -> usize {
    3
  }
  fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
    if text.contains("boom") {
      return Err(ProviderError::Embedding("boom".into()));
    }
    Ok(vec![0.0, 1.0, 0.0])
  }
}

/// Vector con NaN para las semillas que contienen "nan".
struct NanEmbedder;

impl Embedder for NanEmbedder {
  fn dimension(&self) -> usize {
    2
  }
  fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
    if text.contains("nan") {
      return Ok(vec![f32::NAN, 0.0]);
    }
    Ok(vec![1.0, text.len() as f32 / 100.0])
  }
}

fn default_index() -> ExampleIndex {
  ExampleIndex::build(default_seed_pairs(), Arc::new(HashingEmbedder::default())).expect("build")
}

#[test]
fn films_question_retrieves_count_example_first() {
  let index = default_index();
  let hits = index.search("How many films do we have?", 1).unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].question(), "How many films are in the database?");
  assert_eq!(hits[0].sql(), "SELECT COUNT(*) FROM film");
}

#[test]
fn search_never_exceeds_k_or_index_size() {
  let index = default_index();
  for k in 1..=10 {
    let hits = index.search("List all customers", k).unwrap();
    assert_eq!(hits.len(), k.min(index.len()));
  }
  assert!(matches!(index.search("anything", 0), Err(RagError::InvalidK(0))));
}

#[test]
fn search_is_deterministic() {
  let index = default_index();
  let a: Vec<String> = index.search("Which actors are there?", 4).unwrap().iter().map(|e| e.sql().to_string()).collect();
  let b: Vec<String> = index.search("Which actors are there?", 4).unwrap().iter().map(|e| e.sql().to_string()).collect();
  assert_eq!(a, b);
}

#[test]
fn ties_keep_insertion_order() {
  let seeds = vec![SeedPair::new("a", "SELECT 1"), SeedPair::new("b", "SELECT 2"), SeedPair::new("c", "SELECT 3")];
  let index = ExampleIndex::build(seeds, Arc::new(ConstantEmbedder)).unwrap();
  let sqls: Vec<&str> = index.search("whatever", 3).unwrap().iter().map(|e| e.sql()).collect();
  assert_eq!(sqls, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
}

#[test]
fn one_failed_embedding_fails_the_build() {
  let seeds = vec![SeedPair::new("fine", "SELECT 1"), SeedPair::new("boom", "SELECT 2")];
  let err = ExampleIndex::build(seeds, Arc::new(FragileEmbedder)).unwrap_err();
  assert!(matches!(err, RagError::Provider(ProviderError::Embedding(_))));
  assert!(matches!(ExampleIndex::build(vec![], Arc::new(FragileEmbedder)), Err(RagError::Seeds(_))));
}

#[test]
fn retriever_returns_owned_examples_best_first() {
  let retriever = ExampleRetriever::new(Arc::new(default_index()), 2).unwrap();
  let examples = retriever.retrieve("List all customers").unwrap();
  assert_eq!(examples.len(), 2);
  assert_eq!(examples[0].sql(), "SELECT first_name, last_name FROM customer");
  assert!(ExampleRetriever::new(Arc::new(default_index()), 0).is_err());
}

fn customer_catalog() -> SchemaCatalog {
  SchemaCatalog::from_tables(None,
                             vec![TableSchema::new("customer",
                                                   vec![ColumnSchema::new("first_name", "text", None),
                                                        ColumnSchema::new("last_name", "text", None)])])
  .unwrap()
}

#[test]
fn prompt_contains_all_parts_in_order() {
  let index = default_index();
  let examples: Vec<_> = index.search("List all customers", 2).unwrap().into_iter().cloned().collect();
  let prompt = PromptAssembler::default().assemble(&customer_catalog(), &examples, "List all customers");
  let text = prompt.as_str();

  let directive = text.find("Do not use escape characters").expect("directive");
  let schema = text.find("customer(first_name text, last_name text)").expect("schema");
  let first = text.find(&format!("Question: {}\nQuery: {}", examples[0].question(), examples[0].sql()))
                  .expect("first example");
  let second = text.find(&format!("Question: {}\nQuery: {}", examples[1].question(), examples[1].sql()))
                   .expect("second example");
  let question = text.find("User question: List all customers").expect("question");
  assert!(directive < schema && schema < first && first < second && second < question);
  assert!(text.contains("PostgreSQL"));
  assert_eq!(prompt.examples_used(), 2);
}

#[test]
fn prompt_truncation_drops_lowest_ranked_examples_whole() {
  let index = default_index();
  let examples: Vec<_> = index.search("List all customers", 3).unwrap().into_iter().cloned().collect();
  let catalog = customer_catalog();
  let full = PromptAssembler::default().assemble(&catalog, &examples, "List all customers");
  let without_last = PromptAssembler::default().assemble(&catalog, &examples[..2], "List all customers");

  let limit = without_last.as_str().chars().count();
  let cut = PromptAssembler::new(Some(limit)).assemble(&catalog, &examples, "List all customers");
  assert_eq!(cut.as_str(), without_last.as_str());
  assert_eq!(cut.examples_used(), 2);
  assert_eq!(cut.examples_dropped(), 1);
  assert!(full.as_str().chars().count() > limit);

  // sin espacio ni para un ejemplo: se mantiene esquema y pregunta
  let tiny = PromptAssembler::new(Some(10)).assemble(&catalog, &examples, "List all customers");
  assert_eq!(tiny.examples_used(), 0);
  assert_eq!(tiny.examples_dropped(), 3);
  assert!(tiny.as_str().contains("customer(first_name text, last_name text)"));
  assert!(tiny.as_str().contains("User question: List all customers"));
}

#[test]
fn nan_scores_rank_last_and_stay_deterministic() {
  let seeds = vec![SeedPair::new("a nan seed", "SELECT 0"),
                   SeedPair::new("short", "SELECT 1"),
                   SeedPair::new("another nan", "SELECT 2"),
                   SeedPair::new("a longer question", "SELECT 3")];
  let index = ExampleIndex::build(seeds, Arc::new(NanEmbedder)).unwrap();
  let run = || -> Vec<String> { index.search("query", 4).unwrap().iter().map(|e| e.sql().to_string()).collect() };
  let first = run();
  assert_eq!(&first[2..], &["SELECT 0".to_string(), "SELECT 2".to_string()]);
  assert_eq!(first, run());
}
