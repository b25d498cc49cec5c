use nl2sql_domain::{ColumnSchema, DomainError, InMemoryStore, RelationalStore, Row, TableSchema};
use nl2sql_persistence::SqliteStore;
use nl2sql_providers::{HashingEmbedder, ProviderError, ScriptedModel};
use nl2sql_rag::{default_seed_pairs, ExampleIndex, ExampleRetriever, PromptAssembler};
use nl2sql_workflow::{CatalogCache, FailureCategory, QueryService, QueryStage, SqlExecutor, SqlGenerator,
                      WorkflowError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn film_rental_tables() -> Vec<TableSchema> {
  vec![TableSchema::new("film",
                        vec![ColumnSchema::new("film_id", "integer", Some("nextval('film_film_id_seq')".into())),
                             ColumnSchema::new("title", "character varying", None),
                             ColumnSchema::new("release_year", "integer", None)]),
       TableSchema::new("customer",
                        vec![ColumnSchema::new("first_name", "character varying", None),
                             ColumnSchema::new("last_name", "character varying", None)])]
}

fn service(store: Arc<dyn RelationalStore>, model: Arc<ScriptedModel>) -> QueryService {
  let index = Arc::new(ExampleIndex::build(default_seed_pairs(), Arc::new(HashingEmbedder::default())).unwrap());
  QueryService::new(Arc::new(CatalogCache::new(store.clone(), Duration::from_secs(300))),
                    ExampleRetriever::new(index, 2).unwrap(),
                    PromptAssembler::default(),
                    SqlGenerator::new(model, Duration::from_secs(5)),
                    SqlExecutor::new(store))
}

fn count_row(n: i64) -> Row {
  let mut row = Row::new();
  row.insert("count".into(), json!(n));
  row
}

#[tokio::test]
async fn answers_with_sanitized_sql_and_rows() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  store.respond("SELECT COUNT(*) FROM \"film\"", vec![count_row(1000)]);
  let model = Arc::new(ScriptedModel::replying("SELECT COUNT(*) FROM \\\"film\\\""));
  let svc = service(store.clone(), model.clone());

  let result = svc.answer("How many films do we have?").await.unwrap();
  assert_eq!(result.question, "How many films do we have?");
  assert_eq!(result.sql_query, "SELECT COUNT(*) FROM \"film\"");
  assert_eq!(result.results, vec![count_row(1000)]);
  assert_eq!(store.executed(), vec!["SELECT COUNT(*) FROM \"film\"".to_string()]);

  // el prompt enviado lleva esquema, ejemplo más parecido y pregunta
  let received = model.received();
  let prompt = &received[0].last().unwrap().content;
  assert!(prompt.contains("film(film_id integer DEFAULT nextval('film_film_id_seq'), title character varying"));
  assert!(prompt.contains("Question: How many films are in the database?\nQuery: SELECT COUNT(*) FROM film"));
  assert!(prompt.contains("User question: How many films do we have?"));
}

#[tokio::test]
async fn unreachable_store_fails_before_generation() {
  let store: Arc<dyn RelationalStore> = Arc::new(InMemoryStore::unreachable());
  let model = Arc::new(ScriptedModel::replying("SELECT 1"));
  let svc = service(store, model.clone());

  let failure = svc.answer("List all customers").await.unwrap_err();
  assert_eq!(failure.stage, QueryStage::AssemblingPrompt);
  assert!(matches!(failure.error, WorkflowError::Domain(DomainError::Connection(_))));
  assert_eq!(failure.category(), FailureCategory::Database);
  assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn bad_sql_reports_the_executed_text() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  let model = Arc::new(ScriptedModel::replying("SELECT * FROM films_typo"));
  let svc = service(store, model);

  let failure = svc.answer("Show me every film").await.unwrap_err();
  assert_eq!(failure.stage, QueryStage::Executing);
  assert_eq!(failure.category(), FailureCategory::Execution);
  match failure.error {
    WorkflowError::Domain(e) => assert_eq!(e.executed_sql(), Some("SELECT * FROM films_typo")),
    other => panic!("error inesperado: {other}"),
  }
}

#[tokio::test]
async fn generation_failure_skips_execution() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  let model = Arc::new(ScriptedModel::failing("service unavailable"));
  let svc = service(store.clone(), model);

  let failure = svc.answer("List all customers").await.unwrap_err();
  assert_eq!(failure.stage, QueryStage::GeneratingSql);
  assert!(matches!(failure.error, WorkflowError::Provider(ProviderError::Generation(_))));
  assert_eq!(failure.category(), FailureCategory::Model);
  assert!(store.executed().is_empty());
}

#[tokio::test]
async fn empty_question_is_rejected_up_front() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  let model = Arc::new(ScriptedModel::replying("SELECT 1"));
  let svc = service(store.clone(), model.clone());

  let failure = svc.answer("   ").await.unwrap_err();
  assert_eq!(failure.stage, QueryStage::Received);
  assert_eq!(failure.category(), FailureCategory::InvalidQuestion);
  assert_eq!(model.calls(), 0);
  assert_eq!(store.introspection_count(), 0);
}

#[tokio::test]
async fn punctuation_only_question_reaches_the_model() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  store.respond("SELECT 1", vec![count_row(1)]);
  let model = Arc::new(ScriptedModel::replying("SELECT 1"));
  let svc = service(store, model.clone());

  let result = svc.answer("???").await.unwrap();
  assert_eq!(result.results, vec![count_row(1)]);
  assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn catalog_is_cached_across_requests() {
  let store = Arc::new(InMemoryStore::new(film_rental_tables()));
  store.respond("SELECT COUNT(*) FROM film", vec![count_row(3)]);
  let model = Arc::new(ScriptedModel::replying("SELECT COUNT(*) FROM film"));
  let svc = Arc::new(service(store.clone(), model));

  let mut handles = Vec::new();
  for _ in 0..4 {
    let svc = Arc::clone(&svc);
    handles.push(tokio::spawn(async move { svc.answer("How many films?").await }));
  }
  for h in handles {
    assert_eq!(h.await.unwrap().unwrap().results, vec![count_row(3)]);
  }
  assert!(store.introspection_count() >= 1);
  svc.answer("How many films?").await.unwrap();
  let before = store.introspection_count();
  svc.answer("How many films?").await.unwrap();
  assert_eq!(store.introspection_count(), before);
}

#[tokio::test]
async fn runs_against_a_real_sqlite_database() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("rental.db");
  {
    let conn = rusqlite_setup(&path);
    drop(conn);
  }
  let store: Arc<dyn RelationalStore> = Arc::new(SqliteStore::new(&path));
  let model = Arc::new(ScriptedModel::replying("SELECT first_name, last_name FROM customer ORDER BY last_name"));
  let svc = service(store, model);

  let result = svc.answer("List all customers").await.unwrap();
  assert_eq!(result.results.len(), 2);
  assert_eq!(result.results[0]["last_name"], json!("JOHNSON"));
  let keys: Vec<&String> = result.results[0].keys().collect();
  assert_eq!(keys, vec!["first_name", "last_name"]);
}

fn rusqlite_setup(path: &std::path::Path) -> rusqlite::Connection {
  let conn = rusqlite::Connection::open(path).unwrap();
  conn.execute_batch("CREATE TABLE customer (first_name TEXT, last_name TEXT);
                      INSERT INTO customer VALUES ('MARY', 'SMITH'), ('PATRICIA', 'JOHNSON');")
      .unwrap();
  conn
}
