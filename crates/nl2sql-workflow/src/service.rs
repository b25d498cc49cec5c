// Archivo: service.rs
// Propósito: servicio de consultas. Encadena recuperación de ejemplos,
// ensamblado del prompt, generación y ejecución para una pregunta.
use crate::catalog::CatalogCache;
use crate::config::ServiceConfig;
use crate::errors::{QueryFailure, WorkflowError};
use crate::executor::SqlExecutor;
use crate::generator::SqlGenerator;
use crate::stage::QueryStage;
use nl2sql_domain::{QueryRequest, QueryResult, RelationalStore};
use nl2sql_providers::{HashingEmbedder, LanguageModel};
use nl2sql_rag::{default_seed_pairs, load_seed_pairs, ExampleIndex, ExampleRetriever, PromptAssembler};
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de pregunta → SQL → filas.
///
/// Todos los colaboradores se comparten por `Arc`, así que el servicio puede
/// atender peticiones concurrentes desde varias tareas.
pub struct QueryService {
  catalog: Arc<CatalogCache>,
  retriever: ExampleRetriever,
  assembler: PromptAssembler,
  generator: SqlGenerator,
  executor: SqlExecutor,
}

fn advance(request_id: Uuid, stage: QueryStage) -> QueryStage {
  let next = stage.next().unwrap_or(QueryStage::Failed);
  log::info!("[{}] {} -> {}", request_id, stage, next);
  next
}

fn failed(request_id: Uuid, stage: QueryStage, error: impl Into<WorkflowError>) -> QueryFailure {
  let failure = QueryFailure::new(stage, error);
  log::error!("[{}] {} -> {}: {}", request_id, stage, QueryStage::Failed, failure.error);
  failure
}

impl QueryService {
  pub fn new(catalog: Arc<CatalogCache>,
             retriever: ExampleRetriever,
             assembler: PromptAssembler,
             generator: SqlGenerator,
             executor: SqlExecutor)
             -> Self {
    Self { catalog, retriever, assembler, generator, executor }
  }

  /// Construye el servicio completo a partir de la configuración: embedder
  /// local, corpus semilla (el incorporado más el fichero opcional), índice,
  /// caché de catálogo y generador.
  pub fn from_config(config: &ServiceConfig,
                     store: Arc<dyn RelationalStore>,
                     model: Arc<dyn LanguageModel>)
                     -> Result<Self, WorkflowError> {
    let embedder = Arc::new(HashingEmbedder::new(config.embedding_dim)?);
    let mut seeds = default_seed_pairs();
    if let Some(path) = &config.seeds_path {
      let extra = load_seed_pairs(path)?;
      log::info!("Cargadas {} semillas adicionales desde {}", extra.len(), path.display());
      seeds.extend(extra);
    }
    let index = Arc::new(ExampleIndex::build(seeds, embedder)?);
    let retriever = ExampleRetriever::new(index, config.top_k)?;
    Ok(Self::new(Arc::new(CatalogCache::new(Arc::clone(&store), config.catalog_ttl)),
                 retriever,
                 PromptAssembler::new(config.max_prompt_chars),
                 SqlGenerator::new(model, config.generation_timeout),
                 SqlExecutor::new(store)))
  }

  pub fn catalog(&self) -> &Arc<CatalogCache> {
    &self.catalog
  }

  pub fn retriever(&self) -> &ExampleRetriever {
    &self.retriever
  }

  pub fn generator(&self) -> &SqlGenerator {
    &self.generator
  }

  /// Responde una pregunta. Devuelve la pregunta, el SQL exacto ejecutado y
  /// las filas, o un `QueryFailure` con la etapa que falló.
  pub async fn answer(&self, question: &str) -> Result<QueryResult, QueryFailure> {
    let request_id = Uuid::new_v4();
    let mut stage = QueryStage::Received;
    log::info!("[{}] {}: {}", request_id, stage, question);
    let request = QueryRequest::new(question).map_err(|e| failed(request_id, stage, e))?;

    stage = advance(request_id, stage);
    let examples = self.retriever.retrieve(request.question()).map_err(|e| failed(request_id, stage, e))?;

    stage = advance(request_id, stage);
    let cache = Arc::clone(&self.catalog);
    let catalog = tokio::task::spawn_blocking(move || cache.get())
      .await
      .map_err(|e| failed(request_id, stage, WorkflowError::Other(format!("tarea de catálogo abortada: {}", e))))?
      .map_err(|e| failed(request_id, stage, e))?;
    let prompt = self.assembler.assemble(&catalog, &examples, request.question());
    log::debug!("[{}] Prompt con {} ejemplos ({} descartados)",
                request_id,
                prompt.examples_used(),
                prompt.examples_dropped());

    stage = advance(request_id, stage);
    let generated = self.generator.generate(&prompt).await.map_err(|e| failed(request_id, stage, e))?;
    let sql = generated.sanitize();
    if sql.as_str() != generated.as_str() {
      log::debug!("[{}] SQL saneado: {:?} -> {:?}", request_id, generated.as_str(), sql.as_str());
    }

    stage = advance(request_id, stage);
    let executor = self.executor.clone();
    let to_run = sql.clone();
    let rows = tokio::task::spawn_blocking(move || executor.execute(&to_run))
      .await
      .map_err(|e| failed(request_id, stage, WorkflowError::Other(format!("tarea de ejecución abortada: {}", e))))?
      .map_err(|e| failed(request_id, stage, e))?;

    advance(request_id, stage);
    Ok(QueryResult::new(request, sql, rows))
  }
}
