use nl2sql_domain::SchemaCatalog;
use nl2sql_persistence::store_from_url;
use nl2sql_providers::{ChatCompletionsModel, ModelSettings};
use nl2sql_workflow::{CatalogCache, QueryFailure, QueryService, ServiceConfig, WorkflowError};
use serde::Serialize;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Salida JSON de una petición fallida.
#[derive(Serialize)]
struct FailureOutput<'a> {
    question: &'a str,
    stage: String,
    category: String,
    error: String,
}

/// Consola de preguntas en lenguaje natural sobre una base de datos.
///
/// Con argumentos, los une como pregunta, la responde una vez y termina.
/// Sin argumentos abre un menú interactivo:
/// 1) Hacer una pregunta
/// 2) Ver tablas
/// 3) Ver columnas de una tabla
/// 4) Ver ejemplos semilla
/// 5) Refrescar esquema
/// 6) Salir
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .finish()
        .init();

    let config = ServiceConfig::from_env()?;
    let store = store_from_url(&config.database_url)?;
    let api_key = config.api_key
                        .clone()
                        .ok_or_else(|| WorkflowError::Config("GROQ_API_KEY no está definida".into()))?;
    let settings = ModelSettings { model: config.model.clone(),
                                   temperature: 0.0,
                                   timeout: config.generation_timeout };
    let model = Arc::new(ChatCompletionsModel::new(config.llm_base_url.clone(), api_key, settings)?);
    let service = QueryService::from_config(&config, store, model)?;
    log::info!("Servicio listo: modelo {}, top-k {}, TTL de esquema {:?}",
               service.generator().model_id(),
               service.retriever().k(),
               config.catalog_ttl);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let question = args.join(" ");
        return match service.answer(&question).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }
            Err(failure) => {
                print_failure(&question, &failure)?;
                Err(failure.into())
            }
        };
    }

    loop {
        println!("\n== NL2SQL ==");
        println!("1) Hacer una pregunta");
        println!("2) Ver tablas");
        println!("3) Ver columnas de una tabla");
        println!("4) Ver ejemplos semilla");
        println!("5) Refrescar esquema");
        println!("6) Salir");
        let Some(choice) = prompt("Elige una opción: ")? else {
            println!("\nSaliendo...");
            break;
        };
        match choice.trim() {
            "1" => {
                let Some(question) = prompt("Pregunta: ")? else {
                    break;
                };
                let question = question.trim();
                if question.is_empty() {
                    eprintln!("La pregunta está vacía");
                    continue;
                }
                match service.answer(question).await {
                    Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                    Err(failure) => print_failure(question, &failure)?,
                }
            }
            "2" => match load_catalog(service.catalog(), false).await {
                Ok(catalog) => {
                    let db = catalog.database().unwrap_or("-");
                    println!("\nBase de datos: {} (leído {})", db, catalog.refreshed_at());
                    for name in catalog.table_names() {
                        println!("  {}", name);
                    }
                }
                Err(e) => eprintln!("Error leyendo el esquema: {}", e),
            },
            "3" => {
                let Some(name) = prompt("Tabla: ")? else {
                    break;
                };
                match load_catalog(service.catalog(), false).await {
                    Ok(catalog) => match catalog.table(name.trim()) {
                        Some(table) => {
                            println!("\n{}", table.name);
                            for c in &table.columns {
                                println!("  {}", c);
                            }
                        }
                        None => eprintln!("No existe la tabla: {}", name.trim()),
                    },
                    Err(e) => eprintln!("Error leyendo el esquema: {}", e),
                }
            }
            "4" => {
                for (i, e) in service.retriever().index().examples().iter().enumerate() {
                    println!("\n#{} {}", i + 1, e);
                }
            }
            "5" => match load_catalog(service.catalog(), true).await {
                Ok(catalog) => println!("Esquema refrescado: {} tablas", catalog.len()),
                Err(e) => eprintln!("Error refrescando el esquema: {}", e),
            },
            "6" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

// Las lecturas de esquema bloquean: se ejecutan fuera del runtime.
async fn load_catalog(cache: &Arc<CatalogCache>, force: bool) -> Result<Arc<SchemaCatalog>, Box<dyn Error>> {
    let cache = Arc::clone(cache);
    let catalog = tokio::task::spawn_blocking(move || if force { cache.refresh_now() } else { cache.get() }).await??;
    Ok(catalog)
}

fn print_failure(question: &str, failure: &QueryFailure) -> Result<(), Box<dyn Error>> {
    eprintln!("{}", failure.user_message());
    let out = FailureOutput { question,
                              stage: failure.stage.to_string(),
                              category: failure.category().to_string(),
                              error: failure.error.to_string() };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Lee una línea de `input` tras mostrar `msg`. `None` al llegar a EOF.
fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, msg: &str) -> io::Result<Option<String>> {
    write!(output, "{}", msg)?;
    output.flush()?;
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s))
}

fn prompt(msg: &str) -> io::Result<Option<String>> {
    read_answer(&mut io::stdin().lock(), &mut io::stdout(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn closed_input_ends_the_menu() {
        let mut out = Vec::new();
        let answer = read_answer(&mut Cursor::new(""), &mut out, "Elige una opción: ").unwrap();
        assert!(answer.is_none());
        assert_eq!(String::from_utf8(out).unwrap(), "Elige una opción: ");
    }

    #[test]
    fn lines_are_read_one_at_a_time() {
        let mut input = Cursor::new("2\n\n");
        let mut out = Vec::new();
        assert_eq!(read_answer(&mut input, &mut out, "> ").unwrap().as_deref(), Some("2\n"));
        // una línea vacía no es EOF
        assert_eq!(read_answer(&mut input, &mut out, "> ").unwrap().as_deref(), Some("\n"));
        assert!(read_answer(&mut input, &mut out, "> ").unwrap().is_none());
    }
}
