use base64::Engine;
use nl2sql_domain::{ColumnSchema, DomainError, RelationalStore, Result, Row, SanitizedSql, TableSchema};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Number, Value as JsonValue};
use std::path::{Path, PathBuf};

const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
                           ORDER BY name";
const LIST_COLUMNS: &str = "SELECT name, type, dflt_value FROM pragma_table_info(?1) ORDER BY cid";

/// Almacén sobre un fichero SQLite existente.
///
/// El fichero no se crea: si no existe la conexión falla, igual que un
/// servidor caído.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  path: PathBuf,
}

impl SqliteStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn open(&self) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(&self.path,
                                OpenFlags::SQLITE_OPEN_READ_WRITE
                                | OpenFlags::SQLITE_OPEN_URI
                                | OpenFlags::SQLITE_OPEN_NO_MUTEX)
  }
}

fn to_json(value: ValueRef<'_>) -> JsonValue {
  match value {
    ValueRef::Null => JsonValue::Null,
    ValueRef::Integer(i) => JsonValue::from(i),
    ValueRef::Real(f) => Number::from_f64(f).map(JsonValue::Number).unwrap_or(JsonValue::Null),
    ValueRef::Text(t) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b)),
  }
}

impl RelationalStore for SqliteStore {
  fn introspect(&self) -> Result<Vec<TableSchema>> {
    let conn = self.open().map_err(|e| DomainError::Connection(e.to_string()))?;
    let fetch = |e: rusqlite::Error| DomainError::SchemaFetch(e.to_string());

    let names: Vec<String> = {
      let mut stmt = conn.prepare(LIST_TABLES).map_err(fetch)?;
      let rows = stmt.query_map([], |r| r.get::<_, String>(0)).map_err(fetch)?;
      rows.collect::<rusqlite::Result<_>>().map_err(fetch)?
    };

    let mut stmt = conn.prepare(LIST_COLUMNS).map_err(fetch)?;
    let mut tables = Vec::with_capacity(names.len());
    for name in names {
      let columns = stmt.query_map([&name], |r| {
                          Ok(ColumnSchema { name: r.get(0)?, data_type: r.get(1)?, default: r.get(2)? })
                        })
                        .map_err(fetch)?
                        .collect::<rusqlite::Result<Vec<_>>>()
                        .map_err(fetch)?;
      tables.push(TableSchema::new(name, columns));
    }
    Ok(tables)
  }

  fn execute(&self, sql: &SanitizedSql) -> Result<Vec<Row>> {
    let text = sql.as_str();
    let fail = |e: rusqlite::Error| DomainError::execution(text, e);
    let conn = self.open().map_err(fail)?;
    let mut stmt = conn.prepare(text).map_err(fail)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query([]).map_err(fail)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next().map_err(fail)? {
      let mut row = Row::with_capacity(names.len());
      for (i, name) in names.iter().enumerate() {
        row.insert(name.clone(), to_json(r.get_ref(i).map_err(fail)?));
      }
      out.push(row);
    }
    Ok(out)
  }

  fn database_name(&self) -> Option<String> {
    self.path.file_stem().map(|s| s.to_string_lossy().into_owned())
  }
}
