// Conversión de valores Postgres arbitrarios a JSON.
//
// El SQL ejecutado lo escribe el modelo, así que los tipos de las columnas
// no se conocen de antemano: `PgValue` acepta cualquier tipo y decodifica
// el formato binario de los más comunes.
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{FromSql, Kind, Type};
use serde_json::{Number, Value as JsonValue};
use std::error::Error;
use std::net::{Ipv4Addr, Ipv6Addr};

type BoxError = Box<dyn Error + Sync + Send>;

pub(crate) struct PgValue(JsonValue);

impl PgValue {
  pub(crate) fn into_json(self) -> JsonValue {
    self.0
  }
}

fn float(v: f64) -> JsonValue {
  Number::from_f64(v).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

fn be_i16(raw: &[u8], at: usize) -> Result<i16, BoxError> {
  raw.get(at..at + 2).map(|b| i16::from_be_bytes([b[0], b[1]])).ok_or_else(|| "numeric truncado".into())
}

/// Decodifica el formato binario de `numeric` a su representación decimal.
pub(crate) fn decode_numeric(raw: &[u8]) -> Result<String, BoxError> {
  let ndigits = be_i16(raw, 0)?.max(0) as usize;
  let weight = be_i16(raw, 2)? as i32;
  let sign = be_i16(raw, 4)? as u16;
  let dscale = be_i16(raw, 6)?.max(0) as usize;
  if sign == 0xC000 {
    return Ok("NaN".into());
  }
  let mut digits = Vec::with_capacity(ndigits);
  for i in 0..ndigits {
    digits.push(be_i16(raw, 8 + i * 2)?);
  }
  // dígito i (base 10000) tiene exponente weight - i
  let digit_at = |pos: i32| -> i16 {
    if pos < 0 {
      0
    } else {
      digits.get(pos as usize).copied().unwrap_or(0)
    }
  };

  let mut out = String::new();
  if sign == 0x4000 {
    out.push('-');
  }
  if weight < 0 {
    out.push('0');
  } else {
    for pos in 0..=weight {
      if pos == 0 {
        out.push_str(&digit_at(pos).to_string());
      } else {
        out.push_str(&format!("{:04}", digit_at(pos)));
      }
    }
  }
  if dscale > 0 {
    let mut frac = String::new();
    let mut pos = weight + 1;
    while frac.len() < dscale {
      frac.push_str(&format!("{:04}", digit_at(pos)));
      pos += 1;
    }
    frac.truncate(dscale);
    out.push('.');
    out.push_str(&frac);
  }
  Ok(out)
}

fn be_i32(raw: &[u8], at: usize) -> Result<i32, BoxError> {
  raw.get(at..at + 4)
     .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
     .ok_or_else(|| "valor truncado".into())
}

fn be_i64(raw: &[u8], at: usize) -> Result<i64, BoxError> {
  let b = raw.get(at..at + 8).ok_or("valor truncado")?;
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(b);
  Ok(i64::from_be_bytes(bytes))
}

fn unit(n: i64, singular: &str, plural: &str) -> String {
  format!("{} {}", n, if n.abs() == 1 { singular } else { plural })
}

/// `interval` binario (microsegundos, días, meses) con el formato de salida
/// por defecto de Postgres: `1 year 2 mons 3 days 04:05:06.5`.
pub(crate) fn decode_interval(raw: &[u8]) -> Result<String, BoxError> {
  let micros = be_i64(raw, 0)?;
  let days = be_i32(raw, 8)? as i64;
  let months = be_i32(raw, 12)? as i64;

  let mut parts = Vec::new();
  if months / 12 != 0 {
    parts.push(unit(months / 12, "year", "years"));
  }
  if months % 12 != 0 {
    parts.push(unit(months % 12, "mon", "mons"));
  }
  if days != 0 {
    parts.push(unit(days, "day", "days"));
  }
  if micros != 0 || parts.is_empty() {
    let sign = if micros < 0 { "-" } else { "" };
    let total = micros.unsigned_abs();
    let secs = total / 1_000_000;
    let frac = total % 1_000_000;
    let mut time = format!("{}{:02}:{:02}:{:02}", sign, secs / 3600, (secs / 60) % 60, secs % 60);
    if frac != 0 {
      let digits = format!("{:06}", frac);
      time.push('.');
      time.push_str(digits.trim_end_matches('0'));
    }
    parts.push(time);
  }
  Ok(parts.join(" "))
}

/// `tsvector` binario a su forma textual: `'academi':1 'dinosaur':2B`.
pub(crate) fn decode_tsvector(raw: &[u8]) -> Result<String, BoxError> {
  let count = be_i32(raw, 0)?.max(0) as usize;
  let mut at = 4;
  let mut lexemes = Vec::with_capacity(count);
  for _ in 0..count {
    let rest = raw.get(at..).ok_or("tsvector truncado")?;
    let end = rest.iter().position(|b| *b == 0).ok_or("lexema sin terminador")?;
    let word = std::str::from_utf8(&rest[..end])?;
    at += end + 1;
    let npos = be_i16(raw, at)? as u16 as usize;
    at += 2;
    let mut text = format!("'{}'", word.replace('\\', "\\\\").replace('\'', "''"));
    for i in 0..npos {
      let entry = be_i16(raw, at)? as u16;
      at += 2;
      text.push(if i == 0 { ':' } else { ',' });
      text.push_str(&(entry & 0x3FFF).to_string());
      match entry >> 14 {
        3 => text.push('A'),
        2 => text.push('B'),
        1 => text.push('C'),
        _ => {}
      }
    }
    lexemes.push(text);
  }
  Ok(lexemes.join(" "))
}

/// `inet` / `cidr` binario: familia, bits de máscara, flag cidr, longitud y
/// dirección.
pub(crate) fn decode_inet(raw: &[u8], is_cidr: bool) -> Result<String, BoxError> {
  let header = raw.get(..4).ok_or("inet truncado")?;
  let (family, bits, len) = (header[0], header[1], header[3] as usize);
  let addr = raw.get(4..4 + len).ok_or("inet truncado")?;
  let (text, max_bits) = match (family, len) {
    (2, 4) => (Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]).to_string(), 32),
    (3, 16) => {
      let mut octets = [0u8; 16];
      octets.copy_from_slice(addr);
      (Ipv6Addr::from(octets).to_string(), 128)
    }
    _ => return Err(format!("familia de dirección desconocida: {}", family).into()),
  };
  if is_cidr || bits != max_bits {
    Ok(format!("{}/{}", text, bits))
  } else {
    Ok(text)
  }
}

/// Tipos cuyo formato binario es el propio texto UTF-8.
fn is_textual(ty: &Type) -> bool {
  matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::CHAR | Type::UNKNOWN)
  || ty.name() == "citext"
}

impl<'a> FromSql<'a> for PgValue {
  fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
    if let Kind::Domain(base) = ty.kind() {
      return Self::from_sql(base, raw);
    }
    if let Kind::Array(_) = ty.kind() {
      let items = Vec::<PgValue>::from_sql(ty, raw)?;
      return Ok(PgValue(JsonValue::Array(items.into_iter().map(|v| v.0).collect())));
    }
    if let Kind::Enum(_) = ty.kind() {
      return Ok(PgValue(JsonValue::String(String::from_sql(&Type::TEXT, raw)?)));
    }
    let v = match *ty {
      Type::BOOL => JsonValue::Bool(bool::from_sql(ty, raw)?),
      Type::INT2 => JsonValue::from(i16::from_sql(ty, raw)?),
      Type::INT4 => JsonValue::from(i32::from_sql(ty, raw)?),
      Type::INT8 => JsonValue::from(i64::from_sql(ty, raw)?),
      Type::OID => JsonValue::from(u32::from_sql(ty, raw)?),
      Type::FLOAT4 => float(f32::from_sql(ty, raw)? as f64),
      Type::FLOAT8 => float(f64::from_sql(ty, raw)?),
      Type::NUMERIC => {
        let text = decode_numeric(raw)?;
        match text.parse::<f64>() {
          Ok(f) if f.is_finite() => float(f),
          _ => JsonValue::String(text),
        }
      }
      Type::JSON | Type::JSONB => JsonValue::from_sql(ty, raw)?,
      Type::UUID => JsonValue::String(uuid::Uuid::from_sql(ty, raw)?.to_string()),
      Type::TIMESTAMP => JsonValue::String(NaiveDateTime::from_sql(ty, raw)?.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
      Type::TIMESTAMPTZ => JsonValue::String(DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339()),
      Type::DATE => JsonValue::String(NaiveDate::from_sql(ty, raw)?.to_string()),
      Type::TIME => JsonValue::String(NaiveTime::from_sql(ty, raw)?.to_string()),
      Type::BYTEA => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(raw)),
      Type::INTERVAL => JsonValue::String(decode_interval(raw)?),
      Type::TS_VECTOR => JsonValue::String(decode_tsvector(raw)?),
      Type::INET => JsonValue::String(decode_inet(raw, false)?),
      Type::CIDR => JsonValue::String(decode_inet(raw, true)?),
      // centavos en un i64
      Type::MONEY => float(be_i64(raw, 0)? as f64 / 100.0),
      _ if is_textual(ty) => match std::str::from_utf8(raw) {
        Ok(text) => JsonValue::String(text.to_string()),
        Err(_) => JsonValue::Null,
      },
      _ => {
        log::debug!("Tipo {} sin conversión a JSON; se devuelve null", ty.name());
        JsonValue::Null
      }
    };
    Ok(PgValue(v))
  }

  fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
    Ok(PgValue(JsonValue::Null))
  }

  fn accepts(_ty: &Type) -> bool {
    true
  }
}
