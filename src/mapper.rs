//! Flattens reconstructed records into `users` rows.
//!
//! Required: `name.firstName`, `name.lastName` and `age`. `address` is stored
//! as JSON when present; every other top-level key is collected into the JSON
//! `additional_info` bag.
//!
//! Name parts and `address` count as absent when blank: null, `false`, zero
//! or the empty string. `age` is only absent when null, so `0` is a valid age.

use serde::Serialize;

use crate::{
    data::{Record, Value, whole_number},
    error::{IngestError, IngestResult},
};

pub const NAME_KEY: &str = "name";
pub const FIRST_NAME_KEY: &str = "firstName";
pub const LAST_NAME_KEY: &str = "lastName";
pub const AGE_KEY: &str = "age";
pub const ADDRESS_KEY: &str = "address";

const PRIMARY_KEYS: [&str; 3] = [NAME_KEY, AGE_KEY, ADDRESS_KEY];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub name: String,
    pub age: i64,
    pub address: Option<String>,
    pub additional_info: Option<String>,
}

pub fn map_record(record: &Record) -> IngestResult<UserRow> {
    let name = full_name(record)?;
    let age = match record.get(AGE_KEY) {
        None | Some(Value::Null) => return Err(IngestError::missing_field(AGE_KEY)),
        Some(value) => coerce_age(value)?,
    };

    let address = match record.get(ADDRESS_KEY) {
        Some(value) if !is_blank(value) => Some(to_json(value)?),
        _ => None,
    };

    let extra = record
        .iter()
        .filter(|(key, _)| !PRIMARY_KEYS.contains(key))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect::<Record>();
    let additional_info = if extra.is_empty() {
        None
    } else {
        Some(to_json(&extra)?)
    };

    Ok(UserRow {
        name,
        age,
        address,
        additional_info,
    })
}

fn full_name(record: &Record) -> IngestResult<String> {
    let missing = || {
        IngestError::missing_field(format!(
            "{NAME_KEY}.{FIRST_NAME_KEY} or {NAME_KEY}.{LAST_NAME_KEY}"
        ))
    };
    let name = record
        .get(NAME_KEY)
        .and_then(Value::as_record)
        .ok_or_else(missing)?;
    let first = name_part(name, FIRST_NAME_KEY).ok_or_else(missing)?;
    let last = name_part(name, LAST_NAME_KEY).ok_or_else(missing)?;
    Ok(format!("{first} {last}"))
}

fn name_part(name: &Record, key: &str) -> Option<String> {
    match name.get(key)? {
        Value::Nested(_) => None,
        value if is_blank(value) => None,
        other => Some(other.as_display()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Boolean(false) => true,
        Value::Number(n) => *n == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Boolean(true) | Value::Nested(_) => false,
    }
}

/// Integer coercion for the age column.
///
/// Numbers truncate toward zero; strings use their leading signed digit run
/// (`"34yrs"` → 34). Anything else is rejected.
pub fn coerce_age(value: &Value) -> IngestResult<i64> {
    match value {
        Value::Number(n) => {
            let truncated = n.trunc();
            whole_number(truncated)
                .ok_or_else(|| IngestError::invalid_age(format!("{n} is out of range")))
        }
        Value::String(s) => leading_integer(s)
            .ok_or_else(|| IngestError::invalid_age(format!("'{s}' is not an integer"))),
        Value::Null => Err(IngestError::missing_field(AGE_KEY)),
        other => Err(IngestError::invalid_age(format!(
            "'{}' is not an integer",
            other.as_display()
        ))),
    }
}

fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, c)| &rest[..idx + c.len_utf8()])?;
    digits.parse::<i64>().ok().map(|n| sign * n)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> IngestResult<String> {
    serde_json::to_string(value)
        .map_err(|err| IngestError::StoreWrite(format!("serializing nested value: {err}")))
}
