use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeMap};

/// A reconstructed cell: one of the four scalar kinds or a nested mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Boolean(bool),
    String(String),
    Nested(Record),
}

impl Value {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Nested(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::from("null"),
            Value::Number(n) => format_number(*n),
            Value::Boolean(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Nested(record) => serde_json::to_string(record).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            Value::Number(n) => match whole_number(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Nested(record) => record.serialize(serializer),
        }
    }
}

/// Insertion-ordered mapping of segment name to value.
///
/// Re-assigning an existing key keeps its original position, so serialised
/// output lists keys in the order their headers first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        match self.position(key) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Returns the mapping stored under `key`, replacing any scalar found there.
    pub fn child_mut(&mut self, key: &str) -> &mut Record {
        let idx = match self.position(key) {
            Some(idx) => {
                if !matches!(self.entries[idx].1, Value::Nested(_)) {
                    self.entries[idx].1 = Value::Nested(Record::new());
                }
                idx
            }
            None => {
                self.entries
                    .push((key.to_string(), Value::Nested(Record::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx].1 {
            Value::Nested(record) => record,
            _ => unreachable!("entry was just set to a nested record"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == key)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(&key, value);
        }
        record
    }
}

/// Infers the type of a raw field.
///
/// Precedence: empty → null, full numeric literal → number, `true`/`false`
/// in any case → boolean, anything else → the trimmed string.
pub fn infer_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Some(number) = parse_number(trimmed) {
        return Value::Number(number);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    Value::String(trimmed.to_string())
}

/// Parses a complete numeric literal; partial matches such as `12abc` fail.
///
/// `Infinity` (exact case) and literals too large for `f64` parse as
/// infinite values. Other spellings such as `inf` or `nan` are not numbers.
pub fn parse_number(value: &str) -> Option<f64> {
    if let Some(parsed) = parse_radix_literal(value) {
        return Some(parsed);
    }
    let parsed = value.parse::<f64>().ok()?;
    if parsed.is_finite() {
        return Some(parsed);
    }
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let overflowed = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    (parsed.is_infinite() && (overflowed || unsigned == "Infinity")).then_some(parsed)
}

fn parse_radix_literal(value: &str) -> Option<f64> {
    let lowered = value.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lowered.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lowered.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lowered.strip_prefix("0b") {
        (rest, 2)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

pub(crate) fn whole_number(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        Some(value as i64)
    } else {
        None
    }
}

fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    match whole_number(value) {
        Some(i) => i.to_string(),
        None => value.to_string(),
    }
}
