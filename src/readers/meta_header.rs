//! Station meta-header parsing.
//!
//! The meta-header is a block of `Key = literal` statements (several per line
//! when separated by `;`) that ends at the sentinel line. Only the fixed key set
//! below is accepted and values must be plain string, numeric or boolean
//! literals.

use crate::error::{ProviderError, Result};
use crate::meteo::check_angstrom_ab;
use crate::models::StationMetadata;
use crate::utils::constants::{DEFAULT_SENTINEL, META_HEADER_TIMEOUT_SECS};
use std::collections::HashMap;
use std::io::BufRead;
use std::iter::Peekable;
use std::str::Chars;
use std::time::{Duration, Instant};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MetaKey {
    Country,
    Station,
    Description,
    Source,
    Contact,
    Longitude,
    Latitude,
    Elevation,
    AngstromA,
    AngstromB,
    HasSunshine,
}

impl MetaKey {
    const ALL: [MetaKey; 11] = [
        MetaKey::Country,
        MetaKey::Station,
        MetaKey::Description,
        MetaKey::Source,
        MetaKey::Contact,
        MetaKey::Longitude,
        MetaKey::Latitude,
        MetaKey::Elevation,
        MetaKey::AngstromA,
        MetaKey::AngstromB,
        MetaKey::HasSunshine,
    ];

    fn name(&self) -> &'static str {
        match self {
            MetaKey::Country => "Country",
            MetaKey::Station => "Station",
            MetaKey::Description => "Description",
            MetaKey::Source => "Source",
            MetaKey::Contact => "Contact",
            MetaKey::Longitude => "Longitude",
            MetaKey::Latitude => "Latitude",
            MetaKey::Elevation => "Elevation",
            MetaKey::AngstromA => "AngstromA",
            MetaKey::AngstromB => "AngstromB",
            MetaKey::HasSunshine => "HasSunshine",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    fn type_name(&self) -> &'static str {
        match self {
            Literal::Text(_) => "string",
            Literal::Number(_) => "number",
            Literal::Bool(_) => "boolean",
        }
    }
}

/// Station metadata plus the number of lines consumed, sentinel included.
#[derive(Debug, Clone)]
pub struct MetaHeader {
    pub station: StationMetadata,
    pub line_count: usize,
}

pub struct MetaHeaderParser {
    sentinel: String,
    timeout: Duration,
}

impl MetaHeaderParser {
    pub fn new() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            timeout: Duration::from_secs(META_HEADER_TIMEOUT_SECS),
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the meta-header from `reader`, leaving it positioned on the line
    /// after the sentinel.
    pub fn parse<R: BufRead>(&self, reader: &mut R) -> Result<MetaHeader> {
        // A timeout too large to represent means no deadline
        let deadline = Instant::now().checked_add(self.timeout);
        let mut values: HashMap<MetaKey, Literal> = HashMap::new();
        let mut line = String::new();
        let mut line_count = 0;

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(ProviderError::MetaHeaderTimeout(self.timeout));
            }

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(ProviderError::SentinelNotFound(self.sentinel.clone()));
            }
            line_count += 1;

            let mut content = line.trim_end_matches(['\r', '\n']);
            if line_count == 1 {
                content = content.trim_start_matches('\u{feff}');
            }

            if content.trim_start().starts_with(&self.sentinel) {
                break;
            }

            let statements = parse_statements(content).map_err(|message| {
                ProviderError::InvalidMetaHeader {
                    line: line_count,
                    message,
                }
            })?;

            for (name, literal) in statements {
                let key = MetaKey::from_name(&name).ok_or_else(|| {
                    ProviderError::InvalidMetaHeader {
                        line: line_count,
                        message: format!("unknown key '{}'", name),
                    }
                })?;
                if values.insert(key, literal).is_some() {
                    return Err(ProviderError::InvalidMetaHeader {
                        line: line_count,
                        message: format!("duplicate key '{}'", name),
                    });
                }
            }
        }

        let station = build_station(&mut values)?;
        Ok(MetaHeader {
            station,
            line_count,
        })
    }
}

impl Default for MetaHeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

fn build_station(values: &mut HashMap<MetaKey, Literal>) -> Result<StationMetadata> {
    let (angstrom_a, angstrom_b) = check_angstrom_ab(
        take_number(values, MetaKey::AngstromA)?,
        take_number(values, MetaKey::AngstromB)?,
    )
    .map_err(|e| ProviderError::OutOfRange(e.to_string()))?;

    let station = StationMetadata {
        country: take_text(values, MetaKey::Country)?,
        station: take_text(values, MetaKey::Station)?,
        description: take_text(values, MetaKey::Description)?,
        source: take_text(values, MetaKey::Source)?,
        contact: take_text(values, MetaKey::Contact)?,
        longitude: take_number(values, MetaKey::Longitude)?,
        latitude: take_number(values, MetaKey::Latitude)?,
        elevation: take_number(values, MetaKey::Elevation)?,
        angstrom_a,
        angstrom_b,
        has_sunshine: take_bool(values, MetaKey::HasSunshine)?,
    };

    station.validate()?;
    Ok(station)
}

fn take(values: &mut HashMap<MetaKey, Literal>, key: MetaKey) -> Result<Literal> {
    values
        .remove(&key)
        .ok_or(ProviderError::MissingMetadataKey(key.name()))
}

fn wrong_type(key: MetaKey, expected: &str, found: &Literal) -> ProviderError {
    ProviderError::Config(format!(
        "meta-header key {} expects a {} literal, found a {}",
        key.name(),
        expected,
        found.type_name()
    ))
}

fn take_text(values: &mut HashMap<MetaKey, Literal>, key: MetaKey) -> Result<String> {
    match take(values, key)? {
        Literal::Text(text) => Ok(text),
        other => Err(wrong_type(key, "string", &other)),
    }
}

fn take_number(values: &mut HashMap<MetaKey, Literal>, key: MetaKey) -> Result<f64> {
    match take(values, key)? {
        Literal::Number(value) => Ok(value),
        other => Err(wrong_type(key, "number", &other)),
    }
}

fn take_bool(values: &mut HashMap<MetaKey, Literal>, key: MetaKey) -> Result<bool> {
    match take(values, key)? {
        Literal::Bool(flag) => Ok(flag),
        Literal::Number(value) if value == 0.0 => Ok(false),
        Literal::Number(value) if value == 1.0 => Ok(true),
        other => Err(wrong_type(key, "boolean", &other)),
    }
}

/// Splits a line into `(key, literal)` statements.
fn parse_statements(line: &str) -> std::result::Result<Vec<(String, Literal)>, String> {
    let mut statements = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        skip_whitespace(&mut chars);
        match chars.peek() {
            None | Some('#') => break,
            Some(';') => {
                chars.next();
                continue;
            }
            _ => {}
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                key.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if key.is_empty() {
            let rest: String = chars.collect();
            return Err(format!("expected a key, found '{}'", rest.trim()));
        }

        skip_whitespace(&mut chars);
        if chars.next() != Some('=') {
            return Err(format!("expected '=' after '{}'", key));
        }
        skip_whitespace(&mut chars);

        let literal = parse_literal(&mut chars).map_err(|e| format!("{} for key '{}'", e, key))?;

        skip_whitespace(&mut chars);
        match chars.peek() {
            None | Some('#') => {}
            Some(';') => {
                chars.next();
            }
            Some(c) => return Err(format!("unexpected '{}' after value of '{}'", c, key)),
        }

        statements.push((key, literal));
    }

    Ok(statements)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn parse_literal(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Literal, String> {
    match chars.peek().copied() {
        Some(quote @ ('\'' | '"')) => {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    None => return Err("unterminated string".to_string()),
                    Some('\\') => match chars.next() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                        Some(c) => {
                            text.push('\\');
                            text.push(c);
                        }
                        None => return Err("unterminated string".to_string()),
                    },
                    Some(c) if c == quote => return Ok(Literal::Text(text)),
                    Some(c) => text.push(c),
                }
            }
        }
        _ => {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == ';' || c == '#' {
                    break;
                }
                token.push(c);
                chars.next();
            }
            match token.as_str() {
                "" => Err("missing value".to_string()),
                "True" | "true" => Ok(Literal::Bool(true)),
                "False" | "false" => Ok(Literal::Bool(false)),
                _ => match token.parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(Literal::Number(value)),
                    _ => Err(format!("'{}' is not a literal", token)),
                },
            }
        }
    }
}
