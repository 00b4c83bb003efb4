//! Account file parsing.
//!
//! Reconciles the three accepted document shapes into one account list:
//!
//! - provider-keyed map: `{ "<provider>": { "accounts": [ ... ] } }`
//! - bare list: `[ { name: ... }, ... ]`
//! - single account: `{ name: ..., ... }`

use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};
use tracing::debug;

use crate::account::AccountRecord;
use crate::error::{Result, StratusError};
use crate::format::AccountFormat;
use crate::secret::ValueResolver;

const ACCOUNTS_KEY: &str = "accounts";
const NAME_KEY: &str = "name";

/// The decoded document root, classified before any branching.
#[derive(Debug, PartialEq)]
enum DocumentRoot {
    /// Empty document or explicit null.
    Empty,
    /// A literal array of accounts.
    List(Vec<Value>),
    /// A provider-keyed map or a single account.
    Map(Map<String, Value>),
}

impl DocumentRoot {
    fn classify(value: Value, source: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::Array(items) => Ok(Self::List(items)),
            Value::Object(map) => Ok(Self::Map(map)),
            other => Err(StratusError::parse_error(
                source,
                format!("expected a map or a list at document root, found {}", kind(&other)),
            )),
        }
    }
}

/// Parses account files of one format into records of one type.
///
/// The parser is cheap to clone and holds no per-parse state.
pub struct AccountFormatParser<T> {
    format: AccountFormat,
    resolver: ValueResolver,
    _record: PhantomData<fn() -> T>,
}

impl<T: AccountRecord> AccountFormatParser<T> {
    /// Creates a parser for the given format.
    pub fn new(format: AccountFormat, resolver: ValueResolver) -> Self {
        Self {
            format,
            resolver,
            _record: PhantomData,
        }
    }

    /// Returns the declared format.
    pub fn format(&self) -> AccountFormat {
        self.format
    }

    /// Returns a parser for the same record type with another format.
    pub fn with_format(&self, format: AccountFormat) -> Self {
        Self::new(format, self.resolver.clone())
    }

    /// Parses `bytes` into zero or more accounts.
    ///
    /// `source` names the content in errors and logs.
    ///
    /// # Errors
    ///
    /// - `StratusError::Parse` if the content is malformed or does not
    ///   convert into `T`
    /// - `StratusError::MissingAccountsKey` if the provider section has no
    ///   `accounts` list
    pub fn parse(&self, bytes: &[u8], source: &str) -> Result<Vec<T>> {
        let root = DocumentRoot::classify(self.decode(bytes, source)?, source)?;

        let accounts = match root {
            DocumentRoot::Empty => Vec::new(),
            DocumentRoot::List(items) => self.convert_list(items, source)?,
            DocumentRoot::Map(map) => self.convert_map(map, source)?,
        };

        debug!(
            "Loaded {} {} accounts from {}",
            accounts.len(),
            T::PROVIDER,
            source
        );

        Ok(accounts)
    }

    fn decode(&self, bytes: &[u8], source: &str) -> Result<Value> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        match self.format {
            AccountFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| StratusError::parse_error_with_cause(source, "invalid JSON", e)),
            AccountFormat::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| StratusError::parse_error_with_cause(source, "invalid YAML", e)),
        }
    }

    fn convert_map(&self, mut map: Map<String, Value>, source: &str) -> Result<Vec<T>> {
        let provider = T::PROVIDER.as_str();

        let Some(section) = map.remove(provider) else {
            if map.contains_key(NAME_KEY) {
                // single account defined in a file
                return self.convert_one(Value::Object(map), source).map(|a| vec![a]);
            }
            return Ok(Vec::new());
        };

        let accounts = match section {
            Value::Object(mut section) => section.remove(ACCOUNTS_KEY),
            Value::Null => None,
            other => {
                return Err(StratusError::parse_error(
                    source,
                    format!("provider '{provider}' should be a map, found {}", kind(&other)),
                ));
            },
        };

        match accounts {
            None | Some(Value::Null) => Err(StratusError::missing_accounts_key(source, provider)),
            Some(Value::Array(items)) => self.convert_list(items, source),
            Some(other) => Err(StratusError::parse_error(
                source,
                format!("\"{ACCOUNTS_KEY}\" of provider '{provider}' should be a list, found {}", kind(&other)),
            )),
        }
    }

    fn convert_list(&self, items: Vec<Value>, source: &str) -> Result<Vec<T>> {
        let mut list = Value::Array(items);
        self.resolver.resolve_tree(&mut list);

        serde_json::from_value(list).map_err(|e| {
            StratusError::parse_error_with_cause(
                source,
                format!("accounts don't match the {} schema", T::PROVIDER),
                e,
            )
        })
    }

    fn convert_one(&self, mut account: Value, source: &str) -> Result<T> {
        self.resolver.resolve_tree(&mut account);

        serde_json::from_value(account).map_err(|e| {
            StratusError::parse_error_with_cause(
                source,
                format!("account doesn't match the {} schema", T::PROVIDER),
                e,
            )
        })
    }
}

impl<T> Clone for AccountFormatParser<T> {
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            resolver: self.resolver.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for AccountFormatParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountFormatParser")
            .field("format", &self.format)
            .field("record", &std::any::type_name::<T>())
            .finish()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
