#![allow(dead_code)]
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use stratus_core::{AccountFormat, AccountFormatParser, AccountRecord, ValueResolver};

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Reads a fixture file.
/// Panics if the file doesn't exist (intended for tests).
pub fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("Failed to read test fixture")
}

/// Builds a parser whose format matches the fixture's extension.
pub fn parser_for<T: AccountRecord>(name: &str) -> AccountFormatParser<T> {
    let format = AccountFormat::infer_from_path(&fixture_path(name));
    AccountFormatParser::new(format, ValueResolver::default())
}

/// Builds a resolver that substitutes placeholders from `pairs` only.
pub fn resolver_with(pairs: &[(&str, &str)]) -> ValueResolver {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ValueResolver::default().with_variables(Arc::new(vars))
}
