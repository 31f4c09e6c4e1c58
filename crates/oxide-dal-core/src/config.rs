//! Connection configuration and provider selection.
//!
//! [`ConnectionParams`] identifies a backend (provider tag) and how to reach
//! it (connection string). A [`ProviderRegistry`] turns params, or a file
//! path resolved by extension, into a [`Database`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::ConnectionFactory;
use crate::database::Database;
use crate::error::{DalError, Result};

/// Key holding the file path or store location.
pub const DATA_SOURCE: &str = "Data Source";

/// Key selecting the [`OpenMode`].
pub const MODE: &str = "Mode";

/// How a file-backed store is opened.
///
/// Parsed case-insensitively from the `Mode` key of a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Read and write an existing store.
    #[default]
    ReadWrite,
    /// Read an existing store; writes fail.
    ReadOnly,
    /// Read and write, creating the store if missing.
    ReadWriteCreate,
}

impl OpenMode {
    /// Reads the mode from a connection string, defaulting to `ReadWrite`.
    pub fn from_connection_string(connection_string: &ConnectionString) -> Result<Self> {
        connection_string
            .get(MODE)
            .map_or(Ok(Self::default()), str::parse)
    }
}

impl FromStr for OpenMode {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "readwrite" => Ok(Self::ReadWrite),
            "readonly" => Ok(Self::ReadOnly),
            "readwritecreate" => Ok(Self::ReadWriteCreate),
            _ => Err(DalError::InvalidConnectionString(format!(
                "unknown {MODE} '{s}'"
            ))),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadWrite => "ReadWrite",
            Self::ReadOnly => "ReadOnly",
            Self::ReadWriteCreate => "ReadWriteCreate",
        })
    }
}

/// Immutable description of a backend and how to reach it.
///
/// Deserializable, so it can be read from a configuration file:
///
/// ```rust
/// use oxide_dal_core::ConnectionParams;
///
/// let params: ConnectionParams = serde_json::from_str(
///     r#"{ "provider": "sqlite", "connection_string": "Data Source=app.db" }"#,
/// ).unwrap();
/// assert_eq!(params.provider(), "sqlite");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    provider: String,
    connection_string: String,
}

impl ConnectionParams {
    /// Creates connection params.
    pub fn new(provider: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            connection_string: connection_string.into(),
        }
    }

    /// Returns the provider tag.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the raw connection string.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Parses the connection string.
    pub fn parsed(&self) -> Result<ConnectionString> {
        self.connection_string.parse()
    }
}

/// A parsed `Key=Value;Key=Value` connection string.
///
/// Keys are matched case-insensitively. Values containing `;` or `"` are
/// written inside double quotes, with embedded quotes doubled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    entries: Vec<(String, String)>,
}

impl ConnectionString {
    /// Creates an empty connection string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key, replacing any existing entry with the same key.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `Data Source` entry.
    #[must_use]
    pub fn data_source(&self) -> Option<&str> {
        self.get(DATA_SOURCE)
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl FromStr for ConnectionString {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self> {
        let mut result = Self::new();
        let mut chars = s.chars().peekable();

        loop {
            // Key
            let mut key = String::new();
            loop {
                match chars.next() {
                    Some('=') => break,
                    Some(';') if key.trim().is_empty() => key.clear(),
                    Some(';') => {
                        return Err(DalError::InvalidConnectionString(format!(
                            "missing '=' after key '{}'",
                            key.trim()
                        )));
                    }
                    Some(c) => key.push(c),
                    None if key.trim().is_empty() => return Ok(result),
                    None => {
                        return Err(DalError::InvalidConnectionString(format!(
                            "missing '=' after key '{}'",
                            key.trim()
                        )));
                    }
                }
            }
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(DalError::InvalidConnectionString("empty key".to_string()));
            }

            // Value
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            let mut value = String::new();
            if chars.peek() == Some(&'"') {
                chars.next();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            value.push('"');
                        }
                        Some('"') => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(DalError::InvalidConnectionString(format!(
                                "unterminated quote in value of '{key}'"
                            )));
                        }
                    }
                }
                loop {
                    match chars.next() {
                        None | Some(';') => break,
                        Some(c) if c.is_whitespace() => {}
                        Some(c) => {
                            return Err(DalError::InvalidConnectionString(format!(
                                "unexpected '{c}' after quoted value of '{key}'"
                            )));
                        }
                    }
                }
            } else {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                    value.push(c);
                }
                value = value.trim().to_string();
            }

            result = result.set(key, value);
        }
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            let needs_quotes = value.contains([';', '"'])
                || value.starts_with(char::is_whitespace)
                || value.ends_with(char::is_whitespace);
            if needs_quotes {
                write!(f, "{key}=\"{}\";", value.replace('"', "\"\""))?;
            } else {
                write!(f, "{key}={value};")?;
            }
        }
        Ok(())
    }
}

/// Builds a factory from connection params.
pub type FactoryBuilder = fn(&ConnectionParams) -> Result<Arc<dyn ConnectionFactory>>;

/// Maps provider tags and file extensions to connection factories.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, FactoryBuilder>,
    extensions: HashMap<String, String>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under a tag (case-insensitive).
    pub fn register(&mut self, provider: &str, builder: FactoryBuilder) -> &mut Self {
        self.providers.insert(provider.to_ascii_lowercase(), builder);
        self
    }

    /// Associates a file extension (with or without the dot) with a provider.
    pub fn register_extension(&mut self, extension: &str, provider: &str) -> &mut Self {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.extensions
            .insert(extension, provider.to_ascii_lowercase());
        self
    }

    /// Returns true if a provider tag is registered.
    #[must_use]
    pub fn has_provider(&self, provider: &str) -> bool {
        self.providers.contains_key(&provider.to_ascii_lowercase())
    }

    /// Builds the factory for the given params.
    pub fn factory(&self, params: &ConnectionParams) -> Result<Arc<dyn ConnectionFactory>> {
        let builder = self
            .providers
            .get(&params.provider().to_ascii_lowercase())
            .ok_or_else(|| DalError::UnsupportedFormat(params.provider().to_string()))?;
        builder(params)
    }

    /// Opens a database handle for the given params.
    pub fn open(&self, params: &ConnectionParams) -> Result<Database> {
        Ok(Database::new(self.factory(params)?))
    }

    /// Selects a provider from the file extension and builds its params.
    pub fn params_for_file(&self, path: impl AsRef<Path>) -> Result<ConnectionParams> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let provider = self
            .extensions
            .get(&extension)
            .ok_or_else(|| DalError::UnsupportedFormat(format!(".{extension}")))?;
        let connection_string =
            ConnectionString::new().set(DATA_SOURCE, path.to_string_lossy().into_owned());
        Ok(ConnectionParams::new(
            provider.clone(),
            connection_string.to_string(),
        ))
    }

    /// Opens a database handle for a file, selecting the provider by extension.
    pub fn open_file(&self, path: impl AsRef<Path>) -> Result<Database> {
        let params = self.params_for_file(path)?;
        self.open(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Connection;
    use crate::error::BackendError;

    struct NullFactory;

    impl ConnectionFactory for NullFactory {
        fn name(&self) -> &str {
            "null"
        }

        fn connect(&self) -> std::result::Result<Box<dyn Connection>, BackendError> {
            Err(BackendError::new("null backend has no connections"))
        }
    }

    fn null_builder(_params: &ConnectionParams) -> Result<Arc<dyn ConnectionFactory>> {
        Ok(Arc::new(NullFactory))
    }

    #[test]
    fn test_open_mode_from_connection_string() {
        let cs: ConnectionString = "Data Source=a.db;mode=readonly".parse().unwrap();
        assert_eq!(OpenMode::from_connection_string(&cs).unwrap(), OpenMode::ReadOnly);

        let cs: ConnectionString = "Data Source=a.db".parse().unwrap();
        assert_eq!(OpenMode::from_connection_string(&cs).unwrap(), OpenMode::ReadWrite);

        let cs: ConnectionString = "Data Source=a.db;Mode=Exclusive".parse().unwrap();
        assert!(matches!(
            OpenMode::from_connection_string(&cs),
            Err(DalError::InvalidConnectionString(_))
        ));
    }

    #[test]
    fn test_open_mode_display_round_trips() {
        for mode in [OpenMode::ReadWrite, OpenMode::ReadOnly, OpenMode::ReadWriteCreate] {
            assert_eq!(mode.to_string().parse::<OpenMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_simple() {
        let cs: ConnectionString = "Data Source=c:\\data\\app.db; Mode = ReadOnly;"
            .parse()
            .unwrap();
        assert_eq!(cs.data_source(), Some("c:\\data\\app.db"));
        assert_eq!(cs.get("mode"), Some("ReadOnly"));
        assert_eq!(cs.get("Busy Timeout"), None);
    }

    #[test]
    fn test_parse_quoted_value() {
        let cs: ConnectionString = r#"Data Source="a;b ""c"".db";Mode=ReadWrite"#
            .parse()
            .unwrap();
        assert_eq!(cs.data_source(), Some("a;b \"c\".db"));
        assert_eq!(cs.get("MODE"), Some("ReadWrite"));
    }

    #[test]
    fn test_parse_errors() {
        assert!("Data Source".parse::<ConnectionString>().is_err());
        assert!("=x".parse::<ConnectionString>().is_err());
        assert!("Data Source=\"open".parse::<ConnectionString>().is_err());
        assert!("Data Source=\"a\" b".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_parse_empty_segments() {
        let cs: ConnectionString = ";;Data Source=x.db;;".parse().unwrap();
        assert_eq!(cs.entries().len(), 1);
        assert!("".parse::<ConnectionString>().unwrap().entries().is_empty());
    }

    #[test]
    fn test_display_round_trips() {
        let cs = ConnectionString::new()
            .set(DATA_SOURCE, "a;b \"c\".db")
            .set("Mode", "ReadOnly");
        let text = cs.to_string();
        assert_eq!(text, r#"Data Source="a;b ""c"".db";Mode=ReadOnly;"#);
        assert_eq!(text.parse::<ConnectionString>().unwrap(), cs);
    }

    #[test]
    fn test_set_replaces_case_insensitively() {
        let cs = ConnectionString::new()
            .set("mode", "ReadOnly")
            .set("Mode", "ReadWrite");
        assert_eq!(cs.entries().len(), 1);
        assert_eq!(cs.get("MODE"), Some("ReadWrite"));
    }

    #[test]
    fn test_registry_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry
            .open(&ConnectionParams::new("excel", "Data Source=a.xls"))
            .unwrap_err();
        assert!(matches!(err, DalError::UnsupportedFormat(p) if p == "excel"));
    }

    #[test]
    fn test_registry_extension_selection() {
        let mut registry = ProviderRegistry::new();
        registry
            .register("null", null_builder)
            .register_extension(".nul", "NULL");

        let params = registry.params_for_file("/tmp/Data.NUL").unwrap();
        assert_eq!(params.provider(), "null");
        assert_eq!(params.parsed().unwrap().data_source(), Some("/tmp/Data.NUL"));
        assert!(registry.open_file("/tmp/data.nul").is_ok());

        let err = registry.open_file("/tmp/data.xlsx").unwrap_err();
        assert!(matches!(err, DalError::UnsupportedFormat(e) if e == ".xlsx"));
        assert!(registry.open_file("/tmp/noext").is_err());
    }
}
