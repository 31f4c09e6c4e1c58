//! Statement text with named parameter bindings.

use crate::value::{IntoValue, Value};

/// A named parameter binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Placeholder name, with or without its `@`, `:` or `$` sigil.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

impl Parameter {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, value: impl IntoValue) -> Self {
        Self {
            name: name.into(),
            value: value.into_value(),
        }
    }

    /// Returns the name without its sigil.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        self.name
            .strip_prefix(['@', ':', '$'])
            .unwrap_or(&self.name)
    }
}

/// A query or command plus its ordered parameter bindings.
///
/// Parameters are appended in the order supplied; backends match them to
/// placeholders by name, never by position.
///
/// # Example
///
/// ```rust
/// use oxide_dal_core::Statement;
///
/// let stmt = Statement::new("SELECT * FROM [People] WHERE Id = @Id").bind("Id", 1);
/// assert_eq!(stmt.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    parameters: Vec<Parameter>,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a named parameter.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl IntoValue) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    /// Appends an already built parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the parameters in binding order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_keep_supplied_order() {
        let stmt = Statement::new("INSERT INTO [t](b, a) VALUES (@b, @a)")
            .bind("b", 2)
            .bind("@a", "x");
        let names: Vec<&str> = stmt.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "@a"]);
        assert_eq!(stmt.parameters()[1].value, Value::Text("x".into()));
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(Parameter::new("@Id", 1).bare_name(), "Id");
        assert_eq!(Parameter::new(":Id", 1).bare_name(), "Id");
        assert_eq!(Parameter::new("$Id", 1).bare_name(), "Id");
        assert_eq!(Parameter::new("Id", 1).bare_name(), "Id");
    }
}
