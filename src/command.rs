//! The consumed command contract: a mutable named-parameter collection plus a
//! factory for empty parameter objects and a dialect discriminator.

use crate::types::{Dialect, SqlValue};

/// One outgoing command parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub name: Option<String>,
    pub value: SqlValue,
    /// Minimum text capacity hint for drivers that size text parameters.
    pub min_text_len: Option<usize>,
}

impl Parameter {
    #[must_use]
    pub fn named(name: impl Into<String>, value: SqlValue) -> Self {
        Parameter {
            name: Some(name.into()),
            value,
            min_text_len: None,
        }
    }
}

/// Ordered named-parameter collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList(Vec<Parameter>);

impl ParameterList {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, parameter: Parameter) {
        self.0.push(parameter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|p| p.name.as_deref() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }
}

/// Outgoing command surface the binder attaches parameters to.
pub trait Command {
    fn dialect(&self) -> Dialect;

    /// Factory for an empty parameter object.
    fn create_parameter(&self) -> Parameter {
        Parameter::default()
    }

    fn parameters_mut(&mut self) -> &mut ParameterList;
}
