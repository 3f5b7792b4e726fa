//! Runtime value to command parameter binding.
//!
//! Attachment is resolved per (dialect, value kind) pair: an override
//! registered for that pair wins, otherwise the built-in attachment runs.
//! Resolved handlers are memoized so steady-state binding is a single map
//! probe. Once a (dialect, kind) pair has resolved, later overrides for that
//! pair have no effect; register all overrides before first use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::command::{Command, Parameter};
use crate::error::SqlMapperError;
use crate::types::{Dialect, SqlValue};

/// A runtime value headed for a command parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Value(SqlValue),
    /// An enum constant; binds as its integral representation.
    Enum { type_name: String, repr: i64 },
    /// A pre-built parameter object, attached as-is (named if unnamed).
    Parameter(Parameter),
}

impl BindValue {
    #[must_use]
    pub fn value(value: SqlValue) -> Self {
        BindValue::Value(value)
    }

    #[must_use]
    pub fn enumeration(type_name: impl Into<String>, repr: i64) -> Self {
        BindValue::Enum {
            type_name: type_name.into(),
            repr,
        }
    }
}

/// Dispatch key for attachment resolution. NULL values and pre-built
/// parameters never reach dispatch; they attach directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindKind {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Json,
    Blob,
    Enum,
}

impl BindKind {
    fn of(value: &BindValue) -> Option<BindKind> {
        match value {
            BindValue::Value(SqlValue::Int(_)) => Some(BindKind::Int),
            BindValue::Value(SqlValue::Float(_)) => Some(BindKind::Float),
            BindValue::Value(SqlValue::Text(_)) => Some(BindKind::Text),
            BindValue::Value(SqlValue::Bool(_)) => Some(BindKind::Bool),
            BindValue::Value(SqlValue::Timestamp(_)) => Some(BindKind::Timestamp),
            BindValue::Value(SqlValue::Json(_)) => Some(BindKind::Json),
            BindValue::Value(SqlValue::Blob(_)) => Some(BindKind::Blob),
            BindValue::Enum { .. } => Some(BindKind::Enum),
            BindValue::Value(SqlValue::Null) | BindValue::Parameter(_) => None,
        }
    }
}

/// Attachment handler: builds parameter(s) on the command for one value.
pub type AttachFn =
    Arc<dyn Fn(&mut dyn Command, &str, &BindValue) -> Result<(), SqlMapperError> + Send + Sync>;

/// Binds runtime values to command parameters with per-dialect overrides.
pub struct ParameterBinder {
    overrides: RwLock<Arc<HashMap<(Dialect, BindKind), AttachFn>>>,
    resolved: RwLock<Arc<HashMap<(Dialect, BindKind), AttachFn>>>,
    resolve_count: AtomicUsize,
}

impl Default for ParameterBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterBinder {
    #[must_use]
    pub fn new() -> Self {
        ParameterBinder {
            overrides: RwLock::new(Arc::new(HashMap::new())),
            resolved: RwLock::new(Arc::new(HashMap::new())),
            resolve_count: AtomicUsize::new(0),
        }
    }

    /// Register the attachment for one (dialect, kind) pair. A pair that has
    /// already resolved keeps its memoized attachment; register overrides
    /// before the first bind for that pair.
    pub fn register_override(&self, dialect: Dialect, kind: BindKind, attach: AttachFn) {
        debug!(?dialect, ?kind, "register binder override");
        let mut guard = self
            .overrides
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.insert((dialect, kind), attach);
        *guard = Arc::new(next);
    }

    /// How many (dialect, kind) resolutions have been computed (not served
    /// from the memo table).
    #[must_use]
    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::Relaxed)
    }

    /// Attach `value` to `command` under `name`.
    pub fn bind(
        &self,
        command: &mut dyn Command,
        name: &str,
        value: &BindValue,
    ) -> Result<(), SqlMapperError> {
        trace!(name, dialect = ?command.dialect(), "bind parameter");
        match value {
            // NULL carries no kind to dispatch on.
            BindValue::Value(SqlValue::Null) => {
                let mut parameter = command.create_parameter();
                parameter.name = Some(name.to_string());
                parameter.value = SqlValue::Null;
                command.parameters_mut().push(parameter);
                Ok(())
            }
            BindValue::Parameter(prebuilt) => {
                let mut parameter = prebuilt.clone();
                if parameter.name.is_none() {
                    parameter.name = Some(name.to_string());
                }
                command.parameters_mut().push(parameter);
                Ok(())
            }
            _ => {
                let kind = BindKind::of(value).ok_or_else(|| {
                    SqlMapperError::ParameterError(format!(
                        "no binding kind for parameter '{name}'"
                    ))
                })?;
                let attach = self.attachment_for(command.dialect(), kind);
                attach(command, name, value)
            }
        }
    }

    fn attachment_for(&self, dialect: Dialect, kind: BindKind) -> AttachFn {
        let key = (dialect, kind);
        {
            let resolved = self
                .resolved
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone();
            if let Some(attach) = resolved.get(&key) {
                return attach.clone();
            }
        }
        let overrides = self
            .overrides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        let attach = overrides
            .get(&key)
            .cloned()
            .unwrap_or_else(|| default_attachment());
        self.resolve_count.fetch_add(1, Ordering::Relaxed);
        let mut guard = self
            .resolved
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.insert(key, attach.clone());
        *guard = Arc::new(next);
        attach
    }
}

fn default_attachment() -> AttachFn {
    Arc::new(|command, name, value| {
        let mut parameter = command.create_parameter();
        parameter.name = Some(name.to_string());
        parameter.value = match value {
            BindValue::Value(v) => v.clone(),
            BindValue::Enum { repr, .. } => SqlValue::Int(*repr),
            BindValue::Parameter(_) => {
                return Err(SqlMapperError::ParameterError(format!(
                    "pre-built parameter '{name}' reached kind dispatch"
                )));
            }
        };
        command.parameters_mut().push(parameter);
        Ok(())
    })
}
