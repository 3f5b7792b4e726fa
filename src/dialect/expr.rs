//! Predicate/projection expression IR handed to the translation registry.

use crate::types::SqlValue;

/// One IR node. Translation maps member accesses and calls to SQL fragment
/// lists; columns, closed-form values, and raw templates translate directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference, optionally table-qualified.
    Column {
        table: Option<String>,
        name: String,
    },
    /// A closed-form literal.
    Value(SqlValue),
    /// A closed-form list of literals (IN / NOT IN operands).
    Values(Vec<SqlValue>),
    /// Member access on a target expression, e.g. `String.Length`.
    Member {
        owner: String,
        name: String,
        target: Box<Expr>,
    },
    /// Method call; `type_args` carries generic arguments, and lookup probes
    /// the open generic definition when the exact key misses.
    Call {
        owner: String,
        name: String,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
        type_args: Vec<String>,
    },
    /// Raw SQL passthrough with a composite-format template (`{0}`, `{1}`...).
    Raw {
        template: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Expr {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn value(value: SqlValue) -> Expr {
        Expr::Value(value)
    }

    #[must_use]
    pub fn member(owner: impl Into<String>, name: impl Into<String>, target: Expr) -> Expr {
        Expr::Member {
            owner: owner.into(),
            name: name.into(),
            target: Box::new(target),
        }
    }

    /// Instance-style call with a target expression.
    #[must_use]
    pub fn call(
        owner: impl Into<String>,
        name: impl Into<String>,
        target: Expr,
        args: Vec<Expr>,
    ) -> Expr {
        Expr::Call {
            owner: owner.into(),
            name: name.into(),
            target: Some(Box::new(target)),
            args,
            type_args: Vec::new(),
        }
    }

    /// Static-style call without a target.
    #[must_use]
    pub fn call_static(owner: impl Into<String>, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            owner: owner.into(),
            name: name.into(),
            target: None,
            args,
            type_args: Vec::new(),
        }
    }

    /// Generic call; `type_args` name the concrete type arguments.
    #[must_use]
    pub fn call_generic(
        owner: impl Into<String>,
        name: impl Into<String>,
        target: Expr,
        args: Vec<Expr>,
        type_args: Vec<String>,
    ) -> Expr {
        Expr::Call {
            owner: owner.into(),
            name: name.into(),
            target: Some(Box::new(target)),
            args,
            type_args,
        }
    }

    #[must_use]
    pub fn raw(template: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Raw {
            template: template.into(),
            args,
        }
    }
}

/// Lookup key for member-access handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub owner: String,
    pub name: String,
}

impl MemberKey {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        MemberKey {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Lookup key for call handlers; an empty `type_args` list is the open
/// generic definition (and the key for non-generic calls).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub owner: String,
    pub name: String,
    pub type_args: Vec<String>,
}

impl MethodKey {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>, type_args: &[&str]) -> Self {
        MethodKey {
            owner: owner.into(),
            name: name.into(),
            type_args: type_args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// The open generic definition for this key.
    #[must_use]
    pub fn open(&self) -> MethodKey {
        MethodKey {
            owner: self.owner.clone(),
            name: self.name.clone(),
            type_args: Vec::new(),
        }
    }
}
