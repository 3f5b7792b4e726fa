//! Dialect translation registry: per-dialect tables mapping member accesses
//! and method calls in the expression IR to ordered SQL-fragment lists.
//!
//! Lookup order: the dialect's own table (exact key, then the open generic
//! definition for generic calls), then the ANSI defaults table the same way.
//! An unknown node translates to [`Translated::NotHandled`], never an error;
//! the caller decides between a literal-evaluation fallback and a translation
//! error. Registration is copy-on-write under a lock so concurrent readers
//! never observe a partial table.

mod defaults;
mod expr;
mod fragment;
mod raw;

pub use expr::{Expr, MemberKey, MethodKey};
pub use fragment::{Fragment, render, sql_literal};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::error::SqlMapperError;
use crate::types::Dialect;

/// Whether the dialect's string functions address offsets 1-based. Source
/// offsets in the IR are always 0-based; translation shifts them exactly when
/// the profile says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetBase {
    Zero,
    One,
}

/// Per-dialect translation traits beyond the fragment tables.
#[derive(Debug, Clone)]
pub struct DialectProfile {
    pub string_offset_base: OffsetBase,
}

impl Default for DialectProfile {
    fn default() -> Self {
        DialectProfile {
            string_offset_base: OffsetBase::One,
        }
    }
}

impl DialectProfile {
    #[must_use]
    pub fn one_based(&self) -> bool {
        self.string_offset_base == OffsetBase::One
    }
}

/// Handler: IR node + dialect profile to fragments. `None` means the handler
/// declines this particular node (treated as not handled).
pub type TranslateFn =
    Arc<dyn Fn(&Expr, &DialectProfile) -> Option<Vec<Fragment>> + Send + Sync>;

/// Result of translating one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Translated {
    Fragments(Vec<Fragment>),
    NotHandled,
}

impl Translated {
    #[must_use]
    pub fn fragments(self) -> Option<Vec<Fragment>> {
        match self {
            Translated::Fragments(fragments) => Some(fragments),
            Translated::NotHandled => None,
        }
    }

    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Translated::Fragments(_))
    }
}

struct DialectSlot {
    members: RwLock<Arc<HashMap<MemberKey, TranslateFn>>>,
    methods: RwLock<Arc<HashMap<MethodKey, TranslateFn>>>,
    profile: RwLock<Arc<DialectProfile>>,
}

impl DialectSlot {
    fn new() -> Self {
        DialectSlot {
            members: RwLock::new(Arc::new(HashMap::new())),
            methods: RwLock::new(Arc::new(HashMap::new())),
            profile: RwLock::new(Arc::new(DialectProfile::default())),
        }
    }
}

/// Registry of per-dialect fragment tables plus the ANSI defaults table.
pub struct DialectRegistry {
    slots: HashMap<Dialect, DialectSlot>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DialectRegistry {
    /// Empty tables for every dialect.
    #[must_use]
    pub fn empty() -> Self {
        DialectRegistry {
            slots: Dialect::ALL
                .iter()
                .map(|d| (*d, DialectSlot::new()))
                .collect(),
        }
    }

    /// Tables preloaded with the built-in string/date/cast handlers per
    /// dialect and the dialect-independent shape helpers under `Ansi`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::empty();
        defaults::install(&registry);
        registry
    }

    fn slot(&self, dialect: Dialect) -> &DialectSlot {
        // Every dialect is pre-seeded in both constructors.
        self.slots.get(&dialect).unwrap_or_else(|| &self.slots[&Dialect::Ansi])
    }

    /// Register (or override) a member handler. Append/override only, no
    /// removal; the newest registration wins for its exact key.
    pub fn register_member(
        &self,
        dialect: Dialect,
        owner: &str,
        name: &str,
        handler: TranslateFn,
    ) -> Result<(), SqlMapperError> {
        if owner.is_empty() || name.is_empty() {
            return Err(SqlMapperError::RegistrationError(
                "member registration requires a non-empty owner and name".into(),
            ));
        }
        debug!(?dialect, owner, name, "register member translation");
        let slot = self.slot(dialect);
        let mut guard = slot
            .members
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.insert(MemberKey::new(owner, name), handler);
        *guard = Arc::new(next);
        Ok(())
    }

    /// Register (or override) a call handler; an empty `type_args` registers
    /// the open generic definition.
    pub fn register_method(
        &self,
        dialect: Dialect,
        owner: &str,
        name: &str,
        type_args: &[&str],
        handler: TranslateFn,
    ) -> Result<(), SqlMapperError> {
        if owner.is_empty() || name.is_empty() {
            return Err(SqlMapperError::RegistrationError(
                "method registration requires a non-empty owner and name".into(),
            ));
        }
        debug!(?dialect, owner, name, ?type_args, "register method translation");
        let slot = self.slot(dialect);
        let mut guard = slot
            .methods
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.insert(MethodKey::new(owner, name, type_args), handler);
        *guard = Arc::new(next);
        Ok(())
    }

    /// Replace a dialect's profile (single slot, last wins).
    pub fn set_profile(&self, dialect: Dialect, profile: DialectProfile) {
        debug!(?dialect, ?profile, "set dialect profile");
        let slot = self.slot(dialect);
        let mut guard = slot
            .profile
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Arc::new(profile);
    }

    #[must_use]
    pub fn profile(&self, dialect: Dialect) -> Arc<DialectProfile> {
        self.slot(dialect)
            .profile
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn member_handler(&self, dialect: Dialect, key: &MemberKey) -> Option<TranslateFn> {
        for d in [dialect, Dialect::Ansi] {
            let table = self
                .slot(d)
                .members
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone();
            if let Some(handler) = table.get(key) {
                return Some(handler.clone());
            }
            if d == Dialect::Ansi {
                break;
            }
        }
        None
    }

    fn method_handler(&self, dialect: Dialect, key: &MethodKey) -> Option<TranslateFn> {
        let open = (!key.type_args.is_empty()).then(|| key.open());
        for d in [dialect, Dialect::Ansi] {
            let table = self
                .slot(d)
                .methods
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone();
            if let Some(handler) = table.get(key) {
                return Some(handler.clone());
            }
            // Generic calls additionally probe their open generic definition.
            if let Some(open_key) = &open
                && let Some(handler) = table.get(open_key)
            {
                return Some(handler.clone());
            }
            if d == Dialect::Ansi {
                break;
            }
        }
        None
    }

    /// Translate one IR node for a dialect.
    #[must_use]
    pub fn translate(&self, expr: &Expr, dialect: Dialect) -> Translated {
        let profile = self.profile(dialect);
        match expr {
            Expr::Value(value) => {
                Translated::Fragments(vec![Fragment::Sql(sql_literal(value))])
            }
            Expr::Values(values) => {
                let list = values
                    .iter()
                    .map(sql_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                Translated::Fragments(vec![Fragment::Sql(list)])
            }
            Expr::Column { table, name } => {
                let text = match table {
                    Some(table) => format!("{table}.{name}"),
                    None => name.clone(),
                };
                Translated::Fragments(vec![Fragment::Sql(text)])
            }
            Expr::Raw { template, args } => Translated::Fragments(raw::splice(template, args)),
            Expr::Member { owner, name, .. } => {
                let key = MemberKey::new(owner.clone(), name.clone());
                match self.member_handler(dialect, &key) {
                    Some(handler) => match handler(expr, &profile) {
                        Some(fragments) => Translated::Fragments(fragments),
                        None => Translated::NotHandled,
                    },
                    None => {
                        trace!(?dialect, owner, name, "member not handled");
                        Translated::NotHandled
                    }
                }
            }
            Expr::Call {
                owner,
                name,
                type_args,
                ..
            } => {
                let key = MethodKey {
                    owner: owner.clone(),
                    name: name.clone(),
                    type_args: type_args.clone(),
                };
                match self.method_handler(dialect, &key) {
                    Some(handler) => match handler(expr, &profile) {
                        Some(fragments) => Translated::Fragments(fragments),
                        None => Translated::NotHandled,
                    },
                    None => {
                        trace!(?dialect, owner, name, "call not handled");
                        Translated::NotHandled
                    }
                }
            }
        }
    }
}
