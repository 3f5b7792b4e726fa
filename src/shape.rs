//! Runtime descriptors for projection targets.
//!
//! The source of truth for what a row can materialize into is a closed sum of
//! read kinds rather than runtime reflection: scalars, optionals, integer-backed
//! enums, containers, fixed-arity tuples, whole-cursor snapshots, and entities
//! described by [`EntityShape`].

use crate::types::ScalarKind;

/// Getter for a statically held entity shape. Indirection rather than a
/// direct reference so that recursive object models (including cycles, which
/// projection rejects at compile time) are constructible from `static`
/// shapes.
pub type EntityRef = fn() -> &'static EntityShape;

/// The shape of a projection target.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    /// Single-column primitive read.
    Scalar(ScalarKind),
    /// Nullable wrapper around an inner shape.
    Optional(Box<TypeShape>),
    /// Integer-backed enum, decoded from an integer column.
    Enum { name: &'static str },
    /// Unique-element container; duplicate elements collapse.
    Set(Box<TypeShape>),
    /// FIFO container.
    Queue(Box<TypeShape>),
    /// LIFO container.
    Stack(Box<TypeShape>),
    /// Ordered sequence.
    Seq(Box<TypeShape>),
    /// Fixed-size array; truncated or padded to `len` after the read loop.
    Array { elem: Box<TypeShape>, len: usize },
    /// Fixed-arity tuple (1-8), read from sequential columns starting at 0.
    Tuple(Vec<TypeShape>),
    /// Whole-cursor tabular snapshot.
    Table,
    /// Nested entity with its own column map.
    Entity(EntityRef),
}

impl TypeShape {
    #[must_use]
    pub fn optional(inner: TypeShape) -> TypeShape {
        TypeShape::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn seq(elem: TypeShape) -> TypeShape {
        TypeShape::Seq(Box::new(elem))
    }

    #[must_use]
    pub fn set(elem: TypeShape) -> TypeShape {
        TypeShape::Set(Box::new(elem))
    }

    #[must_use]
    pub fn queue(elem: TypeShape) -> TypeShape {
        TypeShape::Queue(Box::new(elem))
    }

    #[must_use]
    pub fn stack(elem: TypeShape) -> TypeShape {
        TypeShape::Stack(Box::new(elem))
    }

    #[must_use]
    pub fn array(elem: TypeShape, len: usize) -> TypeShape {
        TypeShape::Array {
            elem: Box::new(elem),
            len,
        }
    }

    #[must_use]
    pub fn entity(shape: EntityRef) -> TypeShape {
        TypeShape::Entity(shape)
    }

    /// Short display name used in cache keys, logs, and error messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            TypeShape::Scalar(kind) => format!("{kind:?}"),
            TypeShape::Optional(inner) => format!("Optional<{}>", inner.label()),
            TypeShape::Enum { name } => format!("Enum<{name}>"),
            TypeShape::Set(e) => format!("Set<{}>", e.label()),
            TypeShape::Queue(e) => format!("Queue<{}>", e.label()),
            TypeShape::Stack(e) => format!("Stack<{}>", e.label()),
            TypeShape::Seq(e) => format!("Seq<{}>", e.label()),
            TypeShape::Array { elem, len } => format!("Array<{}; {len}>", elem.label()),
            TypeShape::Tuple(elems) => format!("Tuple{}", elems.len()),
            TypeShape::Table => "Table".to_string(),
            TypeShape::Entity(shape) => shape().name.to_string(),
        }
    }
}

/// One mappable property of an entity.
///
/// Carries the declarative metadata read off the target type: an explicit
/// column name, the exclude-from-mapping flag, and the identity marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyShape {
    pub name: &'static str,
    /// Explicit column name; resolver falls back to the property name.
    pub column: Option<&'static str>,
    /// Excluded from mapping entirely.
    pub ignored: bool,
    /// Marked as the identity/key property.
    pub identity: bool,
    pub shape: TypeShape,
}

/// Runtime descriptor of an entity type: its name, optional explicit table
/// name, ordered properties, and whether a constructor exists. Shapes are
/// built once and held in `static` `LazyLock`s by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityShape {
    pub name: &'static str,
    pub table: Option<&'static str>,
    pub properties: Vec<PropertyShape>,
    /// Absent constructor means no projector is ever compiled for this shape;
    /// reads yield a zero-value instead of failing.
    pub has_constructor: bool,
}

impl EntityShape {
    #[must_use]
    pub fn builder(name: &'static str) -> EntityShapeBuilder {
        EntityShapeBuilder {
            shape: EntityShape {
                name,
                table: None,
                properties: Vec::new(),
                has_constructor: true,
            },
        }
    }

    /// Properties that take part in mapping, in declaration order.
    pub fn mapped_properties(&self) -> impl Iterator<Item = &PropertyShape> {
        self.properties.iter().filter(|p| !p.ignored)
    }
}

/// Fluent builder for [`EntityShape`]. Flag methods apply to the most
/// recently added property.
pub struct EntityShapeBuilder {
    shape: EntityShape,
}

impl EntityShapeBuilder {
    #[must_use]
    pub fn table(mut self, table: &'static str) -> Self {
        self.shape.table = Some(table);
        self
    }

    #[must_use]
    pub fn property(mut self, name: &'static str, shape: TypeShape) -> Self {
        self.shape.properties.push(PropertyShape {
            name,
            column: None,
            ignored: false,
            identity: false,
            shape,
        });
        self
    }

    #[must_use]
    pub fn column(mut self, column: &'static str) -> Self {
        if let Some(last) = self.shape.properties.last_mut() {
            last.column = Some(column);
        }
        self
    }

    #[must_use]
    pub fn identity(mut self) -> Self {
        if let Some(last) = self.shape.properties.last_mut() {
            last.identity = true;
        }
        self
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        if let Some(last) = self.shape.properties.last_mut() {
            last.ignored = true;
        }
        self
    }

    #[must_use]
    pub fn no_constructor(mut self) -> Self {
        self.shape.has_constructor = false;
        self
    }

    #[must_use]
    pub fn finish(self) -> EntityShape {
        self.shape
    }
}
