//! Stable identifiers for every database object pgalign tracks.
//!
//! The engine never compares two objects by anything except their
//! [`ObjectId`]; everything else (the statement text, the dependency
//! graph, the fingerprint) is keyed off of it. `ObjectId` is a typed
//! enum rather than a bare string for the usual Rust reasons (you
//! cannot construct a `Table` id and accidentally compare it to a
//! `View` id with the same schema-qualified name), but every variant
//! renders to the canonical `kind:qualified_name` form the spec calls
//! the "stable_id" via [`ObjectId::stable_id`] / `Display`.

use std::fmt;

/// One of the ~25 object kinds the catalog tracks. Used for the
/// sorter's kind-priority tie-break and for the filter DSL's `type`
/// property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Extension,
    Schema,
    Collation,
    Role,
    Language,
    ForeignDataWrapper,
    Server,
    UserMapping,
    Enum,
    CompositeType,
    Range,
    Domain,
    Sequence,
    Table,
    ForeignTable,
    View,
    MaterializedView,
    Function,
    Procedure,
    Aggregate,
    Index,
    Constraint,
    Trigger,
    Rule,
    RlsPolicy,
    EventTrigger,
    Publication,
    Subscription,
    Column,
    Comment,
    Grant,
}

impl ObjectKind {
    /// Total order used by the sorter's tie-break and by the "extensions
    /// and schemas before their contents on create" rule. Lower sorts
    /// first on create; the sorter reverses it for drops.
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Extension => "extension",
            ObjectKind::Schema => "schema",
            ObjectKind::Collation => "collation",
            ObjectKind::Role => "role",
            ObjectKind::Language => "language",
            ObjectKind::ForeignDataWrapper => "foreign_data_wrapper",
            ObjectKind::Server => "server",
            ObjectKind::UserMapping => "user_mapping",
            ObjectKind::Enum => "enum",
            ObjectKind::CompositeType => "composite_type",
            ObjectKind::Range => "range",
            ObjectKind::Domain => "domain",
            ObjectKind::Sequence => "sequence",
            ObjectKind::Table => "table",
            ObjectKind::ForeignTable => "foreign_table",
            ObjectKind::View => "view",
            ObjectKind::MaterializedView => "materialized_view",
            ObjectKind::Function => "function",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Aggregate => "aggregate",
            ObjectKind::Index => "index",
            ObjectKind::Constraint => "constraint",
            ObjectKind::Trigger => "trigger",
            ObjectKind::Rule => "rule",
            ObjectKind::RlsPolicy => "rls_policy",
            ObjectKind::EventTrigger => "event_trigger",
            ObjectKind::Publication => "publication",
            ObjectKind::Subscription => "subscription",
            ObjectKind::Column => "column",
            ObjectKind::Comment => "comment",
            ObjectKind::Grant => "grant",
        }
    }
}

/// A globally unique identifier for any database object pgalign tracks.
///
/// Construct with the variant, compare by `==`/`Ord`, and render the
/// spec's `kind:qualified_name` form with [`ObjectId::stable_id`] or
/// `Display`/`to_string()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectId {
    Schema {
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        name: String,
    },
    View {
        schema: String,
        name: String,
    },
    MaterializedView {
        schema: String,
        name: String,
    },
    ForeignTable {
        schema: String,
        name: String,
    },
    Index {
        schema: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    Rule {
        schema: String,
        table: String,
        name: String,
    },
    RlsPolicy {
        schema: String,
        table: String,
        name: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Procedure {
        schema: String,
        name: String,
        arguments: String,
    },
    Aggregate {
        schema: String,
        name: String,
        arguments: String,
    },
    Enum {
        schema: String,
        name: String,
    },
    CompositeType {
        schema: String,
        name: String,
    },
    Range {
        schema: String,
        name: String,
    },
    Domain {
        schema: String,
        name: String,
    },
    Collation {
        schema: String,
        name: String,
    },
    Extension {
        name: String,
    },
    Role {
        name: String,
    },
    EventTrigger {
        name: String,
    },
    Publication {
        name: String,
    },
    Subscription {
        name: String,
    },
    ForeignDataWrapper {
        name: String,
    },
    Server {
        name: String,
    },
    UserMapping {
        server: String,
        user: String,
    },
    Language {
        name: String,
    },
    /// `grantee@object_stable_id:privilege` — grants aren't their own
    /// catalog entity kind (see §3.1 of SPEC_FULL.md), but they need a
    /// stable id so the sorter can place `GRANT`/`REVOKE` changes.
    Grant {
        grantee: String,
        object: Box<ObjectId>,
        privilege: String,
    },
    /// Wraps the object being commented on; `COMMENT ON ...` changes are
    /// ordered after the object's create and before its drop.
    Comment {
        object: Box<ObjectId>,
    },
}

impl ObjectId {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectId::Schema { .. } => ObjectKind::Schema,
            ObjectId::Table { .. } => ObjectKind::Table,
            ObjectId::Column { .. } => ObjectKind::Column,
            ObjectId::View { .. } => ObjectKind::View,
            ObjectId::MaterializedView { .. } => ObjectKind::MaterializedView,
            ObjectId::ForeignTable { .. } => ObjectKind::ForeignTable,
            ObjectId::Index { .. } => ObjectKind::Index,
            ObjectId::Constraint { .. } => ObjectKind::Constraint,
            ObjectId::Trigger { .. } => ObjectKind::Trigger,
            ObjectId::Rule { .. } => ObjectKind::Rule,
            ObjectId::RlsPolicy { .. } => ObjectKind::RlsPolicy,
            ObjectId::Sequence { .. } => ObjectKind::Sequence,
            ObjectId::Function { .. } => ObjectKind::Function,
            ObjectId::Procedure { .. } => ObjectKind::Procedure,
            ObjectId::Aggregate { .. } => ObjectKind::Aggregate,
            ObjectId::Enum { .. } => ObjectKind::Enum,
            ObjectId::CompositeType { .. } => ObjectKind::CompositeType,
            ObjectId::Range { .. } => ObjectKind::Range,
            ObjectId::Domain { .. } => ObjectKind::Domain,
            ObjectId::Collation { .. } => ObjectKind::Collation,
            ObjectId::Extension { .. } => ObjectKind::Extension,
            ObjectId::Role { .. } => ObjectKind::Role,
            ObjectId::EventTrigger { .. } => ObjectKind::EventTrigger,
            ObjectId::Publication { .. } => ObjectKind::Publication,
            ObjectId::Subscription { .. } => ObjectKind::Subscription,
            ObjectId::ForeignDataWrapper { .. } => ObjectKind::ForeignDataWrapper,
            ObjectId::Server { .. } => ObjectKind::Server,
            ObjectId::UserMapping { .. } => ObjectKind::UserMapping,
            ObjectId::Language { .. } => ObjectKind::Language,
            ObjectId::Grant { .. } => ObjectKind::Grant,
            ObjectId::Comment { object } => object.kind(),
        }
    }

    /// The schema this object lives in, if it's schema-scoped.
    pub fn schema(&self) -> Option<&str> {
        match self {
            ObjectId::Schema { name } => Some(name.as_str()),
            ObjectId::Table { schema, .. }
            | ObjectId::Column { schema, .. }
            | ObjectId::View { schema, .. }
            | ObjectId::MaterializedView { schema, .. }
            | ObjectId::ForeignTable { schema, .. }
            | ObjectId::Index { schema, .. }
            | ObjectId::Constraint { schema, .. }
            | ObjectId::Trigger { schema, .. }
            | ObjectId::Rule { schema, .. }
            | ObjectId::RlsPolicy { schema, .. }
            | ObjectId::Sequence { schema, .. }
            | ObjectId::Function { schema, .. }
            | ObjectId::Procedure { schema, .. }
            | ObjectId::Aggregate { schema, .. }
            | ObjectId::Enum { schema, .. }
            | ObjectId::CompositeType { schema, .. }
            | ObjectId::Range { schema, .. }
            | ObjectId::Domain { schema, .. }
            | ObjectId::Collation { schema, .. } => Some(schema.as_str()),
            ObjectId::Comment { object } => object.schema(),
            _ => None,
        }
    }

    /// The canonical `kind:qualified_name` stable id string (§3).
    pub fn stable_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().as_str();
        match self {
            ObjectId::Schema { name }
            | ObjectId::Extension { name }
            | ObjectId::Role { name }
            | ObjectId::EventTrigger { name }
            | ObjectId::Publication { name }
            | ObjectId::Subscription { name }
            | ObjectId::ForeignDataWrapper { name }
            | ObjectId::Server { name }
            | ObjectId::Language { name } => write!(f, "{kind}:{name}"),
            ObjectId::Table { schema, name }
            | ObjectId::View { schema, name }
            | ObjectId::MaterializedView { schema, name }
            | ObjectId::ForeignTable { schema, name }
            | ObjectId::Index { schema, name }
            | ObjectId::Sequence { schema, name }
            | ObjectId::Enum { schema, name }
            | ObjectId::CompositeType { schema, name }
            | ObjectId::Range { schema, name }
            | ObjectId::Domain { schema, name }
            | ObjectId::Collation { schema, name } => write!(f, "{kind}:{schema}.{name}"),
            ObjectId::Column {
                schema,
                table,
                name,
            }
            | ObjectId::Constraint {
                schema,
                table,
                name,
            }
            | ObjectId::Trigger {
                schema,
                table,
                name,
            }
            | ObjectId::Rule {
                schema,
                table,
                name,
            }
            | ObjectId::RlsPolicy {
                schema,
                table,
                name,
            } => write!(f, "{kind}:{schema}.{table}.{name}"),
            ObjectId::Function {
                schema,
                name,
                arguments,
            }
            | ObjectId::Procedure {
                schema,
                name,
                arguments,
            }
            | ObjectId::Aggregate {
                schema,
                name,
                arguments,
            } => write!(f, "{kind}:{schema}.{name}({arguments})"),
            ObjectId::UserMapping { server, user } => write!(f, "{kind}:{server}.{user}"),
            ObjectId::Grant {
                grantee,
                object,
                privilege,
            } => write!(f, "{kind}:{grantee}@{}:{privilege}", object.stable_id()),
            ObjectId::Comment { object } => write!(f, "comment:{}", object.stable_id()),
        }
    }
}

/// PostgreSQL's `pg_depend.deptype` values that survive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Deptype {
    /// `n` — normal; neither object can be dropped without dropping the
    /// other, but there's no special ownership relationship.
    Normal,
    /// `a` — auto; the dependent is dropped automatically if the
    /// referenced object is dropped (e.g. a serial sequence owned by its
    /// column).
    Auto,
    /// `i` — internal; the dependent is an implementation detail of the
    /// referenced object (e.g. the index backing a unique constraint).
    Internal,
}

impl Deptype {
    pub fn from_pg_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Deptype::Normal),
            'a' => Some(Deptype::Auto),
            'i' => Some(Deptype::Internal),
            _ => None,
        }
    }

    pub fn as_pg_char(self) -> char {
        match self {
            Deptype::Normal => 'n',
            Deptype::Auto => 'a',
            Deptype::Internal => 'i',
        }
    }
}

/// One edge of the catalog's dependency graph: `dependent` requires
/// `referenced` to exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DependEdge {
    pub dependent: ObjectId,
    pub referenced: ObjectId,
    pub deptype: Deptype,
}

/// Implemented by every catalog entity so the catalog loader can build
/// the forward/reverse dependency maps generically.
pub trait DependsOn {
    fn id(&self) -> ObjectId;
    fn depends_on(&self) -> &[ObjectId];
}
