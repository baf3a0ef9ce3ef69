//! Column definitions consumed by create-table, add-column and
//! change-type operations.
//!
//! Provides a fluent builder so operations can be assembled in code as
//! well as deserialized from migration unit files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::SqlValue;

/// Abstract column types; each dialect's formatter maps them to its own
/// type clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    // Integer types
    /// Small integer (2 bytes).
    Smallint,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    Bigint,

    // Floating point
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Decimal with precision and scale.
    Decimal {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },
    /// Numeric (alias for Decimal).
    Numeric {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    // Binary types
    /// Binary large object.
    Blob,
    /// Binary with specified length.
    Binary(Option<u32>),
    /// Variable-length binary.
    Varbinary(Option<u32>),

    // Date/time types
    /// Date.
    Date,
    /// Time.
    Time,
    /// Timestamp.
    Timestamp,
    /// DateTime.
    Datetime,

    /// Boolean.
    Boolean,

    /// Database-specific type, rendered verbatim.
    Custom(String),
}

impl DataType {
    /// Returns the dialect-neutral SQL spelling of the type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE PRECISION"),
            Self::Decimal { precision, scale } => sized_numeric("DECIMAL", *precision, *scale),
            Self::Numeric { precision, scale } => sized_numeric("NUMERIC", *precision, *scale),
            Self::Char(len) => sized("CHAR", *len),
            Self::Varchar(len) => sized("VARCHAR", *len),
            Self::Text => String::from("TEXT"),
            Self::Blob => String::from("BLOB"),
            Self::Binary(len) => sized("BINARY", *len),
            Self::Varbinary(len) => sized("VARBINARY", *len),
            Self::Date => String::from("DATE"),
            Self::Time => String::from("TIME"),
            Self::Timestamp | Self::Datetime => String::from("TIMESTAMP"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Custom(name) => name.clone(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Renders `NAME(len)` or bare `NAME`.
pub(crate) fn sized(name: &str, len: Option<u32>) -> String {
    match len {
        Some(n) => format!("{name}({n})"),
        None => name.to_string(),
    }
}

/// Renders `NAME(p, s)`, `NAME(p)` or bare `NAME`.
pub(crate) fn sized_numeric(name: &str, precision: Option<u16>, scale: Option<u16>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("{name}({p}, {s})"),
        (Some(p), None) => format!("{name}({p})"),
        _ => name.to_string(),
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A column-level reference to another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// The referenced table name.
    pub table: String,
    /// The referenced column name.
    pub column: String,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default; spelled per dialect.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, inlined as an escaped literal.
    String(String),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`).
    Expression(String),
    /// Raw SQL fragment with positional `?` placeholders and their values.
    Raw {
        /// SQL text.
        sql: String,
        /// Values bound to the placeholders, in order.
        #[serde(default)]
        bindings: Vec<SqlValue>,
    },
}

impl DefaultValue {
    /// Creates a raw fragment with bindings.
    #[must_use]
    pub fn raw(sql: impl Into<String>, bindings: impl IntoIterator<Item = SqlValue>) -> Self {
        Self::Raw {
            sql: sql.into(),
            bindings: bindings.into_iter().collect(),
        }
    }
}

/// A complete column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether the column is nullable.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether this is a primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether this column is unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub autoincrement: bool,
    /// Foreign key reference, if any.
    #[serde(default)]
    pub references: Option<ForeignKeyRef>,
    /// Check constraint expression, if any.
    #[serde(default)]
    pub check: Option<String>,
    /// Collation for string columns.
    #[serde(default)]
    pub collation: Option<String>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    /// Creates a new nullable column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
            primary_key: false,
            unique: false,
            autoincrement: false,
            references: None,
            check: None,
            collation: None,
        }
    }
}

/// Fluent column definition builder.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    def: ColumnDefinition,
}

impl ColumnBuilder {
    /// Creates a new column builder with name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            def: ColumnDefinition::new(name, data_type),
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.def.nullable = false;
        self
    }

    /// Marks the column as nullable (default).
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.def.nullable = true;
        self
    }

    /// Marks the column as PRIMARY KEY.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.def.primary_key = true;
        self.def.nullable = false;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.def.unique = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn autoincrement(mut self) -> Self {
        self.def.autoincrement = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.def.default = Some(value);
        self
    }

    /// Sets a boolean default.
    #[must_use]
    pub fn default_bool(self, value: bool) -> Self {
        self.default(DefaultValue::Boolean(value))
    }

    /// Sets an integer default.
    #[must_use]
    pub fn default_int(self, value: i64) -> Self {
        self.default(DefaultValue::Integer(value))
    }

    /// Sets a string default.
    #[must_use]
    pub fn default_str(self, value: impl Into<String>) -> Self {
        self.default(DefaultValue::String(value.into()))
    }

    /// Sets a raw SQL expression default.
    #[must_use]
    pub fn default_expr(self, expr: impl Into<String>) -> Self {
        self.default(DefaultValue::Expression(expr.into()))
    }

    /// Adds a foreign key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.def.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        });
        self
    }

    /// Sets the ON DELETE action of the reference.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        if let Some(ref mut fk) = self.def.references {
            fk.on_delete = Some(action);
        }
        self
    }

    /// Sets the ON UPDATE action of the reference.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        if let Some(ref mut fk) = self.def.references {
            fk.on_update = Some(action);
        }
        self
    }

    /// Adds a CHECK constraint.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.def.check = Some(expr.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.def.collation = Some(collation.into());
        self
    }

    /// Builds the column definition.
    #[must_use]
    pub fn build(self) -> ColumnDefinition {
        self.def
    }
}

// =============================================================================
// Shorthands
// =============================================================================

/// SMALLINT column.
#[must_use]
pub fn smallint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Smallint)
}

/// INTEGER column.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Integer)
}

/// BIGINT column.
#[must_use]
pub fn bigint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Bigint)
}

/// DOUBLE column.
#[must_use]
pub fn double(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Double)
}

/// DECIMAL(precision, scale) column.
#[must_use]
pub fn decimal(name: impl Into<String>, precision: u16, scale: u16) -> ColumnBuilder {
    ColumnBuilder::new(
        name,
        DataType::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        },
    )
}

/// VARCHAR(len) column.
#[must_use]
pub fn varchar(name: impl Into<String>, len: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Varchar(Some(len)))
}

/// TEXT column.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Text)
}

/// BLOB column.
#[must_use]
pub fn blob(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Blob)
}

/// BOOLEAN column.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Boolean)
}

/// DATE column.
#[must_use]
pub fn date(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Date)
}

/// TIMESTAMP column.
#[must_use]
pub fn timestamp(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DataType::Timestamp)
}
