//! Identifier quoting and column rendering.
//!
//! Compilers never quote identifiers or render column types themselves;
//! they go through a [`Formatter`]. [`SqlFormatter`] is the stock
//! implementation, keyed by dialect. Callers with their own type grammar
//! can pass a different formatter to
//! [`CompilationSession::with_formatter`](crate::session::CompilationSession::with_formatter).

use crate::column::{ColumnDefinition, DataType, DefaultValue, sized, sized_numeric};
use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::value::{SqlValue, count_placeholders};

/// Rendered column definitions plus the values their placeholders bind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDefs {
    /// One SQL fragment per column.
    pub sql: Vec<String>,
    /// Bindings across all fragments, in column order.
    pub bindings: Vec<SqlValue>,
}

impl ColumnDefs {
    /// Appends another set of definitions.
    pub fn extend(&mut self, other: Self) {
        self.sql.extend(other.sql);
        self.bindings.extend(other.bindings);
    }
}

/// Identifier and column rendering capability consumed by compilers.
pub trait Formatter: Send + Sync {
    /// Quotes an identifier.
    fn wrap(&self, identifier: &str) -> String;

    /// Quotes each name and joins them with `, `.
    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders the type clause of a column.
    fn type_clause(&self, data_type: &DataType) -> String;

    /// Renders one full column definition.
    fn column_def(&self, column: &ColumnDefinition) -> Result<ColumnDefs>;

    /// Renders every column definition, keeping bindings in column order.
    fn column_defs(&self, columns: &[ColumnDefinition]) -> Result<ColumnDefs> {
        let mut defs = ColumnDefs::default();
        for column in columns {
            defs.extend(self.column_def(column)?);
        }
        Ok(defs)
    }
}

/// Stock formatter for the built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlFormatter {
    dialect: Dialect,
}

impl SqlFormatter {
    /// Creates a formatter for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Returns the identifier quote character.
    #[must_use]
    pub const fn quote_char(&self) -> char {
        match self.dialect {
            Dialect::MySql => '`',
            _ => '"',
        }
    }

    fn render_default(&self, default: &DefaultValue, defs: &mut ColumnDefs) -> Result<String> {
        Ok(match default {
            DefaultValue::Null => String::from("NULL"),
            DefaultValue::Boolean(b) => match self.dialect {
                Dialect::Generic | Dialect::Postgres => {
                    String::from(if *b { "TRUE" } else { "FALSE" })
                }
                Dialect::MySql | Dialect::Sqlite | Dialect::Oracle => {
                    String::from(if *b { "1" } else { "0" })
                }
            },
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            DefaultValue::Expression(expr) => expr.clone(),
            DefaultValue::Raw { sql, bindings } => {
                let placeholders = count_placeholders(sql);
                if placeholders != bindings.len() {
                    return Err(CompileError::invalid(format!(
                        "raw default '{sql}' has {placeholders} placeholder(s) but {} binding(s)",
                        bindings.len()
                    )));
                }
                defs.bindings.extend(bindings.iter().cloned());
                sql.clone()
            }
        })
    }

    fn type_for_column(&self, column: &ColumnDefinition) -> String {
        // PostgreSQL expresses auto-increment through the SERIAL pseudo-types.
        if self.dialect == Dialect::Postgres && column.autoincrement && column.primary_key {
            match column.data_type {
                DataType::Integer | DataType::Smallint => return String::from("SERIAL"),
                DataType::Bigint => return String::from("BIGSERIAL"),
                _ => {}
            }
        }
        self.type_clause(&column.data_type)
    }
}

impl Formatter for SqlFormatter {
    fn wrap(&self, identifier: &str) -> String {
        let q = self.quote_char();
        identifier
            .split('.')
            .map(|segment| {
                let escaped = segment.replace(q, &format!("{q}{q}"));
                format!("{q}{escaped}{q}")
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn type_clause(&self, data_type: &DataType) -> String {
        match self.dialect {
            Dialect::Generic => data_type.to_sql(),
            Dialect::Postgres => postgres_type(data_type),
            Dialect::MySql => mysql_type(data_type),
            Dialect::Sqlite => sqlite_type(data_type),
            Dialect::Oracle => oracle_type(data_type),
        }
    }

    fn column_def(&self, column: &ColumnDefinition) -> Result<ColumnDefs> {
        let mut defs = ColumnDefs::default();
        let mut sql = format!("{} {}", self.wrap(&column.name), self.type_for_column(column));

        if let Some(ref collation) = column.collation {
            sql.push_str(" COLLATE ");
            match self.dialect {
                Dialect::Postgres => sql.push_str(&self.wrap(collation)),
                _ => sql.push_str(collation),
            }
        }

        if column.autoincrement {
            match self.dialect {
                Dialect::Generic | Dialect::Oracle => {
                    sql.push_str(" GENERATED BY DEFAULT AS IDENTITY");
                }
                Dialect::MySql => sql.push_str(" AUTO_INCREMENT"),
                Dialect::Postgres | Dialect::Sqlite => {}
            }
        }

        if let Some(ref default) = column.default {
            sql.push_str(" DEFAULT ");
            let rendered = self.render_default(default, &mut defs)?;
            sql.push_str(&rendered);
        }

        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
            if column.autoincrement && self.dialect == Dialect::Sqlite {
                sql.push_str(" AUTOINCREMENT");
            }
        } else {
            if !column.nullable {
                sql.push_str(" NOT NULL");
            }
            if column.unique {
                sql.push_str(" UNIQUE");
            }
        }

        if let Some(ref fk) = column.references {
            sql.push_str(" REFERENCES ");
            sql.push_str(&self.wrap(&fk.table));
            sql.push_str(" (");
            sql.push_str(&self.wrap(&fk.column));
            sql.push(')');
            if let Some(action) = fk.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = fk.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
        }

        if let Some(ref check) = column.check {
            sql.push_str(&format!(" CHECK ({check})"));
        }

        defs.sql.push(sql);
        Ok(defs)
    }
}

fn postgres_type(dt: &DataType) -> String {
    match dt {
        DataType::Blob | DataType::Binary(None) | DataType::Varbinary(None) => {
            String::from("BYTEA")
        }
        DataType::Binary(Some(n)) => format!("BIT({n})"),
        DataType::Varbinary(Some(n)) => format!("VARBIT({n})"),
        other => other.to_sql(),
    }
}

fn mysql_type(dt: &DataType) -> String {
    match dt {
        DataType::Integer => String::from("INT"),
        DataType::Real => String::from("FLOAT"),
        DataType::Double => String::from("DOUBLE"),
        DataType::Numeric { precision, scale } => sized_numeric("DECIMAL", *precision, *scale),
        DataType::Varchar(len) => sized("VARCHAR", Some(len.unwrap_or(255))),
        DataType::Binary(None) | DataType::Varbinary(None) => String::from("BLOB"),
        DataType::Datetime => String::from("DATETIME"),
        DataType::Boolean => String::from("TINYINT(1)"),
        other => other.to_sql(),
    }
}

fn sqlite_type(dt: &DataType) -> String {
    // SQLite has dynamic typing with type affinity
    match dt {
        DataType::Smallint | DataType::Integer | DataType::Bigint | DataType::Boolean => {
            String::from("INTEGER")
        }
        DataType::Real | DataType::Double => String::from("REAL"),
        DataType::Decimal { .. } | DataType::Numeric { .. } => String::from("NUMERIC"),
        DataType::Char(_) | DataType::Varchar(_) | DataType::Text => String::from("TEXT"),
        DataType::Blob | DataType::Binary(_) | DataType::Varbinary(_) => String::from("BLOB"),
        DataType::Date | DataType::Time | DataType::Timestamp | DataType::Datetime => {
            String::from("TEXT")
        }
        DataType::Custom(name) => name.clone(),
    }
}

fn oracle_type(dt: &DataType) -> String {
    match dt {
        DataType::Bigint => String::from("NUMBER(20, 0)"),
        DataType::Real => String::from("BINARY_FLOAT"),
        DataType::Double => String::from("BINARY_DOUBLE"),
        DataType::Numeric { precision, scale } => sized_numeric("NUMBER", *precision, *scale),
        // VARCHAR2 requires a length.
        DataType::Varchar(len) => sized("VARCHAR2", Some(len.unwrap_or(255))),
        DataType::Text => String::from("CLOB"),
        DataType::Binary(Some(n)) | DataType::Varbinary(Some(n)) => format!("RAW({n})"),
        DataType::Binary(None) | DataType::Varbinary(None) => String::from("BLOB"),
        DataType::Time | DataType::Timestamp | DataType::Datetime => String::from("TIMESTAMP"),
        DataType::Boolean => String::from("NUMBER(1, 0)"),
        other => other.to_sql(),
    }
}
