//! Dialect-specific DDL compilers.
//!
//! [`TableCompiler`] is the operation vocabulary. Every method has a default
//! that delegates to the shared emission in [`base`]; a dialect overrides
//! only the statements its grammar spells differently and inherits the rest
//! unchanged. [`Dialect`] selects the compiler for a target.

pub mod base;
mod generic;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;

pub use generic::GenericCompiler;
pub use mysql::MySqlCompiler;
pub use oracle::{ORA_NAME_ALREADY_USED, OracleCompiler, wrap_sql_with_catch};
pub use postgres::PostgresCompiler;
pub use sqlite::SqliteCompiler;

use crate::column::ColumnDefinition;
use crate::error::{CompileError, Result};
use crate::formatter::SqlFormatter;
use crate::naming::NameResolver;
use crate::operation::{AddForeignKeyOp, CreateTableOp};
use crate::session::CompilationSession;
use crate::statement::CompiledStatement;

/// Supported target dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Dialect-neutral SQL; the base compiler without overrides.
    Generic,
    /// PostgreSQL.
    Postgres,
    /// MySQL and MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Oracle Database.
    Oracle,
}

static GENERIC: GenericCompiler = GenericCompiler;
static POSTGRES: PostgresCompiler = PostgresCompiler;
static MYSQL: MySqlCompiler = MySqlCompiler;
static SQLITE: SqliteCompiler = SqliteCompiler;
static ORACLE: OracleCompiler = OracleCompiler;

static GENERIC_FORMATTER: SqlFormatter = SqlFormatter::new(Dialect::Generic);
static POSTGRES_FORMATTER: SqlFormatter = SqlFormatter::new(Dialect::Postgres);
static MYSQL_FORMATTER: SqlFormatter = SqlFormatter::new(Dialect::MySql);
static SQLITE_FORMATTER: SqlFormatter = SqlFormatter::new(Dialect::Sqlite);
static ORACLE_FORMATTER: SqlFormatter = SqlFormatter::new(Dialect::Oracle);

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Self; 5] = [
        Self::Generic,
        Self::Postgres,
        Self::MySql,
        Self::Sqlite,
        Self::Oracle,
    ];

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
        }
    }

    /// Returns the maximum identifier length in bytes.
    ///
    /// SQLite has no practical limit and reports `usize::MAX`.
    #[must_use]
    pub const fn max_identifier_length(self) -> usize {
        match self {
            Self::Generic => 128,
            Self::Postgres => 63,
            Self::MySql => 64,
            Self::Sqlite => usize::MAX,
            Self::Oracle => 30,
        }
    }

    /// Returns the name resolver bound to this dialect's identifier limit.
    #[must_use]
    pub const fn naming(self) -> NameResolver {
        NameResolver::new(self.max_identifier_length())
    }

    /// Returns the compiler for this dialect.
    #[must_use]
    pub fn compiler(self) -> &'static dyn TableCompiler {
        match self {
            Self::Generic => &GENERIC,
            Self::Postgres => &POSTGRES,
            Self::MySql => &MYSQL,
            Self::Sqlite => &SQLITE,
            Self::Oracle => &ORACLE,
        }
    }

    /// Returns the stock formatter for this dialect.
    #[must_use]
    pub fn formatter(self) -> &'static SqlFormatter {
        match self {
            Self::Generic => &GENERIC_FORMATTER,
            Self::Postgres => &POSTGRES_FORMATTER,
            Self::MySql => &MYSQL_FORMATTER,
            Self::Sqlite => &SQLITE_FORMATTER,
            Self::Oracle => &ORACLE_FORMATTER,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "oracle" | "oracledb" => Ok(Self::Oracle),
            _ => Err(CompileError::UnknownDialect(s.to_string())),
        }
    }
}

/// The schema operation vocabulary.
///
/// Each method appends zero or more statements to the session. Defaults
/// produce the base (dialect-neutral) SQL; implementations override the
/// methods whose grammar differs and may call back into [`base`] for the
/// parts they share.
pub trait TableCompiler: Send + Sync {
    /// Returns the dialect this compiler targets.
    fn dialect(&self) -> Dialect;

    /// Builds an [`CompileError::UnsupportedOperation`] for this dialect.
    fn unsupported(&self, operation: &'static str) -> CompileError {
        CompileError::UnsupportedOperation {
            dialect: self.dialect().name(),
            operation,
        }
    }

    /// Compiles `CREATE TABLE`, followed by the table comment if one was
    /// requested.
    fn create_table(&self, session: &mut CompilationSession<'_>, op: &CreateTableOp) -> Result<()> {
        base::create_table(self, session, op)
    }

    /// Compiles a table comment. `None` clears it.
    fn comment(&self, session: &mut CompilationSession<'_>, comment: Option<&str>) -> Result<()> {
        base::comment(session, comment)
    }

    /// Prefix put before each column of an add-columns statement.
    fn add_columns_prefix(&self) -> &'static str {
        "ADD COLUMN "
    }

    /// Compiles adding columns as a single statement.
    fn add_columns(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[ColumnDefinition],
    ) -> Result<()> {
        base::add_columns(self, session, columns)
    }

    /// Compiles dropping columns, one statement per column.
    fn drop_columns(&self, session: &mut CompilationSession<'_>, columns: &[String]) -> Result<()> {
        base::drop_columns(session, columns)
    }

    /// Compiles renaming a column.
    fn rename_column(
        &self,
        session: &mut CompilationSession<'_>,
        from: &str,
        to: &str,
    ) -> Result<()> {
        base::rename_column(session, from, to)
    }

    /// Compiles changing a column's type.
    fn change_column_type(
        &self,
        session: &mut CompilationSession<'_>,
        column: &ColumnDefinition,
    ) -> Result<()> {
        base::change_column_type(session, column)
    }

    /// Compiles adding a primary key.
    fn primary_key(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::primary_key(session, columns, name)
    }

    /// Compiles dropping the primary key.
    fn drop_primary_key(
        &self,
        session: &mut CompilationSession<'_>,
        name: Option<&str>,
    ) -> Result<()> {
        base::drop_primary_key(session, name)
    }

    /// Compiles creating an index.
    fn index(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::index(session, columns, name)
    }

    /// Compiles dropping an index.
    fn drop_index(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::drop_index(session, columns, name)
    }

    /// Compiles adding a unique constraint.
    fn unique(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::unique(session, columns, name)
    }

    /// Compiles dropping a unique constraint.
    fn drop_unique(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::drop_unique(session, columns, name)
    }

    /// Compiles adding a foreign key constraint.
    fn add_foreign_key(
        &self,
        session: &mut CompilationSession<'_>,
        op: &AddForeignKeyOp,
    ) -> Result<()> {
        base::add_foreign_key(session, op)
    }

    /// Compiles dropping a foreign key constraint.
    fn drop_foreign_key(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        base::drop_foreign_key(session, columns, name)
    }

    /// Rewrites a statement so its suppressed error code is handled in SQL,
    /// for executors that cannot honor `suppress_error_code`.
    ///
    /// The guarded statement carries no bindings and no suppressed code.
    /// Returns `None` when the dialect has no such form or the statement
    /// suppresses nothing.
    fn inline_error_guard(&self, statement: &CompiledStatement) -> Option<CompiledStatement> {
        let _ = statement;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str_aliases() {
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!("OracleDB".parse::<Dialect>().unwrap(), Dialect::Oracle);
        assert_eq!("ansi".parse::<Dialect>().unwrap(), Dialect::Generic);
        assert!(matches!(
            "db2".parse::<Dialect>(),
            Err(CompileError::UnknownDialect(ref d)) if d == "db2"
        ));
    }

    #[test]
    fn test_compiler_selection_matches_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.compiler().dialect(), dialect);
            assert_eq!(dialect.name().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_identifier_limits() {
        assert_eq!(Dialect::Oracle.max_identifier_length(), 30);
        assert_eq!(Dialect::Postgres.naming().max_length(), 63);
        assert_eq!(Dialect::Sqlite.max_identifier_length(), usize::MAX);
    }

    #[test]
    fn test_only_oracle_has_inline_guards() {
        let statement =
            CompiledStatement::new("CREATE TABLE \"t\" (\"a\" INTEGER)").suppressing(-955);
        for dialect in Dialect::ALL {
            let guarded = dialect.compiler().inline_error_guard(&statement);
            assert_eq!(guarded.is_some(), dialect == Dialect::Oracle, "{dialect}");
        }
    }
}
