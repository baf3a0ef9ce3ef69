//! Dialect-pluggable DDL compilation for schema migrations.
//!
//! `oxide-ddl` turns abstract, database-agnostic schema operations into the
//! ordered SQL statements one target database needs:
//!
//! - **Operations** - `CreateTable`, `AddColumns`, `AddIndex`, ... grouped per
//!   table in a [`MigrationUnit`]
//! - **Dialect compilers** - a [`TableCompiler`] per target; each overrides
//!   only the statements its grammar spells differently
//! - **Naming** - deterministic, length-bounded names for unnamed indexes
//!   and constraints
//! - **Statements** - SQL text plus positional bindings, and the error code
//!   an executor must tolerate when the dialect emulates `IF NOT EXISTS`
//!
//! # Example
//!
//! ```rust
//! use oxide_ddl::prelude::*;
//!
//! let unit = MigrationUnit::new("users")
//!     .operation(Operation::create_table_if_not_exists(vec![
//!         bigint("id").primary_key().build(),
//!         varchar("email", 255).not_null().build(),
//!     ]))
//!     .operation(Operation::add_index(["email"]));
//!
//! let statements = oxide_ddl::compile(Dialect::Oracle, &unit).unwrap();
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[0].suppress_error_code, Some(-955));
//! assert_eq!(
//!     statements[1].sql,
//!     r#"CREATE INDEX "users_email_index" ON "users" ("email")"#
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Compile migration units for PostgreSQL
//! oxide-ddl compile --dialect postgres migrations/0001_users.json
//!
//! # Emit JSON with bindings and suppressed error codes
//! oxide-ddl compile --dialect oracle --format json units.json
//!
//! # List dialects and their identifier limits
//! oxide-ddl dialects
//! ```

pub mod column;
pub mod dialect;
pub mod error;
pub mod formatter;
pub mod input;
pub mod naming;
pub mod operation;
pub mod session;
pub mod statement;
pub mod value;

use tracing::debug;

pub use dialect::{Dialect, TableCompiler};
pub use error::{CompileError, Result};
pub use operation::{MigrationUnit, Operation};
pub use session::CompilationSession;
pub use statement::CompiledStatement;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{
        ColumnBuilder, ColumnDefinition, DataType, DefaultValue, ForeignKeyAction,
        ForeignKeyRef, bigint, blob, boolean, date, decimal, double, integer, smallint, text,
        timestamp, varchar,
    };
    pub use crate::dialect::{Dialect, ORA_NAME_ALREADY_USED, TableCompiler};
    pub use crate::error::{CompileError, Result};
    pub use crate::formatter::{Formatter, SqlFormatter};
    pub use crate::naming::{NameKind, NameResolver};
    pub use crate::operation::{AddForeignKeyOp, ConstraintOp, MigrationUnit, Operation};
    pub use crate::session::CompilationSession;
    pub use crate::statement::{CompiledStatement, StatementQueue};
    pub use crate::value::SqlValue;
}

/// Compiles one migration unit for `dialect`.
///
/// Every operation is validated before any is compiled; statements come
/// back in operation order.
pub fn compile(dialect: Dialect, unit: &MigrationUnit) -> Result<Vec<CompiledStatement>> {
    unit.validate()?;

    let mut session = CompilationSession::new(dialect, unit.table.as_str())?;
    if let Some(ref comment) = unit.comment {
        session = session.with_comment(comment.as_str());
    }
    session.compile_all(&unit.operations)?;

    let statements = session.finish();
    debug!(
        dialect = dialect.name(),
        table = %unit.table,
        statements = statements.len(),
        "Compiled migration unit"
    );
    Ok(statements)
}
