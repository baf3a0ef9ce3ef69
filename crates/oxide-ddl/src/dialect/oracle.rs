//! Oracle dialect.
//!
//! Oracle has no `CREATE TABLE IF NOT EXISTS`; an idempotent create is
//! compiled as a plain create annotated with the error code the executor
//! must swallow when the table is already there. Identifiers are limited
//! to 30 characters, so generated names hash early.

use super::{Dialect, TableCompiler, base};
use crate::column::{ColumnDefinition, ForeignKeyAction};
use crate::error::Result;
use crate::naming::NameKind;
use crate::operation::{AddForeignKeyOp, CreateTableOp};
use crate::session::CompilationSession;
use crate::statement::CompiledStatement;
use crate::value::inline_bindings;

/// ORA-00955: name is already used by an existing object.
pub const ORA_NAME_ALREADY_USED: i32 = -955;

/// Oracle compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleCompiler;

impl OracleCompiler {
    /// Creates a new Oracle compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Wraps `sql` in an anonymous PL/SQL block that ignores `error_code`
/// and re-raises anything else.
#[must_use]
pub fn wrap_sql_with_catch(sql: &str, error_code: i32) -> String {
    format!(
        "BEGIN EXECUTE IMMEDIATE {}; EXCEPTION WHEN OTHERS THEN \
         IF SQLCODE != {error_code} THEN RAISE; END IF; END;",
        base::quote_literal(sql)
    )
}

impl TableCompiler for OracleCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn create_table(&self, session: &mut CompilationSession<'_>, op: &CreateTableOp) -> Result<()> {
        let mut statement = base::create_table_statement(session, &op.columns, false)?;
        if op.if_not_exists {
            statement = statement.suppressing(ORA_NAME_ALREADY_USED);
        }
        session.push(statement)?;
        base::table_comment(self, session)
    }

    fn add_columns_prefix(&self) -> &'static str {
        "ADD "
    }

    fn drop_columns(&self, session: &mut CompilationSession<'_>, columns: &[String]) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} DROP ({})",
            session.table_name(),
            session.columnize(columns)
        );
        session.push_sql(sql)
    }

    fn change_column_type(
        &self,
        _session: &mut CompilationSession<'_>,
        _column: &ColumnDefinition,
    ) -> Result<()> {
        Err(self.unsupported("change_column_type"))
    }

    fn primary_key(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        if name.is_some() {
            return base::primary_key(session, columns, name);
        }
        let sql = format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({})",
            session.table_name(),
            session.columnize(columns)
        );
        session.push_sql(sql)
    }

    fn drop_primary_key(
        &self,
        session: &mut CompilationSession<'_>,
        _name: Option<&str>,
    ) -> Result<()> {
        let sql = format!("ALTER TABLE {} DROP PRIMARY KEY", session.table_name());
        session.push_sql(sql)
    }

    fn drop_index(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        // Index names are schema-scoped; no table qualifier.
        let name = session.resolve_name(name, NameKind::Index, columns)?;
        session.push_sql(format!("DROP INDEX {name}"))
    }

    fn add_foreign_key(
        &self,
        session: &mut CompilationSession<'_>,
        op: &AddForeignKeyOp,
    ) -> Result<()> {
        if op.on_update.is_some() {
            return Err(self.unsupported("foreign key ON UPDATE"));
        }
        match op.on_delete {
            None | Some(ForeignKeyAction::Cascade | ForeignKeyAction::SetNull) => {
                base::add_foreign_key(session, op)
            }
            Some(_) => {
                Err(self.unsupported("foreign key ON DELETE other than CASCADE or SET NULL"))
            }
        }
    }

    // The SQL becomes a string literal, so placeholders inside it would no
    // longer bind; values are inlined first.
    fn inline_error_guard(&self, statement: &CompiledStatement) -> Option<CompiledStatement> {
        let code = statement.suppress_error_code?;
        let sql = inline_bindings(&statement.sql, &statement.bindings);
        Some(CompiledStatement::new(wrap_sql_with_catch(&sql, code)))
    }
}
