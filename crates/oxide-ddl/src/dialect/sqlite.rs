//! SQLite dialect.
//!
//! SQLite's `ALTER TABLE` only adds, drops and renames columns. Keys and
//! constraints are fixed at create time, so the operations that would
//! change them are rejected instead of being compiled to SQL that fails
//! at execution.

use super::{Dialect, TableCompiler, base};
use crate::column::ColumnDefinition;
use crate::error::Result;
use crate::naming::NameKind;
use crate::operation::{AddForeignKeyOp, CreateTableOp};
use crate::session::CompilationSession;
use crate::statement::CompiledStatement;

/// SQLite compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCompiler;

impl SqliteCompiler {
    /// Creates a new SQLite compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCompiler for SqliteCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn create_table(&self, session: &mut CompilationSession<'_>, op: &CreateTableOp) -> Result<()> {
        let statement = base::create_table_statement(session, &op.columns, op.if_not_exists)?;
        session.push(statement)?;
        base::table_comment(self, session)
    }

    fn comment(&self, _session: &mut CompilationSession<'_>, _comment: Option<&str>) -> Result<()> {
        Err(self.unsupported("comment"))
    }

    /// SQLite adds one column per `ALTER TABLE`.
    fn add_columns(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[ColumnDefinition],
    ) -> Result<()> {
        let mut statements = Vec::with_capacity(columns.len());
        for column in columns {
            let defs = session.formatter().column_def(column)?;
            let sql = format!(
                "ALTER TABLE {} {}{}",
                session.table_name(),
                self.add_columns_prefix(),
                defs.sql.join(", ")
            );
            statements.push(CompiledStatement::new(sql).with_bindings(defs.bindings));
        }
        statements
            .into_iter()
            .try_for_each(|statement| session.push(statement))
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
        _session: &mut CompilationSession<'_>,
        _columns: &[String],
        _name: Option<&str>,
    ) -> Result<()> {
        Err(self.unsupported("add_primary_key"))
    }

    fn drop_primary_key(
        &self,
        _session: &mut CompilationSession<'_>,
        _name: Option<&str>,
    ) -> Result<()> {
        Err(self.unsupported("drop_primary_key"))
    }

    fn drop_index(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Index, columns)?;
        session.push_sql(format!("DROP INDEX {name}"))
    }

    // Unique constraints are unique indexes here.
    fn unique(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Unique, columns)?;
        let sql = format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            name,
            session.table_name(),
            session.columnize(columns)
        );
        session.push_sql(sql)
    }

    fn drop_unique(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Unique, columns)?;
        session.push_sql(format!("DROP INDEX {name}"))
    }

    fn add_foreign_key(
        &self,
        _session: &mut CompilationSession<'_>,
        _op: &AddForeignKeyOp,
    ) -> Result<()> {
        Err(self.unsupported("add_foreign_key"))
    }

    fn drop_foreign_key(
        &self,
        _session: &mut CompilationSession<'_>,
        _columns: &[String],
        _name: Option<&str>,
    ) -> Result<()> {
        Err(self.unsupported("drop_foreign_key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{DefaultValue, integer, text};
    use crate::error::CompileError;
    use crate::operation::Operation;
    use crate::value::SqlValue;

    fn compile(op: Operation) -> Result<Vec<CompiledStatement>> {
        let mut session = CompilationSession::new(Dialect::Sqlite, "users")?;
        session.compile(&op)?;
        Ok(session.finish())
    }

    fn sql(op: Operation) -> Vec<String> {
        compile(op).unwrap().into_iter().map(|s| s.sql).collect()
    }

    #[test]
    fn test_create_if_not_exists() {
        assert_eq!(
            sql(Operation::create_table_if_not_exists(vec![
                integer("id").primary_key().autoincrement().build(),
            ])),
            vec!["CREATE TABLE IF NOT EXISTS \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT)"]
        );
    }

    #[test]
    fn test_add_columns_splits_statements_and_bindings() {
        let statements = compile(Operation::add_columns(vec![
            text("a").default(DefaultValue::raw("?", [SqlValue::from("x")])).build(),
            text("b").build(),
            text("c").default(DefaultValue::raw("?", [SqlValue::from("z")])).build(),
        ]))
        .unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0].sql, "ALTER TABLE \"users\" ADD COLUMN \"a\" TEXT DEFAULT ?");
        assert_eq!(statements[0].bindings, vec![SqlValue::from("x")]);
        assert!(statements[1].bindings.is_empty());
        assert_eq!(statements[2].bindings, vec![SqlValue::from("z")]);
    }

    #[test]
    fn test_unique_is_an_index() {
        assert_eq!(
            sql(Operation::add_unique(["email"])),
            vec!["CREATE UNIQUE INDEX \"users_email_unique\" ON \"users\" (\"email\")"]
        );
        assert_eq!(
            sql(Operation::drop_unique(["email"])),
            vec!["DROP INDEX \"users_email_unique\""]
        );
        assert_eq!(
            sql(Operation::drop_index(["email"])),
            vec!["DROP INDEX \"users_email_index\""]
        );
    }

    #[test]
    fn test_unsupported_operations() {
        let ops = [
            Operation::set_comment("x"),
            Operation::add_primary_key(["id"]),
            Operation::drop_primary_key(),
            Operation::drop_foreign_key(["team_id"]),
            AddForeignKeyOp::new(["team_id"], "teams", ["id"]).into(),
        ];
        for op in ops {
            let err = compile(op).unwrap_err();
            assert!(
                matches!(err, CompileError::UnsupportedOperation { dialect: "sqlite", .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn test_drop_columns_inherits_base() {
        assert_eq!(
            sql(Operation::drop_columns(["a", "b"])),
            vec![
                "ALTER TABLE \"users\" DROP COLUMN \"a\"",
                "ALTER TABLE \"users\" DROP COLUMN \"b\"",
            ]
        );
    }
}
