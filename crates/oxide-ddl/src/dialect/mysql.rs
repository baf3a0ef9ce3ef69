//! MySQL dialect.
//!
//! MySQL keeps table comments in the table options and drops keys through
//! dedicated clauses instead of `DROP CONSTRAINT`.

use super::{Dialect, TableCompiler, base};
use crate::column::ColumnDefinition;
use crate::error::Result;
use crate::naming::NameKind;
use crate::operation::CreateTableOp;
use crate::session::CompilationSession;
use crate::statement::CompiledStatement;

/// MySQL compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlCompiler;

impl MySqlCompiler {
    /// Creates a new MySQL compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCompiler for MySqlCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn create_table(&self, session: &mut CompilationSession<'_>, op: &CreateTableOp) -> Result<()> {
        let statement = base::create_table_statement(session, &op.columns, op.if_not_exists)?;
        session.push(statement)?;
        base::table_comment(self, session)
    }

    fn comment(&self, session: &mut CompilationSession<'_>, comment: Option<&str>) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} COMMENT = {}",
            session.table_name(),
            base::quote_literal(comment.unwrap_or_default())
        );
        session.push_sql(sql)
    }

    fn drop_columns(&self, session: &mut CompilationSession<'_>, columns: &[String]) -> Result<()> {
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("DROP COLUMN {}", session.wrap(c)))
            .collect();
        let sql = format!("ALTER TABLE {} {}", session.table_name(), clauses.join(", "));
        session.push_sql(sql)
    }

    // MODIFY restates the whole column, so defaults and nullability ride along.
    fn change_column_type(
        &self,
        session: &mut CompilationSession<'_>,
        column: &ColumnDefinition,
    ) -> Result<()> {
        let defs = session.formatter().column_def(column)?;
        let sql = format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            session.table_name(),
            defs.sql.join(", ")
        );
        session.push(CompiledStatement::new(sql).with_bindings(defs.bindings))
    }

    fn drop_primary_key(
        &self,
        session: &mut CompilationSession<'_>,
        _name: Option<&str>,
    ) -> Result<()> {
        let sql = format!("ALTER TABLE {} DROP PRIMARY KEY", session.table_name());
        session.push_sql(sql)
    }

    fn drop_unique(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Unique, columns)?;
        let sql = format!("ALTER TABLE {} DROP INDEX {}", session.table_name(), name);
        session.push_sql(sql)
    }

    fn drop_foreign_key(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Foreign, columns)?;
        let sql = format!("ALTER TABLE {} DROP FOREIGN KEY {}", session.table_name(), name);
        session.push_sql(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{DefaultValue, integer, varchar};
    use crate::operation::Operation;
    use crate::value::SqlValue;

    fn compile(op: Operation) -> Vec<CompiledStatement> {
        let mut session = CompilationSession::new(Dialect::MySql, "users").unwrap();
        session.compile(&op).unwrap();
        session.finish()
    }

    fn sql(op: Operation) -> Vec<String> {
        compile(op).into_iter().map(|s| s.sql).collect()
    }

    #[test]
    fn test_create_with_comment() {
        let mut session = CompilationSession::new(Dialect::MySql, "users")
            .unwrap()
            .with_comment("people");
        session
            .compile(&Operation::create_table_if_not_exists(vec![
                integer("id").primary_key().autoincrement().build(),
            ]))
            .unwrap();
        let sql: Vec<String> = session.finish().into_iter().map(|s| s.sql).collect();
        assert_eq!(
            sql,
            vec![
                "CREATE TABLE IF NOT EXISTS `users` (`id` INT AUTO_INCREMENT PRIMARY KEY)",
                "ALTER TABLE `users` COMMENT = 'people'",
            ]
        );
    }

    #[test]
    fn test_drop_columns_single_statement() {
        assert_eq!(
            sql(Operation::drop_columns(["a", "b"])),
            vec!["ALTER TABLE `users` DROP COLUMN `a`, DROP COLUMN `b`"]
        );
    }

    #[test]
    fn test_modify_column_carries_bindings() {
        let column = varchar("status", 20)
            .not_null()
            .default(DefaultValue::raw("?", [SqlValue::from("active")]))
            .build();
        let statements = compile(Operation::change_column_type(column));
        assert_eq!(
            statements[0].sql,
            "ALTER TABLE `users` MODIFY COLUMN `status` VARCHAR(20) DEFAULT ? NOT NULL"
        );
        assert_eq!(statements[0].bindings, vec![SqlValue::from("active")]);
    }

    #[test]
    fn test_key_drops() {
        assert_eq!(
            sql(Operation::drop_primary_key()),
            vec!["ALTER TABLE `users` DROP PRIMARY KEY"]
        );
        assert_eq!(
            sql(Operation::drop_unique(["email"])),
            vec!["ALTER TABLE `users` DROP INDEX `users_email_unique`"]
        );
        assert_eq!(
            sql(Operation::drop_foreign_key(["team_id"])),
            vec!["ALTER TABLE `users` DROP FOREIGN KEY `users_team_id_foreign`"]
        );
        assert_eq!(
            sql(Operation::drop_index(["email"])),
            vec!["DROP INDEX `users_email_index` ON `users`"]
        );
    }
}
