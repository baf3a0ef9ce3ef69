//! PostgreSQL dialect.

use super::{Dialect, TableCompiler, base};
use crate::column::ColumnDefinition;
use crate::error::Result;
use crate::naming::NameKind;
use crate::operation::CreateTableOp;
use crate::session::CompilationSession;

/// PostgreSQL compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresCompiler;

impl PostgresCompiler {
    /// Creates a new PostgreSQL compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCompiler for PostgresCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn create_table(&self, session: &mut CompilationSession<'_>, op: &CreateTableOp) -> Result<()> {
        let statement = base::create_table_statement(session, &op.columns, op.if_not_exists)?;
        session.push(statement)?;
        base::table_comment(self, session)
    }

    fn drop_columns(&self, session: &mut CompilationSession<'_>, columns: &[String]) -> Result<()> {
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("DROP COLUMN {}", session.wrap(c)))
            .collect();
        let sql = format!("ALTER TABLE {} {}", session.table_name(), clauses.join(", "));
        session.push_sql(sql)
    }

    fn change_column_type(
        &self,
        session: &mut CompilationSession<'_>,
        column: &ColumnDefinition,
    ) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            session.table_name(),
            session.wrap(&column.name),
            session.formatter().type_clause(&column.data_type)
        );
        session.push_sql(sql)
    }

    fn drop_index(
        &self,
        session: &mut CompilationSession<'_>,
        columns: &[String],
        name: Option<&str>,
    ) -> Result<()> {
        let name = session.resolve_name(name, NameKind::Index, columns)?;
        let name = schema_qualified(session, &name);
        session.push_sql(format!("DROP INDEX {name}"))
    }
}

/// Prefixes the table's schema to a quoted index name.
///
/// An index always lives in its table's schema, while an unqualified
/// `DROP INDEX` looks it up through `search_path`.
fn schema_qualified(session: &CompilationSession<'_>, quoted_name: &str) -> String {
    match session.table_name_raw().rsplit_once('.') {
        Some((schema, _)) => format!("{}.{quoted_name}", session.wrap(schema)),
        None => quoted_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnBuilder, DataType, bigint, text};
    use crate::operation::Operation;

    fn sql(op: Operation) -> Vec<String> {
        let mut session = CompilationSession::new(Dialect::Postgres, "users").unwrap();
        session.compile(&op).unwrap();
        session.finish().into_iter().map(|s| s.sql).collect()
    }

    #[test]
    fn test_create_if_not_exists_is_native() {
        assert_eq!(
            sql(Operation::create_table_if_not_exists(vec![
                bigint("id").primary_key().autoincrement().build(),
                text("bio").build(),
            ])),
            vec![
                "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" BIGSERIAL PRIMARY KEY, \"bio\" TEXT)"
            ]
        );
    }

    #[test]
    fn test_drop_columns_single_statement() {
        assert_eq!(
            sql(Operation::drop_columns(["a", "b"])),
            vec!["ALTER TABLE \"users\" DROP COLUMN \"a\", DROP COLUMN \"b\""]
        );
    }

    #[test]
    fn test_change_type() {
        assert_eq!(
            sql(Operation::change_column_type(
                ColumnBuilder::new("age", DataType::Bigint).build()
            )),
            vec!["ALTER TABLE \"users\" ALTER COLUMN \"age\" TYPE BIGINT"]
        );
    }

    #[test]
    fn test_drop_index_is_schema_scoped() {
        assert_eq!(
            sql(Operation::drop_index(["email"])),
            vec!["DROP INDEX \"users_email_index\""]
        );
    }

    #[test]
    fn test_drop_index_keeps_table_schema() {
        let mut session = CompilationSession::new(Dialect::Postgres, "app.users").unwrap();
        session
            .compile_all(&[
                Operation::add_index(["email"]),
                Operation::drop_index(["email"]),
            ])
            .unwrap();
        let sql: Vec<String> = session.finish().into_iter().map(|s| s.sql).collect();
        assert_eq!(
            sql,
            vec![
                "CREATE INDEX \"app_users_email_index\" ON \"app\".\"users\" (\"email\")",
                "DROP INDEX \"app\".\"app_users_email_index\"",
            ]
        );
    }

    #[test]
    fn test_inherited_operations_match_generic() {
        let ops = [
            Operation::rename_column("a", "b"),
            Operation::add_index(["email"]),
            Operation::add_unique(["email"]),
            Operation::add_primary_key(["id"]),
        ];
        for op in ops {
            let mut generic = CompilationSession::new(Dialect::Generic, "users").unwrap();
            generic.compile(&op).unwrap();
            let generic: Vec<String> = generic.finish().into_iter().map(|s| s.sql).collect();
            assert_eq!(sql(op), generic);
        }
    }
}
