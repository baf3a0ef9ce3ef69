//! Compilation sessions.
//!
//! A session binds one target table to one dialect compiler and one
//! formatter, and collects the statements compiled for it. Sessions share
//! no state, so parallel migrations simply use one session each.

use std::collections::HashMap;

use tracing::debug;

use crate::dialect::{Dialect, TableCompiler};
use crate::error::{CompileError, Result};
use crate::formatter::Formatter;
use crate::naming::{NameKind, NameResolver};
use crate::operation::Operation;
use crate::statement::{CompiledStatement, StatementQueue};

/// One compile pass over the operations of one table.
pub struct CompilationSession<'a> {
    dialect: Dialect,
    compiler: &'static dyn TableCompiler,
    formatter: &'a dyn Formatter,
    naming: NameResolver,
    table_raw: String,
    table_quoted: String,
    comment: Option<String>,
    queue: StatementQueue,
    staged: StatementQueue,
    generated: HashMap<(NameKind, String), Vec<String>>,
    staged_names: Vec<(NameKind, String, Vec<String>)>,
}

impl CompilationSession<'static> {
    /// Creates a session using the dialect's stock formatter.
    pub fn new(dialect: Dialect, table: impl Into<String>) -> Result<Self> {
        Self::with_formatter(dialect, table, dialect.formatter())
    }
}

impl<'a> CompilationSession<'a> {
    /// Creates a session with a caller-supplied formatter.
    pub fn with_formatter(
        dialect: Dialect,
        table: impl Into<String>,
        formatter: &'a dyn Formatter,
    ) -> Result<Self> {
        let table_raw = table.into();
        if table_raw.is_empty() {
            return Err(CompileError::invalid("table name is empty"));
        }
        let table_quoted = formatter.wrap(&table_raw);
        Ok(Self {
            dialect,
            compiler: dialect.compiler(),
            formatter,
            naming: dialect.naming(),
            table_raw,
            table_quoted,
            comment: None,
            queue: StatementQueue::new(),
            staged: StatementQueue::new(),
            generated: HashMap::new(),
            staged_names: Vec::new(),
        })
    }

    /// Sets the table comment emitted after `CREATE TABLE`.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the target dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the quoted table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_quoted
    }

    /// Returns the raw table name.
    #[must_use]
    pub fn table_name_raw(&self) -> &str {
        &self.table_raw
    }

    /// Returns the table comment requested at build time.
    #[must_use]
    pub fn table_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the formatter.
    #[must_use]
    pub fn formatter(&self) -> &'a dyn Formatter {
        self.formatter
    }

    /// Quotes an identifier through the formatter.
    #[must_use]
    pub fn wrap(&self, identifier: &str) -> String {
        self.formatter.wrap(identifier)
    }

    /// Quotes and joins column names through the formatter.
    #[must_use]
    pub fn columnize(&self, columns: &[String]) -> String {
        self.formatter.columnize(columns)
    }

    /// Returns the quoted explicit name, or a generated one for this table.
    ///
    /// A generated name is bound to the column set it was derived from for
    /// the rest of the session. Another column set of the same kind that
    /// maps to the same name (`a_b` vs. `a, b`, or `Email` vs. `email`) is
    /// rejected; such objects need an explicit name.
    pub fn resolve_name(
        &mut self,
        explicit: Option<&str>,
        kind: NameKind,
        columns: &[String],
    ) -> Result<String> {
        let name = self
            .naming
            .resolve(explicit, kind, &self.table_raw, columns)?;
        if explicit.is_none() {
            self.claim_generated(kind, &name, columns)?;
        }
        Ok(self.formatter.wrap(&name))
    }

    fn claim_generated(&mut self, kind: NameKind, name: &str, columns: &[String]) -> Result<()> {
        let key = (kind, name.to_string());
        let owner = self.generated.get(&key).map(Vec::as_slice).or_else(|| {
            self.staged_names
                .iter()
                .find(|(k, n, _)| *k == kind && n == name)
                .map(|(_, _, c)| c.as_slice())
        });
        match owner {
            Some(owner) if owner != columns => Err(CompileError::invalid(format!(
                "generated {} name '{name}' for ({}) is already used for ({}) on table '{}'; \
                 give one of them an explicit name",
                kind.suffix(),
                columns.join(", "),
                owner.join(", "),
                self.table_raw
            ))),
            Some(_) => Ok(()),
            None => {
                self.staged_names.push((kind, key.1, columns.to_vec()));
                Ok(())
            }
        }
    }

    /// Stages a statement for the operation being compiled.
    pub fn push(&mut self, statement: CompiledStatement) -> Result<()> {
        debug!(sql = %statement.sql, bindings = statement.bindings.len(), "Compiled statement");
        self.staged.push(statement)
    }

    /// Stages a statement without bindings.
    pub fn push_sql(&mut self, sql: impl Into<String>) -> Result<()> {
        self.push(CompiledStatement::new(sql))
    }

    /// Validates and compiles one operation.
    ///
    /// Statements reach the queue only if the whole operation compiled;
    /// on error the queue is left as it was.
    pub fn compile(&mut self, op: &Operation) -> Result<()> {
        op.validate()?;
        debug!(
            dialect = self.dialect.name(),
            table = %self.table_raw,
            operation = op.kind(),
            "Compiling operation"
        );

        let compiler = self.compiler;
        self.staged.clear();
        self.staged_names.clear();
        let result = match op {
            Operation::CreateTable(op) => compiler.create_table(self, op),
            Operation::AddColumns(op) => compiler.add_columns(self, &op.columns),
            Operation::DropColumns(op) => compiler.drop_columns(self, &op.columns),
            Operation::RenameColumn(op) => compiler.rename_column(self, &op.from, &op.to),
            Operation::ChangeColumnType(op) => compiler.change_column_type(self, &op.column),
            Operation::AddPrimaryKey(op) => {
                compiler.primary_key(self, &op.columns, op.name.as_deref())
            }
            Operation::DropPrimaryKey(op) => compiler.drop_primary_key(self, op.name.as_deref()),
            Operation::AddIndex(op) => compiler.index(self, &op.columns, op.name.as_deref()),
            Operation::DropIndex(op) => compiler.drop_index(self, &op.columns, op.name.as_deref()),
            Operation::AddUnique(op) => compiler.unique(self, &op.columns, op.name.as_deref()),
            Operation::DropUnique(op) => {
                compiler.drop_unique(self, &op.columns, op.name.as_deref())
            }
            Operation::AddForeignKey(op) => compiler.add_foreign_key(self, op),
            Operation::DropForeignKey(op) => {
                compiler.drop_foreign_key(self, &op.columns, op.name.as_deref())
            }
            Operation::SetComment(op) => compiler.comment(self, op.comment.as_deref()),
        };

        match result {
            Ok(()) => {
                self.queue.append(&mut self.staged);
                for (kind, name, columns) in self.staged_names.drain(..) {
                    self.generated.insert((kind, name), columns);
                }
                Ok(())
            }
            Err(err) => {
                self.staged.clear();
                self.staged_names.clear();
                Err(err)
            }
        }
    }

    /// Compiles operations in order, stopping at the first error.
    pub fn compile_all<'o>(&mut self, ops: impl IntoIterator<Item = &'o Operation>) -> Result<()> {
        ops.into_iter().try_for_each(|op| self.compile(op))
    }

    /// Returns the statements compiled so far.
    #[must_use]
    pub fn statements(&self) -> &[CompiledStatement] {
        self.queue.as_slice()
    }

    /// Ends the session and hands over its statements.
    #[must_use]
    pub fn finish(self) -> Vec<CompiledStatement> {
        self.queue.into_statements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{DataType, bigint, text};
    use crate::formatter::ColumnDefs;

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(matches!(
            CompilationSession::new(Dialect::Generic, ""),
            Err(CompileError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_table_is_quoted_once() {
        let session = CompilationSession::new(Dialect::MySql, "app.users").unwrap();
        assert_eq!(session.table_name(), "`app`.`users`");
        assert_eq!(session.table_name_raw(), "app.users");
    }

    #[test]
    fn test_invalid_operation_appends_nothing() {
        let mut session = CompilationSession::new(Dialect::Generic, "users").unwrap();
        session.compile(&Operation::drop_columns(["a"])).unwrap();
        let empty: [&str; 0] = [];
        assert!(session.compile(&Operation::add_index(empty)).is_err());
        assert_eq!(session.statements().len(), 1);
    }

    #[test]
    fn test_failed_operation_rolls_back_staged_statements() {
        // SQLite emits the create, then rejects the comment.
        let mut session = CompilationSession::new(Dialect::Sqlite, "users")
            .unwrap()
            .with_comment("people");
        let err = session
            .compile(&Operation::create_table(vec![bigint("id").build()]))
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperation { .. }));
        assert!(session.statements().is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let mut session = CompilationSession::new(Dialect::Generic, "users").unwrap();
        let ops = vec![
            Operation::create_table(vec![bigint("id").build()]),
            Operation::add_columns(vec![text("bio").build()]),
            Operation::rename_column("bio", "about"),
        ];
        session.compile_all(&ops).unwrap();
        let sql: Vec<String> = session.finish().into_iter().map(|s| s.sql).collect();
        assert!(sql[0].starts_with("CREATE TABLE"));
        assert!(sql[1].contains("ADD COLUMN"));
        assert!(sql[2].contains("RENAME COLUMN"));
    }

    #[test]
    fn test_colliding_generated_names_are_rejected() {
        let mut session = CompilationSession::new(Dialect::Postgres, "users").unwrap();
        session.compile(&Operation::add_index(["a_b"])).unwrap();
        let err = session.compile(&Operation::add_index(["a", "b"])).unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidOperation(ref m) if m.contains("users_a_b_index")),
            "{err}"
        );
        assert_eq!(session.statements().len(), 1);

        session.compile(&Operation::add_index(["email"])).unwrap();
        assert!(matches!(
            session.compile(&Operation::add_index(["Email"])),
            Err(CompileError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_same_columns_reuse_their_generated_name() {
        let mut session = CompilationSession::new(Dialect::Postgres, "users").unwrap();
        let ops = vec![
            Operation::add_index(["email"]),
            Operation::add_unique(["email"]),
            Operation::drop_index(["email"]),
            Operation::add_index(["email"]),
        ];
        session.compile_all(&ops).unwrap();
        assert_eq!(session.statements().len(), 4);
    }

    #[test]
    fn test_uncommitted_names_are_not_kept() {
        let mut session = CompilationSession::new(Dialect::Generic, "users").unwrap();
        let name = session
            .resolve_name(None, NameKind::Index, &["a_b".to_string()])
            .unwrap();
        assert_eq!(name, "\"users_a_b_index\"");
        session.compile(&Operation::add_index(["a", "b"])).unwrap();
    }

    struct UpperFormatter;

    impl Formatter for UpperFormatter {
        fn wrap(&self, identifier: &str) -> String {
            format!("[{}]", identifier.to_uppercase())
        }

        fn type_clause(&self, data_type: &DataType) -> String {
            data_type.to_sql()
        }

        fn column_def(&self, column: &crate::column::ColumnDefinition) -> Result<ColumnDefs> {
            Ok(ColumnDefs {
                sql: vec![format!(
                    "{} {}",
                    self.wrap(&column.name),
                    self.type_clause(&column.data_type)
                )],
                bindings: Vec::new(),
            })
        }
    }

    #[test]
    fn test_custom_formatter_is_used() {
        let formatter = UpperFormatter;
        let mut session =
            CompilationSession::with_formatter(Dialect::Generic, "users", &formatter).unwrap();
        session.compile(&Operation::add_index(["email"])).unwrap();
        assert_eq!(
            session.statements()[0].sql,
            "CREATE INDEX [USERS_EMAIL_INDEX] ON [USERS] ([EMAIL])"
        );
    }
}
