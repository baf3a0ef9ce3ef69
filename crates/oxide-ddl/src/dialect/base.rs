//! Dialect-neutral statement emission.
//!
//! These functions back the default methods of
//! [`TableCompiler`](super::TableCompiler). Dialect compilers call them
//! directly for the parts of an operation they do not change.

use tracing::debug;

use super::TableCompiler;
use crate::column::ColumnDefinition;
use crate::error::Result;
use crate::naming::NameKind;
use crate::operation::{AddForeignKeyOp, CreateTableOp};
use crate::session::CompilationSession;
use crate::statement::CompiledStatement;

/// Quotes `text` as a string literal.
#[must_use]
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Builds `CREATE TABLE [IF NOT EXISTS] <table> (<defs>)` with the column
/// bindings attached.
pub fn create_table_statement(
    session: &CompilationSession<'_>,
    columns: &[ColumnDefinition],
    if_not_exists: bool,
) -> Result<CompiledStatement> {
    let defs = session.formatter().column_defs(columns)?;
    let mut sql = String::from("CREATE TABLE ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(session.table_name());
    sql.push_str(" (");
    sql.push_str(&defs.sql.join(", "));
    sql.push(')');
    Ok(CompiledStatement::new(sql).with_bindings(defs.bindings))
}

/// Emits the table comment requested at build time, if any, through the
/// compiler's own `comment`.
pub fn table_comment<C: TableCompiler + ?Sized>(
    compiler: &C,
    session: &mut CompilationSession<'_>,
) -> Result<()> {
    match session.table_comment().map(str::to_owned) {
        Some(comment) => compiler.comment(session, Some(&comment)),
        None => Ok(()),
    }
}

/// `CREATE TABLE` without `IF NOT EXISTS`, which has no portable spelling.
pub fn create_table<C: TableCompiler + ?Sized>(
    compiler: &C,
    session: &mut CompilationSession<'_>,
    op: &CreateTableOp,
) -> Result<()> {
    if op.if_not_exists {
        debug!(
            dialect = compiler.dialect().name(),
            "No IF NOT EXISTS support, emitting a plain CREATE TABLE"
        );
    }
    let statement = create_table_statement(session, &op.columns, false)?;
    session.push(statement)?;
    table_comment(compiler, session)
}

/// `COMMENT ON TABLE <table> IS '<comment>'`.
pub fn comment(session: &mut CompilationSession<'_>, comment: Option<&str>) -> Result<()> {
    let sql = format!(
        "COMMENT ON TABLE {} IS {}",
        session.table_name(),
        quote_literal(comment.unwrap_or_default())
    );
    session.push_sql(sql)
}

/// `ALTER TABLE <table> <prefix><c1>, <prefix><c2>, ...`.
pub fn add_columns<C: TableCompiler + ?Sized>(
    compiler: &C,
    session: &mut CompilationSession<'_>,
    columns: &[ColumnDefinition],
) -> Result<()> {
    let defs = session.formatter().column_defs(columns)?;
    let prefix = compiler.add_columns_prefix();
    let clauses: Vec<String> = defs.sql.iter().map(|def| format!("{prefix}{def}")).collect();
    let sql = format!("ALTER TABLE {} {}", session.table_name(), clauses.join(", "));
    session.push(CompiledStatement::new(sql).with_bindings(defs.bindings))
}

/// One `ALTER TABLE <table> DROP COLUMN <c>` per column.
pub fn drop_columns(session: &mut CompilationSession<'_>, columns: &[String]) -> Result<()> {
    let statements: Vec<String> = columns
        .iter()
        .map(|c| format!("ALTER TABLE {} DROP COLUMN {}", session.table_name(), session.wrap(c)))
        .collect();
    statements.into_iter().try_for_each(|sql| session.push_sql(sql))
}

/// `ALTER TABLE <table> RENAME COLUMN <from> TO <to>`.
pub fn rename_column(session: &mut CompilationSession<'_>, from: &str, to: &str) -> Result<()> {
    let sql = format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        session.table_name(),
        session.wrap(from),
        session.wrap(to)
    );
    session.push_sql(sql)
}

/// `ALTER TABLE <table> ALTER COLUMN <c> SET DATA TYPE <type>`.
pub fn change_column_type(
    session: &mut CompilationSession<'_>,
    column: &ColumnDefinition,
) -> Result<()> {
    let sql = format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}",
        session.table_name(),
        session.wrap(&column.name),
        session.formatter().type_clause(&column.data_type)
    );
    session.push_sql(sql)
}

/// `ALTER TABLE <table> ADD CONSTRAINT <name> PRIMARY KEY (<cols>)`.
pub fn primary_key(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Primary, &[])?;
    let sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
        session.table_name(),
        name,
        session.columnize(columns)
    );
    session.push_sql(sql)
}

/// `ALTER TABLE <table> DROP CONSTRAINT <name>`, defaulting to `<table>_pkey`.
pub fn drop_primary_key(session: &mut CompilationSession<'_>, name: Option<&str>) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Primary, &[])?;
    drop_constraint(session, &name)
}

/// `CREATE INDEX <name> ON <table> (<cols>)`.
pub fn index(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Index, columns)?;
    let sql = format!(
        "CREATE INDEX {} ON {} ({})",
        name,
        session.table_name(),
        session.columnize(columns)
    );
    session.push_sql(sql)
}

/// `DROP INDEX <name> ON <table>`.
pub fn drop_index(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Index, columns)?;
    let sql = format!("DROP INDEX {} ON {}", name, session.table_name());
    session.push_sql(sql)
}

/// `ALTER TABLE <table> ADD CONSTRAINT <name> UNIQUE (<cols>)`.
pub fn unique(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Unique, columns)?;
    let sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
        session.table_name(),
        name,
        session.columnize(columns)
    );
    session.push_sql(sql)
}

/// `ALTER TABLE <table> DROP CONSTRAINT <name>` for a unique constraint.
pub fn drop_unique(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Unique, columns)?;
    drop_constraint(session, &name)
}

/// `ALTER TABLE <table> ADD CONSTRAINT <name> FOREIGN KEY (...) REFERENCES ...`.
pub fn add_foreign_key(session: &mut CompilationSession<'_>, op: &AddForeignKeyOp) -> Result<()> {
    let name = session.resolve_name(op.name.as_deref(), NameKind::Foreign, &op.columns)?;
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        session.table_name(),
        name,
        session.columnize(&op.columns),
        session.wrap(&op.references_table),
        session.columnize(&op.references_columns)
    );
    if let Some(action) = op.on_delete {
        sql.push_str(" ON DELETE ");
        sql.push_str(action.as_sql());
    }
    if let Some(action) = op.on_update {
        sql.push_str(" ON UPDATE ");
        sql.push_str(action.as_sql());
    }
    session.push_sql(sql)
}

/// `ALTER TABLE <table> DROP CONSTRAINT <name>` for a foreign key.
pub fn drop_foreign_key(
    session: &mut CompilationSession<'_>,
    columns: &[String],
    name: Option<&str>,
) -> Result<()> {
    let name = session.resolve_name(name, NameKind::Foreign, columns)?;
    drop_constraint(session, &name)
}

/// `ALTER TABLE <table> DROP CONSTRAINT <quoted name>`.
pub fn drop_constraint(session: &mut CompilationSession<'_>, quoted_name: &str) -> Result<()> {
    let sql = format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        session.table_name(),
        quoted_name
    );
    session.push_sql(sql)
}
