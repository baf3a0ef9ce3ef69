#![allow(dead_code)]

use oxide_ddl::prelude::*;

pub fn compile(dialect: Dialect, unit: &MigrationUnit) -> Vec<CompiledStatement> {
    oxide_ddl::compile(dialect, unit)
        .unwrap_or_else(|e| panic!("Failed to compile {} for {dialect}: {e}", unit.table))
}

pub fn compile_err(dialect: Dialect, unit: &MigrationUnit) -> CompileError {
    match oxide_ddl::compile(dialect, unit) {
        Ok(statements) => panic!("Expected error for {dialect}, got {statements:?}"),
        Err(e) => e,
    }
}

pub fn sql(dialect: Dialect, unit: &MigrationUnit) -> Vec<String> {
    compile(dialect, unit).into_iter().map(|s| s.sql).collect()
}

/// Compiles a single operation against `table`.
pub fn sql_for(dialect: Dialect, table: &str, op: Operation) -> Vec<String> {
    sql(dialect, &MigrationUnit::new(table).operation(op))
}

pub fn users_table() -> Vec<ColumnDefinition> {
    vec![
        bigint("id").primary_key().autoincrement().build(),
        varchar("email", 255).not_null().unique().build(),
        boolean("active").not_null().default_bool(true).build(),
        timestamp("created_at")
            .not_null()
            .default_expr("CURRENT_TIMESTAMP")
            .build(),
    ]
}
