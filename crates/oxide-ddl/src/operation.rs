//! Schema operations.
//!
//! Defines the abstract, database-agnostic operations a migration unit is
//! made of. Operations are immutable once built; a compiler consumes each
//! one exactly once.

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDefinition, ForeignKeyAction};
use crate::error::{CompileError, Result};

/// All schema-change operations the compiler understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create the target table.
    CreateTable(CreateTableOp),
    /// Add one or more columns.
    AddColumns(AddColumnsOp),
    /// Drop one or more columns.
    DropColumns(DropColumnsOp),
    /// Rename a column.
    RenameColumn(RenameColumnOp),
    /// Change the type of a column.
    ChangeColumnType(ChangeColumnTypeOp),
    /// Add a primary key constraint.
    AddPrimaryKey(ConstraintOp),
    /// Drop the primary key constraint.
    DropPrimaryKey(DropPrimaryKeyOp),
    /// Create an index.
    AddIndex(ConstraintOp),
    /// Drop an index.
    DropIndex(ConstraintOp),
    /// Add a unique constraint.
    AddUnique(ConstraintOp),
    /// Drop a unique constraint.
    DropUnique(ConstraintOp),
    /// Add a foreign key constraint.
    AddForeignKey(AddForeignKeyOp),
    /// Drop a foreign key constraint.
    DropForeignKey(ConstraintOp),
    /// Set the table comment.
    SetComment(CommentOp),
}

impl Operation {
    /// Creates a create table operation.
    #[must_use]
    pub fn create_table(columns: Vec<ColumnDefinition>) -> Self {
        Self::CreateTable(CreateTableOp {
            columns,
            if_not_exists: false,
        })
    }

    /// Creates a create table if not exists operation.
    #[must_use]
    pub fn create_table_if_not_exists(columns: Vec<ColumnDefinition>) -> Self {
        Self::CreateTable(CreateTableOp {
            columns,
            if_not_exists: true,
        })
    }

    /// Creates an add columns operation.
    #[must_use]
    pub fn add_columns(columns: Vec<ColumnDefinition>) -> Self {
        Self::AddColumns(AddColumnsOp { columns })
    }

    /// Creates a drop columns operation.
    #[must_use]
    pub fn drop_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DropColumns(DropColumnsOp {
            columns: columns.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates a rename column operation.
    #[must_use]
    pub fn rename_column(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::RenameColumn(RenameColumnOp {
            from: from.into(),
            to: to.into(),
        })
    }

    /// Creates a change column type operation.
    #[must_use]
    pub fn change_column_type(column: ColumnDefinition) -> Self {
        Self::ChangeColumnType(ChangeColumnTypeOp { column })
    }

    /// Creates an add primary key operation with a generated name.
    #[must_use]
    pub fn add_primary_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AddPrimaryKey(ConstraintOp::on(columns))
    }

    /// Creates a drop primary key operation.
    #[must_use]
    pub const fn drop_primary_key() -> Self {
        Self::DropPrimaryKey(DropPrimaryKeyOp { name: None })
    }

    /// Creates an add index operation with a generated name.
    #[must_use]
    pub fn add_index<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AddIndex(ConstraintOp::on(columns))
    }

    /// Creates a drop index operation with a generated name.
    #[must_use]
    pub fn drop_index<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DropIndex(ConstraintOp::on(columns))
    }

    /// Creates an add unique constraint operation with a generated name.
    #[must_use]
    pub fn add_unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AddUnique(ConstraintOp::on(columns))
    }

    /// Creates a drop unique constraint operation with a generated name.
    #[must_use]
    pub fn drop_unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DropUnique(ConstraintOp::on(columns))
    }

    /// Creates a drop foreign key operation with a generated name.
    #[must_use]
    pub fn drop_foreign_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DropForeignKey(ConstraintOp::on(columns))
    }

    /// Creates a set comment operation.
    #[must_use]
    pub fn set_comment(comment: impl Into<String>) -> Self {
        Self::SetComment(CommentOp {
            comment: Some(comment.into()),
        })
    }

    /// Returns the operation's kind, as used in logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "create_table",
            Self::AddColumns(_) => "add_columns",
            Self::DropColumns(_) => "drop_columns",
            Self::RenameColumn(_) => "rename_column",
            Self::ChangeColumnType(_) => "change_column_type",
            Self::AddPrimaryKey(_) => "add_primary_key",
            Self::DropPrimaryKey(_) => "drop_primary_key",
            Self::AddIndex(_) => "add_index",
            Self::DropIndex(_) => "drop_index",
            Self::AddUnique(_) => "add_unique",
            Self::DropUnique(_) => "drop_unique",
            Self::AddForeignKey(_) => "add_foreign_key",
            Self::DropForeignKey(_) => "drop_foreign_key",
            Self::SetComment(_) => "set_comment",
        }
    }

    /// Rejects malformed operations before any statement is emitted.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            Self::CreateTable(op) => require_definitions(kind, &op.columns),
            Self::AddColumns(op) => require_definitions(kind, &op.columns),
            Self::DropColumns(op) => require_columns(kind, &op.columns),
            Self::RenameColumn(op) => {
                require_name(kind, "source column", &op.from)?;
                require_name(kind, "target column", &op.to)
            }
            Self::ChangeColumnType(op) => require_name(kind, "column", &op.column.name),
            Self::AddPrimaryKey(op) | Self::AddIndex(op) | Self::AddUnique(op) => {
                require_columns(kind, &op.columns)?;
                op.validate_name(kind)
            }
            Self::DropIndex(op) | Self::DropUnique(op) | Self::DropForeignKey(op) => {
                // An explicit name identifies the object without columns.
                if op.name.is_none() {
                    require_columns(kind, &op.columns)?;
                } else if op.columns.iter().any(String::is_empty) {
                    return Err(CompileError::invalid(format!(
                        "{kind} has an empty column name"
                    )));
                }
                op.validate_name(kind)
            }
            Self::AddForeignKey(op) => op.validate(kind),
            Self::DropPrimaryKey(op) => match op.name {
                Some(ref name) => require_name(kind, "constraint", name),
                None => Ok(()),
            },
            Self::SetComment(_) => Ok(()),
        }
    }
}

fn require_columns(kind: &str, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(CompileError::invalid(format!(
            "{kind} requires at least one column"
        )));
    }
    if columns.iter().any(String::is_empty) {
        return Err(CompileError::invalid(format!(
            "{kind} has an empty column name"
        )));
    }
    Ok(())
}

fn require_definitions(kind: &str, columns: &[ColumnDefinition]) -> Result<()> {
    if columns.is_empty() {
        return Err(CompileError::invalid(format!(
            "{kind} requires at least one column"
        )));
    }
    if columns.iter().any(|c| c.name.is_empty()) {
        return Err(CompileError::invalid(format!(
            "{kind} has an empty column name"
        )));
    }
    Ok(())
}

fn require_name(kind: &str, what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CompileError::invalid(format!("{kind} has an empty {what} name")));
    }
    Ok(())
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOp {
    /// Column definitions.
    pub columns: Vec<ColumnDefinition>,
    /// Whether the create must succeed when the table already exists.
    #[serde(default)]
    pub if_not_exists: bool,
}

impl From<CreateTableOp> for Operation {
    fn from(op: CreateTableOp) -> Self {
        Self::CreateTable(op)
    }
}

/// Add columns operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnsOp {
    /// Column definitions.
    pub columns: Vec<ColumnDefinition>,
}

impl From<AddColumnsOp> for Operation {
    fn from(op: AddColumnsOp) -> Self {
        Self::AddColumns(op)
    }
}

/// Drop columns operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnsOp {
    /// Column names.
    pub columns: Vec<String>,
}

impl From<DropColumnsOp> for Operation {
    fn from(op: DropColumnsOp) -> Self {
        Self::DropColumns(op)
    }
}

/// Rename column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOp {
    /// Current column name.
    pub from: String,
    /// New column name.
    pub to: String,
}

impl From<RenameColumnOp> for Operation {
    fn from(op: RenameColumnOp) -> Self {
        Self::RenameColumn(op)
    }
}

/// Change column type operation.
///
/// Carries the full new definition; dialects that restate the whole column
/// (MySQL's `MODIFY COLUMN`) need more than the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeColumnTypeOp {
    /// The column with its new type.
    pub column: ColumnDefinition,
}

impl From<ChangeColumnTypeOp> for Operation {
    fn from(op: ChangeColumnTypeOp) -> Self {
        Self::ChangeColumnType(op)
    }
}

/// A column set plus an optional explicit name, shared by the index,
/// unique, primary and foreign key operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintOp {
    /// Column names.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Explicit name; generated from table and columns when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl ConstraintOp {
    /// Creates an unnamed operation over `columns`.
    #[must_use]
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            name: None,
        }
    }

    /// Sets an explicit name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn validate_name(&self, kind: &str) -> Result<()> {
        match self.name {
            Some(ref name) => require_name(kind, "constraint", name),
            None => Ok(()),
        }
    }
}

/// Drop primary key operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropPrimaryKeyOp {
    /// Explicit constraint name; defaults to `<table>_pkey`.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<DropPrimaryKeyOp> for Operation {
    fn from(op: DropPrimaryKeyOp) -> Self {
        Self::DropPrimaryKey(op)
    }
}

/// Add foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForeignKeyOp {
    /// Columns in this table.
    pub columns: Vec<String>,
    /// Explicit constraint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Referenced table.
    pub references_table: String,
    /// Referenced columns.
    pub references_columns: Vec<String>,
    /// ON DELETE action.
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
}

impl AddForeignKeyOp {
    /// Creates a foreign key from `columns` to `table (references)`.
    #[must_use]
    pub fn new<I, S, J, T>(columns: I, table: impl Into<String>, references: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            name: None,
            references_table: table.into(),
            references_columns: references.into_iter().map(Into::into).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets an explicit constraint name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    fn validate(&self, kind: &str) -> Result<()> {
        require_columns(kind, &self.columns)?;
        require_name(kind, "referenced table", &self.references_table)?;
        require_columns(kind, &self.references_columns)?;
        if self.columns.len() != self.references_columns.len() {
            return Err(CompileError::invalid(format!(
                "{kind} maps {} column(s) onto {} referenced column(s)",
                self.columns.len(),
                self.references_columns.len()
            )));
        }
        match self.name {
            Some(ref name) => require_name(kind, "constraint", name),
            None => Ok(()),
        }
    }
}

impl From<AddForeignKeyOp> for Operation {
    fn from(op: AddForeignKeyOp) -> Self {
        Self::AddForeignKey(op)
    }
}

/// Set comment operation. `None` clears the comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentOp {
    /// Comment text.
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<CommentOp> for Operation {
    fn from(op: CommentOp) -> Self {
        Self::SetComment(op)
    }
}

/// The operations of one migration against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationUnit {
    /// Raw (unquoted) table name.
    pub table: String,
    /// Table comment requested at build time; emitted after the create.
    #[serde(default)]
    pub comment: Option<String>,
    /// Operations, in submission order.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl MigrationUnit {
    /// Creates an empty unit for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            comment: None,
            operations: Vec::new(),
        }
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Appends an operation.
    #[must_use]
    pub fn operation(mut self, op: impl Into<Operation>) -> Self {
        self.operations.push(op.into());
        self
    }

    /// Validates the table name and every operation.
    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(CompileError::invalid("table name is empty"));
        }
        self.operations.iter().try_for_each(Operation::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{bigint, varchar};

    #[test]
    fn test_empty_column_sets_are_rejected() {
        let empty: [&str; 0] = [];
        for op in [
            Operation::add_index(empty),
            Operation::add_unique(empty),
            Operation::add_primary_key(empty),
            Operation::drop_columns(empty),
            Operation::drop_index(empty),
            Operation::create_table(vec![]),
            Operation::add_columns(vec![]),
        ] {
            let err = op.validate().unwrap_err();
            assert!(
                matches!(
                    err,
                    CompileError::InvalidOperation(ref m) if m.contains("at least one column")
                ),
                "{}: {err}",
                op.kind()
            );
        }
    }

    #[test]
    fn test_named_drop_needs_no_columns() {
        let op = Operation::DropIndex(ConstraintOp::on(Vec::<String>::new()).named("idx_x"));
        assert!(op.validate().is_ok());
    }

    #[test]
    fn test_empty_names_are_rejected() {
        assert!(Operation::rename_column("", "b").validate().is_err());
        assert!(Operation::rename_column("a", "").validate().is_err());
        assert!(Operation::drop_columns(["a", ""]).validate().is_err());
        assert!(Operation::AddIndex(ConstraintOp::on(["a"]).named(""))
            .validate()
            .is_err());
    }

    #[test]
    fn test_foreign_key_arity_mismatch() {
        let op: Operation = AddForeignKeyOp::new(["a", "b"], "other", ["id"]).into();
        let err = op.validate().unwrap_err();
        assert!(err.to_string().contains("2 column(s) onto 1"));
    }

    #[test]
    fn test_unit_rejects_empty_table() {
        let unit = MigrationUnit::new("").operation(Operation::drop_columns(["a"]));
        assert!(matches!(
            unit.validate(),
            Err(CompileError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_operation_json_shape() {
        let json = r#"{
            "table": "users",
            "comment": "people",
            "operations": [
                {"op": "create_table", "if_not_exists": true, "columns": [
                    {"name": "id", "data_type": "bigint", "primary_key": true}
                ]},
                {"op": "add_index", "columns": ["email"]},
                {"op": "drop_columns", "columns": ["a", "b"]},
                {"op": "drop_primary_key"}
            ]
        }"#;
        let unit: MigrationUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.comment.as_deref(), Some("people"));
        assert_eq!(unit.operations.len(), 4);
        match &unit.operations[0] {
            Operation::CreateTable(op) => {
                assert!(op.if_not_exists);
                assert!(op.columns[0].primary_key);
            }
            other => panic!("Expected CreateTable, got {other:?}"),
        }
        assert_eq!(unit.operations[1], Operation::add_index(["email"]));
        assert_eq!(unit.operations[3], Operation::drop_primary_key());
    }

    #[test]
    fn test_builder_shape() {
        let unit = MigrationUnit::new("users")
            .operation(Operation::create_table(vec![
                bigint("id").primary_key().build(),
                varchar("email", 255).build(),
            ]))
            .operation(Operation::AddUnique(
                ConstraintOp::on(["email"]).named("uq_email"),
            ));
        assert_eq!(unit.operations.len(), 2);
        assert_eq!(unit.operations[1].kind(), "add_unique");
        assert!(unit.validate().is_ok());
    }
}
