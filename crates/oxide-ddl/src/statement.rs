//! Compiled statements and the append-only queue that collects them.

use serde::Serialize;

use crate::error::{CompileError, Result};
use crate::value::{SqlValue, count_placeholders};

/// One emitted DDL statement, ready for an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    /// SQL text with positional `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub bindings: Vec<SqlValue>,
    /// Dialect error code the executor must treat as a successful no-op.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_error_code: Option<i32>,
}

impl CompiledStatement {
    /// Creates a statement without bindings.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
            suppress_error_code: None,
        }
    }

    /// Attaches bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<SqlValue>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Marks `code` as benign when the executor runs this statement.
    #[must_use]
    pub fn suppressing(mut self, code: i32) -> Self {
        self.suppress_error_code = Some(code);
        self
    }

    /// Checks that the binding count matches the placeholder count.
    pub fn check_bindings(&self) -> Result<()> {
        let placeholders = count_placeholders(&self.sql);
        if placeholders != self.bindings.len() {
            return Err(CompileError::invalid(format!(
                "statement has {placeholders} placeholder(s) but {} binding(s): {}",
                self.bindings.len(),
                self.sql
            )));
        }
        Ok(())
    }
}

/// Ordered, append-only list of compiled statements.
#[derive(Debug, Clone, Default)]
pub struct StatementQueue {
    statements: Vec<CompiledStatement>,
}

impl StatementQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Appends a statement after checking its bindings.
    pub fn push(&mut self, statement: CompiledStatement) -> Result<()> {
        statement.check_bindings()?;
        self.statements.push(statement);
        Ok(())
    }

    /// Appends every statement of `other`, in order.
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.statements.append(&mut other.statements);
    }

    /// Drops everything queued so far. Only staging queues are cleared.
    pub(crate) fn clear(&mut self) {
        self.statements.clear();
    }

    /// Returns the number of queued statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the queued statements.
    #[must_use]
    pub fn as_slice(&self) -> &[CompiledStatement] {
        &self.statements
    }

    /// Iterates over the queued statements in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledStatement> {
        self.statements.iter()
    }

    /// Hands the statements to the caller.
    #[must_use]
    pub fn into_statements(self) -> Vec<CompiledStatement> {
        self.statements
    }
}

impl<'a> IntoIterator for &'a StatementQueue {
    type Item = &'a CompiledStatement;
    type IntoIter = std::slice::Iter<'a, CompiledStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
