//! Generic dialect: the base compiler with no overrides.

use super::{Dialect, TableCompiler};

/// Compiler emitting dialect-neutral SQL for every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCompiler;

impl GenericCompiler {
    /// Creates a new generic compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCompiler for GenericCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Generic
    }
}
