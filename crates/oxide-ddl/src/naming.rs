//! Names for indexes and constraints the caller did not name.
//!
//! Generated names are derived only from the table, the column set and the
//! kind of object, so compiling the same operation twice always yields the
//! same name. Re-running a migration therefore targets the object it created
//! the first time instead of creating a duplicate under a new name.

use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD as BASE64};
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::error::{CompileError, Result};

/// Length of a hashed name: base64 of a 20-byte SHA-1 digest, unpadded.
pub const HASHED_NAME_LENGTH: usize = 27;

/// The kind of object a name is generated for; used as the name's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// Plain index.
    Index,
    /// Unique constraint.
    Unique,
    /// Foreign key constraint.
    Foreign,
    /// Primary key constraint.
    Primary,
}

impl NameKind {
    /// Returns the suffix appended to generated names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Unique => "unique",
            Self::Foreign => "foreign",
            Self::Primary => "pkey",
        }
    }
}

/// Produces length-bounded names under a dialect's identifier limit.
///
/// Limits are in bytes: Oracle and PostgreSQL count identifier bytes, so a
/// short name in a multibyte script can still be over the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameResolver {
    max_length: usize,
}

impl NameResolver {
    /// Creates a resolver for the given identifier limit.
    #[must_use]
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Returns the identifier limit.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Returns `explicit` unchanged, or a generated name.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        kind: NameKind,
        table: &str,
        columns: &[String],
    ) -> Result<String> {
        match explicit {
            Some(name) => {
                if name.len() > self.max_length {
                    warn!(
                        name,
                        limit = self.max_length,
                        "Explicit name exceeds the identifier limit, leaving it unchanged"
                    );
                }
                Ok(name.to_string())
            }
            None => self.generate(kind, table, columns),
        }
    }

    /// Generates `<table>_<col1>_..._<kind>`, hashed when over the limit.
    pub fn generate(&self, kind: NameKind, table: &str, columns: &[String]) -> Result<String> {
        let candidate = candidate_name(kind, table, columns);
        if candidate.len() <= self.max_length {
            return Ok(candidate);
        }

        let hashed = hashed_name(&candidate);
        if hashed.len() > self.max_length {
            return Err(CompileError::NameTooLong {
                name: hashed,
                limit: self.max_length,
            });
        }
        warn!(
            candidate = %candidate,
            hashed = %hashed,
            limit = self.max_length,
            "Generated name exceeds the identifier limit, using its hash instead"
        );
        Ok(hashed)
    }
}

/// Builds the unbounded candidate name.
#[must_use]
pub fn candidate_name(kind: NameKind, table: &str, columns: &[String]) -> String {
    let table = table.replace(['.', '-'], "_");
    let mut name = table;
    for column in columns {
        name.push('_');
        name.push_str(column);
    }
    name.push('_');
    name.push_str(kind.suffix());
    name.to_lowercase()
}

/// Returns the fixed-length hash that stands in for an overlong name.
#[must_use]
pub fn hashed_name(candidate: &str) -> String {
    let digest = Sha1::digest(candidate.as_bytes());
    BASE64.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_candidate_shape() {
        assert_eq!(
            candidate_name(NameKind::Index, "users", &cols(&["email"])),
            "users_email_index"
        );
        assert_eq!(
            candidate_name(NameKind::Unique, "Public.User-Accounts", &cols(&["A", "b"])),
            "public_user_accounts_a_b_unique"
        );
        assert_eq!(candidate_name(NameKind::Primary, "users", &[]), "users_pkey");
    }

    #[test]
    fn test_short_names_are_kept() {
        let resolver = NameResolver::new(30);
        let name = resolver
            .generate(NameKind::Index, "users", &cols(&["email"]))
            .unwrap();
        assert_eq!(name, "users_email_index");
    }

    #[test]
    fn test_long_names_are_hashed_to_fixed_length() {
        let resolver = NameResolver::new(30);
        let columns = cols(&["first_name", "last_name", "date_of_birth"]);
        let name = resolver
            .generate(NameKind::Index, "customer_accounts", &columns)
            .unwrap();
        assert_eq!(name.len(), HASHED_NAME_LENGTH);
        assert!(name.len() <= resolver.max_length());
        assert_eq!(
            name,
            hashed_name("customer_accounts_first_name_last_name_date_of_birth_index")
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let resolver = NameResolver::new(30);
        let columns = cols(&["organization_id", "created_at"]);
        let first = resolver
            .generate(NameKind::Unique, "subscriptions", &columns)
            .unwrap();
        let second = resolver
            .generate(NameKind::Unique, "subscriptions", &columns)
            .unwrap();
        assert_eq!(first, second);

        let other_kind = resolver
            .generate(NameKind::Index, "subscriptions", &columns)
            .unwrap();
        assert_ne!(first, other_kind);
    }

    #[test]
    fn test_limit_at_candidate_length_is_not_hashed() {
        let candidate = "users_email_index";
        let resolver = NameResolver::new(candidate.len());
        let name = resolver
            .generate(NameKind::Index, "users", &cols(&["email"]))
            .unwrap();
        assert_eq!(name, candidate);
    }

    #[test]
    fn test_limit_counts_bytes_not_characters() {
        let resolver = NameResolver::new(30);
        let columns = cols(&["имя_колонки"]);
        let candidate = candidate_name(NameKind::Index, "тов", &columns);
        assert!(candidate.chars().count() <= 30);
        assert!(candidate.len() > 30);

        let name = resolver.generate(NameKind::Index, "тов", &columns).unwrap();
        assert_eq!(name, hashed_name(&candidate));
        assert!(name.len() <= 30);
    }

    #[test]
    fn test_limit_below_hash_length_is_fatal() {
        let resolver = NameResolver::new(10);
        let err = resolver
            .generate(NameKind::Index, "users", &cols(&["email"]))
            .unwrap_err();
        assert!(matches!(err, CompileError::NameTooLong { limit: 10, .. }));
    }

    #[test]
    fn test_explicit_name_is_unchanged() {
        let resolver = NameResolver::new(5);
        let name = resolver
            .resolve(Some("MyVeryLongIndexName"), NameKind::Index, "t", &[])
            .unwrap();
        assert_eq!(name, "MyVeryLongIndexName");
    }
}
