//! Field-level input validation.
//!
//! A [`Validator`] is built fresh for each input, fed a sequence of checks and
//! then turned into a result. Only the first failure per field is retained.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

/// Field name to first recorded error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Errors consisting of a single field failure.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.0.insert(field.to_string(), message.to_string());
        errors
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates field errors for one validation pass.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Record an error unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Finish the pass.
    ///
    /// # Errors
    /// Returns the collected errors when any check failed
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.valid() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// True when `value` contains something other than whitespace.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True when `value` is a syntactically valid email address.
pub fn is_email(value: &str) -> bool {
    email_address::EmailAddress::is_valid(value)
}

/// True when the byte length of `value` lies in `min..=max`.
pub fn length_within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len())
}

/// True when no element of `values` appears twice.
pub fn all_unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}
