//! Ordered violation list

use serde::Serialize;

use super::violation::Violation;
use crate::core::BoardCheckError;

/// Ordered collection of violations from one scan
///
/// Growth is fallible: an allocation failure surfaces as
/// [`BoardCheckError::Allocation`] instead of aborting the process.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ViolationList {
    items: Vec<Violation>,
    #[serde(skip)]
    duplicates: usize,
}

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Violation> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    /// Number of appends rejected by [`push_unique`](Self::push_unique)
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.items.iter().any(|v| v == violation)
    }

    pub fn push(&mut self, violation: Violation) -> Result<(), BoardCheckError> {
        self.items
            .try_reserve(1)
            .map_err(|_| BoardCheckError::Allocation)?;
        self.items.push(violation);
        Ok(())
    }

    /// Append unless an equal violation is already present
    ///
    /// Returns whether the violation was stored; rejected ones bump the
    /// duplicate counter.
    pub fn push_unique(&mut self, violation: Violation) -> Result<bool, BoardCheckError> {
        if self.contains(&violation) {
            self.duplicates += 1;
            return Ok(false);
        }
        self.push(violation)?;
        Ok(true)
    }

    /// Insert at `index`, clamped to the list length
    pub fn insert(&mut self, index: usize, violation: Violation) -> Result<(), BoardCheckError> {
        self.items
            .try_reserve(1)
            .map_err(|_| BoardCheckError::Allocation)?;
        let index = index.min(self.items.len());
        self.items.insert(index, violation);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
