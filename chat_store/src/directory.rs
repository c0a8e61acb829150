use std::sync::Arc;

use alloy::primitives::Address;

/// Registered addresses in registration order.
///
/// The list sits behind an `Arc` so snapshots can be handed out without
/// copying; a push after a snapshot was taken clones the list once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: Arc<Vec<Address>>,
}

impl Directory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            entries: Arc::clone(&self.entries),
        }
    }

    pub(crate) fn push(&mut self, address: Address) {
        Arc::make_mut(&mut self.entries).push(address);
    }
}

/// Frozen view of the directory. Iterating it any number of times yields the
/// same addresses in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    entries: Arc<Vec<Address>>,
}

impl DirectorySnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains(address)
    }

    pub fn to_vec(&self) -> Vec<Address> {
        self.entries.as_ref().clone()
    }
}

impl<'a> IntoIterator for &'a DirectorySnapshot {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for DirectorySnapshot {
    type Item = Address;
    type IntoIter = DirectoryIter;

    fn into_iter(self) -> Self::IntoIter {
        DirectoryIter {
            entries: self.entries,
            pos: 0,
        }
    }
}

pub struct DirectoryIter {
    entries: Arc<Vec<Address>>,
    pos: usize,
}

impl Iterator for DirectoryIter {
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.entries.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.entries.len() - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for DirectoryIter {}
