//! Snapshot description of a single stored resource.

use std::time::Duration;

/// A resource as seen at snapshot time.
///
/// Carries no identity beyond `id`; the snapshot is discarded after it has
/// been evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord<Id> {
    /// Identifier understood by the storage the record came from.
    pub id: Id,

    /// Time passed since the resource was last written.
    pub age: Duration,
}

impl<Id> ResourceRecord<Id> {
    pub fn new(id: Id, age: Duration) -> Self {
        Self { id, age }
    }
}
