//! archive (soft-delete) marks.

use serde::{Deserialize, Serialize};

/// soft-delete mark carried by every archivable entity.
///
/// a zero timestamp means the entity is active. archived entities remain
/// readable and listable (with `show_archived`) but reject further
/// mutation. the hash groups entities archived by one cascade so a restore
/// can tell its own casualties apart from independently archived records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMark {
    /// unix timestamp of archiving; 0 for active entities.
    pub timestamp: i64,
    /// random value shared by all entities archived in one cascade.
    pub hash: i64,
}

impl ArchiveMark {
    /// mark for an active (not archived) entity.
    pub const ACTIVE: ArchiveMark = ArchiveMark {
        timestamp: 0,
        hash: 0,
    };

    /// create a mark for the given archiving moment.
    pub fn new(timestamp: i64, hash: i64) -> Self {
        Self { timestamp, hash }
    }

    /// true if the entity carrying this mark is archived.
    pub fn is_archived(&self) -> bool {
        self.timestamp > 0
    }

    /// true if the entity carrying this mark is active.
    pub fn is_active(&self) -> bool {
        !self.is_archived()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_mark() {
        assert!(ArchiveMark::ACTIVE.is_active());
        assert!(!ArchiveMark::ACTIVE.is_archived());
    }

    #[test]
    fn test_archived_mark() {
        let mark = ArchiveMark::new(1700000000, 42);
        assert!(mark.is_archived());
        assert!(!mark.is_active());
    }
}
