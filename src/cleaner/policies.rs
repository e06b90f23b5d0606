use chrono::{DateTime, Duration, Local};

use crate::collection::{File, FileCollection};

/// Keep the `amount` newest backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    pub amount: usize,
}

impl Quantity {
    pub(crate) fn select(&self, collection: &FileCollection) -> Vec<File> {
        let mut discard: Vec<File> = collection
            .newest_first()
            .skip(self.amount)
            .cloned()
            .collect();
        discard.reverse();
        discard
    }
}

/// Discard backups older than `older_than`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outdated {
    pub older_than: Duration,
}

impl Outdated {
    pub(crate) fn select(&self, collection: &FileCollection, now: DateTime<Local>) -> Vec<File> {
        let limit = self.older_than.num_seconds();
        collection
            .oldest_first()
            .filter(|file| file.age_at(now) > limit)
            .cloned()
            .collect()
    }
}

/// Discard the oldest backups until the rest fit into `max_size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_size: u64,
}

impl Capacity {
    pub(crate) fn select(&self, collection: &FileCollection) -> Vec<File> {
        let mut total = collection.total_size();
        let mut discard = Vec::new();
        for file in collection.oldest_first() {
            if total <= self.max_size {
                break;
            }
            total = total.saturating_sub(file.size());
            discard.push(file.clone());
        }
        discard
    }
}
