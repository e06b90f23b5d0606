use std::cell::RefCell;
use std::collections::HashMap;

use crate::collection::File;
use crate::date_format;

/// Retention predicate applied to the files of one range.
#[derive(Debug)]
pub enum Keeper {
    /// Keep nothing.
    None,
    /// Keep everything.
    All,
    /// Keep the first file seen per date group.
    OnePerGroup(OnePerGroup),
}

impl Keeper {
    pub fn one_per_group(group_format: impl Into<String>) -> Self {
        Keeper::OnePerGroup(OnePerGroup::new(group_format))
    }

    /// Same rule with no files seen yet.
    pub fn fresh(&self) -> Keeper {
        match self {
            Keeper::None => Keeper::None,
            Keeper::All => Keeper::All,
            Keeper::OnePerGroup(groups) => Keeper::one_per_group(groups.group_format()),
        }
    }

    pub fn keep(&self, file: &File) -> bool {
        match self {
            Keeper::None => false,
            Keeper::All => true,
            Keeper::OnePerGroup(groups) => groups.keep(file),
        }
    }
}

/// Groups files by their modification date formatted with `group_format`
/// (`Ymd` groups per day, `Ym` per month, ...).
///
/// Only the first file presented for a group is kept. The group map lives as
/// long as the keeper, so callers must present files in a stable order.
#[derive(Debug)]
pub struct OnePerGroup {
    group_format: String,
    groups: RefCell<HashMap<String, Vec<File>>>,
}

impl OnePerGroup {
    pub fn new(group_format: impl Into<String>) -> Self {
        OnePerGroup {
            group_format: group_format.into(),
            groups: RefCell::new(HashMap::new()),
        }
    }

    pub fn group_format(&self) -> &str {
        &self.group_format
    }

    pub fn keep(&self, file: &File) -> bool {
        let group = date_format::format(&self.group_format, &file.modified());
        let mut groups = self.groups.borrow_mut();
        let members = groups.entry(group).or_default();
        members.push(file.clone());
        members.len() < 2
    }

    /// Number of distinct groups seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.borrow().len()
    }
}
