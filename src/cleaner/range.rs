use std::rc::Rc;

use super::keeper::Keeper;
use crate::collection::File;

/// An age window in seconds paired with the keeper deciding inside it.
///
/// Bounds are stored as given; which one is the lower bound is decided by
/// the stepwise cleaner. Keepers are shared, so several ranges may use the
/// same grouping state.
#[derive(Debug, Clone)]
pub struct Range {
    start: i64,
    end: i64,
    keeper: Rc<Keeper>,
}

impl Range {
    pub fn new(start: i64, end: i64, keeper: Rc<Keeper>) -> Self {
        Range { start, end, keeper }
    }

    pub fn with_keeper(start: i64, end: i64, keeper: Keeper) -> Self {
        Range::new(start, end, Rc::new(keeper))
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn keeper(&self) -> &Rc<Keeper> {
        &self.keeper
    }

    pub fn keep(&self, file: &File) -> bool {
        self.keeper.keep(file)
    }
}
