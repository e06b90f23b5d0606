use std::rc::Rc;

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::keeper::Keeper;
use super::range::Range;
use crate::collection::{File, FileCollection};

/// Thins out backups step by step: the older a backup, the coarser the
/// grouping of the backups that survive.
#[derive(Debug, Default)]
pub struct Stepwise {
    ranges: Vec<Range>,
}

/// A clone starts with fresh keepers. Ranges sharing a keeper in the source
/// share the new one in the clone.
impl Clone for Stepwise {
    fn clone(&self) -> Self {
        let mut renewed: Vec<(Rc<Keeper>, Rc<Keeper>)> = Vec::new();
        let ranges = self
            .ranges
            .iter()
            .map(|range| {
                let shared = renewed
                    .iter()
                    .find(|(old, _)| Rc::ptr_eq(old, range.keeper()));
                let keeper = match shared {
                    Some((_, fresh)) => Rc::clone(fresh),
                    None => {
                        let fresh = Rc::new(range.keeper().fresh());
                        renewed.push((Rc::clone(range.keeper()), Rc::clone(&fresh)));
                        fresh
                    }
                };
                Range::new(range.start(), range.end(), keeper)
            })
            .collect();
        Stepwise { ranges }
    }
}

impl Stepwise {
    /// Ranges are evaluated in the order given; the first one containing a
    /// file's age decides.
    pub fn new(ranges: Vec<Range>) -> Self {
        Stepwise { ranges }
    }

    /// Build the usual keep-all / daily / weekly / monthly / yearly ladder.
    ///
    /// Steps end on local midnight boundaries counted back from `now`.
    /// Steps configured with zero days are skipped. Everything older than
    /// the last step is discarded.
    pub fn from_policy(policy: &StepwisePolicy, now: DateTime<Local>) -> Self {
        let steps = [
            (policy.keep_all_days, Keeper::All),
            (policy.keep_daily_days, Keeper::one_per_group("Ymd")),
            (policy.keep_weekly_days, Keeper::one_per_group("oW")),
            (policy.keep_monthly_days, Keeper::one_per_group("Ym")),
            (policy.keep_yearly_days, Keeper::one_per_group("Y")),
        ];

        let mut ranges = Vec::with_capacity(steps.len() + 1);
        let mut boundary = now;
        let mut start = 0;
        for (days, keeper) in steps {
            if days == 0 {
                continue;
            }
            boundary = midnight_days_before(boundary, days);
            let end = now.signed_duration_since(boundary).num_seconds();
            ranges.push(Range::with_keeper(start, end, keeper));
            start = end;
        }
        ranges.push(Range::with_keeper(start, i64::MAX, Keeper::None));

        Stepwise::new(ranges)
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Files the ranges discard. Files are presented oldest first; a file
    /// whose age falls into no range is kept.
    pub(crate) fn select(&self, collection: &FileCollection, now: DateTime<Local>) -> Vec<File> {
        let mut discard = Vec::new();
        for file in collection.oldest_first() {
            let age = file.age_at(now);
            match self.ranges.iter().find(|range| window_contains(range, age)) {
                Some(range) => {
                    if !range.keep(file) {
                        discard.push(file.clone());
                    }
                }
                None => {
                    log::debug!(
                        "Keeping {}: age {}s is outside every range",
                        file.path().display(),
                        age
                    );
                }
            }
        }
        discard
    }
}

/// `[min(start, end), max(start, end))`
fn window_contains(range: &Range, age: i64) -> bool {
    let lower = range.start().min(range.end());
    let upper = range.start().max(range.end());
    age >= lower && age < upper
}

fn midnight_days_before(at: DateTime<Local>, days: u32) -> DateTime<Local> {
    let date = at
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&midnight))
}

/// Day counts for each step of the ladder built by [`Stepwise::from_policy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepwisePolicy {
    #[serde(default)]
    pub keep_all_days: u32,
    #[serde(default)]
    pub keep_daily_days: u32,
    #[serde(default)]
    pub keep_weekly_days: u32,
    #[serde(default)]
    pub keep_monthly_days: u32,
    #[serde(default)]
    pub keep_yearly_days: u32,
}
