//! Bucketed age distribution over the persisted population.
//!
//! Buckets: `< 20`, `[20, 40)`, `[40, 60]`, `> 60`. Percentages are derived
//! from the final counts and rounded half-up to two decimals independently,
//! so they need not add up to exactly 100.00.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{IngestError, IngestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    UnderTwenty,
    TwentyToForty,
    FortyToSixty,
    OverSixty,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::UnderTwenty,
        AgeBucket::TwentyToForty,
        AgeBucket::FortyToSixty,
        AgeBucket::OverSixty,
    ];

    pub fn classify(age: i64) -> Self {
        if age < 20 {
            AgeBucket::UnderTwenty
        } else if age < 40 {
            AgeBucket::TwentyToForty
        } else if age <= 60 {
            AgeBucket::FortyToSixty
        } else {
            AgeBucket::OverSixty
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            AgeBucket::UnderTwenty => "less_than_20",
            AgeBucket::TwentyToForty => "20_to_40",
            AgeBucket::FortyToSixty => "40_to_60",
            AgeBucket::OverSixty => "greater_than_60",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::UnderTwenty => "< 20",
            AgeBucket::TwentyToForty => "20 to 40",
            AgeBucket::FortyToSixty => "40 to 60",
            AgeBucket::OverSixty => "> 60",
        }
    }
}

/// One value per bucket, serialised under the bucket keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerBucket<T> {
    #[serde(rename = "less_than_20")]
    pub under_twenty: T,
    #[serde(rename = "20_to_40")]
    pub twenty_to_forty: T,
    #[serde(rename = "40_to_60")]
    pub forty_to_sixty: T,
    #[serde(rename = "greater_than_60")]
    pub over_sixty: T,
}

impl<T> PerBucket<T> {
    pub fn get(&self, bucket: AgeBucket) -> &T {
        match bucket {
            AgeBucket::UnderTwenty => &self.under_twenty,
            AgeBucket::TwentyToForty => &self.twenty_to_forty,
            AgeBucket::FortyToSixty => &self.forty_to_sixty,
            AgeBucket::OverSixty => &self.over_sixty,
        }
    }

    pub fn get_mut(&mut self, bucket: AgeBucket) -> &mut T {
        match bucket {
            AgeBucket::UnderTwenty => &mut self.under_twenty,
            AgeBucket::TwentyToForty => &mut self.twenty_to_forty,
            AgeBucket::FortyToSixty => &mut self.forty_to_sixty,
            AgeBucket::OverSixty => &mut self.over_sixty,
        }
    }

    fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerBucket<U> {
        PerBucket {
            under_twenty: f(&self.under_twenty),
            twenty_to_forty: f(&self.twenty_to_forty),
            forty_to_sixty: f(&self.forty_to_sixty),
            over_sixty: f(&self.over_sixty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    pub total_users: usize,
    #[serde(rename = "ageDistribution")]
    pub percentages: PerBucket<Decimal>,
    pub counts: PerBucket<usize>,
}

impl AgeDistribution {
    pub fn from_ages(ages: &[i64]) -> IngestResult<Self> {
        let mut accumulator = DistributionAccumulator::default();
        for &age in ages {
            accumulator.ingest(age);
        }
        accumulator.finish()
    }

    pub fn count(&self, bucket: AgeBucket) -> usize {
        *self.counts.get(bucket)
    }

    pub fn percentage(&self, bucket: AgeBucket) -> Decimal {
        *self.percentages.get(bucket)
    }

    /// Report rows of `[label, percent, count]` in bucket order.
    pub fn render_rows(&self) -> Vec<Vec<String>> {
        AgeBucket::ALL
            .iter()
            .map(|&bucket| {
                vec![
                    bucket.label().to_string(),
                    format!("{}%", self.percentage(bucket)),
                    self.count(bucket).to_string(),
                ]
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct DistributionAccumulator {
    total: usize,
    counts: PerBucket<usize>,
}

impl DistributionAccumulator {
    pub fn ingest(&mut self, age: i64) {
        *self.counts.get_mut(AgeBucket::classify(age)) += 1;
        self.total += 1;
    }

    pub fn finish(self) -> IngestResult<AgeDistribution> {
        if self.total == 0 {
            return Err(IngestError::NoData);
        }
        let total = self.total;
        Ok(AgeDistribution {
            total_users: total,
            percentages: self.counts.map(|&count| percentage(count, total)),
            counts: self.counts,
        })
    }
}

fn percentage(count: usize, total: usize) -> Decimal {
    let share = Decimal::from(count as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64);
    let mut rounded = share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
