//! Per-meal booking summary.
//!
//! Meal codes with zero bookings are omitted. Keys are sorted so serialized
//! output is stable.

use crate::model::booking::BookingRecord;
use crate::model::meal::MealChoice;
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of bookings for one meal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub total_passengers: usize,
    /// Keyed by meal code.
    pub meal_summary: BTreeMap<String, MealCount>,
}

impl BookingSummary {
    /// Entries ordered by descending count, then code.
    pub fn by_count(&self) -> Vec<(&str, &MealCount)> {
        let mut entries: Vec<_> = self
            .meal_summary
            .iter()
            .map(|(code, count)| (code.as_str(), count))
            .collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

pub fn summarize(records: &[BookingRecord]) -> BookingSummary {
    let mut counts: BTreeMap<&MealChoice, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(&record.dietary_option).or_default() += 1;
    }

    let meal_summary = counts
        .into_iter()
        .map(|(meal, count)| {
            (
                meal.code().to_string(),
                MealCount {
                    label: meal.label().to_string(),
                    count,
                },
            )
        })
        .collect();

    BookingSummary {
        total_passengers: records.len(),
        meal_summary,
    }
}
