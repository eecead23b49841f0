//! Recurring-schedule projection.
//!
//! Expands a ward's weekly collection rules into a concrete calendar for a
//! rolling N-day window. Pure and deterministic given `today`.

use chrono::{Days, NaiveDate};

use crate::types::{CollectionRule, DayLabel, ProjectedEvent, WasteType, Weekday};

/// Horizon used by the forward-looking schedule view.
pub const HORIZON_WEEK: usize = 7;

/// Project `rules` onto the next `horizon_days` calendar days starting at
/// `today`.
///
/// Returns exactly `horizon_days` events. Each event carries the rules whose
/// day matches that date's weekday or is `All`, in the input order of
/// `rules`. An empty rule list yields events with empty collections.
#[must_use]
pub fn project(
    rules: &[CollectionRule],
    today: NaiveDate,
    horizon_days: usize,
) -> Vec<ProjectedEvent> {
    (0..horizon_days)
        .map(|offset| {
            let date = today
                .checked_add_days(Days::new(offset as u64))
                .unwrap_or(NaiveDate::MAX);
            let weekday = Weekday::of(date);
            let day_label = match offset {
                0 => DayLabel::Today,
                1 => DayLabel::Tomorrow,
                _ => DayLabel::Weekday(weekday),
            };
            let collections = rules
                .iter()
                .filter(|rule| rule.day.matches(weekday))
                .cloned()
                .collect();
            ProjectedEvent {
                date,
                weekday,
                day_label,
                collections,
            }
        })
        .collect()
}

/// Rules that apply today, in input order. The horizon-1 projection.
#[must_use]
pub fn today_collections(rules: &[CollectionRule], today: NaiveDate) -> Vec<CollectionRule> {
    project(rules, today, 1)
        .pop()
        .map(|event| event.collections)
        .unwrap_or_default()
}

/// Waste types scheduled for collection today, deduplicated in first-seen
/// order. Populates the report form's allowed waste types.
#[must_use]
pub fn today_waste_types(rules: &[CollectionRule], today: NaiveDate) -> Vec<WasteType> {
    let mut seen = Vec::new();
    for rule in today_collections(rules, today) {
        if !seen.contains(&rule.waste_type) {
            seen.push(rule.waste_type);
        }
    }
    seen
}
