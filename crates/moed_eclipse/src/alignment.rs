//! Eclipse–feast alignment.

use chrono::NaiveDate;
use moed_calendar::FeastDay;

use crate::eclipse_types::{EclipseEvent, FeastAlignment};

/// Slack around a single-day feast, in days.
const SINGLE_DAY_TOLERANCE: i64 = 1;

/// The first feast in `feasts` that `date` aligns with.
///
/// A single-day feast matches within ±1 day; a range feast matches
/// anywhere within its inclusive span.
pub fn align_with_feast(date: NaiveDate, feasts: &[FeastDay]) -> Option<&FeastDay> {
    feasts.iter().find(|feast| {
        if feast.is_range {
            feast.contains(date)
        } else {
            (date - feast.start_date).num_days().abs() <= SINGLE_DAY_TOLERANCE
        }
    })
}

/// Every event in `events` that aligns with a feast, in event order.
pub fn feast_alignments(events: &[EclipseEvent], feasts: &[FeastDay]) -> Vec<FeastAlignment> {
    events
        .iter()
        .filter_map(|eclipse| {
            let day = eclipse.day();
            align_with_feast(day, feasts).map(|feast| FeastAlignment {
                eclipse: eclipse.clone(),
                feast: feast.clone(),
                offset_days: (day - feast.start_date).num_days(),
            })
        })
        .collect()
}
