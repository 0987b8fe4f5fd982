//! Series selection: apply a [`SelectionRule`] to a [`TimeSeries`].
//!
//! Every rule selects a suffix of the series (dates are strictly increasing,
//! so a calendar cutoff is a suffix too). `TrailingCount(n)` counts entries,
//! not calendar days: on a sparse series a 30-entry window can span far more
//! than 30 days.
//!
//! A rule that matches nothing never blanks the display. The whole series is
//! returned instead, together with a [`SelectionFellBack`] note.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{SelectionRule, TimeSeries};

/// Non-fatal signal: the rule matched no entries and the full series was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFellBack {
    pub rule: SelectionRule,
    /// Entries in the substituted (full) series.
    pub substituted: usize,
}

/// Output of [`select`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub series: TimeSeries,
    pub fell_back: Option<SelectionFellBack>,
}

/// Select the sub-series a rule asks for.
pub fn select(series: &TimeSeries, rule: SelectionRule) -> Selection {
    let start = match rule {
        SelectionRule::TrailingCount { count } => series.len() - count.min(series.len()),
        SelectionRule::CalendarCutoff { date } => series.dates().partition_point(|d| *d < date),
        SelectionRule::All => 0,
    };

    match series.suffix(start) {
        Some(selected) => {
            debug!(%rule, selected = selected.len(), total = series.len(), "selected sub-series");
            Selection {
                series: selected,
                fell_back: None,
            }
        }
        None => {
            warn!(%rule, total = series.len(), "selection matched no entries, using the full series");
            Selection {
                series: series.clone(),
                fell_back: Some(SelectionFellBack {
                    rule,
                    substituted: series.len(),
                }),
            }
        }
    }
}
