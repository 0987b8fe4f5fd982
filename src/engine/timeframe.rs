//! Timeframe resolution: token -> selection rule.
//!
//! Day counts and cutoff dates live in exactly one place, the
//! [`TimeframeTable`], which is built once at startup (built-in defaults or a
//! JSON file) and then only read.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{SelectionRule, TimeframeToken};
use crate::error::{AppError, ForecastError};

/// One row of the timeframe table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeEntry {
    pub token: TimeframeToken,
    /// Display label, e.g. `"30D"` or `"1M"`.
    pub label: String,
    pub rule: SelectionRule,
}

/// Ordered timeframe configuration. Entry order is display order; the first
/// entry is the default selection.
///
/// Always non-empty with unique tokens and labels; deserialization goes
/// through the same validation as [`TimeframeTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeframeTable")]
pub struct TimeframeTable {
    timeframes: Vec<TimeframeEntry>,
}

/// Unvalidated wire shape of [`TimeframeTable`].
#[derive(Deserialize)]
struct RawTimeframeTable {
    timeframes: Vec<TimeframeEntry>,
}

impl TryFrom<RawTimeframeTable> for TimeframeTable {
    type Error = ForecastError;

    fn try_from(raw: RawTimeframeTable) -> Result<Self, Self::Error> {
        Self::new(raw.timeframes)
    }
}

impl Default for TimeframeTable {
    fn default() -> Self {
        let trailing = |token, label: &str, count| TimeframeEntry {
            token,
            label: label.to_string(),
            rule: SelectionRule::TrailingCount { count },
        };
        Self {
            timeframes: vec![
                trailing(TimeframeToken::Shortest, "15D", 15),
                trailing(TimeframeToken::Short, "30D", 30),
                trailing(TimeframeToken::Medium, "45D", 45),
                trailing(TimeframeToken::Long, "60D", 60),
                TimeframeEntry {
                    token: TimeframeToken::All,
                    label: "ALL".to_string(),
                    rule: SelectionRule::All,
                },
            ],
        }
    }
}

impl TimeframeTable {
    pub fn new(timeframes: Vec<TimeframeEntry>) -> Result<Self, ForecastError> {
        let table = Self { timeframes };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ForecastError> {
        serde_json::from_str(raw).map_err(|e| ForecastError::InvalidTimeframeTable(e.to_string()))
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open timeframe table '{}': {e}", path.display()))
        })?;
        let table = serde_json::from_reader(file)
            .map_err(|e| ForecastError::InvalidTimeframeTable(format!("{}: {e}", path.display())))?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), ForecastError> {
        if self.timeframes.is_empty() {
            return Err(ForecastError::InvalidTimeframeTable("no timeframes configured".to_string()));
        }

        let mut tokens = HashSet::new();
        let mut labels = HashSet::new();
        for entry in &self.timeframes {
            if !tokens.insert(entry.token) {
                return Err(ForecastError::InvalidTimeframeTable(format!(
                    "token '{}' listed twice",
                    entry.token
                )));
            }
            let label = entry.label.trim().to_ascii_lowercase();
            if label.is_empty() {
                return Err(ForecastError::InvalidTimeframeTable(format!(
                    "token '{}' has an empty label",
                    entry.token
                )));
            }
            if !labels.insert(label) {
                return Err(ForecastError::InvalidTimeframeTable(format!(
                    "label '{}' listed twice",
                    entry.label
                )));
            }
            if entry.rule == (SelectionRule::TrailingCount { count: 0 }) {
                return Err(ForecastError::InvalidTimeframeTable(format!(
                    "token '{}' has a trailing count of 0",
                    entry.token
                )));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[TimeframeEntry] {
        &self.timeframes
    }

    /// Tokens in display order.
    pub fn tokens(&self) -> impl Iterator<Item = TimeframeToken> + '_ {
        self.timeframes.iter().map(|e| e.token)
    }

    /// First entry's token. Tables are never empty; `All` is the fallback.
    pub fn default_token(&self) -> TimeframeToken {
        self.timeframes.first().map(|e| e.token).unwrap_or(TimeframeToken::All)
    }

    fn entry(&self, token: TimeframeToken) -> Option<&TimeframeEntry> {
        self.timeframes.iter().find(|e| e.token == token)
    }

    /// Resolve a token to its selection rule.
    pub fn resolve(&self, token: TimeframeToken) -> Result<SelectionRule, ForecastError> {
        self.entry(token)
            .map(|e| e.rule)
            .ok_or_else(|| ForecastError::UnknownTimeframe(token.to_string()))
    }

    /// Resolve a token, defaulting to [`SelectionRule::All`] when the table
    /// does not list it. Callers in the display path use this so the error
    /// never reaches the viewer.
    pub fn resolve_or_all(&self, token: TimeframeToken) -> SelectionRule {
        match self.resolve(token) {
            Ok(rule) => rule,
            Err(err) => {
                warn!(%token, "{err} Falling back to all entries.");
                SelectionRule::All
            }
        }
    }

    /// Display label for a token (the token name when the table omits it).
    pub fn label(&self, token: TimeframeToken) -> &str {
        self.entry(token).map(|e| e.label.as_str()).unwrap_or(token.as_str())
    }

    /// Match user input against labels and token names (case-insensitive).
    pub fn parse_token(&self, input: &str) -> Result<TimeframeToken, ForecastError> {
        let needle = input.trim();
        self.timeframes
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(needle) || e.token.as_str().eq_ignore_ascii_case(needle))
            .map(|e| e.token)
            .ok_or_else(|| ForecastError::UnknownTimeframe(needle.to_string()))
    }

    /// Next token in display order (wraps around).
    pub fn next(&self, token: TimeframeToken) -> TimeframeToken {
        self.step(token, 1)
    }

    /// Previous token in display order (wraps around).
    pub fn prev(&self, token: TimeframeToken) -> TimeframeToken {
        self.step(token, self.timeframes.len().saturating_sub(1))
    }

    fn step(&self, token: TimeframeToken, by: usize) -> TimeframeToken {
        let n = self.timeframes.len();
        self.timeframes
            .iter()
            .position(|e| e.token == token)
            .and_then(|i| self.timeframes.get((i + by) % n))
            .map(|e| e.token)
            .unwrap_or_else(|| self.default_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_table_is_trailing_counts_then_all() {
        let table = TimeframeTable::default();
        assert_eq!(table.default_token(), TimeframeToken::Shortest);
        assert_eq!(
            table.resolve(TimeframeToken::Short).unwrap(),
            SelectionRule::TrailingCount { count: 30 }
        );
        assert_eq!(table.resolve(TimeframeToken::All).unwrap(), SelectionRule::All);
        assert_eq!(table.tokens().collect::<Vec<_>>(), TimeframeToken::ALL_TOKENS.to_vec());
    }

    #[test]
    fn missing_token_is_unknown_but_display_path_defaults_to_all() {
        let table = TimeframeTable::new(vec![TimeframeEntry {
            token: TimeframeToken::Short,
            label: "1M".to_string(),
            rule: SelectionRule::TrailingCount { count: 30 },
        }])
        .unwrap();

        assert_eq!(
            table.resolve(TimeframeToken::Long),
            Err(ForecastError::UnknownTimeframe("long".to_string()))
        );
        assert_eq!(table.resolve_or_all(TimeframeToken::Long), SelectionRule::All);
    }

    #[test]
    fn parses_labels_and_token_names() {
        let table = TimeframeTable::default();
        assert_eq!(table.parse_token("30d").unwrap(), TimeframeToken::Short);
        assert_eq!(table.parse_token(" ALL ").unwrap(), TimeframeToken::All);
        assert_eq!(table.parse_token("medium").unwrap(), TimeframeToken::Medium);
        assert!(matches!(table.parse_token("7Y"), Err(ForecastError::UnknownTimeframe(_))));
    }

    #[test]
    fn loads_json_with_calendar_cutoffs() {
        let raw = r#"{
            "timeframes": [
                {"token": "short", "label": "1M", "rule": {"kind": "calendar_cutoff", "date": "2024-12-02"}},
                {"token": "all", "label": "ALL", "rule": {"kind": "all"}}
            ]
        }"#;
        let table = TimeframeTable::from_json_str(raw).unwrap();
        assert_eq!(table.default_token(), TimeframeToken::Short);
        assert_eq!(table.label(TimeframeToken::Short), "1M");
        assert_eq!(
            table.resolve(TimeframeToken::Short).unwrap(),
            SelectionRule::CalendarCutoff {
                date: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap()
            }
        );
    }

    #[test]
    fn rejects_duplicate_tokens_and_zero_counts() {
        let dup = r#"{"timeframes": [
            {"token": "all", "label": "A", "rule": {"kind": "all"}},
            {"token": "all", "label": "B", "rule": {"kind": "all"}}
        ]}"#;
        assert!(matches!(
            TimeframeTable::from_json_str(dup),
            Err(ForecastError::InvalidTimeframeTable(_))
        ));

        let zero = r#"{"timeframes": [
            {"token": "short", "label": "0D", "rule": {"kind": "trailing_count", "count": 0}}
        ]}"#;
        assert!(TimeframeTable::from_json_str(zero).is_err());
        assert!(TimeframeTable::from_json_str(r#"{"timeframes": []}"#).is_err());
    }

    #[test]
    fn plain_serde_deserialization_validates_too() {
        let empty = serde_json::from_str::<TimeframeTable>(r#"{"timeframes": []}"#);
        assert!(empty.unwrap_err().to_string().contains("no timeframes configured"));

        let dup = r#"{"timeframes": [
            {"token": "all", "label": "A", "rule": {"kind": "all"}},
            {"token": "all", "label": "B", "rule": {"kind": "all"}}
        ]}"#;
        assert!(serde_json::from_str::<TimeframeTable>(dup).is_err());

        #[derive(Deserialize)]
        struct Config {
            table: TimeframeTable,
        }
        let nested = serde_json::from_str::<Config>(r#"{"table": {"timeframes": []}}"#);
        assert!(nested.is_err());

        let raw = serde_json::to_string(&TimeframeTable::default()).unwrap();
        let back: TimeframeTable = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.default_token(), TimeframeToken::Shortest);
    }

    #[test]
    fn cycling_wraps_in_display_order() {
        let table = TimeframeTable::default();
        assert_eq!(table.next(TimeframeToken::All), TimeframeToken::Shortest);
        assert_eq!(table.prev(TimeframeToken::Shortest), TimeframeToken::All);
        assert_eq!(table.next(TimeframeToken::Short), TimeframeToken::Medium);
    }
}
