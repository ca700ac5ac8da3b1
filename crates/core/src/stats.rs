//! Statistics snapshot and the fold that builds it from counters and raw records.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::parse_counter_key;
use crate::record::{EventFields, Scalar};

/// Dashboard statistics, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub version_selections: BTreeMap<String, u64>,
    pub install_clicks: BTreeMap<String, u64>,
    pub install_success: BTreeMap<String, u64>,
    pub install_failed: BTreeMap<String, u64>,
    pub daily_stats: BTreeMap<String, u64>,
    pub monthly_stats: BTreeMap<String, u64>,
    pub hourly_stats: BTreeMap<u32, u64>,
    pub weekday_stats: BTreeMap<u32, u64>,
    pub countries: BTreeMap<String, u64>,
    pub browsers: BTreeMap<String, u64>,
    pub devices: BTreeMap<String, u64>,
    pub referrers: BTreeMap<String, u64>,
    /// Percentage with one decimal, e.g. "5.0".
    pub conversion_rate: String,
    pub geographic_reach: u64,
    pub avg_time_on_page: u64,
}

/// Accumulates counters and event records into a [`StatsSnapshot`].
///
/// Input order does not matter.
#[derive(Debug, Default)]
pub struct StatsBuilder {
    page_views: u64,
    version_selections: BTreeMap<String, u64>,
    install_clicks: BTreeMap<String, u64>,
    install_success: BTreeMap<String, u64>,
    install_failed: BTreeMap<String, u64>,
    daily_stats: BTreeMap<String, u64>,
    monthly_stats: BTreeMap<String, u64>,
    hourly_stats: BTreeMap<u32, u64>,
    weekday_stats: BTreeMap<u32, u64>,
    countries: BTreeMap<String, u64>,
    browsers: BTreeMap<String, u64>,
    devices: BTreeMap<String, u64>,
    referrers: BTreeMap<String, u64>,
    time_on_page: Vec<f64>,
    events_folded: u64,
}

fn bump<K: Ord>(map: &mut BTreeMap<K, u64>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}

/// Counter values that fail to parse count as zero.
pub fn parse_counter_value(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0)
}

impl StatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one counter key and its stored value.
    ///
    /// Keys that do not parse and event types without a dashboard slot are ignored.
    pub fn fold_counter(&mut self, key: &str, value: Option<&str>) {
        let Some((event, version)) = parse_counter_key(key) else {
            return;
        };
        let count = parse_counter_value(value);

        let target = match event {
            "page_view" => {
                self.page_views += count;
                return;
            }
            "version_selected" => &mut self.version_selections,
            "install_click" => &mut self.install_clicks,
            "install_success" => &mut self.install_success,
            "install_failed" => &mut self.install_failed,
            _ => return,
        };
        *target.entry(version.to_string()).or_insert(0) += count;
    }

    /// Fold one raw stored record.
    ///
    /// Returns [`Error::Schema`] when the record is malformed; the builder is
    /// left untouched in that case and callers skip the record.
    pub fn fold_event(&mut self, raw: &str) -> Result<()> {
        let fields = EventFields::from_stored(raw)?;
        let timestamp = fields
            .get("timestamp")
            .and_then(Scalar::as_str)
            .ok_or_else(|| Error::schema("record has no string timestamp"))?;

        let parsed = DateTime::parse_from_rfc3339(timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc));
        let date = timestamp.split('T').next().unwrap_or(timestamp);

        let hour = stored_in_range(&fields, "hour", 23).or_else(|| parsed.map(|t| t.hour()));
        let weekday = stored_in_range(&fields, "dayOfWeek", 6)
            .or_else(|| parsed.map(|t| t.weekday().num_days_from_sunday()));
        let month = fields
            .str_field("month")
            .map(str::to_string)
            .or_else(|| parsed.map(|t| t.format("%Y-%m").to_string()));

        let label = |key: &str, default: &str| {
            fields.str_field(key).unwrap_or(default).to_string()
        };

        if fields.str_field("event") == Some("page_view") {
            bump(&mut self.daily_stats, date.to_string());
            if let Some(month) = month {
                bump(&mut self.monthly_stats, month);
            }
            bump(&mut self.referrers, label("referrer", "Direct"));
        }

        if let Some(hour) = hour {
            bump(&mut self.hourly_stats, hour);
        }
        if let Some(weekday) = weekday {
            bump(&mut self.weekday_stats, weekday);
        }
        bump(&mut self.countries, label("country", "Unknown"));
        bump(&mut self.browsers, label("browser", "Unknown"));
        bump(&mut self.devices, label("device", "Unknown"));

        // Negative durations are client bugs and stay out of the mean
        if let Some(t) = fields
            .get("timeOnPage")
            .and_then(Scalar::as_f64)
            .filter(|t| *t >= 0.0)
        {
            self.time_on_page.push(t);
        }

        self.events_folded += 1;
        Ok(())
    }

    /// Number of records folded so far.
    pub fn events_folded(&self) -> u64 {
        self.events_folded
    }

    pub fn finish(self, unique_visitors: u64) -> StatsSnapshot {
        let clicks: u64 = self.install_clicks.values().sum();
        let conversion_rate = if self.page_views == 0 {
            "0.0".to_string()
        } else {
            // Tenths of a percent, halves rounded up
            let tenths = (clicks as u128 * 2000 + self.page_views as u128)
                / (self.page_views as u128 * 2);
            format!("{}.{}", tenths / 10, tenths % 10)
        };

        let avg_time_on_page = if self.time_on_page.is_empty() {
            0
        } else {
            let mean = self.time_on_page.iter().sum::<f64>() / self.time_on_page.len() as f64;
            mean.round() as u64
        };

        StatsSnapshot {
            page_views: self.page_views,
            unique_visitors,
            geographic_reach: self.countries.len() as u64,
            version_selections: self.version_selections,
            install_clicks: self.install_clicks,
            install_success: self.install_success,
            install_failed: self.install_failed,
            daily_stats: self.daily_stats,
            monthly_stats: self.monthly_stats,
            hourly_stats: self.hourly_stats,
            weekday_stats: self.weekday_stats,
            countries: self.countries,
            browsers: self.browsers,
            devices: self.devices,
            referrers: self.referrers,
            conversion_rate,
            avg_time_on_page,
        }
    }
}

fn stored_in_range(fields: &EventFields, key: &str, max: u32) -> Option<u32> {
    let n = fields.get(key).and_then(Scalar::as_f64)?;
    (n.fract() == 0.0 && (0.0..=max as f64).contains(&n)).then_some(n as u32)
}
