//! Synthetic delivery reporting.
//!
//! No delivery data is recorded anywhere, so reports are generated from an
//! RNG seeded by a digest of the query. Identical queries always produce
//! identical reports.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Error;
use crate::violations::Verdict;

pub mod endpoints;
pub use endpoints::*;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;
const TIME_SERIES_POINTS: i64 = 7;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeGrain {
    None,
    Day,
    Week,
    Month,
}

impl Default for TimeGrain {
    fn default() -> TimeGrain {
        TimeGrain::None
    }
}

impl TimeGrain {
    fn step_days(self) -> Option<i64> {
        match self {
            TimeGrain::None => None,
            TimeGrain::Day => Some(1),
            TimeGrain::Week => Some(7),
            TimeGrain::Month => Some(30),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    Impressions,
    Clicks,
    Spend,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Date,
    CampaignId,
    AssetGroupId,
    AdId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub time_grain: TimeGrain,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::Impressions]
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(flatten)]
    pub metrics: MetricValues,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetricValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
    /// In cents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend: Option<u64>,
}

impl MetricValues {
    fn slot(&mut self, metric: Metric) -> &mut Option<u64> {
        match metric {
            Metric::Impressions => &mut self.impressions,
            Metric::Clicks => &mut self.clicks,
            Metric::Spend => &mut self.spend,
        }
    }

    fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Spend => self.spend,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub totals: MetricValues,
    pub time_series: Option<Vec<ReportRow>>,
}

fn validate_query(query: &ReportQuery) -> Verdict {
    let mut verdict = Verdict::new();

    for (field, value) in [("startDate", &query.start_date), ("endDate", &query.end_date)] {
        let len = value.chars().count();
        if !(8..=32).contains(&len) {
            verdict.push(field, format!("{} must be 8 to 32 characters.", field));
        }
    }
    if query.limit < 1 || query.limit > MAX_LIMIT {
        verdict.push("limit", format!("limit must be between 1 and {}.", MAX_LIMIT));
    }

    verdict
}

/// Collapses the query into a seed. Filters are keyed in sorted order so
/// key order in the request does not matter.
fn seed_from_query(query: &ReportQuery) -> u64 {
    let filters = query
        .filters
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(",");
    let canonical = format!(
        "{}|{}|{:?}|{:?}|{:?}|{}|{}|{}",
        query.start_date,
        query.end_date,
        query.time_grain,
        query.metrics,
        query.dimensions,
        filters,
        query.limit,
        query.offset,
    );

    let digest = Sha256::digest(canonical.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(seed)
}

fn random_metric(rng: &mut StdRng, metric: Metric) -> u64 {
    match metric {
        Metric::Impressions => rng.gen_range(1_000..=100_000),
        Metric::Clicks => rng.gen_range(0..=5_000),
        Metric::Spend => rng.gen_range(100..=50_000),
    }
}

fn make_row(rng: &mut StdRng, query: &ReportQuery, date: Option<&str>) -> ReportRow {
    let mut row = ReportRow::default();

    for dimension in &query.dimensions {
        match dimension {
            Dimension::Date => {
                row.date = Some(date.unwrap_or(&query.start_date).to_owned());
            }
            Dimension::CampaignId => {
                row.campaign_id = Some(format!("campaign_{}", rng.gen_range(1..=50)));
            }
            Dimension::AssetGroupId => {
                row.asset_group_id = Some(format!("asset_group_{}", rng.gen_range(1..=100)));
            }
            Dimension::AdId => {
                row.ad_id = Some(format!("ad_{}", rng.gen_range(1..=200)));
            }
        }
    }

    for metric in &query.metrics {
        *row.metrics.slot(*metric) = Some(random_metric(rng, *metric));
    }

    row
}

fn time_series_origin() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 1, 1)
}

#[tracing::instrument]
pub fn run_report(query: &ReportQuery) -> Result<Report, Error> {
    Error::check("Report query validation failed", validate_query(query))?;

    let mut rng = StdRng::seed_from_u64(seed_from_query(query));

    let rows = (0..query.limit)
        .map(|_| make_row(&mut rng, query, None))
        .collect::<Vec<_>>();

    let mut totals = MetricValues::default();
    for metric in &query.metrics {
        let sum: u64 = rows.iter().filter_map(|row| row.metrics.get(*metric)).sum();
        *totals.slot(*metric) = Some(sum);
    }

    let time_series = match (query.time_grain.step_days(), time_series_origin()) {
        (Some(step), Some(origin)) => Some(
            (0..TIME_SERIES_POINTS)
                .map(|i| {
                    let date = (origin + Duration::days(i * step)).to_string();
                    let mut point = make_row(&mut rng, query, Some(&date));
                    point.date.get_or_insert(date);
                    point
                })
                .collect(),
        ),
        _ => None,
    };

    debug!(rows = rows.len(), "generated report");

    Ok(Report {
        rows,
        totals,
        time_series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ReportQuery {
        ReportQuery {
            start_date: "2025-01-01".into(),
            end_date: "2025-01-31".into(),
            time_grain: TimeGrain::None,
            metrics: vec![Metric::Impressions, Metric::Clicks],
            dimensions: vec![Dimension::CampaignId],
            filters: Map::new(),
            limit: 10,
            offset: 0,
        }
    }

    #[test]
    fn identical_queries_give_identical_reports() {
        assert_eq!(run_report(&query()).unwrap(), run_report(&query()).unwrap());
    }

    #[test]
    fn totals_sum_the_rows() {
        let report = run_report(&query()).unwrap();

        let impressions: u64 = report.rows.iter().filter_map(|r| r.metrics.impressions).sum();
        assert_eq!(report.rows.len(), 10);
        assert_eq!(report.totals.impressions, Some(impressions));
        assert_eq!(report.totals.spend, None);
        assert!(report.time_series.is_none());
        assert!(report.rows.iter().all(|r| r.campaign_id.is_some() && r.ad_id.is_none()));
    }

    #[test]
    fn weekly_series_steps_by_seven_days() {
        let report = run_report(&ReportQuery {
            time_grain: TimeGrain::Week,
            ..query()
        })
        .unwrap();

        let dates = report
            .time_series
            .unwrap()
            .into_iter()
            .map(|point| point.date.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], "2025-01-01");
        assert_eq!(dates[1], "2025-01-08");
        assert_eq!(dates[6], "2025-02-12");
    }

    #[test]
    fn limit_is_bounded() {
        let result = run_report(&ReportQuery {
            limit: 0,
            ..query()
        });

        match result.unwrap_err() {
            Error::ValidationFailed { violations, .. } => {
                assert_eq!(violations[0].field, "limit");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(run_report(&ReportQuery { limit: 1001, ..query() }).is_err());
    }

    #[test]
    fn metrics_stay_in_range() {
        let report = run_report(&ReportQuery {
            metrics: vec![Metric::Spend],
            limit: 200,
            ..query()
        })
        .unwrap();

        assert!(report
            .rows
            .iter()
            .all(|r| (100..=50_000).contains(&r.metrics.spend.unwrap())));
    }
}
