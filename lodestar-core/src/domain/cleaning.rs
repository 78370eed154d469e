// lodestar-core/src/domain/cleaning.rs
//
// Cleaning & KPI derivation. Order matters and is part of the contract:
// dedup -> price filter -> null normalization -> KPI derivation -> late
// 99th-percentile price cap. The cap runs AFTER the percentile ranks are
// computed, so the top percentile bucket may end up under-populated. That
// is the upstream data-shaping choice and it is preserved as-is.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::listing::{CleanedListing, PriceBucket, RawListing, RevenueTier};

pub const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CleaningConfig {
    /// Listings above this nightly price are dropped as invalid.
    #[serde(rename = "max-price", default = "default_max_price")]
    #[validate(range(min = 1.0))]
    pub max_price: f64,

    /// Quantile of the final price cap (applied after KPI derivation).
    #[serde(rename = "percentile-cap", default = "default_percentile_cap")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub percentile_cap: f64,
}

fn default_max_price() -> f64 {
    1000.0
}
fn default_percentile_cap() -> f64 {
    0.99
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            max_price: default_max_price(),
            percentile_cap: default_percentile_cap(),
        }
    }
}

/// Turns raw rows into cleaned listings with derived KPIs.
pub fn clean_listings(
    raw: Vec<RawListing>,
    config: &CleaningConfig,
) -> Result<Vec<CleanedListing>, DomainError> {
    let input_rows = raw.len();

    // 1. Deduplicate by listing id, first occurrence wins.
    let mut seen: HashSet<i64> = HashSet::with_capacity(input_rows);
    let mut rows: Vec<RawListing> = raw
        .into_iter()
        .filter(|row| seen.insert(row.id))
        .collect();

    // 2. Drop invalid prices.
    rows.retain(|row| row.price > 0.0 && row.price <= config.max_price);

    if rows.is_empty() {
        return Err(DomainError::EmptyDataset { input_rows });
    }

    // 3. Percentile ranks over the surviving rows (pandas rank(pct=True),
    //    ties averaged).
    let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    let revenues: Vec<f64> = rows
        .iter()
        .map(|r| r.price * (DAYS_PER_YEAR - r.availability_365) as f64)
        .collect();
    let price_pct = percentile_ranks(&prices);
    let revenue_pct = percentile_ranks(&revenues);

    let mut cleaned: Vec<CleanedListing> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let booked_days = DAYS_PER_YEAR - row.availability_365;
            let revenue = row.price * booked_days as f64;
            CleanedListing {
                id: row.id,
                name: row.name.unwrap_or_default(),
                host_id: row.host_id,
                host_name: row.host_name.unwrap_or_default(),
                neighbourhood_group: row.neighbourhood_group,
                neighbourhood: row.neighbourhood,
                latitude: row.latitude,
                longitude: row.longitude,
                room_type: row.room_type,
                price: row.price,
                minimum_nights: row.minimum_nights,
                number_of_reviews: row.number_of_reviews,
                last_review: row.last_review.as_deref().and_then(parse_date_lenient),
                reviews_per_month: row.reviews_per_month.unwrap_or(0.0),
                calculated_host_listings_count: row.calculated_host_listings_count,
                availability_365: row.availability_365,
                estimated_booked_days: booked_days,
                estimated_revenue: revenue,
                price_percentile: price_pct[i],
                revenue_percentile: revenue_pct[i],
                revenue_tier: tier_for(revenue_pct[i]),
                price_bucket: PriceBucket::for_price(row.price),
            }
        })
        .collect();

    // 4. Late cap at the configured price quantile (KPIs keep the values
    //    computed over the uncapped set).
    let cap = quantile(&prices, config.percentile_cap);
    cleaned.retain(|row| row.price <= cap);

    if cleaned.is_empty() {
        return Err(DomainError::EmptyDataset { input_rows });
    }

    Ok(cleaned)
}

fn tier_for(revenue_percentile: f64) -> RevenueTier {
    if revenue_percentile <= 0.25 {
        RevenueTier::Low
    } else if revenue_percentile <= 0.5 {
        RevenueTier::MidLow
    } else if revenue_percentile <= 0.75 {
        RevenueTier::MidHigh
    } else {
        RevenueTier::High
    }
}

fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Average-rank percentile in (0, 1]: each value gets the mean 1-based rank
/// of its tie group divided by the row count.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0f64; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]].total_cmp(&values[order[start]]).is_eq() {
            end += 1;
        }
        // Mean of ranks start+1 ..= end (1-based)
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank / n as f64;
        }
        start = end;
    }
    ranks
}

/// Linear-interpolation quantile over the unsorted input (pandas default).
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * q.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(id: i64, price: f64, availability: i64) -> RawListing {
        RawListing {
            id,
            name: Some(format!("Listing {id}")),
            host_id: 10 + id,
            host_name: Some("Host".into()),
            neighbourhood_group: "Brooklyn".into(),
            neighbourhood: "Williamsburg".into(),
            latitude: 40.7,
            longitude: -73.9,
            room_type: "Private room".into(),
            price,
            minimum_nights: 2,
            number_of_reviews: 5,
            last_review: Some("2019-06-01".into()),
            reviews_per_month: None,
            calculated_host_listings_count: 1,
            availability_365: availability,
        }
    }

    #[test]
    fn test_drops_invalid_prices_and_duplicates() {
        let rows = vec![
            raw(1, 0.0, 100),    // price = 0 -> dropped
            raw(2, 80.0, 100),
            raw(2, 90.0, 100),   // duplicate id -> first wins
            raw(3, 2500.0, 100), // over max price -> dropped
            raw(4, 80.0, 300),
        ];
        let cleaned = clean_listings(rows, &CleaningConfig::default()).unwrap();
        let ids: Vec<i64> = cleaned.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(cleaned[0].price, 80.0);
    }

    #[test]
    fn test_kpi_derivation_and_null_normalization() {
        let cleaned = clean_listings(vec![raw(1, 100.0, 265)], &CleaningConfig::default()).unwrap();
        let row = &cleaned[0];
        assert_eq!(row.estimated_booked_days, 100);
        assert_eq!(row.estimated_revenue, 10_000.0);
        assert_eq!(row.reviews_per_month, 0.0);
        assert_eq!(row.last_review, NaiveDate::from_ymd_opt(2019, 6, 1));
    }

    #[test]
    fn test_revenue_identity_holds_for_every_row() {
        let rows = (1..=20).map(|i| raw(i, 50.0 + i as f64, (i * 15) % 366)).collect();
        let cleaned = clean_listings(rows, &CleaningConfig::default()).unwrap();
        for row in &cleaned {
            let recomputed = row.price * row.estimated_booked_days as f64;
            assert!((recomputed - row.estimated_revenue).abs() <= 1e-6);
        }
    }

    #[test]
    fn test_percentile_ranks_average_ties() {
        // 10, 20, 20, 30 -> ranks 1, 2.5, 2.5, 4 -> pct .25, .625, .625, 1.0
        let pct = percentile_ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(pct, vec![0.25, 0.625, 0.625, 1.0]);
    }

    #[test]
    fn test_percentiles_within_unit_interval() {
        let rows = (1..=50).map(|i| raw(i, (i % 7 + 1) as f64 * 40.0, i * 7 % 366)).collect();
        let cleaned = clean_listings(rows, &CleaningConfig::default()).unwrap();
        for row in &cleaned {
            assert!(row.price_percentile > 0.0 && row.price_percentile <= 1.0);
            assert!(row.revenue_percentile > 0.0 && row.revenue_percentile <= 1.0);
        }
    }

    #[test]
    fn test_cap_applied_after_kpis() {
        // 100 rows, prices 1..=100. The 0.99 quantile is 99.01, so row 100
        // gets dropped, but the survivors keep percentiles computed over the
        // full set (max surviving price_percentile is 0.99, not 1.0).
        let rows = (1..=100).map(|i| raw(i, i as f64, 0)).collect();
        let cleaned = clean_listings(rows, &CleaningConfig::default()).unwrap();
        assert_eq!(cleaned.len(), 99);
        let max_pct = cleaned
            .iter()
            .map(|l| l.price_percentile)
            .fold(f64::MIN, f64::max);
        assert!((max_pct - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = vec![10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&values, 0.5), 25.0);
        assert_eq!(quantile(&values, 1.0), 40.0);
        assert_eq!(quantile(&values, 0.0), 10.0);
    }

    #[test]
    fn test_all_rows_filtered_is_an_error() {
        let rows = vec![raw(1, 0.0, 10), raw(2, -5.0, 10)];
        let err = clean_listings(rows, &CleaningConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::EmptyDataset { input_rows: 2 }));
    }

    #[test]
    fn test_tier_quartiles() {
        assert_eq!(tier_for(0.1), RevenueTier::Low);
        assert_eq!(tier_for(0.25), RevenueTier::Low);
        assert_eq!(tier_for(0.4), RevenueTier::MidLow);
        assert_eq!(tier_for(0.75), RevenueTier::MidHigh);
        assert_eq!(tier_for(0.9), RevenueTier::High);
    }

    #[test]
    fn test_unparseable_review_date_coerced_to_none() {
        let mut row = raw(1, 100.0, 10);
        row.last_review = Some("not-a-date".into());
        let cleaned = clean_listings(vec![row], &CleaningConfig::default()).unwrap();
        assert_eq!(cleaned[0].last_review, None);
    }
}
