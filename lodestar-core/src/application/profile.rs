// lodestar-core/src/application/profile.rs
//
// Exploratory summary of the raw dataset, computed before cleaning so an
// operator can see what the cleaner is about to drop.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::domain::listing::RawListing;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub duplicate_ids: usize,

    // Null counts on the columns the cleaner normalizes
    pub null_names: usize,
    pub null_host_names: usize,
    pub null_last_review: usize,
    pub null_reviews_per_month: usize,

    // Price distribution
    pub min_price: f64,
    pub max_price: f64,
    pub mean_price: f64,
    pub zero_price_rows: usize,
    pub over_cap_rows: usize,

    // Category frequencies
    pub room_types: BTreeMap<String, usize>,
    pub neighbourhood_groups: BTreeMap<String, usize>,
}

pub fn profile_raw(rows: &[RawListing], price_cap: f64) -> DatasetProfile {
    let mut seen_ids = HashSet::with_capacity(rows.len());
    let mut duplicate_ids = 0usize;
    let mut room_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut neighbourhood_groups: BTreeMap<String, usize> = BTreeMap::new();

    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    let mut price_sum = 0.0f64;

    for row in rows {
        if !seen_ids.insert(row.id) {
            duplicate_ids += 1;
        }
        *room_types.entry(row.room_type.clone()).or_default() += 1;
        *neighbourhood_groups
            .entry(row.neighbourhood_group.clone())
            .or_default() += 1;
        min_price = min_price.min(row.price);
        max_price = max_price.max(row.price);
        price_sum += row.price;
    }

    DatasetProfile {
        rows: rows.len(),
        duplicate_ids,
        null_names: rows.iter().filter(|r| r.name.is_none()).count(),
        null_host_names: rows.iter().filter(|r| r.host_name.is_none()).count(),
        null_last_review: rows.iter().filter(|r| r.last_review.is_none()).count(),
        null_reviews_per_month: rows
            .iter()
            .filter(|r| r.reviews_per_month.is_none())
            .count(),
        min_price: if rows.is_empty() { 0.0 } else { min_price },
        max_price: if rows.is_empty() { 0.0 } else { max_price },
        mean_price: if rows.is_empty() {
            0.0
        } else {
            price_sum / rows.len() as f64
        },
        zero_price_rows: rows.iter().filter(|r| r.price <= 0.0).count(),
        over_cap_rows: rows.iter().filter(|r| r.price > price_cap).count(),
        room_types,
        neighbourhood_groups,
    }
}
