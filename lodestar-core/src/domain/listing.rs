// lodestar-core/src/domain/listing.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the raw listings CSV, exactly as published (NYC 2019 shape).
/// `last_review` stays a raw string here: the source mixes valid dates and
/// blanks, and the cleaner parses it leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct RawListing {
    pub id: i64,
    pub name: Option<String>,
    pub host_id: i64,
    pub host_name: Option<String>,
    pub neighbourhood_group: String,
    pub neighbourhood: String,
    pub latitude: f64,
    pub longitude: f64,
    pub room_type: String,
    pub price: f64,
    pub minimum_nights: i64,
    pub number_of_reviews: i64,
    pub last_review: Option<String>,
    pub reviews_per_month: Option<f64>,
    pub calculated_host_listings_count: i64,
    pub availability_365: i64,
}

/// Quartile label over estimated revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevenueTier {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Mid-Low")]
    MidLow,
    #[serde(rename = "Mid-High")]
    MidHigh,
    #[serde(rename = "High")]
    High,
}

impl RevenueTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueTier::Low => "Low",
            RevenueTier::MidLow => "Mid-Low",
            RevenueTier::MidHigh => "Mid-High",
            RevenueTier::High => "High",
        }
    }
}

/// Fixed price band: (0,100] Budget, (100,200] Standard, (200,400] Premium,
/// above that Luxury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceBucket {
    Budget,
    Standard,
    Premium,
    Luxury,
}

impl PriceBucket {
    pub fn for_price(price: f64) -> Self {
        if price <= 100.0 {
            PriceBucket::Budget
        } else if price <= 200.0 {
            PriceBucket::Standard
        } else if price <= 400.0 {
            PriceBucket::Premium
        } else {
            PriceBucket::Luxury
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceBucket::Budget => "Budget",
            PriceBucket::Standard => "Standard",
            PriceBucket::Premium => "Premium",
            PriceBucket::Luxury => "Luxury",
        }
    }
}

/// One cleaned listing: raw attributes with the nulls normalized, plus the
/// derived BI KPIs. This is the only input the star-schema core consumes.
#[derive(Debug, Clone, Serialize)]
pub struct CleanedListing {
    pub id: i64,
    pub name: String,
    pub host_id: i64,
    pub host_name: String,
    pub neighbourhood_group: String,
    pub neighbourhood: String,
    pub latitude: f64,
    pub longitude: f64,
    pub room_type: String,
    pub price: f64,
    pub minimum_nights: i64,
    pub number_of_reviews: i64,
    pub last_review: Option<NaiveDate>,
    pub reviews_per_month: f64,
    pub calculated_host_listings_count: i64,
    pub availability_365: i64,
    pub estimated_booked_days: i64,
    pub estimated_revenue: f64,
    pub price_percentile: f64,
    pub revenue_percentile: f64,
    pub revenue_tier: RevenueTier,
    pub price_bucket: PriceBucket,
}
