// lodestar-core/src/domain/star/fact.rs
//
// One fact row per cleaned listing. Natural keys resolve through the
// dimension lookups (left-join semantics): a lookup miss yields a null
// foreign key which the validator reports, it is never silently dropped.

use crate::domain::listing::CleanedListing;
use crate::domain::star::dimensions::Dimensions;
use crate::domain::star::{FACT_COLUMNS, FactRow, FactTable};

pub fn build_fact(cleaned: &[CleanedListing], dims: &Dimensions) -> FactTable {
    let rows = cleaned
        .iter()
        .map(|listing| FactRow {
            listing_key: dims.listing_keys.get(&listing.id).copied(),
            host_key: dims.host_keys.get(&listing.host_id).copied(),
            location_key: dims
                .location_keys
                .get(&(
                    listing.neighbourhood_group.clone(),
                    listing.neighbourhood.clone(),
                ))
                .copied(),
            room_type_key: dims.room_type_keys.get(&listing.room_type).copied(),
            price: listing.price,
            minimum_nights: listing.minimum_nights,
            number_of_reviews: listing.number_of_reviews,
            reviews_per_month: listing.reviews_per_month,
            availability_365: listing.availability_365,
            estimated_booked_days: listing.estimated_booked_days,
            estimated_revenue: listing.estimated_revenue,
            price_percentile: listing.price_percentile,
            revenue_percentile: listing.revenue_percentile,
            last_review: listing.last_review,
        })
        .collect();

    FactTable {
        columns: FACT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::star::build_dimensions;
    use crate::domain::star::dimensions::tests::listing;

    #[test]
    fn test_one_fact_row_per_listing_with_resolved_keys() {
        let cleaned = vec![
            listing(1, 100, "Brooklyn", "Williamsburg", "Private room"),
            listing(2, 100, "Manhattan", "Harlem", "Private room"),
            listing(3, 200, "Brooklyn", "Williamsburg", "Private room"),
        ];
        let dims = build_dimensions(&cleaned);
        let fact = build_fact(&cleaned, &dims);

        assert_eq!(fact.rows.len(), 3);
        for (row, source) in fact.rows.iter().zip(&cleaned) {
            assert_eq!(row.listing_key, dims.listing_keys.get(&source.id).copied());
            assert!(row.host_key.is_some());
            assert!(row.location_key.is_some());
            assert!(row.room_type_key.is_some());
            assert_eq!(row.price, source.price);
            assert_eq!(row.estimated_revenue, source.estimated_revenue);
        }

        // Both Williamsburg listings share a location key
        assert_eq!(fact.rows[0].location_key, fact.rows[2].location_key);
        // Both listings of host 100 share a host key
        assert_eq!(fact.rows[0].host_key, fact.rows[1].host_key);
    }

    #[test]
    fn test_unresolvable_key_surfaces_as_null_not_panic() {
        let cleaned = vec![listing(1, 100, "Brooklyn", "Williamsburg", "Private room")];
        // Empty dimensions: every lookup misses.
        let fact = build_fact(&cleaned, &Dimensions::default());
        let row = &fact.rows[0];
        assert_eq!(row.listing_key, None);
        assert_eq!(row.host_key, None);
        assert_eq!(row.location_key, None);
        assert_eq!(row.room_type_key, None);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let cleaned = vec![listing(1, 100, "Brooklyn", "Williamsburg", "Private room")];
        let dims = build_dimensions(&cleaned);
        let before = dims.clone();
        let _ = build_fact(&cleaned, &dims);
        assert_eq!(dims.host_keys, before.host_keys);
        assert_eq!(dims.listings, before.listings);
    }

    #[test]
    fn test_fact_columns_contract() {
        let fact = build_fact(&[], &Dimensions::default());
        assert_eq!(fact.columns, FACT_COLUMNS.to_vec());
    }
}
