// lodestar-core/src/domain/star/dimensions.rs
//
// Surrogate-key assignment is an explicit sort + enumerate step: distinct
// natural-key tuples, sorted lexicographically, numbered from 1. Nothing
// here depends on the iteration order of a map type, so the same input
// always yields the same key assignment.

use std::collections::HashMap;

use crate::domain::listing::CleanedListing;
use crate::domain::star::{HostRow, ListingRow, LocationRow, RoomTypeRow};

/// The four dimension tables plus the natural-key -> surrogate-key lookups
/// consumed read-only by the fact builder.
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    pub room_types: Vec<RoomTypeRow>,
    pub locations: Vec<LocationRow>,
    pub hosts: Vec<HostRow>,
    pub listings: Vec<ListingRow>,

    pub room_type_keys: HashMap<String, i64>,
    pub location_keys: HashMap<(String, String), i64>,
    pub host_keys: HashMap<i64, i64>,
    pub listing_keys: HashMap<i64, i64>,
}

pub fn build_dimensions(cleaned: &[CleanedListing]) -> Dimensions {
    let mut dims = Dimensions::default();

    // ---------- dim_room_type ----------
    let mut room_types: Vec<String> = cleaned.iter().map(|l| l.room_type.clone()).collect();
    room_types.sort();
    room_types.dedup();
    for (i, room_type) in room_types.into_iter().enumerate() {
        let key = (i + 1) as i64;
        dims.room_type_keys.insert(room_type.clone(), key);
        dims.room_types.push(RoomTypeRow {
            room_type,
            room_type_key: key,
        });
    }

    // ---------- dim_location ----------
    let mut locations: Vec<(String, String)> = cleaned
        .iter()
        .map(|l| (l.neighbourhood_group.clone(), l.neighbourhood.clone()))
        .collect();
    locations.sort();
    locations.dedup();
    for (i, (group, neighbourhood)) in locations.into_iter().enumerate() {
        let key = (i + 1) as i64;
        dims.location_keys
            .insert((group.clone(), neighbourhood.clone()), key);
        dims.locations.push(LocationRow {
            neighbourhood_group: group,
            neighbourhood,
            location_key: key,
        });
    }

    // ---------- dim_host ----------
    // host_id is the natural key. A host id seen with two different names is
    // an upstream data issue, not an error: the stable sort keeps the first
    // occurrence as the representative.
    let mut hosts: Vec<(i64, &CleanedListing)> =
        cleaned.iter().map(|l| (l.host_id, l)).collect();
    hosts.sort_by_key(|(host_id, _)| *host_id);
    hosts.dedup_by_key(|(host_id, _)| *host_id);
    for (i, (host_id, listing)) in hosts.into_iter().enumerate() {
        let key = (i + 1) as i64;
        dims.host_keys.insert(host_id, key);
        dims.hosts.push(HostRow {
            host_id,
            host_name: listing.host_name.clone(),
            calculated_host_listings_count: listing.calculated_host_listings_count,
            host_key: key,
        });
    }

    // ---------- dim_listing ----------
    let mut listings: Vec<(i64, &CleanedListing)> = cleaned.iter().map(|l| (l.id, l)).collect();
    listings.sort_by_key(|(id, _)| *id);
    listings.dedup_by_key(|(id, _)| *id);
    for (i, (id, listing)) in listings.into_iter().enumerate() {
        let key = (i + 1) as i64;
        dims.listing_keys.insert(id, key);
        dims.listings.push(ListingRow {
            id,
            name: listing.name.clone(),
            listing_key: key,
        });
    }

    dims
}
