use crate::domain::model::{Agency, Location};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Display statistic for a location page.
///
/// Sums the stored counts of `children`, or falls back to the location's own
/// stored count when it has none. Absent counts are zero. The figures come
/// from denormalised columns and are not recomputed from the agency table, so
/// this is an approximation for display only.
pub fn aggregate_agency_count(location: &Location, children: &[Location]) -> u64 {
    if children.is_empty() {
        return u64::from(location.agency_count.unwrap_or(0));
    }
    children
        .iter()
        .map(|child| u64::from(child.agency_count.unwrap_or(0)))
        .sum()
}

/// Orders a listing: featured, then verified, then rating (unrated last),
/// then name. Duplicate ids keep their first occurrence.
pub fn rank_agencies(agencies: Vec<Agency>) -> Vec<Agency> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<Agency> = agencies
        .into_iter()
        .filter(|agency| seen.insert(agency.id.clone()))
        .collect();

    ranked.sort_by(|a, b| {
        b.is_featured
            .cmp(&a.is_featured)
            .then_with(|| b.is_verified.cmp(&a.is_verified))
            .then_with(|| compare_ratings(a.rating, b.rating))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

fn compare_ratings(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
