//! Shared test data: a small slice of the England hierarchy.

use crate::domain::model::{Agency, AgencyLocation, Location, LocationType};

pub fn england_locations() -> Vec<Location> {
    vec![
        Location::new("loc-england", "England", "england", LocationType::Country)
            .with_agency_count(20),
        Location::new("loc-south-east", "South East", "south-east", LocationType::Region)
            .with_parent("loc-england")
            .with_agency_count(12),
        Location::new("loc-north-west", "North West", "north-west", LocationType::Region)
            .with_parent("loc-england")
            .with_agency_count(8),
        Location::new("loc-north-east", "North East", "north-east", LocationType::Region)
            .with_parent("loc-england")
            .with_agency_count(0),
        Location::new("loc-surrey", "Surrey", "surrey", LocationType::County)
            .with_parent("loc-south-east")
            .with_agency_count(7),
        Location::new("loc-kent", "Kent", "kent", LocationType::County)
            .with_parent("loc-south-east")
            .with_agency_count(5),
        Location::new("loc-guildford", "Guildford", "guildford", LocationType::City)
            .with_parent("loc-surrey")
            .with_agency_count(5),
        Location::new("loc-woking", "Woking", "woking", LocationType::City)
            .with_parent("loc-surrey")
            .with_agency_count(2),
    ]
}

pub fn guildford_agencies() -> (Vec<Agency>, Vec<AgencyLocation>) {
    let mut hearth = Agency::new("ag-hearth", "Hearth Fostering", "hearth-fostering");
    hearth.rating = Some(4.2);
    hearth.is_verified = true;

    let mut beacon = Agency::new("ag-beacon", "Beacon Family Care", "beacon-family-care");
    beacon.rating = Some(4.8);
    beacon.is_featured = true;

    let mut acorn = Agency::new("ag-acorn", "Acorn Foster Homes", "acorn-foster-homes");
    acorn.rating = Some(4.9);

    let links = ["ag-hearth", "ag-beacon", "ag-acorn"]
        .iter()
        .map(|agency_id| AgencyLocation {
            agency_id: agency_id.to_string(),
            location_id: "loc-guildford".to_string(),
        })
        .collect();

    (vec![hearth, beacon, acorn], links)
}
