use crate::domain::model::{Agency, LocationView};
use crate::utils::error::{DirectoryError, Result};
use serde::Serialize;

#[derive(Serialize)]
struct AgencyRow<'a> {
    id: &'a str,
    name: &'a str,
    slug: &'a str,
    rating: Option<f32>,
    verified: bool,
    featured: bool,
    phone: Option<&'a str>,
    email: Option<&'a str>,
    website: Option<&'a str>,
    specialisms: String,
}

/// Agency listing as CSV with a header row, in listing order.
pub fn agencies_to_csv(agencies: &[Agency]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if agencies.is_empty() {
        writer.write_record([
            "id", "name", "slug", "rating", "verified", "featured", "phone", "email", "website",
            "specialisms",
        ])?;
    }
    for agency in agencies {
        writer.serialize(AgencyRow {
            id: &agency.id,
            name: &agency.name,
            slug: &agency.slug,
            rating: agency.rating,
            verified: agency.is_verified,
            featured: agency.is_featured,
            phone: agency.phone.as_deref(),
            email: agency.email.as_deref(),
            website: agency.website.as_deref(),
            specialisms: agency.specialisms.join(";"),
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| DirectoryError::ValidationError {
        message: format!("CSV buffer flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| DirectoryError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Plain-text summary: breadcrumb trail, URL, count, children.
pub fn render_text(view: &LocationView) -> String {
    if view.is_empty() {
        return "Location not found".to_string();
    }

    let trail: Vec<&str> = view.breadcrumbs.iter().map(|c| c.label.as_str()).collect();
    let mut lines = vec![
        trail.join(" > "),
        format!("URL: {}", view.url),
        format!("Agencies: {}", view.aggregate_count),
    ];
    if !view.resolution.is_complete() {
        lines.push("Warning: location chain is incomplete".to_string());
    }
    if !view.canonical {
        lines.push(format!("Canonical URL differs from request: {}", view.url));
    }
    for child in &view.children {
        lines.push(format!(
            "  - {} ({}, {} agencies)",
            child.name,
            child.location_type,
            child.agency_count.unwrap_or(0)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::guildford_agencies;
    use crate::domain::model::{Breadcrumb, Location, LocationType, PathResolution};

    #[test]
    fn test_agencies_to_csv() {
        let (mut agencies, _) = guildford_agencies();
        agencies[0].specialisms = vec!["respite".to_string(), "parent and child".to_string()];
        agencies[0].phone = Some("01483 000000".to_string());

        let csv = agencies_to_csv(&agencies).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "id,name,slug,rating,verified,featured,phone,email,website,specialisms"
        );
        assert_eq!(
            lines[1],
            "ag-hearth,Hearth Fostering,hearth-fostering,4.2,true,false,01483 000000,,,respite;parent and child"
        );
    }

    #[test]
    fn test_empty_listing_still_has_header() {
        let csv = agencies_to_csv(&[]).unwrap();
        assert_eq!(
            csv.trim_end(),
            "id,name,slug,rating,verified,featured,phone,email,website,specialisms"
        );
    }

    #[test]
    fn test_render_text() {
        let surrey = Location::new("loc-surrey", "Surrey", "surrey", LocationType::County);
        let woking = Location::new("loc-woking", "Woking", "woking", LocationType::City)
            .with_parent("loc-surrey")
            .with_agency_count(2);
        let view = LocationView {
            path: vec![surrey.clone()],
            breadcrumbs: vec![
                Breadcrumb::link("Home", "/".to_string()),
                Breadcrumb::link("Locations", "/locations".to_string()),
                Breadcrumb {
                    label: "Surrey".to_string(),
                    url: None,
                },
            ],
            url: "/locations/surrey".to_string(),
            aggregate_count: 2,
            children: vec![woking],
            agencies: vec![],
            resolution: PathResolution::Complete { path: vec![surrey] },
            canonical: true,
        };

        let text = render_text(&view);

        assert!(text.starts_with("Home > Locations > Surrey\n"));
        assert!(text.contains("URL: /locations/surrey"));
        assert!(text.contains("  - Woking (city, 2 agencies)"));
        assert!(!text.contains("Warning"));
    }
}
