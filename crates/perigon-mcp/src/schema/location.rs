//! Best-effort classification of free-text locations.
//!
//! Not a geocoder: two-letter codes are checked against small allow-lists
//! and everything else is treated as a city name. States are checked before
//! countries, so ambiguous codes such as `CA` or `IN` resolve to a state.

use std::fmt;

/// US state and territory codes (upper case).
pub const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR",
];

/// Commonly requested ISO 3166-1 alpha-2 country codes (lower case).
pub const COUNTRIES: &[&str] = &[
    "us", "gb", "ca", "au", "nz", "ie", "de", "fr", "it", "es", "pt", "nl", "be", "ch", "at",
    "se", "no", "dk", "fi", "pl", "ua", "ru", "tr", "il", "ae", "sa", "eg", "ng", "ke", "za",
    "in", "pk", "cn", "jp", "kr", "tw", "hk", "sg", "my", "id", "ph", "th", "vn", "br", "ar",
    "mx", "co", "cl", "pe",
];

/// Which location filter a free-text location maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Free-text city name.
    City,
    /// US state code.
    State,
    /// ISO country code.
    Country,
}

impl LocationKind {
    /// Perigon query parameter for this kind of location.
    #[must_use]
    pub const fn query_param(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::State => "state",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_param())
    }
}

/// A classified location with its filter value normalized for the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLocation {
    /// Detected kind.
    pub kind: LocationKind,
    /// Value to send: upper-case state, lower-case country, trimmed city.
    pub value: String,
}

/// Classify a location string. Never fails.
#[must_use]
pub fn classify_location(input: &str) -> LocationKind {
    let trimmed = input.trim();
    if trimmed.chars().count() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return LocationKind::City;
    }

    let upper = trimmed.to_ascii_uppercase();
    if US_STATES.contains(&upper.as_str()) {
        return LocationKind::State;
    }

    let lower = trimmed.to_ascii_lowercase();
    if COUNTRIES.contains(&lower.as_str()) {
        return LocationKind::Country;
    }

    LocationKind::City
}

/// Classify and normalize a location in one step.
#[must_use]
pub fn resolve_location(input: &str) -> ClassifiedLocation {
    let trimmed = input.trim();
    let kind = classify_location(trimmed);
    let value = match kind {
        LocationKind::State => trimmed.to_ascii_uppercase(),
        LocationKind::Country => trimmed.to_ascii_lowercase(),
        LocationKind::City => trimmed.to_string(),
    };
    ClassifiedLocation { kind, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        assert_eq!(classify_location("NY"), LocationKind::State);
        assert_eq!(classify_location("tx"), LocationKind::State);
        assert_eq!(classify_location(" wa "), LocationKind::State);
    }

    #[test]
    fn test_country_codes() {
        assert_eq!(classify_location("gb"), LocationKind::Country);
        assert_eq!(classify_location("JP"), LocationKind::Country);
    }

    #[test]
    fn test_ambiguous_codes_prefer_state() {
        assert_eq!(classify_location("CA"), LocationKind::State);
        assert_eq!(classify_location("in"), LocationKind::State);
    }

    #[test]
    fn test_everything_else_is_city() {
        assert_eq!(classify_location("San Francisco"), LocationKind::City);
        assert_eq!(classify_location("zz"), LocationKind::City);
        assert_eq!(classify_location(""), LocationKind::City);
        assert_eq!(classify_location("N1"), LocationKind::City);
        assert_eq!(classify_location("Texas"), LocationKind::City);
    }

    #[test]
    fn test_resolve_normalizes_case() {
        let loc = resolve_location("ny");
        assert_eq!(loc.kind, LocationKind::State);
        assert_eq!(loc.value, "NY");

        let loc = resolve_location("FR");
        assert_eq!(loc.value, "fr");

        let loc = resolve_location("  Berlin ");
        assert_eq!(loc, ClassifiedLocation { kind: LocationKind::City, value: "Berlin".into() });
    }
}
