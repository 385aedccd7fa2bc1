//! Country code descriptions for facet display.

/// English description for an ISO 3166-1 alpha-2 country code, falling
/// back to the raw code when unknown.
#[must_use]
pub fn country_description(code: &str) -> String {
    let name = match code {
        "AR" => "Argentina",
        "AT" => "Austria",
        "AU" => "Australia",
        "BE" => "Belgium",
        "BR" => "Brazil",
        "CA" => "Canada",
        "CH" => "Switzerland",
        "CZ" => "Czechia",
        "DE" => "Germany",
        "DK" => "Denmark",
        "ES" => "Spain",
        "FI" => "Finland",
        "FR" => "France",
        "GB" => "United Kingdom",
        "GR" => "Greece",
        "HK" => "Hong Kong",
        "HU" => "Hungary",
        "IE" => "Ireland",
        "IL" => "Israel",
        "IN" => "India",
        "IT" => "Italy",
        "JP" => "Japan",
        "KR" => "South Korea",
        "MX" => "Mexico",
        "NL" => "Netherlands",
        "NO" => "Norway",
        "NZ" => "New Zealand",
        "PL" => "Poland",
        "PT" => "Portugal",
        "RO" => "Romania",
        "SE" => "Sweden",
        "SG" => "Singapore",
        "TR" => "Turkey",
        "US" => "United States",
        "ZA" => "South Africa",
        other => return other.to_string(),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_and_unknown_codes_fall_back() {
        assert_eq!(country_description("DE"), "Germany");
        assert_eq!(country_description("US"), "United States");
        assert_eq!(country_description("XX"), "XX");
    }
}
