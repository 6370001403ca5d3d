//! Descriptions for the coded values the service reports.

/// Describe a ClimaCell weather code, e.g. `1000` is "Clear".
pub const fn weather_code_description(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Unknown",
        1000 => "Clear",
        1001 => "Cloudy",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        3000 => "Light Wind",
        3001 => "Wind",
        3002 => "Strong Wind",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => return None,
    })
}

/// Describe a moon phase index (0-7).
pub const fn moon_phase_description(phase: i64) -> Option<&'static str> {
    Some(match phase {
        0 => "New",
        1 => "Waxing Crescent",
        2 => "First Quarter",
        3 => "Waxing Gibbous",
        4 => "Full",
        5 => "Waning Gibbous",
        6 => "Third Quarter",
        7 => "Waning Crescent",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_weather_codes() {
        assert_eq!(weather_code_description(1000), Some("Clear"));
        assert_eq!(weather_code_description(8000), Some("Thunderstorm"));
        assert_eq!(weather_code_description(1234), None);
    }

    #[test]
    fn moon_phases() {
        assert_eq!(moon_phase_description(4), Some("Full"));
        assert_eq!(moon_phase_description(8), None);
    }
}
