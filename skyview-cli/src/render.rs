//! Plain-text rendering of forecasts and search results.

use std::fmt::{self, Write};

use skyview_core::{
    CityCandidate, EffectVariant, WeatherSummary,
    summary::display_temp,
};

/// Widest effect strip, in particles.
const MAX_STRIP: u32 = 24;

pub fn candidate_line(position: usize, city: &CityCandidate) -> String {
    format!(
        "{position}. {} ({:.4}, {:.4})",
        city.display_name(),
        city.latitude,
        city.longitude
    )
}

pub fn summary(summary: &WeatherSummary) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "Weather Forecast {}", summary.glyph)?;
    writeln!(out, "{}", summary.location)?;

    if let Some(current) = &summary.current {
        writeln!(
            out,
            "  {}°C  {}",
            display_temp(current.temperature_c),
            capitalize_words(&current.description)
        )?;
        writeln!(
            out,
            "  Wind {} m/s · Humidity {}% · Pressure {} hPa",
            current.wind_speed_ms, current.humidity_pct, current.pressure_hpa
        )?;
    }

    writeln!(
        out,
        "  Background {} · Effect {}",
        summary.presentation.gradient_id, summary.presentation.effect
    )?;
    if let Some(strip) = effect_strip(summary.presentation.effect) {
        writeln!(out, "  {strip}")?;
    }

    if !summary.days.is_empty() {
        out.push('\n');
    }
    for day in &summary.days {
        writeln!(
            out,
            "  {:<11} {}  {:>4}°C  {}",
            day.label,
            day.glyph,
            display_temp(day.temperature_c),
            capitalize_words(&day.description)
        )?;
    }

    Ok(out)
}

/// One line sketch of the animated background, sized by its particle count.
pub fn effect_strip(effect: EffectVariant) -> Option<String> {
    let profile = effect.profile()?;
    let n = profile.particles.min(MAX_STRIP);

    let strip = (0..n)
        .map(|i| match effect {
            EffectVariant::Sun if i == 0 => "☀",
            EffectVariant::Sun => "·",
            EffectVariant::Clouds => "☁",
            EffectVariant::Rain => "╱",
            EffectVariant::Snow => "*",
            EffectVariant::Thunderstorm if i % 6 == 5 => "⚡",
            EffectVariant::Thunderstorm => "╱",
            EffectVariant::None => " ",
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(strip)
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_core::{DayBoundary, Forecast, ForecastSample, LocationLabel};

    fn forecast() -> Forecast {
        // 2024-01-01T09:00:00Z, then the next morning.
        let sample = |timestamp, code: &str, description: &str| ForecastSample {
            timestamp,
            temperature_c: 7.42,
            humidity_pct: 87,
            pressure_hpa: 1003,
            wind_speed_ms: 5.3,
            condition_code: code.into(),
            condition_description: description.into(),
        };

        Forecast {
            location: LocationLabel { name: "London".into(), country_code: "GB".into() },
            utc_offset_secs: 0,
            samples: vec![
                sample(1_704_099_600, "10n", "light rain"),
                sample(1_704_186_000, "01d", "clear sky"),
            ],
        }
    }

    #[test]
    fn renders_current_conditions_and_days() {
        let summary = WeatherSummary::build(&forecast(), DayBoundary::City, 5).unwrap();
        let text = super::summary(&summary).unwrap();

        assert!(text.starts_with("Weather Forecast 🌦️\nLondon, GB\n"));
        assert!(text.contains("  7°C  Light Rain"));
        assert!(text.contains("Wind 5.3 m/s · Humidity 87% · Pressure 1003 hPa"));
        assert!(text.contains("Background from-gray-900 to-blue-900 · Effect rain"));
        assert!(text.contains("Mon, Jan 1"));
        assert!(text.contains("Tue, Jan 2"));
        assert!(text.contains("Clear Sky"));
    }

    #[test]
    fn strip_width_follows_particle_count() {
        let rain = effect_strip(EffectVariant::Rain).unwrap();
        assert_eq!(rain.split(' ').count(), MAX_STRIP as usize);

        let clouds = effect_strip(EffectVariant::Clouds).unwrap();
        assert_eq!(clouds.split(' ').count(), 6);

        assert!(effect_strip(EffectVariant::Thunderstorm).unwrap().contains('⚡'));
        assert!(effect_strip(EffectVariant::None).is_none());
    }

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("overcast clouds"), "Overcast Clouds");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn candidate_line_shows_position_and_coordinates() {
        let city = CityCandidate {
            name: "London".into(),
            state: Some("Ontario".into()),
            country_code: "CA".into(),
            country_name: "Canada".into(),
            latitude: 42.9836,
            longitude: -81.2497,
        };
        assert_eq!(
            candidate_line(2, &city),
            "2. London, Ontario, Canada (42.9836, -81.2497)"
        );
    }
}
