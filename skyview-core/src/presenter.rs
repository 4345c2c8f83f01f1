//! Maps OpenWeather condition codes ("01d", "10n", ...) to presentation.
//!
//! The first two characters select the phenomenon group, an `n` anywhere in
//! the code marks night. Every input, including garbage, resolves to a
//! descriptor; unknown groups get [`DEFAULT_GRADIENT`] and no effect.

use serde::Serialize;

/// Gradient used when the condition code is not recognized.
pub const DEFAULT_GRADIENT: &str = "from-blue-500 to-purple-600";

const DEFAULT_GLYPH: &str = "🌡️";

/// Animated background drawn behind the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectVariant {
    Sun,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    None,
}

impl EffectVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectVariant::Sun => "sun",
            EffectVariant::Clouds => "clouds",
            EffectVariant::Rain => "rain",
            EffectVariant::Snow => "snow",
            EffectVariant::Thunderstorm => "thunderstorm",
            EffectVariant::None => "none",
        }
    }

    /// Rendering parameters for the animated effect, if there is one.
    pub fn profile(&self) -> Option<EffectProfile> {
        let profile = match self {
            EffectVariant::Sun => EffectProfile {
                particles: 12,
                cycle_secs: (3.0, 3.0),
                flash_interval_secs: None,
            },
            EffectVariant::Clouds => EffectProfile {
                particles: 6,
                cycle_secs: (20.0, 30.0),
                flash_interval_secs: None,
            },
            EffectVariant::Rain => EffectProfile {
                particles: 50,
                cycle_secs: (0.6, 1.0),
                flash_interval_secs: None,
            },
            EffectVariant::Snow => EffectProfile {
                particles: 50,
                cycle_secs: (6.0, 10.0),
                flash_interval_secs: None,
            },
            EffectVariant::Thunderstorm => EffectProfile {
                flash_interval_secs: Some((3.0, 8.0)),
                ..EffectVariant::Rain.profile()?
            },
            EffectVariant::None => return None,
        };

        Some(profile)
    }
}

impl std::fmt::Display for EffectVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Particle count and timing of an animated effect.
///
/// `cycle_secs` is the (min, max) duration of one particle's pass; sun rays
/// pulse on a fixed period. Thunderstorms add a flash every
/// `flash_interval_secs` on top of rain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectProfile {
    pub particles: u32,
    pub cycle_secs: (f32, f32),
    pub flash_interval_secs: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresentationDescriptor {
    pub gradient_id: &'static str,
    pub effect: EffectVariant,
}

impl Default for PresentationDescriptor {
    fn default() -> Self {
        Self { gradient_id: DEFAULT_GRADIENT, effect: EffectVariant::None }
    }
}

/// Physical phenomenon encoded by the first two characters of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhenomenonGroup {
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
}

impl PhenomenonGroup {
    pub fn from_code(code: &str) -> Option<Self> {
        let group = match code.get(..2)? {
            "01" => PhenomenonGroup::Clear,
            "02" => PhenomenonGroup::FewClouds,
            "03" => PhenomenonGroup::ScatteredClouds,
            "04" => PhenomenonGroup::BrokenClouds,
            "09" => PhenomenonGroup::ShowerRain,
            "10" => PhenomenonGroup::Rain,
            "11" => PhenomenonGroup::Thunderstorm,
            "13" => PhenomenonGroup::Snow,
            "50" => PhenomenonGroup::Mist,
            _ => return None,
        };

        Some(group)
    }

    pub fn effect(&self) -> EffectVariant {
        match self {
            PhenomenonGroup::Clear => EffectVariant::Sun,
            PhenomenonGroup::FewClouds
            | PhenomenonGroup::ScatteredClouds
            | PhenomenonGroup::BrokenClouds => EffectVariant::Clouds,
            PhenomenonGroup::ShowerRain | PhenomenonGroup::Rain => EffectVariant::Rain,
            PhenomenonGroup::Thunderstorm => EffectVariant::Thunderstorm,
            PhenomenonGroup::Snow => EffectVariant::Snow,
            PhenomenonGroup::Mist => EffectVariant::None,
        }
    }

    fn day_gradient(&self) -> &'static str {
        match self {
            PhenomenonGroup::Clear => "from-sky-400 to-blue-500",
            PhenomenonGroup::FewClouds => "from-blue-400 to-blue-600",
            PhenomenonGroup::ScatteredClouds => "from-gray-300 to-gray-400",
            PhenomenonGroup::BrokenClouds => "from-gray-400 to-gray-600",
            PhenomenonGroup::ShowerRain => "from-blue-700 to-gray-700",
            PhenomenonGroup::Rain => "from-blue-600 to-gray-600",
            PhenomenonGroup::Thunderstorm => "from-gray-700 to-purple-900",
            PhenomenonGroup::Snow => "from-blue-100 to-blue-300",
            PhenomenonGroup::Mist => "from-gray-400 to-gray-500",
        }
    }

    fn night_gradient(&self) -> &'static str {
        match self {
            PhenomenonGroup::Clear => "from-blue-900 to-purple-900",
            PhenomenonGroup::FewClouds => "from-gray-800 to-blue-900",
            PhenomenonGroup::ScatteredClouds => "from-gray-700 to-gray-800",
            PhenomenonGroup::BrokenClouds => "from-gray-800 to-gray-900",
            PhenomenonGroup::ShowerRain => "from-gray-800 to-blue-900",
            PhenomenonGroup::Rain => "from-gray-900 to-blue-900",
            PhenomenonGroup::Thunderstorm => "from-gray-900 to-purple-900",
            PhenomenonGroup::Snow => "from-blue-900 to-purple-900",
            PhenomenonGroup::Mist => "from-gray-700 to-gray-800",
        }
    }

    pub fn gradient(&self, is_daytime: bool) -> &'static str {
        if is_daytime { self.day_gradient() } else { self.night_gradient() }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            PhenomenonGroup::Clear => "☀️",
            PhenomenonGroup::FewClouds => "⛅",
            PhenomenonGroup::ScatteredClouds | PhenomenonGroup::BrokenClouds => "☁️",
            PhenomenonGroup::ShowerRain => "🌧️",
            PhenomenonGroup::Rain => "🌦️",
            PhenomenonGroup::Thunderstorm => "⛈️",
            PhenomenonGroup::Snow => "❄️",
            PhenomenonGroup::Mist => "🌫️",
        }
    }
}

/// A code is night-time iff it carries the `n` marker.
pub fn is_daytime(code: &str) -> bool {
    !code.contains('n')
}

/// Descriptor for `code`, day or night taken from the code itself.
pub fn present(code: &str) -> PresentationDescriptor {
    present_with(code, is_daytime(code))
}

/// Descriptor for `code` with an explicit day/night flag.
pub fn present_with(code: &str, is_daytime: bool) -> PresentationDescriptor {
    match PhenomenonGroup::from_code(code) {
        Some(group) => PresentationDescriptor {
            gradient_id: group.gradient(is_daytime),
            effect: group.effect(),
        },
        None => PresentationDescriptor::default(),
    }
}

pub fn glyph(code: &str) -> &'static str {
    PhenomenonGroup::from_code(code).map_or(DEFAULT_GLYPH, |g| g.glyph())
}
