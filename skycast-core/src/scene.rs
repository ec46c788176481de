//! Condition-to-visual mapping for the animated backdrop.
//!
//! A condition category string ("Rain", "Clouds", ...) selects one of four
//! mutually exclusive treatments: a background gradient plus a decorative
//! particle variant.

/// An RGB color stop of the backdrop gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Background gradient token keyed to the dominant condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientToken {
    /// Rain: dark slate sky.
    Slate,
    /// Clouds: washed-out gray.
    Ash,
    /// Clear: saturated day sky.
    Azure,
    /// Fallback when nothing matches.
    Pale,
}

impl GradientToken {
    /// Top and bottom stops of the vertical gradient.
    pub fn stops(self) -> (Rgb, Rgb) {
        match self {
            GradientToken::Slate => (Rgb(0x33, 0x41, 0x55), Rgb(0x0f, 0x17, 0x2a)),
            GradientToken::Ash => (Rgb(0xd1, 0xd5, 0xdb), Rgb(0x6b, 0x72, 0x80)),
            GradientToken::Azure => (Rgb(0x38, 0xbd, 0xf8), Rgb(0x25, 0x63, 0xeb)),
            GradientToken::Pale => (Rgb(0xe0, 0xf2, 0xfe), Rgb(0xbf, 0xdb, 0xfe)),
        }
    }
}

/// Decorative particle animation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Falling streaks.
    Rain,
    /// Drifting shapes.
    Clouds,
    /// Twinkling points.
    Stars,
    /// No particles.
    None,
}

/// The visual treatment selected for one condition category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub gradient: GradientToken,
    pub particles: ParticleKind,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            gradient: GradientToken::Pale,
            particles: ParticleKind::None,
        }
    }
}

impl Scene {
    /// Map a condition category to its visual treatment.
    ///
    /// Substring match in fixed priority order: rain beats cloud beats
    /// clear; only the first match counts even when a string would match
    /// several. Anything else falls back to the plain daylight scene.
    pub fn for_condition(condition: &str) -> Self {
        let lower = condition.to_ascii_lowercase();

        if lower.contains("rain") {
            Scene {
                gradient: GradientToken::Slate,
                particles: ParticleKind::Rain,
            }
        } else if lower.contains("cloud") {
            Scene {
                gradient: GradientToken::Ash,
                particles: ParticleKind::Clouds,
            }
        } else if lower.contains("clear") {
            Scene {
                gradient: GradientToken::Azure,
                particles: ParticleKind::Stars,
            }
        } else {
            Scene::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_conditions_pick_the_rain_scene() {
        let scene = Scene::for_condition("light rain");
        assert_eq!(scene.gradient, GradientToken::Slate);
        assert_eq!(scene.particles, ParticleKind::Rain);
    }

    #[test]
    fn cloud_conditions_pick_the_cloud_scene() {
        let scene = Scene::for_condition("scattered clouds");
        assert_eq!(scene.gradient, GradientToken::Ash);
        assert_eq!(scene.particles, ParticleKind::Clouds);
    }

    #[test]
    fn clear_conditions_pick_the_clear_scene() {
        let scene = Scene::for_condition("clear sky");
        assert_eq!(scene.gradient, GradientToken::Azure);
        assert_eq!(scene.particles, ParticleKind::Stars);
    }

    #[test]
    fn unmatched_conditions_fall_back_to_default() {
        assert_eq!(Scene::for_condition("mist"), Scene::default());
        assert_eq!(Scene::for_condition("thunderstorm"), Scene::default());
        assert_eq!(Scene::for_condition(""), Scene::default());
    }

    #[test]
    fn rain_wins_when_several_substrings_match() {
        let scene = Scene::for_condition("rain and clouds");
        assert_eq!(scene.particles, ParticleKind::Rain);

        let scene = Scene::for_condition("clear after clouds");
        assert_eq!(scene.particles, ParticleKind::Clouds);
    }

    #[test]
    fn matching_ignores_category_casing() {
        assert_eq!(
            Scene::for_condition("Rain"),
            Scene::for_condition("rain"),
        );
        assert_eq!(
            Scene::for_condition("Clouds").particles,
            ParticleKind::Clouds,
        );
    }
}
