//! Particle field configuration and its two presets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rgba;

/// Preset selector read from the drawing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Standard,
    Subtle,
}

impl Variant {
    /// Resolve a surface tag. Only `"subtle"` selects [`Variant::Subtle`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("subtle") => Variant::Subtle,
            _ => Variant::Standard,
        }
    }

    /// The tag that selects this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Subtle => "subtle",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-session settings for a particle field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Target particle count per square logical pixel.
    pub density: f64,
    /// Inclusive lower bound on the particle count.
    pub min_particles: usize,
    /// Inclusive upper bound on the particle count.
    pub max_particles: usize,
    /// Maximum magnitude of each velocity component, in pixels per frame.
    pub speed: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Center distance at which links vanish.
    pub link_distance: f64,
    /// Stroke width of links, in logical pixels.
    pub link_width: f64,
    /// Link opacity at zero distance.
    pub link_alpha: f32,
    /// Opacity every particle is drawn with.
    pub dot_alpha: f32,
    pub link_color: Rgba,
    /// Particle colors, picked uniformly at creation.
    pub palette: Vec<Rgba>,
}

impl FieldConfig {
    /// The settings for a preset.
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Standard => Self {
                density: 0.00003,
                min_particles: 46,
                max_particles: 95,
                speed: 0.18,
                radius_min: 0.8,
                radius_max: 1.9,
                link_distance: 180.0,
                link_width: 1.35,
                link_alpha: 0.18,
                dot_alpha: 0.42,
                link_color: Rgba::WHITE,
                palette: default_palette(),
            },
            Variant::Subtle => Self {
                density: 0.000022,
                min_particles: 34,
                max_particles: 75,
                speed: 0.12,
                radius_min: 0.7,
                radius_max: 1.6,
                link_distance: 170.0,
                link_width: 1.35,
                link_alpha: 0.12,
                dot_alpha: 0.30,
                link_color: Rgba::WHITE,
                palette: default_palette(),
            },
        }
    }

    /// Check the bounds every seeding and drawing routine relies on.
    pub fn validate(&self) -> Result<(), InvalidFieldConfig> {
        if !(self.density.is_finite() && self.density >= 0.0) {
            return Err(InvalidFieldConfig::Density(self.density));
        }
        if self.min_particles > self.max_particles {
            return Err(InvalidFieldConfig::ParticleBounds {
                min: self.min_particles,
                max: self.max_particles,
            });
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(InvalidFieldConfig::Speed(self.speed));
        }
        if !(self.radius_min >= 0.0 && self.radius_min <= self.radius_max)
            || !self.radius_max.is_finite()
        {
            return Err(InvalidFieldConfig::RadiusBounds {
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        if !(self.link_distance.is_finite() && self.link_distance > 0.0) {
            return Err(InvalidFieldConfig::LinkDistance(self.link_distance));
        }
        for (name, value) in [("link_alpha", self.link_alpha), ("dot_alpha", self.dot_alpha)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidFieldConfig::Alpha { name, value });
            }
        }
        if self.palette.is_empty() {
            return Err(InvalidFieldConfig::EmptyPalette);
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::preset(Variant::Standard)
    }
}

fn default_palette() -> Vec<Rgba> {
    vec![
        Rgba::rgba(255, 255, 255, 0.95),
        Rgba::rgb(56, 189, 248),
        Rgba::rgb(34, 197, 94),
    ]
}

/// A [`FieldConfig`] that violates one of its bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidFieldConfig {
    Density(f64),
    ParticleBounds { min: usize, max: usize },
    Speed(f64),
    RadiusBounds { min: f64, max: f64 },
    LinkDistance(f64),
    Alpha { name: &'static str, value: f32 },
    EmptyPalette,
}

impl fmt::Display for InvalidFieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Density(d) => write!(f, "density must be finite and non-negative, got {d}"),
            Self::ParticleBounds { min, max } => {
                write!(f, "min_particles ({min}) exceeds max_particles ({max})")
            }
            Self::Speed(s) => write!(f, "speed must be finite and non-negative, got {s}"),
            Self::RadiusBounds { min, max } => {
                write!(f, "radius range {min}..={max} is not a valid range")
            }
            Self::LinkDistance(d) => write!(f, "link_distance must be positive, got {d}"),
            Self::Alpha { name, value } => write!(f, "{name} must lie in [0, 1], got {value}"),
            Self::EmptyPalette => f.write_str("palette must contain at least one color"),
        }
    }
}

impl std::error::Error for InvalidFieldConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_tag() {
        assert_eq!(Variant::from_tag(Some("subtle")), Variant::Subtle);
        assert_eq!(Variant::from_tag(Some("standard")), Variant::Standard);
        assert_eq!(Variant::from_tag(Some("Subtle")), Variant::Standard);
        assert_eq!(Variant::from_tag(Some("")), Variant::Standard);
        assert_eq!(Variant::from_tag(None), Variant::Standard);
    }

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(FieldConfig::preset(Variant::Standard).validate(), Ok(()));
        assert_eq!(FieldConfig::preset(Variant::Subtle).validate(), Ok(()));
    }

    #[test]
    fn test_subtle_is_quieter() {
        let standard = FieldConfig::preset(Variant::Standard);
        let subtle = FieldConfig::preset(Variant::Subtle);
        assert!(subtle.max_particles < standard.max_particles);
        assert!(subtle.dot_alpha < standard.dot_alpha);
        assert!(subtle.link_alpha < standard.link_alpha);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut config = FieldConfig::default();
        config.min_particles = 100;
        config.max_particles = 10;
        assert_eq!(
            config.validate(),
            Err(InvalidFieldConfig::ParticleBounds { min: 100, max: 10 })
        );

        let mut config = FieldConfig::default();
        config.link_distance = 0.0;
        assert_eq!(config.validate(), Err(InvalidFieldConfig::LinkDistance(0.0)));

        let mut config = FieldConfig::default();
        config.dot_alpha = 1.2;
        assert_eq!(
            config.validate(),
            Err(InvalidFieldConfig::Alpha {
                name: "dot_alpha",
                value: 1.2
            })
        );

        let mut config = FieldConfig::default();
        config.palette.clear();
        assert_eq!(config.validate(), Err(InvalidFieldConfig::EmptyPalette));
    }

    #[test]
    fn test_equal_radius_bounds_are_valid() {
        let mut config = FieldConfig::default();
        config.radius_min = 1.0;
        config.radius_max = 1.0;
        assert_eq!(config.validate(), Ok(()));
    }
}
