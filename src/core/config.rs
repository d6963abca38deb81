//! Configuration for map behavior tuning
//!
//! Options are plain serde structs with defaults matching the usual web-map
//! conventions; animation timing can also be picked from a preset profile.

use crate::core::constants::{
    DEFAULT_EASE_LINEARITY, DEFAULT_PAN_DURATION, DEFAULT_SMOOTH_FACTOR, DEFAULT_ZOOM,
    DEFAULT_ZOOM_DELTA,
};
use crate::core::geo::GeoPoint;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimationProfile {
    Smooth,
    Snappy,
    Disabled,
    Custom(AnimationOptions),
}

impl AnimationProfile {
    pub fn resolve(&self) -> AnimationOptions {
        match self {
            Self::Smooth => AnimationOptions {
                enabled: true,
                pan_duration_secs: DEFAULT_PAN_DURATION,
                ease_linearity: DEFAULT_EASE_LINEARITY,
                fly_duration_secs: None,
            },
            Self::Snappy => AnimationOptions {
                enabled: true,
                pan_duration_secs: 0.12,
                ease_linearity: 0.25,
                fly_duration_secs: Some(0.6),
            },
            Self::Disabled => AnimationOptions {
                enabled: false,
                ..AnimationOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for AnimationProfile {
    fn default() -> Self {
        Self::Smooth
    }
}

/// Timing of eased pans and fly-to flights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// When false every animated request is applied instantly
    pub enabled: bool,
    pub pan_duration_secs: f64,
    /// Curvature of the pan ease-out, lower is more curved (clamped at 0.2)
    pub ease_linearity: f64,
    /// Fixed flight duration; `None` derives it from the flight path length
    pub fly_duration_secs: Option<f64>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            pan_duration_secs: DEFAULT_PAN_DURATION,
            ease_linearity: DEFAULT_EASE_LINEARITY,
            fly_duration_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Extra room around the view, as a ratio of its size, before clipping
    pub clip_padding: f64,
    /// Simplification tolerance in pixels
    pub smooth_factor: f64,
    /// Slop in pixels accepted around features when hit testing
    pub hit_tolerance: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            clip_padding: 0.0,
            smooth_factor: DEFAULT_SMOOTH_FACTOR,
            hit_tolerance: 0.0,
        }
    }
}

/// What the host environment can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Host can composite animated frames; without it animations are skipped
    pub any3d: bool,
    /// High-density display, selects `@2x` tiles
    pub retina: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            any3d: true,
            retina: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub center: GeoPoint,
    pub zoom: f64,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub zoom_delta: f64,
    pub zoom_snap: Option<f64>,
    pub animation: AnimationOptions,
    pub render: RenderOptions,
    pub capabilities: Capabilities,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: GeoPoint::default(),
            zoom: DEFAULT_ZOOM,
            min_zoom: None,
            max_zoom: None,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            zoom_snap: None,
            animation: AnimationOptions::default(),
            render: RenderOptions::default(),
            capabilities: Capabilities::default(),
        }
    }
}

impl MapOptions {
    /// Parses options from JSON and validates them
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: MapOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_profile(mut self, profile: AnimationProfile) -> Self {
        self.animation = profile.resolve();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_zoom, self.max_zoom) {
            if min > max {
                return Err(MapError::Config(format!(
                    "min_zoom ({}) is greater than max_zoom ({})",
                    min, max
                )));
            }
        }
        if !self.zoom.is_finite() {
            return Err(MapError::Config(format!("zoom must be finite, got {}", self.zoom)));
        }
        if !(self.zoom_delta > 0.0) {
            return Err(MapError::Config(format!(
                "zoom_delta must be positive, got {}",
                self.zoom_delta
            )));
        }
        if let Some(snap) = self.zoom_snap {
            if snap < 0.0 {
                return Err(MapError::Config(format!(
                    "zoom_snap must not be negative, got {}",
                    snap
                )));
            }
        }
        if !(self.animation.pan_duration_secs > 0.0) {
            return Err(MapError::Config(format!(
                "pan duration must be positive, got {}",
                self.animation.pan_duration_secs
            )));
        }
        if let Some(duration) = self.animation.fly_duration_secs {
            if !(duration >= 0.0) {
                return Err(MapError::Config(format!(
                    "fly duration must not be negative, got {}",
                    duration
                )));
            }
        }
        if !(self.render.smooth_factor >= 0.0) {
            return Err(MapError::Config(format!(
                "smooth_factor must not be negative, got {}",
                self.render.smooth_factor
            )));
        }
        if !(self.render.clip_padding >= 0.0) {
            return Err(MapError::Config(format!(
                "clip_padding must not be negative, got {}",
                self.render.clip_padding
            )));
        }
        Ok(())
    }
}
