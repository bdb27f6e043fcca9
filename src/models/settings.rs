use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GenerationError, Result};

pub const MIN_STEPS: u32 = 20;
pub const MAX_STEPS: u32 = 100;
pub const DEFAULT_STEPS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Draft,
    Standard,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Realistic,
    Artistic,
    Digital,
    Anime,
    Abstract,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Draft => "draft",
            Quality::Standard => "standard",
            Quality::High => "high",
        }
    }
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Realistic => "realistic",
            Style::Artistic => "artistic",
            Style::Digital => "digital",
            Style::Anime => "anime",
            Style::Abstract => "abstract",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionPreset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct QualityOption {
    pub value: Quality,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub value: Style,
    pub label: &'static str,
    pub description: &'static str,
}

pub static PRESET_DIMENSIONS: [DimensionPreset; 5] = [
    DimensionPreset { name: "Square", width: 1024, height: 1024 },
    DimensionPreset { name: "Portrait", width: 768, height: 1024 },
    DimensionPreset { name: "Landscape", width: 1024, height: 768 },
    DimensionPreset { name: "Wide", width: 1344, height: 768 },
    DimensionPreset { name: "Tall", width: 768, height: 1344 },
];

pub static QUALITY_OPTIONS: [QualityOption; 3] = [
    QualityOption { value: Quality::Draft, label: "Draft", description: "Fast generation" },
    QualityOption { value: Quality::Standard, label: "Standard", description: "Balanced quality" },
    QualityOption { value: Quality::High, label: "High", description: "Best quality" },
];

pub static STYLE_PRESETS: [StylePreset; 5] = [
    StylePreset { value: Style::Realistic, label: "Realistic", description: "Photorealistic images" },
    StylePreset { value: Style::Artistic, label: "Artistic", description: "Painterly style" },
    StylePreset { value: Style::Digital, label: "Digital Art", description: "Digital illustration" },
    StylePreset { value: Style::Anime, label: "Anime", description: "Anime/manga style" },
    StylePreset { value: Style::Abstract, label: "Abstract", description: "Abstract art" },
];

/// Parameters for a single generation. Snapshotted into every
/// [`GeneratedImage`](crate::models::GeneratedImage) at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            width: 1024,
            height: 1024,
            quality: Quality::Standard,
            style: Style::Realistic,
            steps: Some(DEFAULT_STEPS),
        }
    }
}

impl GenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_preset(self, preset: &DimensionPreset) -> Self {
        self.with_dimensions(preset.width, preset.height)
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_steps(mut self, steps: Option<u32>) -> Self {
        self.steps = steps;
        self
    }

    /// The preset whose dimensions match, or `None` for custom dimensions.
    pub fn preset(&self) -> Option<&'static DimensionPreset> {
        PRESET_DIMENSIONS
            .iter()
            .find(|p| p.width == self.width && p.height == self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationError::InvalidInput(
                "Width and height must be positive".into(),
            ));
        }
        if let Some(steps) = self.steps {
            if !(MIN_STEPS..=MAX_STEPS).contains(&steps) {
                return Err(GenerationError::InvalidInput(format!(
                    "Steps must be between {} and {}",
                    MIN_STEPS, MAX_STEPS
                )));
            }
        }
        Ok(())
    }
}
