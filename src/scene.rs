//! Scene description for the demo driver, loaded from TOML.

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use sigil_geom::{Angle, ScreenRect, ScreenTransform, Vec2};

// Four vertices per overlay quad; the shared buffer is indexed with u16.
const MAX_OVERLAYS_PER_BUCKET: usize = (u16::MAX as usize + 1) / 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub viewport: Viewport,
    #[serde(default)]
    pub camera: CameraPath,
    pub buckets: Vec<BucketSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Scripted camera: a steady pan plus rotation, one step per frame.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CameraPath {
    pub scale: f32,
    pub pan_per_frame: [f32; 2],
    pub rotate_per_frame: f32,
}

impl Default for CameraPath {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_per_frame: [0.4, 0.15],
            rotate_per_frame: 0.002,
        }
    }
}

impl CameraPath {
    pub fn transform_at(&self, frame: u32) -> ScreenTransform {
        let f = frame as f32;
        ScreenTransform::new(
            self.scale,
            Angle::new(self.rotate_per_frame * f),
            Vec2::new(self.pan_per_frame[0] * f, self.pan_per_frame[1] * f),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketSpec {
    pub name: String,
    #[serde(default)]
    pub icons: usize,
    #[serde(default)]
    pub labels: usize,
    #[serde(default = "default_spacing")]
    pub spacing_px: f32,
    #[serde(default = "default_icon_size")]
    pub icon_size: [f32; 2],
    #[serde(default = "default_label_size")]
    pub label_size: [f32; 2],
    #[serde(default = "default_label_offset")]
    pub label_offset: [f32; 2],
}

fn default_spacing() -> f32 {
    64.0
}

fn default_icon_size() -> [f32; 2] {
    [24.0, 24.0]
}

fn default_label_size() -> [f32; 2] {
    [56.0, 14.0]
}

fn default_label_offset() -> [f32; 2] {
    [0.0, 22.0]
}

impl BucketSpec {
    pub fn overlay_count(&self) -> usize {
        self.icons + self.labels
    }
}

impl Scene {
    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let scene: Scene = toml::from_str(&text)?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.buckets.is_empty() {
            return Err("scene has no buckets".into());
        }
        for spec in &self.buckets {
            if spec.overlay_count() > MAX_OVERLAYS_PER_BUCKET {
                return Err(format!(
                    "bucket '{}' has {} overlays; u16 indexing allows at most {}",
                    spec.name,
                    spec.overlay_count(),
                    MAX_OVERLAYS_PER_BUCKET
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn viewport_rect(&self) -> ScreenRect {
        ScreenRect::new(
            Vec2::ZERO,
            Vec2::new(self.viewport.width, self.viewport.height),
        )
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
            },
            camera: CameraPath::default(),
            buckets: vec![
                BucketSpec {
                    name: "poi".into(),
                    icons: 24,
                    labels: 24,
                    spacing_px: default_spacing(),
                    icon_size: default_icon_size(),
                    label_size: default_label_size(),
                    label_offset: default_label_offset(),
                },
                BucketSpec {
                    name: "transit".into(),
                    icons: 16,
                    labels: 8,
                    spacing_px: 96.0,
                    icon_size: [16.0, 16.0],
                    label_size: default_label_size(),
                    label_offset: default_label_offset(),
                },
            ],
        }
    }
}
