//! Character appearance: a portrait loaded from disk, or a glyph fallback.
//!
//! The portrait is decoded once at startup, scaled to fit the visual area
//! and kept in both orientations so a turn never has to touch pixels again.
//! A missing or broken image is not an error for the pet; it quietly falls
//! back to drawing a glyph.

use image::imageops::FilterType;
use image::RgbaImage;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::wander::Facing;

/// Glyph shown while facing right.
pub const GLYPH_RIGHT: &str = "🐱";

/// Glyph shown while facing left.
pub const GLYPH_LEFT: &str = "🐾";

/// A decoded portrait in both orientations.
#[derive(Debug, Clone)]
pub struct Sprite {
    upright: RgbaImage,
    mirrored: RgbaImage,
}

impl Sprite {
    /// Load and scale a portrait so it fits in a `max_edge` square, keeping
    /// its aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns `Error::ImageReadError` if the file cannot be read and
    /// `Error::ImageDecodeError` if its contents are not a supported image.
    pub fn load(path: impl AsRef<Path>, max_edge: u32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::ImageReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|source| Error::ImageDecodeError {
                path: path.to_path_buf(),
                source,
            })?;

        let upright = decoded
            .resize(max_edge, max_edge, FilterType::Lanczos3)
            .to_rgba8();
        Ok(Self::from_rgba(upright))
    }

    pub fn from_rgba(upright: RgbaImage) -> Self {
        let mirrored = image::imageops::flip_horizontal(&upright);
        Self { upright, mirrored }
    }

    pub fn width(&self) -> u32 {
        self.upright.width()
    }

    pub fn height(&self) -> u32 {
        self.upright.height()
    }

    /// The frame to draw for the given facing. The source art looks right.
    pub fn frame(&self, facing: Facing) -> &RgbaImage {
        match facing {
            Facing::Right => &self.upright,
            Facing::Left => &self.mirrored,
        }
    }
}

/// How the character is drawn.
#[derive(Debug, Clone)]
pub enum Appearance {
    Portrait(Sprite),
    Glyph,
}

impl Appearance {
    /// Load the portrait at `path`, falling back to a glyph on any failure.
    pub fn load_or_glyph(path: impl AsRef<Path>, max_edge: u32) -> Self {
        let path = path.as_ref();
        match Sprite::load(path, max_edge) {
            Ok(sprite) => {
                debug!(
                    path = %path.display(),
                    width = sprite.width(),
                    height = sprite.height(),
                    "loaded character portrait"
                );
                Appearance::Portrait(sprite)
            }
            Err(err) => {
                warn!(error = %err, "no usable character portrait, drawing a glyph instead");
                Appearance::Glyph
            }
        }
    }

    pub fn kind(&self) -> AppearanceKind {
        match self {
            Appearance::Portrait(_) => AppearanceKind::Portrait,
            Appearance::Glyph => AppearanceKind::Glyph,
        }
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match self {
            Appearance::Portrait(sprite) => Some(sprite),
            Appearance::Glyph => None,
        }
    }
}

/// [`Appearance`] without the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceKind {
    Portrait,
    Glyph,
}

impl AppearanceKind {
    /// What the surface should draw for the given facing.
    pub fn visual(self, facing: Facing) -> CharacterVisual {
        match (self, facing) {
            (AppearanceKind::Portrait, facing) => CharacterVisual::Portrait {
                mirrored: facing == Facing::Left,
            },
            (AppearanceKind::Glyph, Facing::Right) => CharacterVisual::Glyph(GLYPH_RIGHT),
            (AppearanceKind::Glyph, Facing::Left) => CharacterVisual::Glyph(GLYPH_LEFT),
        }
    }
}

/// A render request for the character window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterVisual {
    /// The portrait, horizontally mirrored when `mirrored` is set.
    Portrait { mirrored: bool },
    /// Literal text centered in the window.
    Glyph(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("desktop_pet_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_image_is_read_error() {
        let result = Sprite::load(temp_path("does_not_exist.png"), 120);
        assert!(matches!(result, Err(Error::ImageReadError { .. })));
    }

    #[test]
    fn test_garbage_image_is_decode_error() {
        let path = temp_path("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = Sprite::load(&path, 120);
        assert!(matches!(result, Err(Error::ImageDecodeError { .. })));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_fallback_to_glyph() {
        let appearance = Appearance::load_or_glyph(temp_path("nope.png"), 120);
        assert_eq!(appearance.kind(), AppearanceKind::Glyph);
        assert!(appearance.sprite().is_none());
    }

    #[test]
    fn test_portrait_is_scaled_and_mirrored() {
        let path = temp_path("portrait.png");
        let mut art = RgbaImage::from_pixel(240, 120, Rgba([0, 0, 255, 255]));
        for y in 0..120 {
            for x in 0..60 {
                art.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
        art.save(&path).unwrap();

        let appearance = Appearance::load_or_glyph(&path, 120);
        let sprite = appearance.sprite().expect("portrait should load");
        assert_eq!((sprite.width(), sprite.height()), (120, 60));

        let right = sprite.frame(Facing::Right);
        let left = sprite.frame(Facing::Left);
        assert!(right.get_pixel(0, 30)[0] > 200);
        assert!(left.get_pixel(119, 30)[0] > 200);
        assert!(left.get_pixel(0, 30)[2] > 200);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_visual_for_facing() {
        assert_eq!(
            AppearanceKind::Portrait.visual(Facing::Left),
            CharacterVisual::Portrait { mirrored: true }
        );
        assert_eq!(
            AppearanceKind::Portrait.visual(Facing::Right),
            CharacterVisual::Portrait { mirrored: false }
        );
        assert_eq!(
            AppearanceKind::Glyph.visual(Facing::Right),
            CharacterVisual::Glyph(GLYPH_RIGHT)
        );
        assert_eq!(
            AppearanceKind::Glyph.visual(Facing::Left),
            CharacterVisual::Glyph(GLYPH_LEFT)
        );
    }
}
