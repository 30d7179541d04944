//! Mapping between the on-screen surface and native image pixels.
//!
//! The surface is whatever area the host stretches the image over. Its size changes
//! whenever the window is resized, so every mapping goes through a [`CoordinateMapper`]
//! that is rebuilt (or [`CoordinateMapper::resize`]d) first.

use std::fmt;

/// Size of the display surface in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Errors unless both sides are positive.
    pub fn validate(self) -> Result<Self, MapError> {
        // also rejects NaN
        if self.width > 0.0 && self.height > 0.0 {
            Ok(self)
        } else {
            Err(MapError::ZeroSurface {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Native resolution of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImagePoint {
    pub x: f32,
    pub y: f32,
}

impl ImagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface space, `left <= right` and `top <= bottom`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl SurfaceRect {
    /// Rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: SurfacePoint, b: SurfacePoint) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapError {
    ZeroSurface { width: f32, height: f32 },
    ZeroImage { width: u32, height: u32 },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSurface { width, height } => {
                write!(f, "display surface has no area ({width}x{height})")
            }
            Self::ZeroImage { width, height } => {
                write!(f, "image has no pixels ({width}x{height})")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Converts between surface and image space for one image at one surface size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    image: ImageSize,
    surface: SurfaceSize,
    width_ratio: f32,
    height_ratio: f32,
}

impl CoordinateMapper {
    pub fn new(image: ImageSize, surface: SurfaceSize) -> Result<Self, MapError> {
        if image.width == 0 || image.height == 0 {
            return Err(MapError::ZeroImage {
                width: image.width,
                height: image.height,
            });
        }
        let surface = surface.validate()?;
        Ok(Self {
            image,
            surface,
            width_ratio: image.width as f32 / surface.width,
            height_ratio: image.height as f32 / surface.height,
        })
    }

    /// Recompute the ratios for a new surface size. On error the old ratios stay.
    pub fn resize(&mut self, surface: SurfaceSize) -> Result<(), MapError> {
        *self = Self::new(self.image, surface)?;
        Ok(())
    }

    pub fn image_size(&self) -> ImageSize {
        self.image
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    pub fn ratios(&self) -> (f32, f32) {
        (self.width_ratio, self.height_ratio)
    }

    pub fn clamp(&self, p: SurfacePoint) -> SurfacePoint {
        SurfacePoint {
            x: p.x.clamp(0.0, self.surface.width),
            y: p.y.clamp(0.0, self.surface.height),
        }
    }

    pub fn to_image_space(&self, p: SurfacePoint) -> ImagePoint {
        let p = self.clamp(p);
        ImagePoint {
            x: p.x * self.width_ratio,
            y: p.y * self.height_ratio,
        }
    }

    pub fn to_surface_space(&self, p: ImagePoint) -> SurfacePoint {
        SurfacePoint {
            x: p.x / self.width_ratio,
            y: p.y / self.height_ratio,
        }
    }

    /// Surface rectangle for image-space edges.
    pub fn to_surface_rect(&self, top: f32, left: f32, bottom: f32, right: f32) -> SurfaceRect {
        let min = self.to_surface_space(ImagePoint::new(left, top));
        let max = self.to_surface_space(ImagePoint::new(right, bottom));
        SurfaceRect::from_corners(min, max)
    }
}
