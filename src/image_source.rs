use std::path::Path;

use crate::error::{AnnotateError, ResourceError};
use crate::geometry::ImageSize;

/// Reports the native resolution of an image file.
pub trait ImageProbe {
    fn dimensions(&self, path: &Path) -> Result<ImageSize, AnnotateError>;
}

/// Reads the header with the `image` crate; pixels are left to the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodedImageProbe;

impl ImageProbe for DecodedImageProbe {
    fn dimensions(&self, path: &Path) -> Result<ImageSize, AnnotateError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|err| ResourceError::ImageUnreadable {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        Ok(ImageSize::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbImage::new(32, 16).save(&path).unwrap();
        assert_eq!(DecodedImageProbe.dimensions(&path).unwrap(), ImageSize::new(32, 16));
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        let err = DecodedImageProbe.dimensions(&path).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Resource(ResourceError::ImageUnreadable { .. })
        ));
    }
}
