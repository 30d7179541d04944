use std::path::{Path, PathBuf};

use crate::error::AnnotateError;
use crate::geometry::{CoordinateMapper, MapError, SurfaceSize};
use crate::image_source::ImageProbe;
use crate::palette::ColorCycler;
use crate::sidecar::AnnotationFile;
use crate::store::BoxStore;

/// Everything that belongs to the image on screen. Replaced wholesale on image switch.
#[derive(Clone, Debug)]
pub struct ImagePage {
    image: PathBuf,
    mapper: CoordinateMapper,
    store: BoxStore,
    colors: ColorCycler,
}

impl ImagePage {
    /// Probe the image and read its sidecar. Nothing is returned unless both succeed.
    pub fn open(
        image: &Path,
        probe: &dyn ImageProbe,
        sidecars: &AnnotationFile,
        surface: SurfaceSize,
        palette_len: usize,
    ) -> Result<Self, AnnotateError> {
        let size = probe.dimensions(image)?;
        let mapper = CoordinateMapper::new(size, surface)?;
        let mut store = BoxStore::new();
        store.replace_all(sidecars.load(image)?);
        let mut colors = ColorCycler::new(palette_len);
        colors.reset_from(store.max_color_index());
        log::debug!(
            "Opened {} ({}x{}) with {} boxes",
            image.display(),
            size.width,
            size.height,
            store.len()
        );
        Ok(Self {
            image: image.to_path_buf(),
            mapper,
            store,
            colors,
        })
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn store(&self) -> &BoxStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BoxStore {
        &mut self.store
    }

    pub fn colors(&self) -> &ColorCycler {
        &self.colors
    }

    /// Mapper, store and cycler at once, for the draw controller.
    pub fn parts_mut(&mut self) -> (&CoordinateMapper, &mut BoxStore, &mut ColorCycler) {
        (&self.mapper, &mut self.store, &mut self.colors)
    }

    pub fn resize(&mut self, surface: SurfaceSize) -> Result<(), MapError> {
        self.mapper.resize(surface)
    }

    pub fn persist(&self, sidecars: &AnnotationFile) -> Result<(), AnnotateError> {
        sidecars.save(&self.image, self.store.all())
    }
}
