//! Folder scanning and the persist-then-load walk over its images.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};

use crate::config::Config;
use crate::error::{AnnotateError, IntegrityError, ResourceError, UserCondition};
use crate::geometry::SurfaceSize;
use crate::image_source::ImageProbe;
use crate::page::ImagePage;
use crate::sidecar::AnnotationFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Images of the folder directly under `dir` whose extension is one of `exts`, exactly.
/// Sorted by path, without duplicates.
pub fn scan_images(dir: &Path, exts: &[String]) -> Result<Vec<PathBuf>, AnnotateError> {
    let folder_err = |source| ResourceError::FolderAccess {
        path: dir.to_path_buf(),
        source,
    };
    let meta = fs::metadata(dir).map_err(folder_err)?;
    if !meta.is_dir() {
        return Err(folder_err(std::io::Error::other("not a directory")).into());
    }

    let escaped = Pattern::escape(&dir.to_string_lossy());
    let mut images = vec![];
    for ext in exts.iter().filter(|e| !e.is_empty()) {
        let pattern = Path::new(&escaped)
            .join(format!("*.{}", Pattern::escape(ext)))
            .to_string_lossy()
            .to_string();
        let entries = glob(&pattern)
            .map_err(|err| folder_err(std::io::Error::other(err.to_string())))?;
        for entry in entries {
            let path = entry.map_err(|err| folder_err(err.into()))?;
            if path.is_file() {
                images.push(path);
            }
        }
    }
    images.sort();
    images.dedup();
    Ok(images)
}

/// The sorted image list of one folder and which of them is on screen.
#[derive(Clone, Debug)]
pub struct SessionNavigator {
    folder: PathBuf,
    images: Vec<PathBuf>,
    current: usize,
    sidecars: AnnotationFile,
}

impl SessionNavigator {
    /// Scan `folder` and make sure its sidecar directory exists.
    pub fn open(folder: &Path, config: &Config) -> Result<Self, AnnotateError> {
        let images = scan_images(folder, &config.supported_img_exts)?;
        if images.is_empty() {
            return Err(UserCondition::NoImages {
                folder: folder.to_path_buf(),
            }
            .into());
        }
        let sidecars = AnnotationFile::new(folder.join(&config.sidecar_dir_name));
        sidecars.ensure_dir()?;
        log::info!("Opened {} with {} images", folder.display(), images.len());
        Ok(Self {
            folder: folder.to_path_buf(),
            images,
            current: 0,
            sidecars,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_image(&self) -> &Path {
        &self.images[self.current]
    }

    pub fn sidecars(&self) -> &AnnotationFile {
        &self.sidecars
    }

    /// Index one step away, or the boundary condition that forbids it.
    pub fn target(&self, direction: Direction) -> Result<usize, UserCondition> {
        match direction {
            Direction::Previous if self.current == 0 => Err(UserCondition::FirstImage),
            Direction::Previous => Ok(self.current - 1),
            Direction::Next if self.current + 1 >= self.images.len() => {
                Err(UserCondition::LastImage)
            }
            Direction::Next => Ok(self.current + 1),
        }
    }

    pub fn load_current(
        &self,
        probe: &dyn ImageProbe,
        surface: SurfaceSize,
        palette_len: usize,
    ) -> Result<ImagePage, AnnotateError> {
        ImagePage::open(self.current_image(), probe, &self.sidecars, surface, palette_len)
    }

    pub fn advance(
        &mut self,
        direction: Direction,
        page: &mut ImagePage,
        probe: &dyn ImageProbe,
    ) -> Result<(), AnnotateError> {
        let target = self.target(direction)?;
        self.go_to(target, page, probe)
    }

    /// Save `page`, then load image `index` into it. If the new image cannot be loaded,
    /// the index and `page` stay on the (already saved) outgoing image.
    pub fn go_to(
        &mut self,
        index: usize,
        page: &mut ImagePage,
        probe: &dyn ImageProbe,
    ) -> Result<(), AnnotateError> {
        if index >= self.images.len() {
            return Err(IntegrityError::IndexMisaligned {
                index,
                len: self.images.len(),
            }
            .into());
        }
        page.persist(&self.sidecars)?;
        let next = ImagePage::open(
            &self.images[index],
            probe,
            &self.sidecars,
            page.mapper().surface_size(),
            page.colors().palette_len(),
        )?;
        *page = next;
        self.current = index;
        log::debug!("Now at image {}/{}", index + 1, self.images.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::geometry::ImageSize;
    use crate::store::BBox;

    struct FakeProbe(HashMap<String, ImageSize>);

    impl ImageProbe for FakeProbe {
        fn dimensions(&self, path: &Path) -> Result<ImageSize, AnnotateError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.0.get(&name).copied().ok_or_else(|| {
                ResourceError::ImageUnreadable {
                    path: path.to_path_buf(),
                    reason: "fake".into(),
                }
                .into()
            })
        }
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[fixture]
    fn folder() -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), &["b.png", "a.jpg", "c.JPG", "notes.txt", "d.Jpg", "e.jpe"]);
        tmp
    }

    fn exts() -> Vec<String> {
        Config::default().supported_img_exts
    }

    #[rstest]
    fn scan_matches_exact_extensions_sorted(folder: TempDir) {
        let names: Vec<String> = scan_images(folder.path(), &exts())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.JPG", "e.jpe"]);
    }

    #[rstest]
    fn scan_deduplicates_repeated_extensions(folder: TempDir) {
        let mut doubled = exts();
        doubled.push("jpg".into());
        assert_eq!(scan_images(folder.path(), &doubled).unwrap().len(), 4);
    }

    #[test]
    fn missing_folder_is_a_resource_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scan_images(&tmp.path().join("gone"), &exts()).unwrap_err();
        assert!(matches!(err, AnnotateError::Resource(ResourceError::FolderAccess { .. })));
    }

    #[test]
    fn empty_folder_reports_no_images_and_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), &["readme.md"]);
        let err = SessionNavigator::open(tmp.path(), &Config::default()).unwrap_err();
        assert!(matches!(err.user_condition(), Some(UserCondition::NoImages { .. })));
        assert!(!tmp.path().join("easybox").exists());
    }

    #[rstest]
    fn open_creates_sidecar_dir(folder: TempDir) {
        let nav = SessionNavigator::open(folder.path(), &Config::default()).unwrap();
        assert!(folder.path().join("easybox").is_dir());
        assert_eq!(nav.current_index(), 0);
        assert_eq!(nav.image_count(), 4);
    }

    #[rstest]
    fn target_respects_boundaries(folder: TempDir) {
        let mut nav = SessionNavigator::open(folder.path(), &Config::default()).unwrap();
        assert_eq!(nav.target(Direction::Previous), Err(UserCondition::FirstImage));
        assert_eq!(nav.target(Direction::Next), Ok(1));
        nav.current = 3;
        assert_eq!(nav.target(Direction::Next), Err(UserCondition::LastImage));
    }

    #[rstest]
    fn failed_load_keeps_outgoing_image(folder: TempDir) {
        let mut sizes = HashMap::new();
        sizes.insert("a.jpg".to_owned(), ImageSize::new(100, 100));
        let probe = FakeProbe(sizes);
        let mut nav = SessionNavigator::open(folder.path(), &Config::default()).unwrap();
        let mut page = nav
            .load_current(&probe, SurfaceSize::new(100.0, 100.0), 67)
            .unwrap();
        page.store_mut().append(BBox::new(1.0, 1.0, 50.0, 50.0, 0));

        let err = nav.advance(Direction::Next, &mut page, &probe).unwrap_err();
        assert!(matches!(err, AnnotateError::Resource(ResourceError::ImageUnreadable { .. })));
        assert_eq!(nav.current_index(), 0);
        assert_eq!(page.image().file_name().unwrap(), "a.jpg");
        assert_eq!(page.store().len(), 1);
        let saved = fs::read_to_string(folder.path().join("easybox/a.jpg.txt")).unwrap();
        assert_eq!(saved, "1 1 50 50 0\n");
    }

    #[rstest]
    fn go_to_out_of_range_is_rejected(folder: TempDir) {
        let mut sizes = HashMap::new();
        sizes.insert("a.jpg".to_owned(), ImageSize::new(100, 100));
        let probe = FakeProbe(sizes);
        let mut nav = SessionNavigator::open(folder.path(), &Config::default()).unwrap();
        let mut page = nav
            .load_current(&probe, SurfaceSize::new(100.0, 100.0), 67)
            .unwrap();
        let err = nav.go_to(9, &mut page, &probe).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::DataIntegrity(IntegrityError::IndexMisaligned { .. })
        ));
        assert!(!folder.path().join("easybox/a.jpg.txt").exists());
    }
}
