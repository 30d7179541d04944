//! Per-image annotation files.
//!
//! `<sidecar dir>/<image file name>.txt`, one line per box:
//! `top left bottom right color_index`, integers, single spaces, `\n` after every line.
//! Coordinates are truncated toward zero when written.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AnnotateError, IntegrityError, ResourceError};
use crate::store::BBox;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationFile {
    dir: PathBuf,
}

impl AnnotationFile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<(), AnnotateError> {
        fs::create_dir_all(&self.dir).map_err(|source| ResourceError::SidecarDir {
            path: self.dir.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn path_for(&self, image: &Path) -> PathBuf {
        let mut name = image
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".txt");
        self.dir.join(name)
    }

    /// Boxes saved for `image`; none when there is no file yet.
    pub fn load(&self, image: &Path) -> Result<Vec<BBox>, AnnotateError> {
        let path = self.path_for(image);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ResourceError::SidecarIo { path, source }.into()),
        };
        let boxes = parse(&path, &text)?;
        log::debug!("Loaded {} boxes from {}", boxes.len(), path.display());
        Ok(boxes)
    }

    /// Replace the whole file with `boxes`.
    pub fn save(&self, image: &Path, boxes: &[BBox]) -> Result<(), AnnotateError> {
        let path = self.path_for(image);
        write_atomic(&path, encode(boxes).as_bytes())
            .map_err(|source| ResourceError::SidecarIo { path: path.clone(), source })?;
        log::debug!("Saved {} boxes to {}", boxes.len(), path.display());
        Ok(())
    }
}

pub fn encode(boxes: &[BBox]) -> String {
    let mut out = String::new();
    for b in boxes {
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            b.top as i64, b.left as i64, b.bottom as i64, b.right as i64, b.color_index
        ));
    }
    out
}

/// Largest coordinate magnitude an `f32` holds exactly.
const MAX_EXACT_COORD: u64 = 1 << 24;

/// Parse a whole file. Blank lines are skipped; any other bad line fails the load.
pub fn parse(path: &Path, text: &str) -> Result<Vec<BBox>, IntegrityError> {
    let mut boxes = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: String| IntegrityError::MalformedLine {
            path: path.to_path_buf(),
            line: n + 1,
            reason,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(malformed(format!("expected 5 fields, found {}", fields.len())));
        }
        let mut coords = [0i64; 4];
        for (slot, field) in coords.iter_mut().zip(&fields[..4]) {
            *slot = field
                .parse()
                .map_err(|_| malformed(format!("{field:?} is not an integer")))?;
            if slot.unsigned_abs() > MAX_EXACT_COORD {
                return Err(malformed(format!("{field} is out of range")));
            }
        }
        let color_index: usize = fields[4]
            .parse()
            .map_err(|_| malformed(format!("{:?} is not a color index", fields[4])))?;
        let [top, left, bottom, right] = coords;
        if top >= bottom || left >= right {
            return Err(malformed(format!(
                "inverted box ({top}, {left}) -> ({bottom}, {right})"
            )));
        }
        boxes.push(BBox::new(
            top as f32,
            left as f32,
            bottom as f32,
            right as f32,
            color_index,
        ));
    }
    Ok(boxes)
}

fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Err(io::Error::other("path has no parent"));
    };
    let Some(file_name) = path.file_name() else {
        return Err(io::Error::other("path has no file name"));
    };
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".easybox.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)?;
    if let Err(err) = file.write_all(contents).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    drop(file);

    if let Err(err) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
