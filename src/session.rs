//! The single object a host shell talks to.
//!
//! [`AnnotationSession`] owns the folder, the page on screen, the draw controller and the
//! list selection. Hosts call one method per interaction and afterwards rebuild every view
//! from [`AnnotationSession::overlay`] and [`AnnotationSession::list_entries`]; nothing
//! else is kept in sync by hand.

use std::path::Path;

use crate::config::Config;
use crate::draw::{DragPreview, DrawController, DrawOutcome};
use crate::error::{AnnotateError, IntegrityError, UserCondition};
use crate::geometry::{SurfacePoint, SurfaceRect, SurfaceSize};
use crate::image_source::{DecodedImageProbe, ImageProbe};
use crate::navigator::{Direction, SessionNavigator};
use crate::page::ImagePage;
use crate::palette::{PaletteColor, color_at};
use crate::store::BBox;

const SHORTEN_KEEP: usize = 20;

#[derive(Debug)]
pub struct LoadedFolder {
    pub navigator: SessionNavigator,
    pub page: ImagePage,
}

#[derive(Debug)]
pub enum SessionState {
    NoFolder,
    Loaded(Box<LoadedFolder>),
}

/// One box as drawn on the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayRect {
    pub index: usize,
    pub rect: SurfaceRect,
    pub color: [u8; 3],
    pub stroke_width: f32,
    pub highlighted: bool,
}

/// One row of the box list.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub index: usize,
    pub label: String,
    pub color: [u8; 3],
    pub selected: bool,
}

/// Emphasis the host should draw over the selected box.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    pub index: usize,
    pub rect: SurfaceRect,
    pub color: PaletteColor,
    pub stroke_width: f32,
}

pub struct AnnotationSession<P: ImageProbe = DecodedImageProbe> {
    config: Config,
    probe: P,
    surface: SurfaceSize,
    state: SessionState,
    draw: DrawController,
    selected: Option<usize>,
}

impl AnnotationSession<DecodedImageProbe> {
    pub fn new(config: Config) -> Self {
        Self::with_probe(config, DecodedImageProbe)
    }
}

impl<P: ImageProbe> AnnotationSession<P> {
    pub fn with_probe(config: Config, probe: P) -> Self {
        let surface = SurfaceSize::new(config.default_canvas_width, config.default_canvas_height);
        let draw = DrawController::new(config.min_box_size);
        Self {
            config,
            probe,
            surface,
            state: SessionState::NoFolder,
            draw,
            selected: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SessionState::Loaded(_))
    }

    pub fn navigator(&self) -> Option<&SessionNavigator> {
        self.loaded().map(|l| &l.navigator)
    }

    pub fn page(&self) -> Option<&ImagePage> {
        self.loaded().map(|l| &l.page)
    }

    pub fn boxes(&self) -> &[BBox] {
        self.page().map(|p| p.store().all()).unwrap_or(&[])
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.draw.is_dragging()
    }

    fn loaded(&self) -> Option<&LoadedFolder> {
        match &self.state {
            SessionState::Loaded(loaded) => Some(loaded),
            SessionState::NoFolder => None,
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedFolder, AnnotateError> {
        match &mut self.state {
            SessionState::Loaded(loaded) => Ok(loaded),
            SessionState::NoFolder => Err(UserCondition::NoFolder.into()),
        }
    }

    /// Open `folder` at its first image. A folder already open is saved first and stays
    /// open if the new one fails.
    pub fn open_folder(&mut self, folder: &Path) -> Result<(), AnnotateError> {
        if self.is_loaded() {
            self.save_current()?;
        }
        let navigator = SessionNavigator::open(folder, &self.config)?;
        let page =
            navigator.load_current(&self.probe, self.surface, self.config.box_colors.len())?;
        self.state = SessionState::Loaded(Box::new(LoadedFolder { navigator, page }));
        self.reset_interaction();
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), AnnotateError> {
        self.advance(Direction::Previous)
    }

    pub fn next(&mut self) -> Result<(), AnnotateError> {
        self.advance(Direction::Next)
    }

    pub fn advance(&mut self, direction: Direction) -> Result<(), AnnotateError> {
        let loaded = match &mut self.state {
            SessionState::Loaded(loaded) => loaded,
            SessionState::NoFolder => return Err(UserCondition::NoFolder.into()),
        };
        loaded
            .navigator
            .advance(direction, &mut loaded.page, &self.probe)?;
        self.reset_interaction();
        Ok(())
    }

    /// Jump to image `index` with the same save-then-load contract as [`Self::advance`].
    pub fn go_to(&mut self, index: usize) -> Result<(), AnnotateError> {
        let loaded = match &mut self.state {
            SessionState::Loaded(loaded) => loaded,
            SessionState::NoFolder => return Err(UserCondition::NoFolder.into()),
        };
        loaded.navigator.go_to(index, &mut loaded.page, &self.probe)?;
        self.reset_interaction();
        Ok(())
    }

    pub fn save_current(&mut self) -> Result<(), AnnotateError> {
        let loaded = self.loaded_mut()?;
        loaded.page.persist(loaded.navigator.sidecars())?;
        log::info!(
            "Saved {} boxes for {}",
            loaded.page.store().len(),
            loaded.page.image().display()
        );
        Ok(())
    }

    /// Final save before the host goes away. Nothing to do without a folder.
    pub fn shutdown(&mut self) -> Result<(), AnnotateError> {
        self.draw.cancel();
        if self.is_loaded() {
            self.save_current()?;
        }
        Ok(())
    }

    pub fn begin_drag(&mut self, point: SurfacePoint) {
        if self.is_loaded() {
            self.draw.on_press(point);
        }
    }

    pub fn update_drag(&self, point: SurfacePoint) -> Option<DragPreview> {
        let page = self.page()?;
        self.draw.on_drag(point, page.mapper(), page.colors())
    }

    pub fn end_drag(&mut self, point: SurfacePoint) -> DrawOutcome {
        let SessionState::Loaded(loaded) = &mut self.state else {
            self.draw.cancel();
            return DrawOutcome::Discarded;
        };
        let (mapper, store, colors) = loaded.page.parts_mut();
        let outcome = self.draw.on_release(point, mapper, store, colors);
        if let DrawOutcome::Committed { .. } = outcome {
            self.selected = None;
        }
        outcome
    }

    pub fn cancel_drag(&mut self) {
        self.draw.cancel();
    }

    pub fn delete_last_box(&mut self) -> Result<BBox, AnnotateError> {
        let loaded = self.loaded_mut()?;
        let removed = loaded
            .page
            .store_mut()
            .remove_last()
            .ok_or(UserCondition::NothingToDelete)?;
        self.draw.cancel();
        self.selected = None;
        Ok(removed)
    }

    /// Delete the box selected in the list. `selection` is the list widget's current
    /// selection; exactly one entry is accepted.
    pub fn delete_box_at(&mut self, selection: &[usize]) -> Result<BBox, AnnotateError> {
        let loaded = self.loaded_mut()?;
        let store = loaded.page.store_mut();
        if store.is_empty() {
            return Err(UserCondition::NothingToDelete.into());
        }
        let index = match selection {
            [] => return Err(UserCondition::NothingSelected.into()),
            [index] => *index,
            many => {
                return Err(UserCondition::MultiSelect { count: many.len() }.into());
            }
        };
        let removed = store.remove_at(index)?;
        self.draw.cancel();
        self.selected = None;
        Ok(removed)
    }

    pub fn select_box(&mut self, index: usize) -> Result<Highlight, AnnotateError> {
        let highlight = {
            let page = self.page().ok_or(UserCondition::NoFolder)?;
            let store = page.store();
            let bbox = store.get(index).ok_or(IntegrityError::IndexMisaligned {
                index,
                len: store.len(),
            })?;
            Highlight {
                index,
                rect: page
                    .mapper()
                    .to_surface_rect(bbox.top, bbox.left, bbox.bottom, bbox.right),
                color: self.color_for(bbox.color_index),
                stroke_width: self.config.enhance_box_width,
            }
        };
        self.selected = Some(index);
        Ok(highlight)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// New surface size. Display rectangles are derived, so they follow on next read.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), AnnotateError> {
        let surface = SurfaceSize::new(width, height).validate()?;
        if let SessionState::Loaded(loaded) = &mut self.state {
            loaded.page.resize(surface)?;
        }
        self.surface = surface;
        Ok(())
    }

    pub fn overlay(&self) -> Vec<OverlayRect> {
        let Some(page) = self.page() else {
            return vec![];
        };
        page.store()
            .all()
            .iter()
            .enumerate()
            .map(|(index, b)| {
                let highlighted = self.selected == Some(index);
                OverlayRect {
                    index,
                    rect: page.mapper().to_surface_rect(b.top, b.left, b.bottom, b.right),
                    color: self.color_for(b.color_index).rgb,
                    stroke_width: if highlighted {
                        self.config.enhance_box_width
                    } else {
                        self.config.box_width
                    },
                    highlighted,
                }
            })
            .collect()
    }

    pub fn list_entries(&self) -> Vec<ListEntry> {
        self.boxes()
            .iter()
            .enumerate()
            .map(|(index, b)| ListEntry {
                index,
                label: b.label(),
                color: self.color_for(b.color_index).rgb,
                selected: self.selected == Some(index),
            })
            .collect()
    }

    pub fn preview_color(&self) -> Option<[u8; 3]> {
        self.page().map(|p| self.color_for(p.colors().peek()).rgb)
    }

    pub fn color_for(&self, color_index: usize) -> PaletteColor {
        color_at(&self.config.box_colors, color_index)
            .cloned()
            .unwrap_or_else(|| PaletteColor::new("red", [255, 0, 0]))
    }

    /// Status bar text, or `None` before a folder is open.
    pub fn status_line(&self) -> Option<String> {
        let nav = self.navigator()?;
        let folder = shorten_folder(&nav.folder().to_string_lossy(), self.surface.width);
        Some(fill_placeholders(
            &self.config.status_format,
            &[
                folder,
                nav.image_count().to_string(),
                (nav.current_index() + 1).to_string(),
            ],
        ))
    }

    fn reset_interaction(&mut self) {
        self.draw.cancel();
        self.selected = None;
    }
}

fn shorten_folder(folder: &str, surface_width: f32) -> String {
    let len = folder.chars().count();
    if (len as f32) < surface_width / 7.0 || len <= SHORTEN_KEEP * 2 {
        return folder.to_owned();
    }
    let head: String = folder.chars().take(SHORTEN_KEEP).collect();
    let tail: String = folder.chars().skip(len - SHORTEN_KEEP).collect();
    format!("{head}...{tail}")
}

fn fill_placeholders(format: &str, values: &[String]) -> String {
    let mut out = String::new();
    let mut parts = format.split("{}");
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for (i, part) in parts.enumerate() {
        out.push_str(values.get(i).map(String::as_str).unwrap_or(""));
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_paths_are_kept() {
        assert_eq!(shorten_folder("/data/imgs", 400.0), "/data/imgs");
    }

    #[test]
    fn long_paths_keep_both_ends() {
        let folder = "/home/someone/datasets/very/long/path/to/the/images";
        let short = shorten_folder(folder, 140.0);
        assert_eq!(short, "/home/someone/datase...g/path/to/the/images");
    }

    #[test]
    fn placeholders_fill_in_order() {
        let out = fill_placeholders(
            "Directory: {} | Total: {}, Current: {}",
            &["/x".into(), "2".into(), "1".into()],
        );
        assert_eq!(out, "Directory: /x | Total: 2, Current: 1");
    }

    #[test]
    fn no_folder_rejects_folder_operations() {
        let mut session = AnnotationSession::new(Config::default());
        for err in [
            session.next().unwrap_err(),
            session.save_current().unwrap_err(),
            session.delete_last_box().unwrap_err(),
            session.select_box(0).unwrap_err(),
        ] {
            assert_eq!(err.user_condition(), Some(&UserCondition::NoFolder));
        }
        session.begin_drag(SurfacePoint::new(1.0, 1.0));
        assert!(!session.is_dragging());
        assert_eq!(session.end_drag(SurfacePoint::new(90.0, 90.0)), DrawOutcome::Discarded);
        assert!(session.status_line().is_none());
        session.shutdown().unwrap();
    }

    #[test]
    fn resize_without_folder_only_checks_size() {
        let mut session = AnnotationSession::new(Config::default());
        session.resize(800.0, 600.0).unwrap();
        assert_eq!(session.surface(), SurfaceSize::new(800.0, 600.0));
        assert!(session.resize(0.0, 600.0).is_err());
        assert_eq!(session.surface(), SurfaceSize::new(800.0, 600.0));
    }
}
