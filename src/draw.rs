//! Interactive box creation: press, drag with a live preview, release.

use crate::geometry::{CoordinateMapper, SurfacePoint, SurfaceRect};
use crate::palette::ColorCycler;
use crate::store::{BBox, BoxStore};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawState {
    Idle,
    Dragging { anchor: SurfacePoint },
}

/// What the host draws while the pointer is held down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragPreview {
    pub rect: SurfaceRect,
    /// Full-width guide through the pointer.
    pub horizontal: (SurfacePoint, SurfacePoint),
    /// Full-height guide through the pointer.
    pub vertical: (SurfacePoint, SurfacePoint),
    /// Color the box will get if committed.
    pub color_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    Committed { index: usize, bbox: BBox },
    /// Too small, or released without a press. Not an error.
    Discarded,
}

#[derive(Clone, Debug)]
pub struct DrawController {
    state: DrawState,
    min_box_size: f32,
}

impl DrawController {
    pub fn new(min_box_size: f32) -> Self {
        Self {
            state: DrawState::Idle,
            min_box_size,
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DrawState::Dragging { .. })
    }

    /// Starts a new drag; whatever drag was left unfinished is dropped.
    pub fn on_press(&mut self, point: SurfacePoint) {
        self.state = DrawState::Dragging { anchor: point };
    }

    pub fn on_drag(
        &self,
        point: SurfacePoint,
        mapper: &CoordinateMapper,
        colors: &ColorCycler,
    ) -> Option<DragPreview> {
        let DrawState::Dragging { anchor } = self.state else {
            return None;
        };
        let surface = mapper.surface_size();
        let cursor = mapper.clamp(point);
        Some(DragPreview {
            rect: SurfaceRect::from_corners(mapper.clamp(anchor), cursor),
            horizontal: (
                SurfacePoint::new(0.0, cursor.y),
                SurfacePoint::new(surface.width, cursor.y),
            ),
            vertical: (
                SurfacePoint::new(cursor.x, 0.0),
                SurfacePoint::new(cursor.x, surface.height),
            ),
            color_index: colors.peek(),
        })
    }

    /// Finish the drag. Corners are clamped, mapped to image space and truncated to whole
    /// pixels; the box is kept only if both extents exceed the minimum size.
    pub fn on_release(
        &mut self,
        point: SurfacePoint,
        mapper: &CoordinateMapper,
        store: &mut BoxStore,
        colors: &mut ColorCycler,
    ) -> DrawOutcome {
        let DrawState::Dragging { anchor } = std::mem::replace(&mut self.state, DrawState::Idle)
        else {
            return DrawOutcome::Discarded;
        };
        let rect = SurfaceRect::from_corners(mapper.clamp(anchor), mapper.clamp(point));
        let min = mapper.to_image_space(SurfacePoint::new(rect.left, rect.top));
        let max = mapper.to_image_space(SurfacePoint::new(rect.right, rect.bottom));
        let candidate = BBox::new(
            min.y.trunc(),
            min.x.trunc(),
            max.y.trunc(),
            max.x.trunc(),
            colors.peek(),
        );
        if !candidate.exceeds(self.min_box_size) {
            log::debug!(
                "Discarded {}x{} box below minimum {}",
                candidate.width(),
                candidate.height(),
                self.min_box_size
            );
            return DrawOutcome::Discarded;
        }
        let bbox = BBox {
            color_index: colors.next(),
            ..candidate
        };
        let index = store.append(bbox);
        log::debug!("Committed box {index}: {}", bbox.label());
        DrawOutcome::Committed { index, bbox }
    }

    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::geometry::{ImageSize, SurfaceSize};

    fn mapper(native: u32, surface: f32) -> CoordinateMapper {
        CoordinateMapper::new(
            ImageSize::new(native, native),
            SurfaceSize::new(surface, surface),
        )
        .unwrap()
    }

    fn drag(
        ctl: &mut DrawController,
        from: (f32, f32),
        to: (f32, f32),
        m: &CoordinateMapper,
        store: &mut BoxStore,
        colors: &mut ColorCycler,
    ) -> DrawOutcome {
        ctl.on_press(SurfacePoint::new(from.0, from.1));
        ctl.on_release(SurfacePoint::new(to.0, to.1), m, store, colors)
    }

    #[test]
    fn commits_scaled_box_with_next_color() {
        let m = mapper(800, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);

        let out = drag(&mut ctl, (0.0, 0.0), (100.0, 100.0), &m, &mut store, &mut colors);
        assert_eq!(
            out,
            DrawOutcome::Committed {
                index: 0,
                bbox: BBox::new(0.0, 0.0, 200.0, 200.0, 0)
            }
        );
        assert_eq!(ctl.state(), DrawState::Idle);
        assert_eq!(colors.peek(), 1);
    }

    #[test]
    fn reversed_drag_is_normalized_and_clamped() {
        let m = mapper(400, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);

        drag(&mut ctl, (500.0, 300.0), (50.0, -10.0), &m, &mut store, &mut colors);
        assert_eq!(store.all(), &[BBox::new(0.0, 50.0, 300.0, 400.0, 0)]);
    }

    #[rstest]
    #[case((10.0, 10.0), (11.0, 11.0))]
    #[case((10.0, 10.0), (10.0, 10.0))]
    #[case((10.0, 10.0), (200.0, 12.0))]
    #[case((10.0, 10.0), (12.0, 200.0))]
    fn sub_threshold_drags_never_touch_the_store(
        #[case] from: (f32, f32),
        #[case] to: (f32, f32),
    ) {
        let m = mapper(400, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);

        let out = drag(&mut ctl, from, to, &m, &mut store, &mut colors);
        assert_eq!(out, DrawOutcome::Discarded);
        assert!(store.is_empty());
        assert_eq!(colors.peek(), 0);
        assert_eq!(ctl.state(), DrawState::Idle);
    }

    #[test]
    fn threshold_applies_in_image_pixels() {
        // 1.5 surface px is 3 image px at 2x: kept
        let m = mapper(800, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);
        drag(&mut ctl, (10.0, 10.0), (11.5, 11.5), &m, &mut store, &mut colors);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn release_without_press_is_discarded() {
        let m = mapper(400, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);
        let out = ctl.on_release(SurfacePoint::new(90.0, 90.0), &m, &mut store, &mut colors);
        assert_eq!(out, DrawOutcome::Discarded);
        assert!(store.is_empty());
    }

    #[test]
    fn abandoned_drag_is_replaced_by_next_press() {
        let m = mapper(400, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(67);
        let mut ctl = DrawController::new(2.0);

        ctl.on_press(SurfacePoint::new(0.0, 0.0));
        assert!(ctl.on_drag(SurfacePoint::new(300.0, 300.0), &m, &colors).is_some());
        // focus lost, no release
        drag(&mut ctl, (100.0, 100.0), (150.0, 150.0), &m, &mut store, &mut colors);
        assert_eq!(store.all(), &[BBox::new(100.0, 100.0, 150.0, 150.0, 0)]);
    }

    #[test]
    fn preview_is_clamped_with_guides_across_surface() {
        let m = CoordinateMapper::new(ImageSize::new(10, 10), SurfaceSize::new(400.0, 300.0))
            .unwrap();
        let mut colors = ColorCycler::new(67);
        colors.reset_from(Some(4));
        let mut ctl = DrawController::new(2.0);
        assert!(ctl.on_drag(SurfacePoint::new(1.0, 1.0), &m, &colors).is_none());

        ctl.on_press(SurfacePoint::new(50.0, 60.0));
        let preview = ctl.on_drag(SurfacePoint::new(500.0, 20.0), &m, &colors).unwrap();
        assert_eq!(
            preview.rect,
            SurfaceRect {
                left: 50.0,
                top: 20.0,
                right: 400.0,
                bottom: 60.0,
            }
        );
        assert_eq!(
            preview.horizontal,
            (SurfacePoint::new(0.0, 20.0), SurfacePoint::new(400.0, 20.0))
        );
        assert_eq!(
            preview.vertical,
            (SurfacePoint::new(400.0, 0.0), SurfacePoint::new(400.0, 300.0))
        );
        assert_eq!(preview.color_index, 5);
        assert!(ctl.is_dragging());
    }

    #[test]
    fn colors_follow_commit_order() {
        let m = mapper(400, 400.0);
        let mut store = BoxStore::new();
        let mut colors = ColorCycler::new(3);
        let mut ctl = DrawController::new(2.0);
        for i in 0..5 {
            let o = i as f32 * 20.0;
            drag(&mut ctl, (o, o), (o + 10.0, o + 10.0), &m, &mut store, &mut colors);
        }
        let seq: Vec<usize> = store.all().iter().map(|b| b.color_index).collect();
        assert_eq!(seq, vec![0, 1, 2, 0, 1]);
    }
}
