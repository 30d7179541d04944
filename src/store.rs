//! The boxes of the image currently on screen.

use crate::error::IntegrityError;

/// One bounding box in native image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub color_index: usize,
}

impl BBox {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32, color_index: usize) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            color_index,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Both extents strictly above `min_size`.
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width() > min_size && self.height() > min_size
    }

    /// List widget text, `(top, left) -> (bottom, right)`.
    pub fn label(&self) -> String {
        format!(
            "({}, {}) -> ({}, {})",
            self.top as i64, self.left as i64, self.bottom as i64, self.right as i64
        )
    }
}

/// Ordered boxes; insertion order is display, list and file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxStore {
    boxes: Vec<BBox>,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, boxes: Vec<BBox>) {
        self.boxes = boxes;
    }

    pub fn append(&mut self, bbox: BBox) -> usize {
        self.boxes.push(bbox);
        self.boxes.len() - 1
    }

    pub fn remove_last(&mut self) -> Option<BBox> {
        self.boxes.pop()
    }

    pub fn remove_at(&mut self, index: usize) -> Result<BBox, IntegrityError> {
        if index >= self.boxes.len() {
            return Err(IntegrityError::IndexMisaligned {
                index,
                len: self.boxes.len(),
            });
        }
        Ok(self.boxes.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&BBox> {
        self.boxes.get(index)
    }

    pub fn all(&self) -> &[BBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn max_color_index(&self) -> Option<usize> {
        self.boxes.iter().map(|b| b.color_index).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(n: usize) -> BoxStore {
        let mut store = BoxStore::new();
        for i in 0..n {
            let o = i as f32 * 10.0;
            store.append(BBox::new(o, o, o + 5.0, o + 5.0, i));
        }
        store
    }

    #[test]
    fn append_returns_position() {
        let mut store = BoxStore::new();
        assert_eq!(store.append(BBox::new(0.0, 0.0, 4.0, 4.0, 0)), 0);
        assert_eq!(store.append(BBox::new(1.0, 1.0, 4.0, 4.0, 1)), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_at_shifts_later_boxes_down() {
        let mut store = store_of(3);
        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.color_index, 1);
        let colors: Vec<usize> = store.all().iter().map(|b| b.color_index).collect();
        assert_eq!(colors, vec![0, 2]);
        assert_eq!(store.get(1).map(|b| b.top), Some(20.0));
    }

    #[test]
    fn remove_at_out_of_range_fails_without_mutation() {
        let mut store = store_of(2);
        let err = store.remove_at(2).unwrap_err();
        assert!(matches!(err, IntegrityError::IndexMisaligned { index: 2, len: 2 }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_last_on_empty_is_none() {
        let mut store = BoxStore::new();
        assert!(store.remove_last().is_none());
        assert!(store.max_color_index().is_none());
    }

    #[test]
    fn replace_all_discards_previous_boxes() {
        let mut store = store_of(3);
        store.replace_all(vec![BBox::new(1.0, 2.0, 30.0, 40.0, 9)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.max_color_index(), Some(9));
    }

    #[test]
    fn label_truncates_to_integers() {
        let b = BBox::new(10.9, 2.2, 30.5, 40.0, 0);
        assert_eq!(b.label(), "(10, 2) -> (30, 40)");
    }
}
