//! Print queue and physical sheet layout.
//!
//! Queue entries are fully resolved label snapshots. [`layout_sheet`] flows
//! them left-to-right, top-to-bottom onto fixed-size pages.

use crate::model::{CanvasConfig, Rect};
use crate::store::LayerSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved label waiting to be printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintEntry {
    pub id: String,
    pub layers: LayerSet,
}

/// Ordered print queue. Order drives sheet placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrintQueue {
    entries: Vec<PrintEntry>,
}

impl PrintQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot under a fresh id.
    pub fn push(&mut self, layers: LayerSet) -> &PrintEntry {
        self.entries.push(PrintEntry {
            id: Uuid::new_v4().to_string(),
            layers,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn remove(&mut self, index: usize) -> Option<PrintEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Move the entry at `from` so it ends up at `to`. Out-of-range indices
    /// are a no-op. Returns true if the order changed.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn get(&self, index: usize) -> Option<&PrintEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrintEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Sheet layout ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    /// Labels rotated a quarter turn on the page.
    Landscape,
}

/// Physical page parameters, in CSS pixels (96 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_left: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    pub scale: f32,
    pub orientation: Orientation,
}

impl SheetLayout {
    pub const SCALE_MIN: f32 = 0.3;
    pub const SCALE_MAX: f32 = 1.5;

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_nan() {
            Self::SCALE_MIN
        } else {
            scale.clamp(Self::SCALE_MIN, Self::SCALE_MAX)
        };
    }

    /// Size a label occupies on the page.
    pub fn footprint(&self, config: &CanvasConfig) -> (f32, f32) {
        let (w, h) = (config.width * self.scale, config.height * self.scale);
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

impl Default for SheetLayout {
    /// US Letter, 8.5 in × 11 in.
    fn default() -> Self {
        Self {
            page_width: 816.0,
            page_height: 1056.0,
            margin_top: 25.0,
            margin_left: 25.0,
            gap_x: 10.0,
            gap_y: 10.0,
            scale: 0.42,
            orientation: Orientation::Portrait,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    pub entry_id: String,
    /// Position in the queue.
    pub index: usize,
    pub rect: Rect,
    pub rotated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetPage {
    pub labels: Vec<PlacedLabel>,
}

/// Flow the queue onto pages. A label that would cross the right edge
/// starts a new row; one that would cross the bottom starts a new page.
/// The first label of a row or page is always placed, even if oversized.
pub fn layout_sheet(queue: &PrintQueue, config: &CanvasConfig, layout: &SheetLayout) -> Vec<SheetPage> {
    let (w, h) = layout.footprint(config);
    let rotated = layout.orientation == Orientation::Landscape;
    let mut pages: Vec<SheetPage> = Vec::new();
    let mut page = SheetPage::default();
    let (mut x, mut y) = (layout.margin_left, layout.margin_top);

    for (index, entry) in queue.iter().enumerate() {
        let row_start = x == layout.margin_left;
        if !row_start && x + w > layout.page_width {
            x = layout.margin_left;
            y += h + layout.gap_y;
        }
        if !page.labels.is_empty() && y + h > layout.page_height {
            pages.push(std::mem::take(&mut page));
            x = layout.margin_left;
            y = layout.margin_top;
        }
        page.labels.push(PlacedLabel {
            entry_id: entry.id.clone(),
            index,
            rect: Rect {
                x,
                y,
                width: w,
                height: h,
            },
            rotated,
        });
        x += w + layout.gap_x;
    }
    if !page.labels.is_empty() {
        pages.push(page);
    }
    log::debug!("laid out {} label(s) on {} page(s)", queue.len(), pages.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;
    use pretty_assertions::assert_eq;

    fn queue(n: usize) -> PrintQueue {
        let mut q = PrintQueue::new();
        for i in 0..n {
            let layers = LayerSet::from_layers(vec![Layer::text("product-name-1", "Name", &i.to_string())]).unwrap();
            q.push(layers);
        }
        q
    }

    #[test]
    fn letter_portrait_fits_twelve_per_page() {
        let config = CanvasConfig::default();
        let (w, h) = SheetLayout::default().footprint(&config);
        assert!((w - 168.0).abs() < 1e-3 && (h - 252.0).abs() < 1e-3);

        let pages = layout_sheet(&queue(13), &config, &SheetLayout::default());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].labels.len(), 12);
        assert_eq!(pages[1].labels.len(), 1);

        let first = &pages[0].labels[0].rect;
        assert_eq!((first.x, first.y), (25.0, 25.0));
        let second = &pages[0].labels[1].rect;
        assert_eq!(second.x, 25.0 + w + 10.0);
        let fifth = &pages[0].labels[4].rect;
        assert_eq!((fifth.x, fifth.y), (25.0, 25.0 + h + 10.0));
        assert_eq!(pages[1].labels[0].index, 12);
    }

    #[test]
    fn landscape_swaps_footprint() {
        let layout = SheetLayout {
            orientation: Orientation::Landscape,
            ..Default::default()
        };
        let config = CanvasConfig::default();
        let (w, h) = SheetLayout::default().footprint(&config);
        let pages = layout_sheet(&queue(1), &config, &layout);
        let label = &pages[0].labels[0];
        assert!(label.rotated);
        assert_eq!((label.rect.width, label.rect.height), (h, w));
    }

    #[test]
    fn oversized_labels_get_their_own_page() {
        let mut layout = SheetLayout::default();
        layout.set_scale(1.5);
        let pages = layout_sheet(&queue(2), &CanvasConfig::default(), &layout);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn empty_queue_has_no_pages() {
        assert!(layout_sheet(&PrintQueue::new(), &CanvasConfig::default(), &SheetLayout::default()).is_empty());
    }

    #[test]
    fn move_entry_reorders() {
        let mut q = queue(3);
        let ids: Vec<String> = q.iter().map(|e| e.id.clone()).collect();
        assert!(q.move_entry(0, 2));
        let moved: Vec<String> = q.iter().map(|e| e.id.clone()).collect();
        assert_eq!(moved, vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
        assert!(!q.move_entry(0, 7));
        assert!(q.remove(9).is_none());
        assert_eq!(q.remove(0).map(|e| e.id), Some(ids[1].clone()));
    }
}
