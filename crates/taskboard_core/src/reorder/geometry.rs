//! Pointer-to-sibling geometry for drag reordering.
//!
//! # Invariants
//! - Nearest sibling is chosen by absolute distance between pointer Y and the
//!   sibling's vertical center; ties go to the earlier sibling.
//! - Pointer strictly above the center inserts before, otherwise after.
//! - Every computation is O(siblings) and allocation-free.

use crate::model::EntityId;
use std::collections::HashMap;

/// Vertical extent of one rendered sibling element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub top: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Layout source supplied by the rendering layer.
///
/// Returns `None` for ids that are not currently rendered.
pub trait SiblingLayout {
    fn measure(&self, id: EntityId) -> Option<ElementBox>;
}

impl SiblingLayout for HashMap<EntityId, ElementBox> {
    fn measure(&self, id: EntityId) -> Option<ElementBox> {
        self.get(&id).copied()
    }
}

/// Uniform rows stacked from `origin_y` in the given id order.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedLayout {
    rows: HashMap<EntityId, usize>,
    origin_y: f64,
    row_height: f64,
}

impl StackedLayout {
    /// A repeated id keeps its first row.
    pub fn new(ids: Vec<EntityId>, origin_y: f64, row_height: f64) -> Self {
        let mut rows = HashMap::with_capacity(ids.len());
        for (index, id) in ids.into_iter().enumerate() {
            rows.entry(id).or_insert(index);
        }
        Self {
            rows,
            origin_y,
            row_height,
        }
    }

    /// Vertical center of the row at `index`.
    pub fn row_center(&self, index: usize) -> f64 {
        self.origin_y + self.row_height * index as f64 + self.row_height / 2.0
    }
}

impl SiblingLayout for StackedLayout {
    fn measure(&self, id: EntityId) -> Option<ElementBox> {
        let index = *self.rows.get(&id)?;
        Some(ElementBox::new(
            self.origin_y + self.row_height * index as f64,
            self.row_height,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

/// Visual insertion hint for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropHint {
    #[default]
    None,
    InsertBefore(EntityId),
    InsertAfter(EntityId),
}

impl DropHint {
    pub fn anchor(&self) -> Option<(EntityId, InsertSide)> {
        match *self {
            Self::None => None,
            Self::InsertBefore(id) => Some((id, InsertSide::Before)),
            Self::InsertAfter(id) => Some((id, InsertSide::After)),
        }
    }
}

/// Closest measured sibling to a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestSibling {
    /// Index in document order.
    pub index: usize,
    pub id: EntityId,
    pub side: InsertSide,
}

/// Finds the sibling whose center is closest to `pointer_y`.
///
/// Unmeasured siblings and boxes with a non-finite center are skipped. Returns `None` when nothing is measured
/// or `pointer_y` is not finite.
pub fn nearest_sibling(
    siblings: &[EntityId],
    layout: &dyn SiblingLayout,
    pointer_y: f64,
) -> Option<NearestSibling> {
    if !pointer_y.is_finite() {
        return None;
    }
    let mut best: Option<(f64, NearestSibling)> = None;
    for (index, id) in siblings.iter().copied().enumerate() {
        let Some(bounds) = layout.measure(id) else {
            continue;
        };
        let center = bounds.center_y();
        if !center.is_finite() {
            continue;
        }
        let distance = (pointer_y - center).abs();
        if best.is_some_and(|(best_distance, _)| distance >= best_distance) {
            continue;
        }
        let side = if pointer_y < center {
            InsertSide::Before
        } else {
            InsertSide::After
        };
        best = Some((distance, NearestSibling { index, id, side }));
    }
    best.map(|(_, nearest)| nearest)
}

/// Final index of the dragged item once it is removed from `origin` and
/// reinserted next to the anchor at `anchor`.
pub fn insertion_index(origin: usize, anchor: usize, side: InsertSide) -> usize {
    let slot = match side {
        InsertSide::Before => anchor,
        InsertSide::After => anchor + 1,
    };
    if slot > origin {
        slot - 1
    } else {
        slot
    }
}
