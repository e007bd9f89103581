use indextree::NodeId;
use tracing::trace;

use crate::tree::TmTree;

/// Axis-aligned rectangle in display-space units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Containment including all four edges.
    pub fn contains(&self, pos: Point) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// Move a position sitting on the right or bottom edge one unit inwards, so
    /// shared edges resolve to the left/top neighbour.
    pub(crate) fn nudge_inside(&self, pos: Point) -> Point {
        let mut inside = pos;
        if self.width > 0 && inside.x == self.right() {
            inside.x -= 1;
        }
        if self.height > 0 && inside.y == self.bottom() {
            inside.y -= 1;
        }
        inside
    }
}

impl From<(u32, u32, u32, u32)> for Rect {
    fn from((x, y, width, height): (u32, u32, u32, u32)) -> Self {
        Self::new(x, y, width, height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// Direction in which a rectangle is cut among its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Children side by side, varying x.
    Vertical,
    /// Children stacked, varying y.
    Horizontal,
}

impl Axis {
    /// Cut across the longer side; squares are stacked.
    pub fn for_rect(rect: Rect) -> Self {
        if rect.width > rect.height {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }
}

/// Slice `container` among items proportionally to `sizes`.
///
/// Each item gets `floor(extent * size / total)` along the slicing axis and
/// the full orthogonal extent. The last item takes whatever remains, so the
/// returned rectangles tile the container exactly. With `total == 0` every
/// item but the last gets no extent.
pub fn slice_layout(container: Rect, sizes: &[u64], total: u64) -> Vec<Rect> {
    let axis = Axis::for_rect(container);
    let (start, extent) = match axis {
        Axis::Vertical => (container.x, container.width),
        Axis::Horizontal => (container.y, container.height),
    };
    let far = start.saturating_add(extent);

    let mut offset = start;
    let mut rects = Vec::with_capacity(sizes.len());
    for (i, &size) in sizes.iter().enumerate() {
        let remaining = far.saturating_sub(offset);
        let span = if i + 1 == sizes.len() {
            remaining
        } else if total == 0 {
            0
        } else {
            let share = extent as u128 * size as u128 / total as u128;
            share.min(remaining as u128) as u32
        };

        rects.push(match axis {
            Axis::Vertical => Rect::new(offset, container.y, span, container.height),
            Axis::Horizontal => Rect::new(container.x, offset, container.width, span),
        });
        offset += span;
    }
    rects
}

impl TmTree {
    /// Lay out the subtree rooted at `id` inside `rect`.
    ///
    /// Every descendant gets a rectangle regardless of expansion state. Nodes
    /// with no size (and the empty sentinel) get [`Rect::ZERO`]; their children
    /// are still sliced from `rect`.
    pub fn update_rectangles(&mut self, id: NodeId, rect: Rect) {
        let (data_size, is_empty) = {
            let node = self.node(id);
            (node.data_size, node.is_empty())
        };

        self.node_mut(id).rect = if is_empty || data_size == 0 {
            Rect::ZERO
        } else {
            rect
        };

        let children = self.children(id);
        if children.is_empty() {
            return;
        }

        let sizes: Vec<u64> = children.iter().map(|&c| self.data_size(c)).collect();
        let child_rects = slice_layout(rect, &sizes, data_size);
        trace!(?id, ?rect, count = children.len(), "sliced rectangle");

        for (child, child_rect) in children.into_iter().zip(child_rects) {
            self.update_rectangles(child, child_rect);
        }
    }
}
