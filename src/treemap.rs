use crate::error::LayoutError;
use crate::model::{NodeId, NodeKind, Tree};
use tracing::instrument;

/// Integer rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn overlaps(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Direction of the cuts used to split a rectangle among children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SplitAxis {
    /// Vertical cuts: children become side-by-side columns.
    #[default]
    Vertical,
    /// Horizontal cuts: children become stacked rows.
    Horizontal,
}

impl SplitAxis {
    fn span(self, bounds: Rect) -> i32 {
        match self {
            Self::Vertical => bounds.width,
            Self::Horizontal => bounds.height,
        }
    }

    fn strip(self, bounds: Rect, offset: i32, length: i32) -> Rect {
        match self {
            Self::Vertical => Rect::new(bounds.x + offset, bounds.y, length, bounds.height),
            Self::Horizontal => Rect::new(bounds.x, bounds.y + offset, bounds.width, length),
        }
    }
}

/// How a child's proportional strip length is turned into whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Rounding {
    /// Nearest pixel, halves rounded up.
    #[default]
    Round,
    /// Always round down.
    Floor,
}

impl Rounding {
    fn share(self, size: u64, total: u64, span: i32) -> i32 {
        let size = u128::from(size);
        let total = u128::from(total);
        let span = u128::from(span.max(0).unsigned_abs());

        let length = match self {
            Self::Round => (2 * size * span + total) / (2 * total),
            Self::Floor => size * span / total,
        };
        i32::try_from(length).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutPolicy {
    pub rounding: Rounding,
    /// Split used when the rectangle is exactly square.
    pub square_split: SplitAxis,
}

impl LayoutPolicy {
    fn axis_for(&self, bounds: Rect) -> SplitAxis {
        if bounds.width > bounds.height {
            SplitAxis::Vertical
        } else if bounds.width < bounds.height {
            SplitAxis::Horizontal
        } else {
            self.square_split
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub rect: Rect,
    pub node: NodeId,
}

/// Slice-and-dice layout of the whole tree.
pub fn slice_and_dice(
    tree: &Tree,
    bounds: Rect,
    policy: &LayoutPolicy,
) -> Result<Vec<Cell>, LayoutError> {
    layout_subtree(tree, tree.root(), bounds, policy)
}

/// Tiles `bounds` with one cell per non-empty leaf below `node`, in
/// depth-first child order. An all-empty subtree produces no cells.
#[instrument(level = "debug", skip(tree, policy))]
pub fn layout_subtree(
    tree: &Tree,
    node: NodeId,
    bounds: Rect,
    policy: &LayoutPolicy,
) -> Result<Vec<Cell>, LayoutError> {
    if bounds.width < 0 || bounds.height < 0 {
        return Err(LayoutError::NegativeExtent {
            width: bounds.width,
            height: bounds.height,
        });
    }
    if bounds.x.checked_add(bounds.width).is_none()
        || bounds.y.checked_add(bounds.height).is_none()
    {
        return Err(LayoutError::OutOfRange {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }

    let mut cells = Vec::new();
    // Pending (node, rect) pairs; children are pushed in reverse so cells
    // come out in depth-first child order.
    let mut pending = vec![(node, bounds)];
    while let Some((id, rect)) = pending.pop() {
        let Some(current) = tree.node(id) else {
            continue;
        };
        if current.data_size() == 0 {
            continue;
        }
        match current.kind() {
            NodeKind::Leaf => cells.push(Cell { rect, node: id }),
            NodeKind::Internal(children) => {
                let strips = split(tree, children, current.data_size(), rect, policy);
                pending.extend(strips.into_iter().rev());
            }
        }
    }
    Ok(cells)
}

/// Cuts `bounds` into one strip per non-empty child.
fn split(
    tree: &Tree,
    children: &[NodeId],
    total: u64,
    bounds: Rect,
    policy: &LayoutPolicy,
) -> Vec<(NodeId, Rect)> {
    let live: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|child| tree.data_size(*child) > 0)
        .collect();

    let axis = policy.axis_for(bounds);
    let span = axis.span(bounds);
    let mut offset = 0;
    let mut strips = Vec::with_capacity(live.len());

    for (index, child) in live.iter().enumerate() {
        let remaining = span - offset;
        // The last strip takes whatever rounding left over.
        let length = if index + 1 == live.len() {
            remaining
        } else {
            policy
                .rounding
                .share(tree.data_size(*child), total, span)
                .min(remaining)
        };

        strips.push((*child, axis.strip(bounds, offset, length)));
        offset += length;
    }
    strips
}

/// The cell under a point; later cells win where cells coincide.
pub fn hit_test(cells: &[Cell], x: i32, y: i32) -> Option<&Cell> {
    cells.iter().rev().find(|cell| cell.rect.contains(x, y))
}

/// Leaf drawn at `(x, y)` when the tree is laid out in `bounds`.
pub fn locate(
    tree: &Tree,
    bounds: Rect,
    policy: &LayoutPolicy,
    x: i32,
    y: i32,
) -> Result<Option<NodeId>, LayoutError> {
    let cells = slice_and_dice(tree, bounds, policy)?;
    Ok(hit_test(&cells, x, y).map(|cell| cell.node))
}
