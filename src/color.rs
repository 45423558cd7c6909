use crate::model::{NodeId, Tree};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

const PALETTE: [Rgb; 24] = [
    Rgb(210, 96, 96),
    Rgb(214, 127, 78),
    Rgb(196, 151, 72),
    Rgb(153, 171, 72),
    Rgb(106, 175, 87),
    Rgb(79, 177, 120),
    Rgb(74, 173, 153),
    Rgb(73, 166, 179),
    Rgb(76, 152, 194),
    Rgb(88, 137, 204),
    Rgb(109, 124, 209),
    Rgb(128, 112, 207),
    Rgb(149, 104, 197),
    Rgb(173, 98, 185),
    Rgb(191, 95, 166),
    Rgb(201, 96, 143),
    Rgb(210, 106, 124),
    Rgb(171, 126, 98),
    Rgb(144, 140, 101),
    Rgb(111, 146, 114),
    Rgb(95, 147, 133),
    Rgb(101, 142, 152),
    Rgb(112, 132, 165),
    Rgb(130, 121, 167),
];

/// Fill color for a leaf: a palette entry picked by the leaf's label,
/// darkened with depth. Same tree, same leaf, same color.
pub fn leaf_color(tree: &Tree, id: NodeId) -> Rgb {
    let index = (stable_hash(&tree.label(id)) % PALETTE.len() as u64) as usize;
    shade(PALETTE[index], tree.depth(id))
}

fn shade(base: Rgb, depth: usize) -> Rgb {
    let factor = (1.0 - depth as f32 * 0.03).clamp(0.58, 1.0);
    let scale = |channel: u8| (channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
    Rgb(scale(base.0), scale(base.1), scale(base.2))
}

fn stable_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
