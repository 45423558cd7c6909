use dir_treemap::model::{NodeId, NodeSpec, Tree};
use dir_treemap::treemap::{slice_and_dice, LayoutPolicy, Rect, Rounding, SplitAxis};
use proptest::prelude::*;

fn spec_strategy() -> impl Strategy<Value = NodeSpec> {
    let leaf = prop_oneof![
        1 => Just(0_u64),
        4 => 1_u64..5_000,
    ]
    .prop_map(|size| NodeSpec::leaf("f", size));

    leaf.prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(|children| NodeSpec::dir("d", children))
    })
}

fn bounds_strategy() -> impl Strategy<Value = Rect> {
    (-50_i32..50, -50_i32..50, 0_i32..400, 0_i32..400)
        .prop_map(|(x, y, width, height)| Rect::new(x, y, width, height))
}

fn policy_strategy() -> impl Strategy<Value = LayoutPolicy> {
    (
        prop_oneof![Just(Rounding::Round), Just(Rounding::Floor)],
        prop_oneof![Just(SplitAxis::Vertical), Just(SplitAxis::Horizontal)],
    )
        .prop_map(|(rounding, square_split)| LayoutPolicy {
            rounding,
            square_split,
        })
}

fn internal_nodes(tree: &Tree) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let children = tree.children(id);
        if !children.is_empty() {
            found.push(id);
        }
        stack.extend(children);
    }
    found
}

proptest! {
    #[test]
    fn internal_sizes_equal_child_sums(spec in spec_strategy()) {
        let tree = Tree::from_spec(&spec);
        for id in internal_nodes(&tree) {
            let sum: u64 = tree.children(id).iter().map(|child| tree.data_size(*child)).sum();
            prop_assert_eq!(tree.data_size(id), sum);
        }
    }

    #[test]
    fn cells_tile_the_bounds(
        spec in spec_strategy(),
        bounds in bounds_strategy(),
        policy in policy_strategy(),
    ) {
        let tree = Tree::from_spec(&spec);
        let cells = slice_and_dice(&tree, bounds, &policy).unwrap();

        if tree.data_size(tree.root()) == 0 {
            prop_assert!(cells.is_empty());
            return Ok(());
        }

        let area: i64 = cells.iter().map(|cell| cell.rect.area()).sum();
        prop_assert_eq!(area, bounds.area());

        for cell in &cells {
            prop_assert!(cell.rect.width >= 0 && cell.rect.height >= 0);
            prop_assert!(cell.rect.x >= bounds.x && cell.rect.right() <= bounds.right());
            prop_assert!(cell.rect.y >= bounds.y && cell.rect.bottom() <= bounds.bottom());
        }
    }

    #[test]
    fn cell_interiors_are_disjoint(
        spec in spec_strategy(),
        bounds in bounds_strategy(),
        policy in policy_strategy(),
    ) {
        let tree = Tree::from_spec(&spec);
        let cells = slice_and_dice(&tree, bounds, &policy).unwrap();
        let solid: Vec<Rect> = cells
            .iter()
            .map(|cell| cell.rect)
            .filter(|rect| rect.area() > 0)
            .collect();

        for (index, a) in solid.iter().enumerate() {
            for b in &solid[index + 1..] {
                prop_assert!(!a.overlaps(*b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn every_non_empty_leaf_gets_exactly_one_cell(
        spec in spec_strategy(),
        bounds in bounds_strategy(),
        policy in policy_strategy(),
    ) {
        let tree = Tree::from_spec(&spec);
        let cells = slice_and_dice(&tree, bounds, &policy).unwrap();

        let expected: Vec<NodeId> = tree
            .leaves(tree.root())
            .filter(|id| tree.data_size(*id) > 0)
            .collect();
        let drawn: Vec<NodeId> = cells.iter().map(|cell| cell.node).collect();
        prop_assert_eq!(drawn, expected);
    }

    #[test]
    fn layout_is_deterministic(
        spec in spec_strategy(),
        bounds in bounds_strategy(),
        policy in policy_strategy(),
    ) {
        let tree = Tree::from_spec(&spec);
        let first = slice_and_dice(&tree, bounds, &policy).unwrap();
        let second = slice_and_dice(&tree, bounds, &policy).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn edits_keep_sizes_aggregated(spec in spec_strategy(), picks in prop::collection::vec(0_usize..64, 1..8)) {
        let mut tree = Tree::from_spec(&spec);
        for (step, pick) in picks.into_iter().enumerate() {
            let leaves: Vec<NodeId> = tree.leaves(tree.root()).collect();
            let target = leaves[pick % leaves.len()];
            let _ = match step % 3 {
                0 => tree.grow_leaf(target).map(|_| ()),
                1 => tree.shrink_leaf(target).map(|_| ()),
                _ => tree.remove_leaf(target),
            };

            for id in internal_nodes(&tree) {
                let sum: u64 = tree.children(id).iter().map(|child| tree.data_size(*child)).sum();
                prop_assert_eq!(tree.data_size(id), sum);
            }
        }
    }
}
