use dir_treemap::scanner::scan_path;
use dir_treemap::treemap::{locate, slice_and_dice, LayoutPolicy, Rect};
use std::fs;
use std::path::MAIN_SEPARATOR;
use tempfile::TempDir;

fn names(tree: &dir_treemap::Tree, cells: &[dir_treemap::Cell]) -> Vec<(String, Rect)> {
    cells
        .iter()
        .map(|cell| {
            let name = tree.node(cell.node).unwrap().name().to_string();
            (name, cell.rect)
        })
        .collect()
}

#[test]
fn two_files_split_a_wide_canvas_into_columns() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("A");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("x.txt"), vec![b'x'; 100]).unwrap();
    fs::write(root.join("y.txt"), vec![b'y'; 300]).unwrap();

    let tree = scan_path(&root).unwrap().tree;
    let cells = slice_and_dice(&tree, Rect::new(0, 0, 400, 100), &LayoutPolicy::default()).unwrap();

    assert_eq!(
        names(&tree, &cells),
        [
            ("x.txt".to_string(), Rect::new(0, 0, 100, 100)),
            ("y.txt".to_string(), Rect::new(100, 0, 300, 100)),
        ]
    );
}

#[test]
fn nested_directory_fills_its_column() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("A");
    fs::create_dir_all(root.join("B")).unwrap();
    fs::write(root.join("B").join("z"), vec![0_u8; 50]).unwrap();
    fs::write(root.join("w"), vec![0_u8; 50]).unwrap();

    let tree = scan_path(&root).unwrap().tree;
    let bounds = Rect::new(0, 0, 100, 100);
    let policy = LayoutPolicy::default();
    let cells = slice_and_dice(&tree, bounds, &policy).unwrap();

    assert_eq!(
        names(&tree, &cells),
        [
            ("z".to_string(), Rect::new(0, 0, 50, 100)),
            ("w".to_string(), Rect::new(50, 0, 50, 100)),
        ]
    );

    let clicked = locate(&tree, bounds, &policy, 10, 90).unwrap().unwrap();
    assert_eq!(tree.label(clicked), format!("A{MAIN_SEPARATOR}B{MAIN_SEPARATOR}z"));
}

#[test]
fn directory_of_empty_files_draws_nothing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a"), b"").unwrap();
    fs::create_dir(temp.path().join("b")).unwrap();

    let tree = scan_path(temp.path()).unwrap().tree;
    let cells = slice_and_dice(&tree, Rect::new(0, 0, 800, 600), &LayoutPolicy::default()).unwrap();
    assert!(cells.is_empty());
}
