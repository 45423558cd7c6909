use crate::error::InputError;
use crate::model::{NodeKind, Tree};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace};
use walkdir::WalkDir;

const PROGRESS_INTERVAL: u64 = 400;

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub entries_scanned: u64,
    pub files_scanned: u64,
    pub directories_scanned: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub tree: Tree,
    pub stats: ScanStats,
}

/// Builds a size tree for `root_path`.
///
/// Directory members are visited in file name order and symlinks are
/// measured, not followed. Any unreadable member fails the whole scan.
#[instrument(level = "debug")]
pub fn scan_path(root_path: &Path) -> Result<ScanResult, InputError> {
    let started = Instant::now();
    let metadata =
        fs::metadata(root_path).map_err(|source| InputError::from_io(root_path.into(), source))?;

    let root_name = root_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| root_path.display().to_string());

    let mut stats = ScanStats {
        entries_scanned: 1,
        ..Default::default()
    };

    if !metadata.is_dir() {
        stats.files_scanned = 1;
        stats.elapsed = started.elapsed();
        let tree = Tree::with_root(root_name, NodeKind::Leaf, metadata.len())
            .with_separator(std::path::MAIN_SEPARATOR_STR);
        return Ok(ScanResult { tree, stats });
    }

    stats.directories_scanned = 1;
    let mut tree = Tree::with_root(root_name, NodeKind::Internal(Vec::new()), 0)
        .with_separator(std::path::MAIN_SEPARATOR_STR);

    // ancestors[d] is the directory node at walk depth d.
    let mut ancestors = vec![tree.root()];

    let walker = WalkDir::new(root_path)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1);

    for entry_result in walker {
        let entry = entry_result.map_err(|error| walk_error(root_path, error))?;
        stats.entries_scanned = stats.entries_scanned.saturating_add(1);

        ancestors.truncate(entry.depth());
        let Some(&parent) = ancestors.last() else {
            continue;
        };

        let name = entry.file_name().to_string_lossy().to_string();

        if entry.file_type().is_dir() {
            stats.directories_scanned = stats.directories_scanned.saturating_add(1);
            ancestors.push(tree.attach(parent, name, 0));
        } else {
            let size = entry
                .metadata()
                .map_err(|error| walk_error(entry.path(), error))?
                .len();
            stats.files_scanned = stats.files_scanned.saturating_add(1);
            trace!(path = %entry.path().display(), size, "file");
            tree.attach(parent, name, size);
        }

        if stats.entries_scanned % PROGRESS_INTERVAL == 0 {
            debug!(
                entries = stats.entries_scanned,
                current = %entry.path().display(),
                "scan progress"
            );
        }
    }

    tree.settle_sizes();
    stats.elapsed = started.elapsed();

    info!(
        root = %root_path.display(),
        bytes = tree.data_size(tree.root()),
        files = stats.files_scanned,
        directories = stats.directories_scanned,
        elapsed = ?stats.elapsed,
        "scan finished"
    );

    Ok(ScanResult { tree, stats })
}

fn walk_error(fallback: &Path, error: walkdir::Error) -> InputError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(fallback));

    InputError::Walk {
        path,
        source: error,
    }
}
