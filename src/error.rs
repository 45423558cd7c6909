use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a root descriptor into a tree.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot access {}: {source}", .path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {}", .path.display(), walk_reason(.source))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid tree description in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// walkdir's own message repeats the path.
fn walk_reason(error: &walkdir::Error) -> String {
    error
        .io_error()
        .map_or_else(|| error.to_string(), ToString::to_string)
}

impl InputError {
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Inaccessible { path, source }
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("target rectangle has negative extent ({width}x{height})")]
    NegativeExtent { width: i32, height: i32 },

    #[error("target rectangle at ({x}, {y}) with extent {width}x{height} leaves the pixel range")]
    OutOfRange {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Rejected in-memory edit of a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node is not part of this tree")]
    UnknownNode,

    #[error("not a leaf: {0}")]
    NotALeaf(String),

    #[error("the root node cannot be removed")]
    RootRemoval,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("window failed: {0}")]
    Window(#[from] eframe::Error),

    #[error("--print needs a PATH or --tree source")]
    MissingSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let error = InputError::from_io(
            PathBuf::from("missing"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(error, InputError::NotFound(_)));
        assert_eq!(error.to_string(), "path does not exist: missing");
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let error = InputError::from_io(
            PathBuf::from("locked"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(error, InputError::Inaccessible { .. }));
        assert_eq!(error.to_string(), "cannot access locked: denied");
    }
}
