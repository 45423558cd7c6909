pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod scanner;
pub mod treemap;

pub use error::{AppError, InputError, LayoutError, TreeError};
pub use model::{Node, NodeId, NodeKind, NodeSpec, Tree};
pub use treemap::{slice_and_dice, Cell, LayoutPolicy, Rect};
