//! Command line entry point: argument parsing, source loading and the
//! headless `--print` mode.

use crate::app::{self, Dataset};
use crate::config::Config;
use crate::error::{AppError, InputError};
use crate::model::{NodeSpec, Tree};
use crate::scanner::scan_path;
use crate::treemap::{slice_and_dice, Cell, LayoutPolicy, Rect, Rounding, SplitAxis};
use clap::{ArgAction, Parser, ValueHint};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Draw a directory as a treemap of nested, size-proportional rectangles
#[derive(Parser, Debug)]
#[command(name = "dir-treemap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory or file to draw (a folder picker opens when omitted)
    #[arg(value_hint = ValueHint::AnyPath, conflicts_with = "tree")]
    pub path: Option<PathBuf>,

    /// Draw a tree described in a JSON file instead of scanning the filesystem
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    /// How proportional strip lengths are rounded to pixels
    #[arg(long, value_enum, default_value_t = Rounding::Round)]
    pub rounding: Rounding,

    /// Split direction for exactly square rectangles
    #[arg(long, value_enum, default_value_t = SplitAxis::Vertical)]
    pub square_split: SplitAxis,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u16,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u16,

    /// Print the rectangles to stdout instead of opening a window
    #[arg(long)]
    pub print: bool,

    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            window_width: f32::from(self.width),
            window_height: f32::from(self.height),
            layout: LayoutPolicy {
                rounding: self.rounding,
                square_split: self.square_split,
            },
            ..Config::default()
        }
    }
}

pub fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config();
    let dataset = load_dataset(cli)?;

    if !cli.print {
        return app::run_window(config, dataset);
    }

    let dataset = dataset.ok_or(AppError::MissingSource)?;
    let bounds = Rect::new(0, 0, i32::from(cli.width), i32::from(cli.height));
    let cells = slice_and_dice(&dataset.tree, bounds, &config.layout)?;
    debug!(cells = cells.len(), "layout done");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_cells(&mut out, &dataset.tree, &cells)?;
    out.flush()?;
    Ok(())
}

/// Loads the source named on the command line, if any.
pub fn load_dataset(cli: &Cli) -> Result<Option<Dataset>, InputError> {
    if let Some(spec_path) = &cli.tree {
        let spec = NodeSpec::from_json_file(spec_path)?;
        return Ok(Some(Dataset::from_tree(Tree::from_spec(&spec))));
    }

    match &cli.path {
        Some(path) => {
            let result = scan_path(path)?;
            Ok(Some(Dataset::from_scan(path.clone(), result)))
        }
        None => Ok(None),
    }
}

/// One `x y width height size label` line per cell.
pub fn write_cells(out: &mut impl Write, tree: &Tree, cells: &[Cell]) -> io::Result<()> {
    for cell in cells {
        let Rect {
            x,
            y,
            width,
            height,
        } = cell.rect;
        writeln!(
            out,
            "{x} {y} {width} {height} {} {}",
            tree.data_size(cell.node),
            tree.label(cell.node)
        )?;
    }
    Ok(())
}
