use crate::color::{leaf_color, Rgb};
use crate::config::Config;
use crate::error::AppError;
use crate::format::ByteSize;
use crate::model::{NodeId, Tree};
use crate::scanner::{scan_path, ScanResult, ScanStats};
use crate::treemap::{hit_test, slice_and_dice, Cell, Rect};
use egui::{self, Color32};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A loaded tree plus where it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tree: Tree,
    pub root_path: Option<PathBuf>,
    pub stats: Option<ScanStats>,
}

impl Dataset {
    pub fn from_scan(root_path: PathBuf, result: ScanResult) -> Self {
        Self {
            tree: result.tree,
            root_path: Some(root_path),
            stats: Some(result.stats),
        }
    }

    pub fn from_tree(tree: Tree) -> Self {
        Self {
            tree,
            root_path: None,
            stats: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppMode {
    AwaitingDirectory,
    Ready,
    Error,
}

#[derive(Debug, Clone)]
struct LayoutCache {
    generation: u64,
    width_px: i32,
    height_px: i32,
    cells: Vec<Cell>,
    fills: Vec<Color32>,
}

pub struct TreemapApp {
    mode: AppMode,
    config: Config,
    dataset: Option<Dataset>,
    error_message: Option<String>,
    startup_prompted: bool,
    // Bumped on every change to the tree so the layout cache is rebuilt.
    generation: u64,
    layout_cache: Option<LayoutCache>,
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
}

pub fn run_window(config: Config, dataset: Option<Dataset>) -> Result<(), AppError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("dir-treemap")
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "dir-treemap",
        options,
        Box::new(move |_creation_context| Ok(Box::new(TreemapApp::new(config, dataset)))),
    )?;
    Ok(())
}

impl TreemapApp {
    pub fn new(config: Config, dataset: Option<Dataset>) -> Self {
        let mode = if dataset.is_some() {
            AppMode::Ready
        } else {
            AppMode::AwaitingDirectory
        };

        Self {
            mode,
            config,
            startup_prompted: dataset.is_some(),
            dataset,
            error_message: None,
            generation: 0,
            layout_cache: None,
            hovered: None,
            selected: None,
        }
    }

    fn pick_and_scan(&mut self) {
        if let Some(directory) = rfd::FileDialog::new()
            .set_title("Select root directory")
            .pick_folder()
        {
            self.load_directory(directory);
        }
    }

    fn load_directory(&mut self, root_path: PathBuf) {
        self.generation = self.generation.wrapping_add(1);
        self.layout_cache = None;
        self.hovered = None;
        self.selected = None;

        match scan_path(&root_path) {
            Ok(result) => {
                self.dataset = Some(Dataset::from_scan(root_path, result));
                self.error_message = None;
                self.mode = AppMode::Ready;
            }
            Err(error) => {
                warn!(%error, "scan failed");
                self.dataset = None;
                self.error_message = Some(error.to_string());
                self.mode = AppMode::Error;
            }
        }
    }

    /// `label  size` of a node, as printed on click.
    fn describe(&self, id: NodeId) -> Option<String> {
        let tree = &self.dataset.as_ref()?.tree;
        tree.node(id)?;
        Some(format!("{}  {}", tree.label(id), tree.data_size(id)))
    }

    fn toggle_selection(&mut self, id: NodeId) {
        if self.selected == Some(id) {
            self.selected = None;
            return;
        }

        self.selected = Some(id);
        if let Some(text) = self.describe(id) {
            info!(leaf = %text, "selected");
            println!("{text}");
        }
    }

    fn remove_leaf(&mut self, id: NodeId) {
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };

        match dataset.tree.remove_leaf(id) {
            Ok(()) => {
                self.generation = self.generation.wrapping_add(1);
                self.hovered = None;
                if self.selected == Some(id) {
                    self.selected = None;
                }
            }
            Err(error) => warn!(%error, "cannot remove leaf"),
        }
    }

    fn resize_selected(&mut self, grow: bool) {
        let Some(selected) = self.selected else {
            return;
        };
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };

        let result = if grow {
            dataset.tree.grow_leaf(selected)
        } else {
            dataset.tree.shrink_leaf(selected)
        };

        match result {
            Ok(size) => {
                debug!(size, grow, "resized selected leaf");
                self.generation = self.generation.wrapping_add(1);
            }
            Err(error) => warn!(%error, "cannot resize leaf"),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (grow, shrink) = ctx.input(|input| {
            (
                input.key_pressed(egui::Key::ArrowUp),
                input.key_pressed(egui::Key::ArrowDown),
            )
        });

        if grow {
            self.resize_selected(true);
        } else if shrink {
            self.resize_selected(false);
        }
    }

    fn cache_needs_rebuild(&self, width_px: i32, height_px: i32) -> bool {
        match &self.layout_cache {
            Some(cache) => {
                cache.generation != self.generation
                    || cache.width_px != width_px
                    || cache.height_px != height_px
            }
            None => true,
        }
    }

    fn rebuild_layout(&mut self, width_px: i32, height_px: i32) {
        let Some(dataset) = self.dataset.as_ref() else {
            self.layout_cache = None;
            return;
        };

        let bounds = Rect::new(0, 0, width_px, height_px);
        match slice_and_dice(&dataset.tree, bounds, &self.config.layout) {
            Ok(cells) => {
                let fills = cells
                    .iter()
                    .map(|cell| to_color32(leaf_color(&dataset.tree, cell.node)))
                    .collect();
                self.layout_cache = Some(LayoutCache {
                    generation: self.generation,
                    width_px,
                    height_px,
                    cells,
                    fills,
                });
            }
            Err(error) => {
                warn!(%error, "layout failed");
                self.layout_cache = None;
            }
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Select root directory...").clicked() {
                self.pick_and_scan();
            }

            let root_path = self
                .dataset
                .as_ref()
                .and_then(|dataset| dataset.root_path.clone());

            match &root_path {
                Some(root) => ui.label(format!("Root: {}", root.display())),
                None => ui.label("Root: (not selected)"),
            };

            if ui
                .add_enabled(root_path.is_some(), egui::Button::new("Rescan"))
                .clicked()
            {
                if let Some(root) = root_path {
                    self.load_directory(root);
                }
            }

            ui.separator();
            ui.checkbox(&mut self.config.show_cell_labels, "Show labels in cells");
        });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let focus = self.selected.or(self.hovered);
            match focus.and_then(|id| self.describe(id)) {
                Some(text) => ui.small(text),
                None => ui.small(
                    "Left click: select | Right click: hide | Up/Down: resize selected by 1%",
                ),
            };
        });
    }

    fn render_error_state(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.heading("Scan failed");

            if let Some(error) = &self.error_message {
                ui.colored_label(Color32::from_rgb(210, 70, 70), error);
            }

            if ui.button("Pick another directory").clicked() {
                self.pick_and_scan();
            }
        });
    }

    fn render_ready_state(&mut self, ui: &mut egui::Ui) {
        let total_size = {
            let Some(dataset) = self.dataset.as_ref() else {
                ui.label("No tree loaded.");
                return;
            };
            let tree = &dataset.tree;
            let total_size = tree.data_size(tree.root());

            ui.horizontal_wrapped(|ui| {
                ui.label(format!("Total size: {}", ByteSize(total_size)));
                if let Some(stats) = &dataset.stats {
                    ui.separator();
                    ui.label(format!("Files: {}", stats.files_scanned));
                    ui.label(format!("Directories: {}", stats.directories_scanned));
                    ui.label(format!("Elapsed: {:.2?}", stats.elapsed));
                }
            });

            total_size
        };

        ui.separator();

        if total_size == 0 {
            ui.label("Nothing to draw: every file is empty.");
            return;
        }

        let available = ui.available_size();
        if available.x < 1.0 || available.y < 1.0 {
            return;
        }

        let (canvas_rect, response) = ui.allocate_exact_size(available, egui::Sense::click());
        let width_px = canvas_rect.width().floor() as i32;
        let height_px = canvas_rect.height().floor() as i32;

        if self.cache_needs_rebuild(width_px, height_px) {
            self.rebuild_layout(width_px, height_px);
        }

        let (Some(cache), Some(dataset)) = (self.layout_cache.as_ref(), self.dataset.as_ref())
        else {
            return;
        };
        let tree = &dataset.tree;
        let origin = canvas_rect.min;

        let painter = ui.painter_at(canvas_rect);
        painter.rect_filled(canvas_rect, 0.0, Color32::from_rgb(26, 30, 34));

        for (cell, fill) in cache.cells.iter().zip(&cache.fills) {
            if cell.rect.area() == 0 {
                continue;
            }

            let rect = to_screen(origin, cell.rect);
            painter.rect_filled(rect, 0.0, *fill);
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(1.0, Color32::from_black_alpha(45)),
            );

            if self.config.show_cell_labels && rect.width() > 95.0 && rect.height() > 20.0 {
                let Some(node) = tree.node(cell.node) else {
                    continue;
                };
                let label = format!("{} ({})", node.name(), ByteSize(node.data_size()));
                let max_chars = (rect.width() / 7.0).floor().max(6.0) as usize;

                painter.text(
                    rect.left_top() + egui::vec2(4.0, 4.0),
                    egui::Align2::LEFT_TOP,
                    truncate_label(&label, max_chars),
                    egui::TextStyle::Small.resolve(ui.style()),
                    Color32::WHITE,
                );
            }
        }

        if let Some(cell) = self
            .selected
            .and_then(|selected| cache.cells.iter().find(|cell| cell.node == selected))
        {
            painter.rect_stroke(
                to_screen(origin, cell.rect),
                0.0,
                egui::Stroke::new(2.0, Color32::WHITE),
            );
        }

        let leaf_at = |pos: egui::Pos2| {
            let local = pos - origin;
            hit_test(&cache.cells, local.x.floor() as i32, local.y.floor() as i32)
                .map(|cell| cell.node)
        };

        let hovered = response.hover_pos().and_then(leaf_at);
        let clicked = if response.clicked() {
            response.interact_pointer_pos().and_then(leaf_at)
        } else {
            None
        };
        let hidden = if response.secondary_clicked() {
            response.interact_pointer_pos().and_then(leaf_at)
        } else {
            None
        };

        if let Some(id) = hovered {
            if let Some(node) = tree.node(id) {
                #[allow(deprecated)]
                let _ = egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new("treemap_hover"),
                    |ui| {
                        ui.label(format!("Name: {}", node.name()));
                        ui.label(format!(
                            "Size: {} ({} bytes)",
                            ByteSize(node.data_size()),
                            node.data_size()
                        ));
                        ui.label(format!("Path: {}", tree.label(id)));
                    },
                );
            }
        }

        self.hovered = hovered;
        if let Some(id) = clicked {
            self.toggle_selection(id);
        }
        if let Some(id) = hidden {
            self.remove_leaf(id);
        }
    }
}

impl eframe::App for TreemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.startup_prompted {
            self.startup_prompted = true;
            self.pick_and_scan();
        }

        self.handle_keys(ctx);

        egui::TopBottomPanel::top("top_controls").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status_bar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.mode {
            AppMode::AwaitingDirectory => {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.heading("dir-treemap");
                    ui.label("Select a directory to draw its size treemap.");
                    if ui.button("Choose directory").clicked() {
                        self.pick_and_scan();
                    }
                });
            }
            AppMode::Ready => self.render_ready_state(ui),
            AppMode::Error => self.render_error_state(ui),
        });
    }
}

fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn to_screen(origin: egui::Pos2, rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    if max_chars <= 3 {
        return "...".to_string();
    }

    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}
