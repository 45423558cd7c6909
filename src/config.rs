use crate::treemap::LayoutPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub window_width: f32,
    pub window_height: f32,
    pub layout: LayoutPolicy,
    pub show_cell_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1024.0,
            window_height: 600.0,
            layout: LayoutPolicy::default(),
            show_cell_labels: true,
        }
    }
}
