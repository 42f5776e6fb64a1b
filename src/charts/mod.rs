//! Charts module - chart requests and rendering

mod fallback;
mod renderer;
mod request;
mod treemap;

pub use fallback::{render_all, render_with_fallback, RenderFailure, RenderSummary};
pub use renderer::{
    palette_color, BitmapRenderer, ChartRenderer, RenderError, RenderedChart, PALETTE,
};
pub use request::{ChartError, ChartKind, ChartRequest, ChartTable};
pub use treemap::{treemap_layout, TreemapCell};
