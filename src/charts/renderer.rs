//! Static Chart Renderer
//! Draws chart requests to PNG files with plotters.
//!
//! Each chart kind maps to one drawing routine:
//! - Donut: pie with a 0.3 hole and percentage labels
//! - Bar / HorizontalBar: one bar per category
//! - StackedBar: one stack per row, legend per column
//! - Treemap: squarified cells labelled with their counts
//! - Notice: title plus a centred message

use super::request::{ChartError, ChartKind, ChartRequest, ChartTable};
use super::treemap::{treemap_layout, TreemapCell};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Color palette for categories
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    InvalidChart(#[from] ChartError),
    #[error("cannot lay out {} chart '{title}'", .kind.as_str())]
    Layout { kind: ChartKind, title: String },
    #[error("failed to draw {} chart '{title}': {message}", .kind.as_str())]
    Draw {
        kind: ChartKind,
        title: String,
        message: String,
    },
}

/// Outcome of drawing one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub name: String,
    pub kind: ChartKind,
    pub requested: ChartKind,
    pub path: Option<PathBuf>,
}

impl RenderedChart {
    pub fn for_request(request: &ChartRequest, path: Option<PathBuf>) -> Self {
        Self {
            name: request.name.clone(),
            kind: request.kind,
            requested: request.requested,
            path,
        }
    }
}

/// Draws a single chart request.
///
/// Implementations must be shareable across the render pool.
pub trait ChartRenderer: Sync {
    fn render(&self, index: usize, request: &ChartRequest) -> Result<RenderedChart, RenderError>;
}

/// Writes one PNG per request into an output directory.
pub struct BitmapRenderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl BitmapRenderer {
    pub fn new(output_dir: &Path, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            width,
            height,
        }
    }

    /// File a request at `index` is written to.
    pub fn output_path(&self, index: usize, request: &ChartRequest) -> PathBuf {
        self.output_dir
            .join(format!("{:02}_{}.png", index + 1, request.name))
    }

    fn draw_error(request: &ChartRequest, err: impl std::fmt::Display) -> RenderError {
        RenderError::Draw {
            kind: request.kind,
            title: request.title.clone(),
            message: err.to_string(),
        }
    }

    fn draw(root: &Area<'_>, request: &ChartRequest) -> Result<(), RenderError> {
        let result = match (&request.kind, &request.table) {
            (ChartKind::Donut, ChartTable::Categories(data)) => draw_donut(root, request, data),
            (ChartKind::Bar, ChartTable::Categories(data)) => draw_bars(root, request, data),
            (ChartKind::HorizontalBar, ChartTable::Categories(data)) => {
                draw_horizontal_bars(root, request, data)
            }
            (ChartKind::Treemap, ChartTable::Categories(data)) => {
                let (w, h) = root.dim_in_pixel();
                let values: Vec<f64> = data.iter().map(|(_, v)| *v).collect();
                // Leave room for the caption
                let cells = treemap_layout(&values, f64::from(w), f64::from(h.saturating_sub(60)))
                    .ok_or_else(|| RenderError::Layout {
                        kind: request.kind,
                        title: request.title.clone(),
                    })?;
                draw_treemap(root, request, data, &cells)
            }
            (ChartKind::StackedBar, ChartTable::Matrix { rows, columns, values }) => {
                draw_stacked_bars(root, request, rows, columns, values)
            }
            (ChartKind::Notice, ChartTable::Message(message)) => {
                draw_notice(root, request, message)
            }
            _ => {
                return Err(RenderError::Layout {
                    kind: request.kind,
                    title: request.title.clone(),
                })
            }
        };

        result.map_err(|e| Self::draw_error(request, e))
    }
}

impl ChartRenderer for BitmapRenderer {
    fn render(&self, index: usize, request: &ChartRequest) -> Result<RenderedChart, RenderError> {
        request.validate()?;

        let path = self.output_path(index, request);
        debug!(
            chart = %request.name,
            kind = request.kind.as_str(),
            path = %path.display(),
            "rendering chart"
        );

        {
            let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
            Self::draw(&root, request)?;
        }

        Ok(RenderedChart::for_request(request, Some(path)))
    }
}

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

fn segment_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn value_ceiling(data: &[(String, f64)]) -> f64 {
    let max = data.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_donut(root: &Area<'_>, request: &ChartRequest, data: &[(String, f64)]) -> DrawResult {
    root.fill(&WHITE)?;
    let area = root.titled(&request.title, (FONT, 28))?;

    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.38;
    let sizes: Vec<f64> = data.iter().map(|(_, v)| *v).collect();
    let colors: Vec<RGBColor> = (0..data.len()).map(palette_color).collect();
    let labels: Vec<&str> = data.iter().map(|(l, _)| l.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.donut_hole(radius * 0.3);
    pie.label_style((FONT, 16).into_font().color(&BLACK));
    pie.percentages((FONT, 14).into_font().color(&BLACK));
    area.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn draw_bars(root: &Area<'_>, request: &ChartRequest, data: &[(String, f64)]) -> DrawResult {
    root.fill(&WHITE)?;
    let labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    let n = data.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..value_ceiling(data))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| segment_label(&labels, v))
        .x_desc(request.x_label.as_deref().unwrap_or(""))
        .y_desc(request.y_label.as_deref().unwrap_or(""))
        .draw()?;

    chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
            palette_color(i).filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_horizontal_bars(
    root: &Area<'_>,
    request: &ChartRequest,
    data: &[(String, f64)],
) -> DrawResult {
    root.fill(&WHITE)?;
    let labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    let n = data.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(280)
        .build_cartesian_2d(0f64..value_ceiling(data), (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| segment_label(&labels, v))
        .x_desc(request.x_label.as_deref().unwrap_or(""))
        .y_desc(request.y_label.as_deref().unwrap_or(""))
        .draw()?;

    chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
            PALETTE[0].filled(),
        );
        bar.set_margin(3, 3, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_stacked_bars(
    root: &Area<'_>,
    request: &ChartRequest,
    rows: &[String],
    columns: &[String],
    values: &[Vec<f64>],
) -> DrawResult {
    root.fill(&WHITE)?;
    let n = rows.len();
    let top = values
        .iter()
        .map(|row| row.iter().sum::<f64>())
        .fold(100.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| segment_label(rows, v))
        .x_desc(request.x_label.as_deref().unwrap_or(""))
        .y_desc(request.y_label.as_deref().unwrap_or(""))
        .draw()?;

    for (j, column) in columns.iter().enumerate() {
        let color = palette_color(j);
        chart
            .draw_series(values.iter().enumerate().map(|(i, row)| {
                let base: f64 = row[..j].iter().sum();
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), base),
                        (SegmentValue::Exact(i + 1), base + row[j]),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 10, 10);
                bar
            }))?
            .label(column.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_treemap(
    root: &Area<'_>,
    request: &ChartRequest,
    data: &[(String, f64)],
    cells: &[TreemapCell],
) -> DrawResult {
    root.fill(&WHITE)?;
    let area = root.titled(&request.title, (FONT, 28))?;

    for (i, (cell, (label, value))) in cells.iter().zip(data).enumerate() {
        let x0 = cell.x.round() as i32;
        let y0 = cell.y.round() as i32;
        let x1 = (cell.x + cell.width).round() as i32;
        let y1 = (cell.y + cell.height).round() as i32;

        area.draw(&Rectangle::new([(x0, y0), (x1, y1)], palette_color(i).filled()))?;
        area.draw(&Rectangle::new([(x0, y0), (x1, y1)], WHITE.stroke_width(2)))?;

        if x1 - x0 > 60 && y1 - y0 > 24 {
            area.draw(&Text::new(
                format!("{label} ({value})"),
                (x0 + 6, y0 + 6),
                (FONT, 15).into_font().color(&WHITE),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_notice(root: &Area<'_>, request: &ChartRequest, message: &str) -> DrawResult {
    root.fill(&WHITE)?;
    let area = root.titled(&request.title, (FONT, 28))?;
    let (_, h) = area.dim_in_pixel();

    area.draw(&Text::new(
        message.to_string(),
        (40, (h / 2) as i32),
        (FONT, 22).into_font().color(&BLACK),
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(dir: &Path) -> BitmapRenderer {
        BitmapRenderer::new(dir, 400, 300)
    }

    #[test]
    fn test_output_path_is_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let request = ChartRequest::notice("travel_modes", "Modes", "No data");

        let path = renderer(dir.path()).output_path(2, &request);
        assert_eq!(path, dir.path().join("03_travel_modes.png"));
    }

    #[test]
    fn test_mismatched_table_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let request = ChartRequest::new(
            "modes",
            ChartKind::Donut,
            "Modes",
            ChartTable::Message("not a table".to_string()),
        );

        let result = renderer(dir.path()).render(0, &request);

        assert!(matches!(result, Err(RenderError::InvalidChart(_))));
        assert!(!renderer(dir.path()).output_path(0, &request).exists());
    }

    #[test]
    fn test_empty_categories_are_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let request = ChartRequest::new(
            "reasons",
            ChartKind::HorizontalBar,
            "Reasons",
            ChartTable::Categories(Vec::new()),
        );

        let result = renderer(dir.path()).render(4, &request);

        assert!(matches!(
            result,
            Err(RenderError::InvalidChart(ChartError::Empty { .. }))
        ));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
