//! Renders a batch of chart requests, degrading any chart that fails.

use super::renderer::{ChartRenderer, RenderedChart};
use super::request::ChartRequest;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// A chart that could not be drawn in any representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFailure {
    pub name: String,
    pub message: String,
}

/// Result of rendering a whole report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSummary {
    pub rendered: Vec<RenderedChart>,
    pub failed: Vec<RenderFailure>,
}

impl RenderSummary {
    /// Charts drawn as something other than what was asked for.
    pub fn degraded(&self) -> impl Iterator<Item = &RenderedChart> {
        self.rendered.iter().filter(|r| r.kind != r.requested)
    }
}

/// Render `request`, stepping down the fallback chain on each failure.
pub fn render_with_fallback<R: ChartRenderer + ?Sized>(
    renderer: &R,
    index: usize,
    request: &ChartRequest,
) -> Result<RenderedChart, RenderFailure> {
    let mut current = request.clone();
    loop {
        let err = match renderer.render(index, &current) {
            Ok(rendered) => return Ok(rendered),
            Err(err) => err,
        };

        match current.degrade() {
            Some(next) => {
                warn!(
                    chart = %current.name,
                    from = current.kind.as_str(),
                    to = next.kind.as_str(),
                    error = %err,
                    "chart render failed, falling back"
                );
                current = next;
            }
            None => {
                warn!(chart = %current.name, error = %err, "chart could not be rendered");
                return Err(RenderFailure {
                    name: current.name,
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Render every request, in parallel, without stopping at failures.
///
/// `threads` sizes a dedicated pool; 0 uses the global rayon pool.
pub fn render_all<R: ChartRenderer>(
    renderer: &R,
    requests: &[ChartRequest],
    threads: usize,
) -> RenderSummary {
    let run = || -> Vec<Result<RenderedChart, RenderFailure>> {
        requests
            .par_iter()
            .enumerate()
            .map(|(index, request)| render_with_fallback(renderer, index, request))
            .collect()
    };

    let results = if threads == 0 {
        run()
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, threads, "could not build render pool, using the global pool");
                run()
            }
        }
    };

    let mut summary = RenderSummary::default();
    for result in results {
        match result {
            Ok(rendered) => summary.rendered.push(rendered),
            Err(failure) => summary.failed.push(failure),
        }
    }

    info!(
        rendered = summary.rendered.len(),
        degraded = summary.degraded().count(),
        failed = summary.failed.len(),
        "charts rendered"
    );
    summary
}
