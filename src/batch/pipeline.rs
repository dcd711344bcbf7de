use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::fetch::{AssetFetcher, HttpFetcher};
use crate::batch::binding::{DataTable, bind_row, column_index};
use crate::batch::report::BatchOutcome;
use crate::config::BatchConfig;
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::render::export::RenderedImage;
use crate::render::renderer::{RenderOptions, TemplateRenderer};
use crate::template::layer::Template;
use crate::template::model::TemplateDef;
use crate::template::normalize::normalize;
use crate::text::fonts::{FallbackFonts, FontCache};

/// Renders one template once per data row, concurrently.
///
/// Every row works on its own copy of the template. The font cache is built per run and is the
/// only state rows share.
pub struct BatchPipeline {
    fetcher: Arc<dyn AssetFetcher>,
    options: RenderOptions,
    threads: Option<usize>,
    fallback_fonts: FallbackFonts,
}

impl BatchPipeline {
    /// Pipeline fetching assets through `fetcher`.
    pub fn new(config: &BatchConfig, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            options: config.render_options(),
            threads: config.threads,
            fallback_fonts: config.fallback_fonts.clone(),
        }
    }

    /// Pipeline fetching over HTTP with the configured limits.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config, Arc::new(HttpFetcher::new(config.fetch.clone())))
    }

    /// Validate `def`, then render every row of `table`.
    ///
    /// Errors are batch-level only (malformed template, bad worker count); row failures are
    /// reported in the returned outcome.
    pub fn run(&self, def: &TemplateDef, table: &DataTable) -> BatchboardResult<BatchOutcome> {
        let template = normalize(def)?;
        self.run_template(&template, table)
    }

    /// Render every row of `table` against an already normalized template.
    #[tracing::instrument(skip_all, fields(template = %template.id, rows = table.len()))]
    pub fn run_template(&self, template: &Template, table: &DataTable) -> BatchboardResult<BatchOutcome> {
        let pool = build_thread_pool(self.threads)?;
        let fonts = FontCache::new(self.fallback_fonts.clone());
        let preloaded = fonts.preload(template, self.fetcher.as_ref());
        tracing::debug!(fonts = preloaded, "preloaded fonts");

        let columns = column_index(&table.header_row);
        let fetcher = self.fetcher.as_ref();
        let options = self.options;

        let results = pool.install(|| {
            table
                .data_rows
                .par_iter()
                .enumerate()
                .map_init(
                    || TemplateRenderer::new(options),
                    |renderer, (i, row)| {
                        let bound = bind_row(template, &columns, row);
                        render_row(renderer, i + 1, &bound.template, bound.required, fetcher, &fonts)
                    },
                )
                .collect::<Vec<_>>()
        });

        let outcome = BatchOutcome::from_results(results);
        let summary = outcome.summary();
        tracing::info!(
            total = summary.total_rows,
            successful = summary.successful_images,
            failed = summary.failed_images,
            "batch finished"
        );
        Ok(outcome)
    }

    /// Render `def` once with its own default content.
    pub fn preview(&self, def: &TemplateDef) -> BatchboardResult<RenderedImage> {
        let template = normalize(def)?;
        let fonts = FontCache::new(self.fallback_fonts.clone());
        fonts.preload(&template, self.fetcher.as_ref());
        TemplateRenderer::new(self.options).render(&template, self.fetcher.as_ref(), &fonts, [])
    }
}

#[tracing::instrument(level = "debug", skip(renderer, template, required, fetcher, fonts))]
fn render_row(
    renderer: &mut TemplateRenderer,
    index: usize,
    template: &Template,
    required: Vec<String>,
    fetcher: &dyn AssetFetcher,
    fonts: &FontCache,
) -> BatchboardResult<RenderedImage> {
    let result = renderer.render(template, fetcher, fonts, required);
    if let Err(err) = &result {
        tracing::warn!(row = index, error = %err, "row failed");
    }
    result
}

/// Worker pool for row rendering; `Some(0)` is rejected.
pub fn build_thread_pool(threads: Option<usize>) -> BatchboardResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BatchboardError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("batchboard-row-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BatchboardError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pipeline.rs"]
mod tests;
