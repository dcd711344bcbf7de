use crate::assets::fetch::AssetFetcher;
use crate::effects::backend::FilterBackend;
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::BatchboardResult;
use crate::import::importer::LayerImporter;
use crate::render::cpu::CpuRasterizer;
use crate::render::export::{ExportFormat, RenderedImage, encode};
use crate::render::prepare::{ExportMode, prepare};
use crate::template::layer::Template;
use crate::text::fonts::FontCache;
use crate::text::layout::TextLayoutEngine;

/// Settings shared by every render of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Frame or artboard export.
    pub mode: ExportMode,
    /// Output encoding.
    pub format: ExportFormat,
    /// Initial filter processing capacity.
    pub filters: FilterBackend,
}

/// Renders one template (already bound to its row) into an encoded image.
///
/// A renderer owns its text layout engine, filter backend and rasterizer context, so each
/// worker thread keeps one and reuses it across rows.
pub struct TemplateRenderer {
    options: RenderOptions,
    text: TextLayoutEngine,
    filters: FilterBackend,
    raster: CpuRasterizer,
}

impl TemplateRenderer {
    /// Renderer with fresh per-worker state.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            text: TextLayoutEngine::new(),
            filters: options.filters,
            raster: CpuRasterizer::new(),
        }
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Normalize, import, rasterize and encode `template`.
    ///
    /// `required` lists layer ids whose asset failures fail the render instead of dropping the
    /// layer.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %template.id))]
    pub fn render(
        &mut self,
        template: &Template,
        fetcher: &dyn AssetFetcher,
        fonts: &FontCache,
        required: impl IntoIterator<Item = String>,
    ) -> BatchboardResult<RenderedImage> {
        let prepared = prepare(template, self.options.mode);
        let canvas = Canvas::checked_from_f64(prepared.width, prepared.height)?;
        let scene = LayerImporter::new(fetcher, fonts, &mut self.text, &mut self.filters)
            .with_required(required)
            .import(&prepared.template)?;

        let pixels = self.raster.render(&scene, Affine::IDENTITY, canvas)?;
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            nodes = scene.node_count(),
            "rasterized template"
        );
        encode(&pixels, canvas.width, canvas.height, self.options.format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
