/// How one image gets processed by the filter pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingPlan {
    /// The image fits one tile; per-pixel passes run over horizontal bands of `rows` rows
    /// each, in parallel.
    Tiled {
        /// Band height in rows.
        rows: u32,
    },
    /// The image exceeds the texture limit; every pass runs over the full frame at once.
    FullFrame,
}

/// Rows per parallel band, as a fraction of the tile edge.
const BAND_DIVISOR: u32 = 32;

/// Filter processing capacity.
///
/// Starts at `tile_size` and grows to fit larger images, up to `max_texture_size`. Beyond
/// that images are processed full-frame. Adjustments never fail and never change pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterBackend {
    tile_size: u32,
    max_texture_size: u32,
}

impl Default for FilterBackend {
    fn default() -> Self {
        Self::new(2048, 4096)
    }
}

impl FilterBackend {
    /// Backend with an initial tile size and a hard texture limit.
    pub fn new(tile_size: u32, max_texture_size: u32) -> Self {
        let max_texture_size = max_texture_size.max(1);
        Self {
            tile_size: tile_size.clamp(1, max_texture_size),
            max_texture_size,
        }
    }

    /// Current tile size.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Texture limit.
    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    /// Pick the plan for an image, growing the tile size when the image needs it.
    pub fn plan_for(&mut self, width: u32, height: u32) -> ProcessingPlan {
        let max_dim = width.max(height);
        if max_dim <= self.tile_size {
            return self.tiled();
        }
        if max_dim <= self.max_texture_size {
            tracing::debug!(
                from = self.tile_size,
                to = max_dim,
                "growing filter tile size"
            );
            self.tile_size = max_dim;
            return self.tiled();
        }
        tracing::debug!(
            max_dim,
            limit = self.max_texture_size,
            "image exceeds filter texture limit; processing full frame"
        );
        ProcessingPlan::FullFrame
    }

    fn tiled(&self) -> ProcessingPlan {
        ProcessingPlan::Tiled {
            rows: (self.tile_size / BAND_DIVISOR).max(1),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/backend.rs"]
mod tests;
