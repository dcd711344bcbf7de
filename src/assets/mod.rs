//! Remote asset collaborators: fetching, raster decode, and SVG handling.
//!
//! Every fetch path understands `data:` URLs and inline `<svg>` markup so templates can embed
//! their assets and tests can run offline.

/// Raster image decoding and cropping.
pub mod decode;
/// Fetcher trait with HTTP and in-memory implementations.
pub mod fetch;
/// SVG parsing, recoloring and rasterization.
pub mod svg;

pub use decode::{DecodedImage, decode_image};
pub use fetch::{AssetFetcher, FetchConfig, HttpFetcher, MemoryFetcher, decode_data_url};
pub use svg::{PreparedSvg, parse_svg, recolor_svg, render_svg, stroke_sub_shapes};
