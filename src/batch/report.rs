use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::render::export::RenderedImage;

/// Column appended to the report table.
pub const GENERATED_IMAGE_COLUMN: &str = "generatedImageUrl";
/// Report cell for rows that produced no image.
pub const NO_IMAGE: &str = "No image generated";

/// A row that rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSuccess {
    /// 1-based data row position.
    pub index: usize,
    /// Encoded image, serialized as a data URL.
    #[serde(rename = "imageBuffer", serialize_with = "as_data_url")]
    pub image: RenderedImage,
}

/// A row that failed, with the error rendered to text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based data row position.
    pub index: usize,
    /// Error message.
    pub error: String,
}

/// Per-row results of a batch, each list in row order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Rows that produced an image.
    pub successful: Vec<RowSuccess>,
    /// Rows that did not.
    pub failed: Vec<RowFailure>,
}

/// Counts reported after a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Data rows processed.
    pub total_rows: usize,
    /// Rows that produced an image.
    pub successful_images: usize,
    /// Rows that failed.
    pub failed_images: usize,
}

fn as_data_url<S: Serializer>(image: &RenderedImage, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&image.to_data_url())
}

impl BatchOutcome {
    /// Split per-row results, indexed from 1 in input order.
    pub fn from_results<E: std::fmt::Display>(
        results: impl IntoIterator<Item = Result<RenderedImage, E>>,
    ) -> Self {
        let mut outcome = Self::default();
        for (i, result) in results.into_iter().enumerate() {
            let index = i + 1;
            match result {
                Ok(image) => outcome.successful.push(RowSuccess { index, image }),
                Err(err) => outcome.failed.push(RowFailure {
                    index,
                    error: err.to_string(),
                }),
            }
        }
        outcome
    }

    /// Row counts.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total_rows: self.successful.len() + self.failed.len(),
            successful_images: self.successful.len(),
            failed_images: self.failed.len(),
        }
    }

    /// Image of data row `index`, if it rendered.
    pub fn image(&self, index: usize) -> Option<&RenderedImage> {
        self.successful
            .iter()
            .find(|s| s.index == index)
            .map(|s| &s.image)
    }
}

/// The input table with a [`GENERATED_IMAGE_COLUMN`] holding each row's published URL.
///
/// `links` maps 1-based row indices to URLs. Rows that failed, or rendered but were not
/// published, get [`NO_IMAGE`].
pub fn report_rows(
    header: &[String],
    rows: &[Vec<String>],
    outcome: &BatchOutcome,
    links: &BTreeMap<usize, String>,
) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(rows.len() + 1);
    let mut head = header.to_vec();
    head.push(GENERATED_IMAGE_COLUMN.to_owned());
    out.push(head);

    for (i, row) in rows.iter().enumerate() {
        let index = i + 1;
        let link = outcome
            .image(index)
            .and_then(|_| links.get(&index))
            .map_or_else(|| NO_IMAGE.to_owned(), Clone::clone);
        let mut line = row.clone();
        line.push(link);
        out.push(line);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/batch/report.rs"]
mod tests;
