use crate::error::Result;
use crate::math::Point;
use crate::transform::Transform;

use super::JonssonEmbedding;

/// Maps spacetime events `(t, r)` onto the funnel.
///
/// Not exact: `backward` recovers time only modulo one wrap period.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingTransform<'a> {
    embedding: &'a JonssonEmbedding,
}

impl<'a> EmbeddingTransform<'a> {
    #[must_use]
    pub fn new(embedding: &'a JonssonEmbedding) -> Self {
        Self { embedding }
    }
}

impl Transform for EmbeddingTransform<'_> {
    fn forward(&self, p: &Point) -> Result<Point> {
        self.embedding.embedding_point_from_spacetime(p)
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        self.embedding.spacetime_from_embedding_point(p)
    }

    fn is_exact(&self) -> bool {
        false
    }
}
