//! Projection-matrix variants and candidate-projection sampling.
//!
//! Every split in a projection forest thresholds a sparse linear
//! combination of input features rather than a single feature column.
//! The [`ProjectionMatrix`] variant selects how candidate combinations
//! are drawn at each node.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::index;

use crate::error::ForestError;

/// A named strategy for sampling candidate projections at each tree node.
///
/// The set is closed: parsing any other name is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionMatrix {
    /// Sparse random oblique combinations with ±1 weights (unstructured baseline).
    Oblique,
    /// Contiguous rectangular image patches summed with unit weights.
    ImagePatch,
    /// A random vertex's incident adjacency entries, subsampled.
    GraphNode,
    /// A random set of distinct adjacency entries (edges).
    GraphEdge,
}

impl ProjectionMatrix {
    /// All variants, in canonical evaluation order.
    pub const ALL: [ProjectionMatrix; 4] = [
        ProjectionMatrix::Oblique,
        ProjectionMatrix::ImagePatch,
        ProjectionMatrix::GraphNode,
        ProjectionMatrix::GraphEdge,
    ];

    /// Parse a canonical projection-matrix name.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UnknownProjectionMatrix`] for any name outside
    /// the closed set.
    pub fn parse(name: &str) -> Result<Self, ForestError> {
        match name {
            "RerF" => Ok(ProjectionMatrix::Oblique),
            "S-RerF" => Ok(ProjectionMatrix::ImagePatch),
            "Graph-Node-RerF" => Ok(ProjectionMatrix::GraphNode),
            "Graph-Edge-RerF" => Ok(ProjectionMatrix::GraphEdge),
            other => Err(ForestError::UnknownProjectionMatrix {
                name: other.to_string(),
            }),
        }
    }

    /// Return the canonical name used for parsing and result columns.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ProjectionMatrix::Oblique => "RerF",
            ProjectionMatrix::ImagePatch => "S-RerF",
            ProjectionMatrix::GraphNode => "Graph-Node-RerF",
            ProjectionMatrix::GraphEdge => "Graph-Edge-RerF",
        }
    }

    /// Return `true` when the variant samples from spatial/graph structure
    /// and therefore requires image geometry and patch bounds.
    #[must_use]
    pub fn is_structured(self) -> bool {
        !matches!(self, ProjectionMatrix::Oblique)
    }
}

impl fmt::Display for ProjectionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectionMatrix {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Spatial layout of a flattened sample, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    height: usize,
    width: usize,
}

impl ImageGeometry {
    /// Create a geometry from image height and width.
    #[must_use]
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Return the image height.
    #[must_use]
    pub fn height(self) -> usize {
        self.height
    }

    /// Return the image width.
    #[must_use]
    pub fn width(self) -> usize {
        self.width
    }

    /// Return the flattened feature count this geometry implies.
    #[must_use]
    pub fn n_features(self) -> usize {
        self.height * self.width
    }
}

/// Inclusive lower/upper bounds on patch side length and entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchBounds {
    min: usize,
    max: usize,
}

impl PatchBounds {
    /// Create validated patch bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidPatchBounds`] unless `1 <= min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self, ForestError> {
        if min == 0 || min > max {
            return Err(ForestError::InvalidPatchBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Return the inclusive lower bound.
    #[must_use]
    pub fn min(self) -> usize {
        self.min
    }

    /// Return the inclusive upper bound.
    #[must_use]
    pub fn max(self) -> usize {
        self.max
    }
}

impl Default for PatchBounds {
    /// Bounds `[1, 3]`: patches between single entries and 3x3 blocks.
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// A sparse linear combination of feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    terms: Vec<(usize, f64)>,
}

impl Projection {
    pub(crate) fn new(terms: Vec<(usize, f64)>) -> Self {
        debug_assert!(!terms.is_empty(), "projection must have at least one term");
        Self { terms }
    }

    /// Evaluate the projection against one flattened sample.
    #[must_use]
    pub fn evaluate(&self, sample: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(feature, weight)| sample[feature] * weight)
            .sum()
    }

    /// Return the `(feature, weight)` terms.
    #[must_use]
    pub fn terms(&self) -> &[(usize, f64)] {
        &self.terms
    }
}

/// Per-tree context for drawing candidate projections at a node.
///
/// Built once per fit from the validated config; structured variants carry
/// their geometry and patch bounds, the oblique variant its density.
#[derive(Debug, Clone)]
pub(crate) struct ProjectionSampler {
    matrix: ProjectionMatrix,
    n_features: usize,
    density: f64,
    geometry: ImageGeometry,
    patch: PatchBounds,
}

impl ProjectionSampler {
    pub(crate) fn new(
        matrix: ProjectionMatrix,
        n_features: usize,
        density: f64,
        geometry: ImageGeometry,
        patch: PatchBounds,
    ) -> Self {
        Self {
            matrix,
            n_features,
            density,
            geometry,
            patch,
        }
    }

    /// Draw one candidate projection.
    pub(crate) fn sample(&self, rng: &mut impl Rng) -> Projection {
        match self.matrix {
            ProjectionMatrix::Oblique => self.sample_oblique(rng),
            ProjectionMatrix::ImagePatch => self.sample_image_patch(rng),
            ProjectionMatrix::GraphNode => self.sample_graph_node(rng),
            ProjectionMatrix::GraphEdge => self.sample_graph_edge(rng),
        }
    }

    /// Each feature enters independently with probability `density`,
    /// weight ±1. At least one term is guaranteed.
    fn sample_oblique(&self, rng: &mut impl Rng) -> Projection {
        let mut terms = Vec::new();
        for feature in 0..self.n_features {
            if rng.gen_bool(self.density) {
                let weight = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                terms.push((feature, weight));
            }
        }
        if terms.is_empty() {
            let feature = rng.gen_range(0..self.n_features);
            let weight = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            terms.push((feature, weight));
        }
        Projection::new(terms)
    }

    /// A rectangular patch: side lengths drawn from the patch bounds,
    /// position uniform over valid top-left corners, unit weights.
    fn sample_image_patch(&self, rng: &mut impl Rng) -> Projection {
        let (h, w) = (self.geometry.height(), self.geometry.width());
        let patch_h = rng.gen_range(self.patch.min()..=self.patch.max().min(h));
        let patch_w = rng.gen_range(self.patch.min()..=self.patch.max().min(w));
        let row0 = rng.gen_range(0..=(h - patch_h));
        let col0 = rng.gen_range(0..=(w - patch_w));

        let mut terms = Vec::with_capacity(patch_h * patch_w);
        for r in row0..row0 + patch_h {
            for c in col0..col0 + patch_w {
                terms.push((r * w + c, 1.0));
            }
        }
        Projection::new(terms)
    }

    /// A random vertex's incident entries (its adjacency row plus column),
    /// subsampled to a patch-bounded count, unit weights.
    fn sample_graph_node(&self, rng: &mut impl Rng) -> Projection {
        let n = self.geometry.height();
        let vertex = rng.gen_range(0..n);

        let mut incident = Vec::with_capacity(2 * n - 1);
        for c in 0..n {
            incident.push(vertex * n + c);
        }
        for r in 0..n {
            if r != vertex {
                incident.push(r * n + vertex);
            }
        }

        let count = self.bounded_count(rng, incident.len());
        let terms = index::sample(rng, incident.len(), count)
            .into_iter()
            .map(|i| (incident[i], 1.0))
            .collect();
        Projection::new(terms)
    }

    /// A patch-bounded count of distinct adjacency entries drawn uniformly,
    /// unit weights.
    fn sample_graph_edge(&self, rng: &mut impl Rng) -> Projection {
        let count = self.bounded_count(rng, self.n_features);
        let terms = index::sample(rng, self.n_features, count)
            .into_iter()
            .map(|feature| (feature, 1.0))
            .collect();
        Projection::new(terms)
    }

    /// Draw an entry count from the patch bounds, clamped to `limit`.
    fn bounded_count(&self, rng: &mut impl Rng, limit: usize) -> usize {
        let lo = self.patch.min().min(limit);
        let hi = self.patch.max().min(limit);
        rng.gen_range(lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{ImageGeometry, PatchBounds, Projection, ProjectionMatrix, ProjectionSampler};
    use crate::error::ForestError;

    fn sampler(matrix: ProjectionMatrix) -> ProjectionSampler {
        // 4x4 image/adjacency, 16 features.
        ProjectionSampler::new(
            matrix,
            16,
            0.1,
            ImageGeometry::new(4, 4),
            PatchBounds::new(1, 3).unwrap(),
        )
    }

    #[test]
    fn parse_canonical_names() {
        assert_eq!(
            ProjectionMatrix::parse("RerF").unwrap(),
            ProjectionMatrix::Oblique
        );
        assert_eq!(
            ProjectionMatrix::parse("S-RerF").unwrap(),
            ProjectionMatrix::ImagePatch
        );
        assert_eq!(
            ProjectionMatrix::parse("Graph-Node-RerF").unwrap(),
            ProjectionMatrix::GraphNode
        );
        assert_eq!(
            ProjectionMatrix::parse("Graph-Edge-RerF").unwrap(),
            ProjectionMatrix::GraphEdge
        );
    }

    #[test]
    fn parse_unknown_name_fails() {
        let err = ProjectionMatrix::parse("NotAVariant").unwrap_err();
        assert!(matches!(
            err,
            ForestError::UnknownProjectionMatrix { name } if name == "NotAVariant"
        ));
    }

    #[test]
    fn name_round_trips_through_parse() {
        for matrix in ProjectionMatrix::ALL {
            assert_eq!(ProjectionMatrix::parse(matrix.name()).unwrap(), matrix);
        }
    }

    #[test]
    fn only_oblique_is_unstructured() {
        assert!(!ProjectionMatrix::Oblique.is_structured());
        assert!(ProjectionMatrix::ImagePatch.is_structured());
        assert!(ProjectionMatrix::GraphNode.is_structured());
        assert!(ProjectionMatrix::GraphEdge.is_structured());
    }

    #[test]
    fn patch_bounds_reject_zero_and_inverted() {
        assert!(matches!(
            PatchBounds::new(0, 3),
            Err(ForestError::InvalidPatchBounds { .. })
        ));
        assert!(matches!(
            PatchBounds::new(4, 2),
            Err(ForestError::InvalidPatchBounds { .. })
        ));
    }

    #[test]
    fn projection_evaluates_weighted_sum() {
        let proj = Projection::new(vec![(0, 1.0), (2, -1.0)]);
        let sample = [3.0, 100.0, 1.5, 100.0];
        assert!((proj.evaluate(&sample) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn oblique_always_has_at_least_one_term() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let s = ProjectionSampler::new(
            ProjectionMatrix::Oblique,
            16,
            // Density small enough that empty draws are common without the
            // fallback term.
            0.001,
            ImageGeometry::new(4, 4),
            PatchBounds::new(1, 3).unwrap(),
        );
        for _ in 0..200 {
            assert!(!s.sample(&mut rng).terms().is_empty());
        }
    }

    #[test]
    fn oblique_weights_are_unit_magnitude() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let s = sampler(ProjectionMatrix::Oblique);
        for _ in 0..100 {
            for &(feature, weight) in s.sample(&mut rng).terms() {
                assert!(feature < 16);
                assert!(weight == 1.0 || weight == -1.0);
            }
        }
    }

    #[test]
    fn image_patch_is_contiguous_rectangle() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let s = sampler(ProjectionMatrix::ImagePatch);
        for _ in 0..100 {
            let proj = s.sample(&mut rng);
            let rows: Vec<usize> = proj.terms().iter().map(|&(f, _)| f / 4).collect();
            let cols: Vec<usize> = proj.terms().iter().map(|&(f, _)| f % 4).collect();
            let (rmin, rmax) = (*rows.iter().min().unwrap(), *rows.iter().max().unwrap());
            let (cmin, cmax) = (*cols.iter().min().unwrap(), *cols.iter().max().unwrap());
            // A full rectangle: every cell of the bounding box is present.
            assert_eq!(proj.terms().len(), (rmax - rmin + 1) * (cmax - cmin + 1));
            assert!(rmax - rmin < 3 && cmax - cmin < 3);
        }
    }

    #[test]
    fn graph_node_terms_are_incident_to_one_vertex() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let s = sampler(ProjectionMatrix::GraphNode);
        for _ in 0..100 {
            let proj = s.sample(&mut rng);
            assert!(!proj.terms().is_empty() && proj.terms().len() <= 3);
            // Every term must share a row or column with some single vertex.
            let candidates: Vec<usize> = (0..4)
                .filter(|&v| {
                    proj.terms()
                        .iter()
                        .all(|&(f, _)| f / 4 == v || f % 4 == v)
                })
                .collect();
            assert!(!candidates.is_empty(), "terms {:?}", proj.terms());
        }
    }

    #[test]
    fn graph_edge_terms_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let s = sampler(ProjectionMatrix::GraphEdge);
        for _ in 0..100 {
            let proj = s.sample(&mut rng);
            assert!(!proj.terms().is_empty() && proj.terms().len() <= 3);
            let mut features: Vec<usize> = proj.terms().iter().map(|&(f, _)| f).collect();
            features.sort_unstable();
            features.dedup();
            assert_eq!(features.len(), proj.terms().len());
        }
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let s = sampler(ProjectionMatrix::ImagePatch);
        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(s.sample(&mut rng1), s.sample(&mut rng2));
        }
    }
}
