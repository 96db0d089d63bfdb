//! Validation engine
//!
//! Runs once per document before any decode. Phases run in a fixed order and
//! every phase runs even after an earlier one found problems; the result is
//! the complete list of violations. Later phases skip items an earlier phase
//! already reported as broken, so one root cause is reported once.
//!
//! Phase order:
//! 1. cross-references resolve
//! 2. byte ranges fit (buffers, views, accessors, sparse blocks)
//! 3. alignment, stride and count rules
//! 4. normalization only on BYTE/UBYTE/SHORT/USHORT
//! 5. sparse indices strictly increasing and in range
//! 6. node graph acyclic, children unique
//! 7. no duplicate animation targets
//! 8. node transform/skin/weights rules
//! 9. animation sampler formats, keyframe order and shapes
//! 10. skin inverse bind matrices

mod animation;
mod graph;
mod layout;
mod references;

use hashbrown::HashSet;

use crate::buffer::Buffers;
use crate::error::{GltfError, ValidationReport};
use crate::schema::Document;

/// Check every structural invariant of `document` against `buffers`
///
/// Does not mutate anything. Returns all violations at once.
pub fn validate(document: &Document, buffers: &Buffers) -> Result<(), ValidationReport> {
    let mut validator = Validator::new(document, buffers);

    validator.run("references", Validator::check_references);
    validator.run("byte ranges", Validator::check_ranges);
    validator.run("alignment and stride", Validator::check_alignment);
    validator.run("normalization", Validator::check_normalization);
    validator.run("sparse indices", Validator::check_sparse_indices);
    validator.run("node graph", Validator::check_graph);
    validator.run("animation targets", Validator::check_animation_targets);
    validator.run("node properties", Validator::check_nodes);
    validator.run("animation samplers", Validator::check_samplers);
    validator.run("skins", Validator::check_skins);

    validator.finish()
}

pub(crate) struct Validator<'a> {
    document: &'a Document,
    buffers: &'a Buffers,
    errors: Vec<GltfError>,
    /// Accessors with a reported defect; decode-based checks skip them
    broken_accessors: HashSet<usize>,
}

impl<'a> Validator<'a> {
    fn new(document: &'a Document, buffers: &'a Buffers) -> Self {
        Self {
            document,
            buffers,
            errors: Vec::new(),
            broken_accessors: HashSet::new(),
        }
    }

    fn run(&mut self, phase: &str, check: fn(&mut Self)) {
        let before = self.errors.len();
        check(self);
        tracing::debug!(
            "Validation phase '{}': {} error(s)",
            phase,
            self.errors.len() - before
        );
    }

    fn report(&mut self, error: GltfError) {
        self.errors.push(error);
    }

    fn report_accessor(&mut self, accessor: usize, error: GltfError) {
        self.broken_accessors.insert(accessor);
        self.errors.push(error);
    }

    fn is_broken(&self, accessor: usize) -> bool {
        accessor >= self.document.accessors.len() || self.broken_accessors.contains(&accessor)
    }

    fn finish(self) -> Result<(), ValidationReport> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            tracing::warn!("Validation failed with {} error(s)", self.errors.len());
            Err(ValidationReport {
                errors: self.errors,
            })
        }
    }
}
