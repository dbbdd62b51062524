//! Callbacks for [`BspTree::traverse`](super::BspTree::traverse).

use crate::Polygon;

/// Receives each node's coplanar group during a traversal.
///
/// Groups arrive node first, then the front subtree, then the behind
/// subtree. Every polygon in one call lies on the same plane.
pub trait BspVisitor {
    /// `depth` is 0 at the root and grows by one per level.
    fn visit(&mut self, polygons: &[Polygon], depth: usize);
}

/// Copies every visited polygon into a flat list.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<Polygon>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            collected: Vec::with_capacity(capacity),
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.collected
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, polygons: &[Polygon], _depth: usize) {
        self.collected.extend_from_slice(polygons);
    }
}

/// Adapts a closure `(group, depth)` into a visitor.
pub struct FnVisitor<F>(F);

impl<F: FnMut(&[Polygon], usize)> FnVisitor<F> {
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F: FnMut(&[Polygon], usize)> BspVisitor for FnVisitor<F> {
    fn visit(&mut self, polygons: &[Polygon], depth: usize) {
        (self.0)(polygons, depth);
    }
}
