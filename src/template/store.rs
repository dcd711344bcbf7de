use std::collections::HashMap;

use kurbo::Affine;

use crate::geometry::transform::{flatten_into, object_matrix};
use crate::template::layer::{Layer, LayerKind, Placement, Template};

/// Id-indexed view over every layer of a template, group children included.
///
/// Clip relationships are stored as ids on the layers and resolved through this lookup.
pub struct LayerStore<'a> {
    by_id: HashMap<&'a str, &'a Layer>,
    placements: HashMap<&'a str, Placement>,
    artboards: Vec<&'a Layer>,
}

impl<'a> LayerStore<'a> {
    /// Index `template`. When ids collide the first layer in paint order wins.
    pub fn new(template: &'a Template) -> Self {
        let mut store = Self {
            by_id: HashMap::new(),
            placements: HashMap::new(),
            artboards: Vec::new(),
        };
        store.index(&template.layers, None);
        store
    }

    fn index(&mut self, layers: &'a [Layer], group: Option<Affine>) {
        for l in layers {
            let placement = match group {
                Some(m) => flatten_into(m, &l.placement),
                None => l.placement,
            };
            if matches!(l.kind, LayerKind::Artboard(_)) {
                self.artboards.push(l);
            }
            if !l.id.is_empty() {
                if self.by_id.contains_key(l.id.as_str()) {
                    tracing::warn!(id = %l.id, "duplicate layer id; keeping the first");
                } else {
                    self.by_id.insert(l.id.as_str(), l);
                    self.placements.insert(l.id.as_str(), placement);
                }
            }
            if let LayerKind::Group(g) = &l.kind {
                self.index(&g.children, Some(object_matrix(&placement)));
            }
        }
    }

    /// Layer with the given id.
    pub fn get(&self, id: &str) -> Option<&'a Layer> {
        self.by_id.get(id).copied()
    }

    /// Template-space placement of the layer with the given id; group children are flattened
    /// through their groups.
    pub fn placement(&self, id: &str) -> Option<Placement> {
        self.placements.get(id).copied()
    }

    /// Artboards in paint order.
    pub fn artboards(&self) -> &[&'a Layer] {
        &self.artboards
    }

    /// The artboard exported by default: id "Main Artboard", else the first one.
    pub fn main_artboard(&self) -> Option<&'a Layer> {
        self.get(crate::template::normalize::MAIN_ARTBOARD_ID)
            .filter(|l| matches!(l.kind, LayerKind::Artboard(_)))
            .or_else(|| self.artboards.first().copied())
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// `true` when no layer carries an id.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/store.rs"]
mod tests;
