use crate::layer::{Layer, RenderLayer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("layer is missing an id")]
    MissingId,
    #[error("a layer with id `{0}` is already on the map")]
    DuplicateId(String),
}

/// Ordered set of layers handed to the renderer, bottom first.
#[derive(Debug)]
pub struct LayerStack<L: Layer = RenderLayer> {
    layers: Vec<L>,
}

impl<L: Layer> Default for LayerStack<L> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<L: Layer> LayerStack<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Pushes `layer` on top. Layers without an id, or reusing one, are refused.
    pub fn add(&mut self, layer: L) -> Result<(), LayerError> {
        let id = layer.id();
        if id.trim().is_empty() {
            tracing::warn!("rejected layer without id");
            return Err(LayerError::MissingId);
        }
        if self.position(id).is_some() {
            tracing::warn!(id, "rejected duplicate layer");
            return Err(LayerError::DuplicateId(id.to_string()));
        }
        tracing::debug!(id, "layer added");
        self.layers.push(layer);
        Ok(())
    }

    /// Swaps the layer with the same id in place, keeping its position.
    /// Adds on top when no such layer exists.
    pub fn replace(&mut self, layer: L) -> Result<Option<L>, LayerError> {
        match self.position(layer.id()) {
            Some(i) => Ok(Some(std::mem::replace(&mut self.layers[i], layer))),
            None => self.add(layer).map(|()| None),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<L> {
        let i = self.position(id)?;
        Some(self.layers.remove(i))
    }

    pub fn get(&self, id: &str) -> Option<&L> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut L> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    /// Returns false when `id` is unknown; nothing changes in that case.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.set_visible(visible);
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                let visible = layer.visible();
                layer.set_visible(!visible);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.layers.iter()
    }

    pub fn visible(&self) -> impl Iterator<Item = &L> {
        self.layers.iter().filter(|l| l.visible())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }
}
