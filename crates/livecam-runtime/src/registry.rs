//! Marker registry.

use std::collections::HashSet;
use std::path::Path;

use livecam_protocols::Marker;

use crate::error::ResolveError;

/// The marker list handed over by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
}

impl MarkerRegistry {
    /// Build from markers, rejecting duplicate or empty ids.
    pub fn new(markers: Vec<Marker>) -> Result<Self, ResolveError> {
        let mut seen = HashSet::new();
        for marker in &markers {
            let id = marker.id.trim();
            if id.is_empty() {
                return Err(ResolveError::Registry("marker without id".to_string()));
            }
            if !seen.insert(id) {
                return Err(ResolveError::DuplicateMarker(id.to_string()));
            }
        }
        Ok(Self { markers })
    }

    /// Parse a JSON array of markers.
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        let markers: Vec<Marker> = serde_json::from_str(json)?;
        Self::new(markers)
    }

    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Look up a marker, failing with [`ResolveError::MarkerNotFound`].
    pub fn require(&self, id: &str) -> Result<&Marker, ResolveError> {
        self.get(id)
            .ok_or_else(|| ResolveError::MarkerNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
