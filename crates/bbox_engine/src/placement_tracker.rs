//! Depth-indexed display list state for one timeline

use std::collections::HashMap;
use swf_model::{PlaceObject, RemoveObject};

/// Last character id and instance name seen at each depth
///
/// Removal records never clear an entry: a depth keeps reporting the
/// character last placed there. Removals of tracked depths are logged so
/// the stale entry can be spotted.
#[derive(Debug, Clone, Default)]
pub struct DepthTable {
    ids: HashMap<u16, u16>,
    names: HashMap<u16, String>,
}

impl DepthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the id and name a placement states explicitly
    pub fn observe_placement(&mut self, place: &PlaceObject) {
        if let Some(id) = place.character_id {
            self.ids.insert(place.depth, id);
        }
        if let Some(name) = &place.name {
            self.names.insert(place.depth, name.clone());
        }
    }

    pub fn observe_removal(&mut self, removal: &RemoveObject) {
        if let Some(id) = self.ids.get(&removal.depth) {
            tracing::debug!(
                "depth {} removed, keeping stale character {}",
                removal.depth,
                id
            );
        }
    }

    pub fn character_at(&self, depth: u16) -> Option<u16> {
        self.ids.get(&depth).copied()
    }

    pub fn name_at(&self, depth: u16) -> Option<&str> {
        self.names.get(&depth).map(String::as_str)
    }

    /// Instance name, or `ID<n>` when the depth has none
    pub fn label_at(&self, depth: u16) -> Option<String> {
        match self.name_at(depth) {
            Some(name) => Some(name.to_string()),
            None => self.character_at(depth).map(|id| format!("ID{}", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(depth: u16, id: Option<u16>, name: Option<&str>) -> PlaceObject {
        PlaceObject {
            version: 2,
            depth,
            character_id: id,
            name: name.map(str::to_string),
            is_move: id.is_none(),
            ..PlaceObject::default()
        }
    }

    #[test]
    fn test_move_keeps_character() {
        let mut table = DepthTable::new();
        table.observe_placement(&place(1, Some(7), None));
        table.observe_placement(&place(1, None, None));
        assert_eq!(table.character_at(1), Some(7));
        assert_eq!(table.label_at(1).as_deref(), Some("ID7"));
        assert_eq!(table.character_at(2), None);
        assert_eq!(table.label_at(2), None);
    }

    #[test]
    fn test_name_and_replacement() {
        let mut table = DepthTable::new();
        table.observe_placement(&place(3, Some(1), Some("door")));
        table.observe_placement(&place(3, Some(2), None));
        assert_eq!(table.character_at(3), Some(2));
        // the name survives a replacement that does not restate it
        assert_eq!(table.label_at(3).as_deref(), Some("door"));
    }

    #[test]
    fn test_removal_keeps_stale_entry() {
        let mut table = DepthTable::new();
        table.observe_placement(&place(5, Some(9), None));
        table.observe_removal(&RemoveObject {
            depth: 5,
            character_id: None,
        });
        assert_eq!(table.character_at(5), Some(9));
    }
}
