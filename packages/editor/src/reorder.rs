//! # Drag/Drop Reorder
//!
//! Turns drag-and-drop gestures over the segmented view into [`Mutation`]s.
//!
//! Drop zones sit before, between, and after every segment: zone `i` is the
//! gap in front of segment `i`, zone `len` the gap after the last one. The
//! zone last hovered wins over the segment under the drop event, since fast
//! pointer movement often releases over a neighbour.

use crate::composition::Composition;
use crate::mutations::Mutation;
use blockprompt_parser::DefinitionLookup;
use std::collections::HashMap;
use tracing::debug;

/// Transfer key carrying the id of a segment being moved
pub const SEGMENT_MIME: &str = "application/x-blockprompt-segment";

/// Transfer key carrying the id of a block definition dragged from the library
pub const BLOCK_MIME: &str = "application/x-blockprompt-block";

/// What a drag gesture carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// An existing segment, by segment id
    Segment(String),

    /// A block definition, by block id
    Definition(String),
}

impl DragPayload {
    /// Read the payload from drag transfer data. A segment move wins when both
    /// keys are present; blank values count as absent.
    pub fn from_transfer(data: &HashMap<String, String>) -> Option<Self> {
        let read = |key: &str| {
            data.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        read(SEGMENT_MIME)
            .map(DragPayload::Segment)
            .or_else(|| read(BLOCK_MIME).map(DragPayload::Definition))
    }
}

/// Splice position for a segment at `from` dropped on zone `target`.
///
/// Removing the source shifts every later position left by one, so a target
/// after the source is decremented first.
pub fn move_target(from: usize, target: usize) -> usize {
    if from < target {
        target - 1
    } else {
        target
    }
}

/// Hover tracking for the drop zones of one segmented view
#[derive(Debug, Clone, Default)]
pub struct DropZones {
    hovered: Option<usize>,
}

impl DropZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&mut self, zone: usize) {
        self.hovered = Some(zone);
    }

    /// Pointer left the view
    pub fn clear(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Effective zone for a drop whose event landed at `event_index`
    pub fn target(&self, event_index: usize) -> usize {
        self.hovered.unwrap_or(event_index)
    }

    /// Resolve a drop into a mutation, clearing the hover state.
    ///
    /// Returns `None` (a no-op) when the payload is missing or names a segment
    /// or definition that does not exist.
    pub fn resolve(
        &mut self,
        payload: Option<DragPayload>,
        event_index: usize,
        composition: &Composition,
        lookup: &dyn DefinitionLookup,
    ) -> Option<Mutation> {
        let target = self.target(event_index).min(composition.len());
        self.clear();

        match payload {
            None => {
                debug!("Drop without a recognized payload");
                None
            }

            Some(DragPayload::Segment(segment_id)) => {
                if composition.find(&segment_id).is_none() {
                    debug!(segment_id = %segment_id, "Drop of unknown segment");
                    return None;
                }
                Some(Mutation::MoveSegment {
                    segment_id,
                    target_index: target,
                })
            }

            Some(DragPayload::Definition(block_id)) => match lookup.definition(&block_id) {
                Some(def) => Some(Mutation::InsertBlock {
                    index: target,
                    values: def.defaults(),
                    block_id,
                }),
                None => {
                    debug!(block_id = %block_id, "Drop of unknown block definition");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use blockprompt_parser::{BlockDefinition, ParamDef, ParamType};
    use serde_json::json;

    fn defs() -> Vec<BlockDefinition> {
        vec![
            BlockDefinition::new("blk_a", "A"),
            BlockDefinition::new("blk_b", "B")
                .with_param(ParamDef::new("speed", "Speed", ParamType::Number, 1)),
        ]
    }

    fn transfer(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_move_target_shift() {
        // Position 3 onto zone 1 in a five-element list: no shift
        assert_eq!(move_target(3, 1), 1);
        assert_eq!(move_target(1, 4), 3);
        assert_eq!(move_target(2, 2), 2);
    }

    #[test]
    fn test_payload_priority() {
        let both = transfer(&[(SEGMENT_MIME, "s-1"), (BLOCK_MIME, "blk_a")]);
        assert_eq!(
            DragPayload::from_transfer(&both),
            Some(DragPayload::Segment("s-1".to_string()))
        );

        let blank = transfer(&[(SEGMENT_MIME, "  "), (BLOCK_MIME, "blk_a")]);
        assert_eq!(
            DragPayload::from_transfer(&blank),
            Some(DragPayload::Definition("blk_a".to_string()))
        );

        assert_eq!(DragPayload::from_transfer(&transfer(&[("text/plain", "x")])), None);
    }

    #[test]
    fn test_hovered_zone_wins() {
        let c = Composition::from_string("a[[Block:blk_a]]b", &defs());
        let mut zones = DropZones::new();
        zones.hover(0);

        let mutation = zones.resolve(
            Some(DragPayload::Definition("blk_b".into())),
            2,
            &c,
            &defs(),
        );

        assert_eq!(
            mutation,
            Some(Mutation::InsertBlock {
                index: 0,
                block_id: "blk_b".into(),
                values: [("speed".to_string(), json!(1))].into_iter().collect(),
            })
        );
        assert_eq!(zones.hovered(), None);
    }

    #[test]
    fn test_unrecognized_drops_are_noops() {
        let c = Composition::new();
        let mut zones = DropZones::new();

        assert_eq!(zones.resolve(None, 0, &c, &defs()), None);
        assert_eq!(
            zones.resolve(Some(DragPayload::Segment("gone".into())), 0, &c, &defs()),
            None
        );
        assert_eq!(
            zones.resolve(Some(DragPayload::Definition("nope".into())), 0, &c, &defs()),
            None
        );
    }

    #[test]
    fn test_reorder_lands_before_former_neighbour() {
        let mut c = Composition::from_string("t0[[Block:blk_a]]t2[[Block:blk_b]]t4", &defs());
        let moving = c.segments()[3].id().to_string();
        let anchor = c.segments()[1].id().to_string();

        let mut zones = DropZones::new();
        zones.hover(1);
        let mutation = zones
            .resolve(Some(DragPayload::Segment(moving.clone())), 4, &c, &defs())
            .unwrap();
        mutation.apply(&mut c).unwrap();

        let pos_moved = c.position(&moving).unwrap();
        let pos_anchor = c.position(&anchor).unwrap();
        assert!(pos_moved < pos_anchor);
        assert!(matches!(c.segments()[pos_moved + 1], Segment::Text(_)));
        assert_eq!(pos_moved + 2, pos_anchor);
        assert_eq!(
            c.to_source(&defs()),
            "t0[[Block:blk_b]][[Block:blk_a]]t2t4"
        );
    }
}
