//! Drag-and-drop move protocol.
//!
//! Native drag events are order-dependent and `drop`/`dragend` may not both
//! fire, so the protocol is explicit: `begin` records the token in flight,
//! a drop consumes it with `take`, and `cancel` (on `dragend`) always clears
//! it so a stale reference can never make an unrelated insertion delete a
//! node.

use crate::document::NoteDocument;
use crate::token::TokenId;

/// The token currently being dragged from this surface, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveState {
    in_flight: Option<TokenId>,
}

impl MoveState {
    pub fn begin(&mut self, id: TokenId) {
        self.in_flight = Some(id);
    }

    pub fn in_flight(&self) -> Option<TokenId> {
        self.in_flight
    }

    /// Consume the in-flight token at drop time.
    pub fn take(&mut self) -> Option<TokenId> {
        self.in_flight.take()
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}

/// Remove the move's origin token and rebase the drop target onto the
/// document without it.
///
/// `target` is measured against the document before removal. Without an
/// origin (a drop from outside the surface) nothing is removed.
pub fn detach_origin(
    doc: &mut NoteDocument,
    origin: Option<TokenId>,
    target: Option<usize>,
) -> Option<usize> {
    let Some((removed_at, _)) = origin.and_then(|id| doc.remove_token(id)) else {
        return target;
    };
    target.map(|t| if t > removed_at { t - 1 } else { t })
}
