use super::{InteractionEffect, InteractionKind, InteractionState};
use crate::annotation::{AnnotationStore, Hit};
use crate::geometry::{ImageBounds, ImagePoint, Rect};

/// Everything a pointer gesture may read or mutate.
pub struct CanvasContext<'a> {
    pub store: &'a mut AnnotationStore,
    pub bounds: ImageBounds,
    /// Handle hit radius already converted to image space.
    pub handle_radius: f64,
}

#[derive(Debug, Default)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn kind(&self) -> InteractionKind {
        self.state.kind()
    }

    fn enter(&mut self, next: InteractionState) {
        if self.state.kind() != next.kind() {
            tracing::debug!(from = ?self.state.kind(), to = ?next.kind(), "interaction transition");
        }
        self.state = next;
    }

    pub fn pointer_down(
        &mut self,
        point: ImagePoint,
        ctx: CanvasContext<'_>,
    ) -> Vec<InteractionEffect> {
        let mut effects = self.abandon();

        let hit = ctx.store.hit_test(point, ctx.handle_radius);
        if let Some(id) = hit.map(|hit| hit.id()) {
            if ctx.store.select(id) {
                effects.push(InteractionEffect::SelectionChanged(Some(id)));
            }
        }

        match hit {
            Some(Hit::Handle { id, handle }) => {
                self.enter(InteractionState::Resizing { id, handle });
            }
            Some(Hit::Body { id }) => {
                self.enter(InteractionState::Dragging { id, last: point });
            }
            None => {
                if ctx.store.deselect() {
                    effects.push(InteractionEffect::SelectionChanged(None));
                }
                let origin = ctx.bounds.clamp_point(point);
                self.enter(InteractionState::Drawing {
                    origin,
                    current: origin,
                });
                effects.push(InteractionEffect::DraftChanged(Rect::from_corners(
                    origin, origin,
                )));
            }
        }
        effects
    }

    pub fn pointer_move(
        &mut self,
        point: ImagePoint,
        ctx: CanvasContext<'_>,
    ) -> Vec<InteractionEffect> {
        match self.state {
            InteractionState::Idle => Vec::new(),
            InteractionState::Drawing { origin, .. } => {
                let current = ctx.bounds.clamp_point(point);
                self.state = InteractionState::Drawing { origin, current };
                vec![InteractionEffect::DraftChanged(Rect::from_corners(
                    origin, current,
                ))]
            }
            InteractionState::Dragging { id, last } => {
                self.state = InteractionState::Dragging { id, last: point };
                let moved = ctx
                    .store
                    .move_by(id, point.x - last.x, point.y - last.y, ctx.bounds)
                    .is_some();
                if moved {
                    vec![InteractionEffect::AnnotationUpdated(id)]
                } else {
                    tracing::debug!(id, "drag target no longer exists");
                    Vec::new()
                }
            }
            InteractionState::Resizing { id, handle } => {
                match ctx.store.resize(id, handle, point, ctx.bounds) {
                    Some(active) => {
                        if active != handle {
                            tracing::debug!(
                                id,
                                from = handle.code(),
                                to = active.code(),
                                "resize handle flipped"
                            );
                        }
                        self.state = InteractionState::Resizing { id, handle: active };
                        vec![InteractionEffect::AnnotationUpdated(id)]
                    }
                    None => {
                        tracing::debug!(id, "resize target no longer exists");
                        Vec::new()
                    }
                }
            }
        }
    }

    pub fn pointer_up(
        &mut self,
        point: ImagePoint,
        ctx: CanvasContext<'_>,
    ) -> Vec<InteractionEffect> {
        match self.state {
            InteractionState::Idle => Vec::new(),
            InteractionState::Drawing { origin, .. } => {
                let draft = Rect::from_corners(origin, ctx.bounds.clamp_point(point));
                self.enter(InteractionState::Idle);
                if draft.meets_min_draw_size() {
                    vec![InteractionEffect::DrawCompleted(draft)]
                } else {
                    tracing::debug!(
                        width = draft.width,
                        height = draft.height,
                        "draw gesture below minimum size discarded"
                    );
                    vec![InteractionEffect::DraftDiscarded]
                }
            }
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                self.enter(InteractionState::Idle);
                Vec::new()
            }
        }
    }

    /// Pointer left the canvas: drop any draft, keep applied geometry.
    pub fn pointer_leave(&mut self) -> Vec<InteractionEffect> {
        self.abandon()
    }

    /// Escape: ends whatever gesture is active. Same outcome as leaving the canvas.
    pub fn cancel(&mut self) -> Vec<InteractionEffect> {
        self.abandon()
    }

    fn abandon(&mut self) -> Vec<InteractionEffect> {
        let was_drawing = matches!(self.state, InteractionState::Drawing { .. });
        self.enter(InteractionState::Idle);
        if was_drawing {
            vec![InteractionEffect::DraftDiscarded]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Label;
    use crate::geometry::Handle;

    const BOUNDS: ImageBounds = ImageBounds::new(200.0, 150.0);

    fn ctx(store: &mut AnnotationStore) -> CanvasContext<'_> {
        CanvasContext {
            store,
            bounds: BOUNDS,
            handle_radius: 4.0,
        }
    }

    fn store_with_box(rect: Rect) -> (AnnotationStore, u64) {
        let mut store = AnnotationStore::new();
        let id = store.insert(rect, &Label::new(1, "cat", "#ff0000"));
        (store, id)
    }

    fn draw(
        machine: &mut InteractionMachine,
        store: &mut AnnotationStore,
        from: ImagePoint,
        to: ImagePoint,
    ) -> Vec<InteractionEffect> {
        machine.pointer_down(from, ctx(store));
        machine.pointer_move(to, ctx(store));
        machine.pointer_up(to, ctx(store))
    }

    #[test]
    fn draw_gesture_completes_with_normalized_rect() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        let effects = draw(
            &mut machine,
            &mut store,
            ImagePoint::new(50.0, 60.0),
            ImagePoint::new(10.0, 10.0),
        );
        assert_eq!(
            effects,
            vec![InteractionEffect::DrawCompleted(Rect::new(
                10.0, 10.0, 40.0, 50.0
            ))]
        );
        assert_eq!(machine.kind(), InteractionKind::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn draw_below_minimum_is_discarded_and_minimum_is_kept() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        let small = draw(
            &mut machine,
            &mut store,
            ImagePoint::new(10.0, 10.0),
            ImagePoint::new(14.0, 14.0),
        );
        assert_eq!(small, vec![InteractionEffect::DraftDiscarded]);

        let exact = draw(
            &mut machine,
            &mut store,
            ImagePoint::new(10.0, 10.0),
            ImagePoint::new(15.0, 15.0),
        );
        assert_eq!(
            exact,
            vec![InteractionEffect::DrawCompleted(Rect::new(
                10.0, 10.0, 5.0, 5.0
            ))]
        );
    }

    #[test]
    fn draft_tracks_pointer_without_touching_store() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        machine.pointer_down(ImagePoint::new(20.0, 20.0), ctx(&mut store));
        let effects = machine.pointer_move(ImagePoint::new(5.0, 40.0), ctx(&mut store));
        assert_eq!(
            effects,
            vec![InteractionEffect::DraftChanged(Rect::new(
                5.0, 20.0, 15.0, 20.0
            ))]
        );
        assert_eq!(machine.state().draft(), Some(Rect::new(5.0, 20.0, 15.0, 20.0)));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn draw_points_are_clamped_into_image() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        let effects = draw(
            &mut machine,
            &mut store,
            ImagePoint::new(180.0, 140.0),
            ImagePoint::new(260.0, 190.0),
        );
        assert_eq!(
            effects,
            vec![InteractionEffect::DrawCompleted(Rect::new(
                180.0, 140.0, 20.0, 10.0
            ))]
        );
    }

    #[test]
    fn pointer_down_on_empty_area_clears_selection() {
        let (mut store, id) = store_with_box(Rect::new(10.0, 10.0, 20.0, 20.0));
        store.select(id);
        let mut machine = InteractionMachine::new();
        let effects = machine.pointer_down(ImagePoint::new(100.0, 100.0), ctx(&mut store));
        assert_eq!(effects[0], InteractionEffect::SelectionChanged(None));
        assert_eq!(machine.kind(), InteractionKind::Drawing);
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn drag_moves_by_pointer_delta_and_clamps() {
        let (mut store, id) = store_with_box(Rect::new(10.0, 10.0, 20.0, 20.0));
        let mut machine = InteractionMachine::new();

        let down = machine.pointer_down(ImagePoint::new(15.0, 15.0), ctx(&mut store));
        assert_eq!(down, vec![InteractionEffect::SelectionChanged(Some(id))]);
        assert_eq!(machine.kind(), InteractionKind::Dragging);

        let moved = machine.pointer_move(ImagePoint::new(25.0, 20.0), ctx(&mut store));
        assert_eq!(moved, vec![InteractionEffect::AnnotationUpdated(id)]);
        assert_eq!(store.get(id).map(|a| a.rect), Some(Rect::new(20.0, 15.0, 20.0, 20.0)));

        machine.pointer_move(ImagePoint::new(-100.0, 20.0), ctx(&mut store));
        assert_eq!(store.get(id).map(|a| a.rect.x), Some(0.0));

        machine.pointer_up(ImagePoint::new(-100.0, 20.0), ctx(&mut store));
        assert_eq!(machine.kind(), InteractionKind::Idle);
        assert_eq!(store.selected_id(), Some(id));
    }

    #[test]
    fn resize_through_opposite_corner_keeps_flipped_handle() {
        let (mut store, id) = store_with_box(Rect::new(40.0, 40.0, 20.0, 20.0));
        let mut machine = InteractionMachine::new();

        machine.pointer_down(ImagePoint::new(41.0, 39.0), ctx(&mut store));
        assert_eq!(
            machine.state(),
            InteractionState::Resizing {
                id,
                handle: Handle::NorthWest
            }
        );

        machine.pointer_move(ImagePoint::new(70.0, 45.0), ctx(&mut store));
        assert_eq!(
            machine.state(),
            InteractionState::Resizing {
                id,
                handle: Handle::NorthEast
            }
        );
        assert_eq!(store.get(id).map(|a| a.rect), Some(Rect::new(60.0, 45.0, 10.0, 15.0)));

        machine.pointer_move(ImagePoint::new(80.0, 45.0), ctx(&mut store));
        assert_eq!(store.get(id).map(|a| a.rect), Some(Rect::new(60.0, 45.0, 20.0, 15.0)));
    }

    #[test]
    fn leave_during_draw_discards_and_during_drag_keeps_geometry() {
        let (mut store, id) = store_with_box(Rect::new(10.0, 10.0, 20.0, 20.0));
        let mut machine = InteractionMachine::new();

        machine.pointer_down(ImagePoint::new(100.0, 100.0), ctx(&mut store));
        assert_eq!(machine.pointer_leave(), vec![InteractionEffect::DraftDiscarded]);
        assert_eq!(machine.kind(), InteractionKind::Idle);

        machine.pointer_down(ImagePoint::new(15.0, 15.0), ctx(&mut store));
        machine.pointer_move(ImagePoint::new(20.0, 15.0), ctx(&mut store));
        assert!(machine.pointer_leave().is_empty());
        assert_eq!(machine.kind(), InteractionKind::Idle);
        assert_eq!(store.get(id).map(|a| a.rect.x), Some(15.0));
    }

    #[test]
    fn drag_of_removed_annotation_is_noop() {
        let (mut store, id) = store_with_box(Rect::new(10.0, 10.0, 20.0, 20.0));
        let mut machine = InteractionMachine::new();
        machine.pointer_down(ImagePoint::new(15.0, 15.0), ctx(&mut store));
        store.remove(id);
        let revision = store.revision();

        assert!(machine
            .pointer_move(ImagePoint::new(30.0, 30.0), ctx(&mut store))
            .is_empty());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn pointer_down_mid_draw_abandons_previous_draft() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        machine.pointer_down(ImagePoint::new(10.0, 10.0), ctx(&mut store));
        let effects = machine.pointer_down(ImagePoint::new(50.0, 50.0), ctx(&mut store));
        assert_eq!(effects[0], InteractionEffect::DraftDiscarded);
        assert_eq!(
            machine.state(),
            InteractionState::Drawing {
                origin: ImagePoint::new(50.0, 50.0),
                current: ImagePoint::new(50.0, 50.0)
            }
        );
    }

    #[test]
    fn cancel_ends_drag_and_resize_without_reverting() {
        let (mut store, id) = store_with_box(Rect::new(10.0, 10.0, 20.0, 20.0));
        let mut machine = InteractionMachine::new();
        machine.pointer_down(ImagePoint::new(15.0, 15.0), ctx(&mut store));
        machine.pointer_move(ImagePoint::new(25.0, 15.0), ctx(&mut store));
        assert_eq!(machine.state().target_id(), Some(id));

        assert!(machine.cancel().is_empty());
        assert_eq!(machine.kind(), InteractionKind::Idle);
        assert_eq!(machine.state().target_id(), None);
        assert!(machine
            .pointer_move(ImagePoint::new(60.0, 60.0), ctx(&mut store))
            .is_empty());
        assert_eq!(
            store.get(id).map(|annotation| annotation.rect),
            Some(Rect::new(20.0, 10.0, 20.0, 20.0))
        );

        machine.pointer_down(ImagePoint::new(40.0, 30.0), ctx(&mut store));
        assert_eq!(machine.kind(), InteractionKind::Resizing);
        machine.cancel();
        machine.pointer_move(ImagePoint::new(90.0, 90.0), ctx(&mut store));
        assert_eq!(
            store.get(id).map(|annotation| annotation.rect),
            Some(Rect::new(20.0, 10.0, 20.0, 20.0))
        );
    }

    #[test]
    fn cancel_discards_draft() {
        let mut store = AnnotationStore::new();
        let mut machine = InteractionMachine::new();
        machine.pointer_down(ImagePoint::new(100.0, 100.0), ctx(&mut store));
        assert_eq!(machine.cancel(), vec![InteractionEffect::DraftDiscarded]);
        assert_eq!(machine.kind(), InteractionKind::Idle);
    }
}
