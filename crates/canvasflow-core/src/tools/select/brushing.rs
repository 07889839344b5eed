//! Marquee selection.

use super::rerun_move;
use crate::app::App;
use crate::error::StateResult;
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::geometry::Bounds;
use crate::selection::brush_selection;
use crate::spatial_index::SpatialIndex;
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{begin_session, end_session, transition_tool, Session};

pub(super) fn state() -> StateDef<App> {
    StateDef::new("brushing").handlers(Handlers {
        on_enter,
        on_exit,
        on_wheel,
        on_pointer_move,
        on_pointer_up,
        on_key_down,
        ..Handlers::default()
    })
}

fn on_enter(app: &mut App, id: StateId, _: &EnterInfo) -> StateResult {
    let index = SpatialIndex::bulk_load(
        app.document
            .current_page()
            .shapes()
            .iter()
            .map(|s| (s.id(), s.rotated_bounds())),
    );
    let initial_selection = app.selection.selected_ids().to_vec();
    begin_session(
        app,
        Session::Brushing {
            initial_selection,
            index,
        },
    );
    // The move that started the drag already went to the previous state.
    rerun_move(app, id, on_pointer_move)
}

fn on_exit(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    app.selection.set_brush(None);
    end_session(app);
    Ok(())
}

fn on_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    rerun_move(app, id, on_pointer_move)
}

fn on_pointer_move(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    let Session::Brushing {
        initial_selection,
        index,
    } = &app.session
    else {
        return Ok(());
    };
    let modifiers = app.inputs.modifiers;
    let origin = app.inputs.origin_point;
    let current = app.inputs.current_point;
    let brush = Bounds::new(origin.x, origin.y, current.x, current.y);

    let candidates = index.query(&brush);
    // Back-to-front page order keeps the result stable.
    let hits: Vec<_> = app
        .document
        .current_page()
        .shapes()
        .iter()
        .filter(|s| candidates.iter().any(|c| c.id == s.id()))
        .filter(|s| {
            if modifiers.ctrl {
                brush.contains(&s.rotated_bounds())
            } else {
                s.hit_test_bounds(&brush)
            }
        })
        .map(|s| s.id())
        .collect();

    let selected = brush_selection(initial_selection, &hits, modifiers.shift);
    app.selection.set_brush(Some(brush));
    app.selection.set_selected(selected);
    Ok(())
}

fn on_pointer_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    app.selection.set_brush(None);
    transition_tool(app, id, "idle", TransitionData::None)
}

fn on_key_down(app: &mut App, id: StateId, event: &KeyEvent) -> StateResult {
    if event.key != "Escape" {
        return Ok(());
    }
    if let Session::Brushing {
        initial_selection, ..
    } = &app.session
    {
        let initial = initial_selection.clone();
        app.selection.set_selected(initial);
    }
    app.selection.set_brush(None);
    transition_tool(app, id, "idle", TransitionData::None)
}
