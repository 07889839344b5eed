//! The editor: root of the state tree and owner of the document, selection,
//! inputs, viewport and history.
//!
//! Hosts feed page-space input through the `on_*` slots. Each slot updates
//! [`InputState`] first, then routes the event down the active tool.

use crate::document::{Document, SerializedDocument};
use crate::error::{ShapeError, StateResult};
use crate::events::{
    Event, EventTarget, KeyEvent, Modifiers, PinchEvent, PointerEvent, TransitionData, WheelEvent,
};
use crate::geometry::Bounds;
use crate::history::History;
use crate::input::InputState;
use crate::selection::SelectionModel;
use crate::settings::EditorSettings;
use crate::shape::{Shape, ShapeId, ShapeRegistry};
use crate::shortcuts::Platform;
use crate::state::{self, Handlers, StateContext, StateDef, StateId, StateTree};
use crate::subscriptions::{Callback, LifecycleEvent, SubscriptionId, Subscriptions};
use crate::tools::create::{LineTool, RectTool};
use crate::tools::{self, Session};
use crate::viewport::Viewport;

/// Name of the select tool state.
pub const SELECT_TOOL: &str = "select";
/// Name of the erase tool state.
pub const ERASE_TOOL: &str = "erase";
/// Name of the rectangle tool state.
pub const RECT_TOOL: &str = "rect";
/// Name of the line tool state.
pub const LINE_TOOL: &str = "line";

/// The editor core.
#[derive(Debug)]
pub struct App {
    tree: StateTree<App>,
    pub(crate) document: Document,
    pub(crate) selection: SelectionModel,
    pub(crate) inputs: InputState,
    pub(crate) viewport: Viewport,
    pub(crate) history: History,
    pub(crate) settings: EditorSettings,
    pub(crate) session: Session,
    registry: ShapeRegistry,
    subscriptions: Subscriptions<App>,
}

impl App {
    /// Create an editor with an empty document, entered into the select tool's idle state.
    pub fn new(settings: EditorSettings) -> StateResult<Self> {
        Self::with_document(settings, Document::new())
    }

    pub fn with_document(settings: EditorSettings, document: Document) -> StateResult<Self> {
        let tree = StateTree::new(root_state())?;
        let mut app = Self {
            tree,
            document,
            selection: SelectionModel::new(),
            inputs: InputState::new(),
            viewport: Viewport::from_settings(&settings),
            history: History::new(settings.max_history),
            settings,
            session: Session::default(),
            registry: ShapeRegistry::default(),
            subscriptions: Subscriptions::default(),
        };
        let initial = app.snapshot()?;
        app.history.reset(initial);
        state::start(&mut app)?;
        Ok(app)
    }

    /// Announce that the host has mounted the editor.
    pub fn mount(&mut self) {
        self.notify(LifecycleEvent::Mount);
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn inputs(&self) -> &InputState {
        &self.inputs
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Shape kinds known to [`App::load`] and undo.
    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    // --- State tree ---

    /// Switch tools (or any child of the root).
    pub fn transition(&mut self, to: &str, data: TransitionData) -> StateResult {
        let root = self.tree.root();
        state::transition(self, root, to, data)
    }

    pub fn select_tool(&mut self, tool: &str) -> StateResult {
        self.transition(tool, TransitionData::None)
    }

    /// Name of the active tool.
    pub fn current_tool(&self) -> Option<&str> {
        self.tree.current_state(self.tree.root())
    }

    /// Name of the active state inside the active tool.
    pub fn current_tool_state(&self) -> Option<&str> {
        let tool = self.tree.active_child(self.tree.root())?;
        self.tree.current_state(tool)
    }

    /// Dot-separated path of the active configuration below the root, e.g. `"select.idle"`.
    pub fn active_path(&self) -> String {
        self.tree
            .active_path()
            .into_iter()
            .skip(1)
            .filter_map(|id| self.tree.name(id))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether the active tool is sitting in its idle state.
    pub fn is_idle(&self) -> bool {
        self.current_tool_state() == Some("idle")
    }

    // --- Shapes and selection ---

    pub fn shape(&self, id: ShapeId) -> Option<&dyn Shape> {
        self.document.current_page().shape(id)
    }

    pub fn add_shape(&mut self, shape: Box<dyn Shape>) -> ShapeId {
        self.document.current_page_mut().add_shape(shape)
    }

    pub(crate) fn shape_mut(&mut self, id: ShapeId) -> Result<&mut (dyn Shape + 'static), ShapeError> {
        self.document
            .current_page_mut()
            .shape_mut(id)
            .ok_or(ShapeError::NotFound(id))
    }

    pub fn selected_ids(&self) -> &[ShapeId] {
        self.selection.selected_ids()
    }

    /// Selected shapes that exist on the current page, in selection order.
    pub fn selected_shapes(&self) -> Vec<&dyn Shape> {
        self.selection
            .selected_ids()
            .iter()
            .filter_map(|id| self.shape(*id))
            .collect()
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selection.set_selected(ids);
    }

    pub fn select_all(&mut self) {
        let ids = self.document.current_page().shape_ids();
        self.selection.set_selected(ids);
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear_selection();
    }

    pub fn hover(&mut self, id: Option<ShapeId>) {
        self.selection.set_hovered(id);
    }

    /// Bounds around the selection.
    ///
    /// A single shape gives its own (possibly rotated) bounds; several give
    /// the axis-aligned union of their rotated bounds.
    pub fn selected_bounds(&self) -> Option<Bounds> {
        match self.selected_shapes().as_slice() {
            [] => None,
            [single] => Some(single.bounds()),
            shapes => Bounds::common(shapes.iter().map(|s| s.rotated_bounds())),
        }
    }

    /// Remove shapes from the current page and record the change.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> StateResult {
        if ids.is_empty() {
            return Ok(());
        }
        let removed = self.document.current_page_mut().remove_shapes(ids);
        log::debug!("Deleted {} shapes", removed.len());
        let page = self.document.current_page();
        self.selection.retain(|id| page.contains(id));
        self.persist()?;
        Ok(())
    }

    pub fn delete_selected(&mut self) -> StateResult {
        let ids = self.selection.selected_ids().to_vec();
        self.delete_shapes(&ids)
    }

    // --- History ---

    /// Serialized document with the current selection.
    pub fn snapshot(&self) -> StateResult<SerializedDocument> {
        let snapshot = self
            .document
            .serialized(self.selection.selected_ids().to_vec())?;
        Ok(snapshot)
    }

    /// Record the document as an undo step. Ignored while an interaction holds the history.
    pub fn persist(&mut self) -> StateResult<bool> {
        let snapshot = self.snapshot()?;
        Ok(self.history.persist(snapshot))
    }

    pub fn undo(&mut self) -> StateResult {
        match self.history.undo().cloned() {
            Some(snapshot) => self.restore(&snapshot),
            None => Ok(()),
        }
    }

    pub fn redo(&mut self) -> StateResult {
        match self.history.redo().cloned() {
            Some(snapshot) => self.restore(&snapshot),
            None => Ok(()),
        }
    }

    fn restore(&mut self, snapshot: &SerializedDocument) -> StateResult {
        self.document = Document::from_serialized(snapshot, &self.registry)?;
        self.selection.set_selected(snapshot.selected_ids.iter().copied());
        let page = self.document.current_page();
        self.selection.retain(|id| page.contains(id));
        Ok(())
    }

    // --- Persistence ---

    /// Replace the document and start a fresh history.
    pub fn load(&mut self, snapshot: &SerializedDocument) -> StateResult {
        self.restore(snapshot)?;
        let initial = self.snapshot()?;
        self.history.reset(initial);
        self.notify(LifecycleEvent::Load);
        Ok(())
    }

    /// Snapshot for the host to write, announcing [`LifecycleEvent::Save`].
    pub fn save(&mut self) -> StateResult<SerializedDocument> {
        self.notify(LifecycleEvent::Save);
        self.snapshot()
    }

    /// Like [`App::save`], announcing [`LifecycleEvent::SaveAs`].
    pub fn save_as(&mut self) -> StateResult<SerializedDocument> {
        self.notify(LifecycleEvent::SaveAs);
        self.snapshot()
    }

    // --- Subscriptions ---

    pub fn subscribe(&mut self, event: LifecycleEvent, callback: Callback<App>) -> SubscriptionId {
        self.subscriptions.subscribe(event, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    fn notify(&mut self, event: LifecycleEvent) {
        let mut subscriptions = std::mem::take(&mut self.subscriptions);
        subscriptions.notify(self, event);
        self.subscriptions = subscriptions;
    }

    // --- Input slots ---

    /// Pointer event at the current input position, used to re-run move logic.
    pub(crate) fn current_pointer_event(&self) -> PointerEvent {
        PointerEvent {
            target: EventTarget::Canvas,
            order: 0,
            point: self.inputs.current_point,
            modifiers: self.inputs.modifiers,
            button: None,
        }
    }

    pub fn on_pointer_down(&mut self, event: PointerEvent) -> StateResult {
        self.inputs.pointer_down(&event);
        state::dispatch(self, &Event::PointerDown(event))
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) -> StateResult {
        self.inputs.pointer_move(&event);
        state::dispatch(self, &Event::PointerMove(event))
    }

    pub fn on_pointer_up(&mut self, event: PointerEvent) -> StateResult {
        self.inputs.pointer_up(&event);
        state::dispatch(self, &Event::PointerUp(event))
    }

    pub fn on_pointer_enter(&mut self, event: PointerEvent) -> StateResult {
        state::dispatch(self, &Event::PointerEnter(event))
    }

    pub fn on_pointer_leave(&mut self, event: PointerEvent) -> StateResult {
        state::dispatch(self, &Event::PointerLeave(event))
    }

    /// Wheel events carry screen coordinates; the root pans the viewport.
    pub fn on_wheel(&mut self, event: WheelEvent) -> StateResult {
        state::dispatch(self, &Event::Wheel(event))
    }

    pub fn on_key_down(&mut self, event: KeyEvent) -> StateResult {
        self.inputs.key_down(&event);
        state::dispatch(self, &Event::KeyDown(event.clone()))?;
        state::fire_shortcuts(self, &event)
    }

    pub fn on_key_up(&mut self, event: KeyEvent) -> StateResult {
        self.inputs.key_up(&event);
        state::dispatch(self, &Event::KeyUp(event))
    }

    pub fn on_pinch_start(&mut self, event: PinchEvent) -> StateResult {
        self.inputs.pinch_start();
        state::dispatch(self, &Event::PinchStart(event))
    }

    pub fn on_pinch(&mut self, event: PinchEvent) -> StateResult {
        state::dispatch(self, &Event::Pinch(event))
    }

    pub fn on_pinch_end(&mut self, event: PinchEvent) -> StateResult {
        let result = state::dispatch(self, &Event::PinchEnd(event));
        self.inputs.pinch_end();
        result
    }

    /// Screen position of the pointer, used as the anchor for keyboard zoom.
    fn pointer_screen_point(&self) -> kurbo::Point {
        self.viewport.screen_point(self.inputs.current_point)
    }
}

impl StateContext for App {
    fn states(&self) -> &StateTree<Self> {
        &self.tree
    }

    fn states_mut(&mut self) -> &mut StateTree<Self> {
        &mut self.tree
    }

    fn modifier_pointer_event(&self, key: &KeyEvent) -> PointerEvent {
        PointerEvent {
            modifiers: key.modifiers,
            ..self.current_pointer_event()
        }
    }

    fn platform(&self) -> Platform {
        self.settings.platform
    }
}

fn root_state() -> StateDef<App> {
    StateDef::<App>::new("app")
        .handlers(Handlers {
            on_wheel: root_wheel,
            on_key_down: root_key_down,
            ..Handlers::default()
        })
        .shortcut("mod+z", |app, _| app.undo())
        .shortcut("mod+shift+z", |app, _| app.redo())
        .shortcut("mod+a", select_all_shortcut)
        .shortcut("shift+0", |app, _| {
            let anchor = app.pointer_screen_point();
            app.viewport.reset_zoom(anchor);
            Ok(())
        })
        .shortcut("mod+=", |app, _| {
            let anchor = app.pointer_screen_point();
            app.viewport.zoom_in(anchor);
            Ok(())
        })
        .shortcut("mod+-", |app, _| {
            let anchor = app.pointer_screen_point();
            app.viewport.zoom_out(anchor);
            Ok(())
        })
        .shortcut("mod+s", |app, _| app.save().map(drop))
        .shortcut("mod+shift+s", |app, _| app.save_as().map(drop))
        .shortcut("v", |app, _| switch_tool_when_idle(app, SELECT_TOOL))
        .shortcut("e", |app, _| switch_tool_when_idle(app, ERASE_TOOL))
        .shortcut("r", |app, _| switch_tool_when_idle(app, RECT_TOOL))
        .shortcut("l", |app, _| switch_tool_when_idle(app, LINE_TOOL))
        .children([
            tools::select::state(),
            tools::erase::state(),
            tools::create::state::<RectTool>(),
            tools::create::state::<LineTool>(),
        ])
}

fn root_wheel(app: &mut App, _: StateId, event: &WheelEvent) -> StateResult {
    app.viewport.pan(-event.delta);
    let page_point = app.viewport.page_point(event.point);
    app.inputs.wheel(event, page_point);
    Ok(())
}

fn select_all_shortcut(app: &mut App, _: StateId) -> StateResult {
    if !app.is_idle() {
        return Ok(());
    }
    if app.current_tool() != Some(SELECT_TOOL) {
        app.select_tool(SELECT_TOOL)?;
    }
    app.select_all();
    Ok(())
}

/// Escape from another tool's idle state goes back to selecting.
///
/// The root sees the key before the active tool does, so an Escape that
/// cancels an interaction leaves the tool in its idle state.
fn root_key_down(app: &mut App, _: StateId, event: &KeyEvent) -> StateResult {
    let plain_escape = event.key.eq_ignore_ascii_case("escape") && event.modifiers == Modifiers::default();
    if plain_escape && app.current_tool() != Some(SELECT_TOOL) && app.is_idle() {
        app.select_tool(SELECT_TOOL)?;
    }
    Ok(())
}

fn switch_tool_when_idle(app: &mut App, tool: &str) -> StateResult {
    if app.current_tool() == Some(tool) || !app.is_idle() {
        return Ok(());
    }
    app.select_tool(tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use crate::events::BoundsTarget;
    use crate::shape::{encode_props, LineShape, RectShape, ResizeInfo, SerializedShape, ShapeUpdate};
    use std::collections::HashMap;
    use crate::shortcuts::Platform;
    use crate::transform::{Corner, Edge, ResizeHandle};
    use kurbo::{Point, Vec2};
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    fn app() -> App {
        App::new(EditorSettings {
            platform: Platform::Other,
            ..EditorSettings::default()
        })
        .unwrap()
    }

    fn rect(app: &mut App, x: f64, y: f64, w: f64, h: f64) -> ShapeId {
        app.add_shape(Box::new(RectShape::new(Point::new(x, y), w, h)))
    }

    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::canvas(Point::new(x, y))
    }

    fn key(name: &str, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(name, modifiers)
    }

    fn drag(app: &mut App, down: PointerEvent, to: Point) {
        app.on_pointer_down(down).unwrap();
        app.on_pointer_move(PointerEvent { point: to, ..down }).unwrap();
        app.on_pointer_up(PointerEvent { point: to, ..down }).unwrap();
    }

    #[test]
    fn test_starts_in_select_idle() {
        let app = app();
        assert_eq!(app.active_path(), "select.idle");
        assert_eq!(app.current_tool(), Some(SELECT_TOOL));
        assert!(!app.history().is_paused());
    }

    #[test]
    fn test_click_shape_selects_it() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 50.0, 0.0, 10.0, 10.0);

        app.on_pointer_down(PointerEvent::shape(a, Point::new(5.0, 5.0))).unwrap();
        assert_eq!(app.current_tool_state(), Some("pointingShape"));
        app.on_pointer_up(PointerEvent::shape(a, Point::new(5.0, 5.0))).unwrap();
        assert_eq!(app.selected_ids(), &[a]);
        assert!(app.is_idle());

        // Shift adds.
        let shifted = PointerEvent::shape(b, Point::new(55.0, 5.0)).with_modifiers(SHIFT);
        app.on_pointer_down(shifted).unwrap();
        app.on_pointer_up(shifted).unwrap();
        assert_eq!(app.selected_ids(), &[a, b]);

        // Shift-clicking a selected shape deselects it.
        let shifted = PointerEvent::shape(a, Point::new(5.0, 5.0)).with_modifiers(SHIFT);
        app.on_pointer_down(shifted).unwrap();
        assert_eq!(app.current_tool_state(), Some("pointingSelectedShape"));
        app.on_pointer_up(shifted).unwrap();
        assert_eq!(app.selected_ids(), &[b]);
    }

    #[test]
    fn test_click_canvas_clears_selection() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.select([a]);
        app.on_pointer_down(at(100.0, 100.0)).unwrap();
        assert_eq!(app.current_tool_state(), Some("pointingCanvas"));
        assert!(app.selected_ids().is_empty());
        app.on_pointer_up(at(100.0, 100.0)).unwrap();
        assert!(app.is_idle());
    }

    #[test]
    fn test_ctrl_press_ignores_shapes() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.on_pointer_down(PointerEvent::shape(a, Point::new(5.0, 5.0)).with_modifiers(CTRL))
            .unwrap();
        assert_eq!(app.current_tool_state(), Some("pointingCanvas"));
    }

    #[test]
    fn test_small_moves_stay_below_threshold() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.on_pointer_down(PointerEvent::shape(a, Point::new(5.0, 5.0))).unwrap();
        app.on_pointer_move(PointerEvent::shape(a, Point::new(8.0, 9.0))).unwrap();
        assert_eq!(app.current_tool_state(), Some("pointingShape"));
        app.on_pointer_move(PointerEvent::shape(a, Point::new(9.0, 9.0))).unwrap();
        assert_eq!(app.current_tool_state(), Some("translating"));
    }

    #[test]
    fn test_translate_commits_one_undo_step() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.persist().unwrap();
        let before = app.snapshot().unwrap();

        drag(&mut app, PointerEvent::shape(a, Point::new(5.0, 5.0)), Point::new(25.0, 15.0));
        assert!(app.is_idle());
        assert!(!app.history().is_paused());
        assert_eq!(app.shape(a).unwrap().point(), Point::new(20.0, 10.0));

        app.undo().unwrap();
        assert_eq!(app.shape(a).unwrap().point(), Point::new(0.0, 0.0));
        assert_eq!(app.snapshot().unwrap().pages, before.pages);
        app.redo().unwrap();
        assert_eq!(app.shape(a).unwrap().point(), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_translate_with_shift_locks_axis() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let down = PointerEvent::shape(a, Point::new(5.0, 5.0));
        app.on_pointer_down(down).unwrap();
        app.on_pointer_move(PointerEvent { point: Point::new(35.0, 9.0), ..down }).unwrap();
        assert_eq!(app.current_tool_state(), Some("translating"));
        app.on_key_down(key("Shift", SHIFT)).unwrap();
        assert_eq!(app.shape(a).unwrap().point(), Point::new(30.0, 0.0));
        app.on_key_up(key("Shift", Modifiers::default())).unwrap();
        assert_eq!(app.shape(a).unwrap().point(), Point::new(30.0, 4.0));
    }

    #[test]
    fn test_escape_restores_exactly() {
        let mut app = app();
        let a = app.add_shape(Box::new(
            RectShape::new(Point::new(0.1, 0.2), 100.0, 50.0).with_rotation(0.3),
        ));
        let b = app.add_shape(Box::new(LineShape::new(Point::new(200.0, 0.0), Point::new(250.0, 80.0))));
        app.select([a, b]);
        let before = app.snapshot().unwrap();

        // Translate.
        let down = PointerEvent::bounds(BoundsTarget::Background, Point::new(100.0, 40.0));
        app.on_pointer_down(down).unwrap();
        app.on_pointer_move(PointerEvent { point: Point::new(140.0, 90.0), ..down }).unwrap();
        assert_eq!(app.current_tool_state(), Some("translating"));
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert!(app.is_idle());
        assert_eq!(app.snapshot().unwrap(), before);

        // Resize.
        let handle = BoundsTarget::Handle(ResizeHandle::Corner(Corner::BottomRight));
        let down = PointerEvent::bounds(handle, Point::new(250.0, 80.0));
        app.on_pointer_down(down).unwrap();
        assert_eq!(app.current_tool_state(), Some("resizingShapes"));
        app.on_pointer_move(PointerEvent { point: Point::new(-400.0, 300.0), ..down }).unwrap();
        assert_ne!(app.snapshot().unwrap(), before);
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert_eq!(app.snapshot().unwrap(), before);

        // Rotate.
        let down = PointerEvent::bounds(BoundsTarget::Rotate, Point::new(120.0, -20.0));
        app.on_pointer_down(down).unwrap();
        assert_eq!(app.current_tool_state(), Some("rotatingShapes"));
        app.on_pointer_move(PointerEvent { point: Point::new(300.0, 200.0), ..down }).unwrap();
        assert_ne!(app.snapshot().unwrap(), before);
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert_eq!(app.snapshot().unwrap(), before);

        assert!(!app.history().is_paused());
        assert!(!app.history().can_undo());
    }

    #[test]
    fn test_resize_scenario() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 100.0, 100.0);
        app.select([a]);
        let down = PointerEvent::bounds(
            BoundsTarget::Handle(ResizeHandle::Edge(Edge::Right)),
            Point::new(100.0, 50.0),
        );
        drag(&mut app, down, Point::new(150.0, 50.0));

        let bounds = app.shape(a).unwrap().bounds();
        assert!((bounds.width() - 150.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 100.0).abs() < f64::EPSILON);
        assert!(app.history().can_undo());
        assert!(!app.history().is_paused());
    }

    #[test]
    fn test_resize_without_selection_fails() {
        let mut app = app();
        let down = PointerEvent::bounds(
            BoundsTarget::Handle(ResizeHandle::Edge(Edge::Right)),
            Point::new(100.0, 50.0),
        );
        assert!(matches!(
            app.on_pointer_down(down),
            Err(StateError::MissingSelectionBounds("resizingShapes"))
        ));
        assert!(!app.history().is_paused());
    }

    #[test]
    fn test_resize_without_handle_fails() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 100.0, 100.0);
        app.select([a]);
        let select = app.states().find(SELECT_TOOL).unwrap();
        let err = state::transition(&mut app, select, "resizingShapes", TransitionData::None).unwrap_err();
        assert!(matches!(err, StateError::MissingTransitionData("resizingShapes", _)));
        assert!(!app.history().is_paused());
        assert_eq!(app.shape(a).unwrap().bounds(), Bounds::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_rotate_snaps_with_shift() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 100.0, 100.0);
        app.select([a]);
        let down = PointerEvent::bounds(BoundsTarget::Rotate, Point::new(100.0, 50.0));
        app.on_pointer_down(down).unwrap();
        // Just short of a quarter turn about (50, 50).
        let moved = PointerEvent {
            point: Point::new(51.0, 100.0),
            modifiers: SHIFT,
            ..down
        };
        app.on_pointer_move(moved).unwrap();
        app.on_pointer_up(moved).unwrap();

        let shape = app.shape(a).unwrap();
        assert!((shape.rotation() - FRAC_PI_2).abs() < 1e-9);
        assert!((shape.center() - Point::new(50.0, 50.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_marquee_selects_and_toggles() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 30.0, 0.0, 10.0, 10.0);
        let c = rect(&mut app, 60.0, 0.0, 10.0, 10.0);

        let down = at(-5.0, -5.0);
        app.on_pointer_down(down).unwrap();
        app.on_pointer_move(at(35.0, 5.0)).unwrap();
        assert_eq!(app.current_tool_state(), Some("brushing"));
        assert!(app.selection().brush().is_some());
        assert_eq!(app.selected_ids(), &[a, b]);
        app.on_pointer_up(at(35.0, 5.0)).unwrap();
        assert!(app.selection().brush().is_none());

        // Shift-brushing over already selected shapes removes them.
        let down = at(-5.0, -5.0).with_modifiers(SHIFT);
        app.on_pointer_down(down).unwrap();
        app.on_pointer_move(at(15.0, 15.0).with_modifiers(SHIFT)).unwrap();
        assert_eq!(app.selected_ids(), &[b]);
        // Growing the brush over an unselected shape adds everything instead.
        app.on_pointer_move(at(65.0, 15.0).with_modifiers(SHIFT)).unwrap();
        let mut selected = app.selected_ids().to_vec();
        selected.sort();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(selected, expected);

        // Escape restores the selection from before the drag.
        app.on_key_down(key("Escape", SHIFT)).unwrap();
        assert_eq!(app.selected_ids(), &[a, b]);
        assert!(app.is_idle());
    }

    #[test]
    fn test_marquee_ctrl_requires_containment() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 20.0, 0.0, 10.0, 10.0);
        // Ctrl forces the canvas path even when pressing on a shape.
        app.on_pointer_down(at(-5.0, -5.0).with_modifiers(CTRL)).unwrap();
        app.on_pointer_move(at(25.0, 15.0).with_modifiers(CTRL)).unwrap();
        assert_eq!(app.selected_ids(), &[a]);
        app.on_pointer_move(at(25.0, 15.0)).unwrap();
        assert_eq!(app.selected_ids(), &[a, b]);
    }

    #[test]
    fn test_hover() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let mut enter = PointerEvent::shape(a, Point::new(5.0, 5.0));
        enter.order = 1;
        app.on_pointer_enter(enter).unwrap();
        assert_eq!(app.selection().hovered_id(), None);
        enter.order = 0;
        app.on_pointer_enter(enter).unwrap();
        assert_eq!(app.selection().hovered_id(), Some(a));
        app.on_pointer_leave(enter).unwrap();
        assert_eq!(app.selection().hovered_id(), None);

        app.on_pointer_enter(enter).unwrap();
        app.on_pointer_down(at(100.0, 100.0)).unwrap();
        assert_eq!(app.selection().hovered_id(), None);
    }

    #[test]
    fn test_delete_shortcut_only_in_idle() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 20.0, 0.0, 10.0, 10.0);
        app.persist().unwrap();
        app.select([a]);
        app.on_key_down(key("Delete", Modifiers::default())).unwrap();
        assert!(app.shape(a).is_none());
        assert!(app.selected_ids().is_empty());

        app.select([b]);
        app.on_pointer_down(PointerEvent::shape(b, Point::new(25.0, 5.0))).unwrap();
        app.on_key_down(key("Backspace", Modifiers::default())).unwrap();
        assert!(app.shape(b).is_some());

        app.on_pointer_up(PointerEvent::shape(b, Point::new(25.0, 5.0))).unwrap();
        app.undo().unwrap();
        assert!(app.shape(a).is_some());
    }

    #[test]
    fn test_app_shortcuts() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 20.0, 0.0, 10.0, 10.0);

        app.on_key_down(key("a", CTRL)).unwrap();
        assert_eq!(app.selected_ids(), &[a, b]);

        app.on_key_down(key("=", CTRL)).unwrap();
        assert!((app.viewport().zoom - 1.25).abs() < 1e-12);
        app.on_key_down(key("-", CTRL)).unwrap();
        assert!((app.viewport().zoom - 1.0).abs() < 1e-12);
        app.on_key_down(key("=", CTRL)).unwrap();
        app.on_key_down(key("0", SHIFT)).unwrap();
        assert!((app.viewport().zoom - 1.0).abs() < 1e-12);

        app.on_key_down(key("e", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "erase.idle");
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "select.idle");

        // Select all from another tool switches back to selecting.
        app.on_key_down(key("e", Modifiers::default())).unwrap();
        app.deselect_all();
        app.on_key_down(key("a", CTRL)).unwrap();
        assert_eq!(app.active_path(), "select.idle");
        assert_eq!(app.selected_ids().len(), 2);
    }

    #[test]
    fn test_undo_shortcut_uses_platform_mod() {
        let mut app = App::new(EditorSettings {
            platform: Platform::Mac,
            ..EditorSettings::default()
        })
        .unwrap();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.persist().unwrap();
        app.select([a]);
        app.delete_selected().unwrap();
        assert!(app.shape(a).is_none());

        // Ctrl is not `mod` on macOS.
        app.on_key_down(key("z", CTRL)).unwrap();
        assert!(app.shape(a).is_none());
        let meta = Modifiers {
            meta: true,
            ..Default::default()
        };
        app.on_key_down(key("z", meta)).unwrap();
        assert!(app.shape(a).is_some());
        app.on_key_down(key("z", Modifiers { shift: true, ..meta })).unwrap();
        assert!(app.shape(a).is_none());
    }

    #[test]
    fn test_wheel_pans_and_keeps_brushing() {
        let mut app = app();
        let a = rect(&mut app, 50.0, 0.0, 10.0, 10.0);
        app.on_pointer_down(at(0.0, 0.0)).unwrap();
        app.on_pointer_move(at(20.0, 20.0)).unwrap();
        assert_eq!(app.current_tool_state(), Some("brushing"));

        // Scrolling right moves the page left under the pointer.
        app.on_wheel(WheelEvent {
            point: Point::new(20.0, 20.0),
            delta: Vec2::new(40.0, 0.0),
            modifiers: Modifiers::default(),
        })
        .unwrap();
        assert_eq!(app.viewport().offset, Vec2::new(-40.0, 0.0));
        assert_eq!(app.inputs().current_point, Point::new(60.0, 20.0));
        assert_eq!(app.selected_ids(), &[a]);
    }

    #[test]
    fn test_pinch_zooms() {
        let mut app = app();
        let pinch = PinchEvent {
            point: Point::new(100.0, 100.0),
            delta: Vec2::ZERO,
            scale: 2.0,
            modifiers: Modifiers::default(),
        };
        app.on_pinch_start(pinch).unwrap();
        assert_eq!(app.current_tool_state(), Some("pinching"));
        assert!(app.inputs().is_pinching);
        app.on_pinch(pinch).unwrap();
        assert!((app.viewport().zoom - 2.0).abs() < f64::EPSILON);
        app.on_pinch_end(pinch).unwrap();
        assert!(app.is_idle());
        assert!(!app.inputs().is_pinching);
    }

    #[test]
    fn test_save_load_notify() {
        let mut app = app();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for event in [
            LifecycleEvent::Mount,
            LifecycleEvent::Save,
            LifecycleEvent::SaveAs,
            LifecycleEvent::Load,
        ] {
            let log = Rc::clone(&seen);
            app.subscribe(
                event,
                Box::new(move |app: &App, e: LifecycleEvent| {
                    log.borrow_mut().push((e, app.document().pages().len()))
                }),
            );
        }
        app.mount();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        app.on_key_down(key("s", CTRL)).unwrap();
        let saved = app.save_as().unwrap();
        assert_eq!(saved.pages[0].shapes.len(), 1);

        let mut fresh = self::app();
        let log = Rc::clone(&seen);
        let id = fresh.subscribe(
            LifecycleEvent::Load,
            Box::new(move |_: &App, e: LifecycleEvent| log.borrow_mut().push((e, 0))),
        );
        assert!(fresh.unsubscribe(id));
        fresh.load(&saved).unwrap();
        assert!(fresh.shape(a).is_some());
        assert!(!fresh.history().can_undo());

        let events: Vec<_> = seen.borrow().iter().map(|(e, _)| *e).collect();
        assert_eq!(
            events,
            vec![LifecycleEvent::Mount, LifecycleEvent::Save, LifecycleEvent::SaveAs]
        );
    }

    #[test]
    fn test_erase_tool() {
        let mut app = app();
        let a = rect(&mut app, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut app, 30.0, 0.0, 10.0, 10.0);
        let c = rect(&mut app, 0.0, 50.0, 10.0, 10.0);
        app.persist().unwrap();
        app.select_tool(ERASE_TOOL).unwrap();

        app.on_pointer_down(at(5.0, 5.0)).unwrap();
        assert_eq!(app.current_tool_state(), Some("pointing"));
        assert_eq!(app.selection().erasing_ids(), &[a]);
        app.on_pointer_move(at(35.0, 5.0)).unwrap();
        assert_eq!(app.current_tool_state(), Some("erasing"));
        assert_eq!(app.selection().erasing_ids(), &[a, b]);
        app.on_pointer_up(at(35.0, 5.0)).unwrap();

        assert!(app.shape(a).is_none());
        assert!(app.shape(b).is_none());
        assert!(app.shape(c).is_some());
        assert!(app.selection().erasing_ids().is_empty());
        assert_eq!(app.active_path(), "erase.idle");

        // Escape abandons an erase.
        app.on_pointer_down(at(5.0, 55.0)).unwrap();
        assert_eq!(app.selection().erasing_ids(), &[c]);
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert!(app.selection().erasing_ids().is_empty());
        assert!(app.shape(c).is_some());
        assert_eq!(app.active_path(), "erase.idle");
        // A second Escape leaves the tool.
        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "select.idle");

        app.undo().unwrap();
        assert!(app.shape(a).is_some() && app.shape(b).is_some());
    }

    #[test]
    fn test_rect_tool_creates_one_undo_step() {
        let mut app = app();
        let existing = rect(&mut app, 100.0, 100.0, 10.0, 10.0);
        app.select([existing]);
        app.persist().unwrap();
        app.on_key_down(key("r", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "rect.idle");

        // A click without a drag draws nothing.
        app.on_pointer_down(at(0.0, 0.0)).unwrap();
        assert_eq!(app.active_path(), "rect.pointing");
        app.on_pointer_up(at(0.0, 0.0)).unwrap();
        assert_eq!(app.active_path(), "rect.idle");
        assert_eq!(app.document().current_page().shapes().len(), 1);

        app.on_pointer_down(at(10.0, 10.0)).unwrap();
        app.on_pointer_move(at(40.0, 30.0)).unwrap();
        assert_eq!(app.active_path(), "rect.creating");
        assert!(app.history().is_paused());
        let created = app.selected_ids()[0];
        assert_ne!(created, existing);
        app.on_pointer_move(at(60.0, 50.0)).unwrap();
        app.on_pointer_up(at(60.0, 50.0)).unwrap();

        assert_eq!(app.active_path(), "select.idle");
        assert_eq!(app.selected_ids(), &[created]);
        assert_eq!(app.shape(created).unwrap().bounds(), Bounds::new(10.0, 10.0, 60.0, 50.0));
        assert!(!app.history().is_paused());

        app.undo().unwrap();
        assert!(app.shape(created).is_none());
        assert_eq!(app.selected_ids(), &[existing]);
        app.redo().unwrap();
        assert!(app.shape(created).is_some());
    }

    #[test]
    fn test_rect_tool_shift_draws_square() {
        let mut app = app();
        app.select_tool(RECT_TOOL).unwrap();
        app.on_pointer_down(at(0.0, 0.0)).unwrap();
        app.on_pointer_move(at(40.0, 10.0)).unwrap();
        let created = app.selected_ids()[0];
        // Pressing Shift mid-drag applies at once.
        app.on_key_down(key("Shift", SHIFT)).unwrap();
        assert_eq!(app.shape(created).unwrap().bounds(), Bounds::new(0.0, 0.0, 40.0, 40.0));
        app.on_key_up(key("Shift", Modifiers::default())).unwrap();
        assert_eq!(app.shape(created).unwrap().bounds(), Bounds::new(0.0, 0.0, 40.0, 10.0));
    }

    #[test]
    fn test_escape_discards_shape_being_created() {
        let mut app = app();
        app.persist().unwrap();
        app.on_key_down(key("l", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "line.idle");

        app.on_pointer_down(at(0.0, 0.0)).unwrap();
        app.on_pointer_move(at(30.0, 30.0)).unwrap();
        assert_eq!(app.active_path(), "line.creating");
        let created = app.selected_ids()[0];
        assert_eq!(app.shape(created).unwrap().kind(), LineShape::KIND);

        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert!(app.shape(created).is_none());
        assert!(app.selected_ids().is_empty());
        assert!(!app.history().is_paused());
        assert!(!app.history().can_undo());
        assert_eq!(app.active_path(), "line.idle");

        app.on_key_down(key("Escape", Modifiers::default())).unwrap();
        assert_eq!(app.active_path(), "select.idle");
    }

    /// A rect whose props cannot be written as JSON.
    #[derive(Debug)]
    struct Unencodable(RectShape);

    impl Shape for Unencodable {
        fn id(&self) -> ShapeId {
            self.0.id()
        }

        fn kind(&self) -> &'static str {
            "unencodable"
        }

        fn point(&self) -> Point {
            self.0.point()
        }

        fn bounds(&self) -> Bounds {
            self.0.bounds()
        }

        fn serialized(&self) -> Result<SerializedShape, ShapeError> {
            let props: HashMap<(i32, i32), f64> = HashMap::from([((0, 0), 0.0)]);
            encode_props(self.id(), self.kind(), &props)
        }

        fn update(&mut self, update: &ShapeUpdate) {
            self.0.update(update);
        }

        fn restore(&mut self, snapshot: &SerializedShape) -> Result<(), ShapeError> {
            self.0.restore(snapshot)
        }

        fn on_resize(&mut self, bounds: &Bounds, info: &ResizeInfo) -> Result<(), ShapeError> {
            self.0.on_resize(bounds, info)
        }

        fn hit_test_point(&self, point: Point) -> bool {
            self.0.hit_test_point(point)
        }

        fn hit_test_bounds(&self, bounds: &Bounds) -> bool {
            self.0.hit_test_bounds(bounds)
        }
    }

    #[test]
    fn test_encode_failure_is_reported() {
        let mut app = app();
        let a = app.add_shape(Box::new(Unencodable(RectShape::new(Point::ZERO, 10.0, 10.0))));
        assert!(matches!(
            app.persist(),
            Err(StateError::Shape(ShapeError::Encode { .. }))
        ));
        assert!(app.save().is_err());

        app.on_pointer_down(PointerEvent::shape(a, Point::new(5.0, 5.0))).unwrap();
        let err = app
            .on_pointer_move(PointerEvent::shape(a, Point::new(20.0, 5.0)))
            .unwrap_err();
        assert!(matches!(err, StateError::Shape(ShapeError::Encode { .. })));
        assert!(!app.history().is_paused());
        assert_eq!(app.shape(a).unwrap().point(), Point::ZERO);
    }
}
