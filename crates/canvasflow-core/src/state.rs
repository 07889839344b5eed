//! Hierarchical state machine.
//!
//! States live in a flat registry owned by [`StateTree`] and refer to each
//! other by [`StateId`]. Behavior is a table of plain function pointers per
//! state, so the tree itself holds no borrows of the context it drives: the
//! free functions [`transition`], [`dispatch`] and [`fire_shortcuts`] take the
//! whole context mutably and hand it to each handler in turn.
//!
//! Entering a state with children immediately transitions it to its initial
//! child (the declared `initial`, or the first child), so after any call
//! returns the active configuration runs from the root down to a leaf.

use crate::error::{StateError, StateResult};
use crate::events::{Event, KeyEvent, PinchEvent, PointerEvent, TransitionData, WheelEvent};
use crate::shortcuts::{Chord, Platform, ShortcutAction, ShortcutRegistry};
use std::fmt;

/// Handle to a state in a [`StateTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

/// Passed to a state's `on_enter`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterInfo {
    /// Sibling that was active before, `None` on first entry.
    pub from_id: Option<String>,
    pub data: TransitionData,
}

/// Passed to a state's `on_exit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitInfo {
    pub to_id: String,
    pub data: TransitionData,
}

/// Passed to a parent's `on_transition` between a child's exit and the next child's enter.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionInfo {
    pub from_id: String,
    pub to_id: String,
    pub data: TransitionData,
}

pub type EnterHandler<C> = fn(&mut C, StateId, &EnterInfo) -> StateResult;
pub type ExitHandler<C> = fn(&mut C, StateId, &ExitInfo) -> StateResult;
pub type TransitionHandler<C> = fn(&mut C, StateId, &TransitionInfo) -> StateResult;
pub type PointerHandler<C> = fn(&mut C, StateId, &PointerEvent) -> StateResult;
pub type WheelHandler<C> = fn(&mut C, StateId, &WheelEvent) -> StateResult;
pub type KeyHandler<C> = fn(&mut C, StateId, &KeyEvent) -> StateResult;
pub type PinchHandler<C> = fn(&mut C, StateId, &PinchEvent) -> StateResult;

fn ignore<C, T>(_: &mut C, _: StateId, _: &T) -> StateResult {
    Ok(())
}

/// Callback table of one state. Every slot defaults to a no-op.
pub struct Handlers<C> {
    pub on_enter: EnterHandler<C>,
    pub on_exit: ExitHandler<C>,
    pub on_transition: TransitionHandler<C>,
    pub on_wheel: WheelHandler<C>,
    pub on_pointer_down: PointerHandler<C>,
    pub on_pointer_up: PointerHandler<C>,
    pub on_pointer_move: PointerHandler<C>,
    pub on_pointer_enter: PointerHandler<C>,
    pub on_pointer_leave: PointerHandler<C>,
    pub on_key_down: KeyHandler<C>,
    pub on_key_up: KeyHandler<C>,
    pub on_pinch_start: PinchHandler<C>,
    pub on_pinch: PinchHandler<C>,
    pub on_pinch_end: PinchHandler<C>,
}

impl<C> Default for Handlers<C> {
    fn default() -> Self {
        Self {
            on_enter: ignore,
            on_exit: ignore,
            on_transition: ignore,
            on_wheel: ignore,
            on_pointer_down: ignore,
            on_pointer_up: ignore,
            on_pointer_move: ignore,
            on_pointer_enter: ignore,
            on_pointer_leave: ignore,
            on_key_down: ignore,
            on_key_up: ignore,
            on_pinch_start: ignore,
            on_pinch: ignore,
            on_pinch_end: ignore,
        }
    }
}

impl<C> Clone for Handlers<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Handlers<C> {}

/// Declarative description of a state and its subtree, consumed by registration.
pub struct StateDef<C> {
    id: String,
    initial: Option<String>,
    handlers: Handlers<C>,
    shortcuts: Vec<(String, ShortcutAction<C>)>,
    children: Vec<StateDef<C>>,
}

impl<C> StateDef<C> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: None,
            handlers: Handlers::default(),
            shortcuts: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Child entered by default. Without it the first child is used.
    pub fn initial(mut self, id: impl Into<String>) -> Self {
        self.initial = Some(id.into());
        self
    }

    pub fn handlers(mut self, handlers: Handlers<C>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Add a shortcut that fires only while this state is active.
    pub fn shortcut(mut self, chord: impl Into<String>, action: ShortcutAction<C>) -> Self {
        self.shortcuts.push((chord.into(), action));
        self
    }

    pub fn child(mut self, child: StateDef<C>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = StateDef<C>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check ids, initial children and chords of this subtree without registering it.
    fn validate(&self) -> StateResult {
        for (chord, _) in &self.shortcuts {
            Chord::parse(chord)?;
        }
        for (i, child) in self.children.iter().enumerate() {
            if self.children[..i].iter().any(|c| c.id == child.id) {
                return Err(StateError::DuplicateState {
                    parent: self.id.clone(),
                    id: child.id.clone(),
                });
            }
            child.validate()?;
        }
        if let Some(initial) = &self.initial {
            if self.children.is_empty() {
                return Err(StateError::NoChildren(self.id.clone(), initial.clone()));
            }
            if !self.children.iter().any(|c| &c.id == initial) {
                return Err(StateError::UnknownState {
                    parent: self.id.clone(),
                    to: initial.clone(),
                });
            }
        }
        Ok(())
    }
}

struct StateNode<C> {
    id: String,
    parent: Option<StateId>,
    root: StateId,
    children: Vec<StateId>,
    active_child: Option<StateId>,
    is_active: bool,
    initial: Option<StateId>,
    handlers: Handlers<C>,
}

/// Flat registry of states plus the shortcuts they own.
pub struct StateTree<C> {
    nodes: Vec<Option<StateNode<C>>>,
    shortcuts: ShortcutRegistry<C>,
}

impl<C> fmt::Debug for StateTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active: Vec<&str> = self
            .active_path()
            .into_iter()
            .filter_map(|id| self.name(id))
            .collect();
        f.debug_struct("StateTree")
            .field("states", &self.nodes.iter().flatten().count())
            .field("active", &active.join("."))
            .field("shortcuts", &self.shortcuts)
            .finish()
    }
}

impl<C> StateTree<C> {
    /// Build a tree from a root definition. The root is not entered until [`start`].
    pub fn new(root: StateDef<C>) -> StateResult<Self> {
        root.validate()?;
        let mut tree = Self {
            nodes: Vec::new(),
            shortcuts: ShortcutRegistry::new(),
        };
        tree.insert(None, StateId(0), root)?;
        Ok(tree)
    }

    pub fn root(&self) -> StateId {
        StateId(0)
    }

    fn node(&self, id: StateId) -> StateResult<&StateNode<C>> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(StateError::StaleState)
    }

    fn node_mut(&mut self, id: StateId) -> StateResult<&mut StateNode<C>> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(StateError::StaleState)
    }

    fn insert(&mut self, parent: Option<StateId>, root: StateId, def: StateDef<C>) -> StateResult<StateId> {
        let id = StateId(self.nodes.len());
        // Root of the tree is its own root.
        let root = if parent.is_none() { id } else { root };
        self.nodes.push(Some(StateNode {
            id: def.id,
            parent,
            root,
            children: Vec::new(),
            active_child: None,
            is_active: false,
            initial: None,
            handlers: def.handlers,
        }));

        for (chord, action) in def.shortcuts {
            self.shortcuts.register(id, &chord, action)?;
        }

        let mut initial = None;
        for child in def.children {
            let is_initial = def.initial.as_deref() == Some(child.id.as_str());
            let child_id = self.insert(Some(id), root, child)?;
            if is_initial {
                initial = Some(child_id);
            }
            self.node_mut(id)?.children.push(child_id);
        }
        self.node_mut(id)?.initial = initial;
        Ok(id)
    }

    /// Register new children under `parent`, recursively.
    ///
    /// The whole batch is validated before anything is inserted: duplicate
    /// sibling ids, an `initial` that names no child and malformed chords are
    /// rejected.
    pub fn register_states(
        &mut self,
        parent: StateId,
        defs: impl IntoIterator<Item = StateDef<C>>,
    ) -> StateResult<Vec<StateId>> {
        let defs: Vec<_> = defs.into_iter().collect();
        let node = self.node(parent)?;
        let parent_name = node.id.clone();
        let root = node.root;

        for (i, def) in defs.iter().enumerate() {
            let exists = self.child(parent, &def.id).is_some()
                || defs[..i].iter().any(|d| d.id == def.id);
            if exists {
                return Err(StateError::DuplicateState {
                    parent: parent_name,
                    id: def.id.clone(),
                });
            }
            def.validate()?;
        }

        let mut ids = Vec::with_capacity(defs.len());
        for def in defs {
            log::debug!("Registering state {} under {}", def.id, parent_name);
            let id = self.insert(Some(parent), root, def)?;
            self.node_mut(parent)?.children.push(id);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Remove inactive children of `parent` together with their subtrees and shortcuts.
    pub fn deregister_states(&mut self, parent: StateId, ids: &[&str]) -> StateResult {
        let parent_name = self.node(parent)?.id.clone();
        let mut targets = Vec::with_capacity(ids.len());
        for &id in ids {
            let child = self.child(parent, id).ok_or_else(|| StateError::UnknownState {
                parent: parent_name.clone(),
                to: id.to_string(),
            })?;
            if self.is_active(child) {
                return Err(StateError::ActiveState(id.to_string()));
            }
            targets.push(child);
        }

        for target in targets {
            log::debug!("Deregistering state {:?} from {}", self.name(target), parent_name);
            let mut doomed = self.descendants(target);
            doomed.push(target);
            for id in doomed {
                self.shortcuts.remove_owner(id);
                self.nodes[id.0] = None;
            }
            let node = self.node_mut(parent)?;
            node.children.retain(|c| *c != target);
            if node.initial == Some(target) {
                node.initial = None;
            }
        }
        Ok(())
    }

    /// Name of a state, `None` if the handle is stale.
    pub fn name(&self, id: StateId) -> Option<&str> {
        self.node(id).ok().map(|n| n.id.as_str())
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    /// Root of the tree the state belongs to.
    pub fn root_of(&self, id: StateId) -> Option<StateId> {
        self.node(id).ok().map(|n| n.root)
    }

    pub fn children(&self, id: StateId) -> &[StateId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Child of `parent` with the given name.
    pub fn child(&self, parent: StateId, name: &str) -> Option<StateId> {
        let node = self.node(parent).ok()?;
        node.children
            .iter()
            .copied()
            .find(|c| self.name(*c) == Some(name))
    }

    /// Resolve a dot-separated path of names below the root, e.g. `"select.idle"`.
    pub fn find(&self, path: &str) -> Option<StateId> {
        path.split('.')
            .try_fold(self.root(), |node, name| self.child(node, name))
    }

    pub fn is_active(&self, id: StateId) -> bool {
        self.node(id).map(|n| n.is_active).unwrap_or(false)
    }

    pub fn active_child(&self, id: StateId) -> Option<StateId> {
        self.node(id).ok().and_then(|n| n.active_child)
    }

    /// Name of the active child of a state.
    pub fn current_state(&self, id: StateId) -> Option<&str> {
        self.active_child(id).and_then(|c| self.name(c))
    }

    /// Active states from the root down to the deepest active leaf.
    pub fn active_path(&self) -> Vec<StateId> {
        let mut path = Vec::new();
        let mut next = Some(self.root()).filter(|r| self.is_active(*r));
        while let Some(id) = next {
            path.push(id);
            next = self.active_child(id);
        }
        path
    }

    /// All states below `id`, depth-first.
    pub fn descendants(&self, id: StateId) -> Vec<StateId> {
        let mut out = Vec::new();
        for &child in self.children(id) {
            out.push(child);
            out.extend(self.descendants(child));
        }
        out
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry<C> {
        &self.shortcuts
    }

    fn handlers(&self, id: StateId) -> StateResult<Handlers<C>> {
        Ok(self.node(id)?.handlers)
    }
}

/// A context the state machine can drive.
pub trait StateContext: Sized {
    fn states(&self) -> &StateTree<Self>;
    fn states_mut(&mut self) -> &mut StateTree<Self>;
    /// Pointer move dispatched before a modifier key event.
    fn modifier_pointer_event(&self, key: &KeyEvent) -> PointerEvent;
    /// Platform used to resolve `mod` in shortcut chords.
    fn platform(&self) -> Platform;
}

/// Enter the root state, and with it the initial configuration.
pub fn start<C: StateContext>(ctx: &mut C) -> StateResult {
    let root = ctx.states().root();
    enter(
        ctx,
        root,
        &EnterInfo {
            from_id: None,
            data: TransitionData::None,
        },
    )
}

/// Make `to` the active child of `node`.
///
/// Fails without side effects if `node` has no children or no child named `to`.
pub fn transition<C: StateContext>(
    ctx: &mut C,
    node: StateId,
    to: &str,
    data: TransitionData,
) -> StateResult {
    let tree = ctx.states();
    let parent = tree.node(node)?;
    if parent.children.is_empty() {
        return Err(StateError::NoChildren(parent.id.clone(), to.to_string()));
    }
    let next = tree.child(node, to).ok_or_else(|| StateError::UnknownState {
        parent: parent.id.clone(),
        to: to.to_string(),
    })?;
    transition_to(ctx, node, next, data)
}

fn transition_to<C: StateContext>(
    ctx: &mut C,
    node: StateId,
    next: StateId,
    data: TransitionData,
) -> StateResult {
    let to_id = ctx.states().node(next)?.id.clone();
    let prev = ctx.states().active_child(node);

    let Some(prev) = prev else {
        ctx.states_mut().node_mut(node)?.active_child = Some(next);
        return enter(ctx, next, &EnterInfo { from_id: None, data });
    };

    let from_id = ctx.states().node(prev)?.id.clone();
    log::debug!(
        "{}: {} -> {}",
        ctx.states().node(node)?.id,
        from_id,
        to_id
    );

    exit(
        ctx,
        prev,
        &ExitInfo {
            to_id: to_id.clone(),
            data,
        },
    )?;
    ctx.states_mut().node_mut(node)?.active_child = Some(next);

    let on_transition = ctx.states().handlers(node)?.on_transition;
    on_transition(
        ctx,
        node,
        &TransitionInfo {
            from_id: from_id.clone(),
            to_id,
            data,
        },
    )?;

    enter(
        ctx,
        next,
        &EnterInfo {
            from_id: Some(from_id),
            data,
        },
    )
}

fn enter<C: StateContext>(ctx: &mut C, node: StateId, info: &EnterInfo) -> StateResult {
    let state = ctx.states_mut().node_mut(node)?;
    state.is_active = true;
    let initial = state.initial.or_else(|| state.children.first().copied());

    if let Some(initial) = initial {
        transition_to(ctx, node, initial, info.data)?;
    }

    let on_enter = ctx.states().handlers(node)?.on_enter;
    on_enter(ctx, node, info)
}

fn exit<C: StateContext>(ctx: &mut C, node: StateId, info: &ExitInfo) -> StateResult {
    ctx.states_mut().node_mut(node)?.is_active = false;

    if let Some(child) = ctx.states().active_child(node) {
        exit(ctx, child, info)?;
        ctx.states_mut().node_mut(node)?.active_child = None;
    }

    let on_exit = ctx.states().handlers(node)?.on_exit;
    on_exit(ctx, node, info)
}

/// Route an event down the active path, root first.
///
/// Each state's own handler runs before the event is forwarded to whichever
/// child is active once that handler returns. Modifier key events are
/// preceded by a synthesized pointer move.
pub fn dispatch<C: StateContext>(ctx: &mut C, event: &Event) -> StateResult {
    let root = ctx.states().root();
    if let Event::KeyDown(key) | Event::KeyUp(key) = event {
        if key.is_modifier() {
            let moved = Event::PointerMove(ctx.modifier_pointer_event(key));
            route(ctx, root, &moved)?;
        }
    }
    route(ctx, root, event)
}

fn route<C: StateContext>(ctx: &mut C, node: StateId, event: &Event) -> StateResult {
    if !ctx.states().is_active(node) {
        return Ok(());
    }
    log::trace!("{} -> {:?}", event.name(), ctx.states().name(node));

    let h = ctx.states().handlers(node)?;
    match event {
        Event::Wheel(e) => (h.on_wheel)(ctx, node, e)?,
        Event::PointerDown(e) => (h.on_pointer_down)(ctx, node, e)?,
        Event::PointerUp(e) => (h.on_pointer_up)(ctx, node, e)?,
        Event::PointerMove(e) => (h.on_pointer_move)(ctx, node, e)?,
        Event::PointerEnter(e) => (h.on_pointer_enter)(ctx, node, e)?,
        Event::PointerLeave(e) => (h.on_pointer_leave)(ctx, node, e)?,
        Event::KeyDown(e) => (h.on_key_down)(ctx, node, e)?,
        Event::KeyUp(e) => (h.on_key_up)(ctx, node, e)?,
        Event::PinchStart(e) => (h.on_pinch_start)(ctx, node, e)?,
        Event::Pinch(e) => (h.on_pinch)(ctx, node, e)?,
        Event::PinchEnd(e) => (h.on_pinch_end)(ctx, node, e)?,
    }

    match ctx.states().active_child(node) {
        Some(child) => route(ctx, child, event),
        None => Ok(()),
    }
}

/// Run every shortcut matching a key-down whose owner is active, in registration order.
pub fn fire_shortcuts<C: StateContext>(ctx: &mut C, key: &KeyEvent) -> StateResult {
    let matches = ctx.states().shortcuts.matching(key, ctx.platform());
    for (owner, action) in matches {
        // An earlier action may have transitioned the owner away.
        if ctx.states().is_active(owner) {
            log::debug!("Shortcut {} on {:?}", key.key, ctx.states().name(owner));
            action(ctx, owner)?;
        }
    }
    Ok(())
}
