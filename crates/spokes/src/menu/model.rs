use crate::events::{InputEvent, Key, MenuEvent, Modifiers, Offset, PointerButton};
use crate::gamepad::GamepadInput;
use crate::geometry::{self, Vec2};
use crate::gesture::GestureDetector;
use crate::input::{InputState, InputTracker};
use crate::item::{ItemPath, MenuItem, MenuTree, NodeId, TreeError};
use crate::menu::view::{Connector, RenderClass};
use crate::menu::{MenuTheme, Settings, ShowOptions, StaticTheme};
use std::collections::HashMap;
use std::time::Duration;

/// The selection state machine of one pie menu.
///
/// The menu owns a tree of items, one of which is the active item shown in the
/// center. The selection chain connects the root with the active item. Children of the
/// active item are arranged around it; the pointer direction decides which of them is
/// hovered. Selecting a child pushes it onto the chain, selecting the parent pops the
/// active item again. Once a leaf is selected, [`MenuEvent::Select`] is emitted.
///
/// All methods which process input return the notifications they caused.
pub struct Menu<T: MenuTheme = StaticTheme> {
    theme: T,
    settings: Settings,
    options: ShowOptions,
    tree: Option<MenuTree>,
    chain: Vec<NodeId>,
    /// Absolute position of the root item.
    anchor: Vec2,
    /// Offsets from the parent, only for chain members and the dragged child.
    positions: HashMap<NodeId, Vec2>,
    connectors: HashMap<NodeId, Connector>,
    classes: HashMap<NodeId, RenderClass>,
    hovered: Option<NodeId>,
    clicked: Option<NodeId>,
    dragged: Option<NodeId>,
    selected: bool,
    input: InputTracker,
    gestures: GestureDetector,
    gamepad: GamepadInput,
    events: Vec<MenuEvent>,
}

impl<T: MenuTheme> Menu<T> {
    pub fn new(theme: T, settings: Settings) -> Self {
        Self {
            theme,
            settings,
            options: ShowOptions::default(),
            tree: None,
            chain: Vec::new(),
            anchor: Vec2::ZERO,
            positions: HashMap::new(),
            connectors: HashMap::new(),
            classes: HashMap::new(),
            hovered: None,
            clicked: None,
            dragged: None,
            selected: false,
            input: InputTracker::new(settings.drag_threshold),
            gestures: GestureDetector::new(settings.gestures),
            gamepad: GamepadInput::new(settings.gamepad_deadzone, settings.parent_distance),
            events: Vec::new(),
        }
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.input.set_drag_threshold(settings.drag_threshold);
        self.gestures.set_settings(settings.gestures);
        self.gamepad.configure(settings.gamepad_deadzone, settings.parent_distance);
    }

    pub fn set_theme(&mut self, theme: T) {
        self.theme = theme;
    }

    pub fn theme(&self) -> &T {
        &self.theme
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &ShowOptions {
        &self.options
    }

    pub fn is_visible(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&MenuTree> {
        self.tree.as_ref()
    }

    pub fn chain(&self) -> &[NodeId] {
        &self.chain
    }

    pub fn active_item(&self) -> Option<NodeId> {
        self.chain.last().copied()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn clicked(&self) -> Option<NodeId> {
        self.clicked
    }

    pub fn dragged(&self) -> Option<NodeId> {
        self.dragged
    }

    /// Whether a leaf has been selected in this show cycle.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    pub fn connector(&self, id: NodeId) -> Option<Connector> {
        self.connectors.get(&id).copied()
    }

    pub fn render_class(&self, id: NodeId) -> Option<RenderClass> {
        self.classes.get(&id).copied()
    }

    /// Absolute position of the active item.
    pub fn center_position(&self) -> Vec2 {
        if self.chain.is_empty() {
            return Vec2::ZERO;
        }

        self.chain[1..]
            .iter()
            .fold(self.anchor, |position, id| {
                position + self.positions.get(id).copied().unwrap_or_default()
            })
    }

    /// Name of the hovered child, for a label in the menu center.
    pub fn center_label(&self) -> Option<&str> {
        let tree = self.tree.as_ref()?;
        let hovered = self.hovered?;
        if hovered == MenuTree::ROOT || self.is_parent_of_center(hovered) {
            return None;
        }
        Some(&tree.node(hovered).name)
    }

    /// Builds the item tree and opens the menu at its initial position.
    pub fn show(
        &mut self,
        root: MenuItem,
        options: ShowOptions,
    ) -> Result<Vec<MenuEvent>, TreeError> {
        self.clear();

        let tree = MenuTree::build(root)?;
        log::debug!("Showing menu '{}' with {} items", tree.root().name, tree.len());

        self.options = options;
        self.tree = Some(tree);

        self.input.defer_turbo_mode(options.centered_mode);
        self.input.update(options.initial_position(), options.initial_position());
        self.input
            .ignore_next_motion_events(self.settings.ignored_motion_events);

        self.select_item(MenuTree::ROOT);
        Ok(self.take_events())
    }

    pub fn hide(&mut self) {
        self.clear();
    }

    /// Forgets the tree and every piece of transient state.
    pub fn clear(&mut self) {
        self.gestures.reset();
        self.input.reset();
        self.gamepad.reset();

        self.tree = None;
        self.chain.clear();
        self.anchor = Vec2::ZERO;
        self.positions.clear();
        self.connectors.clear();
        self.classes.clear();
        self.hovered = None;
        self.clicked = None;
        self.dragged = None;
        self.selected = false;
        self.events.clear();
    }

    /// Processes one input event. Events arriving while the menu is hidden are
    /// dropped.
    pub fn handle(&mut self, event: InputEvent) -> Vec<MenuEvent> {
        if self.tree.is_some() {
            self.dispatch(event);
        }
        self.take_events()
    }

    fn take_events(&mut self) -> Vec<MenuEvent> {
        std::mem::take(&mut self.events)
    }

    fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMotion {
                position,
                modifiers,
                timestamp,
            } => self.on_motion(position, modifiers, timestamp),
            InputEvent::PointerDown { position, button } => self.on_pointer_down(position, button),
            InputEvent::PointerUp { position, button } => self.on_pointer_up(position, button),
            InputEvent::KeyDown { key, modifiers } => self.on_key_down(&key, modifiers),
            InputEvent::KeyUp { key, modifiers } => self.on_key_up(&key, modifiers),
            InputEvent::Gamepad { state, timestamp } => {
                // An early event of the sample may move the active item.
                for event in self.gamepad.poll(state, timestamp) {
                    self.dispatch(event.translated(self.center_position()));
                }
            }
            InputEvent::Tick { timestamp } => self.on_tick(timestamp),
        }
    }

    fn on_motion(&mut self, position: Vec2, modifiers: Modifiers, timestamp: Duration) {
        let center = self.center_position();
        let Some(sample) = self.input.on_motion(position, center, modifiers.any()) else {
            return;
        };

        if sample.dragged
            && let Some(coords) = self.gestures.on_motion(sample.position, timestamp)
        {
            self.on_gesture_selection(coords);
        }

        self.redraw();
    }

    fn on_pointer_down(&mut self, position: Vec2, button: PointerButton) {
        if button == PointerButton::Secondary {
            self.cancel();
            return;
        }

        let center = self.center_position();
        self.input.on_pointer_down(position, center);
        self.gestures.reset();
        self.redraw();
    }

    fn on_pointer_up(&mut self, position: Vec2, button: PointerButton) {
        if button == PointerButton::Secondary {
            return;
        }

        let center = self.center_position();
        self.input.update(position, center);

        // Clicking the center of the root menu closes it.
        if self.input.state() == InputState::Clicked
            && self.chain.len() == 1
            && self.input.distance() < self.settings.center_radius
        {
            self.cancel();
            return;
        }

        self.input.on_pointer_up();
        self.gestures.reset();

        if let Some(item) = self.dragged.or(self.clicked) {
            self.select_item(item);
        }
    }

    fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) {
        if *key == Key::Escape {
            self.cancel();
            return;
        }

        match key.shortcut_index().filter(|_| !modifiers.any()) {
            Some(0) => match self.parent_of_center() {
                Some(parent) => self.select_item(parent),
                None => self.cancel(),
            },
            Some(index) => {
                let child = self
                    .center_children()
                    .and_then(|children| children.get(index - 1).copied());
                if let Some(child) = child {
                    self.select_item(child);
                }
            }
            None => self.input.on_key_down(),
        }
    }

    /// Releasing the last modifier finishes a turbo-mode drag.
    fn on_key_up(&mut self, key: &Key, modifiers: Modifiers) {
        if *key == Key::Escape {
            return;
        }

        let was_turbo_mode = self.input.turbo_mode();
        self.input.on_key_up(modifiers.any());

        if was_turbo_mode && !modifiers.any() {
            self.gestures.reset();
            if let Some(item) = self.dragged {
                self.select_item(item);
            }
        }
    }

    fn on_tick(&mut self, timestamp: Duration) {
        if self.input.state() != InputState::Dragging {
            return;
        }
        if let Some(coords) = self.gestures.on_tick(timestamp) {
            self.on_gesture_selection(coords);
        }
    }

    /// Marking mode only ever opens submenus, so that actions cannot be triggered by
    /// accident.
    fn on_gesture_selection(&mut self, coords: Vec2) {
        if self.options.anchored_mode {
            return;
        }
        let Some(item) = self.dragged else { return };
        if !self.has_children(item) {
            return;
        }

        log::debug!("Marking-mode selection at ({}, {})", coords.x, coords.y);
        let center = self.center_position();
        self.input.update(coords, center);
        self.select_item(item);
    }

    fn cancel(&mut self) {
        log::debug!("Menu canceled");
        self.events.push(MenuEvent::Cancel);
    }

    /// Makes `item` the active item. `item` has to be the root, the parent of the
    /// active item or one of its children.
    fn select_item(&mut self, item: NodeId) {
        self.click_item(None);
        self.hover_item(None);
        self.drag_item(None);

        if self.chain.last() == Some(&item) {
            return;
        }

        let (has_children, is_leaf, path, angle) = {
            let Some(tree) = &self.tree else { return };
            let node = tree.node(item);
            (
                node.has_children(),
                node.is_leaf(),
                node.path.clone(),
                node.angle(),
            )
        };
        let anchored = self.options.anchored_mode;

        // Move the root so that the newly selected item ends up at the pointer.
        if item == MenuTree::ROOT {
            self.anchor = if anchored {
                self.options.initial_position()
            } else {
                self.input.absolute_position()
            };
            if self.chain.len() > 1 {
                for id in self.chain.drain(1..) {
                    self.positions.remove(&id);
                }
            }
            if self.chain.is_empty() {
                self.chain.push(item);
            }
        } else if self.is_parent_of_center(item) {
            if let Some(center) = self.chain.pop() {
                let offset = self.positions.remove(&center).unwrap_or_default();
                self.anchor += if anchored {
                    offset
                } else {
                    self.input.relative_position() + offset
                };
            }
        } else {
            let angle = angle.expect("a selected child has a direction");
            let distance = if anchored {
                self.settings.parent_distance
            } else {
                self.settings.parent_distance.max(self.input.distance())
            };
            let position = Vec2::from_angle(angle, distance);

            if anchored {
                self.anchor -= position;
            } else {
                self.anchor += self.input.relative_position() - position;
            }
            self.positions.insert(item, position);
            self.chain.push(item);
        }

        // Keep the new submenu on screen and drag the pointer along.
        if has_children {
            let position = self.center_position();
            let clamped = geometry::clamp_to_monitor(
                position,
                self.theme.max_menu_radius(),
                self.options.logical_window_size(),
            );
            let offset = Offset::from(clamped - position);

            if !offset.is_zero() {
                self.events.push(MenuEvent::MovePointer(offset));
                self.anchor += Vec2::from(offset);
            }
        }

        let center = self.center_position();
        self.input.update(self.input.absolute_position(), center);

        self.update_classes();
        self.update_connectors();
        self.redraw();

        log::debug!("Selected {} (chain length {})", path, self.chain.len());

        if is_leaf {
            self.selected = true;
            self.events.push(MenuEvent::Select(path));
        }
    }

    fn hover_item(&mut self, item: Option<NodeId>) {
        if self.hovered == item {
            return;
        }

        if let Some(previous) = self.hovered.take()
            && let Some(path) = self.path_of(previous)
        {
            self.events.push(MenuEvent::Unhover(path));
        }

        if let Some(item) = item {
            self.hovered = Some(item);
            if let Some(path) = self.path_of(item) {
                self.events.push(MenuEvent::Hover(path));
            }
        }
    }

    fn click_item(&mut self, item: Option<NodeId>) {
        self.clicked = item;
    }

    fn drag_item(&mut self, item: Option<NodeId>) {
        self.click_item(None);
        self.dragged = item;
    }

    /// Syncs hover, click and drag targets with the current pointer snapshot.
    fn redraw(&mut self) {
        if self.tree.is_none() {
            return;
        }

        let hovered = self.compute_hovered_item();
        self.hover_item(hovered);

        if self.dragged.is_some() && self.dragged != self.hovered {
            self.drag_item(self.hovered);
        }

        let state = self.input.state();
        let in_center = self.input.distance() < self.settings.center_radius;

        if state == InputState::Clicked && self.clicked.is_none() {
            self.click_item(self.hovered);
            self.update_connectors();
        }

        if state == InputState::Dragging
            && self.dragged.is_none()
            && self.input.distance() > self.settings.center_radius
            && self.hovered.is_some()
        {
            self.drag_item(self.hovered);
        }

        // Dragging an item back into the center aborts the drag.
        if state == InputState::Dragging && self.dragged.is_some() && in_center {
            self.drag_item(None);
            self.update_connectors();
        }

        if state == InputState::Released && (self.dragged.is_some() || self.clicked.is_some()) {
            self.drag_item(None);
            self.update_connectors();
        }

        self.update_transform();

        if self.dragged.is_some() {
            self.update_connectors();
        }
    }

    /// The hovered item is a child of the active item, or its parent when the pointer
    /// is in the center or in the parent's wedge. At the root center, the root itself
    /// is hovered.
    fn compute_hovered_item(&self) -> Option<NodeId> {
        let tree = self.tree.as_ref()?;
        let center = *self.chain.last()?;
        let parent = self.parent_of_center();

        if self.input.distance() < self.settings.center_radius {
            return Some(parent.unwrap_or(MenuTree::ROOT));
        }

        let angle = self.input.angle();
        tree.node(center)
            .children
            .iter()
            .copied()
            .find(|&child| tree.layout(child).wedge.contains(angle))
            .or(parent)
    }

    /// Dragged children follow the pointer, all other children return to their
    /// themed place.
    fn update_transform(&mut self) {
        let Some(tree) = &self.tree else { return };
        let Some(&center) = self.chain.last() else {
            return;
        };
        let dragging = self.input.state() == InputState::Dragging;

        for &child in &tree.node(center).children {
            if dragging && self.dragged == Some(child) {
                self.positions.insert(child, self.input.relative_position());
            } else {
                self.positions.remove(&child);
            }
        }
    }

    fn update_classes(&mut self) {
        self.classes.clear();
        let Some(tree) = &self.tree else { return };
        let last = self.chain.len().saturating_sub(1);

        for (i, &item) in self.chain.iter().enumerate() {
            let node = tree.node(item);
            if i == last {
                self.classes.insert(item, RenderClass::Active);
                for &child in &node.children {
                    self.classes.insert(child, RenderClass::Child);
                    for &grandchild in &tree.node(child).children {
                        self.classes.insert(grandchild, RenderClass::Grandchild);
                    }
                }
            } else {
                self.classes.insert(item, RenderClass::Parent);
                for &child in &node.children {
                    self.classes.insert(child, RenderClass::Grandchild);
                }
            }
        }
    }

    /// Points the connector of every chain item at its successor. The active item
    /// points at its dragged or clicked child, if any.
    fn update_connectors(&mut self) {
        let Some(tree) = &self.tree else { return };
        let last = self.chain.len().saturating_sub(1);

        for (i, &item) in self.chain.iter().enumerate() {
            let node = tree.node(item);
            if !node.has_children() {
                continue;
            }

            let next = if i == last {
                self.dragged
                    .filter(|id| node.children.contains(id))
                    .or_else(|| self.clicked.filter(|id| node.children.contains(id)))
            } else {
                self.chain.get(i + 1).copied()
            };

            let previous = self.connectors.get(&item).map_or(0.0, |c| c.angle);
            let connector = match next {
                Some(next) => {
                    let (angle, length) = match self.positions.get(&next) {
                        Some(position) => (position.angle(), position.length()),
                        None => (tree.layout(next).angle, 0.0),
                    };
                    Connector {
                        angle: geometry::closest_equivalent_angle(previous, angle),
                        length,
                    }
                }
                None => Connector {
                    angle: previous,
                    length: 0.0,
                },
            };
            self.connectors.insert(item, connector);
        }
    }

    fn parent_of_center(&self) -> Option<NodeId> {
        let len = self.chain.len();
        (len > 1).then(|| self.chain[len - 2])
    }

    fn is_parent_of_center(&self, item: NodeId) -> bool {
        self.parent_of_center() == Some(item)
    }

    fn center_children(&self) -> Option<&[NodeId]> {
        let tree = self.tree.as_ref()?;
        let center = *self.chain.last()?;
        Some(&tree.node(center).children)
    }

    fn has_children(&self, item: NodeId) -> bool {
        self.tree
            .as_ref()
            .is_some_and(|tree| tree.node(item).has_children())
    }

    fn path_of(&self, item: NodeId) -> Option<ItemPath> {
        self.tree.as_ref().map(|tree| tree.node(item).path.clone())
    }
}
