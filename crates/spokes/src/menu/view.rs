use super::MenuTheme;
use super::model::Menu;
use crate::geometry::{self, Vec2};
use crate::item::{ItemPath, NodeId, NodeLayout};
use serde::Serialize;
use strum::{AsRefStr, Display as StrumDisplay};

/// Role of a visible item relative to the selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RenderClass {
    /// The item in the center of the menu.
    Active,
    /// Any chain member before the active item.
    Parent,
    Child,
    Grandchild,
}

/// Line from a chain item towards its successor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Connector {
    /// Not normalized; consecutive values never differ by more than 180°.
    pub angle: f64,
    pub length: f64,
}

impl Connector {
    /// Rotation for a line which is drawn pointing right by default.
    pub fn rotation(&self) -> f64 {
        self.angle - 90.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFrame<'a> {
    pub id: NodeId,
    pub path: &'a ItemPath,
    pub name: &'a str,
    pub class: RenderClass,
    /// Offset from the parent. `None` leaves placement to the theme.
    pub position: Option<Vec2>,
    pub hovered: bool,
    pub clicked: bool,
    pub dragged: bool,
    pub connector: Option<Connector>,
    /// Angle between the pointer direction and the item's direction, in [0, 180].
    pub pointer_delta: Option<f64>,
}

/// Everything a renderer needs to draw the menu in its current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame<'a> {
    pub center: Vec2,
    pub anchor: Vec2,
    pub pointer_angle: f64,
    pub pointer_distance: f64,
    pub hovered_angle: Option<f64>,
    pub parent_hovered: bool,
    pub selected: bool,
    pub label: Option<&'a str>,
    pub items: Vec<ItemFrame<'a>>,
}

impl<'a> Frame<'a> {
    /// Returns `None` while the menu is hidden.
    pub fn capture<T: MenuTheme>(menu: &'a Menu<T>) -> Option<Self> {
        let tree = menu.tree()?;
        let chain = menu.chain();
        let center = *chain.last()?;
        let parent = (chain.len() > 1).then(|| chain[chain.len() - 2]);
        let parent_hovered = parent.is_some() && menu.hovered() == parent;

        let hovered_angle = if parent_hovered {
            tree.node(center)
                .angle()
                .map(|angle| geometry::normalize_angle(angle + 180.0))
        } else {
            menu.hovered().and_then(|id| tree.node(id).angle())
        };

        let pointer_angle = menu.input().angle();
        let mut items: Vec<_> = tree
            .ids()
            .filter_map(|id| {
                let class = menu.render_class(id)?;
                let node = tree.node(id);
                Some(ItemFrame {
                    id,
                    path: &node.path,
                    name: &node.name,
                    class,
                    position: menu.position(id),
                    hovered: menu.hovered() == Some(id),
                    clicked: menu.clicked() == Some(id),
                    dragged: menu.dragged() == Some(id),
                    connector: menu.connector(id),
                    pointer_delta: node.angle().map(|angle| {
                        let diff = geometry::normalize_angle(angle - pointer_angle);
                        diff.min(geometry::FULL_CIRCLE - diff)
                    }),
                })
            })
            .collect();

        if menu.theme().draw_children_below() {
            items.reverse();
        }

        Some(Self {
            center: menu.center_position(),
            anchor: menu.anchor(),
            pointer_angle,
            pointer_distance: menu.input().distance(),
            hovered_angle,
            parent_hovered,
            selected: menu.is_selected(),
            label: menu.center_label(),
            items,
        })
    }

    pub fn item(&self, id: NodeId) -> Option<&ItemFrame<'a>> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl<T: MenuTheme> Menu<T> {
    pub fn frame(&self) -> Option<Frame<'_>> {
        Frame::capture(self)
    }

    /// Static layouts of all items, in the stacking order of the theme.
    pub fn node_layouts(&self) -> Vec<NodeLayout> {
        self.tree()
            .map(|tree| tree.node_layouts(self.theme().draw_children_below()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{InputEvent, Modifiers};
    use crate::item::{MenuItem, MenuTree};
    use crate::menu::{Settings, ShowOptions, StaticTheme};
    use std::time::Duration;

    fn menu(theme: StaticTheme) -> Menu {
        let root = MenuItem::root(
            "Root",
            vec![
                MenuItem::submenu("Edit", vec![MenuItem::leaf("Cut"), MenuItem::leaf("Copy")]),
                MenuItem::leaf("Quit"),
            ],
        );
        let options = ShowOptions {
            window_size: Vec2::new(800.0, 800.0),
            mouse_position: Vec2::new(400.0, 400.0),
            ..Default::default()
        };

        let mut menu = Menu::new(theme, Settings::default());
        menu.show(root, options).unwrap();
        menu
    }

    #[test]
    fn test_hidden_menu_has_no_frame() {
        let menu = Menu::new(StaticTheme::default(), Settings::default());
        assert!(Frame::capture(&menu).is_none());
        assert!(menu.node_layouts().is_empty());
    }

    #[test]
    fn test_frame_lists_visible_items() {
        let mut menu = menu(StaticTheme::default());
        menu.handle(InputEvent::PointerMotion {
            position: Vec2::new(400.0, 300.0),
            modifiers: Modifiers::NONE,
            timestamp: Duration::ZERO,
        });

        let frame = Frame::capture(&menu).unwrap();
        assert_eq!(frame.center, Vec2::new(400.0, 400.0));
        assert_eq!(frame.label, Some("Edit"));
        assert_eq!(frame.hovered_angle, Some(0.0));
        assert!(!frame.parent_hovered);
        assert_eq!(frame.items.len(), 5);

        let root = frame.item(MenuTree::ROOT).unwrap();
        assert_eq!(root.class, RenderClass::Active);
        assert_eq!(root.path.as_str(), "/");

        let edit = frame.items.iter().find(|item| item.name == "Edit").unwrap();
        assert!(edit.hovered);
        assert_eq!(edit.class, RenderClass::Child);
        assert_eq!(edit.position, None);
        assert_eq!(edit.pointer_delta, Some(0.0));

        let quit = frame.items.iter().find(|item| item.name == "Quit").unwrap();
        assert_eq!(quit.pointer_delta, Some(180.0));
    }

    #[test]
    fn test_parent_hovered_points_back() {
        let mut menu = menu(StaticTheme::default());
        menu.handle(InputEvent::KeyDown {
            key: crate::events::Key::Character('1'),
            modifiers: Modifiers::NONE,
        });

        let frame = menu.frame().unwrap();
        assert!(frame.parent_hovered);
        assert_eq!(frame.hovered_angle, Some(180.0));
        assert_eq!(frame.label, None);
        assert_eq!(frame.item(MenuTree::ROOT).unwrap().class, RenderClass::Parent);
    }

    #[test]
    fn test_children_below_reverses_order() {
        let theme = StaticTheme {
            draw_children_below: true,
            ..Default::default()
        };
        let menu = menu(theme);

        let frame = Frame::capture(&menu).unwrap();
        assert_eq!(frame.items.last().map(|item| item.id), Some(MenuTree::ROOT));

        let layouts = menu.node_layouts();
        assert_eq!(layouts.last().map(|layout| layout.id), Some(MenuTree::ROOT));
        assert_eq!(layouts.first().map(|layout| layout.level), Some(2));
    }

    #[test]
    fn test_class_names() {
        assert_eq!(RenderClass::Grandchild.to_string(), "grandchild");
        assert_eq!(RenderClass::Active.as_ref(), "active");
        assert_eq!(Connector { angle: 90.0, length: 1.0 }.rotation(), 0.0);
    }

    #[test]
    fn test_frame_serializes_for_renderers() {
        let menu = menu(StaticTheme::default());
        let json = serde_json::to_value(menu.frame()).unwrap();

        assert_eq!(json["center"]["x"], 400.0);
        assert_eq!(json["items"][0]["path"], "/");
        assert_eq!(json["items"][0]["class"], "active");
        assert_eq!(json["items"][0]["position"], serde_json::Value::Null);

        let hidden = Menu::new(StaticTheme::default(), Settings::default());
        assert_eq!(serde_json::to_string(&hidden.frame()).unwrap(), "null");
    }
}
