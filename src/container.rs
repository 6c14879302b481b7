//! The binary split layout tree: the engine's owner of geometry, focus,
//! and event routing (§4.1).
//!
//! A tree is built once from a [`Spec`] (the nested
//! `split_horizontal`/`split_vertical`/`leaf` description) and then
//! driven by a [`crate::runloop`] for its whole lifetime: every draw
//! pass and every addressed [`ContainerTree::update`] takes the same
//! internal write lock, so the two never interleave (§5's "single
//! readers-writer lock at the root").

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{trace, warn};

use crate::buffer::Buffer;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{Result, TermGridError};
use crate::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent};
use crate::geometry::{Axis, Point, Rect, Size};
use crate::layout::{SplitPosition, split_rect};
use crate::style::CellOptions;
use crate::terminal::Terminal;
use crate::widget::{KeyboardScope, MouseScope, Widget, WidgetMeta, WidgetOptions};

/// The glyph drawn in place of a widget whose negotiated rectangle is
/// smaller than its declared minimum size.
pub const RESIZE_NEEDED_GLYPH: char = '⇄';

/// Where to place a widget's negotiated rectangle within the space
/// available to it, or a title within its border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Left edge / top edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Right edge / bottom edge.
    End,
}

/// Cell counts removed from each side of a rectangle, used for both
/// margin (outside the border) and padding (inside it).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sides {
    /// Top edge.
    pub top: u16,
    /// Bottom edge.
    pub bottom: u16,
    /// Left edge.
    pub left: u16,
    /// Right edge.
    pub right: u16,
}

impl Sides {
    /// The same cell count on all four sides.
    pub fn all(n: u16) -> Self {
        Self {
            top: n,
            bottom: n,
            left: n,
            right: n,
        }
    }

    /// Distinct counts per side.
    pub fn new(top: u16, bottom: u16, left: u16, right: u16) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

/// Border line style a container draws around its area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderStyle {
    /// No border drawn.
    #[default]
    None,
    /// Single line: `┌┐└┘─│`.
    Single,
    /// Double line: `╔╗╚╝═║`.
    Double,
    /// Rounded corners: `╭╮╰╯─│`.
    Rounded,
    /// Heavy/thick line: `┏┓┗┛━┃`.
    Heavy,
}

impl BorderStyle {
    fn chars(self) -> Option<(char, char, char, char, char, char)> {
        match self {
            BorderStyle::None => None,
            BorderStyle::Single => Some(('┌', '┐', '└', '┘', '─', '│')),
            BorderStyle::Double => Some(('╔', '╗', '╚', '╝', '═', '║')),
            BorderStyle::Rounded => Some(('╭', '╮', '╰', '╯', '─', '│')),
            BorderStyle::Heavy => Some(('┏', '┓', '┗', '┛', '━', '┃')),
        }
    }
}

/// A container's option set. Inherited options (see `spec.md` §4.1's
/// option catalogue) are `Option<T>`, resolved by walking to the root;
/// local options always have an effective value at their own node.
#[derive(Clone, Debug, Default)]
pub struct ContainerOptions {
    // Inherited.
    border: Option<BorderStyle>,
    border_color: Option<Color>,
    focused_border_color: Option<Color>,
    title: Option<String>,
    title_options: Option<CellOptions>,
    title_align: Option<Align>,
    padding: Option<Sides>,

    // Local.
    id: Option<String>,
    align_horizontal: Align,
    align_vertical: Align,
    margin: Sides,
    key_focus_skip: bool,
    focus_groups: Vec<u32>,
    focused: bool,
}

impl ContainerOptions {
    /// An empty option set: no border, no title, default alignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the border line style (inherited).
    #[must_use]
    pub fn border(mut self, style: BorderStyle) -> Self {
        self.border = Some(style);
        self
    }

    /// Set the border color (inherited).
    #[must_use]
    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    /// Set the border color used while this subtree holds focus
    /// (inherited).
    #[must_use]
    pub fn focused_border_color(mut self, color: Color) -> Self {
        self.focused_border_color = Some(color);
        self
    }

    /// Set the title drawn in the top border (inherited).
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the cell options the border and title are drawn with
    /// (inherited).
    #[must_use]
    pub fn title_options(mut self, options: CellOptions) -> Self {
        self.title_options = Some(options);
        self
    }

    /// Set where the title sits within the top border (inherited).
    #[must_use]
    pub fn title_align(mut self, align: Align) -> Self {
        self.title_align = Some(align);
        self
    }

    /// Set padding, removed from the inside of the border (inherited).
    #[must_use]
    pub fn padding(mut self, sides: Sides) -> Self {
        self.padding = Some(sides);
        self
    }

    /// Set this container's id, unique across the whole tree (local).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set horizontal alignment for a widget canvas smaller than its
    /// assigned area (local).
    #[must_use]
    pub fn align_horizontal(mut self, align: Align) -> Self {
        self.align_horizontal = align;
        self
    }

    /// Set vertical alignment for a widget canvas smaller than its
    /// assigned area (local).
    #[must_use]
    pub fn align_vertical(mut self, align: Align) -> Self {
        self.align_vertical = align;
        self
    }

    /// Set margin, removed from the outside of the border (local).
    #[must_use]
    pub fn margin(mut self, sides: Sides) -> Self {
        self.margin = sides;
        self
    }

    /// If set, the focus rotator never stops at this leaf (local).
    #[must_use]
    pub fn key_focus_skip(mut self, skip: bool) -> Self {
        self.key_focus_skip = skip;
        self
    }

    /// Add this leaf to a focus group, for group-scoped rotation
    /// (local).
    #[must_use]
    pub fn focus_group(mut self, group: u32) -> Self {
        self.focus_groups.push(group);
        self
    }

    /// If set at build time, this leaf becomes the initially focused
    /// container (local).
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// Tree-scoped options: only meaningful at the root, logically applying
/// to the whole tree.
#[derive(Clone, Debug, Default)]
pub struct TreeOptions {
    key_focus_next: Option<KeyCode>,
    key_focus_previous: Option<KeyCode>,
    key_focus_group_next: Vec<(KeyCode, u32)>,
    key_focus_group_previous: Vec<(KeyCode, u32)>,
}

impl TreeOptions {
    /// No key bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key that cycles focus to the next focusable leaf.
    #[must_use]
    pub fn key_focus_next(mut self, key: KeyCode) -> Self {
        self.key_focus_next = Some(key);
        self
    }

    /// Bind a key that cycles focus to the previous focusable leaf.
    #[must_use]
    pub fn key_focus_previous(mut self, key: KeyCode) -> Self {
        self.key_focus_previous = Some(key);
        self
    }

    /// Bind a key that cycles focus to the next leaf tagged with
    /// `group`.
    #[must_use]
    pub fn key_focus_group_next(mut self, key: KeyCode, group: u32) -> Self {
        self.key_focus_group_next.push((key, group));
        self
    }

    /// Bind a key that cycles focus to the previous leaf tagged with
    /// `group`.
    #[must_use]
    pub fn key_focus_group_previous(mut self, key: KeyCode, group: u32) -> Self {
        self.key_focus_group_previous.push((key, group));
        self
    }
}

type NodeId = usize;

enum Shape {
    Split {
        axis: Axis,
        position: SplitPosition,
        first: NodeId,
        second: NodeId,
    },
    Leaf {
        widget: Option<Box<dyn Widget>>,
    },
}

struct Node {
    parent: Option<NodeId>,
    options: ContainerOptions,
    shape: Shape,
}

/// A not-yet-built description of a container tree, constructed with
/// [`Spec::leaf`] and [`Spec::split_horizontal`]/[`Spec::split_vertical`],
/// and turned into a live [`ContainerTree`] with [`ContainerTree::build`].
pub struct Spec {
    options: ContainerOptions,
    widget: Option<Box<dyn Widget>>,
    children: Option<(Axis, SplitPosition, Box<Spec>, Box<Spec>)>,
}

impl Spec {
    /// A leaf with no widget bound yet.
    pub fn leaf(options: ContainerOptions) -> Self {
        Self {
            options,
            widget: None,
            children: None,
        }
    }

    /// Bind a widget to this node. Calling this on a node built with
    /// `split_horizontal`/`split_vertical` produces a
    /// [`TermGridError::WidgetOnInternalContainer`] at
    /// [`ContainerTree::build`] time.
    #[must_use]
    pub fn with_widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widget = Some(Box::new(widget));
        self
    }

    /// A split whose first child sits on top, second on the bottom.
    pub fn split_horizontal(
        options: ContainerOptions,
        position: SplitPosition,
        top: Spec,
        bottom: Spec,
    ) -> Self {
        Self {
            options,
            widget: None,
            children: Some((Axis::Horizontal, position, Box::new(top), Box::new(bottom))),
        }
    }

    /// A split whose first child sits on the left, second on the
    /// right.
    pub fn split_vertical(
        options: ContainerOptions,
        position: SplitPosition,
        left: Spec,
        right: Spec,
    ) -> Self {
        Self {
            options,
            widget: None,
            children: Some((Axis::Vertical, position, Box::new(left), Box::new(right))),
        }
    }
}

fn build_node(
    spec: Spec,
    parent: Option<NodeId>,
    nodes: &mut Vec<Node>,
    ids: &mut HashMap<String, NodeId>,
    leaves: &mut Vec<NodeId>,
    focused: &mut Option<NodeId>,
) -> Result<NodeId> {
    if spec.children.is_some() && spec.widget.is_some() {
        return Err(TermGridError::WidgetOnInternalContainer);
    }
    if let Some((_, SplitPosition::Percentage(p), _, _)) = &spec.children
        && (*p == 0 || *p >= 100)
    {
        return Err(TermGridError::InvalidOption {
            option: "split position",
            reason: format!("percentage must be in (0, 100), got {p}"),
        });
    }
    if let Some(id) = &spec.options.id
        && ids.contains_key(id)
    {
        return Err(TermGridError::DuplicateId(id.clone()));
    }

    let index = nodes.len();
    // Reserve the slot so children can record `index` as their parent
    // before this node's own `Node` value exists.
    nodes.push(Node {
        parent,
        options: ContainerOptions::default(),
        shape: Shape::Leaf { widget: None },
    });
    if let Some(id) = &spec.options.id {
        ids.insert(id.clone(), index);
    }

    let shape = if let Some((axis, position, first_spec, second_spec)) = spec.children {
        let first = build_node(*first_spec, Some(index), nodes, ids, leaves, focused)?;
        let second = build_node(*second_spec, Some(index), nodes, ids, leaves, focused)?;
        Shape::Split {
            axis,
            position,
            first,
            second,
        }
    } else {
        leaves.push(index);
        if spec.options.focused {
            *focused = Some(index);
        }
        Shape::Leaf {
            widget: spec.widget,
        }
    };

    nodes[index] = Node {
        parent,
        options: spec.options,
        shape,
    };
    Ok(index)
}

/// A widget failure surfaced from a draw pass or an event delivery, for
/// the run loop's error handler to inspect (`spec.md` §4.1's "Failure
/// semantics").
#[derive(Debug)]
pub struct WidgetFailure {
    /// The id of the leaf whose widget failed, if it has one.
    pub id: Option<String>,
    /// The underlying error.
    pub error: TermGridError,
}

struct FocusState {
    leaves: Vec<NodeId>,
    current: usize,
}

impl FocusState {
    fn focused(&self) -> NodeId {
        self.leaves[self.current]
    }

    fn set_to(&mut self, id: NodeId) {
        if let Some(pos) = self.leaves.iter().position(|&n| n == id) {
            self.current = pos;
        }
    }

    /// Rotate to the next (dir=1) or previous (dir=-1) focusable leaf,
    /// in pre-order, wrapping, skipping `key_focus_skip` leaves and
    /// (if `group` is set) leaves not tagged with it. Leaves the focus
    /// unchanged if no leaf in the given scope is eligible.
    fn rotate(&mut self, nodes: &[Node], dir: i64, group: Option<u32>) {
        let len = self.leaves.len();
        if len == 0 {
            return;
        }
        let mut idx = self.current as i64;
        for _ in 0..len {
            idx = (idx + dir).rem_euclid(len as i64);
            let candidate = self.leaves[idx as usize];
            let options = &nodes[candidate].options;
            if options.key_focus_skip {
                continue;
            }
            if let Some(g) = group
                && !options.focus_groups.contains(&g)
            {
                continue;
            }
            self.current = idx as usize;
            return;
        }
    }
}

struct Inner {
    nodes: Vec<Node>,
    focus: FocusState,
    tree_options: TreeOptions,
    master: Buffer,
}

/// A live, built container tree: the engine's single owner of layout,
/// focus, and per-leaf widgets.
///
/// Cloning shares the same underlying tree (it is an `Arc` handle); the
/// run loop keeps one clone, callers another, so an addressed
/// [`ContainerTree::update`] from outside the run loop and the run
/// loop's own draw pass serialize against the same lock.
#[derive(Clone)]
pub struct ContainerTree {
    inner: Arc<RwLock<Inner>>,
}

impl ContainerTree {
    /// Build a tree from `spec`, sized to `initial_size`.
    ///
    /// Fails synchronously (`spec.md` §4.1's "Failure semantics") on a
    /// duplicate id, an out-of-range split percentage, a widget bound
    /// to a container that also has children, or a tree-scoped group
    /// key binding naming a group no leaf belongs to.
    pub fn build(spec: Spec, tree_options: TreeOptions, initial_size: Size) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut ids = HashMap::new();
        let mut leaves = Vec::new();
        let mut focused = None;
        build_node(spec, None, &mut nodes, &mut ids, &mut leaves, &mut focused)?;

        if leaves.is_empty() {
            return Err(TermGridError::IllegalShape(
                "a container tree must have at least one leaf".into(),
            ));
        }

        let referenced_groups = tree_options
            .key_focus_group_next
            .iter()
            .chain(tree_options.key_focus_group_previous.iter())
            .map(|(_, g)| *g);
        for group in referenced_groups {
            let has_member = leaves
                .iter()
                .any(|&id| nodes[id].options.focus_groups.contains(&group));
            if !has_member {
                return Err(TermGridError::InvalidFocusGroup(format!(
                    "group {group} has no member leaves"
                )));
            }
        }

        let current = focused
            .and_then(|id| leaves.iter().position(|&l| l == id))
            .unwrap_or(0);

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                nodes,
                focus: FocusState { leaves, current },
                tree_options,
                master: Buffer::new(initial_size),
            })),
        })
    }

    /// The id of the currently focused leaf, if it has one.
    pub async fn focused_id(&self) -> Option<String> {
        let inner = self.inner.read().await;
        let id = inner.focus.focused();
        inner.nodes[id].options.id.clone()
    }

    /// Re-apply `options` to the container with the given `id`,
    /// serialized against draw passes by taking the same write lock.
    pub async fn update(&self, id: &str, options: ContainerOptions) -> Result<()> {
        let mut inner = self.inner.write().await;
        let node_id = inner
            .nodes
            .iter()
            .position(|n| n.options.id.as_deref() == Some(id))
            .ok_or_else(|| TermGridError::IdNotFound(id.to_string()))?;
        // Preserve the id itself; `options` describes everything else.
        let mut options = options;
        options.id = Some(id.to_string());
        inner.nodes[node_id].options = options;
        Ok(())
    }

    /// Rotate focus to the next focusable leaf in pre-order, wrapping.
    pub async fn focus_next(&self) {
        let mut inner = self.inner.write().await;
        let Inner { nodes, focus, .. } = &mut *inner;
        focus.rotate(nodes, 1, None);
    }

    /// Rotate focus to the previous focusable leaf in pre-order,
    /// wrapping.
    pub async fn focus_previous(&self) {
        let mut inner = self.inner.write().await;
        let Inner { nodes, focus, .. } = &mut *inner;
        focus.rotate(nodes, -1, None);
    }

    /// Route a keyboard event per `spec.md` §4.1: the tree-scoped focus
    /// keys first, then delivery to the focused leaf and/or globally
    /// scoped widgets. Returns any widget failures for the caller's
    /// error handler.
    pub async fn route_keyboard(&self, event: KeyEvent) -> Vec<WidgetFailure> {
        let mut inner = self.inner.write().await;
        if Some(event.code) == inner.tree_options.key_focus_next {
            let Inner { nodes, focus, .. } = &mut *inner;
            focus.rotate(nodes, 1, None);
            return Vec::new();
        }
        if Some(event.code) == inner.tree_options.key_focus_previous {
            let Inner { nodes, focus, .. } = &mut *inner;
            focus.rotate(nodes, -1, None);
            return Vec::new();
        }
        for (key, group) in inner.tree_options.key_focus_group_next.clone() {
            if key == event.code {
                let Inner { nodes, focus, .. } = &mut *inner;
                focus.rotate(nodes, 1, Some(group));
                return Vec::new();
            }
        }
        for (key, group) in inner.tree_options.key_focus_group_previous.clone() {
            if key == event.code {
                let Inner { nodes, focus, .. } = &mut *inner;
                focus.rotate(nodes, -1, Some(group));
                return Vec::new();
            }
        }

        let focused = inner.focus.focused();
        let mut failures = Vec::new();
        let exclusive = matches!(
            &inner.nodes[focused].shape,
            Shape::Leaf { widget: Some(w) } if w.options().exclusive_keyboard_on_focus
        );

        for &leaf in &inner.focus.leaves.clone() {
            let is_focused = leaf == focused;
            let scope_matches = {
                let Shape::Leaf { widget } = &inner.nodes[leaf].shape else {
                    continue;
                };
                let Some(widget) = widget else { continue };
                match widget.options().keyboard_scope {
                    KeyboardScope::None => false,
                    KeyboardScope::Focused => is_focused,
                    KeyboardScope::Global => is_focused || !exclusive,
                }
            };
            if !scope_matches {
                continue;
            }
            let id = inner.nodes[leaf].options.id.clone();
            let Shape::Leaf {
                widget: Some(widget),
            } = &mut inner.nodes[leaf].shape
            else {
                continue;
            };
            let meta = WidgetMeta::new(is_focused);
            if let Err(error) = widget.keyboard(&event, meta) {
                warn!(?id, %error, "widget keyboard callback failed");
                failures.push(WidgetFailure {
                    id,
                    error: TermGridError::WidgetEvent(error.to_string()),
                });
            }
        }
        failures
    }

    /// Route a mouse event per `spec.md` §4.1: a left press inside a
    /// leaf's negotiated rectangle transfers focus there first, then
    /// the event is translated and delivered per each widget's mouse
    /// scope.
    pub async fn route_mouse(&self, event: MouseEvent) -> Vec<WidgetFailure> {
        let mut inner = self.inner.write().await;
        let size = inner.master.size();
        let areas = compute_areas(&inner.nodes, size);

        if event.button == MouseButton::Left {
            for &leaf in &inner.focus.leaves.clone() {
                if areas[leaf].contains(Point::new(event.x, event.y)) {
                    inner.focus.set_to(leaf);
                    break;
                }
            }
        }

        let focused = inner.focus.focused();
        let mut failures = Vec::new();
        for &leaf in &inner.focus.leaves.clone() {
            let is_focused = leaf == focused;
            let area = areas[leaf];
            let Shape::Leaf {
                widget: Some(widget),
            } = &mut inner.nodes[leaf].shape
            else {
                continue;
            };
            let opts = widget.options();
            let align_h = inner.nodes[leaf].options.align_horizontal;
            let align_v = inner.nodes[leaf].options.align_vertical;
            let translated = match opts.mouse_scope {
                MouseScope::None => continue,
                MouseScope::Widget => {
                    let Some(rect) = negotiate(area, &opts, align_h, align_v) else {
                        continue;
                    };
                    if !rect.contains(Point::new(event.x, event.y)) {
                        continue;
                    }
                    event.translated(rect.left(), rect.top())
                }
                MouseScope::Container => {
                    if !area.contains(Point::new(event.x, event.y)) {
                        continue;
                    }
                    event.translated(area.left(), area.top())
                }
                MouseScope::Global => event,
            };
            let id = inner.nodes[leaf].options.id.clone();
            let Shape::Leaf {
                widget: Some(widget),
            } = &mut inner.nodes[leaf].shape
            else {
                continue;
            };
            let meta = WidgetMeta::new(is_focused);
            if let Err(error) = widget.mouse(&translated, meta) {
                warn!(?id, %error, "widget mouse callback failed");
                failures.push(WidgetFailure {
                    id,
                    error: TermGridError::WidgetEvent(error.to_string()),
                });
            }
        }
        failures
    }

    /// Recompute layout for the terminal's current size, draw every
    /// container border/title and widget, and flush the composed frame
    /// to `terminal`. Widget failures are collected rather than
    /// propagated: the caller (the run loop) decides whether a failure
    /// is fatal.
    pub async fn draw(&self, terminal: &mut dyn Terminal) -> Result<Vec<WidgetFailure>> {
        let mut inner = self.inner.write().await;
        let size = terminal.size();
        if inner.master.size() != size {
            inner.master = Buffer::new(size);
        }
        inner.master.clear(CellOptions::new());

        let areas = compute_areas(&inner.nodes, size);
        let focused = inner.focus.focused();
        let mut failures = Vec::new();
        draw_node(&mut inner.nodes, 0, &areas, focused, &mut inner.master, &mut failures);

        let area = inner.master.area();
        terminal.clear(CellOptions::new())?;
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let point = Point::new(x, y);
                let cell = inner.master.get(point)?;
                if cell.is_partial() {
                    continue;
                }
                if let Some(rune) = cell.rune() {
                    terminal.set_cell(point, rune, cell.options().clone())?;
                }
            }
        }
        terminal.flush()?;
        Ok(failures)
    }
}

/// Compute each node's content rectangle (after margin, border, and
/// padding, and after splitting for internal nodes) for the given
/// terminal size. Indexed by `NodeId`.
fn compute_areas(nodes: &[Node], size: Size) -> Vec<Rect> {
    let mut areas = vec![Rect::default(); nodes.len()];
    compute_node_area(nodes, 0, size.area(), &mut areas);
    areas
}

fn resolve_border(nodes: &[Node], mut id: NodeId) -> BorderStyle {
    loop {
        if let Some(b) = nodes[id].options.border {
            return b;
        }
        match nodes[id].parent {
            Some(p) => id = p,
            None => return BorderStyle::default(),
        }
    }
}

fn resolve_padding(nodes: &[Node], mut id: NodeId) -> Sides {
    loop {
        if let Some(p) = nodes[id].options.padding {
            return p;
        }
        match nodes[id].parent {
            Some(parent) => id = parent,
            None => return Sides::default(),
        }
    }
}

fn resolve_title(nodes: &[Node], mut id: NodeId) -> Option<String> {
    loop {
        if let Some(t) = &nodes[id].options.title {
            return Some(t.clone());
        }
        match nodes[id].parent {
            Some(p) => id = p,
            None => return None,
        }
    }
}

fn resolve_title_align(nodes: &[Node], mut id: NodeId) -> Align {
    loop {
        if let Some(a) = nodes[id].options.title_align {
            return a;
        }
        match nodes[id].parent {
            Some(p) => id = p,
            None => return Align::default(),
        }
    }
}

fn resolve_title_options(nodes: &[Node], mut id: NodeId) -> CellOptions {
    loop {
        if let Some(o) = &nodes[id].options.title_options {
            return o.clone();
        }
        match nodes[id].parent {
            Some(p) => id = p,
            None => return CellOptions::new(),
        }
    }
}

fn resolve_border_color(nodes: &[Node], focused: bool, mut id: NodeId) -> Option<Color> {
    if focused {
        let mut walk = id;
        loop {
            if let Some(c) = nodes[walk].options.focused_border_color {
                return Some(c);
            }
            match nodes[walk].parent {
                Some(p) => walk = p,
                None => break,
            }
        }
    }
    loop {
        if let Some(c) = nodes[id].options.border_color {
            return Some(c);
        }
        match nodes[id].parent {
            Some(p) => id = p,
            None => return None,
        }
    }
}

fn compute_node_area(nodes: &[Node], id: NodeId, area: Rect, areas: &mut Vec<Rect>) {
    let margin = nodes[id].options.margin;
    let outer = area.shrink(margin.top, margin.bottom, margin.left, margin.right);
    let border = resolve_border(nodes, id);
    let bordered = if border == BorderStyle::None {
        outer
    } else {
        outer.shrink(1, 1, 1, 1)
    };
    let padding = resolve_padding(nodes, id);
    let content = bordered.shrink(padding.top, padding.bottom, padding.left, padding.right);
    areas[id] = content;

    if let Shape::Split {
        axis,
        position,
        first,
        second,
    } = &nodes[id].shape
    {
        let (first_rect, second_rect) = split_rect(content, *axis, *position);
        compute_node_area(nodes, *first, first_rect, areas);
        compute_node_area(nodes, *second, second_rect, areas);
    }
}

/// Draw this node's own border/title (if any), recurse into its
/// children, and for a leaf negotiate and draw its widget last, so the
/// widget's canvas overlays the padded interior (`spec.md` §4.1's
/// "Draw order").
fn draw_node(
    nodes: &mut [Node],
    id: NodeId,
    areas: &[Rect],
    focused: NodeId,
    master: &mut Buffer,
    failures: &mut Vec<WidgetFailure>,
) {
    let content = areas[id];
    let is_focused_subtree = is_ancestor_or_self(nodes, id, focused);
    let border = resolve_border(nodes, id);
    let border_color = resolve_border_color(nodes, is_focused_subtree, id);
    let title = resolve_title(nodes, id);
    let title_align = resolve_title_align(nodes, id);
    let title_options = resolve_title_options(nodes, id);

    if border != BorderStyle::None {
        // The border sits one cell outside `content`'s padding; grow
        // `content` back out by padding + the border cell itself,
        // mirroring `compute_node_area`'s shrink in reverse.
        let padding = resolve_padding(nodes, id);
        let outer = Rect::new(
            content.position.x.saturating_sub(padding.left + 1),
            content.position.y.saturating_sub(padding.top + 1),
            content.size.width + padding.left + padding.right + 2,
            content.size.height + padding.top + padding.bottom + 2,
        );
        draw_border(master, outer, border, border_color, title.as_deref(), title_align, &title_options);
    }

    match &nodes[id].shape {
        Shape::Split { first, second, .. } => {
            let (first, second) = (*first, *second);
            draw_node(nodes, first, areas, focused, master, failures);
            draw_node(nodes, second, areas, focused, master, failures);
        }
        Shape::Leaf { .. } => {
            draw_leaf(nodes, id, content, focused, master, failures);
        }
    }
}

fn is_ancestor_or_self(nodes: &[Node], ancestor: NodeId, mut node: NodeId) -> bool {
    loop {
        if node == ancestor {
            return true;
        }
        match nodes[node].parent {
            Some(p) => node = p,
            None => return false,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_border(
    master: &mut Buffer,
    outer: Rect,
    style: BorderStyle,
    color: Option<Color>,
    title: Option<&str>,
    title_align: Align,
    title_options: &CellOptions,
) {
    let Some((tl, tr, bl, br, h, v)) = style.chars() else {
        return;
    };
    if outer.size.width < 2 || outer.size.height < 2 {
        return;
    }
    let mut canvas = Canvas::new(outer);
    let border_opts = match color {
        Some(c) => CellOptions::new().fg(c),
        None => CellOptions::new(),
    };
    let right = outer.size.width - 1;
    let bottom = outer.size.height - 1;

    let _ = canvas.set(Point::new(0, 0), tl, border_opts.clone());
    let _ = canvas.set(Point::new(right, 0), tr, border_opts.clone());
    let _ = canvas.set(Point::new(0, bottom), bl, border_opts.clone());
    let _ = canvas.set(Point::new(right, bottom), br, border_opts.clone());
    for x in 1..right {
        let _ = canvas.set(Point::new(x, 0), h, border_opts.clone());
        let _ = canvas.set(Point::new(x, bottom), h, border_opts.clone());
    }
    for y in 1..bottom {
        let _ = canvas.set(Point::new(0, y), v, border_opts.clone());
        let _ = canvas.set(Point::new(right, y), v, border_opts.clone());
    }

    if let Some(title) = title {
        let available = (right.saturating_sub(1)) as usize;
        let display: String = if title.chars().count() > available && available > 1 {
            let truncated: String = title.chars().take(available.saturating_sub(1)).collect();
            format!("{truncated}…")
        } else {
            title.to_string()
        };
        let used = display.chars().count() as u16;
        let start_x = match title_align {
            Align::Start => 1,
            Align::Center => 1 + (right.saturating_sub(1).saturating_sub(used)) / 2,
            Align::End => right.saturating_sub(used.min(right)),
        };
        for (i, ch) in display.chars().enumerate() {
            let x = start_x + i as u16;
            if x < right {
                let _ = canvas.set(Point::new(x, 0), ch, title_options.clone());
            }
        }
    }

    let _ = canvas.apply(master);
}

fn draw_leaf(
    nodes: &mut [Node],
    id: NodeId,
    content: Rect,
    focused: NodeId,
    master: &mut Buffer,
    failures: &mut Vec<WidgetFailure>,
) {
    let align_h = nodes[id].options.align_horizontal;
    let align_v = nodes[id].options.align_vertical;
    let leaf_id = nodes[id].options.id.clone();
    let is_focused = id == focused;

    let Shape::Leaf {
        widget: Some(widget),
    } = &mut nodes[id].shape
    else {
        return;
    };

    let widget_opts = widget.options();
    let Some(rect) = negotiate(content, &widget_opts, align_h, align_v) else {
        if !content.is_empty() {
            let mut glyph_canvas = Canvas::new(Rect::new(content.position.x, content.position.y, 1, 1));
            let _ = glyph_canvas.set(Point::new(0, 0), RESIZE_NEEDED_GLYPH, CellOptions::new());
            let _ = glyph_canvas.apply(master);
        }
        trace!(?leaf_id, "widget minimum size exceeds negotiated rectangle");
        failures.push(WidgetFailure {
            id: leaf_id,
            error: TermGridError::SizeUnderflow,
        });
        return;
    };

    let mut canvas = Canvas::new(rect);
    let meta = WidgetMeta::new(is_focused);
    if let Err(error) = widget.draw(&mut canvas, meta) {
        warn!(?leaf_id, %error, "widget draw failed");
        failures.push(WidgetFailure {
            id: leaf_id,
            error: TermGridError::WidgetDraw(error.to_string()),
        });
        return;
    }
    if let Err(error) = canvas.apply(master) {
        warn!(?leaf_id, %error, "applying widget canvas failed");
        failures.push(WidgetFailure {
            id: leaf_id,
            error,
        });
    }
}

/// Negotiate a widget's drawn rectangle within `available`: `None`
/// signals size underflow (available is smaller than the widget's
/// minimum in some dimension). Otherwise clamps to maximum size and
/// aspect ratio (preferring the largest rectangle satisfying both
/// exactly, per `spec.md` §4.1), then aligns within `available`.
fn negotiate(
    available: Rect,
    opts: &WidgetOptions,
    align_h: Align,
    align_v: Align,
) -> Option<Rect> {
    if available.is_empty() {
        return None;
    }
    if opts.min_size.width > available.size.width || opts.min_size.height > available.size.height
    {
        return None;
    }

    let mut width = available.size.width;
    let mut height = available.size.height;
    if opts.max_size.width != 0 {
        width = width.min(opts.max_size.width);
    }
    if opts.max_size.height != 0 {
        height = height.min(opts.max_size.height);
    }

    let (rx, ry) = opts.aspect_ratio;
    if rx != 0 && ry != 0 {
        let scale = (width / rx).min(height / ry);
        width = scale.saturating_mul(rx);
        height = scale.saturating_mul(ry);
    }

    if width < opts.min_size.width || height < opts.min_size.height {
        return None;
    }

    let x = available.position.x + align_offset(align_h, available.size.width, width);
    let y = available.position.y + align_offset(align_v, available.size.height, height);
    Some(Rect::new(x, y, width, height))
}

fn align_offset(align: Align, total: u16, used: u16) -> u16 {
    match align {
        Align::Start => 0,
        Align::Center => total.saturating_sub(used) / 2,
        Align::End => total.saturating_sub(used),
    }
}

