//! Walking into subtrees of a built tree from the keyboard.

use convex_bsp::{BspNode, BspTree};
use macroquad::prelude::*;

use crate::{RenderVisitor, draw_polygon};

/// Which child a step of the path takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Front,
    Behind,
}

impl Direction {
    /// The child of `node` on this side.
    pub fn child(self, node: &BspNode) -> Option<&BspNode> {
        match self {
            Direction::Front => node.front(),
            Direction::Behind => node.behind(),
        }
    }

    /// Heap index of this child of node `index`.
    pub fn heap_child(self, index: usize) -> usize {
        match self {
            Direction::Front => 2 * index + 1,
            Direction::Behind => 2 * index + 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Direction::Front => "F",
            Direction::Behind => "B",
        }
    }
}

/// Path from the root to the subtree being shown.
///
/// The path is only ever extended toward an existing child, but the tree
/// may be rebuilt underneath it, so lookups still return `Option`.
#[derive(Debug, Default)]
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl TreeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    /// Heap index of the current node, matching the tree's `Display` dump.
    pub fn index(&self) -> usize {
        self.path.iter().fold(0, |index, step| step.heap_child(index))
    }

    /// Steps into the child on `direction`'s side if it exists.
    pub fn descend(&mut self, direction: Direction, tree: &BspTree) -> bool {
        let exists = self
            .current_node(tree)
            .and_then(|node| direction.child(node))
            .is_some();
        if exists {
            self.path.push(direction);
        }
        exists
    }

    /// Steps back toward the root; false when already there.
    pub fn ascend(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn reset(&mut self) {
        self.path.clear();
    }

    /// F/B descend, P goes up, R returns to the root. Returns whether the
    /// path changed.
    pub fn update(&mut self, tree: &BspTree) -> bool {
        let mut changed = false;
        if is_key_pressed(KeyCode::F) {
            changed |= self.descend(Direction::Front, tree);
        }
        if is_key_pressed(KeyCode::B) {
            changed |= self.descend(Direction::Behind, tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed |= self.ascend();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.reset();
            changed = true;
        }
        changed
    }

    pub fn current_node<'a>(&self, tree: &'a BspTree) -> Option<&'a BspNode> {
        self.path
            .iter()
            .try_fold(tree.root(), |node, step| step.child(node))
    }

    /// Draws the current subtree: node group, then front, then behind.
    pub fn render(&self, tree: &BspTree) {
        if self.path.is_empty() {
            tree.traverse(&mut RenderVisitor);
        } else if let Some(node) = self.current_node(tree) {
            render_subtree(node);
        }
    }

    /// Overlay text describing the current node.
    pub fn status_lines(&self, tree: &BspTree) -> [String; 3] {
        let route = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|step| step.label())
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        let children = match self.current_node(tree) {
            Some(node) if node.is_leaf() => "leaf".to_string(),
            Some(node) => [
                node.front().map(|_| "[F]ront"),
                node.behind().map(|_| "[B]ehind"),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
            None => "missing".to_string(),
        };

        [
            format!(
                "Subtree: {} polygons",
                self.current_node(tree).map_or(0, BspNode::polygon_count)
            ),
            format!("Path: {route} (index {}, depth {})", self.index(), self.path.len()),
            format!("Children: {children}"),
        ]
    }

    pub fn draw_ui(&self, tree: &BspTree, y_offset: f32) {
        let leaf = self.current_node(tree).is_none_or(BspNode::is_leaf);
        let colors = [WHITE, YELLOW, if leaf { ORANGE } else { GREEN }];

        for (row, (line, color)) in self.status_lines(tree).iter().zip(colors).enumerate() {
            draw_text(line, 10.0, y_offset + row as f32 * 20.0, 18.0, color);
        }
        draw_text("[P]arent | [R]oot", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

fn render_subtree(node: &BspNode) {
    node.polygons().iter().for_each(draw_polygon);
    for child in [node.front(), node.behind()].into_iter().flatten() {
        render_subtree(child);
    }
}
