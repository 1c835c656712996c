//! Default port geometry for hit testing
//!
//! Vertical flow: input ports sit on the top edge of the node, outputs on the
//! bottom edge, centered and spaced evenly. Renderers with their own layout
//! supply their own [`PortLocator`](super::interaction::PortLocator).

use super::interaction::PortLocator;
use super::node::Node;
use super::port::{PortDirection, PortIndex};
use crate::constants;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortLayout {
    pub spacing: f32,
    pub hit_radius: f32,
    /// Radius used while the node reacts to a dragged connection
    pub reacting_hit_radius: f32,
}

impl Default for PortLayout {
    fn default() -> Self {
        Self {
            spacing: constants::port::SPACING,
            hit_radius: constants::port::HIT_RADIUS,
            reacting_hit_radius: constants::port::REACTING_HIT_RADIUS,
        }
    }
}

impl PortLayout {
    /// Scene position of a port's connection point
    pub fn port_position(&self, node: &Node, direction: PortDirection, index: PortIndex) -> Vec2 {
        let count = node.ports(direction).len();
        let start_x = if count > 1 {
            (node.size.x - (count - 1) as f32 * self.spacing) / 2.0
        } else {
            node.size.x / 2.0
        };
        let y = match direction {
            PortDirection::Input => 0.0,
            PortDirection::Output => node.size.y,
        };
        node.position() + Vec2::new(start_x + index as f32 * self.spacing, y)
    }

    fn radius(&self, node: &Node) -> f32 {
        if node.is_reacting() {
            self.reacting_hit_radius
        } else {
            self.hit_radius
        }
    }
}

impl PortLocator for PortLayout {
    fn port_at(&self, node: &Node, direction: PortDirection, point: Vec2) -> Option<PortIndex> {
        let radius = self.radius(node);
        (0..node.ports(direction).len())
            .map(|index| (index, self.port_position(node, direction, index).distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
