//! Layout geometry: positions, spacing metrics and connector math.
//!
//! Coordinates are offsets in pixels from the center of the drawing area;
//! y grows downwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::arena::Side;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Reject NaN and infinite coordinates.
    pub fn ensure_finite(self, context: &str) -> DomainResult<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(DomainError::NonFiniteCoordinate {
                context: context.to_string(),
                x: self.x,
                y: self.y,
            })
        }
    }
}

/// Delays before rendered elements get their `visible` class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub node_base_ms: u64,
    pub node_step_ms: u64,
    pub connector_ms: u64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            node_base_ms: 50,
            node_step_ms: 100,
            connector_ms: 200,
        }
    }
}

impl RevealTiming {
    /// Deeper nodes appear later.
    pub fn node_delay(&self, depth: usize) -> Duration {
        let depth = u64::try_from(depth).unwrap_or(u64::MAX);
        Duration::from_millis(
            self.node_base_ms
                .saturating_add(self.node_step_ms.saturating_mul(depth)),
        )
    }

    pub fn connector_delay(&self) -> Duration {
        Duration::from_millis(self.connector_ms)
    }
}

/// Spacing constants and cosmetic parameters of the tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Horizontal distance between a parent and each child
    pub horizontal_spacing: f64,
    /// Vertical distance between depth levels
    pub vertical_spacing: f64,
    /// Where the root is drawn
    pub root_origin: Point,
    /// Vertical shift of connector anchors so lines leave the node body
    pub connector_nudge: f64,
    pub connector_thickness: f64,
    pub connector_color: String,
    pub reveal: RevealTiming,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            horizontal_spacing: 350.0,
            vertical_spacing: 250.0,
            root_origin: Point::new(0.0, -150.0),
            connector_nudge: 80.0,
            connector_thickness: 2.0,
            connector_color: "#CCCCCC".to_string(),
            reveal: RevealTiming::default(),
        }
    }
}

impl LayoutMetrics {
    pub fn validate(&self) -> DomainResult<()> {
        let positive = [
            ("horizontal_spacing", self.horizontal_spacing),
            ("vertical_spacing", self.vertical_spacing),
            ("connector_thickness", self.connector_thickness),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::InvalidMetric { name, value });
            }
        }
        if !self.connector_nudge.is_finite() {
            return Err(DomainError::InvalidMetric {
                name: "connector_nudge",
                value: self.connector_nudge,
            });
        }
        self.root_origin.ensure_finite("root_origin")?;
        Ok(())
    }

    /// Position of the child on `side` of a node drawn at `parent`.
    pub fn child_position(&self, parent: Point, side: Side) -> Point {
        Point::new(
            parent.x + side.sign() * self.horizontal_spacing,
            parent.y + self.vertical_spacing,
        )
    }
}

/// A straight line primitive: anchored at `anchor`, `length` long, rotated by `angle_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connector {
    pub anchor: Point,
    pub length: f64,
    pub angle_deg: f64,
}

/// Line from `from` to `to`, with the anchor shifted down by `nudge`.
pub fn connector_between(from: Point, to: Point, nudge: f64) -> Connector {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    Connector {
        anchor: Point::new(from.x, from.y + nudge),
        length: dx.hypot(dy),
        angle_deg: dy.atan2(dx).to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    #[rstest]
    #[case(Side::Left, -350.0)]
    #[case(Side::Right, 350.0)]
    fn given_default_metrics_when_placing_child_then_offsets_by_spacing(
        #[case] side: Side,
        #[case] expected_x: f64,
    ) {
        let metrics = LayoutMetrics::default();
        let child = metrics.child_position(Point::new(0.0, -150.0), side);
        assert_eq!(child, Point::new(expected_x, 100.0));
    }

    #[test]
    fn given_three_four_five_triangle_when_connecting_then_length_and_angle_match() {
        let c = connector_between(Point::new(0.0, 0.0), Point::new(3.0, 4.0), 80.0);
        assert!((c.length - 5.0).abs() < EPS);
        assert!((c.angle_deg - 53.130_102_354_155_98).abs() < 1e-6);
        assert_eq!(c.anchor, Point::new(0.0, 80.0));
    }

    #[test]
    fn given_left_child_when_connecting_then_angle_points_down_left() {
        let metrics = LayoutMetrics::default();
        let parent = metrics.root_origin;
        let child = metrics.child_position(parent, Side::Left);
        let c = connector_between(parent, child, metrics.connector_nudge);
        assert!(c.angle_deg > 90.0 && c.angle_deg < 180.0);
        assert!((c.length - 350f64.hypot(250.0)).abs() < EPS);
    }

    #[test]
    fn given_depth_when_computing_node_delay_then_grows_linearly() {
        let timing = RevealTiming::default();
        assert_eq!(timing.node_delay(0), Duration::from_millis(50));
        assert_eq!(timing.node_delay(2), Duration::from_millis(250));
        assert_eq!(timing.connector_delay(), Duration::from_millis(200));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(0.0)]
    #[case(-10.0)]
    fn given_bad_spacing_when_validating_then_rejects(#[case] value: f64) {
        let metrics = LayoutMetrics {
            horizontal_spacing: value,
            ..LayoutMetrics::default()
        };
        assert!(matches!(
            metrics.validate(),
            Err(DomainError::InvalidMetric {
                name: "horizontal_spacing",
                ..
            })
        ));
    }

    #[test]
    fn given_nan_point_when_ensuring_finite_then_errors() {
        let err = Point::new(f64::NAN, 0.0).ensure_finite("node").unwrap_err();
        assert!(matches!(err, DomainError::NonFiniteCoordinate { .. }));
    }

    #[rstest]
    #[case(2)]
    #[case(usize::MAX)]
    fn given_huge_step_when_computing_node_delay_then_saturates(#[case] depth: usize) {
        let timing = RevealTiming {
            node_step_ms: i64::MAX as u64,
            ..RevealTiming::default()
        };
        assert_eq!(timing.node_delay(depth), Duration::from_millis(u64::MAX));
    }
}
