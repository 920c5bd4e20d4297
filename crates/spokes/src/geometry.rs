//! Angle and vector math for laying out and hit-testing radial menus.
//!
//! Angles are in degrees. 0° points up (towards negative screen y) and angles grow
//! clockwise, so 90° points right.

use derive_more::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};

pub const FULL_CIRCLE: f64 = 360.0;

/// How far a fixed child angle is moved when it points exactly at the parent.
const PARENT_COLLISION_NUDGE: f64 = 0.1;

#[derive(
    Debug, Clone, Copy, PartialEq, Default, Add, Sub, AddAssign, SubAssign, Serialize, Deserialize,
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Direction vector of `angle`, scaled to `length`.
    pub fn from_angle(angle: f64, length: f64) -> Self {
        let radians = (angle - 90.0).to_radians();
        Self::new(radians.cos() * length, radians.sin() * length)
    }

    /// Direction of this vector in [0, 360).
    pub fn angle(&self) -> f64 {
        normalize_angle(self.y.atan2(self.x).to_degrees() + 90.0)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        (*self - other).length()
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn trunc(self) -> Self {
        Self::new(self.x.trunc(), self.y.trunc())
    }
}

/// Angular interval `[start, end)` in which the pointer hovers an item. `end` may be
/// smaller than `start` when the wedge wraps past 0°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub start: f64,
    pub end: f64,
}

impl Wedge {
    pub const FULL: Self = Self {
        start: 0.0,
        end: FULL_CIRCLE,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: normalize_angle(start),
            end: normalize_angle(end),
        }
    }

    pub fn contains(&self, angle: f64) -> bool {
        is_angle_between(angle, self.start, self.end)
    }

    pub fn span(&self) -> f64 {
        if self.end > self.start {
            self.end - self.start
        } else {
            self.end + FULL_CIRCLE - self.start
        }
    }
}

/// Hit-test wedges of a node's children, plus the gap kept free towards its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWedges {
    pub items: Vec<Wedge>,
    pub parent: Option<Wedge>,
}

pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(FULL_CIRCLE)
}

/// Checks whether `angle` lies in `[start, end)`, wrapping around 0° if `start > end`.
pub fn is_angle_between(angle: f64, start: f64, end: f64) -> bool {
    let (angle, start, end) = (
        normalize_angle(angle),
        normalize_angle(start),
        normalize_angle(end),
    );

    if start < end {
        angle >= start && angle < end
    } else {
        angle >= start || angle < end
    }
}

/// Returns the representation of `angle` which is numerically closest to `reference`.
/// The result may lie outside of [0, 360).
pub fn closest_equivalent_angle(reference: f64, angle: f64) -> f64 {
    let diff = normalize_angle(angle - reference);
    if diff > FULL_CIRCLE / 2.0 {
        reference + diff - FULL_CIRCLE
    } else {
        reference + diff
    }
}

/// Assigns a direction to each child.
///
/// `fixed_angles` holds the user-chosen angle of each child, if any. Fixed angles have to
/// increase with the child index; a fixed angle which does not is ignored. Children
/// without a fixed angle are spread evenly between their fixed neighbours. If
/// `parent_angle` is given, the direction back to the parent takes one of these even
/// slots so that no child ever points at the parent.
pub fn compute_item_angles(fixed_angles: &[Option<f64>], parent_angle: Option<f64>) -> Vec<f64> {
    let count = fixed_angles.len();
    if count == 0 {
        return Vec::new();
    }

    let parent_angle = parent_angle.map(normalize_angle);

    let mut anchors: Vec<(usize, f64)> = Vec::new();
    for (index, angle) in fixed_angles.iter().enumerate() {
        let Some(angle) = angle else { continue };
        let mut angle = normalize_angle(*angle);
        if parent_angle == Some(angle) {
            angle = normalize_angle(angle + PARENT_COLLISION_NUDGE);
        }
        if anchors.last().is_none_or(|&(_, last)| angle > last) {
            anchors.push((index, angle));
        }
    }

    // Without fixed angles the first child goes up, or one slot clockwise of the parent.
    if anchors.is_empty() {
        let first = parent_angle.map_or(0.0, |parent| {
            normalize_angle(parent + FULL_CIRCLE / (count + 1) as f64)
        });
        anchors.push((0, first));
    }

    let mut angles = vec![0.0; count];
    for &(index, angle) in &anchors {
        angles[index] = angle;
    }

    for (i, &(begin_index, begin_angle)) in anchors.iter().enumerate() {
        let (end_index, mut end_angle) = anchors[(i + 1) % anchors.len()];
        if end_angle <= begin_angle {
            end_angle += FULL_CIRCLE;
        }

        let mut slots = (end_index + count - begin_index - 1) % count;

        let mut parent_gap = parent_angle
            .map(|parent| {
                if parent < begin_angle {
                    parent + FULL_CIRCLE
                } else {
                    parent
                }
            })
            .filter(|&parent| parent > begin_angle && parent < end_angle);
        if parent_gap.is_some() {
            slots += 1;
        }

        let gap = (end_angle - begin_angle) / (slots + 1) as f64;
        let mut step = 1;
        let mut index = (begin_index + 1) % count;

        while index != end_index {
            let mut angle = begin_angle + gap * step as f64;
            if let Some(parent) = parent_gap
                && angle + gap / 2.0 > parent
            {
                step += 1;
                angle = begin_angle + gap * step as f64;
                parent_gap = None;
            }
            angles[index] = normalize_angle(angle);
            index = (index + 1) % count;
            step += 1;
        }
    }

    angles
}

/// Derives the hit-test wedge of every child. Each wedge reaches halfway to the
/// neighbouring child (or to the parent direction) on both sides.
pub fn compute_item_wedges(angles: &[f64], parent_angle: Option<f64>) -> ItemWedges {
    if angles.is_empty() {
        return ItemWedges {
            items: Vec::new(),
            parent: parent_angle.map(|_| Wedge::FULL),
        };
    }

    if angles.len() == 1 && parent_angle.is_none() {
        return ItemWedges {
            items: vec![Wedge::FULL],
            parent: None,
        };
    }

    // The parent direction is treated like one more child without an index.
    let mut directions: Vec<(Option<usize>, f64)> = angles
        .iter()
        .enumerate()
        .map(|(index, &angle)| (Some(index), normalize_angle(angle)))
        .collect();
    if let Some(parent) = parent_angle {
        directions.push((None, normalize_angle(parent)));
    }
    directions.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = directions.len();
    let mut wedges = ItemWedges {
        items: vec![Wedge::FULL; angles.len()],
        parent: None,
    };

    for (i, &(owner, angle)) in directions.iter().enumerate() {
        let previous = directions[(i + n - 1) % n].1;
        let next = directions[(i + 1) % n].1;
        let wedge = Wedge::new(
            angle - normalize_angle(angle - previous) / 2.0,
            angle + normalize_angle(next - angle) / 2.0,
        );

        match owner {
            Some(index) => wedges.items[index] = wedge,
            None => wedges.parent = Some(wedge),
        }
    }

    wedges
}

/// Moves `point` as little as possible so that a disc of `radius` around it fits into
/// `[0, window_size]` on both axes.
pub fn clamp_to_monitor(point: Vec2, radius: f64, window_size: Vec2) -> Vec2 {
    Vec2::new(
        point.x.max(radius).min(window_size.x - radius),
        point.y.max(radius).min(window_size.y - radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPSILON, "{a} != {b}");
    }

    fn total_span(wedges: &[Wedge]) -> f64 {
        wedges.iter().map(Wedge::span).sum()
    }

    #[test]
    fn test_direction_and_angle() {
        let up = Vec2::from_angle(0.0, 2.0);
        assert_close(up.x, 0.0);
        assert_close(up.y, -2.0);

        let right = Vec2::from_angle(90.0, 1.0);
        assert_close(right.x, 1.0);
        assert_close(right.y, 0.0);

        assert_close(Vec2::new(0.0, 5.0).angle(), 180.0);
        assert_close(Vec2::new(-3.0, 0.0).angle(), 270.0);
        assert_close(Vec2::new(3.0, 4.0).length(), 5.0);

        let v = Vec2::from_angle(123.0, 42.0);
        assert_close(v.angle(), 123.0);
        assert_close(v.length(), 42.0);
    }

    #[test]
    fn test_is_angle_between() {
        assert!(is_angle_between(10.0, 10.0, 20.0));
        assert!(is_angle_between(15.0, 10.0, 20.0));
        assert!(!is_angle_between(20.0, 10.0, 20.0));
        assert!(!is_angle_between(5.0, 10.0, 20.0));

        assert!(is_angle_between(350.0, 300.0, 10.0));
        assert!(is_angle_between(5.0, 300.0, 10.0));
        assert!(!is_angle_between(100.0, 300.0, 10.0));

        assert!(Wedge::FULL.contains(0.0));
        assert!(Wedge::FULL.contains(359.9));
    }

    #[test]
    fn test_closest_equivalent_angle() {
        assert_close(closest_equivalent_angle(370.0, 10.0), 370.0);
        assert_close(closest_equivalent_angle(0.0, 350.0), -10.0);
        assert_close(closest_equivalent_angle(720.0, 90.0), 810.0);
        assert_close(closest_equivalent_angle(-170.0, 180.0), -180.0);
    }

    #[test]
    fn test_even_angles_without_parent() {
        let angles = compute_item_angles(&[None; 4], None);
        assert_eq!(angles, vec![0.0, 90.0, 180.0, 270.0]);

        let wedges = compute_item_wedges(&angles, None);
        assert!(wedges.parent.is_none());
        assert_eq!(wedges.items[1], Wedge::new(45.0, 135.0));
        assert_eq!(wedges.items[0], Wedge::new(315.0, 45.0));
    }

    #[test]
    fn test_wedges_partition_circle_without_parent() {
        for count in 2..12 {
            let angles = compute_item_angles(&vec![None; count], None);
            let wedges = compute_item_wedges(&angles, None);
            assert_close(total_span(&wedges.items), FULL_CIRCLE);

            // Consecutive wedges touch.
            for i in 0..count {
                let next = wedges.items[(i + 1) % count];
                assert_close(wedges.items[i].end, next.start);
            }
        }
    }

    #[test]
    fn test_single_child_covers_circle() {
        let angles = compute_item_angles(&[None], None);
        let wedges = compute_item_wedges(&angles, None);
        assert_eq!(wedges.items, vec![Wedge::FULL]);
        assert!(wedges.items[0].contains(200.0));
    }

    #[test]
    fn test_children_avoid_parent_direction() {
        for parent in [0.0, 45.0, 180.0, 271.5] {
            for count in 1..10 {
                let angles = compute_item_angles(&vec![None; count], Some(parent));
                assert!(angles.iter().all(|&a| (a - parent).abs() > EPSILON));

                let wedges = compute_item_wedges(&angles, Some(parent));
                let parent_wedge = wedges.parent.expect("parent wedge");
                assert!(parent_wedge.contains(parent));
                assert_close(
                    total_span(&wedges.items) + parent_wedge.span(),
                    FULL_CIRCLE,
                );
            }
        }
    }

    #[test]
    fn test_parent_takes_one_slot() {
        let angles = compute_item_angles(&[None; 3], Some(180.0));
        assert_eq!(angles, vec![270.0, 0.0, 90.0]);
    }

    #[test]
    fn test_fixed_angles() {
        let angles = compute_item_angles(&[None, Some(90.0), None, Some(270.0)], None);
        assert_eq!(angles, vec![0.0, 90.0, 180.0, 270.0]);

        // A fixed angle smaller than its predecessor is ignored.
        let angles = compute_item_angles(&[Some(90.0), Some(45.0)], None);
        assert_eq!(angles, vec![90.0, 270.0]);

        // A fixed angle pointing at the parent is moved aside.
        let angles = compute_item_angles(&[Some(180.0)], Some(180.0));
        assert_close(angles[0], 180.1);
    }

    #[test]
    fn test_clamp_to_monitor() {
        let window = Vec2::new(800.0, 600.0);
        let inside = Vec2::new(400.0, 300.0);
        assert_eq!(clamp_to_monitor(inside, 100.0, window), inside);

        let clamped = clamp_to_monitor(Vec2::new(20.0, 590.0), 100.0, window);
        assert_eq!(clamped, Vec2::new(100.0, 500.0));
        assert_eq!(clamp_to_monitor(clamped, 100.0, window), clamped);
    }
}
