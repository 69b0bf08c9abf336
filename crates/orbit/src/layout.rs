use crate::geometry::{Point, Viewport};
use serde::Serialize;
use std::f64::consts::TAU;

pub const ANGULAR_RESOLUTION: usize = 360;
pub const MAX_ITERATIONS: usize = 15;
pub const RADIUS_STEP: f64 = 10.0;
pub const MAX_RADIUS_FACTOR: f64 = 3.0;
/// Minimum usable safe length per item, in radians.
pub const ANGLE_EPSILON: f64 = 0.01;

const SAMPLE_STEP: f64 = TAU / ANGULAR_RESOLUTION as f64;

/// Position of one item relative to the anchor center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemPlacement {
    /// Position of the item in the input list.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl ItemPlacement {
    fn at(index: usize, angle: f64, radius: f64) -> Self {
        Self {
            index,
            x: radius * angle.cos(),
            y: radius * angle.sin(),
            angle,
        }
    }

    pub fn absolute(&self, anchor_center: Point) -> Point {
        anchor_center.offset(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    pub open: bool,
    pub anchor_center: Point,
    pub item_count: usize,
    pub base_radius: f64,
    pub item_size: f64,
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    /// Sorted by ascending angle.
    pub placements: Vec<ItemPlacement>,
    /// Radius of the accepted attempt.
    pub radius: f64,
    pub iterations: usize,
    /// False when the search gave up and returned a placement that may overlap.
    pub converged: bool,
}

/// Contiguous interval of angles at which an item stays fully on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeArc {
    pub start: f64,
    pub end: f64,
    pub length: f64,
}

impl SafeArc {
    fn from_samples(first: usize, last: usize) -> Self {
        let (start, end) = (first as f64 * SAMPLE_STEP, last as f64 * SAMPLE_STEP);
        Self {
            start,
            end,
            length: end - start,
        }
    }

    fn midpoint(&self) -> f64 {
        (self.start + self.length / 2.0).rem_euclid(TAU)
    }
}

pub fn compute_placements(input: &LayoutInput) -> Vec<ItemPlacement> {
    compute_layout(input).placements
}

/// Places `item_count` items around the anchor, growing the radius until no two
/// items overlap or the radius cap is reached.
pub fn compute_layout(input: &LayoutInput) -> Layout {
    let viewport = match input.viewport {
        Some(v) if v.is_known() => v,
        _ => return Layout::default(),
    };
    if !input.open || input.item_count == 0 || input.base_radius <= 0.0 {
        return Layout::default();
    }

    let cap = input.base_radius * MAX_RADIUS_FACTOR;
    let mut layout = Layout::default();

    for iteration in 0..MAX_ITERATIONS {
        let radius = (input.base_radius + iteration as f64 * RADIUS_STEP).min(cap);
        let arcs = safe_arcs(input.anchor_center, radius, input.item_size, &viewport);
        let angles = distribute(&arcs, input.item_count);

        layout.placements = angles
            .into_iter()
            .enumerate()
            .map(|(i, angle)| ItemPlacement::at(i, angle, radius))
            .collect();
        layout.radius = radius;
        layout.iterations = iteration + 1;

        if !has_overlap(&layout.placements, input.item_size) {
            layout.converged = true;
            break;
        }
        if radius >= cap {
            break;
        }
    }

    if !layout.converged {
        log::debug!(
            "best-effort layout for {} items at radius {} after {} iterations",
            input.item_count,
            layout.radius,
            layout.iterations
        );
    }

    layout.placements.sort_by(|a, b| a.angle.total_cmp(&b.angle));
    layout
}

fn is_safe(center: Point, radius: f64, angle: f64, item_size: f64, viewport: &Viewport) -> bool {
    let c = center.offset(radius * angle.cos(), radius * angle.sin());
    viewport.contains_square(c, item_size)
}

/// Extracts the safe arcs at `radius`, ordered by ascending start angle.
pub fn safe_arcs(center: Point, radius: f64, item_size: f64, viewport: &Viewport) -> Vec<SafeArc> {
    let mut arcs = Vec::new();
    let mut open_at: Option<usize> = None;

    // the sample past the last one is always unsafe so a trailing arc closes
    for k in 0..=ANGULAR_RESOLUTION {
        let safe = k < ANGULAR_RESOLUTION
            && is_safe(center, radius, k as f64 * SAMPLE_STEP, item_size, viewport);
        match (safe, open_at) {
            (true, None) => open_at = Some(k),
            (false, Some(first)) => {
                arcs.push((first, k - 1));
                open_at = None;
            }
            _ => {}
        }
    }

    let wraps = arcs.len() > 1
        && arcs.first().is_some_and(|&(first, _)| first == 0)
        && arcs
            .last()
            .is_some_and(|&(_, last)| last == ANGULAR_RESOLUTION - 1);

    let mut result: Vec<SafeArc> = arcs
        .iter()
        .map(|&(first, last)| SafeArc::from_samples(first, last))
        .collect();

    if wraps {
        let head = result.remove(0);
        if let Some(tail) = result.last_mut() {
            *tail = SafeArc {
                start: tail.start,
                end: head.end + TAU,
                length: tail.length + SAMPLE_STEP + head.length,
            };
        }
    }

    result
}

fn uniform_angles(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| i as f64 * TAU / count as f64)
        .collect()
}

/// Divides the concatenated safe arcs into equal slots and maps each slot's
/// midpoint back onto the circle.
fn distribute(arcs: &[SafeArc], count: usize) -> Vec<f64> {
    let total: f64 = arcs.iter().map(|a| a.length).sum();
    if total < count as f64 * ANGLE_EPSILON {
        return uniform_angles(count);
    }

    let slot = total / count as f64;
    (0..count)
        .map(|i| {
            let offset = (i as f64 + 0.5) * slot;
            locate(arcs, offset).unwrap_or_else(|| {
                arcs.first()
                    .map(SafeArc::midpoint)
                    .unwrap_or(i as f64 * TAU / count as f64)
            })
        })
        .collect()
}

fn locate(arcs: &[SafeArc], offset: f64) -> Option<f64> {
    let mut before = 0.0;
    for arc in arcs {
        if offset <= before + arc.length {
            return Some((arc.start + (offset - before)).rem_euclid(TAU));
        }
        before += arc.length;
    }
    None
}

/// Items whose centers are closer than one item size overlap.
pub fn has_overlap(placements: &[ItemPlacement], item_size: f64) -> bool {
    let min = item_size * item_size;
    placements.iter().enumerate().any(|(i, a)| {
        placements[i + 1..].iter().any(|b| {
            let (dx, dy) = (a.x - b.x, a.y - b.y);
            dx * dx + dy * dy < min
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn input(
        center: Point,
        count: usize,
        radius: f64,
        size: f64,
        viewport: Viewport,
    ) -> LayoutInput {
        LayoutInput {
            open: true,
            anchor_center: center,
            item_count: count,
            base_radius: radius,
            item_size: size,
            viewport: Some(viewport),
        }
    }

    fn scenario_center() -> LayoutInput {
        input(Point::new(500.0, 500.0), 7, 120.0, 48.0, Viewport::new(1000.0, 1000.0))
    }

    fn assert_in_bounds(layout: &Layout, input: &LayoutInput) {
        let v = input.viewport.unwrap();
        for p in &layout.placements {
            let c = p.absolute(input.anchor_center);
            assert!(
                v.contains_square(c, input.item_size),
                "item {} at ({}, {}) clips the viewport",
                p.index,
                c.x,
                c.y
            );
        }
    }

    #[test]
    fn test_empty_when_not_shown() {
        let base = scenario_center();
        let cases = vec![
            LayoutInput { open: false, ..base },
            LayoutInput { item_count: 0, ..base },
            LayoutInput { base_radius: 0.0, ..base },
            LayoutInput { base_radius: -4.0, ..base },
            LayoutInput { viewport: None, ..base },
            LayoutInput { viewport: Some(Viewport::default()), ..base },
        ];

        for case in cases {
            assert!(compute_placements(&case).is_empty(), "{case:?}");
        }
    }

    #[test]
    fn test_centered_anchor_uses_full_circle() {
        let input = scenario_center();
        let layout = compute_layout(&input);

        assert_eq!(layout.placements.len(), 7);
        assert!(layout.converged);
        assert_eq!(layout.iterations, 1);
        assert_relative_eq!(layout.radius, 120.0);
        assert_in_bounds(&layout, &input);
        assert!(!has_overlap(&layout.placements, 48.0));

        let angles: Vec<f64> = layout.placements.iter().map(|p| p.angle).collect();
        let even = TAU / 7.0;
        for pair in angles.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], even, epsilon = 0.02);
        }
        let wrap_gap = angles[0] + TAU - angles[6];
        assert_relative_eq!(wrap_gap, even, epsilon = 0.05);
    }

    #[test]
    fn test_corner_anchor_compresses_into_quadrant() {
        let input = LayoutInput {
            anchor_center: Point::new(0.0, 0.0),
            ..scenario_center()
        };
        let layout = compute_layout(&input);

        assert_eq!(layout.placements.len(), 7);
        assert_in_bounds(&layout, &input);
        for p in &layout.placements {
            assert!(p.angle > 0.0 && p.angle < FRAC_PI_2, "angle {}", p.angle);
            assert!(p.x > 0.0 && p.y > 0.0);
        }
        assert!(layout.radius > 120.0);
    }

    #[test]
    fn test_cramped_viewport_returns_every_item_at_cap() {
        let input = input(Point::new(100.0, 100.0), 7, 60.0, 160.0, Viewport::new(200.0, 200.0));
        let layout = compute_layout(&input);

        assert_eq!(layout.placements.len(), 7);
        assert!(!layout.converged);
        assert_relative_eq!(layout.radius, 180.0);
        assert_eq!(layout.iterations, 13);
    }

    #[test]
    fn test_accepted_layouts_do_not_overlap() {
        let viewport = Viewport::new(800.0, 600.0);
        for &(x, y) in &[(400.0, 300.0), (40.0, 300.0), (780.0, 20.0), (400.0, 590.0)] {
            for count in 1..=10 {
                let layout = compute_layout(&input(Point::new(x, y), count, 90.0, 40.0, viewport));
                assert_eq!(layout.placements.len(), count);
                if layout.converged {
                    for (i, a) in layout.placements.iter().enumerate() {
                        for b in &layout.placements[i + 1..] {
                            let d2 = (a.x - b.x).powi(2) + (a.y - b.y).powi(2);
                            assert!(d2 >= 40.0 * 40.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let input = LayoutInput {
            anchor_center: Point::new(30.0, 970.0),
            ..scenario_center()
        };
        let a = compute_layout(&input);
        let b = compute_layout(&input);
        assert_eq!(a, b);
        for (pa, pb) in a.placements.iter().zip(&b.placements) {
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.angle.to_bits(), pb.angle.to_bits());
        }
    }

    #[test]
    fn test_radius_grows_until_items_fit() {
        // 12 items of 48 at radius 60 overlap; the chord reaches 48 near radius 93
        let input = input(Point::new(500.0, 500.0), 12, 60.0, 48.0, Viewport::new(1000.0, 1000.0));
        let layout = compute_layout(&input);

        assert!(layout.converged);
        assert!(layout.radius > 60.0);
        assert_relative_eq!(layout.radius, 60.0 + (layout.iterations - 1) as f64 * RADIUS_STEP);
        assert!(!has_overlap(&layout.placements, 48.0));
    }

    #[test]
    fn test_placements_sorted_and_indexed() {
        let input = LayoutInput {
            anchor_center: Point::new(990.0, 500.0),
            ..scenario_center()
        };
        let layout = compute_layout(&input);

        assert!(layout.placements.windows(2).all(|w| w[0].angle <= w[1].angle));
        let mut indices: Vec<usize> = layout.placements.iter().map(|p| p.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_left_edge_arc_merges_across_seam() {
        // anchor on the left edge: the safe side faces angle 0, so the arc
        // crosses the seam and must be merged into one
        let arcs = safe_arcs(Point::new(0.0, 500.0), 120.0, 48.0, &Viewport::new(1000.0, 1000.0));
        assert_eq!(arcs.len(), 1);
        let arc = arcs[0];
        assert!(arc.start > PI);
        assert!(arc.end > TAU);
        assert_relative_eq!(arc.end - arc.start, arc.length, epsilon = 1e-9);
    }

    #[test]
    fn test_no_safe_space_falls_back_to_uniform() {
        assert_eq!(
            distribute(&[], 4),
            vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
        );
        let sliver = [SafeArc::from_samples(10, 10)];
        assert_eq!(distribute(&sliver, 2), vec![0.0, PI]);
    }

    #[test]
    fn test_overlap_threshold() {
        let a = ItemPlacement { index: 0, x: 24.0, y: 0.0, angle: 0.0 };
        let b = ItemPlacement { index: 1, x: -24.0, y: 0.0, angle: PI };
        // exactly touching is accepted
        assert!(!has_overlap(&[a, b], 48.0));
        assert!(has_overlap(&[a, b], 48.5));
        assert!(!has_overlap(&[a], 480.0));
    }
}
