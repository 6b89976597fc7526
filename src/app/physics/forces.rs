use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadCell;

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic unit-ish nudge for coincident points.
pub(super) fn jiggle(seed_a: usize, seed_b: usize) -> Vec2 {
    let angle =
        ((seed_a as f32) * 0.618_034 + (seed_b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

/// Spring along one edge, pulling its endpoints toward `distance` apart. `bias`
/// is the share of the correction taken by the target.
#[derive(Clone, Copy)]
pub(super) struct Spring {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) bias: f32,
}

pub(super) fn apply_springs(
    springs: &[Spring],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    strength: f32,
    alpha: f32,
) {
    for spring in springs {
        let (source, target) = (spring.source, spring.target);
        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() == 0.0 {
            delta = jiggle(source, target);
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);
        velocities[target] -= correction * spring.bias;
        velocities[source] += correction * (1.0 - spring.bias);
    }
}

/// Barnes-Hut n-body charge. Negative `strength` repels.
pub(super) fn apply_charge(
    tree: &QuadCell,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    strength: f32,
    theta: f32,
    alpha: f32,
) {
    let theta_sq = theta * theta;

    for (index, velocity) in velocities.iter_mut().enumerate() {
        let point = positions[index];
        tree.visit(&mut |cell| {
            if cell.weight <= 0.0 {
                return true;
            }

            if !cell.is_leaf() {
                let delta = cell.centroid - point;
                let distance_sq = delta.length_sq();
                let side = cell.side();
                if !cell.bounds.contains(point.to_pos2()) && side * side / theta_sq < distance_sq {
                    let distance_sq = soften(distance_sq);
                    *velocity += delta * (strength * cell.weight * alpha / distance_sq);
                    return true;
                }
                return false;
            }

            for &other in &cell.members {
                if other == index {
                    continue;
                }
                let mut delta = positions[other] - point;
                if delta.length_sq() == 0.0 {
                    delta = jiggle(index, other);
                }
                let distance_sq = soften(delta.length_sq());
                *velocity += delta * (strength * alpha / distance_sq);
            }
            true
        });
    }
}

fn soften(distance_sq: f32) -> f32 {
    if distance_sq < MIN_DISTANCE_SQ {
        (MIN_DISTANCE_SQ * distance_sq).sqrt()
    } else {
        distance_sq
    }
}

/// Pushes apart nodes whose predicted positions are closer than twice `radius`.
/// Not scaled by alpha, so overlap keeps resolving after the layout cools.
pub(super) fn apply_collision(
    tree: &QuadCell,
    predicted: &[Vec2],
    velocities: &mut [Vec2],
    radius: f32,
) {
    if radius <= 0.0 {
        return;
    }

    let reach = radius * 2.0;
    let reach_sq = reach * reach;

    for index in 0..predicted.len() {
        let point = predicted[index];
        let mut neighbours = Vec::new();
        tree.visit(&mut |cell| {
            if !cell.bounds.expand(reach).contains(point.to_pos2()) {
                return true;
            }
            neighbours.extend(cell.members.iter().copied().filter(|&other| other > index));
            false
        });

        for other in neighbours {
            let mut delta = point - predicted[other];
            let mut distance_sq = delta.length_sq();
            if distance_sq >= reach_sq {
                continue;
            }
            if distance_sq == 0.0 {
                delta = jiggle(index, other);
                distance_sq = delta.length_sq();
            }

            let distance = distance_sq.sqrt();
            let push = delta * ((reach - distance) / distance);
            // Equal radii share the correction evenly.
            velocities[index] += push * 0.5;
            velocities[other] -= push * 0.5;
        }
    }
}

/// Offset that moves the mean of `positions` onto `center`.
pub(super) fn center_shift(positions: &[Vec2], center: Vec2) -> Vec2 {
    if positions.is_empty() {
        return Vec2::ZERO;
    }
    let sum = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point);
    center - sum / positions.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_pulls_distant_pair_together() {
        let positions = [vec2(0.0, 0.0), vec2(400.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let springs = [Spring {
            source: 0,
            target: 1,
            bias: 0.5,
        }];

        apply_springs(&springs, &positions, &mut velocities, 100.0, 1.0, 1.0);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
    }

    #[test]
    fn negative_charge_repels() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let tree = QuadCell::build(&positions).expect("finite points");

        apply_charge(&tree, &positions, &mut velocities, -300.0, 0.9, 1.0);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
    }

    #[test]
    fn far_field_matches_exact_sum_closely() {
        let mut positions = (0..60)
            .map(|index| vec2((index % 10) as f32 * 5.0, (index / 10) as f32 * 5.0))
            .collect::<Vec<_>>();
        positions.push(vec2(2000.0, 2000.0));
        let probe = positions.len() - 1;

        let tree = QuadCell::build(&positions).expect("finite points");
        let mut approximate = vec![Vec2::ZERO; positions.len()];
        apply_charge(&tree, &positions, &mut approximate, -300.0, 0.9, 1.0);

        let exact = positions[..probe].iter().fold(Vec2::ZERO, |sum, other| {
            let delta = *other - positions[probe];
            sum + delta * (-300.0 / delta.length_sq())
        });

        assert!((approximate[probe] - exact).length() < exact.length() * 0.05);
    }

    #[test]
    fn collision_separates_overlapping_nodes() {
        let predicted = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 3];
        let tree = QuadCell::build(&predicted).expect("finite points");

        apply_collision(&tree, &predicted, &mut velocities, 40.0);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
    }

    #[test]
    fn center_shift_targets_mean() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 50.0)];
        assert_eq!(center_shift(&positions, vec2(600.0, 400.0)), vec2(550.0, 375.0));
    }
}
