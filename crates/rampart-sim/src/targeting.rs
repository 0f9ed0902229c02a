//! Tower target selection strategies.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::constants::CLUSTER_RADIUS;
use rampart_core::enums::TargetingKind;
use rampart_core::types::{EnemyId, Point};

/// A live enemy a tower may shoot at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: EnemyId,
    pub position: Point,
}

/// Picks one enemy out of those in range.
///
/// `in_range` is ordered by enemy id; `all_alive` is every live enemy, for
/// strategies that look at the surroundings of a candidate.
pub trait TargetingStrategy: fmt::Debug + Send {
    fn select(
        &self,
        in_range: &[Candidate],
        all_alive: &[Candidate],
        rng: &mut ChaCha8Rng,
    ) -> Option<Candidate>;

    fn kind(&self) -> TargetingKind;
}

pub fn strategy_for(kind: TargetingKind) -> Box<dyn TargetingStrategy> {
    match kind {
        TargetingKind::Random => Box::new(RandomTarget),
        TargetingKind::Cluster => Box::new(ClusterTarget::new(CLUSTER_RADIUS)),
    }
}

/// Uniform pick among the enemies in range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTarget;

impl TargetingStrategy for RandomTarget {
    fn select(
        &self,
        in_range: &[Candidate],
        _all_alive: &[Candidate],
        rng: &mut ChaCha8Rng,
    ) -> Option<Candidate> {
        if in_range.is_empty() {
            return None;
        }
        Some(in_range[rng.gen_range(0..in_range.len())])
    }

    fn kind(&self) -> TargetingKind {
        TargetingKind::Random
    }
}

/// Prefer the enemy with the most other live enemies within `radius`.
/// Ties, and the case where every candidate is isolated, go to the first
/// candidate.
#[derive(Debug, Clone, Copy)]
pub struct ClusterTarget {
    radius: f64,
}

impl ClusterTarget {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    fn neighbours(&self, candidate: &Candidate, all_alive: &[Candidate]) -> usize {
        let radius_sq = self.radius * self.radius;
        all_alive
            .iter()
            .filter(|other| other.id != candidate.id)
            .filter(|other| other.position.distance_squared(candidate.position) <= radius_sq)
            .count()
    }
}

impl TargetingStrategy for ClusterTarget {
    fn select(
        &self,
        in_range: &[Candidate],
        all_alive: &[Candidate],
        _rng: &mut ChaCha8Rng,
    ) -> Option<Candidate> {
        let mut best: Option<(usize, Candidate)> = None;
        for candidate in in_range {
            let count = self.neighbours(candidate, all_alive);
            if best.map_or(true, |(best_count, _)| count > best_count) {
                best = Some((count, *candidate));
            }
        }
        best.map(|(_, candidate)| candidate)
    }

    fn kind(&self) -> TargetingKind {
        TargetingKind::Cluster
    }
}
