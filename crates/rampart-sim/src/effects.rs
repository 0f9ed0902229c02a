//! Effect decoration for enemies.
//!
//! An enemy in the live collection is an [`EnemyNode`]: either the bare
//! enemy or a [`Decorator`] wrapping another node. Each layer carries one
//! effect and an optional countdown. The chain never holds two layers of the
//! same kind; decorating again refreshes the existing layer instead.

use rampart_core::constants::{
    SLOWDOWN_DURATION, SLOWDOWN_FACTOR, SLOWDOWN_PRIORITY, SYNERGY_PRIORITY,
};
use rampart_core::deferred::Keyed;
use rampart_core::enums::EffectKind;
use rampart_core::types::{EnemyId, Point};

use crate::enemy::Enemy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Multiply the speed by `factor`.
    SlowDown { factor: f64 },
    /// Walk at the average of the own base speed and the partner's.
    SynergeticMovement { partner_speed: f64 },
}

impl Effect {
    pub fn slow_down() -> Self {
        Effect::SlowDown {
            factor: SLOWDOWN_FACTOR,
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::SlowDown { .. } => EffectKind::SlowDown,
            Effect::SynergeticMovement { .. } => EffectKind::SynergeticMovement,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Effect::SlowDown { .. } => SLOWDOWN_PRIORITY,
            Effect::SynergeticMovement { .. } => SYNERGY_PRIORITY,
        }
    }

    /// Default lifetime of a fresh layer. `None` lasts until stripped.
    pub fn default_duration(&self) -> Option<f64> {
        match self {
            Effect::SlowDown { .. } => Some(SLOWDOWN_DURATION),
            Effect::SynergeticMovement { .. } => None,
        }
    }

    fn apply(&self, base_speed: f64, speed: f64) -> f64 {
        match *self {
            Effect::SlowDown { factor } => speed * factor,
            Effect::SynergeticMovement { partner_speed } => (base_speed + partner_speed) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    inner: Box<EnemyNode>,
    effect: Effect,
    remaining: Option<f64>,
    priority: u8,
}

impl Decorator {
    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn remaining(&self) -> Option<f64> {
        self.remaining
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnemyNode {
    Bare(Enemy),
    Decorated(Decorator),
}

impl EnemyNode {
    /// The innermost enemy.
    pub fn enemy(&self) -> &Enemy {
        match self {
            EnemyNode::Bare(enemy) => enemy,
            EnemyNode::Decorated(decorator) => decorator.inner.enemy(),
        }
    }

    pub fn enemy_mut(&mut self) -> &mut Enemy {
        match self {
            EnemyNode::Bare(enemy) => enemy,
            EnemyNode::Decorated(decorator) => decorator.inner.enemy_mut(),
        }
    }

    /// Drop every layer and return the wrapped enemy.
    pub fn into_enemy(self) -> Enemy {
        match self {
            EnemyNode::Bare(enemy) => enemy,
            EnemyNode::Decorated(decorator) => decorator.inner.into_enemy(),
        }
    }

    pub fn is_decorated(&self) -> bool {
        matches!(self, EnemyNode::Decorated(_))
    }

    /// Layers from outermost to innermost.
    pub fn layers(&self) -> Vec<&Decorator> {
        let mut layers = Vec::new();
        let mut node = self;
        while let EnemyNode::Decorated(decorator) = node {
            layers.push(decorator);
            node = &*decorator.inner;
        }
        layers
    }

    pub fn effects(&self) -> Vec<EffectKind> {
        self.layers().iter().map(|d| d.effect.kind()).collect()
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.layers().iter().any(|d| d.effect.kind() == kind)
    }

    /// Wrap in a new layer, or refresh the existing layer of the same kind.
    pub fn decorate(mut self, effect: Effect, duration: Option<f64>) -> Self {
        if let Some(layer) = self.layer_mut(effect.kind()) {
            layer.effect = effect;
            layer.remaining = duration;
            return self;
        }
        EnemyNode::Decorated(Decorator {
            inner: Box::new(self),
            effect,
            remaining: duration,
            priority: effect.priority(),
        })
    }

    /// Remove the layer of `kind`, keeping the others in order. A missing
    /// kind leaves the node unchanged.
    pub fn strip(self, kind: EffectKind) -> Self {
        self.retain_layers(|effect, _| effect.kind() != kind)
    }

    /// Remove every layer whose countdown has run out.
    pub fn strip_expired(self) -> Self {
        self.retain_layers(|_, remaining| !remaining.is_some_and(|secs| secs <= 0.0))
    }

    /// Count down every timed layer. Returns true if any layer expired.
    pub fn tick_effects(&mut self, dt: f64) -> bool {
        let mut expired = false;
        let mut node = self;
        while let EnemyNode::Decorated(decorator) = node {
            if let Some(secs) = decorator.remaining.as_mut() {
                *secs -= dt;
                expired |= *secs <= 0.0;
            }
            node = &mut *decorator.inner;
        }
        expired
    }

    /// Speed after folding every layer, highest priority first.
    pub fn effective_speed(&self) -> f64 {
        let base = f64::from(self.enemy().base_speed());
        let mut layers = self.layers();
        layers.sort_by(|a, b| b.priority.cmp(&a.priority));
        layers
            .iter()
            .fold(base, |speed, layer| layer.effect.apply(base, speed))
    }

    /// Move the innermost enemy at the effective speed.
    pub fn advance(&mut self, dt: f64, path: &[Point]) {
        let speed = self.effective_speed();
        self.enemy_mut().advance(speed, dt, path);
    }

    pub fn predict_position(&self, secs: f64, path: &[Point]) -> Point {
        self.enemy()
            .predict_position(self.effective_speed(), secs, path)
    }

    fn layer_mut(&mut self, kind: EffectKind) -> Option<&mut Decorator> {
        match self {
            EnemyNode::Bare(_) => None,
            EnemyNode::Decorated(decorator) => {
                if decorator.effect.kind() == kind {
                    Some(decorator)
                } else {
                    decorator.inner.layer_mut(kind)
                }
            }
        }
    }

    fn retain_layers(self, keep: impl Fn(&Effect, Option<f64>) -> bool) -> Self {
        let mut kept = Vec::new();
        let mut node = self;
        let enemy = loop {
            match node {
                EnemyNode::Bare(enemy) => break enemy,
                EnemyNode::Decorated(decorator) => {
                    if keep(&decorator.effect, decorator.remaining) {
                        kept.push((decorator.effect, decorator.remaining, decorator.priority));
                    }
                    node = *decorator.inner;
                }
            }
        };
        // Rebuild innermost first so surviving layers keep their order.
        kept.into_iter()
            .rev()
            .fold(EnemyNode::Bare(enemy), |inner, (effect, remaining, priority)| {
                EnemyNode::Decorated(Decorator {
                    inner: Box::new(inner),
                    effect,
                    remaining,
                    priority,
                })
            })
    }
}

impl From<Enemy> for EnemyNode {
    fn from(enemy: Enemy) -> Self {
        EnemyNode::Bare(enemy)
    }
}

impl Keyed for EnemyNode {
    type Key = EnemyId;

    fn key(&self) -> EnemyId {
        self.enemy().id()
    }
}
