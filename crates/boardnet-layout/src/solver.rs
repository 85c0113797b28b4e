//! Fruchterman-Reingold force-directed layout.
//!
//! # Algorithm
//!
//! Each step:
//!
//! 1. **Repulsion** between every node pair: `repulsion / d²` along the
//!    pair axis. Coincident nodes use [`MIN_DISTANCE`] and a fixed
//!    pair-dependent direction so the result stays deterministic.
//! 2. **Attraction** along every edge: `attraction * weight * d`, where
//!    `weight` is the edge strength (times confidence when
//!    `confidence_weighting` is on).
//! 3. Each node moves along its net force by at most the current
//!    temperature and at most `max_displacement`.
//! 4. The temperature follows the configured [`DampingSchedule`] from
//!    `initial_temperature` toward zero over the iteration budget.
//!
//! The solver is a resumable step function: [`ForceLayout::step`] advances
//! a caller-owned [`LayoutState`] by one iteration, so a scheduler can drive
//! it in slices. [`ForceLayout::run`] and [`ForceLayout::run_until`] drive
//! it to completion.
//!
//! # Determinism
//!
//! Initial positions come from a `StdRng` seeded with `config.seed`, nodes
//! are visited in graph insertion order, and no hash-ordered collection is
//! involved in the arithmetic. Same seed, graph, and configuration give
//! bit-identical output.
//!
//! [`DampingSchedule`]: boardnet_core::DampingSchedule

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::time::{Duration, Instant};

use boardnet_core::{BoardGraph, ConfigError, LayoutConfig, NodeId, Position};
use nalgebra::Vector3;
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{ComputationTimeout, LayoutError};

/// Distance floor used in place of zero to avoid dividing by zero.
pub const MIN_DISTANCE: f64 = 1e-6;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

type Vec3 = Vector3<f64>;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Output of a layout run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Final node positions, centered on the origin.
    pub positions: BTreeMap<NodeId, Position>,
    pub dimensions: u8,
    /// Steps actually executed.
    pub iterations_run: usize,
    /// Whether the run stopped early on `convergence_epsilon`.
    pub converged: bool,
    /// Whether the run was cut short by the time budget.
    pub timed_out: bool,
}

/// Outcome of a single [`ForceLayout::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// More iterations remain.
    Continue,
    /// Total displacement fell below `convergence_epsilon`.
    Converged,
    /// The iteration budget is exhausted.
    Finished,
}

/// Mutable simulation state, owned by the caller between steps.
#[derive(Debug, Clone)]
pub struct LayoutState {
    positions: Vec<Vec3>,
    iteration: usize,
    last_displacement: f64,
    converged: bool,
}

impl LayoutState {
    /// Completed iterations.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Sum of node displacement magnitudes in the last step.
    #[must_use]
    pub const fn last_displacement(&self) -> f64 {
        self.last_displacement
    }

    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// One spring per edge with non-zero weight.
#[derive(Debug, Clone, Copy)]
struct Spring {
    a: usize,
    b: usize,
    weight: f64,
}

/// Force-directed layout solver bound to one graph and configuration.
#[derive(Debug)]
pub struct ForceLayout<'g> {
    graph: &'g BoardGraph,
    config: LayoutConfig,
    springs: Vec<Spring>,
}

impl<'g> ForceLayout<'g> {
    /// Prepare a solver for `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(graph: &'g BoardGraph, config: &LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let g = graph.petgraph();
        let springs = g
            .edge_references()
            .filter_map(|e| {
                let edge = e.weight();
                let weight = if config.confidence_weighting {
                    edge.strength * edge.confidence
                } else {
                    edge.strength
                };
                (weight > 0.0).then(|| Spring {
                    a: e.source().index(),
                    b: e.target().index(),
                    weight,
                })
            })
            .collect();

        Ok(Self {
            graph,
            config: config.clone(),
            springs,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    const fn is_3d(&self) -> bool {
        self.config.dimensions == 3
    }

    /// Seeded pseudo-random positions inside a cube of side `bounds`.
    #[must_use]
    pub fn initial_state(&self) -> LayoutState {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let half = self.config.bounds / 2.0;
        let positions = (0..self.graph.node_count())
            .map(|_| {
                let x = rng.gen_range(-half..half);
                let y = rng.gen_range(-half..half);
                let z = if self.is_3d() {
                    rng.gen_range(-half..half)
                } else {
                    0.0
                };
                Vec3::new(x, y, z)
            })
            .collect();
        Self::fresh(positions)
    }

    /// Start from caller-supplied positions (e.g. a cached layout).
    ///
    /// Nodes missing from `seed_positions` fall back to seeded random
    /// placement. In 2D the `z` coordinate is discarded.
    #[must_use]
    pub fn state_from_positions(&self, seed_positions: &BTreeMap<NodeId, Position>) -> LayoutState {
        let mut state = self.initial_state();
        for (idx, node) in self.graph.all_nodes().enumerate() {
            if let Some(p) = seed_positions.get(&node.id) {
                let z = if self.is_3d() { p.z } else { 0.0 };
                state.positions[idx] = Vec3::new(p.x, p.y, z);
            }
        }
        state
    }

    const fn fresh(positions: Vec<Vec3>) -> LayoutState {
        LayoutState {
            positions,
            iteration: 0,
            last_displacement: f64::INFINITY,
            converged: false,
        }
    }

    /// Advance `state` by one iteration.
    pub fn step(&self, state: &mut LayoutState) -> StepStatus {
        let total = self.config.iterations;
        if state.converged {
            return StepStatus::Converged;
        }
        if state.iteration >= total {
            return StepStatus::Finished;
        }

        let temperature =
            self.config
                .damping
                .temperature(self.config.initial_temperature, state.iteration, total);
        let cap = temperature.min(self.config.max_displacement);

        let forces = self.net_forces(&state.positions);

        let mut moved = 0.0;
        for (pos, force) in state.positions.iter_mut().zip(forces) {
            let len = force.norm();
            if len <= 0.0 || !len.is_finite() {
                continue;
            }
            let step = force * (len.min(cap) / len);
            *pos += step;
            moved += step.norm();
        }

        state.iteration += 1;
        state.last_displacement = moved;

        if let Some(eps) = self.config.convergence_epsilon {
            if moved < eps {
                state.converged = true;
                return StepStatus::Converged;
            }
        }
        if state.iteration >= total {
            StepStatus::Finished
        } else {
            StepStatus::Continue
        }
    }

    /// Net force on every node for the given positions.
    fn net_forces(&self, positions: &[Vec3]) -> Vec<Vec3> {
        let n = positions.len();
        let mut forces = vec![Vec3::zeros(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let mut delta = positions[i] - positions[j];
                let mut dist = delta.norm();
                if dist < MIN_DISTANCE {
                    delta = self.separation_axis(i, j) * MIN_DISTANCE;
                    dist = MIN_DISTANCE;
                }
                let magnitude = self.config.repulsion / (dist * dist);
                let push = delta * (magnitude / dist);
                forces[i] += push;
                forces[j] -= push;
            }
        }

        for spring in &self.springs {
            let delta = positions[spring.a] - positions[spring.b];
            let dist = delta.norm();
            if dist < MIN_DISTANCE {
                continue;
            }
            let magnitude = self.config.attraction * spring.weight * dist;
            let pull = delta * (magnitude / dist);
            forces[spring.a] -= pull;
            forces[spring.b] += pull;
        }

        forces
    }

    /// Fixed unit direction for separating coincident nodes `i < j`.
    #[allow(clippy::cast_precision_loss)]
    fn separation_axis(&self, i: usize, j: usize) -> Vec3 {
        // Golden-angle spacing keeps distinct pairs on distinct axes.
        let theta = ((i * 31 + j * 17) as f64 * GOLDEN_ANGLE) % TAU;
        if self.is_3d() {
            let phi = ((i + j) as f64 * 0.618_033_988_749_895).fract() * PI;
            Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
        } else {
            Vec3::new(theta.cos(), theta.sin(), 0.0)
        }
    }

    /// Snapshot `state` as a [`LayoutResult`], centered on the origin.
    #[must_use]
    pub fn snapshot(&self, state: &LayoutState, timed_out: bool) -> LayoutResult {
        let n = state.positions.len();
        #[allow(clippy::cast_precision_loss)]
        let centroid = if n == 0 {
            Vec3::zeros()
        } else {
            state.positions.iter().fold(Vec3::zeros(), |acc, p| acc + p) / n as f64
        };

        let positions = self
            .graph
            .all_nodes()
            .zip(&state.positions)
            .map(|(node, p)| {
                let c = p - centroid;
                let z = if self.is_3d() { c.z } else { 0.0 };
                (node.id.clone(), Position::new(c.x, c.y, z))
            })
            .collect();

        LayoutResult {
            positions,
            dimensions: self.config.dimensions,
            iterations_run: state.iteration,
            converged: state.converged,
            timed_out,
        }
    }

    /// Run the full iteration budget (or until early convergence).
    #[must_use]
    #[instrument(skip(self), fields(nodes = self.graph.node_count(), iterations = self.config.iterations))]
    pub fn run(&self) -> LayoutResult {
        let mut state = self.initial_state();
        while self.step(&mut state) == StepStatus::Continue {}
        debug!(
            iterations = state.iteration,
            converged = state.converged,
            "layout finished"
        );
        self.snapshot(&state, false)
    }

    /// Whether `state` has nothing left to run.
    #[must_use]
    pub const fn is_done(&self, state: &LayoutState) -> bool {
        state.converged || state.iteration >= self.config.iterations
    }

    /// Run from `state` until done or until `deadline` passes.
    ///
    /// The deadline is checked before every step that would still run, so a
    /// finished state never times out.
    ///
    /// # Errors
    ///
    /// Returns [`ComputationTimeout`] carrying the best partial layout if
    /// the deadline passes first.
    pub fn run_until(
        &self,
        mut state: LayoutState,
        deadline: Option<Instant>,
    ) -> Result<LayoutResult, ComputationTimeout> {
        let started = Instant::now();
        while !self.is_done(&state) {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let partial = self.snapshot(&state, true);
                warn!(
                    completed = state.iteration,
                    budget = self.config.iterations,
                    "layout time budget exceeded"
                );
                return Err(ComputationTimeout {
                    elapsed: started.elapsed(),
                    completed_iterations: state.iteration,
                    partial: Box::new(partial),
                });
            }
            self.step(&mut state);
        }
        Ok(self.snapshot(&state, false))
    }
}

/// Lay out `graph` with `config`, honoring `config.time_budget_ms`.
///
/// # Errors
///
/// Returns [`LayoutError::Config`] for an invalid configuration and
/// [`LayoutError::Timeout`] (with the partial layout) when the time budget
/// runs out.
#[instrument(skip_all, fields(nodes = graph.node_count(), seed = config.seed))]
pub fn solve(graph: &BoardGraph, config: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
    let layout = ForceLayout::new(graph, config)?;
    let deadline = config
        .time_budget_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let state = layout.initial_state();
    Ok(layout.run_until(state, deadline)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
