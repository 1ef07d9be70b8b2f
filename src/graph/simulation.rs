//! Force-directed layout with d3-force semantics.
//!
//! Node kinematics live in this store only. Callers read positions through
//! [`LayoutSnapshot`]s and move nodes through the drag methods, never by
//! writing coordinates directly.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use super::dataset::GraphData;
use crate::error::GraphError;

const INITIAL_RADIUS: f64 = 10.0;
/// Minimum squared distance used by the many-body force
const DISTANCE_MIN2: f64 = 1.0;
/// Alpha target while a node is being dragged
const DRAG_ALPHA_TARGET: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub width: f64,
    pub height: f64,
    pub link_distance: f64,
    /// Many-body strength; negative values repel
    pub charge: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl SimulationParams {
    pub fn for_viewport(width: f64, height: f64) -> Self {
        let alpha_min = 0.001;
        Self {
            width,
            height,
            link_distance: 100.0,
            charge: -400.0,
            alpha_min,
            // Cools from 1 to alpha_min in about 300 ticks
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: Option<f64>,
    fy: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

/// Read-only position of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub pinned: bool,
}

/// Positions of every node after a given tick
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub tick: u64,
    pub alpha: f64,
    pub settled: bool,
    pub nodes: Vec<NodePosition>,
}

impl LayoutSnapshot {
    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub struct ForceSimulation {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    bodies: Vec<Body>,
    links: Vec<Link>,
    params: SimulationParams,
    alpha: f64,
    alpha_target: f64,
    /// Indices of nodes currently held by a drag
    dragging: HashSet<usize>,
    ticks: u64,
}

impl ForceSimulation {
    pub fn new(data: &GraphData, params: SimulationParams) -> Result<Self, GraphError> {
        data.validate()?;

        let ids: Vec<String> = data.nodes.iter().map(|n| n.id.clone()).collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        // Phyllotaxis arrangement around the viewport center
        let (cx, cy) = (params.width / 2.0, params.height / 2.0);
        let initial_angle = PI * (3.0 - 5f64.sqrt());
        let bodies = (0..ids.len())
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * initial_angle;
                Body {
                    x: cx + radius * angle.cos(),
                    y: cy + radius * angle.sin(),
                    ..Body::default()
                }
            })
            .collect();

        let mut degree = vec![0usize; ids.len()];
        let endpoints: Vec<(usize, usize)> = data
            .edges
            .iter()
            .map(|e| (index[&e.source], index[&e.target]))
            .collect();
        for &(s, t) in &endpoints {
            degree[s] += 1;
            degree[t] += 1;
        }
        let links = endpoints
            .into_iter()
            .map(|(source, target)| Link {
                source,
                target,
                strength: 1.0 / degree[source].min(degree[target]) as f64,
                bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
            })
            .collect();

        Ok(Self {
            ids,
            index,
            bodies,
            links,
            params,
            alpha: 1.0,
            alpha_target: 0.0,
            dragging: HashSet::new(),
            ticks: 0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True while the layout still has energy or is held warm by a drag
    pub fn is_hot(&self) -> bool {
        self.alpha >= self.params.alpha_min || self.alpha_target > self.alpha
    }

    /// Advance one step. Returns whether the simulation is still hot.
    pub fn tick(&mut self) -> bool {
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.ticks += 1;

        self.apply_links();
        self.apply_many_body();
        self.apply_center();

        let keep = 1.0 - self.params.velocity_decay;
        for body in &mut self.bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= keep;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= keep;
                    body.y += body.vy;
                }
            }
        }

        self.is_hot()
    }

    /// Tick until cooled or `max_ticks` is reached; returns ticks taken
    pub fn run_to_rest(&mut self, max_ticks: u64) -> u64 {
        let start = self.ticks;
        while self.is_hot() && self.ticks - start < max_ticks {
            self.tick();
        }
        self.ticks - start
    }

    fn apply_links(&mut self) {
        for (k, link) in self.links.iter().enumerate() {
            let s = self.bodies[link.source];
            let t = self.bodies[link.target];
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = jiggle(k);
            }
            if y == 0.0 {
                y = jiggle(k + 1);
            }
            let len = (x * x + y * y).sqrt();
            let l = (len - self.params.link_distance) / len * self.alpha * link.strength;
            x *= l;
            y *= l;

            let target = &mut self.bodies[link.target];
            target.vx -= x * link.bias;
            target.vy -= y * link.bias;
            let source = &mut self.bodies[link.source];
            source.vx += x * (1.0 - link.bias);
            source.vy += y * (1.0 - link.bias);
        }
    }

    /// Exact all-pairs repulsion; the graph is small enough to skip
    /// Barnes-Hut approximation.
    fn apply_many_body(&mut self) {
        let strength = self.params.charge * self.alpha;
        let n = self.bodies.len();
        for i in 0..n {
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = self.bodies[j].x - self.bodies[i].x;
                let mut y = self.bodies[j].y - self.bodies[i].y;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = jiggle(i * n + j);
                    l += x * x;
                }
                if y == 0.0 {
                    y = jiggle(j * n + i);
                    l += y * y;
                }
                if l == 0.0 {
                    continue;
                }
                if l < DISTANCE_MIN2 {
                    l = (DISTANCE_MIN2 * l).sqrt();
                }
                dvx += x * strength / l;
                dvy += y * strength / l;
            }
            self.bodies[i].vx += dvx;
            self.bodies[i].vy += dvy;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f64;
        let sx = self.bodies.iter().map(|b| b.x).sum::<f64>() / n - self.params.width / 2.0;
        let sy = self.bodies.iter().map(|b| b.y).sum::<f64>() / n - self.params.height / 2.0;
        for body in &mut self.bodies {
            body.x -= sx;
            body.y -= sy;
        }
    }

    fn index_of(&self, id: &str) -> Result<usize, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// Pin a node where it currently is and warm the layout up.
    /// Starting a drag on a node that is already held changes nothing.
    pub fn drag_start(&mut self, id: &str) -> Result<(), GraphError> {
        let i = self.index_of(id)?;
        if !self.dragging.insert(i) {
            return Ok(());
        }
        let body = &mut self.bodies[i];
        body.fx = Some(body.x);
        body.fy = Some(body.y);
        self.alpha_target = DRAG_ALPHA_TARGET;
        Ok(())
    }

    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) -> Result<(), GraphError> {
        let i = self.index_of(id)?;
        let body = &mut self.bodies[i];
        body.fx = Some(x);
        body.fy = Some(y);
        Ok(())
    }

    /// Release the pin and let the layout cool again once no drag remains.
    /// Ending a drag that was never started is a no-op.
    pub fn drag_end(&mut self, id: &str) -> Result<(), GraphError> {
        let i = self.index_of(id)?;
        if !self.dragging.remove(&i) {
            return Ok(());
        }
        let body = &mut self.bodies[i];
        body.fx = None;
        body.fy = None;
        if self.dragging.is_empty() {
            self.alpha_target = 0.0;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            tick: self.ticks,
            alpha: self.alpha,
            settled: !self.is_hot(),
            nodes: self
                .ids
                .iter()
                .zip(&self.bodies)
                .map(|(id, b)| NodePosition {
                    id: id.clone(),
                    x: b.x,
                    y: b.y,
                    pinned: b.fx.is_some() || b.fy.is_some(),
                })
                .collect(),
        }
    }
}

/// Tiny deterministic offset used to separate coincident points; never zero
fn jiggle(seed: usize) -> f64 {
    let magnitude = ((seed % 7) as f64 + 1.0) * 1e-6;
    if seed % 2 == 0 { magnitude } else { -magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> ForceSimulation {
        ForceSimulation::new(
            &GraphData::research_topics(),
            SimulationParams::for_viewport(960.0, 600.0),
        )
        .unwrap()
    }

    fn distance(snapshot: &LayoutSnapshot, a: &str, b: &str) -> f64 {
        let a = snapshot.position(a).unwrap();
        let b = snapshot.position(b).unwrap();
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_cools_in_about_300_ticks() {
        let mut sim = simulation();
        let ticks = sim.run_to_rest(10_000);
        assert!(!sim.is_hot());
        assert!((295..=305).contains(&ticks), "took {ticks} ticks");
        assert!(sim.snapshot().settled);
    }

    #[test]
    fn test_layout_is_centered_and_finite() {
        let mut sim = simulation();
        sim.run_to_rest(1_000);
        let snapshot = sim.snapshot();

        let n = snapshot.nodes.len() as f64;
        let mx = snapshot.nodes.iter().map(|p| p.x).sum::<f64>() / n;
        let my = snapshot.nodes.iter().map(|p| p.y).sum::<f64>() / n;
        assert!((mx - 480.0).abs() < 1.0, "mean x {mx}");
        assert!((my - 300.0).abs() < 1.0, "mean y {my}");
        assert!(snapshot.nodes.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_repulsion_spreads_nodes() {
        let mut sim = simulation();
        let before = distance(&sim.snapshot(), "radiation", "life-support");
        sim.run_to_rest(1_000);
        let after = distance(&sim.snapshot(), "radiation", "life-support");
        assert!(after > before);

        // Unrelated topics end up further apart than a linked pair
        let linked = distance(&sim.snapshot(), "circadian", "sleep");
        assert!(after > linked);
    }

    #[test]
    fn test_drag_pins_and_release_unpins() {
        let mut sim = simulation();
        sim.run_to_rest(1_000);
        assert!(!sim.is_hot());

        sim.drag_start("sleep").unwrap();
        assert!(sim.is_hot(), "drag should reheat the layout");
        sim.drag_to("sleep", 100.0, 50.0).unwrap();
        for _ in 0..20 {
            sim.tick();
        }
        let pinned = sim.snapshot();
        let sleep = pinned.position("sleep").unwrap();
        assert!(sleep.pinned);
        assert_eq!((sleep.x, sleep.y), (100.0, 50.0));
        assert!(pinned.alpha > sim.params.alpha_min);

        sim.drag_end("sleep").unwrap();
        assert!(!sim.snapshot().position("sleep").unwrap().pinned);
        sim.run_to_rest(2_000);
        assert!(!sim.is_hot());
    }

    #[test]
    fn test_alpha_holds_near_target_while_dragging() {
        let mut sim = simulation();
        sim.drag_start("microgravity").unwrap();
        for _ in 0..2_000 {
            sim.tick();
        }
        assert!((sim.alpha() - DRAG_ALPHA_TARGET).abs() < 0.01);
        assert!(sim.is_hot());
    }

    #[test]
    fn test_unknown_node_drag() {
        let mut sim = simulation();
        assert_eq!(
            sim.drag_start("dark-matter"),
            Err(GraphError::UnknownNode("dark-matter".into()))
        );
    }

    #[test]
    fn test_jiggle_is_never_zero() {
        assert!((0..100).all(|seed| jiggle(seed) != 0.0));
    }

    #[test]
    fn test_coincident_pins_stay_finite() {
        let mut sim = simulation();
        sim.drag_start("bone-density").unwrap();
        sim.drag_start("neuroscience").unwrap();
        sim.drag_to("bone-density", 100.0, 100.0).unwrap();
        sim.drag_to("neuroscience", 100.0, 100.0).unwrap();
        sim.tick();
        sim.tick();
        sim.drag_end("bone-density").unwrap();
        sim.drag_end("neuroscience").unwrap();
        sim.run_to_rest(2_000);

        let snapshot = sim.snapshot();
        assert!(snapshot.nodes.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(distance(&snapshot, "bone-density", "neuroscience") > 1.0);
        assert!(!sim.is_hot());
    }

    #[test]
    fn test_repeated_drag_start_releases_with_one_end() {
        let mut sim = simulation();
        sim.drag_start("sleep").unwrap();
        sim.drag_start("sleep").unwrap();
        sim.drag_end("sleep").unwrap();

        let ticks = sim.run_to_rest(5_000);
        assert!(ticks < 5_000, "layout never cooled");
        assert!(!sim.is_hot());
        assert!(!sim.snapshot().position("sleep").unwrap().pinned);
    }

    #[test]
    fn test_drag_end_on_idle_node_keeps_other_drag_warm() {
        let mut sim = simulation();
        sim.drag_start("sleep").unwrap();
        sim.drag_end("radiation").unwrap();
        for _ in 0..2_000 {
            sim.tick();
        }
        assert!((sim.alpha() - DRAG_ALPHA_TARGET).abs() < 0.01);
        assert!(sim.snapshot().position("sleep").unwrap().pinned);

        sim.drag_end("sleep").unwrap();
        sim.run_to_rest(5_000);
        assert!(!sim.is_hot());
    }

    #[test]
    fn test_deterministic() {
        let mut a = simulation();
        let mut b = simulation();
        a.run_to_rest(1_000);
        b.run_to_rest(1_000);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
