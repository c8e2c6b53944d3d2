use std::collections::HashMap;

use super::store::GraphStore;

/// Alpha target held while a drag is in progress, matching the classic
/// d3 `alphaTarget(0.3).restart()` drag cycle.
const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Golden angle, used to fan out default placements so new bodies never
/// spawn on top of each other.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Tunables for the force model. Defaults mirror the classic simulation
/// this engine replaces: strongly repulsive charge (-400), short link
/// rest length, gentle centering.
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
	pub link_distance: f64,
	pub link_strength: f64,
	pub charge_strength: f64,
	pub center_strength: f64,
	/// Fraction of velocity lost per step (0.0 = frictionless).
	pub velocity_decay: f64,
	/// Clamp to keep near-coincident bodies from exploding.
	pub max_velocity: f64,
	/// Distances below this are treated as this (no force singularities).
	pub min_distance: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			link_distance: 30.0,
			link_strength: 0.8,
			charge_strength: -400.0,
			center_strength: 0.8,
			velocity_decay: 0.4,
			max_velocity: 250.0,
			min_distance: 1.0,
			alpha_min: 0.001,
			alpha_decay: 0.05,
		}
	}
}

/// A simulated body. Position is owned here, not in the store; `pinned`
/// overrides the simulated position while a drag holds the node.
#[derive(Clone, Debug)]
pub struct Body {
	pub id: String,
	pub x: f64,
	pub y: f64,
	vx: f64,
	vy: f64,
	pinned: Option<(f64, f64)>,
}

/// Incremental force-directed layout over the store's node set.
///
/// Temperature is the d3-style alpha: `step` integrates forces scaled by
/// alpha, then decays alpha toward `alpha_target`. The engine is cold
/// (inert) once both drop below `alpha_min`; `reheat` makes it hot again
/// at any time, and `hold_hot`/`cool` bracket a drag interaction.
#[derive(Debug)]
pub struct LayoutEngine {
	bodies: Vec<Body>,
	index: HashMap<String, usize>,
	links: Vec<(usize, usize)>,
	center: (f64, f64),
	params: LayoutParams,
	alpha: f64,
	alpha_target: f64,
}

impl LayoutEngine {
	pub fn new(center: (f64, f64), params: LayoutParams) -> Self {
		Self {
			bodies: Vec::new(),
			index: HashMap::new(),
			links: Vec::new(),
			center,
			params,
			alpha: 0.0,
			alpha_target: 0.0,
		}
	}

	/// Adopt the store's current node/edge set: create bodies for nodes the
	/// engine has not seen and rebuild the link list. Existing bodies keep
	/// their positions; a new body spawns near an already-placed neighbor
	/// when one exists, else fanned out around the center. Duplicate store
	/// edges contribute duplicate springs, as in the original simulation.
	pub fn sync(&mut self, store: &GraphStore) {
		for record in store.nodes() {
			if self.index.contains_key(&record.id) {
				continue;
			}
			let seq = self.bodies.len();
			let anchor = store
				.edges()
				.iter()
				.filter_map(|e| {
					if e.source == record.id {
						self.position(&e.target)
					} else if e.target == record.id {
						self.position(&e.source)
					} else {
						None
					}
				})
				.next();
			let angle = seq as f64 * GOLDEN_ANGLE;
			let (x, y) = match anchor {
				Some((ax, ay)) => (
					ax + self.params.link_distance * angle.cos(),
					ay + self.params.link_distance * angle.sin(),
				),
				None => (
					self.center.0 + 120.0 * angle.cos(),
					self.center.1 + 120.0 * angle.sin(),
				),
			};
			self.index.insert(record.id.clone(), seq);
			self.bodies.push(Body {
				id: record.id.clone(),
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				pinned: None,
			});
		}

		self.links = store
			.edges()
			.iter()
			.filter_map(|e| {
				Some((
					*self.index.get(e.source.as_str())?,
					*self.index.get(e.target.as_str())?,
				))
			})
			.collect();
	}

	/// Advance one integration step. Returns false without touching any
	/// position when the engine is cold.
	pub fn step(&mut self, dt: f64) -> bool {
		if !self.is_hot() || self.bodies.is_empty() {
			return false;
		}
		let dt = dt.min(0.05);
		let forces = self.accumulate_forces();

		for (body, (fx, fy)) in self.bodies.iter_mut().zip(forces) {
			if let Some((px, py)) = body.pinned {
				body.x = px;
				body.y = py;
				body.vx = 0.0;
				body.vy = 0.0;
				continue;
			}
			body.vx = (body.vx + fx * dt) * (1.0 - self.params.velocity_decay);
			body.vy = (body.vy + fy * dt) * (1.0 - self.params.velocity_decay);
			let speed = (body.vx * body.vx + body.vy * body.vy).sqrt();
			if speed > self.params.max_velocity {
				let scale = self.params.max_velocity / speed;
				body.vx *= scale;
				body.vy *= scale;
			}
			body.x += body.vx * dt;
			body.y += body.vy * dt;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		true
	}

	fn accumulate_forces(&self) -> Vec<(f64, f64)> {
		let n = self.bodies.len();
		let alpha = self.alpha;
		let mut forces = vec![(0.0, 0.0); n];

		// Charge repulsion between all pairs, magnitude |charge| / d^2.
		for i in 0..n {
			for j in (i + 1)..n {
				let dx = self.bodies[i].x - self.bodies[j].x;
				let dy = self.bodies[i].y - self.bodies[j].y;
				let dist = (dx * dx + dy * dy)
					.sqrt()
					.max(self.params.min_distance);
				let mag = -self.params.charge_strength * alpha / (dist * dist);
				let (ux, uy) = (dx / dist, dy / dist);
				forces[i].0 += ux * mag;
				forces[i].1 += uy * mag;
				forces[j].0 -= ux * mag;
				forces[j].1 -= uy * mag;
			}
		}

		// Link springs toward the rest length.
		for &(s, t) in &self.links {
			if s == t {
				continue;
			}
			let dx = self.bodies[t].x - self.bodies[s].x;
			let dy = self.bodies[t].y - self.bodies[s].y;
			let dist = (dx * dx + dy * dy)
				.sqrt()
				.max(self.params.min_distance);
			let stretch = dist - self.params.link_distance;
			let mag = stretch * self.params.link_strength * alpha;
			let (ux, uy) = (dx / dist, dy / dist);
			forces[s].0 += ux * mag;
			forces[s].1 += uy * mag;
			forces[t].0 -= ux * mag;
			forces[t].1 -= uy * mag;
		}

		// Gentle pull toward the canvas center to stop drift.
		for (i, body) in self.bodies.iter().enumerate() {
			forces[i].0 += (self.center.0 - body.x) * self.params.center_strength * alpha;
			forces[i].1 += (self.center.1 - body.y) * self.params.center_strength * alpha;
		}

		forces
	}

	/// Raise the temperature so the layout resumes visible motion. Called
	/// after every structural merge and at drag start.
	pub fn reheat(&mut self, energy: f64) {
		self.alpha = self.alpha.max(energy.clamp(0.0, 1.0));
	}

	/// Keep alpha from decaying below the drag floor for the duration of
	/// an interactive drag.
	pub fn hold_hot(&mut self) {
		self.alpha_target = DRAG_ALPHA_TARGET;
		self.reheat(DRAG_ALPHA_TARGET);
	}

	/// Let the temperature decay back toward zero; the layout settles.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn is_hot(&self) -> bool {
		self.alpha >= self.params.alpha_min || self.alpha_target >= self.params.alpha_min
	}

	/// Fix a node's position; it becomes an immovable anchor until unpinned.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		if let Some(&i) = self.index.get(id) {
			let body = &mut self.bodies[i];
			body.pinned = Some((x, y));
			body.x = x;
			body.y = y;
			body.vx = 0.0;
			body.vy = 0.0;
		}
	}

	pub fn unpin(&mut self, id: &str) {
		if let Some(&i) = self.index.get(id) {
			self.bodies[i].pinned = None;
		}
	}

	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.index
			.get(id)
			.map(|&i| (self.bodies[i].x, self.bodies[i].y))
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}
}
