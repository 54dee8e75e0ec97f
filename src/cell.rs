//! The deformable cell.
//!
//! A cell is a closed ring of [`BoundaryNode`]s around a moving center. Each
//! tick every node takes one impulse step, the centroid offset is recomputed
//! as the mean of all node positions, and the center follows a fraction of
//! that offset. Everything drawn inside the cell is placed from the center
//! and the centroid offset.

use glam::Vec2;
use rand::Rng;

use crate::config::CellConfig;
use crate::error::ConfigError;
use crate::node::BoundaryNode;
use crate::particles::FillParticle;
use crate::path::BezierPath;
use crate::render::{
    Composite, Dash, Paint, Pattern, RadialGradient, RenderContext, Rgba, Shape, Stroke, Style,
};
use crate::scene::SimContext;

/// Interior particles are scattered over a square this many radii wide.
const PARTICLE_SPREAD: f32 = 1.1;

#[derive(Debug, Clone)]
pub struct Cell {
    config: CellConfig,
    center: Vec2,
    nodes: Vec<BoundaryNode>,
    centroid: Vec2,
    particles: Vec<FillParticle>,
}

impl Cell {
    /// Seed a circular cell with `4 * detail_level` nodes.
    pub fn new(config: &CellConfig, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        if config.detail_level == 0 {
            return Err(ConfigError::ZeroDetailLevel);
        }
        if config.radius <= 0.0 || !config.radius.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "cell.radius",
                value: config.radius,
            });
        }

        let count = config.node_count();
        let nodes: Vec<_> = (0..count)
            .map(|i| BoundaryNode::on_circle(i, count, config.radius, rng))
            .collect();
        let spread = config.radius * PARTICLE_SPREAD;
        let particles = (0..config.particle_count())
            .map(|_| FillParticle::random(spread, config.particle_max_size, rng))
            .collect();

        Ok(Self {
            config: *config,
            center: config.center,
            centroid: centroid_of(&nodes),
            nodes,
            particles,
        })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    #[inline]
    pub fn nodes(&self) -> &[BoundaryNode] {
        &self.nodes
    }

    /// Mean of all node positions as of the last tick.
    #[inline]
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    #[inline]
    pub fn particles(&self) -> &[FillParticle] {
        &self.particles
    }

    /// Run one tick: step every node, recompute the centroid, follow it and clamp.
    pub fn propagate(&mut self, ctx: &SimContext, rng: &mut impl Rng) {
        let center = self.center;
        for node in &mut self.nodes {
            *node = node.propagate(center, ctx.target, &self.config.impulse, rng);
        }
        self.centroid = centroid_of(&self.nodes);
        self.center = ctx
            .surface
            .clamp(self.center + self.centroid * self.config.follow_rate);
    }

    /// The closed outline in surface coordinates.
    pub fn path(&self) -> BezierPath {
        BezierPath::closed_through(&self.nodes, self.center)
    }

    /// Absolute draw position of every interior particle.
    pub fn particle_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        let max = self.config.particle_max_size;
        self.particles
            .iter()
            .map(move |p| p.position(self.center, self.centroid, max))
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        let textures = ctx.textures;
        let path = self.path();
        let outline = Shape::Path(&path);
        let radius = self.config.radius;

        ctx.canvas.stroke(
            &outline,
            &Paint::Solid(Rgba::new(20, 50, 0, 0.35)),
            &Stroke::dashed(12.0, Dash { on: 1.0, off: 4.0, offset: 2.0 }),
            &Style::default(),
        );

        let cytoplasm = &textures.cytoplasm;
        let half_tile = Vec2::new(cytoplasm.width() as f32, cytoplasm.height() as f32) / 2.0;
        let pattern = Pattern::new(cytoplasm)
            .with_origin(half_tile)
            .with_scale(Vec2::ONE + self.centroid / 50.0);
        ctx.canvas.fill(
            &outline,
            &Paint::Pattern(pattern),
            &Style::default()
                .with_alpha(0.6)
                .with_composite(Composite::Multiply)
                .with_blur(3.0),
        );

        let gradient = RadialGradient {
            center: self.center,
            inner_radius: radius / 1.7,
            outer_radius: radius * 1.2,
            inner: Rgba::new(100, 255, 50, 0.1),
            outer: Rgba::new(100, 150, 50, 0.5),
        };
        ctx.canvas.fill(&outline, &Paint::Radial(gradient), &Style::default());

        ctx.canvas.stroke(
            &outline,
            &Paint::Solid(Rgba::new(10, 150, 0, 0.5)),
            &Stroke::solid(4.0),
            &Style::default(),
        );
        ctx.canvas.stroke(
            &outline,
            &Paint::Pattern(Pattern::new(&textures.background)),
            &Stroke::solid(2.0),
            &Style::default(),
        );

        ctx.canvas.fill(
            &Shape::Circle {
                center: self.center + self.centroid,
                radius: radius / 7.0,
            },
            &Paint::Solid(Rgba::new(20, 60, 50, 0.7)),
            &Style::default().with_blur(3.0),
        );

        let max = self.config.particle_max_size;
        for (particle, center) in self.particles.iter().zip(self.particle_positions()) {
            ctx.canvas.fill(
                &Shape::Circle { center, radius: particle.size() },
                &Paint::Solid(particle.color()),
                &Style::default().with_alpha(particle.alpha(max)),
            );
        }
    }

    /// Control-point tangents, the centroid vector and every node's offset from rest.
    pub fn render_debug(&self, ctx: &mut RenderContext<'_>) {
        let path = self.path();
        let thin = Stroke::solid(1.0);
        let style = Style::default();
        let mut line = |from: Vec2, to: Vec2, color: Rgba| {
            ctx.canvas
                .stroke(&Shape::Line { from, to }, &Paint::Solid(color), &thin, &style);
        };

        let pink = Rgba::new(255, 192, 203, 1.0);
        for (from, segment) in path.iter_spans() {
            line(from, segment.control1, pink);
        }
        let red = Rgba::new(255, 0, 0, 1.0);
        for segment in path.segments() {
            line(segment.end, segment.control2, red);
        }
        line(
            self.center,
            self.center + self.centroid * 5.0,
            Rgba::new(0, 0, 255, 1.0),
        );
        let lime = Rgba::new(0, 255, 0, 1.0);
        for node in &self.nodes {
            line(self.center + node.position(), self.center + node.rest(), lime);
        }
    }
}

/// Arithmetic mean of every node position.
pub fn centroid_of(nodes: &[BoundaryNode]) -> Vec2 {
    if nodes.is_empty() {
        return Vec2::ZERO;
    }
    nodes.iter().map(BoundaryNode::position).sum::<Vec2>() / nodes.len() as f32
}
