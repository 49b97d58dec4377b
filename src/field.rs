use crate::graphics::{Stroke, Surface};
use crate::math::{connection_alpha, distance};
use crate::particle::Particle;
use crate::state::PointerState;
use crate::theme::{Theme, ThemeConfig};
use rand::rngs::StdRng;
use tracing::debug;

/// What a single frame drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    /// Connecting lines stroked, self-pairs excluded
    pub connections: usize,
}

/// The set of particles for one theme and viewport size
pub struct ParticleField {
    theme: Theme,
    viewport: [f64; 2],
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(viewport: [f64; 2], theme: Theme, rng: StdRng) -> Self {
        let mut field = ParticleField {
            theme,
            viewport,
            particles: Vec::new(),
            rng,
        };
        field.populate();
        field
    }

    /// Throws the current particles away and builds a new set for `theme`
    /// covering `viewport`. The pointer is forgotten as well.
    pub fn reinitialize(&mut self, viewport: [f64; 2], theme: Theme, pointer: &mut PointerState) {
        self.viewport = viewport;
        self.theme = theme;
        pointer.reset();
        self.populate();
    }

    fn populate(&mut self) {
        let config = self.theme.config();
        self.particles = (0..config.particle_count)
            .map(|_| Particle::random(&mut self.rng, self.viewport, &config.palette))
            .collect();
        debug!(
            theme = %self.theme,
            width = self.viewport[0],
            height = self.viewport[1],
            particles = self.particles.len(),
            "particle field initialized"
        );
    }

    #[cfg(test)]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn viewport(&self) -> [f64; 2] {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    /// Clears the surface, moves and draws every particle, then links nearby
    /// particles
    pub fn frame<S: Surface + ?Sized>(
        &mut self,
        pointer: &PointerState,
        surface: &mut S,
    ) -> FrameStats {
        surface.clear();

        for particle in self.particles.iter_mut() {
            particle.update(pointer);
            particle.draw(surface);
        }

        let connections = self.connect(surface);
        FrameStats {
            particles: self.particles.len(),
            connections,
        }
    }

    /// Strokes a line between every pair of particles closer than the
    /// theme's connection distance
    fn connect<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        let config = self.theme.config();
        let mut drawn = 0;
        for (a, first) in self.particles.iter().enumerate() {
            for second in &self.particles[a..] {
                if let Some(stroke) = link(config, first, second) {
                    surface.stroke_line(first.position, second.position, stroke);
                    if first.position != second.position {
                        drawn += 1;
                    }
                }
            }
        }
        drawn
    }

    /// Mean distance of the particles from their base positions
    pub fn mean_residual(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(Particle::residual).sum::<f64>() / self.particles.len() as f64
    }
}

/// Stroke linking two particles, or `None` if they are too far apart
pub fn link(config: &ThemeConfig, a: &Particle, b: &Particle) -> Option<Stroke> {
    let length = distance(&a.position, &b.position);
    let alpha = connection_alpha(length, config.connection_distance, config.line_opacity)?;
    Some(Stroke {
        color: config.line_color.with_alpha(alpha),
        width: config.line_width,
    })
}
