use crate::graphics::{Rgba, Surface};
use crate::math::{direction, ease_toward, repulsion_force};
use crate::state::PointerState;
use rand::Rng;

/// A point in the field that is pushed away by the pointer and drifts back
/// to where it was created
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: [f64; 2],
    /// Rest position; never changes after creation
    pub base_position: [f64; 2],
    pub size: f64,
    /// How strongly the particle responds to the pointer
    pub density: f64,
    pub color: Rgba,
    pub speed_factor: f64,
}

impl Particle {
    /// Creates a particle at a random spot inside `viewport`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, viewport: [f64; 2], palette: &[Rgba]) -> Self {
        let position = [
            rng.gen::<f64>() * viewport[0],
            rng.gen::<f64>() * viewport[1],
        ];
        Particle {
            position,
            base_position: position,
            size: rng.gen_range(1.0..4.0),
            density: rng.gen_range(1.0..31.0),
            color: palette[rng.gen_range(0..palette.len())],
            speed_factor: rng.gen_range(0.2..0.7),
        }
    }

    /// Advances the particle by one frame.
    ///
    /// Within the pointer's influence radius the particle is pushed away from
    /// the pointer; otherwise it eases back towards its base position.
    pub fn update(&mut self, pointer: &PointerState) {
        let Some(target) = pointer.position else {
            self.return_to_base();
            return;
        };

        let (towards_pointer, distance) = direction(&self.position, &target);
        let force = repulsion_force(distance);

        if distance < pointer.radius {
            let push = force * self.density * self.speed_factor;
            self.position[0] -= towards_pointer[0] * push;
            self.position[1] -= towards_pointer[1] * push;
        } else {
            self.return_to_base();
        }
    }

    fn return_to_base(&mut self) {
        self.position[0] = ease_toward(self.position[0], self.base_position[0], self.speed_factor);
        self.position[1] = ease_toward(self.position[1], self.base_position[1], self.speed_factor);
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_circle(self.position, self.size, self.color);
    }

    /// Distance from the current position to the base position
    pub fn residual(&self) -> f64 {
        crate::math::distance(&self.position, &self.base_position)
    }
}
