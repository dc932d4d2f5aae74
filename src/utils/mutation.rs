use glam::Vec3;
use rand::Rng;

/// Bounded random perturbation of a value.
///
/// A scalar moves by `sign * U(0, rate)` with a fair sign, so the result lies in
/// `[value - rate, value + rate)`. Vectors jitter each component with the same
/// rate. Composites (see [`crate::organisms::CreatureConfiguration`]) recurse per
/// field, scaling the rate by the field's own value when the field is numeric.
pub trait Mutate: Sized {
    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Self;
}

impl Mutate for f32 {
    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Self {
        let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        // gen::<f32>() is in [0, 1) and tolerates a zero rate
        self + sign * rng.gen::<f32>() * rate
    }
}

impl Mutate for Vec3 {
    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Self {
        Vec3::new(
            self.x.mutate(rate, rng),
            self.y.mutate(rate, rng),
            self.z.mutate(rate, rng),
        )
    }
}
