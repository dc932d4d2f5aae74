use crate::physics::{Body, BodyDescriptor, BodyProvider, BodyShape};
use glam::Vec3;
use std::f32::consts::FRAC_PI_4;
use tracing::debug;

pub const WALL_THICKNESS: f32 = 1.0;
pub const WALL_HEIGHT: f32 = 5.0;

/// Static colliders enclosing the arena.
#[derive(Debug)]
pub struct Border {
    width: f32,
    height: f32,
    ground: Box<dyn Body>,
    ceiling: Option<Box<dyn Body>>,
    walls: Vec<Box<dyn Body>>,
    corners: Vec<Box<dyn Body>>,
}

impl Border {
    /// Build ground, optional ceiling, four walls and four diagonal corner fillers.
    pub fn build(provider: &mut dyn BodyProvider, width: f32, height: f32, with_ceiling: bool) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let wall_y = WALL_HEIGHT / 2.0;

        let slab = |w: f32, d: f32| BodyShape::Box {
            width: w,
            height: WALL_THICKNESS,
            depth: d,
        };
        let wall = |w: f32, d: f32| BodyShape::Box {
            width: w,
            height: WALL_HEIGHT,
            depth: d,
        };

        let ground = provider.create_body(
            &BodyDescriptor::fixed("ground", slab(width, height), Vec3::new(0.0, -WALL_THICKNESS / 2.0, 0.0))
                .with_restitution(0.0),
        );

        let ceiling = with_ceiling.then(|| {
            provider.create_body(&BodyDescriptor::fixed(
                "ceiling",
                slab(width, height),
                Vec3::new(0.0, WALL_HEIGHT + WALL_THICKNESS / 2.0, 0.0),
            ))
        });

        let walls = vec![
            provider.create_body(&BodyDescriptor::fixed(
                "wall_north",
                wall(width, WALL_THICKNESS),
                Vec3::new(0.0, wall_y, half_h + WALL_THICKNESS / 2.0),
            )),
            provider.create_body(&BodyDescriptor::fixed(
                "wall_south",
                wall(width, WALL_THICKNESS),
                Vec3::new(0.0, wall_y, -half_h - WALL_THICKNESS / 2.0),
            )),
            provider.create_body(&BodyDescriptor::fixed(
                "wall_east",
                wall(WALL_THICKNESS, height),
                Vec3::new(half_w + WALL_THICKNESS / 2.0, wall_y, 0.0),
            )),
            provider.create_body(&BodyDescriptor::fixed(
                "wall_west",
                wall(WALL_THICKNESS, height),
                Vec3::new(-half_w - WALL_THICKNESS / 2.0, wall_y, 0.0),
            )),
        ];

        // corner fillers cut each corner at 45 degrees so creatures slide off
        let corner_length = 4.0 * WALL_THICKNESS;
        let corners = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
            .into_iter()
            .enumerate()
            .map(|(i, (sx, sz))| {
                let yaw = if sx * sz > 0.0 { -FRAC_PI_4 } else { FRAC_PI_4 };
                provider.create_body(
                    &BodyDescriptor::fixed(
                        format!("corner_{i}"),
                        wall(corner_length, WALL_THICKNESS),
                        Vec3::new(sx * (half_w - WALL_THICKNESS), wall_y, sz * (half_h - WALL_THICKNESS)),
                    )
                    .with_yaw(yaw),
                )
            })
            .collect();

        debug!(
            "[BORDER] built {}x{} arena (ceiling: {})",
            width, height, with_ceiling
        );

        Self {
            width,
            height,
            ground,
            ceiling,
            walls,
            corners,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn has_ceiling(&self) -> bool {
        self.ceiling.is_some()
    }

    /// Number of static bodies making up the border
    pub fn collider_count(&self) -> usize {
        1 + usize::from(self.ceiling.is_some()) + self.walls.len() + self.corners.len()
    }

    /// Whether `point` lies on the floor inside the walls.
    pub fn contains(&self, point: Vec3) -> bool {
        point.x.abs() <= self.width / 2.0 && point.z.abs() <= self.height / 2.0
    }

    pub fn dispose(mut self) {
        self.ground.dispose();
        if let Some(ceiling) = self.ceiling.as_mut() {
            ceiling.dispose();
        }
        for body in self.walls.iter_mut().chain(self.corners.iter_mut()) {
            body.dispose();
        }
        debug!("[BORDER] disposed {}x{} arena", self.width, self.height);
    }
}
