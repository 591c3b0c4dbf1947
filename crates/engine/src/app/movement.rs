use super::input::{DirectionalInput, InputAction};
use super::location::{RegionSize, Vec2};
use crate::state::HeroState;

pub const HERO_SPEED_UNITS_PER_SECOND: f32 = 180.0;
pub const HERO_SPRITE_SIZE: Vec2 = Vec2 { x: 48.0, y: 48.0 };

/// Maps held directions to a per-frame position change, clamped to the active region.
///
/// Region coordinates grow right and down, so `MoveUp` decreases y. Diagonal movement is
/// intentionally not normalized: holding two axes moves √2 times faster than one.
#[derive(Debug, Clone, Copy)]
pub struct MovementController {
    speed: f32,
    sprite_size: Vec2,
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(HERO_SPEED_UNITS_PER_SECOND, HERO_SPRITE_SIZE)
    }
}

impl MovementController {
    pub fn new(speed: f32, sprite_size: Vec2) -> Self {
        Self { speed, sprite_size }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn velocity(&self, input: DirectionalInput) -> Vec2 {
        let mut x = 0.0f32;
        let mut y = 0.0f32;

        if input.is_down(InputAction::MoveRight) {
            x += 1.0;
        }
        if input.is_down(InputAction::MoveLeft) {
            x -= 1.0;
        }
        if input.is_down(InputAction::MoveDown) {
            y += 1.0;
        }
        if input.is_down(InputAction::MoveUp) {
            y -= 1.0;
        }

        Vec2 {
            x: x * self.speed,
            y: y * self.speed,
        }
    }

    pub fn clamp_to_region(&self, position: Vec2, region: RegionSize) -> Vec2 {
        let max_x = (region.width - self.sprite_size.x).max(0.0);
        let max_y = (region.height - self.sprite_size.y).max(0.0);
        Vec2 {
            x: position.x.clamp(0.0, max_x),
            y: position.y.clamp(0.0, max_y),
        }
    }

    /// Advances the hero by one frame of measured `dt_seconds` and returns the new position.
    /// With no direction held the hero is left untouched.
    pub fn advance(
        &self,
        hero: &mut HeroState,
        dt_seconds: f32,
        input: DirectionalInput,
    ) -> Vec2 {
        let start = hero
            .last_position
            .unwrap_or_else(|| hero.current_location.default_entry());
        if !input.any() {
            return start;
        }

        let dt = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };
        let velocity = self.velocity(input);
        let moved = Vec2 {
            x: start.x + velocity.x * dt,
            y: start.y + velocity.y * dt,
        };
        let clamped = self.clamp_to_region(moved, hero.current_location.region_size());
        hero.last_position = Some(clamped);
        clamped
    }
}
