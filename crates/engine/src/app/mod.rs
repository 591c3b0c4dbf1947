mod input;
mod location;
mod movement;
mod session;
mod transition;
mod ui_context;

pub use input::{DirectionalInput, InputAction};
pub use location::{
    Location, LocationStateMachine, RegionSize, TransitionContext, TransitionPlan,
    TransitionRejected, UnknownLocation, Vec2, Viewport,
};
pub use movement::{MovementController, HERO_SPEED_UNITS_PER_SECOND, HERO_SPRITE_SIZE};
pub use session::{GameSession, SessionConfig, SessionError};
pub use transition::{
    PresentationHooks, TransitionCoordinator, TransitionEvent, TransitionPhase,
    DEFAULT_ENTER_FADE, DEFAULT_SETTLE_PAUSE,
};
pub use ui_context::UiContext;
