use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use super::input::DirectionalInput;
use super::location::{
    Location, LocationStateMachine, TransitionContext, TransitionPlan, TransitionRejected, Vec2,
    Viewport,
};
use super::movement::{MovementController, HERO_SPEED_UNITS_PER_SECOND, HERO_SPRITE_SIZE};
use super::transition::{
    PresentationHooks, TransitionCoordinator, TransitionEvent, TransitionPhase,
    DEFAULT_ENTER_FADE, DEFAULT_SETTLE_PAUSE,
};
use super::ui_context::UiContext;
use crate::content::ItemCatalog;
use crate::save::{EraseOutcome, SaveDeleteError, SaveLoadError, SaveStore, SaveWriteError};
use crate::state::{GameState, GameStateError, HeroState, ShopError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub enter_fade: Duration,
    pub settle_pause: Duration,
    pub hero_speed: f32,
    pub sprite_size: Vec2,
    pub viewport: Viewport,
    /// Persist after every completed player-driven transition, not only at creation and on
    /// explicit save.
    pub checkpoint_on_transition: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enter_fade: DEFAULT_ENTER_FADE,
            settle_pause: DEFAULT_SETTLE_PAUSE,
            hero_speed: HERO_SPEED_UNITS_PER_SECOND,
            sprite_size: HERO_SPRITE_SIZE,
            viewport: Viewport::default(),
            checkpoint_on_transition: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no game is in progress")]
    NoActiveGame,
    #[error("a transition to {destination} is in flight")]
    Busy { destination: Location },
    #[error("unknown item id '{id}'")]
    UnknownItem { id: String },
    #[error(transparent)]
    Transition(#[from] TransitionRejected),
    #[error(transparent)]
    InvalidState(#[from] GameStateError),
    #[error(transparent)]
    Load(#[from] SaveLoadError),
    #[error(transparent)]
    Write(#[from] SaveWriteError),
    #[error(transparent)]
    Delete(#[from] SaveDeleteError),
    #[error(transparent)]
    Shop(#[from] ShopError),
}

/// One live game: hero state, active location, transition choreography, and the save slot.
///
/// Everything runs on the caller's thread. The presentation layer is passed into each call
/// that may need to drive it.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    store: SaveStore,
    catalog: ItemCatalog,
    state: Option<GameState>,
    locations: LocationStateMachine,
    coordinator: TransitionCoordinator,
    movement: MovementController,
    ui: UiContext,
}

impl GameSession {
    pub fn new(config: SessionConfig, store: SaveStore, catalog: ItemCatalog) -> Self {
        Self {
            locations: LocationStateMachine::new(config.viewport, config.sprite_size),
            coordinator: TransitionCoordinator::new(config.enter_fade, config.settle_pause),
            movement: MovementController::new(config.hero_speed, config.sprite_size),
            config,
            store,
            catalog,
            state: None,
            ui: UiContext::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn hero(&self) -> Option<&HeroState> {
        self.state.as_ref().map(|state| &state.hero)
    }

    pub fn active_location(&self) -> Option<Location> {
        self.locations.active()
    }

    pub fn attached_region(&self) -> Option<Location> {
        self.coordinator.attached_region()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.coordinator.phase()
    }

    pub fn is_transitioning(&self) -> bool {
        self.coordinator.is_busy()
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiContext {
        &mut self.ui
    }

    /// The only "can continue" signal offered to the menu.
    pub fn can_continue(&self) -> bool {
        self.store.exists()
    }

    /// Starts a fresh hero on the overworld and checkpoints it. A failed checkpoint is reported
    /// through the hooks but does not stop the game from starting.
    pub fn new_game<H>(&mut self, hero_name: &str, hooks: &mut H) -> Result<(), SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        self.ensure_idle()?;
        let mut state = GameState::new_game(hero_name)?;

        self.reset_world(hooks);
        let plan = self.locations.request_transition(
            None,
            Location::MapOverworld,
            TransitionContext::NewGame,
            &mut state.hero,
        )?;
        info!(hero = %state.hero.name, "new_game_started");
        self.state = Some(state);
        self.coordinator.begin(plan, hooks)?;
        self.checkpoint("new_game", hooks);
        Ok(())
    }

    /// Loads the save slot and transitions to the saved location.
    pub fn continue_game<H>(&mut self, hooks: &mut H) -> Result<(), SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        self.ensure_idle()?;
        let mut state = match self.store.load_with_catalog(&self.catalog) {
            Ok(state) => state,
            Err(error) => {
                let message = match &error {
                    SaveLoadError::NotFound { .. } => "No saved game found.".to_string(),
                    SaveLoadError::Corrupt { .. } => {
                        "The saved game is damaged. Please start a new game.".to_string()
                    }
                };
                hooks.notify_load_result(false, &message);
                return Err(error.into());
            }
        };

        self.reset_world(hooks);
        let destination = state.hero.current_location;
        let plan = self.locations.request_transition(
            None,
            destination,
            TransitionContext::Continue,
            &mut state.hero,
        )?;
        hooks.notify_load_result(true, &format!("Welcome back, {}.", state.hero.name));
        self.state = Some(state);
        self.coordinator.begin(plan, hooks)?;
        Ok(())
    }

    /// Drives one frame. While a transition is in flight only the coordinator advances;
    /// otherwise the hero moves unless a modal is open.
    pub fn tick<H>(
        &mut self,
        dt: Duration,
        input: DirectionalInput,
        hooks: &mut H,
    ) -> Option<TransitionEvent>
    where
        H: PresentationHooks + ?Sized,
    {
        if self.coordinator.is_busy() {
            return self.advance_transition(dt, hooks);
        }
        if self.ui.is_modal_open() {
            return None;
        }
        if let Some(state) = self.state.as_mut() {
            self.movement
                .advance(&mut state.hero, dt.as_secs_f32(), input);
        }
        None
    }

    pub fn request_transition<H>(
        &mut self,
        to: Location,
        context: TransitionContext,
        hooks: &mut H,
    ) -> Result<TransitionPlan, SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        if let Some(destination) = self.coordinator.destination() {
            warn!(in_flight = %destination, requested = %to, "transition_rejected_in_flight");
            return Err(TransitionRejected::InFlight { destination }.into());
        }
        let state = self.state.as_mut().ok_or(SessionError::NoActiveGame)?;
        let from = self.locations.active();
        let plan = self
            .locations
            .request_transition(from, to, context, &mut state.hero)?;
        self.coordinator.begin(plan, hooks)?;
        Ok(plan)
    }

    pub fn request_transition_by_tag<H>(
        &mut self,
        tag: &str,
        context: TransitionContext,
        hooks: &mut H,
    ) -> Result<TransitionPlan, SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        let to = tag
            .parse::<Location>()
            .map_err(TransitionRejected::from)?;
        self.request_transition(to, context, hooks)
    }

    pub fn on_transition_overlay_fade_complete<H>(&mut self, hooks: &mut H) -> Option<TransitionEvent>
    where
        H: PresentationHooks + ?Sized,
    {
        if !self.coordinator.on_transition_overlay_fade_complete() {
            return None;
        }
        self.advance_transition(Duration::ZERO, hooks)
    }

    pub fn on_region_constructed(&mut self, location: Location) -> bool {
        self.coordinator.on_region_constructed(location)
    }

    /// A reported position is clamped to the region before it is shown or stored.
    pub fn on_region_settled<H>(
        &mut self,
        location: Location,
        position: Option<Vec2>,
        hooks: &mut H,
    ) -> Option<TransitionEvent>
    where
        H: PresentationHooks + ?Sized,
    {
        let position = position
            .filter(Vec2::is_finite)
            .map(|position| self.movement.clamp_to_region(position, location.region_size()));
        if !self.coordinator.on_region_settled(location, position) {
            return None;
        }
        self.advance_transition(Duration::ZERO, hooks)
    }

    /// Explicit save point.
    pub fn save<H>(&mut self, hooks: &mut H) -> Result<(), SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        self.ensure_idle()?;
        let state = self.state.as_ref().ok_or(SessionError::NoActiveGame)?;
        match self.store.persist(state) {
            Ok(()) => {
                hooks.notify_save_result(true, "Game saved.");
                Ok(())
            }
            Err(error) => {
                hooks.notify_save_result(false, &format!("Could not save the game: {error}"));
                Err(error.into())
            }
        }
    }

    /// Deletes the save slot and drops the in-memory game.
    pub fn erase_save<H>(&mut self, hooks: &mut H) -> Result<EraseOutcome, SessionError>
    where
        H: PresentationHooks + ?Sized,
    {
        self.ensure_idle()?;
        let outcome = match self.store.erase() {
            Ok(outcome) => outcome,
            Err(error) => {
                hooks.notify_save_result(false, &format!("Could not delete the save: {error}"));
                return Err(error.into());
            }
        };

        self.reset_world(hooks);
        self.state = None;
        match outcome {
            EraseOutcome::Deleted => hooks.notify_save_deleted(),
            EraseOutcome::NotFound => {
                info!(path = %self.store.path().display(), "save_erase_nothing_to_delete");
            }
        }
        Ok(outcome)
    }

    pub fn purchase(&mut self, item_id: &str) -> Result<u32, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveGame)?;
        let item = self
            .catalog
            .get(item_id)
            .ok_or_else(|| SessionError::UnknownItem {
                id: item_id.to_string(),
            })?;
        let gold = state.hero.purchase(item)?;
        info!(item = %item.id, gold, "item_purchased");
        Ok(gold)
    }

    pub fn sell(&mut self, item_id: &str) -> Result<u32, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveGame)?;
        let item = self
            .catalog
            .get(item_id)
            .ok_or_else(|| SessionError::UnknownItem {
                id: item_id.to_string(),
            })?;
        let gold = state.hero.sell(item)?;
        info!(item = %item.id, gold, "item_sold");
        Ok(gold)
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.coordinator.destination() {
            Some(destination) => Err(SessionError::Busy { destination }),
            None => Ok(()),
        }
    }

    fn reset_world<H>(&mut self, hooks: &mut H)
    where
        H: PresentationHooks + ?Sized,
    {
        self.coordinator.detach_all(hooks);
        self.locations.reset();
    }

    fn advance_transition<H>(&mut self, dt: Duration, hooks: &mut H) -> Option<TransitionEvent>
    where
        H: PresentationHooks + ?Sized,
    {
        let event = self.coordinator.advance(dt, hooks)?;
        if let TransitionEvent::Completed {
            plan,
            settle_position,
        } = event
        {
            if let (Some(state), Some(position)) = (self.state.as_mut(), settle_position) {
                if state.hero.current_location == plan.to {
                    state.hero.last_position = Some(position);
                }
            }
            let player_driven = matches!(
                plan.context,
                TransitionContext::PlayerAction | TransitionContext::Console
            );
            if self.config.checkpoint_on_transition && player_driven {
                self.checkpoint("transition", hooks);
            }
        }
        Some(event)
    }

    fn checkpoint<H>(&self, reason: &'static str, hooks: &mut H) -> bool
    where
        H: PresentationHooks + ?Sized,
    {
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        match self.store.persist(state) {
            Ok(()) => {
                hooks.notify_save_result(true, "Progress saved.");
                true
            }
            Err(error) => {
                warn!(reason, error = %error, "checkpoint_failed");
                hooks.notify_save_result(false, &format!("Could not save progress: {error}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::app::input::InputAction;

    const ITEMS_XML: &str = r#"<Items>
  <Consumable><id>herb</id><name>Herb</name><cost>8</cost><salePrice>3</salePrice><healing>15</healing></Consumable>
  <Weapon><id>bronze_sword</id><name>Bronze Sword</name><cost>50</cost><salePrice>20</salePrice><attack>7</attack><durability>40</durability></Weapon>
</Items>"#;

    #[derive(Default)]
    struct Hooks {
        calls: Vec<String>,
        shown: Vec<Location>,
        saves: Vec<bool>,
    }

    impl PresentationHooks for Hooks {
        fn show_region(&mut self, location: Location, entry: Vec2) {
            self.calls.push(format!("show_region {location} {entry}"));
            self.shown.push(location);
        }

        fn hide_region(&mut self, location: Location) {
            self.calls.push(format!("hide_region {location}"));
        }

        fn show_loading_overlay(&mut self) {
            self.calls.push("show_loading_overlay".to_string());
        }

        fn hide_loading_overlay(&mut self) {
            self.calls.push("hide_loading_overlay".to_string());
        }

        fn notify_save_deleted(&mut self) {
            self.calls.push("notify_save_deleted".to_string());
        }

        fn notify_load_result(&mut self, ok: bool, message: &str) {
            self.calls.push(format!("notify_load_result {ok} {message}"));
        }

        fn notify_save_result(&mut self, ok: bool, _message: &str) {
            self.saves.push(ok);
        }
    }

    fn session_in(temp: &TempDir, config: SessionConfig) -> GameSession {
        let catalog =
            ItemCatalog::from_xml_str(Path::new("items.xml"), ITEMS_XML).expect("catalog");
        GameSession::new(config, SaveStore::in_dir(&temp.path().join("saves")), catalog)
    }

    fn settle(session: &mut GameSession, hooks: &mut Hooks) {
        for _ in 0..200 {
            if !session.is_transitioning() {
                return;
            }
            session.tick(Duration::from_millis(16), DirectionalInput::none(), hooks);
        }
        panic!("transition never settled");
    }

    fn hold(session: &mut GameSession, hooks: &mut Hooks, action: InputAction, seconds: f32) {
        let input = DirectionalInput::from_actions(&[action]);
        session.tick(Duration::from_secs_f32(seconds), input, hooks);
    }

    fn position(session: &GameSession) -> Option<Vec2> {
        session.hero().and_then(|hero| hero.last_position)
    }

    #[test]
    fn new_game_shows_the_overworld_and_checkpoints() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        assert!(!session.can_continue());

        session.new_game("Aria", &mut hooks).expect("new game");
        assert!(session.can_continue());
        assert_eq!(hooks.saves, vec![true]);
        settle(&mut session, &mut hooks);

        assert_eq!(session.active_location(), Some(Location::MapOverworld));
        assert_eq!(session.attached_region(), Some(Location::MapOverworld));
        assert_eq!(position(&session), Some(Vec2::new(616.0, 336.0)));
        assert_eq!(hooks.calls.first().map(String::as_str), Some("show_loading_overlay"));
        assert_eq!(hooks.calls.last().map(String::as_str), Some("hide_loading_overlay"));
    }

    #[test]
    fn empty_hero_name_is_rejected_before_anything_is_written() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        assert!(matches!(
            session.new_game("  ", &mut hooks),
            Err(SessionError::InvalidState(GameStateError::InvalidHeroName))
        ));
        assert!(session.state().is_none());
        assert!(!session.can_continue());
        assert!(hooks.calls.is_empty());
    }

    #[test]
    fn movement_is_paused_during_transitions_and_modals() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");

        let before = position(&session);
        hold(&mut session, &mut hooks, InputAction::MoveRight, 0.05);
        assert_eq!(position(&session), before);
        settle(&mut session, &mut hooks);

        session.ui_mut().set_modal_open(true);
        hold(&mut session, &mut hooks, InputAction::MoveRight, 1.0);
        assert_eq!(position(&session), before);

        session.ui_mut().set_modal_open(false);
        hold(&mut session, &mut hooks, InputAction::MoveRight, 1.0);
        assert_eq!(position(&session), Some(Vec2::new(796.0, 336.0)));
    }

    #[test]
    fn concurrent_request_is_rejected_and_original_destination_wins() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");
        settle(&mut session, &mut hooks);

        session
            .request_transition(Location::FieldVillage, TransitionContext::PlayerAction, &mut hooks)
            .expect("go to village");
        session.tick(Duration::from_millis(100), DirectionalInput::none(), &mut hooks);

        let rejected =
            session.request_transition(Location::Swamp, TransitionContext::PlayerAction, &mut hooks);
        assert!(matches!(
            rejected,
            Err(SessionError::Transition(TransitionRejected::InFlight {
                destination: Location::FieldVillage
            }))
        ));
        assert_eq!(session.hero().map(|hero| hero.current_location), Some(Location::FieldVillage));

        settle(&mut session, &mut hooks);
        assert_eq!(session.active_location(), Some(Location::FieldVillage));
        assert_eq!(position(&session), Some(Vec2::new(665.55, 864.0)));
        assert!(!hooks.shown.contains(&Location::Swamp));
    }

    #[test]
    fn overworld_return_restores_departure_position() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");
        settle(&mut session, &mut hooks);
        hold(&mut session, &mut hooks, InputAction::MoveRight, 1.0);
        let departure = position(&session).expect("position");

        session
            .request_transition_by_tag("field_village", TransitionContext::Console, &mut hooks)
            .expect("to village");
        settle(&mut session, &mut hooks);
        hold(&mut session, &mut hooks, InputAction::MoveUp, 0.5);

        session
            .request_transition(Location::MapOverworld, TransitionContext::PlayerAction, &mut hooks)
            .expect("back");
        settle(&mut session, &mut hooks);
        assert_eq!(position(&session), Some(departure));
    }

    #[test]
    fn settle_callback_overrides_the_entry_point() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");
        settle(&mut session, &mut hooks);

        session
            .request_transition(Location::ForestHouse, TransitionContext::PlayerAction, &mut hooks)
            .expect("to house");
        assert!(matches!(
            session.on_transition_overlay_fade_complete(&mut hooks),
            Some(TransitionEvent::Entered { .. })
        ));
        assert!(session.on_region_constructed(Location::ForestHouse));
        let event = session.on_region_settled(
            Location::ForestHouse,
            Some(Vec2::new(5000.0, 100.0)),
            &mut hooks,
        );
        assert!(matches!(event, Some(TransitionEvent::Completed { .. })));
        assert_eq!(position(&session), Some(Vec2::new(752.0, 100.0)));
        assert_eq!(
            hooks.calls.iter().rev().find(|call| call.starts_with("show_region")),
            Some(&"show_region forest_house (752.00, 100.00)".to_string())
        );
    }

    #[test]
    fn completed_transitions_checkpoint_unless_disabled() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");
        settle(&mut session, &mut hooks);
        session
            .request_transition(Location::Swamp, TransitionContext::PlayerAction, &mut hooks)
            .expect("to swamp");
        settle(&mut session, &mut hooks);
        let saved = session.store().load().expect("load");
        assert_eq!(saved.hero.current_location, Location::Swamp);

        let temp = TempDir::new().expect("tempdir");
        let config = SessionConfig {
            checkpoint_on_transition: false,
            ..SessionConfig::default()
        };
        let mut session = session_in(&temp, config);
        session.new_game("Aria", &mut hooks).expect("new game");
        settle(&mut session, &mut hooks);
        session
            .request_transition(Location::Swamp, TransitionContext::PlayerAction, &mut hooks)
            .expect("to swamp");
        settle(&mut session, &mut hooks);
        let saved = session.store().load().expect("load");
        assert_eq!(saved.hero.current_location, Location::MapOverworld);
    }

    #[test]
    fn continue_restores_saved_location_and_position() {
        let temp = TempDir::new().expect("tempdir");
        let mut hooks = Hooks::default();
        let expected = {
            let mut session = session_in(&temp, SessionConfig::default());
            session.new_game("Aria", &mut hooks).expect("new game");
            settle(&mut session, &mut hooks);
            session
                .request_transition(Location::SwampDungeon, TransitionContext::PlayerAction, &mut hooks)
                .expect("to dungeon");
            settle(&mut session, &mut hooks);
            hold(&mut session, &mut hooks, InputAction::MoveLeft, 0.25);
            session.purchase("herb").expect("buy");
            session.save(&mut hooks).expect("save");
            session.state().cloned().expect("state")
        };

        let mut session = session_in(&temp, SessionConfig::default());
        session.continue_game(&mut hooks).expect("continue");
        assert!(hooks
            .calls
            .contains(&"notify_load_result true Welcome back, Aria.".to_string()));
        settle(&mut session, &mut hooks);
        assert_eq!(session.active_location(), Some(Location::SwampDungeon));
        assert_eq!(session.state(), Some(&expected));
    }

    #[test]
    fn continue_without_a_save_reports_not_found() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        assert!(matches!(
            session.continue_game(&mut hooks),
            Err(SessionError::Load(SaveLoadError::NotFound { .. }))
        ));
        assert_eq!(
            hooks.calls,
            vec!["notify_load_result false No saved game found.".to_string()]
        );
    }

    #[test]
    fn continue_with_a_corrupt_save_leaves_it_in_place() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        fs::create_dir_all(temp.path().join("saves")).expect("mkdir");
        fs::write(session.store().path(), "{ not json").expect("write");

        assert!(matches!(
            session.continue_game(&mut hooks),
            Err(SessionError::Load(SaveLoadError::Corrupt { .. }))
        ));
        assert!(session.can_continue());
        assert!(session.state().is_none());
    }

    #[test]
    fn erase_clears_the_session_and_is_idempotent() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        session.new_game("Aria", &mut hooks).expect("new game");

        assert!(matches!(
            session.erase_save(&mut hooks),
            Err(SessionError::Busy {
                destination: Location::MapOverworld
            })
        ));
        settle(&mut session, &mut hooks);

        assert_eq!(session.erase_save(&mut hooks).expect("erase"), EraseOutcome::Deleted);
        assert!(session.state().is_none());
        assert_eq!(session.active_location(), None);
        assert_eq!(session.attached_region(), None);
        assert!(hooks.calls.contains(&"hide_region map_overworld".to_string()));
        assert!(hooks.calls.contains(&"notify_save_deleted".to_string()));

        assert_eq!(session.erase_save(&mut hooks).expect("erase"), EraseOutcome::NotFound);
        assert!(!session.can_continue());
    }

    #[test]
    fn shop_uses_catalog_prices() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = session_in(&temp, SessionConfig::default());
        let mut hooks = Hooks::default();
        assert!(matches!(session.purchase("herb"), Err(SessionError::NoActiveGame)));

        session.new_game("Aria", &mut hooks).expect("new game");
        assert_eq!(session.purchase("bronze_sword").expect("buy"), 70);
        assert_eq!(session.sell("bronze_sword").expect("sell"), 90);
        assert!(matches!(
            session.purchase("dragon_lance"),
            Err(SessionError::UnknownItem { .. })
        ));
        assert!(matches!(
            session.sell("herb"),
            Err(SessionError::Shop(ShopError::NotInInventory { .. }))
        ));
    }
}
