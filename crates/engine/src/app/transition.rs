use std::time::Duration;

use tracing::{debug, info, warn};

use super::location::{Location, TransitionPlan, TransitionRejected, Vec2};

pub const DEFAULT_ENTER_FADE: Duration = Duration::from_millis(180);
pub const DEFAULT_SETTLE_PAUSE: Duration = Duration::from_millis(600);

/// Calls the core makes into the presentation layer.
pub trait PresentationHooks {
    fn show_region(&mut self, location: Location, entry: Vec2);
    fn hide_region(&mut self, location: Location);
    /// Destination is about to be constructed behind the opaque overlay.
    fn prepare_region(&mut self, _location: Location, _entry: Vec2) {}
    fn show_loading_overlay(&mut self);
    fn hide_loading_overlay(&mut self);
    fn notify_save_deleted(&mut self);
    fn notify_load_result(&mut self, ok: bool, message: &str);
    fn notify_save_result(&mut self, _ok: bool, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Entering,
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionEvent {
    /// The overlay is opaque, the source region is gone and the destination is being built.
    Entered { to: Location },
    Completed {
        plan: TransitionPlan,
        settle_position: Option<Vec2>,
    },
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    plan: TransitionPlan,
    phase: TransitionPhase,
    remaining: Duration,
    fade_complete: bool,
    constructed: bool,
    settled: bool,
    settle_position: Option<Vec2>,
}

/// Runs the two-phase loading choreography between regions.
///
/// Phases advance from `advance` only: either the phase's timer runs out or the presentation
/// reported completion through one of the `on_*` callbacks. At most one phase boundary is
/// crossed per call. There is no cancellation.
#[derive(Debug)]
pub struct TransitionCoordinator {
    enter_fade: Duration,
    settle_pause: Duration,
    attached_region: Option<Location>,
    overlay_attached: bool,
    in_flight: Option<InFlight>,
}

impl Default for TransitionCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_ENTER_FADE, DEFAULT_SETTLE_PAUSE)
    }
}

impl TransitionCoordinator {
    pub fn new(enter_fade: Duration, settle_pause: Duration) -> Self {
        Self {
            enter_fade,
            settle_pause,
            attached_region: None,
            overlay_attached: false,
            in_flight: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.in_flight
            .map(|flight| flight.phase)
            .unwrap_or(TransitionPhase::Idle)
    }

    pub fn destination(&self) -> Option<Location> {
        self.in_flight.map(|flight| flight.plan.to)
    }

    pub fn attached_region(&self) -> Option<Location> {
        self.attached_region
    }

    pub fn overlay_attached(&self) -> bool {
        self.overlay_attached
    }

    pub fn begin<H>(&mut self, plan: TransitionPlan, hooks: &mut H) -> Result<(), TransitionRejected>
    where
        H: PresentationHooks + ?Sized,
    {
        if let Some(flight) = &self.in_flight {
            warn!(
                in_flight = %flight.plan.to,
                requested = %plan.to,
                "transition_rejected_in_flight"
            );
            return Err(TransitionRejected::InFlight {
                destination: flight.plan.to,
            });
        }

        hooks.show_loading_overlay();
        self.overlay_attached = true;
        self.in_flight = Some(InFlight {
            plan,
            phase: TransitionPhase::Entering,
            remaining: self.enter_fade,
            fade_complete: false,
            constructed: false,
            settled: false,
            settle_position: None,
        });
        info!(from = ?plan.from, to = %plan.to, context = ?plan.context, "transition_started");
        Ok(())
    }

    pub fn advance<H>(&mut self, dt: Duration, hooks: &mut H) -> Option<TransitionEvent>
    where
        H: PresentationHooks + ?Sized,
    {
        let flight = self.in_flight.as_mut()?;
        flight.remaining = flight.remaining.saturating_sub(dt);

        match flight.phase {
            TransitionPhase::Entering => {
                if !flight.remaining.is_zero() && !flight.fade_complete {
                    return None;
                }
                let plan = flight.plan;
                flight.phase = TransitionPhase::Settling;
                flight.remaining = self.settle_pause;

                if let Some(previous) = self.attached_region.take() {
                    hooks.hide_region(previous);
                }
                hooks.prepare_region(plan.to, plan.entry);
                debug!(to = %plan.to, "transition_entered");
                Some(TransitionEvent::Entered { to: plan.to })
            }
            TransitionPhase::Settling => {
                if !flight.remaining.is_zero() && !flight.settled {
                    return None;
                }
                let flight = *flight;
                self.in_flight = None;
                Some(self.finish(flight, hooks))
            }
            TransitionPhase::Idle => None,
        }
    }

    /// Overlay reached full opacity; the enter phase may end on the next `advance`.
    pub fn on_transition_overlay_fade_complete(&mut self) -> bool {
        match self.in_flight.as_mut() {
            Some(flight) if flight.phase == TransitionPhase::Entering => {
                flight.fade_complete = true;
                true
            }
            _ => {
                debug!("overlay_fade_complete_ignored");
                false
            }
        }
    }

    pub fn on_region_constructed(&mut self, location: Location) -> bool {
        match self.in_flight.as_mut() {
            Some(flight)
                if flight.phase == TransitionPhase::Settling && flight.plan.to == location =>
            {
                flight.constructed = true;
                debug!(location = %location, "region_constructed");
                true
            }
            _ => {
                warn!(location = %location, "region_constructed_ignored");
                false
            }
        }
    }

    /// Destination finished its setup; `position` replaces the planned entry point if given.
    pub fn on_region_settled(&mut self, location: Location, position: Option<Vec2>) -> bool {
        match self.in_flight.as_mut() {
            Some(flight)
                if flight.phase == TransitionPhase::Settling && flight.plan.to == location =>
            {
                flight.settled = true;
                flight.settle_position = position.filter(Vec2::is_finite);
                true
            }
            _ => {
                warn!(location = %location, "region_settled_ignored");
                false
            }
        }
    }

    /// Hides whatever region is attached. Only valid while idle.
    pub fn detach_all<H>(&mut self, hooks: &mut H)
    where
        H: PresentationHooks + ?Sized,
    {
        debug_assert!(self.in_flight.is_none(), "detach_all during a transition");
        if let Some(region) = self.attached_region.take() {
            hooks.hide_region(region);
        }
    }

    fn finish<H>(&mut self, flight: InFlight, hooks: &mut H) -> TransitionEvent
    where
        H: PresentationHooks + ?Sized,
    {
        let plan = flight.plan;
        let shown_at = flight.settle_position.unwrap_or(plan.entry);

        let guard = OverlayGuard {
            hooks,
            overlay_attached: &mut self.overlay_attached,
        };
        guard.hooks.show_region(plan.to, shown_at);
        self.attached_region = Some(plan.to);
        drop(guard);

        info!(
            to = %plan.to,
            position = %shown_at,
            constructed_ack = flight.constructed,
            "transition_completed"
        );
        TransitionEvent::Completed {
            plan,
            settle_position: flight.settle_position,
        }
    }
}

/// Removes the loading overlay when dropped, including during unwinding.
struct OverlayGuard<'a, H: PresentationHooks + ?Sized> {
    hooks: &'a mut H,
    overlay_attached: &'a mut bool,
}

impl<H: PresentationHooks + ?Sized> Drop for OverlayGuard<'_, H> {
    fn drop(&mut self) {
        if *self.overlay_attached {
            self.hooks.hide_loading_overlay();
            *self.overlay_attached = false;
        }
    }
}
