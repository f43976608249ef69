//! The pet context: one character, its live bubbles, its timers.
//!
//! [`Pet`] owns every piece of mutable state and is driven from a single
//! thread by its host, which feeds it the passage of time
//! ([`Pet::advance`]) and user commands ([`Pet::handle`]). Everything the pet
//! wants drawn goes through the host's [`Surface`].

use std::time::Duration;
use tracing::{debug, info, trace};

use crate::appearance::AppearanceKind;
use crate::bubble::{follow_position, Bubble, BubbleId, BubbleSet};
use crate::command::{context_menu, MenuItem, PetCommand, PointerInput};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{channel, Event, EventReceiver, EventSender};
use crate::geometry::{Bounds, Point, Size, Velocity};
use crate::rng::PetRng;
use crate::scheduler::{Fired, Scheduler, TimerId, TimerTarget};
use crate::surface::Surface;
use crate::wander::{Facing, Motion, TickOutcome, Wanderer};

/// A desktop pet and everything it owns.
#[derive(Debug)]
pub struct Pet {
    config: Config,
    appearance: AppearanceKind,
    wanderer: Wanderer,
    bubbles: BubbleSet,
    scheduler: Scheduler,
    rng: PetRng,
    events: EventSender,
    drag_timer: Option<TimerId>,
    visible: bool,
    started: bool,
    quitting: bool,
}

impl Pet {
    /// Create a pet on a screen of the given size, at a random position with
    /// a random starting velocity.
    ///
    /// Returns the pet and the receiving end of its event channel. Nothing is
    /// drawn or scheduled until [`Pet::start`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `config` fails validation or `screen`
    /// is empty.
    pub fn new(config: Config, screen: Size, appearance: AppearanceKind) -> Result<(Self, EventReceiver)> {
        config.validate()?;
        if !screen.is_positive() {
            return Err(Error::config_error(format!(
                "screen size must be positive, got {screen}"
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => PetRng::new(seed),
            None => PetRng::from_entropy(),
        };
        let bounds = Bounds::new(screen, config.character_size);
        let position = rng.position_within(&bounds);
        let velocity = rng.start_velocity();
        let wanderer = Wanderer::new(position, velocity, bounds, config.perturb_chance);

        let (events, rx) = channel();
        let pet = Self {
            config,
            appearance,
            wanderer,
            bubbles: BubbleSet::new(),
            scheduler: Scheduler::new(),
            rng,
            events,
            drag_timer: None,
            visible: true,
            started: false,
            quitting: false,
        };
        Ok((pet, rx))
    }

    /// Draw the character and arm the wander and speech timers.
    pub fn start(&mut self, surface: &mut dyn Surface) {
        if self.started || self.quitting {
            return;
        }
        self.started = true;

        self.scheduler
            .every(self.config.wander_interval, TimerTarget::Wander);
        if self.config.auto_speech {
            self.scheduler
                .every(self.config.speech_interval, TimerTarget::AutoSpeech);
        }

        surface.render_character(self.appearance.visual(self.wanderer.facing()));
        surface.move_character(self.wanderer.position());
        surface.set_character_visible(true);
        surface.raise_character();

        info!(
            position = %self.wanderer.position(),
            velocity = %self.wanderer.velocity(),
            seed = self.rng.seed(),
            appearance = ?self.appearance,
            "pet started"
        );
        self.emit(Event::Started {
            position: self.wanderer.position(),
            velocity: self.wanderer.velocity(),
            seed: self.rng.seed(),
        });
    }

    /// Let time pass up to `now` (measured from start), firing every timer
    /// that comes due on the way. Returns how many timers fired.
    pub fn advance(&mut self, now: Duration, surface: &mut dyn Surface) -> usize {
        let mut fired = 0;
        while !self.quitting {
            let Some(timer) = self.scheduler.pop_due(now) else {
                break;
            };
            self.fire(timer, surface);
            fired += 1;
        }
        self.scheduler.settle(now);
        fired
    }

    /// Bring the clock up to `now`, then apply `commands` in order.
    ///
    /// Hosts that collect input between frames use this so that bubbles and
    /// drag releases are timed from the frame the input arrived in.
    pub fn step(
        &mut self,
        now: Duration,
        commands: impl IntoIterator<Item = PetCommand>,
        surface: &mut dyn Surface,
    ) -> usize {
        let fired = self.advance(now, surface);
        for command in commands {
            self.handle(command, surface);
        }
        fired
    }

    /// Apply one host command at the current time.
    pub fn handle(&mut self, command: PetCommand, surface: &mut dyn Surface) {
        if self.quitting {
            trace!(%command, "ignoring command after quit");
            return;
        }
        match command {
            PetCommand::Pointer(input) => self.pointer(input, surface),
            PetCommand::SayHello => {
                self.say_hello(surface);
            }
            PetCommand::Pause => self.set_auto_move(false),
            PetCommand::Resume => self.set_auto_move(true),
            PetCommand::Show => self.set_visible(true, surface),
            PetCommand::Hide => self.set_visible(false, surface),
            PetCommand::ToggleVisibility => self.set_visible(!self.visible, surface),
            PetCommand::Quit => self.quit(surface),
        }
    }

    fn pointer(&mut self, input: PointerInput, surface: &mut dyn Surface) {
        match input {
            PointerInput::LeftPressed(pointer) => {
                if let Some(previous) = self.drag_timer.take() {
                    self.scheduler.cancel(previous);
                }
                let token = self.wanderer.start_drag(pointer);
                self.drag_timer = Some(
                    self.scheduler
                        .once(self.config.drag_release, TimerTarget::DragRelease(token)),
                );
                debug!(%pointer, ?token, "drag started");
                self.emit(Event::DragStarted { pointer });
            }
            PointerInput::Moved {
                position,
                left_held: true,
            } => {
                if let Some(moved) = self.wanderer.drag_to(position) {
                    surface.move_character(moved);
                }
            }
            PointerInput::Moved { .. } => {}
            PointerInput::LeftDoubleClicked => {
                self.say_hello(surface);
            }
            PointerInput::RightPressed(position) => {
                self.emit(Event::MenuRequested { position });
            }
        }
    }

    fn fire(&mut self, timer: Fired, surface: &mut dyn Surface) {
        match timer.target {
            TimerTarget::Wander => self.wander(surface),
            TimerTarget::AutoSpeech => {
                if self.visible {
                    self.say_hello(surface);
                }
            }
            TimerTarget::BubbleFollow(id) => self.follow(id, timer.id, surface),
            TimerTarget::BubbleExpire(id) => {
                if !self.expire(id, surface) {
                    trace!(%id, "expiry for a bubble that is already gone");
                }
            }
            TimerTarget::DragRelease(token) => {
                if self.drag_timer == Some(timer.id) {
                    self.drag_timer = None;
                }
                match self.wanderer.end_drag(token, &mut self.rng) {
                    Some(landing) => {
                        debug!(velocity = %landing.velocity, motion = %landing.motion, "drag released");
                        if let Some(facing) = landing.turned {
                            self.turned(facing, surface);
                        }
                        self.emit(Event::DragEnded {
                            position: self.wanderer.position(),
                            velocity: landing.velocity,
                            motion: landing.motion,
                        });
                    }
                    None => trace!(?token, "release timer for a drag that already ended"),
                }
            }
        }
    }

    fn wander(&mut self, surface: &mut dyn Surface) {
        let step = match self.wanderer.tick(&mut self.rng) {
            TickOutcome::Moved(step) => step,
            TickOutcome::Held | TickOutcome::Paused => return,
        };

        if step.bounced_x || step.bounced_y {
            debug!(position = %step.position, velocity = %self.wanderer.velocity(), "bounced");
            self.emit(Event::Bounced {
                position: step.position,
                velocity: self.wanderer.velocity(),
            });
        }
        if let Some(velocity) = step.perturbed {
            debug!(%velocity, "changed course");
            self.emit(Event::Perturbed { velocity });
        }
        if let Some(facing) = step.turned {
            self.turned(facing, surface);
        }

        surface.move_character(step.position);
        surface.raise_character();
    }

    fn turned(&mut self, facing: Facing, surface: &mut dyn Surface) {
        surface.render_character(self.appearance.visual(facing));
        self.emit(Event::Turned { facing });
    }

    /// Show a speech bubble with a random message. Returns its id, or `None`
    /// once the pet is quitting.
    pub fn say_hello(&mut self, surface: &mut dyn Surface) -> Option<BubbleId> {
        if self.quitting {
            return None;
        }
        let message = self.rng.message(&self.config.messages)?.to_owned();
        let id = self.bubbles.next_id();
        let position = self.bubble_position();
        let follow_timer = self
            .scheduler
            .every(self.config.follow_interval, TimerTarget::BubbleFollow(id));
        let expiry_timer = self
            .scheduler
            .once(self.config.bubble_lifetime, TimerTarget::BubbleExpire(id));

        surface.open_bubble(id, &message, position, self.config.bubble_size);
        debug!(%id, %position, "bubble shown");
        self.bubbles.insert(Bubble {
            id,
            message: message.clone(),
            position,
            size: self.config.bubble_size,
            created_at: self.scheduler.now(),
            follow_timer,
            expiry_timer,
        });
        self.emit(Event::BubbleShown { id, message });
        Some(id)
    }

    fn bubble_position(&self) -> Point {
        follow_position(
            self.wanderer.position(),
            self.config.character_size,
            self.config.bubble_size,
            self.wanderer.bounds().screen(),
            self.config.bubble_gap,
        )
    }

    fn follow(&mut self, id: BubbleId, timer: TimerId, surface: &mut dyn Surface) {
        let position = self.bubble_position();
        let Some(bubble) = self.bubbles.get_mut(id) else {
            trace!(%id, "follow tick for a bubble that is already gone");
            self.scheduler.cancel(timer);
            return;
        };
        if bubble.position != position {
            bubble.position = position;
            surface.move_bubble(id, position);
        }
    }

    /// Remove a bubble and close its overlay. Returns false if it was
    /// already gone.
    fn expire(&mut self, id: BubbleId, surface: &mut dyn Surface) -> bool {
        let Some(bubble) = self.bubbles.remove(id) else {
            return false;
        };
        self.scheduler.cancel(bubble.follow_timer);
        self.scheduler.cancel(bubble.expiry_timer);
        surface.close_bubble(id);
        debug!(%id, age_ms = bubble.age(self.scheduler.now()).as_millis() as u64, "bubble expired");
        self.emit(Event::BubbleExpired { id });
        true
    }

    fn set_auto_move(&mut self, enabled: bool) {
        if self.wanderer.set_auto_move(enabled) {
            let motion = self.wanderer.motion().kind();
            info!(%motion, "auto-move {}", if enabled { "on" } else { "off" });
            self.emit(Event::MotionChanged { motion });
        }
    }

    fn set_visible(&mut self, visible: bool, surface: &mut dyn Surface) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        surface.set_character_visible(visible);
        if visible {
            surface.raise_character();
        }
        self.emit(Event::VisibilityChanged { visible });
    }

    fn quit(&mut self, surface: &mut dyn Surface) {
        info!("quitting");
        self.shutdown(surface);
        surface.quit();
        self.emit(Event::Quit);
    }

    /// Cancel every timer and close every bubble. The pet ignores further
    /// commands and time.
    pub fn shutdown(&mut self, surface: &mut dyn Surface) {
        if self.quitting {
            return;
        }
        self.quitting = true;
        self.scheduler.clear();
        self.drag_timer = None;
        for bubble in self.bubbles.drain() {
            surface.close_bubble(bubble.id);
        }
    }

    fn emit(&self, event: Event) {
        if let Err(err) = self.events.try_send(event) {
            trace!(error = %err, "event dropped");
        }
    }

    pub fn position(&self) -> Point {
        self.wanderer.position()
    }

    pub fn velocity(&self) -> Velocity {
        self.wanderer.velocity()
    }

    pub fn facing(&self) -> Facing {
        self.wanderer.facing()
    }

    pub fn motion(&self) -> Motion {
        self.wanderer.motion()
    }

    pub fn bounds(&self) -> Bounds {
        self.wanderer.bounds()
    }

    pub fn appearance(&self) -> AppearanceKind {
        self.appearance
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.get(id)
    }

    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Current time on the pet's clock.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next timer is due, for hosts that sleep between timers.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// The right-click menu for the current state.
    pub fn context_menu(&self) -> Vec<MenuItem> {
        context_menu(self.wanderer.auto_move_enabled())
    }

    #[cfg(test)]
    pub(crate) fn wanderer_mut(&mut self) -> &mut Wanderer {
        &mut self.wanderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::{CharacterVisual, GLYPH_LEFT};
    use crate::geometry::Size;
    use crate::wander::MotionKind;

    #[derive(Debug, Default)]
    struct Recorder {
        moves: Vec<Point>,
        raises: usize,
        visuals: Vec<CharacterVisual>,
        visible: Vec<bool>,
        opened: Vec<(BubbleId, String, Point)>,
        bubble_moves: Vec<(BubbleId, Point)>,
        closed: Vec<BubbleId>,
        quit: bool,
    }

    impl Surface for Recorder {
        fn move_character(&mut self, position: Point) {
            self.moves.push(position);
        }
        fn raise_character(&mut self) {
            self.raises += 1;
        }
        fn render_character(&mut self, visual: CharacterVisual) {
            self.visuals.push(visual);
        }
        fn set_character_visible(&mut self, visible: bool) {
            self.visible.push(visible);
        }
        fn open_bubble(&mut self, id: BubbleId, message: &str, position: Point, _size: Size) {
            self.opened.push((id, message.to_string(), position));
        }
        fn move_bubble(&mut self, id: BubbleId, position: Point) {
            self.bubble_moves.push((id, position));
        }
        fn close_bubble(&mut self, id: BubbleId) {
            self.closed.push(id);
        }
        fn quit(&mut self) {
            self.quit = true;
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn quiet_config() -> Config {
        Config::new().seed(21).auto_speech(false).perturb_chance(0.0)
    }

    fn started(config: Config) -> (Pet, EventReceiver, Recorder) {
        let (mut pet, rx) = Pet::new(config, Size::new(1000, 800), AppearanceKind::Glyph).unwrap();
        let mut surface = Recorder::default();
        pet.start(&mut surface);
        (pet, rx, surface)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = Config::new().messages(vec![]);
        assert!(Pet::new(config, Size::new(1000, 800), AppearanceKind::Glyph).is_err());
        assert!(Pet::new(Config::new(), Size::new(0, 800), AppearanceKind::Glyph).is_err());
    }

    #[test]
    fn test_start_draws_and_announces() {
        let (pet, mut rx, surface) = started(quiet_config());
        assert_eq!(surface.moves, vec![pet.position()]);
        assert_eq!(surface.visuals.len(), 1);
        assert_eq!(surface.visible, vec![true]);
        assert!(pet.bounds().contains(pet.position()));
        assert!(matches!(drain(&mut rx).first(), Some(Event::Started { seed: 21, .. })));
    }

    #[test]
    fn test_wander_ticks_every_interval() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let before = surface.moves.len();
        assert_eq!(pet.advance(ms(49), &mut surface), 0);
        assert_eq!(pet.advance(ms(500), &mut surface), 1);
        for step in 11..=20 {
            pet.advance(ms(step * 50), &mut surface);
        }
        assert_eq!(surface.moves.len() - before, 11);
        assert_eq!(surface.raises, 12);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let (mut a, _ra, mut sa) = started(Config::new().seed(99).auto_speech(false));
        let (mut b, _rb, mut sb) = started(Config::new().seed(99).auto_speech(false));
        for step in 1..=400 {
            a.advance(ms(step * 50), &mut sa);
            b.advance(ms(step * 50), &mut sb);
        }
        assert_eq!(sa.moves, sb.moves);
        assert_eq!(a.velocity(), b.velocity());
    }

    #[test]
    fn test_drag_holds_then_releases_after_delay() {
        let (mut pet, mut rx, mut surface) = started(quiet_config());
        let origin = pet.position();
        let grab = origin + Point::new(20, 30);
        pet.handle(PetCommand::Pointer(PointerInput::LeftPressed(grab)), &mut surface);
        assert!(matches!(pet.motion(), Motion::Dragging(_)));

        pet.advance(ms(1000), &mut surface);
        assert_eq!(pet.position(), origin);

        pet.handle(
            PetCommand::Pointer(PointerInput::Moved {
                position: Point::new(320, 330),
                left_held: true,
            }),
            &mut surface,
        );
        assert_eq!(pet.position(), Point::new(300, 300));

        pet.advance(ms(2999), &mut surface);
        assert!(matches!(pet.motion(), Motion::Dragging(_)));
        pet.advance(ms(3000), &mut surface);
        assert_eq!(pet.motion(), Motion::Wandering);
        assert!(pet.velocity().is_moving_on_both_axes());

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(e, Event::DragStarted { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::DragEnded {
                motion: MotionKind::Wandering,
                ..
            }
        )));
    }

    #[test]
    fn test_move_without_button_does_not_drag() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let origin = pet.position();
        pet.handle(
            PetCommand::Pointer(PointerInput::Moved {
                position: Point::new(5, 5),
                left_held: false,
            }),
            &mut surface,
        );
        assert_eq!(pet.position(), origin);
    }

    #[test]
    fn test_second_press_rearms_release() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let at = pet.position();
        pet.handle(PetCommand::Pointer(PointerInput::LeftPressed(at)), &mut surface);
        pet.advance(ms(2000), &mut surface);
        pet.handle(PetCommand::Pointer(PointerInput::LeftPressed(at)), &mut surface);
        pet.advance(ms(3000), &mut surface);
        assert!(matches!(pet.motion(), Motion::Dragging(_)));
        pet.advance(ms(5000), &mut surface);
        assert_eq!(pet.motion(), Motion::Wandering);
    }

    #[test]
    fn test_pause_while_dragging_lands_paused() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let at = pet.position();
        pet.handle(PetCommand::Pointer(PointerInput::LeftPressed(at)), &mut surface);
        pet.handle(PetCommand::Pause, &mut surface);
        pet.advance(ms(3000), &mut surface);
        assert_eq!(pet.motion(), Motion::Paused);

        let parked = pet.position();
        pet.advance(ms(4000), &mut surface);
        assert_eq!(pet.position(), parked);

        pet.handle(PetCommand::Resume, &mut surface);
        pet.advance(ms(4050), &mut surface);
        assert_ne!(pet.position(), parked);
    }

    #[test]
    fn test_bubble_lives_for_its_lifetime() {
        let (mut pet, mut rx, mut surface) = started(quiet_config());
        pet.advance(ms(100), &mut surface);
        let id = pet.say_hello(&mut surface).expect("bubble");
        assert_eq!(pet.bubble(id).unwrap().created_at, ms(100));
        assert!(pet.config().messages.contains(&pet.bubble(id).unwrap().message));

        pet.advance(ms(3099), &mut surface);
        assert_eq!(pet.bubble_count(), 1);
        pet.advance(ms(3100), &mut surface);
        assert_eq!(pet.bubble_count(), 0);
        assert_eq!(surface.closed, vec![id]);

        let events = drain(&mut rx);
        assert!(events.contains(&Event::BubbleExpired { id }));
    }

    #[test]
    fn test_step_times_input_from_the_current_frame() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        pet.advance(ms(100), &mut surface);
        pet.step(ms(149), [PetCommand::SayHello], &mut surface);
        let id = pet.bubbles().last().map(|b| b.id).expect("bubble");
        assert_eq!(pet.bubble(id).unwrap().created_at, ms(149));

        pet.advance(ms(3148), &mut surface);
        assert!(pet.bubble(id).is_some());
        pet.advance(ms(3149), &mut surface);
        assert!(pet.bubble(id).is_none());
    }

    #[test]
    fn test_step_arms_drag_release_from_the_current_frame() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let at = pet.position();
        pet.advance(ms(100), &mut surface);
        pet.step(
            ms(180),
            [PetCommand::Pointer(PointerInput::LeftPressed(at))],
            &mut surface,
        );
        pet.advance(ms(3179), &mut surface);
        assert!(matches!(pet.motion(), Motion::Dragging(_)));
        pet.advance(ms(3180), &mut surface);
        assert_eq!(pet.motion(), Motion::Wandering);
    }

    #[test]
    fn test_extreme_pointer_coordinates_stay_on_screen() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        for line in [
            "press -2147483648 0",
            "drag 2147483647 -2147483648",
            "press 2147483647 2147483647",
            "drag -2147483648 -2147483648",
            "menu -2147483648 2147483647",
        ] {
            let command: PetCommand = line.parse().unwrap();
            pet.handle(command, &mut surface);
            assert!(pet.bounds().contains(pet.position()), "{line}: {}", pet.position());
        }
        assert_eq!(pet.position(), Point::ORIGIN);

        pet.advance(ms(3000), &mut surface);
        assert_eq!(pet.motion(), Motion::Wandering);
        pet.advance(ms(3050), &mut surface);
        assert!(pet.bounds().contains(pet.position()));
    }

    #[test]
    fn test_bubble_follows_character() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let id = pet.say_hello(&mut surface).expect("bubble");
        let opened_at = surface.opened[0].2;
        for step in 1..=20 {
            pet.advance(ms(step * 30), &mut surface);
        }
        let latest = pet.bubble(id).unwrap().position;
        assert_ne!(latest, opened_at);
        assert_eq!(surface.bubble_moves.last(), Some(&(id, latest)));
        let expected = follow_position(
            pet.position(),
            Size::new(150, 150),
            Size::new(200, 80),
            Size::new(1000, 800),
            10,
        );
        // the bubble trails the character by at most one wander step
        assert!((latest.x - expected.x).abs() <= 4);
    }

    #[test]
    fn test_bubbles_are_independent() {
        let (mut pet, _rx, mut surface) = started(quiet_config());
        let first = pet.say_hello(&mut surface).unwrap();
        pet.advance(ms(1000), &mut surface);
        let second = pet.handle_double_click(&mut surface);
        assert_eq!(pet.bubble_count(), 2);
        pet.advance(ms(3000), &mut surface);
        assert!(pet.bubble(first).is_none());
        assert!(pet.bubble(second).is_some());
        pet.advance(ms(4000), &mut surface);
        assert_eq!(pet.bubble_count(), 0);
    }

    #[test]
    fn test_auto_speech_skipped_while_hidden() {
        let config = Config::new().seed(5).perturb_chance(0.0);
        let (mut pet, _rx, mut surface) = started(config);
        pet.advance(ms(10_000), &mut surface);
        assert_eq!(surface.opened.len(), 1);

        pet.handle(PetCommand::Hide, &mut surface);
        pet.advance(ms(20_000), &mut surface);
        assert_eq!(surface.opened.len(), 1);

        pet.handle(PetCommand::ToggleVisibility, &mut surface);
        pet.advance(ms(30_000), &mut surface);
        assert_eq!(surface.opened.len(), 2);
        assert_eq!(surface.visible, vec![true, false, true]);
    }

    #[test]
    fn test_turn_renders_mirrored_visual() {
        let (mut pet, mut rx, mut surface) = started(quiet_config());
        let bounds = pet.bounds();
        *pet.wanderer_mut() = Wanderer::new(Point::new(400, 300), Velocity::new(3, 1), bounds, 0.0);
        pet.advance(ms(50), &mut surface);
        pet.wanderer_mut().force_velocity(Velocity::new(-3, 1));
        pet.advance(ms(100), &mut surface);
        assert_eq!(pet.facing(), Facing::Left);
        assert_eq!(surface.visuals.last(), Some(&CharacterVisual::Glyph(GLYPH_LEFT)));
        assert!(drain(&mut rx).contains(&Event::Turned {
            facing: Facing::Left
        }));
    }

    #[test]
    fn test_menu_request_and_menu_model() {
        let (mut pet, mut rx, mut surface) = started(quiet_config());
        pet.handle(
            PetCommand::Pointer(PointerInput::RightPressed(Point::new(7, 8))),
            &mut surface,
        );
        assert!(drain(&mut rx).contains(&Event::MenuRequested {
            position: Point::new(7, 8)
        }));
        assert!(pet
            .context_menu()
            .contains(&MenuItem::Action { label: "Pause ⏸", command: PetCommand::Pause }));
        pet.handle(PetCommand::Pause, &mut surface);
        assert!(pet
            .context_menu()
            .iter()
            .any(|item| matches!(item, MenuItem::Action { command: PetCommand::Resume, .. })));
    }

    #[test]
    fn test_quit_tears_everything_down() {
        let (mut pet, mut rx, mut surface) = started(quiet_config());
        let a = pet.say_hello(&mut surface).unwrap();
        let b = pet.say_hello(&mut surface).unwrap();
        pet.handle(PetCommand::Quit, &mut surface);

        assert!(pet.is_quitting());
        assert!(surface.quit);
        assert_eq!(surface.closed, vec![a, b]);
        assert_eq!(pet.next_due(), None);

        let moves = surface.moves.len();
        assert_eq!(pet.advance(ms(60_000), &mut surface), 0);
        pet.handle(PetCommand::SayHello, &mut surface);
        assert_eq!(surface.moves.len(), moves);
        assert_eq!(pet.bubble_count(), 0);
        assert_eq!(drain(&mut rx).last(), Some(&Event::Quit));
    }

    impl Pet {
        fn handle_double_click(&mut self, surface: &mut dyn Surface) -> BubbleId {
            self.handle(PetCommand::Pointer(PointerInput::LeftDoubleClicked), surface);
            self.bubbles().last().map(|b| b.id).expect("double click opens a bubble")
        }
    }
}
