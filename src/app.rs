/// Speed added or removed per keypress, in time-fraction per tick.
pub const SPEED_STEP: f64 = 0.000_002_5;
/// Playback speed ceiling.
pub const SPEED_MAX: f64 = 0.001;
/// Initial playback speed.
pub const SPEED_DEFAULT: f64 = 0.000_005;

/// Device input, already translated from the windowing layer.
/// Pointer coordinates are normalized to [0, 1] over the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    TogglePause,
    SpeedUp,
    SpeedDown,
    Quit,
    PointerMove { x: f64, y: f64 },
    /// Window-close signal; stops event processing for the tick.
    Close,
}

/// Normalized pointer position over the canvas, [0, 1] in each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

/// Mutable view state driving slice selection and playback.
///
/// Owned by the render loop and mutated only through [`handle_events`]
/// and the per-tick [`advance_time`] step, all on one thread.
///
/// [`handle_events`]: ViewState::handle_events
/// [`advance_time`]: ViewState::advance_time
pub struct ViewState {
    pub running: bool,
    pub paused: bool,
    pub speed: f64,
    /// Cyclic time cursor in [0, 1).
    pub time_fraction: f64,
    pub pointer: Pointer,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            running: true,
            paused: true,
            speed: SPEED_DEFAULT,
            time_fraction: 0.0,
            pointer: Pointer::default(),
        }
    }

    /// Apply every input event pending for this tick.
    pub fn handle_events(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            match event {
                InputEvent::TogglePause => self.paused = !self.paused,
                InputEvent::SpeedUp => {
                    if self.speed < SPEED_MAX {
                        self.speed += SPEED_STEP;
                    }
                }
                InputEvent::SpeedDown => {
                    self.speed = (self.speed - SPEED_STEP).max(0.0);
                }
                InputEvent::Quit => self.running = false,
                InputEvent::PointerMove { x, y } => {
                    self.pointer = Pointer { x, y };
                    // Pointer scrub overrides autoplay for this tick.
                    if !self.paused {
                        self.time_fraction = y;
                    }
                }
                InputEvent::Close => {
                    self.running = false;
                    break;
                }
            }
        }
    }

    /// Advance the cyclic time cursor by the current speed, wrapping at 1.
    pub fn advance_time(&mut self) {
        self.time_fraction = (self.time_fraction + self.speed).rem_euclid(1.0);
    }

    /// Time index derived from the time cursor.
    pub fn time_index(&self, time_len: usize) -> usize {
        index_for(self.time_fraction, time_len)
    }

    /// Pressure-level index derived from the horizontal pointer position.
    pub fn level_index(&self, level_len: usize) -> usize {
        index_for(self.pointer.x, level_len)
    }

    /// Grid cell (lat, lon) under the pointer, for the status probe.
    pub fn probe_indices(&self, lat_len: usize, lon_len: usize) -> (usize, usize) {
        (
            index_for(self.pointer.y, lat_len),
            index_for(self.pointer.x, lon_len),
        )
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a fraction in [0, 1] to an index in [0, len), floor-protected so the
/// upper boundary never indexes out of range.
fn index_for(fraction: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((fraction * len as f64) as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_up_never_exceeds_ceiling() {
        let mut state = ViewState::new();
        state.speed = 0.0;
        for _ in 0..10_000 {
            state.handle_events([InputEvent::SpeedUp]);
        }
        assert!(state.speed <= SPEED_MAX + SPEED_STEP * 0.5);
        // One more press from the ceiling is a no-op.
        let at_ceiling = state.speed;
        state.handle_events([InputEvent::SpeedUp]);
        assert_eq!(state.speed, at_ceiling);
    }

    #[test]
    fn speed_down_never_goes_negative() {
        let mut state = ViewState::new();
        state.speed = SPEED_STEP * 2.5;
        for _ in 0..100 {
            state.handle_events([InputEvent::SpeedDown]);
        }
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn time_wraps_modulo_one() {
        let mut state = ViewState::new();
        state.time_fraction = 0.999;
        state.speed = 0.005;
        state.advance_time();
        assert!((state.time_fraction - 0.004).abs() < 1e-9);
        assert!(state.time_fraction >= 0.0 && state.time_fraction < 1.0);
    }

    #[test]
    fn pointer_maps_to_level_index() {
        let mut state = ViewState::new();
        state.pointer.x = 0.5;
        assert_eq!(state.level_index(10), 5);
    }

    #[test]
    fn boundary_pointer_stays_in_range() {
        let mut state = ViewState::new();
        state.pointer.x = 1.0;
        state.pointer.y = 1.0;
        assert_eq!(state.level_index(10), 9);
        assert_eq!(state.probe_indices(73, 144), (72, 143));
        state.time_fraction = 1.0; // not reachable via advance_time, but clamped anyway
        assert_eq!(state.time_index(100), 99);
    }

    #[test]
    fn empty_axis_yields_zero_index() {
        let state = ViewState::new();
        assert_eq!(state.time_index(0), 0);
    }

    #[test]
    fn space_toggles_pause() {
        let mut state = ViewState::new();
        assert!(state.paused);
        state.handle_events([InputEvent::TogglePause]);
        assert!(!state.paused);
        state.handle_events([InputEvent::TogglePause]);
        assert!(state.paused);
    }

    #[test]
    fn quit_key_stops_running() {
        let mut state = ViewState::new();
        state.handle_events([InputEvent::Quit]);
        assert!(!state.running);
    }

    #[test]
    fn pointer_scrubs_time_only_when_playing() {
        let mut state = ViewState::new();
        state.handle_events([InputEvent::PointerMove { x: 0.2, y: 0.7 }]);
        assert_eq!(state.pointer, Pointer { x: 0.2, y: 0.7 });
        assert_eq!(state.time_fraction, 0.0); // paused: no scrub

        state.handle_events([
            InputEvent::TogglePause,
            InputEvent::PointerMove { x: 0.2, y: 0.7 },
        ]);
        assert_eq!(state.time_fraction, 0.7);
    }

    #[test]
    fn close_stops_processing_remaining_events() {
        let mut state = ViewState::new();
        state.handle_events([InputEvent::Close, InputEvent::TogglePause]);
        assert!(!state.running);
        assert!(state.paused); // the toggle after Close was never applied
    }
}
