//! Display driver with framebuffer management and partial refresh.
//!
//! Wraps a [`Panel`] with two packed frames and implements
//! `embedded_graphics::DrawTarget` for rendering.
//!
//! # Lifecycle
//! - [`EpdDisplay::new`] only stores the panel and configuration.
//! - [`EpdDisplay::setup`] allocates both frames. Failure is fatal: the display is
//!   marked failed, drawing is ignored and refreshes return [`Error::Failed`].
//! - [`EpdDisplay::update`] renders through a closure and refreshes; this is what the
//!   host scheduler calls periodically.
//!
//! # Refresh policy
//! Each [`EpdDisplay::display`] call powers the panel, then either redraws the whole
//! screen (every `full_refresh_interval` calls, starting with the first) or only the
//! padded area that changed since the last refresh. Afterwards the current frame is
//! committed as the new reference and the panel is powered off.
//!
//! # Concurrency
//! All operations take `&mut self`, so a refresh always sees a consistent pair of
//! frames. To draw from several threads, put the whole display behind a mutex.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::prelude::{OriginDimensions, Size};
use embedded_graphics::Pixel;
use log::{debug, error, info, trace};

use crate::color::gray_level;
use crate::config::Config;
use crate::error::{BufferKind, Error};
use crate::framebuffer::{PackedBuffer, WHITE_PAIR};
use crate::panel::Panel;
use crate::{dirty, region, Color, Rect, HEIGHT, WIDTH};

/// Initialization priority hint of a component that talks to on-board peripherals.
/// Higher values are set up earlier.
pub const SETUP_PRIORITY_PROCESSOR: f32 = 400.0;

/// Panel supply state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Rails are down
    #[default]
    Off,
    /// Rails are up
    On,
}

/// Color depth reported to the rendering framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayType {
    /// Two-tone rendering
    Binary,
    /// 16 gray levels
    Grayscale,
}

/// What a call to [`EpdDisplay::display`] sent to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshKind {
    /// The whole screen was cleared and redrawn
    Full,
    /// Only the given area was cleared and redrawn
    Partial(Rect),
    /// Nothing changed, nothing was sent
    Skipped,
}

/// The current frame and the frame last sent to the panel.
struct Frames {
    current: PackedBuffer,
    previous: PackedBuffer,
}

enum State {
    Uninitialized,
    Ready(Frames),
    Failed,
}

/// Partial-refresh display driver for the 960×540 panel.
pub struct EpdDisplay<P> {
    panel: P,
    config: Config,
    state: State,
    power: PowerState,
    refresh_count: u32,
}

impl<P: Panel> EpdDisplay<P> {
    /// Create a display driver; call [`setup`](Self::setup) before drawing.
    pub fn new(panel: P, config: Config) -> Self {
        Self {
            panel,
            config,
            state: State::Uninitialized,
            power: PowerState::Off,
            refresh_count: 0,
        }
    }

    /// Allocate and whiten both frames.
    ///
    /// Calling this again replaces the frames with fresh white ones.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if either frame cannot be allocated. The display is then
    /// marked failed for good. [`Error::Failed`] if it already was.
    pub fn setup(&mut self) -> Result<(), Error> {
        trace!("Initialize called");
        if matches!(self.state, State::Failed) {
            return Err(Error::Failed);
        }
        self.setup_frames(WIDTH, HEIGHT)
    }

    fn setup_frames(&mut self, width: usize, height: usize) -> Result<(), Error> {
        // release old frames before asking for new ones
        self.state = State::Uninitialized;

        match Self::allocate_frames(width, height) {
            Ok(frames) => {
                self.state = State::Ready(frames);
                trace!("Initialize complete");
                Ok(())
            }
            Err(e) => {
                error!("Could not allocate buffer for display: {}", e);
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn allocate_frames(width: usize, height: usize) -> Result<Frames, Error> {
        let current = PackedBuffer::try_new(width, height, BufferKind::Current)?;
        let previous = PackedBuffer::try_new(width, height, BufferKind::Previous)?;
        Ok(Frames { current, previous })
    }

    /// Write one pixel into the current frame.
    ///
    /// Pixels outside the panel are dropped, as is everything drawn before a
    /// successful [`setup`](Self::setup).
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        if let State::Ready(frames) = &mut self.state {
            frames
                .current
                .set_gray(x as usize, y as usize, gray_level(color));
        }
    }

    /// Render with `render`, then refresh the panel.
    ///
    /// # Errors
    ///
    /// Same as [`display`](Self::display); `render` is not called if the display is
    /// not usable.
    pub fn update<F>(&mut self, render: F) -> Result<RefreshKind, Error>
    where
        F: FnOnce(&mut Self),
    {
        self.ensure_ready()?;
        render(self);
        self.display()
    }

    /// Push the current frame to the panel.
    ///
    /// # Errors
    ///
    /// [`Error::NotSetUp`] or [`Error::Failed`] if the frames are not available; the
    /// panel is not touched in that case. [`Error::Allocation`] if the scratch buffer
    /// for a partial refresh cannot be allocated; nothing is drawn, the frame is not
    /// committed and will be picked up again by the next refresh.
    pub fn display(&mut self) -> Result<RefreshKind, Error> {
        trace!("Display called");
        self.ensure_ready()?;

        self.eink_on();
        let result = self.refresh();
        self.eink_off();

        if let Ok(kind) = &result {
            debug!("Display finished ({:?})", kind);
        }
        result
    }

    fn refresh(&mut self) -> Result<RefreshKind, Error> {
        let State::Ready(frames) = &mut self.state else {
            return Err(Error::NotSetUp);
        };
        let (passes, cycles) = (self.config.clear_passes, self.config.clear_cycles);

        let kind = if self.refresh_count % self.config.full_refresh_interval.max(1) == 0 {
            let area = self.panel.full_screen();
            self.panel.clear_area(area, passes, cycles);
            self.panel
                .draw_grayscale_image(area, frames.current.as_bytes());
            self.refresh_count = 0;
            RefreshKind::Full
        } else {
            let area = dirty::dirty_rect_with_margin(
                &frames.current,
                &frames.previous,
                self.config.dirty_margin,
            );
            if area.width > 0 && area.height > 0 {
                let scratch = region::extract_region(&frames.current, area).inspect_err(|e| {
                    error!("Partial refresh skipped: {}", e);
                })?;
                self.panel.clear_area(area, passes, cycles);
                self.panel.draw_grayscale_image(area, &scratch);
                RefreshKind::Partial(area)
            } else {
                RefreshKind::Skipped
            }
        };

        frames.previous.copy_from(&frames.current);
        self.refresh_count += 1;
        Ok(kind)
    }

    /// Clear the whole panel and reset both frames to white.
    ///
    /// # Errors
    ///
    /// [`Error::NotSetUp`] or [`Error::Failed`] if the frames are not available.
    pub fn clean(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.eink_on();
        let area = self.panel.full_screen();
        self.panel
            .clear_area(area, self.config.clear_passes, self.config.clear_cycles);
        if let State::Ready(frames) = &mut self.state {
            frames.current.fill(WHITE_PAIR);
            frames.previous.fill(WHITE_PAIR);
        }
        self.eink_off();
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        match self.state {
            State::Ready(_) => Ok(()),
            State::Uninitialized => Err(Error::NotSetUp),
            State::Failed => Err(Error::Failed),
        }
    }

    fn eink_on(&mut self) {
        trace!("Eink on called");
        if self.power == PowerState::On {
            return;
        }
        self.panel.power_on();
        self.power = PowerState::On;
    }

    fn eink_off(&mut self) {
        trace!("Eink off called");
        if self.power == PowerState::Off {
            return;
        }
        self.panel.power_off();
        self.power = PowerState::Off;
    }

    /// Log the configuration.
    pub fn dump_config(&self) {
        info!("T547");
        info!("  Dimensions: {}px x {}px", WIDTH, HEIGHT);
        info!("  Type: {:?}", self.display_type());
        info!(
            "  Full refresh every: {} updates",
            self.config.full_refresh_interval
        );
        info!("  Dirty margin: {}px", self.config.dirty_margin);
        if self.is_failed() {
            info!("  Setup failed");
        }
    }

    /// Color depth reported to the rendering framework.
    pub fn display_type(&self) -> DisplayType {
        if self.config.greyscale {
            DisplayType::Grayscale
        } else {
            DisplayType::Binary
        }
    }

    /// Initialization priority hint for the host scheduler.
    pub fn setup_priority(&self) -> f32 {
        SETUP_PRIORITY_PROCESSOR
    }

    /// Current supply state of the panel.
    pub fn panel_state(&self) -> PowerState {
        self.power
    }

    /// Refreshes since the last full refresh, counting the full refresh itself.
    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    /// Returns `true` if setup failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The frame that drawing goes into, once set up.
    pub fn current_buffer(&self) -> Option<&PackedBuffer> {
        match &self.state {
            State::Ready(frames) => Some(&frames.current),
            _ => None,
        }
    }

    /// The frame last sent to the panel, once set up.
    pub fn previous_buffer(&self) -> Option<&PackedBuffer> {
        match &self.state {
            State::Ready(frames) => Some(&frames.previous),
            _ => None,
        }
    }

    /// Access the underlying panel driver.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Mutable access to the underlying panel driver (for advanced use).
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Give the panel driver back, dropping the frames.
    pub fn release(self) -> P {
        self.panel
    }
}

impl<P: Panel> DrawTarget for EpdDisplay<P> {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if let State::Ready(frames) = &mut self.state {
            frames.current.fill_gray(gray_level(color));
        }
        Ok(())
    }
}

impl<P> OriginDimensions for EpdDisplay<P> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<P> core::fmt::Debug for EpdDisplay<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match self.state {
            State::Uninitialized => "uninitialized",
            State::Ready(_) => "ready",
            State::Failed => "failed",
        };
        f.debug_struct("EpdDisplay")
            .field("state", &state)
            .field("power", &self.power)
            .field("refresh_count", &self.refresh_count)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::panel::mock::{Call, RecordingPanel};
    use embedded_graphics::pixelcolor::RgbColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    type TestDisplay = EpdDisplay<RecordingPanel>;

    fn ready() -> TestDisplay {
        let mut display = EpdDisplay::new(RecordingPanel::default(), Config::default());
        display.setup().unwrap();
        display
    }

    /// Display that has already done its first (full) refresh.
    fn primed() -> TestDisplay {
        let mut display = ready();
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
        display.panel_mut().take();
        display
    }

    fn checksum(display: &TestDisplay) -> u64 {
        display
            .current_buffer()
            .unwrap()
            .as_bytes()
            .iter()
            .map(|&b| u64::from(b))
            .sum()
    }

    fn assert_committed(display: &TestDisplay) {
        assert_eq!(
            display.current_buffer().unwrap().as_bytes(),
            display.previous_buffer().unwrap().as_bytes()
        );
    }

    #[test]
    fn test_setup_whitens_both_frames() {
        let display = ready();
        let current = display.current_buffer().unwrap();
        let previous = display.previous_buffer().unwrap();
        assert_eq!(current.len(), crate::BUFFER_LEN);
        assert!(current.as_bytes().iter().all(|&b| b == 0xFF));
        assert!(previous.as_bytes().iter().all(|&b| b == 0xFF));
        assert!(!display.is_failed());
        assert_eq!(display.panel_state(), PowerState::Off);
        assert!(display.panel().calls.is_empty());
    }

    #[test]
    fn test_not_set_up() {
        let mut display = EpdDisplay::new(RecordingPanel::default(), Config::default());
        display.draw_pixel(1, 1, Color::WHITE);
        assert!(display.current_buffer().is_none());
        assert_eq!(display.display(), Err(Error::NotSetUp));
        assert_eq!(display.clean(), Err(Error::NotSetUp));
        assert!(display.panel().calls.is_empty());
    }

    #[test]
    fn test_failed_display_is_inert() {
        let mut display = ready();
        display.state = State::Failed;
        display.draw_pixel(1, 1, Color::WHITE);
        let mut rendered = false;
        assert_eq!(display.update(|_| rendered = true), Err(Error::Failed));
        assert!(!rendered);
        assert_eq!(display.display(), Err(Error::Failed));
        assert_eq!(display.setup(), Err(Error::Failed));
        assert!(display.is_failed());
        assert!(display.panel().calls.is_empty());
    }

    #[test]
    fn test_allocation_failure_marks_failed() {
        let mut display = ready();
        let result = display.setup_frames(usize::MAX - 1, 1);
        assert!(matches!(
            result,
            Err(Error::Allocation {
                buffer: BufferKind::Current,
                ..
            })
        ));
        assert!(display.is_failed());
        assert!(display.current_buffer().is_none());
        assert_eq!(display.setup(), Err(Error::Failed));
        assert_eq!(display.display(), Err(Error::Failed));
        assert!(display.panel().calls.is_empty());
    }

    #[test]
    fn test_draw_pixel_writes_gray_nibble() {
        let mut display = ready();
        display.draw_pixel(100, 50, Color::WHITE);
        let fb = display.current_buffer().unwrap();
        assert_eq!(fb.nibble(100, 50), 0x0);
        assert_eq!(fb.as_bytes()[50 * 480 + 50], 0xF0);

        display.draw_pixel(101, 50, Color::new(128, 128, 128));
        let fb = display.current_buffer().unwrap();
        assert_eq!(fb.nibble(101, 50), gray_level(Color::new(128, 128, 128)) >> 4);
        assert_eq!(fb.as_bytes()[50 * 480 + 50], 0x80);
    }

    #[test]
    fn test_draw_black_matches_blank_frame() {
        let mut display = ready();
        display.draw_pixel(100, 50, Color::BLACK);
        // gray 255 packs to 0xF, the same as an untouched pixel
        assert_eq!(display.current_buffer().unwrap().nibble(100, 50), 0xF);
        assert_eq!(display.current_buffer().unwrap().as_bytes()[50 * 480 + 50], 0xFF);
    }

    #[test]
    fn test_draw_pixel_clipping() {
        let mut display = ready();
        let before = checksum(&display);
        for (x, y) in [
            (-1, 0),
            (0, -1),
            (960, 0),
            (0, 540),
            (i32::MIN, i32::MIN),
            (i32::MAX, 10),
            (10, i32::MAX),
        ] {
            display.draw_pixel(x, y, Color::WHITE);
        }
        assert_eq!(checksum(&display), before);
    }

    #[test]
    fn test_first_display_is_full() {
        let mut display = ready();
        assert_eq!(display.refresh_count(), 0);
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
        assert_eq!(display.refresh_count(), 1);
        assert_eq!(display.panel_state(), PowerState::Off);

        let calls = display.panel_mut().take();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::PowerOn);
        assert_eq!(
            calls[1],
            Call::Clear {
                area: Rect::new(0, 0, 960, 540),
                passes: 1,
                cycles: 10
            }
        );
        match &calls[2] {
            Call::Draw { area, data } => {
                assert_eq!(*area, Rect::full_screen());
                assert_eq!(data.len(), crate::BUFFER_LEN);
                assert!(data.iter().all(|&b| b == 0xFF));
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(calls[3], Call::PowerOff);
    }

    #[test]
    fn test_unchanged_frame_skips_partial() {
        let mut display = primed();
        assert_eq!(display.display().unwrap(), RefreshKind::Skipped);
        assert_eq!(
            display.panel_mut().take(),
            vec![Call::PowerOn, Call::PowerOff]
        );
        assert_eq!(display.refresh_count(), 2);
    }

    #[test]
    fn test_partial_refresh_sends_dirty_area() {
        let mut display = primed();
        display.draw_pixel(100, 50, Color::WHITE);
        let area = Rect::new(90, 40, 21, 21);
        assert_eq!(display.display().unwrap(), RefreshKind::Partial(area));

        let calls = display.panel_mut().take();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::PowerOn);
        assert_eq!(
            calls[1],
            Call::Clear {
                area,
                passes: 1,
                cycles: 10
            }
        );
        match &calls[2] {
            Call::Draw { area: drawn, data } => {
                assert_eq!(*drawn, area);
                assert_eq!(data.len(), 11 * 21);
                assert_eq!(data.iter().filter(|&&b| b != 0xFF).count(), 1);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(calls[3], Call::PowerOff);
        assert_committed(&display);
    }

    #[test]
    fn test_partial_refresh_at_origin_clamps() {
        let mut display = primed();
        display.draw_pixel(0, 0, Color::WHITE);
        assert_eq!(
            display.display().unwrap(),
            RefreshKind::Partial(Rect::new(0, 0, 11, 11))
        );
    }

    #[test]
    fn test_commit_after_every_refresh() {
        let mut display = ready();
        display.draw_pixel(5, 5, Color::WHITE);
        display.display().unwrap();
        assert_committed(&display);

        display.draw_pixel(500, 300, Color::new(10, 200, 30));
        display.display().unwrap();
        assert_committed(&display);

        // nothing changed, still committed
        display.display().unwrap();
        assert_committed(&display);
    }

    #[test]
    fn test_full_refresh_cycle() {
        let mut display = primed();
        for count in 1..10 {
            assert_eq!(display.refresh_count(), count);
            display.draw_pixel(count as i32 * 50, 100, Color::WHITE);
            assert!(matches!(
                display.display().unwrap(),
                RefreshKind::Partial(_)
            ));
        }
        assert_eq!(display.refresh_count(), 10);
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
        assert_eq!(display.refresh_count(), 1);
        assert!(matches!(
            display.display().unwrap(),
            RefreshKind::Skipped
        ));
    }

    #[test]
    fn test_custom_full_refresh_interval() {
        let config = Config::default().with_full_refresh_interval(2);
        let mut display = EpdDisplay::new(RecordingPanel::default(), config);
        display.setup().unwrap();
        let kinds: Vec<RefreshKind> = (0..5).map(|_| display.display().unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                RefreshKind::Full,
                RefreshKind::Skipped,
                RefreshKind::Full,
                RefreshKind::Skipped,
                RefreshKind::Full
            ]
        );
    }

    #[test]
    fn test_zero_interval_field_does_not_panic() {
        let mut config = Config::default();
        config.full_refresh_interval = 0;
        let mut display = EpdDisplay::new(RecordingPanel::default(), config);
        display.setup().unwrap();
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
    }

    #[test]
    fn test_negative_margin_field_still_draws_changes() {
        let mut config = Config::default();
        config.dirty_margin = -5;
        let mut display = EpdDisplay::new(RecordingPanel::default(), config);
        display.setup().unwrap();
        assert_eq!(display.display().unwrap(), RefreshKind::Full);
        display.panel_mut().take();

        display.draw_pixel(100, 50, Color::WHITE);
        let area = Rect::new(100, 50, 1, 1);
        assert_eq!(display.display().unwrap(), RefreshKind::Partial(area));
        assert_eq!(
            display.panel_mut().take(),
            vec![
                Call::PowerOn,
                Call::Clear {
                    area,
                    passes: 1,
                    cycles: 10
                },
                Call::Draw {
                    area,
                    data: vec![0xF0]
                },
                Call::PowerOff,
            ]
        );
        assert_committed(&display);
    }

    #[test]
    fn test_custom_margin_and_clear_cycles() {
        let config = Config::default()
            .with_dirty_margin(0)
            .with_clear_cycles(3, 7);
        let mut display = EpdDisplay::new(RecordingPanel::default(), config);
        display.setup().unwrap();
        display.display().unwrap();
        display.panel_mut().take();

        display.draw_pixel(100, 50, Color::WHITE);
        let area = Rect::new(100, 50, 1, 1);
        assert_eq!(display.display().unwrap(), RefreshKind::Partial(area));
        let calls = display.panel_mut().take();
        assert_eq!(
            calls[1],
            Call::Clear {
                area,
                passes: 3,
                cycles: 7
            }
        );
        assert_eq!(
            calls[2],
            Call::Draw {
                area,
                data: vec![0xF0]
            }
        );
    }

    #[test]
    fn test_update_renders_then_refreshes() {
        let mut display = primed();
        let kind = display
            .update(|d| {
                Rectangle::new(Point::new(100, 100), Size::new(20, 10))
                    .into_styled(PrimitiveStyle::with_fill(Color::WHITE))
                    .draw(d)
                    .unwrap();
            })
            .unwrap();
        assert_eq!(kind, RefreshKind::Partial(Rect::new(90, 90, 40, 30)));
        assert_committed(&display);
    }

    #[test]
    fn test_draw_target_clips() {
        let mut display = ready();
        Rectangle::new(Point::new(-5, -5), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Color::WHITE))
            .draw(&mut display)
            .unwrap();
        let fb = display.current_buffer().unwrap();
        assert_eq!(fb.nibble(0, 0), 0x0);
        assert_eq!(fb.nibble(4, 4), 0x0);
        assert_eq!(fb.nibble(5, 5), 0xF);
    }

    #[test]
    fn test_draw_target_clear() {
        let mut display = ready();
        display.clear(Color::WHITE).unwrap();
        assert!(display
            .current_buffer()
            .unwrap()
            .as_bytes()
            .iter()
            .all(|&b| b == 0x00));
        display.clear(Color::BLACK).unwrap();
        assert!(display
            .current_buffer()
            .unwrap()
            .as_bytes()
            .iter()
            .all(|&b| b == 0xFF));
    }

    #[test]
    fn test_clear_whole_screen_refreshes_everything() {
        let mut display = primed();
        display.clear(Color::WHITE).unwrap();
        assert_eq!(
            display.display().unwrap(),
            RefreshKind::Partial(Rect::full_screen())
        );
    }

    #[test]
    fn test_clean() {
        let mut display = primed();
        display.draw_pixel(10, 10, Color::WHITE);
        display.clean().unwrap();
        assert_eq!(
            display.panel_mut().take(),
            vec![
                Call::PowerOn,
                Call::Clear {
                    area: Rect::full_screen(),
                    passes: 1,
                    cycles: 10
                },
                Call::PowerOff
            ]
        );
        assert!(display
            .current_buffer()
            .unwrap()
            .as_bytes()
            .iter()
            .all(|&b| b == 0xFF));
        assert_committed(&display);
        assert_eq!(display.refresh_count(), 1);
    }

    #[test]
    fn test_power_state_machine() {
        let mut display = ready();
        display.eink_on();
        display.eink_on();
        assert_eq!(display.panel_state(), PowerState::On);
        display.eink_off();
        display.eink_off();
        assert_eq!(display.panel_state(), PowerState::Off);
        assert_eq!(
            display.panel_mut().take(),
            vec![Call::PowerOn, Call::PowerOff]
        );
    }

    #[test]
    fn test_display_type() {
        let display = ready();
        assert_eq!(display.display_type(), DisplayType::Grayscale);
        let display = EpdDisplay::new(
            RecordingPanel::default(),
            Config::default().with_greyscale(false),
        );
        assert_eq!(display.display_type(), DisplayType::Binary);
    }

    #[test]
    fn test_setup_priority() {
        let display = ready();
        assert_eq!(display.setup_priority(), SETUP_PRIORITY_PROCESSOR);
    }

    #[test]
    fn test_setup_again_resets_frames() {
        let mut display = ready();
        display.draw_pixel(3, 3, Color::WHITE);
        display.setup().unwrap();
        assert_eq!(display.current_buffer().unwrap().nibble(3, 3), 0xF);
    }

    #[test]
    fn test_origin_dimensions() {
        let display = ready();
        assert_eq!(display.size(), Size::new(960, 540));
        assert_eq!(display.bounding_box().size, Size::new(960, 540));
    }

    #[test]
    fn test_dump_config_and_debug() {
        let display = ready();
        display.dump_config();
        let debug_string = format!("{:?}", display);
        assert!(debug_string.contains("EpdDisplay"));
        assert!(debug_string.contains("ready"));
        assert!(debug_string.contains("refresh_count"));
    }

    #[test]
    fn test_release() {
        let mut display = primed();
        display.display().unwrap();
        let panel = display.release();
        assert_eq!(panel.calls, vec![Call::PowerOn, Call::PowerOff]);
    }
}
