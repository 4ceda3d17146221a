//! Desktop simulator for the airmon air-quality display.
//!
//! Runs the real display loop from `airmon-core` against a synthetic BME680
//! and CPU probe, rendering into an SDL2 window via
//! `embedded-graphics-simulator`. The burn-in is shortened to a few seconds.
//!
//! # Key bindings
//!
//! | Key      | Action |
//! |----------|--------|
//! | Q or Esc | Quit   |

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::{Duration, Instant};

use airmon_core::display::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, Panel};
use airmon_core::framebuffer::FrameBuffer;
use airmon_core::monitor::{SkipReason, Tick};
use airmon_core::{
    CpuTemperature, EnvironmentSensor, HostProbeError, Monitor, MonitorError, SensorError,
    SensorReading, Tuning,
};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Longest stretch a delay sleeps before pumping window events.
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Burn-in length for the simulator, in seconds.
const BURN_IN_SECS: u32 = 10;

/// Polls reported as not heat-stable after start-up.
const HEATER_SETTLE_POLLS: u32 = 3;

/// Clean-air gas resistance of the synthetic sensor.
const CLEAN_AIR_OHMS: f32 = 120_000.0;

// ---------------------------------------------------------------------------
// Window shared by the panel and the delay
// ---------------------------------------------------------------------------

struct Screen {
    display: SimulatorDisplay<Rgb565>,
    window: Window,
    quit: bool,
}

impl Screen {
    fn new() -> Self {
        let display = SimulatorDisplay::<Rgb565>::new(Size::new(
            DISPLAY_WIDTH_PX as u32,
            DISPLAY_HEIGHT_PX as u32,
        ));
        let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
        let window = Window::new("airmon simulator", &output_settings);

        Self {
            display,
            window,
            quit: false,
        }
    }

    /// Redraw the window and drain SDL events.
    ///
    /// The SDL window is created lazily by `update()`, which therefore has to
    /// run before `events()`.
    fn pump(&mut self) {
        self.window.update(&self.display);

        let mut quit = false;
        for event in self.window.events() {
            match event {
                SimulatorEvent::Quit => quit = true,
                SimulatorEvent::KeyDown { keycode, .. }
                    if keycode == Keycode::Q || keycode == Keycode::Escape =>
                {
                    quit = true
                }
                _ => {}
            }
        }

        if quit && !self.quit {
            info!("Quit requested");
            self.quit = true;
        }
    }
}

type SharedScreen = Rc<RefCell<Screen>>;

/// Pushes frames into the simulator window.
struct WindowPanel(SharedScreen);

impl Panel for WindowPanel {
    type Error = Infallible;

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), Self::Error> {
        let mut screen = self.0.borrow_mut();
        frame.flush(&mut screen.display)?;
        screen.pump();
        Ok(())
    }
}

/// Sleeps in frame-sized slices so the window stays responsive, and stops
/// sleeping once quit was requested.
struct WindowDelay(SharedScreen);

impl DelayNs for WindowDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(ns as u64);
        loop {
            let mut screen = self.0.borrow_mut();
            screen.pump();
            let now = Instant::now();
            if screen.quit || now >= deadline {
                return;
            }
            drop(screen);
            std::thread::sleep(FRAME_DURATION.min(deadline - now));
        }
    }
}

// ---------------------------------------------------------------------------
// Synthetic sensors
// ---------------------------------------------------------------------------

/// Generates BME680-like readings that drift slowly over time.
struct MockEnvironment {
    polls: u32,
}

impl MockEnvironment {
    fn new() -> Self {
        Self { polls: 0 }
    }
}

impl EnvironmentSensor for MockEnvironment {
    fn poll(&mut self) -> Result<SensorReading, SensorError> {
        self.polls += 1;
        let t = self.polls as f32;

        // Every few minutes something pollutes the air for a while.
        let pollution = ((t / 40.0).sin() - 0.6).max(0.0) * 1.5;

        Ok(SensorReading {
            temperature: 26.0 + 1.5 * (t / 60.0).sin(),
            humidity: 45.0 + 8.0 * (t / 90.0).sin(),
            pressure: 1013.25 + 2.0 * (t / 300.0).sin(),
            gas_resistance: CLEAN_AIR_OHMS * (1.0 - pollution) + 500.0 * (t / 3.0).sin(),
            heat_stable: self.polls > HEATER_SETTLE_POLLS,
        })
    }
}

/// CPU a few degrees warmer than the room, with some load spikes.
struct MockCpu {
    reads: u32,
}

impl CpuTemperature for MockCpu {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError> {
        self.reads += 1;
        let t = self.reads as f32;
        Ok(42.0 + 3.0 * (t / 20.0).sin())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), MonitorError> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();
    info!("Starting airmon simulator");
    info!(
        "Display: {}x{} (scale {}x), burn-in {} s",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE, BURN_IN_SECS
    );
    info!("Keys: Q=Quit");

    let screen = Rc::new(RefCell::new(Screen::new()));
    screen.borrow_mut().pump();

    let tuning = Tuning::default().with_burn_in_secs(BURN_IN_SECS);
    let mut monitor = Monitor::new(
        MockEnvironment::new(),
        MockCpu { reads: 0 },
        WindowPanel(screen.clone()),
        WindowDelay(screen.clone()),
        Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        tuning,
    );

    monitor.warm_up()?;

    while !screen.borrow().quit {
        match monitor.tick()? {
            Tick::Rendered(readout) => info!(
                "{} | {} | {} | {}",
                readout.temperature_line(),
                readout.humidity_line(),
                readout.pressure_line(),
                readout.air_quality_line()
            ),
            Tick::Skipped(SkipReason::NotHeatStable) => info!("Heater settling, no refresh"),
            Tick::Skipped(SkipReason::SensorFailed(e)) => warn!("Sensor failed: {}", e),
        }
    }

    Ok(())
}
