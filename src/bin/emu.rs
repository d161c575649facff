use std::{path::PathBuf, sync::Arc, time::Duration, time::Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SquareWave};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use cookie8::{
    Chip8, Chip8Runner, Chip8RunnerResult, DEFAULT_CYCLE_HZ, DISPLAY_X, DISPLAY_Y, Display, Mode,
    u4,
};

/// Length of the tone played each time the sound timer runs out.
const BEEP_DURATION: Duration = Duration::from_millis(200);
const BEEP_HZ: f32 = 440.0;

const PIXEL_ON: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
const PIXEL_OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

/// Mapping from physical keyboard keys to CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x00
    KeyCode::Digit1, // 0x01
    KeyCode::Digit2, // 0x02
    KeyCode::Digit3, // 0x03
    KeyCode::KeyQ,   // 0x04
    KeyCode::KeyW,   // 0x05
    KeyCode::KeyE,   // 0x06
    KeyCode::KeyA,   // 0x07
    KeyCode::KeyS,   // 0x08
    KeyCode::KeyD,   // 0x09
    KeyCode::KeyZ,   // 0x0A
    KeyCode::KeyC,   // 0x0B
    KeyCode::Digit4, // 0x0C
    KeyCode::KeyR,   // 0x0D
    KeyCode::KeyF,   // 0x0E
    KeyCode::KeyV,   // 0x0F
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,
    scale: u32,

    /// Audio output stream (must be kept alive).
    _audio_stream: OutputStream,
    audio_sink: Sink,

    runner: Chip8Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(chip8: Chip8, args: &Args) -> anyhow::Result<Self> {
        // Initialize audio
        let mut _audio_stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        _audio_stream.log_on_drop(false);
        let audio_sink = Sink::connect_new(_audio_stream.mixer());

        Ok(Self {
            pixels: None,
            window: None,
            scale: args.scale,

            _audio_stream,
            audio_sink,

            runner: Chip8Runner::with_cycle_hz(chip8, args.hz),
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn beep(&self) {
        self.audio_sink.append(
            SquareWave::new(BEEP_HZ)
                .amplify(0.25)
                .take_duration(BEEP_DURATION),
        );
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(
                DISPLAY_X as u32 * self.scale,
                DISPLAY_Y as u32 * self.scale,
            );
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("Cookie Chip-8 Emulator")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let mut pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
                .context("Failed to create pixels surface")?;
            draw_display(pixels.frame_mut(), self.runner.chip8_ref().display());

            window.request_redraw();
            Some(pixels)
        };

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                let result = self.runner.update(dt).context("Chip8 execution error")?;

                if self.runner.take_beep() {
                    self.beep();
                }

                if let (Some(pixels), Some(display)) =
                    (self.pixels.as_mut(), self.runner.take_frame())
                {
                    draw_display(pixels.frame_mut(), display);
                }

                if let Some(pixels) = self.pixels.as_ref() {
                    pixels.render().context("Pixels render error")?;
                }

                if result == Chip8RunnerResult::Halted {
                    log::info!("Program halted, closing window");
                    event_loop.exit();
                } else if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                    let pressed = event.state == ElementState::Pressed;
                    self.runner.set_key(u4::new(key as u8), pressed);
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

/// Copies the 0/1 display cells into an RGBA frame.
fn draw_display(frame: &mut [u8], display: &Display<u8>) {
    for (i, pxl) in frame.chunks_exact_mut(4).enumerate() {
        let x = i % DISPLAY_X;
        let y = i / DISPLAY_X;

        let rgba = if display[y][x] == 1 { PIXEL_ON } else { PIXEL_OFF };
        pxl.copy_from_slice(&rgba);
    }
}

/// CHIP-8 emulator written in Rust.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Escape is used to exit the emulator. Set RUST_LOG=trace to log every instruction.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Window scale factor applied to the 64x32 display
    #[arg(value_parser = clap::value_parser!(u32).range(1..=64))]
    scale: u32,

    /// Enable the SCHIP instructions (exit, large font, RPL flags)
    #[arg(long = "super")]
    super_mode: bool,

    /// Interpreter cycles per second
    #[arg(long, default_value_t = DEFAULT_CYCLE_HZ, value_parser = parse_cycle_hz)]
    hz: f32,
}

fn parse_cycle_hz(s: &str) -> Result<f32, String> {
    let hz: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if hz.is_finite() && hz >= 1.0 {
        Ok(hz)
    } else {
        Err(format!("{s} is not a cycle rate of at least 1 Hz"))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mode = if args.super_mode {
        Mode::Super
    } else {
        Mode::Classic
    };
    let mut chip8 = Chip8::with_mode(mode);
    chip8
        .load_file(&args.rom_path)
        .context("Failed to load ROM into CHIP-8 memory")?;
    log::info!(
        "Starting {} in {:?} mode at {} Hz",
        args.rom_path.display(),
        mode,
        args.hz
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(chip8, &args).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
