//! Live stereo low-pass filter.
//!
//! Captures from an input device (or a test generator), filters each channel
//! through its own biquad and plays the result.
//!
//! Up/Down retune the cutoff by a semitone; SPACE, Q or ESC stop.

use std::io::{self, Write, stdout};
use std::panic;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use biquad_live::config::{DEFAULT_LATENCY_MS, SAMPLE_RATE};
use biquad_live::device::{
    DeviceInfo, Direction, DuplexStream, StreamInput, default_device, device_at, list_devices,
};
use biquad_live::render::render_wav;
use biquad_live::{BUTTERWORTH_Q, FilterControl, Settings, SineOscillator, WhiteNoise};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Frequency ratio of one equal-tempered semitone.
const SEMITONE: f64 = 1.059_463_094_359_295_3;

#[derive(Parser, Debug)]
#[command(name = "biquad-live", version, about = "Real-time stereo low-pass biquad filter")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter live audio (the default)
    Run(RunArgs),
    /// List audio devices and their numbers
    Devices,
    /// Filter a WAV file offline
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Cutoff frequency in Hz; prompted for when omitted
    #[arg(short, long)]
    cutoff: Option<f64>,

    /// Quality factor
    #[arg(short, long, default_value_t = BUTTERWORTH_Q)]
    q: f64,

    /// Input device number; prompted for when omitted
    #[arg(short, long)]
    input: Option<usize>,

    /// Output device number; prompted for when omitted
    #[arg(short, long)]
    output: Option<usize>,

    /// Use the host's default devices instead of prompting
    #[arg(long)]
    default_devices: bool,

    /// What to filter
    #[arg(short, long, value_enum, default_value_t = Source::Capture)]
    source: Source,

    /// Capture-to-playback buffering in milliseconds
    #[arg(long, default_value_t = DEFAULT_LATENCY_MS)]
    latency_ms: f64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// WAV file to read
    input: PathBuf,

    /// WAV file to write (32-bit float)
    output: PathBuf,

    /// Cutoff frequency in Hz
    #[arg(short, long, default_value_t = biquad_live::config::DEFAULT_CUTOFF_HZ)]
    cutoff: f64,

    /// Quality factor
    #[arg(short, long, default_value_t = BUTTERWORTH_Q)]
    q: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Audio captured from an input device
    Capture,
    /// White noise test signal
    Noise,
    /// 220 Hz sine test signal
    Sine,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Command::Run(args)) => run(args),
        Some(Command::Devices) => print_devices(),
        Some(Command::Render(args)) => render(args),
        None => run(cli.run),
    }
}

fn print_devices() -> Result<()> {
    let host = cpal::default_host();
    for device in list_devices(&host)? {
        let direction = match (device.has_input, device.has_output) {
            (true, true) => "input/output",
            (true, false) => "input",
            (false, true) => "output",
            (false, false) => "unusable",
        };
        println!("{} ({})", device, direction);
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let summary = render_wav(&args.input, &args.output, args.cutoff, args.q)
        .with_context(|| format!("rendering {}", args.input.display()))?;
    println!(
        "Wrote {} frames ({} ch, {} Hz) to {}, peak {:.3}",
        summary.frames,
        summary.channels,
        summary.sample_rate,
        args.output.display(),
        summary.peak
    );
    Ok(())
}

/// Prints `message` and parses one line of stdin.
fn prompt<T>(message: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    print!("{}", message);
    stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim();
    line.parse::<T>()
        .with_context(|| format!("could not parse {:?}", line))
}

fn choose_device(
    host: &cpal::Host,
    index: Option<usize>,
    use_default: bool,
    direction: Direction,
) -> Result<cpal::Device> {
    if let Some(index) = index {
        return Ok(device_at(host, index, direction)?);
    }
    if use_default {
        return Ok(default_device(host, direction)?);
    }

    let candidates: Vec<DeviceInfo> = list_devices(host)?
        .into_iter()
        .filter(|d| d.supports(direction))
        .collect();
    for device in &candidates {
        println!("{} ({})", device, direction);
    }
    let index: usize = prompt(&format!("\nType AUDIO {} device number: ", direction))?;
    let device = device_at(host, index, direction)?;
    if let Some(info) = candidates.iter().find(|d| d.index == index) {
        println!("Opening AUDIO {} device [{}] {}", direction, info.host, info.name);
    }
    Ok(device)
}

fn run(args: RunArgs) -> Result<()> {
    let cutoff_hz = match args.cutoff {
        Some(cutoff) => cutoff,
        None => prompt("Type the cutoff frequency in Hertz: ")?,
    };
    let settings = Settings {
        cutoff_hz,
        q: args.q,
        latency_ms: args.latency_ms,
        ..Settings::default()
    };
    settings.validate().context("invalid filter settings")?;

    let host = cpal::default_host();
    let output = choose_device(&host, args.output, args.default_devices, Direction::Output)?;
    let capture;
    let input = match args.source {
        Source::Capture => {
            capture = choose_device(&host, args.input, args.default_devices, Direction::Input)?;
            StreamInput::Device(&capture)
        }
        Source::Noise => StreamInput::Generator(Box::new(WhiteNoise::new())),
        Source::Sine => StreamInput::Generator(Box::new(SineOscillator::<SAMPLE_RATE>::new(220.0))),
    };

    let stream = DuplexStream::open(&settings, input, &output)?;
    stream.start()?;
    info!(source = ?args.source, "running");

    let result = interact(stream.control());
    stream.close()?;
    result
}

/// Runs the key loop until a quit key is pressed, restoring the terminal on
/// exit or panic.
fn interact(control: &FilterControl) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(crossterm::cursor::Hide)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    let result = key_loop(control);
    cleanup_terminal();
    result
}

fn key_loop(control: &FilterControl) -> Result<()> {
    loop {
        draw_ui(control)?;
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }
        match key_event.code {
            KeyCode::Up | KeyCode::Right => {
                control.scale_cutoff(SEMITONE)?;
            }
            KeyCode::Down | KeyCode::Left => {
                control.scale_cutoff(1.0 / SEMITONE)?;
            }
            code if is_quit_key(code) => return Ok(()),
            _ => {}
        }
    }
}

fn draw_ui(control: &FilterControl) -> Result<()> {
    let peak = control.peak();
    let peak_db = if peak > 0.0 {
        20.0 * peak.log10()
    } else {
        f32::NEG_INFINITY
    };

    let mut stdout = stdout();
    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "Cutoff: {:.1} Hz | Q: {:.3} | Peak: {:.1} dBFS | Underruns: {} | Overruns: {}",
        control.cutoff_hz(),
        control.q(),
        peak_db,
        control.underruns(),
        control.overruns()
    )?;
    stdout.execute(crossterm::cursor::MoveTo(0, 1))?;
    write!(stdout, "UP/DOWN=tune  SPACE/Q=quit")?;
    stdout.flush()?;
    Ok(())
}

fn cleanup_terminal() {
    let _ = stdout().execute(crossterm::cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

fn is_quit_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Char(' ') | KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
    )
}
