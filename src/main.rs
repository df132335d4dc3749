//! Harekaze - Chinachu DVR client
//! Command line front-end for recordings, timers and the program guide

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::channel;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

use harekaze::api::*;
use harekaze::download::download_recording;
use harekaze::guide::{format_datetime, format_time, GuideSchedule};
use harekaze::models::{format_size, Program, Recording, Timer};
use harekaze::{ApiError, ChinachuClient, ClientConfig};

#[derive(Parser, Debug)]
#[command(name = "harekaze")]
#[command(about = "Chinachu DVR client", long_about = None)]
struct Args {
    /// Chinachu WUI address, overrides the saved config
    #[arg(long, env = "CHINACHU_ADDRESS", global = true)]
    address: Option<String>,

    #[arg(long, env = "CHINACHU_USERNAME", global = true)]
    username: Option<String>,

    #[arg(long, env = "CHINACHU_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Config file path (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print decoded responses as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recorded programs
    Recordings,
    /// Show one recording
    Recording { id: String },
    /// Show file information of a recording
    FileInfo { id: String },
    /// List reservations
    Timers,
    /// Show one reservation
    Timer { id: String },
    /// Skip a reservation
    Skip { id: String },
    /// Undo skipping a reservation
    Unskip { id: String },
    /// Reserve a program manually
    Reserve { program_id: String },
    /// Delete a reservation
    Unreserve { id: String },
    /// Delete a recording on the server
    DeleteRecording { id: String },
    /// Show the program guide
    Guide {
        /// Only this channel id
        #[arg(long)]
        channel: Option<String>,
        /// Only programs airing now
        #[arg(long)]
        now: bool,
    },
    /// Show one program
    Program { id: String },
    /// Save a channel logo
    Logo {
        channel_id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Save a recording preview thumbnail
    Preview {
        id: String,
        /// Position in seconds
        #[arg(long, default_value = "25")]
        pos: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Download a recording's media
    Download {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show server status
    Status,
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        transcode: Option<bool>,
        #[arg(long)]
        resolution: Option<String>,
        #[arg(long)]
        video_bitrate: Option<u32>,
        #[arg(long)]
        audio_bitrate: Option<u32>,
        #[arg(long)]
        timeout: Option<f64>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args.config.clone().unwrap_or_else(ClientConfig::config_path);
    let mut config = ClientConfig::load_from(&config_path);

    if let Command::Config { action } = &args.command {
        return match run_config(action, &mut config, &config_path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to save config {}: {}", config_path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    if let Some(address) = &args.address {
        config.address = address.clone();
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }

    let client = ChinachuClient::new(config);
    match run(&client, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_config(action: &ConfigAction, config: &mut ClientConfig, path: &Path) -> std::io::Result<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            if !shown.password.is_empty() {
                shown.password = "********".to_string();
            }
            println!("# {}", path.display());
            println!("{}", serde_json::to_string_pretty(&shown)?);
            Ok(())
        }
        ConfigAction::Set {
            address,
            username,
            password,
            transcode,
            resolution,
            video_bitrate,
            audio_bitrate,
            timeout,
        } => {
            if let Some(v) = address { config.address = v.clone(); }
            if let Some(v) = username { config.username = v.clone(); }
            if let Some(v) = password { config.password = v.clone(); }
            if let Some(v) = transcode { config.transcode = *v; }
            if let Some(v) = resolution { config.video_resolution = v.clone(); }
            if let Some(v) = video_bitrate { config.video_bitrate = *v; }
            if let Some(v) = audio_bitrate { config.audio_bitrate = *v; }
            if let Some(v) = timeout { config.request_timeout_secs = *v; }
            config.save_to(path)?;
            println!("Saved {}", path.display());
            Ok(())
        }
    }
}

/// Run the request on a worker and wait for its result, like the UI loop does
fn fetch<R>(client: &ChinachuClient, request: R) -> Result<R::Response, String>
where
    R: ApiRequest + Send + 'static,
    R::Response: Send + 'static,
{
    let (sender, receiver) = channel();
    let handle = client.send_to(request, sender);
    let result = receiver
        .recv()
        .map_err(|_| "Request worker stopped unexpectedly".to_string())?;
    let _ = handle.join();
    result.map_err(|e: ApiError| e.message())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn program_line(program: &Program) -> String {
    format!(
        "{}  {} ({}min)  [{}] {}",
        program.id,
        format_datetime(program.start),
        program.duration_minutes(),
        program.channel.name,
        program.display_title()
    )
}

fn recording_details(recording: &Recording) {
    let program = &recording.program;
    println!("{}", program_line(program));
    if !program.detail.is_empty() {
        println!("  {}", program.detail);
    }
    println!("  Genre: {}", program.category);
    if let Some(episode) = program.episode {
        println!("  Episode: Ep {}", episode);
    }
    println!("  Tuner: {}", recording.tuner_name());
    println!("  File: {}", recording.file_path);
    println!("  Command: {}", recording.command);
    if let Some(size) = recording.size {
        println!("  Size: {}", format_size(size));
    }
}

fn timer_line(timer: &Timer) -> String {
    let kind = if timer.manual { "manual" } else { "rule" };
    format!("{}  {:<10} {:<6}", program_line(&timer.program), timer.state_label(), kind)
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), String> {
    std::fs::write(path, data).map_err(|e| format!("Write to {} failed: {}", path.display(), e))
}

fn run(client: &ChinachuClient, args: &Args) -> Result<(), String> {
    match &args.command {
        Command::Recordings => {
            let recordings = fetch(client, RecordingRequest)?;
            if args.json {
                return print_json(&recordings);
            }
            for recording in &recordings {
                println!("{}", program_line(&recording.program));
            }
        }
        Command::Recording { id } => match fetch(client, RecordingDetailRequest::new(id.as_str()))? {
            Some(recording) if args.json => print_json(&recording)?,
            Some(recording) => recording_details(&recording),
            None => return Err(format!("Recording {} not found", id)),
        },
        Command::FileInfo { id } => print_json(&fetch(client, RecordingFileInfoRequest::new(id.as_str()))?)?,
        Command::Timers => {
            let timers = fetch(client, TimerRequest)?;
            if args.json {
                return print_json(&timers);
            }
            for timer in &timers {
                println!("{}", timer_line(timer));
            }
        }
        Command::Timer { id } => match fetch(client, TimerItemRequest::new(id.as_str()))? {
            Some(timer) if args.json => print_json(&timer)?,
            Some(timer) => println!("{}", timer_line(&timer)),
            None => return Err(format!("Timer {} not found", id)),
        },
        Command::Skip { id } => print_json(&fetch(client, TimerSkipRequest::new(id.as_str()))?)?,
        Command::Unskip { id } => print_json(&fetch(client, TimerUnskipRequest::new(id.as_str()))?)?,
        Command::Reserve { program_id } => print_json(&fetch(client, TimerAddRequest::new(program_id.as_str()))?)?,
        Command::Unreserve { id } => print_json(&fetch(client, TimerDeleteRequest::new(id.as_str()))?)?,
        Command::DeleteRecording { id } => {
            fetch(client, RecordingDeleteRequest::new(id.as_str()))?;
            println!("Deleted {}", id);
        }
        Command::Guide { channel, now } => {
            let groups = fetch(client, GuideRequest)?;
            let schedule = GuideSchedule::from_groups(groups);
            let at = Utc::now();

            for ch in schedule.channels() {
                if channel.as_deref().is_some_and(|wanted| wanted != ch.id) {
                    continue;
                }
                println!("{} [{}] {}", ch.id, ch.channel, ch.name);
                let programs: Vec<&Program> = if *now {
                    schedule.current_program(&ch.id, at).into_iter().collect()
                } else {
                    schedule.programs(&ch.id).iter().collect()
                };
                for program in programs {
                    println!(
                        "  {}-{}  {}",
                        format_time(program.start),
                        format_time(program.end_time()),
                        program.display_title()
                    );
                }
            }
        }
        Command::Program { id } => match fetch(client, ProgramDetailRequest::new(id.as_str()))? {
            Some(program) if args.json => print_json(&program)?,
            Some(program) => {
                println!("{}", program_line(&program));
                if !program.flags.is_empty() {
                    println!("  Attributes: {}", program.flags.join(" "));
                }
                if !program.detail.is_empty() {
                    println!("  {}", program.detail);
                }
            }
            None => return Err(format!("Program {} not found", id)),
        },
        Command::Logo { channel_id, output } => {
            let image = fetch(client, ChannelLogoRequest::new(channel_id.as_str()))?;
            write_file(output, &image.data)?;
            println!("Saved {}x{} logo to {}", image.width, image.height, output.display());
        }
        Command::Preview { id, pos, output } => {
            let image = fetch(client, PreviewImageRequest::new(id.as_str(), *pos))?;
            write_file(output, &image.data)?;
            println!("Saved {}x{} preview to {}", image.width, image.height, output.display());
        }
        Command::Download { id, output } => {
            let download = download_recording(
                client,
                id,
                output,
                Some(Box::new(|done: u64, total: Option<u64>| match total {
                    Some(total) if total > 0 => eprint!("\r{} / {}", format_size(done), format_size(total)),
                    _ => eprint!("\r{}", format_size(done)),
                })),
            )
            .map_err(|e| e.message())?;
            eprintln!();
            println!("Saved {} ({}) to {}", download.recording_id, download.human_readable_size(), output.display());
        }
        Command::Status => print_json(&fetch(client, StatusRequest)?)?,
        Command::Config { .. } => {}
    }
    Ok(())
}
