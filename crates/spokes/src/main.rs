use clap::{Parser, Subcommand};
use spokes::SOCKET_PATH;
use spokes::geometry::Vec2;
use spokes::item::MenuItem;
use spokes::menu::{ShowOptions, ShowRequest};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spokes", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Socket of the pinwheel daemon
    #[arg(short, long, default_value = SOCKET_PATH)]
    socket: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show a menu and wait until an item is selected or the menu is canceled.
    Show {
        /// JSON menu definition
        file: PathBuf,
        /// Pointer position in window pixels
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, default_value_t = 1920.0)]
        width: f64,
        #[arg(long, default_value_t = 1080.0)]
        height: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        /// Open in the middle of the window
        #[arg(long)]
        centered: bool,
        /// Open submenus in place
        #[arg(long)]
        anchored: bool,
    },
    /// Hide the menu
    Hide,
    /// Send a raw protocol line, e.g. `spokes send motion 10 20`
    Send {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
    /// Print every notification of the daemon
    Listen,
    /// Print the render snapshot of the visible menu as JSON
    Frame,
    /// Print the static item layouts of the visible menu as JSON
    Layout,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            file,
            x,
            y,
            width,
            height,
            zoom,
            centered,
            anchored,
        } => {
            let root: MenuItem = serde_json::from_str(&fs_err::read_to_string(&file)?)?;
            let request = ShowRequest {
                root,
                options: ShowOptions {
                    window_size: Vec2::new(width, height),
                    zoom_factor: zoom,
                    mouse_position: Vec2::new(x, y),
                    centered_mode: centered,
                    anchored_mode: anchored,
                },
            };
            let json = serde_json::to_string(&request)?;
            let line = shell_words::join(["show", json.as_str()]);
            let stream = send_command(&cli.socket, &line)?;
            print_notifications(stream, true)
        }
        Commands::Hide => send_command(&cli.socket, "hide").map(|_| ()),
        Commands::Send { line } => send_command(&cli.socket, &shell_words::join(line)).map(|_| ()),
        Commands::Listen => {
            let stream = connect(&cli.socket)?;
            print_notifications(stream, false)
        }
        Commands::Frame => print_answer(send_command(&cli.socket, "frame")?, "frame"),
        Commands::Layout => print_answer(send_command(&cli.socket, "layout")?, "layout"),
    }
}

fn connect(socket: &Path) -> anyhow::Result<UnixStream> {
    UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to pinwheel daemon at {}: {}. Is pinwheel running?",
            socket.display(),
            e
        )
    })
}

fn send_command(socket: &Path, cmd: &str) -> anyhow::Result<UnixStream> {
    let mut stream = connect(socket)?;
    log::debug!("Sending '{}'", cmd);
    writeln!(stream, "{}", cmd)?;
    Ok(stream)
}

/// Echoes daemon lines to stdout. With `until_done`, stops after the first `select`
/// or `cancel` and fails on an `error` answer.
fn print_notifications(stream: UnixStream, until_done: bool) -> anyhow::Result<()> {
    for line in BufReader::new(stream).lines() {
        let line = line?;
        if let Some(message) = line.strip_prefix("error ") {
            anyhow::bail!("pinwheel rejected the request: {}", message);
        }
        println!("{}", line);

        if until_done && is_final(&line) {
            break;
        }
    }
    Ok(())
}

/// Whether `line` ends the menu a `show` is waiting for.
fn is_final(line: &str) -> bool {
    line.starts_with("select ") || line == "cancel"
}

/// Skips notifications until the answer called `name` arrives and prints its payload.
fn print_answer(stream: UnixStream, name: &str) -> anyhow::Result<()> {
    for line in BufReader::new(stream).lines() {
        let line = line?;
        if let Some(message) = line.strip_prefix("error ") {
            anyhow::bail!("pinwheel rejected the request: {}", message);
        }
        if let Some(payload) = answer_payload(&line, name) {
            println!("{}", payload);
            return Ok(());
        }
    }
    anyhow::bail!("pinwheel closed the connection without answering")
}

fn answer_payload<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?.strip_prefix(' ')
}
