use clap::{Parser, Subcommand};
use orbit::config;
use orbit::geometry::{Point, Viewport};
use orbit::layout::{LayoutInput, compute_layout};
use orbit::sys::SOCKET_PATH;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "orbitctl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Compute a radial layout without a running daemon
    Layout {
        /// Anchor center as X,Y
        #[arg(long, allow_hyphen_values = true)]
        anchor: Point,

        /// Viewport size as WxH
        #[arg(long)]
        viewport: Viewport,

        /// Number of items on the ring
        #[arg(long)]
        items: usize,

        /// Orbit radius (defaults to the configured one)
        #[arg(long)]
        radius: Option<f64>,

        /// Item size (defaults to the configured one)
        #[arg(long)]
        item_size: Option<f64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Send one protocol line to the orbit daemon, e.g. `send down 25 25`
    Send {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            anchor,
            viewport,
            items,
            radius,
            item_size,
            json,
        } => {
            let cfg = config::load_or_default();
            let input = LayoutInput {
                open: true,
                anchor_center: anchor,
                item_count: items,
                base_radius: radius.unwrap_or(cfg.orbit_radius),
                item_size: item_size.unwrap_or(cfg.item_size),
                viewport: Some(viewport),
            };
            print_layout(&input, json)
        }
        Commands::Send { words } => send_command(&words.join(" ")),
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn print_layout(input: &LayoutInput, json: bool) -> anyhow::Result<()> {
    let layout = compute_layout(input);

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    println!(
        "radius {:.1} after {} iteration(s){}",
        layout.radius,
        layout.iterations,
        if layout.converged { "" } else { " (best effort)" }
    );
    println!("{:>5} {:>9} {:>9} {:>8}", "item", "x", "y", "angle");
    for p in &layout.placements {
        let abs = p.absolute(input.anchor_center);
        println!(
            "{:>5} {:>9.1} {:>9.1} {:>7.1}°",
            p.index,
            abs.x,
            abs.y,
            p.angle.to_degrees()
        );
    }
    Ok(())
}

fn send_command(line: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to orbit daemon at {}: {}. Is orbit running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", line)?;
    // The daemon closes the connection once it has seen EOF and answered.
    stream.shutdown(Shutdown::Write)?;

    let mut reply = String::new();
    stream.read_to_string(&mut reply)?;
    check_reply(&reply)?;
    print!("{}", reply);
    Ok(())
}

/// Events are acknowledged with silence; only `dump` and rejected lines get a reply.
fn check_reply(reply: &str) -> anyhow::Result<()> {
    if let Some(err) = reply.lines().find(|l| l.starts_with("error:")) {
        anyhow::bail!("orbit daemon rejected the command: {}", err.trim());
    }
    Ok(())
}
