/// Walk through every topic headlessly and print a frame of each.
///
/// Usage: cargo run --example topic_tour -- [cols] [rows]
use std::env;

use ortho3d_core::ViewerConfig;
use ortho3d_terminal::{parse_script, TerminalApp};

const TOUR: &str = "
topic points
set point-y -2
set point-z 3
orbit 60 0
topic lines
set line-theta 45
topic planes
set plane-rot-x 30
set plane-rot-z 20
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut args = env::args().skip(1);
    let cols = args.next().and_then(|a| a.parse().ok()).unwrap_or(120);
    let rows = args.next().and_then(|a| a.parse().ok()).unwrap_or(36);

    let mut app = TerminalApp::with_size(ViewerConfig::default(), cols, rows)?;
    let commands = parse_script(TOUR).map_err(anyhow::Error::msg)?;

    println!("== welcome ==");
    print_frame(&mut app);
    for command in commands {
        let heading = match &command {
            ortho3d_terminal::Command::Topic(id) => Some(id.clone()),
            _ => None,
        };
        app.execute(command);
        if let Some(id) = heading {
            println!("\n== {id} ==");
            print_frame(&mut app);
        }
    }
    println!("\n== final ==");
    print_frame(&mut app);
    Ok(())
}

fn print_frame(app: &mut TerminalApp) {
    for line in app.snapshot() {
        println!("{line}");
    }
}
