use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use ortho3d_core::ViewerConfig;
use ortho3d_terminal::{parse_script, TerminalApp};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Descriptive geometry in the terminal: points, lines and planes against HP and VP")]
struct Args {
    /// Topic to open first (welcome, points, lines, planes)
    #[arg(long)]
    topic: Option<String>,

    /// JSON config file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Commands to run after start-up, one per line
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print one frame as text and exit instead of opening the viewer
    #[arg(long)]
    print: bool,

    /// Grid width for --print
    #[arg(long, default_value_t = 120)]
    cols: u16,

    /// Grid height for --print
    #[arg(long, default_value_t = 40)]
    rows: u16,

    /// Log file for the interactive viewer (stdout belongs to the scene)
    #[arg(long, default_value = "ortho3d.log")]
    log_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            ViewerConfig::from_json_str(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ViewerConfig::default(),
    };
    if let Some(topic) = &args.topic {
        config.default_topic = topic.clone();
    }

    let commands = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            parse_script(&source).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
        }
        None => Vec::new(),
    };

    let mut app = if args.print {
        TerminalApp::with_size(config, args.cols, args.rows)?
    } else {
        TerminalApp::new(config)?
    };
    for command in commands {
        if !app.execute(command) {
            break;
        }
    }

    if args.print {
        for line in app.snapshot() {
            println!("{line}");
        }
        return Ok(());
    }
    if app.is_running() {
        app.run()?;
    }
    info!("viewer closed");
    Ok(())
}

fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.print {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = File::create(&args.log_file).with_context(|| format!("creating {}", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}
