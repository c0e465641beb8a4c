/// Terminal host: ASCII scene on the left, topic panels on the right
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use ortho3d_core::{Application, SceneError, ViewerConfig};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod command;
pub mod renderer;
pub mod ui;

pub use command::{parse_command, parse_script, Command};
pub use renderer::AsciiRenderer;
pub use ui::TerminalUi;

pub type TerminalApplication = Application<AsciiRenderer, TerminalUi>;

const PANEL_WIDTH: u16 = 44;
/// Narrower than this and the panel column is dropped.
const MIN_SCENE_COLS: u16 = 30;
/// Keyboard and mouse steps, in the pixel units the camera controls expect.
const ORBIT_STEP_PX: f32 = 40.0;
const PAN_STEP_PX: f32 = 30.0;
const ZOOM_STEP: f32 = 100.0;
const PX_PER_CELL: f32 = 8.0;
const SETTLE_FRAMES: usize = 400;

/// Where the scene and the panel column go for a terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub scene_cols: u16,
    pub scene_rows: u16,
    pub panel_left: u16,
    pub panel_width: u16,
}

impl Layout {
    /// One status row on top, one prompt row at the bottom.
    pub fn new(cols: u16, rows: u16) -> Self {
        let scene_rows = rows.saturating_sub(2).max(1);
        if cols >= PANEL_WIDTH + MIN_SCENE_COLS + 1 {
            let scene_cols = cols - PANEL_WIDTH - 1;
            Self {
                scene_cols,
                scene_rows,
                panel_left: scene_cols + 1,
                panel_width: PANEL_WIDTH,
            }
        } else {
            Self {
                scene_cols: cols.max(1),
                scene_rows,
                panel_left: cols,
                panel_width: 0,
            }
        }
    }
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    app: TerminalApplication,
    layout: Layout,
    running: bool,
    prompt: Option<String>,
    drag: Option<(MouseButton, u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Start against the current terminal size.
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Self::with_size(config, cols, rows)
    }

    /// Start for a fixed grid, without touching the terminal.
    pub fn with_size(config: ViewerConfig, cols: u16, rows: u16) -> anyhow::Result<Self> {
        let layout = Layout::new(cols, rows);
        let viewport = AsciiRenderer::viewport_for(layout.scene_cols, layout.scene_rows);
        let mut app = Application::start(
            TerminalUi::new(),
            || Ok::<_, SceneError>(AsciiRenderer::new(layout.scene_cols as usize, layout.scene_rows as usize)),
            viewport,
            config,
        )?;
        // Terminal text needs no font; labels are available right away.
        app.add_axis_labels();
        info!(cols, rows, "terminal viewer ready");

        Ok(Self {
            app,
            layout,
            running: true,
            prompt: None,
            drag: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn app(&self) -> &TerminalApplication {
        &self.app
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Apply one command. Returns `false` once the viewer should exit.
    pub fn execute(&mut self, command: Command) -> bool {
        debug!(?command, "command");
        match command {
            Command::Topic(id) => {
                if let Err(err) = self.app.select_topic(&id) {
                    warn!(%err, "topic switch failed");
                    self.app.ui_mut().set_status(err.to_string());
                }
            }
            Command::Set { param, value } => {
                let value = self.app.ui().normalize(&param, value).unwrap_or(value);
                match self.app.set_parameter(&param, value) {
                    Ok(()) => self.app.ui_mut().sync_slider(&param, value),
                    Err(err) => self.app.ui_mut().set_status(err.to_string()),
                }
            }
            Command::Orbit { dx, dy } => self.app.orbit(dx, dy),
            Command::Pan { dx, dy } => self.app.pan(dx, dy),
            Command::Zoom(delta) => self.app.zoom(delta),
            Command::Reset => self.app.reset_view(),
            Command::Help => self.app.ui_mut().set_status(crate::command::HELP),
            Command::Quit => self.running = false,
        }
        self.running
    }

    /// Render until camera damping settles and return the scene and panel
    /// as plain text, side by side.
    pub fn snapshot(&mut self) -> Vec<String> {
        for _ in 0..SETTLE_FRAMES {
            if self.app.scene_mut().controls_mut().is_settled() {
                break;
            }
            self.app.frame();
        }
        self.app.frame();

        let scene = self.app.scene().backend().map(AsciiRenderer::to_text).unwrap_or_default();
        let panel = self.app.ui().lines(self.layout.panel_width.max(PANEL_WIDTH) as usize);
        let rows = scene.len().max(panel.len());
        (0..rows)
            .map(|row| {
                let left = scene.get(row).map(String::as_str).unwrap_or("");
                let right = panel.get(row).map(|line| line.text.as_str()).unwrap_or("");
                let pad = (self.layout.scene_cols as usize + 1).saturating_sub(left.chars().count());
                format!("{left}{}{right}", " ".repeat(pad)).trim_end().to_string()
            })
            .collect()
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let result = self.main_loop();

        // Cleanup
        self.app.teardown();
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Update and render
            if !self.app.frame() {
                break;
            }
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if self.prompt.is_some() {
                    self.handle_prompt_key(key);
                } else {
                    self.handle_key(key);
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(':') => {
                self.prompt = Some(String::new());
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let offset = if code == KeyCode::Tab { 1 } else { -1 };
                if let Some(id) = self.app.ui().neighbour_topic(offset) {
                    self.execute(Command::Topic(id.to_string()));
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(button) = self.app.ui().buttons().get(index) {
                    self.execute(Command::Topic(button.id.to_string()));
                }
            }
            KeyCode::Up => self.app.ui_mut().select_slider(-1),
            KeyCode::Down => self.app.ui_mut().select_slider(1),
            KeyCode::Left | KeyCode::Right => {
                let steps = if code == KeyCode::Right { 1.0 } else { -1.0 };
                if let Some((param, value)) = self.app.ui_mut().step_selected(steps) {
                    if let Err(err) = self.app.set_parameter(param, value) {
                        self.app.ui_mut().set_status(err.to_string());
                    }
                }
            }
            KeyCode::Char('w') => self.app.orbit(0.0, -ORBIT_STEP_PX),
            KeyCode::Char('s') => self.app.orbit(0.0, ORBIT_STEP_PX),
            KeyCode::Char('a') => self.app.orbit(-ORBIT_STEP_PX, 0.0),
            KeyCode::Char('d') => self.app.orbit(ORBIT_STEP_PX, 0.0),
            KeyCode::Char('i') => self.app.pan(0.0, -PAN_STEP_PX),
            KeyCode::Char('k') => self.app.pan(0.0, PAN_STEP_PX),
            KeyCode::Char('j') => self.app.pan(-PAN_STEP_PX, 0.0),
            KeyCode::Char('l') => self.app.pan(PAN_STEP_PX, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.app.zoom(-ZOOM_STEP),
            KeyCode::Char('-') => self.app.zoom(ZOOM_STEP),
            KeyCode::Char('r') => self.app.reset_view(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        let Some(buffer) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Enter => {
                let line = self.prompt.take().unwrap_or_default();
                match parse_command(&line) {
                    Ok(command) => {
                        self.execute(command);
                    }
                    Err(err) => {
                        warn!(%err, "bad command");
                        self.app.ui_mut().set_status(err);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(button) => self.drag = Some((button, mouse.column, mouse.row)),
            MouseEventKind::Up(_) => self.drag = None,
            MouseEventKind::Drag(_) => {
                let Some((button, column, row)) = self.drag else {
                    return;
                };
                let dx = (mouse.column as f32 - column as f32) * PX_PER_CELL;
                let dy = (mouse.row as f32 - row as f32) * PX_PER_CELL * renderer::CELL_ASPECT as f32;
                match button {
                    MouseButton::Left => self.app.orbit(dx, dy),
                    _ => self.app.pan(dx, dy),
                }
                self.drag = Some((button, mouse.column, mouse.row));
            }
            MouseEventKind::ScrollUp => self.app.zoom(-ZOOM_STEP),
            MouseEventKind::ScrollDown => self.app.zoom(ZOOM_STEP),
            _ => {}
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.layout = Layout::new(cols, rows);
        self.app
            .resize(AsciiRenderer::viewport_for(self.layout.scene_cols, self.layout.scene_rows));
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();

        if let Some(renderer) = self.app.scene().backend() {
            renderer.draw(&mut stdout, 0, 1)?;
        }
        if self.layout.panel_width > 0 {
            self.app.ui().draw(
                &mut stdout,
                self.layout.panel_left,
                1,
                self.layout.panel_width,
                self.layout.scene_rows,
            )?;
        }

        // Status bar
        let topic = self.app.active_topic().unwrap_or("-");
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "ortho3d | {topic} | FPS: {:.1} | Tab/1-4=Topic ↑↓=Slider ←→=Adjust WASD=Orbit IJKL=Pan +/-=Zoom R=Reset :=Command Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        // Prompt row
        queue!(stdout, cursor::MoveTo(0, self.layout.scene_rows + 1), Clear(ClearType::CurrentLine))?;
        if let Some(buffer) = &self.prompt {
            queue!(stdout, Print(format!(":{buffer}")))?;
        }

        stdout.flush()?;
        Ok(())
    }
}
