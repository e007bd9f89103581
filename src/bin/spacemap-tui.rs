use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect as UiRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::{Frame, Terminal};
use spacemap::{ColoredRect, FileSystemFormat, NodeId, NodeSpec, Point, Rect, TmTree};
use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Layout runs at this multiple of the terminal resolution, so a click maps to
/// a cell centre and never to a shared edge.
const SUBCELL: u32 = 2;

/// Interactive treemap of a JSON hierarchy.
#[derive(Debug, Parser)]
#[command(name = "spacemap-tui", version, about)]
struct Args {
    /// JSON hierarchy to display; a demo tree is used when omitted.
    input: Option<PathBuf>,

    /// Seed for node colours.
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of a leaf's size added or removed per Up/Down press.
    #[arg(long, default_value_t = 0.01)]
    step: f64,

    /// Write logs here (filtered by RUST_LOG, default `info`).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the loaded hierarchy as JSON and exit.
    #[arg(long)]
    dump: bool,
}

struct App {
    tree: TmTree,
    root: NodeId,
    selected: Option<NodeId>,
    move_source: Option<NodeId>,
    step: f64,
    status: String,
    treemap_area: Option<UiRect>,
    should_quit: bool,
}

impl App {
    fn new(tree: TmTree, root: NodeId, step: f64) -> Self {
        Self {
            tree,
            root,
            selected: None,
            move_source: None,
            step,
            status: String::from("Click a tile to select it"),
            treemap_area: None,
            should_quit: false,
        }
    }

    fn relayout(&mut self, area: UiRect) {
        let rect = Rect::new(
            0,
            0,
            area.width as u32 * SUBCELL,
            area.height as u32 * SUBCELL,
        );
        self.tree.update_rectangles(self.root, rect);
    }

    fn refresh_sizes(&mut self) {
        self.tree.update_data_sizes(self.root);
    }

    fn label(&self, id: NodeId) -> String {
        let path = self
            .tree
            .get_path_string(id)
            .unwrap_or_else(|err| format!("<{}>", err));
        let suffix = self.tree.get_suffix(id).unwrap_or_default();
        format!("{}{}", path, suffix)
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') => self.expand_selected(),
            KeyCode::Char('a') => self.tree.expand_all(self.selected.unwrap_or(self.root)),
            KeyCode::Char('c') => self.collapse_selected(),
            KeyCode::Char('x') => self.tree.collapse_all(self.selected.unwrap_or(self.root)),
            KeyCode::Up => self.resize_selected(self.step),
            KeyCode::Down => self.resize_selected(-self.step),
            KeyCode::Char('m') => self.arm_move(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Esc => {
                self.selected = None;
                self.move_source = None;
                self.status = String::from("Selection cleared");
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, event: MouseEvent) {
        let MouseEventKind::Down(MouseButton::Left) = event.kind else {
            return;
        };
        let Some(area) = self.treemap_area else {
            return;
        };
        if !point_in_rect(area, event.column, event.row) {
            return;
        }

        let pos = Point::new(
            (event.column - area.x) as u32 * SUBCELL + SUBCELL / 2,
            (event.row - area.y) as u32 * SUBCELL + SUBCELL / 2,
        );
        let Some(hit) = self.tree.get_tree_at_position(self.root, pos) else {
            return;
        };

        if let Some(source) = self.move_source.take() {
            self.finish_move(source, hit);
            return;
        }

        self.selected = Some(hit);
        self.status = format!("Selected {}", self.label(hit));
    }

    fn expand_selected(&mut self) {
        if let Some(id) = self.selected {
            self.tree.expand(id);
        }
    }

    fn collapse_selected(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        self.tree.collapse(id);
        if let Some(parent) = self.tree.get_parent(id) {
            self.selected = Some(parent);
            self.status = format!("Collapsed {}", self.label(parent));
        }
    }

    fn resize_selected(&mut self, factor: f64) {
        let Some(id) = self.selected else {
            return;
        };
        if self.tree.change_size(id, factor) {
            self.refresh_sizes();
            self.status = format!("Resized {}", self.label(id));
        } else {
            self.status = String::from("Only files can be resized");
        }
    }

    fn arm_move(&mut self) {
        match self.selected {
            Some(id) if self.tree.is_leaf(id) => {
                self.move_source = Some(id);
                self.status = String::from("Click the folder to move into");
            }
            _ => self.status = String::from("Select a file to move first"),
        }
    }

    fn finish_move(&mut self, source: NodeId, hit: NodeId) {
        // A click on a file means its folder.
        let destination = if self.tree.is_leaf(hit) {
            self.tree.get_parent(hit).unwrap_or(hit)
        } else {
            hit
        };

        if self.tree.move_to(source, destination) {
            self.refresh_sizes();
            self.status = format!("Moved to {}", self.label(destination));
            info!(?source, ?destination, "moved from the UI");
        } else {
            self.status = String::from("Move not allowed there");
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        if self.tree.delete_self(id) {
            self.refresh_sizes();
            self.selected = self.tree.get_parent(id);
            self.status = String::from("Deleted");
            info!(?id, "deleted from the UI");
        } else {
            self.status = String::from("The root cannot be deleted");
        }
    }
}

fn point_in_rect(rect: UiRect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

/// Terminal cells covered by a layout rectangle, as `(x0, y0, x1, y1)` inclusive.
fn cell_bounds(rect: Rect, area: UiRect) -> Option<(u16, u16, u16, u16)> {
    let (cx0, cx1) = (rect.x / SUBCELL, rect.right() / SUBCELL);
    let (cy0, cy1) = (rect.y / SUBCELL, rect.bottom() / SUBCELL);
    if cx1 <= cx0 || cy1 <= cy0 {
        return None;
    }
    let x0 = area.x.saturating_add(cx0 as u16);
    let y0 = area.y.saturating_add(cy0 as u16);
    let x1 = area.x.saturating_add((cx1 - 1) as u16);
    let y1 = area.y.saturating_add((cy1 - 1) as u16);
    let max_x = area.x + area.width.saturating_sub(1);
    let max_y = area.y + area.height.saturating_sub(1);
    Some((x0.min(max_x), y0.min(max_y), x1.min(max_x), y1.min(max_y)))
}

struct TreemapWidget<'a> {
    tree: &'a TmTree,
    tiles: &'a [ColoredRect],
    selected: Option<NodeId>,
    move_source: Option<NodeId>,
}

impl Widget for TreemapWidget<'_> {
    fn render(self, area: UiRect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                buf[(x, y)]
                    .set_char(' ')
                    .set_style(Style::default().bg(Color::Rgb(18, 18, 20)));
            }
        }

        for tile in self.tiles {
            let Some((x0, y0, x1, y1)) = cell_bounds(tile.rect, area) else {
                continue;
            };
            let bg = Color::Rgb(tile.color.0, tile.color.1, tile.color.2);
            let fg = if Some(tile.node) == self.move_source {
                Color::Rgb(120, 220, 140)
            } else if Some(tile.node) == self.selected {
                Color::Rgb(246, 211, 101)
            } else {
                Color::Rgb(224, 224, 224)
            };

            for y in y0..=y1 {
                for x in x0..=x1 {
                    buf[(x, y)].set_char(' ').set_style(Style::default().bg(bg));
                }
            }
            if x1 > x0 && y1 > y0 {
                for x in x0..=x1 {
                    buf[(x, y1)].set_char('─').set_style(Style::default().fg(fg).bg(bg));
                }
                for y in y0..=y1 {
                    buf[(x1, y)].set_char('│').set_style(Style::default().fg(fg).bg(bg));
                }
                buf[(x1, y1)].set_char('┘').set_style(Style::default().fg(fg).bg(bg));
            }

            let label_width = x1.saturating_sub(x0) as usize;
            if label_width >= 3 {
                let name = self.tree.name(tile.node).unwrap_or("");
                for (i, ch) in name.chars().take(label_width).enumerate() {
                    buf[(x0 + i as u16, y0)]
                        .set_char(ch)
                        .set_style(Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD));
                }
            }
        }
    }
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let split = Layout::horizontal([Constraint::Length(42), Constraint::Min(30)]).split(frame.area());
    let left = split[0];
    let right = split[1];

    let left_block = Block::default().title(" spacemap ").borders(Borders::ALL);
    let left_inner = left_block.inner(left);
    frame.render_widget(left_block, left);

    let left_rows = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(6),
        Constraint::Length(7),
    ])
    .split(left_inner);

    frame.render_widget(
        Paragraph::new(app.status.as_str())
            .block(Block::default().title(" Status ").borders(Borders::ALL)),
        left_rows[0],
    );

    let mut lines = vec![Line::from(vec![
        Span::styled("Total: ", Style::default().fg(Color::Gray)),
        Span::raw(spacemap::format_size(app.tree.data_size(app.root))),
    ])];
    match app.selected {
        Some(id) => {
            lines.push(Line::from(Span::styled("Selected:", Style::default().fg(Color::Gray))));
            lines.push(Line::from(app.label(id)));
        }
        None => lines.push(Line::from("Selected: (none)")),
    }
    if let Some(id) = app.move_source {
        lines.push(Line::from(vec![
            Span::styled("Moving: ", Style::default().fg(Color::Gray)),
            Span::raw(app.tree.name(id).unwrap_or("").to_string()),
        ]));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Selection ").borders(Borders::ALL)),
        left_rows[1],
    );

    let help_lines = vec![
        Line::from("click: select    e/c: expand/collapse"),
        Line::from("a/x: expand all/collapse all"),
        Line::from("Up/Down: grow/shrink file"),
        Line::from("m: move file, then click a folder"),
        Line::from("d/Del: delete    q: quit"),
    ];
    frame.render_widget(
        Paragraph::new(help_lines).block(Block::default().title(" Controls ").borders(Borders::ALL)),
        left_rows[2],
    );

    let treemap_block = Block::default().title(" Treemap ").borders(Borders::ALL);
    let treemap_inner = treemap_block.inner(right);
    frame.render_widget(treemap_block, right);
    app.treemap_area = Some(treemap_inner);

    app.relayout(treemap_inner);
    let tiles = app.tree.get_rectangles(app.root);
    if tiles.is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing to show: the tree is empty.").style(Style::default().fg(Color::Gray)),
            treemap_inner,
        );
    } else {
        frame.render_widget(
            TreemapWidget {
                tree: &app.tree,
                tiles: &tiles,
                selected: app.selected,
                move_source: app.move_source,
            },
            treemap_inner,
        );
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| draw_ui(frame, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                Event::Resize(_, _) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
    }
    Ok(())
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}

fn load_spec(input: Option<&Path>) -> Result<NodeSpec> {
    let Some(path) = input else {
        return Ok(demo_spec());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    NodeSpec::from_json(&json).with_context(|| format!("cannot parse {}", path.display()))
}

fn demo_spec() -> NodeSpec {
    NodeSpec::folder(
        "home",
        vec![
            NodeSpec::folder(
                "music",
                vec![
                    NodeSpec::leaf("album.flac", 48_000_000),
                    NodeSpec::leaf("single.mp3", 6_500_000),
                    NodeSpec::leaf("podcast.mp3", 21_000_000),
                ],
            ),
            NodeSpec::folder(
                "projects",
                vec![
                    NodeSpec::folder(
                        "engine",
                        vec![
                            NodeSpec::leaf("lib.rs", 42_000),
                            NodeSpec::leaf("tree.rs", 18_000),
                            NodeSpec::leaf("target.tar", 9_800_000),
                        ],
                    ),
                    NodeSpec::leaf("notes.md", 3_200),
                ],
            ),
            NodeSpec::folder(
                "photos",
                vec![
                    NodeSpec::leaf("beach.jpg", 4_100_000),
                    NodeSpec::leaf("city.jpg", 3_700_000),
                    NodeSpec::leaf("forest.jpg", 5_300_000),
                ],
            ),
            NodeSpec::leaf("todo.txt", 900),
        ],
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let spec = load_spec(args.input.as_deref())?;
    if args.dump {
        println!("{}", spec.to_json()?);
        return Ok(());
    }

    let tree = match args.seed {
        Some(seed) => TmTree::with_seed(seed),
        None => TmTree::new(),
    };
    let mut tree = tree.with_format(Box::new(FileSystemFormat));
    let root = spec.build(&mut tree)?;
    info!(nodes = tree.node_count(), size = tree.data_size(root), "loaded hierarchy");
    let mut app = App::new(tree, root, args.step);

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_result.context("terminal UI failed")
}
