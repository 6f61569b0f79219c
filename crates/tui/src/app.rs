use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::Rng;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use timestui_core::{
    game::{Difficulty, Feedback, GameSnapshot, GameState, Tone},
    input::AnswerPad,
    AppConfig,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::big_numerals;

const TICK_RATE: Duration = Duration::from_millis(250);
const KEY_FLASH_TICKS: u8 = 2;

const TROPHY: [&str; 10] = [
    r"     ___________     ",
    r"    '._==_==_=_.'    ",
    r"    .-\:      /-.    ",
    r"   | (|:.     |) |   ",
    r"    '-|:.     |-'    ",
    r"      \::.    /      ",
    r"       '::. .'       ",
    r"         ) (         ",
    r"       _.' '._       ",
    r#"      `"""""""`      "#,
];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
    on_accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            on_accent: Color::Black,
        }
    }
}

impl Theme {
    fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Neutral => self.primary_fg,
            Tone::Success => self.success,
            Tone::Danger => self.danger,
        }
    }

    fn difficulty_color(&self, difficulty: Difficulty) -> Color {
        match difficulty {
            Difficulty::Easy => self.success,
            Difficulty::Medium => self.warning,
            Difficulty::Hard => self.danger,
        }
    }
}

/// One button on the on-screen keypad, laid out like a phone pad:
/// three digit rows plus delete / 0 / enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadKey {
    Digit(char),
    Delete,
    Enter,
}

const KEYPAD_ROWS: [[PadKey; 3]; 4] = [
    [PadKey::Digit('1'), PadKey::Digit('2'), PadKey::Digit('3')],
    [PadKey::Digit('4'), PadKey::Digit('5'), PadKey::Digit('6')],
    [PadKey::Digit('7'), PadKey::Digit('8'), PadKey::Digit('9')],
    [PadKey::Delete, PadKey::Digit('0'), PadKey::Enter],
];

impl PadKey {
    fn label(self) -> String {
        match self {
            PadKey::Digit(ch) => format!("  {ch}  "),
            PadKey::Delete => " DEL ".to_string(),
            PadKey::Enter => " ENT ".to_string(),
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

struct UiState {
    status: String,
    should_quit: bool,
    started_at: DateTime<Local>,
    key_flash: Option<(PadKey, u8)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            should_quit: false,
            started_at: Local::now(),
            key_flash: None,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn flash(&mut self, key: PadKey) {
        self.key_flash = Some((key, KEY_FLASH_TICKS));
    }

    fn tick_flash(&mut self) {
        if let Some((_, ticks)) = self.key_flash.as_mut() {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                self.key_flash = None;
            }
        }
    }

    fn flashed(&self, key: PadKey) -> bool {
        matches!(self.key_flash, Some((flashed, _)) if flashed == key)
    }
}

/// High-level application state for the practice TUI.
pub struct PracticeApp {
    game: GameState,
    pad: AnswerPad,
    ui: UiState,
    theme: Theme,
    tints: [Color; 3],
}

impl PracticeApp {
    pub fn new(config: AppConfig) -> Self {
        let game = GameState::new(config.difficulty);
        let mut app = Self {
            game,
            pad: AnswerPad::new(),
            ui: UiState::default(),
            theme: Theme::default(),
            tints: [Color::White; 3],
        };
        app.roll_tints();
        app.ui.set_status(format!(
            "{} questions at {} difficulty, good luck!",
            app.game.num_questions(),
            app.game.difficulty()
        ));
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);
        info!(difficulty = %self.game.difficulty(), "practice session started");

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.ui.should_quit {
                break;
            }

            let Some(app_event) = event_rx.recv().await else {
                break;
            };
            match app_event {
                AppEvent::Tick => self.ui.tick_flash(),
                AppEvent::Input(Event::Key(key)) => self.handle_key(key),
                AppEvent::Input(_) => {}
            }

            if self.ui.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.game.is_complete() {
            self.handle_complete_key(key);
            return;
        }
        match key.code {
            KeyCode::Char(ch @ '0'..='9')
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.pad.push_digit(ch);
                self.ui.flash(PadKey::Digit(ch));
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.pad.pop_digit();
                self.ui.flash(PadKey::Delete);
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char('e') if key.modifiers.is_empty() => {
                self.select_difficulty(Difficulty::Easy)
            }
            KeyCode::Char('m') if key.modifiers.is_empty() => {
                self.select_difficulty(Difficulty::Medium)
            }
            KeyCode::Char('h') if key.modifiers.is_empty() => {
                self.select_difficulty(Difficulty::Hard)
            }
            KeyCode::Char('r') if key.modifiers.is_empty() => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.ui.should_quit = true,
            _ => {}
        }
    }

    fn handle_complete_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('p') => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.ui.should_quit = true,
            _ => {}
        }
    }

    fn submit(&mut self) {
        self.ui.flash(PadKey::Enter);
        let before = self.game.problem();
        if !self.pad.submit(&mut self.game) {
            debug!("submission without digits ignored");
            return;
        }

        let feedback = self.game.feedback();
        info!(
            problem = %before,
            score = %self.game.score_line(),
            correct = feedback == Feedback::Correct,
            "submission graded"
        );

        if self.game.is_complete() {
            info!("session complete");
            self.ui
                .set_status("All questions answered! Press Enter to play again".to_string());
        } else if self.game.problem() != before {
            self.roll_tints();
        }
    }

    fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.game.set_difficulty(difficulty);
        let (lo, hi) = difficulty.bounds();
        info!(%difficulty, "difficulty changed");
        self.ui.set_status(format!(
            "Difficulty set to {difficulty}, next problems use {lo}..{hi}"
        ));
    }

    fn restart(&mut self) {
        self.game.reset();
        self.pad = AnswerPad::new();
        self.roll_tints();
        self.ui.started_at = Local::now();
        info!(difficulty = %self.game.difficulty(), "session restarted");
        self.ui.set_status("New session started".to_string());
    }

    // One random tint per glyph group, rolled once per problem.
    fn roll_tints(&mut self) {
        let mut rng = rand::rng();
        for tint in self.tints.iter_mut() {
            *tint = Color::Rgb(
                rng.random_range(96..=255),
                rng.random_range(96..=255),
                rng.random_range(96..=255),
            );
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let snapshot = self.game.snapshot(self.pad.text());
        if snapshot.complete {
            self.draw_trophy(frame, &snapshot);
            self.render_play_again_prompt(frame, &snapshot);
        } else {
            self.draw_play(frame, &snapshot);
        }
    }

    fn draw_play(&mut self, frame: &mut Frame, snapshot: &GameSnapshot) {
        let area = frame.size();
        let banner_height = big_numerals::BANNER_HEIGHT as u16;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_height + 2),
                Constraint::Length(banner_height),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, rows[0], snapshot);
        self.render_problem_banner(frame, rows[1], snapshot);
        self.render_answer_banner(frame, rows[2], snapshot);
        self.render_feedback(frame, rows[3], snapshot);
        self.render_difficulty_bar(frame, rows[4], snapshot);
        self.render_keypad(frame, rows[5]);
        self.render_status(frame, rows[6]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let line = Line::from(vec![
            Span::styled(
                format!("Score {}", snapshot.score_line),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {}", snapshot.difficulty),
                Style::default().fg(self.theme.difficulty_color(snapshot.difficulty)),
            ),
            Span::styled(
                format!("  ·  started {}", self.ui.started_at.format("%H:%M")),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let header = Paragraph::new(line).alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn render_problem_banner(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let segments = [
            (snapshot.problem.a.to_string(), self.tints[0]),
            ("×".to_string(), self.tints[1]),
            (snapshot.problem.b.to_string(), self.tints[2]),
        ];
        let lines = compose_banner(&segments);
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Problem"))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_answer_banner(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let (text, color) = if snapshot.answer_entry.is_empty() {
            ("?".to_string(), self.theme.muted)
        } else {
            (snapshot.answer_entry.clone(), self.theme.primary_fg)
        };
        let lines = compose_banner(&[(text, color)]);
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_feedback(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let style = Style::default()
            .fg(self.theme.tone_color(snapshot.feedback.tone()))
            .add_modifier(Modifier::BOLD);
        let line = Line::from(Span::styled(snapshot.feedback.text(), style));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_difficulty_bar(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let mut spans = Vec::new();
        for difficulty in Difficulty::ALL {
            let color = self.theme.difficulty_color(difficulty);
            let label = format!("  {} ({})  ", difficulty.label(), difficulty_key(difficulty));
            let style = if difficulty == snapshot.difficulty {
                Style::default()
                    .fg(self.theme.on_accent)
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("  "));
        }
        let bar = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(bar, area);
    }

    fn render_keypad(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for row in KEYPAD_ROWS {
            let mut spans = Vec::new();
            for key in row {
                let base = match key {
                    PadKey::Digit(_) => Style::default()
                        .fg(self.theme.on_accent)
                        .bg(self.theme.accent),
                    PadKey::Delete => Style::default()
                        .fg(self.theme.on_accent)
                        .bg(self.theme.danger),
                    PadKey::Enter => Style::default()
                        .fg(self.theme.on_accent)
                        .bg(self.theme.success),
                };
                let style = if self.ui.flashed(key) {
                    base.add_modifier(Modifier::REVERSED | Modifier::BOLD)
                } else {
                    base
                };
                spans.push(Span::styled(key.label(), style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        let keypad = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Keypad"))
            .alignment(Alignment::Center);
        frame.render_widget(keypad, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let secondary =
            "0-9 type · Enter submit · Backspace delete · e/m/h difficulty · r restart · q quit";
        let paragraph = Paragraph::new(vec![
            Line::from(self.ui.status.clone()),
            Line::from(Span::styled(
                secondary,
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_trophy(&self, frame: &mut Frame, snapshot: &GameSnapshot) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(TROPHY.len() as u16),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, rows[0], snapshot);

        let trophy_lines: Vec<Line> = TROPHY
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    *line,
                    Style::default()
                        .fg(self.theme.warning)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        let trophy = Paragraph::new(trophy_lines).alignment(Alignment::Center);
        frame.render_widget(trophy, rows[1]);

        let feedback = Line::from(Span::styled(
            snapshot.feedback.text(),
            Style::default()
                .fg(self.theme.tone_color(snapshot.feedback.tone()))
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(
            Paragraph::new(feedback).alignment(Alignment::Center),
            rows[2],
        );
    }

    fn render_play_again_prompt(&self, frame: &mut Frame, snapshot: &GameSnapshot) {
        let frame_area = frame.size();
        let width = 46_u16.min(frame_area.width.saturating_sub(4)).max(24);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let quota = snapshot.score_line.split('/').nth(1).unwrap_or("10");
        let message = format!("You've completed all {quota} questions!");
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" play again  "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);

        let paragraph = Paragraph::new(vec![Line::from(message), Line::from(""), helper])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Congratulations!"),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}

fn difficulty_key(difficulty: Difficulty) -> char {
    match difficulty {
        Difficulty::Easy => 'e',
        Difficulty::Medium => 'm',
        Difficulty::Hard => 'h',
    }
}

// Banner segments render independently so each keeps its own colour; rows
// are stitched back together line by line.
fn compose_banner(segments: &[(String, Color)]) -> Vec<Line<'static>> {
    let rendered: Vec<(Vec<String>, Color)> = segments
        .iter()
        .map(|(text, color)| (big_numerals::render(text), *color))
        .collect();

    (0..big_numerals::BANNER_HEIGHT)
        .map(|row| {
            let mut spans = Vec::new();
            for (idx, (rows, color)) in rendered.iter().enumerate() {
                if idx > 0 {
                    spans.push(Span::raw("    "));
                }
                let content = rows.get(row).cloned().unwrap_or_default();
                spans.push(Span::styled(content, Style::default().fg(*color)));
            }
            Line::from(spans)
        })
        .collect()
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
