//! Machines component - tabbed process tables, one tab per machine.

use crate::action::Action;
use crate::components::Component;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use procfleet_core::TargetRegistry;
use procfleet_hosts::{ProcessState, SignalKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

/// Component mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Searching,
}

/// Tabbed view over every monitored machine.
///
/// Navigation and search mutate the registry directly; anything that needs
/// the runtime (refreshes, signal dispatch, quitting) is surfaced as an
/// [`Action`] for the app to handle.
pub struct MachinesComponent {
    registry: TargetRegistry,
    mode: Mode,
    search_input: String,
    /// Rows the table can show, updated on every draw.
    visible_rows: usize,
}

impl MachinesComponent {
    pub fn new(registry: TargetRegistry) -> Self {
        Self {
            registry,
            mode: Mode::Normal,
            search_input: String::new(),
            visible_rows: 20,
        }
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TargetRegistry {
        &mut self.registry
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let rows = self.visible_rows;
        match key.code {
            KeyCode::Char('q') | KeyCode::F(10) => Ok(Some(Action::Quit)),
            KeyCode::F(1) | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            KeyCode::F(2) | KeyCode::Tab => {
                self.registry.next_tab();
                Ok(None)
            }
            KeyCode::F(3) | KeyCode::BackTab => {
                self.registry.prev_tab();
                Ok(None)
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(target) = self.registry.active_mut() {
                    target.move_down(rows);
                }
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(target) = self.registry.active_mut() {
                    target.move_up(rows);
                }
                Ok(None)
            }
            KeyCode::PageDown => {
                if let Some(target) = self.registry.active_mut() {
                    target.page_down(rows);
                }
                Ok(None)
            }
            KeyCode::PageUp => {
                if let Some(target) = self.registry.active_mut() {
                    target.page_up(rows);
                }
                Ok(None)
            }
            KeyCode::F(4) | KeyCode::Char('/') => {
                self.mode = Mode::Searching;
                self.search_input.clear();
                Ok(None)
            }
            KeyCode::F(5) => Ok(Some(Action::Signal(SignalKind::Pause))),
            KeyCode::F(6) => Ok(Some(Action::Signal(SignalKind::Terminate))),
            KeyCode::F(7) => Ok(Some(Action::Signal(SignalKind::ForceKill))),
            KeyCode::F(8) => Ok(Some(Action::Signal(SignalKind::Resume))),
            KeyCode::F(9) | KeyCode::Char('r') => Ok(Some(Action::Refresh)),
            KeyCode::Char('R') => Ok(Some(Action::RefreshAll)),
            KeyCode::Char('a') => Ok(Some(Action::ToggleAutoRefresh)),
            _ => Ok(None),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let rows = self.visible_rows;
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.search_input.clear();
                Ok(None)
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let query = std::mem::take(&mut self.search_input);
                if let Some(target) = self.registry.active_mut() {
                    if !query.is_empty() && !target.search(&query, rows) {
                        target.set_status(format!("no match for '{query}'"));
                    }
                }
                Ok(None)
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                Ok(None)
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Shorten a command to at most `max_chars` characters, ellipsis
    /// included. Counts and cuts whole characters, never bytes, so a
    /// multibyte command line cannot split mid-character.
    fn truncate_command(command: &str, max_chars: usize) -> String {
        if command.chars().count() <= max_chars {
            return command.to_string();
        }
        let mut out: String = command.chars().take(max_chars.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }

    /// Get color for process state
    fn state_color(state: &ProcessState) -> Color {
        match state {
            ProcessState::Running => Color::Green,
            ProcessState::Zombie => Color::Red,
            ProcessState::DiskSleep => Color::Yellow,
            ProcessState::Stopped => Color::Magenta,
            _ => Color::default(),
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, target) in self.registry.targets().iter().enumerate() {
            let mut style = if i == self.registry.active_index() {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if target.status().is_some() {
                style = style.fg(Color::Red);
            }
            spans.push(Span::styled(format!(" {} ", target.label()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        // header row + margin
        self.visible_rows = area.height.saturating_sub(2).max(1) as usize;
        let rows = self.visible_rows;

        let Some(target) = self.registry.active_mut() else {
            return;
        };
        target.ensure_cursor_visible(rows);

        let scroll = target.scroll_offset();
        let cursor = target.cursor_index();
        let max_cmd_len = area.width.saturating_sub(40) as usize;

        let table_rows: Vec<Row> = target
            .visible_window(rows)
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let base_style = if scroll + i == cursor {
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let cmd_display = Self::truncate_command(&record.command, max_cmd_len);
                Row::new(vec![
                    Cell::from(format!("{:>7}", record.pid)).style(base_style),
                    Cell::from(format!("{:<10}", record.owner)).style(base_style),
                    Cell::from(format!("{:>5.1}", record.cpu_percent)).style(base_style),
                    Cell::from(format!("{:>5.1}", record.mem_percent)).style(base_style),
                    Cell::from(record.state.short().to_string())
                        .style(base_style.fg(Self::state_color(&record.state))),
                    Cell::from(cmd_display).style(base_style),
                ])
            })
            .collect();

        let header = Row::new(vec![
            Cell::from("    PID"),
            Cell::from("USER"),
            Cell::from(" CPU%"),
            Cell::from(" MEM%"),
            Cell::from("S"),
            Cell::from("COMMAND"),
        ])
        .style(Style::default().add_modifier(Modifier::DIM))
        .bottom_margin(1);

        let widths = [
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(2),
            Constraint::Percentage(60),
        ];

        frame.render_widget(Table::new(table_rows, widths).header(header), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        if self.mode == Mode::Searching {
            let line = Line::from(vec![
                Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(&self.search_input),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let Some(target) = self.registry.active() else {
            return;
        };
        let line = if let Some(status) = target.status() {
            Line::from(Span::styled(status, Style::default().fg(Color::Red)))
        } else {
            let age = target
                .refreshed_ago()
                .map(|d| format!("refreshed {}s ago", d.as_secs()))
                .unwrap_or_else(|| "fetching...".to_string());
            Line::from(vec![
                Span::raw(format!("{} processes", target.snapshot().len())),
                Span::styled(
                    format!("  {age}"),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, auto_refresh: bool) {
        let auto_status = if auto_refresh {
            Span::styled("ON ", Style::default().fg(Color::Green))
        } else {
            Span::styled("OFF", Style::default().fg(Color::DarkGray))
        };

        let line = Line::from(vec![
            Span::styled("[F2/F3]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" tabs "),
            Span::styled("[F4]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" search "),
            Span::styled("[F5]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" pause "),
            Span::styled("[F6]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" term "),
            Span::styled("[F7]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" kill "),
            Span::styled("[F8]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cont "),
            Span::styled("[F9]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" refresh "),
            Span::styled("[a]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" auto:"),
            auto_status,
            Span::raw(" "),
            Span::styled("[F1]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" help "),
            Span::styled("[q]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Draw with the app-owned auto-refresh flag shown in the footer.
    pub fn draw_with(&mut self, frame: &mut Frame, area: Rect, auto_refresh: bool) -> Result<()> {
        let chunks = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Min(5),    // Process table
            Constraint::Length(1), // Status / search bar
            Constraint::Length(1), // Footer
        ])
        .split(area);

        self.draw_tabs(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);
        self.draw_footer(frame, chunks[3], auto_refresh);
        Ok(())
    }
}

impl Component for MachinesComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Searching => self.handle_search_key(key),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with(frame, area, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use procfleet_core::Target;
    use procfleet_hosts::{ProcessRecord, ProcessSource};

    fn component() -> MachinesComponent {
        let mut a = Target::new("local", ProcessSource::local());
        a.apply_snapshot(
            (1..=5)
                .map(|pid| ProcessRecord {
                    pid,
                    owner: "root".to_string(),
                    cpu_percent: 0.0,
                    mem_percent: 0.0,
                    state: ProcessState::Sleeping,
                    command: format!("proc-{pid}"),
                })
                .collect(),
        );
        let b = Target::new("web1", ProcessSource::local());
        MachinesComponent::new(TargetRegistry::new(vec![a, b]))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn function_keys_map_to_signals() {
        let mut c = component();
        assert_eq!(
            c.handle_key_event(press(KeyCode::F(5))).unwrap(),
            Some(Action::Signal(SignalKind::Pause))
        );
        assert_eq!(
            c.handle_key_event(press(KeyCode::F(6))).unwrap(),
            Some(Action::Signal(SignalKind::Terminate))
        );
        assert_eq!(
            c.handle_key_event(press(KeyCode::F(7))).unwrap(),
            Some(Action::Signal(SignalKind::ForceKill))
        );
        assert_eq!(
            c.handle_key_event(press(KeyCode::F(8))).unwrap(),
            Some(Action::Signal(SignalKind::Resume))
        );
    }

    #[test]
    fn quit_and_refresh_keys() {
        let mut c = component();
        assert_eq!(c.handle_key_event(press(KeyCode::Char('q'))).unwrap(), Some(Action::Quit));
        assert_eq!(c.handle_key_event(press(KeyCode::F(9))).unwrap(), Some(Action::Refresh));
        assert_eq!(
            c.handle_key_event(press(KeyCode::Char('R'))).unwrap(),
            Some(Action::RefreshAll)
        );
    }

    #[test]
    fn tab_keys_switch_machines() {
        let mut c = component();
        c.handle_key_event(press(KeyCode::Tab)).unwrap();
        assert_eq!(c.registry().active_index(), 1);
        c.handle_key_event(press(KeyCode::F(3))).unwrap();
        assert_eq!(c.registry().active_index(), 0);
    }

    #[test]
    fn arrows_move_cursor() {
        let mut c = component();
        c.handle_key_event(press(KeyCode::Down)).unwrap();
        c.handle_key_event(press(KeyCode::Down)).unwrap();
        c.handle_key_event(press(KeyCode::Up)).unwrap();
        assert_eq!(c.registry().active().unwrap().cursor_index(), 1);
    }

    #[test]
    fn search_mode_edits_and_runs_query() {
        let mut c = component();
        c.handle_key_event(press(KeyCode::F(4))).unwrap();
        assert_eq!(c.mode, Mode::Searching);
        // a signal key is just text while searching
        for ch in "proc-4".chars() {
            c.handle_key_event(press(KeyCode::Char(ch))).unwrap();
        }
        c.handle_key_event(press(KeyCode::Enter)).unwrap();
        assert_eq!(c.mode, Mode::Normal);
        assert_eq!(c.registry().active().unwrap().selected().unwrap().pid, 4);
    }

    #[test]
    fn search_without_match_sets_status() {
        let mut c = component();
        c.handle_key_event(press(KeyCode::Char('/'))).unwrap();
        c.handle_key_event(press(KeyCode::Char('x'))).unwrap();
        c.handle_key_event(press(KeyCode::Enter)).unwrap();
        assert_eq!(
            c.registry().active().unwrap().status(),
            Some("no match for 'x'")
        );
    }

    #[test]
    fn long_commands_truncate_on_char_boundaries() {
        let cmd = "aaaaaa日本語テスト入力メソッド";
        let out = MachinesComponent::truncate_command(cmd, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
        assert_eq!(MachinesComponent::truncate_command("ls -la", 10), "ls -la");
    }

    #[test]
    fn draw_handles_multibyte_commands() {
        use ratatui::{Terminal, backend::TestBackend};

        let mut target = Target::new("local", ProcessSource::local());
        target.apply_snapshot(vec![ProcessRecord {
            pid: 1,
            owner: "root".to_string(),
            cpu_percent: 0.0,
            mem_percent: 0.0,
            state: ProcessState::Running,
            command: "aaaaaa日本語テスト入力メソッド".to_string(),
        }]);
        let mut c = MachinesComponent::new(TargetRegistry::new(vec![target]));

        // narrow enough that the command column must truncate
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        terminal
            .draw(|frame| c.draw_with(frame, frame.area(), true).unwrap())
            .unwrap();
    }

    #[test]
    fn escape_cancels_search() {
        let mut c = component();
        c.handle_key_event(press(KeyCode::Char('/'))).unwrap();
        c.handle_key_event(press(KeyCode::Char('z'))).unwrap();
        c.handle_key_event(press(KeyCode::Esc)).unwrap();
        assert_eq!(c.mode, Mode::Normal);
        assert!(c.registry().active().unwrap().status().is_none());
        assert_eq!(c.registry().active().unwrap().cursor_index(), 0);
    }
}
