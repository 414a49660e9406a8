//! Help overlay listing every key binding.

use crate::action::Action;
use crate::components::Component;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const BINDINGS: &[(&str, &str)] = &[
    ("F1 / ?", "toggle this help"),
    ("F2 / Tab", "next machine"),
    ("F3 / Shift-Tab", "previous machine"),
    ("Up/Down j/k", "move selection"),
    ("PgUp / PgDn", "move a page"),
    ("F4 / /", "search commands"),
    ("F5", "pause process (STOP)"),
    ("F6", "terminate process (TERM)"),
    ("F7", "kill process (KILL)"),
    ("F8", "resume process (CONT)"),
    ("F9 / r", "refresh this machine"),
    ("R", "refresh all machines"),
    ("a", "toggle auto-refresh"),
    ("q / F10", "quit"),
];

/// Modal help overlay. Any key closes it.
#[derive(Debug, Default)]
pub struct HelpComponent;

impl HelpComponent {
    fn popup_area(area: Rect) -> Rect {
        let width = 44.min(area.width);
        let height = (BINDINGS.len() as u16 + 2).min(area.height);
        Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}

impl Component for HelpComponent {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(Some(Action::ToggleHelp))
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup = Self::popup_area(area);
        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(keys, what)| {
                Line::from(vec![
                    Span::styled(
                        format!("{keys:>14}  "),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*what),
                ])
            })
            .collect();

        frame.render_widget(Clear, popup);
        let para = Paragraph::new(lines).block(
            Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(para, popup);
        Ok(())
    }
}
