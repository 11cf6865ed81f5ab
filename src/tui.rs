// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Terminal user interface
//!
//! An interactive list screen over one collection. Every redraw reads the
//! list controller's latest state; keys map to controller triggers.

use crate::commands::output::page_footer;
use crate::listing::{ListConfig, ListController, ListState, PageSource};
use crate::types::Listable;
use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::{DefaultTerminal, Frame};
use std::time::Duration;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks the browser to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Next page
    NextPage,
    /// Previous page
    PreviousPage,
    /// Cycle through the sort keys
    CycleOrdering,
    /// Refetch the current page
    Refresh,
    /// Leave the browser
    Quit,
}

/// Map a key to its action
#[must_use]
pub fn action_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Some(Action::NextPage),
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Some(Action::PreviousPage),
        KeyCode::Char('s') => Some(Action::CycleOrdering),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// The ordering after `current` in `orderings`, wrapping around
#[must_use]
pub fn next_ordering(orderings: &[&str], current: &str) -> String {
    if orderings.is_empty() {
        return current.to_string();
    }
    let next = orderings
        .iter()
        .position(|o| *o == current)
        .map_or(0, |i| (i + 1) % orderings.len());
    orderings[next].to_string()
}

/// One collection shown in the terminal
pub struct Browser<T> {
    title: String,
    controller: ListController<T>,
}

impl<T> Browser<T>
where
    T: Listable + Clone + Send + Sync + 'static,
{
    /// Browser over `source`, not yet fetching
    pub fn new(
        title: impl Into<String>,
        source: impl PageSource<T> + 'static,
        page_size: u64,
    ) -> Self {
        let title = title.into();
        let config = ListConfig::new(source, page_size, format!("Failed to load {title}"));
        Self {
            title,
            controller: ListController::new(config),
        }
    }

    /// Underlying controller
    #[must_use]
    pub fn controller(&self) -> &ListController<T> {
        &self.controller
    }

    /// Apply an action; returns `false` once the browser should close
    pub fn handle(&self, action: Action) -> bool {
        let state = self.controller.state();
        let pages = state.total_pages(self.controller.page_size());
        match action {
            Action::NextPage if state.page + 1 < pages => {
                self.controller.change_page(state.page + 1);
            }
            Action::PreviousPage if state.page > 0 => {
                self.controller.change_page(state.page - 1);
            }
            Action::CycleOrdering => {
                self.controller
                    .change_ordering(next_ordering(T::ORDERINGS, &state.ordering));
            }
            Action::Refresh => {
                self.controller.refresh();
            }
            Action::Quit => return false,
            Action::NextPage | Action::PreviousPage => {}
        }
        true
    }

    /// Draw the current state into `frame`
    pub fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        render_list(
            frame,
            area,
            &self.title,
            &self.controller.state(),
            self.controller.page_size(),
        );
    }

    /// Run the event loop until the user quits
    pub fn run(&self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.controller.start();
        loop {
            terminal
                .draw(|frame| self.render(frame))
                .context("Failed to draw")?;

            let ready = tokio::task::block_in_place(|| event::poll(POLL_INTERVAL))
                .context("Failed to poll terminal events")?;
            if !ready {
                continue;
            }
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = action_for(key.code, key.modifiers) {
                    debug!(?action, "key action");
                    if !self.handle(action) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn render_list<T: Listable>(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    state: &ListState<T>,
    page_size: u64,
) {
    let [body, status, help] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let ordering = if state.ordering.is_empty() {
        "default"
    } else {
        state.ordering.as_str()
    };

    let header = Row::new(T::COLUMNS.iter().copied())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = state.items.iter().map(|item| Row::new(item.cells()));
    let columns = u32::try_from(T::COLUMNS.len().max(1)).unwrap_or(u32::MAX);
    let widths = vec![Constraint::Ratio(1, columns); T::COLUMNS.len()];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} (sort: {ordering}) ")),
    );
    frame.render_widget(table, body);

    let mut line = page_footer(state.page, page_size, state.total_count);
    let mut style = Style::default();
    if state.loading {
        line.push_str("  loading...");
    }
    if let Some(error) = &state.error {
        line.push_str("  ");
        line.push_str(error);
        style = style.fg(Color::Red);
    }
    frame.render_widget(Paragraph::new(Line::styled(line, style)), status);

    frame.render_widget(
        Paragraph::new("n: next  p: previous  s: sort  r: refresh  q: quit")
            .style(Style::default().fg(Color::DarkGray)),
        help,
    );
}

/// Take over the terminal and browse until the user quits
pub fn browse<T>(browser: &Browser<T>) -> Result<()>
where
    T: Listable + Clone + Send + Sync + 'static,
{
    let mut terminal = ratatui::init();
    let result = browser.run(&mut terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Page, PageRequest, Remote};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::BTreeMap;

    fn remote(name: &str) -> Remote {
        Remote {
            pulp_href: format!("/pulp/api/v3/remotes/rpm/rpm/{name}/"),
            name: name.to_string(),
            url: format!("https://mirror.example/{name}/"),
            policy: Some("immediate".into()),
            tls_validation: None,
            headers: None,
            pulp_labels: BTreeMap::new(),
            pulp_created: None,
        }
    }

    fn source(request: PageRequest) -> impl std::future::Future<Output = crate::Result<Page<Remote>>> {
        async move {
            let items = (request.offset..request.offset + 2)
                .map(|i| remote(&format!("mirror-{i}")))
                .collect();
            Ok(Page::new(items, 5))
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_action_for_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(action_for(KeyCode::Char('n'), none), Some(Action::NextPage));
        assert_eq!(action_for(KeyCode::Char('p'), none), Some(Action::PreviousPage));
        assert_eq!(action_for(KeyCode::Char('s'), none), Some(Action::CycleOrdering));
        assert_eq!(action_for(KeyCode::Char('r'), none), Some(Action::Refresh));
        assert_eq!(action_for(KeyCode::Esc, none), Some(Action::Quit));
        assert_eq!(
            action_for(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(action_for(KeyCode::Char('x'), none), None);
    }

    #[test]
    fn test_next_ordering_wraps() {
        let orderings = ["", "name", "-name"];
        assert_eq!(next_ordering(&orderings, ""), "name");
        assert_eq!(next_ordering(&orderings, "-name"), "");
        assert_eq!(next_ordering(&orderings, "unknown"), "");
        assert_eq!(next_ordering(&[], "name"), "name");
    }

    #[tokio::test]
    async fn test_handle_respects_page_bounds() {
        let browser = Browser::new("remotes", source, 2);
        browser.controller().start().unwrap().await.unwrap();

        assert!(browser.handle(Action::PreviousPage));
        assert_eq!(browser.controller().state().generation(), 1);

        assert!(browser.handle(Action::NextPage));
        let state = browser.controller().state();
        assert_eq!(state.page, 1);
        assert_eq!(state.generation(), 2);

        assert!(!browser.handle(Action::Quit));
    }

    #[tokio::test]
    async fn test_handle_cycles_ordering_and_resets_page() {
        let browser = Browser::new("remotes", source, 2);
        browser.controller().change_page(2).unwrap().await.unwrap();

        browser.handle(Action::CycleOrdering);
        let state = browser.controller().state();
        assert_eq!(state.ordering, "name");
        assert_eq!(state.page, 0);
    }

    #[tokio::test]
    async fn test_render_shows_rows_and_footer() {
        let browser = Browser::new("RPM remotes", source, 2);
        browser.controller().start().unwrap().await.unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|frame| browser.render(frame)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("RPM remotes (sort: default)"));
        assert!(text.contains("NAME"));
        assert!(text.contains("mirror-0"));
        assert!(text.contains("mirror-1"));
        assert!(text.contains("page 1 of 3 (5 total)"));
        assert!(text.contains("q: quit"));
    }
}
