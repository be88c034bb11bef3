//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus, MetadataView, Prompt, StatusKind, UploadField};
use crate::config::UiSettings;
use crate::library::{DOWNLOAD_MIME, entry_details, format_duration, format_size_kb};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("tab", "switch pane");
    map.insert("h/l", "categories/files");
    map.insert("enter", "open/download");
    map.insert("d", "download");
    map.insert("u", "upload");
    map.insert("n", "new category");
    map.insert("/", "filter");
    map.insert("K", "metadata");
    map.insert("r", "refresh");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "tab", "enter", "d", "u", "n", "gg/G", "K", "/", "r", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Window `[start, end)` of `total` rows that keeps `sel_pos` centered when possible,
/// plus the selected row's offset inside that window.
fn visible_window(total: usize, height: usize, sel_pos: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, sel_pos);
    }
    let half = height / 2;
    let mut start = sel_pos.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, sel_pos - start)
}

fn pane_block(title: &'static str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block.border_style(Style::default().add_modifier(Modifier::DIM))
    }
}

/// Upper-case the characters of `name` at `positions` to show fuzzy matches.
fn highlight_matches(name: &str, positions: Vec<usize>) -> String {
    let mut rendered = String::new();
    let mut pos_iter = positions.into_iter();
    let mut next_pos = pos_iter.next();

    for (ci, ch) in name.chars().enumerate() {
        if next_pos == Some(ci) {
            for up in ch.to_uppercase() {
                rendered.push(up);
            }
            next_pos = pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

fn metadata_text(view: &MetadataView) -> String {
    match &view.result {
        Ok(meta) => format!(
            "File: {}\nDuration: {} ({:.1}s)\nSize: {} ({} bytes)\nType: {}\nPath: {}",
            view.name,
            format_duration(meta.duration),
            meta.duration_seconds(),
            format_size_kb(meta.size_bytes),
            meta.size_bytes,
            DOWNLOAD_MIME,
            view.path.display()
        ),
        Err(e) => format!(
            "File: {}\nDuration: unknown\n{}\nPath: {}",
            view.name,
            e,
            view.path.display()
        ),
    }
}

fn prompt_popup(frame: &mut Frame, prompt: &Prompt, area: Rect) {
    let (title, body) = match prompt {
        Prompt::Upload(form) => {
            let marker = |field: UploadField| if form.field == field { ">" } else { " " };
            (
                " upload (tab switches, enter uploads, esc cancels) ",
                format!(
                    "{} File:     {}\n{} Category: {}\n\nA new category name creates it.",
                    marker(UploadField::Source),
                    form.source,
                    marker(UploadField::Category),
                    form.category
                ),
            )
        }
        Prompt::NewCategory(name) => (
            " new category (enter creates, esc cancels) ",
            format!("> Name: {}", name),
        ),
    };

    let popup_area = centered_rect_sized(80, 8, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(body)
        .block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(title),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, popup_area);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, display: &[usize], ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" audioshelf ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();
        parts.push(format!(" Root: {}", app.library.root().display()));
        if let Some(category) = app.current_category() {
            parts.push(format!("Category: {} ({} files)", category, app.entries.len()));
        } else {
            parts.push("No categories yet: press u to upload or n to create one".to_string());
        }

        let q = app.filter_query.trim();
        if app.filter_mode || !q.is_empty() {
            let mut filter_part = String::from("FILTER:");
            if !q.is_empty() {
                filter_part.push(' ');
                filter_part.push_str(q);
            }
            parts.push(filter_part);
        }
        parts.join(" • ")
    };
    let mut status_par = Paragraph::new(match &app.status {
        Some(msg) => format!("{}\n {}", status, msg.text),
        None => status,
    });
    if let Some(msg) = &app.status {
        if msg.kind == StatusKind::Error {
            status_par = status_par.fg(Color::Red);
        }
    }
    let status_par = status_par
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[2]);

    // Categories
    {
        let height = panes[0].height.saturating_sub(2) as usize;
        let total = app.categories.len();
        let (start, end, sel) = visible_window(total, height, app.selected_category);
        let items: Vec<ListItem> = app.categories[start..end]
            .iter()
            .map(|c| ListItem::new(c.as_str()))
            .collect();
        let list = List::new(items)
            .block(pane_block(" categories ", app.focus == Focus::Categories))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(sel));
        }
        frame.render_stateful_widget(list, panes[0], &mut state);
    }

    // Files
    {
        let q = app.filter_query.trim();
        let query_lower = if q.is_empty() {
            None
        } else if app.uses_lower_names() {
            Some(q.to_ascii_lowercase())
        } else {
            None
        };

        // Only build ListItems for the visible window.
        let total = display.len();
        let height = panes[1].height.saturating_sub(2) as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = visible_window(total, height, sel_pos);

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let entry = &app.entries[i];
                let name = if q.is_empty() {
                    entry.name.clone()
                } else {
                    let positions = match query_lower.as_deref() {
                        Some(ql) => app.fuzzy_match_positions_for_entry_lower(i, ql),
                        None => App::fuzzy_match_positions(&entry.name, q),
                    };
                    match positions {
                        Some(p) => highlight_matches(&entry.name, p),
                        None => entry.name.clone(),
                    }
                };
                let details = entry_details(entry, &ui_settings.unknown_duration);
                ListItem::new(format!("{}  {}", name, details))
            })
            .collect();

        let title = if app.entries.is_empty() && app.current_category().is_some() {
            " files (empty) "
        } else {
            " files "
        };
        let list = List::new(visible_items)
            .block(pane_block(title, app.focus == Focus::Files))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, panes[1], &mut state);
    }

    // Overlay metadata popup (keeps list visible under it)
    if let Some(view) = &app.metadata_view {
        let popup_area = centered_rect_sized(72, 9, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let meta_paragraph = Paragraph::new(metadata_text(view))
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    if let Some(prompt) = &app.prompt {
        prompt_popup(frame, prompt, chunks[2]);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
        assert_eq!(visible_window(100, 0, 7), (0, 100, 7));
    }

    #[test]
    fn highlight_matches_uppercases_positions() {
        assert_eq!(highlight_matches("song.mp3", vec![0, 5]), "Song.Mp3");
    }

    #[test]
    fn controls_text_lists_every_binding_once() {
        let text = controls_text();
        assert!(text.starts_with("[j/k] up/down | [h/l] categories/files"));
        assert_eq!(text.matches('[').count(), CONTROLS_MAP.len());
    }
}
