//! The UI renders the application state into something visible and navigable.
//!
//! The draw function dispatches on the current view. The section view shows the reconstructed
//! outline with box-drawing characters next to the content of the current section; the search
//! view shows the answer above the ranked citations.

use crate::app_state::{AppState, ConfirmAction, DocumentView, InputMode, View};
use crate::citation::summary;
use crate::lifecycle::{DocumentStatus, MutationKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const SNIPPET_WIDTH: usize = 160;

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    match app.current_view {
        View::Documents => draw_documents(f, app, chunks[0]),
        View::Sections => draw_sections(f, app, chunks[0]),
        View::Search => draw_search(f, app, chunks[0]),
    }

    draw_status_bar(f, app, chunks[1]);
}

fn status_color(status: DocumentStatus) -> Color {
    match status {
        DocumentStatus::Completed => Color::Green,
        DocumentStatus::InProgress => Color::Blue,
        DocumentStatus::Failed => Color::Red,
        DocumentStatus::Pending => Color::Yellow,
    }
}

fn status_badge(status: DocumentStatus) -> Span<'static> {
    Span::styled(
        format!(" {} ", status.label()),
        Style::default()
            .fg(Color::Black)
            .bg(status_color(status))
            .add_modifier(Modifier::BOLD),
    )
}

/// Box-drawing prefix for a row at `depth`, given which ancestor levels still have siblings.
fn tree_prefix(depth: usize, is_last: bool, ancestors_continue: &[bool]) -> String {
    if depth == 0 {
        return String::new();
    }

    let mut prefix = String::new();
    for level in 1..depth {
        if ancestors_continue.get(level).copied().unwrap_or(false) {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }

    if is_last {
        prefix.push_str("└── ");
    } else {
        prefix.push_str("├── ");
    }

    prefix
}

fn draw_documents(f: &mut Frame, app: &AppState, area: Rect) {
    let mut title = format!("Documents ({})", app.documents.len());
    if app.needs_polling() {
        title.push_str(" - processing");
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if !app.documents_loaded {
        f.render_widget(Paragraph::new("Loading documents...").block(block), area);
        return;
    }
    if app.documents.is_empty() {
        f.render_widget(
            Paragraph::new("No documents uploaded yet. Press u to upload a PDF.").block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .documents
        .iter()
        .map(|doc| {
            let mut lines = vec![
                Line::from(vec![
                    status_badge(doc.status),
                    Span::raw(" "),
                    Span::styled(
                        doc.filename.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "   {} sections · Uploaded {}",
                        doc.total_sections,
                        doc.upload_day()
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            if let Some(reason) = doc.failure() {
                lines.push(Line::from(Span::styled(
                    format!("   Error: {reason}"),
                    Style::default().fg(Color::Red),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.document_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_sections(f: &mut Frame, app: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let Some(doc) = app.document.as_ref() else {
        let text = match &app.loading_document {
            Some(id) => format!("Loading document {id}..."),
            None => "No document open".to_string(),
        };
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let header = Line::from(vec![
        status_badge(doc.metadata.status),
        Span::raw(" "),
        Span::styled(
            doc.metadata.filename.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} sections", doc.metadata.total_sections),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let breadcrumb = doc.breadcrumb().join(" > ");
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).title(breadcrumb)),
        chunks[0],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    draw_outline(f, doc, body[0]);
    draw_content(f, doc, body[1]);
}

fn draw_outline(f: &mut Frame, doc: &DocumentView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Sections");
    let rows = doc.rows();
    if rows.is_empty() {
        f.render_widget(Paragraph::new("No sections").block(block), area);
        return;
    }

    let current_id = doc.current_section().map(|s| s.id.as_str());
    let mut ancestors_continue: Vec<bool> = Vec::new();

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let prefix = tree_prefix(row.depth, row.is_last, &ancestors_continue);
            ancestors_continue.truncate(row.depth);
            ancestors_continue.push(!row.is_last);

            let marker = if !row.node.has_children() {
                "  "
            } else if row.expanded {
                "▾ "
            } else {
                "▸ "
            };
            let section = &row.node.section;
            let title_style = if current_id == Some(section.id.as_str()) {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::DarkGray)),
                Span::raw(marker),
                Span::styled(section.title.clone(), title_style),
                Span::styled(
                    format!("  p.{}", section.page_number),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(doc.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_content(f: &mut Frame, doc: &DocumentView, area: Rect) {
    let Some(section) = doc.current_section() else {
        f.render_widget(
            Paragraph::new("Select a section to view its content").block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("No Section Selected"),
            ),
            area,
        );
        return;
    };

    let title = format!("{} (Page {})", section.title, section.page_number);
    let content = Paragraph::new(section.content.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((doc.content_scroll, 0));
    f.render_widget(content, area);
}

fn draw_search(f: &mut Frame, app: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(30),
            Constraint::Min(0),
        ])
        .split(area);

    let editing = app.input_mode == InputMode::Query;
    let query_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let query_text = if editing || app.search.is_none() {
        app.input.clone()
    } else {
        app.search
            .as_ref()
            .map(|s| s.query.clone())
            .unwrap_or_default()
    };
    f.render_widget(
        Paragraph::new(query_text).style(query_style).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Query (/ to edit, Enter to search)"),
        ),
        chunks[0],
    );

    let answer_block = Block::default().borders(Borders::ALL).title("Answer");
    let answer = if app.search_pending {
        "Searching...".to_string()
    } else {
        match &app.search {
            Some(result) => result.response.clone(),
            None => "Enter a search query to find relevant information".to_string(),
        }
    };
    f.render_widget(
        Paragraph::new(answer)
            .block(answer_block)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    let presented = app.presented_citations();
    let citations_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Citations - {}", summary(presented.len())));

    let items: Vec<ListItem> = presented
        .iter()
        .map(|entry| {
            let citation = entry.citation;
            let snippet: String = citation
                .text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(SNIPPET_WIDTH)
                .collect();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{}. ", entry.rank + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        citation.section_title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "   {} · Relevance: {}",
                        citation.document_name, entry.relevance
                    ),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::raw(format!("   {snippet}"))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(citations_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.citation_cursor));
    f.render_stateful_widget(list, chunks[2], &mut state);
}

fn draw_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let (text, title) = match &app.input_mode {
        InputMode::UploadPath => (
            format!("{}_", app.input),
            "Upload PDF (Enter to send, Esc to cancel)",
        ),
        InputMode::Query => (format!("/{}_", app.input), "Search"),
        InputMode::Confirm(ConfirmAction::Delete(id)) => {
            let name = app
                .documents
                .iter()
                .find(|doc| &doc.id == id)
                .map_or(id.as_str(), |doc| doc.filename.as_str());
            (format!("Delete {name}? (y/n)"), "Confirm")
        }
        InputMode::Confirm(ConfirmAction::Reset) => (
            "Delete ALL documents? This cannot be undone. (y/n)".to_string(),
            "Confirm",
        ),
        InputMode::Normal => match &app.message {
            Some(msg) => (msg.clone(), ""),
            None => (help_text(app), ""),
        },
    };

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn help_text(app: &AppState) -> String {
    let busy = |kind: MutationKind, idle: &str| {
        if app.gate.is_pending(kind) {
            kind.pending_label().to_string()
        } else {
            idle.to_string()
        }
    };
    match app.current_view {
        View::Documents => format!(
            "↑/↓: Navigate | Enter: Open | u: {} | d: {} | R: {} | r: Refresh | /: Search | q: Quit",
            busy(MutationKind::Upload, "Upload"),
            busy(MutationKind::Delete, "Delete"),
            busy(MutationKind::Reset, "Reset All"),
        ),
        View::Sections => format!(
            "↑/↓: Navigate | Enter: Show | Space/→: Fold | ←: Parent | PgUp/PgDn: Scroll | d: {} | q: Back",
            busy(MutationKind::Delete, "Delete"),
        ),
        View::Search => {
            "/: Edit query | ↑/↓: Citations | Enter/v: View section | Esc/q: Back".to_string()
        }
    }
}
