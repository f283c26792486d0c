//! pdfscope: terminal client for browsing analysed PDFs and cited search answers.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use pdfscope::app_state::{AppState, ConfirmAction, InputMode, View};
use pdfscope::{api, config, logging, ui, worker};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

const FRAME_POLL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "pdfscope")]
#[command(about = "Browse analysed PDF documents and cited search answers", long_about = None)]
struct Args {
    /// Backend base URL, overriding pdfscope.toml
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Open this document on start-up
    #[arg(long, value_name = "ID")]
    document: Option<String>,

    /// Select this section once the document opens
    #[arg(long, value_name = "ID", requires = "document")]
    section: Option<String>,

    /// Run this search on start-up
    #[arg(long, value_name = "TEXT", conflicts_with = "document")]
    query: Option<String>,

    /// Upload this PDF on start-up
    #[arg(long, value_name = "PATH")]
    upload: Option<PathBuf>,

    /// Log file, overriding pdfscope.toml
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> pdfscope::Result<()> {
    let args = Args::parse();
    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(url) = args.api_url {
        cfg.api_url = url;
    }
    let log_file = args
        .log_file
        .unwrap_or_else(|| PathBuf::from(&cfg.log_file));
    logging::init(&log_file)?;

    let client = api::ApiClient::new(&cfg)?;
    info!(backend = %client.base_url(), "starting pdfscope");

    let mut state = AppState::new(cfg.poll_interval());
    if let Some(path) = args.upload {
        state.request_upload(path);
    }
    if let Some(document_id) = args.document {
        state.open_document(&document_id, args.section);
    } else if let Some(query) = args.query {
        state.current_view = View::Search;
        state.input.clone_from(&query);
        state.submit_search(&query);
    }

    run_tui(state, worker::Worker::spawn(client))
}

fn run_tui(mut app: AppState, worker: worker::Worker) -> pdfscope::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(%e, "interface loop failed");
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    worker: &worker::Worker,
) -> io::Result<()> {
    loop {
        for request in app.take_requests() {
            worker.send(request);
        }
        for reply in worker.drain() {
            app.apply(reply);
        }
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(FRAME_POLL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) == Flow::Quit {
                return Ok(());
            }
        }
    }
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    match app.input_mode.clone() {
        InputMode::Confirm(_) => {
            app.answer_confirmation(matches!(key.code, KeyCode::Char('y' | 'Y')));
            Flow::Continue
        }
        InputMode::Query | InputMode::UploadPath => {
            handle_prompt(app, key);
            Flow::Continue
        }
        InputMode::Normal => {
            app.message = None;
            match app.current_view {
                View::Documents => handle_documents(app, key),
                View::Sections => {
                    handle_sections(app, key);
                    Flow::Continue
                }
                View::Search => {
                    handle_search(app, key);
                    Flow::Continue
                }
            }
        }
    }
}

fn handle_prompt(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.input.clear();
        }
        KeyCode::Enter => {
            let text = app.input.clone();
            let mode = std::mem::replace(&mut app.input_mode, InputMode::Normal);
            if mode == InputMode::UploadPath {
                app.input.clear();
                app.request_upload(PathBuf::from(text.trim()));
            } else {
                app.submit_search(&text);
            }
        }
        _ => {}
    }
}

fn handle_documents(app: &mut AppState, key: KeyEvent) -> Flow {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Up | KeyCode::Char('k') => app.move_document_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_document_cursor(1),
        KeyCode::Enter => app.open_highlighted_document(),
        KeyCode::Char('r') => app.refresh_documents(),
        KeyCode::Char('u') => {
            app.input.clear();
            app.input_mode = InputMode::UploadPath;
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.highlighted_document().map(|doc| doc.id.clone()) {
                app.confirm(ConfirmAction::Delete(id));
            }
        }
        KeyCode::Char('R') => {
            if !app.documents.is_empty() {
                app.confirm(ConfirmAction::Reset);
            }
        }
        KeyCode::Char('/') => {
            app.current_view = View::Search;
            app.input.clear();
            app.input_mode = InputMode::Query;
        }
        _ => {}
    }
    Flow::Continue
}

fn handle_sections(app: &mut AppState, key: KeyEvent) {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
        app.close_document();
        return;
    }
    if key.code == KeyCode::Char('d') {
        if let Some(id) = app.document.as_ref().map(|doc| doc.metadata.id.clone()) {
            app.confirm(ConfirmAction::Delete(id));
        }
        return;
    }
    let Some(doc) = app.document.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => doc.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => doc.move_cursor(1),
        KeyCode::Home => doc.cursor_to_edge(false),
        KeyCode::End => doc.cursor_to_edge(true),
        KeyCode::Enter => doc.select_at_cursor(),
        KeyCode::Char(' ') | KeyCode::Right | KeyCode::Char('l') => {
            doc.toggle_at_cursor();
        }
        KeyCode::Left | KeyCode::Char('h') => doc.cursor_to_parent(),
        KeyCode::PageDown => doc.content_scroll = doc.content_scroll.saturating_add(10),
        KeyCode::PageUp => doc.content_scroll = doc.content_scroll.saturating_sub(10),
        _ => {}
    }
}

fn handle_search(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.current_view = View::Documents,
        KeyCode::Char('/') => {
            if let Some(result) = &app.search {
                app.input.clone_from(&result.query);
            }
            app.input_mode = InputMode::Query;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_citation_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_citation_cursor(1),
        KeyCode::Enter | KeyCode::Char('v') => app.activate_citation(app.citation_cursor),
        _ => {}
    }
}
