use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};

use crate::document_store::format_file_size;
use crate::pipeline::ProcessingOutcome;

use super::app::App;
use super::models::Panel;
use super::utils::centered_rect;

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(f, chunks[0], app);
    match app.panel {
        Panel::Files => render_file_list(f, chunks[1], app),
        Panel::Results => render_result_list(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);

    if app.preview.is_open() {
        render_preview_popup(f, app);
    }

    if app.show_help {
        render_help_popup(f);
    }
}

fn render_header(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let title = if app.pipeline.is_processing() {
        "Document Renamer - Processing..."
    } else if app.finished {
        "Document Renamer - Completed!"
    } else {
        "Document Renamer"
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn render_file_list(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let items: Vec<ListItem> = app
        .store
        .files()
        .iter()
        .map(|file| {
            ListItem::new(Line::from(vec![
                Span::styled(file.name.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {}", format_file_size(file.size())),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let title = format!(
        "Files to Process ({} file(s), {} batch(es))",
        app.store.len(),
        app.store.total_batches()
    );

    let files_list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(files_list, area, &mut app.list_state.clone());
}

fn render_result_list(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let items: Vec<ListItem> = app
        .pipeline
        .results()
        .entries()
        .iter()
        .map(|entry| {
            let line = match &entry.outcome {
                None => Line::from(vec![
                    Span::styled("[PENDING] ", Style::default().fg(Color::Yellow)),
                    Span::styled(entry.file.name.clone(), Style::default().fg(Color::White)),
                ]),
                Some(ProcessingOutcome::Completed { new_name }) => Line::from(vec![
                    Span::styled("[RENAMED] ", Style::default().fg(Color::Green)),
                    Span::styled(entry.file.name.clone(), Style::default().fg(Color::Gray)),
                    Span::styled(" -> ", Style::default().fg(Color::Gray)),
                    Span::styled(new_name.clone(), Style::default().fg(Color::White)),
                ]),
                Some(ProcessingOutcome::Failed { reason }) => Line::from(vec![
                    Span::styled("[FAILED]  ", Style::default().fg(Color::Red)),
                    Span::styled(entry.file.name.clone(), Style::default().fg(Color::White)),
                    Span::styled(format!(" ({reason})"), Style::default().fg(Color::Red)),
                ]),
            };
            ListItem::new(line)
        })
        .collect();

    let results_list = List::new(items)
        .block(
            Block::default()
                .title("Results")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(results_list, area, &mut app.list_state.clone());
}

fn render_status_bar(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(area);

    let run = app.pipeline.run_state();
    let stats = app.pipeline.results().stats();

    let progress_label = if let Some(message) = &app.status_message {
        message.text.clone()
    } else if run.is_processing {
        format!("Batch {}/{}", run.current_batch, run.total_batches)
    } else if app.finished {
        format!(
            "Complete! {} renamed, {} failed ({}/{} batches)",
            stats.completed, stats.failed, run.current_batch, run.total_batches
        )
    } else {
        format!("Ready to process {} file(s)", app.store.len())
    };

    let progress_style = if app.status_message.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Green)
    };

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Batches"))
        .gauge_style(progress_style)
        .percent(run.progress_percent() as u16)
        .label(progress_label);

    f.render_widget(progress, chunks[0]);

    let controls_text = if app.preview.is_open() {
        "Enter save, +/- zoom, Esc close"
    } else if app.finished {
        "d download all, p preview, q quit"
    } else {
        "Enter start, x remove, h help, q quit"
    };

    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    f.render_widget(controls, chunks[1]);
}

fn render_preview_popup(f: &mut Frame, app: &App) {
    let Some(preview) = app.preview.current() else {
        return;
    };

    let popup_area = centered_rect(70, 60, f.area());

    let lines = vec![
        Line::from("Original:"),
        Line::from(Span::styled(
            preview.file.name.clone(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from("Proposed:"),
        Line::from(Span::styled(
            preview.proposed_name.clone(),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(format!("Size: {}", format_file_size(preview.file.size()))),
        Line::from(format!("Zoom: {}%", preview.zoom)),
        Line::from(format!("Staged at: {}", preview.staged_path().display())),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to save, +/- to zoom, Esc to close",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Preview")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Document Renamer - Help",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Up/k    - Move up"),
        Line::from("  Down/j  - Move down"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  Enter   - Start processing"),
        Line::from("  x/Del   - Remove selected file"),
        Line::from("  p       - Preview selected result"),
        Line::from("  d       - Download all renamed copies"),
        Line::from("  +/-     - Zoom preview"),
        Line::from("  h       - Toggle this help"),
        Line::from("  q/Esc   - Quit application"),
        Line::from(""),
        Line::from("Files are sent to the classification service in batches"),
        Line::from("of ten, one file at a time. A failed file never stops"),
        Line::from("the rest of the run."),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press Esc or h to close",
            Style::default().fg(Color::Gray),
        )]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
