use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::mode::Mode;
use crate::util::{fmt_value, letters_from_col};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_grid(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
    render_command_line(frame, app, chunks[2]);
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let ds = &app.dataset;
    let view = &app.view;

    let title = format!(" {} [{}] ", ds.id(), ds.format());

    if ds.is_empty() {
        let empty = Paragraph::new("  (empty dataset)")
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let first_col = view.viewport_col;
    let last_col = (first_col + view.visible_cols).min(ds.breadth());
    let first_row = view.viewport_row;
    let last_row = (first_row + view.visible_rows).min(ds.length());

    let row_num_width = ds.length().to_string().len().max(3);

    let mut col_widths: Vec<Constraint> = Vec::with_capacity(last_col - first_col + 1);
    col_widths.push(Constraint::Length(row_num_width as u16 + 1));
    for col in first_col..last_col {
        let w = view.col_widths.get(col).copied().unwrap_or(3);
        col_widths.push(Constraint::Length(w as u16 + 2));
    }

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut header_cells: Vec<Cell> = Vec::with_capacity(last_col - first_col + 1);
    header_cells.push(Cell::from("").style(header_style));
    for col in first_col..last_col {
        let style = if col == view.cursor_col {
            header_style.bg(Color::DarkGray)
        } else {
            header_style
        };
        header_cells.push(Cell::from(letters_from_col(col)).style(style));
    }
    let header_row = Row::new(header_cells);

    let rows: Vec<Row> = (first_row..last_row)
        .map(|row| {
            let row_len = ds.row_len(row);
            let mut cells: Vec<Cell> = Vec::with_capacity(last_col - first_col + 1);

            let row_num_style = if row == view.cursor_row {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            cells.push(Cell::from(format!("{}", row + 1)).style(row_num_style));

            for col in first_col..last_col {
                let is_cursor = row == view.cursor_row && col == view.cursor_col;
                let is_padding = col >= row_len;

                let style = if is_cursor {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if view.is_selected(row, col, app.mode) {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else if is_padding {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };

                // Padding cells in a jagged dataset have no value to show.
                let content = if is_cursor && app.mode == Mode::Insert {
                    format!("{}_", app.edit_buffer)
                } else if is_padding {
                    String::new()
                } else {
                    ds.get(row, col)
                        .map(|v| fmt_value(v, app.config.precision))
                        .unwrap_or_default()
                };

                cells.push(Cell::from(content).style(style));
            }

            Row::new(cells)
        })
        .collect();

    let grid = Table::new(rows, col_widths)
        .header(header_row)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(grid, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_style = match app.mode {
        Mode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        Mode::Insert => Style::default().bg(Color::Green).fg(Color::Black),
        Mode::Command => Style::default().bg(Color::Yellow).fg(Color::Black),
        Mode::Visual | Mode::VisualRow | Mode::VisualCol => {
            Style::default().bg(Color::Magenta).fg(Color::White)
        }
    };

    let dirty_indicator = if app.dirty { "[+]" } else { "" };
    let file_name = app.file_io.file_name();

    let dims = format!("{}x{}", app.dataset.length(), app.dataset.breadth());
    let position = format!(
        "{}{} {} ",
        letters_from_col(app.view.cursor_col),
        app.view.cursor_row + 1,
        dims,
    );

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", app.mode.display_name()),
            mode_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(file_name),
        Span::raw(" "),
        Span::styled(dirty_indicator, Style::default().fg(Color::Red)),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(30)
                .saturating_sub(position.len() as u16) as usize,
        )),
        Span::raw(position),
    ]);

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}

fn render_command_line(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.mode {
        Mode::Command => format!(":{}", app.command_buffer),
        _ => app.message.clone().unwrap_or_default(),
    };

    let command_line = Paragraph::new(content);
    frame.render_widget(command_line, area);
}
