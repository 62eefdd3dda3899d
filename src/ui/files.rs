use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::truncate;

/// Maximum filename length shown in the detail panel
const DETAIL_NAME_WIDTH: usize = 34;

/// Render the file listing - table on the left, detail panel on the right
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_file_table(frame, app, chunks[0]);
    render_file_detail(frame, app, chunks[1]);
}

fn render_file_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("ID"),
        Cell::from("Filename"),
        Cell::from("Type"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let style = if i == app.file_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new([
                Cell::from(format!("{:>4}", file.id)),
                Cell::from(file.filename.clone()),
                Cell::from(file.content_type_display().to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Fill(3),
        Constraint::Fill(2),
    ];

    let title = format!(" Files ({}) ", app.files.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.file_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_file_detail(frame: &mut Frame, app: &App, area: Rect) {
    let placeholder = "-";

    let mut lines = vec![];

    match app.selected_file() {
        Some(file) => {
            lines.push(Line::from(vec![
                Span::styled("  Filename: ", styles::muted_style()),
                Span::styled(
                    truncate(&file.filename, DETAIL_NAME_WIDTH),
                    styles::list_item_style(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  ID:       ", styles::muted_style()),
                Span::styled(file.id.to_string(), styles::list_item_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Type:     ", styles::muted_style()),
                Span::styled(
                    file.content_type_display().to_string(),
                    styles::list_item_style(),
                ),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Press ", styles::muted_style()),
                Span::styled("d", styles::help_key_style()),
                Span::styled(" to download", styles::muted_style()),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  No files",
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Account:  ", styles::muted_style()),
        Span::styled(
            app.session.username().unwrap_or(placeholder).to_string(),
            styles::list_item_style(),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Server:   ", styles::muted_style()),
        Span::styled(app.config.base_url(), styles::list_item_style()),
    ]));

    if let Some(ref pending) = app.pending_upload {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Pending:  ", styles::muted_style()),
            Span::styled(
                truncate(&pending.display().to_string(), DETAIL_NAME_WIDTH),
                styles::highlight_style(),
            ),
        ]));
    }

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
