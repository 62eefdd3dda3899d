use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, LoginMode};

use super::files;
use super::styles;

/// Visible width of the upload path input field
const PATH_FIELD_WIDTH: usize = 46;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    files::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::EnteringUploadPath) {
        render_upload_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  Depot";
    let help_hint = "[?] Help";
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pload | [d]ownload | [r]efresh | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.is_authenticated() {
        " Ready ".to_string()
    } else {
        " Not logged in - press [l] ".to_string()
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Logo lines shared by the dialog overlays
fn logo_lines(indent: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            format!("{}╔╦╗╔═╗╔═╗╔═╗╔╦╗", indent),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("{} ║║║╣ ╠═╝║ ║ ║ ", indent),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("{}═╩╝╚═╝╩  ╚═╝ ╩ ", indent),
            styles::title_style(),
        )),
    ]
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 22, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines("                 ");
    help_text.extend(vec![
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Navigate file list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  PgUp/PgDn ", styles::help_key_style()),
            Span::styled("Scroll a page", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Upload a file", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  d / Enter ", styles::help_key_style()),
            Span::styled("Download selected file", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Refresh file list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  l         ", styles::help_key_style()),
            Span::styled("Log in again", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog - compact
    let extra = app.login_error.is_some() || app.login_notice.is_some();
    let height = if extra { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines("              ");
    lines.push(Line::from(""));

    // Username field
    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Submit button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match app.login_mode {
        LoginMode::Login => "  Login   ",
        LoginMode::Register => " Register ",
    };
    lines.push(Line::from(""));
    if button_focused {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled(format!("▶{}◀", label), button_style),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled(format!(" {} ", label), button_style),
            Span::raw("]"),
        ]));
    }

    // Mode switch hint
    let mode_hint = match app.login_mode {
        LoginMode::Login => " Ctrl+R: create a new account",
        LoginMode::Register => " Ctrl+R: back to login",
    };
    lines.push(Line::from(Span::styled(mode_hint, styles::muted_style())));

    // Error or notice message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    } else if let Some(ref notice) = app.login_notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", notice),
            styles::success_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_upload_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(60, 8, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    // Show the tail of long paths so the cursor position stays visible
    let shown: String = if app.upload_path_input.chars().count() > PATH_FIELD_WIDTH {
        let skip = app.upload_path_input.chars().count() - PATH_FIELD_WIDTH;
        app.upload_path_input.chars().skip(skip).collect()
    } else {
        app.upload_path_input.clone()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Path of the file to upload:",
            styles::help_desc_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  > ", styles::muted_style()),
            Span::styled(shown, styles::highlight_style()),
            Span::styled("▌", styles::highlight_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", styles::help_key_style()),
            Span::styled(": upload   ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(": cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Upload file ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    // Fixed size dialog matching login screen
    let area = centered_rect_fixed(46, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines("              ");
    lines.extend(vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
