//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_password_char, can_add_path_char, can_add_username_char, App, AppState, LoginFocus,
    LoginMode,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle upload path prompt
    if matches!(app.state, AppState::EnteringUploadPath) {
        return handle_upload_input(app, key);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('r') => {
            app.refresh_files_background();
        }
        KeyCode::Char('u') => {
            app.start_upload_prompt();
        }
        KeyCode::Char('d') | KeyCode::Enter => {
            app.download_selected();
        }
        KeyCode::Char('l') => {
            app.start_login();
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.select_page_down(),
        KeyCode::PageUp => app.select_page_up(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => {}
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl+R toggles between login and registration
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.login_mode = match app.login_mode {
            LoginMode::Login => LoginMode::Register,
            LoginMode::Register => LoginMode::Login,
        };
        app.login_error = None;
        app.login_notice = None;
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // With a stored session go back to browsing, otherwise quit
            if app.is_authenticated() {
                app.state = AppState::Normal;
            } else {
                app.state = AppState::Quitting;
                return Ok(true);
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => {
            match app.login_focus {
                LoginFocus::Username => {
                    // Move to password
                    app.login_focus = LoginFocus::Password;
                }
                LoginFocus::Password => {
                    // Move to button
                    app.login_focus = LoginFocus::Button;
                }
                LoginFocus::Button => match app.login_mode {
                    LoginMode::Login => {
                        // If successful, state will be Normal
                        // If failed, login_error will be set
                        let _ = app.attempt_login().await;
                        if app.state == AppState::Normal {
                            // Login succeeded, load the file list
                            app.refresh_files_background();
                        }
                    }
                    LoginMode::Register => {
                        let _ = app.attempt_register().await;
                    }
                },
            }
        }
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {
                // Ignore character input on button
            }
        },
        _ => {}
    }
    Ok(false)
}

fn handle_upload_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Cancel without touching any previous selection
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.confirm_upload_prompt();
        }
        KeyCode::Backspace => {
            app.upload_path_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.upload_path_input.len(), c) {
                app.upload_path_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}
