//! Application state management for Depot.
//!
//! This module contains the core `App` struct that owns the session, the
//! API client, the file listing, and background transfer coordination.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::auth::{CredentialStore, Session};
use crate::config::Config;
use crate::models::FileRecord;
use crate::utils::sanitize_filename;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is plenty for the handful of concurrent transfers a user can start.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the upload path input
const MAX_PATH_LENGTH: usize = 256;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Whether a character may be appended to the username input
pub fn can_add_username_char(len: usize, c: char) -> bool {
    len < MAX_USERNAME_LENGTH && !c.is_control()
}

/// Whether a character may be appended to the password input
pub fn can_add_password_char(len: usize, c: char) -> bool {
    len < MAX_PASSWORD_LENGTH && !c.is_control()
}

/// Whether a character may be appended to the upload path input
pub fn can_add_path_char(len: usize, c: char) -> bool {
    len < MAX_PATH_LENGTH && !c.is_control()
}

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    EnteringUploadPath,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Which account operation the login form submits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background transfer tasks.
///
/// These variants are sent through an MPSC channel from spawned transfer
/// tasks back to the main loop, which applies them to application state.
enum TransferResult {
    /// File listing fetched successfully
    Files(Vec<FileRecord>),
    /// One file uploaded successfully
    Uploaded(String),
    /// One file downloaded and written to disk (filename, destination)
    Downloaded(String, PathBuf),
    /// A transfer failed; the message is the generic user-facing notice
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub status_message: Option<String>,

    // File listing state
    pub files: Vec<FileRecord>,
    pub file_selection: usize,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_mode: LoginMode,
    pub login_error: Option<String>,
    pub login_notice: Option<String>,

    // Upload state
    pub upload_path_input: String,
    pub pending_upload: Option<PathBuf>,

    // Background task channel
    transfer_rx: mpsc::Receiver<TransferResult>,
    transfer_tx: mpsc::Sender<TransferResult>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));

        // Load session from disk if it exists
        let mut session = Session::new(cache_dir);
        let _ = session.load();

        let mut api = ApiClient::new(&config.base_url())?;

        // If we have a stored session, set the token on the API client
        if let Some(ref data) = session.data {
            api.set_token(data.token.clone());
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill credentials from env vars or config
        let login_username = std::env::var("DEPOT_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let login_password = std::env::var("DEPOT_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            status_message: None,

            files: Vec::new(),
            file_selection: 0,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_mode: LoginMode::Login,
            login_error: None,
            login_notice: None,

            upload_path_input: String::new(),
            pending_upload: None,

            transfer_rx: rx,
            transfer_tx: tx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if the user has a stored session
    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_mode = LoginMode::Login;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
        self.login_notice = None;
    }

    /// Attempt login with the credentials from the login form.
    ///
    /// Awaited inline on the event loop, so a second submission cannot start
    /// while one is in flight; the last successful login wins.
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;
        self.login_notice = None;

        match self.api.authenticate(&username, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&username, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                if let Some(ref data) = self.session.data {
                    self.api.set_token(data.token.clone());
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(Self::friendly_auth_error(&e, "Login"));
                Err(e)
            }
        }
    }

    /// Attempt registration with the credentials from the login form.
    /// Registration does not log the user in; on success the form switches
    /// back to login mode so the new account can authenticate.
    pub async fn attempt_register(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;
        self.login_notice = None;

        match self.api.register(&username, &password).await {
            Ok(()) => {
                info!(username = %username, "Account registered");
                self.login_mode = LoginMode::Login;
                self.login_focus = LoginFocus::Button;
                self.login_notice = Some("Account created - press Enter to log in".to_string());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.login_error = Some(Self::friendly_auth_error(&e, "Registration"));
                Err(e)
            }
        }
    }

    /// Map an auth failure to a user-friendly message based on error text.
    /// The alternate format includes the whole cause chain.
    fn friendly_auth_error(e: &anyhow::Error, what: &str) -> String {
        let text = format!("{:#}", e).to_lowercase();
        if text.contains("401") || text.contains("unauthorized") {
            "Invalid username or password".to_string()
        } else if text.contains("network") || text.contains("connect") {
            "Unable to connect to server".to_string()
        } else if text.contains("timeout") {
            "Connection timed out. Please try again.".to_string()
        } else {
            format!("{} failed: {}", what, e)
        }
    }

    // =========================================================================
    // File Selection
    // =========================================================================

    pub fn selected_file(&self) -> Option<&FileRecord> {
        self.files.get(self.file_selection)
    }

    pub fn select_next(&mut self) {
        if !self.files.is_empty() {
            self.file_selection = (self.file_selection + 1).min(self.files.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.file_selection = self.file_selection.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        if !self.files.is_empty() {
            self.file_selection =
                (self.file_selection + PAGE_SCROLL_SIZE).min(self.files.len() - 1);
        }
    }

    pub fn select_page_up(&mut self) {
        self.file_selection = self.file_selection.saturating_sub(PAGE_SCROLL_SIZE);
    }

    pub fn select_first(&mut self) {
        self.file_selection = 0;
    }

    pub fn select_last(&mut self) {
        self.file_selection = self.files.len().saturating_sub(1);
    }

    // =========================================================================
    // Background Transfers
    // =========================================================================

    /// Helper to send transfer results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TransferResult>, result: TransferResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send transfer result - channel closed");
        }
    }

    /// Snapshot an API client carrying the current token for a spawned task.
    /// Each task gets its own clone, so concurrent transfers never share
    /// mutable request state. With no session the request goes out bare and
    /// the server rejects it.
    fn transfer_client(&self) -> ApiClient {
        match self.session.token() {
            Some(token) => self.api.with_token(token.to_string()),
            None => self.api.clone(),
        }
    }

    /// Spawn a background task to refresh the file list.
    /// On success the whole in-memory list is replaced; on failure the
    /// previously rendered list stays in place.
    pub fn refresh_files_background(&mut self) {
        info!("Starting file list refresh");

        let api = self.transfer_client();
        let tx = self.transfer_tx.clone();

        tokio::spawn(async move {
            match api.list_files().await {
                Ok(files) => {
                    Self::send_result(&tx, TransferResult::Files(files)).await;
                }
                Err(e) => {
                    error!(error = %e, "File list refresh failed");
                    Self::send_result(
                        &tx,
                        TransferResult::Error("Failed to fetch files".to_string()),
                    )
                    .await;
                }
            }
        });

        self.status_message = Some("Refreshing files...".to_string());
    }

    /// Open the upload path prompt, prefilled with any previous selection
    pub fn start_upload_prompt(&mut self) {
        self.state = AppState::EnteringUploadPath;
        self.upload_path_input = self
            .pending_upload
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
    }

    /// Confirm the upload prompt: record the selection and submit it
    pub fn confirm_upload_prompt(&mut self) {
        let input = self.upload_path_input.trim().to_string();
        self.state = AppState::Normal;

        if input.is_empty() {
            self.status_message = Some("No file selected".to_string());
            return;
        }

        self.select_upload(PathBuf::from(input));
        self.submit_upload();
    }

    /// Record the file to upload, replacing any previous selection.
    /// No validation happens here; a bad path surfaces when the upload runs.
    pub fn select_upload(&mut self, path: PathBuf) {
        self.pending_upload = Some(path);
    }

    /// Spawn a background task to upload the pending file.
    /// A failed upload keeps the selection so the user can retry; a
    /// successful one clears it and triggers a listing refresh.
    pub fn submit_upload(&mut self) {
        let path = match self.pending_upload.clone() {
            Some(p) => p,
            None => {
                self.status_message = Some("No file selected".to_string());
                return;
            }
        };

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        info!(path = %path.display(), "Starting upload");

        let api = self.transfer_client();
        let tx = self.transfer_tx.clone();
        let status_filename = filename.clone();

        tokio::spawn(async move {
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(e) => {
                    error!(error = %e, path = %path.display(), "Failed to read upload file");
                    Self::send_result(&tx, TransferResult::Error("Upload failed".to_string()))
                        .await;
                    return;
                }
            };

            match api.upload_file(&filename, bytes).await {
                Ok(()) => {
                    Self::send_result(&tx, TransferResult::Uploaded(filename)).await;
                }
                Err(e) => {
                    error!(error = %e, filename = %filename, "Upload failed");
                    Self::send_result(&tx, TransferResult::Error("Upload failed".to_string()))
                        .await;
                }
            }
        });

        self.status_message = Some(format!("Uploading {}...", status_filename));
    }

    /// Download the currently selected file
    pub fn download_selected(&mut self) {
        let record = match self.selected_file() {
            Some(r) => r.clone(),
            None => return,
        };
        self.download_background(record.id, record.filename);
    }

    /// Spawn a background task to download one file and write it to the
    /// download directory. Each call is independent; rapid repeats issue
    /// separate requests.
    pub fn download_background(&mut self, file_id: i64, filename: String) {
        info!(file_id, filename = %filename, "Starting download");

        let api = self.transfer_client();
        let tx = self.transfer_tx.clone();
        let dest_dir = self.config.downloads_dir();
        let status_filename = filename.clone();

        tokio::spawn(async move {
            let bytes = match api.download_file(file_id).await {
                Ok(b) => b,
                Err(e) => {
                    error!(error = %e, file_id, "Download failed");
                    Self::send_result(&tx, TransferResult::Error("Download failed".to_string()))
                        .await;
                    return;
                }
            };

            let dest = dest_dir.join(sanitize_filename(&filename));
            let written = std::fs::create_dir_all(&dest_dir)
                .and_then(|_| std::fs::write(&dest, &bytes));

            match written {
                Ok(()) => {
                    Self::send_result(&tx, TransferResult::Downloaded(filename, dest)).await;
                }
                Err(e) => {
                    error!(error = %e, dest = %dest.display(), "Failed to write download");
                    Self::send_result(&tx, TransferResult::Error("Download failed".to_string()))
                        .await;
                }
            }
        });

        self.status_message = Some(format!("Downloading {}...", status_filename));
    }

    /// Drain completed background transfers and apply their results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.transfer_rx.try_recv() {
            match result {
                TransferResult::Files(files) => {
                    // Full replace - the server's ordering is the display ordering
                    self.files = files;
                    if self.file_selection >= self.files.len() {
                        self.file_selection = self.files.len().saturating_sub(1);
                    }
                    self.status_message = Some(format!("{} files", self.files.len()));
                }
                TransferResult::Uploaded(filename) => {
                    info!(filename = %filename, "Upload complete");
                    self.pending_upload = None;
                    // Upload completion triggers a listing refresh
                    self.refresh_files_background();
                    self.status_message = Some(format!("Uploaded {}", filename));
                }
                TransferResult::Downloaded(filename, dest) => {
                    info!(filename = %filename, dest = %dest.display(), "Download complete");
                    self.status_message = Some(format!("Saved {}", dest.display()));
                }
                TransferResult::Error(notice) => {
                    self.status_message = Some(notice);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let dir = std::env::temp_dir().join("depot-tui-test-session");
        App {
            config: Config::default(),
            session: Session::new(dir),
            api: ApiClient::new("http://localhost:8000").expect("client"),
            state: AppState::Normal,
            status_message: None,
            files: Vec::new(),
            file_selection: 0,
            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_mode: LoginMode::Login,
            login_error: None,
            login_notice: None,
            upload_path_input: String::new(),
            pending_upload: None,
            transfer_rx: rx,
            transfer_tx: tx,
        }
    }

    fn record(id: i64, filename: &str) -> FileRecord {
        FileRecord {
            id,
            filename: filename.to_string(),
            content_type: None,
        }
    }

    #[test]
    fn test_files_result_replaces_list() {
        let mut app = test_app();

        app.transfer_tx
            .try_send(TransferResult::Files(vec![
                record(1, "a.txt"),
                record(2, "b.txt"),
            ]))
            .expect("send");
        app.check_background_tasks();

        assert_eq!(app.files.len(), 2);
        assert_eq!(app.files[0].filename, "a.txt");
        assert_eq!(app.files[1].filename, "b.txt");

        // A later empty listing fully replaces the previous one
        app.file_selection = 1;
        app.transfer_tx
            .try_send(TransferResult::Files(vec![]))
            .expect("send");
        app.check_background_tasks();

        assert!(app.files.is_empty());
        assert_eq!(app.file_selection, 0);
    }

    #[test]
    fn test_failed_transfer_keeps_selection_and_list() {
        let mut app = test_app();
        app.files = vec![record(1, "a.txt")];
        app.pending_upload = Some(PathBuf::from("/tmp/pending.bin"));

        app.transfer_tx
            .try_send(TransferResult::Error("Upload failed".to_string()))
            .expect("send");
        app.check_background_tasks();

        assert_eq!(app.pending_upload, Some(PathBuf::from("/tmp/pending.bin")));
        assert_eq!(app.files.len(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Upload failed"));
    }

    #[tokio::test]
    async fn test_upload_complete_clears_selection() {
        let mut app = test_app();
        app.pending_upload = Some(PathBuf::from("/tmp/pending.bin"));

        app.transfer_tx
            .try_send(TransferResult::Uploaded("pending.bin".to_string()))
            .expect("send");
        app.check_background_tasks();

        assert!(app.pending_upload.is_none());
        // The completed upload kicked off a listing refresh
        assert_eq!(app.status_message.as_deref(), Some("Uploaded pending.bin"));
    }

    #[test]
    fn test_selection_navigation_clamps() {
        let mut app = test_app();
        app.select_next();
        assert_eq!(app.file_selection, 0);

        app.files = vec![record(1, "a"), record(2, "b"), record(3, "c")];
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.file_selection, 2);

        app.select_page_up();
        assert_eq!(app.file_selection, 0);
    }

    #[test]
    fn test_input_length_guards() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_username_char(0, '\n'));

        assert!(can_add_password_char(0, '!'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'x'));

        assert!(can_add_path_char(0, '/'));
        assert!(!can_add_path_char(MAX_PATH_LENGTH, 'x'));
    }
}
