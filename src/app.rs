use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::api::{ApiClient, ApiError, ContactResponse, Project};
use crate::config::AppConfig;
use crate::contact::{Field, Rejected, SubmitFlow};
use crate::gallery::Gallery;

/// How long transient status messages stay in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

type SubmitOutcome = Result<ContactResponse, ApiError>;
type ProjectsOutcome = Result<Vec<Project>, ApiError>;
/// List entry the popup opened with, and the refreshed copy
type DetailOutcome = (Project, Result<Project, ApiError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Contact,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ProjectDetail,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,
    pub config: AppConfig,
    client: ApiClient,

    // Contact form (left side)
    pub contact: SubmitFlow,
    pub focused_field: Field,
    pending_submit: Option<oneshot::Receiver<SubmitOutcome>>,

    // Project gallery (right side)
    pub gallery: Gallery,
    pub detail: Option<Project>,
    pending_projects: Option<oneshot::Receiver<ProjectsOutcome>>,
    pending_detail: Option<oneshot::Receiver<DetailOutcome>>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, client: ApiClient) -> Self {
        let contact = SubmitFlow::new(config.reset_delay());
        Self {
            section: Section::Contact,
            popup: Popup::None,
            config,
            client,

            contact,
            focused_field: Field::Name,
            pending_submit: None,

            gallery: Gallery::new(),
            detail: None,
            pending_projects: None,
            pending_detail: None,

            status_message: None,
            status_message_time: None,

            should_quit: false,
        }
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    /// Network calls never run here; they are spawned and collected by `tick`
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('s') => self.submit_contact(),
                KeyCode::Char('r') => self.refresh_projects(),
                _ => {}
            }
            return;
        }

        // Handle popups first
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return;
        }

        match key.code {
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::F(2) => self.submit_contact(),
            KeyCode::F(5) => self.refresh_projects(),
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            _ => match self.section {
                Section::Contact => self.handle_contact_key(key),
                Section::Projects => self.handle_projects_key(key),
            },
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Char('h')
        ) {
            self.popup = Popup::None;
            self.detail = None;
        }
    }

    /// Focus ring: Name -> Email -> Subject -> Message -> Projects -> Name
    fn focus_next(&mut self) {
        match self.section {
            Section::Contact if self.focused_field == Field::Message => {
                self.section = Section::Projects;
            }
            Section::Contact => self.focused_field = self.focused_field.next(),
            Section::Projects => {
                self.section = Section::Contact;
                self.focused_field = Field::Name;
            }
        }
    }

    fn focus_prev(&mut self) {
        match self.section {
            Section::Contact if self.focused_field == Field::Name => {
                self.section = Section::Projects;
            }
            Section::Contact => self.focused_field = self.focused_field.prev(),
            Section::Projects => {
                self.section = Section::Contact;
                self.focused_field = Field::Message;
            }
        }
    }

    fn handle_contact_key(&mut self, key: KeyEvent) {
        let field = self.focused_field;
        match key.code {
            KeyCode::Enter if field.is_multiline() => {
                self.contact.edit(|form| form.push_char(field, '\n'));
            }
            KeyCode::Enter | KeyCode::Down => self.focused_field = field.next(),
            KeyCode::Up => self.focused_field = field.prev(),
            KeyCode::Backspace => {
                self.contact.edit(|form| form.pop_char(field));
            }
            KeyCode::Char(c) => {
                if !self.contact.edit(|form| form.push_char(field, c)) {
                    tracing::debug!("Form is locked, dropping input");
                }
            }
            _ => {}
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.gallery.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.gallery.move_up(),
            KeyCode::Char('f') => {
                self.gallery.cycle_filter();
                self.set_status(format!("Filter: {}", self.gallery.filter_label()));
            }
            KeyCode::Char('r') => self.refresh_projects(),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,
            _ => {}
        }
    }

    /// Validate the draft and, if it passes, send it on a background task.
    /// At most one request is in flight; further submits are ignored.
    pub fn submit_contact(&mut self) {
        if self.pending_submit.is_some() {
            return;
        }

        match self.contact.begin_submit() {
            Ok(message) => {
                tracing::info!("Submitting contact message ({} chars)", message.message.len());
                let client = self.client.clone();
                let (tx, rx) = oneshot::channel();
                tokio::spawn(async move {
                    let outcome = client.submit_contact(&message).await;
                    // Receiver is gone if the app quit mid-request
                    let _ = tx.send(outcome);
                });
                self.pending_submit = Some(rx);
            }
            Err(Rejected::Invalid(err)) => {
                tracing::debug!("Contact form incomplete: {:?} is empty", err.field());
                self.section = Section::Contact;
                self.focused_field = err.field();
            }
            Err(Rejected::Busy) => {}
        }
    }

    fn finish_submission(&mut self, outcome: SubmitOutcome) {
        match outcome {
            Ok(response) => {
                self.contact.complete(response.message, Instant::now());
                if self.config.notifications {
                    crate::notify_sent();
                }
            }
            Err(e) => {
                tracing::warn!("Contact submission failed: {}", e);
                self.contact.fail(e.user_message());
            }
        }
    }

    /// Reload the gallery on a background task. A reload already in flight is kept.
    pub fn refresh_projects(&mut self) {
        if self.pending_projects.is_some() {
            return;
        }

        self.gallery.set_loading();
        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(client.list_projects().await);
        });
        self.pending_projects = Some(rx);
    }

    fn finish_projects(&mut self, outcome: ProjectsOutcome) {
        match outcome {
            Ok(projects) => {
                tracing::info!("Loaded {} projects", projects.len());
                self.gallery.set_projects(projects);
            }
            Err(e) => {
                tracing::warn!("Error fetching projects: {}", e);
                self.gallery.set_failed();
            }
        }
    }

    /// Show the selected project at once, then swap in the copy from
    /// `/projects/{id}` when it arrives
    fn open_detail(&mut self) {
        let Some(selected) = self.gallery.selected().cloned() else {
            return;
        };

        self.detail = Some(selected.clone());
        self.popup = Popup::ProjectDetail;

        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = client.get_project(selected.id).await;
            let _ = tx.send((selected, outcome));
        });
        // Replaces any older lookup; its result is dropped
        self.pending_detail = Some(rx);
    }

    fn finish_detail(&mut self, (selected, outcome): DetailOutcome) {
        let showing = self.popup == Popup::ProjectDetail
            && self.detail.as_ref().is_some_and(|p| p.id == selected.id);

        match outcome {
            Ok(project) if showing => self.detail = Some(project),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not fetch project {}: {}", selected.id, e);
                if showing {
                    self.set_status(e.user_message());
                }
            }
        }
    }

    /// Collect finished background requests
    fn poll_background(&mut self) {
        match poll_pending(&mut self.pending_submit) {
            Some(Ok(outcome)) => self.finish_submission(outcome),
            Some(Err(_)) => {
                tracing::warn!("Submission task ended without a result");
                self.contact.fail(crate::api::NETWORK_ERROR);
            }
            None => {}
        }

        match poll_pending(&mut self.pending_projects) {
            Some(Ok(outcome)) => self.finish_projects(outcome),
            Some(Err(_)) => self.gallery.set_failed(),
            None => {}
        }

        if let Some(Ok(outcome)) = poll_pending(&mut self.pending_detail) {
            self.finish_detail(outcome);
        }
    }

    pub fn tick(&mut self) {
        self.poll_background();

        if self.contact.tick(Instant::now()) {
            tracing::debug!("Contact form reset after success");
            self.focused_field = Field::Name;
        }

        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

/// Take a finished result out of `slot`. Leaves the receiver in place while
/// the task is still running.
fn poll_pending<T>(slot: &mut Option<oneshot::Receiver<T>>) -> Option<Result<T, TryRecvError>> {
    let rx = slot.as_mut()?;
    match rx.try_recv() {
        Err(TryRecvError::Empty) => None,
        done => {
            *slot = None;
            Some(done)
        }
    }
}
