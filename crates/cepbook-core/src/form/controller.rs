//! Address form workflow.
//!
//! `FormController` owns the form fields and drives the lookup/save cycle:
//! Idle -> Searching -> Found | QueryError -> Idle on the next edit. Lookups
//! and the post-save reset timer run as spawned tasks and report back over
//! an mpsc channel, which the owner drains with `process_events` (each UI
//! tick) or `next_event` (when it wants to wait).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::api::{CepClient, LookupError};
use crate::models::{Address, SavedAddress};
use crate::store::AddressStore;
use crate::utils::{format_cep, is_complete_cep, CEP_DIGITS};

use super::{AddressFields, FormField};

// ============================================================================
// Constants
// ============================================================================

/// How long the "saved" message stays up before the form clears itself
pub const RESET_DELAY: Duration = Duration::from_secs(2);

/// Buffer size for the form event channel.
/// At most one lookup and one reset timer are pending at a time.
const CHANNEL_BUFFER_SIZE: usize = 8;

const MSG_FOUND: &str = "Address found";
const MSG_NOT_FOUND: &str = "CEP not found";
const MSG_LOOKUP_FAILED: &str = "Could not look up CEP, please try again";
const MSG_SAVED: &str = "Address saved";
const MSG_SAVE_FAILED: &str = "Could not save address";

// ============================================================================
// State Types
// ============================================================================

/// Lookup workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No lookup in flight; fields editable or empty
    Idle,
    /// Lookup in flight; looked-up fields are locked
    Searching,
    /// Fields were filled from a lookup
    Found,
    /// The last lookup failed; fields were left as they were
    QueryError,
}

/// Outcome of the last save attempt, tracked separately from `FormState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline message shown under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, text: text.into() }
    }

    fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Results reported back by spawned tasks
enum FormEvent {
    /// A lookup finished (generation, result)
    LookupFinished(u64, Result<Address, LookupError>),
    /// The post-save reset delay elapsed (reset token)
    ResetElapsed(u64),
}

// ============================================================================
// Controller
// ============================================================================

pub struct FormController {
    client: CepClient,
    fields: AddressFields,
    state: FormState,
    notice: Option<Notice>,
    save_status: Option<SaveStatus>,

    /// Last lookup result, kept for its provider metadata
    looked_up: Option<Address>,

    /// Bumped on every lookup and reset; results for older generations are dropped
    generation: u64,
    /// Bumped on every scheduled reset; only the newest timer may clear the form
    reset_token: u64,
    reset_task: Option<JoinHandle<()>>,

    events_tx: mpsc::Sender<FormEvent>,
    events_rx: mpsc::Receiver<FormEvent>,
}

impl FormController {
    pub fn new(client: CepClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            client,
            fields: AddressFields::default(),
            state: FormState::Idle,
            notice: None,
            save_status: None,
            looked_up: None,
            generation: 0,
            reset_token: 0,
            reset_task: None,
            events_tx: tx,
            events_rx: rx,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn fields(&self) -> &AddressFields {
        &self.fields
    }

    pub fn value(&self, field: FormField) -> &str {
        self.fields.get(field)
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn save_status(&self) -> Option<SaveStatus> {
        self.save_status
    }

    pub fn is_searching(&self) -> bool {
        self.state == FormState::Searching
    }

    /// True while the saved-message delay is running
    pub fn reset_pending(&self) -> bool {
        self.reset_task.is_some()
    }

    /// Whether `field` accepts typing right now
    pub fn is_editable(&self, field: FormField) -> bool {
        match field {
            FormField::Cep => !self.is_searching(),
            FormField::Complemento | FormField::Bairro => true,
            _ => false,
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn clear_messages(&mut self) {
        self.notice = None;
        self.save_status = None;
    }

    /// Replace the CEP input, reformatting it as NNNNN-NNN.
    /// Ignored while a lookup is in flight.
    pub fn set_cep_input(&mut self, raw: &str) {
        if self.is_searching() {
            return;
        }

        self.fields.cep = format_cep(raw);
        self.clear_messages();
        self.state = FormState::Idle;

        let still_same = self
            .looked_up
            .as_ref()
            .is_some_and(|a| a.cep_digits() == self.fields.cep_digits());
        if !still_same {
            self.looked_up = None;
        }
    }

    /// Set a field's value. Returns false if the field is not editable now.
    pub fn edit_field(&mut self, field: FormField, value: &str) -> bool {
        if !self.is_editable(field) {
            return false;
        }

        if field == FormField::Cep {
            self.set_cep_input(value);
            return true;
        }

        *self.fields.get_mut(field) = value.to_string();
        self.clear_messages();
        if !self.is_searching() {
            self.state = FormState::Idle;
        }
        true
    }

    /// Append a typed character to a field
    pub fn push_char(&mut self, field: FormField, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        let mut value = self.value(field).to_string();
        value.push(c);
        self.edit_field(field, &value)
    }

    /// Delete the last character of a field
    pub fn pop_char(&mut self, field: FormField) -> bool {
        let mut value = self.value(field).to_string();
        if value.pop().is_none() {
            return false;
        }
        // "01310-" would reformat back to "01310", so drop the hyphen too
        if field == FormField::Cep && value.ends_with('-') {
            value.pop();
        }
        self.edit_field(field, &value)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The CEP field lost focus: look up automatically once it is complete
    pub fn blur_cep(&mut self) -> bool {
        if is_complete_cep(&self.fields.cep) {
            self.search()
        } else {
            false
        }
    }

    /// Explicit search. Returns true if a lookup was started.
    pub fn search(&mut self) -> bool {
        if self.is_searching() {
            debug!("Lookup already in flight, ignoring trigger");
            return false;
        }

        if !is_complete_cep(&self.fields.cep) {
            self.notice = Some(Notice::error(format!("CEP must contain {} digits", CEP_DIGITS)));
            return false;
        }

        self.start_lookup();
        true
    }

    fn start_lookup(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let cep = self.fields.cep_digits();

        self.state = FormState::Searching;
        self.clear_messages();
        debug!(cep = %cep, generation, "Starting lookup");

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.lookup(&cep).await;
            if tx.send(FormEvent::LookupFinished(generation, result)).await.is_err() {
                debug!(cep = %cep, "Form closed before lookup finished, result dropped");
            }
        });
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Validate the form and hand it to the store.
    /// On success the form clears itself after `RESET_DELAY`.
    pub fn save(&mut self, store: &mut AddressStore) -> Option<SavedAddress> {
        if self.is_searching() {
            return None;
        }

        let address = self.fields.to_address(self.looked_up.as_ref());
        let missing = address.missing_required_fields();
        if !missing.is_empty() {
            self.notice = Some(Notice::error(format!(
                "Fill in the required fields: {}",
                missing.join(", ")
            )));
            self.save_status = Some(SaveStatus::Failed);
            return None;
        }

        match store.save_address(address) {
            Ok(saved) => {
                self.notice = Some(Notice::success(MSG_SAVED));
                self.save_status = Some(SaveStatus::Saved);
                self.schedule_reset();
                Some(saved)
            }
            Err(e) => {
                error!(error = %e, "Failed to save address");
                self.notice = Some(Notice::error(MSG_SAVE_FAILED));
                self.save_status = Some(SaveStatus::Failed);
                None
            }
        }
    }

    fn schedule_reset(&mut self) {
        self.cancel_reset();
        self.reset_token += 1;
        let token = self.reset_token;

        let tx = self.events_tx.clone();
        self.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            let _ = tx.send(FormEvent::ResetElapsed(token)).await;
        }));
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }

    /// Clear every field and message and return to Idle.
    /// Any lookup still in flight will be ignored when it lands.
    pub fn reset(&mut self) {
        self.cancel_reset();
        self.generation += 1;
        self.fields = AddressFields::default();
        self.looked_up = None;
        self.clear_messages();
        self.state = FormState::Idle;
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply every result that has arrived, without waiting
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    /// Wait for the next result and apply it
    pub async fn next_event(&mut self) {
        // The controller holds a sender, so the channel never closes here
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: FormEvent) {
        match event {
            FormEvent::LookupFinished(generation, result) => {
                if generation != self.generation || !self.is_searching() {
                    debug!(generation, current = self.generation, "Discarding stale lookup result");
                    return;
                }
                self.apply_lookup(result);
            }
            FormEvent::ResetElapsed(token) => {
                if token != self.reset_token {
                    debug!(token, current = self.reset_token, "Discarding stale reset");
                    return;
                }
                self.reset_task = None;
                self.reset();
            }
        }
    }

    fn apply_lookup(&mut self, result: Result<Address, LookupError>) {
        match result {
            Ok(address) => {
                self.fields.fill_from(&address);
                self.looked_up = Some(address);
                self.state = FormState::Found;
                self.notice = Some(Notice::success(MSG_FOUND));
            }
            Err(e) if e.is_not_found() => {
                self.state = FormState::QueryError;
                self.notice = Some(Notice::error(MSG_NOT_FOUND));
            }
            Err(e) => {
                warn!(error = %e, cep = %self.fields.cep, "Lookup failed");
                self.state = FormState::QueryError;
                self.notice = Some(Notice::error(MSG_LOOKUP_FAILED));
            }
        }
    }
}

impl Drop for FormController {
    fn drop(&mut self) {
        self.cancel_reset();
    }
}

// ============================================================================
// Tests
// ============================================================================
