//! Application state management for cepbook.
//!
//! This module contains the `App` struct that ties the form controller and
//! the address store to the terminal UI state (focus, selection, overlays).

use anyhow::Result;
use tracing::{debug, error, info};

use cepbook_core::form::FormField;
use cepbook_core::{AddressStore, CepClient, Config, FormController, SavedAddress};

// ============================================================================
// UI State Types
// ============================================================================

/// Which panel receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingRemove,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub store: AddressStore,
    pub form: FormController,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub field_focus: FormField,
    pub list_selection: usize,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config) -> Result<Self> {
        let client = CepClient::from_config(config)?;
        let store = AddressStore::from_config(config)?;
        debug!(saved = store.len(), "Address store opened");

        Ok(Self::with_parts(FormController::new(client), store))
    }

    pub fn with_parts(form: FormController, store: AddressStore) -> Self {
        Self {
            store,
            form,
            state: AppState::Normal,
            focus: Focus::Form,
            field_focus: FormField::Cep,
            list_selection: 0,
            status_message: None,
        }
    }

    /// Apply lookup results and timers that have completed since the last tick
    pub fn check_background_tasks(&mut self) {
        self.form.process_events();
    }

    // =========================================================================
    // Form navigation
    // =========================================================================

    /// Move focus to another field. Leaving the CEP field counts as a blur
    /// and starts a lookup when the CEP is complete.
    pub fn focus_field(&mut self, field: FormField) {
        if self.field_focus == FormField::Cep && field != FormField::Cep {
            self.form.blur_cep();
        }
        self.field_focus = field;
    }

    pub fn next_field(&mut self) {
        self.focus_field(self.field_focus.next());
    }

    pub fn prev_field(&mut self) {
        self.focus_field(self.field_focus.prev());
    }

    pub fn focus_list(&mut self) {
        if self.focus == Focus::Form && self.field_focus == FormField::Cep {
            self.form.blur_cep();
        }
        self.focus = Focus::List;
        self.clamp_selection();
    }

    pub fn focus_form(&mut self) {
        self.focus = Focus::Form;
    }

    pub fn type_char(&mut self, c: char) {
        if !self.form.push_char(self.field_focus, c) && !self.field_focus.is_user_editable() {
            self.status_message = Some(format!("{} is filled in by the CEP lookup", self.field_focus.label()));
        } else {
            self.status_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.form.pop_char(self.field_focus);
    }

    pub fn search(&mut self) {
        self.form.search();
    }

    pub fn save_form(&mut self) {
        if let Some(saved) = self.form.save(&mut self.store) {
            info!(id = %saved.id, "Saved from form");
            self.list_selection = self.store.len().saturating_sub(1);
            self.field_focus = FormField::Cep;
        }
    }

    pub fn clear_form(&mut self) {
        self.form.reset();
        self.field_focus = FormField::Cep;
        self.status_message = None;
    }

    // =========================================================================
    // Saved list
    // =========================================================================

    pub fn saved(&self) -> &[SavedAddress] {
        self.store.saved_addresses()
    }

    pub fn selected_address(&self) -> Option<&SavedAddress> {
        self.saved().get(self.list_selection)
    }

    pub fn select_next(&mut self) {
        let max_index = self.saved().len().saturating_sub(1);
        self.list_selection = (self.list_selection + 1).min(max_index);
    }

    pub fn select_prev(&mut self) {
        self.list_selection = self.list_selection.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max_index = self.saved().len().saturating_sub(1);
        self.list_selection = self.list_selection.min(max_index);
    }

    /// Ask before removing the selected address
    pub fn request_remove(&mut self) {
        if self.selected_address().is_some() {
            self.state = AppState::ConfirmingRemove;
        }
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_address().map(|a| a.id.clone()) else {
            return;
        };

        match self.store.remove_address(&id) {
            Ok(_) => {
                self.status_message = Some("Address removed".to_string());
            }
            Err(e) => {
                error!(error = %e, id = %id, "Failed to remove address");
                self.status_message = Some("Could not remove address".to_string());
            }
        }
        self.clamp_selection();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cepbook_core::storage::MemoryStore;
    use cepbook_core::Address;

    fn app() -> App {
        // The client is never asked for anything: no test completes a CEP
        let client = CepClient::from_config(&Config::default()).unwrap();
        let store = AddressStore::open(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));
        App::with_parts(FormController::new(client), store)
    }

    fn address(cep: &str) -> Address {
        Address {
            cep: cep.to_string(),
            logradouro: "Rua Augusta".to_string(),
            localidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_field_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.field_focus, FormField::Cep);

        app.prev_field();
        assert_eq!(app.field_focus, FormField::Localidade);
        app.next_field();
        assert_eq!(app.field_focus, FormField::Cep);
    }

    #[tokio::test]
    async fn test_typing_into_lookup_only_field_is_refused() {
        let mut app = app();
        app.focus_field(FormField::Logradouro);

        app.type_char('R');
        assert_eq!(app.form.value(FormField::Logradouro), "");
        assert!(app.status_message.is_some());

        app.focus_field(FormField::Complemento);
        app.type_char('R');
        assert_eq!(app.form.value(FormField::Complemento), "R");
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_incomplete_cep_blur_does_not_search() {
        let mut app = app();
        for c in "0131".chars() {
            app.type_char(c);
        }
        app.next_field();
        assert!(!app.form.is_searching());
    }

    #[tokio::test]
    async fn test_selection_is_clamped() {
        let mut app = app();
        app.select_next();
        assert_eq!(app.list_selection, 0);

        app.store.save_address(address("01305-000")).unwrap();
        app.store.save_address(address("01304-001")).unwrap();
        app.focus_list();

        app.select_next();
        app.select_next();
        assert_eq!(app.list_selection, 1);
        app.select_prev();
        app.select_prev();
        assert_eq!(app.list_selection, 0);
    }

    #[tokio::test]
    async fn test_remove_selected() {
        let mut app = app();
        app.store.save_address(address("01305-000")).unwrap();
        let last = app.store.save_address(address("01304-001")).unwrap();
        app.focus_list();
        app.select_next();

        app.request_remove();
        assert_eq!(app.state, AppState::ConfirmingRemove);
        app.remove_selected();

        assert_eq!(app.saved().len(), 1);
        assert!(app.store.get(&last.id).is_none());
        assert_eq!(app.list_selection, 0);
        assert_eq!(app.store.session_addresses().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_on_empty_list_does_nothing() {
        let mut app = app();
        app.focus_list();
        app.request_remove();
        assert_eq!(app.state, AppState::Normal);
        app.remove_selected();
        assert!(app.saved().is_empty());
    }
}
