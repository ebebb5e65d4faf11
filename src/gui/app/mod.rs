mod library;
mod modals;

use std::{
    sync::Arc,
    time::Instant,
};

use chrono::{
    DateTime,
    Local,
    TimeDelta,
    Utc,
};
use eframe::egui;
use library::Library;
use modals::Modals;
use tracing::{
    debug,
    info,
    warn,
};

use super::{
    actions::{
        ActionQueue,
        UiAction,
    },
    add_word::AddWordView,
    auth_view::AuthView,
    backup_view::BackupView,
    review::review_panel,
    settings::{
        data::SETTINGS_FILE,
        SettingsData,
    },
    table::VocabularyTable,
    top_bar::{
        Tab,
        TopBar,
    },
};
use crate::{
    backup,
    core::{
        tasks::{
            TaskManager,
            TaskResult,
        },
        TaskError,
        UserId,
        VocabookError,
    },
    deck::FavoriteToggle,
    persistence::save_json,
    store::{
        RestStore,
        Session,
    },
};

pub struct VocabApp {
    // Configuration
    settings_data: SettingsData,

    // Session
    session: Option<Session>,
    store: Option<Arc<RestStore>>,
    refreshing: bool,
    next_refresh_attempt: Option<DateTime<Utc>>,

    // Data
    library: Library,

    // UI State
    tab: Tab,
    auth_view: AuthView,
    add_word: AddWordView,
    table: VocabularyTable,
    backup: BackupView,
    modals: Modals,
    actions: ActionQueue,

    task_manager: TaskManager,
}

/// Wait before retrying a token refresh that failed for reasons other than rejection.
const REFRESH_RETRY: TimeDelta = TimeDelta::seconds(30);

impl VocabApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings_data: SettingsData,
    ) -> Result<Self, VocabookError> {
        let mut task_manager = TaskManager::new()?;

        let ctx = cc.egui_ctx.clone();
        task_manager.set_waker(move || ctx.request_repaint());

        cc.egui_ctx.set_zoom_factor(cc.egui_ctx.zoom_factor() + 0.2);

        Ok(Self {
            library: Library::new(settings_data.settle_delay()),
            auth_view: AuthView::new(&settings_data.last_email),
            settings_data,

            session: None,
            store: None,
            refreshing: false,
            next_refresh_attempt: None,

            tab: Tab::default(),
            add_word: AddWordView::new(),
            table: VocabularyTable::new(),
            backup: BackupView::new(),
            modals: Modals::default(),
            actions: ActionQueue::new(),

            task_manager,
        })
    }

    fn save_settings(&self) {
        if let Err(e) = save_json(&self.settings_data, SETTINGS_FILE) {
            warn!("Failed to save settings: {}", e);
        }
    }

    fn store(&self) -> Option<Arc<RestStore>> {
        self.store.clone()
    }

    fn store_and_user(&self) -> Option<(Arc<RestStore>, UserId)> {
        let store = self.store.as_ref()?;
        Some((Arc::clone(store), store.session().user_id.clone()))
    }

    fn refresh_entries(&mut self) {
        if let Some((store, user)) = self.store_and_user() {
            let sequence = self.library.entries_ticket();
            self.task_manager.fetch_entries(store, user, sequence);
        }
    }

    fn refresh_temporary_words(&mut self) {
        if let Some((store, user)) = self.store_and_user() {
            let sequence = self.library.temporary_words_ticket();
            self.task_manager.fetch_temporary_words(store, user, sequence);
        }
    }

    /// Drops every piece of per-user state. The remote logout runs in the background and
    /// its outcome does not matter.
    fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Signing out {}", session.email);
            self.task_manager.sign_out(self.settings_data.backend_config(), session);
        }
        self.task_manager.begin_generation();

        self.store = None;
        self.refreshing = false;
        self.next_refresh_attempt = None;
        self.library.reset();

        self.tab = Tab::default();
        self.auth_view = AuthView::new(&self.settings_data.last_email);
        self.add_word = AddWordView::new();
        self.table = VocabularyTable::new();
        self.backup = BackupView::new();
    }

    /// The backend no longer accepts our token: back to the sign-in screen.
    fn session_expired(&mut self) {
        warn!("Session expired, signing out");
        self.sign_out();
        self.auth_view.sign_in_finished(Some(TaskError::SessionExpired.to_string()));
    }

    fn report_failure(&mut self, title: &str, message: &str, error: TaskError) {
        match error {
            TaskError::SessionExpired => self.session_expired(),
            TaskError::Failed(details) => self.modals.error.show_error(title, message, Some(details)),
        }
    }

    fn start_session(&mut self, session: Session) -> Result<(), String> {
        let store = RestStore::new(self.settings_data.backend_config(), session.clone())
            .map_err(|e| e.to_string())?;
        self.store = Some(Arc::new(store));
        self.session = Some(session);
        Ok(())
    }

    /// Renews the access token shortly before it expires, otherwise schedules a wake-up.
    fn maybe_refresh_session(&mut self, ctx: &egui::Context) {
        if self.refreshing {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };

        let now = Utc::now();
        let retry_blocked = self.next_refresh_attempt.is_some_and(|at| now < at);
        if session.needs_refresh(now) && !retry_blocked {
            debug!("Refreshing access token for {}", session.email);
            self.refreshing = true;
            self.task_manager.refresh_session(self.settings_data.backend_config(), session.clone());
        } else if let Some(wait) = session.time_until_refresh(now) {
            ctx.request_repaint_after(wait);
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::SignedIn(Ok(session)) => {
                // Anything still running from before this sign-in belongs to nobody now.
                self.task_manager.begin_generation();
                self.library.reset();

                let email = session.email.clone();
                match self.start_session(session) {
                    Ok(()) => {
                        info!("Signed in as {}", email);
                        self.auth_view.sign_in_finished(None);
                        self.settings_data.last_email = email;
                        self.save_settings();

                        self.refresh_entries();
                        self.refresh_temporary_words();
                    }
                    Err(e) => self.auth_view.sign_in_finished(Some(e)),
                }
            }
            TaskResult::SignedIn(Err(e)) => {
                warn!("Sign-in failed: {}", e);
                self.auth_view.sign_in_finished(Some(e.to_string()));
            }
            TaskResult::SignedOut => {
                debug!("Remote session closed");
            }
            TaskResult::SessionRefreshed(result) => {
                self.refreshing = false;
                match result {
                    Ok(session) => {
                        if let Err(e) = self.start_session(session) {
                            warn!("Unable to use the refreshed session: {}", e);
                            self.session_expired();
                        } else {
                            self.next_refresh_attempt = None;
                        }
                    }
                    Err(TaskError::SessionExpired) => self.session_expired(),
                    Err(TaskError::Failed(e)) => {
                        warn!("Token refresh failed, retrying later: {}", e);
                        self.next_refresh_attempt = Some(Utc::now() + REFRESH_RETRY);
                    }
                }
            }

            TaskResult::EntriesLoaded { sequence, result } => match result {
                Ok(entries) => {
                    self.library.accept_entries(sequence, entries);
                }
                Err(e) => self.report_failure("Load Error", "Unable to load your vocabulary", e),
            },
            TaskResult::TemporaryWordsLoaded { sequence, result } => match result {
                Ok(words) => {
                    self.library.accept_temporary_words(sequence, words);
                }
                Err(e) => self.report_failure("Load Error", "Unable to load temporary words", e),
            },

            TaskResult::EntryAdded(result) => {
                self.add_word.entry_saved(result.is_ok());
                match result {
                    Ok(()) => self.refresh_entries(),
                    Err(e) => self.report_failure("Save Error", "Unable to save the word", e),
                }
            }
            TaskResult::EntryUpdated(result) => match result {
                Ok(()) => self.refresh_entries(),
                Err(e) => self.report_failure("Update Error", "Unable to update the word", e),
            },
            TaskResult::EntryDeleted(result) => match result {
                Ok(()) => self.refresh_entries(),
                Err(e) => self.report_failure("Delete Error", "Unable to delete the word", e),
            },
            TaskResult::FavoriteUpdated { id, favorite, result } => match result {
                Ok(()) => {
                    debug!("Favorite for {} set to {}", id, favorite);
                    self.refresh_entries();
                }
                Err(e) => self.report_failure(
                    "Favorite Error",
                    "Unable to save the favorite flag for this word",
                    e,
                ),
            },

            TaskResult::TemporaryWordAdded(result) => {
                self.add_word.temporary_word_saved(result.is_ok());
                match result {
                    Ok(()) => self.refresh_temporary_words(),
                    Err(e) => {
                        self.report_failure("Save Error", "Unable to save the temporary word", e)
                    }
                }
            }
            TaskResult::TemporaryWordDeleted(result) => match result {
                Ok(()) => self.refresh_temporary_words(),
                Err(e) => {
                    self.report_failure("Delete Error", "Unable to delete the temporary word", e)
                }
            },

            TaskResult::DefinitionFetched { word, result } => {
                self.add_word.apply_definition(&word, result);
            }

            TaskResult::ImportFinished(result) => match result {
                Ok(count) => {
                    info!("Imported {} entries", count);
                    self.backup.import_finished(format!("Imported {} words.", count));
                    self.refresh_entries();
                }
                Err(e) => {
                    self.backup.import_finished("Import failed.");
                    self.report_failure("Import Error", "Unable to import the backup", e);
                }
            },
        }
    }

    fn apply_actions(&mut self) -> bool {
        let actions: Vec<UiAction> = self.actions.drain().collect();
        let applied = !actions.is_empty();

        for action in actions {
            self.apply_action(action);
        }

        applied
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::SignIn { email, password } => {
                self.auth_view.sign_in_started();
                self.task_manager.sign_in(self.settings_data.backend_config(), email, password);
            }
            UiAction::SignOut => self.sign_out(),
            UiAction::OpenSettings => {
                self.modals.settings.open_settings(self.settings_data.clone());
            }
            UiAction::SelectTab(tab) => {
                if self.tab == Tab::Review && tab != Tab::Review {
                    self.library.leave_review();
                }
                self.tab = tab;
            }

            UiAction::AddEntry(entry) => {
                if let Some((store, user)) = self.store_and_user() {
                    self.add_word.save_started();
                    self.task_manager.add_entry(store, user, entry);
                }
            }
            UiAction::AddTemporaryWord(word) => {
                if let Some((store, user)) = self.store_and_user() {
                    self.add_word.save_started();
                    self.task_manager.add_temporary_word(store, user, word);
                }
            }
            UiAction::UseTemporaryWord(word) => {
                self.add_word.set_term(&word.word);
                self.add_word.lookup_started();
                self.task_manager.lookup_definition(word.word.clone());
                if let Some(store) = self.store() {
                    self.task_manager.delete_temporary_word(store, word.id);
                }
            }
            UiAction::DeleteTemporaryWord(id) => {
                if let Some(store) = self.store() {
                    self.task_manager.delete_temporary_word(store, id);
                }
            }
            UiAction::LookupDefinition(word) => {
                self.add_word.lookup_started();
                self.task_manager.lookup_definition(word);
            }

            UiAction::UpdateEntry { id, patch } => {
                if patch.is_empty() {
                    return;
                }
                if let Some(store) = self.store() {
                    self.task_manager.update_entry(store, id, patch);
                }
            }
            UiAction::SetFavorite { id, favorite } => {
                if let Some(store) = self.store() {
                    self.task_manager.update_favorite(store, FavoriteToggle { id, favorite });
                }
            }
            UiAction::DeleteEntry(id) => {
                if let Some(store) = self.store() {
                    self.task_manager.delete_entry(store, id);
                }
            }

            UiAction::FlipCard => {
                self.library.deck.flip();
            }
            UiAction::NextCard => {
                self.library.deck.advance(Instant::now());
            }
            UiAction::ToggleCardFavorite => {
                let Some(toggle) = self.library.deck.toggle_favorite() else {
                    return;
                };
                if let Some(entry) = self.library.entries.iter_mut().find(|e| e.id == toggle.id) {
                    toggle.patch().apply_to(entry);
                }
                if let Some(store) = self.store() {
                    self.task_manager.update_favorite(store, toggle);
                }
            }

            UiAction::ExportBackup => self.export_backup(),
            UiAction::PickImportFile => self.pick_import_file(),
            UiAction::ConfirmImport(items) => {
                if let Some((store, user)) = self.store_and_user() {
                    self.backup.import_started();
                    self.task_manager.import_entries(store, user, items);
                }
            }
        }
    }

    fn export_backup(&mut self) {
        let file_name = backup::backup_file_name(Local::now().date_naive());

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&file_name)
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };

        match backup::export_to_file(&self.library.entries, Utc::now(), &path) {
            Ok(()) => self.backup.set_status(format!(
                "Exported {} words to {}",
                self.library.entries.len(),
                path.display()
            )),
            Err(e) => self.modals.error.show_error(
                "Export Error",
                "Unable to write the backup file",
                Some(e.to_string()),
            ),
        }
    }

    fn pick_import_file(&mut self) {
        let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() else {
            return;
        };

        match backup::read_import_file(&path) {
            Ok(items) if items.is_empty() => {
                self.backup.set_status("The selected file contains no words to import.");
            }
            Ok(items) => self.backup.confirm_import(items),
            Err(e) => self.modals.error.show_error(
                "Import Error",
                "The selected file is not a valid backup",
                Some(e.to_string()),
            ),
        }
    }

    fn apply_settings(&mut self, settings: SettingsData) {
        let backend_changed = settings.backend_config() != self.settings_data.backend_config();

        self.settings_data = settings;
        self.library.deck.set_settle_delay(self.settings_data.settle_delay());
        self.save_settings();

        if backend_changed && self.session.is_some() {
            info!("Backend changed, ending the current session");
            self.sign_out();
        }
    }
}

impl eframe::App for VocabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.task_manager.poll_results() {
            self.handle_task_result(result);
        }

        self.maybe_refresh_session(ctx);

        let now = Instant::now();
        self.library.deck.poll(now);
        if let Some(wait) = self.library.deck.time_until_settled(now) {
            ctx.request_repaint_after(wait);
        }

        match &self.session {
            None => {
                let configured = self.settings_data.backend_config().is_configured();
                self.auth_view.show(ctx, configured, &mut self.actions);
            }
            Some(session) => {
                TopBar::show(ctx, self.tab, &session.email, &mut self.actions);

                let library = &self.library;
                egui::CentralPanel::default().show(ctx, |ui| match self.tab {
                    Tab::AddWords => {
                        self.add_word.show(ui, &library.temporary_words, &mut self.actions)
                    }
                    Tab::Review => review_panel(ui, library.deck.view(), &mut self.actions),
                    Tab::Vocabulary => self.table.show(ui, &library.entries, &mut self.actions),
                    Tab::Backup => self.backup.show(ui, library.entries.len(), &mut self.actions),
                });
            }
        }

        self.modals.error.show(ctx);

        if let Some(settings) = self.modals.settings.show(ctx) {
            self.apply_settings(settings);
        }

        if self.apply_actions() {
            ctx.request_repaint();
        }
    }
}
