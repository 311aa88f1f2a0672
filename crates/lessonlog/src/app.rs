//! The application record and every operation that changes it.
//!
//! [`App`] owns the record, the store it is persisted in, the notification
//! list and the text generator. Each mutation goes through a reducer,
//! writes the changed key back to the store and leaves a notification
//! describing the outcome.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::confirm::Confirm;
use crate::error::{Error, Result};
use crate::generation::{prompts, GenerationError, InFlight, Target, TextGenerator, Ticket};
use crate::model::{seed, FormData, SchoolInfo};
use crate::notify::{Notification, Notifier};
use crate::reducer::{self, FormField, SchoolField, StrategyField};
use crate::report::ReportModel;
use crate::storage::{Store, KEY_FONT_SIZE, KEY_FORM_DATA, KEY_SCHOOL_INFO, KEY_SUBJECTS};
use crate::view::View;

const SAVE_FAILED: &str = "تعذر حفظ التغييرات.";

/// Image types accepted as a school logo, by file extension.
const LOGO_TYPES: [(&str, &str); 7] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
];

/// The whole application record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// School identity.
    pub school_info: SchoolInfo,
    /// The teacher's form.
    pub form_data: FormData,
    /// Subjects a form may choose from.
    pub subjects: Vec<String>,
    /// UI font size, always within the selectable range.
    pub font_size: u8,
    /// Current view. Not persisted.
    pub view: View,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            school_info: SchoolInfo::default(),
            form_data: seed::form_data(),
            subjects: seed::subjects(),
            font_size: seed::DEFAULT_FONT_SIZE,
            view: View::default(),
        }
    }
}

impl AppState {
    /// Read every key from `store`, each falling back to its seed value.
    #[must_use]
    pub fn load(store: &Store) -> Self {
        let font_size: i64 = store.get(KEY_FONT_SIZE, i64::from(seed::DEFAULT_FONT_SIZE));
        Self {
            school_info: store.get(KEY_SCHOOL_INFO, SchoolInfo::default()),
            form_data: store.get(KEY_FORM_DATA, seed::form_data()),
            subjects: store.get(KEY_SUBJECTS, seed::subjects()),
            font_size: reducer::clamp_font_size(font_size),
            view: View::default(),
        }
    }
}

fn default_font_size() -> i64 {
    i64::from(seed::DEFAULT_FONT_SIZE)
}

/// Every persisted value in one document, keyed like the store.
///
/// Missing sections fall back to their seed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// School identity.
    #[serde(rename = "school-info", default)]
    pub school_info: SchoolInfo,
    /// The teacher's form.
    #[serde(rename = "form-data", default)]
    pub form_data: FormData,
    /// Subject list.
    #[serde(rename = "subjects-list", default = "seed::subjects")]
    pub subjects: Vec<String>,
    /// UI font size. Out-of-range values are clamped on import.
    #[serde(rename = "app-font-size", default = "default_font_size")]
    pub font_size: i64,
}

impl Default for Snapshot {
    fn default() -> Self {
        let state = AppState::default();
        Self {
            school_info: state.school_info,
            form_data: state.form_data,
            subjects: state.subjects,
            font_size: i64::from(state.font_size),
        }
    }
}

impl Snapshot {
    fn entries(&self) -> Result<Vec<(&'static str, serde_json::Value)>> {
        Ok(vec![
            (KEY_SCHOOL_INFO, serde_json::to_value(&self.school_info)?),
            (KEY_FORM_DATA, serde_json::to_value(&self.form_data)?),
            (KEY_SUBJECTS, serde_json::to_value(&self.subjects)?),
            (KEY_FONT_SIZE, serde_json::to_value(self.font_size)?),
        ])
    }
}

/// A generation request that has been started but not applied.
#[derive(Debug, Clone)]
pub struct Pending {
    ticket: Ticket,
    prompt: String,
    strategy_id: Option<u32>,
}

impl Pending {
    /// Prompt to send to the generator.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// What the result will be written to.
    #[must_use]
    pub fn target(&self) -> Target {
        self.ticket.target()
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    SchoolInfo,
    FormData,
    Subjects,
    FontSize,
}

/// The composition root.
pub struct App {
    store: Store,
    state: AppState,
    notifier: Notifier,
    inflight: InFlight,
    generator: Arc<dyn TextGenerator>,
    suggestion_attempts: u32,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store.path())
            .field("state", &self.state)
            .field("notifications", &self.notifier.len())
            .field("model", &self.generator.model())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Load the record from `store`.
    #[must_use]
    pub fn new(store: Store, generator: Arc<dyn TextGenerator>, config: &Config) -> Self {
        let state = AppState::load(&store);
        debug!(
            strategies = state.form_data.strategies.len(),
            subjects = state.subjects.len(),
            "application state loaded"
        );
        Self {
            store,
            state,
            notifier: Notifier::new(config.notification_ttl()),
            inflight: InFlight::new(),
            generator,
            suggestion_attempts: config.generation.suggestion_attempts.max(1),
        }
    }

    /// The current record.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Take every unexpired notification, newest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain(Utc::now())
    }

    /// Switch views.
    pub fn set_view(&mut self, view: View) {
        self.state.view = view;
    }

    /// Derive the report from the current record.
    #[must_use]
    pub fn report(&self) -> ReportModel {
        ReportModel::build(&self.state.school_info, &self.state.form_data)
    }

    fn save(&mut self, slot: Slot) {
        let written = match slot {
            Slot::SchoolInfo => self.store.set(KEY_SCHOOL_INFO, &self.state.school_info),
            Slot::FormData => self.store.set(KEY_FORM_DATA, &self.state.form_data),
            Slot::Subjects => self.store.set(KEY_SUBJECTS, &self.state.subjects),
            Slot::FontSize => self.store.set(KEY_FONT_SIZE, &self.state.font_size),
        };
        if !written {
            self.notifier.warning(SAVE_FAILED);
        }
    }

    // --- Dashboard ---

    /// Set a form field addressed by its path, e.g. `units` or
    /// `resourceRooms.library`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown path or a value outside a fixed choice list.
    pub fn set_form_field(&mut self, path: &str, raw: &str) -> Result<()> {
        let field: FormField = path.parse()?;
        self.state.form_data =
            reducer::set_field(&self.state.form_data, field, raw, &self.state.subjects)?;
        self.save(Slot::FormData);
        Ok(())
    }

    /// Append a blank strategy row. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyIdExhausted`] when the highest id is `u32::MAX`.
    pub fn add_strategy(&mut self) -> Result<u32> {
        let (form, id) = reducer::add_strategy(&self.state.form_data)?;
        self.state.form_data = form;
        self.save(Slot::FormData);
        info!(id, "strategy added");
        Ok(id)
    }

    /// Edit one column of a strategy row.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown column or strategy id.
    pub fn edit_strategy(&mut self, id: u32, field: &str, raw: &str) -> Result<()> {
        let field: StrategyField = field.parse()?;
        self.state.form_data = reducer::edit_strategy(&self.state.form_data, id, field, raw)?;
        self.save(Slot::FormData);
        Ok(())
    }

    /// Delete a strategy row after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] for an unknown id and
    /// [`Error::Cancelled`] when the user declines.
    pub fn delete_strategy(&mut self, id: u32, confirm: &dyn Confirm) -> Result<()> {
        let strategy = self
            .state
            .form_data
            .strategy(id)
            .ok_or(Error::StrategyNotFound { id })?;
        let label = if strategy.is_unnamed() {
            format!("#{id}")
        } else {
            strategy.name.clone()
        };

        if !confirm.confirm(&format!("هل أنت متأكد من حذف الاستراتيجية: {label}؟")) {
            debug!(id, "strategy deletion declined");
            return Err(Error::Cancelled);
        }

        self.state.form_data = reducer::delete_strategy(&self.state.form_data, id)?;
        self.save(Slot::FormData);
        self.notifier.success(format!("تم حذف الاستراتيجية: {label}"));
        info!(id, "strategy deleted");
        Ok(())
    }

    /// Replace a strategy description with user-entered text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] for an unknown id.
    pub fn set_description(&mut self, id: u32, text: &str) -> Result<()> {
        self.state.form_data = reducer::set_description(&self.state.form_data, id, text)?;
        self.save(Slot::FormData);
        self.notifier.success("تم حفظ الوصف.");
        Ok(())
    }

    // --- Settings ---

    /// Set a school field: `name`, `branch` or `academic-year`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for any other field.
    pub fn set_school_field(&mut self, field: &str, value: &str) -> Result<()> {
        let field: SchoolField = field.parse()?;
        self.state.school_info = reducer::set_school_field(&self.state.school_info, field, value);
        self.save(Slot::SchoolInfo);
        Ok(())
    }

    /// Read an image file and store it as the school logo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedImage`] for a non-image extension and an
    /// I/O error if the file cannot be read.
    pub async fn set_logo(&mut self, path: &Path) -> Result<()> {
        let uri = read_logo(path).await?;
        self.state.school_info = reducer::set_logo(&self.state.school_info, Some(uri));
        self.save(Slot::SchoolInfo);
        self.notifier.success("تم تحديث شعار المدرسة.");
        Ok(())
    }

    /// Remove the school logo.
    pub fn clear_logo(&mut self) {
        self.state.school_info = reducer::set_logo(&self.state.school_info, None);
        self.save(Slot::SchoolInfo);
        self.notifier.info("تمت إزالة شعار المدرسة.");
    }

    /// Add a subject.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank or already listed subject.
    pub fn add_subject(&mut self, name: &str) -> Result<()> {
        self.state.subjects = reducer::add_subject(&self.state.subjects, name)?;
        self.save(Slot::Subjects);
        self.notifier.success(format!("تمت إضافة المادة: {}", name.trim()));
        Ok(())
    }

    /// Delete a subject after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubjectNotFound`] for an unlisted subject and
    /// [`Error::Cancelled`] when the user declines.
    pub fn delete_subject(&mut self, name: &str, confirm: &dyn Confirm) -> Result<()> {
        if !self.state.subjects.iter().any(|s| s == name) {
            return Err(Error::SubjectNotFound(name.to_string()));
        }
        if !confirm.confirm(&format!("هل أنت متأكد من حذف المادة: {name}؟")) {
            debug!(subject = name, "subject deletion declined");
            return Err(Error::Cancelled);
        }
        self.state.subjects = reducer::delete_subject(&self.state.subjects, name)?;
        self.save(Slot::Subjects);
        self.notifier.success(format!("تم حذف المادة: {name}"));
        Ok(())
    }

    /// Set the font size, clamped to the selectable range. Returns the stored size.
    pub fn set_font_size(&mut self, size: i64) -> u8 {
        let clamped = reducer::clamp_font_size(size);
        if i64::from(clamped) != size {
            debug!(requested = size, clamped, "font size clamped");
        }
        self.state.font_size = clamped;
        self.save(Slot::FontSize);
        clamped
    }

    /// Restore every persisted value to its seed after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the user declines.
    pub fn reset(&mut self, confirm: &dyn Confirm) -> Result<()> {
        if !confirm.confirm(
            "هل أنت متأكد من أنك تريد إعادة تعيين كافة البيانات إلى حالتها الأولية؟ لا يمكن التراجع عن هذا الإجراء.",
        ) {
            debug!("reset declined");
            return Err(Error::Cancelled);
        }
        self.replace_all(Snapshot::default())?;
        self.state.view = View::Dashboard;
        self.notifier.success("تمت إعادة تعيين جميع البيانات بنجاح.");
        info!("all data reset to seed values");
        Ok(())
    }

    /// The persisted values as one document.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            school_info: self.state.school_info.clone(),
            form_data: self.state.form_data.clone(),
            subjects: self.state.subjects.clone(),
            font_size: i64::from(self.state.font_size),
        }
    }

    /// Replace every persisted value with `snapshot` after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateStrategyId`] or [`Error::StrategyIdExhausted`]
    /// for a strategy list this program could not have written, and
    /// [`Error::Cancelled`] when the user declines.
    pub fn import(&mut self, snapshot: Snapshot, confirm: &dyn Confirm) -> Result<()> {
        reducer::validate_strategy_ids(&snapshot.form_data.strategies)?;
        if !confirm.confirm("سيتم استبدال جميع البيانات الحالية. هل تريد المتابعة؟") {
            debug!("import declined");
            return Err(Error::Cancelled);
        }
        self.replace_all(snapshot)?;
        self.notifier.success("تم استيراد البيانات بنجاح.");
        info!("snapshot imported");
        Ok(())
    }

    fn replace_all(&mut self, snapshot: Snapshot) -> Result<()> {
        let font_size = reducer::clamp_font_size(snapshot.font_size);
        let snapshot = Snapshot {
            font_size: i64::from(font_size),
            ..snapshot
        };
        let entries = snapshot.entries()?;
        if !self.store.set_many(&entries) {
            self.notifier.warning(SAVE_FAILED);
        }
        self.state.school_info = snapshot.school_info;
        self.state.form_data = snapshot.form_data;
        self.state.subjects = snapshot.subjects;
        self.state.font_size = font_size;
        Ok(())
    }

    // --- Text generation ---

    fn settle(
        &mut self,
        pending: &Pending,
        outcome: std::result::Result<String, GenerationError>,
    ) -> Result<String> {
        if !self.inflight.is_current(&pending.ticket) {
            debug!(request = %pending.target(), "discarding stale generation response");
            return Err(Error::Superseded {
                target: pending.target().to_string(),
            });
        }

        let outcome = outcome.and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(GenerationError::Failed("empty response".to_string()))
            } else {
                Ok(text.to_string())
            }
        });

        outcome.map_err(|e| {
            warn!(request = %pending.target(), category = e.category(), error = %e, "generation failed");
            self.notifier.error(e.user_message());
            Error::from(e)
        })
    }

    /// Start a description request for a named strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] for an unknown id and
    /// [`Error::BlankStrategyName`] when the row has no name.
    pub fn begin_description(&self, id: u32) -> Result<Pending> {
        let strategy = self
            .state
            .form_data
            .strategy(id)
            .ok_or(Error::StrategyNotFound { id })?;
        if strategy.is_unnamed() {
            return Err(Error::BlankStrategyName { id });
        }
        Ok(Pending {
            ticket: self.inflight.begin(Target::Description(id)),
            prompt: prompts::describe_strategy(strategy.name.trim()),
            strategy_id: Some(id),
        })
    }

    /// Apply the outcome of a description request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Superseded`] for a stale request and the generation
    /// error when generation failed. The record is unchanged in both cases.
    pub fn finish_description(
        &mut self,
        pending: &Pending,
        outcome: std::result::Result<String, GenerationError>,
    ) -> Result<String> {
        let Target::Description(id) = pending.target() else {
            return Err(Error::Superseded {
                target: pending.target().to_string(),
            });
        };
        let text = self.settle(pending, outcome)?;
        self.state.form_data = reducer::set_description(&self.state.form_data, id, &text)?;
        self.save(Slot::FormData);
        self.notifier.success("تم إنشاء وصف الاستراتيجية.");
        info!(id, chars = text.chars().count(), "strategy description generated");
        Ok(text)
    }

    /// Generate and store a description for a named strategy.
    ///
    /// # Errors
    ///
    /// See [`App::begin_description`] and [`App::finish_description`].
    pub async fn generate_description(&mut self, id: u32) -> Result<String> {
        let pending = self.begin_description(id)?;
        let generator = Arc::clone(&self.generator);
        let outcome = generator.generate(pending.prompt()).await;
        self.finish_description(&pending, outcome)
    }

    /// Start a strategy-name suggestion. With `id`, the suggestion names
    /// that row; otherwise it is appended as a new row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] for an unknown id.
    pub fn begin_suggestion(&self, id: Option<u32>) -> Result<Pending> {
        if let Some(id) = id {
            if self.state.form_data.strategy(id).is_none() {
                return Err(Error::StrategyNotFound { id });
            }
        }
        let form = &self.state.form_data;
        Ok(Pending {
            ticket: self.inflight.begin(Target::Suggestion),
            prompt: prompts::suggest_strategy(&form.subject, &form.grade, &form.strategy_names()),
            strategy_id: id,
        })
    }

    /// Apply the outcome of a suggestion request. Returns the id of the
    /// named row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSuggestion`] when the name is already used,
    /// [`Error::Superseded`] for a stale request and the generation error
    /// when generation failed. The record is unchanged in all three cases.
    pub fn finish_suggestion(
        &mut self,
        pending: &Pending,
        outcome: std::result::Result<String, GenerationError>,
    ) -> Result<u32> {
        let name = self.settle(pending, outcome)?;
        let folded = name.to_lowercase();
        if self
            .state
            .form_data
            .strategy_names()
            .iter()
            .any(|existing| existing.trim().to_lowercase() == folded)
        {
            debug!(name = %name, "suggested strategy already exists");
            return Err(Error::DuplicateSuggestion(name));
        }

        let id = match pending.strategy_id {
            Some(id) => {
                self.state.form_data =
                    reducer::edit_strategy(&self.state.form_data, id, StrategyField::Name, &name)?;
                id
            }
            None => {
                let (form, id) = reducer::add_named_strategy(&self.state.form_data, &name)?;
                self.state.form_data = form;
                id
            }
        };
        self.save(Slot::FormData);
        self.notifier
            .success(format!("تمت إضافة الاستراتيجية المقترحة: {name}"));
        info!(id, name = %name, "strategy suggestion applied");
        Ok(id)
    }

    /// Ask for a new strategy name, retrying on duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSuggestion`] when every attempt duplicated
    /// an existing name; otherwise see [`App::finish_suggestion`].
    pub async fn suggest_strategy(&mut self, id: Option<u32>) -> Result<u32> {
        let pending = self.begin_suggestion(id)?;
        let generator = Arc::clone(&self.generator);
        let mut last = String::new();

        for attempt in 1..=self.suggestion_attempts {
            let outcome = generator.generate(pending.prompt()).await;
            match self.finish_suggestion(&pending, outcome) {
                Err(Error::DuplicateSuggestion(name)) => {
                    debug!(attempt, name = %name, "retrying duplicate suggestion");
                    last = name;
                }
                other => return other,
            }
        }

        self.notifier
            .warning("لم يتم العثور على استراتيجية جديدة غير مكررة.");
        Err(Error::DuplicateSuggestion(last))
    }

    /// Start a narrative report request from the current form.
    #[must_use]
    pub fn begin_report(&self) -> Pending {
        Pending {
            ticket: self.inflight.begin(Target::Report),
            prompt: prompts::narrative_report(&self.state.form_data),
            strategy_id: None,
        }
    }

    /// Apply the outcome of a narrative request. Returns the narrative.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Superseded`] for a stale request and the generation
    /// error when generation failed.
    pub fn finish_report(
        &mut self,
        pending: &Pending,
        outcome: std::result::Result<String, GenerationError>,
    ) -> Result<String> {
        let text = self.settle(pending, outcome)?;
        self.notifier.success("تم إنشاء التحليل بنجاح.");
        info!(chars = text.chars().count(), "report narrative generated");
        Ok(text)
    }

    /// Build the report with a generated narrative.
    ///
    /// # Errors
    ///
    /// See [`App::finish_report`].
    pub async fn generate_report(&mut self) -> Result<ReportModel> {
        let pending = self.begin_report();
        let generator = Arc::clone(&self.generator);
        let outcome = generator.generate(pending.prompt()).await;
        let narrative = self.finish_report(&pending, outcome)?;
        Ok(self.report().with_narrative(narrative))
    }
}

fn logo_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    LOGO_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Read an image file as a base64 `data:` URI.
///
/// # Errors
///
/// Returns [`Error::UnsupportedImage`] for a non-image extension and an I/O
/// error if the file cannot be read.
pub async fn read_logo(path: &Path) -> Result<String> {
    let mime = logo_mime(path).ok_or_else(|| Error::UnsupportedImage {
        path: path.to_path_buf(),
    })?;
    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), mime, "logo read");
    Ok(format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AssumeYes;
    use crate::generation::{GeminiClient, ScriptedGenerator};
    use crate::model::StrategyUsage;
    use crate::notify::Kind;
    use std::time::Duration;

    struct Decline;

    impl Confirm for Decline {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    fn app_with(generator: Arc<dyn TextGenerator>) -> App {
        App::new(Store::open_in_memory().unwrap(), generator, &Config::default())
    }

    fn app() -> App {
        app_with(Arc::new(ScriptedGenerator::default()))
    }

    fn scripted(responses: &[&str]) -> (Arc<ScriptedGenerator>, App) {
        let generator = Arc::new(ScriptedGenerator::with_responses(responses.iter().copied()));
        let app = app_with(generator.clone());
        (generator, app)
    }

    #[test]
    fn test_first_run_uses_seed_values() {
        let app = app();
        assert_eq!(app.state(), &AppState::default());
        assert_eq!(app.state().view, View::Dashboard);
    }

    #[test]
    fn test_corrupt_key_falls_back_alone() {
        let store = Store::open_in_memory().unwrap();
        store.set(KEY_FONT_SIZE, "big");
        store.set(KEY_SUBJECTS, &vec!["الفيزياء"]);

        let app = App::new(store, Arc::new(ScriptedGenerator::default()), &Config::default());
        assert_eq!(app.state().font_size, 16);
        assert_eq!(app.state().subjects, vec!["الفيزياء".to_string()]);
        assert_eq!(app.state().form_data, seed::form_data());
    }

    #[test]
    fn test_stored_font_size_is_clamped_on_load() {
        let store = Store::open_in_memory().unwrap();
        store.set(KEY_FONT_SIZE, &300);
        let app = App::new(store, Arc::new(ScriptedGenerator::default()), &Config::default());
        assert_eq!(app.state().font_size, 22);
    }

    #[test]
    fn test_font_size_persists_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lessonlog.db");

        {
            let mut app = App::new(
                Store::open(&path).unwrap(),
                Arc::new(ScriptedGenerator::default()),
                &Config::default(),
            );
            assert_eq!(app.set_font_size(12), 12);
        }

        let app = App::new(
            Store::open(&path).unwrap(),
            Arc::new(ScriptedGenerator::default()),
            &Config::default(),
        );
        assert_eq!(app.state().font_size, 12);
    }

    #[test]
    fn test_font_size_clamps() {
        let mut app = app();
        assert_eq!(app.set_font_size(40), 22);
        assert_eq!(app.set_font_size(2), 12);
    }

    #[test]
    fn test_set_form_field_persists() {
        let mut app = app();
        app.set_form_field("resourceRooms.library", "9").unwrap();
        assert_eq!(app.state().form_data.resource_rooms.library, 9);

        let stored: FormData = app.store().get(KEY_FORM_DATA, seed::form_data());
        assert_eq!(stored.resource_rooms.library, 9);
    }

    #[test]
    fn test_set_form_field_rejects_unknown_path() {
        let mut app = app();
        assert!(matches!(
            app.set_form_field("principal", "x"),
            Err(Error::UnknownField(_))
        ));
        assert_eq!(app.state().form_data, seed::form_data());
    }

    #[test]
    fn test_delete_then_add_scenario() {
        let mut app = app();
        let before = app.report().totals;

        app.delete_strategy(1, &AssumeYes).unwrap();
        let id = app.add_strategy().unwrap();
        assert_eq!(id, 22);

        let after = app.report().totals;
        assert_eq!(after.active, before.active - 3);
        assert_eq!(after.traditional, before.traditional - 1);
        assert_eq!(after.research, before.research - 1);
    }

    #[test]
    fn test_declined_delete_leaves_record() {
        let mut app = app();
        assert!(app.delete_strategy(1, &Decline).unwrap_err().is_cancelled());
        assert!(app.state().form_data.strategy(1).is_some());
    }

    #[test]
    fn test_delete_unknown_strategy_does_not_prompt() {
        let mut app = app();
        assert!(matches!(
            app.delete_strategy(99, &Decline),
            Err(Error::StrategyNotFound { id: 99 })
        ));
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut app = app();
        app.set_font_size(20);
        app.add_subject("الفيزياء").unwrap();
        app.set_school_field("name", "مدرسة النور").unwrap();
        app.set_form_field("teacherName", "أ. سارة").unwrap();
        app.set_view(View::Settings);

        app.reset(&AssumeYes).unwrap();
        assert_eq!(app.state(), &AppState::default());

        let reloaded = AppState::load(app.store());
        assert_eq!(reloaded, AppState::default());
    }

    #[test]
    fn test_declined_reset_keeps_edits() {
        let mut app = app();
        app.set_font_size(20);
        assert!(app.reset(&Decline).unwrap_err().is_cancelled());
        assert_eq!(app.state().font_size, 20);
    }

    #[test]
    fn test_subject_lifecycle() {
        let mut app = app();
        app.add_subject(" الفيزياء ").unwrap();
        assert!(matches!(
            app.add_subject("الفيزياء"),
            Err(Error::DuplicateSubject(_))
        ));

        assert!(app.delete_subject("الفيزياء", &Decline).is_err());
        assert_eq!(app.state().subjects.len(), 6);

        app.delete_subject("الفيزياء", &AssumeYes).unwrap();
        assert_eq!(app.state().subjects, seed::subjects());
    }

    #[test]
    fn test_deleted_subject_stays_on_form() {
        let mut app = app();
        app.delete_subject("اللغة العربية", &AssumeYes).unwrap();
        assert_eq!(app.state().form_data.subject, "اللغة العربية");
    }

    #[tokio::test]
    async fn test_logo_becomes_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut app = app();
        app.set_logo(&path).await.unwrap();
        let logo = app.state().school_info.logo.clone().unwrap();
        assert_eq!(logo, "data:image/png;base64,iVBORw==");

        app.clear_logo();
        assert!(app.state().school_info.logo.is_none());
    }

    #[tokio::test]
    async fn test_logo_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut app = app();
        assert!(matches!(
            app.set_logo(&path).await,
            Err(Error::UnsupportedImage { .. })
        ));
        assert!(app.state().school_info.logo.is_none());
    }

    #[test]
    fn test_snapshot_import() {
        let mut source = app();
        source.set_font_size(14);
        source.add_subject("الفيزياء").unwrap();
        let json = serde_json::to_string(&source.snapshot()).unwrap();

        let mut target = app();
        target
            .import(serde_json::from_str(&json).unwrap(), &AssumeYes)
            .unwrap();
        assert_eq!(target.state().font_size, 14);
        assert_eq!(target.state().subjects.len(), 6);
    }

    #[test]
    fn test_snapshot_missing_sections_use_defaults() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"app-font-size": 18}"#).unwrap();
        assert_eq!(snapshot.font_size, 18);
        assert_eq!(snapshot.subjects, seed::subjects());
        assert_eq!(snapshot.form_data, seed::form_data());
    }

    #[test]
    fn test_import_clamps_out_of_range_font_size() {
        let mut app = app();
        let snapshot: Snapshot = serde_json::from_str(r#"{"app-font-size": 300}"#).unwrap();
        app.import(snapshot, &AssumeYes).unwrap();
        assert_eq!(app.state().font_size, 22);

        let snapshot: Snapshot = serde_json::from_str(r#"{"app-font-size": -1}"#).unwrap();
        app.import(snapshot, &AssumeYes).unwrap();
        assert_eq!(app.state().font_size, 12);
        assert_eq!(app.store().get(KEY_FONT_SIZE, 0_i64), 12);
    }

    #[test]
    fn test_import_rejects_duplicate_strategy_ids() {
        let mut app = app();
        let mut snapshot = app.snapshot();
        snapshot.form_data.strategies.push(StrategyUsage::blank(1));
        snapshot.font_size = 20;

        assert!(matches!(
            app.import(snapshot, &AssumeYes),
            Err(Error::DuplicateStrategyId { id: 1 })
        ));
        assert_eq!(app.state(), &AppState::default());
    }

    #[test]
    fn test_import_rejects_exhausted_strategy_ids() {
        let mut app = app();
        let mut snapshot = app.snapshot();
        snapshot.form_data.strategies[20].id = u32::MAX;

        assert!(matches!(
            app.import(snapshot, &AssumeYes),
            Err(Error::StrategyIdExhausted { .. })
        ));
        assert_eq!(app.add_strategy().unwrap(), 22);
    }

    #[test]
    fn test_add_strategy_with_stored_max_id_fails() {
        let store = Store::open_in_memory().unwrap();
        let mut form = seed::form_data();
        form.strategies.push(StrategyUsage::blank(u32::MAX));
        store.set(KEY_FORM_DATA, &form);

        let mut app = App::new(store, Arc::new(ScriptedGenerator::default()), &Config::default());
        assert!(matches!(
            app.add_strategy(),
            Err(Error::StrategyIdExhausted { max: u32::MAX })
        ));
        assert_eq!(app.state().form_data, form);
    }

    #[tokio::test]
    async fn test_generate_description_stores_trimmed_text() {
        let (generator, mut app) = scripted(&["  استراتيجية تعتمد على الحذف.  \n"]);
        let text = app.generate_description(1).await.unwrap();

        assert_eq!(text, "استراتيجية تعتمد على الحذف.");
        assert_eq!(app.state().form_data.strategy(1).unwrap().description, text);
        assert!(generator.prompts()[0].contains("اشطب وربح"));

        let notes = app.take_notifications();
        assert_eq!(notes[0].kind, Kind::Success);
    }

    #[tokio::test]
    async fn test_generate_description_without_key_leaves_record() {
        let client = GeminiClient::new(
            None,
            "gemini-2.5-flash",
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )
        .unwrap();
        let mut app = app_with(Arc::new(client));

        let err = app.generate_description(1).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Generation(GenerationError::MissingCredential)
        ));
        assert_eq!(app.state().form_data, seed::form_data());

        let notes = app.take_notifications();
        assert_eq!(notes[0].kind, Kind::Error);
        assert_eq!(notes[0].text, GenerationError::MissingCredential.user_message());
    }

    #[tokio::test]
    async fn test_generate_description_requires_name() {
        let mut app = app();
        assert!(matches!(
            app.generate_description(14).await,
            Err(Error::BlankStrategyName { id: 14 })
        ));
    }

    #[test]
    fn test_stale_description_is_discarded() {
        let mut app = app();
        let older = app.begin_description(2).unwrap();
        let newer = app.begin_description(2).unwrap();

        assert!(matches!(
            app.finish_description(&older, Ok("قديم".to_string())),
            Err(Error::Superseded { .. })
        ));
        assert_eq!(app.state().form_data.strategy(2).unwrap().description, "");

        app.finish_description(&newer, Ok("جديد".to_string())).unwrap();
        assert_eq!(app.state().form_data.strategy(2).unwrap().description, "جديد");
    }

    #[test]
    fn test_stale_failure_is_not_reported() {
        let mut app = app();
        let older = app.begin_report();
        let _newer = app.begin_report();

        let result = app.finish_report(&older, Err(GenerationError::Network("down".to_string())));
        assert!(matches!(result, Err(Error::Superseded { .. })));
        assert!(app.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_suggestion_retries_duplicates() {
        let (generator, mut app) = scripted(&["  القصة ", "خرائط المفاهيم"]);
        let id = app.suggest_strategy(None).await.unwrap();

        assert_eq!(id, 22);
        assert_eq!(app.state().form_data.strategy(22).unwrap().name, "خرائط المفاهيم");
        assert_eq!(generator.prompts().len(), 2);
        assert!(generator.prompts()[0].contains("القصة"));
    }

    #[tokio::test]
    async fn test_suggestion_is_case_insensitive() {
        let (_, mut app) = scripted(&["Think Pair Share", "think pair share", "THINK PAIR SHARE"]);
        app.edit_strategy(14, "name", "Think Pair Share").unwrap();

        assert!(matches!(
            app.suggest_strategy(None).await,
            Err(Error::DuplicateSuggestion(_))
        ));
        assert_eq!(app.state().form_data.strategies.len(), 21);

        let notes = app.take_notifications();
        assert_eq!(notes[0].kind, Kind::Warning);
    }

    #[tokio::test]
    async fn test_suggestion_names_existing_row() {
        let (_, mut app) = scripted(&["لعب الأدوار"]);
        let id = app.suggest_strategy(Some(15)).await.unwrap();
        assert_eq!(id, 15);
        assert_eq!(app.state().form_data.strategy(15).unwrap().name, "لعب الأدوار");
        assert_eq!(app.state().form_data.strategies.len(), 21);
    }

    #[tokio::test]
    async fn test_generate_report_attaches_narrative() {
        let (generator, mut app) = scripted(&["## ملخص الأداء\nأداء جيد."]);
        let report = app.generate_report().await.unwrap();

        assert_eq!(report.narrative.as_deref(), Some("## ملخص الأداء\nأداء جيد."));
        assert!(generator.prompts()[0].contains("أ. خليل المخلافي"));
    }

    #[tokio::test]
    async fn test_empty_generation_is_failure() {
        let (_, mut app) = scripted(&["   "]);
        assert!(matches!(
            app.generate_description(1).await,
            Err(Error::Generation(GenerationError::Failed(_)))
        ));
        assert_eq!(app.state().form_data.strategy(1).unwrap().description, "");
    }
}
