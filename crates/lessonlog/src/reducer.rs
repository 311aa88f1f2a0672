//! Pure transformations of the form record.
//!
//! Every function takes the current record by reference and returns a new
//! one with exactly one thing changed. Numeric input never fails: it is
//! coerced by [`parse_count`].

use std::collections::HashSet;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
    seed, CounterGroup, ExperienceCone, Extracurricular, FormData, ResourceRooms, SchoolInfo,
    StrategyUsage,
};

/// Coerce raw input into a non-negative count.
///
/// Empty input is 0, negative values clamp to 0, fractional values are
/// truncated and anything unparseable is 0.
#[must_use]
pub fn parse_count(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return u32::try_from(n.max(0)).unwrap_or(u32::MAX);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => truncate_positive(f),
        _ => 0,
    }
}

// Caller guarantees `f` is finite and positive.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_positive(f: f64) -> u32 {
    let whole = f.trunc();
    if whole >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        whole as u32
    }
}

/// A counter inside one of the three fixed-shape sub-forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Key of an [`Extracurricular`] counter.
    Extracurricular(&'static str),
    /// Key of a [`ResourceRooms`] counter.
    ResourceRoom(&'static str),
    /// Key of an [`ExperienceCone`] counter.
    ExperienceCone(&'static str),
}

/// An editable top-level or nested form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// `teacherName`
    TeacherName,
    /// `semester`
    Semester,
    /// `grade`
    Grade,
    /// `subject`
    Subject,
    /// `units`
    Units,
    /// `lessons`
    Lessons,
    /// `<group>.<key>`
    Counter(Counter),
}

fn counter_key<G: CounterGroup>(key: &str) -> Option<&'static str> {
    G::FIELDS.iter().map(|(k, _)| *k).find(|k| *k == key)
}

impl FromStr for FormField {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        let field = match path {
            "teacherName" => Self::TeacherName,
            "semester" => Self::Semester,
            "grade" => Self::Grade,
            "subject" => Self::Subject,
            "units" => Self::Units,
            "lessons" => Self::Lessons,
            _ => {
                let (group, key) = path
                    .split_once('.')
                    .ok_or_else(|| Error::UnknownField(path.to_string()))?;
                let counter = match group {
                    g if g == Extracurricular::PREFIX => {
                        counter_key::<Extracurricular>(key).map(Counter::Extracurricular)
                    }
                    g if g == ResourceRooms::PREFIX => {
                        counter_key::<ResourceRooms>(key).map(Counter::ResourceRoom)
                    }
                    g if g == ExperienceCone::PREFIX => {
                        counter_key::<ExperienceCone>(key).map(Counter::ExperienceCone)
                    }
                    _ => None,
                };
                Self::Counter(counter.ok_or_else(|| Error::UnknownField(path.to_string()))?)
            }
        };
        Ok(field)
    }
}

/// An editable column of a strategy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyField {
    /// Free-text name.
    Name,
    /// Free-text description.
    Description,
    /// Traditional counter.
    Traditional,
    /// Active counter.
    Active,
    /// Research counter.
    Research,
}

impl FromStr for StrategyField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "traditional" => Ok(Self::Traditional),
            "active" => Ok(Self::Active),
            "research" => Ok(Self::Research),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

fn require_choice<S: AsRef<str>>(field: &'static str, value: &str, choices: &[S]) -> Result<()> {
    if choices.iter().any(|c| c.as_ref() == value) {
        Ok(())
    } else {
        Err(Error::invalid_choice(field, value))
    }
}

/// Subjects a form may choose from: the current list, or the initial list
/// while the current one is empty.
#[must_use]
pub fn subject_options(subjects: &[String]) -> Vec<String> {
    if subjects.is_empty() {
        seed::subjects()
    } else {
        subjects.to_vec()
    }
}

/// Set one form field from raw input.
///
/// # Errors
///
/// Returns [`Error::InvalidChoice`] when a semester, grade or subject is not
/// one of the offered values.
pub fn set_field(form: &FormData, field: FormField, raw: &str, subjects: &[String]) -> Result<FormData> {
    let mut next = form.clone();
    match field {
        FormField::TeacherName => next.teacher_name = raw.to_string(),
        FormField::Semester => {
            require_choice("semester", raw, &seed::SEMESTERS)?;
            next.semester = raw.to_string();
        }
        FormField::Grade => {
            require_choice("grade", raw, &seed::grades())?;
            next.grade = raw.to_string();
        }
        FormField::Subject => {
            require_choice("subject", raw, &subject_options(subjects))?;
            next.subject = raw.to_string();
        }
        FormField::Units => next.units = parse_count(raw),
        FormField::Lessons => next.lessons = parse_count(raw),
        FormField::Counter(counter) => {
            let value = parse_count(raw);
            match counter {
                Counter::Extracurricular(key) => next.extracurricular.set(key, value),
                Counter::ResourceRoom(key) => next.resource_rooms.set(key, value),
                Counter::ExperienceCone(key) => next.experience_cone.set(key, value),
            };
        }
    }
    debug!(?field, "form field updated");
    Ok(next)
}

/// The id the next added strategy receives.
///
/// # Errors
///
/// Returns [`Error::StrategyIdExhausted`] when the highest id is `u32::MAX`.
pub fn next_strategy_id(strategies: &[StrategyUsage]) -> Result<u32> {
    match strategies.iter().map(|s| s.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or(Error::StrategyIdExhausted { max }),
    }
}

/// Check that a strategy list can come from this program: ids are unique
/// and another row can still be added.
///
/// # Errors
///
/// Returns [`Error::DuplicateStrategyId`] for a repeated id and
/// [`Error::StrategyIdExhausted`] when an id is `u32::MAX`.
pub fn validate_strategy_ids(strategies: &[StrategyUsage]) -> Result<()> {
    let mut seen = HashSet::with_capacity(strategies.len());
    for row in strategies {
        if !seen.insert(row.id) {
            return Err(Error::DuplicateStrategyId { id: row.id });
        }
    }
    next_strategy_id(strategies).map(|_| ())
}

/// Append a blank strategy row. Returns the new record and the new id.
///
/// # Errors
///
/// Returns [`Error::StrategyIdExhausted`] when no id is left.
pub fn add_strategy(form: &FormData) -> Result<(FormData, u32)> {
    let id = next_strategy_id(&form.strategies)?;
    let mut next = form.clone();
    next.strategies.push(StrategyUsage::blank(id));
    Ok((next, id))
}

/// Remove a strategy row.
///
/// # Errors
///
/// Returns [`Error::StrategyNotFound`] when no row has `id`.
pub fn delete_strategy(form: &FormData, id: u32) -> Result<FormData> {
    if form.strategy(id).is_none() {
        return Err(Error::StrategyNotFound { id });
    }
    let mut next = form.clone();
    next.strategies.retain(|s| s.id != id);
    Ok(next)
}

/// Edit one column of a strategy row.
///
/// # Errors
///
/// Returns [`Error::StrategyNotFound`] when no row has `id`.
pub fn edit_strategy(form: &FormData, id: u32, field: StrategyField, raw: &str) -> Result<FormData> {
    let mut next = form.clone();
    let row = next
        .strategies
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(Error::StrategyNotFound { id })?;
    match field {
        StrategyField::Name => row.name = raw.to_string(),
        StrategyField::Description => row.description = raw.to_string(),
        StrategyField::Traditional => row.traditional = parse_count(raw),
        StrategyField::Active => row.active = parse_count(raw),
        StrategyField::Research => row.research = parse_count(raw),
    }
    Ok(next)
}

/// Replace a strategy's description.
///
/// # Errors
///
/// Returns [`Error::StrategyNotFound`] when no row has `id`.
pub fn set_description(form: &FormData, id: u32, text: &str) -> Result<FormData> {
    edit_strategy(form, id, StrategyField::Description, text)
}

/// Append a named strategy row. Returns the new record and the new id.
#[must_use]
pub fn add_named_strategy(form: &FormData, name: &str) -> Result<(FormData, u32)> {
    let (mut next, id) = add_strategy(form)?;
    if let Some(row) = next.strategies.last_mut() {
        row.name = name.to_string();
    }
    Ok((next, id))
}

/// An editable school-information field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolField {
    /// School name.
    Name,
    /// Branch name.
    Branch,
    /// Academic year label.
    AcademicYear,
}

impl FromStr for SchoolField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "branch" => Ok(Self::Branch),
            "academic-year" | "academicYear" => Ok(Self::AcademicYear),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

/// Set one school-information field. Text passes through unchanged.
#[must_use]
pub fn set_school_field(info: &SchoolInfo, field: SchoolField, value: &str) -> SchoolInfo {
    let mut next = info.clone();
    match field {
        SchoolField::Name => next.name = value.to_string(),
        SchoolField::Branch => next.branch = value.to_string(),
        SchoolField::AcademicYear => next.academic_year = value.to_string(),
    }
    next
}

/// Replace or clear the logo.
#[must_use]
pub fn set_logo(info: &SchoolInfo, logo: Option<String>) -> SchoolInfo {
    SchoolInfo {
        logo,
        ..info.clone()
    }
}

/// Append a subject. The name is trimmed first.
///
/// # Errors
///
/// Returns [`Error::EmptySubject`] for a blank name and
/// [`Error::DuplicateSubject`] when the trimmed name is already listed.
pub fn add_subject(subjects: &[String], name: &str) -> Result<Vec<String>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptySubject);
    }
    if subjects.iter().any(|s| s == name) {
        return Err(Error::DuplicateSubject(name.to_string()));
    }
    let mut next = subjects.to_vec();
    next.push(name.to_string());
    Ok(next)
}

/// Remove a subject. Forms that reference it keep the text.
///
/// # Errors
///
/// Returns [`Error::SubjectNotFound`] when `name` is not listed.
pub fn delete_subject(subjects: &[String], name: &str) -> Result<Vec<String>> {
    if !subjects.iter().any(|s| s == name) {
        return Err(Error::SubjectNotFound(name.to_string()));
    }
    Ok(subjects.iter().filter(|s| *s != name).cloned().collect())
}

/// Clamp a requested font size to the selectable range.
#[must_use]
pub fn clamp_font_size(size: i64) -> u8 {
    let clamped = size.clamp(i64::from(seed::MIN_FONT_SIZE), i64::from(seed::MAX_FONT_SIZE));
    u8::try_from(clamped).unwrap_or(seed::DEFAULT_FONT_SIZE)
}
