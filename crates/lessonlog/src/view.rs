//! Text views of the application record.
//!
//! Each view borrows the record and renders through [`fmt::Display`], so
//! callers print it directly or turn it into a `String` for tests.

use std::fmt;

use crate::app::AppState;
use crate::model::{seed, CounterGroup, SchoolInfo, StrategyUsage};
use crate::report::{BarChart, ProportionChart, ReportModel, EMPTY_CHART_MESSAGE};
use crate::sort::{sorted, SortColumn, SortState};

/// Message shown when the subject list is empty.
pub const NO_SUBJECTS_MESSAGE: &str = "لا توجد مواد دراسية. أضف مادة جديدة أعلاه.";

const UNNAMED: &str = "(بدون اسم)";

/// Which view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Data entry.
    #[default]
    Dashboard,
    /// Charts and the printable report.
    Reports,
    /// School info, subjects and appearance.
    Settings,
}

impl View {
    /// Heading printed above the view.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "لوحة إدخال البيانات",
            Self::Reports => "تقرير الأداء",
            Self::Settings => "الإعدادات",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Reports => write!(f, "reports"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

/// Rendering knobs that are not part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Sort order of the strategy grid.
    pub sort: SortState,
    /// Characters in a full-length bar.
    pub bar_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sort: SortState::unsorted(),
            bar_width: 40,
        }
    }
}

/// Render whichever view `state.view` selects.
#[must_use]
pub fn render(state: &AppState, options: &RenderOptions) -> String {
    match state.view {
        View::Dashboard => Dashboard::new(state, options.sort).to_string(),
        View::Reports => {
            let report = ReportModel::build(&state.school_info, &state.form_data);
            Reports::new(&report, options.bar_width).to_string()
        }
        View::Settings => Settings::new(state).to_string(),
    }
}

fn write_heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(title.chars().count().max(8)))
}

fn write_group<G: CounterGroup>(f: &mut fmt::Formatter<'_>, group: &G) -> fmt::Result {
    write_heading(f, G::TITLE)?;
    for (key, label) in G::FIELDS {
        let value = group.get(key).unwrap_or(0);
        writeln!(f, "  {label} [{}.{key}]: {value}", G::PREFIX)?;
    }
    Ok(())
}

fn display_name(row: &StrategyUsage) -> &str {
    if row.is_unnamed() {
        UNNAMED
    } else {
        &row.name
    }
}

/// The strategy grid in display order.
#[derive(Debug, Clone, Copy)]
pub struct StrategyTable<'a> {
    rows: &'a [StrategyUsage],
    sort: SortState,
}

impl<'a> StrategyTable<'a> {
    /// A grid over `rows`, ordered by `sort`.
    #[must_use]
    pub fn new(rows: &'a [StrategyUsage], sort: SortState) -> Self {
        Self { rows, sort }
    }
}

impl fmt::Display for StrategyTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:>4}  {:<30} {:>7} {:>7} {:>7}  الوصف",
            "#",
            "الاستراتيجية",
            format!("تقليدي{}", self.sort.indicator(SortColumn::Traditional)),
            format!("نشط{}", self.sort.indicator(SortColumn::Active)),
            format!("بحثي{}", self.sort.indicator(SortColumn::Research)),
        )?;
        for row in sorted(self.rows, &self.sort) {
            writeln!(
                f,
                "  {:>4}  {:<30} {:>7} {:>7} {:>7}  {}",
                row.id,
                display_name(row),
                row.traditional,
                row.active,
                row.research,
                if row.description.trim().is_empty() { "-" } else { "✓" },
            )?;
        }
        Ok(())
    }
}

/// The data-entry view.
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    state: &'a AppState,
    sort: SortState,
}

impl<'a> Dashboard<'a> {
    /// Dashboard over `state` with the strategy grid ordered by `sort`.
    #[must_use]
    pub fn new(state: &'a AppState, sort: SortState) -> Self {
        Self { state, sort }
    }
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let school = &self.state.school_info;
        let form = &self.state.form_data;

        writeln!(f, "{}", View::Dashboard.title())?;
        writeln!(f, "{} - العام الدراسي: {}", school.branch, school.academic_year)?;

        write_heading(f, "المعلومات الأساسية")?;
        writeln!(f, "  اسم المعلم [teacherName]: {}", form.teacher_name)?;
        writeln!(f, "  الفصل الدراسي [semester]: {}", form.semester)?;
        writeln!(f, "  الصف [grade]: {}", form.grade)?;
        writeln!(f, "  المادة [subject]: {}", form.subject)?;
        writeln!(f, "  عدد الوحدات [units]: {}", form.units)?;
        writeln!(f, "  عدد الدروس [lessons]: {}", form.lessons)?;

        write_heading(f, "استراتيجيات التدريس (عدد مرات التنفيذ)")?;
        write!(f, "{}", StrategyTable::new(&form.strategies, self.sort))?;

        write_group(f, &form.extracurricular)?;
        write_group(f, &form.resource_rooms)?;
        write_group(f, &form.experience_cone)
    }
}

// `fraction` is in 0.0..=1.0, so the product fits in usize.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_len(fraction: f64, width: usize) -> usize {
    (fraction.clamp(0.0, 1.0) * width as f64).round() as usize
}

fn write_proportions(f: &mut fmt::Formatter<'_>, chart: &ProportionChart) -> fmt::Result {
    write_heading(f, &chart.title)?;
    if chart.is_empty() {
        return writeln!(f, "  {EMPTY_CHART_MESSAGE}");
    }
    for entry in &chart.entries {
        writeln!(
            f,
            "  {}: {} ({:.1}%)",
            entry.label,
            entry.value,
            entry.fraction * 100.0
        )?;
    }
    Ok(())
}

fn write_bars(f: &mut fmt::Formatter<'_>, chart: &BarChart, width: usize) -> fmt::Result {
    write_heading(f, &chart.title)?;
    let label_width = chart
        .entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);
    for entry in &chart.entries {
        writeln!(
            f,
            "  {:<label_width$} {} {}",
            entry.label,
            "█".repeat(bar_len(entry.fraction, width)),
            entry.value,
        )?;
    }
    Ok(())
}

fn write_school_header(f: &mut fmt::Formatter<'_>, school: &SchoolInfo) -> fmt::Result {
    writeln!(f, "{}", school.name)?;
    writeln!(f, "{}", school.branch)?;
    writeln!(f, "{}", school.academic_year)?;
    if school.logo.is_some() {
        writeln!(f, "[شعار المدرسة مرفق]")?;
    }
    Ok(())
}

/// The printable report view.
#[derive(Debug, Clone, Copy)]
pub struct Reports<'a> {
    report: &'a ReportModel,
    bar_width: usize,
}

impl<'a> Reports<'a> {
    /// Report view with bars at most `bar_width` characters long.
    #[must_use]
    pub fn new(report: &'a ReportModel, bar_width: usize) -> Self {
        Self { report, bar_width }
    }
}

impl fmt::Display for Reports<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        writeln!(f, "{}", View::Reports.title())?;
        writeln!(f, "{}", "=".repeat(24))?;
        write_school_header(f, &report.school)?;

        write_heading(f, "معلومات عامة")?;
        writeln!(f, "  اسم المعلم: {}", report.teacher_name)?;
        writeln!(f, "  الفصل الدراسي: {}", report.semester)?;
        writeln!(f, "  الصف: {}", report.grade)?;
        writeln!(f, "  المادة: {}", report.subject)?;
        writeln!(f, "  عدد الوحدات: {}", report.units)?;
        writeln!(f, "  عدد الدروس: {}", report.lessons)?;

        if let Some(narrative) = &report.narrative {
            write_heading(f, "💡 تحليل الذكاء الاصطناعي")?;
            for line in narrative.lines() {
                writeln!(f, "  {line}")?;
            }
        }

        write_proportions(f, &report.classification)?;
        write_proportions(f, &report.experience_cone)?;
        write_bars(f, &report.resource_rooms, self.bar_width)?;

        write_heading(f, "تفاصيل استراتيجيات التدريس")?;
        writeln!(
            f,
            "  {:<30} {:>7} {:>7} {:>7}",
            "الاستراتيجية", "تقليدي", "نشط", "بحثي"
        )?;
        for row in &report.strategies {
            writeln!(
                f,
                "  {:<30} {:>7} {:>7} {:>7}",
                row.name, row.traditional, row.active, row.research
            )?;
        }
        Ok(())
    }
}

/// The settings view.
#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    state: &'a AppState,
}

impl<'a> Settings<'a> {
    /// Settings view over `state`.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }
}

fn logo_kind(logo: &str) -> &str {
    logo.strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .unwrap_or("?")
}

impl fmt::Display for Settings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let school = &self.state.school_info;

        writeln!(f, "{}", View::Settings.title())?;

        write_heading(f, "معلومات المدرسة")?;
        writeln!(f, "  اسم المدرسة [name]: {}", school.name)?;
        writeln!(f, "  الفرع [branch]: {}", school.branch)?;
        writeln!(f, "  العام الدراسي [academic-year]: {}", school.academic_year)?;
        match &school.logo {
            Some(logo) => writeln!(f, "  شعار المدرسة: مرفق ({})", logo_kind(logo))?,
            None => writeln!(f, "  شعار المدرسة: غير محدد")?,
        }

        write_heading(f, "إدارة المواد الدراسية")?;
        if self.state.subjects.is_empty() {
            writeln!(f, "  {NO_SUBJECTS_MESSAGE}")?;
        }
        for (i, subject) in self.state.subjects.iter().enumerate() {
            writeln!(f, "  {}. {subject}", i + 1)?;
        }

        write_heading(f, "تخصيص الواجهة")?;
        writeln!(
            f,
            "  حجم الخط: {}px ({}-{})",
            self.state.font_size,
            seed::MIN_FONT_SIZE,
            seed::MAX_FONT_SIZE
        )
    }
}
