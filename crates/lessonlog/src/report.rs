//! Derived report data.
//!
//! Everything here is recomputed from the current record on each read.

use serde::Serialize;

use crate::model::{CounterGroup, FormData, SchoolInfo, StrategyUsage};

/// Message shown instead of a proportion chart whose values sum to zero.
pub const EMPTY_CHART_MESSAGE: &str = "لا توجد بيانات لعرضها.";

/// Summed counters across every strategy row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyTotals {
    /// Sum of traditional counters.
    pub traditional: u64,
    /// Sum of active counters.
    pub active: u64,
    /// Sum of research counters.
    pub research: u64,
}

impl StrategyTotals {
    /// Sum all rows, including rows without a name.
    #[must_use]
    pub fn from_strategies(rows: &[StrategyUsage]) -> Self {
        rows.iter().fold(Self::default(), |acc, s| Self {
            traditional: acc.traditional + u64::from(s.traditional),
            active: acc.active + u64::from(s.active),
            research: acc.research + u64::from(s.research),
        })
    }
}

/// Bar lengths as fractions of the largest value (never divides by less than 1).
#[must_use]
pub fn bar_fractions(values: &[u64]) -> Vec<f64> {
    let max = values.iter().copied().max().unwrap_or(0).max(1);
    values.iter().map(|&v| ratio(v, max)).collect()
}

/// Sector sizes as fractions of the total, or `None` when the total is 0.
#[must_use]
pub fn proportions(values: &[u64]) -> Option<Vec<f64>> {
    let sum: u64 = values.iter().sum();
    if sum == 0 {
        return None;
    }
    Some(values.iter().map(|&v| ratio(v, sum)).collect())
}

#[allow(clippy::cast_precision_loss)]
fn ratio(value: u64, of: u64) -> f64 {
    value as f64 / of as f64
}

/// One labelled chart value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    /// Label shown next to the value.
    pub label: String,
    /// Raw value.
    pub value: u64,
    /// Fraction of the sum (proportion charts) or of the max (bar charts).
    pub fraction: f64,
}

/// A proportion (ring) chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionChart {
    /// Chart title.
    pub title: String,
    /// Sectors, empty when every value is zero.
    pub entries: Vec<ChartEntry>,
}

impl ProportionChart {
    /// Build a chart from labelled values.
    #[must_use]
    pub fn new(title: &str, data: &[(&str, u64)]) -> Self {
        let values: Vec<u64> = data.iter().map(|(_, v)| *v).collect();
        let entries = proportions(&values)
            .map(|fractions| {
                data.iter()
                    .zip(fractions)
                    .map(|((label, value), fraction)| ChartEntry {
                        label: (*label).to_string(),
                        value: *value,
                        fraction,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            title: title.to_string(),
            entries,
        }
    }

    /// Whether the chart should show the empty-state message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A horizontal bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    /// Chart title.
    pub title: String,
    /// Bars in display order.
    pub entries: Vec<ChartEntry>,
}

impl BarChart {
    /// Build a chart from labelled values.
    #[must_use]
    pub fn new(title: &str, data: &[(&str, u64)]) -> Self {
        let values: Vec<u64> = data.iter().map(|(_, v)| *v).collect();
        let entries = data
            .iter()
            .zip(bar_fractions(&values))
            .map(|((label, value), fraction)| ChartEntry {
                label: (*label).to_string(),
                value: *value,
                fraction,
            })
            .collect();
        Self {
            title: title.to_string(),
            entries,
        }
    }
}

fn group_data<G: CounterGroup>(group: &G) -> Vec<(&'static str, u64)> {
    group
        .entries()
        .into_iter()
        .map(|(label, v)| (label, u64::from(v)))
        .collect()
}

/// Everything the reports view shows, derived from one record snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    /// School header.
    pub school: SchoolInfo,
    /// Teacher name.
    pub teacher_name: String,
    /// Semester label.
    pub semester: String,
    /// Grade label.
    pub grade: String,
    /// Subject.
    pub subject: String,
    /// Units covered.
    pub units: u32,
    /// Lessons taught.
    pub lessons: u32,
    /// Strategy totals over every row.
    pub totals: StrategyTotals,
    /// Traditional / active / research split.
    pub classification: ProportionChart,
    /// Experience-cone split.
    pub experience_cone: ProportionChart,
    /// Resource-room usage bars.
    pub resource_rooms: BarChart,
    /// Named strategy rows only.
    pub strategies: Vec<StrategyUsage>,
    /// Generated narrative, when requested.
    pub narrative: Option<String>,
}

impl ReportModel {
    /// Derive the report from the current record.
    #[must_use]
    pub fn build(school: &SchoolInfo, form: &FormData) -> Self {
        let totals = StrategyTotals::from_strategies(&form.strategies);
        let classification = ProportionChart::new(
            "تصنيف استراتيجيات التدريس",
            &[
                ("تقليدي", totals.traditional),
                ("نشط", totals.active),
                ("بحثي", totals.research),
            ],
        );
        let experience_cone = ProportionChart::new(
            "تحليل مخروط الخبرة",
            &group_data(&form.experience_cone),
        );
        let resource_rooms = BarChart::new("استخدام غرف المصادر", &group_data(&form.resource_rooms));

        Self {
            school: school.clone(),
            teacher_name: form.teacher_name.clone(),
            semester: form.semester.clone(),
            grade: form.grade.clone(),
            subject: form.subject.clone(),
            units: form.units,
            lessons: form.lessons,
            totals,
            classification,
            experience_cone,
            resource_rooms,
            strategies: form
                .strategies
                .iter()
                .filter(|s| !s.name.is_empty())
                .cloned()
                .collect(),
            narrative: None,
        }
    }

    /// Attach a generated narrative.
    #[must_use]
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed;
    use crate::reducer;

    #[test]
    fn test_totals_of_seed() {
        let totals = StrategyTotals::from_strategies(&seed::strategies());
        assert_eq!(
            totals,
            StrategyTotals {
                traditional: 1,
                active: 46,
                research: 5
            }
        );
    }

    #[test]
    fn test_totals_include_unnamed_rows() {
        let form = seed::form_data();
        let form = reducer::edit_strategy(&form, 14, reducer::StrategyField::Active, "6").unwrap();
        let totals = StrategyTotals::from_strategies(&form.strategies);
        assert_eq!(totals.active, 52);
    }

    #[test]
    fn test_totals_equal_row_sums() {
        let rows = seed::strategies();
        let totals = StrategyTotals::from_strategies(&rows);
        let research: u64 = rows.iter().map(|r| u64::from(r.research)).sum();
        assert_eq!(totals.research, research);
    }

    #[test]
    fn test_delete_then_add_scenario() {
        let form = seed::form_data();
        let before = StrategyTotals::from_strategies(&form.strategies);

        let form = reducer::delete_strategy(&form, 1).unwrap();
        let (form, id) = reducer::add_strategy(&form).unwrap();
        assert_eq!(id, 22);

        let after = StrategyTotals::from_strategies(&form.strategies);
        assert_eq!(after.active, before.active - 3);
    }

    #[test]
    fn test_bar_fractions() {
        assert_eq!(bar_fractions(&[3, 5, 4, 1, 2])[1], 1.0);
        assert!((bar_fractions(&[3, 5, 4, 1, 2])[0] - 0.6).abs() < f64::EPSILON);
        assert_eq!(bar_fractions(&[0, 0]), vec![0.0, 0.0]);
        assert!(bar_fractions(&[]).is_empty());
    }

    #[test]
    fn test_proportions() {
        let p = proportions(&[1, 3]).unwrap();
        assert!((p[0] - 0.25).abs() < f64::EPSILON);
        assert!((p[1] - 0.75).abs() < f64::EPSILON);
        assert!(proportions(&[0, 0, 0]).is_none());
    }

    #[test]
    fn test_empty_proportion_chart() {
        let chart = ProportionChart::new("x", &[("a", 0), ("b", 0)]);
        assert!(chart.is_empty());
    }

    #[test]
    fn test_report_model_from_seed() {
        let report = ReportModel::build(&SchoolInfo::default(), &seed::form_data());
        assert_eq!(report.strategies.len(), 16);
        assert_eq!(report.classification.entries.len(), 3);
        assert_eq!(report.experience_cone.entries.len(), 5);
        assert_eq!(report.resource_rooms.entries[1].value, 5);
        assert_eq!(report.resource_rooms.entries[1].fraction, 1.0);
        assert!(report.narrative.is_none());
    }

    #[test]
    fn test_experience_cone_chart_empty_when_all_zero() {
        let mut form = seed::form_data();
        form.experience_cone = crate::model::ExperienceCone::default();
        let report = ReportModel::build(&SchoolInfo::default(), &form);
        assert!(report.experience_cone.is_empty());
        assert!(!report.classification.is_empty());
    }
}
