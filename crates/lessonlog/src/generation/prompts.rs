//! Prompt text sent to the generation service.

use serde_json::json;

use crate::model::{FormData, StrategyUsage};

/// Prompt for a short description of a strategy.
#[must_use]
pub fn describe_strategy(name: &str) -> String {
    format!(
        "Please provide a concise, professional description in Arabic for the educational \
         strategy named \"{name}\". Explain its purpose and how it is typically used in a classroom."
    )
}

/// Prompt for one new strategy name not already in `existing`.
#[must_use]
pub fn suggest_strategy(subject: &str, grade: &str, existing: &[&str]) -> String {
    let existing = if existing.is_empty() {
        "(none)".to_string()
    } else {
        existing.join("، ")
    };
    format!(
        "Suggest one active-learning teaching strategy in Arabic suitable for teaching \
         {subject} to {grade}. It must be different from all of these strategies: {existing}. \
         Reply with the strategy name only, without quotes, numbering or explanation."
    )
}

fn used_strategies(form: &FormData) -> Vec<&StrategyUsage> {
    form.strategies
        .iter()
        .filter(|s| !s.name.is_empty() && s.has_usage())
        .collect()
}

/// Prompt for the narrative performance report.
///
/// Only named strategies with at least one non-zero counter are included.
#[must_use]
pub fn narrative_report(form: &FormData) -> String {
    let strategies = json!(used_strategies(form));
    let extracurricular = json!(form.extracurricular);
    let resource_rooms = json!(form.resource_rooms);
    let experience_cone = json!(form.experience_cone);

    format!(
        r#"**Role**: You are an expert educational consultant.
**Task**: Analyze the provided teacher performance data and generate a concise, constructive, and actionable report in Arabic.
**Format**: Use Markdown for clear structure with headings.

**Data for Analysis**:
- **Teacher**: {teacher}
- **Subject & Grade**: {subject} for {grade}
- **Semester Units & Lessons**: {units} units, {lessons} lessons.
- **Teaching Strategies**: {strategies}
- **Extracurricular Activities**: {extracurricular}
- **Resource Room Usage**: {resource_rooms}
- **Dale's Cone of Experience Distribution**: {experience_cone}

**Report Structure**:
1. **"ملخص الأداء" (Performance Summary)**: A brief overview of the teacher's approach.
2. **"نقاط القوة" (Strengths)**: Identify 2-3 key strengths with examples from the data.
3. **"فرص للتطوير" (Opportunities for Development)**: Suggest 2-3 specific areas for improvement, framed positively.
4. **"توصيات عملية" (Actionable Recommendations)**: Provide 3 concrete, easy-to-implement suggestions to enhance teaching effectiveness.

**Tone**: Professional, supportive, and encouraging."#,
        teacher = form.teacher_name,
        subject = form.subject,
        grade = form.grade,
        units = form.units,
        lessons = form.lessons,
    )
}
