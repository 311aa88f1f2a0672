//! Seed data used on first run and on reset.

use super::record::{ExperienceCone, Extracurricular, FormData, ResourceRooms, StrategyUsage};

/// Default school name.
pub const SCHOOL_NAME: &str = "اسم المدرسة الافتراضي";

/// Default branch.
pub const SCHOOL_BRANCH: &str = "الفرع الرئيسي";

/// Default academic year label.
pub const ACADEMIC_YEAR: &str = "2025/2026 م - 1447 هـ";

/// Default UI font size in pixels.
pub const DEFAULT_FONT_SIZE: u8 = 16;

/// Smallest selectable font size.
pub const MIN_FONT_SIZE: u8 = 12;

/// Largest selectable font size.
pub const MAX_FONT_SIZE: u8 = 22;

/// The two semesters a form can belong to.
pub const SEMESTERS: [&str; 2] = ["الفصل الدراسي الأول", "الفصل الدراسي الثاني"];

/// Subjects offered on first run.
pub const INITIAL_SUBJECTS: [&str; 5] = [
    "القرآن الكريم",
    "التربية الإسلامية",
    "اللغة العربية",
    "الرياضيات",
    "العلوم",
];

// (id, name, traditional, active, research)
const SEED_STRATEGIES: [(u32, &str, u32, u32, u32); 21] = [
    (1, "اشطب وربح", 1, 3, 1),
    (2, "الاستنتاج", 0, 3, 4),
    (3, "استراتيجية الأركان الأربعة", 0, 3, 0),
    (4, "الاستنتاج", 0, 4, 0),
    (5, "البحث عن الكنز", 0, 5, 0),
    (6, "البحث عن الكنز", 0, 2, 0),
    (7, "التدريس التبادلي", 0, 4, 0),
    (8, "الاستنتاج", 0, 3, 0),
    (9, "البحث عن الكنز", 0, 1, 0),
    (10, "التدريس التبادلي", 0, 3, 0),
    (11, "الجكسو", 0, 3, 0),
    (12, "القصة", 0, 4, 0),
    (13, "التعليم باللعب", 0, 4, 0),
    (14, "", 0, 0, 0),
    (15, "", 0, 0, 0),
    (16, "ارسم ما تسمع", 0, 0, 0),
    (17, "استراتيجية الأركان الأربعة", 0, 4, 0),
    (18, "البحث عن الكنز", 0, 0, 0),
    (19, "", 0, 0, 0),
    (20, "", 0, 0, 0),
    (21, "", 0, 0, 0),
];

/// The twelve grade labels, `الصف 1` through `الصف 12`.
#[must_use]
pub fn grades() -> Vec<String> {
    (1..=12).map(|i| format!("الصف {i}")).collect()
}

/// The initial subject list.
#[must_use]
pub fn subjects() -> Vec<String> {
    INITIAL_SUBJECTS.iter().map(ToString::to_string).collect()
}

/// The initial strategy rows.
#[must_use]
pub fn strategies() -> Vec<StrategyUsage> {
    SEED_STRATEGIES
        .iter()
        .map(|&(id, name, traditional, active, research)| StrategyUsage {
            id,
            name: name.to_string(),
            traditional,
            active,
            research,
            description: String::new(),
        })
        .collect()
}

/// The initial form.
#[must_use]
pub fn form_data() -> FormData {
    FormData {
        teacher_name: "أ. خليل المخلافي".to_string(),
        semester: SEMESTERS[0].to_string(),
        grade: "الصف السابع".to_string(),
        subject: "اللغة العربية".to_string(),
        units: 2,
        lessons: 15,
        strategies: strategies(),
        extracurricular: Extracurricular {
            trip: 1,
            radio: 1,
            competition: 1,
            newspaper: 1,
            initiative: 1,
            visit: 1,
            research: 2,
            other: 1,
        },
        resource_rooms: ResourceRooms {
            library: 3,
            showroom: 5,
            interactive_board: 4,
            science_lab: 1,
            other: 2,
        },
        experience_cone: ExperienceCone {
            verbal_symbols: 10,
            visual_symbols: 15,
            sensory_observation: 10,
            alternative_experiences: 2,
            direct_experiences: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_sequential() {
        let ids: Vec<u32> = strategies().iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=21).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_first_row() {
        let rows = strategies();
        assert_eq!(rows[0].name, "اشطب وربح");
        assert_eq!((rows[0].traditional, rows[0].active, rows[0].research), (1, 3, 1));
    }

    #[test]
    fn test_grades() {
        let grades = grades();
        assert_eq!(grades.len(), 12);
        assert_eq!(grades[0], "الصف 1");
        assert_eq!(grades[11], "الصف 12");
    }

    #[test]
    fn test_font_bounds_contain_default() {
        assert!((MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&DEFAULT_FONT_SIZE));
    }

    #[test]
    fn test_seed_subject_is_offered() {
        assert!(subjects().contains(&form_data().subject));
    }
}
