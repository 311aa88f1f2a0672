//! Record types persisted by lessonlog.
//!
//! Field names serialize in camelCase so a stored value keeps the same JSON
//! shape the record has always had.

use serde::{Deserialize, Serialize};

use super::seed;

/// School identity shown on every view and printed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInfo {
    /// School name.
    pub name: String,
    /// Logo as a base64 `data:` URI.
    pub logo: Option<String>,
    /// Branch name.
    pub branch: String,
    /// Academic year label.
    pub academic_year: String,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: seed::SCHOOL_NAME.to_string(),
            logo: None,
            branch: seed::SCHOOL_BRANCH.to_string(),
            academic_year: seed::ACADEMIC_YEAR.to_string(),
        }
    }
}

/// One named teaching technique with its three usage counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyUsage {
    /// Unique within the owning list.
    pub id: u32,
    /// Strategy name, may be blank.
    pub name: String,
    /// Lessons taught in the traditional style.
    pub traditional: u32,
    /// Lessons taught with active learning.
    pub active: u32,
    /// Lessons taught through research.
    pub research: u32,
    /// Free-text description.
    pub description: String,
}

impl StrategyUsage {
    /// A blank row with the given id.
    #[must_use]
    pub fn blank(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            traditional: 0,
            active: 0,
            research: 0,
            description: String::new(),
        }
    }

    /// Whether the name is empty after trimming.
    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Whether any of the three counters is non-zero.
    #[must_use]
    pub fn has_usage(&self) -> bool {
        self.traditional > 0 || self.active > 0 || self.research > 0
    }
}

/// A fixed-shape record of named counters.
///
/// Keys are the camelCase JSON field names; labels are what the views show.
pub trait CounterGroup {
    /// Field-path prefix of this group inside `FormData`.
    const PREFIX: &'static str;

    /// Section title.
    const TITLE: &'static str;

    /// `(key, label)` pairs in display order.
    const FIELDS: &'static [(&'static str, &'static str)];

    /// Read a counter by key.
    fn get(&self, key: &str) -> Option<u32>;

    /// Write a counter by key. Returns `false` for an unknown key.
    fn set(&mut self, key: &str, value: u32) -> bool;

    /// Labels and values in display order.
    fn entries(&self) -> Vec<(&'static str, u32)> {
        Self::FIELDS
            .iter()
            .map(|(key, label)| (*label, self.get(key).unwrap_or(0)))
            .collect()
    }

    /// Values in display order.
    fn values(&self) -> Vec<u32> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }
}

macro_rules! counter_group {
    (
        $(#[$meta:meta])*
        $name:ident, prefix = $prefix:literal, title = $title:literal {
            $($field:ident => $key:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                #[doc = $label]
                pub $field: u32,
            )+
        }

        impl CounterGroup for $name {
            const PREFIX: &'static str = $prefix;
            const TITLE: &'static str = $title;
            const FIELDS: &'static [(&'static str, &'static str)] = &[$(($key, $label)),+];

            fn get(&self, key: &str) -> Option<u32> {
                match key {
                    $($key => Some(self.$field),)+
                    _ => None,
                }
            }

            fn set(&mut self, key: &str, value: u32) -> bool {
                match key {
                    $($key => {
                        self.$field = value;
                        true
                    })+
                    _ => false,
                }
            }
        }
    };
}

counter_group! {
    /// Extracurricular activity counts.
    Extracurricular, prefix = "extracurricular", title = "الأنشطة اللاصفية" {
        trip => "trip", "رحلة";
        radio => "radio", "إذاعة";
        competition => "competition", "مسابقة";
        newspaper => "newspaper", "صحيفة";
        initiative => "initiative", "مبادرة";
        visit => "visit", "زيارة";
        research => "research", "بحث";
        other => "other", "أخرى";
    }
}

counter_group! {
    /// Resource-room usage counts.
    ResourceRooms, prefix = "resourceRooms", title = "غرف المصادر" {
        library => "library", "مكتبة";
        showroom => "showroom", "معرض";
        interactive_board => "interactiveBoard", "سبورة تفاعلية";
        science_lab => "scienceLab", "معمل علوم";
        other => "other", "أخرى";
    }
}

counter_group! {
    /// Dale's cone of experience, one counter per band.
    ExperienceCone, prefix = "experienceCone", title = "مخروط الخبرة لإدجار ديل" {
        verbal_symbols => "verbalSymbols", "الرموز اللفظية (كلمات ومحاضرات)";
        visual_symbols => "visualSymbols", "الرموز البصرية (صور وفيديوهات)";
        sensory_observation => "sensoryObservation", "الملاحظة الحسية (مشاهدات وعروض)";
        alternative_experiences => "alternativeExperiences", "الخبرات البديلة (نماذج وعينات)";
        direct_experiences => "directExperiences", "الخبرات المباشرة (تركيب وصيانة)";
    }
}

/// The teacher's form: general fields, strategy rows and the three sub-forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    /// Teacher's display name.
    pub teacher_name: String,
    /// One of [`seed::SEMESTERS`].
    pub semester: String,
    /// One of [`seed::grades`].
    pub grade: String,
    /// Member of the subject list at the time it was set.
    pub subject: String,
    /// Units covered this semester.
    pub units: u32,
    /// Lessons taught this semester.
    pub lessons: u32,
    /// Strategy rows in entry order.
    pub strategies: Vec<StrategyUsage>,
    /// Extracurricular counters.
    pub extracurricular: Extracurricular,
    /// Resource-room counters.
    pub resource_rooms: ResourceRooms,
    /// Experience-cone counters.
    pub experience_cone: ExperienceCone,
}

impl Default for FormData {
    fn default() -> Self {
        seed::form_data()
    }
}

impl FormData {
    /// Find a strategy row by id.
    #[must_use]
    pub fn strategy(&self, id: u32) -> Option<&StrategyUsage> {
        self.strategies.iter().find(|s| s.id == id)
    }

    /// Names of all rows that carry one.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .filter(|s| !s.is_unnamed())
            .map(|s| s.name.as_str())
            .collect()
    }
}
