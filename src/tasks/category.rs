use serde::Serialize;

/// Cosmetic tag derived from a task title. Never stored.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    Design,
    Development,
    Marketing,
    Infra,
    General,
}

// Checked in order, first match wins.
const RULES: [(&[&str], TaskCategory); 4] = [
    (&["design"], TaskCategory::Design),
    (&["develop", "code"], TaskCategory::Development),
    (&["market"], TaskCategory::Marketing),
    (&["setup", "infra"], TaskCategory::Infra),
];

impl TaskCategory {
    pub fn from_title(title: &str) -> TaskCategory {
        let title = title.to_lowercase();

        RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
            .map(|(_, category)| *category)
            .unwrap_or(TaskCategory::General)
    }
}
