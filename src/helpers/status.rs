use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Neutral,
        Tone::Info,
        Tone::Success,
        Tone::Warning,
        Tone::Danger,
    ];
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Tone::Neutral => "neutral",
            Tone::Info => "info",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMeta {
    pub label: String,
    pub tone: Tone,
}

/// Every status code the backend emits for applications and loans.
pub const STATUS_TABLE: [(&str, &str, Tone); 10] = [
    ("DRAFT", "Черновик", Tone::Neutral),
    ("SUBMITTED", "Отправлено", Tone::Info),
    ("PENDING", "На рассмотрении", Tone::Warning),
    ("UNDER_REVIEW", "На проверке", Tone::Warning),
    ("PARTIALLY_APPROVED", "Частично одобрено", Tone::Info),
    ("APPROVED", "Одобрено", Tone::Success),
    ("REJECTED", "Отклонено", Tone::Danger),
    ("CANCELLED", "Отменено", Tone::Neutral),
    ("ACTIVE", "Активно", Tone::Info),
    ("COMPLETED", "Завершено", Tone::Success),
];

const UNKNOWN_LABEL: &str = "Неизвестно";

/// Canonical form of a status code: trimmed, upper-cased, with spaces and
/// dashes folded into underscores. Applying it twice changes nothing.
pub fn normalize_status_code(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c,
        })
        .collect::<String>()
        .to_uppercase()
}

/// Maps a status code of any casing to its label and tone. Codes outside
/// [`STATUS_TABLE`] render as the upper-cased code in a neutral tone.
pub fn map_status(code: &str) -> StatusMeta {
    let normalized = normalize_status_code(code);

    if normalized.is_empty() {
        return StatusMeta {
            label: String::from(UNKNOWN_LABEL),
            tone: Tone::Neutral,
        };
    }

    match STATUS_TABLE.iter().find(|(key, _, _)| *key == normalized) {
        Some((_, label, tone)) => StatusMeta {
            label: (*label).to_owned(),
            tone: *tone,
        },
        None => StatusMeta {
            label: code.trim().to_uppercase(),
            tone: Tone::Neutral,
        },
    }
}

pub fn is_known_status(code: &str) -> bool {
    let normalized = normalize_status_code(code);
    STATUS_TABLE.iter().any(|(key, _, _)| *key == normalized)
}
