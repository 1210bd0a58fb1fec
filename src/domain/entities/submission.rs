use std::fmt;

/// Which intake form a submission came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    Reservation,
}

impl FormKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FormKind::Contact => "/api/contact",
            FormKind::Reservation => "/api/reservation",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            FormKind::Contact => {
                "Ďakujeme za vašu správu! Email bol úspešne odoslaný a ozveme sa vám čo najskôr."
            }
            FormKind::Reservation => {
                "Ďakujeme! Vaša rezervácia bola odoslaná. Čoskoro vás budeme kontaktovať s potvrdením a cenovou ponukou."
            }
        }
    }

    pub fn delivery_failed_message(&self) -> &'static str {
        match self {
            FormKind::Contact => "Nastala chyba pri odosielaní emailu.",
            FormKind::Reservation => "Nastala chyba pri odosielaní rezervácie.",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::Contact => write!(f, "contact"),
            FormKind::Reservation => write!(f, "reservation"),
        }
    }
}

/// Everything the anti-spam heuristics look at, lifted out of a submission.
#[derive(Debug, Clone, Default)]
pub struct SpamSignals {
    pub email: String,
    pub message: String,
    pub subject: String,
    /// Hidden `website` field.
    pub honeypot: String,
    /// Raw `startedAt` echo, epoch milliseconds captured at form render.
    pub started_at: String,
}

/// Trimmed copy, `None` when nothing is left.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Only the literal `"true"` switches a checkbox on.
pub fn is_checked(value: &str) -> bool {
    value.trim() == "true"
}
