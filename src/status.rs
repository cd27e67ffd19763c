//! The two verdict indicators shown after a check: Banker's safety and RAG deadlock.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SafetyStatus {
    Unknown,
    Pending,
    /// Carries the safe sequence as process indices, in execution order.
    Safe(Vec<usize>),
    Unsafe,
    Error(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeadlockStatus {
    Unknown,
    Pending,
    Detected,
    Clear,
    Error(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tone {
    Neutral,
    Ok,
    Bad,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Neutral => "pill",
            Tone::Ok => "pill pill-ok",
            Tone::Bad => "pill pill-bad",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Badge {
    pub text: &'static str,
    pub tone: Tone,
}

const UNKNOWN: Badge = Badge {
    text: "—",
    tone: Tone::Neutral,
};
const PENDING: Badge = Badge {
    text: "…",
    tone: Tone::Neutral,
};
const ERROR: Badge = Badge {
    text: "Error",
    tone: Tone::Bad,
};

impl SafetyStatus {
    pub fn badge(&self) -> Badge {
        match self {
            SafetyStatus::Unknown => UNKNOWN,
            SafetyStatus::Pending => PENDING,
            SafetyStatus::Safe(_) => Badge {
                text: "Safe",
                tone: Tone::Ok,
            },
            SafetyStatus::Unsafe => Badge {
                text: "Unsafe",
                tone: Tone::Bad,
            },
            SafetyStatus::Error(_) => ERROR,
        }
    }
}

impl DeadlockStatus {
    pub fn badge(&self) -> Badge {
        match self {
            DeadlockStatus::Unknown => UNKNOWN,
            DeadlockStatus::Pending => PENDING,
            DeadlockStatus::Detected => Badge {
                text: "Yes",
                tone: Tone::Bad,
            },
            DeadlockStatus::Clear => Badge {
                text: "No",
                tone: Tone::Ok,
            },
            DeadlockStatus::Error(_) => ERROR,
        }
    }
}

/// Indicator state plus the one-line explanation shown under the graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckStatus {
    pub safety: SafetyStatus,
    pub deadlock: DeadlockStatus,
}

impl Default for CheckStatus {
    fn default() -> Self {
        Self {
            safety: SafetyStatus::Unknown,
            deadlock: DeadlockStatus::Unknown,
        }
    }
}

impl CheckStatus {
    pub fn pending() -> Self {
        Self {
            safety: SafetyStatus::Pending,
            deadlock: DeadlockStatus::Pending,
        }
    }

    /// Both indicators in the error state, with the same message.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            safety: SafetyStatus::Error(message.clone()),
            deadlock: DeadlockStatus::Error(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.safety, SafetyStatus::Error(_))
            || matches!(self.deadlock, DeadlockStatus::Error(_))
    }

    pub fn summary(&self) -> String {
        match &self.safety {
            SafetyStatus::Unknown => String::new(),
            SafetyStatus::Pending => "Checking…".to_string(),
            SafetyStatus::Safe(seq) => format!("Safe sequence: {}.", format_sequence(seq)),
            SafetyStatus::Unsafe => "No safe sequence exists.".to_string(),
            SafetyStatus::Error(msg) => msg.clone(),
        }
    }
}

/// `P1 → P3 → P0`, or `—` for an empty sequence.
pub fn format_sequence(seq: &[usize]) -> String {
    if seq.is_empty() {
        return "—".to_string();
    }
    seq.iter()
        .map(|i| format!("P{}", i))
        .collect::<Vec<_>>()
        .join(" → ")
}
