use std::fmt;
use std::str::FromStr;

/// Service tier forwarded to the analysis service in the `x-plan` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Plan {
    #[default]
    Basic,
    Plus,
    Pro,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Plus, Plan::Pro];

    /// Wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Plus => "plus",
            Plan::Pro => "pro",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Plan::Basic => "Starter",
            Plan::Plus => "Creator",
            Plan::Pro => "Enterprise",
        }
    }

    /// Transcription model the service runs for this tier.
    pub fn model_name(self) -> &'static str {
        match self {
            Plan::Basic => "tiny",
            Plan::Plus => "medium",
            Plan::Pro => "turbo",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanParseError(pub String);

impl fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown plan '{}' (expected basic, plus or pro)", self.0)
    }
}

impl std::error::Error for PlanParseError {}

impl FromStr for Plan {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Plan::ALL
            .into_iter()
            .find(|plan| plan.id().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PlanParseError(s.to_string()))
    }
}
