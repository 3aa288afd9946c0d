use std::fmt;

/// UI steps in their fixed canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepId {
    Conversion,
    Main,
    Instrument,
    Tooling,
    Services,
    SpareParts,
}

impl StepId {
    pub const ALL: [StepId; 6] = [
        StepId::Conversion,
        StepId::Main,
        StepId::Instrument,
        StepId::Tooling,
        StepId::Services,
        StepId::SpareParts,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conversion => "conversion",
            Self::Main => "main",
            Self::Instrument => "instrument",
            Self::Tooling => "tooling",
            Self::Services => "services",
            Self::SpareParts => "spare_parts",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Conversion => "Converting document",
            Self::Main => "Technical characteristics",
            Self::Instrument => "Instrument",
            Self::Tooling => "Tooling",
            Self::Services => "Services",
            Self::SpareParts => "Spare parts",
        }
    }

    /// Scenario prompt that enables this step; `None` for steps that always run.
    pub fn prompt_key(self) -> Option<&'static str> {
        match self {
            Self::Conversion => None,
            other => Some(other.as_str()),
        }
    }

    /// Maps a server-reported stage name to a step. Unknown stages map to nothing.
    pub fn from_stage(stage: &str) -> Option<Self> {
        match stage.trim() {
            "file_upload" | "conversion" => Some(Self::Conversion),
            "main_prompt" => Some(Self::Main),
            "instrument_prompt" => Some(Self::Instrument),
            "tooling_prompt" => Some(Self::Tooling),
            "services_prompt" => Some(Self::Services),
            "spare_parts_prompt" => Some(Self::SpareParts),
            _ => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_lookup_table() {
        assert_eq!(StepId::from_stage("conversion"), Some(StepId::Conversion));
        assert_eq!(StepId::from_stage("file_upload"), Some(StepId::Conversion));
        assert_eq!(StepId::from_stage("main_prompt"), Some(StepId::Main));
        assert_eq!(
            StepId::from_stage("spare_parts_prompt"),
            Some(StepId::SpareParts)
        );
        assert_eq!(StepId::from_stage("initialization"), None);
        assert_eq!(StepId::from_stage("ai_processing"), None);
    }

    #[test]
    fn canonical_order_matches_index() {
        for (i, step) in StepId::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }
}
