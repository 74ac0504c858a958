//! The platforms courses are sold on.

/// A platform selection for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Sales from every platform.
    #[default]
    All,
    Teachable,
    Udemy,
}

impl Platform {
    /// The selectable platforms in display order.
    pub const ALL: [Platform; 3] = [Platform::All, Platform::Teachable, Platform::Udemy];

    /// Parse a display name, falling back to [Platform::All] for unknown names.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|platform| platform.name() == name)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::All => "All Platforms",
            Self::Teachable => "Teachable",
            Self::Udemy => "Udemy",
        }
    }

    pub fn includes_teachable(self) -> bool {
        matches!(self, Self::All | Self::Teachable)
    }

    pub fn includes_udemy(self) -> bool {
        matches!(self, Self::All | Self::Udemy)
    }
}
