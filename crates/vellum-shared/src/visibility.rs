//! Draft-visibility modes and their presentation metadata.

use serde::{Deserialize, Serialize};

/// Who can view a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftVisibility {
    /// Only the owner and explicitly added people.
    Restricted,
    /// Anyone in the organization with the link can view.
    Shareable,
}

impl DraftVisibility {
    /// Dropdown title, capitalized for display.
    pub fn title(&self) -> &'static str {
        match self {
            DraftVisibility::Restricted => "Restricted",
            DraftVisibility::Shareable => "Shareable",
        }
    }

    /// Dropdown description text.
    pub fn description(&self) -> &'static str {
        match self {
            DraftVisibility::Restricted => {
                "Only you and the people you add can view and edit this doc."
            }
            DraftVisibility::Shareable => {
                "Editing is restricted, but anyone in the organization with the link can view."
            }
        }
    }

    pub fn icon(&self) -> DraftVisibilityIcon {
        match self {
            DraftVisibility::Restricted => DraftVisibilityIcon::Restricted,
            DraftVisibility::Shareable => DraftVisibilityIcon::Shareable,
        }
    }
}

/// Icon shown in the visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftVisibilityIcon {
    Restricted,
    Shareable,
    /// Shown while the saved visibility is still being fetched.
    Loading,
}

impl DraftVisibilityIcon {
    /// Icon-set name used by the front end.
    pub fn name(&self) -> &'static str {
        match self {
            DraftVisibilityIcon::Restricted => "lock",
            DraftVisibilityIcon::Shareable => "enterprise",
            DraftVisibilityIcon::Loading => "loading",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_names() {
        assert_eq!(DraftVisibility::Restricted.icon().name(), "lock");
        assert_eq!(DraftVisibility::Shareable.icon().name(), "enterprise");
        assert_eq!(DraftVisibilityIcon::Loading.name(), "loading");
    }

    #[test]
    fn test_wire_casing() {
        assert_eq!(
            serde_json::to_string(&DraftVisibility::Shareable).unwrap(),
            "\"shareable\""
        );
    }
}
