//! Meal choice codes offered on the booking form.
//!
//! # Responsibility
//! - Map wire codes to a closed set of meal choices.
//! - Provide admin-facing labels for summary and manifest views.
//!
//! # Invariants
//! - Codes read back from storage never fail to parse; values this build does
//!   not know load as `MealChoice::Unknown` and label as their raw code.
//! - Only known codes are accepted for new bookings.

use serde::{Deserialize, Serialize};

/// Meal selected by a passenger.
///
/// The bento codes are the current menu. The remaining named variants are
/// the earlier dietary options; they are still accepted so older clients and
/// previously stored rows keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MealChoice {
    ShrimpAglioOlio,
    CreamyChickenPomodoro,
    CarbonaraFunghi,
    Standard,
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    /// Free-text dietary request; requires details on submission.
    Other,
    /// Stored code not recognized by this build.
    Unknown(String),
}

impl MealChoice {
    /// Parses a known code exactly as given. Returns `None` for anything else.
    pub fn parse_known(code: &str) -> Option<Self> {
        let choice = match code {
            "shrimp-aglio-olio" => Self::ShrimpAglioOlio,
            "creamy-chicken-pomodoro" => Self::CreamyChickenPomodoro,
            "carbonara-funghi" => Self::CarbonaraFunghi,
            "none" => Self::Standard,
            "vegetarian" => Self::Vegetarian,
            "vegan" => Self::Vegan,
            "gluten-free" => Self::GlutenFree,
            "dairy-free" => Self::DairyFree,
            "nut-free" => Self::NutFree,
            "other" => Self::Other,
            _ => return None,
        };
        Some(choice)
    }

    /// Stable wire/storage code.
    pub fn code(&self) -> &str {
        match self {
            Self::ShrimpAglioOlio => "shrimp-aglio-olio",
            Self::CreamyChickenPomodoro => "creamy-chicken-pomodoro",
            Self::CarbonaraFunghi => "carbonara-funghi",
            Self::Standard => "none",
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
            Self::GlutenFree => "gluten-free",
            Self::DairyFree => "dairy-free",
            Self::NutFree => "nut-free",
            Self::Other => "other",
            Self::Unknown(code) => code.as_str(),
        }
    }

    /// Human-readable label used by admin views and the manifest.
    pub fn label(&self) -> &str {
        match self {
            Self::ShrimpAglioOlio => "Shrimp Linguine Aglio Olio",
            Self::CreamyChickenPomodoro => "Creamy Chicken Pomodoro",
            Self::CarbonaraFunghi => "Carbonara al Funghi (V)",
            Self::Standard => "Standard Meal Service",
            Self::Vegetarian => "Vegetarian Meals (VGML)",
            Self::Vegan => "Vegan Meals (VEGN)",
            Self::GlutenFree => "Gluten-Free Meals (GFML)",
            Self::DairyFree => "Dairy-Free Meals (DFML)",
            Self::NutFree => "Nut-Free Meals (NFML)",
            Self::Other => "Special Dietary Requests",
            Self::Unknown(code) => code.as_str(),
        }
    }

    /// Whether a submission with this meal must carry free-text details.
    pub fn requires_details(&self) -> bool {
        matches!(self, Self::Other)
    }
}

impl From<String> for MealChoice {
    fn from(value: String) -> Self {
        match Self::parse_known(&value) {
            Some(choice) => choice,
            None => Self::Unknown(value),
        }
    }
}

impl From<MealChoice> for String {
    fn from(value: MealChoice) -> Self {
        match value {
            MealChoice::Unknown(code) => code,
            other => other.code().to_string(),
        }
    }
}
