//! Analytics category table
//!
//! Each category is one entry of [`CATEGORIES`]: display name, unit, and the
//! record kinds it draws from together with the membership rule applied to
//! rows of that kind. Adding a category is a change to this table only.

use crate::model::RecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `crop_type` tag set by data entry on high-value crop rows
pub const HIGH_VALUE_CROPS_TAG: &str = "High Value Crops";

/// Analytics grouping, independent of record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Livestock,
    Rice,
    Banana,
    Legumes,
    Spices,
    Fish,
    HighValueCrops,
}

/// How a row of a given source kind is tested for membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRule {
    /// Every row of the source kind belongs
    ExternalSource,
    /// `crop_type` or `crop_value` (lower-cased) equals `exact`, or contains
    /// any of `keywords`
    Keywords {
        exact: Option<&'static str>,
        keywords: &'static [&'static str],
    },
    /// `crop_type` equals the tag
    TypeTag(&'static str),
}

/// One (source kind, rule) pair of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRule {
    pub kind: RecordKind,
    pub rule: MembershipRule,
}

/// Static description of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub id: Category,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub sources: &'static [SourceRule],
}

impl CategoryDefinition {
    /// Rule applied to rows of `kind`, if this category reads that kind
    pub fn rule_for(&self, kind: RecordKind) -> Option<MembershipRule> {
        self.sources.iter().find(|s| s.kind == kind).map(|s| s.rule)
    }
}

const BANANA_KEYWORDS: &[&str] = &[
    "banana", "saging", "lakatan", "latundan", "cardava", "saba", "cavendish",
];

const LEGUME_KEYWORDS: &[&str] = &[
    "legume", "mung", "mongo", "monggo", "peanut", "bean", "cowpea", "soy", "sitaw",
];

const SPICE_KEYWORDS: &[&str] = &[
    "spice", "ginger", "luya", "chili", "sili", "garlic", "bawang", "onion", "sibuyas",
    "pepper", "turmeric", "luyang dilaw", "lemongrass", "tanglad",
];

const FISH_KEYWORDS: &[&str] = &[
    "fish", "tilapia", "bangus", "milkfish", "hito", "carp", "shrimp", "prawn", "hipon",
];

/// Category table in evaluation order
pub static CATEGORIES: [CategoryDefinition; 7] = [
    CategoryDefinition {
        id: Category::Livestock,
        display_name: "Livestock & Poultry",
        unit: "heads",
        sources: &[SourceRule {
            kind: RecordKind::Livestock,
            rule: MembershipRule::ExternalSource,
        }],
    },
    CategoryDefinition {
        id: Category::Rice,
        display_name: "Rice",
        unit: "kg",
        sources: &[SourceRule {
            kind: RecordKind::Rice,
            rule: MembershipRule::ExternalSource,
        }],
    },
    CategoryDefinition {
        id: Category::Banana,
        display_name: "Banana",
        unit: "kg",
        sources: &[SourceRule {
            kind: RecordKind::Crop,
            rule: MembershipRule::Keywords {
                exact: None,
                keywords: BANANA_KEYWORDS,
            },
        }],
    },
    CategoryDefinition {
        id: Category::Legumes,
        display_name: "Legumes",
        unit: "kg",
        sources: &[SourceRule {
            kind: RecordKind::Crop,
            rule: MembershipRule::Keywords {
                exact: Some("legumes"),
                keywords: LEGUME_KEYWORDS,
            },
        }],
    },
    CategoryDefinition {
        id: Category::Spices,
        display_name: "Spices",
        unit: "kg",
        sources: &[SourceRule {
            kind: RecordKind::Crop,
            rule: MembershipRule::Keywords {
                exact: Some("spices"),
                keywords: SPICE_KEYWORDS,
            },
        }],
    },
    CategoryDefinition {
        id: Category::Fish,
        display_name: "Fish",
        unit: "kg",
        sources: &[
            SourceRule {
                kind: RecordKind::Crop,
                rule: MembershipRule::Keywords {
                    exact: None,
                    keywords: FISH_KEYWORDS,
                },
            },
            SourceRule {
                kind: RecordKind::Operator,
                rule: MembershipRule::ExternalSource,
            },
        ],
    },
    CategoryDefinition {
        id: Category::HighValueCrops,
        display_name: "High Value Crops",
        unit: "kg",
        sources: &[SourceRule {
            kind: RecordKind::HighValueCrop,
            rule: MembershipRule::TypeTag(HIGH_VALUE_CROPS_TAG),
        }],
    },
];

impl Category {
    /// All categories in evaluation order
    pub const ALL: [Category; 7] = [
        Category::Livestock,
        Category::Rice,
        Category::Banana,
        Category::Legumes,
        Category::Spices,
        Category::Fish,
        Category::HighValueCrops,
    ];

    pub fn definition(self) -> &'static CategoryDefinition {
        // CATEGORIES is laid out in declaration order
        &CATEGORIES[self as usize]
    }

    pub fn display_name(self) -> &'static str {
        self.definition().display_name
    }

    pub fn unit(self) -> &'static str {
        self.definition().unit
    }

    pub fn id_str(self) -> &'static str {
        match self {
            Category::Livestock => "livestock",
            Category::Rice => "rice",
            Category::Banana => "banana",
            Category::Legumes => "legumes",
            Category::Spices => "spices",
            Category::Fish => "fish",
            Category::HighValueCrops => "high_value_crops",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .into_iter()
            .find(|c| c.id_str() == normalized)
            .or(match normalized.as_str() {
                "hvc" => Some(Category::HighValueCrops),
                "poultry" => Some(Category::Livestock),
                _ => None,
            })
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Whether a crop row carries the high-value tag
///
/// The same test splits the farmers' nested crops into the crop and
/// high-value-crop kinds, so the two are always complementary.
pub fn is_high_value_tag(crop_type: Option<&str>) -> bool {
    crop_type
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case(HIGH_VALUE_CROPS_TAG))
}
