//! Label normalizer
//!
//! Folds free-text variety/species labels onto canonical names. Matching is
//! case-insensitive substring search over a per-category rule list; the
//! first matching rule wins.

use crate::category::Category;

/// Output of a matching rule
#[derive(Debug, Clone, Copy)]
enum Canonical {
    Fixed(&'static str),
    /// Upper-case the input verbatim (rice line codes such as `Rc 160`)
    Uppercase,
}

#[derive(Debug, Clone, Copy)]
struct LabelRule {
    needles: &'static [&'static str],
    canonical: Canonical,
}

const RICE_RULES: &[LabelRule] = &[
    LabelRule {
        needles: &["dinorado"],
        canonical: Canonical::Fixed("Dinorado"),
    },
    LabelRule {
        needles: &["jasmine"],
        canonical: Canonical::Fixed("Jasmine Rice"),
    },
    LabelRule {
        needles: &["sinandomeng"],
        canonical: Canonical::Fixed("Sinandomeng"),
    },
    LabelRule {
        needles: &["rc"],
        canonical: Canonical::Uppercase,
    },
];

const FISH_RULES: &[LabelRule] = &[
    LabelRule {
        needles: &["tilapia"],
        canonical: Canonical::Fixed("Tilapia"),
    },
    LabelRule {
        needles: &["milkfish", "bangus"],
        canonical: Canonical::Fixed("Milkfish/Bangus"),
    },
    LabelRule {
        needles: &["catfish", "hito"],
        canonical: Canonical::Fixed("Catfish/Hito"),
    },
];

const LIVESTOCK_RULES: &[LabelRule] = &[
    LabelRule {
        needles: &["chicken", "manok"],
        canonical: Canonical::Fixed("Chicken"),
    },
    LabelRule {
        needles: &["pigeon", "kalapati"],
        canonical: Canonical::Fixed("Pigeon"),
    },
    LabelRule {
        needles: &["swine", "hog", "pig", "baboy"],
        canonical: Canonical::Fixed("Swine"),
    },
    LabelRule {
        needles: &["carabao", "kalabaw"],
        canonical: Canonical::Fixed("Carabao"),
    },
    LabelRule {
        needles: &["cattle", "cow", "baka"],
        canonical: Canonical::Fixed("Cattle"),
    },
    LabelRule {
        needles: &["goat", "kambing"],
        canonical: Canonical::Fixed("Goat"),
    },
    LabelRule {
        needles: &["duck", "pato", "itik"],
        canonical: Canonical::Fixed("Duck"),
    },
];

fn rules_for(category: Category) -> &'static [LabelRule] {
    match category {
        Category::Rice => RICE_RULES,
        Category::Fish => FISH_RULES,
        Category::Livestock => LIVESTOCK_RULES,
        _ => &[],
    }
}

fn apply_rules(category: Category, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    rules_for(category)
        .iter()
        .find(|rule| rule.needles.iter().any(|n| lower.contains(n)))
        .map(|rule| match rule.canonical {
            Canonical::Fixed(name) => name.to_string(),
            Canonical::Uppercase => trimmed.to_uppercase(),
        })
}

/// Canonical label for `raw` within `category`
///
/// Labels matching no rule pass through verbatim (trimmed).
pub fn normalize(category: Category, raw: &str) -> String {
    apply_rules(category, raw).unwrap_or_else(|| raw.trim().to_string())
}

/// Aggregation key and display name for `raw` within `category`
///
/// Rule matches keep their canonical casing. Everything else is title-cased
/// with whitespace collapsed, so `"mung bean"` and `"Mung  Bean"` land on
/// the same key regardless of which row is seen first.
pub fn aggregation_label(category: Category, raw: &str) -> String {
    apply_rules(category, raw).unwrap_or_else(|| title_case(raw))
}

/// Title-case each whitespace-separated word
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rice_varieties() {
        assert_eq!(normalize(Category::Rice, "Dinorado Premium"), "Dinorado");
        assert_eq!(normalize(Category::Rice, "jasmine"), "Jasmine Rice");
        assert_eq!(normalize(Category::Rice, "SINANDOMENG"), "Sinandomeng");
        assert_eq!(normalize(Category::Rice, " nsic Rc 222 "), "NSIC RC 222");
        assert_eq!(normalize(Category::Rice, "RC160"), "RC160");
    }

    #[test]
    fn test_rice_rule_priority() {
        // "jasmine" is checked before the "rc" line-code rule
        assert_eq!(normalize(Category::Rice, "Jasmine RC"), "Jasmine Rice");
    }

    #[test]
    fn test_fish_species() {
        assert_eq!(normalize(Category::Fish, "Nile tilapia"), "Tilapia");
        assert_eq!(normalize(Category::Fish, "Bangus"), "Milkfish/Bangus");
        assert_eq!(normalize(Category::Fish, "milkfish"), "Milkfish/Bangus");
        assert_eq!(normalize(Category::Fish, "Hito"), "Catfish/Hito");
    }

    #[test]
    fn test_unmatched_passes_through_trimmed() {
        assert_eq!(normalize(Category::Fish, "  Mudcrab "), "Mudcrab");
        assert_eq!(normalize(Category::Legumes, "mung bean"), "mung bean");
    }

    #[test]
    fn test_aggregation_label_folds_case() {
        assert_eq!(aggregation_label(Category::Legumes, "Mung Bean"), "Mung Bean");
        assert_eq!(aggregation_label(Category::Legumes, "mung bean"), "Mung Bean");
        assert_eq!(aggregation_label(Category::Legumes, " MUNG   bean "), "Mung Bean");
        // Rule output keeps its own casing
        assert_eq!(aggregation_label(Category::Rice, "rc160"), "RC160");
    }
}
