//! Classifier: assigns a row to at most one analytics category
//!
//! Categories are tried in table order and only through the rules declared
//! for the row's own kind, so a crop row is never tested against Rice or
//! Livestock.

use crate::category::{Category, MembershipRule, CATEGORIES};
use crate::model::Record;

/// First category (in evaluation order) the record belongs to
pub fn classify(record: &Record) -> Option<Category> {
    CATEGORIES
        .iter()
        .find(|def| {
            def.rule_for(record.kind())
                .is_some_and(|rule| rule_matches(record, rule))
        })
        .map(|def| def.id)
}

/// Whether `record` is aggregated into `category`
pub fn matches(record: &Record, category: Category) -> bool {
    classify(record) == Some(category)
}

fn rule_matches(record: &Record, rule: MembershipRule) -> bool {
    match rule {
        MembershipRule::ExternalSource => true,
        MembershipRule::Keywords { exact, keywords } => {
            crop_fields(record).into_iter().flatten().any(|field| {
                let field = field.trim().to_lowercase();
                !field.is_empty()
                    && (exact.is_some_and(|e| field == e)
                        || keywords.iter().any(|k| field.contains(k)))
            })
        }
        MembershipRule::TypeTag(tag) => {
            crop_fields(record)[0].is_some_and(|t| t.trim().eq_ignore_ascii_case(tag))
        }
    }
}

/// `[crop_type, crop_value]` of crop-shaped rows
fn crop_fields(record: &Record) -> [Option<&str>; 2] {
    match record {
        Record::Crop(r) | Record::HighValueCrop(r) => {
            [r.crop_type.as_deref(), r.crop_value.as_deref()]
        }
        _ => [None, None],
    }
}
