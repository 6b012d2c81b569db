//! The pattern: a compiled, immutable shaping plan for one script/language.
//!
//! A pattern names, per phase, an ordered list of feature units; each unit
//! carries the feature-mask bit it gates and the lookup indices (into the
//! font's GSUB or GPOS lookup list) it applies, in application order.
//!
//! Compilation here takes a simplifying one-feature-per-unit approach: each
//! requested feature tag becomes its own feature unit rather than grouping
//! several simultaneously-applicable features into one unit. This is a
//! deliberate scope reduction (feature unit *grouping* policy is a shaping
//! engine decision that sits above this core) and is recorded as such.

use font_types::Tag;

use font_tables::tables::layout::{FeatureList, ScriptList};

use crate::font::Direction;

/// A set of features applied together in one pass, gated by a feature mask
/// bit.
#[derive(Clone, Debug)]
pub struct FeatureUnit {
    pub tag: Tag,
    pub mask: u16,
    pub lookup_indices: Vec<u16>,
}

impl FeatureUnit {
    pub fn new(tag: Tag, mask: u16, lookup_indices: Vec<u16>) -> Self {
        FeatureUnit {
            tag,
            mask,
            lookup_indices,
        }
    }
}

/// A compiled shaping plan: script/language selection plus the ordered
/// feature units for the substitution and positioning phases.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub script: Tag,
    pub language: Tag,
    pub direction: Direction,
    pub substitution_units: Vec<FeatureUnit>,
    pub positioning_units: Vec<FeatureUnit>,
}

impl Pattern {
    pub fn new(script: Tag, language: Tag, direction: Direction) -> Self {
        Pattern {
            script,
            language,
            direction,
            substitution_units: Vec::new(),
            positioning_units: Vec::new(),
        }
    }

    pub fn push_substitution_unit(&mut self, unit: FeatureUnit) {
        self.substitution_units.push(unit);
    }

    pub fn push_positioning_unit(&mut self, unit: FeatureUnit) {
        self.positioning_units.push(unit);
    }
}

/// Resolves one table's (GSUB's or GPOS's) active feature units for a
/// script/language pair, in requested order.
///
/// `requested` names, in application order, the feature tags a unit should
/// gate on and the mask bit each claims; a feature absent from the active
/// `LangSys` (or whose table has no script/feature list at all) simply
/// contributes no unit rather than failing the whole compilation.
pub fn compile_feature_units<'a>(
    script_list: Option<ScriptList<'a>>,
    feature_list: Option<FeatureList<'a>>,
    script: Tag,
    language: Tag,
    requested: &[(Tag, u16)],
) -> Vec<FeatureUnit> {
    let mut units = Vec::new();
    let (Some(script_list), Some(feature_list)) = (script_list, feature_list) else {
        return units;
    };
    let Some(lang_sys) = script_list.find_script(script).and_then(|s| s.find_lang_sys(language)) else {
        return units;
    };
    let active_indices: Vec<u16> = lang_sys
        .required_feature_index()
        .into_iter()
        .chain(lang_sys.feature_indices().iter())
        .collect();
    for &(tag, mask) in requested {
        let mut lookup_indices = Vec::new();
        for &feature_index in &active_indices {
            if let Some(feature) = feature_list.get(feature_index) {
                if feature.feature_tag == tag {
                    lookup_indices.extend(feature.lookup_list_indices().iter());
                }
            }
        }
        if !lookup_indices.is_empty() {
            units.push(FeatureUnit::new(tag, mask, lookup_indices));
        }
    }
    units
}

/// Resolves a requested script tag against a font's `ScriptList`, falling
/// back to `DFLT` when the font does not recognize it.
pub fn resolve_script_tag(requested: Tag, available: &[Tag]) -> Tag {
    if available.contains(&requested) {
        requested
    } else {
        font_types::DFLT_SCRIPT
    }
}

/// Resolves a requested language tag against a script's `LangSysRecord`s,
/// falling back to `dflt`.
pub fn resolve_language_tag(requested: Tag, available: &[Tag]) -> Tag {
    if available.contains(&requested) {
        requested
    } else {
        font_types::DFLT_LANG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_script_falls_back_to_dflt() {
        let available = vec![Tag::new(b"latn"), Tag::new(b"cyrl")];
        assert_eq!(
            resolve_script_tag(Tag::new(b"arab"), &available),
            font_types::DFLT_SCRIPT
        );
        assert_eq!(resolve_script_tag(Tag::new(b"latn"), &available), Tag::new(b"latn"));
    }
}
