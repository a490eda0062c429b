//! Identifier normalization.
//!
//! Callers address properties and pattern members in lower_snake form
//! (`is_read_only`); the accessibility provider names them in PascalCase
//! (`IsReadOnly`). Conversion is deterministic but not idempotent: run
//! [`to_native`] once, or go through [`native_name`] which leaves names that
//! are not in uniform style untouched.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Separator between a pattern group and a property in a qualified filter
/// name (`range_value__is_read_only`)
pub const GROUP_SEPARATOR: &str = "__";

/// Suffix of the base-group booleans that get a short alias
pub const PATTERN_AVAILABLE_SUFFIX: &str = "PatternAvailable";

fn uniform_style() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").expect("static pattern"))
}

fn word_boundaries() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // "HTMLElement" -> "HTML_Element"
            Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static pattern"),
            // "IsReadOnly" -> "Is_Read_Only"
            Regex::new(r"([a-z0-9])([A-Z])").expect("static pattern"),
        ]
    })
}

/// Whether `name` is already in lower_snake form.
#[must_use]
pub fn is_uniform_style(name: &str) -> bool {
    uniform_style().is_match(name)
}

/// Convert a lower_snake identifier to the provider's PascalCase.
///
/// Each `_`-separated word gets its first character upper-cased; the rest of
/// the word is kept as is. Empty words are dropped.
#[must_use]
pub fn to_native(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Convert a PascalCase provider identifier to lower_snake.
#[must_use]
pub fn to_uniform(name: &str) -> String {
    let [acronyms, words] = word_boundaries();
    let split = acronyms.replace_all(name, "${1}_${2}");
    let split = words.replace_all(&split, "${1}_${2}");
    split.to_lowercase()
}

/// Provider name for `name`, converting only when it is in uniform style.
#[must_use]
pub fn native_name(name: &str) -> Cow<'_, str> {
    if is_uniform_style(name) {
        Cow::Owned(to_native(name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Split `group__property` into its parts.
#[must_use]
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once(GROUP_SEPARATOR)
        .filter(|(group, property)| !group.is_empty() && !property.is_empty())
}

/// Short alias for an `<X>PatternAvailable` name, i.e. `<X>`.
#[must_use]
pub fn shortcut_alias(name: &str) -> Option<&str> {
    name.strip_suffix(PATTERN_AVAILABLE_SUFFIX)
        .filter(|alias| !alias.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod to_native_tests {
        use super::*;

        #[test]
        fn test_multi_word_names() {
            let cases = [
                ("is_read_only", "IsReadOnly"),
                ("automation_id", "AutomationId"),
                ("class_name", "ClassName"),
                ("window_visual_state", "WindowVisualState"),
                ("is_offscreen", "IsOffscreen"),
                ("name", "Name"),
                ("is_invoke_pattern_available", "IsInvokePatternAvailable"),
            ];
            for (input, expected) in cases {
                assert_eq!(to_native(input), expected, "input: {input}");
            }
        }

        #[test]
        fn test_digits_are_kept() {
            assert_eq!(to_native("item_1"), "Item1");
        }

        #[test]
        fn test_internal_casing_is_preserved() {
            assert_eq!(to_native("document_rangeValue"), "DocumentRangeValue");
        }

        #[test]
        fn test_empty_words_are_dropped() {
            assert_eq!(to_native("range_value__is_read_only"), "RangeValueIsReadOnly");
            assert_eq!(to_native(""), "");
        }
    }

    mod uniform_style_tests {
        use super::*;

        #[test]
        fn test_accepts_lower_snake() {
            assert!(is_uniform_style("name"));
            assert!(is_uniform_style("is_read_only"));
            assert!(is_uniform_style("item_1"));
        }

        #[test]
        fn test_rejects_other_styles() {
            assert!(!is_uniform_style("IsReadOnly"));
            assert!(!is_uniform_style("isReadOnly"));
            assert!(!is_uniform_style("_private"));
            assert!(!is_uniform_style("trailing_"));
            assert!(!is_uniform_style("double__under"));
            assert!(!is_uniform_style(""));
        }
    }

    mod to_uniform_tests {
        use super::*;

        #[test]
        fn test_pascal_case() {
            assert_eq!(to_uniform("IsReadOnly"), "is_read_only");
            assert_eq!(to_uniform("AutomationId"), "automation_id");
            assert_eq!(to_uniform("Name"), "name");
        }

        #[test]
        fn test_acronyms() {
            assert_eq!(to_uniform("HTMLElement"), "html_element");
            assert_eq!(to_uniform("IsUIAEnabled"), "is_uia_enabled");
        }

        #[test]
        fn test_round_trip_for_plain_words() {
            for native in ["IsKeyboardFocusable", "ClassName", "WindowVisualState"] {
                assert_eq!(to_native(&to_uniform(native)), native);
            }
        }
    }

    mod native_name_tests {
        use super::*;

        #[test]
        fn test_converts_uniform() {
            assert_eq!(native_name("help_text"), "HelpText");
        }

        #[test]
        fn test_passes_native_through() {
            assert!(matches!(native_name("HelpText"), Cow::Borrowed("HelpText")));
            assert_eq!(native_name("isReadOnly"), "isReadOnly");
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_split_qualified() {
            assert_eq!(
                split_qualified("range_value__is_read_only"),
                Some(("range_value", "is_read_only"))
            );
            assert_eq!(split_qualified("is_read_only"), None);
            assert_eq!(split_qualified("__name"), None);
        }

        #[test]
        fn test_shortcut_alias() {
            assert_eq!(shortcut_alias("IsWindowPatternAvailable"), Some("IsWindow"));
            assert_eq!(shortcut_alias("PatternAvailable"), None);
            assert_eq!(shortcut_alias("Name"), None);
        }
    }
}
