// Unicode predicates
// Character-level classification shared by the parser (property name
// resolution), the compiled class predicates and the executor (case
// folding, word boundaries).

use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_script::{Script, UnicodeScript};

use crate::ast::{CategoryGroup, PosixClass, PropertyKind, Shorthand};

/// Word characters for `\b` / `\w` purposes: alphanumerics plus `_`.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Single-character comparison under an optional simple case fold.
pub fn chars_eq(a: char, b: char, case_insensitive: bool) -> bool {
    if a == b {
        return true;
    }
    if !case_insensitive {
        return false;
    }
    a.to_lowercase().eq(b.to_lowercase())
}

pub fn shorthand_matches(kind: Shorthand, c: char) -> bool {
    match kind {
        Shorthand::Digit => c.is_ascii_digit(),
        Shorthand::NotDigit => !c.is_ascii_digit(),
        Shorthand::Word => is_word_char(c),
        Shorthand::NotWord => !is_word_char(c),
        Shorthand::Space => c.is_whitespace(),
        Shorthand::NotSpace => !c.is_whitespace(),
    }
}

pub fn posix_matches(class: PosixClass, c: char) -> bool {
    match class {
        PosixClass::Alnum => c.is_alphanumeric(),
        PosixClass::Alpha => c.is_alphabetic(),
        PosixClass::Blank => c == ' ' || c == '\t',
        PosixClass::Cntrl => c.is_control(),
        PosixClass::Digit => c.is_ascii_digit(),
        PosixClass::Graph => !c.is_whitespace() && !c.is_control(),
        PosixClass::Lower => c.is_lowercase(),
        PosixClass::Print => !c.is_control(),
        PosixClass::Punct => c.is_ascii_punctuation() || is_unicode_punct(c),
        PosixClass::Space => c.is_whitespace(),
        PosixClass::Upper => c.is_uppercase(),
        PosixClass::Word => is_word_char(c),
        PosixClass::Xdigit => c.is_ascii_hexdigit(),
    }
}

fn is_unicode_punct(c: char) -> bool {
    matches!(
        category_group(get_general_category(c)),
        CategoryGroup::Punctuation
    )
}

pub fn property_matches(kind: PropertyKind, c: char) -> bool {
    match kind {
        PropertyKind::Category(gc) => get_general_category(c) == gc,
        PropertyKind::CategoryGroup(group) => category_group(get_general_category(c)) == group,
        PropertyKind::Script(script) => c.script() == script,
        PropertyKind::Alphabetic => c.is_alphabetic(),
        PropertyKind::WhiteSpace => c.is_whitespace(),
        PropertyKind::Uppercase => c.is_uppercase(),
        PropertyKind::Lowercase => c.is_lowercase(),
    }
}

pub fn category_group(gc: GeneralCategory) -> CategoryGroup {
    use GeneralCategory::*;
    match gc {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter => {
            CategoryGroup::Letter
        }
        NonspacingMark | SpacingMark | EnclosingMark => CategoryGroup::Mark,
        DecimalNumber | LetterNumber | OtherNumber => CategoryGroup::Number,
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
        | InitialPunctuation | FinalPunctuation | OtherPunctuation => CategoryGroup::Punctuation,
        MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => CategoryGroup::Symbol,
        SpaceSeparator | LineSeparator | ParagraphSeparator => CategoryGroup::Separator,
        Control | Format | Surrogate | PrivateUse | Unassigned => CategoryGroup::Other,
    }
}

/// Resolve a `\p{...}` body to a property predicate. Accepts `Key=Value`
/// (script and general-category keys) and bare names (categories, groups,
/// a few boolean properties). Name matching ignores case, `_`, `-` and
/// spaces, per UAX#44 loose matching.
pub fn resolve_property(body: &str) -> Option<PropertyKind> {
    if let Some((key, value)) = body.split_once('=') {
        let key = normalize(key);
        let value_norm = normalize(value);
        return match key.as_str() {
            "script" | "sc" => lookup_script(value, &value_norm).map(PropertyKind::Script),
            "generalcategory" | "gc" => lookup_category(&value_norm),
            _ => None,
        };
    }
    let norm = normalize(body);
    match norm.as_str() {
        "alphabetic" | "alpha" => return Some(PropertyKind::Alphabetic),
        "whitespace" | "space" => return Some(PropertyKind::WhiteSpace),
        "uppercase" => return Some(PropertyKind::Uppercase),
        "lowercase" => return Some(PropertyKind::Lowercase),
        _ => {}
    }
    if let Some(kind) = lookup_category(&norm) {
        return Some(kind);
    }
    // Bare script names are accepted too, like most engines do.
    lookup_script(body, &norm).map(PropertyKind::Script)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn lookup_script(raw: &str, norm: &str) -> Option<Script> {
    let found = Script::from_full_name(raw)
        .or_else(|| Script::from_short_name(raw))
        .or_else(|| {
            // Loose fallback: title-case the normalized name and retry, so
            // `\p{script=latin}` resolves like `\p{Script=Latin}`.
            let mut titled = String::with_capacity(norm.len());
            let mut chars = norm.chars();
            if let Some(first) = chars.next() {
                titled.push(first.to_ascii_uppercase());
                titled.extend(chars);
            }
            Script::from_full_name(&titled).or_else(|| Script::from_short_name(&titled))
        })?;
    // `Zzzz` resolves, but an explicitly-unknown script is treated as an
    // unknown property name and rejected at parse time.
    if found == Script::Unknown { None } else { Some(found) }
}

fn lookup_category(norm: &str) -> Option<PropertyKind> {
    use GeneralCategory::*;
    let group = |g| Some(PropertyKind::CategoryGroup(g));
    let cat = |c| Some(PropertyKind::Category(c));
    match norm {
        "l" | "letter" => group(CategoryGroup::Letter),
        "m" | "mark" => group(CategoryGroup::Mark),
        "n" | "number" => group(CategoryGroup::Number),
        "p" | "punctuation" => group(CategoryGroup::Punctuation),
        "s" | "symbol" => group(CategoryGroup::Symbol),
        "z" | "separator" => group(CategoryGroup::Separator),
        "c" | "other" => group(CategoryGroup::Other),
        "lu" | "uppercaseletter" => cat(UppercaseLetter),
        "ll" | "lowercaseletter" => cat(LowercaseLetter),
        "lt" | "titlecaseletter" => cat(TitlecaseLetter),
        "lm" | "modifierletter" => cat(ModifierLetter),
        "lo" | "otherletter" => cat(OtherLetter),
        "mn" | "nonspacingmark" => cat(NonspacingMark),
        "mc" | "spacingmark" => cat(SpacingMark),
        "me" | "enclosingmark" => cat(EnclosingMark),
        "nd" | "decimalnumber" | "digit" => cat(DecimalNumber),
        "nl" | "letternumber" => cat(LetterNumber),
        "no" | "othernumber" => cat(OtherNumber),
        "pc" | "connectorpunctuation" => cat(ConnectorPunctuation),
        "pd" | "dashpunctuation" => cat(DashPunctuation),
        "ps" | "openpunctuation" => cat(OpenPunctuation),
        "pe" | "closepunctuation" => cat(ClosePunctuation),
        "pi" | "initialpunctuation" => cat(InitialPunctuation),
        "pf" | "finalpunctuation" => cat(FinalPunctuation),
        "po" | "otherpunctuation" => cat(OtherPunctuation),
        "sm" | "mathsymbol" => cat(MathSymbol),
        "sc" | "currencysymbol" => cat(CurrencySymbol),
        "sk" | "modifiersymbol" => cat(ModifierSymbol),
        "so" | "othersymbol" => cat(OtherSymbol),
        "zs" | "spaceseparator" => cat(SpaceSeparator),
        "zl" | "lineseparator" => cat(LineSeparator),
        "zp" | "paragraphseparator" => cat(ParagraphSeparator),
        "cc" | "control" => cat(Control),
        "cf" | "format" => cat(Format),
        "cs" | "surrogate" => cat(Surrogate),
        "co" | "privateuse" => cat(PrivateUse),
        "cn" | "unassigned" => cat(Unassigned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_resolution() {
        assert_eq!(
            resolve_property("Script=Latin"),
            Some(PropertyKind::Script(Script::Latin))
        );
        assert_eq!(
            resolve_property("script=latin"),
            Some(PropertyKind::Script(Script::Latin))
        );
        assert_eq!(
            resolve_property("Lu"),
            Some(PropertyKind::Category(GeneralCategory::UppercaseLetter))
        );
        assert_eq!(
            resolve_property("L"),
            Some(PropertyKind::CategoryGroup(CategoryGroup::Letter))
        );
        assert_eq!(resolve_property("script=zzzz"), None);
        assert_eq!(resolve_property("NoSuchThing"), None);
    }

    #[test]
    fn script_predicate() {
        assert!(property_matches(PropertyKind::Script(Script::Latin), 'a'));
        assert!(!property_matches(PropertyKind::Script(Script::Latin), 'α'));
        assert!(property_matches(PropertyKind::Script(Script::Greek), 'α'));
    }

    #[test]
    fn case_fold_eq() {
        assert!(chars_eq('a', 'A', true));
        assert!(chars_eq('Ä', 'ä', true));
        assert!(!chars_eq('a', 'A', false));
        assert!(!chars_eq('a', 'b', true));
    }
}
