//! Identifier case conversion and English inflection.
//!
//! These back both the template helper surface (`camelCase`, `pluralize`, …)
//! and the derived `project.names` block of the generation context.

// ============================================================================
// Case Conversion
// ============================================================================

/// `billing-api` → `billingApi`
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in split_words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize_first(word));
        }
    }
    out
}

/// `billing-api` → `BillingApi`
pub fn pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize_first(w)).collect()
}

/// `BillingApi` → `billing-api`
pub fn kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// `BillingApi` → `billing_api`
pub fn snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `billingApi` → `BILLING_API`
pub fn constant_case(s: &str) -> String {
    snake_case(s).to_uppercase()
}

/// `billingApi` → `billing.api`
pub fn dot_case(s: &str) -> String {
    split_words(s).join(".")
}

/// `billingApi` → `billing/api`
pub fn path_case(s: &str) -> String {
    split_words(s).join("/")
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// `hello big world` → `Hello Big World`
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let lower = w.to_lowercase();
            capitalize_first(&lower)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a string into lower-cased words.
///
/// ## Word Boundary Detection
///
/// 1. **Explicit separators:** `_`, `-`, `.`, `/`, whitespace → always split
/// 2. **Case transition:** `aB` or `2B` → split before `B`
/// 3. **Acronym boundary:** `HTTPServer` → split between `P` and `S`
///    (detected by `Upper Upper Lower`)
///
/// Digits stay attached to the word they follow: `oauth2Client` → `oauth2`, `client`.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if is_separator(c) {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | '.' | '/') || c.is_whitespace()
}

// ============================================================================
// Inflection
// ============================================================================

const UNCOUNTABLE: &[&str] = &[
    "sheep",
    "fish",
    "series",
    "species",
    "data",
    "information",
    "equipment",
    "news",
    "metadata",
    "feedback",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("leaf", "leaves"),
    ("index", "indices"),
];

/// `user` → `users`, `category` → `categories`, `person` → `people`.
///
/// Only the trailing word of an identifier is inflected, so `adminUser`
/// becomes `adminUsers`. The case of the input is preserved.
pub fn pluralize(word: &str) -> String {
    inflect(word, Direction::Plural)
}

/// `users` → `user`, `categories` → `category`, `people` → `person`.
pub fn singularize(word: &str) -> String {
    inflect(word, Direction::Singular)
}

#[derive(Clone, Copy)]
enum Direction {
    Plural,
    Singular,
}

fn inflect(word: &str, direction: Direction) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();

    if UNCOUNTABLE.iter().any(|u| ends_with_word(word, &lower, u)) {
        return word.to_string();
    }

    for (singular, plural) in IRREGULAR {
        let (from, to) = match direction {
            Direction::Plural => (*singular, *plural),
            Direction::Singular => (*plural, *singular),
        };
        if ends_with_word(word, &lower, from) {
            return replace_suffix(word, from.len(), to);
        }
        // Already in the target form.
        if ends_with_word(word, &lower, to) {
            return word.to_string();
        }
    }

    let (strip, suffix) = match direction {
        Direction::Plural => plural_rule(&lower),
        Direction::Singular => singular_rule(&lower),
    };
    replace_suffix(word, strip, suffix)
}

/// Returns (number of trailing chars to strip, suffix to append).
fn plural_rule(lower: &str) -> (usize, &'static str) {
    if lower.ends_with("is") {
        (2, "es")
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|e| lower.ends_with(e)) {
        (0, "es")
    } else if ends_with_consonant_y(lower) {
        (1, "ies")
    } else if lower.ends_with("lf") {
        (1, "ves")
    } else {
        (0, "s")
    }
}

fn singular_rule(lower: &str) -> (usize, &'static str) {
    if lower.ends_with("ss") || (lower.ends_with("us") && !lower.ends_with("uses")) {
        (0, "")
    } else if lower.ends_with("ies") && lower.len() > 3 {
        (3, "y")
    } else if lower.ends_with("yses") {
        (2, "is")
    } else if lower.ends_with("lves") {
        (3, "f")
    } else if ["sses", "uses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|e| lower.ends_with(e))
    {
        (2, "")
    } else if lower.ends_with('s') && lower.len() > 1 {
        (1, "")
    } else {
        (0, "")
    }
}

fn ends_with_consonant_y(lower: &str) -> bool {
    let mut rev = lower.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some('y'), Some(c)) if !"aeiou".contains(c)
    )
}

/// Whether `word` ends with `target` as a whole word: either the entire
/// string, after a separator, or at a camelCase boundary.
fn ends_with_word(word: &str, lower: &str, target: &str) -> bool {
    if !lower.ends_with(target) {
        return false;
    }
    let start = lower.len() - target.len();
    if start == 0 {
        return true;
    }
    let before = lower[..start].chars().next_back();
    if before.is_some_and(is_separator) {
        return true;
    }
    // camelCase boundary: the target starts with an upper-case letter
    word.get(start..)
        .and_then(|tail| tail.chars().next())
        .is_some_and(char::is_uppercase)
}

/// Replace the last `strip` bytes of `word` with `suffix`, matching the case
/// of the original word.
fn replace_suffix(word: &str, strip: usize, suffix: &str) -> String {
    let keep = word.len().saturating_sub(strip);
    let head = word.get(..keep).unwrap_or(word);
    let tail_original = word.get(keep..).unwrap_or("");

    let shouting = word.chars().any(char::is_alphabetic)
        && word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);

    let suffix = if shouting {
        suffix.to_uppercase()
    } else if tail_original.chars().next().is_some_and(char::is_uppercase) {
        capitalize_first(suffix)
    } else {
        suffix.to_string()
    };

    format!("{head}{suffix}")
}
