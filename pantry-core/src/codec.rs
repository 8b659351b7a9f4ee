//! Serialized list text ⇄ display lines.
//!
//! Ingredient and instruction lists are stored as a single text column.  The
//! canonical encoding is a JSON array of strings:
//!
//! ```text
//! ["2 cups flour","1 egg"]
//! ```
//!
//! Many public recipe dumps instead carry list literals with single quotes
//! (`['2 cups flour', '1 egg']`), so [`parse_list`] reads those as well.
//! Everything written by Pantry goes through [`encode_list`].
//!
//! Decoding for display ([`decode_list`]) is total: text that is neither
//! form yields a one-line sentinel instead of an error.

/// Which stored list a piece of text holds. Selects post-processing and the
/// fallback sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Ingredient lines, shown as bullets.
    Ingredients,
    /// Instruction lines, renumbered as `Step N:`.
    Instructions,
}

impl ListKind {
    /// The single display line used when the stored text cannot be parsed.
    #[must_use]
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::Ingredients => "Invalid ingredient format",
            Self::Instructions => "Invalid instruction format",
        }
    }
}

/// Bullet prefix for ingredient display lines.
pub const INGREDIENT_BULLET: &str = "• ";

/// Encode an ordered list of strings in the canonical stored form.
#[must_use]
pub fn encode_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    // A slice of &str always serializes.
    serde_json::to_string(&items).unwrap_or_else(|_| String::from("[]"))
}

/// Parse stored list text into its items, or `None` if it is not a list of
/// strings in either accepted form.
#[must_use]
pub fn parse_list(serialized: &str) -> Option<Vec<String>> {
    let text = serialized.trim();
    if let Ok(items) = serde_json::from_str::<Vec<String>>(text) {
        return Some(items);
    }
    parse_literal_list(text)
}

/// Decode stored list text into display lines.
///
/// - Ingredients are prefixed with [`INGREDIENT_BULLET`].
/// - Instructions lose any leading ordinal (`3.`, `2)`, `10 `) and are
///   renumbered by position as `Step 1: …`, `Step 2: …`.
/// - Unparseable text yields `[kind.sentinel()]`.
#[must_use]
pub fn decode_list(serialized: &str, kind: ListKind) -> Vec<String> {
    let Some(items) = parse_list(serialized) else {
        return vec![kind.sentinel().to_string()];
    };

    match kind {
        ListKind::Ingredients => items
            .iter()
            .map(|item| format!("{INGREDIENT_BULLET}{item}"))
            .collect(),
        ListKind::Instructions => items
            .iter()
            .enumerate()
            .map(|(i, step)| format!("Step {}: {}", i + 1, clean_step(step)))
            .collect(),
    }
}

/// Shorthand for [`decode_list`] with [`ListKind::Ingredients`].
#[must_use]
pub fn format_ingredients(serialized: &str) -> Vec<String> {
    decode_list(serialized, ListKind::Ingredients)
}

/// Shorthand for [`decode_list`] with [`ListKind::Instructions`].
#[must_use]
pub fn format_instructions(serialized: &str) -> Vec<String> {
    decode_list(serialized, ListKind::Instructions)
}

/// Instruction text with leading whitespace and ordinal removed, trimmed.
#[must_use]
pub fn clean_step(step: &str) -> &str {
    strip_ordinal(step.trim_start()).trim()
}

/// Remove a leading ordinal marker: one or more ASCII digits, then any run
/// of `.` / `)`, then whitespace. Lines that do not start with a digit are
/// returned unchanged.
///
/// ```
/// use pantry_core::codec::strip_ordinal;
/// assert_eq!(strip_ordinal("12) Whisk"), "Whisk");
/// assert_eq!(strip_ordinal("Whisk 2 eggs"), "Whisk 2 eggs");
/// ```
#[must_use]
pub fn strip_ordinal(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    rest.trim_start_matches(['.', ')']).trim_start()
}

/// Reader for bracketed list literals with `'…'` or `"…"` items and
/// backslash escapes. A trailing comma is accepted.
fn parse_literal_list(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(match chars.next()? {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                }),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return None,
        }
    }

    Some(items)
}
