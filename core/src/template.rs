//! Token-based SQL text substitution.
//!
//! Every statement shape in this crate (column definition, foreign key
//! clause, unique clause, table schema, trigger, insert) is rendered from a
//! [`SqlTemplate`] holding `$name` placeholders. Placeholders with no
//! supplied value expand to the empty string, so optional clauses such as
//! `NOT NULL` or `DEFAULT ...` vanish cleanly, and a post-processing pass
//! keeps the output single-spaced no matter how many clauses were empty.

/// A format string containing `$name` placeholders.
///
/// Placeholder names start with an ASCII letter or underscore and continue
/// with letters, digits, or underscores. A `$` not followed by such a name
/// is left untouched.
///
/// # Examples
///
/// ```
/// use sqlite_tables_core::SqlTemplate;
///
/// let template = SqlTemplate::new("$column_name $type $null_constraint");
/// let sql = template.substitute(&[("column_name", "id"), ("type", "INT")]);
/// assert_eq!(sql, "id INT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    text: String,
}

impl SqlTemplate {
    /// Creates a template from the given format string.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the raw template text, placeholders included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fills every placeholder and normalizes whitespace.
    ///
    /// Placeholders absent from `substitutions` expand to the empty string.
    /// After substitution, any whitespace that follows another whitespace
    /// character is removed, as is whitespace immediately before a closing
    /// parenthesis or at the end of the string.
    pub fn substitute(&self, substitutions: &[(&str, &str)]) -> String {
        collapse_whitespace(&self.expand(substitutions, false))
    }

    /// Binds only the supplied placeholders, leaving the rest intact.
    ///
    /// Returns a new template suitable for a later [`substitute`] call.
    /// This is the first stage of two-stage rendering: a column binds what
    /// it knows about a trigger expression, and the owning table resolves
    /// the remaining placeholders.
    ///
    /// [`substitute`]: Self::substitute
    pub fn partial(&self, substitutions: &[(&str, &str)]) -> SqlTemplate {
        SqlTemplate {
            text: self.expand(substitutions, true),
        }
    }

    fn expand(&self, substitutions: &[(&str, &str)], keep_unbound: bool) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                let valid = if name.is_empty() {
                    next.is_ascii_alphabetic() || next == '_'
                } else {
                    next.is_ascii_alphanumeric() || next == '_'
                };
                if !valid {
                    break;
                }
                name.push(next);
                chars.next();
            }
            if name.is_empty() {
                out.push('$');
                continue;
            }
            match substitutions.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => out.push_str(value),
                None if keep_unbound => {
                    out.push('$');
                    out.push_str(&name);
                }
                None => {}
            }
        }
        out
    }
}

/// Removes whitespace that follows whitespace, precedes a closing
/// parenthesis, or trails the string.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() && out.ends_with(|c: char| c.is_whitespace()) {
            continue;
        }
        if ch == ')' && out.ends_with(|c: char| c.is_whitespace()) {
            out.pop();
        }
        out.push(ch);
    }
    while out.ends_with(|c: char| c.is_whitespace()) {
        out.pop();
    }
    out
}
