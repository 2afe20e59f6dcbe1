//! Route pattern compilation.
//!
//! A pattern is a url path template understood as follows:
//! - `*` matches any sequence of characters, including none
//! - `/{name}` is a named placeholder: an optional slash followed by any number of
//!   non-slash characters, captured positionally for parameter extraction
//! - `/{_action}` is a placeholder whose value selects the controller action
//! - trailing slashes are insignificant
//!
//! Patterns are compiled once, when the route is registered. The same compiled regex is
//! used both to test urls and to recover placeholder values, so the Nth placeholder of
//! the template always corresponds to the Nth capture group.

use regex::{Regex, RegexBuilder};
use std::fmt;

const WILDCARD: &str = ".*";
const COLLAPSED_WILDCARD: &str = "/?.*";
const PLACEHOLDER: &str = "/?([^/]*)";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Slash,
    Wildcard,
    Placeholder(String),
    Text(String),
}

/// A compiled route pattern.
#[derive(Clone)]
pub struct RoutePattern {
    template: String,
    placeholders: Vec<String>,
    regex: Regex,
}

impl RoutePattern {
    /// Compiles `pattern`, which must already be known to be non-empty.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let template = normalize_path(pattern).to_owned();
        let tokens = tokenize(&template);

        let placeholders = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Placeholder(name) => Some(name.clone()),
                _ => None,
            })
            .collect();

        let regex = RegexBuilder::new(&render(&tokens)).case_insensitive(true).build()?;
        Ok(Self { template, placeholders, regex })
    }

    /// The normalized template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled regular expression, anchored at both ends.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in left-to-right order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    #[inline]
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Positional placeholder values for `url`, `""` for groups that did not participate.
    ///
    /// Returns `None` when the url does not match the pattern at all.
    pub fn captures(&self, url: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(url)?;
        let values = (1..=self.placeholders.len())
            .map(|i| captures.get(i).map_or_else(String::new, |m| m.as_str().to_owned()))
            .collect();
        Some(values)
    }

    /// The template up to its first placeholder, used as the base url of the route.
    pub fn base_url(&self) -> &str {
        match self.template.find('{') {
            Some(index) => self.template[..index].trim_end_matches('/'),
            None => &self.template,
        }
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

/// Strips trailing slashes, keeping a lone `/` for the root.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        match c {
            '/' => {
                if let Some(name) = placeholder_at(&rest[1..]) {
                    flush_text(&mut text, &mut tokens);
                    if tokens.last() == Some(&Token::Slash) {
                        tokens.pop();
                    }
                    tokens.push(Token::Placeholder(name.to_owned()));
                    // slash, braces and name
                    rest = &rest[name.len() + 3..];
                    continue;
                }

                flush_text(&mut text, &mut tokens);
                if tokens.last() != Some(&Token::Slash) {
                    tokens.push(Token::Slash);
                }
            }
            '*' => {
                flush_text(&mut text, &mut tokens);
                tokens.push(Token::Wildcard);
            }
            _ => text.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }

    flush_text(&mut text, &mut tokens);
    tokens
}

fn placeholder_at(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('{')?;
    let end = inner.find('}')?;
    let name = &inner[..end];
    (!name.is_empty() && !name.contains(['/', '{'])).then_some(name)
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

/// Counts the wildcards, each optionally preceded by a slash, starting at `start`.
fn wildcard_run(tokens: &[Token], start: usize) -> (usize, usize) {
    let mut count = 0;
    let mut end = start;
    loop {
        let next = if tokens.get(end) == Some(&Token::Slash) { end + 1 } else { end };
        if tokens.get(next) != Some(&Token::Wildcard) {
            return (count, end);
        }
        count += 1;
        end = next + 1;
    }
}

fn render(tokens: &[Token]) -> String {
    let mut regex = String::from("^");
    let mut i = 0;

    while i < tokens.len() {
        let (count, end) = wildcard_run(tokens, i);
        if count >= 2 {
            regex.push_str(COLLAPSED_WILDCARD);
            i = end;
            continue;
        }

        match &tokens[i] {
            Token::Slash => regex.push('/'),
            Token::Wildcard => regex.push_str(WILDCARD),
            Token::Placeholder(_) => regex.push_str(PLACEHOLDER),
            Token::Text(text) => regex.push_str(&regex::escape(text)),
        }
        i += 1;
    }

    regex.push('$');
    regex
}
