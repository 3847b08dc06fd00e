//! Cell text parsing.
//!
//! Text cells coming from CSV files or the spreadsheet backend may hold
//! structured values written in literal form (`[1, 2]`, `'RPG'`, `None`).
//! [`parse_cell`] runs an ordered chain of attempts and reports whether any
//! of them produced a value.

use serde_json::{Map, Number, Value};

/// Outcome of running the parse chain on a text cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCell {
    /// One of the attempts produced a value.
    Parsed(Value),
    /// No attempt matched; carries the original text.
    Unparsed(String),
}

impl ParsedCell {
    /// Returns the parsed value, or the original text as a string value.
    pub fn into_value(self) -> Value {
        match self {
            ParsedCell::Parsed(value) => value,
            ParsedCell::Unparsed(text) => Value::String(text),
        }
    }
}

/// A single parse attempt in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAttempt {
    /// Structured literal: lists, tuples, dicts, quoted strings, numbers,
    /// `None`, `True`, `False`.
    Literal,
    /// Plain integer (`int()` rules: surrounding whitespace and `_` allowed).
    Integer,
    /// Floating point number, including `nan`.
    Float,
}

/// Attempts in the order they are tried.
pub const PARSE_CHAIN: [ParseAttempt; 3] =
    [ParseAttempt::Literal, ParseAttempt::Integer, ParseAttempt::Float];

impl ParseAttempt {
    /// Runs this attempt, returning `None` when it does not apply.
    pub fn apply(self, text: &str) -> Option<Value> {
        match self {
            ParseAttempt::Literal => parse_literal(text),
            ParseAttempt::Integer => parse_integer(text),
            ParseAttempt::Float => parse_float(text),
        }
    }
}

/// Runs [`PARSE_CHAIN`] on `text`.
///
/// The first attempt that succeeds wins. A float `nan` parses to
/// `Value::Null`.
///
/// # Examples
///
/// ```
/// use gamedata_etl::table::literal::{parse_cell, ParsedCell};
/// use serde_json::json;
///
/// assert_eq!(parse_cell("[1, 2]"), ParsedCell::Parsed(json!([1, 2])));
/// assert_eq!(parse_cell(" 7 "), ParsedCell::Parsed(json!(7)));
/// assert_eq!(parse_cell("RPG"), ParsedCell::Unparsed("RPG".to_string()));
/// ```
pub fn parse_cell(text: &str) -> ParsedCell {
    PARSE_CHAIN
        .iter()
        .find_map(|attempt| attempt.apply(text))
        .map_or_else(|| ParsedCell::Unparsed(text.to_string()), ParsedCell::Parsed)
}

fn parse_integer(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.starts_with('_') || trimmed.ends_with('_') || trimmed.contains("__") {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<i64>().ok().map(Value::from)
}

fn parse_float(text: &str) -> Option<Value> {
    let parsed = text.trim().parse::<f64>().ok()?;
    if parsed.is_nan() {
        return Some(Value::Null);
    }
    Number::from_f64(parsed).map(Value::Number)
}

fn parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser::new(text.trim());
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.at_end() {
        Some(value)
    } else {
        None
    }
}

/// Deepest list, tuple or dict nesting the literal attempt accepts.
pub const MAX_NESTING: usize = 64;

/// Recursive-descent parser over the literal grammar.
struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Runs `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        self.pos += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '[' => self.nested(|p| p.sequence(']')).map(Value::Array),
            '(' => self.nested(Self::tuple),
            '{' => self.nested(Self::dict),
            '\'' | '"' => self.string().map(Value::String),
            '+' | '-' | '.' | '0'..='9' => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    /// Comma separated values up to `close`, trailing comma allowed.
    fn sequence(&mut self, close: char) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(items);
            }
            items.push(self.value()?);
            if self.eat(',') {
                continue;
            }
            return if self.eat(close) { Some(items) } else { None };
        }
    }

    fn tuple(&mut self) -> Option<Value> {
        // `(x)` is a parenthesized value, `(x,)` and `(x, y)` are tuples
        if self.eat(')') {
            return Some(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        if self.eat(')') {
            return Some(first);
        }
        if !self.eat(',') {
            return None;
        }
        let mut items = vec![first];
        items.extend(self.sequence(')')?);
        Some(Value::Array(items))
    }

    fn dict(&mut self) -> Option<Value> {
        let mut map = Map::new();
        loop {
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Array(_) | Value::Object(_) => return None,
                other => other.to_string(),
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            if self.eat(',') {
                continue;
            }
            return if self.eat('}') {
                Some(Value::Object(map))
            } else {
                None
            };
        }
    }

    fn string(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            self.quoted_into(&mut out)?;
            self.skip_whitespace();
            // Adjacent literals concatenate: 'a' 'b' == 'ab'
            if !matches!(self.peek(), Some('\'' | '"')) {
                return Some(out);
            }
        }
    }

    /// Appends the contents of one quoted literal to `out`.
    fn quoted_into(&mut self, out: &mut String) -> Option<()> {
        let quote = self.bump()?;
        loop {
            match self.bump()? {
                c if c == quote => break,
                '\\' => {
                    let escaped = match self.bump()? {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    };
                    out.push(escaped);
                }
                '\n' => return None,
                c => out.push(c),
            }
        }
        Some(())
    }

    fn number(&mut self) -> Option<Value> {
        let mut negative = false;
        while let Some(sign @ ('+' | '-')) = self.peek() {
            if sign == '-' {
                negative = !negative;
            }
            self.pos += 1;
            self.skip_whitespace();
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
        {
            self.pos += 1;
        }
        // Exponent sign: 1e-5
        if matches!(self.peek(), Some('+' | '-'))
            && self
                .chars
                .get(self.pos.checked_sub(1)?)
                .is_some_and(|c| matches!(c, 'e' | 'E'))
        {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let token: String = self.chars.get(start..self.pos)?.iter().collect();
        if token.is_empty()
            || token.starts_with('_')
            || token.ends_with('_')
            || token.contains("__")
            || !token.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        {
            return None;
        }
        let cleaned: String = token.chars().filter(|c| *c != '_').collect();

        if let Some(int) = parse_radix(&cleaned) {
            return Some(Value::from(if negative { -int } else { int }));
        }
        let is_float = cleaned.contains(['.', 'e', 'E']);
        if !is_float {
            // Leading zeros are only valid for zero itself
            if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
                return None;
            }
            if let Ok(int) = cleaned.parse::<i64>() {
                return Some(Value::from(if negative { -int } else { int }));
            }
        }
        if !cleaned.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
            return None;
        }
        let float = cleaned.parse::<f64>().ok()?;
        Number::from_f64(if negative { -float } else { float }).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars.get(start..self.pos)?.iter().collect();
        match word.as_str() {
            "None" => Some(Value::Null),
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

/// `0x1F`, `0o17` and `0b101` integers; `None` for anything else.
fn parse_radix(cleaned: &str) -> Option<i64> {
    let mut chars = cleaned.chars();
    if chars.next() != Some('0') {
        return None;
    }
    let radix = match chars.next()? {
        'x' | 'X' => 16,
        'o' | 'O' => 8,
        'b' | 'B' => 2,
        _ => return None,
    };
    let digits = chars.as_str();
    if !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

/// Formats a value in the literal form [`parse_cell`] reads back.
///
/// Top-level strings are written bare so text columns stay readable; strings
/// nested in lists or dicts are single-quoted. `Null` becomes an empty cell.
pub fn to_literal(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => nested_literal(other),
    }
}

fn nested_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(nested_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), nested_literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.is_finite() => format!("{f:.1}"),
        _ => n.to_string(),
    }
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_list_of_ints() {
        assert_eq!(parse_cell("[1, 2, 3]"), ParsedCell::Parsed(json!([1, 2, 3])));
        assert_eq!(parse_cell("[]"), ParsedCell::Parsed(json!([])));
        assert_eq!(parse_cell("[1, 2,]"), ParsedCell::Parsed(json!([1, 2])));
    }

    #[test]
    fn test_parse_nested_and_mixed_literals() {
        assert_eq!(
            parse_cell("[[1, 'a'], (2, 3), None, True]"),
            ParsedCell::Parsed(json!([[1, "a"], [2, 3], null, true]))
        );
        assert_eq!(
            parse_cell("{'name': 'Doom', 'year': 1993}"),
            ParsedCell::Parsed(json!({"name": "Doom", "year": 1993}))
        );
    }

    #[test]
    fn test_parse_tuples() {
        assert_eq!(parse_cell("(1,)"), ParsedCell::Parsed(json!([1])));
        assert_eq!(parse_cell("(4)"), ParsedCell::Parsed(json!(4)));
        assert_eq!(parse_cell("()"), ParsedCell::Parsed(json!([])));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_cell("42"), ParsedCell::Parsed(json!(42)));
        assert_eq!(parse_cell("-7"), ParsedCell::Parsed(json!(-7)));
        assert_eq!(parse_cell("1_000"), ParsedCell::Parsed(json!(1000)));
        assert_eq!(parse_cell("2.5"), ParsedCell::Parsed(json!(2.5)));
        assert_eq!(parse_cell("1e3"), ParsedCell::Parsed(json!(1000.0)));
        assert_eq!(parse_cell("1.5e-1"), ParsedCell::Parsed(json!(0.15)));
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!(parse_cell("'RPG'"), ParsedCell::Parsed(json!("RPG")));
        assert_eq!(parse_cell("\"it's\""), ParsedCell::Parsed(json!("it's")));
        assert_eq!(parse_cell(r"'a\'b'"), ParsedCell::Parsed(json!("a'b")));
        assert_eq!(parse_cell("'a' 'b'"), ParsedCell::Parsed(json!("ab")));
    }

    #[test]
    fn test_leading_zeros_fall_through_to_integer() {
        // Not a valid literal, but int() accepts it
        assert_eq!(ParseAttempt::Literal.apply("007"), None);
        assert_eq!(parse_cell("007"), ParsedCell::Parsed(json!(7)));
    }

    #[test]
    fn test_parse_radix_prefixed_integers() {
        assert_eq!(parse_cell("0x1F"), ParsedCell::Parsed(json!(31)));
        assert_eq!(parse_cell("0o17"), ParsedCell::Parsed(json!(15)));
        assert_eq!(parse_cell("0b101"), ParsedCell::Parsed(json!(5)));
        assert_eq!(parse_cell("[0XFF, -0b1_0]"), ParsedCell::Parsed(json!([255, -2])));
        assert_eq!(parse_cell("0x"), ParsedCell::Unparsed("0x".to_string()));
        assert_eq!(parse_cell("0b102"), ParsedCell::Unparsed("0b102".to_string()));
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(matches!(parse_cell(&at_limit), ParsedCell::Parsed(Value::Array(_))));

        let past_limit = format!("{}{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(ParseAttempt::Literal.apply(&past_limit), None);
    }

    #[test]
    fn test_deeply_nested_text_is_unparsed() {
        let text = "[".repeat(200_000);
        assert_eq!(parse_cell(&text), ParsedCell::Unparsed(text.clone()));

        let mixed = "{'a': [(".repeat(50_000);
        assert_eq!(parse_cell(&mixed), ParsedCell::Unparsed(mixed.clone()));
    }

    #[test]
    fn test_many_adjacent_strings_concatenate() {
        let text = "'a'".repeat(50_000);
        assert_eq!(parse_cell(&text), ParsedCell::Parsed(json!("a".repeat(50_000))));
        assert_eq!(parse_cell("'a''b' \"c\""), ParsedCell::Parsed(json!("abc")));
    }

    #[test]
    fn test_nan_parses_to_null() {
        assert_eq!(parse_cell("nan"), ParsedCell::Parsed(Value::Null));
        assert_eq!(parse_cell("NaN"), ParsedCell::Parsed(Value::Null));
    }

    #[test]
    fn test_unparseable_text_is_kept() {
        for text in ["RPG", "[1, 2", "1__0", "hello world", "[1 2]", ""] {
            assert_eq!(
                parse_cell(text),
                ParsedCell::Unparsed(text.to_string()),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_chain_falls_back_to_float() {
        // `inf` is not a literal nor an integer, but is a float without a JSON form
        assert_eq!(parse_cell("inf"), ParsedCell::Unparsed("inf".to_string()));
        assert_eq!(ParseAttempt::Float.apply(" 3.25 "), Some(json!(3.25)));
        assert_eq!(ParseAttempt::Integer.apply(" 12 "), Some(json!(12)));
        assert_eq!(ParseAttempt::Literal.apply("abc"), None);
    }

    #[test]
    fn test_into_value() {
        assert_eq!(ParsedCell::Parsed(json!(1)).into_value(), json!(1));
        assert_eq!(
            ParsedCell::Unparsed("x".to_string()).into_value(),
            json!("x")
        );
    }

    #[test]
    fn test_to_literal_reads_back() {
        let values = [
            json!([1, 2, 3]),
            json!(["Action", "Shooter"]),
            json!([[1, null], {"a": true}]),
            json!(2.0),
            json!(17),
        ];
        for value in values {
            let text = to_literal(&value);
            assert_eq!(parse_cell(&text), ParsedCell::Parsed(value.clone()), "{text}");
        }
        assert_eq!(to_literal(&Value::Null), "");
        assert_eq!(to_literal(&json!("plain text")), "plain text");
        assert_eq!(to_literal(&json!(["it's"])), r"['it\'s']");
    }
}
