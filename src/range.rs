use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d*\.?\d+(?:[eE][-+]?\d+)?").expect("number pattern"));
static UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z/%]+.*$").expect("unit pattern"));

/// Result of reading a free-text reference range such as `"3.5 - 5.0 mmol/L"`.
///
/// Open-ended ranges (`"<5"`, `">10"`) leave the missing side as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRange {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub unit: String,
}

impl ParsedRange {
    fn empty(unit: String) -> Self {
        Self {
            low: None,
            high: None,
            unit,
        }
    }

    /// Both bounds, when the range is closed.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.low?, self.high?))
    }

    pub fn unit(&self) -> Option<&str> {
        if self.unit.is_empty() {
            None
        } else {
            Some(&self.unit)
        }
    }
}

pub fn parse_range(text: &str) -> ParsedRange {
    if text.trim().is_empty() {
        return ParsedRange::empty(String::new());
    }
    let cleaned = clean(text);
    let numbers = extract_numbers(&cleaned);
    let unit = extract_unit(&cleaned);

    if cleaned.contains('<') {
        return ParsedRange {
            low: None,
            high: numbers.first().copied(),
            unit,
        };
    }
    if cleaned.contains('>') {
        return ParsedRange {
            low: numbers.first().copied(),
            high: None,
            unit,
        };
    }

    match numbers.as_slice() {
        [] => ParsedRange::empty(unit),
        [only] => ParsedRange {
            low: Some(*only),
            high: Some(*only),
            unit,
        },
        [low, high, ..] => ParsedRange {
            low: Some(*low),
            high: Some(*high),
            unit,
        },
    }
}

fn clean(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '³' | '²' | ',' => {}
            '⁻' | '–' | '−' | '—' => out.push('-'),
            '⁺' => out.push('+'),
            '₂' => out.push('2'),
            '₃' => out.push('3'),
            '≤' => out.push('<'),
            '≥' => out.push('>'),
            _ => out.push(ch),
        }
    }
    out.replace(" to ", "-").trim().to_string()
}

fn extract_numbers(text: &str) -> Vec<f64> {
    let mut out = Vec::new();
    for m in NUMBER.find_iter(text) {
        let Ok(magnitude) = m.as_str().parse::<f64>() else {
            continue;
        };
        out.push(if is_negative(&text[..m.start()]) {
            -magnitude
        } else {
            magnitude
        });
    }
    out
}

// A '-' right before a number is a sign, unless it sits between two numbers,
// in which case it separates the bounds.
fn is_negative(before: &str) -> bool {
    let Some(rest) = before.strip_suffix('-') else {
        return false;
    };
    !rest
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
}

fn extract_unit(text: &str) -> String {
    UNIT.find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
