use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Replace every digit run in `text` with its English cardinal form.
///
/// A space is added before the words only when the preceding character is
/// alphanumeric, and after them only when the following character is, so
/// `"room12b"` becomes `"room twelve b"` while `"(12)"` stays `"(twelve)"`.
pub fn numbers_to_words(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0;
    for m in DIGIT_RUN.find_iter(text) {
        let before = &text[last..m.start()];
        out.push_str(before);

        let left = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let right = text[m.end()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);

        if left {
            out.push(' ');
        }
        out.push_str(&digits_to_words(m.as_str()));
        if right {
            out.push(' ');
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Spell a run of ASCII digits. Runs that overflow `u64` are read digit by digit.
pub fn digits_to_words(digits: &str) -> String {
    match digits.parse::<u64>() {
        Ok(n) => cardinal(n),
        Err(_) => digits
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| ONES[d as usize])
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// English cardinal words for `n`, e.g. `1234` → `one thousand, two hundred and thirty-four`.
pub fn cardinal(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push((rest % 1000) as u16);
        rest /= 1000;
    }

    let mut parts: Vec<String> = Vec::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        let mut words = below_thousand(group);
        if scale > 0 {
            words.push(' ');
            words.push_str(SCALES[scale]);
        }
        parts.push(words);
    }

    // "one thousand and five", but "one thousand, two hundred"
    let lowest = groups[0];
    if parts.len() > 1 && lowest > 0 && lowest < 100 {
        let last = parts.pop().unwrap_or_default();
        format!("{} and {}", parts.join(", "), last)
    } else {
        parts.join(", ")
    }
}

fn below_thousand(n: u16) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, r) => below_hundred(r),
        (h, 0) => format!("{} hundred", ONES[h as usize]),
        (h, r) => format!("{} hundred and {}", ONES[h as usize], below_hundred(r)),
    }
}

fn below_hundred(n: u16) -> String {
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        unit => format!("{}-{}", tens, ONES[unit as usize]),
    }
}
