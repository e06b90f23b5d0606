//! Single-letter date codes, as used in backup filenames (`backup-%Y%m%d.sql`)
//! and in retention group keys (`Ymd`).

use std::fmt::{self, Write};

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"%([A-Za-z])").expect("placeholder pattern is valid");
}

/// Format `at` using `pattern`, where every character is a date code.
///
/// A backslash copies the following character literally, as do characters
/// that are not a known code.
pub fn format<Tz>(pattern: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        push_code(&mut out, c, at);
    }
    out
}

fn push_code<Tz>(out: &mut String, code: char, at: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let (is_pm, hour12) = at.hour12();
    // Writing into a String cannot fail.
    let _ = match code {
        'Y' => write!(out, "{:04}", at.year()),
        'y' => write!(out, "{:02}", at.year().rem_euclid(100)),
        'm' => write!(out, "{:02}", at.month()),
        'n' => write!(out, "{}", at.month()),
        'd' => write!(out, "{:02}", at.day()),
        'j' => write!(out, "{}", at.day()),
        'H' => write!(out, "{:02}", at.hour()),
        'G' => write!(out, "{}", at.hour()),
        'h' => write!(out, "{:02}", hour12),
        'g' => write!(out, "{}", hour12),
        'i' => write!(out, "{:02}", at.minute()),
        's' => write!(out, "{:02}", at.second()),
        'W' => write!(out, "{:02}", at.iso_week().week()),
        'o' => write!(out, "{}", at.iso_week().year()),
        'N' => write!(out, "{}", at.weekday().number_from_monday()),
        'w' => write!(out, "{}", at.weekday().num_days_from_sunday()),
        'z' => write!(out, "{}", at.ordinal0()),
        'D' => write!(out, "{}", at.format("%a")),
        'l' => write!(out, "{}", at.format("%A")),
        'M' => write!(out, "{}", at.format("%b")),
        'F' => write!(out, "{}", at.format("%B")),
        'a' => out.write_str(if is_pm { "pm" } else { "am" }),
        'A' => out.write_str(if is_pm { "PM" } else { "AM" }),
        'U' => write!(out, "{}", at.timestamp()),
        other => out.write_char(other),
    };
}

const CODES: &str = "YymndjHGhgisWoNwzDlMFaAU";

/// Whether `code` is a date code rather than a literal character.
pub fn is_code(code: char) -> bool {
    CODES.contains(code)
}

/// Regex fragment matching whatever `code` can expand to.
fn code_pattern(code: char) -> String {
    let pattern = match code {
        'Y' | 'o' => "[0-9]{4}",
        'y' | 'm' | 'd' | 'H' | 'h' | 'i' | 's' | 'W' => "[0-9]{2}",
        'n' | 'j' | 'G' | 'g' => "[0-9]{1,2}",
        'N' => "[1-7]",
        'w' => "[0-6]",
        'z' => "[0-9]{1,3}",
        'D' | 'M' => "[A-Za-z]{3}",
        'l' | 'F' => "[A-Za-z]+",
        'a' => "(?:am|pm)",
        'A' => "(?:AM|PM)",
        'U' => "-?[0-9]+",
        other => return regex::escape(&other.to_string()),
    };
    pattern.to_string()
}

/// Replace every `%<letter>` in `template` with the formatted value of that letter.
/// Letters that are not date codes are left untouched, `%` included.
pub fn expand_placeholders<Tz>(template: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            if caps[1].chars().all(is_code) {
                format(&caps[1], now)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Turn a filename template into an unanchored regex source matching any of its expansions.
pub fn placeholders_to_regex(template: &str) -> String {
    let mut source = String::with_capacity(template.len() * 4);
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(code)) = (caps.get(0), caps[1].chars().next()) else {
            continue;
        };
        if !is_code(code) {
            continue;
        }
        source.push_str(&regex::escape(&template[last..whole.start()]));
        source.push_str(&code_pattern(code));
        last = whole.end();
    }
    source.push_str(&regex::escape(&template[last..]));
    source
}

/// Whether `template` contains at least one date placeholder.
pub fn has_placeholders(template: &str) -> bool {
    PLACEHOLDER
        .captures_iter(template)
        .any(|caps| caps[1].chars().all(is_code))
}
