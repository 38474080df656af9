// src/schedule/dates.rs

use super::DateAnchor;
use crate::page_model::{Page, TextFragment};
use regex::Regex;
use std::sync::LazyLock;
use time::{Date, Month};
use tracing::debug;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s+DE\s+(\p{L}+)\s*$").expect("static regex")
});

static EXPLICIT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2}|\d{4})\b").expect("static regex")
});

/// Baselines closer than this (in points) belong to the same visual line.
pub(crate) const LINE_TOLERANCE: f64 = 2.0;

const MONTHS: &[(&str, Month)] = &[
    ("ENERO", Month::January),
    ("FEBRERO", Month::February),
    ("MARZO", Month::March),
    ("ABRIL", Month::April),
    ("MAYO", Month::May),
    ("JUNIO", Month::June),
    ("JULIO", Month::July),
    ("AGOSTO", Month::August),
    ("SEPTIEMBRE", Month::September),
    ("SETIEMBRE", Month::September),
    ("OCTUBRE", Month::October),
    ("NOVIEMBRE", Month::November),
    ("DICIEMBRE", Month::December),
];

/// How a `<day> DE <month>` header gets its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPolicy {
    /// Every header uses this year.
    Fixed(i32),
    /// A season opening in `start_month` of `start_year`. Months from the
    /// opening month on fall in `start_year`, earlier months in the next one.
    Season { start_year: i32, start_month: Month },
}

impl YearPolicy {
    /// Pick the policy for one document.
    ///
    /// An explicit override wins. Otherwise the headers, read in document
    /// order, give the season's opening month and length, and the season is
    /// placed around a reference date: the first full date printed in the
    /// document, else `today`. A season that ended more than
    /// `rollover_months` before the reference is taken to be next year's.
    pub fn for_document(
        override_year: Option<i32>,
        pages: &[Page],
        today: Date,
        rollover_months: u8,
    ) -> Self {
        if let Some(year) = override_year {
            return YearPolicy::Fixed(year);
        }

        let months: Vec<Month> = pages
            .iter()
            .flat_map(|p| scan_headers(&p.fragments))
            .map(|h| h.month)
            .collect();
        let Some(&start_month) = months.first() else {
            return YearPolicy::Season {
                start_year: today.year(),
                start_month: today.month(),
            };
        };

        let printed = pages
            .iter()
            .flat_map(|p| p.fragments.iter())
            .find_map(|f| printed_date(&f.text));
        let reference = printed.unwrap_or(today);
        let span = season_span(&months);
        let start_year = season_start_year(start_month, span, reference, rollover_months);

        debug!(
            start_year,
            start_month = %start_month,
            span_months = span,
            reference = %reference,
            printed = printed.is_some(),
            "Season placed"
        );
        YearPolicy::Season {
            start_year,
            start_month,
        }
    }

    pub fn year_for(&self, month: Month) -> i32 {
        match *self {
            YearPolicy::Fixed(year) => year,
            YearPolicy::Season {
                start_year,
                start_month,
            } => {
                if month as u8 >= start_month as u8 {
                    start_year
                } else {
                    start_year + 1
                }
            }
        }
    }
}

/// Months covered from the first header to the last, following the
/// headers in order and wrapping at year ends. Capped below a full year.
fn season_span(months: &[Month]) -> u8 {
    let steps: u32 = months
        .windows(2)
        .map(|w| (12 + u32::from(w[1] as u8) - u32::from(w[0] as u8)) % 12)
        .sum();
    steps.min(11) as u8
}

/// Year the season opens in: the latest opening at or before `reference`,
/// moved one year on when that season ended more than `rollover_months`
/// before it.
fn season_start_year(start_month: Month, span: u8, reference: Date, rollover_months: u8) -> i32 {
    let index = |year: i32, month: Month| year * 12 + i32::from(month as u8) - 1;
    let now = index(reference.year(), reference.month());

    let mut year = reference.year();
    if index(year, start_month) > now {
        year -= 1;
    }
    let end = index(year, start_month) + i32::from(span);
    if now - end > i32::from(rollover_months) {
        year + 1
    } else {
        year
    }
}

/// First real `dd/mm/yy` or `dd/mm/yyyy` date in a piece of text.
fn printed_date(text: &str) -> Option<Date> {
    EXPLICIT_DATE_RE.captures_iter(text).find_map(|c| {
        let day: u8 = c[1].parse().ok()?;
        let month = Month::try_from(c[2].parse::<u8>().ok()?).ok()?;
        let raw = &c[3];
        let year: i32 = raw.parse().ok()?;
        let year = if raw.len() == 2 { 2000 + year } else { year };
        if !(1900..=2100).contains(&year) {
            return None;
        }
        Date::from_calendar_date(year, month, day).ok()
    })
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

fn month_from_name(name: &str) -> Option<Month> {
    let folded = fold_accents(name);
    MONTHS
        .iter()
        .find(|(n, _)| *n == folded)
        .map(|(_, m)| *m)
}

/// A `<day> DE <month>` header found on a page, before its year is known.
#[derive(Debug, Clone, Copy)]
struct HeaderMark {
    vertical: f64,
    day: u8,
    month: Month,
}

fn match_header(line: &str) -> Option<(u8, Month)> {
    let caps = HEADER_RE.captures(line)?;
    let day: u8 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    Some((day, month))
}

fn resolve(day: u8, month: Month, policy: &YearPolicy) -> Option<Date> {
    let year = policy.year_for(month);
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(day, month = %month, error = %e, "Header names an impossible date");
            None
        }
    }
}

/// Parse a whole line as a date header. Impossible dates yield `None`.
pub fn parse_header(line: &str, policy: &YearPolicy) -> Option<Date> {
    let (day, month) = match_header(line)?;
    resolve(day, month, policy)
}

/// A visual line: fragments sharing a baseline, left to right.
struct Line<'a> {
    y: f64,
    fragments: Vec<&'a TextFragment>,
}

impl Line<'_> {
    fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn group_lines(fragments: &[TextFragment]) -> Vec<Line<'_>> {
    let mut ordered: Vec<&TextFragment> = fragments.iter().collect();
    ordered.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Line<'_>> = Vec::new();
    for frag in ordered {
        match lines.last_mut() {
            Some(line) if (frag.y - line.y).abs() <= LINE_TOLERANCE => line.fragments.push(frag),
            _ => lines.push(Line {
                y: frag.y,
                fragments: vec![frag],
            }),
        }
    }
    for line in &mut lines {
        line.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Headers on one page, top to bottom, stable on ties.
///
/// Each visual line is tried as a whole; when that fails, its fragments are
/// tried one by one so a header sharing a baseline with other text is still
/// found.
fn scan_headers(fragments: &[TextFragment]) -> Vec<HeaderMark> {
    let mut marks = Vec::new();

    for line in group_lines(fragments) {
        if let Some((day, month)) = match_header(&line.text()) {
            marks.push(HeaderMark {
                vertical: line.y,
                day,
                month,
            });
            continue;
        }
        for frag in &line.fragments {
            if let Some((day, month)) = match_header(&frag.text) {
                marks.push(HeaderMark {
                    vertical: frag.y,
                    day,
                    month,
                });
            }
        }
    }

    marks.sort_by(|a, b| a.vertical.total_cmp(&b.vertical));
    marks
}

/// Build the ordered date anchors for one page.
pub fn build_index(fragments: &[TextFragment], policy: &YearPolicy) -> Vec<DateAnchor> {
    scan_headers(fragments)
        .into_iter()
        .filter_map(|mark| {
            Some(DateAnchor {
                vertical: mark.vertical,
                date: resolve(mark.day, mark.month, policy)?,
            })
        })
        .collect()
}
