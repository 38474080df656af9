// src/schedule/extractor.rs

use super::color::{CellClassifier, ColorSettings};
use super::dates::{self, YearPolicy};
use super::{DateAnchor, ExtractionResult, MatchRecord};
use crate::page_model::{Page, PageModel, RawCell};
use regex::Regex;
use std::sync::LazyLock;
use time::{Date, OffsetDateTime, Time, UtcOffset};
use tracing::{debug, info, info_span};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[:.](\d{2})\b").expect("static regex"));

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub colors: ColorSettings,
    pub year_override: Option<i32>,
    pub rollover_months: u8,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            colors: ColorSettings::default(),
            year_override: None,
            rollover_months: 6,
        }
    }
}

/// The run's notion of "now", passed in rather than read from the system.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    pub today: Date,
    pub generated_at: OffsetDateTime,
}

impl RunClock {
    /// Current time; `today` is the calendar date at the given offset.
    pub fn now(offset: UtcOffset) -> Self {
        let generated_at = OffsetDateTime::now_utc();
        Self {
            today: generated_at.to_offset(offset).date(),
            generated_at,
        }
    }

    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }
}

/// Counters for what happened to every cell, logged once per run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionStats {
    pub pages: usize,
    pub pages_skipped: usize,
    pub anchors: usize,
    pub cells: usize,
    pub unfilled: usize,
    pub no_anchor: usize,
    pub malformed: usize,
    pub unknown_color: usize,
    pub filtered_out: usize,
    pub records: usize,
}

pub struct MatchExtractor {
    classifier: CellClassifier,
    year_override: Option<i32>,
    rollover_months: u8,
}

impl MatchExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self {
            classifier: CellClassifier::new(settings.colors),
            year_override: settings.year_override,
            rollover_months: settings.rollover_months,
        }
    }

    /// Extract the schedule for today, or for the next date that has matches.
    pub fn extract(
        &self,
        model: &PageModel,
        filter_team: Option<&str>,
        clock: &RunClock,
    ) -> ExtractionResult {
        let (result, _) = self.extract_with_stats(&model.pages, &model.skipped, filter_team, clock);
        result
    }

    pub fn extract_with_stats(
        &self,
        pages: &[Page],
        skipped: &[u32],
        filter_team: Option<&str>,
        clock: &RunClock,
    ) -> (ExtractionResult, ExtractionStats) {
        let policy =
            YearPolicy::for_document(self.year_override, pages, clock.today, self.rollover_months);

        let mut stats = ExtractionStats {
            pages_skipped: skipped.len(),
            ..ExtractionStats::default()
        };
        let mut records = Vec::new();

        for page in pages {
            let span = info_span!("page", number = page.number);
            let _guard = span.enter();
            stats.pages += 1;
            self.extract_page(page, &policy, filter_team, &mut stats, &mut records);
        }

        if stats.anchors == 0 {
            info!("No date headers found in document; result is empty");
        }

        let matches = select_day(records, clock.today);
        stats.records = matches.len();
        info!(
            pages = stats.pages,
            pages_skipped = stats.pages_skipped,
            anchors = stats.anchors,
            cells = stats.cells,
            unfilled = stats.unfilled,
            no_anchor = stats.no_anchor,
            malformed = stats.malformed,
            unknown_color = stats.unknown_color,
            filtered_out = stats.filtered_out,
            matches = stats.records,
            date = ?matches.first().map(|m| m.date),
            "Extraction complete"
        );

        (
            ExtractionResult {
                generated_at: clock.generated_at,
                matches,
            },
            stats,
        )
    }

    fn extract_page(
        &self,
        page: &Page,
        policy: &YearPolicy,
        filter_team: Option<&str>,
        stats: &mut ExtractionStats,
        out: &mut Vec<MatchRecord>,
    ) {
        let anchors = dates::build_index(&page.fragments, policy);
        stats.anchors += anchors.len();
        debug!(anchors = anchors.len(), cells = page.cells.len(), "Indexed page");

        for cell in &page.cells {
            stats.cells += 1;
            match self.bind_cell(cell, &anchors) {
                Ok(record) => {
                    if filter_team.is_some_and(|team| team != record.team) {
                        stats.filtered_out += 1;
                        continue;
                    }
                    out.push(record);
                }
                Err(skip) => {
                    debug!(
                        reason = ?skip,
                        text = %cell.text,
                        vertical = cell.vertical,
                        "Cell skipped"
                    );
                    match skip {
                        Skip::Unfilled => stats.unfilled += 1,
                        Skip::NoAnchor => stats.no_anchor += 1,
                        Skip::Malformed => stats.malformed += 1,
                        Skip::UnknownColor => stats.unknown_color += 1,
                    }
                }
            }
        }
    }

    fn bind_cell(&self, cell: &RawCell, anchors: &[DateAnchor]) -> Result<MatchRecord, Skip> {
        let fill = match cell.fill {
            Some(fill) if !self.classifier.is_background(Some(fill)) => fill,
            _ => return Err(Skip::Unfilled),
        };
        let anchor = nearest_anchor(anchors, cell.vertical).ok_or(Skip::NoAnchor)?;
        let (team, time) = parse_cell_text(&cell.text).ok_or(Skip::Malformed)?;
        let color = self.classifier.classify(fill).ok_or(Skip::UnknownColor)?;

        Ok(MatchRecord {
            team,
            date: anchor.date,
            time,
            color,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Unfilled,
    NoAnchor,
    Malformed,
    UnknownColor,
}

/// Closest anchor at or above the baseline `vertical`, counting a header on
/// the same visual line as above. Anchors must be sorted; among anchors at
/// the same position the last one wins.
fn nearest_anchor(anchors: &[DateAnchor], vertical: f64) -> Option<&DateAnchor> {
    let idx = anchors.partition_point(|a| a.vertical <= vertical + dates::LINE_TOLERANCE);
    idx.checked_sub(1).map(|i| &anchors[i])
}

/// Split cell text into a team code and a kick-off time.
///
/// The time is the first valid `H:MM` / `HH:MM` (or `HH.MM`) token; the team
/// is the first remaining token that contains a letter.
pub fn parse_cell_text(text: &str) -> Option<(String, Time)> {
    let (range, time) = TIME_RE.captures_iter(text).find_map(|c| {
        let hour: u8 = c[1].parse().ok()?;
        let minute: u8 = c[2].parse().ok()?;
        let time = Time::from_hms(hour, minute, 0).ok()?;
        Some((c.get(0)?.range(), time))
    })?;

    let rest = format!("{} {}", &text[..range.start], &text[range.end..]);
    let team = rest
        .split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|tok| tok.chars().any(char::is_alphabetic))?;

    Some((team.to_string(), time))
}

/// Keep today's matches, or else those of the earliest later date.
fn select_day(mut records: Vec<MatchRecord>, today: Date) -> Vec<MatchRecord> {
    let target = if records.iter().any(|r| r.date == today) {
        Some(today)
    } else {
        records.iter().map(|r| r.date).filter(|d| *d > today).min()
    };

    let Some(target) = target else {
        return Vec::new();
    };
    if target != today {
        info!(today = %today, next = %target, "No matches today, using next available date");
    }

    records.retain(|r| r.date == target);
    records.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.team.cmp(&b.team))
            .then_with(|| a.color.cmp(&b.color))
    });
    records.dedup();
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_model::TextFragment;
    use crate::schedule::ShirtColor;
    use crate::schedule::color::Rgb;
    use time::macros::{date, datetime, time};

    const AZUL: Rgb = Rgb::new(0x9D, 0xC3, 0xE6);
    const BLANCO: Rgb = Rgb::new(0xF2, 0xF2, 0xF2);

    fn header(y: f64, text: &str) -> TextFragment {
        TextFragment {
            x: 40.0,
            y,
            text: text.to_string(),
        }
    }

    fn cell(y: f64, text: &str, fill: Option<Rgb>) -> RawCell {
        RawCell {
            vertical: y,
            horizontal: 60.0,
            text: text.to_string(),
            fill,
        }
    }

    fn page(number: u32, fragments: Vec<TextFragment>, cells: Vec<RawCell>) -> Page {
        Page {
            number,
            height: 842.0,
            fragments,
            cells,
        }
    }

    fn doc(pages: &[Page]) -> PageModel {
        PageModel {
            pages: pages.to_vec(),
            skipped: Vec::new(),
        }
    }

    fn clock(today: Date) -> RunClock {
        RunClock {
            today,
            generated_at: datetime!(2026-01-31 8:00 UTC),
        }
    }

    fn extractor() -> MatchExtractor {
        MatchExtractor::new(ExtractorSettings {
            year_override: Some(2026),
            ..ExtractorSettings::default()
        })
    }

    #[test]
    fn test_single_cell_scenario() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![cell(120.0, "I12 18:30", Some(AZUL))],
        )];

        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(
            result.matches,
            vec![MatchRecord {
                team: "I12".into(),
                date: date!(2026 - 01 - 31),
                time: time!(18:30),
                color: ShirtColor::Azul,
            }]
        );
        assert_eq!(result.generated_at, datetime!(2026-01-31 8:00 UTC));
    }

    #[test]
    fn test_no_headers_gives_empty_result() {
        let pages = vec![page(
            1,
            vec![header(20.0, "CALENDARIO DE PARTIDOS")],
            vec![
                cell(120.0, "I12 18:30", Some(AZUL)),
                cell(140.0, "A07 19:00", Some(BLANCO)),
                cell(160.0, "B03 20:15", Some(AZUL)),
            ],
        )];

        let (result, stats) =
            extractor().extract_with_stats(&pages, &[], None, &clock(date!(2026 - 01 - 31)));
        assert!(result.is_empty());
        assert_eq!(stats.anchors, 0);
        assert_eq!(stats.no_anchor, 3);
    }

    #[test]
    fn test_unfilled_cells_never_match() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![
                cell(120.0, "I12 18:30", None),
                cell(140.0, "A07 19:00", Some(Rgb::new(0xFF, 0xFF, 0xFF))),
                cell(160.0, "B03 20:15", Some(BLANCO)),
            ],
        )];

        let (result, stats) =
            extractor().extract_with_stats(&pages, &[], None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(stats.unfilled, 2);
        assert_eq!(result.count(), 1);
        assert_eq!(result.matches[0].team, "B03");
        assert_eq!(result.matches[0].color, ShirtColor::Blanco);
    }

    #[test]
    fn test_cell_binds_to_closest_header_above() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO"), header(300.0, "1 DE FEBRERO")],
            vec![
                cell(50.0, "X01 10:00", Some(AZUL)),
                cell(200.0, "I12 18:30", Some(AZUL)),
                cell(300.0, "I12 11:00", Some(BLANCO)),
                cell(350.0, "I12 12:00", Some(AZUL)),
            ],
        )];

        let (result, stats) =
            extractor().extract_with_stats(&pages, &[], Some("I12"), &clock(date!(2026 - 01 - 31)));
        assert_eq!(stats.no_anchor, 1);
        assert_eq!(result.count(), 1);
        assert_eq!(result.matches[0].date, date!(2026 - 01 - 31));
        assert_eq!(result.matches[0].time, time!(18:30));

        let next = extractor().extract(&doc(&pages), Some("I12"), &clock(date!(2026 - 02 - 01)));
        let times: Vec<Time> = next.matches.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![time!(11:00), time!(12:00)]);
    }

    #[test]
    fn test_anchors_do_not_cross_pages() {
        let pages = vec![
            page(
                1,
                vec![header(100.0, "31 DE ENERO")],
                vec![cell(120.0, "I12 18:30", Some(AZUL))],
            ),
            page(2, vec![], vec![cell(120.0, "I12 20:30", Some(AZUL))]),
        ];

        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(result.count(), 1);
        assert_eq!(result.matches[0].time, time!(18:30));
    }

    #[test]
    fn test_output_sorted_by_time_then_team() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![
                cell(110.0, "Z09 19:00", Some(AZUL)),
                cell(120.0, "B02 9:30", Some(BLANCO)),
                cell(130.0, "A01 19:00", Some(BLANCO)),
                cell(140.0, "C03 18:00", Some(AZUL)),
                cell(150.0, "A01 09:30", Some(AZUL)),
            ],
        )];

        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        let got: Vec<(String, Time)> = result
            .matches
            .iter()
            .map(|m| (m.team.clone(), m.time))
            .collect();
        assert_eq!(
            got,
            vec![
                ("A01".to_string(), time!(9:30)),
                ("B02".to_string(), time!(9:30)),
                ("C03".to_string(), time!(18:00)),
                ("A01".to_string(), time!(19:00)),
                ("Z09".to_string(), time!(19:00)),
            ]
        );
    }

    #[test]
    fn test_next_available_date_fallback() {
        let pages = vec![page(
            1,
            vec![
                header(100.0, "14 DE FEBRERO"),
                header(300.0, "7 DE FEBRERO"),
                header(500.0, "2 DE ENERO"),
            ],
            vec![
                cell(120.0, "I12 10:00", Some(AZUL)),
                cell(320.0, "I12 11:00", Some(BLANCO)),
                cell(330.0, "A07 12:00", Some(AZUL)),
                cell(520.0, "I12 12:00", Some(AZUL)),
            ],
        )];

        // Today (Jan 31) has nothing; Jan 2 is in the past.
        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(result.count(), 2);
        assert!(result.matches.iter().all(|m| m.date == date!(2026 - 02 - 07)));
        assert_eq!(result.match_date(), Some(date!(2026 - 02 - 07)));
    }

    #[test]
    fn test_only_past_dates_is_empty() {
        let pages = vec![page(
            1,
            vec![header(100.0, "2 DE ENERO")],
            vec![cell(120.0, "I12 10:00", Some(AZUL))],
        )];
        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        assert!(result.is_empty());
    }

    #[test]
    fn test_team_filter() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![
                cell(120.0, "I12 18:30", Some(AZUL)),
                cell(120.0, "A07 18:30", Some(BLANCO)),
                cell(140.0, "I12 20:00", Some(BLANCO)),
                cell(140.0, "A07 20:00", Some(AZUL)),
            ],
        )];

        let result = extractor().extract(&doc(&pages), Some("A07"), &clock(date!(2026 - 01 - 31)));
        assert_eq!(
            result.matches,
            vec![
                MatchRecord {
                    team: "A07".into(),
                    date: date!(2026 - 01 - 31),
                    time: time!(18:30),
                    color: ShirtColor::Blanco,
                },
                MatchRecord {
                    team: "A07".into(),
                    date: date!(2026 - 01 - 31),
                    time: time!(20:00),
                    color: ShirtColor::Azul,
                },
            ]
        );

        // Exact, case-sensitive match.
        let none = extractor().extract(&doc(&pages), Some("a07"), &clock(date!(2026 - 01 - 31)));
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_applies_before_day_selection() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO"), header(300.0, "7 DE FEBRERO")],
            vec![
                cell(120.0, "A07 18:30", Some(AZUL)),
                cell(320.0, "I12 11:00", Some(BLANCO)),
            ],
        )];

        let result = extractor().extract(&doc(&pages), Some("I12"), &clock(date!(2026 - 01 - 31)));
        assert_eq!(result.count(), 1);
        assert_eq!(result.matches[0].date, date!(2026 - 02 - 07));
    }

    #[test]
    fn test_malformed_and_unknown_cells_are_skipped() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![
                cell(110.0, "DESCANSO", Some(AZUL)),
                cell(120.0, "18:30", Some(AZUL)),
                cell(130.0, "I12 25:99", Some(AZUL)),
                cell(140.0, "I12 18:30", Some(Rgb::new(0x20, 0x20, 0x20))),
                cell(150.0, "I12 19:30", Some(BLANCO)),
            ],
        )];

        let (result, stats) =
            extractor().extract_with_stats(&pages, &[], None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(stats.malformed, 3);
        assert_eq!(stats.unknown_color, 1);
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn test_duplicates_collapse() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO")],
            vec![
                cell(120.0, "I12 18:30", Some(AZUL)),
                cell(120.0, "I12 18:30", Some(AZUL)),
            ],
        )];
        let result = extractor().extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let pages = vec![page(
            1,
            vec![header(100.0, "31 DE ENERO"), header(400.0, "1 DE FEBRERO")],
            vec![
                cell(120.0, "I12 18:30", Some(AZUL)),
                cell(130.0, "A07 17:00", Some(BLANCO)),
                cell(420.0, "I12 10:00", Some(BLANCO)),
            ],
        )];
        let ex = extractor();
        let first = ex.extract(&doc(&pages), None, &clock(date!(2026 - 01 - 31)));
        let second = ex.extract(
            &doc(&pages),
            None,
            &RunClock {
                today: date!(2026 - 01 - 31),
                generated_at: datetime!(2026-01-31 9:15 UTC),
            },
        );
        assert_eq!(first.matches, second.matches);
    }

    #[test]
    fn test_pipeline_from_pdf_bytes() {
        use crate::page_model::tests::{filled_rect, pdf_with_pages, stroked_rect, text_at};

        let mut ops = text_at(40, 742, "31 DE ENERO");
        ops.extend(filled_rect(50, 700, 100, 20, [0.615, 0.765, 0.902]));
        ops.extend(text_at(55, 706, "I12 18:30"));
        ops.extend(filled_rect(160, 700, 100, 20, [0.95, 0.95, 0.95]));
        ops.extend(text_at(165, 706, "A07 18:30"));
        ops.extend(stroked_rect(270, 700, 100, 20));
        ops.extend(text_at(275, 706, "I12 20:00"));

        let model = PageModel::load(&pdf_with_pages(vec![ops])).unwrap();
        let result = extractor().extract(&model, None, &clock(date!(2026 - 01 - 31)));

        assert_eq!(
            result.matches,
            vec![
                MatchRecord {
                    team: "A07".into(),
                    date: date!(2026 - 01 - 31),
                    time: time!(18:30),
                    color: ShirtColor::Blanco,
                },
                MatchRecord {
                    team: "I12".into(),
                    date: date!(2026 - 01 - 31),
                    time: time!(18:30),
                    color: ShirtColor::Azul,
                },
            ]
        );
    }

    #[test]
    fn test_date_column_on_the_same_row() {
        use crate::page_model::tests::{filled_rect, pdf_with_pages, stroked_rect, text_at};

        let mut ops = Vec::new();
        // Row 1: 30 DE ENERO | I12 10:00 (blanco)
        ops.extend(stroked_rect(0, 730, 50, 20));
        ops.extend(text_at(5, 736, "30 DE ENERO"));
        ops.extend(filled_rect(50, 730, 100, 20, [0.95, 0.95, 0.95]));
        ops.extend(text_at(55, 736, "I12 10:00"));
        // Row 2: 31 DE ENERO | I12 18:30 (azul), header a point lower
        ops.extend(stroked_rect(0, 700, 50, 20));
        ops.extend(text_at(5, 705, "31 DE ENERO"));
        ops.extend(filled_rect(50, 700, 100, 20, [0.615, 0.765, 0.902]));
        ops.extend(text_at(55, 706, "I12 18:30"));

        let model = PageModel::load(&pdf_with_pages(vec![ops])).unwrap();

        let (today, stats) = extractor().extract_with_stats(
            &model.pages,
            &model.skipped,
            None,
            &clock(date!(2026 - 01 - 31)),
        );
        assert_eq!(stats.no_anchor, 0);
        assert_eq!(
            today.matches,
            vec![MatchRecord {
                team: "I12".into(),
                date: date!(2026 - 01 - 31),
                time: time!(18:30),
                color: ShirtColor::Azul,
            }]
        );

        let day_before = extractor().extract(&model, None, &clock(date!(2026 - 01 - 30)));
        assert_eq!(day_before.count(), 1);
        assert_eq!(day_before.matches[0].time, time!(10:00));
        assert_eq!(day_before.matches[0].color, ShirtColor::Blanco);
    }

    #[test]
    fn test_unreadable_page_does_not_stop_extraction() {
        use crate::page_model::tests::{
            filled_rect, pdf_with_streams, text_at, unreadable_stream,
        };
        use lopdf::content::Content;
        use lopdf::{Dictionary, Stream};

        let mut ops = text_at(40, 742, "31 DE ENERO");
        ops.extend(filled_rect(50, 700, 100, 20, [0.615, 0.765, 0.902]));
        ops.extend(text_at(55, 706, "I12 18:30"));
        let readable = Content { operations: ops }.encode().unwrap();

        let bytes = pdf_with_streams(vec![
            unreadable_stream(),
            Stream::new(Dictionary::new(), readable),
        ]);
        let model = PageModel::load(&bytes).unwrap();
        assert_eq!(model.skipped, vec![1]);

        let (result, stats) = extractor().extract_with_stats(
            &model.pages,
            &model.skipped,
            None,
            &clock(date!(2026 - 01 - 31)),
        );
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(result.count(), 1);
        assert_eq!(result.matches[0].team, "I12");
    }

    #[test]
    fn test_parse_cell_text() {
        assert_eq!(
            parse_cell_text("I12 18:30"),
            Some(("I12".to_string(), time!(18:30)))
        );
        assert_eq!(
            parse_cell_text("18:30  I12"),
            Some(("I12".to_string(), time!(18:30)))
        );
        assert_eq!(
            parse_cell_text("I12\n9.05"),
            Some(("I12".to_string(), time!(9:05)))
        );
        assert_eq!(
            parse_cell_text("(I12) 25:00 18:00"),
            Some(("I12".to_string(), time!(18:00)))
        );
        assert_eq!(parse_cell_text("I12"), None);
        assert_eq!(parse_cell_text("18:30"), None);
        assert_eq!(parse_cell_text("18:30 20"), None);
    }

    #[test]
    fn test_nearest_anchor_ties_take_last() {
        let anchors = vec![
            DateAnchor {
                vertical: 100.0,
                date: date!(2026 - 01 - 30),
            },
            DateAnchor {
                vertical: 100.0,
                date: date!(2026 - 01 - 31),
            },
        ];
        assert_eq!(nearest_anchor(&anchors, 97.0), None);
        assert_eq!(
            nearest_anchor(&anchors, 99.0).map(|a| a.date),
            Some(date!(2026 - 01 - 31))
        );
        assert_eq!(
            nearest_anchor(&anchors, 100.0).map(|a| a.date),
            Some(date!(2026 - 01 - 31))
        );
    }
}
