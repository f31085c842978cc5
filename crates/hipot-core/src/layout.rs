//! Certificate table layout
//!
//! Computes where every frame and line of text goes on the certificate page,
//! in millimetres measured from the top-left corner. The PDF writer in
//! [`crate::certificate`] only translates this geometry into drawing
//! operators, so everything observable about the table is decided here.
//!
//! ```text
//! +------+----------+-----------+-----------+---------+-----------------+---------+
//! | Date | Operator | Top Lvl PN| Top Lvl SN| Voltage | Test Type       | Results |  header (8 mm)
//! +------+----------+-----------+-----------+---------+-----------------+---------+
//! |      |          |           |           |         | PS1 Hi-Pot      | PASS    |
//! | date | operator | part      | serial    | voltage | PS1 Ground Bond | PASS    |  data row (16 mm)
//! |      |          |           |           |         |-----------------|---------|
//! |      |          |           |           |         | PS2 Hi-Pot      | FAIL    |
//! |      |          |           |           |         | PS2 Ground Bond | N/A     |
//! +------+----------+-----------+-----------+---------+-----------------+---------+
//! ```
//!
//! Column widths are fixed. Text wider than its column is cut and suffixed
//! with `...`. Rows are never paginated: a table taller than the page keeps
//! going below the bottom edge, and [`CertificateLayout::overflows_page`]
//! reports it.

use crate::types::{PowerSupply, TestKind, TestOutcome, WorkOrder};

/// A4 landscape
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

pub const TABLE_LEFT_MM: f32 = 10.0;
pub const TABLE_TOP_MM: f32 = 20.0;
pub const HEADER_HEIGHT_MM: f32 = 8.0;
pub const ROW_HEIGHT_MM: f32 = HEADER_HEIGHT_MM * 2.0;
pub const CELL_PADDING_MM: f32 = 2.0;

pub const BODY_FONT_PT: f32 = 10.0;
pub const DETAIL_FONT_PT: f32 = 7.0;
pub const FOOTER_FONT_PT: f32 = 8.0;

/// Distance of the first footer line from the bottom edge
const FOOTER_OFFSET_MM: f32 = 20.0;
const FOOTER_LINE_SPACING_MM: f32 = 5.0;
/// Rows must end this far above the first footer baseline
const FOOTER_CLEARANCE_MM: f32 = 4.0;

const MM_PER_PT: f32 = 25.4 / 72.0;
const ELLIPSIS: &str = "...";

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126, from the AFM
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

pub const FOOTER_LINES: [&str; 2] = [
    "* As shown on unit",
    "** HP = Hi-Pot, GB = Ground Bond, PS1/PS2 = Power Supply 1/2",
];

/// A fixed-width table column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub width_mm: f32,
}

pub const COLUMNS: [Column; 7] = [
    Column { title: "Date", width_mm: 30.0 },
    Column { title: "Operator", width_mm: 35.0 },
    Column { title: "Top Level PN*", width_mm: 40.0 },
    Column { title: "Top Level SN*", width_mm: 45.0 },
    Column { title: "Test Voltage", width_mm: 25.0 },
    Column { title: "Test Type**", width_mm: 45.0 },
    Column { title: "Results", width_mm: 50.0 },
];

const TEST_TYPE_COLUMN: usize = 5;
const RESULTS_COLUMN: usize = 6;

/// Text colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Default,
    /// Used for passing outcomes only
    Pass,
}

impl Ink {
    pub fn for_outcome(outcome: TestOutcome) -> Self {
        if outcome.is_pass() {
            Ink::Pass
        } else {
            Ink::Default
        }
    }

    /// RGB components in the 0..=1 range PDF expects
    pub fn rgb(self) -> [f32; 3] {
        match self {
            Ink::Default => [0.0, 0.0, 0.0],
            Ink::Pass => [34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0],
        }
    }
}

/// A rectangle outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// A horizontal divider line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub x1_mm: f32,
    pub x2_mm: f32,
    pub y_mm: f32,
}

/// One line of text; `baseline_mm` is measured from the top of the page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x_mm: f32,
    pub baseline_mm: f32,
    pub size_pt: f32,
    pub ink: Ink,
    pub text: String,
}

/// Frames, dividers and text making up one table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub frames: Vec<Frame>,
    pub rules: Vec<Rule>,
    pub runs: Vec<TextRun>,
}

/// Complete page geometry for one certificate
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateLayout {
    pub title: String,
    pub header: TableRow,
    /// One entry per serial number, in submission order
    pub rows: Vec<TableRow>,
    pub footer: Vec<TextRun>,
}

impl CertificateLayout {
    /// Data rows that fit between the header and the footer
    pub fn page_capacity() -> usize {
        let first_row_top = TABLE_TOP_MM + HEADER_HEIGHT_MM;
        let rows_bottom = PAGE_HEIGHT_MM - FOOTER_OFFSET_MM - FOOTER_CLEARANCE_MM;
        ((rows_bottom - first_row_top) / ROW_HEIGHT_MM).floor() as usize
    }

    pub fn overflows_page(&self) -> bool {
        self.rows.len() > Self::page_capacity()
    }

    /// Every text run on the page, header first and footer last
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.header
            .runs
            .iter()
            .chain(self.rows.iter().flat_map(|r| r.runs.iter()))
            .chain(self.footer.iter())
    }
}

/// Lay out the certificate table for a work order
pub fn layout_certificate(order: &WorkOrder) -> CertificateLayout {
    let header = header_row();
    let rows = order
        .serial_entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let top = TABLE_TOP_MM + HEADER_HEIGHT_MM + index as f32 * ROW_HEIGHT_MM;
            let single_line = [
                order.test_date_printed(),
                order.operator.clone(),
                order.part_number.clone(),
                entry.serial_number.clone(),
                order.test_voltage.clone(),
            ];
            data_row(top, &single_line, |supply, kind| {
                entry.test_results.supply(supply).outcome(kind)
            })
        })
        .collect();

    CertificateLayout {
        title: format!("Hi-Pot Test Certificate {}", order.work_order_number),
        header,
        rows,
        footer: footer_runs(),
    }
}

fn column_left(index: usize) -> f32 {
    TABLE_LEFT_MM + COLUMNS[..index].iter().map(|c| c.width_mm).sum::<f32>()
}

fn header_row() -> TableRow {
    let mut row = TableRow::default();
    for (index, column) in COLUMNS.iter().enumerate() {
        let x = column_left(index);
        row.frames.push(Frame {
            x_mm: x,
            y_mm: TABLE_TOP_MM,
            width_mm: column.width_mm,
            height_mm: HEADER_HEIGHT_MM,
        });
        row.runs.push(TextRun {
            x_mm: x + CELL_PADDING_MM,
            baseline_mm: TABLE_TOP_MM + 5.0,
            size_pt: BODY_FONT_PT,
            ink: Ink::Default,
            text: fit_text(column.title, column.width_mm, BODY_FONT_PT),
        });
    }
    row
}

fn data_row(
    top: f32,
    single_line: &[String; 5],
    outcome: impl Fn(PowerSupply, TestKind) -> TestOutcome,
) -> TableRow {
    let mut row = TableRow::default();

    for (index, column) in COLUMNS.iter().enumerate() {
        row.frames.push(Frame {
            x_mm: column_left(index),
            y_mm: top,
            width_mm: column.width_mm,
            height_mm: ROW_HEIGHT_MM,
        });
    }

    for (index, value) in single_line.iter().enumerate() {
        row.runs.push(TextRun {
            x_mm: column_left(index) + CELL_PADDING_MM,
            baseline_mm: top + 9.0,
            size_pt: BODY_FONT_PT,
            ink: Ink::Default,
            text: fit_text(value, COLUMNS[index].width_mm, BODY_FONT_PT),
        });
    }

    let type_x = column_left(TEST_TYPE_COLUMN);
    let result_x = column_left(RESULTS_COLUMN);
    let block_height = ROW_HEIGHT_MM / 2.0;

    for (block, supply) in PowerSupply::ALL.iter().enumerate() {
        let block_top = top + block as f32 * block_height;
        for (line, kind) in TestKind::CERTIFIED.iter().enumerate() {
            let baseline = block_top + 3.3 + line as f32 * 3.5;
            let label = format!("{} {}", supply.label(), kind.label());
            let result = outcome(*supply, *kind);

            row.runs.push(TextRun {
                x_mm: type_x + CELL_PADDING_MM,
                baseline_mm: baseline,
                size_pt: DETAIL_FONT_PT,
                ink: Ink::Default,
                text: fit_text(&label, COLUMNS[TEST_TYPE_COLUMN].width_mm, DETAIL_FONT_PT),
            });
            row.runs.push(TextRun {
                x_mm: result_x + CELL_PADDING_MM,
                baseline_mm: baseline,
                size_pt: DETAIL_FONT_PT,
                ink: Ink::for_outcome(result),
                text: result.label().to_string(),
            });
        }
    }

    row.rules.push(Rule {
        x1_mm: type_x,
        x2_mm: result_x + COLUMNS[RESULTS_COLUMN].width_mm,
        y_mm: top + block_height,
    });

    row
}

fn footer_runs() -> Vec<TextRun> {
    let first = PAGE_HEIGHT_MM - FOOTER_OFFSET_MM;
    FOOTER_LINES
        .iter()
        .enumerate()
        .map(|(i, line)| TextRun {
            x_mm: TABLE_LEFT_MM,
            baseline_mm: first + i as f32 * FOOTER_LINE_SPACING_MM,
            size_pt: FOOTER_FONT_PT,
            ink: Ink::Default,
            text: (*line).to_string(),
        })
        .collect()
}

/// Printed width of `text` in Helvetica at `size_pt`
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => u32::from(HELVETICA_WIDTHS[(code - 32) as usize]),
            _ => 556,
        })
        .sum();
    units as f32 / 1000.0 * size_pt * MM_PER_PT
}

/// Restrict text to what fits inside a column and to printable ASCII
///
/// The standard Helvetica font is WinAnsi encoded, so anything outside
/// printable ASCII is replaced by `?`. Text that is too wide is cut and
/// suffixed with `...`.
pub fn fit_text(text: &str, column_width_mm: f32, size_pt: f32) -> String {
    let printable: String = text
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();

    let usable = (column_width_mm - 2.0 * CELL_PADDING_MM).max(0.0);
    if text_width_mm(&printable, size_pt) <= usable {
        return printable;
    }

    let budget = usable - text_width_mm(ELLIPSIS, size_pt);
    let mut cut = String::new();
    for c in printable.chars() {
        let mut candidate = cut.clone();
        candidate.push(c);
        if text_width_mm(&candidate, size_pt) > budget {
            break;
        }
        cut = candidate;
    }
    cut.push_str(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PowerSupplyResults, SerialEntry, TestResults};
    use chrono::NaiveDate;

    fn order_with(entries: Vec<SerialEntry>) -> WorkOrder {
        WorkOrder {
            work_order_number: "WO-1001".into(),
            operator: "J.Smith".into(),
            test_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            part_number: "PN-77".into(),
            test_voltage: "240V".into(),
            serial_entries: entries,
        }
    }

    #[test]
    fn test_header_has_seven_columns() {
        let layout = layout_certificate(&order_with(vec![]));
        assert_eq!(layout.header.frames.len(), 7);
        let titles: Vec<_> = layout.header.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(titles[0], "Date");
        assert_eq!(titles[3], "Top Level SN*");
        assert_eq!(titles[6], "Results");
        assert!(layout.rows.is_empty());
    }

    #[test]
    fn test_one_row_per_serial_entry() {
        let entries = (0..3)
            .map(|i| SerialEntry::new(format!("SN-{i}"), TestResults::all_pass()))
            .collect();
        let layout = layout_certificate(&order_with(entries));
        assert_eq!(layout.rows.len(), 3);

        for (i, row) in layout.rows.iter().enumerate() {
            assert_eq!(row.frames.len(), 7);
            assert_eq!(row.frames[0].height_mm, ROW_HEIGHT_MM);
            assert_eq!(row.frames[0].y_mm, 28.0 + i as f32 * 16.0);
            // five single-line cells, four test-type lines, four results
            assert_eq!(row.runs.len(), 13);
            assert_eq!(row.runs[3].text, format!("SN-{i}"));
        }
    }

    #[test]
    fn test_rows_are_ps1_then_ps2() {
        let layout = layout_certificate(&order_with(vec![SerialEntry::new(
            "SN-1",
            TestResults::all_pass(),
        )]));
        let labels: Vec<_> = layout.rows[0]
            .runs
            .iter()
            .filter(|r| r.size_pt == DETAIL_FONT_PT && r.x_mm < column_left(RESULTS_COLUMN))
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["PS1 Hi-Pot", "PS1 Ground Bond", "PS2 Hi-Pot", "PS2 Ground Bond"]
        );
    }

    #[test]
    fn test_only_pass_is_green() {
        let results = TestResults {
            ps1: PowerSupplyResults {
                hp: TestOutcome::Pass,
                gb: TestOutcome::Fail,
                operational: TestOutcome::Pass,
            },
            ps2: PowerSupplyResults {
                hp: TestOutcome::NotApplicable,
                gb: TestOutcome::Pass,
                operational: TestOutcome::Fail,
            },
        };
        let layout = layout_certificate(&order_with(vec![SerialEntry::new("SN-1", results)]));

        let result_runs: Vec<_> = layout.rows[0]
            .runs
            .iter()
            .filter(|r| r.x_mm > column_left(RESULTS_COLUMN))
            .map(|r| (r.text.as_str(), r.ink))
            .collect();
        assert_eq!(
            result_runs,
            vec![
                ("PASS", Ink::Pass),
                ("FAIL", Ink::Default),
                ("N/A", Ink::Default),
                ("PASS", Ink::Pass),
            ]
        );

        let green = layout.runs().filter(|r| r.ink == Ink::Pass).count();
        assert_eq!(green, 2);
    }

    #[test]
    fn test_date_printed_us_style() {
        let layout = layout_certificate(&order_with(vec![SerialEntry::new(
            "SN-1",
            TestResults::default(),
        )]));
        assert_eq!(layout.rows[0].runs[0].text, "05/01/2024");
    }

    #[test]
    fn test_fit_text_truncates() {
        assert_eq!(fit_text("SN-01", 45.0, BODY_FONT_PT), "SN-01");

        let long = "X".repeat(80);
        let fitted = fit_text(&long, 30.0, BODY_FONT_PT);
        assert!(fitted.ends_with("..."));
        assert_eq!(fitted, format!("{}...", "X".repeat(9)));
        assert!(text_width_mm(&fitted, BODY_FONT_PT) <= 26.0);
    }

    #[test]
    fn test_header_titles_fit_untouched() {
        let layout = layout_certificate(&order_with(vec![]));
        for (run, column) in layout.header.runs.iter().zip(COLUMNS.iter()) {
            assert_eq!(run.text, column.title);
        }
    }

    #[test]
    fn test_fit_text_replaces_non_ascii() {
        assert_eq!(fit_text("✓ ok", 50.0, BODY_FONT_PT), "? ok");
    }

    #[test]
    fn test_page_capacity_and_overflow() {
        let capacity = CertificateLayout::page_capacity();
        assert_eq!(capacity, 9);

        let entries = |n: usize| {
            (0..n)
                .map(|i| SerialEntry::new(format!("SN-{i}"), TestResults::default()))
                .collect::<Vec<_>>()
        };
        let rows_bottom = PAGE_HEIGHT_MM - FOOTER_OFFSET_MM - FOOTER_CLEARANCE_MM;

        let full = layout_certificate(&order_with(entries(capacity)));
        assert!(!full.overflows_page());
        let last = full.rows.last().unwrap();
        assert!(last.frames[0].y_mm + ROW_HEIGHT_MM <= rows_bottom);

        let layout = layout_certificate(&order_with(entries(capacity + 1)));
        assert!(layout.overflows_page());
        // the extra row is still drawn, into the footer clearance
        let last = layout.rows.last().unwrap();
        assert!(last.frames[0].y_mm + ROW_HEIGHT_MM > rows_bottom);
    }

    #[test]
    fn test_footer_legend() {
        let layout = layout_certificate(&order_with(vec![]));
        assert_eq!(layout.footer.len(), 2);
        assert_eq!(layout.footer[0].baseline_mm, 190.0);
        assert!(layout.footer[1].text.contains("HP = Hi-Pot"));
    }
}
