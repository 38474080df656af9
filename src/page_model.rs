// src/page_model.rs

use crate::error::{Result, ScheduleError};
use crate::schedule::color::Rgb;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, warn};

/// A run of text drawn by one show operator.
///
/// `y` is the baseline measured from the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// A table cell: a painted rectangle and the text drawn inside it.
///
/// `vertical` is the baseline of the cell's first line of text, measured from
/// the top of the page like a fragment's `y`, so cells and date headers on
/// one table row compare equal. `horizontal` is the left edge. `fill` is
/// `None` when the rectangle was only stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub vertical: f64,
    pub horizontal: f64,
    pub text: String,
    pub fill: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub height: f64,
    pub fragments: Vec<TextFragment>,
    pub cells: Vec<RawCell>,
}

/// Pages of one document, in document order.
#[derive(Debug, Default)]
pub struct PageModel {
    pub pages: Vec<Page>,
    /// Page numbers whose content could not be decoded.
    pub skipped: Vec<u32>,
}

/// Fallback when a page has no usable MediaBox (A4 portrait).
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.0, 842.0];

/// Rectangles thinner than this are rules, not cells.
const MIN_CELL_SIZE: f64 = 2.0;

/// Slack when testing whether a glyph origin sits inside a rectangle.
const CONTAIN_TOLERANCE: f64 = 1.0;

impl PageModel {
    /// Parse raw PDF bytes. A document that cannot be opened at all is a
    /// `SourceUnavailable` error; single broken pages are skipped.
    pub fn load(pdf_bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| ScheduleError::SourceUnavailable(format!("failed to parse PDF: {e}")))?;
        Ok(Self::from_document(&doc))
    }

    pub fn from_document(doc: &Document) -> Self {
        let mut model = PageModel::default();

        for (number, page_id) in doc.get_pages() {
            match read_page(doc, number, page_id) {
                Ok(page) => {
                    debug!(
                        page = number,
                        fragments = page.fragments.len(),
                        cells = page.cells.len(),
                        "Page decoded"
                    );
                    model.pages.push(page);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable page");
                    model.skipped.push(number);
                }
            }
        }

        info!(
            pages = model.pages.len(),
            skipped = model.skipped.len(),
            "Document layout loaded"
        );
        model
    }
}

fn read_page(doc: &Document, number: u32, page_id: ObjectId) -> Result<Page> {
    let parse_err = |reason: String| ScheduleError::PageParse {
        page: number,
        reason,
    };

    let raw = page_content(doc, page_id).map_err(parse_err)?;
    let content = Content::decode(&raw).map_err(|e| parse_err(e.to_string()))?;

    let [_, lly, _, ury] = media_box(doc, page_id).unwrap_or(DEFAULT_MEDIA_BOX);

    let mut walker = Walker::default();
    for op in &content.operations {
        walker.apply(op);
    }

    Ok(walker.into_page(number, ury, ury - lly))
}

/// Concatenated content streams of a page. A stream that is missing, or
/// whose filters cannot be undone, makes the whole page unreadable.
fn page_content(doc: &Document, page_id: ObjectId) -> std::result::Result<Vec<u8>, String> {
    let mut content = Vec::new();
    for id in doc.get_page_contents(page_id) {
        let stream = doc
            .get_object(id)
            .and_then(Object::as_stream)
            .map_err(|e| format!("content stream {} {}: {e}", id.0, id.1))?;
        if stream.dict.has(b"Filter") {
            let data = stream
                .decompressed_content()
                .map_err(|e| format!("content stream {} {}: {e}", id.0, id.1))?;
            content.extend_from_slice(&data);
        } else {
            content.extend_from_slice(&stream.content);
        }
        content.push(b'\n');
    }
    Ok(content)
}

/// Walk up the page tree until a MediaBox is found.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let mut id = page_id;
    for _ in 0..32 {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let array = match obj {
                Object::Reference(r) => doc.get_object(*r).ok()?.as_array().ok()?,
                other => other.as_array().ok()?,
            };
            let nums: Vec<f64> = array.iter().filter_map(number).collect();
            if let [a, b, c, d] = nums[..] {
                return Some([a.min(c), b.min(d), a.max(c), b.max(d)]);
            }
        }
        id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

/// Strings are decoded as UTF-16BE when they carry a BOM and as Latin-1
/// otherwise, which covers the WinAnsi fonts calendar exports use.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        match numbers(operands)[..] {
            [a, b, c, d, e, f] => Some(Matrix([a, b, c, d, e, f])),
            _ => None,
        }
    }

    fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [na, nb, nc, nd, ne, nf] = other.0;
        Matrix([
            a * na + b * nc,
            a * nb + b * nd,
            c * na + d * nc,
            c * nb + d * nd,
            e * na + f * nc + ne,
            e * nb + f * nd + nf,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    /// Current non-stroking color; `None` for patterns and other spaces we
    /// cannot reduce to RGB.
    fill: Option<Rgb>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: Some(Rgb::new(0, 0, 0)),
        }
    }
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horiz_scale: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horiz_scale: 1.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    /// Glyph widths are unknown without font metrics; half an em per
    /// character keeps successive show operators in order.
    fn advance(&mut self, text: &str) {
        let spaces = text.chars().filter(|c| *c == ' ').count() as f64;
        let chars = text.chars().count() as f64;
        let width = (chars * (0.5 * self.font_size + self.char_spacing)
            + spaces * self.word_spacing)
            * self.horiz_scale;
        self.shift(width);
    }

    fn shift(&mut self, tx: f64) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// A painted rectangle in device space (y up).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    fill: Option<Rgb>,
}

impl Rect {
    fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 - CONTAIN_TOLERANCE
            && x <= self.x1 + CONTAIN_TOLERANCE
            && y >= self.y0 - CONTAIN_TOLERANCE
            && y <= self.y1 + CONTAIN_TOLERANCE
    }

    fn same_bounds(&self, other: &Rect) -> bool {
        (self.x0 - other.x0).abs() < 0.5
            && (self.y0 - other.y0).abs() < 0.5
            && (self.x1 - other.x1).abs() < 0.5
            && (self.y1 - other.y1).abs() < 0.5
    }
}

/// Content-stream interpreter that records glyph runs and rectangles.
#[derive(Default)]
struct Walker {
    gs: GraphicsState,
    gs_stack: Vec<GraphicsState>,
    ts: TextState,
    /// Subpaths of the path under construction, in device space.
    subpaths: Vec<Vec<(f64, f64)>>,
    /// Device-space glyph runs: (x, y, text).
    runs: Vec<(f64, f64, String)>,
    rects: Vec<Rect>,
}

impl Walker {
    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            // Graphics state
            "q" => self.gs_stack.push(self.gs.clone()),
            "Q" => {
                if let Some(saved) = self.gs_stack.pop() {
                    self.gs = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.gs.ctm = m.then(&self.gs.ctm);
                }
            }

            // Non-stroking color
            "g" | "rg" | "k" => self.gs.fill = color_from(operands),
            "sc" | "scn" => {
                self.gs.fill = if matches!(operands.last(), Some(Object::Name(_))) {
                    None
                } else {
                    color_from(operands)
                };
            }
            "cs" => {
                self.gs.fill = match operands.first() {
                    Some(Object::Name(name)) if name.as_slice() == b"Pattern" => None,
                    _ => Some(Rgb::new(0, 0, 0)),
                };
            }

            // Path construction
            "m" => {
                if let [x, y] = numbers(operands)[..] {
                    let p = self.gs.ctm.apply(x, y);
                    self.subpaths.push(vec![p]);
                }
            }
            "l" => {
                if let [x, y] = numbers(operands)[..] {
                    let p = self.gs.ctm.apply(x, y);
                    match self.subpaths.last_mut() {
                        Some(path) => path.push(p),
                        None => self.subpaths.push(vec![p]),
                    }
                }
            }
            "re" => {
                if let [x, y, w, h] = numbers(operands)[..] {
                    let ctm = self.gs.ctm;
                    self.subpaths.push(vec![
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ]);
                }
            }

            // Path painting
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.paint(self.gs.fill),
            "S" | "s" => self.paint(None),
            "n" => self.subpaths.clear(),

            // Text objects and state
            "BT" => {
                self.ts.matrix = Matrix::IDENTITY;
                self.ts.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.ts.font_size = size;
                }
            }
            "Tc" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.ts.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.ts.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.ts.horiz_scale = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.ts.leading = v;
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ts.matrix = m;
                    self.ts.line_matrix = m;
                }
            }
            "Td" => {
                if let [tx, ty] = numbers(operands)[..] {
                    self.ts.move_line(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty] = numbers(operands)[..] {
                    self.ts.leading = -ty;
                    self.ts.move_line(tx, ty);
                }
            }
            "T*" => self.ts.move_line(0.0, -self.ts.leading),

            // Text showing
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "'" => {
                self.ts.move_line(0.0, -self.ts.leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "\"" => {
                if let [Some(aw), Some(ac)] = [
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ] {
                    self.ts.word_spacing = aw;
                    self.ts.char_spacing = ac;
                }
                self.ts.move_line(0.0, -self.ts.leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            _ => {}
        }
    }

    fn origin(&self) -> (f64, f64) {
        self.ts.matrix.then(&self.gs.ctm).apply(0.0, 0.0)
    }

    fn show(&mut self, text: &str) {
        if !text.trim().is_empty() {
            let (x, y) = self.origin();
            self.runs.push((x, y, text.to_string()));
        }
        self.ts.advance(text);
    }

    /// `TJ` runs become one fragment; large negative kerning reads as a
    /// word gap.
    fn show_array(&mut self, items: &[Object]) {
        let (x, y) = self.origin();
        let mut text = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let part = decode_pdf_string(bytes);
                    self.ts.advance(&part);
                    text.push_str(&part);
                }
                other => {
                    if let Some(adjust) = number(other) {
                        if adjust < -200.0 && !text.ends_with(' ') {
                            text.push(' ');
                        }
                        self.ts
                            .shift(-adjust / 1000.0 * self.ts.font_size * self.ts.horiz_scale);
                    }
                }
            }
        }
        if !text.trim().is_empty() {
            self.runs.push((x, y, text));
        }
    }

    fn paint(&mut self, fill: Option<Rgb>) {
        for path in self.subpaths.drain(..) {
            let Some(mut rect) = bounding_rect(&path) else {
                continue;
            };
            if rect.x1 - rect.x0 < MIN_CELL_SIZE || rect.y1 - rect.y0 < MIN_CELL_SIZE {
                continue;
            }
            rect.fill = fill;

            // A border stroked over a filled cell adds no new cell.
            if let Some(existing) = self.rects.iter_mut().find(|r| r.same_bounds(&rect)) {
                if existing.fill.is_none() {
                    existing.fill = rect.fill;
                }
                continue;
            }
            self.rects.push(rect);
        }
    }

    fn into_page(self, number: u32, top: f64, height: f64) -> Page {
        let mut texts: Vec<Vec<(f64, f64, &str)>> = vec![Vec::new(); self.rects.len()];

        // Each run belongs to the smallest rectangle containing its origin.
        for (x, y, text) in &self.runs {
            let owner = self
                .rects
                .iter()
                .enumerate()
                .filter(|(_, r)| r.contains(*x, *y))
                .min_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
                .map(|(i, _)| i);
            if let Some(i) = owner {
                texts[i].push((top - y, *x, text.as_str()));
            }
        }

        let cells = self
            .rects
            .iter()
            .zip(texts)
            .filter(|(_, runs)| !runs.is_empty())
            .map(|(rect, mut runs)| {
                runs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
                RawCell {
                    vertical: runs[0].0,
                    horizontal: rect.x0,
                    text: runs
                        .iter()
                        .map(|(_, _, t)| t.trim())
                        .collect::<Vec<_>>()
                        .join(" "),
                    fill: rect.fill,
                }
            })
            .collect();

        let fragments = self
            .runs
            .iter()
            .map(|(x, y, text)| TextFragment {
                x: *x,
                y: top - y,
                text: text.clone(),
            })
            .collect();

        Page {
            number,
            height,
            fragments,
            cells,
        }
    }
}

fn color_from(operands: &[Object]) -> Option<Rgb> {
    match numbers(operands)[..] {
        [gray] => Some(Rgb::from_gray(gray)),
        [r, g, b] => Some(Rgb::from_unit(r, g, b)),
        [c, m, y, k] => Some(Rgb::from_cmyk(c, m, y, k)),
        _ => None,
    }
}

/// Bounds of a subpath whose points all sit on its bounding box corners,
/// i.e. an axis-aligned rectangle.
fn bounding_rect(path: &[(f64, f64)]) -> Option<Rect> {
    if path.len() < 4 {
        return None;
    }
    let (mut x0, mut y0) = (f64::MAX, f64::MAX);
    let (mut x1, mut y1) = (f64::MIN, f64::MIN);
    for &(x, y) in path {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    let on_corner = |&(x, y): &(f64, f64)| {
        ((x - x0).abs() < 0.5 || (x - x1).abs() < 0.5)
            && ((y - y0).abs() < 0.5 || (y - y1).abs() < 0.5)
    };
    path.iter().all(on_corner).then_some(Rect {
        x0,
        y0,
        x1,
        y1,
        fill: None,
    })
}
