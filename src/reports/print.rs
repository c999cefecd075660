//! Print document
//!
//! Printing runs in three steps: acquire the letterhead logo (the only step
//! that can fail on bad input), compose a [`PrintDocument`] from the model
//! (pure), then render it to PDF and hand it to the export surface.

use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use chrono::NaiveDateTime;
use printpdf::image_crate::{DynamicImage, GenericImageView, ImageFormat};
use printpdf::*;
use serde::Serialize;

use super::error::{ReportError, ReportResult};
use super::model::ReportModel;
use super::surface::{schedule_print, ExportSurface};

// ============================================================================
// Layout Constants
// ============================================================================

const PAGE_WIDTH: f32 = 215.9; // Letter
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 200.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 18.0;
const LOGO_HEIGHT_MM: f32 = 16.0;
const ROW_HEIGHT: f32 = 5.5;

const COLOR_TITLE: (u8, u8, u8) = (44, 122, 123); // Teal
const COLOR_SUBHEAD: (u8, u8, u8) = (49, 130, 206); // Blue
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (102, 102, 102);
const COLOR_RULE: (u8, u8, u8) = (221, 221, 221);

// ============================================================================
// Logo
// ============================================================================

/// Letterhead logo, re-encoded as PNG so it can be inlined in the document
#[derive(Debug, Clone)]
pub struct Logo {
    png: Vec<u8>,
    width: u32,
    height: u32,
    source_mime: &'static str,
}

impl Logo {
    /// Decode raster image bytes (PNG, JPEG, ...) into an embeddable logo
    pub fn from_bytes(bytes: &[u8]) -> ReportResult<Self> {
        let source_format = printpdf::image_crate::guess_format(bytes)
            .map_err(|e| ReportError::ImageLoad(e.to_string()))?;

        let image = printpdf::image_crate::load_from_memory_with_format(bytes, source_format)
            .map_err(|e| ReportError::ImageLoad(e.to_string()))?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ReportError::ImageLoad(e.to_string()))?;

        let (width, height) = image.dimensions();
        Ok(Self {
            png,
            width,
            height,
            source_mime: source_format.to_mime_type(),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// MIME type of the image the logo was loaded from
    pub fn source_mime(&self) -> &'static str {
        self.source_mime
    }

    /// Inline `data:` URI of the PNG re-encoding
    pub fn data_uri(&self) -> String {
        format!(
            "{}{}",
            PNG_DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Decode an inline PNG `data:` URI back into an image for embedding
fn decode_inline_png(uri: &str) -> ReportResult<DynamicImage> {
    let encoded = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| ReportError::Render("letterhead logo is not an inline PNG".to_string()))?;
    let png = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    printpdf::image_crate::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// Read and decode the logo file
pub async fn load_logo(path: &Path) -> ReportResult<Logo> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ReportError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let logo = tokio::task::spawn_blocking(move || Logo::from_bytes(&bytes))
        .await
        .map_err(|e| ReportError::ImageLoad(e.to_string()))??;

    tracing::debug!(
        path = %path.display(),
        mime = logo.source_mime(),
        width = logo.dimensions().0,
        height = logo.dimensions().1,
        "Loaded letterhead logo"
    );
    Ok(logo)
}

// ============================================================================
// Document Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
}

/// Two-column count table with a trailing total row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountTable {
    pub heading: &'static str,
    pub label_column: &'static str,
    pub rows: Vec<(String, u64)>,
    pub total: u64,
}

impl CountTable {
    fn new(heading: &'static str, label_column: &'static str, rows: Vec<(String, u64)>) -> Self {
        let total = rows.iter().map(|(_, count)| count).sum();
        Self {
            heading,
            label_column,
            rows,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintDocument {
    /// Letterhead logo as an inline PNG `data:` URI
    pub logo: String,
    pub title: String,
    pub generated_on: String,
    pub summary: Vec<SummaryCard>,
    pub medicines: CountTable,
    pub male_complaints: CountTable,
    pub female_complaints: CountTable,
    pub male_ages: CountTable,
    pub female_ages: CountTable,
}

/// Lay out the report content. Total for every model.
pub fn compose_document(model: &ReportModel, logo: &Logo, generated_at: NaiveDateTime) -> PrintDocument {
    let totals = model.totals();

    let summary = vec![
        SummaryCard {
            label: "Total Medicines Distributed",
            value: totals.medicines_distributed.to_string(),
        },
        SummaryCard {
            label: "Total Employees",
            value: totals.total_subjects.to_string(),
        },
        SummaryCard {
            label: "Total Health Complaints",
            value: totals.total_complaints.to_string(),
        },
        SummaryCard {
            label: "Male Employees",
            value: totals.male_subjects.to_string(),
        },
        SummaryCard {
            label: "Female Employees",
            value: totals.female_subjects.to_string(),
        },
        SummaryCard {
            label: "Report Period",
            value: model.period().month_name().to_string(),
        },
    ];

    let complaints = |items: &[super::aggregate::ComplaintCount]| {
        items
            .iter()
            .map(|c| (c.complaint.clone(), c.count))
            .collect::<Vec<_>>()
    };
    let ages = |items: &[super::age::AgeBracketCount]| {
        items
            .iter()
            .map(|b| (b.bracket.label().to_string(), b.count))
            .collect::<Vec<_>>()
    };

    PrintDocument {
        logo: logo.data_uri(),
        title: format!("Medical Reports - {}", model.period().label()),
        generated_on: format!(
            "Generated on: {}",
            generated_at.format("%A, %B %-d, %Y at %I:%M %p")
        ),
        summary,
        medicines: CountTable::new(
            "Medicine Distribution",
            "Medicine Name",
            model
                .medicines()
                .iter()
                .map(|m| (m.medicine_name.clone(), m.count))
                .collect(),
        ),
        male_complaints: CountTable::new("Male Complaints", "Complaint", complaints(model.male_complaints())),
        female_complaints: CountTable::new(
            "Female Complaints",
            "Complaint",
            complaints(model.female_complaints()),
        ),
        male_ages: CountTable::new("Male Age Brackets", "Age Range", ages(&model.male_age_brackets()[..])),
        female_ages: CountTable::new("Female Age Brackets", "Age Range", ages(&model.female_age_brackets()[..])),
    }
}

/// `Medical_Reports_June_2024.pdf`
pub fn pdf_filename(model: &ReportModel) -> String {
    format!(
        "Medical_Reports_{}_{}.pdf",
        model.period().month_name(),
        model.period().year()
    )
}

// ============================================================================
// PDF Rendering
// ============================================================================

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

/// Current page and write position; starts a new page when a block won't fit
struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PdfCanvas {
    fn new(title: &str) -> ReportResult<Self> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let layer = doc.get_page(page1).get_layer(layer1);

        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            y: PAGE_HEIGHT - MARGIN_TOP,
            pages: 1,
        })
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed >= MARGIN_BOTTOM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn text(&self, text: &str, x: f32, size: f32, bold: bool, color: (u8, u8, u8)) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.set_fill_color(rgb_to_printpdf(color));
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self, x1: f32, x2: f32, y: f32) {
        self.layer.set_outline_color(rgb_to_printpdf(COLOR_RULE));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn frame(&self, x: f32, y_top: f32, width: f32, height: f32) {
        self.layer.set_outline_color(rgb_to_printpdf(COLOR_RULE));
        self.layer.set_outline_thickness(0.75);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(y_top)), false),
                (Point::new(Mm(x + width), Mm(y_top)), false),
                (Point::new(Mm(x + width), Mm(y_top - height)), false),
                (Point::new(Mm(x), Mm(y_top - height)), false),
            ],
            is_closed: true,
        });
    }

    fn section_title(&mut self, title: &str) {
        self.ensure_space(14.0);
        self.text(title, MARGIN_LEFT, 13.0, true, COLOR_TITLE);
        self.y -= 2.5;
        self.rule(MARGIN_LEFT, MARGIN_RIGHT, self.y);
        self.y -= 6.0;
    }

    fn letterhead(&mut self, doc: &PrintDocument, logo: &DynamicImage) {
        let (_, height_px) = logo.dimensions();
        let dpi = height_px.max(1) as f32 * 25.4 / LOGO_HEIGHT_MM;

        Image::from_dynamic_image(logo).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_LEFT)),
                translate_y: Some(Mm(self.y - LOGO_HEIGHT_MM + 4.0)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        let text_x = MARGIN_LEFT + 45.0;
        self.text(&doc.title, text_x, 18.0, true, COLOR_TITLE);
        self.y -= 7.0;
        self.text(&doc.generated_on, text_x, 9.0, false, COLOR_GRAY);
        self.y -= LOGO_HEIGHT_MM - 2.0;
    }

    fn summary_cards(&mut self, cards: &[SummaryCard]) {
        const COLUMNS: usize = 3;
        const CARD_WIDTH: f32 = 58.0;
        const CARD_HEIGHT: f32 = 18.0;
        const GAP: f32 = 4.5;

        for row in cards.chunks(COLUMNS) {
            self.ensure_space(CARD_HEIGHT + GAP);
            let top = self.y;
            for (i, card) in row.iter().enumerate() {
                let x = MARGIN_LEFT + i as f32 * (CARD_WIDTH + GAP);
                self.frame(x, top, CARD_WIDTH, CARD_HEIGHT);
                self.y = top - 8.0;
                self.text(&card.value, x + 4.0, 16.0, true, COLOR_TITLE);
                self.y = top - 14.0;
                self.text(card.label, x + 4.0, 8.0, false, COLOR_GRAY);
            }
            self.y = top - CARD_HEIGHT - GAP;
        }
        self.y -= 2.0;
    }

    /// Header row of a table whose label column starts at `x` and spans `width`
    fn table_header(&self, table: &CountTable, x: f32, width: f32) {
        self.text(table.label_column, x, 9.0, true, COLOR_BLACK);
        self.text("Count", x + width - 14.0, 9.0, true, COLOR_BLACK);
    }

    /// Row `i` of the table: a data row, the total row, or nothing
    fn table_row(&self, table: &CountTable, i: usize, x: f32, width: f32) {
        if let Some((label, count)) = table.rows.get(i) {
            self.text(label, x, 9.0, false, COLOR_BLACK);
            self.text(&count.to_string(), x + width - 14.0, 9.0, false, COLOR_BLACK);
        } else if i == table.rows.len() {
            self.text("Total", x, 9.0, true, COLOR_BLACK);
            self.text(&table.total.to_string(), x + width - 14.0, 9.0, true, COLOR_BLACK);
        }
    }

    fn single_table(&mut self, table: &CountTable) {
        let width = MARGIN_RIGHT - MARGIN_LEFT;
        self.ensure_space(ROW_HEIGHT * 2.0);
        self.table_header(table, MARGIN_LEFT, width);
        self.y -= ROW_HEIGHT;

        for i in 0..=table.rows.len() {
            self.ensure_space(ROW_HEIGHT);
            self.table_row(table, i, MARGIN_LEFT, width);
            self.y -= ROW_HEIGHT;
        }
        self.y -= 4.0;
    }

    /// Male and female tables side by side, each with its own total row
    fn table_pair(&mut self, left: &CountTable, right: &CountTable) {
        let width = (MARGIN_RIGHT - MARGIN_LEFT - 10.0) / 2.0;
        let right_x = MARGIN_LEFT + width + 10.0;

        self.ensure_space(ROW_HEIGHT * 3.0);
        self.text(left.heading, MARGIN_LEFT, 10.5, true, COLOR_SUBHEAD);
        self.text(right.heading, right_x, 10.5, true, COLOR_SUBHEAD);
        self.y -= ROW_HEIGHT + 0.5;
        self.table_header(left, MARGIN_LEFT, width);
        self.table_header(right, right_x, width);
        self.y -= ROW_HEIGHT;

        let rows = left.rows.len().max(right.rows.len());
        for i in 0..=rows {
            self.ensure_space(ROW_HEIGHT);
            self.table_row(left, i, MARGIN_LEFT, width);
            self.table_row(right, i, right_x, width);
            self.y -= ROW_HEIGHT;
        }
        self.y -= 4.0;
    }

    fn finish(self) -> ReportResult<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| ReportError::Render(e.to_string()))
    }
}

/// Render the composed document to PDF bytes
pub fn render_pdf(doc: &PrintDocument) -> ReportResult<Vec<u8>> {
    let logo = decode_inline_png(&doc.logo)?;
    let mut canvas = PdfCanvas::new(&doc.title)?;

    canvas.letterhead(doc, &logo);

    canvas.section_title("Executive Summary");
    canvas.summary_cards(&doc.summary);

    canvas.section_title(doc.medicines.heading);
    canvas.single_table(&doc.medicines);

    canvas.section_title("Health Complaints by Gender");
    canvas.table_pair(&doc.male_complaints, &doc.female_complaints);

    canvas.section_title("Age Distribution by Gender");
    canvas.table_pair(&doc.male_ages, &doc.female_ages);

    tracing::debug!(pages = canvas.pages, "Rendered print document");
    canvas.finish()
}

// ============================================================================
// Print Flow
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PrintOutcome {
    pub document_path: PathBuf,
    pub title: String,
    pub logo_mime: &'static str,
}

/// Load the logo, render the report and queue it for printing.
///
/// If the logo cannot be loaded nothing is rendered or handed to the surface.
/// The print call itself is issued after `print_delay` and its outcome is
/// not reported back.
pub async fn print_report(
    model: &ReportModel,
    logo_path: &Path,
    generated_at: NaiveDateTime,
    surface: Arc<dyn ExportSurface>,
    print_delay: Duration,
) -> ReportResult<PrintOutcome> {
    let logo = match load_logo(logo_path).await {
        Ok(logo) => logo,
        Err(e) => {
            tracing::warn!(error = %e, "Print aborted: letterhead logo unavailable");
            return Err(e);
        }
    };

    let document = compose_document(model, &logo, generated_at);
    let pdf = render_pdf(&document)?;
    let document_path = surface.render_document(&pdf_filename(model), &pdf)?;

    tracing::info!(path = %document_path.display(), "Print document ready");
    schedule_print(surface, document_path.clone(), print_delay);

    Ok(PrintOutcome {
        document_path,
        title: document.title,
        logo_mime: logo.source_mime(),
    })
}
