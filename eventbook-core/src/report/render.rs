//! Draw laid-out pages to PDF.

use printpdf::image_crate::GenericImageView;
use printpdf::{
    Actions, BorderArray, BuiltinFont, Color, ColorArray, HighlightingMode, Image,
    ImageTransform, IndirectFontRef, Line, LinkAnnotation, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};

use super::layout::{Letterhead, ReportPage, wrap};
use crate::error::{EventBookError, EventBookResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;

const LOGO_X: f32 = MARGIN + 8.0;
const LOGO_TOP: f32 = MARGIN + 5.0;
const LOGO_WIDTH: f32 = 25.0;
const LOGO_HEIGHT: f32 = 30.0;
/// Where the body starts, measured from the top edge, when there is no logo.
const FALLBACK_BODY_TOP: f32 = MARGIN + 60.0;

const FIELD_X: f32 = MARGIN + 10.0;
const VALUE_X: f32 = FIELD_X + 48.0;
const VALUE_CHARS: usize = 70;
const LINE_HEIGHT: f32 = 5.0;
const ROW_GAP: f32 = 2.0;
const BODY_BOTTOM: f32 = MARGIN + 10.0;

const LAYER: &str = "Layer 1";

fn maroon() -> Color {
    Color::Rgb(Rgb::new(0.545, 0.0, 0.0, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn blue() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 1.0, None))
}

fn render_err(e: impl std::fmt::Display) -> EventBookError {
    EventBookError::Render(e.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes top to bottom, starting a continuation page when space runs out.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Distance from the top edge.
    y: f32,
}

impl Cursor<'_> {
    fn baseline(&self) -> Mm {
        Mm(PAGE_HEIGHT - self.y)
    }

    fn ensure_room(&mut self, height: f32) {
        if PAGE_HEIGHT - self.y - height >= BODY_BOTTOM {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        draw_border(&self.layer);
        self.y = MARGIN + 12.0;
    }
}

/// Render `pages` into one PDF. Any failure aborts the whole document.
pub fn render_pages(title: &str, pages: &[ReportPage]) -> EventBookResult<Vec<u8>> {
    if pages.is_empty() {
        return Err(EventBookError::Render("no events to report".into()));
    }

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_err)?,
    };

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            doc.get_page(p).get_layer(l)
        };
        draw_page(&doc, layer, &fonts, page);
    }

    doc.save_to_bytes().map_err(render_err)
}

fn draw_page(doc: &PdfDocumentReference, layer: PdfLayerReference, fonts: &Fonts, page: &ReportPage) {
    draw_border(&layer);
    let body_top = draw_letterhead(&layer, fonts, &page.letterhead);

    let mut cursor = Cursor { doc, layer, y: body_top };

    cursor.layer.set_fill_color(black());
    let heading_x = PAGE_WIDTH / 2.0 - page.heading.len() as f32 * 1.4;
    cursor
        .layer
        .use_text(page.heading.as_str(), 14.0, Mm(heading_x), cursor.baseline(), &fonts.bold);
    cursor.y += 10.0;

    for row in &page.rows {
        let lines = wrap(&row.value, VALUE_CHARS);
        cursor.ensure_room(lines.len() as f32 * LINE_HEIGHT);

        cursor.layer.set_fill_color(black());
        cursor
            .layer
            .use_text(row.field, 9.0, Mm(FIELD_X), cursor.baseline(), &fonts.bold);
        for line in lines {
            cursor
                .layer
                .use_text(line, 9.0, Mm(VALUE_X), cursor.baseline(), &fonts.regular);
            cursor.y += LINE_HEIGHT;
        }
        cursor.y += ROW_GAP;
    }

    if page.media.is_empty() {
        return;
    }

    cursor.y += LINE_HEIGHT;
    cursor.ensure_room(2.0 * LINE_HEIGHT);
    cursor.layer.set_fill_color(black());
    cursor
        .layer
        .use_text("Associated Media:", 12.0, Mm(FIELD_X), cursor.baseline(), &fonts.bold);
    cursor.y += LINE_HEIGHT * 1.5;

    for link in &page.media {
        cursor.ensure_room(LINE_HEIGHT);
        let baseline = cursor.baseline();

        match &link.target {
            Some(target) => {
                cursor.layer.set_fill_color(blue());
                cursor
                    .layer
                    .use_text(link.label.as_str(), 10.0, Mm(FIELD_X + 5.0), baseline, &fonts.regular);

                let width = link.label.chars().count() as f32 * 2.0;
                let rect = Rect::new(
                    Mm(FIELD_X + 5.0),
                    Mm(baseline.0 - 1.0),
                    Mm(FIELD_X + 5.0 + width),
                    Mm(baseline.0 + 4.0),
                );
                cursor.layer.add_link_annotation(LinkAnnotation::new(
                    rect,
                    Some(BorderArray::default()),
                    Some(ColorArray::default()),
                    Actions::uri(target.clone()),
                    Some(HighlightingMode::Invert),
                ));
            }
            None => {
                cursor.layer.set_fill_color(black());
                cursor
                    .layer
                    .use_text(link.label.as_str(), 10.0, Mm(FIELD_X + 5.0), baseline, &fonts.regular);
            }
        }
        cursor.y += LINE_HEIGHT;
    }
}

fn draw_border(layer: &PdfLayerReference) {
    let (left, bottom) = (MARGIN, MARGIN);
    let (right, top) = (PAGE_WIDTH - MARGIN, PAGE_HEIGHT - MARGIN);

    let border = Line {
        points: vec![
            (Point::new(Mm(left), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(left), Mm(top)), false),
        ],
        is_closed: true,
    };

    layer.set_outline_color(maroon());
    layer.set_outline_thickness(1.5);
    layer.add_line(border);
}

/// Draw the letterhead and return where the body starts, from the top edge.
fn draw_letterhead(layer: &PdfLayerReference, fonts: &Fonts, letterhead: &Letterhead) -> f32 {
    let (text_x, body_top) = match &letterhead.logo {
        Some(logo) => {
            let (w, h) = logo.dimensions();
            // Scale so the image fits the logo box.
            let dpi = (w as f32 * 25.4 / LOGO_WIDTH).max(h as f32 * 25.4 / LOGO_HEIGHT);
            let drawn_height = h as f32 * 25.4 / dpi;

            Image::from_dynamic_image(logo).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(LOGO_X)),
                    translate_y: Some(Mm(PAGE_HEIGHT - LOGO_TOP - drawn_height)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
            (LOGO_X + LOGO_WIDTH + 8.0, LOGO_TOP + LOGO_HEIGHT + 15.0)
        }
        None => (LOGO_X, FALLBACK_BODY_TOP),
    };

    let mut y = LOGO_TOP + 8.0;

    layer.set_fill_color(maroon());
    for line in &letterhead.institution {
        layer.use_text(line.as_str(), 13.0, Mm(text_x), Mm(PAGE_HEIGHT - y), &fonts.bold);
        y += 6.0;
    }

    layer.set_fill_color(black());
    for line in &letterhead.tagline {
        layer.use_text(line.as_str(), 7.5, Mm(text_x), Mm(PAGE_HEIGHT - y), &fonts.regular);
        y += 4.0;
    }

    body_top.max(y + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{MediaLink, ReportRow};

    fn page(rows: usize, media: usize) -> ReportPage {
        ReportPage {
            letterhead: Letterhead {
                institution: vec!["City College".into()],
                tagline: vec!["(Autonomous)".into()],
                logo: None,
            },
            heading: "EVENT DETAILS".into(),
            rows: (0..rows)
                .map(|i| ReportRow {
                    field: "Description",
                    value: format!("row {} {}", i, "lorem ipsum ".repeat(20)),
                })
                .collect(),
            media: (0..media)
                .map(|i| MediaLink {
                    label: format!("{}. file.png", i + 1),
                    target: Some(format!("blob:eventbook/{}", i)),
                })
                .collect(),
        }
    }

    #[test]
    fn renders_a_pdf() {
        let bytes = render_pages("report", &[page(19, 2)]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_pages_overflow_without_failing() {
        let bytes = render_pages("report", &[page(80, 40), page(3, 0)]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn no_pages_is_an_error() {
        assert!(matches!(
            render_pages("report", &[]),
            Err(EventBookError::Render(_))
        ));
    }
}
