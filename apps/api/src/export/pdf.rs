//! PDF export with lopdf. Text is laid out line by line on A4 pages using the
//! standard Helvetica faces (WinAnsiEncoding), so no font files are embedded.
//! A new page starts whenever the next line would cross the bottom margin.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::errors::AppError;
use crate::export::metrics::{measure, to_win_ansi, wrap, Face};
use crate::export::{contact_items, education_line, experience_heading, experience_meta};
use crate::resumes::content::ResumeContent;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_SPACING: f32 = 1.3;

const NAME_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 12.5;
const BODY_SIZE: f32 = 10.0;
const BULLET_INDENT: f32 = 12.0;

/// Accumulates positioned text operations, one `Vec` per page.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        PageWriter {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn line(&mut self, text: &str, face: Face, size: f32, x: f32) {
        let leading = size * LINE_SPACING;
        if self.y - leading < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= leading;

        let ops = self.pages.last_mut();
        if let Some(ops) = ops {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![face.resource_name().into(), points(size)],
            ));
            ops.push(Operation::new("Td", vec![points(x), points(self.y)]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(to_win_ansi(text))],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
    }

    fn paragraph(&mut self, text: &str, face: Face, size: f32, indent: f32) {
        for line in wrap(text, face, size, TEXT_WIDTH - indent) {
            self.line(&line, face, size, MARGIN + indent);
        }
    }

    fn bullet(&mut self, text: &str) {
        let lines = wrap(text, Face::Regular, BODY_SIZE, TEXT_WIDTH - BULLET_INDENT);
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                self.line("•", Face::Regular, BODY_SIZE, MARGIN + 2.0);
                // Same baseline as the bullet glyph.
                self.y += BODY_SIZE * LINE_SPACING;
            }
            self.line(line, Face::Regular, BODY_SIZE, MARGIN + BULLET_INDENT);
        }
    }

    fn heading(&mut self, text: &str) {
        self.gap(6.0);
        self.line(text, Face::Bold, HEADING_SIZE, MARGIN);
        self.gap(2.0);
    }

    fn gap(&mut self, points: f32) {
        self.y -= points;
    }
}

/// PDF number operands; two decimals are plenty for positions in points.
fn points(value: f32) -> Object {
    Object::Real((value * 100.0).round() / 100.0)
}

fn layout(content: &ResumeContent) -> Vec<Vec<Operation>> {
    let mut w = PageWriter::new();
    let info = &content.personal_info;

    let name_x = MARGIN + ((TEXT_WIDTH - measure(&info.full_name, Face::Bold, NAME_SIZE)) / 2.0).max(0.0);
    w.line(&info.full_name, Face::Bold, NAME_SIZE, name_x);
    let contact = contact_items(content);
    if !contact.is_empty() {
        w.paragraph(&contact.join("  |  "), Face::Regular, BODY_SIZE, 0.0);
    }

    if let Some(summary) = &info.summary {
        w.heading("Summary");
        w.paragraph(summary, Face::Regular, BODY_SIZE, 0.0);
    }

    if !content.experience.is_empty() {
        w.heading("Experience");
        for exp in &content.experience {
            w.gap(3.0);
            w.paragraph(&experience_heading(exp), Face::Bold, BODY_SIZE, 0.0);
            if let Some(meta) = experience_meta(exp) {
                w.paragraph(&meta, Face::Regular, BODY_SIZE, 0.0);
            }
            for highlight in &exp.highlights {
                w.bullet(highlight);
            }
        }
    }

    if !content.education.is_empty() {
        w.heading("Education");
        for edu in &content.education {
            w.paragraph(&education_line(edu), Face::Regular, BODY_SIZE, 0.0);
        }
    }

    if !content.skills.is_empty() {
        w.heading("Skills");
        w.paragraph(&content.skills.join(", "), Face::Regular, BODY_SIZE, 0.0);
    }

    if !content.projects.is_empty() {
        w.heading("Projects");
        for project in &content.projects {
            w.gap(3.0);
            let heading = match &project.link {
                Some(link) => format!("{} ({link})", project.name),
                None => project.name.clone(),
            };
            w.paragraph(&heading, Face::Bold, BODY_SIZE, 0.0);
            if !project.description.is_empty() {
                w.paragraph(&project.description, Face::Regular, BODY_SIZE, 0.0);
            }
            if !project.technologies.is_empty() {
                w.paragraph(
                    &format!("Technologies: {}", project.technologies.join(", ")),
                    Face::Regular,
                    BODY_SIZE,
                    0.0,
                );
            }
        }
    }

    w.pages
}

pub fn render_pdf(content: &ResumeContent, title: &str) -> Result<Vec<u8>, AppError> {
    let pages = layout(content);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in [Face::Regular, Face::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let stream = Content { operations }
            .encode()
            .map_err(|e| AppError::Render(format!("Failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), (PAGE_WIDTH as i64).into(), (PAGE_HEIGHT as i64).into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(title)),
        "Producer" => Object::string_literal("resumind"),
    });
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Render(format!("Failed to write PDF: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::content::fixtures::sample_content;

    #[test]
    fn test_output_is_a_loadable_pdf() {
        let bytes = render_pdf(&sample_content(), "Backend").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_content_paginates() {
        let mut content = sample_content();
        content.experience[0].highlights = (0..150)
            .map(|i| format!("Delivered improvement number {i} that reduced costs by {i}% across several teams"))
            .collect();
        let pages = layout(&content);
        assert!(pages.len() > 1);

        let bytes = render_pdf(&content, "Long").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pages.len());
    }

    #[test]
    fn test_lines_stay_inside_margins() {
        let mut content = sample_content();
        content.experience[0].highlights = (0..120).map(|i| format!("Bullet {i}")).collect();
        for page in layout(&content) {
            for op in page.iter().filter(|op| op.operator == "Td") {
                let y = op.operands[1].as_float().unwrap();
                assert!(y >= MARGIN && y <= PAGE_HEIGHT - MARGIN, "y = {y}");
            }
        }
    }

    #[test]
    fn test_non_latin_text_still_renders() {
        let mut content = sample_content();
        content.personal_info.full_name = "李 Lovelace".into();
        assert!(render_pdf(&content, "CV").is_ok());
    }
}
