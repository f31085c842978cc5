//! Certificate PDF writer
//!
//! Translates a [`CertificateLayout`] into a single-page PDF using the
//! standard Helvetica font, so no font data is embedded. Output is
//! deterministic: the same work order always produces the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, warn};

use crate::blob::encode_data_url;
use crate::error::RenderError;
use crate::layout::{
    layout_certificate, CertificateLayout, Frame, Ink, Rule, TextRun, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM,
};
use crate::types::WorkOrder;

const PT_PER_MM: f32 = 72.0 / 25.4;
const LINE_WIDTH_PT: f32 = 0.5;
const FONT_RESOURCE: &str = "F1";

/// A rendered certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    bytes: Vec<u8>,
}

impl Certificate {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The certificate in the form submitted alongside a work order
    pub fn to_data_url(&self) -> String {
        encode_data_url(&self.bytes)
    }
}

/// Render the certificate for a work order
pub fn render_certificate(order: &WorkOrder) -> Result<Certificate, RenderError> {
    let layout = layout_certificate(order);
    if layout.overflows_page() {
        warn!(
            work_order = %order.work_order_number,
            rows = layout.rows.len(),
            capacity = CertificateLayout::page_capacity(),
            "Certificate table runs past the page footer"
        );
    }

    let certificate = render_layout(&layout)?;
    debug!(
        work_order = %order.work_order_number,
        rows = layout.rows.len(),
        size = certificate.len(),
        "Certificate rendered"
    );
    Ok(certificate)
}

/// Write an already computed layout as PDF
pub fn render_layout(layout: &CertificateLayout) -> Result<Certificate, RenderError> {
    let content = Content {
        operations: page_operations(layout),
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (PAGE_WIDTH_MM * PT_PER_MM).into(),
            (PAGE_HEIGHT_MM * PT_PER_MM).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(layout.title.as_str()),
        "Producer" => Object::string_literal(format!("hipot-core {}", crate::VERSION)),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(Certificate { bytes })
}

fn page_operations(layout: &CertificateLayout) -> Vec<Operation> {
    let mut ops = vec![Operation::new("w", vec![LINE_WIDTH_PT.into()])];
    ops.extend(stroke_color(Ink::Default));

    for row in std::iter::once(&layout.header).chain(layout.rows.iter()) {
        for frame in &row.frames {
            ops.extend(frame_ops(frame));
        }
        for rule in &row.rules {
            ops.extend(rule_ops(rule));
        }
    }

    for run in layout.runs() {
        ops.extend(text_ops(run));
    }
    ops
}

fn x_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Layout measures down from the top edge, PDF measures up from the bottom
fn y_pt(mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - mm) * PT_PER_MM
}

fn stroke_color(ink: Ink) -> [Operation; 1] {
    let [r, g, b] = ink.rgb();
    [Operation::new("RG", vec![r.into(), g.into(), b.into()])]
}

fn frame_ops(frame: &Frame) -> [Operation; 2] {
    [
        Operation::new(
            "re",
            vec![
                x_pt(frame.x_mm).into(),
                y_pt(frame.y_mm + frame.height_mm).into(),
                x_pt(frame.width_mm).into(),
                x_pt(frame.height_mm).into(),
            ],
        ),
        Operation::new("S", vec![]),
    ]
}

fn rule_ops(rule: &Rule) -> [Operation; 3] {
    [
        Operation::new("m", vec![x_pt(rule.x1_mm).into(), y_pt(rule.y_mm).into()]),
        Operation::new("l", vec![x_pt(rule.x2_mm).into(), y_pt(rule.y_mm).into()]),
        Operation::new("S", vec![]),
    ]
}

fn text_ops(run: &TextRun) -> [Operation; 6] {
    let [r, g, b] = run.ink.rgb();
    [
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![r.into(), g.into(), b.into()]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), run.size_pt.into()]),
        Operation::new("Td", vec![x_pt(run.x_mm).into(), y_pt(run.baseline_mm).into()]),
        Operation::new("Tj", vec![Object::string_literal(run.text.as_str())]),
        Operation::new("ET", vec![]),
    ]
}
