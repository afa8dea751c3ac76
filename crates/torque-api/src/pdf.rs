//! # Invoice PDF Export
//!
//! Renders an [`InvoiceDocument`] with `printpdf` and writes it to disk.
//!
//! ## Export Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Invoice Export                                  │
//! │                                                                         │
//! │   InvoiceDocument ──► render locally (printpdf, A4, Helvetica)          │
//! │                            │   text outside WinAnsi counts as failed    │
//! │                  ok ◄──────┴──────► failed                              │
//! │                  │                    │                                 │
//! │                  │                    ▼                                 │
//! │                  │     GET /admin/api/invoices/service-request/{id}/    │
//! │                  │         download  (server-rendered copy)             │
//! │                  ▼                    ▼                                 │
//! │             <output_dir>/INV-{id}-{customer}.pdf                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use torque_core::invoice::{InvoiceDocument, InvoiceLine};
use tracing::{info, warn};

use crate::endpoints;
use crate::error::{ClientError, ClientResult};
use crate::http::ApiTransport;

// =============================================================================
// Layout Constants (A4, millimetres)
// =============================================================================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 15.0;
const RIGHT: f32 = 195.0;
const TOP: f32 = 282.0;
const BOTTOM: f32 = 25.0;

/// Column x-positions of the line tables: description, qty, unit price, total.
const COLUMNS: [f32; 4] = [LEFT, 110.0, 135.0, 170.0];

/// Characters outside Latin-1 that the WinAnsi encoding of the built-in fonts covers.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRAS.contains(c)
}

// =============================================================================
// Renderer
// =============================================================================

/// Writes text top-down, starting a new page when the cursor reaches the bottom.
struct PageWriter<'d> {
    doc: &'d PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl<'d> PageWriter<'d> {
    /// Fails on text the built-in fonts cannot encode.
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) -> ClientResult<()> {
        if let Some(c) = text.chars().find(|c| !is_win_ansi(*c)) {
            return Err(ClientError::Pdf(format!(
                "built-in font cannot draw '{}' in \"{}\"",
                c, text
            )));
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        Ok(())
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
        if self.y < BOTTOM {
            self.pages += 1;
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages));
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
    }

    fn rule(&mut self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(self.y)), false),
                (Point::new(Mm(RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
        self.advance(6.0);
    }

    fn table(&mut self, title: &str, quantity_label: &str, rows: &[InvoiceLine]) -> ClientResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.text(title, 11.0, LEFT, true)?;
        self.advance(6.0);
        for (x, label) in COLUMNS.iter().zip(["Description", quantity_label, "Unit price", "Total"]) {
            self.text(label, 9.0, *x, true)?;
        }
        self.advance(5.0);
        for row in rows {
            self.text(&row.description, 9.0, COLUMNS[0], false)?;
            self.text(&row.quantity, 9.0, COLUMNS[1], false)?;
            self.text(&row.unit_price.to_plain_string(), 9.0, COLUMNS[2], false)?;
            self.text(&row.total.to_plain_string(), 9.0, COLUMNS[3], false)?;
            self.advance(5.0);
        }
        self.advance(3.0);
        Ok(())
    }
}

/// Renders the invoice to PDF bytes.
pub fn render_pdf(invoice: &InvoiceDocument) -> ClientResult<Vec<u8>> {
    let title = format!("Invoice {}", invoice.invoice_number);
    let (doc, page, layer) = PdfDocument::new(
        title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ClientError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ClientError::Pdf(e.to_string()))?;

    let mut out = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        regular,
        bold,
        y: TOP,
        pages: 1,
    };

    // Header: company left, invoice number right
    let company = &invoice.company;
    out.text(&company.name, 16.0, LEFT, true)?;
    out.text("INVOICE", 16.0, 150.0, true)?;
    out.advance(7.0);
    out.text(&invoice.invoice_number, 10.0, 150.0, false)?;
    for line in &company.address_lines {
        out.text(line, 9.0, LEFT, false)?;
        out.advance(4.5);
    }
    out.text(&format!("Date: {}", invoice.issue_date.format("%d %b %Y")), 10.0, 150.0, false)?;
    out.text(&format!("{}  |  {}", company.phone, company.email), 9.0, LEFT, false)?;
    out.advance(4.5);
    if !company.gstin.is_empty() {
        out.text(&format!("GSTIN: {}", company.gstin), 9.0, LEFT, false)?;
        out.advance(4.5);
    }
    out.rule();

    // Customer and vehicle boxes side by side
    out.text("BILL TO", 10.0, LEFT, true)?;
    out.text("VEHICLE", 10.0, 110.0, true)?;
    out.advance(5.0);
    let box_rows = invoice.customer_lines.len().max(invoice.vehicle_lines.len());
    for i in 0..box_rows {
        if let Some(line) = invoice.customer_lines.get(i) {
            out.text(line, 9.0, LEFT, false)?;
        }
        if let Some(line) = invoice.vehicle_lines.get(i) {
            out.text(line, 9.0, 110.0, false)?;
        }
        out.advance(4.5);
    }
    out.rule();

    out.table("MATERIALS", "Qty", &invoice.materials)?;
    out.table("LABOR", "Hours", &invoice.labor)?;
    out.rule();

    // Totals, right aligned block
    for (label, amount) in invoice.totals_block() {
        let bold = label == "Grand total";
        out.text(&label, 10.0, 120.0, bold)?;
        out.text(&amount, 10.0, 165.0, bold)?;
        out.advance(5.5);
    }
    out.advance(4.0);

    out.text("TERMS", 10.0, LEFT, true)?;
    out.advance(5.0);
    for term in &invoice.terms {
        out.text(term, 8.5, LEFT, false)?;
        out.advance(4.5);
    }
    out.advance(6.0);
    out.text(&invoice.footer, 9.0, LEFT, false)?;
    drop(out);

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| ClientError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ClientError::Pdf(e.to_string()))
}

// =============================================================================
// Exporter
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfSource {
    Local,
    Server,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedInvoice {
    pub path: PathBuf,
    pub source: PdfSource,
    pub size: usize,
}

pub struct InvoiceExporter<'a> {
    transport: &'a dyn ApiTransport,
    output_dir: PathBuf,
}

impl<'a> InvoiceExporter<'a> {
    pub fn new(transport: &'a dyn ApiTransport, output_dir: impl Into<PathBuf>) -> Self {
        InvoiceExporter {
            transport,
            output_dir: output_dir.into(),
        }
    }

    pub async fn export(&self, invoice: &InvoiceDocument) -> ClientResult<ExportedInvoice> {
        self.export_with(invoice, render_pdf).await
    }

    /// Renders with `render`; on failure downloads the server copy instead.
    pub async fn export_with<R>(&self, invoice: &InvoiceDocument, render: R) -> ClientResult<ExportedInvoice>
    where
        R: FnOnce(&InvoiceDocument) -> ClientResult<Vec<u8>>,
    {
        let (bytes, source) = match render(invoice) {
            Ok(bytes) => (bytes, PdfSource::Local),
            Err(err) => {
                warn!(invoice = %invoice.invoice_number, error = %err, "Local PDF rendering failed, downloading server copy");
                let bytes = self.download(&invoice.request_id).await?;
                (bytes, PdfSource::Server)
            }
        };

        let path = self.output_dir.join(invoice.file_name());
        write_file(&path, &bytes)?;
        info!(?path, ?source, size = bytes.len(), "Invoice PDF saved");
        Ok(ExportedInvoice {
            path,
            source,
            size: bytes.len(),
        })
    }

    /// The server-rendered PDF for a service request.
    pub async fn download(&self, request_id: &str) -> ClientResult<Vec<u8>> {
        let bytes = self
            .transport
            .get_bytes(&endpoints::download_invoice(request_id))
            .await?;
        if !bytes.starts_with(b"%PDF") {
            return Err(ClientError::InvalidResponse(
                "server invoice download is not a PDF".to_string(),
            ));
        }
        Ok(bytes)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
