//! Invoice rendering service
//!
//! Turns the flattened billing record of a paid booking into an A4 PDF
//! byte buffer.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use uuid::Uuid;

use crate::{
    config::InvoiceConfig,
    error::{AppError, AppResult},
    models::booking::InvoiceRecord,
    repository::{BookingStore, Repository},
};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;

#[derive(Clone)]
pub struct InvoiceService {
    repository: Repository,
    config: InvoiceConfig,
}

/// Cursor writing one text line at a time, top to bottom
struct LineWriter<'a> {
    layer: &'a PdfLayerReference,
    y: f32,
}

impl<'a> LineWriter<'a> {
    fn new(layer: &'a PdfLayerReference) -> Self {
        Self {
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= size * 0.6;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

impl InvoiceService {
    pub fn new(repository: Repository, config: InvoiceConfig) -> Self {
        Self { repository, config }
    }

    /// Fetch billing data for a booking and render its invoice
    pub async fn booking_invoice(&self, booking_id: Uuid) -> AppResult<Vec<u8>> {
        let record = self
            .repository
            .bookings
            .invoice_record(booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No paid booking with id {}", booking_id))
            })?;
        tracing::debug!("Rendering invoice for transaction {}", record.transaction_id);
        self.render(&record)
    }

    /// Render one invoice document
    pub fn render(&self, record: &InvoiceRecord) -> AppResult<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            "Invoice",
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "invoice",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Invoice(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Invoice(e.to_string()))?;

        let mut writer = LineWriter::new(&layer);

        writer.line("INVOICE", 26.0, &bold);
        writer.gap(6.0);

        writer.line(&self.config.company_name, 12.0, &regular);
        writer.line(&self.config.company_address, 12.0, &regular);
        writer.line(&format!("Phone: {}", self.config.company_phone), 12.0, &regular);
        writer.line(&format!("Email: {}", self.config.company_email), 12.0, &regular);
        writer.gap(8.0);

        writer.line("Booking Details", 14.0, &bold);
        writer.gap(2.0);
        let details = [
            ("Transaction ID:", record.transaction_id.clone()),
            (
                "Booking Date:",
                record.booking_date.format("%a %b %d %Y").to_string(),
            ),
            ("Customer Name:", record.user_name.clone()),
            ("Tour Title:", record.tour_title.clone()),
            ("Guests:", record.guest_count.to_string()),
        ];
        for (label, value) in &details {
            writer.line(&format!("{} {}", label, value), 12.0, &regular);
        }
        writer.gap(8.0);

        writer.line("Payment Summary", 16.0, &bold);
        writer.gap(2.0);
        writer.line(
            &format!("Total Amount: ${:.2}", record.total_amount),
            14.0,
            &bold,
        );
        writer.gap(12.0);

        writer.line("Thank you for booking with us!", 12.0, &regular);
        writer.line(
            "This invoice was generated automatically and does not require a signature.",
            10.0,
            &regular,
        );

        doc.save_to_bytes()
            .map_err(|e| AppError::Invoice(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::config::InvoiceConfig;
    use crate::models::booking::InvoiceRecord;
    use crate::repository::{memory::MemoryDb, Repository};

    use super::InvoiceService;

    fn service() -> InvoiceService {
        InvoiceService::new(
            Repository::in_memory(Arc::new(MemoryDb::default())),
            InvoiceConfig::default(),
        )
    }

    #[test]
    fn render_produces_a_pdf_document() {
        let record = InvoiceRecord {
            transaction_id: "tx-123".to_string(),
            booking_date: Utc::now(),
            user_name: "Ayesha Rahman".to_string(),
            tour_title: "Sundarbans Cruise".to_string(),
            guest_count: 3,
            total_amount: dec!(450.00),
        };
        let bytes = service().render(&record).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn invoice_for_unknown_booking_is_not_found() {
        let err = service().booking_invoice(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound(_)));
    }
}
