// src/services/label_service.rs
//
// Pure rendering: deep links, QR codes, thermal-label PDFs (62×30 mm and
// 62×50 mm) and the A4 service sheet. Nothing here writes state back.

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{common::error::AppError, models::ticket::ServiceTicket};

#[derive(Clone)]
pub struct LabelService {
    /// URL scheme of the mobile app the QR codes open (`manusapp` by
    /// default).
    scheme: String,
}

impl LabelService {
    pub fn new(scheme: String) -> Self {
        Self { scheme }
    }

    /// Deep link encoded into a ticket's QR code:
    /// `<scheme>://ticket/<id>`.
    pub fn ticket_deep_link(&self, ticket_id: Uuid) -> String {
        format!("{}://ticket/{}", self.scheme, ticket_id)
    }

    /// Telegram search link used when the app is not installed on the
    /// scanning phone. Empty when no group is configured.
    pub fn telegram_fallback_link(&self, ticket_id: Uuid, group_id: &str) -> String {
        if group_id.is_empty() {
            return String::new();
        }
        format!("https://t.me/search?q={}", ticket_id)
    }

    /// Extracts the ticket id from a scanned deep link.
    pub fn parse_ticket_deep_link(&self, url: &str) -> Option<Uuid> {
        let pattern = format!(r"{}://ticket/([a-zA-Z0-9-]+)", regex::escape(&self.scheme));
        let re = Regex::new(&pattern).ok()?;
        let id = re.captures(url)?.get(1)?.as_str();
        Uuid::parse_str(id).ok()
    }

    /// PNG bytes of the ticket's QR code.
    pub fn ticket_qr_png(&self, ticket_id: Uuid) -> Result<Vec<u8>, AppError> {
        let code = QrCode::new(self.ticket_deep_link(ticket_id).as_bytes())
            .map_err(|e| AppError::RenderError(e.to_string()))?;
        let image_buffer = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

        let mut buffer = Vec::new();
        image::DynamicImage::ImageLuma8(image_buffer)
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .map_err(|e| AppError::RenderError(e.to_string()))?;
        Ok(buffer)
    }

    /// 62×30 mm product price label:
    ///
    /// ```text
    /// ┌──────────────────────────┐
    /// │ Incarcator Lenovo Think  │
    /// │ 3.25A/20V 65W Usb-C      │
    /// │ PRET 140 RON             │
    /// └──────────────────────────┘
    /// ```
    pub fn product_label_pdf(
        &self,
        product_name: &str,
        specifications: Option<&str>,
        price: Decimal,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = genpdf::Document::new(font_family()?);
        doc.set_title("Etichetă produs");
        doc.set_paper_size(genpdf::Size::new(62.0, 30.0));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(2);
        doc.set_page_decorator(decorator);

        doc.push(elements::Paragraph::new(product_name).aligned(genpdf::Alignment::Center));
        if let Some(specifications) = specifications.map(str::trim).filter(|s| !s.is_empty()) {
            doc.push(elements::Paragraph::new(specifications).aligned(genpdf::Alignment::Center));
        }
        doc.push(
            elements::Paragraph::new(format!("PRET {} RON", price.round()))
                .aligned(genpdf::Alignment::Center)
                .styled(style::Style::new().bold()),
        );

        render(doc)
    }

    /// 62×50 mm ticket label: client, product and the QR code that opens
    /// the ticket in the app.
    pub fn ticket_label_pdf(&self, ticket: &ServiceTicket) -> Result<Vec<u8>, AppError> {
        let mut doc = genpdf::Document::new(font_family()?);
        doc.set_title(format!("Fișă {}", short_id(ticket.id)));
        doc.set_paper_size(genpdf::Size::new(62.0, 50.0));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(2);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(ticket.client_name.clone())
                .aligned(genpdf::Alignment::Center)
                .styled(style::Style::new().bold()),
        );
        doc.push(
            elements::Paragraph::new(format!(
                "{} {}",
                ticket.product_type.label_ro(),
                ticket.product_model
            ))
            .aligned(genpdf::Alignment::Center),
        );

        let code = QrCode::new(self.ticket_deep_link(ticket.id).as_bytes())
            .map_err(|e| AppError::RenderError(e.to_string()))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let qr_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(
            image_buffer,
        ))
        .map_err(|e| AppError::RenderError(e.to_string()))?
        .with_alignment(genpdf::Alignment::Center)
        .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(qr_image);

        doc.push(
            elements::Paragraph::new(short_id(ticket.id)).aligned(genpdf::Alignment::Center),
        );

        render(doc)
    }

    /// A4 service sheet for handing to the client.
    pub fn service_sheet_pdf(&self, ticket: &ServiceTicket) -> Result<Vec<u8>, AppError> {
        let mut doc = genpdf::Document::new(font_family()?);
        doc.set_title(format!("Fișă de service {}", short_id(ticket.id)));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new("FIȘĂ DE SERVICE")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!("Nr. {}", short_id(ticket.id))));
        doc.push(elements::Break::new(1.5));

        section(&mut doc, "CLIENT");
        doc.push(elements::Paragraph::new(format!("Nume: {}", ticket.client_name)));
        doc.push(elements::Paragraph::new(format!(
            "Telefon: {}",
            ticket.client_phone
        )));
        if !ticket.client_email.is_empty() {
            doc.push(elements::Paragraph::new(format!(
                "Email: {}",
                ticket.client_email
            )));
        }
        doc.push(elements::Break::new(1));

        section(&mut doc, "PRODUS");
        doc.push(elements::Paragraph::new(format!(
            "Tip: {}",
            ticket.product_type.label_ro()
        )));
        doc.push(elements::Paragraph::new(format!(
            "Model: {}",
            ticket.product_model
        )));
        if !ticket.product_serial_number.is_empty() {
            doc.push(elements::Paragraph::new(format!(
                "Serie: {}",
                ticket.product_serial_number
            )));
        }
        doc.push(elements::Break::new(1));

        section(&mut doc, "PROBLEMĂ");
        doc.push(elements::Paragraph::new(ticket.problem_description.clone()));
        doc.push(elements::Break::new(1));

        section(&mut doc, "DIAGNOSTIC");
        doc.push(elements::Paragraph::new(ticket.diagnostic.clone()));
        doc.push(elements::Break::new(1));

        section(&mut doc, "SOLUȚIE");
        doc.push(elements::Paragraph::new(ticket.solution_applied.clone()));
        doc.push(elements::Break::new(1));

        doc.push(
            elements::Paragraph::new(format!("COST: {:.2} RON", ticket.cost))
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Status: {}",
            ticket.status.label_ro()
        )));
        doc.push(elements::Paragraph::new(format!(
            "Tehnician: {}",
            ticket.technician_name
        )));
        doc.push(elements::Paragraph::new(format!(
            "Primit: {}",
            ticket.date_received.format("%d.%m.%Y")
        )));
        if let Some(delivered) = ticket.date_delivered {
            doc.push(elements::Paragraph::new(format!(
                "Predat: {}",
                delivered.format("%d.%m.%Y")
            )));
        }

        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(format!(
                "Generat: {}",
                chrono::Utc::now().format("%d.%m.%Y %H:%M")
            ))
            .styled(style::Style::new().italic().with_font_size(8)),
        );

        render(doc)
    }
}

fn section(doc: &mut genpdf::Document, title: &str) {
    doc.push(
        elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(12)),
    );
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

// Labels and sheets share the font the shop ships next to the binary.
fn font_family() -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    genpdf::fonts::from_files("./fonts", "Roboto", None)
        .map_err(|_| AppError::FontNotFound("no usable font found in ./fonts".to_string()))
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::RenderError(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LabelService {
        LabelService::new("manusapp".to_string())
    }

    #[test]
    fn deep_link_has_scheme_and_id() {
        let id = Uuid::new_v4();
        let link = service().ticket_deep_link(id);
        assert_eq!(link, format!("manusapp://ticket/{}", id));
    }

    #[test]
    fn deep_link_roundtrips_through_parser() {
        let service = service();
        let id = Uuid::new_v4();
        let parsed = service.parse_ticket_deep_link(&service.ticket_deep_link(id));
        assert_eq!(parsed, Some(id));
    }

    #[test]
    fn parser_rejects_foreign_urls() {
        let service = service();
        assert_eq!(service.parse_ticket_deep_link("https://example.com"), None);
        assert_eq!(
            service.parse_ticket_deep_link("otherapp://ticket/0c41a3a0-9e1f-4a3b-8d80-02b1c0a0c5ce"),
            None
        );
        assert_eq!(
            service.parse_ticket_deep_link("manusapp://ticket/not-a-uuid"),
            None
        );
    }

    #[test]
    fn fallback_link_requires_group() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(service.telegram_fallback_link(id, "").is_empty());
        let link = service.telegram_fallback_link(id, "-100123");
        assert!(link.contains(&id.to_string()));
        assert!(link.starts_with("https://t.me/search"));
    }

    #[test]
    fn qr_png_renders() {
        let bytes = service().ticket_qr_png(Uuid::new_v4()).unwrap();
        // PNG magic number
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn short_id_is_first_eight_chars() {
        let id = Uuid::parse_str("0c41a3a0-9e1f-4a3b-8d80-02b1c0a0c5ce").unwrap();
        assert_eq!(short_id(id), "0c41a3a0");
    }
}
