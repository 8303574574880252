//! Order confirmation and invoice rendering.
//!
//! A document is a plain value computed from a stored order, its items and
//! the seller's details. Everything on it is reproducible from stored fields:
//! the number comes from the creation year and order number, the due date
//! from the creation date. Dates are taken in Dutch local time.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::grouping::{GroupedProduct, group_order_items, total_pieces};
use crate::order::{Order, OrderItem};
use crate::types::{format_amount, round_money};

/// VAT (BTW) rate applied to every order.
pub const TAX_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 2);

/// Payment term in days, counted from the order date.
pub const PAYMENT_TERM_DAYS: u64 = 14;

/// Zone in which issue dates, due dates and number years are taken.
pub const DOCUMENT_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

/// Prefix shared by confirmation and invoice numbers.
pub const DOCUMENT_PREFIX: &str = "F";

const CONFIRMATION_TERMS: [&str; 3] = [
    "Payment due within 14 days of order confirmation date.",
    "Prices are wholesale (WHS) and quoted in EUR.",
    "Delivery subject to stock availability.",
];

/// Which commercial document to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Confirmation,
    Invoice,
}

impl DocumentKind {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Confirmation => "Order Confirmation",
            Self::Invoice => "Factuur / Invoice",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmation => "confirmation",
            Self::Invoice => "invoice",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmation" | "order-confirmation" => Ok(Self::Confirmation),
            "invoice" => Ok(Self::Invoice),
            _ => Err(format!("invalid document kind: {s}")),
        }
    }
}

/// The selling company as printed on documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerDetails {
    pub company_name: String,
    pub address_lines: Vec<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub bank_name: String,
    pub account_holder: String,
    pub iban: String,
    pub bic: String,
    /// Chamber of commerce registration number.
    pub registration_number: String,
    pub vat_id: String,
}

/// Customer block, copied from the order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBlock {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub address_lines: Vec<String>,
}

/// A formatted calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDate {
    pub date: NaiveDate,
    /// e.g. `16 October 2026`.
    pub en: String,
    /// e.g. `16 oktober 2026`.
    pub nl: String,
}

impl DocumentDate {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            en: format_date_en(date),
            nl: format_date_nl(date),
        }
    }
}

/// Invoice payment block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub terms: String,
    pub due_date: DocumentDate,
    /// Reference buyers quote with their payment.
    pub reference: String,
    pub amount_due: Decimal,
}

/// A rendered order confirmation or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub number: String,
    pub issue_date: DocumentDate,
    pub customer: CustomerBlock,
    pub seller: SellerDetails,
    pub products: Vec<GroupedProduct>,
    pub total_pieces: u64,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Invoices only.
    pub payment: Option<PaymentDetails>,
    /// Confirmations only.
    pub terms: Vec<String>,
}

/// `F2026-007` style number from the creation year and order number.
#[must_use]
pub fn document_number(year: i32, order_number: i64) -> String {
    format!("{DOCUMENT_PREFIX}{year}-{order_number:03}")
}

/// Tax on a subtotal, rounded to cents half away from zero.
#[must_use]
pub fn compute_tax(subtotal: Decimal) -> Decimal {
    round_money(subtotal * TAX_RATE)
}

/// Payment due date for an order placed on `date`.
#[must_use]
pub fn due_date(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(PAYMENT_TERM_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Format as `16 October 2026`.
#[must_use]
pub fn format_date_en(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

const DUTCH_MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

/// Format as `16 oktober 2026`.
#[must_use]
pub fn format_date_nl(date: NaiveDate) -> String {
    let month = usize::try_from(date.month0())
        .ok()
        .and_then(|m| DUTCH_MONTHS.get(m))
        .copied()
        .unwrap_or_default();
    format!("{} {month} {}", date.day(), date.year())
}

fn customer_block(order: &Order) -> CustomerBlock {
    let city_line = [
        order.shipping_postal_code.as_deref(),
        order.shipping_city.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    let address_lines = [
        order.shipping_address.clone(),
        Some(city_line).filter(|l| !l.is_empty()),
        order.shipping_country.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();

    CustomerBlock {
        company_name: order.company_name.clone(),
        contact_name: order.contact_name.clone(),
        email: order.email.clone(),
        address_lines,
    }
}

/// Render a document for `order`.
///
/// The subtotal is the order's stored total; line items only drive the
/// product breakdown.
#[must_use]
pub fn render_document(
    kind: DocumentKind,
    order: &Order,
    items: &[OrderItem],
    seller: &SellerDetails,
) -> OrderDocument {
    let products = group_order_items(items);
    let pieces = total_pieces(&products);
    let subtotal = order.total_price;
    let tax = compute_tax(subtotal);
    let total = subtotal + tax;
    let created = order.created_at.with_timezone(&DOCUMENT_TIMEZONE).date_naive();
    let number = document_number(created.year(), order.order_number);

    let (payment, terms) = match kind {
        DocumentKind::Invoice => (
            Some(PaymentDetails {
                terms: format!("{PAYMENT_TERM_DAYS} Days"),
                due_date: DocumentDate::new(due_date(created)),
                reference: number.clone(),
                amount_due: total,
            }),
            Vec::new(),
        ),
        DocumentKind::Confirmation => (
            None,
            CONFIRMATION_TERMS.iter().map(|t| (*t).to_owned()).collect(),
        ),
    };

    OrderDocument {
        kind,
        title: kind.title().to_owned(),
        number,
        issue_date: DocumentDate::new(created),
        customer: customer_block(order),
        seller: seller.clone(),
        products,
        total_pieces: pieces,
        subtotal,
        tax_rate: TAX_RATE,
        tax,
        total,
        payment,
        terms,
    }
}

/// `Size` / `Qty` rows over the EU size bar, `-` marking empty cells.
fn write_size_bar(f: &mut fmt::Formatter<'_>, product: &GroupedProduct) -> fmt::Result {
    write!(f, "   {:<5}", "Size")?;
    for cell in &product.size_bar {
        write!(f, "{:>4}", cell.size)?;
    }
    writeln!(f)?;
    write!(f, "   {:<5}", "Qty")?;
    for cell in &product.size_bar {
        if cell.quantity == 0 {
            write!(f, "{:>4}", "-")?;
        } else {
            write!(f, "{:>4}", cell.quantity)?;
        }
    }
    writeln!(f)?;
    if !product.off_bar_sizes.is_empty() {
        let other = product
            .off_bar_sizes
            .iter()
            .map(|o| format!("{} x{}", o.label, o.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "   Other sizes: {other}")?;
    }
    Ok(())
}

impl fmt::Display for OrderDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.seller.company_name)?;
        for line in &self.seller.address_lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.title.to_uppercase())?;
        let number_label = match self.kind {
            DocumentKind::Confirmation => "Order No.",
            DocumentKind::Invoice => "Invoice No.",
        };
        writeln!(f, "{number_label:<14}{}", self.number)?;
        writeln!(f, "{:<14}{}", "Date", self.issue_date.en)?;
        if let Some(payment) = &self.payment {
            writeln!(f, "{:<14}{} (due {})", "Payment Terms", payment.terms, payment.due_date.en)?;
        }
        writeln!(f, "{:<14}{}", "Customer", self.customer.company_name)?;
        if !self.customer.contact_name.is_empty() {
            writeln!(f, "{:<14}{}", "", self.customer.contact_name)?;
        }
        writeln!(f, "{:<14}{}", "Total Pairs", self.total_pieces)?;
        writeln!(f)?;

        for (i, product) in self.products.iter().enumerate() {
            writeln!(
                f,
                "{}. {}  SKU: {}  Unit Price: € {}",
                i + 1,
                product.product_title,
                product.sku.as_deref().unwrap_or("-"),
                format_amount(product.unit_price)
            )?;
            if !product.sizes.is_empty() {
                write_size_bar(f, product)?;
            }
            writeln!(
                f,
                "   Pairs: {}  Total: € {}",
                product.total_pieces,
                format_amount(product.total_value)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "{:<28}€ {:>10}", "Subtotal (excl. 21% BTW)", format_amount(self.subtotal))?;
        writeln!(f, "{:<28}€ {:>10}", "BTW 21%", format_amount(self.tax))?;
        writeln!(f, "{:<28}€ {:>10}", "Total (incl. BTW)", format_amount(self.total))?;

        if let Some(payment) = &self.payment {
            writeln!(f)?;
            writeln!(f, "Payment Details")?;
            writeln!(f, "  Bank            {}", self.seller.bank_name)?;
            writeln!(f, "  Account holder  {}", self.seller.account_holder)?;
            writeln!(f, "  IBAN            {}", self.seller.iban)?;
            writeln!(f, "  SWIFT / BIC     {}", self.seller.bic)?;
            writeln!(f, "  Reference       {}", payment.reference)?;
            writeln!(f, "  Amount due      € {}", format_amount(payment.amount_due))?;
            writeln!(f, "  Due date        {}", payment.due_date.en)?;
        }

        if !self.terms.is_empty() {
            writeln!(f)?;
            writeln!(f, "Terms & Conditions")?;
            for term in &self.terms {
                writeln!(f, "  {term}")?;
            }
        }

        if self.kind == DocumentKind::Confirmation {
            writeln!(f)?;
            for party in [self.seller.company_name.as_str(), "the Buyer"] {
                writeln!(f, "For and on behalf of {party}")?;
                writeln!(f)?;
                writeln!(f, "{}", "_".repeat(40))?;
                writeln!(f, "Name / Signature / Date")?;
                writeln!(f)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Reg. No.: {}  VAT ID: {}",
            self.seller.registration_number, self.seller.vat_id
        )?;
        if let Some(payment) = &self.payment {
            write!(f, "\nPlease reference {} with your payment.", payment.reference)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BuyerId, OrderId, OrderItemId, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn seller() -> SellerDetails {
        SellerDetails {
            company_name: "Example Footwear B.V.".to_owned(),
            address_lines: vec!["Keizersgracht 1".to_owned(), "1015 CJ Amsterdam".to_owned()],
            website: None,
            email: None,
            bank_name: "ABN Amro".to_owned(),
            account_holder: "Example Footwear B.V.".to_owned(),
            iban: "NL00ABNA0000000000".to_owned(),
            bic: "ABNANL2A".to_owned(),
            registration_number: "12345678".to_owned(),
            vat_id: "NL000000000B01".to_owned(),
        }
    }

    fn order(total: i64, order_number: i64) -> Order {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        Order {
            id: OrderId::random(),
            order_number,
            status: OrderStatus::Confirmed,
            total_price: Decimal::from(total),
            buyer_id: BuyerId::random(),
            company_name: "Schoenhandel B.V.".to_owned(),
            contact_name: "Sam de Vries".to_owned(),
            email: "inkoop@schoenhandel.nl".to_owned(),
            phone: None,
            shipping_address: Some("Oudegracht 12".to_owned()),
            shipping_city: Some("Utrecht".to_owned()),
            shipping_postal_code: Some("3511 AP".to_owned()),
            shipping_country: Some("NL".to_owned()),
            notes: None,
            admin_notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn items(order: &Order) -> Vec<OrderItem> {
        [("41", 2_u32), ("42", 3)]
            .into_iter()
            .map(|(size, quantity)| OrderItem {
                id: OrderItemId::random(),
                order_id: order.id,
                product_title: "Runner X".to_owned(),
                variant_title: Some(size.to_owned()),
                sku: Some("RX".to_owned()),
                quantity,
                unit_price: Decimal::from(50),
                total_price: Decimal::from(50 * quantity),
                image_url: None,
            })
            .collect()
    }

    #[test]
    fn test_document_number_padding() {
        assert_eq!(document_number(2026, 7), "F2026-007");
        assert_eq!(document_number(2026, 42), "F2026-042");
        assert_eq!(document_number(2026, 1234), "F2026-1234");
    }

    #[test]
    fn test_tax_law() {
        assert_eq!(compute_tax(Decimal::from(260)), Decimal::new(5460, 2));
        assert_eq!(compute_tax(Decimal::new(1005, 2)), Decimal::new(211, 2));
    }

    #[test]
    fn test_due_date_law() {
        let d = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        assert_eq!(due_date(d), NaiveDate::from_ymd_opt(2027, 1, 8).unwrap());
    }

    #[test]
    fn test_tax_law_over_range() {
        for cents in (0..2_000_000_i64).step_by(997) {
            let subtotal = Decimal::new(cents, 2);
            let tax = compute_tax(subtotal);
            assert!(tax.scale() <= 2, "{subtotal}: {tax}");
            assert!((tax - subtotal * TAX_RATE).abs() <= Decimal::new(5, 3), "{subtotal}");
        }
        // Half a cent rounds away from zero
        assert_eq!(compute_tax(Decimal::new(50, 2)), Decimal::new(11, 2));
    }

    #[test]
    fn test_due_date_law_over_range() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        for d in start.iter_days().take(3 * 366) {
            let due = due_date(d);
            assert_eq!((due - d).num_days(), 14, "{d}");
        }
        let leap = NaiveDate::from_ymd_opt(2028, 2, 20).unwrap();
        assert_eq!(due_date(leap), NaiveDate::from_ymd_opt(2028, 3, 5).unwrap());
        let month_end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(due_date(month_end), NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
    }

    #[test]
    fn test_dates_use_dutch_local_time() {
        let mut o = order(250, 3);
        // 00:30 on New Year's Day in Amsterdam
        o.created_at = Utc.with_ymd_and_hms(2026, 12, 31, 23, 30, 0).unwrap();
        let doc = render_document(DocumentKind::Invoice, &o, &items(&o), &seller());
        assert_eq!(doc.number, "F2027-003");
        assert_eq!(doc.issue_date.en, "1 January 2027");
        assert_eq!(doc.payment.unwrap().due_date.en, "15 January 2027");

        // Summer time: 22:30 UTC is already the next day
        o.created_at = Utc.with_ymd_and_hms(2026, 6, 30, 22, 30, 0).unwrap();
        let doc = render_document(DocumentKind::Invoice, &o, &items(&o), &seller());
        assert_eq!(doc.issue_date.nl, "1 juli 2026");
    }

    #[test]
    fn test_date_formats() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 6).unwrap();
        assert_eq!(format_date_en(d), "6 October 2026");
        assert_eq!(format_date_nl(d), "6 oktober 2026");
    }

    #[test]
    fn test_invoice_totals_and_payment() {
        let o = order(250, 7);
        let doc = render_document(DocumentKind::Invoice, &o, &items(&o), &seller());

        assert_eq!(doc.number, "F2026-007");
        assert_eq!(doc.subtotal, Decimal::from(250));
        assert_eq!(doc.tax, Decimal::new(5250, 2));
        assert_eq!(doc.total, Decimal::new(30250, 2));
        assert_eq!(doc.total_pieces, 5);
        assert_eq!(doc.issue_date.en, "16 October 2026");

        let payment = doc.payment.as_ref().unwrap();
        assert_eq!(payment.due_date.en, "30 October 2026");
        assert_eq!(payment.reference, "F2026-007");
        assert_eq!(payment.terms, "14 Days");
        assert!(doc.terms.is_empty());
    }

    #[test]
    fn test_confirmation_has_terms_not_payment() {
        let o = order(250, 12);
        let doc = render_document(DocumentKind::Confirmation, &o, &items(&o), &seller());
        assert!(doc.payment.is_none());
        assert_eq!(doc.terms.len(), 3);
        assert_eq!(doc.number, "F2026-012");
        assert_eq!(
            doc.customer.address_lines,
            vec!["Oudegracht 12", "3511 AP Utrecht", "NL"]
        );
    }

    #[test]
    fn test_subtotal_uses_stored_total() {
        let o = order(300, 1);
        let doc = render_document(DocumentKind::Confirmation, &o, &items(&o), &seller());
        assert_eq!(doc.subtotal, Decimal::from(300));
        assert_eq!(doc.products.first().map(|p| p.total_value), Some(Decimal::from(250)));
    }

    #[test]
    fn test_text_rendering_mentions_key_fields() {
        let o = order(250, 7);
        let text = render_document(DocumentKind::Invoice, &o, &items(&o), &seller()).to_string();
        assert!(text.contains("Invoice No.   F2026-007"));
        assert!(text.contains(
            "   Size   36  37  38  39  40  41  42  43  44  45  46  47"
        ));
        assert!(text.contains(
            "   Qty     -   -   -   -   -   2   3   -   -   -   -   -"
        ));
        assert!(!text.contains("For and on behalf of"));
        assert!(text.contains("302.50"));
        assert!(text.contains("Please reference F2026-007 with your payment."));
    }

    #[test]
    fn test_confirmation_text_has_signature_block() {
        let o = order(250, 7);
        let text = render_document(DocumentKind::Confirmation, &o, &items(&o), &seller()).to_string();
        assert!(text.contains("For and on behalf of Example Footwear B.V."));
        assert!(text.contains("For and on behalf of the Buyer"));
        assert_eq!(text.matches("Name / Signature / Date").count(), 2);
        assert!(!text.contains("Please reference"));
    }

    #[test]
    fn test_text_rendering_lists_off_bar_sizes() {
        let o = order(250, 7);
        let mut lines = items(&o);
        if let Some(first) = lines.first_mut() {
            first.variant_title = Some("One Size".to_owned());
        }
        let text = render_document(DocumentKind::Invoice, &o, &lines, &seller()).to_string();
        assert!(text.contains("   Other sizes: One Size x2"));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("invoice".parse::<DocumentKind>().unwrap(), DocumentKind::Invoice);
        assert!("receipt".parse::<DocumentKind>().is_err());
    }
}
