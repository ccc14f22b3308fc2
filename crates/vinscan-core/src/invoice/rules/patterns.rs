//! Common regex patterns for wine invoice extraction.
//!
//! All patterns are case-insensitive. `.` never crosses a line break, so a
//! lazy `.*?` stays within the line it starts on.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number, most specific first
    pub static ref INVOICE_NUMBER_EN_COMPTE: Regex = Regex::new(
        r"(?i)FACTURE\s+EN\s+COMPTE.*?N[°o]?\s*([0-9]{3,})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_MARKED: Regex = Regex::new(
        r"(?i)FACTURE.*?N[°o]\s*([0-9]{3,})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_BARE_N: Regex = Regex::new(
        r"(?i)FACTURE.*?N\s*([0-9]{3,})"
    ).unwrap();

    pub static ref NUMBER_SIGN: Regex = Regex::new(
        r"(?i)N°\s*([0-9]{3,})"
    ).unwrap();

    // Delivery address
    pub static ref DELIVERY_ADDRESS: Regex = Regex::new(
        r"(?i)Adresse de livraison\s*[:\-]\s*(.+)"
    ).unwrap();

    pub static ref ADDRESS_LOOSE: Regex = Regex::new(
        r"(?i)Adresse(?:\s+de\s+livraison)?\s*[:\-]?\s*\n?\s*(.+)"
    ).unwrap();

    // Payer code ("DOIT" = billed to)
    pub static ref PAYER_CODE: Regex = Regex::new(
        r"(?i)\bDOIT\s*[:\-]?\s*([A-Z0-9]{2,6})"
    ).unwrap();

    // Purchase order
    pub static ref PURCHASE_ORDER: Regex = Regex::new(
        r"(?i)Suivant votre bon de commande\s*[:\-]?\s*([0-9A-Za-z\-/]+)"
    ).unwrap();

    pub static ref PURCHASE_ORDER_LOOSE: Regex = Regex::new(
        r"(?i)bon de commande\s*[:\-]?\s*(.+)"
    ).unwrap();

    // Bottle lines: <name> <75 cl marker> <int> <int> <count>
    pub static ref BOTTLE_LINE: Regex = Regex::new(
        r"(?i)(.+?)\s*(?:75\s*cls?|75)\s+[0-9]+\s+[0-9]+\s+([0-9]+)"
    ).unwrap();

    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    pub static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();
}
