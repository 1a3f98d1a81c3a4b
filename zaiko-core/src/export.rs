use std::borrow::Cow;

use crate::product::Product;

/// UTF-8 encoding of U+FEFF. Leading BOM makes spreadsheet applications
/// default to UTF-8 when opening the file.
const UTF8_BOM: &str = "\u{feff}";

/// Every line, header included, ends with CRLF.
const LINE_ENDING: &str = "\r\n";

/// Fixed column labels in the application's display language.
const HEADER: &str = "ID,商品名,数量,単価,合計金額";

/// Serialize an already filtered and ordered product sequence into one
/// in-memory CSV payload: BOM, header, then one line per record with
/// id, name, quantity, unit price and derived total. Absent numeric
/// fields render as 0, an absent name as the empty string.
pub fn to_csv(products: &[Product]) -> Vec<u8> {
    let mut out = String::with_capacity(UTF8_BOM.len() + HEADER.len() + products.len() * 32);
    out.push_str(UTF8_BOM);
    out.push_str(HEADER);
    out.push_str(LINE_ENDING);

    for product in products {
        let name = escape_field(product.name.as_deref().unwrap_or(""));
        out.push_str(&format!(
            "{},{},{},{},{}",
            product.id.unwrap_or(0),
            name,
            product.quantity.unwrap_or(0),
            product.unit_price.unwrap_or(0),
            product.total(),
        ));
        out.push_str(LINE_ENDING);
    }

    out.into_bytes()
}

/// RFC 4180 quoting for the one free-text column: wrap in double quotes
/// and double every inner quote iff the value contains a comma, a double
/// quote or a line terminator. Clean values pass through untouched.
fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, quantity: i64, unit_price: i64) -> Product {
        Product {
            id: Some(id),
            name: Some(name.to_string()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            created_at: None,
        }
    }

    #[test]
    fn test_payload_is_byte_exact() {
        let products = vec![product(1, "A,B", 2, 5), product(2, "Say \"hi\"", 0, 3)];

        let payload = to_csv(&products);
        let expected = "\u{feff}ID,商品名,数量,単価,合計金額\r\n\
                        1,\"A,B\",2,5,10\r\n\
                        2,\"Say \"\"hi\"\"\",0,3,0\r\n";
        assert_eq!(payload, expected.as_bytes());
    }

    #[test]
    fn test_payload_starts_with_utf8_bom() {
        let payload = to_csv(&[]);
        assert_eq!(&payload[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn test_empty_listing_is_header_only() {
        let payload = to_csv(&[]);
        let text = String::from_utf8(payload).unwrap();
        assert_eq!(text, "\u{feff}ID,商品名,数量,単価,合計金額\r\n");
    }

    #[test]
    fn test_clean_name_is_never_quoted() {
        let payload = to_csv(&[product(1, "Laptop stand", 2, 5)]);
        let text = String::from_utf8(payload).unwrap();
        assert!(text.contains("1,Laptop stand,2,5,10\r\n"));
        assert!(!text.contains('"'));
    }

    #[test]
    fn test_name_with_newline_is_quoted() {
        let payload = to_csv(&[product(1, "two\nlines", 1, 1)]);
        let text = String::from_utf8(payload).unwrap();
        assert!(text.contains("1,\"two\nlines\",1,1,1\r\n"));
    }

    #[test]
    fn test_absent_fields_render_as_zero_and_empty() {
        let bare = Product::default();
        let payload = to_csv(&[bare]);
        let text = String::from_utf8(payload).unwrap();
        assert!(text.ends_with("0,,0,0,0\r\n"));
    }
}
