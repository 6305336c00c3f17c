//! HTML rendering for the fortunes page.

use std::fmt::Write;

use tfb_db::Fortune;

const HEAD: &str = "<!DOCTYPE html><html><head><title>Fortunes</title></head><body>\
<table><tr><th>id</th><th>message</th></tr>";
const TAIL: &str = "</table></body></html>";

/// Render the listing as one table row per fortune, in the given order.
pub fn fortunes_html(fortunes: &[Fortune]) -> String {
    let body_len: usize = fortunes.iter().map(|f| f.message.len() + 32).sum();
    let mut out = String::with_capacity(HEAD.len() + body_len + TAIL.len());
    out.push_str(HEAD);
    for fortune in fortunes {
        // Writing into a String cannot fail.
        let _ = write!(out, "<tr><td>{}</td><td>", fortune.id);
        escape_into(&mut out, &fortune.message);
        out.push_str("</td></tr>");
    }
    out.push_str(TAIL);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}
