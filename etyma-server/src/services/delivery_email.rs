//! Delivery email for a finished print

use super::relay_client::{Attachment, OutgoingEmail};
use crate::pdf::poster_filename;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use etyma_common::NameAnalysis;

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML body of the delivery email
///
/// `name` and `meaning` are escaped here; callers pass raw text.
pub fn delivery_html(name: &str, meaning: &str, site_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="margin:0;padding:0;background:#FDF6EC;font-family:Georgia,'Times New Roman',serif;">
  <div style="max-width:600px;margin:0 auto;padding:40px 24px;">
    <div style="text-align:center;margin-bottom:32px;">
      <h1 style="font-size:28px;color:#2C2824;letter-spacing:4px;margin:0;">ETYMA</h1>
      <p style="font-size:12px;color:#C4BAB0;letter-spacing:6px;margin:4px 0 0;text-transform:uppercase;">Word Anatomy</p>
    </div>
    <div style="background:white;border-radius:12px;padding:40px;margin-bottom:24px;">
      <h2 style="font-size:22px;color:#2C2824;margin:0 0 16px;">Your print is ready &#10024;</h2>
      <p style="font-size:16px;color:#8A8078;line-height:1.6;margin:0 0 16px;">
        Thank you for your order. Your custom <strong style="color:#D4930D;">{name}</strong> etymology poster is attached to this email as a high-resolution PDF.
      </p>
      <p style="font-size:16px;color:#8A8078;line-height:1.6;margin:0 0 24px;">
        {meaning}
      </p>
      <div style="background:#FDF6EC;border-radius:8px;padding:20px;border-left:3px solid #D4930D;">
        <p style="font-size:14px;color:#8A8078;margin:0;">
          <strong style="color:#2C2824;">Print tip:</strong> Your PDF is sized at A2 (420 &times; 594mm).
          For best results, use a professional print service and choose matte or fine art paper.
        </p>
      </div>
    </div>
    <div style="text-align:center;padding:24px 0;">
      <p style="font-size:12px;color:#C4BAB0;margin:0;">
        Made with care by <a href="{site}" style="color:#D4930D;text-decoration:none;">Etyma</a>
      </p>
    </div>
  </div>
</body>
</html>"#,
        name = escape_html(name),
        meaning = escape_html(meaning),
        site = escape_html(site_url),
    )
}

/// Complete delivery email with the poster attached
pub fn delivery_email(
    to: &str,
    name: &str,
    analysis: &NameAnalysis,
    pdf: &[u8],
    site_url: &str,
) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Your Etyma Print: {}", name),
        html_body: delivery_html(name, &analysis.meaning_sentence(name), site_url),
        attachments: vec![Attachment {
            filename: poster_filename(name),
            mime_type: "application/pdf".to_string(),
            content: STANDARD.encode(pdf),
        }],
    }
}
