use crate::error::{mail_error, AppResult};
use crate::workflow::OutgoingMail;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

/// Render an RFC 5322 plain-text message
pub fn build_message(from: &str, mail: &OutgoingMail) -> AppResult<String> {
    if mail.to.is_empty() {
        return Err(mail_error("Message has no recipients"));
    }

    let mut message = String::new();
    message.push_str(&format!("From: {}\r\n", header_value(from)));
    message.push_str(&format!(
        "To: {}\r\n",
        mail.to.iter().map(|to| header_value(to)).collect::<Vec<_>>().join(", ")
    ));
    message.push_str(&format!("Subject: {}\r\n", encode_header(&header_value(&mail.subject))));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/plain; charset=\"utf-8\"\r\n");

    if mail.body.is_ascii() {
        message.push_str("Content-Transfer-Encoding: 7bit\r\n\r\n");
        message.push_str(&mail.body.replace("\r\n", "\n").replace('\n', "\r\n"));
    } else {
        message.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        let encoded = STANDARD.encode(mail.body.as_bytes());
        for line in encoded.as_bytes().chunks(76) {
            message.push_str(&String::from_utf8_lossy(line));
            message.push_str("\r\n");
        }
    }

    Ok(message)
}

/// Base64url form expected in the `raw` field of `messages.send`
pub fn encode_raw(message: &str) -> String {
    URL_SAFE.encode(message.as_bytes())
}

/// RFC 2047 encoded word for non-ASCII header text
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

// Headers are single-line
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}
