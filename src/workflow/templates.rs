use crate::error::{AppResult, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholders a template may use
pub const PLACEHOLDERS: &[&str] = &[
    "meeting_name",
    "meeting_date",
    "meeting_time",
    "attendee_name",
    "time_off_start",
    "time_off_end",
    "user_name",
    "note",
];

const ONE_OFF_SUBJECT: &str = "Unable to Attend: {meeting_name}";

const ONE_OFF_BODY: &str = "Hi {attendee_name},

I hope you're doing well. I wanted to let you know that I'll be unavailable for our scheduled meeting \"{meeting_name}\" on {meeting_date} at {meeting_time} as I will be taking some time off from {time_off_start} to {time_off_end}.

{note}

Would it be possible to reschedule this meeting for after my return?

Best regards,
{user_name}";

/// Subject and body with `{placeholder}` markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            subject: ONE_OFF_SUBJECT.to_string(),
            body: ONE_OFF_BODY.to_string(),
        }
    }
}

impl MessageTemplate {
    /// Check that every marker in the template is a known placeholder
    pub fn validate(&self) -> AppResult<()> {
        let unknown: Vec<String> = markers(&self.subject)
            .into_iter()
            .chain(markers(&self.body))
            .filter(|name| !PLACEHOLDERS.contains(&name.as_str()))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::Template(format!("Unknown placeholders: {}", unknown.join(", "))))
        }
    }

    /// Render subject and body
    pub fn render(&self, values: &HashMap<&str, String>) -> AppResult<(String, String)> {
        Ok((substitute(&self.subject, values)?, substitute(&self.body, values)?))
    }
}

/// Names of all `{identifier}` markers in a text
pub fn markers(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                found.push(after[..close].to_string());
                rest = &after[close + 1..];
            }
            _ => rest = after,
        }
    }
    found
}

/// Replace every marker with its value in a single pass. Inserted values are
/// not scanned again, so braces in user text survive untouched.
pub fn substitute(template: &str, values: &HashMap<&str, String>) -> AppResult<String> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut missing = Vec::new();

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                let name = &after[..close];
                match values.get(name) {
                    Some(value) => output.push_str(value),
                    None => missing.push(name.to_string()),
                }
                rest = &after[close + 1..];
            }
            _ => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);

    if missing.is_empty() {
        Ok(output)
    } else {
        Err(Error::Template(format!("No value for placeholders: {}", missing.join(", "))))
    }
}

fn is_identifier(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> HashMap<&'static str, String> {
        PLACEHOLDERS
            .iter()
            .map(|name| (*name, format!("<{}>", name)))
            .collect()
    }

    #[test]
    fn builtin_template_is_valid() {
        MessageTemplate::default().validate().unwrap();
    }

    #[test]
    fn substitutes_every_marker() {
        let (subject, body) = MessageTemplate::default().render(&values()).unwrap();
        assert_eq!(subject, "Unable to Attend: <meeting_name>");
        assert!(body.starts_with("Hi <attendee_name>,"));
        assert!(markers(&body).is_empty());
    }

    #[test]
    fn user_text_with_braces_is_not_rescanned() {
        let mut values = values();
        values.insert("note", "see {meeting_name} notes in {the wiki}".to_string());
        let rendered = substitute("Note: {note}", &values).unwrap();
        assert_eq!(rendered, "Note: see {meeting_name} notes in {the wiki}");
    }

    #[test]
    fn non_identifier_braces_are_literal() {
        let rendered = substitute("json {\"a\": 1} and { spaced }", &HashMap::new()).unwrap();
        assert_eq!(rendered, "json {\"a\": 1} and { spaced }");
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = substitute("Hi {attendee_name}", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn unknown_marker_fails_validation() {
        let template = MessageTemplate {
            subject: "Hello".to_string(),
            body: "{unknown_thing}".to_string(),
        };
        assert!(template.validate().is_err());
    }
}
