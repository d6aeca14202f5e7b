//! Actions the session can take, triggered either by a slash command typed by
//! the user or by a `[[directive]]` line in a model reply.

use crate::error::{input_error, AppResult, Error};
use crate::workflow::TimeOffRange;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connect,
    SetRange(TimeOffRange),
    Fetch,
    ListMeetings,
    /// Cancel one recurring meeting by number, or every open one
    CancelRecurring {
        meeting: Option<usize>,
        notify_attendees: bool,
    },
    Draft(usize),
    Edit(usize, String),
    Send(usize),
    Reset,
    Help,
    Quit,
}

impl Action {
    /// Short name used in logs and the state summary
    pub fn label(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::SetRange(_) => "set range",
            Action::Fetch => "fetch meetings",
            Action::ListMeetings => "list meetings",
            Action::CancelRecurring { meeting: None, .. } => "cancel recurring meetings",
            Action::CancelRecurring { meeting: Some(_), .. } => "cancel recurring meeting",
            Action::Draft(_) => "draft email",
            Action::Edit(_, _) => "edit email",
            Action::Send(_) => "send email",
            Action::Reset => "reset",
            Action::Help => "help",
            Action::Quit => "quit",
        }
    }
}

/// Parse a slash command. Returns `None` for ordinary chat text.
pub fn parse_command(input: &str) -> AppResult<Option<Action>> {
    let input = input.trim();
    let Some(command) = input.strip_prefix('/') else {
        return Ok(None);
    };

    let (name, rest) = split_word(command);
    let args: Vec<&str> = rest.split_whitespace().collect();

    let action = match name {
        "connect" => Action::Connect,
        "range" => match args.as_slice() {
            [start, end] => Action::SetRange(TimeOffRange::parse(start, end)?),
            _ => return Err(input_error("Usage: /range YYYY-MM-DD YYYY-MM-DD")),
        },
        "fetch" => Action::Fetch,
        "meetings" => Action::ListMeetings,
        "cancel" => parse_cancel(&args).ok_or_else(|| input_error("Usage: /cancel [N] [silent]"))?,
        "draft" => Action::Draft(single_number(&args, "Usage: /draft N")?),
        "send" => Action::Send(single_number(&args, "Usage: /send N")?),
        "edit" => {
            let (number, text) = split_word(rest);
            let number = parse_number(number).ok_or_else(|| input_error("Usage: /edit N TEXT"))?;
            Action::Edit(number, text.to_string())
        }
        "reset" => Action::Reset,
        "help" => Action::Help,
        "quit" | "exit" => Action::Quit,
        other => return Err(input_error(&format!("Unknown command /{} (try /help)", other))),
    };

    Ok(Some(action))
}

/// Pull `[[...]]` directives out of a model reply. Returns the reply with the
/// directives removed and the actions in order of appearance.
pub fn extract_directives(reply: &str) -> AppResult<(String, Vec<Action>)> {
    let mut actions = Vec::new();
    let mut kept_lines = Vec::new();

    for line in reply.lines() {
        let mut remaining = line;
        let mut kept = String::new();
        let mut had_directive = false;

        while let Some(open) = remaining.find("[[") {
            let after_open = &remaining[open + 2..];
            let close = after_open
                .find("]]")
                .ok_or_else(|| malformed(&format!("unterminated directive in '{}'", line.trim())))?;
            kept.push_str(&remaining[..open]);
            actions.push(parse_directive(&after_open[..close])?);
            had_directive = true;
            remaining = &after_open[close + 2..];
        }
        kept.push_str(remaining);

        if had_directive && kept.trim().is_empty() {
            continue;
        }
        kept_lines.push(kept.trim_end().to_string());
    }

    Ok((kept_lines.join("\n").trim().to_string(), actions))
}

fn parse_directive(body: &str) -> AppResult<Action> {
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("connect", []) => Ok(Action::Connect),
        ("fetch", []) => Ok(Action::Fetch),
        ("set_range", [start, end]) => TimeOffRange::parse(start, end)
            .map(Action::SetRange)
            .map_err(|e| malformed(&format!("bad set_range directive: {}", e))),
        ("cancel_recurring", [mode]) => notify_mode(mode)
            .map(|notify_attendees| Action::CancelRecurring {
                meeting: None,
                notify_attendees,
            })
            .ok_or_else(|| malformed(&format!("bad notify mode '{}'", mode))),
        ("cancel", [n, mode]) => match (parse_number(n), notify_mode(mode)) {
            (Some(number), Some(notify_attendees)) => Ok(Action::CancelRecurring {
                meeting: Some(number),
                notify_attendees,
            }),
            _ => Err(malformed(&format!("bad cancel directive [[{}]]", body.trim()))),
        },
        ("draft", [n]) => parse_number(n)
            .map(Action::Draft)
            .ok_or_else(|| malformed(&format!("bad meeting number '{}'", n))),
        ("send", [n]) => parse_number(n)
            .map(Action::Send)
            .ok_or_else(|| malformed(&format!("bad meeting number '{}'", n))),
        _ => Err(malformed(&format!("unknown directive [[{}]]", body.trim()))),
    }
}

/// `/cancel` takes an optional meeting number and an optional notify mode
fn parse_cancel(args: &[&str]) -> Option<Action> {
    let (meeting, mode) = match args {
        [] => (None, None),
        [single] => match parse_number(single) {
            Some(number) => (Some(number), None),
            None => (None, Some(*single)),
        },
        [n, mode] => (Some(parse_number(n)?), Some(*mode)),
        _ => return None,
    };
    let notify_attendees = match mode {
        Some(mode) => notify_mode(mode)?,
        None => true,
    };

    Some(Action::CancelRecurring {
        meeting,
        notify_attendees,
    })
}

fn notify_mode(mode: &str) -> Option<bool> {
    match mode {
        "notify" => Some(true),
        "silent" => Some(false),
        _ => None,
    }
}

fn malformed(message: &str) -> Error {
    Error::MalformedResponse(message.to_string())
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn single_number(args: &[&str], usage: &str) -> AppResult<usize> {
    match args {
        [n] => parse_number(n).ok_or_else(|| input_error(usage)),
        _ => Err(input_error(usage)),
    }
}

fn parse_number(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|n| *n > 0)
}
