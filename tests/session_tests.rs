mod support;

use chrono_tz::Tz;
use meeting_rescheduler::error::Error;
use meeting_rescheduler::session::{LoopState, MeetingStatus, Outcome, Role, Session};
use meeting_rescheduler::workflow::{MessageTemplate, NotificationComposer};
use support::{june_range, june_week, Harness, MockCalendar, RecordingMail, ScriptedModel};

fn session(harness: &Harness) -> Session {
    Session::new(
        harness.services.clone(),
        NotificationComposer::new(MessageTemplate::default()),
        Tz::UTC,
        None,
    )
}

fn reply(outcome: Outcome) -> String {
    match outcome {
        Outcome::Reply(text) => text,
        other => panic!("expected a reply, got {:?}", other),
    }
}

/// Runs the slash commands that get a session to a fetched state
async fn fetched_session(harness: &Harness) -> Session {
    let mut session = session(harness);
    reply(session.handle_input("/connect").await);
    reply(session.handle_input("/range 2024-06-01 2024-06-07").await);
    reply(session.handle_input("/fetch").await);
    session
}

#[tokio::test]
async fn test_transcript_grows_by_one_exchange_per_input() {
    let harness = Harness::new(
        MockCalendar::default(),
        RecordingMail::default(),
        ScriptedModel::new(vec![
            Ok("When does your time off start?".to_string()),
            Ok("And when are you back?".to_string()),
        ]),
    );
    let mut session = session(&harness);
    assert!(session.transcript().is_empty());

    let first = reply(session.handle_input("I'm going on holiday").await);
    assert_eq!(first, "When does your time off start?");
    assert_eq!(session.transcript().len(), 2);

    reply(session.handle_input("June 1st").await);
    assert_eq!(session.transcript().len(), 4);

    let turns = session.transcript().turns();
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[2].text, "June 1st");
    assert_eq!(turns[3].text, "And when are you back?");

    let calls = harness.model.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[1].history.len(), 2);
    assert_eq!(calls[1].message, "June 1st");
    assert_eq!(session.loop_state(), LoopState::AwaitingUserInput);
}

#[tokio::test]
async fn test_failed_model_call_rolls_back_user_turn() {
    let harness = Harness::new(
        MockCalendar::default(),
        RecordingMail::default(),
        ScriptedModel::new(vec![
            Err(Error::LanguageModel("timeout".to_string())),
            Ok("Hello again".to_string()),
        ]),
    );
    let mut session = session(&harness);

    let failure = reply(session.handle_input("hello").await);
    assert!(failure.contains("timeout"));
    assert!(session.transcript().is_empty());
    assert!(session.state().last_error.is_some());

    let retry = reply(session.handle_input("hello").await);
    assert_eq!(retry, "Hello again");
    assert_eq!(session.transcript().len(), 2);
    assert!(harness.model.calls()[1].history.is_empty());
}

#[tokio::test]
async fn test_model_directives_drive_the_workflow() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::new(vec![Ok(
            "Let me look at that week.\n[[connect]]\n[[set_range 2024-06-01 2024-06-07]]\n[[fetch]]".to_string(),
        )]),
    );
    let mut session = session(&harness);

    let text = reply(session.handle_input("I'm off June 1 to June 7").await);

    assert!(text.starts_with("Let me look at that week."));
    assert!(text.contains("me@example.com"));
    assert!(text.contains("Design review"));
    assert!(!text.contains("[["));

    let state = session.state();
    assert!(state.account.is_some());
    assert_eq!(state.recurring.len(), 3);
    assert_eq!(state.one_off.len(), 2);
    // One preview after sign-in, one fetch for the range
    let list_calls = harness.calendar.list_calls.lock().unwrap().clone();
    assert_eq!(list_calls.len(), 2);
    assert_eq!(list_calls[0].days(), 7);
    assert_eq!(list_calls[1], june_range());

    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript().turns()[1].text, text);
}

#[tokio::test]
async fn test_unknown_directive_is_reported_and_not_recorded() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::new(vec![Ok("Done! [[delete_calendar]]".to_string())]),
    );
    let mut session = session(&harness);

    let text = reply(session.handle_input("clear everything").await);
    assert!(text.contains("delete_calendar"));
    assert!(session.transcript().is_empty());
    assert!(harness.calendar.cancel_attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_state_summary_reaches_the_model() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = fetched_session(&harness).await;

    reply(session.handle_input("what now?").await);

    let calls = harness.model.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].preamble.contains("Connected to Google as me@example.com"));
    assert!(calls[0].preamble.contains("2024-06-01 to 2024-06-07"));
    assert!(calls[0].preamble.contains("3 recurring (0 cancelled), 2 one-off (0 notified)"));
    // Slash commands are part of the history the model sees
    assert_eq!(calls[0].history.len(), 6);
}

#[tokio::test]
async fn test_cancel_retries_only_failed_meetings() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()).failing_on("standup-0604"),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = fetched_session(&harness).await;

    let first = reply(session.handle_input("/cancel silent").await);
    assert!(first.contains("Cancelled 2 of 3"));
    assert!(first.contains("Daily standup"));
    assert!(matches!(session.state().recurring[1].status, MeetingStatus::Failed(_)));

    harness.calendar.recover("standup-0604");
    let second = reply(session.handle_input("/cancel silent").await);
    assert!(second.contains("Cancelled 1 of 1"));
    assert_eq!(harness.calendar.cancel_attempts.lock().unwrap().len(), 4);
    assert!(session
        .state()
        .recurring
        .iter()
        .all(|m| m.status == MeetingStatus::Cancelled));

    let third = reply(session.handle_input("/cancel").await);
    assert!(third.contains("no recurring meetings left"));
    assert!(harness.calendar.cancelled.lock().unwrap().iter().all(|(_, notify)| !notify));
}

#[tokio::test]
async fn test_cancel_single_recurring_meeting_keeps_the_others() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::new(vec![Ok("Cancelling the 1:1 only.\n[[cancel 3 notify]]".to_string())]),
    );
    let mut session = fetched_session(&harness).await;

    let text = reply(session.handle_input("/cancel 2 silent").await);
    assert!(text.contains("Cancelled 1 of 1"));
    assert_eq!(harness.calendar.cancelled_ids(), vec!["standup-0604"]);

    let statuses: Vec<_> = session.state().recurring.iter().map(|m| m.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![MeetingStatus::Pending, MeetingStatus::Cancelled, MeetingStatus::Pending]
    );

    let again = reply(session.handle_input("/cancel 2").await);
    assert!(again.contains("already cancelled"));
    let missing = reply(session.handle_input("/cancel 4").await);
    assert!(missing.contains("choose 1-3"));

    let text = reply(session.handle_input("Please drop just the 1:1").await);
    assert!(text.starts_with("Cancelling the 1:1 only."));
    assert_eq!(
        *harness.calendar.cancelled.lock().unwrap(),
        vec![("standup-0604".to_string(), false), ("one-on-one".to_string(), true)]
    );
    assert_eq!(session.state().recurring[0].status, MeetingStatus::Pending);
}

#[tokio::test]
async fn test_connect_previews_the_coming_week() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = session(&harness);

    let text = reply(session.handle_input("/connect").await);
    assert!(text.contains("Connected to Google as me@example.com"));
    assert!(text.contains("5 meetings in the next 7 days"));
    assert!(text.contains("Vendor call"));
    assert!(!session.state().fetched);
}

#[tokio::test]
async fn test_draft_edit_and_send_one_off() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = fetched_session(&harness).await;

    let draft = reply(session.handle_input("/draft 1").await);
    assert!(draft.contains("Unable to Attend: Design review"));
    assert!(draft.contains("design-review-owner@example.com"));

    let edited = reply(session.handle_input("/edit 1 Could we move it to June 11?").await);
    assert!(edited.contains("Could we move it to June 11?"));

    let sent = reply(session.handle_input("/send 1").await);
    assert!(sent.contains("Design review"));
    assert_eq!(session.state().one_off[0].status, MeetingStatus::Notified);

    {
        let mails = harness.mail.sent.lock().unwrap();
        assert_eq!(mails.len(), 1);
        assert!(mails[0].body.contains("Could we move it to June 11?"));
    }

    let again = reply(session.handle_input("/send 1").await);
    assert!(again.contains("already sent"));
    assert_eq!(harness.mail.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_send_marks_meeting_failed() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail {
            fail: true,
            ..Default::default()
        },
        ScriptedModel::default(),
    );
    let mut session = fetched_session(&harness).await;

    let text = reply(session.handle_input("/send 2").await);
    assert!(text.contains("rate limit"));
    assert!(matches!(session.state().one_off[1].status, MeetingStatus::Failed(_)));
    assert!(session.state().last_error.is_some());
}

#[tokio::test]
async fn test_actions_need_their_prerequisites() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = session(&harness);

    let text = reply(session.handle_input("/fetch").await);
    assert!(text.contains("/connect"));
    assert!(harness.calendar.list_calls.lock().unwrap().is_empty());

    reply(session.handle_input("/connect").await);
    let text = reply(session.handle_input("/fetch").await);
    assert!(text.contains("/range"));

    let text = reply(session.handle_input("/draft 1").await);
    assert!(text.contains("/fetch"));

    let text = reply(session.handle_input("/range 2024-06-07 2024-06-01").await);
    assert!(text.contains("before it starts"));
    assert!(session.state().range.is_none());
}

#[tokio::test]
async fn test_reset_quit_and_blank_input() {
    let harness = Harness::new(
        MockCalendar::with_events(june_week()),
        RecordingMail::default(),
        ScriptedModel::default(),
    );
    let mut session = fetched_session(&harness).await;
    assert_eq!(session.transcript().len(), 6);

    reply(session.handle_input("/reset").await);
    assert!(session.transcript().is_empty());
    assert!(session.state().account.is_none());
    assert!(session.state().one_off.is_empty());

    assert_eq!(session.handle_input("   ").await, Outcome::Ignored);
    assert_eq!(session.handle_input("/quit").await, Outcome::Quit);
    assert!(session.transcript().is_empty());
}
