use chrono::{DateTime, NaiveDate, Utc};
use clinic_sessions::domain::session::PaymentStatus;
use clinic_sessions::domain::types::SessionId;
use clinic_sessions::dto::sessions::{NoticeKind, TRANSCRIPTION_NOT_FOUND, UiMode};
use clinic_sessions::forms::session::NewSessionForm;
use clinic_sessions::forms::transcription::AddTranscriptionForm;
use clinic_sessions::repository::HttpRepository;
use clinic_sessions::services::calendar::CalendarController;
use clinic_sessions::services::session_list::SessionListController;

mod common;

use common::{StubBackend, session_json, transcription_json};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-20T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn id(raw: i32) -> SessionId {
    SessionId::new(raw).unwrap()
}

fn three_sessions() -> String {
    format!(
        "[{},{},{}]",
        session_json(1, "2024-05-10T09:00:00", "2024-05-10T09:45:00", Some("Ana María"), true),
        session_json(2, "2024-05-10T10:00:00", "2024-05-10T11:00:00", Some("Bruno Díaz"), false),
        session_json(3, "2024-05-15T09:00:00", "2024-05-15T10:30:00", None, false),
    )
}

#[tokio::test]
async fn list_filters_and_deletes_over_http() {
    let backend = StubBackend::start().await;
    backend.reply("GET /sessions", 200, three_sessions());
    backend.reply("DELETE /sessions/2", 200, "");
    let repo = HttpRepository::new(&backend.config()).unwrap();
    let mut list = SessionListController::from_config(&backend.config());

    list.load(&repo).await.unwrap();
    list.set_search("ana");
    assert_eq!(list.filtered_len(), 1);
    list.clear_filters();
    list.set_status(Some(PaymentStatus::Pending));
    assert_eq!(list.filtered_len(), 2);
    list.clear_filters();

    backend.reply(
        "GET /sessions",
        200,
        format!(
            "[{},{}]",
            session_json(1, "2024-05-10T09:00:00", "2024-05-10T09:45:00", Some("Ana María"), true),
            session_json(3, "2024-05-15T09:00:00", "2024-05-15T10:30:00", None, false),
        ),
    );

    assert!(list.show_actions(&repo, id(2)).await);
    assert!(list.on_delete_session());
    list.confirm_delete_session(&repo, now()).await.unwrap();

    assert_eq!(backend.count("DELETE /sessions/2"), 1);
    assert_eq!(backend.count("GET /sessions"), 2);
    assert_eq!(list.sessions().len(), 2);
    assert!(!list.view_state(now()).modal_open);
    assert_eq!(
        list.active_notice(now()).map(|n| n.kind),
        Some(NoticeKind::Success)
    );
}

#[tokio::test]
async fn transcription_can_be_added_from_the_action_menu() {
    let backend = StubBackend::start().await;
    backend.reply("GET /sessions", 200, three_sessions());
    backend.reply(
        "POST /transcriptions",
        201,
        transcription_json(70, 3, "Paciente tranquila, buena adherencia."),
    );
    let repo = HttpRepository::new(&backend.config()).unwrap();
    let mut list = SessionListController::from_config(&backend.config());
    list.load(&repo).await.unwrap();

    list.show_actions(&repo, id(3)).await;
    assert!(list.view_transcription(&repo).await);
    match list.mode() {
        UiMode::ViewTranscription { transcription, .. } => {
            assert_eq!(transcription.message(), Some(TRANSCRIPTION_NOT_FOUND));
        }
        other => panic!("unexpected mode {other:?}"),
    }

    list.show_actions(&repo, id(3)).await;
    assert!(list.on_add_transcription());
    let created = list
        .submit_transcription(
            &repo,
            AddTranscriptionForm::new("Paciente tranquila, buena adherencia."),
            now(),
        )
        .await
        .unwrap();

    assert_eq!(created.id.get(), 70);
    assert_eq!(list.mode(), &UiMode::None);
    assert_eq!(backend.count("POST /transcriptions"), 1);
}

#[tokio::test]
async fn rejected_session_keeps_the_form_open() {
    let backend = StubBackend::start().await;
    backend.reply("GET /sessions", 200, "[]");
    backend.reply(
        "POST /sessions",
        400,
        r#"{"message":"El paciente no existe","statusCode":400}"#,
    );
    let repo = HttpRepository::new(&backend.config()).unwrap();
    let mut list = SessionListController::from_config(&backend.config());
    list.load(&repo).await.unwrap();

    list.open_new_session();
    let form = NewSessionForm {
        patient_id: 999,
        date: "2024-05-21".to_string(),
        start_time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        session_type: "evaluacion".to_string(),
        notes: Some("Primera evaluación".to_string()),
        amount: 40_000.0,
        paid: false,
    };
    assert!(list.submit_new_session(&repo, form, now()).await.is_err());

    assert_eq!(
        list.mode(),
        &UiMode::NewSession {
            error: Some("Error: El paciente no existe".to_string())
        }
    );
    assert_eq!(backend.count("GET /sessions"), 1);
}

#[tokio::test]
async fn calendar_day_over_http() {
    let backend = StubBackend::start().await;
    backend.reply("GET /sessions", 200, three_sessions());
    backend.reply(
        "GET /transcriptions/session/2",
        200,
        transcription_json(20, 2, "Notas de Bruno"),
    );
    let repo = HttpRepository::new(&backend.config()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let mut calendar = CalendarController::new(today);

    calendar.load_month(&repo, today).await.unwrap();
    let detail = calendar
        .show_day(&repo, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        .await
        .unwrap();

    let contents: Vec<Option<&str>> = detail
        .sessions_with_transcriptions()
        .into_iter()
        .map(|(_, t)| t.map(|t| t.content.as_str()))
        .collect();
    assert_eq!(contents, vec![None, Some("Notas de Bruno")]);
    assert_eq!(backend.count("GET /transcriptions/session/1"), 1);
    assert_eq!(backend.count("GET /transcriptions/session/2"), 1);
}
