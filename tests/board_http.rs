//! Board and CLI commands against a mock HTTP task API.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskboard::cli::{self, Command};
use taskboard_client::HttpTaskGateway;
use taskboard_core::{Severity, TaskId, TaskStatus};
use taskboard_engine::{EngineError, SortOrder, StatusFilter, TaskBoard};
use taskboard_settings::TaskboardSettings;

fn task_json(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "titulo": title,
        "descricao": null,
        "status": status,
        "dataCriacao": "2024-05-01T12:00:00Z",
        "dataConclusao": null
    })
}

fn page(tasks: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "content": tasks, "totalElements": 0 }))
}

fn board_for(server: &MockServer) -> TaskBoard {
    let mut settings = TaskboardSettings::default();
    settings.api.base_url = server.uri();
    let gateway = HttpTaskGateway::new(&settings.api).unwrap();
    TaskBoard::from_settings(Arc::new(gateway), &settings)
}

#[tokio::test]
async fn list_command_filters_and_sorts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![
            task_json("1", "B", "PENDENTE"),
            task_json("2", "A", "CONCLUIDO"),
            task_json("3", "C", "PENDENTE"),
        ]))
        .mount(&server)
        .await;

    let board = board_for(&server);
    let output = cli::run(
        &board,
        Command::List {
            filter: StatusFilter::Only(TaskStatus::Pending),
            sort: SortOrder::TitleAsc,
        },
    )
    .await
    .unwrap();

    let rows: Vec<_> = output.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].ends_with('B'));
    assert!(rows[1].ends_with('C'));
    assert!(board.notifications().is_empty());
}

#[tokio::test]
async fn toggle_sends_status_only_and_revalidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![task_json("1", "Write", "PENDENTE")]))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![task_json("1", "Write", "CONCLUIDO")]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/tarefas/1"))
        .and(body_json(json!({"status": "CONCLUIDO"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("1", "Write", "CONCLUIDO")))
        .expect(1)
        .mount(&server)
        .await;

    let board = board_for(&server);
    cli::run(&board, Command::Toggle { id: TaskId::from_raw("1") })
        .await
        .unwrap();

    let task = board.store().get(&TaskId::from_raw("1")).unwrap();
    assert_eq!(task.status, TaskStatus::Done);
    let notes = board.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Success);
    assert_eq!(notes[0].lifetime_ms, 3_000);
}

#[tokio::test]
async fn server_error_on_update_keeps_cache_and_notifies_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![task_json("1", "Write", "PENDENTE")]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/tarefas/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let board = board_for(&server);
    let before = {
        board.load().await.unwrap();
        board.store().snapshot()
    };
    let err = board
        .change_status(&TaskId::from_raw("1"), TaskStatus::InProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Remote(ref e) if e.status() == Some(500)));
    assert_eq!(board.store().snapshot(), before);
    let notes = board.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert_eq!(notes[0].lifetime_ms, 5_000);
}

#[tokio::test]
async fn create_command_posts_full_draft() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tarefas"))
        .and(body_json(json!({
            "titulo": "Pay rent",
            "descricao": null,
            "status": "PENDENTE",
            "dataConclusao": "2024-06-01T00:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("9", "Pay rent", "PENDENTE")))
        .expect(1)
        .mount(&server)
        .await;

    let board = board_for(&server);
    cli::run(
        &board,
        Command::Create {
            title: "Pay rent".into(),
            description: Some(String::new()),
            due: Some("2024-06-01".into()),
        },
    )
    .await
    .unwrap();

    // The revalidation returned an empty list, which is the server's truth.
    assert!(board.store().is_empty());
    assert!(board.form().is_none());
}

#[tokio::test]
async fn show_unknown_task_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tarefas"))
        .respond_with(page(vec![task_json("1", "Write", "PENDENTE")]))
        .mount(&server)
        .await;

    let board = board_for(&server);
    let err = cli::run(&board, Command::Show { id: TaskId::from_raw("2") })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TaskNotFound(_)));

    let output = cli::run(&board, Command::Show { id: TaskId::from_raw("1") })
        .await
        .unwrap();
    assert!(output.starts_with("Write"));
}

#[tokio::test]
async fn unreachable_api_reports_load_failure() {
    let mut settings = TaskboardSettings::default();
    settings.api.base_url = "http://127.0.0.1:9".into();
    let gateway = HttpTaskGateway::new(&settings.api).unwrap();
    let board = TaskBoard::from_settings(Arc::new(gateway), &settings);

    let err = cli::run(
        &board,
        Command::List {
            filter: StatusFilter::All,
            sort: SortOrder::TitleAsc,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Remote(_)));
    let notes = board.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Failed to load tasks");
}
