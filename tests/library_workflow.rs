//! End-to-end session workflow through the library API against a mock backend.

mod common;

use common::{TestContext, VLAN, VLAN_PATH};
use mockito::Matcher;
use ncm::adapters::{HtmlView, TerminalNotifier};
use ncm::app::api::session_from_config;
use ncm::domain::{ClientConfig, IssueReason, SessionPhase, SubmitStatus};
use ncm::{LiveSession, ScriptJob, run_script_job};
use serde_json::json;
use url::Url;

fn session_for(ctx: &TestContext) -> LiveSession {
    let mut config = ClientConfig::default();
    config.api.base_url = Url::parse(&ctx.server.url()).unwrap();
    config.api.retry_delay_ms = 1;
    session_from_config(config, TerminalNotifier::quiet()).unwrap()
}

fn mock_catalog(ctx: &mut TestContext) -> Vec<mockito::Mock> {
    vec![
        ctx.mock_sw1(),
        ctx.mock_task_types(&[VLAN]),
        ctx.mock_subtasks(VLAN_PATH, &["create"]),
        ctx.mock_vlan_create_form(),
        ctx.mock_tasks("SW1", json!([])),
    ]
}

#[test]
fn session_walks_from_device_to_submitted_script() {
    let mut ctx = TestContext::new();
    let _catalog = mock_catalog(&mut ctx);
    let _add = ctx
        .server
        .mock("POST", "/api/tasks")
        .with_status(200)
        .with_body(r#"{"status": "success"}"#)
        .create();
    let _generate = ctx
        .server
        .mock("POST", "/api/generate-script")
        .match_body(Matcher::PartialJson(json!({"device_id": "SW1"})))
        .with_status(200)
        .with_body(r#"{"script": "vlan 20"}"#)
        .create();

    let mut session = session_for(&ctx);
    assert_eq!(session.phase(), SessionPhase::NoDevice);

    session.init().unwrap();
    assert_eq!(session.phase(), SessionPhase::DeviceSelected);

    session.check_task_type(VLAN).unwrap();
    assert_eq!(session.phase(), SessionPhase::TaskTypePicked);
    assert_eq!(session.selection().subtasks(VLAN).to_vec(), vec!["create".to_string()]);

    session.check_subtask(VLAN, "create").unwrap();
    assert_eq!(session.phase(), SessionPhase::SubtaskPicked);

    let issue = session.set_value(VLAN, "create", "vlan_id", "20000").unwrap();
    assert_eq!(issue, Some(IssueReason::PatternMismatch));
    assert_eq!(session.set_value(VLAN, "create", "vlan_id", "20").unwrap(), None);
    assert_eq!(session.phase(), SessionPhase::ParametersFilled);

    let html = session.render_form(&HtmlView::new().unwrap()).unwrap();
    assert!(html.contains("vlan_id"));

    let submission = session.submit().unwrap();
    assert_eq!(submission.registered, 1);
    assert_eq!(submission.script.as_str(), "vlan 20");
    assert_eq!(submission.tasks.as_deref().map(<[_]>::len), Some(0));
    assert_eq!(session.phase(), SessionPhase::Submitted(SubmitStatus::Success));
    assert_eq!(session.selection().selected().count(), 0);
}

#[test]
fn failed_generation_keeps_the_form_for_resubmission() {
    let mut ctx = TestContext::new();
    let _catalog = mock_catalog(&mut ctx);
    let _add = ctx.server.mock("POST", "/api/tasks").with_status(200).create();
    let _generate = ctx
        .server
        .mock("POST", "/api/generate-script")
        .with_status(500)
        .with_body(r#"{"message": "renderer crashed"}"#)
        .create();

    let mut session = session_for(&ctx);
    session.init().unwrap();
    let job = ScriptJob {
        task_type: VLAN.to_string(),
        subtasks: vec!["create".to_string()],
        params: vec![("vlan_id".to_string(), "30".to_string())],
        ..ScriptJob::default()
    };

    let err = run_script_job(&mut session, &job).unwrap_err();

    assert!(err.to_string().contains("renderer crashed"));
    assert_eq!(session.phase(), SessionPhase::Submitted(SubmitStatus::Failure));
    assert!(session.document().parameter_panel(VLAN, "create").is_some());

    session.set_value(VLAN, "create", "vlan_name", "ops").unwrap();
    assert_eq!(session.phase(), SessionPhase::ParametersFilled);
}

#[test]
fn resubmission_after_failed_generation_posts_each_task_once() {
    let mut ctx = TestContext::new();
    let _catalog = mock_catalog(&mut ctx);
    let add = ctx
        .server
        .mock("POST", "/api/tasks")
        .match_body(Matcher::PartialJson(json!({"parameters": {"vlan_id": "30"}})))
        .with_status(200)
        .expect(1)
        .create();
    let broken = ctx
        .server
        .mock("POST", "/api/generate-script")
        .with_status(500)
        .with_body(r#"{"message": "renderer crashed"}"#)
        .create();

    let mut session = session_for(&ctx);
    session.init().unwrap();
    session.check_task_type(VLAN).unwrap();
    session.check_subtask(VLAN, "create").unwrap();
    session.set_value(VLAN, "create", "vlan_id", "30").unwrap();
    session.submit().unwrap_err();

    broken.remove();
    let _generate = ctx
        .server
        .mock("POST", "/api/generate-script")
        .with_status(200)
        .with_body(r#"{"script": "vlan 30"}"#)
        .create();
    let submission = session.submit().unwrap();

    assert_eq!(submission.script.as_str(), "vlan 30");
    add.assert();
}
