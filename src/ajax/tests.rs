use serde_json::{json, Value};

use super::*;
use crate::database::repository::outbox_repository::OutboxRepository;
use crate::database::repository::submissions_repository::SubmissionsRepository;
use crate::entity::prelude::*;
use crate::entity::users;
use crate::test_support::{complete_game_data, setup_db};

struct App {
    state: AppState,
    admin: users::Model,
    developer: users::Model,
    subscriber: users::Model,
}

async fn app() -> App {
    let db = setup_db().await;
    let admin = UsersRepository::insert(&db, "Admin", "admin@sisme.fr", UserRole::Admin, DeveloperStatus::None)
        .await
        .unwrap();
    let developer = UsersRepository::insert(
        &db,
        "Camille",
        "camille@atelier-lune.fr",
        UserRole::Developer,
        DeveloperStatus::Approved,
    )
    .await
    .unwrap();
    let subscriber = UsersRepository::insert(
        &db,
        "Lou",
        "lou@example.fr",
        UserRole::Subscriber,
        DeveloperStatus::Pending,
    )
    .await
    .unwrap();

    let media_root = std::env::temp_dir().join("sisme-ajax-tests-media");
    let state = crate::init_with_connection(db, media_root)
        .await
        .unwrap();

    App {
        state,
        admin,
        developer,
        subscriber,
    }
}

impl App {
    /// 带有效令牌调用
    async fn call(&self, action: &str, actor: &users::Model, mut payload: Value) -> AjaxResponse {
        payload["security"] = json!(self.state.security_token(action, actor.id));
        dispatch(&self.state, action, actor.id, &payload).await
    }

    async fn pending_submission(&self) -> String {
        let saved = self
            .call(
                "save_submission_draft",
                &self.developer,
                json!({ "game_data": complete_game_data("Hollow Path") }),
            )
            .await;
        assert!(saved.success, "{:?}", saved.message());
        let id = saved.data["id"].as_str().unwrap().to_string();

        let submitted = self
            .call("submit_submission", &self.developer, json!({ "submission_id": id }))
            .await;
        assert!(submitted.success, "{:?}", submitted.message());
        assert_eq!(submitted.data["status"], "pending");
        id
    }
}

fn code(response: &AjaxResponse) -> &str {
    response.data["code"].as_str().unwrap_or_default()
}

#[test]
fn action_names_round_trip() {
    for action in AjaxAction::ALL {
        assert_eq!(AjaxAction::parse(action.as_str()), Some(action));
    }
    assert_eq!(AjaxAction::parse("approve"), None);
}

#[tokio::test]
async fn failure_envelope_carries_message_and_code() {
    let app = app().await;
    let response = dispatch(&app.state, "approve_submission", app.admin.id, &json!({})).await;

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["code"], "security_token_invalid");
    assert!(!body["data"]["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn token_must_match_action_and_actor() {
    let app = app().await;
    let pending = app.pending_submission().await;

    let wrong_action = json!({
        "security": app.state.security_token("delete_submission", app.admin.id),
        "submission_id": pending,
        "user_id": app.developer.id,
    });
    let response = dispatch(&app.state, "approve_submission", app.admin.id, &wrong_action).await;
    assert_eq!(code(&response), "security_token_invalid");

    let wrong_actor = json!({
        "security": app.state.security_token("approve_submission", app.developer.id),
        "submission_id": pending,
        "user_id": app.developer.id,
    });
    let response = dispatch(&app.state, "approve_submission", app.admin.id, &wrong_actor).await;
    assert_eq!(code(&response), "security_token_invalid");
}

#[tokio::test]
async fn admin_actions_require_an_admin() {
    let app = app().await;
    let pending = app.pending_submission().await;

    let response = app
        .call(
            "approve_submission",
            &app.developer,
            json!({ "submission_id": pending, "user_id": app.developer.id }),
        )
        .await;
    assert!(!response.success);
    assert_eq!(code(&response), "permission_denied");

    let row = SubmissionsRepository::find_by_id(&app.state.db, app.developer.id, &pending)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, SubmissionStatus::Pending);
}

#[tokio::test]
async fn developer_actions_require_an_approved_developer() {
    let app = app().await;
    let response = app
        .call(
            "save_submission_draft",
            &app.subscriber,
            json!({ "game_data": complete_game_data("Hollow Path") }),
        )
        .await;
    assert_eq!(code(&response), "permission_denied");

    let approved =
        UsersRepository::set_developer_status(&app.state.db, app.subscriber.id, DeveloperStatus::Approved)
            .await
            .unwrap();
    let response = app
        .call(
            "save_submission_draft",
            &approved,
            json!({ "game_data": complete_game_data("Hollow Path") }),
        )
        .await;
    assert!(response.success, "{:?}", response.message());
    assert_eq!(response.data["status"], "draft");
}

#[tokio::test]
async fn missing_parameters_are_reported() {
    let app = app().await;
    let pending = app.pending_submission().await;

    let response = app
        .call("approve_submission", &app.admin, json!({ "user_id": app.developer.id }))
        .await;
    assert_eq!(code(&response), "invalid_parameters");

    let response = app
        .call("approve_submission", &app.admin, json!({ "submission_id": pending }))
        .await;
    assert_eq!(code(&response), "invalid_parameters");

    let response = app
        .call(
            "reject_submission",
            &app.admin,
            json!({ "submission_id": pending, "user_id": app.developer.id, "rejection_reason": " " }),
        )
        .await;
    assert_eq!(code(&response), "invalid_parameters");

    let response = app
        .call("list_submissions", &app.admin, json!({ "status": "deleted" }))
        .await;
    assert_eq!(code(&response), "invalid_parameters");
}

#[tokio::test]
async fn approve_over_ajax_publishes_and_queues_the_email() {
    let app = app().await;
    let pending = app.pending_submission().await;

    // 表单提交时 user_id 是字符串
    let response = app
        .call(
            "approve_submission",
            &app.admin,
            json!({ "submission_id": pending, "user_id": app.developer.id.to_string() }),
        )
        .await;
    assert!(response.success, "{:?}", response.message());
    assert_eq!(response.data["game_slug"], "hollow-path");
    assert_eq!(response.data["status"], "published");

    let outbox = OutboxRepository::find_by_submission(&app.state.db, &pending)
        .await
        .unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].kind, "published");
    assert_eq!(outbox[0].recipient, app.developer.email);

    let again = app
        .call(
            "approve_submission",
            &app.admin,
            json!({ "submission_id": pending, "user_id": app.developer.id }),
        )
        .await;
    assert_eq!(code(&again), "invalid_transition");
}

#[tokio::test]
async fn details_and_listing_over_ajax() {
    let app = app().await;
    let pending = app.pending_submission().await;

    let details = app
        .call(
            "get_submission_details",
            &app.admin,
            json!({ "submission_id": pending, "user_id": app.developer.id }),
        )
        .await;
    assert!(details.success);
    assert_eq!(details.data["submission"]["id"], pending.as_str());
    assert_eq!(details.data["developer"]["display_name"], "Camille");

    let listed = app
        .call("list_submissions", &app.admin, json!({ "status": "pending" }))
        .await;
    assert_eq!(listed.data.as_array().unwrap().len(), 1);

    let stats = app.call("get_submission_stats", &app.admin, json!({})).await;
    assert_eq!(stats.data["pending"], 1);
    assert_eq!(stats.data["total"], 1);

    let developers = app.call("list_developers", &app.admin, json!({})).await;
    let developers = developers.data.as_array().unwrap();
    assert_eq!(developers.len(), 1);
    assert_eq!(developers[0]["id"], app.developer.id);
}

#[tokio::test]
async fn archive_defaults_its_reason() {
    let app = app().await;
    let pending = app.pending_submission().await;

    let response = app
        .call(
            "archive_submission",
            &app.admin,
            json!({ "submission_id": pending, "user_id": app.developer.id }),
        )
        .await;
    assert!(response.success);
    assert_eq!(response.data["status"], "archived");
    assert_eq!(response.data["reason"], "no reason given");

    let mine = app
        .call("list_my_submissions", &app.developer, json!({ "include_archived": true }))
        .await;
    assert_eq!(mine.data.as_array().unwrap().len(), 1);
    let mine = app.call("list_my_submissions", &app.developer, json!({})).await;
    assert!(mine.data.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn log_level_can_be_read_and_validated() {
    let app = app().await;

    let response = app
        .call("set_log_level", &app.admin, json!({ "level": "verbose" }))
        .await;
    assert_eq!(code(&response), "invalid_parameters");

    let response = app.call("get_log_level", &app.admin, json!({})).await;
    assert!(response.success);
    assert!(response.data["level"].is_string());
}
