mod common;

use std::collections::HashMap;

use common::{Notification, TestEnv};
use warroom_core::{
    db::directory_queries::TeamMembership,
    params::{DialogSubmission, DIALOG_FIELD_DESCRIPTION, DIALOG_FIELD_NAME, DIALOG_FIELD_PLAYBOOK},
    DialogOutcome, ErrorKind, RunError,
};

fn submission(env: &TestEnv, user: &str, fields: &[(&str, &str)]) -> DialogSubmission {
    DialogSubmission {
        user_id: user.to_string(),
        team_id: env.team_id.clone(),
        state: String::new(),
        submission: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_dialog_creates_run_and_acknowledges() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    let playbook = env.create_playbook("alice", true, false).await;

    let outcome = env
        .service
        .submit_dialog(
            "alice",
            &submission(
                &env,
                "alice",
                &[
                    (DIALOG_FIELD_PLAYBOOK, playbook.id.as_str()),
                    (DIALOG_FIELD_NAME, "Search is down"),
                    (DIALOG_FIELD_DESCRIPTION, "All queries time out"),
                ],
            ),
        )
        .await
        .expect("Failed to submit dialog");

    let run = match outcome {
        DialogOutcome::Created(run) => run,
        other => panic!("expected a created run, got {other:?}"),
    };
    assert_eq!(run.name, "Search is down");
    assert_eq!(run.description, "All queries time out");
    assert_eq!(run.owner_user_id, "alice");
    assert_eq!(run.checklists.len(), 1);

    let events = env.notifier.events();
    assert_eq!(events.len(), 2);
    match &events[1] {
        Notification::Ephemeral {
            user,
            channel,
            message,
        } => {
            assert_eq!(user, "alice");
            assert_eq!(channel, &run.channel_id);
            assert!(message.starts_with("Playbook run **Search is down** started in ~"));
        }
        other => panic!("expected an ephemeral acknowledgement, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dialog_carries_post_from_state() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    let source = env.create_run("Source", "alice").await;
    let post_id = env
        .directory
        .create_post(&source.channel_id, "alice", "look at this")
        .await
        .expect("Failed to create post");

    let mut request = submission(&env, "alice", &[(DIALOG_FIELD_NAME, "From a post")]);
    request.state = format!(r#"{{"post_id":"{post_id}"}}"#);
    let outcome = env
        .service
        .submit_dialog("alice", &request)
        .await
        .expect("Failed to submit dialog");

    let run = match outcome {
        DialogOutcome::Created(run) => run,
        other => panic!("expected a created run, got {other:?}"),
    };
    assert_eq!(run.post_id, Some(post_id));
    assert!(run.playbook_id.is_none());
}

#[tokio::test]
async fn test_dialog_rejects_other_user() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let err = env
        .service
        .submit_dialog(
            "alice",
            &submission(&env, "mallory", &[(DIALOG_FIELD_NAME, "Outage")]),
        )
        .await
        .expect_err("mismatched user should be rejected");

    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert!(err
        .to_string()
        .contains("interactive dialog's userID must be the same as the requester's userID"));
    assert!(env.notifier.events().is_empty());
}

#[tokio::test]
async fn test_dialog_rejects_malformed_state() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let mut request = submission(&env, "alice", &[(DIALOG_FIELD_NAME, "Outage")]);
    request.state = "{not json".to_string();
    let err = env
        .service
        .submit_dialog("alice", &request)
        .await
        .expect_err("malformed state should be rejected");
    match err {
        RunError::InvalidInput { field, .. } => assert_eq!(field, "state"),
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dialog_reports_blank_name_as_field_error() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let outcome = env
        .service
        .submit_dialog("alice", &submission(&env, "alice", &[(DIALOG_FIELD_NAME, "  ")]))
        .await
        .expect("field errors are not request errors");

    let errors = match outcome {
        DialogOutcome::FieldErrors(errors) => errors,
        other => panic!("expected field errors, got {other:?}"),
    };
    assert!(errors.contains_key(DIALOG_FIELD_NAME));
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn test_dialog_reports_channel_permission_on_name() {
    let env = TestEnv::new().await;
    env.join_with(
        "alice",
        TeamMembership {
            can_create_public: false,
            can_create_private: true,
        },
    )
    .await;

    let outcome = env
        .service
        .submit_dialog(
            "alice",
            &submission(&env, "alice", &[(DIALOG_FIELD_NAME, "Outage")]),
        )
        .await
        .expect("field errors are not request errors");

    let errors = match outcome {
        DialogOutcome::FieldErrors(errors) => errors,
        other => panic!("expected field errors, got {other:?}"),
    };
    assert_eq!(
        errors.get(DIALOG_FIELD_NAME).map(String::as_str),
        Some("You are not able to create a public channel: permissions error")
    );
}

#[tokio::test]
async fn test_dialog_propagates_other_failures() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let err = env
        .service
        .submit_dialog(
            "alice",
            &submission(
                &env,
                "alice",
                &[(DIALOG_FIELD_NAME, "Outage"), (DIALOG_FIELD_PLAYBOOK, "missing")],
            ),
        )
        .await
        .expect_err("unknown playbook should fail the request");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
