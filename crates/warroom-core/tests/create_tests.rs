mod common;

use std::sync::{Arc, Mutex};

use common::{Notification, RecordingNotifier, ReusingProvisioner, TestEnv};
use warroom_core::{
    db::directory_queries::TeamMembership, params::Invocation, ChannelOracle, ChannelType,
    ErrorKind, LicenseTier, RunError, Settings,
};

#[tokio::test]
async fn test_create_run_without_playbook() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let run = env.create_run("Checkout errors", "alice").await;

    assert_eq!(run.name, "Checkout errors");
    assert_eq!(run.owner_user_id, "alice");
    assert_eq!(run.team_id, env.team_id);
    assert_eq!(run.current_status, "Active");
    assert!(run.channel_public);
    assert!(run.checklists.is_empty());
    assert!(run.ended_at.is_none());
    assert_eq!(run.timeline_events.len(), 1);

    let channel = env
        .directory
        .get_channel(&run.channel_id)
        .await
        .expect("Failed to get channel")
        .expect("Channel should exist");
    assert_eq!(channel.channel_type, ChannelType::Public);
    assert_eq!(channel.display_name, "Checkout errors");

    let stored = env
        .service
        .get_run("alice", &run.id)
        .await
        .expect("Failed to get run");
    assert_eq!(stored.id, run.id);
    assert_eq!(stored.timeline_events.len(), 1);

    // Direct creation publishes but sends no acknowledgement.
    assert_eq!(
        env.notifier.events(),
        vec![Notification::RunCreated {
            owner: "alice".to_string(),
            run_id: run.id.clone(),
        }]
    );
}

#[tokio::test]
async fn test_create_run_trims_name() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let run = env.create_run("  Spaces around  ", "alice").await;
    assert_eq!(run.name, "Spaces around");
}

#[tokio::test]
async fn test_create_run_validation_leaves_no_trace() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let blank_name = env
        .service
        .create_run("alice", &env.draft("   ", "alice"), Invocation::Direct)
        .await;
    match blank_name {
        Err(RunError::InvalidInput { field, .. }) => assert_eq!(field, "name"),
        other => panic!("expected invalid name, got {other:?}"),
    }

    let blank_owner = env
        .service
        .create_run("alice", &env.draft("Outage", " \t "), Invocation::Direct)
        .await;
    match blank_owner {
        Err(RunError::InvalidInput { field, .. }) => assert_eq!(field, "owner_user_id"),
        other => panic!("expected invalid owner, got {other:?}"),
    }

    let channels = env
        .directory
        .readable_channel_ids("alice", &env.team_id)
        .await
        .expect("Failed to list channels");
    assert!(channels.is_empty());
    assert!(env.notifier.events().is_empty());
}

#[tokio::test]
async fn test_create_run_requires_license() {
    let env = TestEnv::with_settings(Settings::default()).await;
    env.join("alice").await;

    let result = env
        .service
        .create_run("alice", &env.draft("Outage", "alice"), Invocation::Direct)
        .await;
    let err = result.expect_err("unlicensed creation should fail");
    assert!(matches!(err, RunError::Unlicensed));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_create_run_in_disabled_team() {
    let env = TestEnv::with_settings(Settings {
        license: LicenseTier::Enterprise,
        enabled_teams: vec!["some-other-team".to_string()],
        ..Default::default()
    })
    .await;
    env.join("alice").await;

    let err = env
        .service
        .create_run("alice", &env.draft("Outage", "alice"), Invocation::Direct)
        .await
        .expect_err("disabled team should fail");
    assert!(matches!(err, RunError::FeatureDisabled { .. }));
    assert_eq!(err.kind().status_code(), 400);
}

#[tokio::test]
async fn test_create_run_requires_team_membership() {
    let env = TestEnv::new().await;

    let err = env
        .service
        .create_run("mallory", &env.draft("Outage", "mallory"), Invocation::Direct)
        .await
        .expect_err("outsider should not create runs");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_create_run_from_private_playbook() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    let playbook = env.create_playbook("alice", false, false).await;

    let mut draft = env.draft("Database down", "alice");
    draft.playbook_id = Some(playbook.id.clone());
    let run = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect("Failed to create run");

    assert!(!run.channel_public);
    assert_eq!(run.playbook_id.as_deref(), Some(playbook.id.as_str()));
    assert_eq!(run.description, "Follow the incident process");
    assert_eq!(run.checklists, playbook.checklists);
    assert!(run.invited_user_ids.is_empty());
    assert!(run.invited_group_ids.is_empty());

    let channel = env
        .directory
        .get_channel(&run.channel_id)
        .await
        .expect("Failed to get channel")
        .expect("Channel should exist");
    assert_eq!(channel.channel_type, ChannelType::Private);
}

#[tokio::test]
async fn test_create_run_invites_playbook_users() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    let playbook = env.create_playbook("alice", true, true).await;

    let mut draft = env.draft("Latency spike", "alice");
    draft.description = "p99 above 2s".to_string();
    draft.playbook_id = Some(playbook.id);
    let run = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect("Failed to create run");

    assert_eq!(run.description, "p99 above 2s");
    assert_eq!(run.invited_user_ids, vec!["invitee".to_string()]);
    assert_eq!(run.invited_group_ids, vec!["oncall".to_string()]);

    let members = env
        .directory
        .channel_member_count(&run.channel_id)
        .await
        .expect("Failed to count members");
    assert_eq!(members, 2);
}

#[tokio::test]
async fn test_create_run_requires_playbook_membership() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    env.join("bob").await;
    let playbook = env.create_playbook("alice", true, false).await;

    let mut draft = env.draft("Outage", "bob");
    draft.playbook_id = Some(playbook.id);
    let err = env
        .service
        .create_run("bob", &draft, Invocation::Direct)
        .await
        .expect_err("non-member should not use the playbook");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_create_run_with_unknown_playbook() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let mut draft = env.draft("Outage", "alice");
    draft.playbook_id = Some("missing".to_string());
    let err = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect_err("unknown playbook should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_run_requires_channel_permission() {
    let env = TestEnv::new().await;
    env.join_with(
        "alice",
        TeamMembership {
            can_create_public: true,
            can_create_private: false,
        },
    )
    .await;
    let playbook = env.create_playbook("alice", false, false).await;

    let mut draft = env.draft("Outage", "alice");
    draft.playbook_id = Some(playbook.id);
    let err = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect_err("private channel should be refused");

    assert!(matches!(
        err,
        RunError::ChannelPermission {
            channel_type: ChannelType::Private
        }
    ));
    assert_eq!(
        err.to_string(),
        "You are not able to create a private channel: permissions error"
    );
}

#[tokio::test]
async fn test_create_run_from_unreadable_post() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    env.join("bob").await;

    let private = env.create_private_run("Secret", "alice").await;
    let post_id = env
        .directory
        .create_post(&private.channel_id, "alice", "something broke")
        .await
        .expect("Failed to create post");

    let mut draft = env.draft("Follow-up", "bob");
    draft.post_id = Some(post_id.clone());
    let err = env
        .service
        .create_run("bob", &draft, Invocation::Direct)
        .await
        .expect_err("post in unreadable channel should be refused");
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let mut draft = env.draft("Follow-up", "alice");
    draft.post_id = Some(post_id.clone());
    let run = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect("Failed to create run from readable post");
    assert_eq!(run.post_id.as_deref(), Some(post_id.as_str()));
}

#[tokio::test]
async fn test_create_run_from_unknown_post() {
    let env = TestEnv::new().await;
    env.join("alice").await;

    let mut draft = env.draft("Follow-up", "alice");
    draft.post_id = Some("no-such-post".to_string());
    let err = env
        .service
        .create_run("alice", &draft, Invocation::Direct)
        .await
        .expect_err("unknown post should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_failed_save_archives_channel() {
    let env = TestEnv::new().await;
    env.join("alice").await;
    let existing = env.create_run("First", "alice").await;

    let channel = env
        .directory
        .get_channel(&existing.channel_id)
        .await
        .expect("Failed to get channel")
        .expect("Channel should exist");
    let provisioner = Arc::new(ReusingProvisioner {
        channel,
        archived: Mutex::new(Vec::new()),
    });
    let service = env.service_with_provisioner(provisioner.clone()).await;

    let err = service
        .create_run("alice", &env.draft("Second", "alice"), Invocation::Direct)
        .await
        .expect_err("bound channel should not be reused");

    match &err {
        RunError::RunNotSaved { channel_id, source } => {
            assert_eq!(channel_id, &existing.channel_id);
            assert!(matches!(**source, RunError::DuplicateEntry { .. }));
        }
        other => panic!("expected RunNotSaved, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        *provisioner.archived.lock().expect("lock poisoned"),
        vec![existing.channel_id.clone()]
    );

    // Only the first run was ever published.
    let published = env
        .notifier
        .events()
        .into_iter()
        .filter(|e| matches!(e, Notification::RunCreated { .. }))
        .count();
    assert_eq!(published, 1);
}

#[tokio::test]
async fn test_notification_failure_keeps_run() {
    let env = TestEnv::with_notifier(RecordingNotifier::failing()).await;
    env.join("alice").await;

    let run = env.create_run("Outage", "alice").await;

    let stored = env
        .service
        .get_run("alice", &run.id)
        .await
        .expect("Run should survive a failed notification");
    assert_eq!(stored.name, "Outage");
    assert_eq!(env.notifier.events().len(), 1);
}
