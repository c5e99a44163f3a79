// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so the same assertions
// hold for any backend that implements the trait.

use chrono::NaiveDate;
use daybook_core::task::{CreateTask, Priority, UpdateTask};
use daybook_db::{Database, DbError};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

/// Users: create, lookups, list, duplicate usernames.
pub async fn test_user_accounts(db: &dyn Database) {
    let ada = db.create_user("ada", "hash-a").await.unwrap();
    assert_eq!(ada.username, "ada");

    assert_eq!(db.get_user(&ada.id).await.unwrap().id, ada.id);
    assert_eq!(
        db.get_user_by_username("ada").await.unwrap().map(|u| u.id),
        Some(ada.id.clone())
    );
    assert!(db.get_user_by_username("nobody").await.unwrap().is_none());

    assert!(matches!(
        db.create_user("ada", "again").await,
        Err(DbError::Conflict(_))
    ));

    db.create_user("bob", "hash-b").await.unwrap();
    assert_eq!(db.list_users().await.unwrap().len(), 2);
}

/// Sessions: issue, resolve by digest, touch, revoke one, revoke all.
pub async fn test_sessions(db: &dyn Database) {
    let user = db.create_user("ada", "h").await.unwrap();
    let s1 = db.create_session(&user.id, "digest-1").await.unwrap();
    db.create_session(&user.id, "digest-2").await.unwrap();

    let found = db.find_session_by_hash("digest-1").await.unwrap().unwrap();
    assert_eq!(found.id, s1.id);
    assert_eq!(found.user_id, user.id);

    db.touch_session(&s1.id).await.unwrap();
    assert!(db
        .find_session_by_hash("digest-1")
        .await
        .unwrap()
        .unwrap()
        .last_used_at
        .is_some());

    db.delete_session_by_hash("digest-1").await.unwrap();
    assert!(db.find_session_by_hash("digest-1").await.unwrap().is_none());

    assert_eq!(db.delete_sessions_for_user(&user.id).await.unwrap(), 1);
    assert!(db.find_session_by_hash("digest-2").await.unwrap().is_none());
}

/// Tasks: create, get, list, update, delete for a single owner.
pub async fn test_task_crud(db: &dyn Database) {
    let user = db.create_user("ada", "h").await.unwrap();

    let mut input = CreateTask::new("Design landing page", day(1));
    input.hashtags = vec!["work".into(), "design".into()];
    input.priority = Priority::High;
    let task = db.create_task(&user.id, &input).await.unwrap();
    assert_eq!(task.title, "Design landing page");
    assert_eq!(task.priority, Priority::High);
    assert!(!task.completed);

    let fetched = db.get_task(&user.id, &task.id).await.unwrap();
    assert_eq!(fetched, task);

    db.create_task(&user.id, &CreateTask::new("Grocery shopping", day(2)))
        .await
        .unwrap();
    assert_eq!(db.list_tasks(&user.id).await.unwrap().len(), 2);

    let updated = db
        .update_task(
            &user.id,
            &task.id,
            &UpdateTask {
                title: Some("Design new landing page".into()),
                description: Some(Some("responsive".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Design new landing page");
    assert_eq!(updated.description.as_deref(), Some("responsive"));
    // unchanged fields preserved
    assert_eq!(updated.hashtags, vec!["work", "design"]);
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.date, day(1));

    db.delete_task(&user.id, &task.id).await.unwrap();
    assert_eq!(db.list_tasks(&user.id).await.unwrap().len(), 1);
    assert!(matches!(
        db.get_task(&user.id, &task.id).await,
        Err(DbError::NotFound(_))
    ));
}

/// A task is invisible to every user but its owner.
pub async fn test_task_ownership(db: &dyn Database) {
    let ada = db.create_user("ada", "h").await.unwrap();
    let bob = db.create_user("bob", "h").await.unwrap();
    let task = db
        .create_task(&ada.id, &CreateTask::new("ada's task", day(1)))
        .await
        .unwrap();

    assert!(db.list_tasks(&bob.id).await.unwrap().is_empty());
    assert!(matches!(
        db.get_task(&bob.id, &task.id).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(
        db.update_task(&bob.id, &task.id, &UpdateTask::completed(true))
            .await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(
        db.delete_task(&bob.id, &task.id).await,
        Err(DbError::NotFound(_))
    ));
    assert_eq!(db.list_tasks(&ada.id).await.unwrap().len(), 1);
}

/// Completing and reopening a task round-trips through storage.
pub async fn test_toggle_completed(db: &dyn Database) {
    let user = db.create_user("ada", "h").await.unwrap();
    let task = db
        .create_task(&user.id, &CreateTask::new("Read new book", day(3)))
        .await
        .unwrap();

    let done = db
        .update_task(&user.id, &task.id, &UpdateTask::completed(true))
        .await
        .unwrap();
    assert!(done.completed);

    let reopened = db
        .update_task(&user.id, &task.id, &UpdateTask::completed(false))
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.title, "Read new book");
}
