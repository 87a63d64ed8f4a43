//! Builders shared by the memory store tests.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::ports::{TagRepository, TaskRepository, UserRepository};
use crate::domain::{
    Email, NewTag, NewUser, Tag, TagAssignment, TagColor, TagKind, TagName, Task, TaskContent,
    TaskContentDraft, TaskPriority, User, UserId, Username,
};

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .expect("valid fixture time")
}

pub(super) fn new_user(username: &str) -> NewUser {
    NewUser {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        email: Email::new("ada@example.com").expect("valid email"),
        password_hash: "$argon2id$fixture".to_owned(),
        created_at: at(1, 9),
    }
}

/// Create a user whose email is derived from the username.
pub(super) async fn register(store: &MemoryStore, username: &str) -> User {
    let mut user = new_user(username);
    user.email = Email::new(format!("{username}@example.com")).expect("valid email");
    store.create(&user).await.expect("create user")
}

pub(super) fn draft_task(
    user_id: &UserId,
    title: &str,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
) -> Task {
    let content = TaskContent::new(TaskContentDraft {
        title: title.to_owned(),
        description: None,
        due_date,
        priority,
        category: None,
    })
    .expect("valid content");
    Task::create(Uuid::new_v4(), user_id.clone(), content, at(2, 9))
}

pub(super) async fn insert_task(store: &MemoryStore, task: &Task) -> Task {
    TaskRepository::insert(store, task, &TagAssignment::default())
        .await
        .expect("insert task")
}

pub(super) async fn add_tag(store: &MemoryStore, user_id: &UserId, kind: TagKind, name: &str) -> Tag {
    let tag = NewTag {
        id: Uuid::new_v4(),
        user_id: user_id.clone(),
        kind,
        name: TagName::new(name).expect("valid name"),
        color: TagColor::default(),
        created_at: at(1, 10),
    };
    TagRepository::insert(store, &tag).await.expect("insert tag")
}
