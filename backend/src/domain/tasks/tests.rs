//! Lifecycle and validation coverage for tasks.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::TagKind;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn draft(priority: TaskPriority) -> TaskContentDraft {
    TaskContentDraft {
        title: "Write report".to_owned(),
        description: Some("quarterly".to_owned()),
        due_date: None,
        priority,
        category: None,
    }
}

#[fixture]
fn open_task() -> Task {
    let content = TaskContent::new(draft(TaskPriority::Medium)).expect("valid content");
    Task::create(Uuid::new_v4(), UserId::random(), content, at(8))
}

#[rstest]
#[case(TaskPriority::Low, 10)]
#[case(TaskPriority::Medium, 25)]
#[case(TaskPriority::High, 50)]
#[case(TaskPriority::Urgent, 75)]
fn priority_sets_xp_reward(#[case] priority: TaskPriority, #[case] xp: i32) {
    let content = TaskContent::new(draft(priority)).expect("valid content");
    let task = Task::create(Uuid::new_v4(), UserId::random(), content, at(8));
    assert_eq!(task.xp_value(), xp);
}

#[rstest]
#[case("low", TaskPriority::Low)]
#[case("URGENT", TaskPriority::Urgent)]
#[case(" High ", TaskPriority::High)]
fn priorities_parse_case_insensitively(#[case] raw: &str, #[case] expected: TaskPriority) {
    assert_eq!(raw.parse::<TaskPriority>().expect("known priority"), expected);
}

#[rstest]
fn priority_rank_round_trips() {
    for priority in [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ] {
        assert_eq!(TaskPriority::from_rank(priority.rank()), Some(priority));
    }
    assert_eq!(TaskPriority::from_rank(0), None);
}

#[rstest]
fn completing_twice_is_rejected(mut open_task: Task) {
    open_task.complete(at(9)).expect("first completion");
    assert_eq!(open_task.status(), TaskStatus::Completed);
    assert_eq!(open_task.completed_at(), Some(at(9)));

    let err = open_task.complete(at(10)).expect_err("second completion");
    assert_eq!(err, TaskTransitionError::AlreadyCompleted);
    assert_eq!(open_task.completed_at(), Some(at(9)));
}

#[rstest]
fn archived_tasks_can_be_completed(mut open_task: Task) {
    open_task.archive(at(9)).expect("archive");
    open_task.complete(at(10)).expect("complete from archive");
    assert_eq!(open_task.status(), TaskStatus::Completed);
}

#[rstest]
fn archive_round_trip(mut open_task: Task) {
    open_task.archive(at(9)).expect("archive");
    assert_eq!(open_task.status(), TaskStatus::Archived);
    let err = open_task.archive(at(10)).expect_err("double archive");
    assert_eq!(
        err,
        TaskTransitionError::NotOpen {
            status: TaskStatus::Archived
        }
    );
    open_task.unarchive(at(11)).expect("unarchive");
    assert_eq!(open_task.status(), TaskStatus::Open);
    assert_eq!(open_task.updated_at(), at(11));
}

#[rstest]
fn unarchive_requires_archived(mut open_task: Task) {
    let err = open_task.unarchive(at(9)).expect_err("not archived");
    assert_eq!(
        err,
        TaskTransitionError::NotArchived {
            status: TaskStatus::Open
        }
    );
}

#[rstest]
fn completed_tasks_cannot_be_archived(mut open_task: Task) {
    open_task.complete(at(9)).expect("complete");
    assert!(open_task.archive(at(10)).is_err());
}

#[rstest]
fn priority_edit_recomputes_xp_while_open(mut open_task: Task) {
    open_task
        .apply_edit(
            TaskEdit {
                priority: Some(TaskPriority::Urgent),
                ..TaskEdit::default()
            },
            at(9),
        )
        .expect("valid edit");
    assert_eq!(open_task.priority(), TaskPriority::Urgent);
    assert_eq!(open_task.xp_value(), 75);
}

#[rstest]
fn priority_edit_keeps_xp_after_completion(mut open_task: Task) {
    open_task.complete(at(9)).expect("complete");
    open_task
        .apply_edit(
            TaskEdit {
                priority: Some(TaskPriority::Urgent),
                ..TaskEdit::default()
            },
            at(10),
        )
        .expect("valid edit");
    assert_eq!(open_task.priority(), TaskPriority::Urgent);
    assert_eq!(open_task.xp_value(), 25);
}

#[rstest]
fn merging_an_edit_from_an_older_read_keeps_the_completion(open_task: Task) {
    let mut stale = open_task.clone();
    stale
        .apply_edit(
            TaskEdit {
                title: Some("Write summary".to_owned()),
                priority: Some(TaskPriority::Urgent),
                ..TaskEdit::default()
            },
            at(10),
        )
        .expect("valid edit");
    let mut stored = open_task;
    stored.complete(at(9)).expect("complete");

    stored.merge_edit(&stale);

    assert_eq!(stored.title(), "Write summary");
    assert_eq!(stored.priority(), TaskPriority::Urgent);
    assert_eq!(stored.status(), TaskStatus::Completed);
    assert_eq!(stored.completed_at(), Some(at(9)));
    assert_eq!(stored.xp_value(), 25);
}

#[rstest]
#[case(TaskStatus::Open, TaskStatus::Archived, true)]
#[case(TaskStatus::Archived, TaskStatus::Open, false)]
fn status_moves_only_from_the_expected_state(
    mut open_task: Task,
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] moved: bool,
) {
    assert_eq!(open_task.move_status(from, to, at(9)), moved);
    let expected = if moved { to } else { TaskStatus::Open };
    assert_eq!(open_task.status(), expected);
}

#[rstest]
fn null_clears_nullable_fields(mut open_task: Task) {
    open_task
        .apply_edit(
            TaskEdit {
                description: Some(None),
                due_date: Some(Some(at(20))),
                ..TaskEdit::default()
            },
            at(9),
        )
        .expect("valid edit");
    assert_eq!(open_task.description(), None);
    assert_eq!(open_task.due_date(), Some(at(20)));
    assert_eq!(open_task.title(), "Write report");
}

#[rstest]
fn invalid_edit_leaves_task_untouched(mut open_task: Task) {
    let before = open_task.clone();
    let err = open_task
        .apply_edit(
            TaskEdit {
                title: Some("   ".to_owned()),
                priority: Some(TaskPriority::Low),
                ..TaskEdit::default()
            },
            at(9),
        )
        .expect_err("blank title");
    assert_eq!(err, TaskValidationError::EmptyTitle);
    assert_eq!(open_task, before);
}

#[rstest]
#[case(TaskContentDraft { title: String::new(), ..draft(TaskPriority::Low) }, "title")]
#[case(TaskContentDraft { title: "x".repeat(201), ..draft(TaskPriority::Low) }, "title")]
#[case(TaskContentDraft { description: Some("x".repeat(1001)), ..draft(TaskPriority::Low) }, "description")]
#[case(TaskContentDraft { category: Some("x".repeat(51)), ..draft(TaskPriority::Low) }, "category")]
fn content_limits(#[case] draft: TaskContentDraft, #[case] field: &str) {
    let err = TaskContent::new(draft).expect_err("invalid draft");
    assert_eq!(err.field(), field);
}

#[rstest]
fn tag_assignment_limits() {
    let eleven: Vec<Uuid> = (0..11).map(|_| Uuid::new_v4()).collect();
    let err = TagAssignment::new(Some(eleven), None).expect_err("too many categories");
    assert_eq!(err.field(), "categoryIds");

    let twenty_one: Vec<Uuid> = (0..21).map(|_| Uuid::new_v4()).collect();
    let err = TagAssignment::new(None, Some(twenty_one)).expect_err("too many labels");
    assert_eq!(err.field(), "labelIds");
}

#[rstest]
fn tag_assignment_collapses_duplicates() {
    let id = Uuid::new_v4();
    let assignment = TagAssignment::new(Some(vec![id, id, id]), None).expect("valid");
    assert_eq!(assignment.categories(), Some([id].as_slice()));
    assert_eq!(assignment.labels(), None);
}

fn task_with(due: Option<DateTime<Utc>>, priority: TaskPriority, created: DateTime<Utc>) -> Task {
    let content = TaskContent::new(TaskContentDraft {
        due_date: due,
        ..draft(priority)
    })
    .expect("valid content");
    Task::create(Uuid::new_v4(), UserId::random(), content, created)
}

#[rstest]
fn list_order_puts_due_first_then_priority_then_newest() {
    let undated_old = task_with(None, TaskPriority::Urgent, at(1));
    let undated_new = task_with(None, TaskPriority::Urgent, at(2));
    let due_late = task_with(Some(at(23)), TaskPriority::Low, at(1));
    let due_soon_low = task_with(Some(at(12)), TaskPriority::Low, at(1));
    let due_soon_high = task_with(Some(at(12)), TaskPriority::High, at(1));

    let mut tasks = vec![
        undated_old.clone(),
        due_late.clone(),
        undated_new.clone(),
        due_soon_low.clone(),
        due_soon_high.clone(),
    ];
    tasks.sort_by(Task::list_order);

    let ids: Vec<Uuid> = tasks.iter().map(Task::id).collect();
    assert_eq!(
        ids,
        vec![
            due_soon_high.id(),
            due_soon_low.id(),
            due_late.id(),
            undated_new.id(),
            undated_old.id(),
        ]
    );
}

#[rstest]
fn list_query_matches_tag_names(mut open_task: Task) {
    open_task.set_tags(
        vec![TagSummary {
            id: Uuid::new_v4(),
            kind: TagKind::Category,
            name: "Work".to_owned(),
            color: "#FF0000".to_owned(),
        }],
        Vec::new(),
    );
    let mut query = TaskListQuery::first_page();
    query.categories = vec!["Work".to_owned()];
    assert!(query.matches(&open_task));

    query.categories = vec!["Home".to_owned()];
    assert!(!query.matches(&open_task));

    query.categories.clear();
    query.status = Some(TaskStatus::Completed);
    assert!(!query.matches(&open_task));
}

#[rstest]
fn first_page_uses_default_limit() {
    let query = TaskListQuery::first_page();
    assert_eq!(query.page.page(), 1);
    assert_eq!(query.page.limit(), 25);
}
