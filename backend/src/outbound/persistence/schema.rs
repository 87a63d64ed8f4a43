//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `level` caches the level derived from the ledger.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        level -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks; `priority` stores the domain rank (1 = Low .. 4 = Urgent).
    tasks (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Varchar>,
        due_date -> Nullable<Timestamptz>,
        status -> Varchar,
        priority -> Int2,
        xp_value -> Int4,
        category -> Nullable<Varchar>,
        completed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only XP ledger.
    xp_ledger (id) {
        id -> Uuid,
        user_id -> Uuid,
        xp_value -> Int4,
        description -> Text,
        related_task_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user categories and labels.
    tags (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        name -> Varchar,
        color -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    task_tags (task_id, tag_id) {
        task_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// Seeded achievement catalogue.
    achievements (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        achievement_type -> Varchar,
        requirement_value -> Nullable<Int4>,
    }
}

diesel::table! {
    user_achievements (user_id, achievement_id) {
        user_id -> Uuid,
        achievement_id -> Uuid,
        unlocked_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> users (user_id));
diesel::joinable!(xp_ledger -> users (user_id));
diesel::joinable!(tags -> users (user_id));
diesel::joinable!(task_tags -> tasks (task_id));
diesel::joinable!(task_tags -> tags (tag_id));
diesel::joinable!(user_achievements -> users (user_id));
diesel::joinable!(user_achievements -> achievements (achievement_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tasks,
    xp_ledger,
    tags,
    task_tags,
    achievements,
    user_achievements,
);
