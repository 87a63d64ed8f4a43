//! HTTP inbound adapter exposing REST endpoints.

use actix_web::{HttpRequest, web};

use crate::domain::Error;

pub mod achievements;
pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
pub mod tags;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Extractor failures surface as
/// `invalid_request` error bodies rather than actix's plain-text default.
///
/// Literal segments are registered before `{id}` captures that share a
/// prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed path: {err}")).into()
    }))
    .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::delete_account)
        .service(users::get_stats)
        .service(users::get_xp_history)
        .service(tasks::list_tasks)
        .service(tasks::create_task)
        .service(tasks::complete_task)
        .service(tasks::archive_task)
        .service(tasks::unarchive_task)
        .service(tasks::get_task)
        .service(tasks::update_task)
        .service(tasks::delete_task)
        .service(tags::get_or_create_category)
        .service(tags::list_categories)
        .service(tags::create_category)
        .service(tags::get_category)
        .service(tags::update_category)
        .service(tags::delete_category)
        .service(tags::list_labels)
        .service(tags::create_label)
        .service(tags::get_label)
        .service(tags::update_label)
        .service(tags::delete_label)
        .service(achievements::list_achievements)
        .service(achievements::my_achievements)
        .service(achievements::achievement_progress)
        .service(achievements::check_achievements);
}
