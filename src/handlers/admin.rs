use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use crate::domain::{NewNotice, Notice, NoticeId, NoticeLevel, NoticeMessage, NoticeTitle, NoticeUpdate, NoticeWithStats, ValidationError};
use crate::realtime::{ChangeFilter, Table};
use super::events::{invalidations, NOTICE_ADMIN_LIST_KEY};
use super::extract::AdminUser;
use super::{AppState, HandlerResult};

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug)]
pub struct NoticeForm {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default = "default_true")]
    closable: bool,
    #[serde(default = "default_true")]
    visible: bool,
}

#[derive(Deserialize, Debug)]
pub struct NoticeUpdateForm {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    level: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VisibilityForm {
    visible: bool,
}

#[derive(Serialize)]
pub struct NoticeStats {
    notices: Vec<NoticeWithStats>,
    total: usize,
    viewed: usize,
    closed: usize,
}

fn parse_level(level: Option<String>) -> Result<NoticeLevel, ValidationError> {
    match level.as_deref().map(str::trim) {
        None | Some("") => Ok(NoticeLevel::default()),
        Some(level) => NoticeLevel::parse(level),
    }
}

impl TryFrom<NoticeForm> for NewNotice {
    type Error = ValidationError;

    fn try_from(form: NoticeForm) -> Result<Self, Self::Error> {
        Ok(Self {
            title: NoticeTitle::optional(form.title),
            message: NoticeMessage::new(form.message)?,
            level: parse_level(form.level)?,
            closable: form.closable,
            visible: form.visible,
        })
    }
}

impl NoticeUpdateForm {
    fn into_update(self, id: NoticeId) -> Result<NoticeUpdate, ValidationError> {
        Ok(NoticeUpdate {
            id,
            title: NoticeTitle::optional(self.title),
            message: NoticeMessage::new(self.message)?,
            level: parse_level(self.level)?,
        })
    }
}

pub async fn list(State(state): State<AppState>, _admin: AdminUser) -> HandlerResult<Json<Vec<Notice>>> {
    let notices = state.board.get_all_notice_items().await?;
    Ok(Json(notices))
}

pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> HandlerResult<Json<NoticeStats>> {
    let notices = state.board.get_all_notices_with_stats().await?;
    Ok(Json(NoticeStats::from(notices)))
}

pub async fn create(State(state): State<AppState>, AdminUser(admin): AdminUser,
                    form: Result<Json<NoticeForm>, JsonRejection>) -> HandlerResult<(StatusCode, Json<Notice>)> {
    let Json(form) = form?;
    let notice = state.board.create_noticeboard_item(form.try_into()?).await?;
    log::info!("{} created notice {}", admin.id, notice.id);
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn update(State(state): State<AppState>, AdminUser(admin): AdminUser,
                    id: Result<Path<NoticeId>, PathRejection>,
                    form: Result<Json<NoticeUpdateForm>, JsonRejection>) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    let Json(form) = form?;
    state.board.update_noticeboard_item(form.into_update(id)?).await?;
    log::info!("{} updated notice {id}", admin.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(State(state): State<AppState>, AdminUser(admin): AdminUser,
                    id: Result<Path<NoticeId>, PathRejection>) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    state.board.delete_notice_item(id).await?;
    log::info!("{} deleted notice {id}", admin.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_visibility(State(state): State<AppState>, _admin: AdminUser,
                            id: Result<Path<NoticeId>, PathRejection>,
                            form: Result<Json<VisibilityForm>, JsonRejection>) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    let Json(VisibilityForm { visible }) = form?;
    state.board.set_notice_visibility(id, visible).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn events(State(state): State<AppState>, _admin: AdminUser) -> impl IntoResponse {
    let subscription = state.hub.subscribe(vec![
        ChangeFilter::any(Table::NoticeboardInteractions),
        ChangeFilter::any(Table::NoticeboardItems),
    ]);
    invalidations(subscription, NOTICE_ADMIN_LIST_KEY)
}

impl From<Vec<NoticeWithStats>> for NoticeStats {
    fn from(notices: Vec<NoticeWithStats>) -> Self {
        Self {
            total: notices.len(),
            viewed: notices.iter().map(|n| n.viewed).sum(),
            closed: notices.iter().map(|n| n.closed).sum(),
            notices,
        }
    }
}
