use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use crate::domain::{Notice, NoticeId};
use crate::realtime::{ChangeFilter, ChangeKind, Table};
use super::events::{invalidations, NOTICE_LIST_KEY};
use super::extract::CurrentUser;
use super::{AppState, HandlerResult};

pub async fn list(State(state): State<AppState>, CurrentUser { user, .. }: CurrentUser) -> HandlerResult<Json<Vec<Notice>>> {
    let notices = state.board.get_notice_items(user.id).await?;
    Ok(Json(notices))
}

pub async fn view(State(state): State<AppState>, CurrentUser { user, .. }: CurrentUser,
                  id: Result<Path<NoticeId>, PathRejection>) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    state.board.set_viewed(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn close(State(state): State<AppState>, CurrentUser { user, .. }: CurrentUser,
                   id: Result<Path<NoticeId>, PathRejection>) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    state.board.set_closed(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn events(State(state): State<AppState>, _user: CurrentUser) -> impl IntoResponse {
    let subscription = state.hub.subscribe(vec![
        ChangeFilter::any(Table::NoticeboardItems),
        ChangeFilter::only(Table::NoticeboardInteractions, ChangeKind::Update),
    ]);
    invalidations(subscription, NOTICE_LIST_KEY)
}
