use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::primitives::{NoticeId, NoticeLevel, NoticeMessage, NoticeTitle};
use crate::domain::objects::InteractionStat;

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: NoticeId,
    pub title: Option<String>,
    pub message: String,
    pub level: NoticeLevel,
    pub closable: bool,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: Option<NoticeTitle>,
    pub message: NoticeMessage,
    pub level: NoticeLevel,
    pub closable: bool,
    pub visible: bool,
}

/// Only the texts and the level are editable; visibility has its own toggle.
#[derive(Debug, Clone)]
pub struct NoticeUpdate {
    pub id: NoticeId,
    pub title: Option<NoticeTitle>,
    pub message: NoticeMessage,
    pub level: NoticeLevel,
}

#[derive(Serialize, Debug, Clone)]
pub struct NoticeWithStats {
    #[serde(flatten)]
    pub notice: Notice,
    pub interactions: Vec<InteractionStat>,
    pub viewed: usize,
    pub closed: usize,
}

impl NoticeWithStats {
    pub fn new(notice: Notice, interactions: Vec<InteractionStat>) -> Self {
        let viewed = interactions.iter()
            .filter(|i| i.viewed_at.is_some())
            .count();
        let closed = interactions.iter()
            .filter(|i| i.closed_at.is_some())
            .count();
        Self { notice, interactions, viewed, closed }
    }
}
