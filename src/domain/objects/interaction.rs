use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::primitives::{NoticeId, UserId};

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Interaction {
    pub item_id: NoticeId,
    pub user_id: UserId,
    pub viewed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// An interaction as it is shown next to its notice in the admin list.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct InteractionStat {
    pub user_id: UserId,
    pub viewed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<Interaction> for InteractionStat {
    fn from(value: Interaction) -> Self {
        Self {
            user_id: value.user_id,
            viewed_at: value.viewed_at,
            closed_at: value.closed_at,
        }
    }
}
