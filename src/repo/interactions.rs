use crate::domain::{NoticeId, UserId};
use crate::repository;

repository!(Interactions,
    /// Returns `false` when the notice had already been marked as viewed by this user.
    pub async fn set_viewed(&self, item_id: NoticeId, uid: UserId) -> anyhow::Result<bool> {
        let res = sqlx::query("INSERT INTO noticeboard_interactions (item_id, user_id, viewed_at)
                VALUES ($1, $2, current_timestamp)
                ON CONFLICT (item_id, user_id) DO UPDATE SET viewed_at = EXCLUDED.viewed_at
                WHERE noticeboard_interactions.viewed_at IS NULL")
            .bind(item_id)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
,
    /// Returns `false` when the notice had already been closed by this user.
    pub async fn set_closed(&self, item_id: NoticeId, uid: UserId) -> anyhow::Result<bool> {
        let res = sqlx::query("INSERT INTO noticeboard_interactions (item_id, user_id, closed_at)
                VALUES ($1, $2, current_timestamp)
                ON CONFLICT (item_id, user_id) DO UPDATE SET closed_at = EXCLUDED.closed_at
                WHERE noticeboard_interactions.closed_at IS NULL")
            .bind(item_id)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
,
    #[cfg(test)]
    pub async fn get(&self, item_id: NoticeId, uid: UserId) -> anyhow::Result<Option<crate::domain::Interaction>> {
        sqlx::query_as::<_, crate::domain::Interaction>("SELECT item_id, user_id, viewed_at, closed_at FROM noticeboard_interactions
                WHERE item_id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    pub async fn get_viewed_item_ids(&self, uid: UserId) -> anyhow::Result<Vec<NoticeId>> {
        sqlx::query_scalar::<_, NoticeId>("SELECT item_id FROM noticeboard_interactions
                WHERE user_id = $1 AND viewed_at IS NOT NULL")
            .bind(uid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    #[cfg(test)]
    pub async fn get_closed_item_ids(&self, uid: UserId) -> anyhow::Result<Vec<NoticeId>> {
        sqlx::query_scalar::<_, NoticeId>("SELECT item_id FROM noticeboard_interactions
                WHERE user_id = $1 AND closed_at IS NOT NULL")
            .bind(uid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into())
    }
);
