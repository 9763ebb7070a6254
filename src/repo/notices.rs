use std::collections::HashMap;
use crate::domain::{Interaction, InteractionStat, NewNotice, Notice, NoticeId, NoticeUpdate, NoticeWithStats, UserId};
use crate::repo::ensure_only_one_row_updated;
use crate::repository;

const NOTICE_COLUMNS: &str = "id, title, message, level, closable, visible, created_at";

repository!(Notices,
    pub async fn get_all(&self) -> anyhow::Result<Vec<Notice>> {
        let sql = format!("SELECT {NOTICE_COLUMNS} FROM noticeboard_items ORDER BY created_at DESC");
        sqlx::query_as::<_, Notice>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    pub async fn get(&self, id: NoticeId) -> anyhow::Result<Option<Notice>> {
        let sql = format!("SELECT {NOTICE_COLUMNS} FROM noticeboard_items WHERE id = $1");
        sqlx::query_as::<_, Notice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    pub async fn get_visible_not_closed_by(&self, uid: UserId) -> anyhow::Result<Vec<Notice>> {
        let sql = format!("SELECT {NOTICE_COLUMNS} FROM noticeboard_items n
            WHERE visible IS TRUE
            AND NOT EXISTS (
                SELECT 1 FROM noticeboard_interactions i
                WHERE i.item_id = n.id AND i.user_id = $1 AND i.closed_at IS NOT NULL)
            ORDER BY created_at DESC");
        sqlx::query_as::<_, Notice>(&sql)
            .bind(uid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    pub async fn get_all_with_stats(&self) -> anyhow::Result<Vec<NoticeWithStats>> {
        let notices = self.get_all().await?;
        let ids: Vec<uuid::Uuid> = notices.iter()
            .map(|n| uuid::Uuid::from(n.id))
            .collect();
        let interactions = sqlx::query_as::<_, Interaction>(
            "SELECT item_id, user_id, viewed_at, closed_at FROM noticeboard_interactions WHERE item_id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_notice: HashMap<NoticeId, Vec<InteractionStat>> = HashMap::new();
        for interaction in interactions {
            by_notice.entry(interaction.item_id)
                .or_default()
                .push(interaction.into());
        }
        let stats = notices.into_iter()
            .map(|notice| {
                let interactions = by_notice.remove(&notice.id).unwrap_or_default();
                NoticeWithStats::new(notice, interactions)
            })
            .collect();
        Ok(stats)
    }
,
    pub async fn create(&self, notice: NewNotice) -> anyhow::Result<Notice> {
        let sql = format!("INSERT INTO noticeboard_items (title, message, level, closable, visible)
            VALUES ($1, $2, $3, $4, $5) RETURNING {NOTICE_COLUMNS}");
        sqlx::query_as::<_, Notice>(&sql)
            .bind(notice.title)
            .bind(notice.message)
            .bind(notice.level)
            .bind(notice.closable)
            .bind(notice.visible)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into())
    }
,
    pub async fn update(&self, update: NoticeUpdate) -> anyhow::Result<()> {
        sqlx::query("UPDATE noticeboard_items SET title = $2, message = $3, level = $4 WHERE id = $1")
            .bind(update.id)
            .bind(update.title)
            .bind(update.message)
            .bind(update.level)
            .execute(&self.pool)
            .await
            .map_err(Into::into)
            .and_then(ensure_only_one_row_updated)
            .map(|_| ())
    }
,
    pub async fn delete(&self, id: NoticeId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM noticeboard_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Into::into)
            .and_then(ensure_only_one_row_updated)
            .map(|_| ())
    }
,
    pub async fn set_visibility(&self, id: NoticeId, visible: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE noticeboard_items SET visible = $2 WHERE id = $1")
            .bind(id)
            .bind(visible)
            .execute(&self.pool)
            .await
            .map_err(Into::into)
            .and_then(ensure_only_one_row_updated)
            .map(|_| ())
    }
);
