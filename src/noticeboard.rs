use std::collections::HashSet;
use derive_more::Constructor;
use futures::future::join_all;
use crate::domain::{NewNotice, Notice, NoticeId, NoticeUpdate, NoticeWithStats, UserId, ValidationError};
use crate::metrics;
use crate::repo;

#[derive(Clone, Constructor)]
pub struct NoticeBoard {
    repos: repo::Repositories,
}

impl NoticeBoard {
    pub async fn get_all_notice_items(&self) -> anyhow::Result<Vec<Notice>> {
        self.repos.notices.get_all().await
    }

    /// The notices a user should see. Marking them as viewed happens in a detached task:
    /// the caller never waits for it and never learns whether it succeeded.
    pub async fn get_notice_items(&self, uid: UserId) -> anyhow::Result<Vec<Notice>> {
        let notices = self.repos.notices.get_visible_not_closed_by(uid).await?;

        let interactions = self.repos.interactions.clone();
        let shown: Vec<NoticeId> = notices.iter()
            .map(|n| n.id)
            .collect();
        tokio::spawn(async move {
            mark_unviewed_as_viewed(&interactions, uid, &shown).await;
        });

        Ok(notices)
    }

    pub async fn get_all_notices_with_stats(&self) -> anyhow::Result<Vec<NoticeWithStats>> {
        self.repos.notices.get_all_with_stats().await
    }

    pub async fn create_noticeboard_item(&self, notice: NewNotice) -> anyhow::Result<Notice> {
        let notice = self.repos.notices.create(notice).await?;
        metrics::NOTICES_COUNTER.created.inc();
        log::info!("notice {} was created", notice.id);
        Ok(notice)
    }

    pub async fn update_noticeboard_item(&self, update: NoticeUpdate) -> anyhow::Result<()> {
        let id = update.id;
        self.repos.notices.update(update).await?;
        metrics::NOTICES_COUNTER.updated.inc();
        log::info!("notice {id} was updated");
        Ok(())
    }

    pub async fn delete_notice_item(&self, id: NoticeId) -> anyhow::Result<()> {
        self.repos.notices.delete(id).await?;
        metrics::NOTICES_COUNTER.deleted.inc();
        log::info!("notice {id} was deleted");
        Ok(())
    }

    pub async fn set_notice_visibility(&self, id: NoticeId, visible: bool) -> anyhow::Result<()> {
        self.repos.notices.set_visibility(id, visible).await?;
        metrics::NOTICES_COUNTER.visibility_changed.inc();
        log::info!("notice {id} is now {}", if visible { "visible" } else { "hidden" });
        Ok(())
    }

    pub async fn set_viewed(&self, id: NoticeId, uid: UserId) -> anyhow::Result<()> {
        if self.repos.interactions.set_viewed(id, uid).await? {
            metrics::VIEWS_COUNTER.succeeded();
        }
        Ok(())
    }

    pub async fn set_closed(&self, id: NoticeId, uid: UserId) -> anyhow::Result<()> {
        let notice = self.repos.notices.get(id).await?
            .ok_or(sqlx::Error::RowNotFound)?;
        if !notice.closable {
            Err(ValidationError::message("this notice can't be closed"))?
        }
        if self.repos.interactions.set_closed(id, uid).await? {
            metrics::CLOSES_COUNTER.inc();
        }
        Ok(())
    }
}

/// Best effort: failures are logged and counted, never returned. Returns how many notices were newly marked.
pub(crate) async fn mark_unviewed_as_viewed(interactions: &repo::Interactions, uid: UserId, shown: &[NoticeId]) -> usize {
    if shown.is_empty() {
        return 0
    }

    let viewed: HashSet<NoticeId> = match interactions.get_viewed_item_ids(uid).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            log::warn!("couldn't fetch the notices viewed by {uid}, {} view marks are lost: {e}", shown.len());
            metrics::VIEWS_COUNTER.failed.inc_by(shown.len());
            return 0
        }
    };

    let pending = shown.iter()
        .filter(|id| !viewed.contains(id))
        .map(|id| async move {
            interactions.set_viewed(*id, uid)
                .await
                .map_err(|e| (*id, e))
        });
    join_all(pending).await
        .into_iter()
        .filter(|res| match res {
            Ok(recorded) => {
                if *recorded {
                    metrics::VIEWS_COUNTER.succeeded();
                }
                *recorded
            }
            Err((id, e)) => {
                log::warn!("couldn't mark notice {id} as viewed by {uid}: {e}");
                metrics::VIEWS_COUNTER.failed();
                false
            }
        })
        .count()
}
