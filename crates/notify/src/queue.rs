//! Bounded in-process notification queue. `Notification` rows are the
//! durable source of truth; the channel is just a low-latency nudge to wake
//! a worker. A process restart (or a full channel) is recovered by
//! `sweep`, which the `ProcessPendingNotifications` scheduler job calls on
//! its own cadence to re-enqueue anything still `pending` and due.

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::sync::Arc;
use ticketing_db::{queries, PgPool};
use ticketing_integrations::MailTransport;
use ticketing_types::enums::{NotificationChannel, NotificationType};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::templates::render;

pub struct NotificationQueueConfig {
    pub workers: usize,
    pub capacity: usize,
    pub retry_max: u32,
}

pub struct NotificationQueue {
    sender: mpsc::Sender<Uuid>,
}

pub struct NotificationQueueHandle {
    cancel: CancellationToken,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl NotificationQueue {
    /// Enqueue a new notification: writes the durable row first, then best-
    /// effort nudges a worker. If the channel is full the row is still
    /// there for the sweep to pick up, so this never drops work.
    #[allow(clippy::too_many_arguments)]
    pub async fn enqueue(
        &self,
        pool: &PgPool,
        booking_id: Option<Uuid>,
        passenger_id: Option<Uuid>,
        notification_type: NotificationType,
        channel: NotificationChannel,
        recipient: &str,
        payload: Value,
    ) -> anyhow::Result<Uuid> {
        let notification = queries::notifications::create(
            pool,
            booking_id,
            passenger_id,
            notification_type.as_str(),
            channel.as_str(),
            recipient,
            &payload,
        )
        .await?;

        let _ = self.sender.try_send(notification.id);

        Ok(notification.id)
    }

    /// Re-enqueue rows still `pending` and due (startup recovery, or a prior
    /// `try_send` that lost the race against a full channel). Called by the
    /// `ProcessPendingNotifications` scheduler job; returns how many were
    /// picked up.
    pub async fn sweep(&self, pool: &PgPool) -> anyhow::Result<usize> {
        let due = queries::notifications::list_due(pool, Utc::now(), 100).await?;
        let count = due.len();
        for notification in due {
            let _ = self.sender.try_send(notification.id);
        }
        Ok(count)
    }

    /// Start the worker pool, returning both the queue handle (for
    /// `enqueue`/`sweep`) and the process lifecycle handle (for `stop`). The
    /// process that owns the scheduler owns this start/stop pair.
    pub fn start(
        pool: PgPool,
        mail: Arc<dyn MailTransport>,
        config: NotificationQueueConfig,
    ) -> (Self, NotificationQueueHandle) {
        let (sender, receiver) = mpsc::channel(config.capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let cancel = CancellationToken::new();

        let mut workers = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let pool = pool.clone();
            let mail = mail.clone();
            let receiver = receiver.clone();
            let cancel = cancel.clone();
            let retry_max = config.retry_max;

            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, pool, mail, receiver, cancel, retry_max).await;
            }));
        }

        (
            NotificationQueue { sender },
            NotificationQueueHandle { cancel, workers },
        )
    }
}

impl NotificationQueueHandle {
    pub async fn stop(self) {
        self.cancel.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    pool: PgPool,
    mail: Arc<dyn MailTransport>,
    receiver: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    cancel: CancellationToken,
    retry_max: u32,
) {
    loop {
        let id = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => return,
                next = receiver.recv() => match next {
                    Some(id) => id,
                    None => return,
                },
            }
        };

        if let Err(error) = process_one(&pool, mail.as_ref(), id, retry_max).await {
            tracing::error!(worker_id, %error, notification_id = %id, "notification processing failed");
        }
    }
}

async fn process_one(
    pool: &PgPool,
    mail: &dyn MailTransport,
    id: Uuid,
    retry_max: u32,
) -> anyhow::Result<()> {
    let Some(notification) = queries::notifications::find_by_id(pool, id).await? else {
        return Ok(());
    };
    if notification.status != "pending" {
        return Ok(());
    }

    let notification_type: NotificationType = notification
        .notification_type
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown notification type {}", notification.notification_type))?;
    let channel: NotificationChannel = notification
        .channel
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown notification channel {}", notification.channel))?;

    let rendered = render(notification_type, &notification.payload);

    let delivery = match channel {
        NotificationChannel::Email => mail.send(&notification.recipient, &rendered.subject, &rendered.body).await,
        NotificationChannel::InApp => Ok(()),
    };

    match delivery {
        Ok(()) => {
            queries::notifications::mark_sent(pool, id).await?;
        }
        Err(error) => {
            let retry_count = notification.retry_count + 1;
            if retry_count as u32 >= retry_max {
                tracing::warn!(notification_id = %id, %error, "notification exhausted retries");
                queries::notifications::mark_failed(pool, id).await?;
            } else {
                let backoff_secs = (60i64 * 2i64.pow(retry_count as u32)).min(3600);
                let next_attempt_at = Utc::now() + ChronoDuration::seconds(backoff_secs);
                queries::notifications::mark_retry(pool, id, retry_count, next_attempt_at).await?;
            }
        }
    }

    Ok(())
}
