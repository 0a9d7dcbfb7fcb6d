mod jobs;

use std::sync::Arc;

use ticketing_core::ReservationManager;
use ticketing_db::PgPool;
use ticketing_integrations::mail::{MailTransport, MockTransport, SmtpTransport};
use ticketing_notify::{NotificationQueue, NotificationQueueConfig};
use ticketing_types::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticketing_jobs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting ticketing background jobs");

    let pool = ticketing_db::create_pool(&config.database_url).await?;
    tracing::info!("database connection established");

    let mail: Arc<dyn MailTransport> = if config.smtp_username.is_empty() {
        Arc::new(MockTransport::default())
    } else {
        Arc::new(SmtpTransport::new(
            &config.smtp_host,
            config.smtp_port,
            &config.smtp_username,
            &config.smtp_password,
            &config.mail_from_address,
        )?)
    };

    let (queue, queue_handle) = NotificationQueue::start(
        pool.clone(),
        mail,
        NotificationQueueConfig {
            workers: config.notification_workers,
            capacity: config.notification_queue_size,
            retry_max: config.notification_retry_max,
        },
    );
    let queue = Arc::new(queue);

    let reservations = Arc::new(ReservationManager::new(pool.clone(), config.hold_ttl));

    let scheduler = JobScheduler::new().await?;

    {
        let pool = pool.clone();
        let queue = queue.clone();
        let job = Job::new_async(config.cron_expire_unpaid_bookings.as_str(), move |_uuid, _l| {
            let pool = pool.clone();
            let queue = queue.clone();
            Box::pin(async move {
                run_locked(&pool, "expire_unpaid_bookings", jobs::expire_unpaid_bookings(&pool, &queue)).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_expire_unpaid_bookings, "registered expire_unpaid_bookings");
    }

    {
        let pool = pool.clone();
        let reservations = reservations.clone();
        let job = Job::new_async(config.cron_release_stale_holds.as_str(), move |_uuid, _l| {
            let pool = pool.clone();
            let reservations = reservations.clone();
            Box::pin(async move {
                run_locked(&pool, "release_stale_holds", jobs::release_stale_holds(&reservations)).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_release_stale_holds, "registered release_stale_holds");
    }

    {
        let pool = pool.clone();
        let queue = queue.clone();
        let job = Job::new_async(
            config.cron_process_pending_notifications.as_str(),
            move |_uuid, _l| {
                let pool = pool.clone();
                let queue = queue.clone();
                Box::pin(async move {
                    run_locked(
                        &pool,
                        "process_pending_notifications",
                        jobs::process_pending_notifications(&pool, &queue),
                    )
                    .await;
                })
            },
        )?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_process_pending_notifications, "registered process_pending_notifications");
    }

    {
        let pool = pool.clone();
        let queue = queue.clone();
        let job = Job::new_async(config.cron_send_trip_reminders.as_str(), move |_uuid, _l| {
            let pool = pool.clone();
            let queue = queue.clone();
            Box::pin(async move {
                run_locked(&pool, "send_trip_reminders", jobs::send_trip_reminders(&pool, &queue)).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_send_trip_reminders, "registered send_trip_reminders");
    }

    {
        let pool = pool.clone();
        let job = Job::new_async(config.cron_compute_daily_analytics.as_str(), move |_uuid, _l| {
            let pool = pool.clone();
            Box::pin(async move {
                run_locked(&pool, "compute_daily_analytics", jobs::compute_daily_analytics(&pool)).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_compute_daily_analytics, "registered compute_daily_analytics");
    }

    {
        let pool = pool.clone();
        let job = Job::new_async(config.cron_purge_old_data.as_str(), move |_uuid, _l| {
            let pool = pool.clone();
            Box::pin(async move {
                run_locked(&pool, "purge_old_data", jobs::purge_old_data(&pool)).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %config.cron_purge_old_data, "registered purge_old_data");
    }

    scheduler.start().await?;
    tracing::info!("job scheduler started");

    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }

    tracing::info!("shutting down");
    queue_handle.stop().await;

    Ok(())
}

/// Run `job` only if this process wins the named advisory lock, so two
/// scheduler instances racing the same cron tick never both execute it.
async fn run_locked<F>(pool: &PgPool, job_name: &str, job: F)
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    match ticketing_db::queries::locks::try_acquire(pool, job_name).await {
        Ok(true) => {
            if let Err(error) = job.await {
                tracing::error!(job_name, %error, "job failed");
            }
            if let Err(error) = ticketing_db::queries::locks::release(pool, job_name).await {
                tracing::error!(job_name, %error, "failed to release job lock");
            }
        }
        Ok(false) => {
            tracing::debug!(job_name, "skipping tick, another instance holds the lock");
        }
        Err(error) => {
            tracing::error!(job_name, %error, "failed to acquire job lock");
        }
    }
}
