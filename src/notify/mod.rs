// src/notify/mod.rs

//! Subscriber notification fan-out.
//!
//! Each channel (push, email, SMS) is sent independently and gets at most
//! `send_timeout` to finish. A failing or stalled channel is logged and
//! reported, never propagated to the caller and never stops the remaining
//! channels.

pub mod webhook;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{config::NotifyConfig, models::subscription::Subscription};

pub use webhook::{LogChannel, WebhookChannel};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Push,
    Email,
    Sms,
}

impl ChannelKind {
    /// The contact point this channel delivers to, if the subscriber left one.
    pub fn recipient<'a>(&self, subscription: &'a Subscription) -> Option<&'a str> {
        match self {
            ChannelKind::Push => subscription.fcm_token.as_deref(),
            ChannelKind::Email => subscription.email.as_deref(),
            ChannelKind::Sms => subscription.phone_number.as_deref(),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::Push => "push",
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub exam_id: i64,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn exam_updated(exam_id: i64, exam_name: &str) -> Self {
        Self {
            exam_id,
            title: format!("Update for {exam_name}"),
            body: format!(
                "Exam details for {exam_name} have been updated. Please check the app for more information."
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{channel} gateway request failed: {source}")]
    Request {
        channel: ChannelKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{channel} gateway rejected the request: {reason}")]
    Rejected { channel: ChannelKind, reason: String },

    #[error("{channel} send timed out after {after:?}")]
    TimedOut { channel: ChannelKind, after: Duration },
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn send(
        &self,
        notification: &Notification,
        recipients: &[String],
    ) -> Result<(), NotifyError>;
}

/// What happened on each channel for one notification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<ChannelKind>,
    pub skipped: Vec<ChannelKind>,
    pub failed: Vec<(ChannelKind, String)>,
}

pub struct Notifier {
    channels: Vec<Arc<dyn NotificationChannel>>,
    send_timeout: Duration,
}

impl Notifier {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            channels,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// One channel per kind: a webhook when a gateway URL is configured,
    /// otherwise a channel that only logs.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.send_timeout)
            .build()?;
        let channels = [
            (ChannelKind::Push, &config.push_url),
            (ChannelKind::Email, &config.email_url),
            (ChannelKind::Sms, &config.sms_url),
        ]
        .into_iter()
        .map(|(kind, url)| -> Arc<dyn NotificationChannel> {
            match url {
                Some(url) => Arc::new(WebhookChannel::new(kind, url.clone(), client.clone())),
                None => Arc::new(LogChannel::new(kind)),
            }
        })
        .collect();

        Ok(Self::new(channels).with_send_timeout(config.send_timeout))
    }

    /// Sends `notification` to every subscriber on every channel they can be reached on.
    pub async fn notify(
        &self,
        notification: &Notification,
        subscriptions: &[Subscription],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for channel in &self.channels {
            let kind = channel.kind();
            let recipients: Vec<String> = subscriptions
                .iter()
                .filter_map(|s| kind.recipient(s))
                .map(str::to_string)
                .collect();

            if recipients.is_empty() {
                report.skipped.push(kind);
                continue;
            }

            let send = channel.send(notification, &recipients);
            let sent = tokio::time::timeout(self.send_timeout, send)
                .await
                .unwrap_or_else(|_| {
                    Err(NotifyError::TimedOut {
                        channel: kind,
                        after: self.send_timeout,
                    })
                });

            match sent {
                Ok(()) => {
                    tracing::info!(
                        channel = %kind,
                        exam_id = notification.exam_id,
                        recipients = recipients.len(),
                        "notification sent"
                    );
                    report.delivered.push(kind);
                }
                Err(e) => {
                    tracing::warn!(
                        channel = %kind,
                        exam_id = notification.exam_id,
                        "notification failed: {}",
                        e
                    );
                    report.failed.push((kind, e.to_string()));
                }
            }
        }

        report
    }
}
