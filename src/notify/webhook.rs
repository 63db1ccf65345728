// src/notify/webhook.rs

use async_trait::async_trait;
use serde::Serialize;

use super::{ChannelKind, Notification, NotificationChannel, NotifyError};

/// Delivers through an HTTP gateway that fronts the actual provider
/// (FCM, SES, Twilio, ...).
pub struct WebhookChannel {
    kind: ChannelKind,
    url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    channel: ChannelKind,
    exam_id: i64,
    title: &'a str,
    body: &'a str,
    recipients: &'a [String],
}

impl WebhookChannel {
    pub fn new(kind: ChannelKind, url: String, client: reqwest::Client) -> Self {
        Self { kind, url, client }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn send(
        &self,
        notification: &Notification,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            channel: self.kind,
            exam_id: notification.exam_id,
            title: &notification.title,
            body: &notification.body,
            recipients,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                channel: self.kind,
                source,
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected {
                channel: self.kind,
                reason: format!("status {}", response.status()),
            });
        }

        Ok(())
    }
}

/// Stand-in used when no gateway is configured for a channel.
pub struct LogChannel {
    kind: ChannelKind,
}

impl LogChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn send(
        &self,
        notification: &Notification,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        tracing::info!(
            channel = %self.kind,
            exam_id = notification.exam_id,
            recipients = recipients.len(),
            "no gateway configured, dropping notification: {}",
            notification.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    use super::*;
    use crate::{
        config::NotifyConfig,
        models::subscription::Subscription,
        notify::Notifier,
    };

    #[derive(Clone)]
    struct Gateway {
        status: StatusCode,
        received: Arc<Mutex<Vec<Value>>>,
    }

    async fn receive(State(gateway): State<Gateway>, Json(body): Json<Value>) -> StatusCode {
        gateway.received.lock().await.push(body);
        gateway.status
    }

    /// Serves a gateway on a random port that answers every POST with `status`.
    async fn spawn_gateway(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
        let gateway = Gateway {
            status,
            received: Arc::new(Mutex::new(Vec::new())),
        };
        let received = gateway.received.clone();
        let app = Router::new().route("/send", post(receive)).with_state(gateway);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/send", addr), received)
    }

    fn recipients() -> Vec<String> {
        vec!["tok-1".to_string(), "tok-2".to_string()]
    }

    #[tokio::test]
    async fn posts_notification_payload() {
        let (url, received) = spawn_gateway(StatusCode::OK).await;
        let channel = WebhookChannel::new(ChannelKind::Push, url, reqwest::Client::new());

        channel
            .send(&Notification::exam_updated(11, "CAT"), &recipients())
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0],
            json!({
                "channel": "push",
                "examId": 11,
                "title": "Update for CAT",
                "body": "Exam details for CAT have been updated. Please check the app for more information.",
                "recipients": ["tok-1", "tok-2"],
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (url, _) = spawn_gateway(StatusCode::SERVICE_UNAVAILABLE).await;
        let channel = WebhookChannel::new(ChannelKind::Email, url, reqwest::Client::new());

        let err = channel
            .send(&Notification::exam_updated(11, "CAT"), &recipients())
            .await
            .unwrap_err();

        match err {
            NotifyError::Rejected { channel, reason } => {
                assert_eq!(channel, ChannelKind::Email);
                assert!(reason.contains("503"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let channel = WebhookChannel::new(
            ChannelKind::Sms,
            format!("http://{}/send", addr),
            reqwest::Client::new(),
        );
        let err = channel
            .send(&Notification::exam_updated(11, "CAT"), &recipients())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotifyError::Request {
                channel: ChannelKind::Sms,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn log_channel_always_succeeds() {
        let channel = LogChannel::new(ChannelKind::Sms);
        assert_eq!(channel.kind(), ChannelKind::Sms);
        assert!(
            channel
                .send(&Notification::exam_updated(2, "CLAT"), &recipients())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn configured_gateway_gets_its_channel_only() {
        let (url, received) = spawn_gateway(StatusCode::OK).await;
        let config = NotifyConfig {
            push_url: Some(url),
            ..NotifyConfig::default()
        };
        let notifier = Notifier::from_config(&config).unwrap();

        let subscriber = Subscription {
            user_id: "u1".to_string(),
            exam_id: 4,
            fcm_token: Some("tok".to_string()),
            email: Some("a@example.org".to_string()),
            phone_number: Some("+911234567890".to_string()),
        };
        let report = notifier
            .notify(&Notification::exam_updated(4, "JEE Main"), &[subscriber])
            .await;

        assert_eq!(
            report.delivered,
            [ChannelKind::Push, ChannelKind::Email, ChannelKind::Sms]
        );
        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["channel"], "push");
        assert_eq!(received[0]["recipients"], json!(["tok"]));
    }
}
