// src/models/subscription.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user's interest in updates for one exam, with the contact points to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: String,
    pub exam_id: i64,
    /// Push (FCM) device token.
    pub fcm_token: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// DTO for subscribing; every contact point is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[validate(length(min = 1, max = 4096))]
    pub token: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 4, max = 20))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedExam {
    pub exam_id: i64,
    pub exam_name: String,
}
