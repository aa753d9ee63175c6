use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::user::Sub;

use super::Id;

#[derive(Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "_id")]
    pub id: Id,
    pub participants: [Sub; 2],
    pub other_user_name: String,
    pub last_message: String,
    pub last_message_time: Option<i64>,
    #[serde(default)]
    pub unread_by: Vec<Sub>,
}

impl Conversation {
    pub fn new(
        id: Id,
        participants: [Sub; 2],
        other_user_name: &str,
        last_message: &str,
        recipient: &Sub,
    ) -> Self {
        Self {
            id,
            participants,
            other_user_name: other_user_name.to_owned(),
            last_message: last_message.to_owned(),
            last_message_time: Some(chrono::Utc::now().timestamp_millis()),
            unread_by: vec![recipient.to_owned()],
        }
    }
}

/// What a participant sees in their conversation list.
#[derive(Serialize, Debug)]
pub struct ConversationDto {
    pub id: Id,
    pub recipient: Sub,
    pub other_user_name: String,
    pub last_message: String,
    pub last_message_time: Option<i64>,
    pub unread: bool,
}

impl ConversationDto {
    /// `None` when the viewer is not a participant; such records never reach
    /// the viewer's list.
    pub fn for_viewer(conversation: Conversation, viewer: &Sub) -> Option<Self> {
        let [first, second] = conversation.participants;

        let recipient = if first == *viewer {
            second
        } else if second == *viewer {
            first
        } else {
            return None;
        };

        Some(Self {
            id: conversation.id,
            recipient,
            other_user_name: conversation.other_user_name,
            last_message: conversation.last_message,
            last_message_time: conversation.last_message_time,
            unread: conversation.unread_by.contains(viewer),
        })
    }
}

/// Most recent first; records without a timestamp sort last.
pub fn order_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| match (a.last_message_time, b.last_message_time) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
