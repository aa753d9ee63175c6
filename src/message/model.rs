use std::cmp::Ordering;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::conversation;
use crate::user::Sub;

#[derive(Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub conversation_id: conversation::Id,
    pub sender: Sub,
    pub sender_name: String,
    pub text: String,
    /// Server-assigned milliseconds. `None` while a write is still pending
    /// acknowledgement (possible for records produced by other writers).
    pub timestamp: Option<i64>,
}

impl Message {
    pub fn new(
        conversation_id: conversation::Id,
        sender: Sub,
        sender_name: &str,
        text: &str,
    ) -> Self {
        Self {
            id: None,
            conversation_id,
            sender,
            sender_name: sender_name.to_owned(),
            text: text.to_owned(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Serialize, Debug)]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: conversation::Id,
    pub sender: Sub,
    pub sender_name: String,
    pub text: String,
    pub timestamp: Option<i64>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            conversation_id: message.conversation_id,
            sender: message.sender,
            sender_name: message.sender_name,
            text: message.text,
            timestamp: message.timestamp,
        }
    }
}

/// Ascending by server timestamp. A message whose timestamp is still pending
/// sorts after every acknowledged one, pending peers keep their local insert
/// order (ObjectIds embed it). The store itself guarantees no order.
pub fn order_snapshot(messages: &mut [Message]) {
    messages.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, timestamp: Option<i64>) -> Message {
        let a = Sub("u1".into());
        let b = Sub("u2".into());
        Message {
            id: Some(ObjectId::new()),
            conversation_id: conversation::Id::of(&a, &b).unwrap(),
            sender: a,
            sender_name: "Alice".into(),
            text: text.to_owned(),
            timestamp,
        }
    }

    #[test]
    fn orders_ascending_regardless_of_arrival_order() {
        let mut snapshot = vec![
            message("third", Some(30)),
            message("first", Some(10)),
            message("second", Some(20)),
        ];

        order_snapshot(&mut snapshot);

        let texts: Vec<_> = snapshot.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn pending_messages_sort_last_not_first() {
        let mut snapshot = vec![
            message("pending", None),
            message("acknowledged", Some(1_700_000_000_000)),
        ];

        order_snapshot(&mut snapshot);

        assert_eq!(snapshot.last().unwrap().text, "pending");
    }

    #[test]
    fn pending_messages_keep_insert_order_between_themselves() {
        let first = message("pending-1", None);
        let second = message("pending-2", None);
        let mut snapshot = vec![second.clone(), first.clone()];

        order_snapshot(&mut snapshot);

        assert_eq!(snapshot[0].id, first.id.min(second.id));
    }
}
