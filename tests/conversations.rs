use book_market_service::conversation;
use book_market_service::message::model::{order_snapshot, Message};
use book_market_service::user::Sub;

fn sub(s: &str) -> Sub {
    Sub(s.to_owned())
}

#[test]
fn conversation_id_is_order_independent() {
    let u1 = sub("u1");
    let u2 = sub("u2");

    let id = conversation::Id::of(&u1, &u2).unwrap();
    assert_eq!(id, conversation::Id::of(&u2, &u1).unwrap());
    assert_eq!(id.as_str(), "u1_u2");
    assert!(id.contains(&u1));
    assert!(id.contains(&u2));
}

#[test]
fn conversation_with_oneself_is_rejected() {
    let u1 = sub("u1");
    assert!(conversation::Id::of(&u1, &u1).is_err());
}

#[test]
fn snapshots_are_ordered_by_server_time() {
    let id = conversation::Id::of(&sub("u1"), &sub("u2")).unwrap();

    let mut snapshot = vec![
        Message {
            id: Some(mongodb::bson::oid::ObjectId::new()),
            conversation_id: id.clone(),
            sender: sub("u2"),
            sender_name: "u2".into(),
            text: "Hello".into(),
            timestamp: Some(2),
        },
        Message {
            id: Some(mongodb::bson::oid::ObjectId::new()),
            conversation_id: id,
            sender: sub("u1"),
            sender_name: "u1".into(),
            text: "Hi".into(),
            timestamp: Some(1),
        },
    ];

    order_snapshot(&mut snapshot);

    let view: Vec<(&str, Option<i64>)> = snapshot
        .iter()
        .map(|m| (m.text.as_str(), m.timestamp))
        .collect();
    assert_eq!(view, vec![("Hi", Some(1)), ("Hello", Some(2))]);
}
