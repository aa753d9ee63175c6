use crate::auth;
use crate::conversation::service::ConversationService;
use crate::live::Subscription;
use crate::user::Sub;
use crate::{conversation, user};

use super::model::{order_snapshot, Message, MessageDto};
use super::Repository;

#[derive(Clone)]
pub struct MessageService {
    repository: Repository,
    conversation_service: ConversationService,
    user_service: user::Service,
}

impl MessageService {
    pub fn new(
        repository: Repository,
        conversation_service: ConversationService,
        user_service: user::Service,
    ) -> Self {
        Self {
            repository,
            conversation_service,
            user_service,
        }
    }
}

impl MessageService {
    /// Appends a message to the pair's shared log and refreshes the
    /// conversation directory record: last message, time, and the recipient
    /// marked unread.
    pub async fn send(
        &self,
        auth_user: &auth::User,
        recipient: &Sub,
        text: &str,
    ) -> super::Result<MessageDto> {
        let text = text.trim();
        if text.is_empty() {
            return Err(super::Error::EmptyText);
        }

        let conversation_id = conversation::Id::of(auth_user.sub(), recipient)?;
        let recipient_info = self.user_service.find_user_info(recipient).await?;

        let message = Message::new(
            conversation_id.clone(),
            auth_user.sub().to_owned(),
            auth_user.label(),
            text,
        );
        let id = self.repository.insert(&message).await?;

        self.conversation_service
            .touch(
                &conversation_id,
                [auth_user.sub().to_owned(), recipient.to_owned()],
                recipient_info.label(),
                text,
                recipient,
            )
            .await?;

        Ok(MessageDto::from(message.with_id(id)))
    }

    pub async fn find_by_conversation_id(
        &self,
        auth_user: &auth::User,
        conversation_id: &conversation::Id,
    ) -> super::Result<Vec<MessageDto>> {
        self.check_participant(conversation_id, auth_user)?;

        let messages = self
            .repository
            .find_by_conversation_id(conversation_id)
            .await?;

        Ok(Self::view(messages))
    }

    pub async fn subscribe(
        &self,
        conversation_id: &conversation::Id,
    ) -> super::Result<Subscription<Message>> {
        self.repository.subscribe(conversation_id).await
    }

    pub fn check_participant(
        &self,
        conversation_id: &conversation::Id,
        auth_user: &auth::User,
    ) -> super::Result<()> {
        if !conversation_id.contains(auth_user.sub()) {
            return Err(conversation::Error::NotParticipant.into());
        }
        Ok(())
    }

    /// Orders a raw snapshot into the view subscribers receive.
    pub fn view(mut messages: Vec<Message>) -> Vec<MessageDto> {
        order_snapshot(&mut messages);
        messages.into_iter().map(MessageDto::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;
    use tokio::sync::Mutex;

    use super::*;
    use crate::conversation::service::tests::InMemoryConversations;
    use crate::user::model::UserInfo;
    use crate::user::service::UserService;

    #[derive(Default)]
    struct InMemoryMessages {
        log: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl super::super::repository::MessageRepository for InMemoryMessages {
        async fn insert(&self, message: &Message) -> crate::message::Result<ObjectId> {
            let id = ObjectId::new();
            self.log
                .lock()
                .await
                .push(message.clone().with_id(id));
            Ok(id)
        }

        async fn find_by_conversation_id(
            &self,
            conversation_id: &conversation::Id,
        ) -> crate::message::Result<Vec<Message>> {
            Ok(self
                .log
                .lock()
                .await
                .iter()
                .filter(|m| m.conversation_id == *conversation_id)
                .cloned()
                .collect())
        }

        async fn subscribe(
            &self,
            _conversation_id: &conversation::Id,
        ) -> crate::message::Result<Subscription<Message>> {
            unimplemented!("not exercised in unit tests")
        }
    }

    struct StaticUsers;

    #[async_trait]
    impl UserService for StaticUsers {
        async fn find_user_info(&self, sub: &Sub) -> user::Result<UserInfo> {
            Ok(UserInfo {
                sub: sub.to_owned(),
                email: format!("{sub}@example.com"),
                name: sub.to_string(),
            })
        }
    }

    fn harness() -> (MessageService, Arc<InMemoryMessages>, Arc<InMemoryConversations>) {
        let messages = Arc::new(InMemoryMessages::default());
        let conversations = Arc::new(InMemoryConversations::default());
        let service = MessageService::new(
            messages.clone(),
            ConversationService::new(conversations.clone()),
            Arc::new(StaticUsers),
        );
        (service, messages, conversations)
    }

    fn alice() -> auth::User {
        auth::User::new(Sub("u1".into()), "Alice", "alice@example.com")
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_write() {
        let (service, messages, conversations) = harness();

        let result = service.send(&alice(), &Sub("u2".into()), "   ").await;

        assert!(matches!(result, Err(super::super::Error::EmptyText)));
        assert!(messages.log.lock().await.is_empty());
        assert!(conversations.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn send_appends_and_touches_the_directory() {
        let (service, _, conversations) = harness();
        let recipient = Sub("u2".into());

        let dto = service.send(&alice(), &recipient, "  Hi  ").await.unwrap();
        assert_eq!(dto.text, "Hi");
        assert_eq!(dto.conversation_id.as_str(), "u1_u2");
        assert!(dto.timestamp.is_some());

        let records = conversations.records.lock().await;
        let record = records.get("u1_u2").unwrap();
        assert_eq!(record.last_message, "Hi");
        assert_eq!(record.unread_by, vec![recipient]);
    }

    #[tokio::test]
    async fn two_message_exchange_matches_the_expected_view() {
        let (service, _, conversations) = harness();
        let u2 = Sub("u2".into());

        service.send(&alice(), &u2, "Hi").await.unwrap();
        service.send(&alice(), &u2, "Hello").await.unwrap();

        let id = conversation::Id::of(alice().sub(), &u2).unwrap();
        let view = service
            .find_by_conversation_id(&alice(), &id)
            .await
            .unwrap();

        let texts: Vec<_> = view.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "Hello"]);
        assert!(view[0].timestamp <= view[1].timestamp);

        let records = conversations.records.lock().await;
        let record = records.get("u1_u2").unwrap();
        assert_eq!(record.last_message, "Hello");
        assert_eq!(record.unread_by, vec![u2]);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn self_conversation_is_rejected() {
        let (service, messages, _) = harness();

        let result = service.send(&alice(), alice().sub(), "hello me").await;

        assert!(matches!(
            result,
            Err(super::super::Error::_Conversation(
                conversation::Error::SelfConversation
            ))
        ));
        assert!(messages.log.lock().await.is_empty());
    }

    #[tokio::test]
    async fn foreign_conversation_history_is_forbidden() {
        let (service, _, _) = harness();
        let id = conversation::Id::of(&Sub("u3".into()), &Sub("u4".into())).unwrap();

        let result = service.find_by_conversation_id(&alice(), &id).await;

        assert!(matches!(
            result,
            Err(super::super::Error::_Conversation(
                conversation::Error::NotParticipant
            ))
        ));
    }

    #[tokio::test]
    async fn messaging_an_unknown_user_fails() {
        struct NoUsers;

        #[async_trait]
        impl UserService for NoUsers {
            async fn find_user_info(&self, sub: &Sub) -> user::Result<UserInfo> {
                Err(user::Error::NotFound(sub.to_owned()))
            }
        }

        let messages = Arc::new(InMemoryMessages::default());
        let conversations = Arc::new(InMemoryConversations::default());
        let service = MessageService::new(
            messages.clone(),
            ConversationService::new(conversations),
            Arc::new(NoUsers),
        );

        let result = service.send(&alice(), &Sub("ghost".into()), "hi").await;
        assert!(matches!(result, Err(super::super::Error::_User(_))));
        assert!(messages.log.lock().await.is_empty());
    }
}
