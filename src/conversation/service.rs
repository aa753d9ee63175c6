use log::debug;

use crate::auth;
use crate::live::Subscription;
use crate::user::Sub;

use super::model::{order_by_recency, Conversation, ConversationDto};
use super::{Id, Repository};

#[derive(Clone)]
pub struct ConversationService {
    repository: Repository,
}

impl ConversationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

impl ConversationService {
    /// Refreshes the conversation's summary record after a message was sent,
    /// creating the record on first contact.
    ///
    /// Update first, then branch on the discriminated failure: only a missing
    /// record falls back to creation. Any other store failure propagates, so a
    /// transient error can never spawn a duplicate record.
    pub async fn touch(
        &self,
        id: &Id,
        participants: [Sub; 2],
        other_user_name: &str,
        last_message: &str,
        recipient: &Sub,
    ) -> super::Result<()> {
        match self
            .repository
            .update_on_message(id, last_message, recipient)
            .await
        {
            Ok(()) => Ok(()),
            Err(super::Error::NotFound(_)) => {
                debug!("first message in {id}, creating the conversation record");
                let conversation = Conversation::new(
                    id.to_owned(),
                    participants,
                    other_user_name,
                    last_message,
                    recipient,
                );
                self.repository.insert(&conversation).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, auth_user: &auth::User) -> super::Result<Vec<ConversationDto>> {
        let conversations = self.repository.find_by_participant(auth_user.sub()).await?;
        Ok(Self::view(conversations, auth_user.sub()))
    }

    pub async fn subscribe(
        &self,
        auth_user: &auth::User,
    ) -> super::Result<Subscription<Conversation>> {
        self.repository.subscribe(auth_user.sub()).await
    }

    pub async fn mark_read(&self, id: &Id, auth_user: &auth::User) -> super::Result<()> {
        if !id.contains(auth_user.sub()) {
            return Err(super::Error::NotParticipant);
        }
        self.repository.mark_read(id, auth_user.sub()).await
    }

    /// Orders a snapshot for the viewer and drops any record the viewer is
    /// not a participant of.
    pub fn view(mut conversations: Vec<Conversation>, viewer: &Sub) -> Vec<ConversationDto> {
        order_by_recency(&mut conversations);
        conversations
            .into_iter()
            .filter_map(|c| ConversationDto::for_viewer(c, viewer))
            .collect()
    }
}
