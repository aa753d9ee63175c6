use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use axum::{Extension, Json};
use futures::{SinkExt, StreamExt};
use log::{debug, error};

use crate::auth;
use crate::user::Sub;

use super::model::ConversationDto;
use super::service::ConversationService;
use super::Id;

pub async fn find_all(
    Extension(auth_user): Extension<auth::User>,
    conversation_service: State<ConversationService>,
) -> crate::Result<Json<Vec<ConversationDto>>> {
    let conversations = conversation_service.list(&auth_user).await?;
    Ok(Json(conversations))
}

pub async fn mark_read(
    Extension(auth_user): Extension<auth::User>,
    Path(id): Path<Id>,
    conversation_service: State<ConversationService>,
) -> crate::Result<()> {
    conversation_service.mark_read(&id, &auth_user).await?;
    Ok(())
}

pub async fn subscribe(
    Extension(auth_user): Extension<auth::User>,
    ws: WebSocketUpgrade,
    State(conversation_service): State<ConversationService>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, auth_user, conversation_service))
}

async fn handle_socket(
    mut ws: WebSocket,
    auth_user: auth::User,
    conversation_service: ConversationService,
) {
    let mut subscription = match conversation_service.subscribe(&auth_user).await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("failed to open conversation subscription: {e}");
            let _ = ws.close().await;
            return;
        }
    };

    let (mut sender, mut receiver) = ws.split();
    let viewer: Sub = auth_user.sub().to_owned();

    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(conversations) => {
                    let view = ConversationService::view(conversations, &viewer);
                    let payload = match serde_json::to_string(&view) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!("failed to serialize conversation snapshot: {e}");
                            break;
                        }
                    };
                    if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => {
                    debug!("conversation subscription of {viewer} closed by client");
                    break;
                }
                Some(Err(e)) => {
                    debug!("conversation subscription of {viewer} failed: {e}");
                    break;
                }
                Some(Ok(_)) => continue,
            }
        }
    }

    subscription.cancel();
}
