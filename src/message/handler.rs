use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use axum::{Extension, Json};
use axum_extra::extract::Query;
use futures::{SinkExt, StreamExt};
use log::{debug, error};
use serde::Deserialize;

use crate::auth;
use crate::conversation;
use crate::error::Error;
use crate::user::Sub;

use super::model::MessageDto;
use super::service::MessageService;

#[derive(Deserialize)]
pub struct SendParams {
    recipient: Sub,
    text: String,
}

pub async fn send(
    Extension(auth_user): Extension<auth::User>,
    message_service: State<MessageService>,
    Json(params): Json<SendParams>,
) -> crate::Result<Json<MessageDto>> {
    let message = message_service
        .send(&auth_user, &params.recipient, &params.text)
        .await?;
    Ok(Json(message))
}

#[derive(Deserialize)]
pub struct FindAllParams {
    conversation_id: Option<conversation::Id>,
}

pub async fn find_all(
    Extension(auth_user): Extension<auth::User>,
    Query(params): Query<FindAllParams>,
    message_service: State<MessageService>,
) -> crate::Result<Json<Vec<MessageDto>>> {
    let conversation_id = params
        .conversation_id
        .ok_or(Error::QueryParamRequired("conversation_id".to_owned()))?;

    let messages = message_service
        .find_by_conversation_id(&auth_user, &conversation_id)
        .await?;

    Ok(Json(messages))
}

pub async fn subscribe(
    Extension(auth_user): Extension<auth::User>,
    Path(conversation_id): Path<conversation::Id>,
    ws: WebSocketUpgrade,
    State(message_service): State<MessageService>,
) -> crate::Result<Response> {
    // reject outsiders before upgrading
    message_service.check_participant(&conversation_id, &auth_user)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, conversation_id, message_service)))
}

async fn handle_socket(
    mut ws: WebSocket,
    conversation_id: conversation::Id,
    message_service: MessageService,
) {
    let mut subscription = match message_service.subscribe(&conversation_id).await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("failed to open message subscription for {conversation_id}: {e}");
            let _ = ws.close().await;
            return;
        }
    };

    let (mut sender, mut receiver) = ws.split();

    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(messages) => {
                    let view = MessageService::view(messages);
                    let payload = match serde_json::to_string(&view) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!("failed to serialize message snapshot: {e}");
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
                    debug!("message subscription on {conversation_id} closed by client");
                    break;
                }
                Some(Err(e)) => {
                    debug!("message subscription on {conversation_id} failed: {e}");
                    break;
                }
                Some(Ok(_)) => continue,
            }
        }
    }

    subscription.cancel();
}
