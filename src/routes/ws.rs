//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! The connection owns one router session, so the AI mode probe happens once
//! per connection and the chat context accumulates across messages.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::grader;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::router::{RouterResponse, RouterSession, TaskKind};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "coachlens_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "coachlens_backend", "WebSocket connected");
  let mut session = state.new_session().await;

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "coachlens_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "coachlens_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "coachlens_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut RouterSession,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Quiz { page } => {
      let (items, origin) = state.generate_quiz(session, &page).await;
      tracing::info!(target: "quiz", title = %page.title, %origin, "WS quiz served");
      ServerWsMessage::Quiz { items, origin: origin.to_string() }
    }

    ClientWsMessage::SubmitAnswer { answer, reference } => {
      let correct = grader::grade(&answer, &reference);
      tracing::info!(target: "quiz", %correct, "WS submit_answer evaluated");
      ServerWsMessage::AnswerResult { correct }
    }

    ClientWsMessage::Summarize { content } => {
      match session.respond(TaskKind::Summarize, &content, "").await {
        Ok(RouterResponse::Text(text)) => ServerWsMessage::Summary { text },
        Ok(RouterResponse::Quiz(_)) =>
          ServerWsMessage::Error { message: "unexpected quiz payload".into() },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Explain { content } => {
      match session.respond(TaskKind::Explain, &content, "").await {
        Ok(RouterResponse::Text(text)) => ServerWsMessage::Explanation { text },
        Ok(RouterResponse::Quiz(_)) =>
          ServerWsMessage::Error { message: "unexpected quiz payload".into() },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Chat { text } => {
      let context = session.chat_context().to_string();
      match session.respond(TaskKind::Chat, &text, &context).await {
        Ok(RouterResponse::Text(reply)) => {
          session.remember_exchange(&text, &reply);
          ServerWsMessage::ChatReply { text: reply }
        }
        Ok(RouterResponse::Quiz(_)) =>
          ServerWsMessage::Error { message: "unexpected quiz payload".into() },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Compare { content, topic } => {
      match session.respond(TaskKind::Compare, &content, &topic).await {
        Ok(RouterResponse::Text(text)) => ServerWsMessage::Comparison { text },
        Ok(RouterResponse::Quiz(_)) =>
          ServerWsMessage::Error { message: "unexpected quiz payload".into() },
        Err(message) => ServerWsMessage::Error { message },
      }
    }
  }
}
