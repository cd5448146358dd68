//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and extension independently.

use serde::{Deserialize, Serialize};

use crate::domain::{LibraryContent, LibraryKind, PageContent, QuizItem};
use crate::router::TaskKind;

/// Messages the extension can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Quiz {
        page: PageContent,
    },
    SubmitAnswer {
        answer: String,
        reference: String,
    },
    Summarize {
        content: String,
    },
    Explain {
        content: String,
    },
    Chat {
        text: String,
    },
    Compare {
        content: String,
        topic: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Quiz {
        items: Vec<QuizItem>,
        origin: String,
    },
    AnswerResult {
        correct: bool,
    },
    Summary {
        text: String,
    },
    Explanation {
        text: String,
    },
    ChatReply {
        text: String,
    },
    Comparison {
        text: String,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AnalyzeIn {
    #[serde(default)]
    pub title: String,
    pub body: String,
}

#[derive(Serialize)]
pub struct QuizOut {
    pub items: Vec<QuizItem>,
    pub origin: String,
}

#[derive(Debug, Deserialize)]
pub struct GradeIn {
    pub answer: String,
    pub reference: String,
}
#[derive(Serialize)]
pub struct GradeOut {
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct RespondIn {
    pub kind: TaskKind,
    pub content: String,
    #[serde(default)]
    pub context: String,
}
#[derive(Serialize)]
pub struct RespondOut {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveLibraryIn {
    #[serde(rename = "type")]
    pub kind: LibraryKind,
    pub title: String,
    pub content: LibraryContent,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizResultIn {
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
