use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::answer::AnswerService;
use crate::db::models::DataSource;
use crate::db::Database;
use crate::refresh::RefreshCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub coordinator: RefreshCoordinator,
    pub answers: AnswerService,
    pub max_age: Duration,
    /// Pin the reference date (otherwise "yesterday" is computed per request)
    pub date_override: Option<NaiveDate>,
}

impl AppState {
    fn reference_date(&self) -> NaiveDate {
        self.date_override
            .unwrap_or_else(|| (Utc::now() - chrono::Duration::days(1)).date_naive())
    }
}

/// Build the Axum router for the chat page and its JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ask", post(ask_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the chat HTML page, injecting the data-source mode.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = INDEX_HTML.replace(
        r#"<body>"#,
        &format!(r#"<body data-mode="{}">"#, state.coordinator.source().as_str()),
    );
    Html(html)
}

#[derive(Debug, Deserialize)]
struct AskForm {
    question: String,
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    answer: String,
    date: NaiveDate,
    match_count: usize,
    from_cache: bool,
    stale: bool,
}

/// POST /ask — form-encoded `question` (and optional `date`).
async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AskForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = form.date.unwrap_or_else(|| state.reference_date());
    let result = state
        .coordinator
        .ensure_fresh(date, state.max_age)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let answer = state.answers.ask(&form.question, &result.matches).await;

    Ok(Json(AskResponse {
        answer,
        date,
        match_count: result.matches.len(),
        from_cache: result.from_cache,
        stale: result.stale,
    }))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<NaiveDate>,
}

/// GET /api/matches?date=YYYY-MM-DD — cached rows only, no refresh.
async fn matches_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DateQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = q.date.unwrap_or_else(|| state.reference_date());
    state
        .db
        .matches_for_date(date)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    mode: DataSource,
    date: NaiveDate,
    match_count: i64,
    last_refreshed: Option<chrono::DateTime<Utc>>,
}

/// GET /api/status — live/demo mode and refresh metadata.
async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = state.reference_date();
    let match_count = state
        .db
        .match_count(date)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let cache_state = state
        .db
        .cache_state(date)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(StatusResponse {
        mode: state.coordinator.source(),
        date,
        match_count,
        last_refreshed: cache_state.map(|s| s.last_refreshed),
    }))
}

/// Embedded single-file chat page (HTML + CSS + JS)
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Matchday Q&A</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #00c896;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  .badge { padding: .2rem .6rem; border-radius: 4px; font-size: .75rem; font-weight: 700; text-transform: uppercase; }
  .badge.demo { background: #ff9800; color: #000; }
  .badge.live { background: var(--accent); color: #000; }
  main { max-width: 760px; margin: 0 auto; padding: 1.5rem 1rem; display: flex; flex-direction: column; gap: 1rem; }
  #chat { display: flex; flex-direction: column; gap: .7rem; min-height: 300px; }
  .bubble { padding: .8rem 1rem; border-radius: 10px; max-width: 85%; white-space: pre-wrap; font-size: .92rem; }
  .bubble.user { background: var(--accent); color: #000; align-self: flex-end; }
  .bubble.bot { background: var(--card); border: 1px solid var(--border); align-self: flex-start; }
  .bubble.meta { color: var(--muted); background: none; font-size: .75rem; padding: 0 .3rem; align-self: flex-start; }
  form { display: flex; gap: .6rem; }
  input[type=text] { flex: 1; background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 8px; padding: .7rem 1rem; font-size: .95rem; }
  input[type=text]:focus { outline: none; border-color: var(--accent); }
  button { background: var(--accent); color: #000; border: none; border-radius: 8px; padding: .7rem 1.3rem; font-weight: 700; cursor: pointer; }
  button:disabled { opacity: .5; cursor: wait; }
  #status-line { color: var(--muted); font-size: .8rem; }
</style>
</head>
<body>
<header>
  <h1>⚽ Matchday Q&A</h1>
  <span class="badge" id="mode-badge">…</span>
  <span style="margin-left:auto;color:var(--muted);font-size:.8rem;" id="status-line"></span>
</header>

<main>
  <div id="chat">
    <div class="bubble bot">Ask me anything about yesterday's football results.</div>
  </div>
  <form id="ask-form">
    <input type="text" id="question" name="question" placeholder="Who won the Arsenal match?" autocomplete="off" required>
    <button type="submit" id="send">Ask</button>
  </form>
</main>

<script>
const chat = document.getElementById('chat');
const form = document.getElementById('ask-form');
const input = document.getElementById('question');
const send = document.getElementById('send');

function bubble(cls, text) {
  const div = document.createElement('div');
  div.className = 'bubble ' + cls;
  div.textContent = text;
  chat.appendChild(div);
  div.scrollIntoView({ behavior: 'smooth' });
  return div;
}

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const question = input.value.trim();
  if (!question) return;
  bubble('user', question);
  input.value = '';
  send.disabled = true;
  const thinking = bubble('meta', 'Thinking…');
  try {
    const r = await fetch('/ask', {
      method: 'POST',
      headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
      body: new URLSearchParams({ question }),
    });
    thinking.remove();
    if (!r.ok) { bubble('bot', 'Something went wrong (' + r.status + ').'); return; }
    const data = await r.json();
    bubble('bot', data.answer);
    const src = data.from_cache ? (data.stale ? 'stale cache' : 'cache') : 'live fetch';
    bubble('meta', data.match_count + ' matches for ' + data.date + ' · ' + src);
  } catch (err) {
    thinking.remove();
    bubble('bot', 'Network error: ' + err);
  } finally {
    send.disabled = false;
    input.focus();
  }
});

async function loadStatus() {
  const r = await fetch('/api/status');
  if (!r.ok) return;
  const s = await r.json();
  const badge = document.getElementById('mode-badge');
  badge.textContent = s.mode;
  badge.className = 'badge ' + s.mode;
  const refreshed = s.last_refreshed ? new Date(s.last_refreshed).toLocaleTimeString() : 'never';
  document.getElementById('status-line').textContent =
    s.match_count + ' matches for ' + s.date + ' · refreshed ' + refreshed;
}

loadStatus();
setInterval(loadStatus, 30000);
</script>
</body>
</html>"#;
