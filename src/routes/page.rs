// ABOUTME: Index page route serving the embedded chat UI shell
// ABOUTME: The page calls the JSON API routes from the browser
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::response::Html;
use axum::routing::get;
use axum::Router;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Pocket Assistant</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
    #log { border: 1px solid #ccc; border-radius: 8px; padding: 1rem; min-height: 16rem; }
    .user { text-align: right; color: #0645ad; }
    form { display: flex; gap: .5rem; margin-top: 1rem; }
    input { flex: 1; padding: .5rem; }
  </style>
</head>
<body>
  <h1 id="greeting">Pocket Assistant</h1>
  <p id="weather"></p>
  <div id="log"></div>
  <form id="chat">
    <input id="message" autocomplete="off" placeholder="Ask me anything">
    <button>Send</button>
  </form>
  <script>
    const log = document.getElementById('log');
    const add = (text, cls) => {
      const p = document.createElement('p');
      p.className = cls;
      p.textContent = text;
      log.appendChild(p);
    };
    (async () => {
      const loc = await (await fetch('/api/detect-location')).json();
      const init = await (await fetch('/api/init', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(loc),
      })).json();
      if (init.success) {
        document.getElementById('greeting').textContent = init.greeting;
        const w = init.weather;
        document.getElementById('weather').textContent = `${w.temp}°C, ${w.description}`;
      }
    })();
    document.getElementById('chat').addEventListener('submit', async (e) => {
      e.preventDefault();
      const input = document.getElementById('message');
      const message = input.value.trim();
      if (!message) return;
      input.value = '';
      add(message, 'user');
      const reply = await (await fetch('/api/chat', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ message }),
      })).json();
      add(reply.response || reply.error, 'assistant');
    });
  </script>
</body>
</html>
"#;

/// Index page routes handler
pub struct PageRoutes;

impl PageRoutes {
    /// Create the index route
    pub fn routes() -> Router {
        Router::new().route("/", get(Self::index))
    }

    async fn index() -> Html<&'static str> {
        Html(INDEX_HTML)
    }
}
