//! # Templates Maud — Página de Demonstração
//!
//! Uma única página, renderizada no servidor:
//!
//! ```text
//! ┌──────────────── header ─────────────────────┐
//! │ Inference Pipeline          N sessões ativas │
//! ├──────────────────────┬──────────────────────┤
//! │ Demos                │ Eventos (SSE)        │
//! │  [Hospital Triage ▶] │  SessionCreated ...  │
//! │  [Pizza Gamif.    ▶] │  RunCompleted  ...   │
//! │ Fatos (JSON) [Run]   │                      │
//! │ Resultado <pre>      │                      │
//! ├──────────────────────┴──────────────────────┤
//! │ Tabela de rotas da API                      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! O script inline só chama a API JSON e escuta `/events`.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::session::DemoInfo;

const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/api/examples", "Catálogo de demos"),
    ("POST", "/api/sessions", "Cria sessão: {\"example_id\": \"triage\"}"),
    ("GET", "/api/sessions/{id}", "Resumo da sessão"),
    ("POST", "/api/sessions/{id}/run", "Executa o pipeline: {\"temperature\": {\"value\": 41}}"),
    ("GET", "/api/sessions/{id}/pending", "Inferências pendentes"),
    ("GET", "/api/sessions/{id}/knowledge", "Snapshot da KB"),
    ("POST", "/api/sessions/{id}/reset", "Reinicia a KB"),
    ("POST", "/api/sessions/{id}/dump", "Grava config, KB e inferências em DATA_DIR"),
    ("DELETE", "/api/sessions/{id}", "Encerra a sessão"),
    ("GET", "/events", "Stream SSE"),
];

/// Fatos sugeridos no textarea para cada demo.
fn sample_input(demo_id: &str) -> &'static str {
    match demo_id {
        "triage" => r#"{"temperature": {"value": 41}, "heart_rate": {"value": 130}}"#,
        "gamification" => {
            r#"{"sale": {"value": {"product": "pizza", "price": 100}}, "customer_visits": {"value": 12}}"#
        }
        _ => "{}",
    }
}

pub fn index_page(demos: &[DemoInfo], session_count: usize) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Inference Pipeline" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h1 { "Inference Pipeline" }
                    span class="badge" id="session-count" { (session_count) " sessões ativas" }
                }
                main {
                    section class="panel" {
                        h2 { "Demos" }
                        @for demo in demos {
                            button class="demo" data-demo=(demo.id) data-sample=(sample_input(demo.id)) {
                                (demo.name)
                            }
                        }
                        p class="hint" id="session-label" { "Nenhuma sessão" }
                        textarea id="facts" rows="6" {}
                        div class="actions" {
                            button id="run" disabled { "Run" }
                            button id="reset" disabled { "Reset" }
                        }
                        pre id="result" {}
                    }
                    section class="panel" {
                        h2 { "Eventos" }
                        ul id="events" {}
                    }
                }
                section class="routes" {
                    h2 { "API" }
                    table {
                        @for (method, path, description) in ROUTES {
                            tr {
                                td class="method" { (method) }
                                td { code { (path) } }
                                td { (description) }
                            }
                        }
                    }
                }
                (PreEscaped(SCRIPT))
            }
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f5f2; color: #222; }
header { display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; background: #222; color: #eee; }
main { display: grid; grid-template-columns: 3fr 2fr; gap: 16px; padding: 16px 24px; }
.panel, .routes { background: #fff; border-radius: 6px; padding: 12px 16px; }
.routes { margin: 0 24px 24px; }
.badge { font-size: 13px; opacity: .8; }
button.demo { margin-right: 8px; }
textarea { width: 100%; font-family: monospace; }
pre { background: #f0efe9; padding: 8px; max-height: 420px; overflow: auto; }
#events { font-family: monospace; font-size: 12px; list-style: none; padding: 0; }
td.method { font-weight: bold; padding-right: 12px; }
"#;

const SCRIPT: &str = r#"<script>
(function () {
  var sessionId = null;
  var facts = document.getElementById('facts');
  var result = document.getElementById('result');
  var label = document.getElementById('session-label');
  var runBtn = document.getElementById('run');
  var resetBtn = document.getElementById('reset');

  function show(res) {
    return res.json().then(function (body) { result.textContent = JSON.stringify(body, null, 2); return body; });
  }

  document.querySelectorAll('button.demo').forEach(function (btn) {
    btn.addEventListener('click', function () {
      fetch('/api/sessions', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ example_id: btn.dataset.demo })
      }).then(show).then(function (info) {
        sessionId = info.id;
        label.textContent = btn.textContent.trim() + ' / ' + sessionId;
        facts.value = btn.dataset.sample;
        runBtn.disabled = false;
        resetBtn.disabled = false;
      });
    });
  });

  runBtn.addEventListener('click', function () {
    fetch('/api/sessions/' + sessionId + '/run', {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: facts.value
    }).then(show);
  });

  resetBtn.addEventListener('click', function () {
    fetch('/api/sessions/' + sessionId + '/reset', { method: 'POST' }).then(show);
  });

  var events = document.getElementById('events');
  var es = new EventSource('/events');
  es.onmessage = function (e) {
    var ev = JSON.parse(e.data);
    var li = document.createElement('li');
    li.textContent = ev.type + ' ' + ev.session_id.slice(0, 8) + (ev.result ? ' ' + ev.result : '') + (ev.message ? ' ' + ev.message : '');
    events.prepend(li);
  };
})();
</script>"#;
