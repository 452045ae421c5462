//! HTTP server for the chemical space dashboard.
//!
//! Serves the control page, JSON endpoints for the selectors and the
//! runtime estimate, and the precomputed demo plots for iframe embedding.
//! Connections are handled sequentially on the accept thread; every handler
//! only touches pure lookups plus the mutex-guarded request log, so there is
//! nothing further to synchronize.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::assets::{
    download_data_uri, resolve_demo, DemoError, DemoKey, DemoStore, DOWNLOAD_FILENAME,
};
use crate::model::{
    estimate_seconds, PlotType, ReductionAlgo, SampleDataset, SimilarityType,
};
use crate::weblog::{LogRecord, UploadMethod, WebLog};

/// Everything a request handler needs.
pub struct ServerState {
    pub demos: DemoStore,
    pub log: WebLog,
}

/// Run the dashboard server on the specified port. Blocks forever.
pub fn run_server(state: &ServerState, port: u16) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = match TcpListener::bind(&addr) {
        Ok(l) => l,
        Err(e) => {
            error!("error binding to {}: {}", addr, e);
            return;
        }
    };

    info!("chemical space dashboard at http://{}", addr);
    info!("demo plots from {}", state.demos.root().display());

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => handle_connection(stream, state),
            Err(e) => warn!("connection error: {}", e),
        }
    }
}

fn handle_connection(mut stream: TcpStream, state: &ServerState) {
    let mut buffer = [0; 4096];
    if stream.read(&mut buffer).is_err() {
        return;
    }

    let request = String::from_utf8_lossy(&buffer);
    let first_line = request.lines().next().unwrap_or("");

    let response = if first_line.starts_with("GET / ") || first_line.starts_with("GET /index") {
        http_response(200, "text/html", DASHBOARD_HTML)
    } else if first_line.starts_with("GET /api/options") {
        serve_options()
    } else if first_line.starts_with("GET /api/estimate") {
        serve_estimate(&extract_query(&request))
    } else if first_line.starts_with("GET /api/demo") {
        serve_demo_meta(&extract_query(&request), state)
    } else if first_line.starts_with("GET /demo") {
        serve_demo_page(&extract_query(&request), state)
    } else {
        http_response(404, "text/plain", "Not Found")
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Parse query parameters out of the request line.
fn extract_query(request: &str) -> std::collections::HashMap<String, String> {
    let mut params = std::collections::HashMap::new();

    if let Some(line) = request.lines().next() {
        if let Some(query_start) = line.find('?') {
            if let Some(query_end) = line[query_start..].find(' ') {
                let query = &line[query_start + 1..query_start + query_end];
                for pair in query.split('&') {
                    if let Some(eq) = pair.find('=') {
                        let key = pair[..eq].to_string();
                        let value = pair[eq + 1..].to_string();
                        params.insert(key, value);
                    }
                }
            }
        }
    }

    params
}

type Query = std::collections::HashMap<String, String>;

#[derive(Serialize)]
struct DatasetOption {
    token: &'static str,
    name: &'static str,
    description: &'static str,
    length: u64,
}

#[derive(Serialize)]
struct ChoiceOption {
    token: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct Options {
    datasets: Vec<DatasetOption>,
    similarities: Vec<ChoiceOption>,
    algorithms: Vec<ChoiceOption>,
    plots: Vec<ChoiceOption>,
}

fn serve_options() -> String {
    let options = Options {
        datasets: SampleDataset::ALL
            .iter()
            .map(|d| DatasetOption {
                token: d.token(),
                name: d.name(),
                description: d.description(),
                length: d.sample_len(),
            })
            .collect(),
        similarities: SimilarityType::ALL
            .iter()
            .map(|s| ChoiceOption { token: s.name(), name: s.name() })
            .collect(),
        algorithms: ReductionAlgo::ALL
            .iter()
            .map(|a| ChoiceOption { token: a.token(), name: a.name() })
            .collect(),
        plots: PlotType::ALL
            .iter()
            .map(|p| ChoiceOption { token: p.name(), name: p.name() })
            .collect(),
    };

    json_response(200, &options)
}

#[derive(Serialize)]
struct EstimateResponse {
    samples: u64,
    similarity: &'static str,
    algorithm: &'static str,
    seconds: u64,
}

fn serve_estimate(query: &Query) -> String {
    let samples: u64 = match query.get("samples").and_then(|s| s.parse().ok()) {
        Some(n) => n,
        None => return bad_request("samples must be a non-negative integer"),
    };
    let sim = match query.get("similarity").and_then(|s| SimilarityType::from_str(s)) {
        Some(s) => s,
        None => return bad_request("unknown similarity type"),
    };
    let algo = match query.get("algorithm").and_then(|s| ReductionAlgo::from_str(s)) {
        Some(a) => a,
        None => return bad_request("unknown algorithm"),
    };

    let body = EstimateResponse {
        samples,
        similarity: sim.name(),
        algorithm: algo.name(),
        seconds: estimate_seconds(samples, sim, algo),
    };
    json_response(200, &body)
}

fn parse_demo_key(query: &Query) -> Result<DemoKey, &'static str> {
    let dataset = query
        .get("dataset")
        .and_then(|s| SampleDataset::from_str(s))
        .ok_or("unknown dataset")?;
    let similarity = query
        .get("similarity")
        .and_then(|s| SimilarityType::from_str(s))
        .ok_or("unknown similarity type")?;
    let algo = query
        .get("algorithm")
        .and_then(|s| ReductionAlgo::from_str(s))
        .ok_or("unknown algorithm")?;
    let plot = query
        .get("plot")
        .and_then(|s| PlotType::from_str(s))
        .ok_or("unknown plot type")?;
    Ok(DemoKey { dataset, similarity, algo, plot })
}

#[derive(Serialize)]
struct DemoMeta {
    asset: &'static str,
    dataset: &'static str,
    dataset_length: u64,
    similarity: &'static str,
    algorithm: &'static str,
    plot: &'static str,
    download: String,
    download_filename: &'static str,
}

fn serve_demo_meta(query: &Query, state: &ServerState) -> String {
    let key = match parse_demo_key(query) {
        Ok(k) => k,
        Err(msg) => return bad_request(msg),
    };

    let asset = resolve_demo(key);
    let html = match state.demos.load(asset) {
        Ok(html) => html,
        Err(e @ DemoError::NotFound(_)) => return not_found(&e.to_string()),
        Err(e) => {
            error!("demo load failed: {}", e);
            return http_response(500, "text/plain", "Internal Server Error");
        }
    };

    let body = DemoMeta {
        asset,
        dataset: key.dataset.name(),
        dataset_length: key.dataset.sample_len(),
        similarity: key.similarity.name(),
        algorithm: key.algo.name(),
        plot: key.plot.name(),
        download: download_data_uri(&html),
        download_filename: DOWNLOAD_FILENAME,
    };
    json_response(200, &body)
}

/// Serve a precomputed plot for iframe embedding and log the view.
fn serve_demo_page(query: &Query, state: &ServerState) -> String {
    let key = match parse_demo_key(query) {
        Ok(k) => k,
        Err(msg) => return bad_request(msg),
    };

    let started = Instant::now();
    let asset = resolve_demo(key);
    let html = match state.demos.load(asset) {
        Ok(html) => html,
        Err(e @ DemoError::NotFound(_)) => return not_found(&e.to_string()),
        Err(e) => {
            error!("demo load failed: {}", e);
            return http_response(500, "text/plain", "Internal Server Error");
        }
    };

    // Sample datasets all carry a target column.
    let record = LogRecord::now(
        UploadMethod::Sample,
        key.dataset.sample_len(),
        true,
        started.elapsed().as_secs_f64(),
        key.similarity,
        key.algo,
        key.plot,
        None,
        None,
    );
    if let Err(e) = state.log.append(&record) {
        warn!("failed to append request log: {}", e);
    }

    http_response(200, "text/html", &html)
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn bad_request(msg: &str) -> String {
    json_response(400, &ErrorBody { error: msg })
}

fn not_found(msg: &str) -> String {
    json_response(404, &ErrorBody { error: msg })
}

fn json_response<T: Serialize>(status: u16, body: &T) -> String {
    match serde_json::to_string(body) {
        Ok(json) => http_response(status, "application/json", &json),
        Err(e) => {
            error!("response serialization failed: {}", e);
            http_response(500, "text/plain", "Internal Server Error")
        }
    }
}

fn http_response(status: u16, content_type: &str, body: &str) -> String {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };

    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nAccess-Control-Allow-Origin: *\r\nConnection: close\r\n\r\n{}",
        status, status_text, content_type, body.len(), body
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Chemical Space Dashboard</title>
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&family=JetBrains+Mono:wght@400;500&display=swap" rel="stylesheet">
    <style>
        :root {
            --bg-primary: #0a0f14;
            --bg-secondary: #111820;
            --bg-tertiary: #1a2332;

            --accent-primary: #3b82f6;
            --accent-success: #22c55e;
            --accent-warning: #f59e0b;

            --text-primary: #f1f5f9;
            --text-secondary: #94a3b8;
            --text-muted: #64748b;

            --border-color: #1e293b;

            --space-1: 4px;
            --space-2: 8px;
            --space-3: 12px;
            --space-4: 16px;
            --space-5: 24px;
            --space-6: 32px;

            --font-sans: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
            --font-mono: 'JetBrains Mono', 'Fira Code', monospace;

            --radius-sm: 6px;
            --radius-md: 10px;
            --radius-lg: 16px;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: var(--font-sans);
            background: var(--bg-primary);
            color: var(--text-primary);
            min-height: 100vh;
            line-height: 1.6;
            -webkit-font-smoothing: antialiased;
        }

        .header {
            background: var(--bg-secondary);
            border-bottom: 1px solid var(--border-color);
            padding: var(--space-5) var(--space-6);
        }

        .header h1 {
            font-size: 1.5rem;
            font-weight: 700;
            letter-spacing: -0.02em;
        }

        .header p {
            font-size: 0.85rem;
            color: var(--text-muted);
        }

        .main {
            max-width: 1400px;
            margin: 0 auto;
            padding: var(--space-6);
        }

        .dashboard {
            display: grid;
            grid-template-columns: 300px 1fr;
            gap: var(--space-6);
            align-items: start;
        }

        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            border-radius: var(--radius-lg);
            padding: var(--space-5);
        }

        .card-title {
            font-size: 0.875rem;
            font-weight: 600;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            color: var(--text-secondary);
            margin-bottom: var(--space-4);
        }

        .control-group {
            margin-bottom: var(--space-5);
        }

        .control-group label {
            display: block;
            font-size: 0.8125rem;
            color: var(--text-secondary);
            font-weight: 500;
            margin-bottom: var(--space-2);
        }

        select {
            width: 100%;
            background: var(--bg-tertiary);
            border: 1px solid var(--border-color);
            color: var(--text-primary);
            padding: var(--space-3);
            border-radius: var(--radius-sm);
            font-family: var(--font-sans);
            font-size: 0.875rem;
            cursor: pointer;
        }

        select:focus {
            outline: none;
            border-color: var(--accent-primary);
        }

        .stat {
            background: var(--bg-tertiary);
            border-radius: var(--radius-md);
            padding: var(--space-4);
            margin-bottom: var(--space-3);
        }

        .stat-value {
            font-family: var(--font-mono);
            font-size: 1.25rem;
            font-weight: 700;
        }

        .stat-label {
            font-size: 0.75rem;
            color: var(--text-muted);
            text-transform: uppercase;
            letter-spacing: 0.05em;
        }

        .download-btn {
            display: inline-block;
            width: 100%;
            text-align: center;
            background: var(--accent-primary);
            color: #fff;
            text-decoration: none;
            padding: var(--space-3);
            border-radius: var(--radius-sm);
            font-size: 0.875rem;
            font-weight: 600;
        }

        .plot-frame {
            width: 100%;
            height: 740px;
            border: 1px solid var(--border-color);
            border-radius: var(--radius-md);
            background: #fff;
        }

        .about {
            margin-top: var(--space-6);
            color: var(--text-secondary);
            font-size: 0.875rem;
        }

        .about a { color: var(--accent-primary); }

        @media (max-width: 1000px) {
            .dashboard { grid-template-columns: 1fr; }
        }
    </style>
</head>
<body>
    <header class="header">
        <h1>Chemical Space Dashboard</h1>
        <p>Interactive 2D projections of molecular datasets</p>
    </header>

    <main class="main">
        <div class="dashboard">
            <div class="card">
                <div class="card-title">Visualization Parameters</div>

                <div class="control-group">
                    <label for="dataset">Sample dataset</label>
                    <select id="dataset"></select>
                </div>

                <div class="control-group">
                    <label for="similarity">Similarity type</label>
                    <select id="similarity"></select>
                </div>

                <div class="control-group">
                    <label for="algorithm">Reduction algorithm</label>
                    <select id="algorithm"></select>
                </div>

                <div class="control-group">
                    <label for="plot">Plot type</label>
                    <select id="plot"></select>
                </div>

                <div class="stat">
                    <div class="stat-value" id="dataset-length">-</div>
                    <div class="stat-label">Molecules</div>
                </div>

                <div class="stat">
                    <div class="stat-value" id="eta">-</div>
                    <div class="stat-label">Estimated live runtime</div>
                </div>

                <a id="download" class="download-btn" download="interactive_plot.html" href="#">Download Plot</a>
            </div>

            <div class="card">
                <div class="card-title">Chemical Space</div>
                <iframe id="plot-frame" class="plot-frame"></iframe>
                <div class="about">
                    Precomputed demo projections. To visualize your own
                    dataset, run the live pipeline from the command line.
                    Sample datasets: BBBP (Martins et al., 2012) and AqSolDB
                    (Sorkun et al., 2019).
                </div>
            </div>
        </div>
    </main>

    <script>
        function fill(select, options) {
            options.forEach(o => {
                const opt = document.createElement('option');
                opt.value = o.token;
                opt.textContent = o.name;
                select.appendChild(opt);
            });
        }

        async function loadOptions() {
            const res = await fetch('/api/options');
            const options = await res.json();
            fill(document.getElementById('dataset'), options.datasets);
            fill(document.getElementById('similarity'), options.similarities);
            fill(document.getElementById('algorithm'), options.algorithms);
            fill(document.getElementById('plot'), options.plots);
        }

        function params() {
            return new URLSearchParams({
                dataset: document.getElementById('dataset').value,
                similarity: document.getElementById('similarity').value,
                algorithm: document.getElementById('algorithm').value,
                plot: document.getElementById('plot').value
            });
        }

        function formatSeconds(s) {
            if (s >= 60) return (s / 60).toFixed(1) + ' min';
            return s + ' s';
        }

        async function update() {
            const p = params();
            const res = await fetch('/api/demo?' + p);
            if (!res.ok) return;
            const meta = await res.json();

            document.getElementById('dataset-length').textContent = meta.dataset_length;
            const download = document.getElementById('download');
            download.href = meta.download;
            download.setAttribute('download', meta.download_filename);
            document.getElementById('plot-frame').src = '/demo?' + p;

            const est = await fetch('/api/estimate?' + new URLSearchParams({
                samples: meta.dataset_length,
                similarity: document.getElementById('similarity').value,
                algorithm: document.getElementById('algorithm').value
            }));
            if (est.ok) {
                const e = await est.json();
                document.getElementById('eta').textContent = formatSeconds(e.seconds);
            }
        }

        document.querySelectorAll('select').forEach(s => s.addEventListener('change', update));

        loadOptions().then(update);
    </script>
</body>
</html>"##;
