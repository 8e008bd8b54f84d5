//! Test fixtures shared by the integration suites.
//!
//! [`UpdateServer`] is an in-process HTTP server speaking the launcher's
//! update protocol, backed by plain threads so it works under both sync and
//! async tests. It records every request path so tests can assert which
//! files were actually fetched.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// One served project: its latest revision and the files of that revision.
pub struct Project {
    pub latest: u64,
    pub files: Vec<(String, Vec<u8>)>,
}

impl Project {
    pub fn new(latest: u64, files: &[(&str, &str)]) -> Self {
        Self {
            latest,
            files: files.iter().map(|(p, c)| ((*p).to_string(), c.as_bytes().to_vec())).collect(),
        }
    }
}

/// Minimal HTTP/1.1 update server bound to an ephemeral localhost port.
pub struct UpdateServer {
    endpoint: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl UpdateServer {
    /// Start serving `projects` on a background thread.
    pub fn start(projects: HashMap<String, Project>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(Mutex::new(Vec::new()));
        let projects = Arc::new(projects);

        {
            let hits = Arc::clone(&hits);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    let hits = Arc::clone(&hits);
                    let projects = Arc::clone(&projects);
                    thread::spawn(move || handle_connection(stream, &projects, &hits));
                }
            });
        }

        Self {
            endpoint,
            hits,
        }
    }

    /// Base URL clients should use as their endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Every request path served so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// How many times a file matching `fragment` was downloaded.
    pub fn download_count(&self, fragment: &str) -> usize {
        self.requests().iter().filter(|r| r.contains("/files/") && r.contains(fragment)).count()
    }
}

fn handle_connection(
    stream: TcpStream,
    projects: &HashMap<String, Project>,
    hits: &Mutex<Vec<String>>,
) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;

    // Keep-alive: serve requests until the client hangs up
    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
            return;
        }

        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap_or(0) == 0 {
                return;
            }
            if header == "\r\n" || header == "\n" {
                break;
            }
        }

        let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
        hits.lock().unwrap().push(path.clone());

        let (status, body) = respond(&path, projects);
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n",
            body.len()
        );
        if writer.write_all(head.as_bytes()).is_err() || writer.write_all(&body).is_err() {
            return;
        }
        let _ = writer.flush();
    }
}

fn respond(path: &str, projects: &HashMap<String, Project>) -> (&'static str, Vec<u8>) {
    let trimmed = path.trim_start_matches('/');
    let (project_name, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));

    let Some(project) = projects.get(project_name) else {
        return ("404 Not Found", b"no such project".to_vec());
    };

    if rest == "latest" {
        return ("200 OK", project.latest.to_string().into_bytes());
    }

    if rest.starts_with("changes") {
        let entries: Vec<String> = project
            .files
            .iter()
            .map(|(p, c)| format!("{}: {}", serde_json::to_string(p).unwrap(), c.len()))
            .collect();
        let json = format!("{{{}}}", entries.join(", "));
        return ("200 OK", json.into_bytes());
    }

    if let Some(rest) = rest.strip_prefix("files/") {
        if let Some((_, rel)) = rest.split_once('/') {
            if let Some((_, content)) =
                project.files.iter().find(|(p, _)| p.replace('\\', "/") == rel)
            {
                return ("200 OK", content.clone());
            }
        }
        return ("404 Not Found", b"no such file".to_vec());
    }

    ("404 Not Found", b"bad request".to_vec())
}

/// Write a launcher manifest into `root` pointing at `endpoint`.
///
/// Uses the fixture's standard layout: a "launcher" project updating the
/// root and a "game" project updating `root/game`, launching `game-bin`.
pub fn write_manifest(root: &Path, endpoint: &str) {
    let manifest = format!(
        r#"support_site = "https://forum.example.com"

[remote]
endpoint = "{endpoint}"
launcher_project = "launcher"
app_project = "game"

[app]
dir = "game"
executable = "game-bin"
"#
    );
    std::fs::write(root.join("liftoff.toml"), manifest).unwrap();
}

/// The fixture's standard two projects.
pub fn standard_projects() -> HashMap<String, Project> {
    let mut projects = HashMap::new();
    projects.insert(
        "launcher".to_string(),
        Project::new(1, &[("launcher-notes.txt", "notes-v1")]),
    );
    projects.insert(
        "game".to_string(),
        Project::new(2, &[("data.bin", "data-v2"), ("maps\\level1.dat", "level1-v2")]),
    );
    projects
}
