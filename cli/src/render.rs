use orbit_api::{
    domain::{
        collection::Collection,
        history::History,
        request::Request,
        response::{ContentKind, Response},
    },
    envelope::ImportSummary,
    workspace::Workspace,
};

pub fn tabs(ws: &Workspace) {
    for tab in ws.tabs() {
        let marker = if ws.active_tab_id() == Some(tab.id()) { "*" } else { " " };
        let saved = if ws.is_saved(tab.id()) { "" } else { " (unsaved)" };
        println!(
            "{} {}  [{}] {} {}  {}{}",
            marker,
            tab.id(),
            tab.request.protocol,
            tab.request.method,
            tab.request.url,
            tab.request.name,
            saved
        );
    }
}

pub fn request(request: &Request) {
    println!("{} [{}]", request.name, request.protocol);
    println!("{}", request.summary());
    for header in &request.headers.0 {
        println!("{}: {}", header.key, header.value);
    }
    if !request.body.is_empty() {
        println!();
        println!("{}", request.body);
    }
}

pub fn response(response: &Response) {
    let flag = if response.is_success() { "" } else { "  !" };
    println!(
        "{} {}  {}ms  {} bytes{}",
        response.status, response.status_text, response.duration_ms, response.size, flag
    );
    for header in &response.headers {
        println!("{}: {}", header.key, header.value);
    }
    println!();
    println!("{}", pretty_body(response));
}

fn pretty_body(response: &Response) -> String {
    if response.content_kind() == ContentKind::Json {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&response.body) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    response.body.clone()
}

pub fn collections(collections: &[Collection]) {
    if collections.is_empty() {
        println!("No collections yet.");
    }
    for collection in collections {
        let fold = if collection.is_open { "v" } else { ">" };
        println!(
            "{} {}  {} ({} requests)",
            fold,
            collection.id,
            collection.name,
            collection.requests.len()
        );
        if collection.is_open {
            for request in &collection.requests {
                println!("    {}  {}  {}", request.id, request.name, request.summary());
            }
        }
    }
}

pub fn history(history: &History) {
    if history.is_empty() {
        println!("History is empty.");
    }
    for entry in history.iter() {
        println!("{}  [{}] {}", entry.id, entry.protocol, entry.name);
    }
}

pub fn import_summary(summary: &ImportSummary) {
    if let Some(count) = summary.collections {
        println!("Imported {} collections.", count);
    }
    if let Some(count) = summary.history {
        println!("Imported {} history entries.", count);
    }
}
