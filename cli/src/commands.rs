use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Subcommand;
use orbit_api::{
    domain::{
        request::{HttpMethod, Protocol, RequestHeaders, RequestPatch},
        ui::Theme,
    },
    error::WorkspaceError,
    workspace::SaveOutcome,
    OrbitApi,
};

use crate::render;

/// One user intent per invocation.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List open tabs; the active one is marked with `*`
    Tabs,
    /// Open an empty tab and make it active
    NewTab,
    /// Close a tab
    CloseTab { id: String },
    /// Make a tab the active one
    Activate { id: String },
    /// Change fields of a tab
    Edit {
        #[arg(long)]
        tab: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 'X', long)]
        method: Option<HttpMethod>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Replaces all headers; repeat for several, as `Key:Value`
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Pick the protocol of a tab
    Protocol {
        protocol: Protocol,
        #[arg(long)]
        tab: Option<String>,
    },
    /// Send a tab's request and show the response
    Send {
        #[arg(long)]
        tab: Option<String>,
    },
    /// Save a tab, updating its saved copy if it has one
    Save {
        #[arg(long)]
        tab: Option<String>,
        /// Name for a new saved request
        #[arg(long)]
        name: Option<String>,
        /// Target collection id; defaults to the first collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// List collections and their saved requests
    Collections,
    NewCollection { name: String },
    RenameCollection { id: String, name: String },
    DeleteCollection {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Remove one saved request from a collection
    DeleteRequest {
        collection: String,
        request: String,
        #[arg(long)]
        yes: bool,
    },
    /// Expand or collapse a collection in listings
    ToggleCollection { id: String },
    /// List recent dispatches, newest first
    History,
    /// Open a saved request or history entry in a tab
    Open { id: String },
    ClearHistory {
        #[arg(long)]
        yes: bool,
    },
    /// Remove all collections and history
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Show or set the accent theme
    Theme { theme: Option<Theme> },
    /// Write collections and history to a dated backup file
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace collections and history from a backup file
    Import { file: PathBuf },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header `{}` is not in Key:Value form", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("header `{}` has no key", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn confirm(yes: bool, what: &str) -> anyhow::Result<()> {
    if !yes {
        bail!("{} cannot be undone; pass --yes to confirm", what);
    }
    Ok(())
}

fn notice(err: WorkspaceError) -> anyhow::Error {
    if err.suggests_new_collection() {
        anyhow!("{}\nCreate one with `orbit new-collection <name>`.", err)
    } else {
        anyhow!("{}", err)
    }
}

async fn tab_or_active(app: &OrbitApi, tab: Option<String>) -> anyhow::Result<String> {
    let id = match tab {
        Some(id) => id,
        None => app
            .read(|ws| ws.active_tab_id().map(str::to_string))
            .await
            .ok_or_else(|| anyhow!("no tab is open"))?,
    };
    if !app.read(|ws| ws.tab(&id).is_some()).await {
        return Err(notice(WorkspaceError::UnknownTab(id)));
    }
    Ok(id)
}

pub async fn execute(app: &OrbitApi, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Tabs => {
            let ws = app.snapshot().await;
            render::tabs(&ws);
        }
        Command::NewTab => {
            let id = app.open_new_tab().await;
            println!("Opened tab {}", id);
        }
        Command::CloseTab { id } => {
            let id = tab_or_active(app, Some(id)).await?;
            app.close_tab(&id).await;
            println!("Closed tab {}", id);
        }
        Command::Activate { id } => {
            let id = tab_or_active(app, Some(id)).await?;
            app.activate_tab(&id).await;
        }
        Command::Edit {
            tab,
            name,
            method,
            url,
            body,
            headers,
        } => {
            let id = tab_or_active(app, tab).await?;
            let patch = RequestPatch {
                name,
                method,
                url,
                body,
                headers: (!headers.is_empty())
                    .then(|| headers.into_iter().collect::<RequestHeaders>()),
                ..Default::default()
            };
            app.update_tab(&id, patch).await;
            let ws = app.snapshot().await;
            if let Some(tab) = ws.tab(&id) {
                render::request(&tab.request);
            }
        }
        Command::Protocol { protocol, tab } => {
            let id = tab_or_active(app, tab).await?;
            if protocol == Protocol::Empty {
                bail!("pick a protocol other than {}", Protocol::Empty);
            }
            app.set_protocol(&id, protocol).await;
            println!("Tab {} now uses {}", id, protocol);
        }
        Command::Send { tab } => {
            let id = tab_or_active(app, tab).await?;
            let sent = app.dispatch(&id).await;
            let ws = app.snapshot().await;
            let Some(tab) = ws.tab(&id) else {
                return Ok(());
            };
            if let Some(error) = &tab.request.error {
                bail!("{}", error.trim_start_matches("Error: "));
            }
            match (&tab.request.response, sent) {
                (Some(response), true) => render::response(response),
                _ => println!("Nothing to send: the URL is empty."),
            }
        }
        Command::Save {
            tab,
            name,
            collection,
        } => {
            let id = tab_or_active(app, tab).await?;
            let outcome = app
                .save_or_update(&id, name.as_deref(), collection.as_deref())
                .await
                .map_err(notice)?;
            match outcome {
                SaveOutcome::Updated { request_id, .. } => println!("Updated {}", request_id),
                SaveOutcome::Created {
                    collection_id,
                    request_id,
                } => println!("Saved as {} in collection {}", request_id, collection_id),
            }
        }
        Command::Collections => {
            let ws = app.snapshot().await;
            render::collections(ws.collections());
        }
        Command::NewCollection { name } => {
            let id = app.create_collection(&name).await.map_err(notice)?;
            println!("Created collection {}", id);
        }
        Command::RenameCollection { id, name } => {
            app.rename_collection(&id, &name).await.map_err(notice)?;
        }
        Command::DeleteCollection { id, yes } => {
            confirm(yes, "Deleting a collection")?;
            app.delete_collection(&id).await.map_err(notice)?;
            println!("Deleted collection {}", id);
        }
        Command::DeleteRequest {
            collection,
            request,
            yes,
        } => {
            confirm(yes, "Deleting a saved request")?;
            if !app
                .delete_saved_request(&collection, &request)
                .await
                .map_err(notice)?
            {
                bail!("collection {} has no request {}", collection, request);
            }
            println!("Deleted request {}", request);
        }
        Command::ToggleCollection { id } => {
            app.toggle_collection_open(&id).await;
        }
        Command::History => {
            let ws = app.snapshot().await;
            render::history(ws.history());
        }
        Command::Open { id } => {
            let tab = app
                .open_request(&id)
                .await
                .ok_or_else(|| anyhow!("no saved or history request with id {}", id))?;
            println!("Opened {} in the active tab", tab);
        }
        Command::ClearHistory { yes } => {
            confirm(yes, "Clearing history")?;
            app.clear_history().await;
        }
        Command::Reset { yes } => {
            confirm(yes, "Resetting all data")?;
            app.reset_all().await;
            println!("All collections and history removed.");
        }
        Command::Theme { theme } => match theme {
            Some(theme) => app.set_theme(theme).await,
            None => {
                let theme = app.read(|ws| ws.theme()).await;
                println!("{} ({})", theme, theme.accent());
            }
        },
        Command::Export { dir } => {
            let path = app.export_to_dir(&dir).await?;
            println!("Exported to {}", path.display());
        }
        Command::Import { file } => {
            let summary = app.import_file(&file).await.map_err(notice)?;
            render::import_summary(&summary);
        }
    }
    Ok(())
}
