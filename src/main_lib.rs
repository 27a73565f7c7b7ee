// Library module containing testable functions from main.rs

use crate::app::App;
use crate::async_task::execute_task;
use crate::catalog::{CatalogLoader, CatalogSnapshot, ChildrenLoader};
use crate::command::Command;
use crate::config::Config;
use crate::error::Result;
use crate::filter::filter_tree;
use crate::query::SearchQuery;
use crate::screenshot;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Label shown for the browser root: the catalog file's stem
pub fn connection_label(catalog: Option<&Path>) -> String {
    catalog
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string())
}

/// Loader for `catalog`, or an empty catalog when none was given
pub fn open_catalog(catalog: Option<&Path>) -> Result<CatalogLoader> {
    match catalog {
        Some(path) => CatalogLoader::from_path(path),
        None => Ok(CatalogLoader::new(&CatalogSnapshot::default())),
    }
}

pub fn load_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Build the application the CLI commands share
pub fn build_app(config: Config, catalog: Option<&Path>, json: Option<&Path>) -> Result<App> {
    let app = App::new(config, &connection_label(catalog));
    match json {
        Some(path) => {
            let document = load_document(path)?;
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            Ok(app.with_document(&document, &label))
        }
        None => Ok(app),
    }
}

/// Run every queued load on this thread until the app asks for no more
pub fn settle(app: &mut App, loader: &dyn ChildrenLoader) {
    loop {
        let tasks = app.drain_tasks();
        if tasks.is_empty() {
            break;
        }
        for task in tasks {
            app.handle_task_result(execute_task(loader, task));
        }
    }
}

/// Apply `commands` in order, settling loads after each one. Stops early
/// on `quit`.
pub fn run_script(app: &mut App, loader: &dyn ChildrenLoader, commands: &[Command]) {
    settle(app, loader);
    for command in commands {
        app.apply_command(command);
        settle(app, loader);
        if app.should_quit {
            log::info!("script: quit after {}", command);
            break;
        }
    }
}

pub fn run_screenshot(
    config: Config,
    catalog: &Path,
    json: Option<&Path>,
    script: &str,
    width: u16,
    height: u16,
) -> Result<String> {
    let loader = open_catalog(Some(catalog))?;
    let commands = Command::parse_script(script)?;
    let mut app = build_app(config, Some(catalog), json)?;
    run_script(&mut app, &loader, &commands);
    screenshot::render_to_string(&mut app, width, height)
}

/// One line per match: decorated label, a tab, then the ancestor path
pub fn filter_lines(loader: &CatalogLoader, connection: &str, query: &str) -> Vec<String> {
    let tree = loader.load_all(connection);
    let result = filter_tree(&tree, &SearchQuery::parse(query));
    log::debug!("filter {:?}: {} matches in {} nodes", query, result.len(), tree.len());

    result
        .matches
        .iter()
        .filter_map(|idx| {
            let node = tree.get(*idx)?;
            let mut path: Vec<&str> = tree
                .ancestors(*idx)
                .into_iter()
                .filter_map(|a| tree.get(a).map(|n| n.label.as_str()))
                .collect();
            path.reverse();
            Some(format!("{}\t{}", node.display_label(), path.join("/")))
        })
        .collect()
}

pub fn run_filter(catalog: &Path, query: &str) -> Result<()> {
    let loader = open_catalog(Some(catalog))?;
    for line in filter_lines(&loader, &connection_label(Some(catalog)), query) {
        println!("{}", line);
    }
    Ok(())
}
