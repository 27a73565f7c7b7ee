#![allow(dead_code)]

use pgnav::app::App;
use pgnav::catalog::{CatalogLoader, CatalogSnapshot, ChildrenLoader};
use pgnav::command::Command;
use pgnav::config::Config;
use pgnav::main_lib;

pub const CATALOG: &str = include_str!("../../demos/catalog.json");
pub const ORDER: &str = include_str!("../../demos/order.json");

pub fn loader() -> CatalogLoader {
    CatalogLoader::new(&CatalogSnapshot::from_json(CATALOG).unwrap())
}

/// App with the root listing installed
pub fn app_with(loader: &dyn ChildrenLoader) -> App {
    let mut app = App::new(Config::default(), "shop");
    main_lib::settle(&mut app, loader);
    app
}

pub fn run(app: &mut App, loader: &dyn ChildrenLoader, script: &str) {
    let commands = Command::parse_script(script).unwrap();
    main_lib::run_script(app, loader, &commands);
}

pub fn browser_labels(app: &mut App) -> Vec<String> {
    app.browser.render(100).into_iter().map(|r| r.label).collect()
}

pub fn current_id(app: &App) -> String {
    app.browser
        .current_node()
        .map(|n| n.id.clone())
        .unwrap_or_default()
}
