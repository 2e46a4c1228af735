use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;
use specloom_core::{
    Declaration, DeclaredType, FieldSpec, MediaSpec, Method, OperationSpec, ParamSpec, PathDecl,
    ResponseSpec, SchemaDecl, StaticExamples,
};
use tracing::info;
use utoipa::openapi::{Info, InfoBuilder};
use walkdir::WalkDir;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub fn menu_info() -> Info {
    InfoBuilder::new().title("Menu API").version("1.0.0").build()
}

/// The restaurant menu API, declared as if read from `<root>/schemas/resturant/menu`
/// and `<root>/paths/resturant/menu`.
pub fn restaurant_declarations(root: &Path) -> Vec<Declaration> {
    let schemas_source = root.join("schemas/resturant/menu.yaml");
    let paths_source = root.join("paths/resturant/menu.yaml");
    let menu_item = DeclaredType::new("MenuItem");
    let menu = DeclaredType::new("Menu");

    vec![
        SchemaDecl::new(&menu_item)
            .with_source(&schemas_source)
            .field("name", FieldSpec::of_type("string").required())
            .field("price", FieldSpec::of_type("number").required())
            .into(),
        SchemaDecl::new(&menu)
            .with_source(&schemas_source)
            .field("items", FieldSpec::array(&menu_item).required())
            .into(),
        PathDecl::new("/restaurants/{id}/menu")
            .with_file_id("restaurant_menu")
            .with_tag("Restaurant")
            .with_source(&paths_source)
            .operation(
                OperationSpec::get()
                    .with_param(ParamSpec::path("id", "integer").with_format("int64"))
                    .with_response(
                        ResponseSpec::new(200)
                            .with_description("OK")
                            .with_content(MediaSpec::json(&menu)),
                    )
                    .with_response(ResponseSpec::new(404).with_description("Not found")),
            )
            .with_examples(StaticExamples::new().with(
                Method::Get,
                [
                    Some(json!({"items": [{"name": "Fried Rice", "price": 12.5}]})),
                    None,
                ],
            ))
            .into(),
    ]
}

/// Reads every file below `root`, keyed by its path relative to `root`.
pub fn read_tree(root: &Path) -> anyhow::Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root)?.display().to_string();
            files.insert(relative, fs::read(entry.path())?);
        }
    }
    Ok(files)
}
