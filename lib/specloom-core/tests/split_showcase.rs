//! End-to-end split of the restaurant menu API.

use std::fs;

use insta::assert_snapshot;
use serde_json::json;
use specloom_core::split::join_split;
use specloom_core::{OutputFormat, SplitLayout, build_document, split_and_write};

mod common;
pub use self::common::*;

#[test]
fn should_write_mirrored_tree_with_relative_links() -> anyhow::Result<()> {
    init_tracing();
    let temp = tempfile::tempdir()?;
    let root = temp.path();

    let index = split_and_write(
        &SplitLayout::new(root),
        menu_info(),
        restaurant_declarations(root),
    )?;

    assert_eq!(index, root.join("openapi.yaml"));
    let files = read_tree(root)?.into_keys().collect::<Vec<_>>();
    assert_snapshot!(files.join("\n"), @r"
    openapi.yaml
    paths/resturant/restaurant_menu.yaml
    schemas/resturant/Menu.yaml
    schemas/resturant/MenuItem.yaml
    ");

    let index = OutputFormat::Yaml.parse(&fs::read_to_string(&index)?)?;
    assert_eq!(index["openapi"], json!("3.1.0"));
    assert_eq!(
        index["paths"],
        json!({"/restaurants/{id}/menu": {"$ref": "./paths/resturant/restaurant_menu.yaml"}})
    );
    assert_eq!(
        index["components"]["schemas"]["MenuItem"],
        json!({"$ref": "./schemas/resturant/MenuItem.yaml"})
    );
    let schema_names = index["components"]["schemas"]
        .as_object()
        .map(|schemas| schemas.keys().cloned().collect::<Vec<_>>());
    assert_eq!(schema_names, Some(vec!["MenuItem".to_string(), "Menu".to_string()]));

    let path_item = OutputFormat::Yaml.parse(&fs::read_to_string(
        root.join("paths/resturant/restaurant_menu.yaml"),
    )?)?;
    let media = &path_item["get"]["responses"]["200"]["content"]["application/json"];
    assert_eq!(
        media["schema"],
        json!({"$ref": "../../schemas/resturant/Menu.yaml"})
    );
    assert_eq!(
        media["example"],
        json!({"items": [{"name": "Fried Rice", "price": 12.5}]})
    );
    assert!(path_item["get"]["responses"]["404"].get("content").is_none());

    let menu = OutputFormat::Yaml.parse(&fs::read_to_string(
        root.join("schemas/resturant/Menu.yaml"),
    )?)?;
    assert_eq!(
        menu,
        json!({
            "type": "object",
            "properties": {
                "items": {"type": "array", "items": {"$ref": "./MenuItem.yaml"}}
            },
            "required": ["items"]
        })
    );
    Ok(())
}

#[test]
fn should_write_byte_identical_files_twice() -> anyhow::Result<()> {
    init_tracing();
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    let layout = SplitLayout::new(root);

    split_and_write(&layout, menu_info(), restaurant_declarations(root))?;
    let first = read_tree(root)?;
    split_and_write(&layout, menu_info(), restaurant_declarations(root))?;
    let second = read_tree(root)?;

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn should_join_split_tree_back_into_the_document() -> anyhow::Result<()> {
    init_tracing();
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    let layout = SplitLayout::new(root).with_format(OutputFormat::Json);

    let document = build_document(menu_info(), restaurant_declarations(root))?;
    let index = split_and_write(&layout, menu_info(), restaurant_declarations(root))?;

    let joined = join_split(&index, OutputFormat::Json)?;

    assert_eq!(joined, serde_json::to_value(&document)?);
    Ok(())
}

#[test]
fn should_fall_back_to_roots_without_sources() -> anyhow::Result<()> {
    init_tracing();
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    let elsewhere = tempfile::tempdir()?;

    split_and_write(
        &SplitLayout::new(root),
        menu_info(),
        restaurant_declarations(elsewhere.path()),
    )?;

    let files = read_tree(root)?.into_keys().collect::<Vec<_>>();
    assert_snapshot!(files.join("\n"), @r"
    openapi.yaml
    paths/restaurant_menu.yaml
    schemas/Menu.yaml
    schemas/MenuItem.yaml
    ");
    Ok(())
}
