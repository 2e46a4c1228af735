//! Assembly of a document from the registries.

use std::collections::HashSet;

use tracing::{debug, warn};
use utoipa::openapi::path::{PathItem, PathItemBuilder};
use utoipa::openapi::{Info, OpenApiBuilder, Paths};

use crate::document::{Document, ResponseOrder};
use crate::error::DeclarationError;
use crate::path::operation::{OperationContext, build_operation};
use crate::path::{ParamSpec, ResponseSpec, apply_examples};
use crate::registry::{ComponentRegistry, PathRecord, PathRegistry, ScopedRegistry};

/// Reads a component registry and a path registry into a document.
///
/// Assembly is a pull over the registries: schemas are copied as registered,
/// operations are built from the path bindings.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    components: ComponentRegistry,
    paths: PathRegistry,
}

impl DocumentAssembler {
    /// Creates an assembler over the given registries.
    #[must_use]
    pub fn new(components: ComponentRegistry, paths: PathRegistry) -> Self {
        Self { components, paths }
    }

    /// Creates an assembler over the active registries.
    #[must_use]
    pub fn current() -> Self {
        Self::new(ComponentRegistry::current(), PathRegistry::current())
    }

    /// Returns the component registry.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns the path registry.
    #[must_use]
    pub fn paths(&self) -> &PathRegistry {
        &self.paths
    }

    /// Builds the full document.
    ///
    /// Schemas keep their registration order and responses their declaration
    /// order once the document is serialized.
    ///
    /// # Errors
    ///
    /// Fails when a media schema references something that cannot be resolved.
    pub fn assemble(&self, info: Info) -> Result<Document, DeclarationError> {
        let mut response_order = Vec::new();
        let paths = self.assemble_paths(&mut response_order)?;
        let components = self.components.to_components();
        let components = (!components.schemas.is_empty()).then_some(components);
        let schema_order = self.components.schemas().keys().cloned().collect::<Vec<_>>();

        let openapi = OpenApiBuilder::new()
            .info(info)
            .paths(paths)
            .components(components)
            .build();
        debug!(
            paths = openapi.paths.paths.len(),
            schemas = self.components.schemas().len(),
            "document assembled"
        );
        Ok(Document::new(openapi)
            .with_schema_order(schema_order)
            .with_response_order(response_order))
    }

    fn assemble_paths(
        &self,
        response_order: &mut Vec<ResponseOrder>,
    ) -> Result<Paths, DeclarationError> {
        // Providers run arbitrary code, release the registry borrow first.
        let records = self.paths.records().clone();

        let mut paths = Paths::new();
        for (url, record) in &records {
            let item = self.path_item(url, record, response_order)?;
            paths.paths.insert(url.clone(), item);
        }
        Ok(paths)
    }

    fn path_item(
        &self,
        url: &str,
        record: &PathRecord,
        response_order: &mut Vec<ResponseOrder>,
    ) -> Result<PathItem, DeclarationError> {
        let mut builder = PathItemBuilder::new();

        if let Some(primary) = record.primary() {
            let parameters = primary
                .params()
                .iter()
                .map(ParamSpec::to_parameter)
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder
                .summary(primary.summary())
                .description(primary.description())
                .parameters((!parameters.is_empty()).then_some(parameters));
        }

        let mut declared = HashSet::new();
        for binding in record.bindings() {
            let context = OperationContext {
                path_params: binding.params(),
                tags: binding.tags(),
                security: binding.security(),
            };

            for spec in binding.operations() {
                let method = spec.method();
                let mut operation = build_operation(context, spec, &self.components)?;
                let statuses = spec
                    .responses()
                    .iter()
                    .map(ResponseSpec::status)
                    .collect::<Vec<_>>();

                if let Some(provider) = binding.examples() {
                    match provider.produce_examples(method) {
                        Ok(examples) => apply_examples(&mut operation, &statuses, &examples),
                        Err(error) => {
                            debug!(%url, %method, %error, "example provider failed, examples skipped");
                        }
                    }
                }

                if !declared.insert(method) {
                    warn!(%url, %method, "operation declared more than once, keeping the last one");
                }
                builder = builder.operation(method.into(), operation);
                response_order.push(ResponseOrder {
                    url: url.to_string(),
                    method,
                    statuses: statuses.iter().map(ToString::to_string).collect(),
                });
            }
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{ExampleError, MediaSpec, Method, OperationSpec, PathDecl, StaticExamples};
    use crate::schema::{DeclaredType, FieldSpec, ItemsSpec, SchemaDecl};
    use serde_json::json;
    use utoipa::openapi::InfoBuilder;

    fn info() -> Info {
        InfoBuilder::new().title("Test API").version("1.0.0").build()
    }

    fn ok_response(schema: &str) -> ResponseSpec {
        ResponseSpec::new(200)
            .with_description("OK")
            .with_content(MediaSpec::json(ItemsSpec::reference(schema)))
    }

    #[test]
    fn should_take_path_level_params_from_first_binding_only() {
        let components = ComponentRegistry::new();
        let paths = PathRegistry::new();
        PathDecl::new("/menus/{id}")
            .with_param(ParamSpec::path("id", "integer"))
            .with_tag("Menu")
            .operation(OperationSpec::get().with_response(ok_response("Menu")))
            .register_in(&paths)
            .expect("should register");
        PathDecl::new("/menus/{id}")
            .with_param(ParamSpec::path("menu_id", "string"))
            .operation(OperationSpec::delete())
            .register_in(&paths)
            .expect("should register");

        let document = DocumentAssembler::new(components, paths)
            .assemble(info())
            .expect("should assemble");
        let value = serde_json::to_value(&document).expect("should serialize");

        let item = &value["paths"]["/menus/{id}"];
        assert_eq!(item["parameters"].as_array().map(Vec::len), Some(1));
        assert_eq!(item["parameters"][0]["name"], json!("id"));
        assert_eq!(item["get"]["tags"], json!(["Menu"]));
        assert_eq!(item["delete"]["parameters"][0]["name"], json!("menu_id"));
        assert!(item["delete"].get("tags").is_none());
    }

    #[test]
    fn should_keep_registration_order_of_schemas() {
        let components = ComponentRegistry::new();
        for ident in ["Zebra", "Apple"] {
            SchemaDecl::new(&DeclaredType::new(ident))
                .field("name", FieldSpec::of_type("string"))
                .register_in(&components)
                .expect("should register");
        }

        let document = DocumentAssembler::new(components, PathRegistry::new())
            .assemble(info())
            .expect("should assemble");
        let value = serde_json::to_value(&document).expect("should serialize");

        let names = value["components"]["schemas"]
            .as_object()
            .expect("schemas")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Zebra", "Apple"]);
        assert_eq!(value["openapi"], json!("3.1.0"));
    }

    #[test]
    fn should_keep_declaration_order_of_responses() {
        let paths = PathRegistry::new();
        PathDecl::new("/menu")
            .operation(
                OperationSpec::get()
                    .with_response(ResponseSpec::new(404).with_description("Not found"))
                    .with_response(ResponseSpec::new(200).with_description("OK"))
                    .with_response(ResponseSpec::new("default").with_description("Error")),
            )
            .register_in(&paths)
            .expect("should register");

        let document = DocumentAssembler::new(ComponentRegistry::new(), paths)
            .assemble(info())
            .expect("should assemble");
        let value = serde_json::to_value(&document).expect("should serialize");

        let statuses = value["paths"]["/menu"]["get"]["responses"]
            .as_object()
            .expect("responses")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(statuses, vec!["404", "200", "default"]);
        assert_eq!(
            document.paths.paths["/menu"].get.as_ref().map(|get| get.responses.responses.len()),
            Some(3)
        );
    }

    #[test]
    fn should_resolve_media_types_at_assembly_time() {
        let components = ComponentRegistry::new();
        let paths = PathRegistry::new();
        let menu = DeclaredType::new("Menu");
        PathDecl::new("/menu")
            .operation(OperationSpec::get().with_response(
                ResponseSpec::new(200).with_content(MediaSpec::json(&menu)),
            ))
            .register_in(&paths)
            .expect("should register");
        SchemaDecl::new(&menu)
            .with_name("RestaurantMenu")
            .register_in(&components)
            .expect("should register");

        let document = DocumentAssembler::new(components, paths)
            .assemble(info())
            .expect("should assemble");
        let value = serde_json::to_value(&document).expect("should serialize");

        assert_eq!(
            value["paths"]["/menu"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"],
            json!({"$ref": "#/components/schemas/RestaurantMenu"})
        );
    }

    #[test]
    fn should_attach_examples_and_swallow_provider_failures() {
        let paths = PathRegistry::new();
        PathDecl::new("/ok")
            .operation(OperationSpec::get().with_response(ok_response("Thing")))
            .with_examples(StaticExamples::new().with(Method::Get, [Some(json!({"id": 1}))]))
            .register_in(&paths)
            .expect("should register");
        PathDecl::new("/failing")
            .operation(OperationSpec::get().with_response(ok_response("Thing")))
            .with_examples(|_method: Method| -> Result<Vec<Option<serde_json::Value>>, ExampleError> {
                Err(ExampleError::new("cannot build example"))
            })
            .register_in(&paths)
            .expect("should register");

        let document = DocumentAssembler::new(ComponentRegistry::new(), paths)
            .assemble(info())
            .expect("should assemble");
        let value = serde_json::to_value(&document).expect("should serialize");

        let media = "/responses/200/content/application~1json";
        assert_eq!(
            value["paths"]["/ok"]["get"].pointer(&format!("{media}/example")),
            Some(&json!({"id": 1}))
        );
        assert!(
            value["paths"]["/failing"]["get"]
                .pointer(&format!("{media}/example"))
                .is_none()
        );
        assert!(value.get("components").is_none());
    }
}
