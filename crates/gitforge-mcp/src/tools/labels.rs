//! Label tools.

use std::sync::Arc;

use gitforge_core::{Error, ForgeApi, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::protocol::{JsonSchema, Property, ToolDefinition};
use crate::registry::Registry;
use crate::tools::args::{self, opt_str, require_id, IdOrName, PageArgs, RepoArgs};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        ToolDefinition {
            name: "list_labels".to_string(),
            description: "List labels in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("page", Property::integer("Page number"))
                .prop("limit", Property::integer("Page size")),
        },
        |client, arguments| Box::pin(list_labels(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "get_label".to_string(),
            description: "Get a single label by ID or name".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::string("Label ID or name"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(get_label(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_label".to_string(),
            description: "Create a new label in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("name", Property::string("Label name"))
                .prop(
                    "color",
                    Property::string("Label color (hex code, e.g. '#00aabb')"),
                )
                .prop("description", Property::string("Label description"))
                .require(&["name", "color"]),
        },
        |client, arguments| Box::pin(create_label(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_label".to_string(),
            description: "Edit an existing label".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Label ID"))
                .prop("name", Property::string("New label name"))
                .prop("color", Property::string("New label color (hex code)"))
                .prop("description", Property::string("New label description"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(edit_label(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "delete_label".to_string(),
            description: "Delete a label from a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Label ID"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(delete_label(client, arguments)),
    );
}

#[derive(Debug, Default, Deserialize)]
struct ListLabelsArgs {
    #[serde(flatten)]
    target: RepoArgs,
    #[serde(flatten)]
    page: PageArgs,
}

async fn list_labels(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: ListLabelsArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;

    let mut query = Vec::new();
    args.page.append_to(&mut query);

    client
        .get(&format!("/repos/{}/{}/labels", owner, repo), &query)
        .await
}

#[derive(Debug, Default, Deserialize)]
struct GetLabelArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<IdOrName>,
}

async fn get_label(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: GetLabelArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = IdOrName::require(args.id, "id")?;

    client
        .get(&format!("/repos/{}/{}/labels/{}", owner, repo, id), &[])
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CreateLabelArgs {
    #[serde(flatten)]
    target: RepoArgs,
    name: Option<String>,
    color: Option<String>,
    description: Option<String>,
}

async fn create_label(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: CreateLabelArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;

    let (name, color) = match (opt_str(args.name), opt_str(args.color)) {
        (Some(name), Some(color)) => (name, color),
        _ => {
            return Err(Error::InvalidArguments(
                "name and color are required".to_string(),
            ))
        }
    };

    let mut body = Map::new();
    body.insert("name".to_string(), json!(name));
    body.insert("color".to_string(), json!(color));
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }

    client
        .post(
            &format!("/repos/{}/{}/labels", owner, repo),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct EditLabelArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<i64>,
    name: Option<String>,
    color: Option<String>,
    description: Option<String>,
}

async fn edit_label(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: EditLabelArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    let mut body = Map::new();
    if let Some(v) = opt_str(args.name) {
        body.insert("name".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.color) {
        body.insert("color".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }

    client
        .patch(
            &format!("/repos/{}/{}/labels/{}", owner, repo, id),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct DeleteLabelArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<i64>,
}

async fn delete_label(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: DeleteLabelArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    client
        .delete(&format!("/repos/{}/{}/labels/{}", owner, repo, id))
        .await?;

    Ok(json!({ "status": "deleted" }))
}
