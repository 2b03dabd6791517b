//! Project board tools: projects, columns, and board items.

use std::sync::Arc;

use gitforge_core::{Error, ForgeApi, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::protocol::{JsonSchema, Property, ToolDefinition};
use crate::registry::Registry;
use crate::tools::args::{self, opt_str, require_id, require_str, PageArgs, RepoArgs};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        ToolDefinition {
            name: "list_projects".to_string(),
            description: "List projects in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop(
                    "state",
                    Property::string_enum("Filter by state", &["open", "closed", "all"]),
                )
                .prop("page", Property::integer("Page number"))
                .prop("limit", Property::integer("Page size")),
        },
        |client, arguments| Box::pin(list_projects(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "get_project".to_string(),
            description: "Get a single project by ID".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Project ID"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(get_project(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_project".to_string(),
            description: "Create a new project in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("title", Property::string("Project title"))
                .prop("description", Property::string("Project description"))
                .prop(
                    "template_type",
                    Property::integer(
                        "Project template type (0=none, 1=basic kanban, 2=bug triage)",
                    ),
                )
                .prop(
                    "card_type",
                    Property::integer("Card type (0=text only, 1=images and text)"),
                )
                .require(&["title"]),
        },
        |client, arguments| Box::pin(create_project(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_project".to_string(),
            description: "Edit an existing project".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Project ID"))
                .prop("title", Property::string("New title"))
                .prop("description", Property::string("New description"))
                .prop(
                    "card_type",
                    Property::integer("Card type (0=text only, 1=images and text)"),
                )
                .prop(
                    "state",
                    Property::string_enum("New state", &["open", "closed"]),
                )
                .require(&["id"]),
        },
        |client, arguments| Box::pin(edit_project(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "delete_project".to_string(),
            description: "Delete a project from a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Project ID"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(delete_project(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "list_project_columns".to_string(),
            description: "List columns in a project board".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .require(&["project_id"]),
        },
        |client, arguments| Box::pin(list_project_columns(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_project_column".to_string(),
            description: "Create a new column in a project board".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("title", Property::string("Column title"))
                .prop("color", Property::string("Column color (hex code)"))
                .require(&["project_id", "title"]),
        },
        |client, arguments| Box::pin(create_project_column(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_project_column".to_string(),
            description: "Edit an existing project board column".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .prop("title", Property::string("New column title"))
                .prop("color", Property::string("New column color (hex code)"))
                .require(&["project_id", "column_id"]),
        },
        |client, arguments| Box::pin(edit_project_column(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "delete_project_column".to_string(),
            description: "Delete a column from a project board".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .require(&["project_id", "column_id"]),
        },
        |client, arguments| Box::pin(delete_project_column(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "move_project_column".to_string(),
            description: "Reorder a column in a project board".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .prop("sorting", Property::integer("New sort position"))
                .require(&["project_id", "column_id", "sorting"]),
        },
        |client, arguments| Box::pin(move_project_column(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "set_default_project_column".to_string(),
            description: "Set a column as the default for new board items".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .require(&["project_id", "column_id"]),
        },
        |client, arguments| Box::pin(set_default_project_column(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "list_column_items".to_string(),
            description: "List the items (issues) in a project board column".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .require(&["project_id", "column_id"]),
        },
        |client, arguments| Box::pin(list_column_items(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "assign_project_item".to_string(),
            description: "Add an issue to a project board column".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop("column_id", Property::integer("Column ID"))
                .prop("issue_id", Property::integer("ID of the issue to add"))
                .require(&["project_id", "column_id", "issue_id"]),
        },
        |client, arguments| Box::pin(assign_project_item(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "move_project_item".to_string(),
            description: "Move a board item to a different column".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop(
                    "item_id",
                    Property::integer("Board item ID (not the issue ID)"),
                )
                .prop("column_id", Property::integer("Target column ID"))
                .prop("sorting", Property::integer("New sort position"))
                .require(&["project_id", "item_id", "column_id"]),
        },
        |client, arguments| Box::pin(move_project_item(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "remove_project_item".to_string(),
            description: "Remove an item (issue) from a project board".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("project_id", Property::integer("Project ID"))
                .prop(
                    "item_id",
                    Property::integer("Board item ID (not the issue ID)"),
                )
                .require(&["project_id", "item_id"]),
        },
        |client, arguments| Box::pin(remove_project_item(client, arguments)),
    );
}

fn require_project_and_column(
    project_id: Option<i64>,
    column_id: Option<i64>,
) -> Result<(i64, i64)> {
    match (args::positive(project_id), args::positive(column_id)) {
        (Some(project_id), Some(column_id)) => Ok((project_id, column_id)),
        _ => Err(Error::InvalidArguments(
            "project_id and column_id are required".to_string(),
        )),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListProjectsArgs {
    #[serde(flatten)]
    target: RepoArgs,
    state: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

async fn list_projects(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: ListProjectsArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;

    let mut query = Vec::new();
    if let Some(state) = opt_str(args.state) {
        query.push(("state".to_string(), state));
    }
    args.page.append_to(&mut query);

    client
        .get(&format!("/repos/{}/{}/projects", owner, repo), &query)
        .await
}

#[derive(Debug, Default, Deserialize)]
struct ProjectIdArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<i64>,
}

async fn get_project(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: ProjectIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    client
        .get(&format!("/repos/{}/{}/projects/{}", owner, repo, id), &[])
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CreateProjectArgs {
    #[serde(flatten)]
    target: RepoArgs,
    title: Option<String>,
    description: Option<String>,
    template_type: Option<i64>,
    card_type: Option<i64>,
}

async fn create_project(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: CreateProjectArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let title = require_str(args.title, "title")?;

    let mut body = Map::new();
    body.insert("title".to_string(), json!(title));
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }
    // Presence-aware: 0 is a meaningful template/card type.
    if let Some(v) = args.template_type {
        body.insert("template_type".to_string(), json!(v));
    }
    if let Some(v) = args.card_type {
        body.insert("card_type".to_string(), json!(v));
    }

    client
        .post(
            &format!("/repos/{}/{}/projects", owner, repo),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct EditProjectArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<i64>,
    title: Option<String>,
    description: Option<String>,
    card_type: Option<i64>,
    state: Option<String>,
}

async fn edit_project(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: EditProjectArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    let mut body = Map::new();
    if let Some(v) = opt_str(args.title) {
        body.insert("title".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }
    if let Some(v) = args.card_type {
        body.insert("card_type".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.state) {
        body.insert("state".to_string(), json!(v));
    }

    client
        .patch(
            &format!("/repos/{}/{}/projects/{}", owner, repo, id),
            Some(Value::Object(body)),
        )
        .await
}

async fn delete_project(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: ProjectIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    client
        .delete(&format!("/repos/{}/{}/projects/{}", owner, repo, id))
        .await?;

    Ok(json!({ "status": "deleted" }))
}

#[derive(Debug, Default, Deserialize)]
struct ColumnArgs {
    #[serde(flatten)]
    target: RepoArgs,
    project_id: Option<i64>,
    column_id: Option<i64>,
    title: Option<String>,
    color: Option<String>,
    sorting: Option<i64>,
}

async fn list_project_columns(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let project_id = require_id(args.project_id, "project_id")?;

    client
        .get(
            &format!("/repos/{}/{}/projects/{}/columns", owner, repo, project_id),
            &[],
        )
        .await
}

async fn create_project_column(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let project_id = require_id(args.project_id, "project_id")?;
    let title = require_str(args.title, "title")?;

    let mut body = Map::new();
    body.insert("title".to_string(), json!(title));
    if let Some(v) = opt_str(args.color) {
        body.insert("color".to_string(), json!(v));
    }

    client
        .post(
            &format!("/repos/{}/{}/projects/{}/columns", owner, repo, project_id),
            Some(Value::Object(body)),
        )
        .await
}

async fn edit_project_column(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;

    let mut body = Map::new();
    if let Some(v) = opt_str(args.title) {
        body.insert("title".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.color) {
        body.insert("color".to_string(), json!(v));
    }

    client
        .patch(
            &format!(
                "/repos/{}/{}/projects/{}/columns/{}",
                owner, repo, project_id, column_id
            ),
            Some(Value::Object(body)),
        )
        .await
}

async fn delete_project_column(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;

    client
        .delete(&format!(
            "/repos/{}/{}/projects/{}/columns/{}",
            owner, repo, project_id, column_id
        ))
        .await?;

    Ok(json!({ "status": "deleted" }))
}

async fn move_project_column(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;
    let sorting = args.sorting.unwrap_or(0);

    client
        .post(
            &format!(
                "/repos/{}/{}/projects/{}/columns/{}/move",
                owner, repo, project_id, column_id
            ),
            Some(json!({ "sorting": sorting })),
        )
        .await
}

async fn set_default_project_column(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;

    client
        .post(
            &format!(
                "/repos/{}/{}/projects/{}/columns/{}/default",
                owner, repo, project_id, column_id
            ),
            None,
        )
        .await
}

async fn list_column_items(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ColumnArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;

    client
        .get(
            &format!(
                "/repos/{}/{}/projects/{}/columns/{}/items",
                owner, repo, project_id, column_id
            ),
            &[],
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct ItemArgs {
    #[serde(flatten)]
    target: RepoArgs,
    project_id: Option<i64>,
    column_id: Option<i64>,
    item_id: Option<i64>,
    issue_id: Option<i64>,
    sorting: Option<i64>,
}

async fn assign_project_item(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ItemArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let (project_id, column_id) = require_project_and_column(args.project_id, args.column_id)?;
    let issue_id = require_id(args.issue_id, "issue_id")?;

    client
        .post(
            &format!(
                "/repos/{}/{}/projects/{}/columns/{}/items",
                owner, repo, project_id, column_id
            ),
            Some(json!({ "issue_id": issue_id })),
        )
        .await
}

async fn move_project_item(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ItemArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let project_id = require_id(args.project_id, "project_id")?;
    let item_id = require_id(args.item_id, "item_id")?;
    let column_id = require_id(args.column_id, "column_id")?;
    let sorting = args.sorting.unwrap_or(0);

    client
        .post(
            &format!(
                "/repos/{}/{}/projects/{}/items/{}/move",
                owner, repo, project_id, item_id
            ),
            Some(json!({ "column_id": column_id, "sorting": sorting })),
        )
        .await
}

async fn remove_project_item(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ItemArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let project_id = require_id(args.project_id, "project_id")?;
    let item_id = require_id(args.item_id, "item_id")?;

    client
        .delete(&format!(
            "/repos/{}/{}/projects/{}/items/{}",
            owner, repo, project_id, item_id
        ))
        .await?;

    Ok(json!({ "status": "deleted" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{args_map, MockApi};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_project_forwards_zero_template_type() {
        let mut api = MockApi::new();
        api.expect_post()
            .withf(|path, body| {
                path == "/repos/acme/widgets/projects"
                    && body == &Some(json!({"title": "Roadmap", "template_type": 0}))
            })
            .returning(|_, _| Ok(json!({"id": 1})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        create_project(
            client,
            args_map(json!({
                "owner": "acme",
                "repo": "widgets",
                "title": "Roadmap",
                "template_type": 0,
            })),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_edit_project_column_requires_both_ids() {
        let client: Arc<dyn ForgeApi> = Arc::new(MockApi::new());
        let err = edit_project_column(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "project_id and column_id are required");
    }

    #[tokio::test]
    async fn test_move_project_column_defaults_sorting() {
        let mut api = MockApi::new();
        api.expect_post()
            .withf(|path, body| {
                path == "/repos/acme/widgets/projects/1/columns/5/move"
                    && body == &Some(json!({"sorting": 0}))
            })
            .returning(|_, _| Ok(json!({"id": 5})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        move_project_column(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1, "column_id": 5})),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_set_default_project_column_posts_without_body() {
        let mut api = MockApi::new();
        api.expect_post()
            .withf(|path, body| {
                path == "/repos/acme/widgets/projects/1/columns/5/default" && body.is_none()
            })
            .returning(|_, _| Ok(json!({"id": 5, "default": true})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        set_default_project_column(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1, "column_id": 5})),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_assign_project_item_requires_issue_id() {
        let client: Arc<dyn ForgeApi> = Arc::new(MockApi::new());
        let err = assign_project_item(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1, "column_id": 5})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "issue_id is required");
    }

    #[tokio::test]
    async fn test_move_project_item_sends_column_and_sorting() {
        let mut api = MockApi::new();
        api.expect_post()
            .withf(|path, body| {
                path == "/repos/acme/widgets/projects/1/items/8/move"
                    && body == &Some(json!({"column_id": 5, "sorting": 2}))
            })
            .returning(|_, _| Ok(json!({"id": 8})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        move_project_item(
            client,
            args_map(json!({
                "owner": "acme",
                "repo": "widgets",
                "project_id": 1,
                "item_id": 8,
                "column_id": 5,
                "sorting": 2,
            })),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_move_project_item_requires_target_column() {
        let client: Arc<dyn ForgeApi> = Arc::new(MockApi::new());
        let err = move_project_item(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1, "item_id": 8})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "column_id is required");
    }

    #[tokio::test]
    async fn test_remove_project_item_deletes_membership() {
        let mut api = MockApi::new();
        api.expect_delete()
            .withf(|path| path == "/repos/acme/widgets/projects/1/items/8")
            .returning(|_| Ok(()));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        let value = remove_project_item(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "project_id": 1, "item_id": 8})),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"status": "deleted"}));
    }
}
