//! Milestone tools.

use std::sync::Arc;

use gitforge_core::{ForgeApi, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::protocol::{JsonSchema, Property, ToolDefinition};
use crate::registry::Registry;
use crate::tools::args::{self, opt_str, require_str, IdOrName, PageArgs, RepoArgs};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        ToolDefinition {
            name: "list_milestones".to_string(),
            description: "List milestones in a repository".to_string(),
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
        |client, arguments| Box::pin(list_milestones(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "get_milestone".to_string(),
            description: "Get a single milestone by ID or name".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::string("Milestone ID or name"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(get_milestone(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_milestone".to_string(),
            description: "Create a new milestone in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("title", Property::string("Milestone title"))
                .prop("description", Property::string("Milestone description"))
                .prop("due_on", Property::string("Due date (ISO 8601 format)"))
                .prop(
                    "state",
                    Property::string_enum("Milestone state", &["open", "closed"]),
                )
                .require(&["title"]),
        },
        |client, arguments| Box::pin(create_milestone(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_milestone".to_string(),
            description: "Edit an existing milestone".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::string("Milestone ID or name"))
                .prop("title", Property::string("New title"))
                .prop("description", Property::string("New description"))
                .prop("due_on", Property::string("New due date (ISO 8601 format)"))
                .prop(
                    "state",
                    Property::string_enum("New state", &["open", "closed"]),
                )
                .require(&["id"]),
        },
        |client, arguments| Box::pin(edit_milestone(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "delete_milestone".to_string(),
            description: "Delete a milestone from a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::string("Milestone ID or name"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(delete_milestone(client, arguments)),
    );
}

#[derive(Debug, Default, Deserialize)]
struct ListMilestonesArgs {
    #[serde(flatten)]
    target: RepoArgs,
    state: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

async fn list_milestones(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ListMilestonesArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;

    let mut query = Vec::new();
    if let Some(state) = opt_str(args.state) {
        query.push(("state".to_string(), state));
    }
    args.page.append_to(&mut query);

    client
        .get(&format!("/repos/{}/{}/milestones", owner, repo), &query)
        .await
}

#[derive(Debug, Default, Deserialize)]
struct MilestoneIdArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<IdOrName>,
}

async fn get_milestone(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: MilestoneIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = IdOrName::require(args.id, "id")?;

    client
        .get(&format!("/repos/{}/{}/milestones/{}", owner, repo, id), &[])
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CreateMilestoneArgs {
    #[serde(flatten)]
    target: RepoArgs,
    title: Option<String>,
    description: Option<String>,
    due_on: Option<String>,
    state: Option<String>,
}

async fn create_milestone(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: CreateMilestoneArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let title = require_str(args.title, "title")?;

    let mut body = Map::new();
    body.insert("title".to_string(), json!(title));
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.due_on) {
        body.insert("due_on".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.state) {
        body.insert("state".to_string(), json!(v));
    }

    client
        .post(
            &format!("/repos/{}/{}/milestones", owner, repo),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct EditMilestoneArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<IdOrName>,
    title: Option<String>,
    description: Option<String>,
    due_on: Option<String>,
    state: Option<String>,
}

async fn edit_milestone(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: EditMilestoneArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = IdOrName::require(args.id, "id")?;

    let mut body = Map::new();
    if let Some(v) = opt_str(args.title) {
        body.insert("title".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.description) {
        body.insert("description".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.due_on) {
        body.insert("due_on".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.state) {
        body.insert("state".to_string(), json!(v));
    }

    client
        .patch(
            &format!("/repos/{}/{}/milestones/{}", owner, repo, id),
            Some(Value::Object(body)),
        )
        .await
}

async fn delete_milestone(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: MilestoneIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = IdOrName::require(args.id, "id")?;

    client
        .delete(&format!("/repos/{}/{}/milestones/{}", owner, repo, id))
        .await?;

    Ok(json!({ "status": "deleted" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{args_map, MockApi};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_milestones_forwards_state() {
        let mut api = MockApi::new();
        api.expect_get()
            .withf(|path, query| {
                path == "/repos/acme/widgets/milestones"
                    && query == [("state".to_string(), "closed".to_string())]
            })
            .returning(|_, _| Ok(json!([])));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        list_milestones(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "state": "closed"})),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_milestone_by_name() {
        let mut api = MockApi::new();
        api.expect_get()
            .withf(|path, _| path == "/repos/acme/widgets/milestones/v2.0")
            .returning(|_, _| Ok(json!({"id": 9})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        get_milestone(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "id": "v2.0"})),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_milestone_requires_title() {
        let client: Arc<dyn ForgeApi> = Arc::new(MockApi::new());
        let err = create_milestone(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[tokio::test]
    async fn test_edit_milestone_by_numeric_id() {
        let mut api = MockApi::new();
        api.expect_patch()
            .withf(|path, body| {
                path == "/repos/acme/widgets/milestones/9"
                    && body == &Some(json!({"state": "closed"}))
            })
            .returning(|_, _| Ok(json!({"id": 9})));

        let client: Arc<dyn ForgeApi> = Arc::new(api);
        edit_milestone(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets", "id": 9, "state": "closed"})),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_delete_milestone_requires_id() {
        let client: Arc<dyn ForgeApi> = Arc::new(MockApi::new());
        let err = delete_milestone(
            client,
            args_map(json!({"owner": "acme", "repo": "widgets"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "id is required");
    }
}
