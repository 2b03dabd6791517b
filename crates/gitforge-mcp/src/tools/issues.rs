//! Issue and issue comment tools.

use std::sync::Arc;

use gitforge_core::{ForgeApi, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::protocol::{JsonSchema, Property, ToolDefinition};
use crate::registry::Registry;
use crate::tools::args::{self, opt_str, require_id, require_str, PageArgs, RepoArgs};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        ToolDefinition {
            name: "list_issues".to_string(),
            description: "List and search issues in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop(
                    "state",
                    Property::string_enum("Filter by state", &["open", "closed", "all"]),
                )
                .prop(
                    "labels",
                    Property::string("Comma-separated list of label names"),
                )
                .prop("q", Property::string("Search query"))
                .prop("milestone", Property::string("Milestone name or ID"))
                .prop("page", Property::integer("Page number"))
                .prop("limit", Property::integer("Page size")),
        },
        |client, arguments| Box::pin(list_issues(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "get_issue".to_string(),
            description: "Get a single issue by its index number".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("index", Property::integer("Issue index number"))
                .require(&["index"]),
        },
        |client, arguments| Box::pin(get_issue(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_issue".to_string(),
            description: "Create a new issue in a repository".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("title", Property::string("Issue title"))
                .prop("body", Property::string("Issue body/description"))
                .prop("assignees", Property::array("List of assignee usernames"))
                .prop("labels", Property::array("List of label IDs"))
                .prop("milestone", Property::integer("Milestone ID"))
                .prop("due_date", Property::string("Due date (ISO 8601 format)"))
                .require(&["title"]),
        },
        |client, arguments| Box::pin(create_issue(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_issue".to_string(),
            description: "Edit an existing issue".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("index", Property::integer("Issue index number"))
                .prop("title", Property::string("New title"))
                .prop("body", Property::string("New body/description"))
                .prop(
                    "state",
                    Property::string_enum("New state", &["open", "closed"]),
                )
                .prop("assignees", Property::array("List of assignee usernames"))
                .prop("milestone", Property::integer("Milestone ID (0 to clear)"))
                .prop("due_date", Property::string("Due date (ISO 8601 format)"))
                .require(&["index"]),
        },
        |client, arguments| Box::pin(edit_issue(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "list_issue_comments".to_string(),
            description: "List comments on an issue".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("index", Property::integer("Issue index number"))
                .prop(
                    "since",
                    Property::string(
                        "Only show comments updated after this date (ISO 8601 format)",
                    ),
                )
                .prop(
                    "before",
                    Property::string(
                        "Only show comments updated before this date (ISO 8601 format)",
                    ),
                )
                .require(&["index"]),
        },
        |client, arguments| Box::pin(list_issue_comments(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "create_issue_comment".to_string(),
            description: "Add a comment to an issue".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("index", Property::integer("Issue index number"))
                .prop("body", Property::string("Comment body"))
                .require(&["index", "body"]),
        },
        |client, arguments| Box::pin(create_issue_comment(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "edit_issue_comment".to_string(),
            description: "Edit an existing comment on an issue".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Comment ID"))
                .prop("body", Property::string("New comment body"))
                .require(&["id", "body"]),
        },
        |client, arguments| Box::pin(edit_issue_comment(client, arguments)),
    );

    registry.register(
        ToolDefinition {
            name: "delete_issue_comment".to_string(),
            description: "Delete a comment on an issue".to_string(),
            input_schema: JsonSchema::object()
                .prop("owner", Property::string("Repository owner"))
                .prop("repo", Property::string("Repository name"))
                .prop("id", Property::integer("Comment ID"))
                .require(&["id"]),
        },
        |client, arguments| Box::pin(delete_issue_comment(client, arguments)),
    );
}

#[derive(Debug, Default, Deserialize)]
struct ListIssuesArgs {
    #[serde(flatten)]
    target: RepoArgs,
    state: Option<String>,
    labels: Option<String>,
    q: Option<String>,
    milestone: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

async fn list_issues(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: ListIssuesArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;

    let mut query = Vec::new();
    if let Some(state) = opt_str(args.state) {
        query.push(("state".to_string(), state));
    }
    if let Some(labels) = opt_str(args.labels) {
        query.push(("labels".to_string(), labels));
    }
    if let Some(q) = opt_str(args.q) {
        query.push(("q".to_string(), q));
    }
    if let Some(milestone) = opt_str(args.milestone) {
        query.push(("milestones".to_string(), milestone));
    }
    args.page.append_to(&mut query);
    query.push(("type".to_string(), "issues".to_string()));

    client
        .get(&format!("/repos/{}/{}/issues", owner, repo), &query)
        .await
}

#[derive(Debug, Default, Deserialize)]
struct GetIssueArgs {
    #[serde(flatten)]
    target: RepoArgs,
    index: Option<i64>,
}

async fn get_issue(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: GetIssueArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let index = require_id(args.index, "index")?;

    client
        .get(&format!("/repos/{}/{}/issues/{}", owner, repo, index), &[])
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CreateIssueArgs {
    #[serde(flatten)]
    target: RepoArgs,
    title: Option<String>,
    body: Option<String>,
    assignees: Option<Vec<String>>,
    labels: Option<Vec<i64>>,
    milestone: Option<i64>,
    due_date: Option<String>,
}

async fn create_issue(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: CreateIssueArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let title = require_str(args.title, "title")?;

    let mut body = Map::new();
    body.insert("title".to_string(), json!(title));
    if let Some(v) = opt_str(args.body) {
        body.insert("body".to_string(), json!(v));
    }
    if let Some(v) = args.assignees.filter(|v| !v.is_empty()) {
        body.insert("assignees".to_string(), json!(v));
    }
    if let Some(v) = args.labels.filter(|v| !v.is_empty()) {
        body.insert("labels".to_string(), json!(v));
    }
    if let Some(v) = args::positive(args.milestone) {
        body.insert("milestone".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.due_date) {
        body.insert("due_date".to_string(), json!(v));
    }

    client
        .post(
            &format!("/repos/{}/{}/issues", owner, repo),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct EditIssueArgs {
    #[serde(flatten)]
    target: RepoArgs,
    index: Option<i64>,
    title: Option<String>,
    body: Option<String>,
    state: Option<String>,
    assignees: Option<Vec<String>>,
    milestone: Option<i64>,
    due_date: Option<String>,
}

async fn edit_issue(client: Arc<dyn ForgeApi>, arguments: Map<String, Value>) -> Result<Value> {
    let args: EditIssueArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let index = require_id(args.index, "index")?;

    let mut body = Map::new();
    if let Some(v) = opt_str(args.title) {
        body.insert("title".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.body) {
        body.insert("body".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.state) {
        body.insert("state".to_string(), json!(v));
    }
    if let Some(v) = args.assignees {
        body.insert("assignees".to_string(), json!(v));
    }
    // Presence-aware: 0 clears the milestone.
    if let Some(v) = args.milestone {
        body.insert("milestone".to_string(), json!(v));
    }
    if let Some(v) = opt_str(args.due_date) {
        body.insert("due_date".to_string(), json!(v));
    }

    client
        .patch(
            &format!("/repos/{}/{}/issues/{}", owner, repo, index),
            Some(Value::Object(body)),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct ListIssueCommentsArgs {
    #[serde(flatten)]
    target: RepoArgs,
    index: Option<i64>,
    since: Option<String>,
    before: Option<String>,
}

async fn list_issue_comments(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: ListIssueCommentsArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let index = require_id(args.index, "index")?;

    let mut query = Vec::new();
    if let Some(since) = opt_str(args.since) {
        query.push(("since".to_string(), since));
    }
    if let Some(before) = opt_str(args.before) {
        query.push(("before".to_string(), before));
    }

    client
        .get(
            &format!("/repos/{}/{}/issues/{}/comments", owner, repo, index),
            &query,
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CreateIssueCommentArgs {
    #[serde(flatten)]
    target: RepoArgs,
    index: Option<i64>,
    body: Option<String>,
}

async fn create_issue_comment(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: CreateIssueCommentArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let index = require_id(args.index, "index")?;
    let body = require_str(args.body, "body")?;

    client
        .post(
            &format!("/repos/{}/{}/issues/{}/comments", owner, repo, index),
            Some(json!({ "body": body })),
        )
        .await
}

#[derive(Debug, Default, Deserialize)]
struct CommentIdArgs {
    #[serde(flatten)]
    target: RepoArgs,
    id: Option<i64>,
    body: Option<String>,
}

async fn edit_issue_comment(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: CommentIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;
    let body = require_str(args.body, "body")?;

    client
        .patch(
            &format!("/repos/{}/{}/issues/comments/{}", owner, repo, id),
            Some(json!({ "body": body })),
        )
        .await
}

async fn delete_issue_comment(
    client: Arc<dyn ForgeApi>,
    arguments: Map<String, Value>,
) -> Result<Value> {
    let args: CommentIdArgs = args::parse(arguments)?;
    let (owner, repo) = args.target.resolve()?;
    let id = require_id(args.id, "id")?;

    client
        .delete(&format!("/repos/{}/{}/issues/comments/{}", owner, repo, id))
        .await?;
    Ok(Value::Null)
}
