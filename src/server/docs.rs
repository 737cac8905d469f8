use axum::response::{Html, Response};
use axum::Json;
use serde_json::{json, Value};

use super::responses::cacheable;

const DOCS_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>runboard API</title>
  </head>
  <body>
    <h1>runboard API</h1>
    <p>Workflow run status for tracked GitHub repositories.</p>
    <p>The OpenAPI document is served at <a href="/openapi">/openapi</a>.</p>
  </body>
</html>
"#;

/// `GET /docs`
pub async fn docs() -> Response {
    cacheable(Html(DOCS_PAGE))
}

/// `GET /openapi`
pub async fn openapi() -> Response {
    cacheable(Json(openapi_document()))
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    })
}

fn owner_name_parameters() -> Value {
    json!([
        { "name": "owner", "in": "path", "required": true, "schema": { "type": "string" } },
        { "name": "name", "in": "path", "required": true, "schema": { "type": "string" } }
    ])
}

pub fn openapi_document() -> Value {
    let date_param = json!({
        "name": "date",
        "in": "query",
        "required": false,
        "description": "UTC calendar day (YYYY-MM-DD), defaults to today",
        "schema": { "type": "string", "format": "date" }
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "runboard",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "GitHub Actions workflow run status for tracked repositories"
        },
        "paths": {
            "/repo": {
                "get": {
                    "summary": "List tracked repositories",
                    "responses": {
                        "200": {
                            "description": "Tracked repositories in registration order",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "repositories": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Repository" }
                                } }
                            } } }
                        }
                    }
                },
                "post": {
                    "summary": "Track a repository",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewRepository" } } }
                    },
                    "responses": {
                        "201": { "description": "Repository registered" },
                        "400": error_response("Malformed slug"),
                        "409": error_response("Repository already tracked")
                    }
                }
            },
            "/repo/{owner}/{name}": {
                "delete": {
                    "summary": "Stop tracking a repository",
                    "parameters": owner_name_parameters(),
                    "responses": {
                        "200": { "description": "Repository removed" },
                        "404": error_response("Repository not tracked")
                    }
                }
            },
            "/repo/metrics": {
                "get": {
                    "summary": "Run summary for every tracked repository",
                    "parameters": [date_param.clone()],
                    "responses": {
                        "200": {
                            "description": "One entry per tracked repository, failures zeroed",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "repositories": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/RepositoryOverview" }
                                } }
                            } } }
                        },
                        "400": error_response("Invalid date")
                    }
                }
            },
            "/repo/workflow-runs": {
                "get": {
                    "summary": "Workflow runs created in a repository on one day",
                    "parameters": [
                        { "name": "repoPath", "in": "query", "required": true, "schema": { "type": "string" }, "example": "octo/app" },
                        date_param
                    ],
                    "responses": {
                        "200": {
                            "description": "Normalized workflow runs",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "workflow_runs": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/WorkflowRun" }
                                } }
                            } } }
                        },
                        "400": error_response("Missing or malformed parameters"),
                        "403": error_response("GitHub refused access"),
                        "500": error_response("GitHub or configuration failure")
                    }
                }
            },
            "/workflow/{owner}/{name}/exists": {
                "get": {
                    "summary": "Whether a repository defines any workflows",
                    "parameters": owner_name_parameters(),
                    "responses": {
                        "200": {
                            "description": "Workflow presence",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "hasWorkflows": { "type": "boolean" },
                                    "workflowCount": { "type": "integer" },
                                    "message": { "type": "string" }
                                }
                            } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Error": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                },
                "Repository": {
                    "type": "object",
                    "properties": {
                        "slug": { "type": "string" },
                        "displayName": { "type": "string" },
                        "hasConfig": { "type": "boolean" },
                        "avatarUrl": { "type": "string", "nullable": true },
                        "htmlUrl": { "type": "string", "nullable": true }
                    }
                },
                "NewRepository": {
                    "type": "object",
                    "required": ["slug"],
                    "properties": {
                        "slug": { "type": "string", "example": "octo/app" },
                        "displayName": { "type": "string" },
                        "hasConfig": { "type": "boolean" },
                        "avatarUrl": { "type": "string" },
                        "htmlUrl": { "type": "string" }
                    }
                },
                "OverviewSummary": {
                    "type": "object",
                    "properties": {
                        "totalWorkflows": { "type": "integer" },
                        "passedRuns": { "type": "integer" },
                        "failedRuns": { "type": "integer" },
                        "inProgressRuns": { "type": "integer" },
                        "otherRuns": { "type": "integer" },
                        "completedRuns": { "type": "integer" },
                        "successRate": { "type": "integer", "minimum": 0, "maximum": 100 }
                    }
                },
                "RepositoryOverview": {
                    "type": "object",
                    "properties": {
                        "slug": { "type": "string" },
                        "displayName": { "type": "string" },
                        "hasConfig": { "type": "boolean" },
                        "hasWorkflows": { "type": "boolean" },
                        "metrics": { "$ref": "#/components/schemas/OverviewSummary" }
                    }
                },
                "WorkflowRun": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "name": { "type": "string", "nullable": true },
                        "workflowId": { "type": "integer", "nullable": true },
                        "path": { "type": "string", "nullable": true },
                        "conclusion": {
                            "type": "string",
                            "nullable": true,
                            "enum": ["success", "failure", "cancelled", "skipped", "timed_out",
                                     "action_required", "neutral", "stale", "startup_failure", "unknown"]
                        },
                        "status": {
                            "type": "string",
                            "nullable": true,
                            "enum": ["queued", "in_progress", "completed", "waiting", "requested",
                                     "pending", "unknown"]
                        },
                        "htmlUrl": { "type": "string", "nullable": true },
                        "startedAt": { "type": "string", "format": "date-time", "nullable": true },
                        "updatedAt": { "type": "string", "format": "date-time", "nullable": true }
                    }
                }
            }
        }
    })
}
