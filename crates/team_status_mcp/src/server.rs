//! MCP server exposing the Jira and weekly status tools over stdio.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use tracing::info;

use crate::tools::{
    AddCommentParams, CreateIssueParams, GenerateWeeklyStatusParams, GetCommentsParams,
    GetIssueParams, GetMyIssuesParams, GetProjectIssuesParams, ProjectParams, SearchIssuesParams,
    ToolDispatcher, ToolRequest, TransitionIssueParams, UpdateIssueParams,
};

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// MCP server for Jira issues and weekly team status reports.
#[derive(Clone)]
pub struct TeamStatusServer {
    dispatcher: Arc<ToolDispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TeamStatusServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router: Self::tool_router(),
        }
    }

    async fn call(&self, request: ToolRequest) -> Result<CallToolResult, McpError> {
        let text = self.dispatcher.dispatch(request).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get detailed information about a specific Jira issue")]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetIssue(params)).await
    }

    #[tool(description = "Search for Jira issues using JQL (Jira Query Language)")]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::SearchIssues(params)).await
    }

    #[tool(description = "Create a new Jira issue")]
    async fn create_issue(
        &self,
        Parameters(params): Parameters<CreateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::CreateIssue(params)).await
    }

    #[tool(description = "Update an existing Jira issue")]
    async fn update_issue(
        &self,
        Parameters(params): Parameters<UpdateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::UpdateIssue(params)).await
    }

    #[tool(description = "Add a comment to a Jira issue")]
    async fn add_comment(
        &self,
        Parameters(params): Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::AddComment(params)).await
    }

    #[tool(description = "Get all comments for a Jira issue")]
    async fn get_comments(
        &self,
        Parameters(params): Parameters<GetCommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetComments(params)).await
    }

    #[tool(description = "Move an issue through workflow states")]
    async fn transition_issue(
        &self,
        Parameters(params): Parameters<TransitionIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::TransitionIssue(params)).await
    }

    #[tool(description = "Get information about a Jira project")]
    async fn get_project(
        &self,
        Parameters(params): Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetProject(params)).await
    }

    #[tool(description = "Get available issue types for a project")]
    async fn get_issue_types(
        &self,
        Parameters(params): Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetIssueTypes(params)).await
    }

    #[tool(description = "Get issues assigned to the current user")]
    async fn get_my_issues(
        &self,
        Parameters(params): Parameters<GetMyIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetMyIssues(params)).await
    }

    #[tool(description = "Get all issues for a specific project")]
    async fn get_project_issues(
        &self,
        Parameters(params): Parameters<GetProjectIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GetProjectIssues(params)).await
    }

    #[tool(
        description = "Generate weekly team status report combining Jira and GitHub data. Checks for existing reports to avoid duplicate API calls. Optionally generates AI-powered executive summary."
    )]
    async fn generate_weekly_status(
        &self,
        Parameters(params): Parameters<GenerateWeeklyStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::GenerateWeeklyStatus(params)).await
    }
}

#[tool_handler]
impl ServerHandler for TeamStatusServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Jira issue tools and weekly team status reports combining Jira and GitHub activity"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serves `server` on stdin/stdout until the client disconnects.
pub async fn serve(server: TeamStatusServer) -> anyhow::Result<()> {
    info!("Starting team status MCP server on stdio");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    info!("Team status MCP server stopped");
    Ok(())
}
