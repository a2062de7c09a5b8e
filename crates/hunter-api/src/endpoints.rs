// Endpoint helpers for the resources this layer synchronizes.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::RequestError;
use crate::models::TimeRangeResponse;

impl ApiClient {
    /// Date interval for which word-graph data can be queried.
    ///
    /// `GET /word-graph/time-range`
    pub async fn word_graph_time_range(&self) -> Result<TimeRangeResponse, RequestError> {
        self.get("/word-graph/time-range").await
    }

    /// Paged task listing.
    ///
    /// `GET /task/list?page=..&pageSize=..&status=..`
    pub async fn list_tasks(&self, query: &[(&str, &str)]) -> Result<Value, RequestError> {
        self.get_with_query("/task/list", query).await
    }

    /// A single task with its current progress.
    ///
    /// `GET /task/{task_id}`
    pub async fn task_detail(&self, task_id: &str) -> Result<Value, RequestError> {
        self.get(&format!("/task/{task_id}")).await
    }
}
