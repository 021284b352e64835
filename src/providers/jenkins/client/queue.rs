use crate::error::Result;

use super::super::types::{QueueCancelled, QueueItem, RawQueue};
use super::JenkinsClient;

impl JenkinsClient {
    /// Items waiting for an executor.
    pub async fn get_queue(&self) -> Result<Vec<QueueItem>> {
        let url = self.endpoint(["queue", "api", "json"], None);
        let data: RawQueue = self.get_json(url).await?;
        Ok(data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(QueueItem::from)
            .collect())
    }

    /// Cancels a queue item.
    ///
    /// There is no existence check. Jenkins answers 404 for items that already
    /// left the queue (and, on some versions, after a successful cancel), so a
    /// 404 is treated as done.
    pub async fn cancel_queue(&self, queue_id: u64) -> Result<QueueCancelled> {
        let query = format!("id={queue_id}");
        let url = self.endpoint(["queue", "cancelItem"], Some(query.as_str()));
        self.mutate(url, None, None).await?;

        Ok(QueueCancelled {
            queue_id,
            cancelled: true,
        })
    }
}
