use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A submitted query waiting for, or being served by, its event stream
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub query: String,
    pub conversation_id: String,
    pub document_ids: Vec<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// In-memory job table shared by the chat and stream handlers
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_job(
        &self,
        query: impl Into<String>,
        conversation_id: impl Into<String>,
        document_ids: Vec<String>,
    ) -> Job {
        let job = Job {
            job_id: Uuid::new_v4().to_string(),
            query: query.into(),
            conversation_id: conversation_id.into(),
            document_ids,
            status: JobStatus::Pending,
            created_at: Utc::now(),
        };

        self.jobs.write().await.insert(job.job_id.clone(), job.clone());
        job
    }

    pub async fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn update_status(&self, job_id: &str, status: JobStatus) -> bool {
        match self.jobs.write().await.get_mut(job_id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    /// Move a pending job to running. A job is streamed at most once.
    pub async fn claim(&self, job_id: &str) -> ApiResult<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| ApiError::JobNotFound(job_id.to_string()))?;

        if job.status != JobStatus::Pending {
            return Err(ApiError::JobAlreadyStarted(job_id.to_string()));
        }

        job.status = JobStatus::Running;
        Ok(job.clone())
    }

    /// Drop jobs created more than `max_age` ago, returning how many went
    pub async fn cleanup_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at > cutoff);
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_lifecycle() {
        let registry = JobRegistry::new();
        let job = registry.create_job("What is X?", "conv-1", Vec::new()).await;

        assert_eq!(job.status, JobStatus::Pending);
        assert!(Uuid::parse_str(&job.job_id).is_ok());

        let claimed = registry.claim(&job.job_id).await.unwrap();
        assert_eq!(claimed.status, JobStatus::Running);
        assert!(matches!(
            registry.claim(&job.job_id).await,
            Err(ApiError::JobAlreadyStarted(_))
        ));

        assert!(registry.update_status(&job.job_id, JobStatus::Completed).await);
        assert_eq!(registry.get_job(&job.job_id).await.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let registry = JobRegistry::new();

        assert!(registry.get_job("missing").await.is_none());
        assert!(!registry.update_status("missing", JobStatus::Failed).await);
        assert!(matches!(registry.claim("missing").await, Err(ApiError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_cleanup_older_than() {
        let registry = JobRegistry::new();
        let old = registry.create_job("old", "c", Vec::new()).await;
        registry.create_job("new", "c", Vec::new()).await;

        registry.jobs.write().await.get_mut(&old.job_id).unwrap().created_at = Utc::now() - Duration::hours(2);

        assert_eq!(registry.cleanup_older_than(Duration::hours(1)).await, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get_job(&old.job_id).await.is_none());
    }
}
