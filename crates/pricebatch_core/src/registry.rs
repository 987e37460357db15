use batch_logging::batch_debug;

use crate::{BatchResult, Job, JobId, JobStatus, PredictionOutcome, Progress, TransitionError};

/// One record per accepted URL, addressed by [`JobId`] and kept in submission order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobRegistry {
    jobs: Vec<Job>,
}

impl JobRegistry {
    pub fn new(jobs: &[(JobId, String)]) -> Self {
        let jobs = jobs
            .iter()
            .map(|(id, url)| Job::new(*id, url.clone()))
            .collect();
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id() == job_id)
    }

    fn get_mut(&mut self, job_id: JobId) -> Result<&mut Job, TransitionError> {
        self.jobs
            .iter_mut()
            .find(|job| job.id() == job_id)
            .ok_or(TransitionError::UnknownJob { job_id })
    }

    pub fn claim(&mut self, job_id: JobId) -> Result<(), TransitionError> {
        self.get_mut(job_id)?.claim()?;
        batch_debug!("job {} processing", job_id);
        Ok(())
    }

    pub fn succeed(
        &mut self,
        job_id: JobId,
        outcome: PredictionOutcome,
    ) -> Result<(), TransitionError> {
        self.get_mut(job_id)?.succeed(outcome)?;
        batch_debug!("job {} succeeded", job_id);
        Ok(())
    }

    pub fn fail(&mut self, job_id: JobId, message: impl Into<String>) -> Result<(), TransitionError> {
        self.get_mut(job_id)?.fail(message)?;
        batch_debug!("job {} failed", job_id);
        Ok(())
    }

    /// True when every job is terminal. An empty registry is never drained.
    pub fn is_drained(&self) -> bool {
        !self.jobs.is_empty() && self.jobs.iter().all(|job| job.status().is_terminal())
    }

    pub fn progress(&self) -> Progress {
        let mut progress = Progress {
            total: self.jobs.len(),
            ..Progress::default()
        };
        for job in &self.jobs {
            match job.status() {
                JobStatus::Pending => {}
                JobStatus::Processing => progress.processing += 1,
                JobStatus::Succeeded(_) => progress.succeeded += 1,
                JobStatus::Failed(_) => progress.failed += 1,
            }
        }
        progress
    }

    /// Successful outcomes in submission order.
    pub fn collect_results(&self) -> Vec<BatchResult> {
        self.jobs
            .iter()
            .filter_map(|job| {
                job.outcome().map(|outcome| BatchResult {
                    url: job.url().to_owned(),
                    result: outcome.clone(),
                })
            })
            .collect()
    }

    /// `(url, message)` for every failed job, in submission order.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.jobs
            .iter()
            .filter_map(|job| job.error().map(|err| (job.url().to_owned(), err.to_owned())))
            .collect()
    }
}
