//! In-memory repositories for tests
//!
//! Neither store is transactional: `MemoryBuildRepository` writes the build
//! before the snapshot and can be told to fail snapshot writes, which leaves
//! a dangling pending build exactly like a non-transactional database would.

use async_trait::async_trait;
use conveyor_core::domain::build::{Build, BuildSnapshot, BuildStatus};
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::PageRequest;
use conveyor_core::dto::pipeline::CreatePipeline;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{
    BuildRepository, PipelineFilter, PipelineRepository, RecordError, RepositoryError,
    ScheduleRepository,
};

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

#[derive(Default)]
pub struct MemoryPipelineRepository {
    pipelines: Mutex<Vec<Pipeline>>,
    unavailable: AtomicBool,
}

impl MemoryPipelineRepository {
    /// Make every following call fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("pipeline store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PipelineRepository for MemoryPipelineRepository {
    async fn create(&self, req: &CreatePipeline) -> Result<Pipeline, RepositoryError> {
        self.check()?;
        let mut pipelines = self.pipelines.lock().unwrap();
        if pipelines
            .iter()
            .any(|p| p.project_id == req.project_id && p.name == req.name)
        {
            return Err(RepositoryError::Conflict("uq_pipelines_project_name".into()));
        }

        let now = chrono::Utc::now();
        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            project_id: req.project_id,
            name: req.name.clone(),
            description: req.description.clone(),
            workflow: req.workflow.clone(),
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };
        pipelines.push(pipeline.clone());
        Ok(pipeline)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pipeline>, RepositoryError> {
        self.check()?;
        let pipelines = self.pipelines.lock().unwrap();
        Ok(pipelines.iter().find(|p| p.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &PipelineFilter,
        page: PageRequest,
    ) -> Result<(Vec<Pipeline>, u64), RepositoryError> {
        self.check()?;
        let needle = filter.name.as_ref().map(|n| n.to_lowercase());
        let pipelines = self.pipelines.lock().unwrap();

        // Insertion order is creation order; newest first
        let matching: Vec<Pipeline> = pipelines
            .iter()
            .rev()
            .filter(|p| filter.project_id.is_none_or(|id| p.project_id == id))
            .filter(|p| {
                needle
                    .as_ref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n.as_str()))
            })
            .cloned()
            .collect();

        Ok((paginate(&matching, page), matching.len() as u64))
    }

    async fn update(&self, pipeline: &Pipeline) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut pipelines = self.pipelines.lock().unwrap();
        if pipelines.iter().any(|p| {
            p.id != pipeline.id && p.project_id == pipeline.project_id && p.name == pipeline.name
        }) {
            return Err(RepositoryError::Conflict("uq_pipelines_project_name".into()));
        }
        match pipelines.iter_mut().find(|p| p.id == pipeline.id) {
            Some(existing) => {
                *existing = pipeline.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut pipelines = self.pipelines.lock().unwrap();
        let before = pipelines.len();
        pipelines.retain(|p| p.id != id);
        Ok(pipelines.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryBuildRepository {
    builds: Mutex<Vec<Build>>,
    snapshots: Mutex<Vec<BuildSnapshot>>,
    fail_builds: AtomicBool,
    fail_snapshots: AtomicBool,
}

impl MemoryBuildRepository {
    pub fn fail_build_writes(&self, fail: bool) {
        self.fail_builds.store(fail, Ordering::SeqCst);
    }

    pub fn fail_snapshot_writes(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    pub fn builds(&self) -> Vec<Build> {
        self.builds.lock().unwrap().clone()
    }

    pub fn snapshots(&self) -> Vec<BuildSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    /// Rewrite a stored snapshot's text without touching its digest
    pub fn overwrite_snapshot_workflow(&self, build_id: Uuid, workflow: &str) {
        let mut snapshots = self.snapshots.lock().unwrap();
        if let Some(snapshot) = snapshots.iter_mut().find(|s| s.build_id == build_id) {
            snapshot.workflow = workflow.to_string();
        }
    }
}

#[async_trait]
impl BuildRepository for MemoryBuildRepository {
    async fn record(&self, build: &Build, snapshot: &BuildSnapshot) -> Result<(), RecordError> {
        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(RecordError::Build(RepositoryError::Unavailable(
                "build store offline".into(),
            )));
        }
        self.builds.lock().unwrap().push(build.clone());

        if self.fail_snapshots.load(Ordering::SeqCst) {
            return Err(RecordError::Snapshot {
                build_id: build.id,
                build_committed: true,
                source: RepositoryError::Unavailable("snapshot store offline".into()),
            });
        }
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.iter().any(|s| s.build_id == snapshot.build_id) {
            return Err(RecordError::Snapshot {
                build_id: build.id,
                build_committed: true,
                source: RepositoryError::Conflict("uq_build_snapshots_build_id".into()),
            });
        }
        snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, RepositoryError> {
        Ok(self.builds.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn find_snapshot(&self, build_id: Uuid) -> Result<Option<BuildSnapshot>, RepositoryError> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.build_id == build_id)
            .cloned())
    }

    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Build>, u64), RepositoryError> {
        let builds = self.builds.lock().unwrap();
        let matching: Vec<Build> = builds
            .iter()
            .rev()
            .filter(|b| b.pipeline_id == pipeline_id)
            .cloned()
            .collect();
        Ok((paginate(&matching, page), matching.len() as u64))
    }

    async fn list_unsnapshotted(&self, limit: i64) -> Result<Vec<Build>, RepositoryError> {
        let builds = self.builds.lock().unwrap();
        let snapshots = self.snapshots.lock().unwrap();
        Ok(builds
            .iter()
            .filter(|b| b.status == BuildStatus::Pending)
            .filter(|b| !snapshots.iter().any(|s| s.build_id == b.id))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryScheduleRepository {
    schedules: Mutex<Vec<PipelineSchedule>>,
}

#[async_trait]
impl ScheduleRepository for MemoryScheduleRepository {
    async fn create(&self, schedule: &PipelineSchedule) -> Result<(), RepositoryError> {
        self.schedules.lock().unwrap().push(schedule.clone());
        Ok(())
    }

    async fn find(
        &self,
        pipeline_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<Option<PipelineSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.pipeline_id == pipeline_id && s.id == schedule_id)
            .cloned())
    }

    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<PipelineSchedule>, u64), RepositoryError> {
        let schedules = self.schedules.lock().unwrap();
        let matching: Vec<PipelineSchedule> = schedules
            .iter()
            .rev()
            .filter(|s| s.pipeline_id == pipeline_id)
            .cloned()
            .collect();
        Ok((paginate(&matching, page), matching.len() as u64))
    }

    async fn update(&self, schedule: &PipelineSchedule) -> Result<bool, RepositoryError> {
        let mut schedules = self.schedules.lock().unwrap();
        match schedules
            .iter_mut()
            .find(|s| s.pipeline_id == schedule.pipeline_id && s.id == schedule.id)
        {
            Some(existing) => {
                existing.cron = schedule.cron.clone();
                existing.timezone = schedule.timezone.clone();
                existing.enabled = schedule.enabled;
                existing.updated_at = schedule.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, pipeline_id: Uuid, schedule_id: Uuid) -> Result<bool, RepositoryError> {
        let mut schedules = self.schedules.lock().unwrap();
        let before = schedules.len();
        schedules.retain(|s| !(s.pipeline_id == pipeline_id && s.id == schedule_id));
        Ok(schedules.len() < before)
    }
}
