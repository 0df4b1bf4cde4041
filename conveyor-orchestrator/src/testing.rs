//! Test doubles and a service harness wired against in-memory stores

use async_trait::async_trait;
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::domain::project::{Project, ProjectId, ProjectMember, ProjectRole, UserId};
use conveyor_core::dto::build::BuildJob;
use conveyor_core::dto::pipeline::CreatePipeline;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::{AccessGate, Actor, DirectoryAccessGate};
use crate::directory::{DirectoryError, ProjectDirectory};
use crate::queue::{BuildQueue, QueueError};
use crate::repository::memory::{
    MemoryBuildRepository, MemoryPipelineRepository, MemoryScheduleRepository,
};
use crate::service::{BuildService, PipelineService, ScheduleService};

pub const PROJECT: ProjectId = 7;
pub const OTHER_PROJECT: ProjectId = 8;
pub const OWNER: UserId = 1;
pub const ADMIN: UserId = 2;
pub const MEMBER: UserId = 3;
pub const OUTSIDER: UserId = 4;
pub const ROOT: UserId = 99;

pub fn owner() -> Actor {
    Actor::new(OWNER, "olivia")
}

pub fn admin() -> Actor {
    Actor::new(ADMIN, "adam")
}

pub fn member() -> Actor {
    Actor::new(MEMBER, "mia")
}

pub fn outsider() -> Actor {
    Actor::new(OUTSIDER, "oscar")
}

pub fn root() -> Actor {
    Actor::super_admin(ROOT, "root")
}

/// Project directory with a fixed, editable roster
#[derive(Default)]
pub struct StaticDirectory {
    owners: Mutex<HashMap<ProjectId, UserId>>,
    members: Mutex<HashMap<ProjectId, Vec<ProjectMember>>>,
    unavailable: AtomicBool,
    member_lookups: AtomicUsize,
}

impl StaticDirectory {
    pub fn add_project(&self, project_id: ProjectId, owner_id: UserId) {
        self.owners.lock().unwrap().insert(project_id, owner_id);
    }

    pub fn add_member(&self, project_id: ProjectId, user_id: UserId, role: ProjectRole) {
        self.members
            .lock()
            .unwrap()
            .entry(project_id)
            .or_default()
            .push(ProjectMember { user_id, role });
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many times `list_members` was called
    pub fn member_lookups(&self) -> usize {
        self.member_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectDirectory for StaticDirectory {
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, DirectoryError> {
        self.check()?;
        let owners = self.owners.lock().unwrap();
        owners
            .get(&project_id)
            .map(|owner_id| Project {
                id: project_id,
                owner_id: *owner_id,
            })
            .ok_or(DirectoryError::ProjectNotFound(project_id))
    }

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectMember>, DirectoryError> {
        self.check()?;
        self.member_lookups.fetch_add(1, Ordering::SeqCst);
        if !self.owners.lock().unwrap().contains_key(&project_id) {
            return Err(DirectoryError::ProjectNotFound(project_id));
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Queue that keeps every accepted job
#[derive(Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<BuildJob>>,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<BuildJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildQueue for RecordingQueue {
    async fn enqueue(&self, job: BuildJob) -> Result<(), QueueError> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Queue that rejects every job
pub struct FailingQueue;

#[async_trait]
impl BuildQueue for FailingQueue {
    async fn enqueue(&self, _job: BuildJob) -> Result<(), QueueError> {
        Err(QueueError::Rejected {
            status: 503,
            message: "executor draining".into(),
        })
    }
}

/// Every service over shared in-memory stores
///
/// Project 7 is owned by [`OWNER`], with [`ADMIN`] as ADMIN and [`MEMBER`]
/// as MEMBER. Project 8 is owned by [`OUTSIDER`].
pub struct Harness {
    pub directory: Arc<StaticDirectory>,
    pub pipeline_repo: Arc<MemoryPipelineRepository>,
    pub build_repo: Arc<MemoryBuildRepository>,
    pub queue: Arc<RecordingQueue>,
    pub pipelines: Arc<PipelineService>,
    pub builds: Arc<BuildService>,
    pub schedules: Arc<ScheduleService>,
}

impl Harness {
    /// Harness whose build service submits to a [`RecordingQueue`]
    pub fn new() -> Self {
        let queue = Arc::new(RecordingQueue::default());
        Self::build(queue.clone(), Some(queue))
    }

    /// Harness whose build service has no queue configured
    pub fn without_queue() -> Self {
        Self::build(Arc::new(RecordingQueue::default()), None)
    }

    /// Harness whose build service submits to `queue`
    pub fn with_queue(queue: Arc<dyn BuildQueue>) -> Self {
        Self::build(Arc::new(RecordingQueue::default()), Some(queue))
    }

    fn build(recording: Arc<RecordingQueue>, queue: Option<Arc<dyn BuildQueue>>) -> Self {
        let directory = Arc::new(StaticDirectory::default());
        directory.add_project(PROJECT, OWNER);
        directory.add_member(PROJECT, ADMIN, ProjectRole::Admin);
        directory.add_member(PROJECT, MEMBER, ProjectRole::Member);
        directory.add_project(OTHER_PROJECT, OUTSIDER);

        let gate: Arc<dyn AccessGate> = Arc::new(DirectoryAccessGate::new(directory.clone()));
        let pipeline_repo = Arc::new(MemoryPipelineRepository::default());
        let build_repo = Arc::new(MemoryBuildRepository::default());

        let pipelines = Arc::new(PipelineService::new(pipeline_repo.clone(), gate.clone()));
        let builds = Arc::new(BuildService::new(
            pipeline_repo.clone(),
            build_repo.clone(),
            gate.clone(),
            queue,
        ));
        let schedules = Arc::new(ScheduleService::new(
            pipeline_repo.clone(),
            Arc::new(MemoryScheduleRepository::default()),
            gate,
        ));

        Self {
            directory,
            pipeline_repo,
            build_repo,
            queue: recording,
            pipelines,
            builds,
            schedules,
        }
    }

    /// Create an active pipeline in `project_id` as its owner
    pub async fn seed_pipeline(&self, project_id: ProjectId, name: &str, workflow: &str) -> Pipeline {
        let actor = if project_id == OTHER_PROJECT {
            outsider()
        } else {
            owner()
        };
        self.pipelines
            .create(
                &actor,
                CreatePipeline {
                    project_id,
                    name: name.to_string(),
                    description: String::new(),
                    workflow: workflow.to_string(),
                    is_active: true,
                },
            )
            .await
            .unwrap()
    }
}
