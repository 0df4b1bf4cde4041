//! Authorization gate
//!
//! Decides whether an actor may read or mutate resources of a project.
//! Every decision is resolved against the project directory on each call;
//! nothing is cached, so membership changes apply immediately.

use async_trait::async_trait;
use conveyor_core::domain::project::{ProjectId, ProjectRole};
use std::sync::Arc;

use super::Actor;
use crate::directory::{DirectoryError, ProjectDirectory};
use crate::service::error::{Result, ServiceError};

/// Project-scoped access checks shared by every service
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Whether the actor is a super-admin, the owner, or any member of the project
    async fn is_member_or_higher(&self, actor: &Actor, project_id: ProjectId) -> Result<bool>;

    /// Fails with `PermissionDenied` unless the actor is a super-admin, the
    /// owner, or a member with the OWNER or ADMIN role
    async fn ensure_owner_or_admin(&self, actor: &Actor, project_id: ProjectId) -> Result<()>;

    /// Fails with `PermissionDenied` unless [`AccessGate::is_member_or_higher`] holds
    async fn ensure_member_or_higher(&self, actor: &Actor, project_id: ProjectId) -> Result<()> {
        if self.is_member_or_higher(actor, project_id).await? {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "user {} is not a member of project {}",
                actor.user_id, project_id
            )))
        }
    }
}

/// How an actor relates to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standing {
    Owner,
    Member(ProjectRole),
    Outsider,
}

/// [`AccessGate`] backed by the project directory
#[derive(Clone)]
pub struct DirectoryAccessGate {
    directory: Arc<dyn ProjectDirectory>,
}

impl DirectoryAccessGate {
    pub fn new(directory: Arc<dyn ProjectDirectory>) -> Self {
        Self { directory }
    }

    async fn standing(&self, actor: &Actor, project_id: ProjectId) -> Result<Standing> {
        let project = self
            .directory
            .get_project(project_id)
            .await
            .map_err(|e| directory_error("failed to get project", e))?;

        if project.owner_id == actor.user_id {
            return Ok(Standing::Owner);
        }

        let members = self
            .directory
            .list_members(project_id)
            .await
            .map_err(|e| directory_error("failed to list project members", e))?;

        Ok(members
            .iter()
            .find(|m| m.user_id == actor.user_id)
            .map_or(Standing::Outsider, |m| Standing::Member(m.role)))
    }
}

fn directory_error(context: &str, err: DirectoryError) -> ServiceError {
    match err {
        DirectoryError::ProjectNotFound(id) => ServiceError::not_found("project", id),
        DirectoryError::Unavailable(_) => ServiceError::internal(context, err),
    }
}

#[async_trait]
impl AccessGate for DirectoryAccessGate {
    async fn is_member_or_higher(&self, actor: &Actor, project_id: ProjectId) -> Result<bool> {
        if actor.super_admin {
            return Ok(true);
        }
        let standing = self.standing(actor, project_id).await?;
        Ok(standing != Standing::Outsider)
    }

    async fn ensure_owner_or_admin(&self, actor: &Actor, project_id: ProjectId) -> Result<()> {
        if actor.super_admin {
            return Ok(());
        }
        match self.standing(actor, project_id).await? {
            Standing::Owner => Ok(()),
            Standing::Member(role) if role.can_manage() => Ok(()),
            _ => {
                tracing::debug!(
                    user_id = actor.user_id,
                    project_id,
                    "Denied: owner or admin required"
                );
                Err(ServiceError::PermissionDenied(
                    "only owner or admin can perform this action".to_string(),
                ))
            }
        }
    }
}
