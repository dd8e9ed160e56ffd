//! Owner chains.
//!
//! Ownership is stored once, on `projects.owner_id`. A sprint or task names
//! only its project, so its effective owner is whatever that project's owner
//! is at the moment of resolution. Moving a task to another project moves
//! its owner with it.

use crate::db::Database;
use crate::types::{Project, ProjectId, Sprint, Task, UserId};
use anyhow::Result;

/// The reference path from an entity to its controlling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerChain {
    /// The entity is a project; the owner is on the row itself.
    Direct(UserId),
    /// Follow `project.owner`. `None` is a broken chain (no project).
    ViaProject(Option<ProjectId>),
}

/// Implemented by every entity that can be authorized against.
pub trait OwnershipResolvable {
    fn owner_chain(&self) -> OwnerChain;
}

impl OwnershipResolvable for Project {
    fn owner_chain(&self) -> OwnerChain {
        OwnerChain::Direct(self.owner)
    }
}

impl OwnershipResolvable for Sprint {
    fn owner_chain(&self) -> OwnerChain {
        OwnerChain::ViaProject(Some(self.project))
    }
}

impl OwnershipResolvable for Task {
    fn owner_chain(&self) -> OwnerChain {
        OwnerChain::ViaProject(self.project)
    }
}

/// Resolves the project hop of an owner chain against live data.
pub trait OwnerResolver {
    fn project_owner(&self, project_id: ProjectId) -> Result<Option<UserId>>;

    /// `owner_of(entity)`. `None` when the chain is broken.
    fn owner_of(&self, entity: &dyn OwnershipResolvable) -> Result<Option<UserId>> {
        match entity.owner_chain() {
            OwnerChain::Direct(owner) => Ok(Some(owner)),
            OwnerChain::ViaProject(Some(project_id)) => self.project_owner(project_id),
            OwnerChain::ViaProject(None) => Ok(None),
        }
    }
}

impl OwnerResolver for Database {
    fn project_owner(&self, project_id: ProjectId) -> Result<Option<UserId>> {
        Ok(self.get_project(project_id)?.map(|p| p.owner))
    }
}
