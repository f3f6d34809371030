//! Groups: read-only.

use std::sync::Arc;

use async_trait::async_trait;
use yatube_shared::dto::GroupRepr;

use super::{ListQuery, ListResource, Resource, RetrieveResource};
use crate::context::Requester;
use crate::domain::Group;
use crate::error::{DomainError, DomainResult};
use crate::ports::{GroupRepository, Page};

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }
}

impl From<Group> for GroupRepr {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

impl Resource for GroupService {
    type Repr = GroupRepr;
    /// Groups are never written through the API.
    type Input = ();
    type Scope = ();
}

#[async_trait]
impl ListResource for GroupService {
    async fn list(
        &self,
        _requester: &Requester,
        _scope: &(),
        query: ListQuery,
    ) -> DomainResult<Page<GroupRepr>> {
        let page = self.groups.list(query.window).await?;
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
        })
    }
}

#[async_trait]
impl RetrieveResource for GroupService {
    async fn retrieve(&self, _requester: &Requester, _scope: &(), id: i32) -> DomainResult<GroupRepr> {
        self.groups
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Group", id))
    }
}
