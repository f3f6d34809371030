//! Request context - who is calling and what they are trying to do.

/// Operation being performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// Safe actions only read state.
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// An authenticated user, as established from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

/// The caller of a request: a known identity or the anonymous marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    User(Identity),
}

impl Requester {
    pub fn user(user_id: i32, username: impl Into<String>) -> Self {
        Requester::User(Identity {
            user_id,
            username: username.into(),
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Requester::User(identity) => Some(identity),
            Requester::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

/// Everything access control needs to know about the current request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub requester: &'a Requester,
    pub action: Action,
}

impl<'a> RequestContext<'a> {
    pub fn new(requester: &'a Requester, action: Action) -> Self {
        Self { requester, action }
    }
}
