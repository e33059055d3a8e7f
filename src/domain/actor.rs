//! Tagged actor type and the authorization predicate.
//!
//! Every resolver receives an [`Actor`] and dispatches on it explicitly;
//! ownership is decided by client-record identity, never by email.

use serde::Serialize;

/// The caller of an operation, as established by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Actor {
    /// Superuser; full read/write on all resources.
    Admin { user_id: i32 },
    /// Authenticated user linked 1:1 to a client record.
    Owner { user_id: i32, client_id: i32 },
    /// Authenticated user with no client record; sees nothing.
    Unlinked { user_id: i32 },
    /// No (valid) credentials presented.
    Anonymous,
}

/// Row visibility derived from an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Client(i32),
    Nothing,
}

impl Actor {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<i32> {
        match self {
            Self::Admin { user_id } | Self::Owner { user_id, .. } | Self::Unlinked { user_id } => {
                Some(*user_id)
            }
            Self::Anonymous => None,
        }
    }

    /// Visibility scope applied before search/sort/paginate on every listing.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        match self {
            Self::Admin { .. } => Scope::All,
            Self::Owner { client_id, .. } => Scope::Client(*client_id),
            Self::Unlinked { .. } | Self::Anonymous => Scope::Nothing,
        }
    }

    /// Whether this actor may read a resource owned by `client_id`.
    #[must_use]
    pub const fn can_access_client(&self, client_id: i32) -> bool {
        match self {
            Self::Admin { .. } => true,
            Self::Owner { client_id: own, .. } => *own == client_id,
            Self::Unlinked { .. } | Self::Anonymous => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_scope_is_all() {
        let actor = Actor::Admin { user_id: 1 };
        assert_eq!(actor.scope(), Scope::All);
        assert!(actor.can_access_client(42));
    }

    #[test]
    fn test_owner_scoped_to_own_client() {
        let actor = Actor::Owner {
            user_id: 2,
            client_id: 7,
        };
        assert_eq!(actor.scope(), Scope::Client(7));
        assert!(actor.can_access_client(7));
        assert!(!actor.can_access_client(8));
    }

    #[test]
    fn test_unlinked_sees_nothing() {
        let actor = Actor::Unlinked { user_id: 3 };
        assert_eq!(actor.scope(), Scope::Nothing);
        assert!(!actor.can_access_client(3));
    }

    #[test]
    fn test_anonymous_denied_everywhere() {
        let actor = Actor::Anonymous;
        assert!(!actor.is_authenticated());
        assert_eq!(actor.scope(), Scope::Nothing);
        assert!(!actor.can_access_client(1));
        assert_eq!(actor.user_id(), None);
    }
}
