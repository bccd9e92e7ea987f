use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Savings group identifier.
    GroupId
);

uuid_id!(
    /// Membership identifier (one user's seat in one group).
    MemberId
);

uuid_id!(
    /// Account identifier supplied by the authentication collaborator.
    UserId
);

uuid_id!(
    /// Contribution or payout record identifier.
    RecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(GroupId::generate(), GroupId::generate());
    }

    #[test]
    fn display_matches_uuid() {
        let raw = Uuid::new_v4();
        assert_eq!(UserId::from(raw).to_string(), raw.to_string());
    }

    #[test]
    fn serializes_transparently_as_uuid_string() {
        let id = MemberId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
