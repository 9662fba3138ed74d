use std::collections::HashMap;

/// A known participant.
///
/// `id` is stable for the life of the session; `name` may change when the
/// directory is refreshed and is not unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub real_name: String,
    pub tz: String,
}

/// A known conversation. `members` holds user ids in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}

/// In-memory registry of known users and channels. No I/O.
///
/// Entries are only ever added during a session: users upsert by id (last
/// write wins), channels keep their first-seen record (attach by an existing
/// id is a no-op). Channels preserve insertion order, so snapshot order
/// survives; users carry no ordering guarantee.
#[derive(Debug, Default)]
pub struct Directory {
    users: HashMap<String, User>,
    channels: Vec<Channel>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user. Every field is overwritten.
    pub fn attach_user(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        real_name: impl Into<String>,
        tz: impl Into<String>,
    ) {
        let id = id.into();
        self.users.insert(
            id.clone(),
            User {
                id,
                name: name.into(),
                real_name: real_name.into(),
                tz: tz.into(),
            },
        );
    }

    /// Add a channel unless its id is already known.
    pub fn attach_channel(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        members: Vec<String>,
    ) {
        let id = id.into();
        if self.channels.iter().any(|c| c.id == id) {
            return;
        }
        self.channels.push(Channel {
            id,
            name: name.into(),
            members,
        });
    }

    /// Look up a user by id, falling back to the first exact name match.
    pub fn find_user(&self, key: &str) -> Option<&User> {
        self.users
            .get(key)
            .or_else(|| self.users.values().find(|u| u.name == key))
    }

    /// Look up a channel by id, falling back to the first name match in
    /// insertion order.
    pub fn find_channel(&self, key: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.id == key)
            .or_else(|| self.channels.iter().find(|c| c.name == key))
    }

    /// All users whose display name contains `fragment`.
    pub fn search_users(&self, fragment: &str) -> Vec<&User> {
        self.users
            .values()
            .filter(|u| u.name.contains(fragment))
            .collect()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with_general() -> Directory {
        let mut dir = Directory::new();
        dir.attach_channel("general", "C1", vec!["U1".to_string()]);
        dir
    }

    // -- channel attach: first snapshot wins --

    #[test]
    fn channel_attach_is_idempotent() {
        let mut dir = directory_with_general();
        dir.attach_channel("renamed", "C1", vec![]);

        let channel = dir.find_channel("C1").unwrap();
        assert_eq!(channel.name, "general");
        assert_eq!(channel.members, vec!["U1".to_string()]);
        assert_eq!(dir.channel_count(), 1);
    }

    #[test]
    fn channels_keep_insertion_order() {
        let mut dir = Directory::new();
        dir.attach_channel("zeta", "C3", vec![]);
        dir.attach_channel("alpha", "C1", vec![]);
        dir.attach_channel("mid", "C2", vec![]);

        let ids: Vec<&str> = dir.channels().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C3", "C1", "C2"]);
    }

    // -- user attach: last write wins --

    #[test]
    fn user_attach_overwrites_all_fields() {
        let mut dir = Directory::new();
        dir.attach_user("a", "U1", "Anna", "Europe/Oslo");
        dir.attach_user("b", "U1", "Bea", "unknown");

        let user = dir.find_user("U1").unwrap();
        assert_eq!(user.name, "b");
        assert_eq!(user.real_name, "Bea");
        assert_eq!(user.tz, "unknown");
        assert_eq!(dir.user_count(), 1);
    }

    // -- lookup precedence --

    #[test]
    fn find_channel_prefers_id_over_name() {
        let mut dir = Directory::new();
        // A channel literally named after another channel's id.
        dir.attach_channel("C2", "C1", vec![]);
        dir.attach_channel("general", "C2", vec![]);

        assert_eq!(dir.find_channel("C2").unwrap().name, "general");
        assert_eq!(dir.find_channel("general").unwrap().id, "C2");
    }

    #[test]
    fn find_channel_by_name_takes_first_in_insertion_order() {
        let mut dir = Directory::new();
        dir.attach_channel("dupe", "C1", vec![]);
        dir.attach_channel("dupe", "C2", vec![]);

        assert_eq!(dir.find_channel("dupe").unwrap().id, "C1");
    }

    #[test]
    fn find_user_by_id_or_name() {
        let mut dir = Directory::new();
        dir.attach_user("alice", "U1", "Alice A", "unknown");

        assert_eq!(dir.find_user("U1").unwrap().name, "alice");
        assert_eq!(dir.find_user("alice").unwrap().id, "U1");
        assert!(dir.find_user("nobody").is_none());
    }

    #[test]
    fn search_users_matches_substrings() {
        let mut dir = Directory::new();
        dir.attach_user("alice", "U1", "Alice A", "unknown");
        dir.attach_user("malice", "U2", "Mal", "unknown");
        dir.attach_user("bob", "U3", "Bob", "unknown");

        let mut hits: Vec<&str> = dir.search_users("lice").iter().map(|u| u.id.as_str()).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec!["U1", "U2"]);
        assert!(dir.search_users("zzz").is_empty());
    }

    #[test]
    fn empty_directory() {
        let dir = Directory::new();
        assert!(dir.is_empty());
        assert!(dir.find_channel("C1").is_none());
        assert_eq!(dir.users().count(), 0);
    }
}
