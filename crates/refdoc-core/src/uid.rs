//! Uid assignment table
//!
//! Maps reflection identities onto uids and indexes display names for
//! lookups by name. Uids are committed one root at a time: a root whose uids
//! collide with anything already committed is rejected as a whole.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::TransformError;
use crate::reflection::NodeId;

/// One uid claimed while walking a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidClaim {
    pub id: Option<NodeId>,
    pub uid: String,
    pub name: String,
}

/// Uids claimed by one root, not yet visible to the table
#[derive(Debug, Clone, Default)]
pub struct StagedUids {
    claims: Vec<UidClaim>,
}

impl StagedUids {
    pub fn claim(&mut self, id: Option<NodeId>, uid: impl Into<String>, name: impl Into<String>) {
        self.claims.push(UidClaim {
            id,
            uid: uid.into(),
            name: name.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Identity -> uid mapping for a whole run
#[derive(Debug, Clone, Default)]
pub struct UidTable {
    by_id: BTreeMap<NodeId, String>,
    uids: BTreeSet<String>,
    /// display name -> uids carrying it
    by_name: BTreeMap<String, Vec<String>>,
    reserved: BTreeSet<String>,
}

impl UidTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a uid (package names) from being claimed by any entity
    pub fn reserve(&mut self, uid: impl Into<String>) {
        self.reserved.insert(uid.into());
    }

    /// Commit a root's claims, or reject them all on the first collision
    pub fn commit(&mut self, staged: StagedUids) -> Result<(), TransformError> {
        let mut seen = BTreeSet::new();
        for claim in &staged.claims {
            let taken = self.uids.contains(&claim.uid)
                || self.reserved.contains(&claim.uid)
                || !seen.insert(claim.uid.as_str());
            if taken {
                return Err(TransformError::DuplicateUid {
                    uid: claim.uid.clone(),
                });
            }
        }

        for claim in staged.claims {
            // overloads share an identity; the first signature stands for it
            let first_of_identity = match claim.id {
                Some(id) => match self.by_id.entry(id) {
                    Entry::Vacant(entry) => {
                        entry.insert(claim.uid.clone());
                        true
                    }
                    Entry::Occupied(_) => false,
                },
                None => true,
            };
            if first_of_identity {
                self.by_name
                    .entry(claim.name)
                    .or_default()
                    .push(claim.uid.clone());
            }
            self.uids.insert(claim.uid);
        }
        Ok(())
    }

    /// Uid assigned to an identity
    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn contains_uid(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }

    /// Resolve a written name: an exact uid first, then a unique display name
    pub fn lookup_name(&self, name: &str) -> Option<&str> {
        if let Some(uid) = self.uids.get(name) {
            return Some(uid.as_str());
        }
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([only]) => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }
}
