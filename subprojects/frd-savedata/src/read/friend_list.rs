//! Friend directory: a bounded list of friend records with key lookup.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{LoadError, load_flex_record};
use crate::{
    raw::{
        AttributeFlags, Comment, FRIEND_LIST_CAPACITY, FriendRelationship, MAGIC_FRIEND_LIST,
        RecordHeader, ScreenName,
        friend::{FriendEntry, FriendInfo, FriendKey, FriendProfile, TitleData},
        mii::ChecksummedMii,
    },
    timestamp::FormattedTimestamp,
};

/// Common view over the friend-list entry revisions.
pub trait FriendRecord:
    FromBytes + IntoBytes + KnownLayout + Immutable + Clone + Default
{
    fn key(&self) -> &FriendKey;

    /// Raw relationship byte as stored.
    fn relationship(&self) -> u8;

    fn profile(&self) -> &FriendProfile;

    fn favorite_game(&self) -> &TitleData;

    fn comment(&self) -> &Comment;

    fn mii(&self) -> &ChecksummedMii;

    fn screen_name(&self) -> &ScreenName;

    fn character_set(&self) -> u8;

    /// Converts to the IPC shape.
    fn to_info(&self) -> FriendInfo;

    fn principal_id(&self) -> u32 {
        self.key().principal_id.get()
    }

    /// A friendship is established once both sides registered each other, and provisional
    /// while only the local side has.
    fn attribute_flags(&self) -> AttributeFlags {
        match FriendRelationship::try_from(self.relationship()) {
            Ok(FriendRelationship::Complete) => AttributeFlags::ESTABLISHED,
            Ok(FriendRelationship::Incomplete) if self.principal_id() != 0 => {
                AttributeFlags::PROVISIONAL
            }
            _ => AttributeFlags::empty(),
        }
    }
}

impl FriendRecord for FriendInfo {
    fn key(&self) -> &FriendKey {
        &self.key
    }

    fn relationship(&self) -> u8 {
        self.relationship
    }

    fn profile(&self) -> &FriendProfile {
        &self.profile
    }

    fn favorite_game(&self) -> &TitleData {
        &self.favorite_game
    }

    fn comment(&self) -> &Comment {
        &self.comment
    }

    fn mii(&self) -> &ChecksummedMii {
        &self.mii
    }

    fn screen_name(&self) -> &ScreenName {
        &self.screen_name
    }

    fn character_set(&self) -> u8 {
        self.character_set
    }

    fn to_info(&self) -> FriendInfo {
        FriendInfo {
            mii: self.mii.copy_verbatim(),
            ..*self
        }
    }
}

impl FriendRecord for FriendEntry {
    fn key(&self) -> &FriendKey {
        &self.key
    }

    fn relationship(&self) -> u8 {
        self.relationship
    }

    fn profile(&self) -> &FriendProfile {
        &self.profile
    }

    fn favorite_game(&self) -> &TitleData {
        &self.favorite_game
    }

    fn comment(&self) -> &Comment {
        &self.comment
    }

    fn mii(&self) -> &ChecksummedMii {
        &self.mii
    }

    fn screen_name(&self) -> &ScreenName {
        &self.screen_name
    }

    fn character_set(&self) -> u8 {
        self.character_set
    }

    fn to_info(&self) -> FriendInfo {
        FriendInfo {
            key: self.key,
            relationship: self.relationship,
            profile: self.profile,
            favorite_game: self.favorite_game,
            comment: self.comment,
            added: FormattedTimestamp::from(self.added),
            updated: FormattedTimestamp::from(self.updated),
            last_online: FormattedTimestamp::from(self.last_online),
            mii: self.mii.copy_verbatim(),
            screen_name: self.screen_name,
            _unknown: self._unknown,
            character_set: self.character_set,
            mii_changed: FormattedTimestamp::from(self.mii_changed),
            profile_changed: FormattedTimestamp::from(self.profile_changed),
            comment_changed: FormattedTimestamp::from(self.comment_changed),
            ..FriendInfo::default()
        }
    }
}

/// Error returned when adding to a full friend list.
#[derive(Debug, thiserror::Error)]
#[error("friend list is full ({capacity} entries)")]
pub struct FriendListFull {
    pub capacity: usize,
}

/// A friend list with a fixed capacity and an active count.
///
/// Only the first [`FriendList::count`] slots are considered by lookups; the remaining slots
/// are default-initialized and never returned.
#[derive(Debug, Clone)]
pub struct FriendList<E> {
    header: RecordHeader,
    slots: Vec<E>,
    count: usize,
}

impl<E: FriendRecord> Default for FriendList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: FriendRecord> FriendList<E> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            header: RecordHeader::new(MAGIC_FRIEND_LIST),
            slots: vec![E::default(); FRIEND_LIST_CAPACITY],
            count: 0,
        }
    }

    /// Parses a friend-list file. The active count is derived from the file size.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let (header, entries) = load_flex_record::<E>(bytes, MAGIC_FRIEND_LIST)?;
        let mut list = Self::new();
        list.header = header;
        list.count = entries.len();
        for (slot, entry) in list.slots.iter_mut().zip(entries) {
            *slot = entry;
        }
        Ok(list)
    }

    /// Builds a list holding `entries`, truncated to the capacity.
    pub fn from_entries(entries: impl IntoIterator<Item = E>) -> Self {
        let mut list = Self::new();
        for entry in entries.into_iter().take(FRIEND_LIST_CAPACITY) {
            list.slots[list.count] = entry;
            list.count += 1;
        }
        list
    }

    #[inline]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// Number of active entries.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Active entries.
    pub fn entries(&self) -> &[E] {
        &self.slots[..self.count]
    }

    /// Every slot, including inactive ones.
    pub fn slots(&self) -> &[E] {
        &self.slots
    }

    /// Overrides the active count, clamped to the capacity.
    ///
    /// Slots beyond the previous count keep whatever they held.
    pub fn set_count(&mut self, count: usize) {
        self.count = count.min(FRIEND_LIST_CAPACITY);
    }

    /// Mutable access to a slot, regardless of the active count.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut E> {
        self.slots.get_mut(index)
    }

    /// Appends an entry after the active ones.
    pub fn push(&mut self, entry: E) -> Result<(), FriendListFull> {
        if self.count >= FRIEND_LIST_CAPACITY {
            return Err(FriendListFull {
                capacity: FRIEND_LIST_CAPACITY,
            });
        }
        self.slots[self.count] = entry;
        self.count += 1;
        Ok(())
    }

    /// Finds the first active entry whose principal id matches `key`.
    pub fn lookup(&self, key: &FriendKey) -> Option<&E> {
        self.entries().iter().find(|entry| entry.key() == key)
    }

    pub fn contains_principal_id(&self, principal_id: u32) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.principal_id() == principal_id)
    }

    pub fn find_by_local_friend_code(&self, local_friend_code: u64) -> Option<&E> {
        self.entries()
            .iter()
            .find(|entry| entry.key().local_friend_code.get() == local_friend_code)
    }

    /// Returns up to `count` keys starting at `offset`, stopping at the first empty slot.
    pub fn keys(&self, offset: usize, count: usize) -> Vec<FriendKey> {
        self.entries()
            .iter()
            .skip(offset)
            .take(count)
            .map(|entry| *entry.key())
            .take_while(|key| key.principal_id.get() != 0)
            .collect()
    }

    /// Serializes the header followed by the active entries.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(size_of::<RecordHeader>() + self.count * size_of::<E>());
        bytes.extend_from_slice(self.header.as_bytes());
        for entry in self.entries() {
            bytes.extend_from_slice(entry.as_bytes());
        }
        bytes
    }
}

/// On-disk friend-list schema revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FriendListRevision {
    /// Entries stored in the IPC layout with packed calendar timestamps
    Legacy,
    /// Entries stored with millisecond timestamps
    #[default]
    Current,
}

/// Friend list of either revision.
#[derive(Debug, Clone)]
pub enum FriendDirectory {
    Legacy(FriendList<FriendInfo>),
    Current(FriendList<FriendEntry>),
}

impl Default for FriendDirectory {
    fn default() -> Self {
        Self::empty(FriendListRevision::default())
    }
}

macro_rules! with_list {
    ($self:expr, $list:ident => $body:expr) => {
        match $self {
            FriendDirectory::Legacy($list) => $body,
            FriendDirectory::Current($list) => $body,
        }
    };
}

impl FriendDirectory {
    pub fn empty(revision: FriendListRevision) -> Self {
        match revision {
            FriendListRevision::Legacy => Self::Legacy(FriendList::new()),
            FriendListRevision::Current => Self::Current(FriendList::new()),
        }
    }

    pub fn from_bytes(revision: FriendListRevision, bytes: &[u8]) -> Result<Self, LoadError> {
        Ok(match revision {
            FriendListRevision::Legacy => Self::Legacy(FriendList::from_bytes(bytes)?),
            FriendListRevision::Current => Self::Current(FriendList::from_bytes(bytes)?),
        })
    }

    pub fn revision(&self) -> FriendListRevision {
        match self {
            Self::Legacy(_) => FriendListRevision::Legacy,
            Self::Current(_) => FriendListRevision::Current,
        }
    }

    pub fn count(&self) -> usize {
        with_list!(self, list => list.count())
    }

    /// Looks up a friend and returns it in the IPC shape.
    pub fn lookup_info(&self, key: &FriendKey) -> Option<FriendInfo> {
        with_list!(self, list => list.lookup(key).map(FriendRecord::to_info))
    }

    pub fn contains_principal_id(&self, principal_id: u32) -> bool {
        with_list!(self, list => list.contains_principal_id(principal_id))
    }

    pub fn contains_local_friend_code(&self, local_friend_code: u64) -> bool {
        with_list!(self, list => list.find_by_local_friend_code(local_friend_code).is_some())
    }

    pub fn keys(&self, offset: usize, count: usize) -> Vec<FriendKey> {
        with_list!(self, list => list.keys(offset, count))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        with_list!(self, list => list.to_bytes())
    }
}
