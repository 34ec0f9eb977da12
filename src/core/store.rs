//! In-memory conversation store shared by the input loop and the update task.
//!
//! Every operation takes the internal lock for its own duration only, so a
//! reader on the other context sees a record either before or after a merge,
//! never half way. Callers hold ids and indices, never references into the
//! store, and resolve them again when they act.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::core::chat::{Chat, ChatPatch, User};
use crate::core::message::{File, LocalFile, Message, MessageContent};
use crate::utils::scroll::{ScrollCalculator, Step, VisibleWindow};

#[derive(Debug, Default)]
struct StoreState {
    chats: HashMap<i64, Chat>,
    /// Ids of listed chats in display order.
    order: Vec<i64>,
    /// Messages per chat, newest first.
    msgs: HashMap<i64, Vec<Message>>,
    msg_cursor: HashMap<i64, usize>,
    users: HashMap<i64, User>,
    /// Pending downloads: file id to (chat id, message id).
    downloads: HashMap<i64, (i64, i64)>,
    current_chat: usize,
}

impl StoreState {
    /// Re-sort the listed chats, keeping the cursor on the chat it pointed at.
    fn rebuild_order(&mut self) {
        let selected = self.current_chat_id();
        let mut listed: Vec<&Chat> = self.chats.values().filter(|c| c.is_listed()).collect();
        listed.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        self.order = listed.into_iter().map(|c| c.id).collect();
        match selected.and_then(|id| self.order.iter().position(|c| *c == id)) {
            Some(idx) => self.current_chat = idx,
            None => self.clamp_chat_cursor(),
        }
    }

    fn clamp_chat_cursor(&mut self) {
        self.current_chat = self.current_chat.min(self.order.len().saturating_sub(1));
    }

    fn current_chat_id(&self) -> Option<i64> {
        self.order.get(self.current_chat).copied()
    }

    fn msg_idx(&self, chat_id: i64) -> usize {
        let len = self.msgs.get(&chat_id).map_or(0, Vec::len);
        self.msg_cursor
            .get(&chat_id)
            .copied()
            .unwrap_or(0)
            .min(len.saturating_sub(1))
    }

    fn find_msg_mut(&mut self, chat_id: i64, msg_id: i64) -> Option<&mut Message> {
        self.msgs
            .get_mut(&chat_id)?
            .iter_mut()
            .find(|m| m.id == msg_id)
    }
}

#[derive(Debug)]
pub struct Store {
    my_id: i64,
    state: RwLock<StoreState>,
}

impl Store {
    pub fn new(my_id: i64) -> Self {
        Self {
            my_id,
            state: RwLock::new(StoreState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn my_id(&self) -> i64 {
        self.my_id
    }

    pub fn is_me(&self, user_id: i64) -> bool {
        user_id == self.my_id
    }

    // ------------------------------------------------------------------
    // Chats
    // ------------------------------------------------------------------

    /// Insert a chat, or merge it over an existing record with the same id.
    pub fn insert_chat(&self, chat: Chat) {
        let mut state = self.write();
        match state.chats.entry(chat.id) {
            Entry::Occupied(mut known) => known.get_mut().apply(ChatPatch::from(chat)),
            Entry::Vacant(slot) => {
                slot.insert(chat);
            }
        }
        state.rebuild_order();
    }

    /// Merge `patch` into chat `chat_id`. Unknown ids are left alone.
    ///
    /// The chat cursor follows the selected chat by id across the reorder.
    pub fn update_chat(&self, chat_id: i64, patch: ChatPatch) -> bool {
        let mut state = self.write();
        let Some(chat) = state.chats.get_mut(&chat_id) else {
            warn!(chat_id, "Ignoring update for unknown chat");
            return false;
        };
        chat.apply(patch);
        state.rebuild_order();
        true
    }

    /// Listed chats in display order.
    pub fn chats(&self) -> Vec<Chat> {
        let state = self.read();
        state
            .order
            .iter()
            .filter_map(|id| state.chats.get(id).cloned())
            .collect()
    }

    /// The visible slice of the chat list and where the cursor sits in it,
    /// read under one lock.
    pub fn chat_view(&self, page: usize, threshold: usize) -> (VisibleWindow, Vec<Chat>) {
        let state = self.read();
        let window = ScrollCalculator::visible_window(state.current_chat, page, threshold);
        let chats = state
            .order
            .iter()
            .skip(window.start)
            .take(page)
            .filter_map(|id| state.chats.get(id).cloned())
            .collect();
        (window, chats)
    }

    pub fn chat_count(&self) -> usize {
        self.read().order.len()
    }

    pub fn chat(&self, chat_id: i64) -> Option<Chat> {
        self.read().chats.get(&chat_id).cloned()
    }

    pub fn current_chat(&self) -> usize {
        self.read().current_chat
    }

    pub fn current_chat_id(&self) -> Option<i64> {
        self.read().current_chat_id()
    }

    pub fn current_chat_record(&self) -> Option<Chat> {
        let state = self.read();
        state
            .current_chat_id()
            .and_then(|id| state.chats.get(&id).cloned())
    }

    fn move_chat(&self, step: Step) -> bool {
        let mut state = self.write();
        match ScrollCalculator::step(state.current_chat, step, state.order.len()) {
            Some(idx) => {
                state.current_chat = idx;
                true
            }
            None => false,
        }
    }

    pub fn next_chat(&self, step: usize) -> bool {
        self.move_chat(Step::Forward(step))
    }

    pub fn prev_chat(&self, step: usize) -> bool {
        self.move_chat(Step::Back(step))
    }

    pub fn first_chat(&self) -> bool {
        let mut state = self.write();
        if state.current_chat == 0 {
            return false;
        }
        state.current_chat = 0;
        true
    }

    pub fn last_chat(&self) -> bool {
        let mut state = self.write();
        let last = state.order.len().saturating_sub(1);
        if state.current_chat == last {
            return false;
        }
        state.current_chat = last;
        true
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Insert a message keeping ids descending; an existing id is replaced in place.
    pub fn add_message(&self, message: Message) {
        let mut state = self.write();
        let msgs = state.msgs.entry(message.chat_id).or_default();
        if let Some(existing) = msgs.iter_mut().find(|m| m.id == message.id) {
            *existing = message;
            return;
        }
        let pos = msgs.partition_point(|m| m.id > message.id);
        msgs.insert(pos, message);
    }

    pub fn remove_message(&self, chat_id: i64, msg_id: i64) -> Option<Message> {
        let mut state = self.write();
        let msgs = state.msgs.get_mut(&chat_id)?;
        let pos = msgs.iter().position(|m| m.id == msg_id)?;
        let removed = msgs.remove(pos);
        let len = msgs.len();
        if let Some(cursor) = state.msg_cursor.get_mut(&chat_id) {
            if pos < *cursor {
                *cursor -= 1;
            }
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
        Some(removed)
    }

    pub fn update_msg_content(&self, chat_id: i64, msg_id: i64, content: MessageContent) -> bool {
        let mut state = self.write();
        match state.find_msg_mut(chat_id, msg_id) {
            Some(message) => {
                message.content = content;
                true
            }
            None => {
                debug!(chat_id, msg_id, "Content update for message not in cache");
                false
            }
        }
    }

    /// Record new local state for the file attached to a message.
    ///
    /// Returns whether the file is now fully downloaded, or `None` if the
    /// message is unknown or has no file.
    pub fn update_file_local(&self, chat_id: i64, msg_id: i64, local: LocalFile) -> Option<bool> {
        let mut state = self.write();
        let file = state.find_msg_mut(chat_id, msg_id)?.content.file_mut()?;
        file.local = local;
        Some(file.is_downloaded())
    }

    pub fn message(&self, chat_id: i64, msg_id: i64) -> Option<Message> {
        self.read()
            .msgs
            .get(&chat_id)?
            .iter()
            .find(|m| m.id == msg_id)
            .cloned()
    }

    pub fn msg_count(&self, chat_id: i64) -> usize {
        self.read().msgs.get(&chat_id).map_or(0, Vec::len)
    }

    /// Messages of a chat, newest first, starting at `start`.
    pub fn msg_page(&self, chat_id: i64, start: usize, len: usize) -> Vec<Message> {
        self.read()
            .msgs
            .get(&chat_id)
            .map(|msgs| msgs.iter().skip(start).take(len).cloned().collect())
            .unwrap_or_default()
    }

    /// The current chat with its visible messages (newest first), read under
    /// one lock. `None` when no chat is selected.
    pub fn msg_view(
        &self,
        page: usize,
        threshold: usize,
    ) -> Option<(Chat, VisibleWindow, Vec<Message>)> {
        let state = self.read();
        let chat_id = state.current_chat_id()?;
        let chat = state.chats.get(&chat_id)?.clone();
        let window = ScrollCalculator::visible_window(state.msg_idx(chat_id), page, threshold);
        let msgs = state
            .msgs
            .get(&chat_id)
            .map(|msgs| msgs.iter().skip(window.start).take(page).cloned().collect())
            .unwrap_or_default();
        Some((chat, window, msgs))
    }

    /// Cursor in the current chat's message list, if a chat is selected.
    pub fn current_msg_idx(&self) -> Option<usize> {
        let state = self.read();
        state.current_chat_id().map(|id| state.msg_idx(id))
    }

    pub fn current_msg(&self) -> Option<Message> {
        let state = self.read();
        let chat_id = state.current_chat_id()?;
        let idx = state.msg_idx(chat_id);
        state.msgs.get(&chat_id)?.get(idx).cloned()
    }

    fn move_msg(&self, step: Step) -> bool {
        let mut state = self.write();
        let Some(chat_id) = state.current_chat_id() else {
            return false;
        };
        let len = state.msgs.get(&chat_id).map_or(0, Vec::len);
        let current = state.msg_idx(chat_id);
        match ScrollCalculator::step(current, step, len) {
            Some(idx) => {
                state.msg_cursor.insert(chat_id, idx);
                true
            }
            None => false,
        }
    }

    /// Move towards older messages.
    pub fn next_msg(&self, step: usize) -> bool {
        self.move_msg(Step::Forward(step))
    }

    /// Move towards newer messages.
    pub fn prev_msg(&self, step: usize) -> bool {
        self.move_msg(Step::Back(step))
    }

    /// Jump to the newest message.
    pub fn jump_bottom(&self) -> bool {
        let mut state = self.write();
        let Some(chat_id) = state.current_chat_id() else {
            return false;
        };
        if state.msg_idx(chat_id) == 0 {
            return false;
        }
        state.msg_cursor.insert(chat_id, 0);
        true
    }

    /// Jump to the oldest cached message.
    pub fn jump_top(&self) -> bool {
        let mut state = self.write();
        let Some(chat_id) = state.current_chat_id() else {
            return false;
        };
        let last = state.msgs.get(&chat_id).map_or(0, Vec::len).saturating_sub(1);
        if state.msg_idx(chat_id) == last {
            return false;
        }
        state.msg_cursor.insert(chat_id, last);
        true
    }

    /// Remove the selected message of the current chat from the cache.
    pub fn delete_current_msg(&self) -> Option<Message> {
        let (chat_id, msg_id) = {
            let message = self.current_msg()?;
            (message.chat_id, message.id)
        };
        self.remove_message(chat_id, msg_id)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn upsert_user(&self, user: User) {
        self.write().users.insert(user.id, user);
    }

    pub fn user(&self, user_id: i64) -> Option<User> {
        self.read().users.get(&user_id).cloned()
    }

    // ------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------

    pub fn track_download(&self, file_id: i64, chat_id: i64, msg_id: i64) {
        self.write().downloads.insert(file_id, (chat_id, msg_id));
    }

    pub fn download_target(&self, file_id: i64) -> Option<(i64, i64)> {
        self.read().downloads.get(&file_id).copied()
    }

    pub fn finish_download(&self, file_id: i64) -> Option<(i64, i64)> {
        self.write().downloads.remove(&file_id)
    }

    pub fn pending_downloads(&self) -> usize {
        self.read().downloads.len()
    }

    /// Apply an `updateFile` payload to the tracked message, if any.
    ///
    /// Returns the owning `(chat_id, msg_id)` when the file was tracked.
    pub fn apply_file_update(&self, file: &File) -> Option<(i64, i64)> {
        let (chat_id, msg_id) = self.download_target(file.id)?;
        if self.update_file_local(chat_id, msg_id, file.local.clone()) == Some(true) {
            self.finish_download(file.id);
        }
        Some((chat_id, msg_id))
    }
}
