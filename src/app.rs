use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::conversation;
use crate::responder::SimulatedClient;
use crate::storage::Storage;
use crate::store::ConversationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Chat,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub input_mode: InputMode,
    pub dark_mode: bool,

    pub store: ConversationStore,
    storage: Storage,
    responder: SimulatedClient,
    /// Spawned response tasks, paired with the conversation they resolve to.
    /// The id is looked up again at resolution time, never the conversation
    /// captured at send time.
    pending: Vec<(Uuid, JoinHandle<anyhow::Result<String>>)>,

    // Message composition
    pub message_input: String,
    pub message_cursor: usize, // cursor position in message_input (chars)

    // Inline title rename (Some while the editor is open)
    pub rename_input: Option<String>,
    pub rename_cursor: usize,

    // Sidebar state
    pub sidebar_state: ListState,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // visible chat area, for scroll calculations
    pub chat_width: u16,  // chat area width, for wrap calculations
    pub animation_frame: u8, // 0-2 for the ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub sidebar_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(storage: Storage) -> Self {
        let store = match storage.load_conversations() {
            Some(saved) => ConversationStore::from_saved(saved),
            None => ConversationStore::new(),
        };
        let dark_mode = storage.load_dark_mode().unwrap_or(false);

        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));

        Self {
            should_quit: false,
            focus: FocusPane::Sidebar,
            input_mode: InputMode::Normal,
            dark_mode,

            store,
            storage,
            responder: SimulatedClient::new(),
            pending: Vec::new(),

            message_input: String::new(),
            message_cursor: 0,

            rename_input: None,
            rename_cursor: 0,

            sidebar_state,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            sidebar_area: None,
            chat_area: None,
        }
    }

    /// Write the conversation list out. Persistence failures never roll back
    /// in-memory state; they are logged and the session continues.
    pub fn persist(&self) {
        if let Err(err) = self.storage.save_conversations(self.store.conversations()) {
            log::warn!("failed to persist conversations: {:#}", err);
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        if let Err(err) = self.storage.save_dark_mode(self.dark_mode) {
            log::warn!("failed to persist dark mode: {:#}", err);
        }
    }

    // Sidebar navigation

    pub fn selected_index(&self) -> usize {
        self.sidebar_state.selected().unwrap_or(0)
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.store
            .conversations()
            .get(self.selected_index())
            .map(|c| c.id)
    }

    pub fn sidebar_down(&mut self) {
        let len = self.store.conversations().len();
        if len > 0 {
            let i = self.selected_index();
            self.sidebar_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sidebar_up(&mut self) {
        let i = self.selected_index();
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    /// Activate the conversation under the sidebar cursor.
    pub fn activate_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.select(id);
            self.scroll_chat_to_bottom();
        }
    }

    // Conversation operations

    pub fn new_conversation(&mut self) {
        self.store.create();
        self.sidebar_state.select(Some(0));
        self.chat_scroll = 0;
        self.persist();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.store.delete(id);

        let last = self.store.conversations().len().saturating_sub(1);
        self.sidebar_state
            .select(Some(self.selected_index().min(last)));
        self.persist();
    }

    pub fn begin_rename(&mut self) {
        if let Some(conv) = self.store.conversations().get(self.selected_index()) {
            let title = conv.title.clone();
            self.rename_cursor = title.chars().count();
            self.rename_input = Some(title);
        }
    }

    pub fn commit_rename(&mut self) {
        if let (Some(title), Some(id)) = (self.rename_input.take(), self.selected_id()) {
            self.store.rename(id, &title);
            self.persist();
        }
        self.rename_cursor = 0;
    }

    pub fn cancel_rename(&mut self) {
        self.rename_input = None;
        self.rename_cursor = 0;
    }

    /// Move the selected conversation one slot up in the list.
    pub fn move_selected_up(&mut self) {
        let i = self.selected_index();
        if i > 0 {
            let reordered = conversation::reorder(self.store.conversations(), i, i - 1);
            self.store.reorder(reordered);
            self.sidebar_state.select(Some(i - 1));
            self.persist();
        }
    }

    /// Move the selected conversation one slot down in the list.
    pub fn move_selected_down(&mut self) {
        let i = self.selected_index();
        if i + 1 < self.store.conversations().len() {
            let reordered = conversation::reorder(self.store.conversations(), i, i + 1);
            self.store.reorder(reordered);
            self.sidebar_state.select(Some(i + 1));
            self.persist();
        }
    }

    // Message sending and response resolution

    /// Append the composed message to the active conversation and kick off a
    /// simulated response in the background. The user message is visible
    /// immediately; the response lands whenever its task resolves.
    pub fn send_message(&mut self) {
        if self.message_input.is_empty() {
            return;
        }

        let content = std::mem::take(&mut self.message_input);
        self.message_cursor = 0;

        match self.store.send_message(&content) {
            Some(conversation_id) => {
                let responder = self.responder.clone();
                let handle =
                    tokio::spawn(async move { responder.respond(&content).await });
                self.pending.push((conversation_id, handle));
                self.persist();
                self.scroll_chat_to_bottom();
            }
            None => {
                // No active conversation; put the draft back
                self.message_input = content;
            }
        }
    }

    /// Collect finished response tasks and merge each result into whatever
    /// its conversation looks like now.
    pub async fn poll_responses(&mut self) {
        let mut resolved = false;
        let mut i = 0;
        while i < self.pending.len() {
            if !self.pending[i].1.is_finished() {
                i += 1;
                continue;
            }

            let (conversation_id, handle) = self.pending.remove(i);
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(anyhow::anyhow!("response task panicked: {}", err)),
            };
            self.store.apply_response(conversation_id, result);
            resolved = true;
        }

        if resolved {
            self.persist();
            self.scroll_chat_to_bottom();
        }
    }

    // Chat scrolling

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let max = self.total_chat_lines().saturating_sub(self.chat_height);
        if self.chat_scroll < max {
            self.chat_scroll += 1;
        }
    }

    pub fn scroll_chat_half_page_down(&mut self) {
        let half = self.chat_height / 2;
        let max = self.total_chat_lines().saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll + half).min(max);
    }

    pub fn scroll_chat_half_page_up(&mut self) {
        let half = self.chat_height / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half);
    }

    /// Scroll so the newest message (or the thinking indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total = self.total_chat_lines();
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = total.saturating_sub(visible);
    }

    /// Number of rendered chat lines, accounting for wrapping.
    fn total_chat_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let Some(conv) = self.store.active() else {
            return 0;
        };

        let mut total: u16 = 0;
        for msg in &conv.messages {
            total += 1; // Role line ("Vous :" or "IA :")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let chars = line.chars().count();
                if chars == 0 {
                    total += 1;
                } else {
                    total += ((chars / wrap_width) + 1) as u16;
                }
            }
            total += 1; // Blank line after message
        }

        if self.store.is_loading() {
            total += 2; // "IA :" + thinking indicator
        }
        total
    }

    /// Tick the ellipsis animation while a response is pending.
    pub fn tick_animation(&mut self) {
        if self.store.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
