//! Todo page
//!
//! A small accessible page wired to the focus layer: skip links, a todo
//! list with announced changes and a "clear completed" confirmation modal.

use std::time::Duration;

use focal_a11y::{
    A11yError, CloseReason, DynamicFocus, FocusRuntime, ModalFocusController, ModalKeyOutcome,
    SkipLinks, move_focus, skip_link,
};
use focal_dom::{Document, KeyboardEvent, NodeId};

use crate::config::DemoConfig;

#[derive(Debug, Clone)]
pub struct Todo {
    pub text: String,
    pub done: bool,
    item: NodeId,
    toggle: NodeId,
    delete: NodeId,
}

/// Where a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    OpenModal,
    Confirm,
    Cancel,
    AddTodo,
    Toggle(usize),
    Delete(usize),
    SkipLink,
    Other,
}

#[derive(Debug)]
pub struct TodoPage {
    doc: Document,
    runtime: FocusRuntime,
    modal: ModalFocusController,
    dynamic: DynamicFocus,
    todos: Vec<Todo>,
    input: NodeId,
    add_button: NodeId,
    list: NodeId,
    open_button: NodeId,
    confirm: NodeId,
    cancel: NodeId,
}

impl TodoPage {
    pub fn build(config: &DemoConfig) -> Result<Self, A11yError> {
        let mut doc = Document::new(&config.url);
        let body = doc.body();

        config.skip_links.render(&mut doc, body)?;

        let header = doc.append_element(body, "header", &[])?;
        let title = doc.append_element(header, "h1", &[])?;
        doc.set_text_content(title, "Todos")?;

        let nav = doc.append_element(body, "nav", &[("id", "navigation"), ("aria-label", "Main")])?;
        for (href, label) in [("/todos", "All"), ("/todos?done", "Completed")] {
            let link = doc.append_element(nav, "a", &[("href", href)])?;
            doc.set_text_content(link, label)?;
        }

        let main = doc.append_element(body, "main", &[("id", "main-content")])?;
        let input = doc.append_element(main, "input", &[
            ("id", "new-todo"),
            ("type", "text"),
            ("aria-label", "New todo"),
        ])?;
        let add_button = doc.append_element(main, "button", &[("id", "add-todo")])?;
        doc.set_text_content(add_button, "Add")?;
        let list = doc.append_element(main, "ul", &[
            ("id", "todo-list"),
            ("aria-label", "Todo list"),
        ])?;
        let open_button = doc.append_element(main, "button", &[("id", "clear-completed")])?;
        doc.set_text_content(open_button, "Clear completed")?;

        let dialog = doc.append_element(body, "div", &[("id", "confirm-dialog"), ("hidden", "")])?;
        let heading = doc.append_element(dialog, "h2", &[("id", "modal-title")])?;
        doc.set_text_content(heading, "Clear completed todos?")?;
        let description = doc.append_element(dialog, "p", &[("id", "modal-description")])?;
        doc.set_text_content(description, "Completed todos will be removed from the list.")?;
        let cancel = doc.append_element(dialog, "button", &[("class", "secondary")])?;
        doc.set_text_content(cancel, "Cancel")?;
        let confirm = doc.append_element(dialog, "button", &[("id", "modal-primary-action")])?;
        doc.set_text_content(confirm, "Clear")?;

        let footer = doc.append_element(body, "footer", &[("id", "footer")])?;
        doc.set_text_content(footer, "Press Tab to move, Escape to dismiss dialogs.")?;

        for landmark in [header, nav, main, footer] {
            let role = doc
                .tree()
                .element(landmark)
                .and_then(|e| skip_link::landmark_role(&e.tag));
            if let Some(role) = role {
                tracing::debug!("landmark {} ({})", describe(&doc, landmark), role.as_str());
            }
        }
        tracing::debug!("focus ring: {}", config.focus_indicator.css());

        Ok(Self {
            doc,
            runtime: FocusRuntime::new(config.announcer.clone()),
            modal: ModalFocusController::new(dialog, config.modal.clone()),
            dynamic: DynamicFocus::new(config.dynamic.clone()),
            todos: Vec::new(),
            input,
            add_button,
            list,
            open_button,
            confirm,
            cancel,
        })
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn runtime(&self) -> &FocusRuntime {
        &self.runtime
    }

    pub fn modal(&self) -> &ModalFocusController {
        &self.modal
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn open_button(&self) -> NodeId {
        self.open_button
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.doc.active_element()
    }

    /// Label of the focused element, for logs
    pub fn focused_label(&self) -> String {
        self.focused()
            .map(|id| describe(&self.doc, id))
            .unwrap_or_else(|| "(nothing)".to_string())
    }

    /// Text currently shown in the live region
    pub fn live_text(&self) -> String {
        self.runtime
            .announcer
            .region()
            .map(|region| self.doc.text_content(region))
            .unwrap_or_default()
    }

    pub fn type_text(&mut self, text: &str) {
        if let Err(e) = self.doc.set_attribute(self.input, "value", text) {
            tracing::warn!("typing failed: {}", e);
        }
    }

    /// Dispatch a keydown to the document
    pub fn press(&mut self, mut event: KeyboardEvent) {
        if self.modal.is_open() {
            let scheduler = &mut self.runtime.scheduler;
            let outcome = self.modal.handle_key_down(&mut self.doc, &mut event, scheduler);
            if let ModalKeyOutcome::Closed(reason) = outcome {
                tracing::info!("dialog dismissed by {:?}", reason);
            }
        }

        if event.is_default_prevented() {
            return;
        }
        if event.is_tab() {
            move_focus(&mut self.doc, !event.shift_key);
        } else if event.key == "Enter" {
            if let Some(target) = self.focused() {
                self.click(target);
            }
        }
    }

    /// Dispatch a click to the document
    pub fn click(&mut self, target: NodeId) {
        if self.modal.is_open() {
            let closed = self
                .modal
                .handle_click(&mut self.doc, target, &mut self.runtime.scheduler);
            if closed.is_some() {
                return;
            }
        }
        self.doc.focus(target);

        match self.control(target) {
            Control::OpenModal => self.open_modal(),
            Control::Confirm => {
                self.close_modal();
                self.clear_completed();
            }
            Control::Cancel => self.close_modal(),
            Control::AddTodo => {
                let text = self
                    .doc
                    .get_attribute(self.input, "value")
                    .unwrap_or_default()
                    .to_string();
                if let Err(e) = self.add_todo(&text) {
                    tracing::warn!("failed to add todo: {}", e);
                }
            }
            Control::Toggle(index) => self.toggle_todo(index),
            Control::Delete(index) => self.delete_todo(index),
            Control::SkipLink => {
                SkipLinks::activate_anchor(&mut self.doc, target);
            }
            Control::Other => {}
        }
    }

    fn control(&self, target: NodeId) -> Control {
        if target == self.open_button {
            return Control::OpenModal;
        }
        if target == self.confirm {
            return Control::Confirm;
        }
        if target == self.cancel {
            return Control::Cancel;
        }
        if target == self.add_button {
            return Control::AddTodo;
        }
        if let Some(index) = self.todos.iter().position(|t| t.toggle == target) {
            return Control::Toggle(index);
        }
        if let Some(index) = self.todos.iter().position(|t| t.delete == target) {
            return Control::Delete(index);
        }
        if self.doc.get_attribute(target, "class") == Some("skip-link") {
            return Control::SkipLink;
        }
        Control::Other
    }

    /// Show the dialog, then signal readiness as the next render would
    pub fn open_modal(&mut self) {
        if self.modal.open(&mut self.doc, &mut self.runtime.scheduler) {
            self.modal.container_ready(&mut self.doc, &self.runtime.traps);
        }
    }

    fn close_modal(&mut self) {
        self.modal
            .close(CloseReason::Dismissed, &mut self.doc, &mut self.runtime.scheduler);
    }

    /// Append a todo; blank text is rejected with an announcement
    pub fn add_todo(&mut self, text: &str) -> Result<Option<NodeId>, A11yError> {
        let text = text.trim();
        if text.is_empty() {
            self.announce("Todo text is empty");
            return Ok(None);
        }

        let item = self.doc.append_element(self.list, "li", &[])?;
        let label = self.doc.append_element(item, "span", &[])?;
        self.doc.set_text_content(label, text)?;
        let toggle = self.doc.append_element(item, "button", &[("aria-pressed", "false")])?;
        self.doc.set_text_content(toggle, "Done")?;
        let delete_label = format!("Delete {}", text);
        let delete = self
            .doc
            .append_element(item, "button", &[("aria-label", &delete_label)])?;
        self.doc.set_text_content(delete, "Delete")?;

        self.todos.push(Todo { text: text.to_string(), done: false, item, toggle, delete });
        self.doc.set_attribute(self.input, "value", "")?;
        self.announce(&format!("Todo added: {}", text));
        Ok(Some(item))
    }

    pub fn toggle_todo(&mut self, index: usize) {
        let Some(todo) = self.todos.get_mut(index) else {
            return;
        };
        todo.done = !todo.done;
        let (toggle, done, text) = (todo.toggle, todo.done, todo.text.clone());

        let pressed = if done { "true" } else { "false" };
        if let Err(e) = self.doc.set_attribute(toggle, "aria-pressed", pressed) {
            tracing::warn!("failed to update toggle: {}", e);
        }
        let state = if done { "completed" } else { "not completed" };
        self.announce(&format!("{} marked {}", text, state));
    }

    pub fn delete_todo(&mut self, index: usize) {
        if index >= self.todos.len() {
            return;
        }
        self.dynamic.store_focus(&self.doc);
        let todo = self.todos.remove(index);
        if let Err(e) = self.doc.remove(todo.item) {
            tracing::warn!("failed to remove todo: {}", e);
        }
        self.after_list_update(&format!("Todo deleted: {}", todo.text));
    }

    fn clear_completed(&mut self) {
        self.dynamic.store_focus(&self.doc);
        let (done, kept): (Vec<Todo>, Vec<Todo>) = self.todos.drain(..).partition(|t| t.done);
        self.todos = kept;
        for todo in &done {
            if let Err(e) = self.doc.remove(todo.item) {
                tracing::warn!("failed to remove todo: {}", e);
            }
        }
        self.after_list_update(&format!("{} completed todos cleared", done.len()));
    }

    fn after_list_update(&mut self, message: &str) {
        // Focused control went away with its item
        let restored = self.dynamic.after_update(&mut self.doc);
        if restored.is_none() && self.doc.active_element() == Some(self.doc.body()) {
            self.doc.focus(self.input);
        }
        self.dynamic.announce_update(
            &mut self.runtime.announcer,
            &mut self.doc,
            &mut self.runtime.scheduler,
            message,
        );
    }

    fn announce(&mut self, message: &str) {
        self.runtime.announce(&mut self.doc, message);
    }

    /// Run the next frame
    pub fn frame(&mut self) -> usize {
        self.runtime.run_frame(&mut self.doc)
    }

    /// Let `delta` pass, running the frame afterwards
    pub fn tick(&mut self, delta: Duration) -> usize {
        let ran = self.runtime.advance(&mut self.doc, delta);
        ran + self.frame()
    }
}

/// Short human-readable label for an element
///
/// The name is the `aria-label`, or else the element's own text nodes;
/// text inside descendant elements is not included.
pub fn describe(doc: &Document, id: NodeId) -> String {
    let Some(element) = doc.tree().element(id) else {
        return format!("{:?}", id);
    };
    let mut label = element.tag.clone();
    if let Some(el_id) = &element.id {
        label.push('#');
        label.push_str(el_id);
    }
    let name = doc
        .get_attribute(id, "aria-label")
        .map(str::to_string)
        .unwrap_or_else(|| {
            doc.tree()
                .children(id)
                .filter_map(|(_, node)| node.as_text())
                .collect()
        });
    if !name.is_empty() {
        label.push_str(&format!(" \"{}\"", name));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> TodoPage {
        TodoPage::build(&DemoConfig::default()).unwrap()
    }

    #[test]
    fn test_first_tab_reaches_skip_link() {
        let mut page = page();
        page.press(KeyboardEvent::tab());
        let focused = page.focused().unwrap();
        assert_eq!(page.document().get_attribute(focused, "href"), Some("#main-content"));
    }

    #[test]
    fn test_skip_link_moves_to_main() {
        let mut page = page();
        page.press(KeyboardEvent::tab());
        page.press(KeyboardEvent::new("Enter"));
        let main = page.document().get_element_by_id("main-content");
        assert!(main.is_some());
        assert_eq!(page.focused(), main);
        assert_eq!(page.focused_label(), "main#main-content");
    }

    #[test]
    fn test_tab_after_skip_link_enters_main() {
        let mut page = page();
        page.press(KeyboardEvent::tab());
        page.press(KeyboardEvent::new("Enter"));
        page.press(KeyboardEvent::tab());
        assert_eq!(page.focused(), Some(page.input()));

        page.press(KeyboardEvent::shift_tab());
        let focused = page.focused().unwrap();
        assert_eq!(page.document().get_attribute(focused, "href"), Some("/todos?done"));
    }

    #[test]
    fn test_describe_uses_own_text() {
        let page = page();
        let doc = page.document();
        assert_eq!(describe(doc, page.add_button), "button#add-todo \"Add\"");
        assert_eq!(describe(doc, page.input()), "input#new-todo \"New todo\"");

        let header = doc.query_selector("header").unwrap();
        assert_eq!(describe(doc, header), "header");
    }

    #[test]
    fn test_add_and_delete_announce() {
        let mut page = page();
        page.type_text("Buy milk");
        page.click(page.add_button);
        assert_eq!(page.todos().len(), 1);
        assert_eq!(page.live_text(), "Todo added: Buy milk");

        let delete = page.todos()[0].delete;
        page.click(delete);
        assert!(page.todos().is_empty());
        assert_eq!(page.focused(), Some(page.input()));
        assert_eq!(page.live_text(), "Todo deleted: Buy milk");

        page.tick(Duration::from_millis(1000));
        assert_eq!(page.live_text(), "");
    }

    #[test]
    fn test_modal_flow_returns_focus() {
        let mut page = page();
        page.add_todo("Write tests").unwrap();
        page.toggle_todo(0);

        page.click(page.open_button());
        assert_eq!(page.focused(), Some(page.confirm));

        page.press(KeyboardEvent::tab());
        assert_eq!(page.focused(), Some(page.cancel));

        page.press(KeyboardEvent::escape());
        assert!(!page.modal().is_open());
        page.frame();
        assert_eq!(page.focused(), Some(page.open_button()));
        assert_eq!(page.todos().len(), 1);
    }

    #[test]
    fn test_confirm_clears_completed() {
        let mut page = page();
        page.add_todo("a").unwrap();
        page.add_todo("b").unwrap();
        page.toggle_todo(1);

        page.click(page.open_button());
        page.click(page.confirm);
        page.frame();

        assert_eq!(page.todos().len(), 1);
        assert_eq!(page.todos()[0].text, "a");
        assert_eq!(page.live_text(), "1 completed todos cleared");
        assert_eq!(page.focused(), Some(page.open_button()));
    }
}
