#![forbid(unsafe_code)]

//! Host that mounts projections into a [`FakeDocument`].
//!
//! Mounted structure, attached to `body`:
//!
//! ```text
//! div.veil-modal                 backdrop
//! └── div.veil-modal-frame       frame handle
//!     ├── button.veil-modal-close
//!     └── div.veil-modal-content content handle
//!         └── #text
//! ```
//!
//! The host re-renders from a state subscription, the same way a UI framework
//! would re-run a component when its state changes.

use std::cell::RefCell;
use std::rc::Rc;

use veil_core::{KeyCode, KeyEvent, Node, NodeRef};
use veil_modal::{
    CloseAffordance, ModalConfig, ModalController, ModalHandle, OpenState, Overlay, Projection,
    Subscription,
};

use crate::document::FakeDocument;

pub const TEXT_TAG: &str = "#text";
const TEXT_ATTR: &str = "data";

struct Mounted {
    backdrop: NodeRef,
    frame: NodeRef,
    close: NodeRef,
    content: NodeRef,
    text: NodeRef,
    affordance: CloseAffordance,
}

struct View {
    text: String,
    mounted: Option<Mounted>,
    renders: usize,
}

pub struct TestHost {
    doc: Rc<FakeDocument>,
    handle: ModalHandle,
    view: Rc<RefCell<View>>,
    _subscription: Subscription,
    controller: Option<ModalController>,
}

impl TestHost {
    pub fn new(doc: &Rc<FakeDocument>, text: impl Into<String>) -> Self {
        Self::with_config(doc, text, ModalConfig::default())
    }

    pub fn with_config(
        doc: &Rc<FakeDocument>,
        text: impl Into<String>,
        config: ModalConfig,
    ) -> Self {
        let controller = ModalController::with_config(doc.environment(), config);
        let handle = controller.handle();
        let view = Rc::new(RefCell::new(View {
            text: text.into(),
            mounted: None,
            renders: 0,
        }));

        let subscription = {
            let doc = Rc::clone(doc);
            let handle = handle.clone();
            let view = Rc::clone(&view);
            controller.subscribe(move |_| render(&doc, &handle, &view))
        };

        render(doc, &handle, &view);
        Self {
            doc: Rc::clone(doc),
            handle,
            view,
            _subscription: subscription,
            controller: Some(controller),
        }
    }

    pub fn document(&self) -> &Rc<FakeDocument> {
        &self.doc
    }

    pub fn handle(&self) -> &ModalHandle {
        &self.handle
    }

    /// `None` after [`teardown`](Self::teardown).
    pub fn controller(&self) -> Option<&ModalController> {
        self.controller.as_ref()
    }

    pub fn state(&self) -> OpenState {
        self.handle.state()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn toggle_or_open(&self) {
        self.handle.toggle_or_open();
    }

    pub fn open(&self) {
        self.handle.open();
    }

    pub fn close(&self) {
        self.handle.close();
    }

    /// Drop the controller, as when the hosting component unmounts.
    pub fn teardown(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.teardown();
        }
    }

    /// Re-render with new caller content.
    pub fn set_text(&self, text: impl Into<String>) {
        self.view.borrow_mut().text = text.into();
        self.render();
    }

    pub fn render(&self) {
        render(&self.doc, &self.handle, &self.view);
    }

    pub fn render_count(&self) -> usize {
        self.view.borrow().renders
    }

    pub fn is_mounted(&self) -> bool {
        self.view.borrow().mounted.is_some()
    }

    pub fn backdrop(&self) -> Option<NodeRef> {
        self.mounted_node(|m| &m.backdrop)
    }

    pub fn frame(&self) -> Option<NodeRef> {
        self.mounted_node(|m| &m.frame)
    }

    pub fn close_button(&self) -> Option<NodeRef> {
        self.mounted_node(|m| &m.close)
    }

    pub fn content(&self) -> Option<NodeRef> {
        self.mounted_node(|m| &m.content)
    }

    /// Text node inside the content region.
    pub fn text_node(&self) -> Option<NodeRef> {
        self.mounted_node(|m| &m.text)
    }

    /// Rendered caller text, if mounted.
    pub fn rendered_text(&self) -> Option<String> {
        self.text_node().and_then(|node| node.attribute(TEXT_ATTR))
    }

    /// Press then activate the close button, like a mouse click.
    ///
    /// Returns `false` if nothing is mounted.
    pub fn click_close(&self) -> bool {
        let Some((node, affordance)) = self.close_parts() else {
            return false;
        };
        self.doc.pointer_down(&node);
        affordance.activate()
    }

    /// Deliver `code` to the close button as if it had focus.
    ///
    /// The key also reaches document listeners first, as it would bubble.
    pub fn press_on_close(&self, code: KeyCode) -> bool {
        let Some((_, affordance)) = self.close_parts() else {
            return false;
        };
        let key = KeyEvent::new(code);
        self.doc.dispatch(key);
        affordance.handle_key(&key)
    }

    fn close_parts(&self) -> Option<(NodeRef, CloseAffordance)> {
        let view = self.view.borrow();
        let mounted = view.mounted.as_ref()?;
        Some((Rc::clone(&mounted.close), mounted.affordance.clone()))
    }

    fn mounted_node(&self, pick: impl Fn(&Mounted) -> &NodeRef) -> Option<NodeRef> {
        self.view.borrow().mounted.as_ref().map(|m| Rc::clone(pick(m)))
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn render(doc: &FakeDocument, handle: &ModalHandle, view: &RefCell<View>) {
    let text = view.borrow().text.clone();
    let projection = handle.project_content(text);
    let mounted = {
        let mut view = view.borrow_mut();
        view.renders += 1;
        match projection {
            Projection::Empty => {
                if let Some(old) = view.mounted.take() {
                    old.backdrop.detach();
                }
                None
            }
            Projection::Overlay(overlay) => match view.mounted.as_mut() {
                Some(existing) => {
                    existing
                        .text
                        .set_attribute(TEXT_ATTR, overlay.content.content.as_str());
                    existing.affordance = overlay.close;
                    None
                }
                None => {
                    let fresh = mount(doc, overlay);
                    let nodes = (Rc::clone(&fresh.frame), Rc::clone(&fresh.content));
                    view.mounted = Some(fresh);
                    Some(nodes)
                }
            },
        }
    };

    // Bind handles after the view borrow ends; attaching content may move focus.
    match mounted {
        Some((frame, content)) => {
            handle.attach_frame(&frame);
            handle.attach_content(&content);
        }
        None if view.borrow().mounted.is_none() => handle.detach_nodes(),
        None => {}
    }
    tracing::trace!(state = ?handle.state(), "host rendered");
}

fn mount(doc: &FakeDocument, overlay: Overlay<String>) -> Mounted {
    let backdrop = element("div", [("class", overlay.backdrop.class.to_owned())]);
    let frame = element("div", overlay.frame.attributes());
    let close = element("button", overlay.close.attributes());
    let content = element("div", overlay.content.attributes());
    let text = Node::new(TEXT_TAG);
    text.set_attribute(TEXT_ATTR, overlay.content.content.as_str());

    content.append_child(&text);
    frame.append_child(&close);
    frame.append_child(&content);
    backdrop.append_child(&frame);
    doc.body().append_child(&backdrop);

    Mounted {
        backdrop,
        frame,
        close,
        content,
        text,
        affordance: overlay.close,
    }
}

fn element(
    tag: &str,
    attributes: impl IntoIterator<Item = (&'static str, String)>,
) -> NodeRef {
    let node = Node::new(tag);
    for (name, value) in attributes {
        node.set_attribute(name, value);
    }
    node
}
