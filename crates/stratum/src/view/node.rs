use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use stratum_engine::RenderError;

use super::{Context, Slot, ViewId, ViewInterface};

/// Shared handle to a view stored in another view's slot.
///
/// Cloning the handle does not clone the view: every clone points at the same
/// view, which is how one child can be nested, wrapped and rendered while the
/// caller keeps mutating it.
///
/// A view that is already being rendered cannot be borrowed again. Rendering
/// such a node fails with [`RenderError::Recursion`] instead of panicking.
#[derive(Clone)]
pub struct ViewNode {
    id: ViewId,
    view: Rc<RefCell<dyn ViewInterface>>,
}

impl ViewNode {
    pub fn new<V: ViewInterface + 'static>(view: V) -> Self {
        Self {
            id: view.id(),
            view: Rc::new(RefCell::new(view)),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Borrows the view.
    ///
    /// # Panics
    ///
    /// Panics if the view is currently borrowed mutably (e.g. mid-render).
    pub fn borrow(&self) -> Ref<'_, dyn ViewInterface> {
        self.view.borrow()
    }

    /// Mutably borrows the view.
    ///
    /// # Panics
    ///
    /// Panics if the view is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn ViewInterface> {
        self.view.borrow_mut()
    }

    /// Whether both handles point at the same view.
    pub fn ptr_eq(&self, other: &ViewNode) -> bool {
        Rc::ptr_eq(&self.view, &other.view)
    }

    pub fn render(&self, context: Context) -> Result<String, RenderError> {
        match self.view.try_borrow_mut() {
            Ok(mut view) => view.render(context),
            Err(_) => Err(RenderError::Recursion(self.id.to_string())),
        }
    }

    /// Merges `context` into the view's own slots.
    pub fn with(&self, context: Context) -> &Self {
        self.borrow_mut().with(context);
        self
    }

    /// Nests `child` under `key`, see [`ViewInterface::nest`].
    pub fn nest(&self, child: ViewNode, key: &str) -> &Self {
        self.borrow_mut().nest(child, key);
        self
    }

    pub fn get(&self, key: &str) -> Option<Slot> {
        self.borrow().get(key)
    }

    pub fn set(&self, key: &str, value: impl Into<Slot>) {
        self.borrow_mut().set(key, value.into());
    }

    /// Stores this view at `outer[key]` and returns `outer`.
    pub fn wrap(&self, outer: ViewNode, key: &str) -> ViewNode {
        outer.set(key, self.clone());
        outer
    }

    /// Expanded data, or `null` while the view is being rendered.
    pub fn to_array(&self) -> serde_json::Value {
        match self.view.try_borrow() {
            Ok(view) => view.to_array(),
            Err(_) => serde_json::Value::Null,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.view
            .try_borrow()
            .map(|view| view.is_collection())
            .unwrap_or(false)
    }

    /// Appends `child` if this node is a collection. Returns whether it did.
    pub(crate) fn append(&self, child: &ViewNode) -> bool {
        let Ok(mut view) = self.view.try_borrow_mut() else {
            return false;
        };
        match view.as_collection_mut() {
            Some(collection) => {
                collection.push(child.clone());
                true
            }
            None => false,
        }
    }

    /// Applies `inherit` unless the view is busy rendering.
    pub(crate) fn try_inherit(&self, context: Context) {
        self.try_apply_mut(|view| {
            view.inherit(context);
        });
    }

    /// Runs `read` on the view, or returns `None` while it is mutably borrowed.
    pub(crate) fn try_apply<R>(&self, read: impl FnOnce(&dyn ViewInterface) -> R) -> Option<R> {
        self.view.try_borrow().ok().map(|view| read(&*view))
    }

    /// Runs `write` on the view, or returns `None` while it is borrowed.
    pub(crate) fn try_apply_mut<R>(
        &self,
        write: impl FnOnce(&mut dyn ViewInterface) -> R,
    ) -> Option<R> {
        self.view
            .try_borrow_mut()
            .ok()
            .map(|mut view| write(&mut *view))
    }
}

/// Renders the view with an empty context; failures display as empty output.
impl fmt::Display for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Context::new()).unwrap_or_default())
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view.try_borrow() {
            Ok(view) => write!(f, "{}({})", view.kind(), self.id),
            Err(_) => write!(f, "ViewNode({})", self.id),
        }
    }
}
