//! Data containers shared between views.
//!
//! - [`DataBag`]: Ordered key/value storage for slots, inherited and shared data
//! - [`ExceptionBag`]: Render failures captured during a request
//!
//! Views created by one factory hold the same [`SharedBag`] and
//! [`SharedExceptions`], so writes through any of them are visible to all.

mod data;
mod exception;

use std::cell::RefCell;
use std::rc::Rc;

pub use data::DataBag;
pub use exception::ExceptionBag;

use crate::view::Slot;

/// Request-wide data visible to every view of a factory.
pub type SharedBag = Rc<RefCell<DataBag<Slot>>>;

/// Request-wide failure log.
pub type SharedExceptions = Rc<RefCell<ExceptionBag>>;
