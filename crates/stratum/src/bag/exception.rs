//! Render failures captured instead of propagated.

use stratum_engine::RenderError;

/// An ordered log of render failures.
///
/// A view that fails to render records the error here and contributes an
/// empty string, so one broken partial does not blank the whole page. The bag
/// is shared by every view created from the same factory and can be inspected
/// after the response is rendered.
#[derive(Debug, Default)]
pub struct ExceptionBag {
    errors: Vec<RenderError>,
}

impl ExceptionBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured error.
    pub fn add(&mut self, error: RenderError) {
        self.errors.push(error);
    }

    /// Returns the captured errors, oldest first.
    pub fn all(&self) -> &[RenderError] {
        &self.errors
    }

    /// Removes and returns the most recent error.
    pub fn pop(&mut self) -> Option<RenderError> {
        self.errors.pop()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Alias for [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderError> {
        self.errors.iter()
    }
}

impl<'a> IntoIterator for &'a ExceptionBag {
    type Item = &'a RenderError;
    type IntoIter = std::slice::Iter<'a, RenderError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(msg: &str) -> RenderError {
        RenderError::TemplateError(msg.to_string())
    }

    #[test]
    fn test_add_and_pop() {
        let mut bag = ExceptionBag::new();
        bag.add(error("first"));
        bag.add(error("second"));
        assert_eq!(bag.count(), 2);

        let last = bag.pop().unwrap();
        assert_eq!(last.to_string(), "template error: second");
        assert_eq!(bag.all().len(), 1);
        assert_eq!(bag.all()[0].to_string(), "template error: first");
    }

    #[test]
    fn test_pop_empty() {
        let mut bag = ExceptionBag::new();
        assert!(bag.pop().is_none());
    }

    #[test]
    fn test_clear() {
        let mut bag = ExceptionBag::new();
        bag.add(error("x"));
        bag.clear();
        assert!(bag.is_empty());
        assert!(bag.all().is_empty());
    }

    #[test]
    fn test_iter_in_order() {
        let mut bag = ExceptionBag::new();
        bag.add(error("a"));
        bag.add(RenderError::Recursion("#1".into()));

        let messages: Vec<String> = bag.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["template error: a", "view #1 is nested inside itself"]
        );
        assert_eq!((&bag).into_iter().count(), 2);
    }
}
