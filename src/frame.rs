//! The host template expansion interface.

use super::Result;

/// An evaluation context which can turn an unevaluated argument node into its
/// final text.
///
/// This is implemented by the host’s template expander. Any error it returns
/// should be wrapped in [`Error::Expand`](crate::Error::Expand).
pub trait Frame {
    /// The host’s unevaluated node type.
    type Node;

    /// Expands the given node into text.
    ///
    /// The returned value includes any leading and trailing whitespace present
    /// in the original text.
    fn expand(&self, node: &Self::Node) -> Result<String>;
}

impl<F: Frame + ?Sized> Frame for &F {
    type Node = F::Node;

    fn expand(&self, node: &Self::Node) -> Result<String> {
        (**self).expand(node)
    }
}

/// A frame whose nodes are already plain text.
///
/// Useful for arguments coming from places where there is nothing left to
/// expand, like tag attributes or script calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verbatim;

impl Frame for Verbatim {
    type Node = String;

    fn expand(&self, node: &String) -> Result<String> {
        Ok(node.clone())
    }
}
