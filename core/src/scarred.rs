//! Lazily explored, lazily healed nodes for [`Zipper`](crate::Zipper).
//!
//! A scar is either *untouched* (it stands for an original node; its
//! children are explored on demand and healing returns the node itself) or
//! *rebuilt* (its children were fixed when it was created, because
//! something below it was edited). Healing a rebuilt scar rebuilds the node
//! from its healed children, once; the result is memoised.

use core::cell::OnceCell;

use crate::arena::fill_exact;
use crate::identity::Identity;
use crate::rewriter::Rewriter;
use crate::{Rc, Vec};

pub(crate) struct Scarred<T>(Rc<Inner<T>>);

struct Inner<T> {
    node: T,
    rebuilt: bool,
    children: OnceCell<Vec<Scarred<T>>>,
    healed: OnceCell<T>,
}

impl<T> Clone for Scarred<T> {
    fn clone(&self) -> Self {
        Scarred(self.0.clone())
    }
}

impl<T> Identity for Scarred<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone + Identity> Scarred<T> {
    pub(crate) fn untouched(node: T) -> Self {
        Scarred(Rc::new(Inner {
            node,
            rebuilt: false,
            children: OnceCell::new(),
            healed: OnceCell::new(),
        }))
    }

    /// A scar for `original` with its children replaced by `children`.
    pub(crate) fn rebuilt(original: T, children: Vec<Scarred<T>>) -> Self {
        Scarred(Rc::new(Inner {
            node: original,
            rebuilt: true,
            children: OnceCell::from(children),
            healed: OnceCell::new(),
        }))
    }

    pub(crate) fn original(&self) -> &T {
        &self.0.node
    }

    pub(crate) fn is_untouched(&self) -> bool {
        !self.0.rebuilt
    }

    pub(crate) fn children<R>(&self, rewriter: &R) -> &[Scarred<T>]
    where
        R: Rewriter<T> + ?Sized,
    {
        self.0.children.get_or_init(|| {
            let node = &self.0.node;
            let count = rewriter.count_children(node);
            let mut originals = Vec::with_capacity(count);
            fill_exact(&mut originals, count, |sink| rewriter.get_children(node, sink));
            originals.into_iter().map(Scarred::untouched).collect()
        })
    }

    /// The node this scar stands for, with every edit below it applied.
    ///
    /// Subtrees without edits come back as the original nodes.
    pub(crate) fn heal<R>(&self, rewriter: &R) -> T
    where
        R: Rewriter<T> + ?Sized,
    {
        if !self.0.rebuilt {
            return self.0.node.clone();
        }
        self.0
            .healed
            .get_or_init(|| {
                let node = &self.0.node;
                let children = self.children(rewriter);
                let count = rewriter.count_children(node);
                debug_assert_eq!(
                    children.len(),
                    count,
                    "rebuilt scar has a different number of children than its original node"
                );

                let mut originals = Vec::with_capacity(count);
                fill_exact(&mut originals, count, |sink| rewriter.get_children(node, sink));
                let healed: Vec<T> = children.iter().map(|child| child.heal(rewriter)).collect();
                let changed = healed
                    .iter()
                    .zip(&originals)
                    .any(|(new, old)| !new.is_same(old));

                if changed {
                    tracing::trace!(children = healed.len(), "Scarred: healing rebuilt node");
                    rewriter.set_children(node, &healed)
                } else {
                    node.clone()
                }
            })
            .clone()
    }
}
