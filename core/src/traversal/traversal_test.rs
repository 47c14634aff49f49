use crate::test_utils::{Expr, ExprRewriter, add, call, eval, init_test_logging, label, lit, neg};
use crate::{Identity, Rc, RewriterExt, String, Vec, format, vec};
use pretty_assertions::assert_eq;

/// Deterministic pseudo-random trees of mixed arity.
struct TreeGen {
    state: u64,
}

impl TreeGen {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 33) % bound
    }

    fn tree(&mut self, depth: u32) -> Rc<Expr> {
        if depth == 0 {
            return lit(self.below(10) as i64);
        }
        match self.below(4) {
            0 => lit(self.below(10) as i64),
            1 => neg(self.tree(depth - 1)),
            2 => add(self.tree(depth - 1), self.tree(depth - 1)),
            _ => {
                let arity = self.below(5);
                let args = (0..arity).map(|_| self.tree(depth - 1)).collect();
                call("f", args)
            }
        }
    }
}

fn samples() -> Vec<Rc<Expr>> {
    let mut generator = TreeGen::new(7);
    (0..20).map(|i| generator.tree(i % 6)).collect()
}

fn labels(nodes: impl IntoIterator<Item = Rc<Expr>>) -> Vec<String> {
    nodes.into_iter().map(|node| label(&node)).collect()
}

#[test]
fn test_lazy_enumerations_match_eager_ones() {
    init_test_logging();
    let rewriter = ExprRewriter;
    for tree in samples() {
        assert_eq!(
            labels(rewriter.self_and_descendants_lazily(&tree)),
            labels(rewriter.self_and_descendants(&tree))
        );
        assert_eq!(
            labels(rewriter.descendants_and_self_lazily(&tree)),
            labels(rewriter.descendants_and_self(&tree))
        );
        assert_eq!(
            labels(rewriter.self_and_descendants_breadth_first_lazily(&tree)),
            labels(rewriter.self_and_descendants_breadth_first(&tree))
        );
    }
}

#[test]
fn test_every_enumeration_visits_each_node_once() {
    let rewriter = ExprRewriter;
    for tree in samples() {
        let size = rewriter.fold(&tree, |_, kids: &[usize]| 1 + kids.iter().sum::<usize>());
        assert_eq!(rewriter.self_and_descendants(&tree).len(), size);
        assert_eq!(rewriter.descendants_and_self(&tree).len(), size);
        assert_eq!(rewriter.self_and_descendants_breadth_first(&tree).len(), size);
        assert_eq!(rewriter.self_and_descendants_in_context(&tree).len(), size);
        assert_eq!(rewriter.self_and_descendants_in_context_breadth_first(&tree).len(), size);
    }
}

#[test]
fn test_rewrite_to_literal_agrees_with_fold() {
    let rewriter = ExprRewriter;
    for tree in samples() {
        let folded = rewriter.fold(&tree, eval);
        let rewritten = rewriter.rewrite(&tree, |node| {
            let kids: Vec<i64> = rewriter
                .children(&node)
                .iter()
                .map(|kid| match **kid {
                    Expr::Lit(n) => n,
                    _ => unreachable!("children are already literals"),
                })
                .collect();
            lit(eval(&node, &kids))
        });
        assert_eq!(rewritten, lit(folded));
    }
}

#[test]
fn test_contexts_follow_their_enumeration_order() {
    let rewriter = ExprRewriter;
    for tree in samples() {
        let eager = rewriter.self_and_descendants_in_context(&tree);
        let nodes: Vec<_> = eager.iter().map(|(node, _)| node.clone()).collect();
        assert_eq!(labels(nodes), labels(rewriter.self_and_descendants(&tree)));

        let lazy: Vec<_> = rewriter
            .self_and_descendants_in_context_lazily(&tree)
            .map(|(node, _)| node)
            .collect();
        assert_eq!(labels(lazy), labels(rewriter.self_and_descendants(&tree)));

        let post: Vec<_> = rewriter
            .descendants_and_self_in_context(&tree)
            .into_iter()
            .map(|(node, _)| node)
            .collect();
        assert_eq!(labels(post), labels(rewriter.descendants_and_self(&tree)));

        let breadth: Vec<_> = rewriter
            .self_and_descendants_in_context_breadth_first(&tree)
            .into_iter()
            .map(|(node, _)| node)
            .collect();
        assert_eq!(labels(breadth), labels(rewriter.self_and_descendants_breadth_first(&tree)));
    }
}

#[test]
fn test_context_replacement_matches_path_replacement() {
    let rewriter = ExprRewriter;
    for tree in samples() {
        for (node, context) in rewriter.self_and_descendants_in_context(&tree) {
            let marker = call(&format!("at{}", context.depth()), vec![node.clone()]);
            let by_context = context.replace(marker.clone());

            let mut cursor = rewriter.cursor(tree.clone());
            assert!(cursor.search_down_and_right(|candidate| candidate.is_same(&node)));
            cursor.set_focus(marker);
            assert_eq!(by_context, cursor.into_top());
        }
    }
}

#[test]
fn test_deep_and_wide_trees() {
    let rewriter = ExprRewriter;
    let mut deep = lit(1);
    for _ in 0..1000 {
        deep = neg(deep);
    }
    assert_eq!(rewriter.fold(&deep, eval), 1);
    assert_eq!(rewriter.self_and_descendants_lazily(&deep).count(), 1001);
    assert_eq!(rewriter.self_and_descendants_breadth_first_lazily(&deep).count(), 1001);

    let wide = call("f", (0..2000).map(lit).collect());
    assert_eq!(rewriter.fold(&wide, eval), (0..2000).sum::<i64>());
    let bumped = rewriter.rewrite(&wide, |node| match &*node {
        Expr::Lit(n) => lit(n + 1),
        _ => node,
    });
    assert_eq!(rewriter.fold(&bumped, eval), (1..2001).sum::<i64>());
}

#[test]
fn test_panicking_callbacks_release_arena_regions() {
    use crate::arena::pool::pooled_regions;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    let rewriter = ExprRewriter;
    let tree = add(neg(lit(1)), call("f", vec![lit(2), lit(3), lit(4)]));

    let folded = catch_unwind(AssertUnwindSafe(|| {
        rewriter.fold(&tree, |node, kids| {
            if **node == Expr::Lit(3) {
                panic!("cannot fold 3");
            }
            eval(node, kids)
        })
    }));
    assert!(folded.is_err());
    // The child buffer region and the value stack.
    let parked = pooled_regions();
    assert_eq!(parked, 2);

    let rewritten = catch_unwind(AssertUnwindSafe(|| {
        rewriter.rewrite(&tree, |node| {
            if *node == Expr::Lit(4) {
                panic!("cannot rewrite 4");
            }
            node
        })
    }));
    assert!(rewritten.is_err());
    assert_eq!(pooled_regions(), parked);

    assert_eq!(rewriter.fold(&tree, eval), 8);
    assert!(pooled_regions() >= parked);
}
