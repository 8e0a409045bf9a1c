//! 文脈記号の前後への義務的挿入

use std::collections::BTreeSet;

use crate::fst::{ClosureKind, Fst};

/// 文脈記号の各出現の直前に `insertion` の言語を挿入するトランスデューサを作成します。
///
/// `sigma` に含まれない記号を含む入力は受理されません。
pub(crate) fn insert_before(context: &BTreeSet<char>, insertion: &Fst, sigma: &BTreeSet<char>) -> Fst {
    let ctx = Fst::symbol_class(context.iter().copied());
    rewrite(context, insertion.insertion().concat(&ctx), sigma)
}

/// 文脈記号の各出現の直後に `insertion` の言語を挿入するトランスデューサを作成します。
pub(crate) fn insert_after(context: &BTreeSet<char>, insertion: &Fst, sigma: &BTreeSet<char>) -> Fst {
    let ctx = Fst::symbol_class(context.iter().copied());
    rewrite(context, ctx.concat(&insertion.insertion()), sigma)
}

fn rewrite(context: &BTreeSet<char>, step: Fst, sigma: &BTreeSet<char>) -> Fst {
    let others = Fst::symbol_class(sigma.iter().copied().filter(|c| !context.contains(c)));
    others.union(&step).closure(ClosureKind::Star).optimize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }

    fn apply(rule: &Fst, input: &str) -> Vec<String> {
        let mut outputs: Vec<_> = Fst::from_pair(input, input)
            .unwrap()
            .compose(rule)
            .paths()
            .unwrap()
            .map(|(_, b)| b)
            .collect();
        outputs.sort();
        outputs
    }

    #[test]
    fn test_insert_before_every_occurrence() {
        let ins = Fst::from_pair("X", "X").unwrap();
        let rule = insert_before(&chars(" $"), &ins, &chars("ab $"));
        assert_eq!(apply(&rule, "ab a$"), vec!["abX aX$"]);
    }

    #[test]
    fn test_insert_after() {
        let ins = Fst::from_pair("(", "(").unwrap();
        let rule = insert_after(&chars("^ "), &ins, &chars("^ab $"));
        assert_eq!(apply(&rule, "^a b$"), vec!["^(a (b$"]);
    }

    #[test]
    fn test_rewrite_rejects_symbols_outside_sigma() {
        let ins = Fst::from_pair("X", "X").unwrap();
        let rule = insert_before(&chars("$"), &ins, &chars("a$"));
        assert!(apply(&rule, "b$").is_empty());
    }

    #[test]
    fn test_insert_language() {
        let ins = Fst::from_pairs([("x", "x"), ("y", "y")]).unwrap();
        let rule = insert_before(&chars("$"), &ins, &chars("a$"));
        assert_eq!(apply(&rule, "a$"), vec!["ax$", "ay$"]);
    }
}
