//! 積構成による合成・共通部分・差

use crate::fst::{Fst, StateId, StateTable, Transition, EPSILON};

impl Fst {
    /// 合成: `self` の下側と `other` の上側を突き合わせ、
    /// `{(x, z) | (x, y) ∈ self, (y, z) ∈ other}` を受理するトランスデューサを作成します。
    ///
    /// 結果は刈り込みのみ行われ、最小化はされません。
    pub fn compose(&self, other: &Fst) -> Fst {
        let a = self.rm_epsilon();
        let b = other.rm_epsilon();
        let (Some(a_start), Some(b_start)) = (a.start, b.start) else {
            return Fst::empty();
        };

        let mut fst = Fst::empty();
        let mut table = StateTable::new();
        let is_final = |(qa, qb): (StateId, StateId)| a.is_final(qa) && b.is_final(qb);
        let start = table.intern(&mut fst, (a_start, b_start), is_final((a_start, b_start)));
        fst.set_start(start);

        while let Some(((qa, qb), src)) = table.pop() {
            for x in a.arcs(qa) {
                if x.olabel == EPSILON {
                    let key = (x.nextstate, qb);
                    let dst = table.intern(&mut fst, key, is_final(key));
                    fst.add_arc(src, Transition::new(x.ilabel, EPSILON, dst));
                    continue;
                }
                for y in b.arcs(qb).iter().filter(|y| y.ilabel == x.olabel) {
                    let key = (x.nextstate, y.nextstate);
                    let dst = table.intern(&mut fst, key, is_final(key));
                    fst.add_arc(src, Transition::new(x.ilabel, y.olabel, dst));
                }
            }
            for y in b.arcs(qb).iter().filter(|y| y.ilabel == EPSILON) {
                let key = (qa, y.nextstate);
                let dst = table.intern(&mut fst, key, is_final(key));
                fst.add_arc(src, Transition::new(EPSILON, y.olabel, dst));
            }
        }
        fst.trim()
    }

    /// 共通部分: 符号化ラベルを同期して読み、両方が受理する組を受理します。
    pub fn intersect(&self, other: &Fst) -> Fst {
        let a = self.rm_epsilon();
        let b = other.rm_epsilon();
        let (Some(a_start), Some(b_start)) = (a.start, b.start) else {
            return Fst::empty();
        };

        let mut fst = Fst::empty();
        let mut table = StateTable::new();
        let is_final = |(qa, qb): (StateId, StateId)| a.is_final(qa) && b.is_final(qb);
        let start = table.intern(&mut fst, (a_start, b_start), is_final((a_start, b_start)));
        fst.set_start(start);

        while let Some(((qa, qb), src)) = table.pop() {
            for x in a.arcs(qa) {
                for y in b.arcs(qb).iter().filter(|y| y.pair() == x.pair()) {
                    let key = (x.nextstate, y.nextstate);
                    let dst = table.intern(&mut fst, key, is_final(key));
                    fst.add_arc(src, Transition::new(x.ilabel, x.olabel, dst));
                }
            }
        }
        fst.trim()
    }

    /// 差: `self` が受理し `other` が受理しない組を受理します。
    ///
    /// `other` は決定化されてから使われるため、任意のトランスデューサを指定できます。
    pub fn difference(&self, other: &Fst) -> Fst {
        let a = self.rm_epsilon();
        let b = other.determinize();
        let Some(a_start) = a.start else {
            return Fst::empty();
        };

        let mut fst = Fst::empty();
        let mut table = StateTable::new();
        let is_final = |(qa, qb): (StateId, Option<StateId>)| {
            a.is_final(qa) && !qb.is_some_and(|qb| b.is_final(qb))
        };
        let key = (a_start, b.start);
        let start = table.intern(&mut fst, key, is_final(key));
        fst.set_start(start);

        while let Some(((qa, qb), src)) = table.pop() {
            for x in a.arcs(qa) {
                let next_b = qb.and_then(|qb| {
                    b.arcs(qb)
                        .iter()
                        .find(|y| y.pair() == x.pair())
                        .map(|y| y.nextstate)
                });
                let key = (x.nextstate, next_b);
                let dst = table.intern(&mut fst, key, is_final(key));
                fst.add_arc(src, Transition::new(x.ilabel, x.olabel, dst));
            }
        }
        fst.trim()
    }

    /// 2つのトランスデューサが同じ組の集合を（同じ整列で）受理するかどうか
    pub fn equivalent(&self, other: &Fst) -> bool {
        self.difference(other).is_empty() && other.difference(self).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_paths(fst: &Fst) -> Vec<(String, String)> {
        let mut paths: Vec<_> = fst.paths().unwrap().collect();
        paths.sort();
        paths
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|&(t, b)| (t.to_string(), b.to_string())).collect()
    }

    #[test]
    fn test_compose_chains_relations() {
        let a = Fst::from_pairs([("cat", "cats"), ("dog", "dogs")]).unwrap();
        let b = Fst::from_pairs([("cats", "CATS")]).unwrap();
        assert_eq!(sorted_paths(&a.compose(&b)), pairs(&[("cat", "CATS")]));
    }

    #[test]
    fn test_compose_with_length_change() {
        let a = Fst::from_pairs([("a", "xyz")]).unwrap();
        let b = Fst::from_pairs([("xyz", "q")]).unwrap();
        assert_eq!(sorted_paths(&a.compose(&b)), pairs(&[("a", "q")]));
    }

    #[test]
    fn test_compose_disjoint_is_empty() {
        let a = Fst::from_pairs([("a", "b")]).unwrap();
        let b = Fst::from_pairs([("c", "d")]).unwrap();
        assert!(a.compose(&b).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Fst::from_pairs([("a", "a"), ("b", "b")]).unwrap();
        let b = Fst::from_pairs([("b", "b"), ("c", "c")]).unwrap();
        assert_eq!(sorted_paths(&a.intersect(&b)), pairs(&[("b", "b")]));
    }

    #[test]
    fn test_difference() {
        let a = Fst::from_pairs([("a", "x"), ("a", "y")]).unwrap();
        let b = Fst::from_pairs([("a", "y")]).unwrap();
        assert_eq!(sorted_paths(&a.difference(&b)), pairs(&[("a", "x")]));
        assert!(b.difference(&a).is_empty());
    }

    #[test]
    fn test_equivalent_ignores_construction_order() {
        let a = Fst::from_pairs([("ab", "c"), ("d", "e")]).unwrap();
        let b = Fst::from_pairs([("d", "e")])
            .unwrap()
            .union(&Fst::from_pairs([("ab", "c")]).unwrap());
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&Fst::from_pairs([("d", "e")]).unwrap()));
    }
}
