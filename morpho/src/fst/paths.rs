//! パスの列挙（全列挙・最短・ランダム）と巡回判定

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, HashSet};
use rand::Rng;

use crate::errors::{MorphoError, Result};
use crate::fst::{symbol, Fst, Label, StateId};

impl Fst {
    /// 無限個のパスを持つかどうかを返します。
    ///
    /// イプシロン除去と刈り込みの後に閉路が残っているかで判定します。
    pub fn is_cyclic(&self) -> bool {
        let fst = self.rm_epsilon();
        let Some(start) = fst.start else {
            return false;
        };
        let n = fst.num_states();
        let mut visited = FixedBitSet::with_capacity(n);
        let mut on_stack = FixedBitSet::with_capacity(n);
        let mut stack: Vec<(StateId, usize)> = vec![(start, 0)];
        visited.insert(start as usize);
        on_stack.insert(start as usize);
        while let Some((s, i)) = stack.last_mut() {
            let arcs = fst.arcs(*s);
            if *i == arcs.len() {
                on_stack.set(*s as usize, false);
                stack.pop();
                continue;
            }
            let next = arcs[*i].nextstate;
            *i += 1;
            if on_stack.contains(next as usize) {
                return true;
            }
            if !visited.put(next as usize) {
                on_stack.insert(next as usize);
                stack.push((next, 0));
            }
        }
        false
    }

    /// 受理するすべての組を遅延的に列挙するイテレータを返します。
    ///
    /// 同じ組が複数のパスで受理される場合も、一度だけ返されます。
    ///
    /// # エラー
    ///
    /// 巡回している場合、[`MorphoError::CyclicLanguage`] を返します。
    pub fn paths(&self) -> Result<Paths> {
        if self.is_cyclic() {
            return Err(MorphoError::CyclicLanguage);
        }
        Ok(Paths::new(self.rm_epsilon()))
    }

    /// 各状態から最も近い最終状態までの遷移数を求めます。
    ///
    /// 最終状態に到達できない状態は `usize::MAX` になります。
    fn distances_to_final(&self) -> Vec<usize> {
        let n = self.num_states();
        let mut reverse: Vec<Vec<StateId>> = vec![vec![]; n];
        for s in self.states() {
            for a in self.arcs(s) {
                reverse[a.nextstate as usize].push(s);
            }
        }
        let mut dist = vec![usize::MAX; n];
        let mut queue = VecDeque::new();
        for s in self.states().filter(|&s| self.is_final(s)) {
            dist[s as usize] = 0;
            queue.push_back(s);
        }
        while let Some(s) = queue.pop_front() {
            let d = dist[s as usize] + 1;
            for &p in &reverse[s as usize] {
                if dist[p as usize] == usize::MAX {
                    dist[p as usize] = d;
                    queue.push_back(p);
                }
            }
        }
        dist
    }

    /// パスの長さ（遷移数）が短い順に、最大 `n` 個の組を返します。
    ///
    /// 同じ長さの組は `(上側, 下側)` の辞書順に並びます。巡回していても停止します。
    ///
    /// 最終状態までの距離を推定値とする最良優先探索で、取り出した節点は必ず
    /// 受理されるパスの途中にあります。
    pub fn shortest_paths(&self, n: usize) -> Vec<(String, String)> {
        let fst = self.rm_epsilon();
        let mut results = vec![];
        let Some(start) = fst.start else {
            return results;
        };
        if n == 0 {
            return results;
        }
        let dist = fst.distances_to_final();

        let mut heap = BinaryHeap::new();
        let mut best: HashMap<(StateId, String, String), usize> = HashMap::new();
        let mut emitted = HashSet::new();
        heap.push(Reverse(SearchNode {
            cost: dist[start as usize],
            top: String::new(),
            bottom: String::new(),
            state: Some(start),
        }));

        while let Some(Reverse(node)) = heap.pop() {
            let Some(s) = node.state else {
                let pair = (node.top, node.bottom);
                if emitted.insert(pair.clone()) {
                    results.push(pair);
                    if results.len() == n {
                        break;
                    }
                }
                continue;
            };
            let len = node.cost - dist[s as usize];
            if fst.is_final(s) {
                heap.push(Reverse(SearchNode {
                    cost: len,
                    top: node.top.clone(),
                    bottom: node.bottom.clone(),
                    state: None,
                }));
            }
            for a in fst.arcs(s) {
                let d = dist[a.nextstate as usize];
                if d == usize::MAX {
                    continue;
                }
                let mut top = node.top.clone();
                top.extend(symbol(a.ilabel));
                let mut bottom = node.bottom.clone();
                bottom.extend(symbol(a.olabel));
                let cost = len + 1 + d;
                let key = (a.nextstate, top.clone(), bottom.clone());
                if best.get(&key).is_some_and(|&c| c <= cost) {
                    continue;
                }
                best.insert(key, cost);
                heap.push(Reverse(SearchNode {
                    cost,
                    top,
                    bottom,
                    state: Some(a.nextstate),
                }));
            }
        }
        results
    }

    /// ランダムウォークにより最大 `npath` 個の組を生成します。
    ///
    /// 各状態では、出ていく遷移と（最終状態なら）停止を一様に選びます。
    /// `max_len` を超える長さのウォークは捨てられるため、返る組は `npath` より少ない場合があります。
    pub fn rand_paths<R>(&self, npath: usize, max_len: usize, rng: &mut R) -> Vec<(String, String)>
    where
        R: Rng,
    {
        let fst = self.rm_epsilon();
        let mut results = vec![];
        let Some(start) = fst.start else {
            return results;
        };
        'walk: for _ in 0..npath {
            let mut state = start;
            let mut top = vec![];
            let mut bottom = vec![];
            loop {
                let arcs = fst.arcs(state);
                let choices = arcs.len() + usize::from(fst.is_final(state));
                if choices == 0 {
                    continue 'walk;
                }
                let r = rng.gen_range(0..choices);
                if r == arcs.len() {
                    break;
                }
                top.push(arcs[r].ilabel);
                bottom.push(arcs[r].olabel);
                state = arcs[r].nextstate;
                if top.len() > max_len {
                    continue 'walk;
                }
            }
            results.push((to_string(&top), to_string(&bottom)));
        }
        results
    }
}

/// 探索の節点。`state` が `None` の節点は受理された組を表します。
///
/// `(cost, top, bottom)` の順で比較されるため、同じ長さの組は辞書順に取り出されます。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchNode {
    cost: usize,
    top: String,
    bottom: String,
    state: Option<StateId>,
}

fn to_string(labels: &[Label]) -> String {
    labels.iter().copied().filter_map(symbol).collect()
}

#[derive(Debug)]
struct Frame {
    state: StateId,
    next_arc: usize,
    visited: bool,
}

/// 非巡回トランスデューサの組を深さ優先で列挙するイテレータ
///
/// [`Fst::paths`] により作成されます。
#[derive(Debug)]
pub struct Paths {
    fst: Fst,
    stack: Vec<Frame>,
    top: Vec<Label>,
    bottom: Vec<Label>,
    seen: HashSet<(String, String)>,
}

impl Paths {
    fn new(fst: Fst) -> Self {
        let stack = fst
            .start
            .map(|state| Frame {
                state,
                next_arc: 0,
                visited: false,
            })
            .into_iter()
            .collect();
        Self {
            fst,
            stack,
            top: vec![],
            bottom: vec![],
            seen: HashSet::new(),
        }
    }
}

impl Iterator for Paths {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if !frame.visited {
                frame.visited = true;
                if self.fst.is_final(frame.state) {
                    let pair = (to_string(&self.top), to_string(&self.bottom));
                    if self.seen.insert(pair.clone()) {
                        return Some(pair);
                    }
                }
                continue;
            }
            let arcs = self.fst.arcs(frame.state);
            if let Some(&arc) = arcs.get(frame.next_arc) {
                frame.next_arc += 1;
                self.top.push(arc.ilabel);
                self.bottom.push(arc.olabel);
                self.stack.push(Frame {
                    state: arc.nextstate,
                    next_arc: 0,
                    visited: false,
                });
            } else {
                self.stack.pop();
                if !self.stack.is_empty() {
                    self.top.pop();
                    self.bottom.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::fst::ClosureKind;

    #[test]
    fn test_paths_deduplicates() {
        let a = Fst::from_pairs([("a", "b")]).unwrap();
        let fst = a.union(&a);
        let paths: Vec<_> = fst.paths().unwrap().collect();
        assert_eq!(paths, vec![("a".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_paths_of_empty() {
        assert_eq!(Fst::empty().paths().unwrap().count(), 0);
        let paths: Vec<_> = Fst::epsilon().paths().unwrap().collect();
        assert_eq!(paths, vec![(String::new(), String::new())]);
    }

    #[test]
    fn test_cyclic_rejects_unbounded_enumeration() {
        let a = Fst::from_pairs([("a", "a")]).unwrap();
        let star = a.closure(ClosureKind::Star);
        assert!(star.is_cyclic());
        assert!(star.paths().unwrap_err().is_cyclic_language());
        assert!(!a.is_cyclic());
    }

    #[test]
    fn test_epsilon_loop_is_not_cyclic() {
        let star = Fst::epsilon().closure(ClosureKind::Star);
        assert!(!star.is_cyclic());
        assert_eq!(star.paths().unwrap().count(), 1);
    }

    #[test]
    fn test_shortest_paths_order() {
        let fst = Fst::from_pairs([("bb", "bb"), ("a", "a"), ("c", "c"), ("aaa", "aaa")]).unwrap();
        let tops: Vec<_> = fst.shortest_paths(3).into_iter().map(|(t, _)| t).collect();
        assert_eq!(tops, vec!["a", "c", "bb"]);
    }

    #[test]
    fn test_shortest_paths_with_long_tail_after_star() {
        let letters = Fst::symbol_class('a'..='z').closure(ClosureKind::Star);
        let fst = letters.concat(&Fst::from_pair("0123456789", "0123456789").unwrap());
        let paths = fst.shortest_paths(3);
        assert_eq!(
            paths,
            vec![
                ("0123456789".to_string(), "0123456789".to_string()),
                ("a0123456789".to_string(), "a0123456789".to_string()),
                ("b0123456789".to_string(), "b0123456789".to_string()),
            ]
        );
    }

    #[test]
    fn test_shortest_paths_merges_alignments() {
        // ("ab", "b") が2通りの整列で受理される
        let a = Fst::from_pair("ab", "b").unwrap();
        let b = Fst::from_pair("a", "").unwrap().concat(&Fst::from_pair("b", "b").unwrap());
        let paths = a.union(&b).shortest_paths(5);
        assert_eq!(paths, vec![("ab".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_rand_paths_are_members() {
        let fst = Fst::from_pairs([("a", "x"), ("b", "y")]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let paths = fst.rand_paths(20, 10, &mut rng);
        assert_eq!(paths.len(), 20);
        for (t, b) in paths {
            assert!((t == "a" && b == "x") || (t == "b" && b == "y"));
        }
    }
}
