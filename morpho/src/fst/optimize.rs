//! 正規化: イプシロン除去・刈り込み・決定化・最小化
//!
//! 決定化と最小化は、遷移の入力・出力ラベルの組を1つの記号とみなした
//! アクセプタとして行います。これにより関数的でないトランスデューサも扱えます。

use std::collections::{BTreeMap, BTreeSet};

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::fst::{Fst, Label, State, StateId, StateTable, Transition};

impl Fst {
    /// 両側イプシロンの遷移を取り除き、刈り込んだトランスデューサを返します。
    pub fn rm_epsilon(&self) -> Fst {
        let Some(start) = self.start else {
            return Fst::empty();
        };
        let mut states = Vec::with_capacity(self.num_states());
        for s in self.states() {
            let closure = self.epsilon_closure(s);
            let mut arcs = vec![];
            let mut is_final = false;
            for q in closure.ones() {
                let q = q as StateId;
                is_final |= self.is_final(q);
                arcs.extend(self.arcs(q).iter().filter(|a| !a.is_epsilon()));
            }
            arcs.sort_unstable();
            arcs.dedup();
            states.push(State { arcs, is_final });
        }
        Fst {
            states,
            start: Some(start),
        }
        .trim()
    }

    fn epsilon_closure(&self, state: StateId) -> FixedBitSet {
        let mut closure = FixedBitSet::with_capacity(self.num_states());
        let mut stack = vec![state];
        while let Some(s) = stack.pop() {
            if closure.put(s as usize) {
                continue;
            }
            for a in self.arcs(s) {
                if a.is_epsilon() && !closure.contains(a.nextstate as usize) {
                    stack.push(a.nextstate);
                }
            }
        }
        closure
    }

    /// 開始状態から到達でき、かつ最終状態へ到達できる状態だけを残します。
    pub fn trim(&self) -> Fst {
        let Some(start) = self.start else {
            return Fst::empty();
        };
        let n = self.num_states();

        let mut accessible = FixedBitSet::with_capacity(n);
        let mut stack = vec![start];
        while let Some(s) = stack.pop() {
            if accessible.put(s as usize) {
                continue;
            }
            stack.extend(self.arcs(s).iter().map(|a| a.nextstate));
        }

        let mut reverse: Vec<Vec<StateId>> = vec![vec![]; n];
        for s in self.states() {
            for a in self.arcs(s) {
                reverse[a.nextstate as usize].push(s);
            }
        }
        let mut coaccessible = FixedBitSet::with_capacity(n);
        let mut stack: Vec<StateId> = self.states().filter(|&s| self.is_final(s)).collect();
        while let Some(s) = stack.pop() {
            if coaccessible.put(s as usize) {
                continue;
            }
            stack.extend(reverse[s as usize].iter().copied());
        }

        accessible.intersect_with(&coaccessible);
        if !accessible.contains(start as usize) {
            return Fst::empty();
        }

        let mut mapping: Vec<Option<StateId>> = vec![None; n];
        let mut fst = Fst::empty();
        for s in accessible.ones() {
            mapping[s] = Some(fst.add_state());
        }
        for s in accessible.ones() {
            let Some(src) = mapping[s] else { continue };
            let state = &self.states[s];
            fst.set_final(src, state.is_final);
            for a in &state.arcs {
                if let Some(dst) = mapping[a.nextstate as usize] {
                    fst.add_arc(src, Transition::new(a.ilabel, a.olabel, dst));
                }
            }
        }
        fst.start = mapping[start as usize];
        fst
    }

    /// 部分集合構成法により、符号化ラベルについて決定的なトランスデューサを作成します。
    pub fn determinize(&self) -> Fst {
        let nfa = self.rm_epsilon();
        let Some(start) = nfa.start else {
            return Fst::empty();
        };

        let mut subsets: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
        let mut dfa = Fst::empty();
        let initial = dfa.add_state();
        dfa.set_start(initial);
        dfa.set_final(initial, nfa.is_final(start));
        subsets.insert(vec![start], initial);
        let mut worklist = vec![vec![start]];

        while let Some(subset) = worklist.pop() {
            let src = subsets[&subset];
            let mut moves: BTreeMap<(Label, Label), BTreeSet<StateId>> = BTreeMap::new();
            for &q in &subset {
                for a in nfa.arcs(q) {
                    moves.entry(a.pair()).or_default().insert(a.nextstate);
                }
            }
            for ((ilabel, olabel), targets) in moves {
                let key: Vec<StateId> = targets.into_iter().collect();
                let dst = match subsets.get(&key) {
                    Some(&dst) => dst,
                    None => {
                        let dst = dfa.add_state();
                        dfa.set_final(dst, key.iter().any(|&q| nfa.is_final(q)));
                        subsets.insert(key.clone(), dst);
                        worklist.push(key);
                        dst
                    }
                };
                dfa.add_arc(src, Transition::new(ilabel, olabel, dst));
            }
        }
        dfa
    }

    /// 決定的なトランスデューサを分割の細分化によって最小化します。
    ///
    /// 入力は [`Fst::determinize`] の結果（刈り込み済み）である必要があります。
    fn minimize_deterministic(&self) -> Fst {
        let Some(start) = self.start else {
            return Fst::empty();
        };
        let n = self.num_states();
        let mut class: Vec<u32> = self.states().map(|s| u32::from(self.is_final(s))).collect();
        let mut num_classes = class.iter().copied().collect::<BTreeSet<_>>().len();

        loop {
            let mut signatures: HashMap<(u32, Vec<(Label, Label, u32)>), u32> = HashMap::new();
            let mut next = vec![0; n];
            for s in self.states() {
                let mut sig: Vec<_> = self
                    .arcs(s)
                    .iter()
                    .map(|a| (a.ilabel, a.olabel, class[a.nextstate as usize]))
                    .collect();
                sig.sort_unstable();
                let fresh = signatures.len() as u32;
                next[s as usize] = *signatures.entry((class[s as usize], sig)).or_insert(fresh);
            }
            class = next;
            if signatures.len() == num_classes {
                break;
            }
            num_classes = signatures.len();
        }

        let mut representatives: Vec<Option<StateId>> = vec![None; num_classes];
        for s in self.states() {
            representatives[class[s as usize] as usize].get_or_insert(s);
        }

        let mut fst = Fst::empty();
        let mut table = StateTable::new();
        let start_class = class[start as usize];
        let new_start = table.intern(&mut fst, start_class, self.is_final(start));
        fst.set_start(new_start);
        while let Some((c, src)) = table.pop() {
            let Some(rep) = representatives[c as usize] else { continue };
            let mut arcs = self.arcs(rep).to_vec();
            arcs.sort_unstable();
            for a in arcs {
                let target = class[a.nextstate as usize];
                let dst = table.intern(&mut fst, target, self.is_final(a.nextstate));
                fst.add_arc(src, Transition::new(a.ilabel, a.olabel, dst));
            }
        }
        fst
    }

    /// 決定化したうえで最小化します。
    pub fn minimize(&self) -> Fst {
        self.determinize().minimize_deterministic()
    }

    /// イプシロン除去・決定化・最小化をまとめて行い、最小の正準形を返します。
    ///
    /// 同じ組の集合を表し、同じ整列で構成されたトランスデューサは、
    /// この操作の後で同じ形になります。
    pub fn optimize(&self) -> Fst {
        let fst = self.minimize();
        log::trace!(
            "optimize: {} states / {} arcs -> {} states / {} arcs",
            self.num_states(),
            self.num_arcs(),
            fst.num_states(),
            fst.num_arcs(),
        );
        fst
    }

    /// 何も受理しないかどうか
    pub fn is_empty(&self) -> bool {
        self.trim().start.is_none()
    }
}
