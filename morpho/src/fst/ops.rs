//! 有理演算（和・連接・閉包）と射影・逆・直積

use crate::fst::{Fst, Side, StateId, StateTable, Transition, EPSILON};

/// クリーネ閉包の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureKind {
    /// 0回以上の繰り返し
    Star,
    /// 1回以上の繰り返し
    Plus,
}

impl Fst {
    /// 和: どちらかが受理する組を受理します。
    pub fn union(&self, other: &Fst) -> Fst {
        let (Some(a_start), Some(b_start)) = (self.start, other.start) else {
            return if self.start.is_some() {
                self.clone()
            } else {
                other.clone()
            };
        };
        let mut fst = Fst::empty();
        let start = fst.add_state();
        fst.set_start(start);
        let a = fst.append(self);
        let b = fst.append(other);
        fst.add_arc(start, Transition::new(EPSILON, EPSILON, a_start + a));
        fst.add_arc(start, Transition::new(EPSILON, EPSILON, b_start + b));
        fst
    }

    /// 連接: `{(t1 + t2, b1 + b2)}` を受理します。
    pub fn concat(&self, other: &Fst) -> Fst {
        let (Some(a_start), Some(b_start)) = (self.start, other.start) else {
            return Fst::empty();
        };
        let mut fst = Fst::empty();
        let a = fst.append(self);
        let b = fst.append(other);
        fst.set_start(a_start + a);
        for s in self.states() {
            if self.is_final(s) {
                fst.set_final(s + a, false);
                fst.add_arc(s + a, Transition::new(EPSILON, EPSILON, b_start + b));
            }
        }
        fst
    }

    /// クリーネ閉包
    pub fn closure(&self, kind: ClosureKind) -> Fst {
        let mut fst = Fst::empty();
        let start = fst.add_state();
        fst.set_start(start);
        fst.set_final(start, kind == ClosureKind::Star);
        let Some(inner_start) = self.start else {
            return fst;
        };
        let offset = fst.append(self);
        fst.add_arc(start, Transition::new(EPSILON, EPSILON, inner_start + offset));
        for s in self.states() {
            if self.is_final(s) {
                fst.add_arc(s + offset, Transition::new(EPSILON, EPSILON, inner_start + offset));
            }
        }
        fst
    }

    /// 射影: 選ばれなかった側のテープを捨て、アクセプタにします。
    pub fn project(&self, side: Side) -> Fst {
        self.map_arcs(|a| match side {
            Side::Top => Transition::new(a.ilabel, a.ilabel, a.nextstate),
            Side::Bottom => Transition::new(a.olabel, a.olabel, a.nextstate),
        })
    }

    /// 逆: 上下のテープを入れ替えます。
    pub fn invert(&self) -> Fst {
        self.map_arcs(|a| Transition::new(a.olabel, a.ilabel, a.nextstate))
    }

    /// 上側を空文字列に固定し、自身の言語を下側に出力するトランスデューサ（`ε × L`）
    pub fn insertion(&self) -> Fst {
        self.map_arcs(|a| Transition::new(EPSILON, a.olabel, a.nextstate))
    }

    /// 直積: 上側言語が `self`、下側言語が `other` であるトランスデューサを作成します。
    ///
    /// 上下は同期して1文字ずつ読み進め、一方が終わった後は残りをイプシロンと対応させます。
    /// これは [`Fst::from_pairs`] と同じ正準整列になります。
    pub fn cross(&self, other: &Fst) -> Fst {
        let a = self.project(Side::Top).rm_epsilon();
        let b = other.project(Side::Bottom).rm_epsilon();
        let (Some(a_start), Some(b_start)) = (a.start, b.start) else {
            return Fst::empty();
        };

        const BOTH: u8 = 0;
        const TOP_ONLY: u8 = 1;
        const BOTTOM_ONLY: u8 = 2;

        let mut fst = Fst::empty();
        let mut table = StateTable::new();
        let is_final = |(qa, qb, _): (StateId, StateId, u8)| a.is_final(qa) && b.is_final(qb);

        let key = (a_start, b_start, BOTH);
        let start = table.intern(&mut fst, key, is_final(key));
        fst.set_start(start);

        while let Some(((qa, qb, phase), src)) = table.pop() {
            if phase == BOTH {
                for x in a.arcs(qa) {
                    for y in b.arcs(qb) {
                        let key = (x.nextstate, y.nextstate, BOTH);
                        let dst = table.intern(&mut fst, key, is_final(key));
                        fst.add_arc(src, Transition::new(x.ilabel, y.olabel, dst));
                    }
                }
            }
            if phase == TOP_ONLY || (phase == BOTH && b.is_final(qb)) {
                for x in a.arcs(qa) {
                    let key = (x.nextstate, qb, TOP_ONLY);
                    let dst = table.intern(&mut fst, key, is_final(key));
                    fst.add_arc(src, Transition::new(x.ilabel, EPSILON, dst));
                }
            }
            if phase == BOTTOM_ONLY || (phase == BOTH && a.is_final(qa)) {
                for y in b.arcs(qb) {
                    let key = (qa, y.nextstate, BOTTOM_ONLY);
                    let dst = table.intern(&mut fst, key, is_final(key));
                    fst.add_arc(src, Transition::new(EPSILON, y.olabel, dst));
                }
            }
        }
        fst.trim()
    }
}
