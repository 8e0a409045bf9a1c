//! 有限状態トランスデューサのエンジン
//!
//! このモジュールは、文字列の組の集合（関係）を表す重みなし有限状態トランスデューサを
//! 提供します。ラベルはUnicodeスカラー値で、`0` はイプシロンとして予約されています。
//! そのため、入力文字列に `\0` を含めることはできません。
//!
//! 上位の [`Relation`](crate::relation::Relation) が集合としての意味論を与え、
//! このモジュールは構築・有理演算・合成・正規化・列挙といった原始操作のみを扱います。

mod compose;
mod ops;
mod optimize;
mod paths;
pub(crate) mod rewrite;

use std::collections::BTreeSet;
use std::hash::Hash;

use hashbrown::HashMap;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{MorphoError, Result};

pub use crate::fst::ops::ClosureKind;
pub use crate::fst::paths::Paths;

/// 状態ID
pub type StateId = u32;

/// 遷移ラベル。文字のスカラー値か [`EPSILON`] です。
pub type Label = u32;

/// イプシロン（空）ラベル
pub const EPSILON: Label = 0;

/// 関係の片側（テープ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// 上側（入力）テープ
    Top,
    /// 下側（出力）テープ
    Bottom,
}

impl std::str::FromStr for Side {
    type Err = MorphoError;

    fn from_str(side: &str) -> Result<Self> {
        match side {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(MorphoError::invalid_argument(
                "side",
                format!("expected \"top\" or \"bottom\", got {side:?}"),
            )),
        }
    }
}

/// 遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
pub struct Transition {
    pub ilabel: Label,
    pub olabel: Label,
    pub nextstate: StateId,
}

impl Transition {
    #[inline(always)]
    pub const fn new(ilabel: Label, olabel: Label, nextstate: StateId) -> Self {
        Self {
            ilabel,
            olabel,
            nextstate,
        }
    }

    /// 両側ともイプシロンかどうか
    #[inline(always)]
    pub const fn is_epsilon(&self) -> bool {
        self.ilabel == EPSILON && self.olabel == EPSILON
    }

    /// 符号化されたラベル（入力・出力ラベルの組）
    #[inline(always)]
    pub const fn pair(&self) -> (Label, Label) {
        (self.ilabel, self.olabel)
    }
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
pub(crate) struct State {
    pub(crate) arcs: Vec<Transition>,
    pub(crate) is_final: bool,
}

/// 重みなし有限状態トランスデューサ
///
/// 開始状態を持たないトランスデューサは空の関係を表します。
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
pub struct Fst {
    states: Vec<State>,
    start: Option<StateId>,
}

impl Fst {
    /// 何も受理しない空のトランスデューサを作成します。
    pub fn empty() -> Self {
        Self::default()
    }

    /// 空文字列の組 `("", "")` のみを受理するトランスデューサを作成します。
    pub fn epsilon() -> Self {
        let mut fst = Self::empty();
        let s = fst.add_state();
        fst.set_start(s);
        fst.set_final(s, true);
        fst
    }

    /// 文字列の組のイテレータからトランスデューサを構築します。
    ///
    /// 各組は正準的に整列されます。すなわち共通の長さまでは1文字ずつ対応させ、
    /// 長い側の残りはイプシロンと対応させます。組はプレフィックス木として共有されるため、
    /// 結果は符号化ラベルについて決定的です。
    ///
    /// # エラー
    ///
    /// いずれかの文字列が `\0` を含む場合、[`MorphoError::Encoding`] を返します。
    pub fn from_pairs<I, T, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, B)>,
        T: AsRef<str>,
        B: AsRef<str>,
    {
        let mut fst = Self::empty();
        let start = fst.add_state();
        fst.set_start(start);
        for (top, bottom) in pairs {
            let labels = align(top.as_ref(), bottom.as_ref())?;
            let mut state = start;
            for (ilabel, olabel) in labels {
                let found = fst.states[state as usize]
                    .arcs
                    .iter()
                    .find(|a| a.ilabel == ilabel && a.olabel == olabel)
                    .map(|a| a.nextstate);
                state = match found {
                    Some(next) => next,
                    None => {
                        let next = fst.add_state();
                        fst.add_arc(state, Transition::new(ilabel, olabel, next));
                        next
                    }
                };
            }
            fst.set_final(state, true);
        }
        Ok(fst)
    }

    /// 1つの組 `(top, bottom)` のみを受理するトランスデューサを作成します。
    pub fn from_pair(top: &str, bottom: &str) -> Result<Self> {
        Self::from_pairs([(top, bottom)])
    }

    /// 記号集合のいずれか1文字を受理するアクセプタを作成します。
    pub fn symbol_class<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        let mut fst = Self::empty();
        let start = fst.add_state();
        let end = fst.add_state();
        fst.set_start(start);
        fst.set_final(end, true);
        let symbols: BTreeSet<char> = symbols.into_iter().filter(|&c| c != '\0').collect();
        for c in symbols {
            let l = label(c);
            fst.add_arc(start, Transition::new(l, l, end));
        }
        fst
    }

    /// 新しい状態を追加し、そのIDを返します。
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(State::default());
        id
    }

    /// 開始状態を設定します。
    #[inline(always)]
    pub fn set_start(&mut self, state: StateId) {
        self.start = Some(state);
    }

    /// 最終状態かどうかを設定します。
    #[inline(always)]
    pub fn set_final(&mut self, state: StateId, is_final: bool) {
        self.states[state as usize].is_final = is_final;
    }

    /// 遷移を追加します。
    #[inline(always)]
    pub fn add_arc(&mut self, state: StateId, arc: Transition) {
        self.states[state as usize].arcs.push(arc);
    }

    #[inline(always)]
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    #[inline(always)]
    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state as usize].is_final
    }

    #[inline(always)]
    pub fn arcs(&self, state: StateId) -> &[Transition] {
        &self.states[state as usize].arcs
    }

    #[inline(always)]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    /// 状態IDのイテレータ
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.states.len() as StateId
    }

    /// 遷移で使われている記号（イプシロンを除く）の集合を返します。
    pub fn sigma(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|s| s.arcs.iter())
            .flat_map(|a| [a.ilabel, a.olabel])
            .filter_map(symbol)
            .collect()
    }

    /// 開始状態とすべての遷移先が範囲内にあるかどうか
    pub(crate) fn is_well_formed(&self) -> bool {
        let n = self.states.len();
        self.start.map_or(true, |s| (s as usize) < n)
            && self
                .states
                .iter()
                .flat_map(|s| s.arcs.iter())
                .all(|a| (a.nextstate as usize) < n)
    }

    /// 他のトランスデューサの状態をすべて複製して追加し、そのオフセットを返します。
    pub(crate) fn append(&mut self, other: &Fst) -> StateId {
        let offset = self.states.len() as StateId;
        for state in &other.states {
            self.states.push(State {
                arcs: state
                    .arcs
                    .iter()
                    .map(|a| Transition::new(a.ilabel, a.olabel, a.nextstate + offset))
                    .collect(),
                is_final: state.is_final,
            });
        }
        offset
    }

    /// 状態ごとに遷移を変換した新しいトランスデューサを作成します。
    pub(crate) fn map_arcs<F>(&self, mut f: F) -> Fst
    where
        F: FnMut(&Transition) -> Transition,
    {
        Fst {
            states: self
                .states
                .iter()
                .map(|s| State {
                    arcs: s.arcs.iter().map(&mut f).collect(),
                    is_final: s.is_final,
                })
                .collect(),
            start: self.start,
        }
    }
}

/// 積構成などで、組になった状態を新しいトランスデューサの状態に対応付ける表
///
/// 新しく登録された状態は作業キューに積まれます。
pub(crate) struct StateTable<K> {
    ids: HashMap<K, StateId>,
    queue: Vec<(K, StateId)>,
}

impl<K> StateTable<K>
where
    K: Hash + Eq + Copy,
{
    pub(crate) fn new() -> Self {
        Self {
            ids: HashMap::new(),
            queue: vec![],
        }
    }

    /// `key` に対応する状態を返します。未登録なら作成してキューに積みます。
    pub(crate) fn intern(&mut self, fst: &mut Fst, key: K, is_final: bool) -> StateId {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = fst.add_state();
        fst.set_final(id, is_final);
        self.ids.insert(key, id);
        self.queue.push((key, id));
        id
    }

    pub(crate) fn pop(&mut self) -> Option<(K, StateId)> {
        self.queue.pop()
    }
}

/// 文字をラベルに変換します。
#[inline(always)]
pub fn label(c: char) -> Label {
    c as Label
}

/// ラベルを文字に変換します。イプシロンの場合は `None` を返します。
#[inline(always)]
pub fn symbol(l: Label) -> Option<char> {
    if l == EPSILON {
        None
    } else {
        char::from_u32(l)
    }
}

/// 予約済みのイプシロン文字が含まれていないか検査します。
pub(crate) fn check_sentinel(s: &str) -> Result<()> {
    if s.contains('\0') {
        return Err(MorphoError::encoding(
            "string",
            format!("{s:?} contains the reserved null symbol"),
        ));
    }
    Ok(())
}

/// 組を正準的なラベル列に整列します。
fn align(top: &str, bottom: &str) -> Result<Vec<(Label, Label)>> {
    check_sentinel(top)?;
    check_sentinel(bottom)?;
    let mut t = top.chars();
    let mut b = bottom.chars();
    let mut labels = vec![];
    loop {
        match (t.next(), b.next()) {
            (None, None) => break,
            (x, y) => labels.push((x.map_or(EPSILON, label), y.map_or(EPSILON, label))),
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_pads_shorter_side() {
        let labels = align("abc", "x").unwrap();
        assert_eq!(
            labels,
            vec![
                (label('a'), label('x')),
                (label('b'), EPSILON),
                (label('c'), EPSILON)
            ]
        );
    }

    #[test]
    fn test_from_pairs_shares_prefixes() {
        let fst = Fst::from_pairs([("ab", "ab"), ("ac", "ac")]).unwrap();
        // root -a-> n1 -b-> n2, n1 -c-> n3
        assert_eq!(fst.num_states(), 4);
        assert_eq!(fst.num_arcs(), 3);
    }

    #[test]
    fn test_from_pairs_rejects_null() {
        let err = Fst::from_pair("a\0", "a").unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("top".parse::<Side>().unwrap(), Side::Top);
        assert_eq!("bottom".parse::<Side>().unwrap(), Side::Bottom);
        assert!("both".parse::<Side>().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_sigma() {
        let fst = Fst::from_pairs([("ab", "c")]).unwrap();
        assert_eq!(fst.sigma(), ['a', 'b', 'c'].into_iter().collect());
    }
}
