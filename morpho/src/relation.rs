//! 文字列の組の集合としての有限状態関係
//!
//! [`Relation`] は有限状態トランスデューサを包み、文字列の組の集合（または写像）と
//! 同じ振る舞いをする集合演算を提供します。すべての演算は新しい値を返し、
//! 内部のトランスデューサを変更しません。そのため、複製は共有（エイリアス）で行われます。
//!
//! # 例
//!
//! ```
//! use morpho::Relation;
//!
//! let a = Relation::from_strings(["cat", "dog"])?;
//! let b = Relation::from_strings(["dog", "eel"])?;
//! assert_eq!(&a | &b, Relation::from_strings(["cat", "dog", "eel"])?);
//! assert_eq!(&a & &b, Relation::acceptor("dog")?);
//! assert!(a.contains("cat")?);
//!
//! let plural = Relation::from_pairs([("cat", "cats"), ("dog", "dogs")])?;
//! assert_eq!(plural.get("dog")?, Some("dogs".to_string()));
//! # Ok::<(), morpho::errors::MorphoError>(())
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{Read, Write};
use std::ops::{Add, BitAnd, BitOr, BitXor, Sub};
use std::sync::Arc;

use rand::Rng;

use crate::errors::{MorphoError, Result};
use crate::fst::{ClosureKind, Fst, Paths, Side};
use crate::utils;

/// 直列化された関係のマジックナンバー
pub const RELATION_MAGIC: &[u8] = b"MorphoRelation 0.1\n";

/// 文字列の組 `(上側, 下側)` の集合
///
/// 上側と下側が常に等しい関係はアクセプタ（文字列の集合）です。
#[derive(Clone)]
pub struct Relation {
    fst: Arc<Fst>,
}

/// [`Relation`] に変換できる型
///
/// 文字列は自身への恒等写像、文字列の列はその和、組の列や写像はトランスデューサに変換されます。
/// 二項演算の `*_all` 系メソッドは、この変換を通して異なる型の引数を受け付けます。
pub trait IntoRelation {
    /// # エラー
    ///
    /// 文字列が予約記号 `\0` を含む場合、[`MorphoError::Encoding`] を返します。
    fn into_relation(self) -> Result<Relation>;
}

impl IntoRelation for Relation {
    fn into_relation(self) -> Result<Relation> {
        Ok(self)
    }
}

impl IntoRelation for &Relation {
    fn into_relation(self) -> Result<Relation> {
        Ok(self.clone())
    }
}

impl IntoRelation for Fst {
    fn into_relation(self) -> Result<Relation> {
        Ok(Relation::from_fst(self))
    }
}

impl IntoRelation for &str {
    fn into_relation(self) -> Result<Relation> {
        Relation::acceptor(self)
    }
}

impl IntoRelation for String {
    fn into_relation(self) -> Result<Relation> {
        Relation::acceptor(&self)
    }
}

impl IntoRelation for &String {
    fn into_relation(self) -> Result<Relation> {
        Relation::acceptor(self)
    }
}

macro_rules! impl_into_relation_for_strings {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoRelation for $ty {
                fn into_relation(self) -> Result<Relation> {
                    Relation::from_strings(self)
                }
            }
        )*
    };
}

macro_rules! impl_into_relation_for_pairs {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoRelation for $ty {
                fn into_relation(self) -> Result<Relation> {
                    Relation::from_pairs(self)
                }
            }
        )*
    };
}

impl_into_relation_for_strings!(Vec<&str>, Vec<String>, &[&str], &[String], BTreeSet<String>);
impl_into_relation_for_pairs!(
    Vec<(&str, &str)>,
    Vec<(String, String)>,
    BTreeMap<String, String>,
    BTreeMap<&str, &str>,
    std::collections::HashMap<String, String>,
    std::collections::HashMap<&str, &str>,
);

impl<const N: usize> IntoRelation for [&str; N] {
    fn into_relation(self) -> Result<Relation> {
        Relation::from_strings(self)
    }
}

impl<const N: usize> IntoRelation for [(&str, &str); N] {
    fn into_relation(self) -> Result<Relation> {
        Relation::from_pairs(self)
    }
}

/// パスのイテレータ
///
/// [`Relation::path_iterator`] により作成されます。
#[derive(Debug)]
pub enum PathIter {
    /// すべてのパスを遅延的に列挙します。
    Lazy(Paths),
    /// 最短のパスから順に、上限個まで列挙します。
    Bounded(std::vec::IntoIter<(String, String)>),
}

impl Iterator for PathIter {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Lazy(paths) => paths.next(),
            Self::Bounded(paths) => paths.next(),
        }
    }
}

impl Relation {
    /// 任意の変換可能な値から関係を作成します。
    pub fn new<T>(item: T) -> Result<Self>
    where
        T: IntoRelation,
    {
        item.into_relation()
    }

    /// トランスデューサをそのまま包みます。
    pub fn from_fst(fst: Fst) -> Self {
        Self { fst: Arc::new(fst) }
    }

    /// 空の関係
    pub fn empty() -> Self {
        Self::from_fst(Fst::empty())
    }

    /// 空文字列の組 `("", "")` のみからなる関係
    pub fn epsilon() -> Self {
        Self::from_fst(Fst::epsilon())
    }

    /// 文字列 `s` のみを受理するアクセプタ
    pub fn acceptor(s: &str) -> Result<Self> {
        Self::from_pairs([(s, s)])
    }

    /// 文字列の集合を受理するアクセプタ
    pub fn from_strings<I, S>(strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pairs: Vec<_> = strings
            .into_iter()
            .map(|s| (s.as_ref().to_string(), s.as_ref().to_string()))
            .collect();
        Self::from_pairs(pairs)
    }

    /// 組の集合を受理するトランスデューサ
    ///
    /// # エラー
    ///
    /// 文字列が予約記号 `\0` を含む場合、[`MorphoError::Encoding`] を返します。
    pub fn from_pairs<I, T, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, B)>,
        T: AsRef<str>,
        B: AsRef<str>,
    {
        Ok(Self::from_fst(Fst::from_pairs(pairs)?.optimize()))
    }

    /// 1つの組 `(top, bottom)` のみを受理するトランスデューサ
    pub fn from_pair(top: &str, bottom: &str) -> Result<Self> {
        Self::from_pairs([(top, bottom)])
    }

    /// 記号集合のいずれか1文字を受理するアクセプタ
    pub fn symbol_class<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self::from_fst(Fst::symbol_class(symbols))
    }

    /// 内部のトランスデューサ
    #[inline(always)]
    pub fn fst(&self) -> &Fst {
        &self.fst
    }

    /// 正準形（最小化済み）に変換した関係を返します。
    pub fn optimized(&self) -> Self {
        Self::from_fst(self.fst.optimize())
    }

    /// 和
    pub fn union(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.union(&other.fst).optimize())
    }

    /// 共通部分
    pub fn intersection(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.intersect(&other.fst).optimize())
    }

    /// 差
    pub fn difference(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.difference(&other.fst).optimize())
    }

    /// 対称差 `(self - other) | (other - self)`
    pub fn symmetric_difference(&self, other: &Relation) -> Relation {
        self.difference(other).union(&other.difference(self))
    }

    /// 複数の値との和。各値は [`IntoRelation`] により変換されます。
    pub fn union_all<I, T>(&self, others: I) -> Result<Relation>
    where
        I: IntoIterator<Item = T>,
        T: IntoRelation,
    {
        let mut fst = (*self.fst).clone();
        for other in others {
            fst = fst.union(&other.into_relation()?.fst);
        }
        Ok(Self::from_fst(fst.optimize()))
    }

    /// 複数の値との共通部分
    pub fn intersection_all<I, T>(&self, others: I) -> Result<Relation>
    where
        I: IntoIterator<Item = T>,
        T: IntoRelation,
    {
        others
            .into_iter()
            .try_fold(self.clone(), |acc, other| -> Result<Relation> {
                Ok(acc.intersection(&other.into_relation()?))
            })
    }

    /// 複数の値との差
    pub fn difference_all<I, T>(&self, others: I) -> Result<Relation>
    where
        I: IntoIterator<Item = T>,
        T: IntoRelation,
    {
        others
            .into_iter()
            .try_fold(self.clone(), |acc, other| -> Result<Relation> {
                Ok(acc.difference(&other.into_relation()?))
            })
    }

    /// 連接 `{(t1 + t2, b1 + b2)}`
    pub fn concatenate(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.concat(&other.fst).optimize())
    }

    /// 直積: 上側言語が `self` の上側、下側言語が `other` の下側であるトランスデューサ
    pub fn cross(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.cross(&other.fst).optimize())
    }

    /// 合成 `{(t, b) | ∃m. (t, m) ∈ self, (m, b) ∈ other}`
    ///
    /// 結果は刈り込みのみ行われます。
    pub fn compose(&self, other: &Relation) -> Relation {
        Self::from_fst(self.fst.compose(&other.fst))
    }

    /// クリーネ閉包（0回以上）
    pub fn star(&self) -> Relation {
        Self::from_fst(self.fst.closure(ClosureKind::Star).optimize())
    }

    /// クリーネ閉包（1回以上）
    pub fn plus(&self) -> Relation {
        Self::from_fst(self.fst.closure(ClosureKind::Plus).optimize())
    }

    /// 射影: 指定した側の言語のアクセプタ
    pub fn project(&self, side: Side) -> Relation {
        Self::from_fst(self.fst.project(side).optimize())
    }

    /// 逆: 上下を入れ替えた関係
    pub fn invert(&self) -> Relation {
        Self::from_fst(self.fst.invert())
    }

    /// 上側の言語（キーの集合）
    pub fn keyset(&self) -> Relation {
        self.project(Side::Top)
    }

    /// 下側の言語（値の集合）
    pub fn valueset(&self) -> Relation {
        self.project(Side::Bottom)
    }

    /// 左優先の和
    ///
    /// `self` のキー（上側）に対しては `other` の組が追加されません。
    /// すなわち `self | ((other.keyset() - self.keyset()) @ other)` です。
    pub fn priority_union(&self, other: &Relation) -> Relation {
        let keys = other.keyset().difference(&self.keyset());
        self.union(&keys.compose(other))
    }

    /// 複数の値との左優先の和。前にある値ほど優先されます。
    pub fn priority_union_all<I, T>(&self, others: I) -> Result<Relation>
    where
        I: IntoIterator<Item = T>,
        T: IntoRelation,
    {
        others
            .into_iter()
            .try_fold(self.clone(), |acc, other| -> Result<Relation> {
                Ok(acc.priority_union(&other.into_relation()?))
            })
    }

    /// 印字可能なASCII文字の上での補集合（アクセプタとして）
    pub fn complement(&self) -> Relation {
        self.complement_over(' '..='~')
    }

    /// 指定した記号集合の上での補集合 `Σ* - self`
    pub fn complement_over<I>(&self, sigma: I) -> Relation
    where
        I: IntoIterator<Item = char>,
    {
        Self::symbol_class(sigma).star().difference(self)
    }

    /// 使用されている記号の集合を、1文字のアクセプタとして返します。
    pub fn sigma(&self) -> Relation {
        Self::symbol_class(self.fst.sigma())
    }

    /// 指定した側が `item` のいずれかの文字列を受理するかどうか
    pub fn accepts<T>(&self, item: T, side: Side) -> Result<bool>
    where
        T: IntoRelation,
    {
        let item = item.into_relation()?.keyset();
        let product = match side {
            Side::Top => item.compose(self),
            Side::Bottom => self.compose(&item),
        };
        Ok(product.has_paths())
    }

    /// 上側が `item` を受理するかどうか（`accepts(item, Side::Top)`）
    pub fn contains<T>(&self, item: T) -> Result<bool>
    where
        T: IntoRelation,
    {
        self.accepts(item, Side::Top)
    }

    /// キーの集合に対応する値の集合 `{v | ∃k ∈ keys. (k, v) ∈ self}`
    pub fn query<T>(&self, keys: T) -> Result<Relation>
    where
        T: IntoRelation,
    {
        Ok(keys.into_relation()?.keyset().compose(self).valueset())
    }

    /// キーに対応する値を1つ返します。値が複数ある場合は最短・辞書順で最初のものです。
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.query(key)?.fst.shortest_paths(1).into_iter().next().map(|(v, _)| v))
    }

    /// 組を列挙します。
    ///
    /// # 引数
    ///
    /// * `limit` - `Some(n)` の場合、最短の `n` 個の組を決定的な順序で返します。
    ///
    /// # エラー
    ///
    /// `limit` が `None` で関係が巡回している場合、[`MorphoError::CyclicLanguage`] を返します。
    pub fn path_iterator(&self, limit: Option<usize>) -> Result<PathIter> {
        match limit {
            Some(n) => Ok(PathIter::Bounded(self.fst.shortest_paths(n).into_iter())),
            None => Ok(PathIter::Lazy(self.fst.paths()?)),
        }
    }

    /// 組 `(上側, 下側)` のイテレータ
    pub fn items(&self) -> Result<PathIter> {
        self.path_iterator(None)
    }

    /// 上側の文字列（キー）のイテレータ
    pub fn keys(&self) -> Result<impl Iterator<Item = String>> {
        Ok(self.keyset().items()?.map(|(k, _)| k))
    }

    /// 下側の文字列（値）のイテレータ
    pub fn values(&self) -> Result<impl Iterator<Item = String>> {
        Ok(self.valueset().items()?.map(|(v, _)| v))
    }

    /// 組の個数
    ///
    /// # エラー
    ///
    /// 巡回している場合、[`MorphoError::CyclicLanguage`] を返します。
    pub fn len(&self) -> Result<usize> {
        Ok(self.items()?.count())
    }

    /// 組を1つも含まないかどうか
    pub fn is_empty(&self) -> bool {
        self.fst.is_empty()
    }

    /// 組を1つ以上含むかどうか
    pub fn has_paths(&self) -> bool {
        !self.is_empty()
    }

    /// 無限個の組を含むかどうか
    pub fn is_cyclic(&self) -> bool {
        self.fst.is_cyclic()
    }

    /// 最大 `n` 個まで組を数えます。巡回していても停止します。
    pub fn count_paths_up_to(&self, n: usize) -> usize {
        self.fst.shortest_paths(n).len()
    }

    pub fn is_disjoint(&self, other: &Relation) -> bool {
        self.intersection(other).is_empty()
    }

    pub fn is_subset(&self, other: &Relation) -> bool {
        self.fst.difference(&other.fst).is_empty()
    }

    pub fn is_superset(&self, other: &Relation) -> bool {
        other.is_subset(self)
    }

    /// 関数性（各キーが高々1つの値を持つこと）の反例を、ランダムサンプリングで探します。
    ///
    /// `invert(self) @ self` が恒等写像であることと関数性は同値です。この合成から
    /// 長さ `strictness` 以下のパスを最大 `strictness` 個サンプリングし、
    /// 上下が異なるパス（同じキーに対応する異なる値の組）があれば返します。
    ///
    /// これは確率的な検査です。`None` は関数的であることの証明ではなく、
    /// サンプル中に反例が見つからなかったことだけを意味します。
    pub fn find_ambiguity(&self, strictness: usize) -> Option<(String, String)> {
        self.find_ambiguity_with_rng(strictness, &mut rand::thread_rng())
    }

    /// 乱数生成器を指定して [`Relation::find_ambiguity`] を行います。
    pub fn find_ambiguity_with_rng<R>(&self, strictness: usize, rng: &mut R) -> Option<(String, String)>
    where
        R: Rng,
    {
        let identity_check = self.fst.invert().compose(&self.fst);
        identity_check
            .rand_paths(strictness, strictness, rng)
            .into_iter()
            .find(|(top, bottom)| top != bottom)
    }

    /// 関係をライタに書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合や、rkyvのシリアライズに失敗した場合にエラーを返します。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&*self.fst)?;
        utils::write_archive(wtr, RELATION_MAGIC, &bytes)
    }

    /// [`Relation::write`] で書き出した関係を読み込みます。
    ///
    /// # エラー
    ///
    /// - マジックナンバーが一致しない場合、[`MorphoError::InvalidFormat`] を返します。
    /// - rkyvの検証に失敗した場合（データが壊れているか互換性がない場合）、[`MorphoError::RkyvError`] を返します。
    pub fn read<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let bytes = utils::read_archive(rdr, RELATION_MAGIC)?;
        let fst = rkyv::from_bytes::<Fst, rkyv::rancor::Error>(&bytes)?;
        if !fst.is_well_formed() {
            return Err(MorphoError::invalid_format("rdr", "a transition points outside the automaton"));
        }
        Ok(Self::from_fst(fst))
    }
}

impl Default for Relation {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Fst> for Relation {
    fn from(fst: Fst) -> Self {
        Self::from_fst(fst)
    }
}

impl PartialEq for Relation {
    /// 同じ組の集合を表すかどうか（構造の同型ではなく言語の等価性）
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fst, &other.fst) || self.fst.equivalent(&other.fst)
    }
}

impl Eq for Relation {}

impl PartialOrd for Relation {
    /// 包含関係による半順序
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_subset(other), other.is_subset(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut contents: Vec<_> = self.fst.shortest_paths(5);
        contents.sort();
        let coda = if contents.len() > 4 { " ..." } else { "" };
        contents.truncate(4);
        let contents: Vec<_> = contents.iter().map(|p| format!("{p:?}")).collect();
        write!(f, "Relation([{}]{coda})", contents.join(", "))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl $trait<&Relation> for &Relation {
            type Output = Relation;

            fn $method(self, rhs: &Relation) -> Relation {
                self.$op(rhs)
            }
        }

        impl $trait<Relation> for Relation {
            type Output = Relation;

            fn $method(self, rhs: Relation) -> Relation {
                self.$op(&rhs)
            }
        }
    };
}

impl_binary_op!(BitOr, bitor, union);
impl_binary_op!(BitAnd, bitand, intersection);
impl_binary_op!(BitXor, bitxor, symmetric_difference);
impl_binary_op!(Sub, sub, difference);
impl_binary_op!(Add, add, concatenate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptor_and_contains() {
        let r = Relation::acceptor("abc").unwrap();
        assert!(r.contains("abc").unwrap());
        assert!(!r.contains("ab").unwrap());
        assert_eq!(r.len().unwrap(), 1);
    }

    #[test]
    fn test_null_rejected() {
        assert!(Relation::acceptor("a\0").unwrap_err().is_encoding());
        assert!(Relation::new(vec![("a", "b\0")]).unwrap_err().is_encoding());
    }

    #[test]
    fn test_mapping_construction() {
        let map: BTreeMap<&str, &str> = [("a", "x"), ("b", "y")].into_iter().collect();
        let r = Relation::new(map).unwrap();
        assert_eq!(r, Relation::from_pairs([("b", "y"), ("a", "x")]).unwrap());
        assert_eq!(r.get("b").unwrap(), Some("y".to_string()));
        assert_eq!(r.get("c").unwrap(), None);
    }

    #[test]
    fn test_clone_aliases() {
        let a = Relation::acceptor("a").unwrap();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.fst, &b.fst));
    }

    #[test]
    fn test_query() {
        let r = Relation::from_pairs([("a", "x"), ("a", "y"), ("b", "z")]).unwrap();
        let values: Vec<_> = r.query(["a"]).unwrap().keys().unwrap().collect::<BTreeSet<_>>().into_iter().collect();
        assert_eq!(values, vec!["x", "y"]);
    }

    #[test]
    fn test_priority_union_keeps_left() {
        let left = Relation::from_pairs([("a", "x")]).unwrap();
        let right = Relation::from_pairs([("a", "y"), ("b", "z")]).unwrap();
        let merged = left.priority_union(&right);
        assert_eq!(merged, Relation::from_pairs([("a", "x"), ("b", "z")]).unwrap());
    }

    #[test]
    fn test_accepts_bottom() {
        let r = Relation::from_pairs([("a", "x")]).unwrap();
        assert!(r.accepts("x", Side::Bottom).unwrap());
        assert!(!r.accepts("x", Side::Top).unwrap());
    }

    #[test]
    fn test_complement() {
        let r = Relation::from_strings(["a"]).unwrap();
        let c = r.complement_over(['a', 'b']);
        assert!(c.contains("").unwrap());
        assert!(c.contains("b").unwrap());
        assert!(c.contains("aa").unwrap());
        assert!(!c.contains("a").unwrap());
        assert!(r.complement().contains("~").unwrap());
    }

    #[test]
    fn test_partial_ord() {
        let a = Relation::from_strings(["a"]).unwrap();
        let ab = Relation::from_strings(["a", "b"]).unwrap();
        let c = Relation::from_strings(["c"]).unwrap();
        assert!(a < ab);
        assert!(ab >= a);
        assert_eq!(a.partial_cmp(&c), None);
        assert!(a.is_disjoint(&c));
    }

    #[test]
    fn test_debug() {
        let r = Relation::from_strings(["b", "a"]).unwrap();
        assert_eq!(format!("{r:?}"), r#"Relation([("a", "a"), ("b", "b")])"#);
        let r = Relation::from_strings(["a", "b", "c", "d", "e", "f"]).unwrap();
        assert_eq!(
            format!("{r:?}"),
            r#"Relation([("a", "a"), ("b", "b"), ("c", "c"), ("d", "d")] ...)"#
        );
    }

    #[test]
    fn test_sigma() {
        let r = Relation::from_pairs([("ab", "c")]).unwrap();
        assert_eq!(r.sigma(), Relation::from_strings(["a", "b", "c"]).unwrap());
    }

    #[test]
    fn test_cross() {
        let r = Relation::from_strings(["a", "b"]).unwrap().cross(&Relation::acceptor("xy").unwrap());
        assert_eq!(r, Relation::from_pairs([("a", "xy"), ("b", "xy")]).unwrap());
    }
}
